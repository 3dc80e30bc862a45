use thiserror::Error;

pub const DEFAULT_SIZE: usize = 4;
pub const START_TILES: usize = 2;
pub const WIN_TILE: u32 = 2048;
/// Largest value a cell can hold. Two of them cannot merge.
pub const MAX_TILE: u32 = 1 << 31;
/// Chance that a spawned tile is a 4 instead of a 2.
pub const FOUR_PROBABILITY: f64 = 0.1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("board size must be at least 1")]
    ZeroSize,
    #[error("board size {0} is too large")]
    TooLarge(usize),
    #[error("{start_tiles} start tiles do not fit on a board of {cells} cells")]
    TooManyStartTiles { start_tiles: usize, cells: usize },
    #[error("win tile {0} is not a power of two of at least 4")]
    InvalidWinTile(u32),
}

/// Construction-time parameters of a game. Fixed for the lifetime of a session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Rules {
    pub size: usize,
    pub start_tiles: usize,
    pub win_tile: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            start_tiles: START_TILES,
            win_tile: WIN_TILE,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.size == 0 {
            return Err(RulesError::ZeroSize);
        }
        let cells = self
            .size
            .checked_mul(self.size)
            .ok_or(RulesError::TooLarge(self.size))?;
        if self.start_tiles > cells {
            return Err(RulesError::TooManyStartTiles {
                start_tiles: self.start_tiles,
                cells,
            });
        }
        if self.win_tile < 4 || !self.win_tile.is_power_of_two() {
            return Err(RulesError::InvalidWinTile(self.win_tile));
        }
        Ok(())
    }
}

#[test]
fn default_rules_are_valid() {
    assert_eq!(Rules::default().validate(), Ok(()));
}

#[test]
fn rules_validation() {
    let zero = Rules {
        size: 0,
        ..Rules::default()
    };
    assert_eq!(zero.validate(), Err(RulesError::ZeroSize));

    let crowded = Rules {
        size: 2,
        start_tiles: 5,
        ..Rules::default()
    };
    assert_eq!(
        crowded.validate(),
        Err(RulesError::TooManyStartTiles {
            start_tiles: 5,
            cells: 4
        })
    );

    for win_tile in [0, 1, 2, 3, 1000] {
        let rules = Rules {
            win_tile,
            ..Rules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::InvalidWinTile(win_tile)));
    }

    let huge = Rules {
        size: usize::MAX,
        ..Rules::default()
    };
    assert_eq!(huge.validate(), Err(RulesError::TooLarge(usize::MAX)));

    let small = Rules {
        size: 3,
        start_tiles: 9,
        win_tile: 64,
    };
    assert_eq!(small.validate(), Ok(()));
}

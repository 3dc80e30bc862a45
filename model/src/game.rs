use log::{debug, info};
use rand::Rng;

use crate::field::{Field, Side};
use crate::rules::Rules;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Playing,
    Won,
    GameOver,
}

/// One play session. Transitions never mutate; each returns the next session.
///
/// `best_score` belongs to the session rather than to a single board and
/// survives [`Game::reset`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    rules: Rules,
    field: Field,
    score: u64,
    best_score: u64,
    won: bool,
    game_over: bool,
    keep_playing: bool,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(rules: Rules, rng: &mut R) -> Self {
        let field = Field::initialize(rules.size, rules.start_tiles, rng);
        Self::from_field(rules, field)
    }

    /// Session starting from an arbitrary position with zero score. The board
    /// size of `rules` is taken from `field`.
    pub fn from_field(rules: Rules, field: Field) -> Self {
        if rules.size != field.size() {
            debug!("using field size {} instead of {}", field.size(), rules.size);
        }
        let rules = Rules {
            size: field.size(),
            ..rules
        };
        let won = field.has_tile(rules.win_tile);
        let game_over = !won && !field.has_moves();
        Self {
            rules,
            field,
            score: 0,
            best_score: 0,
            won,
            game_over,
            keep_playing: false,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn status(&self) -> Status {
        if self.won {
            Status::Won
        } else if self.game_over {
            Status::GameOver
        } else {
            Status::Playing
        }
    }

    /// Plays one move. Ignored while the win banner is up, after game over,
    /// or when the move changes nothing.
    pub fn apply_move<R: Rng + ?Sized>(&self, side: Side, rng: &mut R) -> Self {
        if self.won || self.game_over {
            return self.clone();
        }
        let swipe = self.field.swipe(side, rng);
        if !swipe.moved {
            return self.clone();
        }
        let score = self.score + swipe.score;
        let best_score = self.best_score.max(score);
        let won = !self.keep_playing && swipe.field.has_tile(self.rules.win_tile);
        let game_over = !won && !swipe.field.has_moves();
        if won {
            info!("reached {} with score {}", self.rules.win_tile, score);
        } else if game_over {
            info!("no moves left, final score {}", score);
            debug!("final field:\n{}", swipe.field);
        }
        Self {
            field: swipe.field,
            score,
            best_score,
            won,
            game_over,
            ..self.clone()
        }
    }

    /// Fresh board and score; the best score carries over.
    pub fn reset<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self {
            best_score: self.best_score,
            ..Self::new(self.rules, rng)
        }
    }

    /// Dismisses the win and keeps the current board and score. Reaching the
    /// win tile again in this game does not stop play a second time.
    pub fn keep_playing(&self) -> Self {
        Self {
            won: false,
            keep_playing: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::field::Field;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub fn field(size: usize, values: Vec<u32>) -> Field {
        Field::from_array(Array2::from_shape_vec((size, size), values).unwrap()).unwrap()
    }

    pub fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }
}

#[test]
fn new_game_has_start_tiles() {
    let mut rng = crate::game::tests::rng();
    let game = Game::new(Rules::default(), &mut rng);
    assert_eq!(game.field().size(), 4);
    assert_eq!(game.field().free_cells().len(), 14);
    assert_eq!(game.score(), 0);
    assert_eq!(game.best_score(), 0);
    assert_eq!(game.status(), Status::Playing);
}

#[test]
fn move_accumulates_score() {
    use crate::game::tests::field;
    #[rustfmt::skip]
    let start = field(4, vec![
        2, 2, 0, 0,
        4, 4, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0
    ]);
    let mut rng = crate::game::tests::rng();
    let game = Game::from_field(Rules::default(), start);
    let game = game.apply_move(Side::Left, &mut rng);
    assert_eq!(game.score(), 12);
    assert_eq!(game.best_score(), 12);
    assert_eq!(game.field().get(0, 0), Some(4));
    assert_eq!(game.field().get(1, 0), Some(8));
    assert_eq!(game.status(), Status::Playing);
}

#[test]
fn noop_move_keeps_session() {
    use crate::game::tests::field;
    #[rustfmt::skip]
    let start = field(4, vec![
        2, 4, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0
    ]);
    let mut rng = crate::game::tests::rng();
    let game = Game::from_field(Rules::default(), start);
    assert_eq!(game.apply_move(Side::Left, &mut rng), game);
    assert_eq!(game.apply_move(Side::Up, &mut rng), game);
}

#[test]
fn reaching_win_tile_wins() {
    use crate::game::tests::field;
    #[rustfmt::skip]
    let start = field(4, vec![
        1024, 1024, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0
    ]);
    let mut rng = crate::game::tests::rng();
    let game = Game::from_field(Rules::default(), start).apply_move(Side::Left, &mut rng);
    assert!(game.is_won());
    assert_eq!(game.status(), Status::Won);
    assert_eq!(game.score(), 2048);

    // moves are ignored while the win is pending
    assert_eq!(game.apply_move(Side::Right, &mut rng), game);

    let continued = game.keep_playing();
    assert_eq!(continued.status(), Status::Playing);
    assert_eq!(continued.field(), game.field());
    assert_eq!(continued.score(), game.score());

    let next = continued.apply_move(Side::Right, &mut rng);
    assert_ne!(next.field(), continued.field());
    assert_eq!(next.status(), Status::Playing);
}

#[test]
fn win_takes_precedence_over_game_over() {
    use crate::game::tests::field;
    #[rustfmt::skip]
    let start = field(2, vec![
        4, 4,
        16, 2,
    ]);
    let rules = Rules {
        size: 2,
        start_tiles: 2,
        win_tile: 8,
    };
    let mut rng = crate::game::tests::rng();
    let game = Game::from_field(rules, start).apply_move(Side::Left, &mut rng);
    assert_eq!(game.field().get(0, 0), Some(8));
    assert_eq!(game.status(), Status::Won);
    assert!(!game.is_game_over());
}

#[test]
fn filling_last_cell_ends_game() {
    use crate::game::tests::field;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    // whether a 2 or a 4 lands in the last cell, nothing next to it matches
    #[rustfmt::skip]
    let start = field(2, vec![
        8, 16,
        0, 32,
    ]);
    for seed in 0..16 {
        let mut rng = StdRng::seed_from_u64(seed);
        let game = Game::from_field(Rules::default(), start.clone());
        assert_eq!(game.status(), Status::Playing);

        let over = game.apply_move(Side::Left, &mut rng);
        assert_eq!(over.field().get(1, 0), Some(32));
        assert!(over.field().free_cells().is_empty());
        assert_eq!(over.status(), Status::GameOver);
        for side in Side::ALL.iter().copied() {
            assert_eq!(over.apply_move(side, &mut rng), over);
        }
    }

    #[rustfmt::skip]
    let stuck = field(2, vec![
        2, 4,
        4, 2,
    ]);
    let mut rng = crate::game::tests::rng();
    let game = Game::from_field(Rules::default(), stuck);
    assert_eq!(game.status(), Status::GameOver);
    for side in Side::ALL.iter().copied() {
        assert_eq!(game.apply_move(side, &mut rng), game);
    }
}

#[test]
fn rules_follow_the_given_field() {
    use crate::game::tests::field;
    let mut rng = crate::game::tests::rng();
    let game = Game::from_field(Rules::default(), field(2, vec![2, 0, 0, 4]));
    assert_eq!(game.rules().size, 2);
    assert_eq!(game.rules().win_tile, Rules::default().win_tile);
    assert_eq!(game.reset(&mut rng).field().size(), 2);
}

#[test]
fn reset_keeps_best_score() {
    use crate::game::tests::field;
    #[rustfmt::skip]
    let start = field(4, vec![
        8, 8, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0
    ]);
    let mut rng = crate::game::tests::rng();
    let game = Game::from_field(Rules::default(), start).apply_move(Side::Left, &mut rng);
    assert_eq!(game.best_score(), 16);

    let fresh = game.reset(&mut rng);
    assert_eq!(fresh.score(), 0);
    assert_eq!(fresh.best_score(), 16);
    assert_eq!(fresh.status(), Status::Playing);
    assert_eq!(fresh.field().free_cells().len(), 14);
}

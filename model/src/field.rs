use std::fmt;

use log::{debug, trace};
use ndarray::{s, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use Side::{Down, Left, Right, Up};

use crate::rules::{FOUR_PROBABILITY, MAX_TILE, WIN_TILE};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Down,
    Left,
    Up,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Up, Down, Left, Right];
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field has no cells")]
    Empty,
    #[error("field must be square, got {rows} rows and {cols} columns")]
    NotSquare { rows: usize, cols: usize },
    #[error("value {value} at row {row}, column {col} is not a tile")]
    InvalidTile { row: usize, col: usize, value: u32 },
}

/// Result of [`Field::swipe`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Swipe {
    pub field: Field,
    /// Sum of the values produced by every merge of the swipe.
    pub score: u64,
    /// False when nothing could shift or merge; `field` is then the original.
    pub moved: bool,
}

/// Collapses one line of cells towards its start.
///
/// Zeros are dropped, each pair of adjacent equal tiles merges once into
/// their sum, and the line is padded back with zeros. Returns the new line
/// and the sum of the merged values. Tiles of [`MAX_TILE`] never merge.
pub fn reduce_row(row: &[u32]) -> (Vec<u32>, u64) {
    let mut tiles = row.iter().copied().filter(|&v| v != 0).peekable();
    let mut reduced = Vec::with_capacity(row.len());
    let mut score = 0;
    while let Some(tile) = tiles.next() {
        if mergeable(tile, tiles.peek().copied()) {
            tiles.next();
            let merged = tile * 2;
            score += u64::from(merged);
            reduced.push(merged);
        } else {
            reduced.push(tile);
        }
    }
    reduced.resize(row.len(), 0);
    (reduced, score)
}

fn mergeable(tile: u32, next: Option<u32>) -> bool {
    next == Some(tile) && tile < MAX_TILE
}

/// Square board of tile values, `0` marking an empty cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field(Array2<u32>);

impl Field {
    pub fn new(size: usize) -> Self {
        Self(Array2::zeros((size, size)))
    }

    /// Empty field seeded with `start_tiles` spawned tiles.
    pub fn initialize<R: Rng + ?Sized>(size: usize, start_tiles: usize, rng: &mut R) -> Self {
        (0..start_tiles).fold(Self::new(size), |field, _| field.spawn_tile(rng))
    }

    pub fn from_array(array: Array2<u32>) -> Result<Self, FieldError> {
        let (rows, cols) = array.dim();
        if rows == 0 || cols == 0 {
            return Err(FieldError::Empty);
        }
        if rows != cols {
            return Err(FieldError::NotSquare { rows, cols });
        }
        if let Some(((row, col), &value)) = array
            .indexed_iter()
            .find(|&(_, &v)| v == 1 || !(v == 0 || v.is_power_of_two()))
        {
            return Err(FieldError::InvalidTile { row, col, value });
        }
        Ok(Self(array))
    }

    pub fn to_array(&self) -> Array2<u32> {
        self.0.clone()
    }

    pub fn size(&self) -> usize {
        self.0.nrows()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        self.0.get((row, col)).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, u32>> {
        self.0.rows().into_iter()
    }

    /// Empty positions as `(row, col)`, in row-major order.
    pub fn free_cells(&self) -> Vec<(usize, usize)> {
        self.0
            .indexed_iter()
            .filter(|&(_, &v)| v == 0)
            .map(|(index, _)| index)
            .collect()
    }

    /// Puts a 2 (or, rarely, a 4) into a random empty cell. A full field is
    /// returned as is.
    pub fn spawn_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let free = self.free_cells();
        let index = match free.choose(rng) {
            Some(&index) => index,
            None => return self.clone(),
        };
        let value = if rng.gen_bool(FOUR_PROBABILITY) { 4 } else { 2 };
        trace!("spawn {} at {:?}", value, index);
        let mut spawned = self.clone();
        spawned.0[index] = value;
        spawned
    }

    /// Quarter turn clockwise: cell `(r, c)` lands on `(c, n - 1 - r)`.
    pub fn rotate_cw(&self) -> Self {
        Self(self.0.t().slice_move(s![.., ..;-1]).to_owned())
    }

    /// Quarter turn counter-clockwise: cell `(r, c)` lands on `(n - 1 - c, r)`.
    pub fn rotate_ccw(&self) -> Self {
        Self(self.0.t().slice_move(s![..;-1, ..]).to_owned())
    }

    fn mirror(&self) -> Self {
        Self(self.0.slice(s![.., ..;-1]).to_owned())
    }

    fn shift_left(&self) -> (Self, u64) {
        let mut shifted = Array2::<u32>::zeros(self.0.raw_dim());
        let mut score = 0;
        for (src, mut dst) in self.0.rows().into_iter().zip(shifted.rows_mut()) {
            let (reduced, gain) = reduce_row(&src.to_vec());
            for (cell, value) in dst.iter_mut().zip(reduced) {
                *cell = value;
            }
            score += gain;
        }
        (Self(shifted), score)
    }

    /// Slides and merges every tile towards `side` without spawning.
    /// Every direction is the left shift seen through a rotation or mirror.
    pub fn shift(&self, side: Side) -> (Self, u64) {
        match side {
            Left => self.shift_left(),
            Right => {
                let (shifted, score) = self.mirror().shift_left();
                (shifted.mirror(), score)
            }
            Up => {
                let (shifted, score) = self.rotate_ccw().shift_left();
                (shifted.rotate_cw(), score)
            }
            Down => {
                let (shifted, score) = self.rotate_cw().shift_left();
                (shifted.rotate_ccw(), score)
            }
        }
    }

    pub fn can_swipe(&self, side: Side) -> bool {
        self.shift(side).0 != *self
    }

    /// One player move: shift towards `side`, then spawn a tile if anything
    /// changed. An unchanged shift returns the original field and no score.
    pub fn swipe<R: Rng + ?Sized>(&self, side: Side, rng: &mut R) -> Swipe {
        let (shifted, score) = self.shift(side);
        if shifted == *self {
            debug!("swipe {:?} changes nothing", side);
            return Swipe {
                field: self.clone(),
                score: 0,
                moved: false,
            };
        }
        debug!("swipe {:?} scores {}", side, score);
        Swipe {
            field: shifted.spawn_tile(rng),
            score,
            moved: true,
        }
    }

    pub fn has_tile(&self, value: u32) -> bool {
        self.0.iter().any(|&v| v == value)
    }

    pub fn has_won(&self) -> bool {
        self.has_tile(WIN_TILE)
    }

    /// False only when the field is full and no two neighbours can merge.
    pub fn has_moves(&self) -> bool {
        if self.0.iter().any(|&v| v == 0) {
            return true;
        }
        self.0.indexed_iter().any(|((row, col), &value)| {
            mergeable(value, self.get(row, col + 1)) || mergeable(value, self.get(row + 1, col))
        })
    }

    pub fn max_tile(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>5}", v)).collect();
            writeln!(f, "{}", cells.join(""))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Field;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub fn field(size: usize, values: Vec<u32>) -> Field {
        Field::from_array(Array2::from_shape_vec((size, size), values).unwrap()).unwrap()
    }

    pub fn rng() -> StdRng {
        StdRng::seed_from_u64(2048)
    }
}

#[test]
fn reduce_row_examples() {
    assert_eq!(reduce_row(&[2, 2, 4, 0]), (vec![4, 4, 0, 0], 4));
    assert_eq!(reduce_row(&[2, 2, 2, 2]), (vec![4, 4, 0, 0], 8));
    assert_eq!(reduce_row(&[0, 0, 0, 2]), (vec![2, 0, 0, 0], 0));
    assert_eq!(reduce_row(&[4, 0, 4, 8]), (vec![8, 8, 0, 0], 8));
    assert_eq!(reduce_row(&[2, 4, 8, 16]), (vec![2, 4, 8, 16], 0));
    assert_eq!(reduce_row(&[4, 4, 8, 0]), (vec![8, 8, 0, 0], 8));
    assert_eq!(reduce_row(&[]), (vec![], 0));
}

#[test]
fn field_from_array() {
    use ndarray::arr2;
    #[rustfmt::skip]
    let array = Array2::from_shape_vec((3, 3), vec![
        8, 4, 2,
        4, 2, 0,
        2, 0, 16
    ]).unwrap();
    let field = Field::from_array(array.clone()).unwrap();
    assert_eq!(field.size(), 3);
    assert_eq!(field.get(0, 0), Some(8));
    assert_eq!(field.get(2, 2), Some(16));
    assert_eq!(field.get(3, 0), None);
    assert_eq!(field.to_array(), array);
    assert_eq!(field.free_cells(), vec![(1, 2), (2, 1)]);

    assert_eq!(
        Field::from_array(arr2(&[[2, 4, 8], [0, 0, 0]])),
        Err(FieldError::NotSquare { rows: 2, cols: 3 })
    );
    assert_eq!(
        Field::from_array(arr2(&[[2, 4], [6, 0]])),
        Err(FieldError::InvalidTile {
            row: 1,
            col: 0,
            value: 6
        })
    );
    assert_eq!(
        Field::from_array(arr2(&[[1, 0], [0, 0]])),
        Err(FieldError::InvalidTile {
            row: 0,
            col: 0,
            value: 1
        })
    );
    assert_eq!(
        Field::from_array(Array2::zeros((0, 0))),
        Err(FieldError::Empty)
    );
}

#[test]
fn initialize_spawns_start_tiles() {
    let mut rng = crate::field::tests::rng();
    let field = Field::initialize(4, 2, &mut rng);
    assert_eq!(field.size(), 4);
    assert_eq!(field.free_cells().len(), 14);
    assert!(field.rows().flatten().all(|&v| v == 0 || v == 2 || v == 4));

    let empty = Field::initialize(3, 0, &mut rng);
    assert_eq!(empty, Field::new(3));
}

#[test]
fn spawn_into_full_field_is_noop() {
    use crate::field::tests::field;
    let full = field(2, vec![2, 4, 8, 16]);
    let mut rng = crate::field::tests::rng();
    assert_eq!(full.spawn_tile(&mut rng), full);
}

#[test]
fn spawn_does_not_touch_input() {
    let mut rng = crate::field::tests::rng();
    let empty = Field::new(4);
    let spawned = empty.spawn_tile(&mut rng);
    assert_eq!(empty, Field::new(4));
    assert_eq!(spawned.free_cells().len(), 15);
}

#[test]
fn spawn_fills_last_free_cell() {
    use crate::field::tests::field;
    let mut rng = crate::field::tests::rng();
    let spawned = field(2, vec![2, 4, 0, 16]).spawn_tile(&mut rng);
    let value = spawned.get(1, 0).unwrap();
    assert!(value == 2 || value == 4);
    assert!(spawned.free_cells().is_empty());
}

#[test]
fn rotation_maps_cells() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let source = field(3, vec![
        2, 4, 8,
        16, 32, 64,
        128, 256, 512,
    ]);
    #[rustfmt::skip]
    let cw = field(3, vec![
        128, 16, 2,
        256, 32, 4,
        512, 64, 8,
    ]);
    #[rustfmt::skip]
    let ccw = field(3, vec![
        8, 64, 512,
        4, 32, 256,
        2, 16, 128,
    ]);
    assert_eq!(source.rotate_cw(), cw);
    assert_eq!(source.rotate_ccw(), ccw);
    assert_eq!(cw.rotate_ccw(), source);
    assert_eq!(ccw.rotate_cw(), source);
}

#[test]
fn shift_up() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let source = field(4, vec![
        0, 2, 4, 4,
        0, 2, 2, 4,
        0, 0, 2, 2,
        0, 0, 0, 2
    ]);
    #[rustfmt::skip]
    let expected = field(4, vec![
        0, 4, 4, 8,
        0, 0, 4, 4,
        0, 0, 0, 0,
        0, 0, 0, 0
    ]);
    assert_eq!(source.shift(Up), (expected, 20));
}

#[test]
fn shift_down() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let source = field(4, vec![
        0, 2, 4, 4,
        0, 2, 2, 4,
        0, 0, 2, 2,
        0, 0, 0, 2
    ]);
    #[rustfmt::skip]
    let expected = field(4, vec![
        0, 0, 0, 0,
        0, 0, 0, 0,
        0, 0, 4, 8,
        0, 4, 4, 4,
    ]);
    assert_eq!(source.shift(Down), (expected, 20));
}

#[test]
fn shift_left() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let source = field(4, vec![
        0, 2, 4, 4,
        0, 2, 2, 4,
        0, 0, 2, 2,
        0, 0, 0, 2
    ]);
    #[rustfmt::skip]
    let expected = field(4, vec![
        2, 8, 0, 0,
        4, 4, 0, 0,
        4, 0, 0, 0,
        2, 0, 0, 0,
    ]);
    assert_eq!(source.shift(Left), (expected, 16));
}

#[test]
fn shift_right() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let source = field(4, vec![
        0, 2, 4, 4,
        0, 2, 2, 4,
        0, 0, 2, 2,
        0, 0, 0, 2
    ]);
    #[rustfmt::skip]
    let expected = field(4, vec![
        0, 0, 2, 8,
        0, 0, 4, 4,
        0, 0, 0, 4,
        0, 0, 0, 2
    ]);
    assert_eq!(source.shift(Right), (expected, 16));
}

#[test]
fn swipe_merges_and_spawns() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let source = field(4, vec![
        2, 2, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0,
        0, 0, 0, 0
    ]);
    let mut rng = crate::field::tests::rng();
    let swipe = source.swipe(Left, &mut rng);
    assert!(swipe.moved);
    assert_eq!(swipe.score, 4);
    assert_eq!(swipe.field.get(0, 0), Some(4));
    let tiles: Vec<(usize, usize)> = swipe
        .field
        .to_array()
        .indexed_iter()
        .filter(|&(_, &v)| v != 0)
        .map(|(index, _)| index)
        .collect();
    assert_eq!(tiles.len(), 2);
    assert!(swipe.field.rows().flatten().filter(|&&v| v != 0 && v != 4).count() <= 1);
}

#[test]
fn swipe_against_edge_is_noop() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let source = field(4, vec![
        2, 4, 0, 0,
        8, 0, 0, 0,
        0, 0, 0, 0,
        16, 2, 8, 0
    ]);
    let mut rng = crate::field::tests::rng();
    let swipe = source.swipe(Left, &mut rng);
    assert!(!swipe.moved);
    assert_eq!(swipe.score, 0);
    assert_eq!(swipe.field, source);
    assert!(!source.can_swipe(Left));
    assert!(source.can_swipe(Right));
    assert!(source.can_swipe(Down));
}

#[test]
fn has_won_with_win_tile_anywhere() {
    use crate::field::tests::field;
    assert!(field(2, vec![0, 0, 0, 2048]).has_won());
    assert!(field(3, vec![2, 4, 8, 16, 2048, 32, 64, 128, 256]).has_won());
    assert!(!field(2, vec![1024, 1024, 4096, 0]).has_won());
    assert!(field(2, vec![1024, 1024, 4096, 0]).has_tile(4096));
}

#[test]
fn has_moves_detection() {
    use crate::field::tests::field;
    #[rustfmt::skip]
    let stuck = field(4, vec![
        2, 4, 2, 4,
        4, 2, 4, 2,
        2, 4, 2, 4,
        4, 2, 4, 2
    ]);
    assert!(!stuck.has_moves());
    for side in Side::ALL.iter().copied() {
        assert!(!stuck.can_swipe(side));
    }

    #[rustfmt::skip]
    let vertical_pair = field(4, vec![
        2, 4, 2, 4,
        4, 2, 4, 2,
        2, 4, 2, 4,
        2, 8, 16, 32
    ]);
    assert!(vertical_pair.has_moves());

    #[rustfmt::skip]
    let horizontal_pair = field(3, vec![
        2, 4, 8,
        16, 32, 32,
        2, 4, 8,
    ]);
    assert!(horizontal_pair.has_moves());

    assert!(field(2, vec![2, 4, 8, 0]).has_moves());
    assert!(!field(1, vec![2]).has_moves());
}

#[test]
fn max_tile_and_display() {
    use crate::field::tests::field;
    let f = field(2, vec![2, 0, 128, 4]);
    assert_eq!(f.max_tile(), 128);
    assert_eq!(Field::new(3).max_tile(), 0);
    assert_eq!(f.to_string(), "    2    0\n  128    4\n");
}

#[test]
fn largest_tiles_never_merge() {
    use crate::field::tests::field;
    let top = field(2, vec![MAX_TILE, MAX_TILE, 0, 0]);
    for side in [Left, Right].iter().copied() {
        assert_eq!(top.shift(side), (top.clone(), 0));
    }
    assert_eq!(reduce_row(&[MAX_TILE, MAX_TILE]), (vec![MAX_TILE, MAX_TILE], 0));

    let full = field(2, vec![MAX_TILE, MAX_TILE, 2, 4]);
    assert!(!full.has_moves());
    for side in Side::ALL.iter().copied() {
        assert!(!full.can_swipe(side));
    }

    let halves = field(2, vec![MAX_TILE / 2, MAX_TILE / 2, 0, 0]);
    let (merged, score) = halves.shift(Left);
    assert_eq!(merged.get(0, 0), Some(MAX_TILE));
    assert_eq!(score, u64::from(MAX_TILE));
}

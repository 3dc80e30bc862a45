//! Property tests for the row reducer, rotations and swipes.

use model::field::{reduce_row, Field, Side};
use ndarray::Array2;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn tile() -> impl Strategy<Value = u32> {
    prop_oneof![
        2 => Just(0u32),
        5 => (1u32..=11).prop_map(|k| 1u32 << k),
    ]
}

fn row() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(tile(), 0..8)
}

fn field() -> impl Strategy<Value = Field> {
    (1usize..=6).prop_flat_map(|size| {
        prop::collection::vec(tile(), size * size).prop_map(move |values| {
            Field::from_array(Array2::from_shape_vec((size, size), values).unwrap()).unwrap()
        })
    })
}

fn side() -> impl Strategy<Value = Side> {
    prop::sample::select(Side::ALL.to_vec())
}

fn total(field: &Field) -> u64 {
    field.rows().flatten().map(|&v| u64::from(v)).sum()
}

proptest! {
    #[test]
    fn reduce_row_keeps_length(row in row()) {
        let (reduced, _) = reduce_row(&row);
        prop_assert_eq!(reduced.len(), row.len());
    }

    #[test]
    fn reduce_row_is_idempotent(row in row()) {
        let (once, _) = reduce_row(&row);
        // a second pass can only merge pairs created by the first one
        if once.windows(2).all(|w| w[0] != w[1] || w[0] == 0) {
            let (twice, score) = reduce_row(&once);
            prop_assert_eq!(twice, once);
            prop_assert_eq!(score, 0);
        }
    }

    #[test]
    fn reduce_row_conserves_value(row in row()) {
        let (reduced, _) = reduce_row(&row);
        let before: u64 = row.iter().map(|&v| u64::from(v)).sum();
        let after: u64 = reduced.iter().map(|&v| u64::from(v)).sum();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn reduce_row_score_matches_merges(row in row()) {
        let (reduced, score) = reduce_row(&row);
        let tiles_before = row.iter().filter(|&&v| v != 0).count();
        let tiles_after = reduced.iter().filter(|&&v| v != 0).count();
        // every merge removes exactly one tile and scores at least 4
        let merges = (tiles_before - tiles_after) as u64;
        prop_assert!(score >= merges * 4);
        prop_assert_eq!(score == 0, merges == 0);
    }

    #[test]
    fn reduce_row_packs_left(row in row()) {
        let (reduced, _) = reduce_row(&row);
        let tiles = reduced.iter().take_while(|&&v| v != 0).count();
        prop_assert!(reduced[tiles..].iter().all(|&v| v == 0));
    }

    #[test]
    fn rotations_are_inverse(field in field()) {
        prop_assert_eq!(field.rotate_cw().rotate_ccw(), field.clone());
        prop_assert_eq!(field.rotate_ccw().rotate_cw(), field.clone());
        prop_assert_eq!(field.rotate_cw().rotate_cw().rotate_cw().rotate_cw(), field);
    }

    #[test]
    fn shift_conserves_value(field in field(), side in side()) {
        let (shifted, _) = field.shift(side);
        prop_assert_eq!(total(&shifted), total(&field));
    }

    #[test]
    fn shift_merges_each_tile_once(field in field()) {
        let (shifted, score) = field.shift(Side::Left);
        for (before, after) in field.rows().zip(shifted.rows()) {
            let tiles_before = before.iter().filter(|&&v| v != 0).count();
            let tiles_after = after.iter().filter(|&&v| v != 0).count();
            prop_assert!(tiles_after * 2 >= tiles_before);
        }
        prop_assert!(score <= total(&field));
    }

    #[test]
    fn swipe_spawns_only_after_change(field in field(), side in side(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let swipe = field.swipe(side, &mut rng);
        prop_assert_eq!(swipe.moved, field.can_swipe(side));
        if swipe.moved {
            let spawned = total(&swipe.field) - total(&field);
            prop_assert!(spawned == 2 || spawned == 4);
        } else {
            prop_assert_eq!(&swipe.field, &field);
            prop_assert_eq!(swipe.score, 0);
        }
    }

    #[test]
    fn swipe_is_deterministic_per_seed(field in field(), side in side(), seed in any::<u64>()) {
        let first = field.swipe(side, &mut StdRng::seed_from_u64(seed));
        let second = field.swipe(side, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn has_moves_iff_some_swipe_changes(field in field()) {
        let movable = Side::ALL.iter().any(|&side| field.can_swipe(side));
        if field.max_tile() > 0 {
            prop_assert_eq!(field.has_moves(), movable);
        } else {
            prop_assert!(field.has_moves());
        }
    }
}

#[test]
fn checkerboard_has_no_moves() {
    for size in 1..=6 {
        let values = (0..size * size)
            .map(|i| if (i / size + i % size) % 2 == 0 { 2 } else { 4 })
            .collect();
        let field = Field::from_array(Array2::from_shape_vec((size, size), values).unwrap()).unwrap();
        assert!(!field.has_moves(), "size {}", size);
        let mut rng = StdRng::seed_from_u64(size as u64);
        for side in Side::ALL.iter().copied() {
            let swipe = field.swipe(side, &mut rng);
            assert!(!swipe.moved);
            assert_eq!(swipe.field, field);
        }
    }
}

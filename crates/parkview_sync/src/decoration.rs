//! # Decoration Draw
//!
//! One weighted draw per obstacle, made at map creation and never repeated.
//!
//! | Outcome    | Chance |
//! |------------|--------|
//! | tree1      | 32.5%  |
//! | tree2      | 32.5%  |
//! | rock1      | 10%    |
//! | rock2      | 10%    |
//! | trash can  | 5%     |
//! | nothing    | 10%    |

use rand::Rng;

use crate::entity::Decoration;

/// Probability of any tree.
pub const TREE_CHANCE: f64 = 0.65;
/// Probability of any rock.
pub const ROCK_CHANCE: f64 = 0.20;
/// Probability of a trash can.
pub const TRASH_CAN_CHANCE: f64 = 0.05;

/// Draws a decoration from `rng`.
pub fn draw_decoration<R: Rng + ?Sized>(rng: &mut R) -> Option<Decoration> {
    decoration_for_roll(rng.gen::<f64>())
}

/// Maps a uniform roll in `[0, 1)` to an outcome.
///
/// Each band is split in half between its two variants.
#[must_use]
pub fn decoration_for_roll(roll: f64) -> Option<Decoration> {
    let mut r = roll;

    if r < TREE_CHANCE {
        return Some(if r < TREE_CHANCE / 2.0 {
            Decoration::Tree1
        } else {
            Decoration::Tree2
        });
    }
    r -= TREE_CHANCE;

    if r < ROCK_CHANCE {
        return Some(if r < ROCK_CHANCE / 2.0 {
            Decoration::Rock1
        } else {
            Decoration::Rock2
        });
    }
    r -= ROCK_CHANCE;

    (r < TRASH_CAN_CHANCE).then_some(Decoration::TrashCan)
}

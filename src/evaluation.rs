//! Static evaluation.
//!
//! The search only needs a score for the side to move; the weights behind it
//! are pluggable through [`Evaluator`]. [`MaterialEvaluator`] is the default:
//! material balance plus a mop-up term that drives a bare king to the edge.

use crate::board::{Color, Piece, Position, Square};

/// Static evaluation from the side to move's point of view, in centipawns.
pub trait Evaluator: Send {
    fn evaluate(&self, pos: &Position) -> i32;
}

impl<F> Evaluator for F
where
    F: Fn(&Position) -> i32 + Send,
{
    fn evaluate(&self, pos: &Position) -> i32 {
        self(pos)
    }
}

/// Material advantage from which the mop-up term kicks in.
const MOP_UP_MARGIN: i32 = 400;
const MOP_UP_CENTER_WEIGHT: i32 = 10;
const MOP_UP_KING_WEIGHT: i32 = 4;

const CENTER: [Square; 4] = [
    Square::from_coords(3, 3),
    Square::from_coords(4, 3),
    Square::from_coords(3, 4),
    Square::from_coords(4, 4),
];

/// Material plus king mop-up.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    /// Non-king material of `color`.
    #[must_use]
    pub fn material(pos: &Position, color: Color) -> i32 {
        Piece::ALL
            .iter()
            .filter(|&&p| p != Piece::King)
            .map(|&p| p.value() * pos.pieces(color, p).popcount() as i32)
            .sum()
    }

    /// Bonus for `strong` when the defending king sits far from the center
    /// and close to the attacking king. Zero unless `weak` has no pawns.
    fn mop_up(pos: &Position, strong: Color) -> i32 {
        let weak = strong.opponent();
        if pos.pieces(weak, Piece::Pawn).any() {
            return 0;
        }
        let (Some(strong_king), Some(weak_king)) = (pos.king_square(strong), pos.king_square(weak))
        else {
            return 0;
        };

        let attacks = &pos.tables().attacks;
        let center_distance = CENTER
            .iter()
            .map(|&c| i32::from(attacks.distance(weak_king, c)))
            .min()
            .unwrap_or(0);
        let king_distance = i32::from(attacks.distance(strong_king, weak_king));

        MOP_UP_CENTER_WEIGHT * center_distance + MOP_UP_KING_WEIGHT * (7 - king_distance)
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, pos: &Position) -> i32 {
        let white = Self::material(pos, Color::White);
        let black = Self::material(pos, Color::Black);
        let mut score = white - black;

        if score >= MOP_UP_MARGIN {
            score += Self::mop_up(pos, Color::White);
        } else if score <= -MOP_UP_MARGIN {
            score -= Self::mop_up(pos, Color::Black);
        }

        match pos.side_to_move() {
            Color::White => score,
            Color::Black => -score,
        }
    }
}

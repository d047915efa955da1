//! Move-generator node counting.

use super::state::Position;
use super::types::Move;

impl Position {
    /// Number of leaf nodes of the legal move tree `depth` plies deep.
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for &m in moves.iter() {
            self.make_move(m);
            nodes += self.perft(depth - 1);
            self.unmake_move(m);
        }
        nodes
    }

    /// Per-root-move breakdown of [`Position::perft`], in generation order.
    pub fn perft_divide(&mut self, depth: usize) -> Vec<(Move, u64)> {
        if depth == 0 {
            return Vec::new();
        }
        let moves = self.legal_moves();
        let mut result = Vec::with_capacity(moves.len());
        for &m in moves.iter() {
            self.make_move(m);
            result.push((m, self.perft(depth - 1)));
            self.unmake_move(m);
        }
        result
    }
}

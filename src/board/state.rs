//! The `Position` type: board state with three synchronized representations.
//!
//! A square array, a bitboard set and per-piece-type square lists all
//! describe the same placement. Only `put_piece`, `remove_piece` and
//! `relocate_piece` touch them, and each updates all three together.

use std::cell::Cell;
use std::fmt;

use super::tables::Tables;
use super::types::{Bitboard, CastlingRights, Color, Move, Piece, Square};

/// Capacity of one piece list: two originals plus eight promoted pawns.
pub(crate) const PIECE_LIST_CAPACITY: usize = 10;

/// Dense list of the squares holding one piece kind of one color.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PieceList {
    squares: [Square; PIECE_LIST_CAPACITY],
    len: u8,
}

impl PieceList {
    const EMPTY: PieceList = PieceList {
        squares: [Square::A1; PIECE_LIST_CAPACITY],
        len: 0,
    };

    #[inline]
    pub(crate) fn as_slice(&self) -> &[Square] {
        &self.squares[..self.len as usize]
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len as usize == PIECE_LIST_CAPACITY
    }
}

/// Irreversible state saved by `make_move`, packed into one word:
/// bits 0-3 castling rights, 4-7 captured piece (0 = none, else index + 1),
/// 8-11 en passant file (8 = none), 12-27 halfmove clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StateWord(u32);

impl StateWord {
    const NO_EP_FILE: u32 = 8;

    pub(crate) fn pack(
        castling: CastlingRights,
        captured: Option<Piece>,
        ep_file: Option<u8>,
        halfmove_clock: u16,
    ) -> Self {
        let captured_code = captured.map_or(0, |p| p.index() as u32 + 1);
        let ep = ep_file.map_or(Self::NO_EP_FILE, u32::from);
        StateWord(
            u32::from(castling.as_u8())
                | (captured_code << 4)
                | (ep << 8)
                | (u32::from(halfmove_clock) << 12),
        )
    }

    pub(crate) fn castling(self) -> CastlingRights {
        CastlingRights::from_u8((self.0 & 0xF) as u8)
    }

    pub(crate) fn captured(self) -> Option<Piece> {
        match (self.0 >> 4) & 0xF {
            0 => None,
            code => Piece::from_index(code as usize - 1),
        }
    }

    pub(crate) fn ep_file(self) -> Option<u8> {
        let file = (self.0 >> 8) & 0xF;
        (file < Self::NO_EP_FILE).then_some(file as u8)
    }

    pub(crate) fn halfmove_clock(self) -> u16 {
        (self.0 >> 12) as u16
    }
}

/// A chess position.
#[derive(Clone)]
pub struct Position {
    pub(crate) tables: &'static Tables,
    pub(crate) squares: [Option<(Color, Piece)>; 64],
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) piece_lists: [[PieceList; 6]; 2],
    /// Index of each occupied square inside its piece list.
    pub(crate) list_index: [u8; 64],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) ep_file: Option<u8>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: u64,
    pub(crate) history: Vec<StateWord>,
    /// Hash of every earlier position of the game, oldest first.
    pub(crate) key_history: Vec<u64>,
    pub(crate) check_memo: Cell<Option<bool>>,
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tables(Tables::global())
    }

    /// The starting position using the given table context.
    #[must_use]
    pub fn with_tables(tables: &'static Tables) -> Self {
        let mut pos = Position::empty(tables);
        for (file, &piece) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            pos.put_piece(Square::from_coords(file, 0), Color::White, piece);
            pos.put_piece(Square::from_coords(file, 1), Color::White, Piece::Pawn);
            pos.put_piece(Square::from_coords(file, 6), Color::Black, Piece::Pawn);
            pos.put_piece(Square::from_coords(file, 7), Color::Black, piece);
        }
        pos.castling = CastlingRights::all();
        pos.hash = pos.compute_hash();
        pos
    }

    /// A board with no pieces, White to move.
    #[must_use]
    pub fn empty(tables: &'static Tables) -> Self {
        Position {
            tables,
            squares: [None; 64],
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            piece_lists: [[PieceList::EMPTY; 6]; 2],
            list_index: [0; 64],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            ep_file: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: Vec::with_capacity(256),
            key_history: Vec::with_capacity(256),
            check_memo: Cell::new(None),
        }
    }

    #[inline]
    pub(crate) fn tables(&self) -> &'static Tables {
        self.tables
    }

    // ---------------------------------------------------------------
    // Representation mutators. Hash and memo are the caller's business.
    // ---------------------------------------------------------------

    pub(crate) fn put_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let (c, p) = (color.index(), piece.index());
        let bit = Bitboard::from(sq);
        self.squares[sq.index()] = Some((color, piece));
        self.pieces[c][p] |= bit;
        self.occupied[c] |= bit;

        let list = &mut self.piece_lists[c][p];
        self.list_index[sq.index()] = list.len;
        list.squares[list.len as usize] = sq;
        list.len += 1;
    }

    pub(crate) fn remove_piece(&mut self, sq: Square) -> Option<(Color, Piece)> {
        let (color, piece) = self.squares[sq.index()].take()?;
        let (c, p) = (color.index(), piece.index());
        let bit = Bitboard::from(sq);
        self.pieces[c][p] ^= bit;
        self.occupied[c] ^= bit;

        // Swap-with-last removal keeps the list dense.
        let list = &mut self.piece_lists[c][p];
        let idx = self.list_index[sq.index()];
        list.len -= 1;
        let last = list.squares[list.len as usize];
        list.squares[idx as usize] = last;
        self.list_index[last.index()] = idx;
        Some((color, piece))
    }

    pub(crate) fn relocate_piece(&mut self, from: Square, to: Square) {
        let Some((color, piece)) = self.squares[from.index()].take() else {
            return;
        };
        let (c, p) = (color.index(), piece.index());
        let bits = Bitboard::from(from) | Bitboard::from(to);
        self.squares[to.index()] = Some((color, piece));
        self.pieces[c][p] ^= bits;
        self.occupied[c] ^= bits;

        let idx = self.list_index[from.index()];
        self.piece_lists[c][p].squares[idx as usize] = to;
        self.list_index[to.index()] = idx;
    }

    /// Put a piece on a square during setup, replacing any occupant.
    /// Keeps the hash in sync. Returns `false` when the piece list is full.
    pub fn place(&mut self, sq: Square, color: Color, piece: Piece) -> bool {
        if self.piece_lists[color.index()][piece.index()].is_full() {
            return false;
        }
        self.clear_square(sq);
        self.put_piece(sq, color, piece);
        self.hash ^= self.tables.zobrist.piece(color, piece, sq);
        self.check_memo.set(None);
        true
    }

    /// Remove whatever stands on `sq` during setup.
    pub fn clear_square(&mut self, sq: Square) -> Option<(Color, Piece)> {
        let removed = self.remove_piece(sq)?;
        self.hash ^= self.tables.zobrist.piece(removed.0, removed.1, sq);
        self.check_memo.set(None);
        Some(removed)
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// File of the en passant target, set only when a capture is possible.
    #[inline]
    #[must_use]
    pub fn ep_file(&self) -> Option<u8> {
        self.ep_file
    }

    /// The square a pawn would capture onto en passant.
    #[inline]
    #[must_use]
    pub fn ep_square(&self) -> Option<Square> {
        let file = self.ep_file?;
        let rank = match self.side_to_move {
            Color::White => 5,
            Color::Black => 2,
        };
        Some(Square::from_coords(file, rank))
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.squares[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces_of_type(&self, piece: Piece) -> Bitboard {
        self.pieces[0][piece.index()] | self.pieces[1][piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.occupied[0] | self.occupied[1]
    }

    /// Squares of every `piece` of `color`, in piece-list order.
    #[inline]
    #[must_use]
    pub fn piece_list(&self, color: Color, piece: Piece) -> &[Square] {
        self.piece_lists[color.index()][piece.index()].as_slice()
    }

    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.piece_list(color, Piece::King).first().copied()
    }

    /// Number of moves made since the position was loaded.
    #[inline]
    #[must_use]
    pub fn game_ply(&self) -> usize {
        self.history.len()
    }

    #[inline]
    #[must_use]
    pub fn moved_piece(&self, m: Move) -> Option<Piece> {
        self.squares[m.from().index()].map(|(_, p)| p)
    }

    /// The piece a move would capture, counting en passant.
    #[inline]
    #[must_use]
    pub fn captured_piece(&self, m: Move) -> Option<Piece> {
        if m.is_en_passant() {
            Some(Piece::Pawn)
        } else if m.is_castle() {
            None
        } else {
            self.squares[m.to().index()].map(|(_, p)| p)
        }
    }

    #[inline]
    #[must_use]
    pub fn is_capture(&self, m: Move) -> bool {
        self.captured_piece(m).is_some()
    }

    /// Captures and promotions.
    #[inline]
    #[must_use]
    pub fn is_tactical(&self, m: Move) -> bool {
        m.is_promotion() || self.is_capture(m)
    }

    // ---------------------------------------------------------------
    // Attacks
    // ---------------------------------------------------------------

    /// Pieces of both colors attacking `sq` given an occupancy.
    #[must_use]
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let t = &self.tables.attacks;
        let diagonal = self.pieces_of_type(Piece::Bishop) | self.pieces_of_type(Piece::Queen);
        let orthogonal = self.pieces_of_type(Piece::Rook) | self.pieces_of_type(Piece::Queen);

        (t.pawn(Color::Black, sq) & self.pieces(Color::White, Piece::Pawn))
            | (t.pawn(Color::White, sq) & self.pieces(Color::Black, Piece::Pawn))
            | (t.knight(sq) & self.pieces_of_type(Piece::Knight))
            | (t.king(sq) & self.pieces_of_type(Piece::King))
            | (t.bishop(sq, occupied) & diagonal)
            | (t.rook(sq, occupied) & orthogonal)
    }

    /// Whether any piece of `by` attacks `sq` on the current board.
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        (self.attackers_to(sq, self.occupied()) & self.occupied_by(by)).any()
    }

    /// Whether the side to move is in check. Memoized until the next
    /// make/unmake.
    #[must_use]
    pub fn in_check(&self) -> bool {
        if let Some(cached) = self.check_memo.get() {
            return cached;
        }
        let us = self.side_to_move;
        let check = self
            .king_square(us)
            .is_some_and(|king| self.is_square_attacked(king, us.opponent()));
        self.check_memo.set(Some(check));
        check
    }

    // ---------------------------------------------------------------
    // Hashing and consistency
    // ---------------------------------------------------------------

    /// Hash recomputed from scratch.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        let z = &self.tables.zobrist;
        let mut hash = 0u64;
        for sq in Square::all() {
            if let Some((color, piece)) = self.squares[sq.index()] {
                hash ^= z.piece(color, piece, sq);
            }
        }
        if let Some(file) = self.ep_file {
            hash ^= z.en_passant(file);
        }
        hash ^= z.castling(self.castling);
        if self.side_to_move == Color::Black {
            hash ^= z.side();
        }
        hash
    }

    /// Check that the three representations agree and the hash is current.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        for color in Color::BOTH {
            for piece in Piece::ALL {
                let bb = self.pieces(color, piece);
                let list = self.piece_list(color, piece);
                if list.len() != bb.popcount() as usize {
                    return false;
                }
                for (idx, &sq) in list.iter().enumerate() {
                    if !bb.contains(sq)
                        || self.squares[sq.index()] != Some((color, piece))
                        || self.list_index[sq.index()] as usize != idx
                    {
                        return false;
                    }
                }
                match color {
                    Color::White => white |= bb,
                    Color::Black => black |= bb,
                }
            }
        }
        let array_count = self.squares.iter().filter(|s| s.is_some()).count();
        white == self.occupied[0]
            && black == self.occupied[1]
            && (white & black).is_empty()
            && array_count == self.occupied().popcount() as usize
            && self.hash == self.compute_hash()
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("hash", &format_args!("{:#018x}", self.hash))
            .finish()
    }
}

impl fmt::Display for Position {
    /// Board diagram, rank 8 first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = match self.squares[Square::from_coords(file, rank).index()] {
                    Some((color, piece)) => piece.to_fen_char(color),
                    None => '.',
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")
    }
}

//! FEN import/export and coordinate move parsing.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::state::Position;
use super::tables::Tables;
use super::types::{CastlingRights, Color, Move, Piece, Square};

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Parse a position from FEN notation using the global tables.
    ///
    /// Halfmove and fullmove counters are optional and default to 0 and 1.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        Self::try_from_fen_with_tables(fen, Tables::global())
    }

    /// Parse a position from FEN notation with an injected table context.
    pub fn try_from_fen_with_tables(fen: &str, tables: &'static Tables) -> Result<Self, FenError> {
        let mut pos = Position::empty(tables);
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        parse_placement(&mut pos, parts[0])?;

        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        pos.castling = parse_castling(&pos, parts[2])?;

        if parts[3] != "-" {
            let ep: Square = parts[3].parse().map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?;
            let expected_rank = match pos.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if ep.rank() != expected_rank {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            // Kept only when it can actually be used, so equal positions hash equally.
            if pos.ep_capture_possible(ep) {
                pos.ep_file = Some(ep.file());
            }
        }

        pos.halfmove_clock = parse_counter(parts.get(4), 0)?;
        pos.fullmove_number = parse_counter(parts.get(5), 1)?.max(1);

        pos.hash = pos.compute_hash();
        Ok(pos)
    }

    /// Convert the position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        for (color, kingside, c) in [
            (Color::White, true, 'K'),
            (Color::White, false, 'Q'),
            (Color::Black, true, 'k'),
            (Color::Black, false, 'q'),
        ] {
            if self.castling.has(color, kingside) {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = self
            .ep_square()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Resolve coordinate notation ("e2e4", "e7e8q") against the legal moves.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        let text = text.trim();
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(MoveParseError::InvalidLength { len: text.len() });
        }

        let invalid_square = || MoveParseError::InvalidSquare {
            notation: text.to_string(),
        };
        let from: Square = text[0..2].parse().map_err(|_| invalid_square())?;
        let to: Square = text[2..4].parse().map_err(|_| invalid_square())?;

        let promotion = match text[4..].chars().next() {
            Some(c) => match Piece::from_char(c) {
                Some(p @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)) => Some(p),
                _ => return Err(MoveParseError::InvalidPromotion { char: c }),
            },
            None => None,
        };

        self.legal_moves()
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promotion)
            .ok_or_else(|| MoveParseError::IllegalMove {
                notation: text.to_string(),
            })
    }

    /// Parse a coordinate move and make it in one call.
    pub fn make_move_text(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(text)?;
        self.make_move(mv);
        Ok(mv)
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::try_from_fen(s)
    }
}

fn parse_placement(pos: &mut Position, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidRankCount { found: ranks.len() });
    }
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
                if file > 8 {
                    return Err(FenError::TooManyFiles {
                        rank: rank_idx,
                        files: file,
                    });
                }
                continue;
            }
            let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
            if file >= 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_idx,
                    files: file + 1,
                });
            }
            let color = if c.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            if !pos.place(Square::from_coords(file as u8, rank), color, piece) {
                return Err(FenError::TooManyPieces { char: c });
            }
            file += 1;
        }
    }
    Ok(())
}

/// Castling letters count only when king and rook stand on their home squares.
fn parse_castling(pos: &Position, field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::none();
    if field == "-" {
        return Ok(rights);
    }
    for c in field.chars() {
        let (color, kingside) = match c {
            'K' => (Color::White, true),
            'Q' => (Color::White, false),
            'k' => (Color::Black, true),
            'q' => (Color::Black, false),
            _ => return Err(FenError::InvalidCastling { char: c }),
        };
        let rank = color.back_rank();
        let king_home = Square::from_coords(4, rank);
        let rook_home = Square::from_coords(if kingside { 7 } else { 0 }, rank);
        if pos.piece_at(king_home) == Some((color, Piece::King))
            && pos.piece_at(rook_home) == Some((color, Piece::Rook))
        {
            rights.set(color, kingside);
        } else {
            log::debug!("ignoring castling right '{c}': king or rook not on its home square");
        }
    }
    Ok(rights)
}

fn parse_counter(field: Option<&&str>, default: u16) -> Result<u16, FenError> {
    match field {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| FenError::InvalidCounter {
            found: (*text).to_string(),
        }),
    }
}

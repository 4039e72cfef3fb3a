//! Hot-seat chess-lite. Moves are pseudo-legal: no check, castling, en
//! passant or promotion. Taking the king ends the game.

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

/// (row, col); row 0 is Black's back rank.
pub type Square = (usize, usize);
pub type ChessBoard = [[Option<Piece>; 8]; 8];

const KNIGHT: [(i32, i32); 8] = [(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)];
const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ALL_DIRECTIONS: [(i32, i32); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)];

pub fn start_board() -> ChessBoard {
    use PieceKind::*;
    let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
    let mut board: ChessBoard = [[None; 8]; 8];
    for col in 0..8 {
        board[0][col] = Some(Piece { kind: back[col], color: Color::Black });
        board[1][col] = Some(Piece { kind: Pawn, color: Color::Black });
        board[6][col] = Some(Piece { kind: Pawn, color: Color::White });
        board[7][col] = Some(Piece { kind: back[col], color: Color::White });
    }
    board
}

fn offset(square: Square, dr: i32, dc: i32) -> Option<Square> {
    let r = square.0 as i32 + dr;
    let c = square.1 as i32 + dc;
    if (0..8).contains(&r) && (0..8).contains(&c) {
        Some((r as usize, c as usize))
    } else {
        None
    }
}

fn at(board: &ChessBoard, square: Square) -> Option<Piece> {
    board[square.0][square.1]
}

/// Pseudo-legal destinations for the piece on `from`.
pub fn moves_from(board: &ChessBoard, from: Square) -> Vec<Square> {
    let piece = match at(board, from) {
        Some(piece) => piece,
        None => return Vec::new(),
    };
    let enemy_or_empty = |sq: Square| at(board, sq).map_or(true, |p| p.color != piece.color);
    let mut out = Vec::new();

    match piece.kind {
        PieceKind::Pawn => {
            let (dir, start_row) = match piece.color {
                Color::White => (-1, 6),
                Color::Black => (1, 1),
            };
            if let Some(one) = offset(from, dir, 0).filter(|sq| at(board, *sq).is_none()) {
                out.push(one);
                if from.0 == start_row {
                    if let Some(two) = offset(from, 2 * dir, 0).filter(|sq| at(board, *sq).is_none()) {
                        out.push(two);
                    }
                }
            }
            for dc in [-1, 1] {
                if let Some(sq) = offset(from, dir, dc) {
                    if at(board, sq).map_or(false, |p| p.color != piece.color) {
                        out.push(sq);
                    }
                }
            }
        }
        PieceKind::Knight | PieceKind::King => {
            let steps: &[(i32, i32)] = if piece.kind == PieceKind::Knight { &KNIGHT } else { &ALL_DIRECTIONS };
            for &(dr, dc) in steps {
                if let Some(sq) = offset(from, dr, dc).filter(|sq| enemy_or_empty(*sq)) {
                    out.push(sq);
                }
            }
        }
        PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen => {
            let rays: &[(i32, i32)] = match piece.kind {
                PieceKind::Rook => &ORTHOGONAL,
                PieceKind::Bishop => &DIAGONAL,
                _ => &ALL_DIRECTIONS,
            };
            for &(dr, dc) in rays {
                let mut cursor = from;
                while let Some(sq) = offset(cursor, dr, dc) {
                    match at(board, sq) {
                        None => out.push(sq),
                        Some(p) => {
                            if p.color != piece.color {
                                out.push(sq);
                            }
                            break;
                        }
                    }
                    cursor = sq;
                }
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChessInput {
    Start,
    Move { from: Square, to: Square },
}

#[derive(Debug, Clone)]
pub struct ChessGame {
    phase: Phase,
    board: ChessBoard,
    turn: Color,
    winner: Option<Color>,
    score: i64,
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessGame {
    pub fn new() -> Self {
        Self {
            phase: Phase::Menu,
            board: start_board(),
            turn: Color::White,
            winner: None,
            score: 0,
        }
    }

    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    fn play(&mut self, from: Square, to: Square) -> Transition {
        if from.0 >= 8 || from.1 >= 8 {
            return Transition::Ignored;
        }
        let piece = match at(&self.board, from) {
            Some(piece) if piece.color == self.turn => piece,
            _ => return Transition::Ignored,
        };
        if !moves_from(&self.board, from).contains(&to) {
            return Transition::Ignored;
        }

        let captured = at(&self.board, to);
        self.board[to.0][to.1] = Some(piece);
        self.board[from.0][from.1] = None;

        if captured.map_or(false, |p| p.kind == PieceKind::King) {
            self.winner = Some(self.turn);
            self.score = 1;
            self.phase = Phase::GameOver;
            return Transition::Finished(SessionResult::new(GameType::Chess, self.score));
        }

        self.turn = self.turn.other();
        Transition::Updated
    }
}

impl GameSession for ChessGame {
    type Input = ChessInput;

    fn game_type(&self) -> GameType {
        GameType::Chess
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: ChessInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, ChessInput::Start) => {
                self.board = start_board();
                self.turn = Color::White;
                self.winner = None;
                self.score = 0;
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, ChessInput::Move { from, to }) => self.play(from, to),
            _ => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> ChessGame {
        let mut game = ChessGame::new();
        game.handle(ChessInput::Start);
        game
    }

    #[test]
    fn test_opening_move_counts() {
        let board = start_board();
        let total: usize = (0..8)
            .flat_map(|r| (0..8).map(move |c| (r, c)))
            .filter(|&sq| at(&board, sq).map_or(false, |p| p.color == Color::White))
            .map(|sq| moves_from(&board, sq).len())
            .sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = started();
        assert!(game.handle(ChessInput::Move { from: (1, 4), to: (3, 4) }).is_ignored());
        assert_eq!(game.handle(ChessInput::Move { from: (6, 4), to: (4, 4) }), Transition::Updated);
        assert_eq!(game.turn(), Color::Black);
        assert!(game.handle(ChessInput::Move { from: (6, 3), to: (4, 3) }).is_ignored());
    }

    #[test]
    fn test_illegal_destination_is_ignored() {
        let mut game = started();
        assert!(game.handle(ChessInput::Move { from: (7, 0), to: (5, 0) }).is_ignored());
        assert!(game.handle(ChessInput::Move { from: (6, 0), to: (3, 0) }).is_ignored());
        assert!(game.handle(ChessInput::Move { from: (8, 0), to: (3, 0) }).is_ignored());
    }

    #[test]
    fn test_king_capture_ends_game() {
        let mut game = started();
        // e4 f5, Qh5 a5, Qxe8: the f7 pawn no longer shields the king.
        let opening = [
            ((6, 4), (4, 4)),
            ((1, 5), (3, 5)),
            ((7, 3), (3, 7)),
            ((1, 0), (3, 0)),
        ];
        for (from, to) in opening {
            assert_eq!(game.handle(ChessInput::Move { from, to }), Transition::Updated);
        }

        let result = game
            .handle(ChessInput::Move { from: (3, 7), to: (0, 4) })
            .result()
            .unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(game.winner(), Some(Color::White));
        assert!(game.handle(ChessInput::Move { from: (1, 1), to: (2, 1) }).is_ignored());
    }
}

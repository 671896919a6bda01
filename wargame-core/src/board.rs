//! Square board geometry with (row, col) coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default board dimension (cells per side)
pub const DEFAULT_DIM: i8 = 5;

/// Largest board whose cells can still be named (one hex digit per column)
pub const MAX_DIM: i8 = 16;

/// Smallest board that fits the initial deployment
pub const MIN_DIM: i8 = 3;

const ROW_LABELS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const COL_LABELS: &[u8; 16] = b"0123456789abcdef";

/// Characters ignored when parsing coordinate text
const SEPARATORS: [char; 7] = [' ', ',', '.', ':', ';', '-', '_'];

/// Orthogonal direction vectors (drow, dcol)
/// Index: 0=up, 1=left, 2=down, 3=right
pub const DIRECTIONS: [(i8, i8); 4] = [
    (-1, 0), // up
    (0, -1), // left
    (1, 0),  // down
    (0, 1),  // right
];

/// Board cell coordinate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this coordinate lies on a `dim × dim` board
    pub fn is_valid(&self, dim: i8) -> bool {
        (0..dim).contains(&self.row) && (0..dim).contains(&self.col)
    }

    /// Manhattan distance between two coordinates
    pub fn manhattan_distance(&self, other: Coord) -> i32 {
        (i32::from(self.row) - i32::from(other.row)).abs()
            + (i32::from(self.col) - i32::from(other.col)).abs()
    }

    /// Get neighbor in direction (0-3)
    pub fn neighbor(&self, direction: usize) -> Coord {
        let (dr, dc) = DIRECTIONS[direction % 4];
        Coord::new(self.row + dr, self.col + dc)
    }

    /// The four orthogonal neighbors: up, left, down, right.
    /// Off-board neighbors are included; callers filter them.
    pub fn adjacent(&self) -> [Coord; 4] {
        [
            self.neighbor(0),
            self.neighbor(1),
            self.neighbor(2),
            self.neighbor(3),
        ]
    }

    /// Iterate the square of radius `dist` centered here, row-major, center included
    pub fn iter_range(&self, dist: i8) -> impl Iterator<Item = Coord> {
        let center = *self;
        (center.row - dist..=center.row + dist).flat_map(move |row| {
            (center.col - dist..=center.col + dist).map(move |col| Coord::new(row, col))
        })
    }

    /// Row letter, `?` when outside A-Z
    pub fn row_label(&self) -> char {
        usize::try_from(self.row)
            .ok()
            .and_then(|r| ROW_LABELS.get(r))
            .map_or('?', |&b| b as char)
    }

    /// Column hex digit, `?` when outside 0-f
    pub fn col_label(&self) -> char {
        usize::try_from(self.col)
            .ok()
            .and_then(|c| COL_LABELS.get(c))
            .map_or('?', |&b| b as char)
    }

    /// Parse text such as `D2` or `d 2`. Returns None for anything malformed.
    pub fn parse(s: &str) -> Option<Coord> {
        let chars = strip_separators(s);
        match chars.as_slice() {
            [row, col] => parse_pair(*row, *col),
            _ => None,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.col_label())
    }
}

/// A move (source, destination), or a rectangular area via its two corners.
/// A move whose destination equals its source is a self-destruct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub src: Coord,
    pub dst: Coord,
}

impl Move {
    pub const fn new(src: Coord, dst: Coord) -> Self {
        Self { src, dst }
    }

    pub const fn from_quad(row0: i8, col0: i8, row1: i8, col1: i8) -> Self {
        Self::new(Coord::new(row0, col0), Coord::new(row1, col1))
    }

    /// Area covering a whole `dim × dim` board
    pub const fn from_dim(dim: i8) -> Self {
        Self::from_quad(0, 0, dim - 1, dim - 1)
    }

    pub fn is_self_destruct(&self) -> bool {
        self.src == self.dst
    }

    /// Iterate the cells of the rectangle spanned by src and dst, row-major
    pub fn iter_rectangle(&self) -> impl Iterator<Item = Coord> {
        let (src, dst) = (self.src, self.dst);
        (src.row..=dst.row)
            .flat_map(move |row| (src.col..=dst.col).map(move |col| Coord::new(row, col)))
    }

    /// Parse text such as `A3B2`, `a3 b2` or `A3-B2`
    pub fn parse(s: &str) -> Option<Move> {
        let chars = strip_separators(s);
        match chars.as_slice() {
            [r0, c0, r1, c1] => Some(Move::new(parse_pair(*r0, *c0)?, parse_pair(*r1, *c1)?)),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.src, self.dst)
    }
}

fn strip_separators(s: &str) -> Vec<char> {
    s.trim().chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

fn parse_pair(row: char, col: char) -> Option<Coord> {
    let row = ROW_LABELS
        .iter()
        .position(|&b| b as char == row.to_ascii_uppercase())?;
    let col = COL_LABELS
        .iter()
        .position(|&b| b as char == col.to_ascii_lowercase())?;
    Some(Coord::new(row as i8, col as i8))
}

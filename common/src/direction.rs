use std::fmt::Display;

use util::pos::Diff;

/// One of the eight compass directions a word can run along. A word placed
/// at position `P` in direction `D` occupies `P`, `P + D`, ...,
/// `P + (len - 1) * D`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Direction {
  Up,
  UpRight,
  Right,
  DownRight,
  Down,
  DownLeft,
  Left,
  UpLeft,
}

impl Direction {
  pub const COUNT: usize = 8;

  pub const ALL: [Direction; Self::COUNT] = [
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
    Direction::DownRight,
    Direction::Down,
    Direction::DownLeft,
    Direction::Left,
    Direction::UpLeft,
  ];

  /// The row/col delta of one step along this direction.
  pub const fn diff(self) -> Diff {
    match self {
      Direction::Up => Diff { row: -1, col: 0 },
      Direction::UpRight => Diff { row: -1, col: 1 },
      Direction::Right => Diff { row: 0, col: 1 },
      Direction::DownRight => Diff { row: 1, col: 1 },
      Direction::Down => Diff { row: 1, col: 0 },
      Direction::DownLeft => Diff { row: 1, col: -1 },
      Direction::Left => Diff { row: 0, col: -1 },
      Direction::UpLeft => Diff { row: -1, col: -1 },
    }
  }

  /// Horizontal wire component (`h` in the placement wire form).
  pub const fn h(self) -> i32 {
    self.diff().col
  }

  /// Vertical wire component (`v` in the placement wire form).
  pub const fn v(self) -> i32 {
    self.diff().row
  }

  /// Index into fixed 8-entry per-direction arrays.
  pub const fn index(self) -> usize {
    self as usize
  }

  pub fn from_components(h: i32, v: i32) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|direction| direction.h() == h && direction.v() == v)
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Direction::Up => "up",
        Direction::UpRight => "up-right",
        Direction::Right => "right",
        Direction::DownRight => "down-right",
        Direction::Down => "down",
        Direction::DownLeft => "down-left",
        Direction::Left => "left",
        Direction::UpLeft => "up-left",
      }
    )
  }
}

use std::{
  fmt::Display,
  ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

/// A cell position on a board, 0-indexed from the top-left corner.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Pos {
  pub row: i32,
  pub col: i32,
}

impl Pos {
  pub const fn zero() -> Self {
    Self { row: 0, col: 0 }
  }
}

impl Sub for Pos {
  type Output = Diff;

  fn sub(self, rhs: Self) -> Diff {
    Diff {
      row: self.row - rhs.row,
      col: self.col - rhs.col,
    }
  }
}

impl Sub<Diff> for Pos {
  type Output = Self;

  fn sub(self, rhs: Diff) -> Self {
    Self {
      row: self.row - rhs.row,
      col: self.col - rhs.col,
    }
  }
}

impl SubAssign<Diff> for Pos {
  fn sub_assign(&mut self, rhs: Diff) {
    self.row -= rhs.row;
    self.col -= rhs.col;
  }
}

impl Add<Diff> for Pos {
  type Output = Self;

  fn add(self, rhs: Diff) -> Self {
    Self {
      row: self.row + rhs.row,
      col: self.col + rhs.col,
    }
  }
}

impl AddAssign<Diff> for Pos {
  fn add_assign(&mut self, rhs: Diff) {
    self.row += rhs.row;
    self.col += rhs.col;
  }
}

impl Display for Pos {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

/// A row/col displacement, e.g. one step along a word direction.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Diff {
  pub row: i32,
  pub col: i32,
}

impl Add for Diff {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self {
      row: self.row + rhs.row,
      col: self.col + rhs.col,
    }
  }
}

impl Mul<Diff> for i32 {
  type Output = Diff;

  fn mul(self, rhs: Diff) -> Diff {
    Diff {
      row: self * rhs.row,
      col: self * rhs.col,
    }
  }
}

impl Mul<i32> for Diff {
  type Output = Diff;

  fn mul(self, rhs: i32) -> Self {
    Self {
      row: self.row * rhs,
      col: self.col * rhs,
    }
  }
}

impl Neg for Diff {
  type Output = Diff;

  fn neg(self) -> Self::Output {
    Self {
      row: -self.row,
      col: -self.col,
    }
  }
}

impl Display for Diff {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

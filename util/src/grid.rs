use std::fmt::{Debug, Display};

use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
  error::{WordSearchError, WsResult},
  pos::Pos,
};

/// A rectangular grid backed by a flat row-major `Vec`.
///
/// Serializes as a list of rows, which is the shape the board wire format
/// uses for its letter matrix.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid<T> {
  grid: Vec<T>,
  rows: u32,
  cols: u32,
}

impl<T> Grid<T> {
  pub fn from_vec(grid: Vec<T>, rows: u32, cols: u32) -> WsResult<Self> {
    let expected_size = rows as usize * cols as usize;
    if grid.len() != expected_size {
      return Err(
        WordSearchError::Internal(format!(
          "Expected grid.len() == expected_size, {} != {expected_size}",
          grid.len()
        ))
        .into(),
      );
    }

    Ok(Self { grid, rows, cols })
  }

  pub fn rows(&self) -> u32 {
    self.rows
  }

  pub fn cols(&self) -> u32 {
    self.cols
  }

  pub fn in_bounds(&self, pos: Pos) -> bool {
    pos.row >= 0 && pos.row < self.rows as i32 && pos.col >= 0 && pos.col < self.cols as i32
  }

  fn idx(&self, pos: Pos) -> usize {
    debug_assert!(self.in_bounds(pos));
    pos.col as usize + pos.row as usize * self.cols as usize
  }

  pub fn get(&self, pos: Pos) -> Option<&T> {
    self
      .in_bounds(pos)
      .then(|| self.grid.get(self.idx(pos)))
      .flatten()
  }

  pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
    self
      .in_bounds(pos)
      .then(|| {
        let index = self.idx(pos);
        self.grid.get_mut(index)
      })
      .flatten()
  }

  pub fn positions(&self) -> impl Iterator<Item = Pos> {
    let cols = self.cols;
    (0..self.rows as i32).flat_map(move |row| (0..cols as i32).map(move |col| Pos { row, col }))
  }

  pub fn iter_row<'a, 'b>(&'a self, row: u32) -> impl Iterator<Item = &'b T>
  where
    'a: 'b,
    T: 'a,
  {
    let row = row as i32;
    (0..self.cols).flat_map(move |col| self.get(Pos { row, col: col as i32 }))
  }

  pub fn map<F, U>(&self, f: F) -> Grid<U>
  where
    F: FnMut(&T) -> U,
  {
    Grid {
      grid: self.grid.iter().map(f).collect(),
      rows: self.rows,
      cols: self.cols,
    }
  }
}

impl<T> Grid<T>
where
  T: Default,
{
  pub fn new(rows: u32, cols: u32) -> Self {
    Self {
      grid: (0..rows as usize * cols as usize).map(|_| T::default()).collect(),
      rows,
      cols,
    }
  }
}

impl<T: Debug> Debug for Grid<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    (0..self.rows).try_fold((), |_, row| {
      self.iter_row(row).try_fold((), |_, t| write!(f, "{t:?} "))?;
      writeln!(f)
    })
  }
}

impl<T: Display> Display for Grid<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    (0..self.rows).try_fold((), |_, row| {
      self.iter_row(row).try_fold((), |_, t| write!(f, "{t} "))?;
      writeln!(f)
    })
  }
}

impl<T: Serialize> Serialize for Grid<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(self.rows as usize))?;
    for row in 0..self.rows {
      seq.serialize_element(&self.iter_row(row).collect::<Vec<_>>())?;
    }
    seq.end()
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Grid<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let row_vecs: Vec<Vec<T>> = Vec::deserialize(deserializer)?;
    let rows = row_vecs.len() as u32;
    let cols = row_vecs.first().map_or(0, |row| row.len()) as u32;
    let mut grid = Vec::with_capacity(rows as usize * cols as usize);
    for row in row_vecs {
      if row.len() as u32 != cols {
        return Err(de::Error::custom(format!(
          "Grid row lengths differ: {} vs {cols}",
          row.len()
        )));
      }
      grid.extend(row);
    }
    Ok(Self { grid, rows, cols })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;

  use crate::pos::Pos;

  use super::Grid;

  #[gtest]
  fn test_from_vec_checks_size() {
    expect_that!(Grid::from_vec(vec![1, 2, 3], 2, 2), err(anything()));
    expect_that!(Grid::from_vec(vec![1, 2, 3, 4], 2, 2), ok(anything()));
  }

  #[gtest]
  fn test_get_in_bounds() {
    let grid = Grid::from_vec(vec!['a', 'b', 'c', 'd', 'e', 'f'], 2, 3).unwrap();
    expect_that!(grid.get(Pos { row: 0, col: 2 }), some(eq(&'c')));
    expect_that!(grid.get(Pos { row: 1, col: 0 }), some(eq(&'d')));
    expect_that!(grid.get(Pos { row: 2, col: 0 }), none());
    expect_that!(grid.get(Pos { row: 0, col: -1 }), none());
  }

  #[gtest]
  fn test_positions_row_major() {
    let grid: Grid<u8> = Grid::new(2, 2);
    expect_that!(
      grid.positions().collect::<Vec<_>>(),
      container_eq([
        Pos::zero(),
        Pos { row: 0, col: 1 },
        Pos { row: 1, col: 0 },
        Pos { row: 1, col: 1 },
      ])
    );
  }

  #[gtest]
  fn test_serializes_as_rows() {
    let grid = Grid::from_vec(vec!['a', 'b', 'c', 'd'], 2, 2).unwrap();
    let json = serde_json::to_value(&grid).unwrap();
    expect_eq!(json, serde_json::json!([["a", "b"], ["c", "d"]]));
  }

  #[gtest]
  fn test_round_trip() {
    let grid = Grid::from_vec(vec![1, 2, 3, 4, 5, 6], 3, 2).unwrap();
    let json = serde_json::to_string(&grid).unwrap();
    let decoded: Grid<i32> = serde_json::from_str(&json).unwrap();
    expect_true!(decoded == grid);
  }

  #[gtest]
  fn test_rejects_ragged_rows() {
    let decoded: Result<Grid<i32>, _> = serde_json::from_str("[[1, 2], [3]]");
    expect_that!(decoded, err(anything()));
  }
}

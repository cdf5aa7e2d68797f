use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use util::{grid::Grid, pos::Pos};

use crate::direction::Direction;

/// Placeholder letter for a cell no word covers yet. Never present in a
/// finished board.
pub const BLANK: char = '\0';

/// A word committed to the board: its text, start cell, and direction.
///
/// Wire form is `{ word, row, col, h, v }` with `h`/`v` the -1/0/1
/// direction components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WordPlacementWire", into = "WordPlacementWire")]
pub struct WordPlacement {
  pub word: String,
  pub start: Pos,
  pub direction: Direction,
}

impl WordPlacement {
  /// The cells this placement covers, in word order.
  pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
    let len = self.word.chars().count() as i32;
    (0..len).map(|i| self.start + i * self.direction.diff())
  }
}

#[derive(Clone, Serialize, Deserialize)]
struct WordPlacementWire {
  word: String,
  row: i32,
  col: i32,
  h: i32,
  v: i32,
}

impl From<WordPlacement> for WordPlacementWire {
  fn from(placement: WordPlacement) -> Self {
    Self {
      row: placement.start.row,
      col: placement.start.col,
      h: placement.direction.h(),
      v: placement.direction.v(),
      word: placement.word,
    }
  }
}

impl TryFrom<WordPlacementWire> for WordPlacement {
  type Error = String;

  fn try_from(wire: WordPlacementWire) -> Result<Self, String> {
    let direction = Direction::from_components(wire.h, wire.v)
      .ok_or_else(|| format!("Invalid direction components ({}, {})", wire.h, wire.v))?;
    Ok(Self {
      word: wire.word,
      start: Pos {
        row: wire.row,
        col: wire.col,
      },
      direction,
    })
  }
}

/// Immutable result of a generation run: the final letter grid plus the
/// placements that produced it.
///
/// The gameplay fields (`difficulty_index`, `found_words`,
/// `letter_hints_used`) belong to later play sessions; the generator only
/// ever emits their defaults, and the wire form omits them when they hold
/// those defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
  pub rows: u32,
  pub cols: u32,
  pub words: Vec<String>,
  pub board_characters: Grid<char>,
  pub word_placements: Vec<WordPlacement>,
  #[serde(
    default = "default_difficulty_index",
    skip_serializing_if = "is_default_difficulty_index"
  )]
  pub difficulty_index: i32,
  #[serde(default, skip_serializing_if = "HashSet::is_empty")]
  pub found_words: HashSet<String>,
  #[serde(default, skip_serializing_if = "HashSet::is_empty")]
  pub letter_hints_used: HashSet<char>,
}

fn default_difficulty_index() -> i32 {
  -1
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_default_difficulty_index(difficulty_index: &i32) -> bool {
  *difficulty_index == -1
}

impl Board {
  pub fn new(
    rows: u32,
    cols: u32,
    words: Vec<String>,
    board_characters: Grid<char>,
    word_placements: Vec<WordPlacement>,
  ) -> Self {
    Self {
      rows,
      cols,
      words,
      board_characters,
      word_placements,
      difficulty_index: default_difficulty_index(),
      found_words: HashSet::new(),
      letter_hints_used: HashSet::new(),
    }
  }

  pub fn letter(&self, pos: Pos) -> Option<char> {
    self.board_characters.get(pos).copied()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use std::collections::HashSet;

  use googletest::prelude::*;
  use util::{grid::Grid, pos::Pos};

  use crate::direction::Direction;

  use super::{Board, WordPlacement};

  fn small_board() -> Board {
    let letters = Grid::from_vec(vec!['c', 'a', 't', 'x'], 2, 2).unwrap();
    Board::new(
      2,
      2,
      vec!["ca".to_owned()],
      letters,
      vec![WordPlacement {
        word: "ca".to_owned(),
        start: Pos::zero(),
        direction: Direction::Right,
      }],
    )
  }

  #[gtest]
  fn test_placement_cells_follow_direction() {
    let placement = WordPlacement {
      word: "cat".to_owned(),
      start: Pos { row: 2, col: 2 },
      direction: Direction::UpLeft,
    };
    expect_that!(
      placement.cells().collect::<Vec<_>>(),
      container_eq([
        Pos { row: 2, col: 2 },
        Pos { row: 1, col: 1 },
        Pos::zero(),
      ])
    );
  }

  #[gtest]
  fn test_encodes_stable_wire_shape() {
    let json = serde_json::to_value(small_board()).unwrap();
    expect_eq!(
      json,
      serde_json::json!({
        "rows": 2,
        "cols": 2,
        "words": ["ca"],
        "boardCharacters": [["c", "a"], ["t", "x"]],
        "wordPlacements": [{ "word": "ca", "row": 0, "col": 0, "h": 1, "v": 0 }],
      })
    );
  }

  #[gtest]
  fn test_encoding_omits_default_gameplay_fields() {
    let json = serde_json::to_value(small_board()).unwrap();
    let object = json.as_object().unwrap();
    expect_false!(object.contains_key("difficultyIndex"));
    expect_false!(object.contains_key("foundWords"));
    expect_false!(object.contains_key("letterHintsUsed"));
  }

  #[gtest]
  fn test_decoding_defaults_absent_optional_fields() {
    let board: Board = serde_json::from_value(serde_json::json!({
      "rows": 1,
      "cols": 1,
      "words": [],
      "boardCharacters": [["z"]],
      "wordPlacements": [],
    }))
    .unwrap();
    expect_eq!(board.difficulty_index, -1);
    expect_true!(board.found_words.is_empty());
    expect_true!(board.letter_hints_used.is_empty());
  }

  #[gtest]
  fn test_round_trip_with_gameplay_state() {
    let mut board = small_board();
    board.difficulty_index = 2;
    board.found_words = HashSet::from(["ca".to_owned()]);
    board.letter_hints_used = HashSet::from(['c']);

    let json = serde_json::to_string(&board).unwrap();
    let decoded: Board = serde_json::from_str(&json).unwrap();
    expect_true!(decoded == board);
  }

  #[gtest]
  fn test_round_trip_treats_empty_and_absent_as_equivalent() {
    let board = small_board();
    let mut json = serde_json::to_value(&board).unwrap();
    let object = json.as_object_mut().unwrap();
    object.insert("foundWords".to_owned(), serde_json::json!([]));
    object.insert("letterHintsUsed".to_owned(), serde_json::json!([]));

    let decoded: Board = serde_json::from_value(json).unwrap();
    expect_true!(decoded == board);
  }

  #[gtest]
  fn test_rejects_invalid_direction_components() {
    let decoded: Result<WordPlacement, _> = serde_json::from_value(serde_json::json!({
      "word": "ca", "row": 0, "col": 0, "h": 0, "v": 0,
    }));
    expect_that!(decoded, err(anything()));
  }
}

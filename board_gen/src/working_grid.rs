use common::{
  board::{WordPlacement, BLANK},
  direction::Direction,
};
use util::{
  error::{WordSearchError, WsResult},
  grid::Grid,
  pos::Pos,
};

/// A letter a crossing word requires at a cell, recorded as the offset of
/// the letter along the crossing word's direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterRequirement {
  pub offset: u32,
  pub letter: char,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
  letter: char,
  can_place: [bool; Direction::COUNT],
  max_run_length: [u32; Direction::COUNT],
  letter_requirements: [Vec<LetterRequirement>; Direction::COUNT],
}

impl Cell {
  fn at(pos: Pos, rows: u32, cols: u32) -> Self {
    let mut can_place = [false; Direction::COUNT];
    let mut max_run_length = [0; Direction::COUNT];
    for direction in Direction::ALL {
      let run = run_to_edge(pos, direction, rows, cols);
      max_run_length[direction.index()] = run;
      can_place[direction.index()] = run >= 2;
    }
    Self {
      letter: BLANK,
      can_place,
      max_run_length,
      letter_requirements: Default::default(),
    }
  }

  pub fn letter(&self) -> char {
    self.letter
  }

  pub fn can_place(&self, direction: Direction) -> bool {
    self.can_place[direction.index()]
  }

  pub fn max_run_length(&self, direction: Direction) -> u32 {
    self.max_run_length[direction.index()]
  }

  pub fn letter_requirements(&self, direction: Direction) -> &[LetterRequirement] {
    &self.letter_requirements[direction.index()]
  }
}

/// Cells a word run from `pos` along `direction` can cover before leaving
/// the grid.
fn run_to_edge(pos: Pos, direction: Direction, rows: u32, cols: u32) -> u32 {
  let diff = direction.diff();
  let row_extent = match diff.row {
    row if row < 0 => pos.row + 1,
    0 => i32::MAX,
    _ => rows as i32 - pos.row,
  };
  let col_extent = match diff.col {
    col if col < 0 => pos.col + 1,
    0 => i32::MAX,
    _ => cols as i32 - pos.col,
  };
  row_extent.min(col_extent).max(0) as u32
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum UndoEdit {
  LetterChanged { pos: Pos, old_letter: char },
  CanPlaceChanged {
    pos: Pos,
    direction: Direction,
    old_value: bool,
  },
  MaxRunLengthChanged {
    pos: Pos,
    direction: Direction,
    old_value: u32,
  },
  LetterRequirementAdded { pos: Pos, direction: Direction },
}

/// Mutable placement state for one attempt: a grid of cells plus a
/// generation-scoped undo log.
///
/// Every mutation inside an open generation records the prior value, so a
/// failed placement decision rolls back in time proportional to the edits
/// it made, not to grid size. Generations must be rolled back or committed
/// in reverse order of opening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingGrid {
  cells: Grid<Cell>,
  placements: Vec<WordPlacement>,
  undo_log: Vec<Vec<UndoEdit>>,
}

impl WorkingGrid {
  pub fn new(rows: u32, cols: u32) -> WsResult<Self> {
    let cells = (0..rows as i32)
      .flat_map(|row| (0..cols as i32).map(move |col| Cell::at(Pos { row, col }, rows, cols)))
      .collect();
    Ok(Self {
      cells: Grid::from_vec(cells, rows, cols)?,
      placements: Vec::new(),
      undo_log: Vec::new(),
    })
  }

  pub fn rows(&self) -> u32 {
    self.cells.rows()
  }

  pub fn cols(&self) -> u32 {
    self.cells.cols()
  }

  pub fn cell(&self, pos: Pos) -> Option<&Cell> {
    self.cells.get(pos)
  }

  pub fn letter(&self, pos: Pos) -> Option<char> {
    self.cells.get(pos).map(Cell::letter)
  }

  pub fn can_place(&self, pos: Pos, direction: Direction) -> bool {
    self
      .cells
      .get(pos)
      .is_some_and(|cell| cell.can_place(direction))
  }

  pub fn max_run_length(&self, pos: Pos, direction: Direction) -> u32 {
    self
      .cells
      .get(pos)
      .map_or(0, |cell| cell.max_run_length(direction))
  }

  pub fn positions(&self) -> impl Iterator<Item = Pos> {
    self.cells.positions()
  }

  pub fn placements(&self) -> &[WordPlacement] {
    &self.placements
  }

  pub fn push_placement(&mut self, placement: WordPlacement) {
    self.placements.push(placement);
  }

  pub fn pop_placement(&mut self) -> Option<WordPlacement> {
    self.placements.pop()
  }

  /// Number of generations opened but not yet rolled back or committed.
  pub fn open_generations(&self) -> usize {
    self.undo_log.len()
  }

  pub fn begin_generation(&mut self) {
    self.undo_log.push(Vec::new());
  }

  /// Pops the most recent generation and replays its edits in reverse,
  /// restoring every touched field to its prior value.
  pub fn rollback(&mut self) -> WsResult {
    let edits = self
      .undo_log
      .pop()
      .ok_or_else(|| WordSearchError::Internal("Rollback with no open generation".to_owned()))?;
    for edit in edits.into_iter().rev() {
      match edit {
        UndoEdit::LetterChanged { pos, old_letter } => {
          self.cell_mut(pos)?.letter = old_letter;
        }
        UndoEdit::CanPlaceChanged {
          pos,
          direction,
          old_value,
        } => {
          self.cell_mut(pos)?.can_place[direction.index()] = old_value;
        }
        UndoEdit::MaxRunLengthChanged {
          pos,
          direction,
          old_value,
        } => {
          self.cell_mut(pos)?.max_run_length[direction.index()] = old_value;
        }
        UndoEdit::LetterRequirementAdded { pos, direction } => {
          self.cell_mut(pos)?.letter_requirements[direction.index()].pop();
        }
      }
    }
    Ok(())
  }

  /// Discards the most recent generation record, keeping the grid's current
  /// state.
  pub fn commit(&mut self) -> WsResult {
    self
      .undo_log
      .pop()
      .map(|_| ())
      .ok_or_else(|| WordSearchError::Internal("Commit with no open generation".to_owned()).into())
  }

  pub fn set_letter(&mut self, pos: Pos, letter: char) -> WsResult {
    let old_letter = self.cell_ref(pos)?.letter;
    if old_letter == letter {
      return Ok(());
    }
    self
      .open_generation()?
      .push(UndoEdit::LetterChanged { pos, old_letter });
    self.cell_mut(pos)?.letter = letter;
    Ok(())
  }

  pub fn set_can_place(&mut self, pos: Pos, direction: Direction, can_place: bool) -> WsResult {
    let old_value = self.cell_ref(pos)?.can_place(direction);
    if old_value == can_place {
      return Ok(());
    }
    self.open_generation()?.push(UndoEdit::CanPlaceChanged {
      pos,
      direction,
      old_value,
    });
    self.cell_mut(pos)?.can_place[direction.index()] = can_place;
    Ok(())
  }

  pub fn set_max_run_length(
    &mut self,
    pos: Pos,
    direction: Direction,
    max_run_length: u32,
  ) -> WsResult {
    let old_value = self.cell_ref(pos)?.max_run_length(direction);
    if old_value == max_run_length {
      return Ok(());
    }
    self.open_generation()?.push(UndoEdit::MaxRunLengthChanged {
      pos,
      direction,
      old_value,
    });
    self.cell_mut(pos)?.max_run_length[direction.index()] = max_run_length;
    Ok(())
  }

  /// Appends a crossing-letter requirement. Unlike the other mutators this
  /// always records an edit; reverting removes exactly the most recently
  /// appended requirement for the cell/direction.
  pub fn add_letter_requirement(
    &mut self,
    pos: Pos,
    direction: Direction,
    requirement: LetterRequirement,
  ) -> WsResult {
    self.cell_ref(pos)?;
    self
      .open_generation()?
      .push(UndoEdit::LetterRequirementAdded { pos, direction });
    self.cell_mut(pos)?.letter_requirements[direction.index()].push(requirement);
    Ok(())
  }

  /// Consumes the grid, yielding the letter snapshot and the committed
  /// placements.
  pub fn into_parts(self) -> (Grid<char>, Vec<WordPlacement>) {
    (self.cells.map(|cell| cell.letter), self.placements)
  }

  fn cell_ref(&self, pos: Pos) -> WsResult<&Cell> {
    self
      .cells
      .get(pos)
      .ok_or_else(|| WordSearchError::Internal(format!("Position {pos} out of bounds")).into())
  }

  fn cell_mut(&mut self, pos: Pos) -> WsResult<&mut Cell> {
    self
      .cells
      .get_mut(pos)
      .ok_or_else(|| WordSearchError::Internal(format!("Position {pos} out of bounds")).into())
  }

  fn open_generation(&mut self) -> WsResult<&mut Vec<UndoEdit>> {
    self
      .undo_log
      .last_mut()
      .ok_or_else(|| WordSearchError::Internal("Mutation with no open generation".to_owned()).into())
  }
}

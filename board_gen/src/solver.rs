use std::{
  cmp::Reverse,
  time::{Duration, Instant},
};

use common::{
  board::{Board, WordPlacement, BLANK},
  direction::Direction,
};
use itertools::Itertools;
use log::warn;
use rand::seq::{IndexedRandom, SliceRandom};
use util::{
  error::{WordSearchError, WsResult},
  grid::Grid,
  pos::Pos,
};

use crate::{
  config::BoardConfig,
  worker::{StepStatus, WorkerContext, WorkerTask},
  working_grid::{LetterRequirement, WorkingGrid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HaltReason {
  Deadline,
  Cancelled,
}

enum PlaceResult {
  /// The current word and all words after it were placed.
  Placed,
  /// No candidate for the current word works with the grid as it stands.
  Exhausted,
  /// The attempt ended early; words placed so far stay committed.
  Halted(HaltReason),
}

struct AttemptOutcome {
  letters: Grid<char>,
  placements: Vec<WordPlacement>,
  halt: Option<HaltReason>,
}

struct BestAttempt {
  letters: Grid<char>,
  placements: Vec<WordPlacement>,
}

/// Backtracking word placer.
///
/// Each work step runs one attempt on a fresh [`WorkingGrid`]: words are
/// tried longest first, candidate (start, direction) pairs in random order,
/// and each placement decision opens an undo generation that is committed
/// on success and rolled back when the decision leads nowhere. The sampling
/// loop keeps the attempt that placed the most words, then fills the
/// remaining cells from the filler alphabet.
pub struct WordPlacementSolver {
  config: BoardConfig,
  words: Vec<String>,
  unplaceable: Vec<String>,
  deadline: Option<Instant>,
  attempts_run: u32,
  last_fault: Option<String>,
  best: Option<BestAttempt>,
}

impl WordPlacementSolver {
  pub fn new(config: BoardConfig) -> Self {
    let longest_run = config.rows.max(config.cols);
    let (mut words, unplaceable): (Vec<_>, Vec<_>) = config
      .effective_words()
      .into_iter()
      .partition(|word| word.chars().count() as u32 <= longest_run);
    // Longest first: long words constrain the grid the most and fail the
    // fastest.
    words.sort_by_key(|word| Reverse(word.chars().count()));

    Self {
      config,
      words,
      unplaceable,
      deadline: None,
      attempts_run: 0,
      last_fault: None,
      best: None,
    }
  }

  fn check_halt(&self, ctx: &WorkerContext) -> Option<HaltReason> {
    if ctx.stopping() {
      return Some(HaltReason::Cancelled);
    }
    if let Some(deadline) = self.deadline {
      if Instant::now() >= deadline {
        return Some(HaltReason::Deadline);
      }
    }
    None
  }

  fn run_attempt(&mut self, ctx: &WorkerContext) -> WsResult<AttemptOutcome> {
    let mut grid = WorkingGrid::new(self.config.rows, self.config.cols)?;
    let halt = match self.place_from(&mut grid, 0, ctx)? {
      PlaceResult::Placed | PlaceResult::Exhausted => None,
      PlaceResult::Halted(reason) => Some(reason),
    };
    debug_assert_eq!(grid.open_generations(), 0);
    let (letters, placements) = grid.into_parts();
    Ok(AttemptOutcome {
      letters,
      placements,
      halt,
    })
  }

  fn place_from(
    &mut self,
    grid: &mut WorkingGrid,
    word_idx: usize,
    ctx: &WorkerContext,
  ) -> WsResult<PlaceResult> {
    let Some(word) = self.words.get(word_idx) else {
      return Ok(PlaceResult::Placed);
    };
    let word = word.clone();
    let letters: Vec<char> = word.chars().collect();

    let mut candidates = grid
      .positions()
      .cartesian_product(Direction::ALL)
      .collect::<Vec<_>>();
    candidates.shuffle(&mut self.config.rng);

    for (start, direction) in candidates {
      if let Some(reason) = self.check_halt(ctx) {
        return Ok(PlaceResult::Halted(reason));
      }
      if !candidate_fits(grid, start, direction, &letters) {
        continue;
      }

      grid.begin_generation();
      write_word(grid, start, direction, &letters)?;
      grid.push_placement(WordPlacement {
        word: word.clone(),
        start,
        direction,
      });

      match self.place_from(grid, word_idx + 1, ctx)? {
        PlaceResult::Placed => {
          grid.commit()?;
          return Ok(PlaceResult::Placed);
        }
        PlaceResult::Halted(reason) => {
          // placed-so-far is final for this attempt
          grid.commit()?;
          return Ok(PlaceResult::Halted(reason));
        }
        PlaceResult::Exhausted => {
          grid.pop_placement();
          grid.rollback()?;
        }
      }
    }

    Ok(PlaceResult::Exhausted)
  }

  fn consider(&mut self, letters: Grid<char>, placements: Vec<WordPlacement>) {
    // ties keep the earlier attempt
    let better = self
      .best
      .as_ref()
      .map_or(true, |best| placements.len() > best.placements.len());
    if better {
      self.best = Some(BestAttempt { letters, placements });
    }
  }

  fn fill_blanks(&mut self, letters: &mut Grid<char>) {
    let positions: Vec<_> = letters.positions().collect();
    for pos in positions {
      if letters.get(pos).copied() != Some(BLANK) {
        continue;
      }
      if let Some(&filler) = self.config.filler_alphabet.choose(&mut self.config.rng) {
        if let Some(cell) = letters.get_mut(pos) {
          *cell = filler;
        }
      }
    }
  }

  fn diagnostic(&self, placements: &[WordPlacement]) -> Option<String> {
    let mut parts = Vec::new();
    if !self.unplaceable.is_empty() {
      parts.push(format!(
        "Unplaceable words: {}",
        self.unplaceable.iter().join(", ")
      ));
    }
    if placements.is_empty() && !self.words.is_empty() {
      parts.push("No words could be placed".to_owned());
    }
    if let Some(fault) = &self.last_fault {
      parts.push(format!("Last attempt fault: {fault}"));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
  }

  fn report_progress(&self, ctx: &WorkerContext) {
    let progress = if self.config.sample_count > 0 {
      self.attempts_run as f32 / self.config.sample_count as f32
    } else {
      let placed = self.best.as_ref().map_or(0, |best| best.placements.len());
      placed as f32 / self.words.len().max(1) as f32
    };
    ctx.set_progress(progress);
  }
}

impl WorkerTask for WordPlacementSolver {
  type Output = (Board, Option<String>);

  fn begin(&mut self, _ctx: &WorkerContext) -> WsResult {
    self.config.validate()?;
    for word in &self.unplaceable {
      warn!(
        "Word {word:?} cannot fit on a {}x{} board",
        self.config.rows, self.config.cols
      );
    }
    self.deadline = (self.config.time_budget_ms > 0)
      .then(|| Instant::now() + Duration::from_millis(self.config.time_budget_ms));
    Ok(())
  }

  fn work(&mut self, ctx: &WorkerContext) -> WsResult<StepStatus> {
    if self.words.is_empty() {
      return Ok(StepStatus::Done);
    }

    let halt = match self.run_attempt(ctx) {
      Ok(outcome) => {
        self.attempts_run += 1;
        let halt = outcome.halt;
        self.consider(outcome.letters, outcome.placements);
        halt
      }
      Err(err) => {
        // fault in one attempt; later attempts may still succeed
        self.attempts_run += 1;
        warn!("Attempt {} faulted: {err}", self.attempts_run);
        self.last_fault = Some(err.to_string());
        None
      }
    };
    self.report_progress(ctx);

    if halt.is_some() {
      return Ok(StepStatus::Done);
    }
    let done = if self.config.sample_count == 0 {
      self
        .best
        .as_ref()
        .is_some_and(|best| best.placements.len() == self.words.len())
    } else {
      self.attempts_run >= self.config.sample_count
    };
    Ok(if done {
      StepStatus::Done
    } else {
      StepStatus::Continue
    })
  }

  fn finish(mut self, _ctx: &WorkerContext) -> (Board, Option<String>) {
    let (mut letters, placements) = match self.best.take() {
      Some(best) => (best.letters, best.placements),
      // char's default is the blank sentinel, so this is an all-blank grid
      None => (Grid::new(self.config.rows, self.config.cols), Vec::new()),
    };
    self.fill_blanks(&mut letters);
    let diagnostic = self.diagnostic(&placements);
    let board = Board::new(
      self.config.rows,
      self.config.cols,
      self.config.words.clone(),
      letters,
      placements,
    );
    (board, diagnostic)
  }
}

fn candidate_fits(grid: &WorkingGrid, start: Pos, direction: Direction, letters: &[char]) -> bool {
  grid.can_place(start, direction)
    && grid.max_run_length(start, direction) >= letters.len() as u32
    && letters.iter().enumerate().all(|(offset, &letter)| {
      let pos = start + offset as i32 * direction.diff();
      matches!(grid.letter(pos), Some(existing) if existing == BLANK || existing == letter)
    })
}

fn write_word(
  grid: &mut WorkingGrid,
  start: Pos,
  direction: Direction,
  letters: &[char],
) -> WsResult {
  for (offset, &letter) in letters.iter().enumerate() {
    let pos = start + offset as i32 * direction.diff();
    let existing = grid
      .letter(pos)
      .ok_or_else(|| WordSearchError::Internal(format!("Position {pos} out of bounds")))?;
    if existing == letter {
      // the cell already belongs to an earlier word; record the crossing
      grid.add_letter_requirement(
        pos,
        direction,
        LetterRequirement {
          offset: offset as u32,
          letter,
        },
      )?;
    } else {
      grid.set_letter(pos, letter)?;
    }
  }
  Ok(())
}

/// Runs a full generation synchronously on the calling thread. Errors only
/// on an invalid configuration.
pub fn generate(config: BoardConfig) -> WsResult<(Board, Option<String>)> {
  let ctx = WorkerContext::new();
  let mut solver = WordPlacementSolver::new(config);
  solver.begin(&ctx)?;
  while !ctx.stopping() {
    if let StepStatus::Done = solver.work(&ctx)? {
      break;
    }
  }
  Ok(solver.finish(&ctx))
}

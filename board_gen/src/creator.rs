use common::board::Board;
use log::warn;
use util::error::{WordSearchError, WsResult};

use crate::{config::BoardConfig, solver::WordPlacementSolver, worker::CooperativeWorker};

type CompletionCallback = Box<dyn FnOnce(Board, Option<String>)>;

struct ActiveRun {
  worker: CooperativeWorker<(Board, Option<String>)>,
  on_complete: Option<CompletionCallback>,
}

/// Single-slot driver for generation runs.
///
/// At most one run is active per creator: starting a new run first stops
/// and joins the previous one. The caller polls [`BoardCreator::poll`] once
/// per tick; when the worker has stopped, the completion callback fires
/// exactly once with the finished board and an optional diagnostic, and the
/// slot is cleared.
#[derive(Default)]
pub struct BoardCreator {
  run: Option<ActiveRun>,
}

impl BoardCreator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn create_board<F>(&mut self, config: BoardConfig, on_complete: F) -> WsResult
  where
    F: FnOnce(Board, Option<String>) + 'static,
  {
    self.stop()?;
    let worker = CooperativeWorker::start(WordPlacementSolver::new(config), || {});
    self.run = Some(ActiveRun {
      worker,
      on_complete: Some(Box::new(on_complete)),
    });
    Ok(())
  }

  pub fn is_running(&self) -> bool {
    self.run.is_some()
  }

  pub fn is_finished(&self) -> bool {
    self
      .run
      .as_ref()
      .is_some_and(|run| run.worker.stopped())
  }

  pub fn progress(&self) -> f32 {
    self.run.as_ref().map_or(0.0, |run| run.worker.progress())
  }

  /// Requests a cooperative stop of the active run. The run still completes
  /// through [`BoardCreator::poll`] with its best-so-far board.
  pub fn cancel(&self) {
    if let Some(run) = &self.run {
      run.worker.request_stop();
    }
  }

  /// One non-blocking completion check. Returns whether the run finished
  /// (and the callback fired) on this call.
  pub fn poll(&mut self) -> WsResult<bool> {
    if !self.is_finished() {
      return Ok(false);
    }
    let Some(mut run) = self.run.take() else {
      return Ok(false);
    };
    run.worker.join()?;
    let (board, diagnostic) = run.worker.take_result().ok_or_else(|| {
      WordSearchError::Internal("Worker stopped without producing a board".to_owned())
    })?;
    let diagnostic = merge_diagnostics(diagnostic, run.worker.error());
    if let Some(diagnostic) = &diagnostic {
      warn!("{diagnostic}");
    }
    if let Some(on_complete) = run.on_complete.take() {
      on_complete(board, diagnostic);
    }
    Ok(true)
  }

  fn stop(&mut self) -> WsResult {
    if let Some(mut run) = self.run.take() {
      run.worker.stop_and_join()?;
    }
    Ok(())
  }
}

fn merge_diagnostics(first: Option<String>, second: Option<String>) -> Option<String> {
  match (first, second) {
    (Some(first), Some(second)) => Some(format!("{first}; {second}")),
    (first, second) => first.or(second),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use std::{
    cell::RefCell,
    rc::Rc,
    thread,
    time::{Duration, Instant},
  };

  use common::board::Board;
  use googletest::prelude::*;

  use crate::config::BoardConfig;

  use super::BoardCreator;

  fn poll_to_completion(creator: &mut BoardCreator) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !creator.poll().unwrap() {
      assert!(Instant::now() < deadline, "run did not complete in time");
      thread::sleep(Duration::from_millis(5));
    }
  }

  #[gtest]
  fn test_completion_callback_fires_once_with_board() {
    let completions: Rc<RefCell<Vec<(Board, Option<String>)>>> = Rc::default();
    let mut creator = BoardCreator::new();

    let recorded = Rc::clone(&completions);
    creator
      .create_board(
        BoardConfig::new(6, 6, ["cat", "dog"]).with_seed(11),
        move |board, diagnostic| recorded.borrow_mut().push((board, diagnostic)),
      )
      .unwrap();
    expect_true!(creator.is_running());

    poll_to_completion(&mut creator);
    expect_false!(creator.is_running());
    expect_false!(creator.poll().unwrap());

    let completions = completions.borrow();
    assert_that!(*completions, len(eq(1)));
    let (board, diagnostic) = &completions[0];
    expect_eq!(board.rows, 6);
    expect_that!(board.word_placements, len(eq(2)));
    expect_true!(diagnostic.is_none());
  }

  #[gtest]
  fn test_config_error_still_delivers_board() {
    let completions: Rc<RefCell<Vec<(Board, Option<String>)>>> = Rc::default();
    let mut creator = BoardCreator::new();

    let recorded = Rc::clone(&completions);
    creator
      .create_board(BoardConfig::new(4, 4, Vec::<String>::new()), move |board, diagnostic| {
        recorded.borrow_mut().push((board, diagnostic))
      })
      .unwrap();
    poll_to_completion(&mut creator);

    let completions = completions.borrow();
    assert_that!(*completions, len(eq(1)));
    let (board, diagnostic) = &completions[0];
    expect_that!(board.word_placements, is_empty());
    expect_that!(*diagnostic, some(contains_substring("No words")));
  }

  #[gtest]
  fn test_new_run_replaces_previous() {
    let mut creator = BoardCreator::new();
    // endless: impossible words with no deadline
    let endless = BoardConfig::new(3, 3, ["aaa", "bbb", "ccc", "ddd", "eee"])
      .with_time_budget_ms(0)
      .with_seed(2);
    creator.create_board(endless, |_, _| {}).unwrap();

    let finished = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&finished);
    creator
      .create_board(
        BoardConfig::new(5, 5, ["cat"]).with_seed(8),
        move |_, _| *flag.borrow_mut() = true,
      )
      .unwrap();
    poll_to_completion(&mut creator);
    expect_true!(*finished.borrow());
  }

  #[gtest]
  fn test_cancel_returns_best_so_far() {
    let completions: Rc<RefCell<Vec<Board>>> = Rc::default();
    let mut creator = BoardCreator::new();

    let recorded = Rc::clone(&completions);
    creator
      .create_board(
        BoardConfig::new(3, 3, ["aaa", "bbb", "ccc", "ddd", "eee"])
          .with_time_budget_ms(0)
          .with_seed(4),
        move |board, _| recorded.borrow_mut().push(board),
      )
      .unwrap();
    creator.cancel();
    poll_to_completion(&mut creator);

    let completions = completions.borrow();
    assert_that!(*completions, len(eq(1)));
    expect_eq!(completions[0].rows, 3);
  }
}

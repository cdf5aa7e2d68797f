#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod args;

use std::{cell::RefCell, fs, process::ExitCode, rc::Rc, thread, time::Duration};

use args::Args;
use board_gen::{config::BoardConfig, creator::BoardCreator};
use clap::Parser;
use common::board::Board;
use itertools::Itertools;
use util::{
  error::{WordSearchError, WsResult},
  time::time_fn,
};

/// Completion is polled once per tick, like a frame loop would.
const POLL_PERIOD: Duration = Duration::from_millis(20);

fn read_words(args: &Args) -> WsResult<Vec<String>> {
  let mut words = args.words.clone();
  if let Some(path) = &args.word_file {
    words.extend(
      fs::read_to_string(path)?
        .lines()
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty()),
    );
  }
  Ok(words.into_iter().unique().collect())
}

fn build_config(args: &Args, words: Vec<String>) -> BoardConfig {
  let mut config = BoardConfig::new(args.rows, args.cols, words)
    .with_time_budget_ms(args.time_budget_ms)
    .with_sample_count(args.samples)
    .with_filler_alphabet(&args.filler);
  if let Some(seed) = args.seed {
    config = config.with_seed(seed);
  }
  config
}

fn print_board(board: &Board) {
  print!("{}", board.board_characters);
  println!(
    "{}",
    board
      .word_placements
      .iter()
      .map(|placement| {
        format!(
          "{} at {} going {}",
          placement.word, placement.start, placement.direction
        )
      })
      .join("\n")
  );
}

fn run() -> WsResult {
  env_logger::init();
  let args = Args::parse();
  let words = read_words(&args)?;
  let config = build_config(&args, words);

  let mut creator = BoardCreator::new();
  let result = Rc::new(RefCell::new(None));
  {
    let result = Rc::clone(&result);
    creator.create_board(config, move |board, diagnostic| {
      *result.borrow_mut() = Some((board, diagnostic));
    })?;
  }

  let (elapsed, poll_result) = time_fn(|| -> WsResult {
    while !creator.poll()? {
      thread::sleep(POLL_PERIOD);
    }
    Ok(())
  });
  poll_result?;

  let Some((board, diagnostic)) = result.borrow_mut().take() else {
    return Err(WordSearchError::Internal("Run completed without a board".to_owned()).into());
  };

  println!(
    "Generated a {}x{} board with {}/{} words in {:.3}s",
    board.rows,
    board.cols,
    board.word_placements.len(),
    board.words.len(),
    elapsed.as_secs_f32()
  );
  if let Some(diagnostic) = &diagnostic {
    println!("{diagnostic}");
  }
  print_board(&board);

  if let Some(path) = &args.out {
    fs::write(path, serde_json::to_string_pretty(&board)?)?;
    println!("Wrote {path}");
  }

  Ok(())
}

fn main() -> ExitCode {
  if let Err(err) = run() {
    println!("Error: {err}");
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  }
}

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
  #[arg(long, default_value_t = 12)]
  pub rows: u32,

  #[arg(long, default_value_t = 12)]
  pub cols: u32,

  /// Words to place, comma separated.
  #[arg(long, value_delimiter = ',')]
  pub words: Vec<String>,

  /// Read additional words from a file, one per line.
  #[arg(long)]
  pub word_file: Option<String>,

  /// Seed for reproducible boards.
  #[arg(long)]
  pub seed: Option<u64>,

  /// Placement time budget in milliseconds; 0 disables the deadline.
  #[arg(long, default_value_t = 2000)]
  pub time_budget_ms: u64,

  /// Number of boards to sample before keeping the best; 0 samples until
  /// the first fully-placed board.
  #[arg(long, default_value_t = 0)]
  pub samples: u32,

  /// Characters used to fill cells no word covers.
  #[arg(long, default_value = "abcdefghijklmnopqrstuvwxyz")]
  pub filler: String,

  /// Write the finished board as JSON to this path.
  #[arg(long)]
  pub out: Option<String>,
}

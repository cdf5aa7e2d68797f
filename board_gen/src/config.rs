use rand::{rngs::StdRng, SeedableRng};
use util::error::{WordSearchError, WsResult};

pub const DEFAULT_FILLER_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Words failing to fully place within this many milliseconds yield a
/// partial board rather than running forever.
const DEFAULT_TIME_BUDGET_MS: u64 = 2000;

/// Input to a generation run.
#[derive(Clone, Debug)]
pub struct BoardConfig {
  pub rows: u32,
  pub cols: u32,
  pub words: Vec<String>,
  pub filler_alphabet: Vec<char>,
  /// 0 disables the deadline.
  pub time_budget_ms: u64,
  /// Number of sampled attempts to run before keeping the best. 0 means
  /// sample until a fully-successful attempt, the deadline, or a stop
  /// request.
  pub sample_count: u32,
  pub rng: StdRng,
}

impl BoardConfig {
  pub fn new(rows: u32, cols: u32, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      rows,
      cols,
      words: words.into_iter().map(|word| word.into()).collect(),
      filler_alphabet: DEFAULT_FILLER_ALPHABET.chars().collect(),
      time_budget_ms: DEFAULT_TIME_BUDGET_MS,
      sample_count: 0,
      rng: StdRng::from_os_rng(),
    }
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.rng = StdRng::seed_from_u64(seed);
    self
  }

  pub fn with_time_budget_ms(mut self, time_budget_ms: u64) -> Self {
    self.time_budget_ms = time_budget_ms;
    self
  }

  pub fn with_sample_count(mut self, sample_count: u32) -> Self {
    self.sample_count = sample_count;
    self
  }

  pub fn with_filler_alphabet(mut self, filler_alphabet: &str) -> Self {
    self.filler_alphabet = filler_alphabet.chars().collect();
    self
  }

  /// The words as the solver sees them: interior spaces stripped, empty
  /// entries dropped.
  pub fn effective_words(&self) -> Vec<String> {
    self
      .words
      .iter()
      .map(|word| word.chars().filter(|c| !c.is_whitespace()).collect::<String>())
      .filter(|word| !word.is_empty())
      .collect()
  }

  pub fn validate(&self) -> WsResult {
    if self.rows == 0 || self.cols == 0 {
      return Err(
        WordSearchError::Config(format!(
          "Board dimensions must be positive, got {}x{}",
          self.rows, self.cols
        ))
        .into(),
      );
    }
    if self.effective_words().is_empty() {
      return Err(WordSearchError::Config("No words to place".to_owned()).into());
    }
    if self.filler_alphabet.is_empty() {
      return Err(WordSearchError::Config("Empty filler alphabet".to_owned()).into());
    }
    Ok(())
  }
}

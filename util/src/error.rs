use core::fmt;
use std::{
  error::Error,
  fmt::{Display, Formatter},
};

#[derive(Debug)]
pub enum WordSearchError {
  Config(String),
  Internal(String),
}

impl Display for WordSearchError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      WordSearchError::Config(msg) => write!(f, "Configuration error: {msg}"),
      WordSearchError::Internal(msg) => write!(f, "Internal error: {msg}"),
    }
  }
}

impl Error for WordSearchError {}

pub type WsResult<T = ()> = Result<T, Box<dyn Error>>;

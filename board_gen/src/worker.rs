use std::{
  panic::{self, AssertUnwindSafe},
  sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc, Mutex,
  },
  thread::{self, JoinHandle},
};

use util::error::{WordSearchError, WsResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
  Continue,
  Done,
}

/// A long computation split into discrete work steps so it can observe a
/// stop request between them.
pub trait WorkerTask: Send + 'static {
  type Output: Send + 'static;

  /// Runs once before the work loop.
  fn begin(&mut self, ctx: &WorkerContext) -> WsResult;

  /// One unit of work. The loop repeats this until it returns `Done`, a
  /// stop is requested, or it faults.
  fn work(&mut self, ctx: &WorkerContext) -> WsResult<StepStatus>;

  /// Produces the final output. Runs on every exit path, including after a
  /// fault in `begin` or `work`.
  fn finish(self, ctx: &WorkerContext) -> Self::Output
  where
    Self: Sized;
}

#[derive(Default)]
struct Signals {
  stopping: AtomicBool,
  stopped: AtomicBool,
  progress_bits: AtomicU32,
  error: Mutex<Option<String>>,
}

/// Shared observation surface between a worker thread and its caller. All
/// reads are non-blocking, safe to poll once per tick.
#[derive(Clone, Default)]
pub struct WorkerContext {
  signals: Arc<Signals>,
}

impl WorkerContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn request_stop(&self) {
    self.signals.stopping.store(true, Ordering::Release);
  }

  pub fn stopping(&self) -> bool {
    self.signals.stopping.load(Ordering::Acquire)
  }

  pub fn stopped(&self) -> bool {
    self.signals.stopped.load(Ordering::Acquire)
  }

  pub fn progress(&self) -> f32 {
    f32::from_bits(self.signals.progress_bits.load(Ordering::Acquire))
  }

  /// Records progress in [0, 1]. Regressions are ignored so observed
  /// progress is monotonic within a run.
  pub fn set_progress(&self, progress: f32) {
    let progress = progress.clamp(0.0, 1.0);
    if progress > self.progress() {
      self
        .signals
        .progress_bits
        .store(progress.to_bits(), Ordering::Release);
    }
  }

  pub fn error(&self) -> Option<String> {
    self.signals.error.lock().ok().and_then(|slot| slot.clone())
  }

  fn record_error(&self, error: Option<String>) {
    if let Ok(mut slot) = self.signals.error.lock() {
      *slot = error;
    }
  }

  fn mark_stopped(&self) {
    self.signals.stopped.store(true, Ordering::Release);
  }
}

/// Runs a [`WorkerTask`] on its own thread with cooperative cancellation.
///
/// Starting is tied to construction, so a worker cannot be started twice.
/// The loop runs `begin` once, then `work` until `Done`, a stop request, or
/// a fault; `finish` then always produces the output, the worker marks
/// itself stopped, and the `on_stopped` callback fires exactly once.
pub struct CooperativeWorker<T> {
  ctx: WorkerContext,
  result: Arc<Mutex<Option<T>>>,
  thread: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> CooperativeWorker<T> {
  pub fn start<W, F>(task: W, on_stopped: F) -> Self
  where
    W: WorkerTask<Output = T>,
    F: FnOnce() + Send + 'static,
  {
    let ctx = WorkerContext::new();
    let result = Arc::new(Mutex::new(None));
    let thread = {
      let ctx = ctx.clone();
      let result = Arc::clone(&result);
      thread::spawn(move || Self::run(task, ctx, result, on_stopped))
    };
    Self {
      ctx,
      result,
      thread: Some(thread),
    }
  }

  fn run<W: WorkerTask<Output = T>>(
    mut task: W,
    ctx: WorkerContext,
    result: Arc<Mutex<Option<T>>>,
    on_stopped: impl FnOnce(),
  ) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| Self::run_loop(&mut task, &ctx)));
    ctx.record_error(match outcome {
      Ok(Ok(())) => None,
      Ok(Err(err)) => Some(err.to_string()),
      Err(_) => Some("Worker task panicked".to_owned()),
    });

    let output = task.finish(&ctx);
    if let Ok(mut slot) = result.lock() {
      *slot = Some(output);
    }
    ctx.mark_stopped();
    on_stopped();
  }

  fn run_loop<W: WorkerTask<Output = T>>(task: &mut W, ctx: &WorkerContext) -> WsResult {
    task.begin(ctx)?;
    while !ctx.stopping() {
      if let StepStatus::Done = task.work(ctx)? {
        break;
      }
    }
    Ok(())
  }

  pub fn request_stop(&self) {
    self.ctx.request_stop();
  }

  pub fn stopping(&self) -> bool {
    self.ctx.stopping()
  }

  pub fn stopped(&self) -> bool {
    self.ctx.stopped()
  }

  pub fn progress(&self) -> f32 {
    self.ctx.progress()
  }

  pub fn error(&self) -> Option<String> {
    self.ctx.error()
  }

  /// Takes the output if the task has finished. `None` until then, and
  /// after it has been taken.
  pub fn take_result(&self) -> Option<T> {
    self.result.lock().ok().and_then(|mut slot| slot.take())
  }

  pub fn join(&mut self) -> WsResult {
    if let Some(thread) = self.thread.take() {
      thread
        .join()
        .map_err(|_| WordSearchError::Internal("Worker thread panicked".to_owned()))?;
    }
    Ok(())
  }

  pub fn stop_and_join(&mut self) -> WsResult {
    self.request_stop();
    self.join()
  }
}

impl<T> Drop for CooperativeWorker<T> {
  fn drop(&mut self) {
    self.ctx.request_stop();
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use std::{
    sync::{
      atomic::{AtomicU32, Ordering},
      Arc,
    },
    thread,
    time::Duration,
  };

  use googletest::prelude::*;
  use util::error::{WordSearchError, WsResult};

  use super::{CooperativeWorker, StepStatus, WorkerContext, WorkerTask};

  struct Countdown {
    remaining: u32,
    total: u32,
  }

  impl Countdown {
    fn new(total: u32) -> Self {
      Self {
        remaining: total,
        total,
      }
    }
  }

  impl WorkerTask for Countdown {
    type Output = u32;

    fn begin(&mut self, _ctx: &WorkerContext) -> WsResult {
      Ok(())
    }

    fn work(&mut self, ctx: &WorkerContext) -> WsResult<StepStatus> {
      self.remaining -= 1;
      ctx.set_progress((self.total - self.remaining) as f32 / self.total as f32);
      Ok(if self.remaining == 0 {
        StepStatus::Done
      } else {
        StepStatus::Continue
      })
    }

    fn finish(self, _ctx: &WorkerContext) -> u32 {
      self.total - self.remaining
    }
  }

  struct Faulty;

  impl WorkerTask for Faulty {
    type Output = &'static str;

    fn begin(&mut self, _ctx: &WorkerContext) -> WsResult {
      Ok(())
    }

    fn work(&mut self, _ctx: &WorkerContext) -> WsResult<StepStatus> {
      Err(WordSearchError::Internal("boom".to_owned()).into())
    }

    fn finish(self, _ctx: &WorkerContext) -> &'static str {
      "cleaned up"
    }
  }

  struct Endless;

  impl WorkerTask for Endless {
    type Output = ();

    fn begin(&mut self, _ctx: &WorkerContext) -> WsResult {
      Ok(())
    }

    fn work(&mut self, _ctx: &WorkerContext) -> WsResult<StepStatus> {
      thread::sleep(Duration::from_millis(1));
      Ok(StepStatus::Continue)
    }

    fn finish(self, _ctx: &WorkerContext) {}
  }

  #[gtest]
  fn test_runs_to_completion() {
    let callbacks = Arc::new(AtomicU32::new(0));
    let counted = Arc::clone(&callbacks);
    let mut worker = CooperativeWorker::start(Countdown::new(5), move || {
      counted.fetch_add(1, Ordering::SeqCst);
    });

    worker.join().unwrap();
    expect_true!(worker.stopped());
    expect_that!(worker.take_result(), some(eq(5)));
    expect_that!(worker.take_result(), none());
    expect_eq!(callbacks.load(Ordering::SeqCst), 1);
    expect_that!(worker.error(), none());
  }

  #[gtest]
  fn test_progress_reaches_one() {
    let mut worker = CooperativeWorker::start(Countdown::new(4), || {});
    worker.join().unwrap();
    expect_that!(worker.progress(), eq(1.0));
  }

  #[gtest]
  fn test_stop_request_ends_endless_task() {
    let mut worker = CooperativeWorker::start(Endless, || {});
    expect_false!(worker.stopped());
    worker.stop_and_join().unwrap();
    expect_true!(worker.stopped());
    expect_that!(worker.take_result(), some(anything()));
  }

  #[gtest]
  fn test_fault_still_finishes() {
    let mut worker = CooperativeWorker::start(Faulty, || {});
    worker.join().unwrap();
    expect_true!(worker.stopped());
    expect_that!(worker.take_result(), some(eq("cleaned up")));
    expect_that!(worker.error(), some(contains_substring("boom")));
  }

  #[gtest]
  fn test_progress_is_monotonic_and_clamped() {
    let ctx = WorkerContext::new();
    ctx.set_progress(0.5);
    ctx.set_progress(0.25);
    expect_that!(ctx.progress(), eq(0.5));
    ctx.set_progress(7.0);
    expect_that!(ctx.progress(), eq(1.0));
  }
}

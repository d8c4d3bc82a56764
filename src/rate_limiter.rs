// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Single-flight FIFO queue that spaces every outbound GitHub call by a fixed delay
// role: transport/throttle
// inputs: Nullary async tasks returning anyhow::Result<T>
// outputs: Each task's own result, delivered only to its submitter
// side_effects: Spawns one drain task on the tokio runtime while the queue is non-empty
// invariants:
// - At most one queued task runs at a time per limiter (clones share the queue)
// - Tasks start in submission order; the next start waits `delay` after the previous completion
// - A failing, panicking, or timed-out task resolves only its own caller; draining continues
// - Submitting while a drain is running appends to the queue and never starts a second drain
// - An abandoned caller does not abort its task; the task still occupies its slot until it settles
// errors: Task errors pass through unchanged; panics and timeouts surface as errors to the submitter
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Limiter knobs. `delay` defaults to one second between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
  pub delay: Duration,
  /// Upper bound on a single task's run time; `None` lets a task hold the slot indefinitely.
  pub task_timeout: Option<Duration>,
}

impl Default for RateLimiterConfig {
  fn default() -> Self {
    Self {
      delay: Duration::from_millis(DEFAULT_DELAY_MS),
      task_timeout: None,
    }
  }
}

impl RateLimiterConfig {
  pub fn with_delay_ms(ms: u64) -> Self {
    Self {
      delay: Duration::from_millis(ms),
      ..Self::default()
    }
  }
}

#[derive(Default)]
struct QueueState {
  queue: VecDeque<Job>,
  draining: bool,
  last_finished: Option<Instant>,
}

struct Inner {
  config: RateLimiterConfig,
  state: Mutex<QueueState>,
}

impl Inner {
  fn lock_state(&self) -> MutexGuard<'_, QueueState> {
    // Never held across an await or a task body; a poisoned lock still has consistent data.
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Cloneable handle; every clone feeds the same queue.
#[derive(Clone)]
pub struct RateLimiter {
  inner: Arc<Inner>,
}

impl std::fmt::Debug for RateLimiter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let state = self.inner.lock_state();
    f.debug_struct("RateLimiter")
      .field("config", &self.inner.config)
      .field("queued", &state.queue.len())
      .field("draining", &state.draining)
      .finish()
  }
}

impl Default for RateLimiter {
  fn default() -> Self {
    Self::new(RateLimiterConfig::default())
  }
}

impl RateLimiter {
  pub fn new(config: RateLimiterConfig) -> Self {
    Self {
      inner: Arc::new(Inner {
        config,
        state: Mutex::new(QueueState::default()),
      }),
    }
  }

  pub fn config(&self) -> RateLimiterConfig {
    self.inner.config
  }

  /// Number of tasks waiting to start (the running task is not counted).
  pub fn queued(&self) -> usize {
    self.inner.lock_state().queue.len()
  }

  /// Queue `task` behind every previously submitted task and wait for its result.
  ///
  /// Must be called from within a tokio runtime.
  pub async fn execute<T, F, Fut>(&self, task: F) -> Result<T>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
  {
    let (tx, rx) = oneshot::channel::<Result<T>>();
    let task_timeout = self.inner.config.task_timeout;

    let job: Job = Box::pin(async move {
      let outcome = match task_timeout {
        Some(limit) => match tokio::time::timeout(limit, task()).await {
          Ok(res) => res,
          Err(_) => Err(anyhow!("rate-limited task exceeded {}ms", limit.as_millis())),
        },
        None => task().await,
      };
      // The submitter may have stopped waiting; its result is discarded.
      let _ = tx.send(outcome);
    });

    let start_drain = {
      let mut state = self.inner.lock_state();
      state.queue.push_back(job);
      !std::mem::replace(&mut state.draining, true)
    };

    if start_drain {
      tokio::spawn(drain(Arc::clone(&self.inner)));
    }

    rx.await
      .map_err(|_| anyhow!("rate-limited task ended without a result (panicked)"))?
  }
}

async fn drain(inner: Arc<Inner>) {
  debug!("rate limiter: drain started");

  loop {
    let (job, last_finished) = {
      let mut state = inner.lock_state();
      match state.queue.pop_front() {
        Some(job) => (job, state.last_finished),
        None => {
          state.draining = false;
          debug!("rate limiter: queue empty, drain stopped");
          return;
        }
      }
    };

    if let Some(done) = last_finished {
      tokio::time::sleep_until(done + inner.config.delay).await;
    }

    // Run on its own task so a panic stays with that job.
    if let Err(err) = tokio::spawn(job).await {
      warn!(error = %err, "rate-limited task panicked");
    }

    inner.lock_state().last_finished = Some(Instant::now());
  }
}

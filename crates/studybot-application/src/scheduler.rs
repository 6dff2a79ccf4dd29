//! Timer-driven incremental reveal of a known answer.
//!
//! A `StreamScheduler` owns at most one reveal task. Each task ticks on a
//! Tokio interval, hands the growing prefix of its target to `on_tick`, and
//! calls `on_complete` once the whole text is out. Cancelling fires the
//! task's `CancellationToken` and aborts it, so no tick runs once `cancel`
//! has returned on the runtime's thread; owners that share state with the
//! callbacks across threads additionally refuse stale ticks under their own
//! lock by returning `ControlFlow::Break` from `on_tick`.

use std::ops::ControlFlow;
use std::time::Duration;
use studybot_core::config::StreamConfig;
use studybot_core::{Result, StudybotError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Identifies one started stream within a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u64);

struct ActiveStream {
    id: StreamId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

pub struct StreamScheduler {
    runtime: Handle,
    period: Duration,
    chars_per_tick: usize,
    next_id: u64,
    active: Option<ActiveStream>,
}

impl StreamScheduler {
    /// Creates a scheduler bound to the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when called outside a Tokio runtime.
    pub fn new(config: &StreamConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| StudybotError::runtime(e.to_string()))?;
        Ok(Self::with_handle(config, runtime))
    }

    /// Creates a scheduler that spawns its reveal tasks on `runtime`.
    pub fn with_handle(config: &StreamConfig, runtime: Handle) -> Self {
        Self {
            runtime,
            period: Duration::from_millis(config.tick_ms.max(1)),
            chars_per_tick: config.chars_per_tick.max(1),
            next_id: 0,
            active: None,
        }
    }

    /// Starts revealing `target`, cancelling any stream still in flight.
    ///
    /// The first tick fires one period after the call. `on_tick` receives the
    /// revealed prefix; returning `ControlFlow::Break` stops the stream without
    /// completing it. `on_complete` runs exactly once, after the tick that
    /// revealed the last character.
    pub fn start<T, C>(&mut self, target: String, on_tick: T, on_complete: C) -> StreamId
    where
        T: FnMut(&str) -> ControlFlow<()> + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = StreamId(self.next_id);
        let token = CancellationToken::new();

        tracing::debug!(
            "[Scheduler] Starting stream {:?} ({} chars)",
            id,
            target.chars().count()
        );

        let first_tick = Instant::now() + self.period;
        let task = self.runtime.spawn(reveal(
            target,
            first_tick,
            self.period,
            self.chars_per_tick,
            token.clone(),
            on_tick,
            on_complete,
        ));

        self.active = Some(ActiveStream { id, token, task });
        id
    }

    /// Stops the active stream, if any. Idempotent.
    ///
    /// Returns the id of the stream that was stopped.
    pub fn cancel(&mut self) -> Option<StreamId> {
        let active = self.active.take()?;
        active.token.cancel();
        active.task.abort();
        tracing::debug!("[Scheduler] Cancelled stream {:?}", active.id);
        Some(active.id)
    }

    /// Forgets a stream that completed on its own. No-op for other ids.
    ///
    /// Safe to call from the stream's own `on_complete`.
    pub fn release(&mut self, id: StreamId) -> bool {
        if self.active.as_ref().is_some_and(|a| a.id == id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Whether a started stream has neither finished nor been cancelled.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| !a.token.is_cancelled() && !a.task.is_finished())
    }

    pub fn active_id(&self) -> Option<StreamId> {
        self.active.as_ref().map(|a| a.id)
    }
}

impl Drop for StreamScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for StreamScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamScheduler")
            .field("period", &self.period)
            .field("chars_per_tick", &self.chars_per_tick)
            .field("active", &self.active_id())
            .finish()
    }
}

async fn reveal<T, C>(
    target: String,
    first_tick: Instant,
    period: Duration,
    chars_per_tick: usize,
    token: CancellationToken,
    mut on_tick: T,
    on_complete: C,
) where
    T: FnMut(&str) -> ControlFlow<()>,
    C: FnOnce(),
{
    // Byte offset just past each character.
    let ends: Vec<usize> = target
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .collect();
    let mut revealed = 0usize;

    let mut ticker = time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            _ = ticker.tick() => {}
        }
        if token.is_cancelled() {
            return;
        }

        revealed = (revealed + chars_per_tick).min(ends.len());
        let end = revealed.checked_sub(1).map_or(0, |last| ends[last]);
        if on_tick(&target[..end]).is_break() {
            tracing::debug!("[Scheduler] Stream refused by owner after {} chars", revealed);
            return;
        }

        if revealed == ends.len() {
            on_complete();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn config(tick_ms: u64, chars_per_tick: usize) -> StreamConfig {
        StreamConfig {
            tick_ms,
            chars_per_tick,
        }
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let err = StreamScheduler::new(&StreamConfig::default()).unwrap_err();
        assert!(err.is_runtime());
        assert!(err.to_string().starts_with("Runtime error"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_multibyte_text_never_splits_chars() {
        let mut scheduler = StreamScheduler::new(&config(5, 2)).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        scheduler.start(
            "héllo 🦀".to_string(),
            move |partial| {
                sink.lock().unwrap().push(partial.to_string());
                ControlFlow::Continue(())
            },
            || {},
        );
        time::sleep(Duration::from_millis(100)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec!["hé", "héll", "héllo ", "héllo 🦀"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_target_completes_on_first_tick() {
        let mut scheduler = StreamScheduler::new(&config(12, 1)).unwrap();
        let done = Arc::new(Mutex::new(0));
        let counter = done.clone();
        scheduler.start(
            String::new(),
            |_| ControlFlow::Continue(()),
            move || *counter.lock().unwrap() += 1,
        );
        time::sleep(Duration::from_millis(13)).await;
        assert_eq!(*done.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_stops_without_completion() {
        let mut scheduler = StreamScheduler::new(&config(10, 1)).unwrap();
        let ticks = Arc::new(Mutex::new(0));
        let completed = Arc::new(Mutex::new(false));
        let (t, c) = (ticks.clone(), completed.clone());

        scheduler.start(
            "abcdef".to_string(),
            move |_| {
                let mut n = t.lock().unwrap();
                *n += 1;
                if *n == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
            move || *c.lock().unwrap() = true,
        );
        time::sleep(Duration::from_millis(200)).await;

        assert_eq!(*ticks.lock().unwrap(), 2);
        assert!(!*completed.lock().unwrap());
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_only_matches_active_id() {
        let mut scheduler = StreamScheduler::new(&config(10, 1)).unwrap();
        let first = scheduler.start("a".to_string(), |_| ControlFlow::Continue(()), || {});
        let second = scheduler.start("b".to_string(), |_| ControlFlow::Continue(()), || {});
        assert_ne!(first, second);
        assert!(!scheduler.release(first));
        assert_eq!(scheduler.active_id(), Some(second));
        assert!(scheduler.release(second));
        assert_eq!(scheduler.active_id(), None);
    }
}

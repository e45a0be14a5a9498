//! Timer service: one-shot timers with handle-scoped cancellation
//!
//! Components never sleep or poll. They ask a [`TimerService`] for a one-shot
//! timer and keep the returned [`TimerHandle`]. When the timer fires, its
//! [`TimerId`] is delivered back to the host, which routes it to the component
//! that owns the handle. Dropping a handle cancels the timer.
//!
//! Two implementations:
//! - [`TokioTimers`]: real time, one tokio task per timer, fired ids arrive on
//!   an mpsc channel.
//! - [`ManualClock`]: virtual time for tests and scripted replay.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Identifies one scheduled timer. Ids are never reused by a service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Owning handle for a pending timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    cancel: CancellationToken,
}

impl TimerHandle {
    fn new(id: TimerId, cancel: CancellationToken) -> Self {
        Self { id, cancel }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// True if `id` refers to this handle's timer.
    pub fn owns(&self, id: TimerId) -> bool {
        self.id == id
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Schedules one-shot timers and reports elapsed time.
pub trait TimerService: Send + Sync {
    /// Schedule a timer that fires once after `delay`.
    fn schedule(&self, delay: Duration) -> TimerHandle;

    /// Time elapsed since the service was created.
    fn now(&self) -> Duration;
}

pub type SharedTimers = Arc<dyn TimerService>;

// ---------------------------------------------------------------------------
// TokioTimers
// ---------------------------------------------------------------------------

/// Real-time timers backed by `tokio::time`.
///
/// Must be used from within a tokio runtime. Fired ids are sent on the channel
/// returned by [`TokioTimers::new`]; a fired id may still arrive after its
/// handle was dropped, so owners must compare ids before acting.
pub struct TokioTimers {
    tx: mpsc::UnboundedSender<TimerId>,
    next_id: AtomicU64,
    origin: tokio::time::Instant,
}

impl TokioTimers {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            tx,
            next_id: AtomicU64::new(1),
            origin: tokio::time::Instant::now(),
        };
        (timers, rx)
    }
}

impl TimerService for TokioTimers {
    fn schedule(&self, delay: Duration) -> TimerHandle {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("{} cancelled", id);
                }
                _ = tokio::time::sleep(delay) => {
                    if !token.is_cancelled() {
                        let _ = tx.send(id);
                    }
                }
            }
        });

        TimerHandle::new(id, cancel)
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    /// (deadline, id) -> cancellation token. The id breaks deadline ties in
    /// scheduling order.
    pending: BTreeMap<(Duration, u64), CancellationToken>,
}

/// Deterministic virtual clock. Time only moves through [`ManualClock::advance`].
#[derive(Default)]
pub struct ManualClock {
    state: Mutex<ClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move time forward by `by`, calling `on_fire` for every timer that comes
    /// due, in deadline order. Timers scheduled from inside `on_fire` fire in
    /// the same call if their deadline falls within the window.
    pub fn advance(&self, by: Duration, mut on_fire: impl FnMut(TimerId)) {
        let target = self.lock().now + by;
        while let Some(id) = self.pop_due(target) {
            on_fire(id);
        }
        let mut state = self.lock();
        if state.now < target {
            state.now = target;
        }
    }

    /// Fire every timer due within `by` and collect their ids. Timers scheduled
    /// as a consequence are not observed by the caller in between.
    pub fn advance_collect(&self, by: Duration) -> Vec<TimerId> {
        let mut fired = Vec::new();
        self.advance(by, |id| fired.push(id));
        fired
    }

    /// Number of live (not cancelled) pending timers.
    pub fn pending(&self) -> usize {
        let mut state = self.lock();
        state.pending.retain(|_, token| !token.is_cancelled());
        state.pending.len()
    }

    /// Deadline of the earliest live timer, relative to now.
    pub fn next_deadline(&self) -> Option<Duration> {
        let mut state = self.lock();
        state.pending.retain(|_, token| !token.is_cancelled());
        let now = state.now;
        state.pending.keys().next().map(|(deadline, _)| deadline.saturating_sub(now))
    }

    fn pop_due(&self, target: Duration) -> Option<TimerId> {
        let mut state = self.lock();
        loop {
            let (&(deadline, raw), _) = state.pending.iter().next()?;
            if deadline > target {
                return None;
            }
            let token = state.pending.remove(&(deadline, raw))?;
            if token.is_cancelled() {
                continue;
            }
            if state.now < deadline {
                state.now = deadline;
            }
            return Some(TimerId(raw));
        }
    }
}

impl TimerService for ManualClock {
    fn schedule(&self, delay: Duration) -> TimerHandle {
        let mut state = self.lock();
        state.next_id += 1;
        let raw = state.next_id;
        let deadline = state.now + delay;
        let cancel = CancellationToken::new();
        state.pending.insert((deadline, raw), cancel.clone());
        TimerHandle::new(TimerId(raw), cancel)
    }

    fn now(&self) -> Duration {
        self.lock().now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn manual_clock_fires_in_deadline_order() {
        let clock = ManualClock::new();
        let late = clock.schedule(ms(30));
        let early = clock.schedule(ms(10));
        let fired = clock.advance_collect(ms(50));
        assert_eq!(fired, vec![early.id(), late.id()]);
        assert_eq!(clock.now(), ms(50));
    }

    #[test]
    fn manual_clock_ties_fire_in_schedule_order() {
        let clock = ManualClock::new();
        let a = clock.schedule(ms(10));
        let b = clock.schedule(ms(10));
        assert_eq!(clock.advance_collect(ms(10)), vec![a.id(), b.id()]);
    }

    #[test]
    fn manual_clock_does_not_fire_early() {
        let clock = ManualClock::new();
        let _h = clock.schedule(ms(100));
        assert!(clock.advance_collect(ms(99)).is_empty());
        assert_eq!(clock.advance_collect(ms(1)).len(), 1);
    }

    #[test]
    fn dropped_handle_never_fires() {
        let clock = ManualClock::new();
        let h = clock.schedule(ms(10));
        drop(h);
        assert!(clock.advance_collect(ms(100)).is_empty());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn chained_timers_fire_within_one_advance() {
        let clock = ManualClock::new();
        let mut handles = vec![clock.schedule(ms(10))];
        let mut fired_at = Vec::new();
        clock.advance(ms(35), |_| {
            fired_at.push(clock.now());
            handles.push(clock.schedule(ms(10)));
        });
        assert_eq!(fired_at, vec![ms(10), ms(20), ms(30)]);
        assert_eq!(clock.now(), ms(35));
        assert_eq!(clock.next_deadline(), Some(ms(5)));
    }

    #[test]
    fn zero_delay_fires_on_zero_advance() {
        let clock = ManualClock::new();
        let h = clock.schedule(Duration::ZERO);
        assert_eq!(clock.advance_collect(Duration::ZERO), vec![h.id()]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timers_deliver_fired_id() {
        let (timers, mut rx) = TokioTimers::new();
        let handle = timers.schedule(ms(200));
        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, handle.id());
        assert!(timers.now() >= ms(200));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timers_cancelled_on_drop() {
        let (timers, mut rx) = TokioTimers::new();
        let cancelled = timers.schedule(ms(100));
        let kept = timers.schedule(ms(300));
        drop(cancelled);
        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, kept.id());
    }
}

//! Transient toast notifications
//!
//! A single slot: a new toast replaces whatever is showing. Expiry is measured
//! on an injected [`Clock`] so tests can move time forward by hand.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Default time a toast stays visible
pub const DEFAULT_TTL_SECONDS: i64 = 4;

/// Time source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub text: String,
    pub kind: ToastKind,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Toast>,
    next_id: u64,
}

pub struct NotificationCenter {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slot: Mutex<Slot>,
}

impl NotificationCenter {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(Arc::new(SystemClock), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replace-or-enqueue into the single slot.
    ///
    /// Returns the toast that was pre-empted, if one was still live.
    pub fn notify(&self, text: impl Into<String>, kind: ToastKind) -> Option<Toast> {
        let now = self.clock.now();
        let mut slot = self.slot.lock();
        slot.next_id += 1;

        let toast = Toast {
            id: slot.next_id,
            text: text.into(),
            kind,
            expires_at: now + self.ttl,
        };
        tracing::debug!("Toast #{} ({:?}): {}", toast.id, kind, toast.text);

        slot.current
            .replace(toast)
            .filter(|previous| !previous.is_expired(now))
    }

    pub fn success(&self, text: impl Into<String>) -> Option<Toast> {
        self.notify(text, ToastKind::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> Option<Toast> {
        self.notify(text, ToastKind::Error)
    }

    /// Clear the message before its timer runs out
    pub fn dismiss(&self) -> Option<Toast> {
        self.slot.lock().current.take()
    }

    /// The live toast, if any. Never returns an expired one.
    pub fn current(&self) -> Option<Toast> {
        self.tick();
        self.slot.lock().current.clone()
    }

    /// Drop the toast if its TTL elapsed; returns whether one was dropped
    pub fn tick(&self) -> bool {
        let now = self.clock.now();
        let mut slot = self.slot.lock();
        let expired = slot
            .current
            .as_ref()
            .is_some_and(|toast| toast.is_expired(now));
        if expired {
            if let Some(toast) = slot.current.take() {
                tracing::debug!("Toast #{} expired", toast.id);
            }
        }
        expired
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_system_clock(Duration::seconds(DEFAULT_TTL_SECONDS))
    }
}

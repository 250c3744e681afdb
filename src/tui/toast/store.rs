//! Toast queue with subscribe/notify
//!
//! Every toast gets a timer when it is enqueued and dismisses itself once the
//! timer fires. The store keeps all live toasts; how many are shown is up to
//! the view.

use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
    time::Duration,
};
use tokio::{runtime::Handle, task::AbortHandle};
use tracing::{debug, warn};
use uuid::Uuid;

/// Kind of notification, which also decides how long it stays up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastVariant {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastVariant {
    pub fn duration(self, timings: &ToastTimings) -> Duration {
        match self {
            Self::Success | Self::Info => timings.short,
            Self::Error | Self::Warning => timings.long,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Auto-dismiss delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTimings {
    /// Success and info toasts
    pub short: Duration,
    /// Error and warning toasts
    pub long: Duration,
}

impl Default for ToastTimings {
    fn default() -> Self {
        Self {
            short: Duration::from_millis(5000),
            long: Duration::from_millis(8000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(Uuid);

impl ToastId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub variant: ToastVariant,
    pub created_at: DateTime<Utc>,
}

/// Called with the full list of toasts after every change
pub type ToastSubscriber = Arc<dyn Fn(&[Toast]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

#[derive(Default)]
struct Inner {
    toasts: Vec<Toast>,
    timers: HashMap<ToastId, AbortHandle>,
    subscribers: BTreeMap<SubscriberId, ToastSubscriber>,
    next_subscriber: u64,
    timings: ToastTimings,
}

impl Inner {
    /// Snapshot handed to subscribers once the lock is released
    fn notification(&self) -> (Vec<Toast>, Vec<ToastSubscriber>) {
        (self.toasts.clone(), self.subscribers.values().cloned().collect())
    }
}

/// Shared handle to a toast queue. Clones refer to the same queue.
#[derive(Clone, Default)]
pub struct ToastStore {
    inner: Arc<Mutex<Inner>>,
}

impl ToastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timings(timings: ToastTimings) -> Self {
        let store = Self::new();
        store.set_timings(timings);
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a panicking subscriber never runs under the lock, so the data is intact
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn timings(&self) -> ToastTimings {
        self.lock().timings
    }

    /// Applies to toasts enqueued from now on
    pub fn set_timings(&self, timings: ToastTimings) {
        self.lock().timings = timings;
    }

    /// Append a toast, start its dismiss timer and notify subscribers.
    ///
    /// The timer needs a tokio runtime; without one the toast stays until it
    /// is dismissed by hand.
    pub fn enqueue(&self, message: impl Into<String>, variant: ToastVariant) -> ToastId {
        let toast = Toast {
            id: ToastId::new(),
            message: message.into(),
            variant,
            created_at: Utc::now(),
        };
        let id = toast.id;

        let (toasts, subscribers) = {
            let mut inner = self.lock();
            let delay = variant.duration(&inner.timings);
            debug!("toast {} ({}) enqueued: {}", id, variant.label(), toast.message);
            inner.toasts.push(toast);

            match Handle::try_current() {
                Ok(handle) => {
                    let store = self.clone();
                    let task = handle.spawn(async move {
                        tokio::time::sleep(delay).await;
                        store.expire(id);
                    });
                    inner.timers.insert(id, task.abort_handle());
                }
                Err(_) => warn!("no tokio runtime, toast {} will not auto-dismiss", id),
            }
            inner.notification()
        };

        notify(&subscribers, &toasts);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.enqueue(message, ToastVariant::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.enqueue(message, ToastVariant::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> ToastId {
        self.enqueue(message, ToastVariant::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.enqueue(message, ToastVariant::Info)
    }

    /// Remove a toast and cancel its timer. Unknown ids are ignored.
    pub fn dismiss(&self, id: ToastId) {
        let notification = {
            let mut inner = self.lock();
            if let Some(timer) = inner.timers.remove(&id) {
                timer.abort();
            }
            Self::remove(&mut inner, id)
        };
        if let Some((toasts, subscribers)) = notification {
            notify(&subscribers, &toasts);
        }
    }

    /// Timer path: the task is finishing, so there is nothing to abort
    fn expire(&self, id: ToastId) {
        let notification = {
            let mut inner = self.lock();
            inner.timers.remove(&id);
            Self::remove(&mut inner, id)
        };
        if let Some((toasts, subscribers)) = notification {
            debug!("toast {} expired", id);
            notify(&subscribers, &toasts);
        }
    }

    fn remove(inner: &mut Inner, id: ToastId) -> Option<(Vec<Toast>, Vec<ToastSubscriber>)> {
        let position = inner.toasts.iter().position(|toast| toast.id == id)?;
        inner.toasts.remove(position);
        debug!("toast {} dismissed", id);
        Some(inner.notification())
    }

    /// Drop every toast and cancel all timers
    pub fn clear(&self) {
        let (toasts, subscribers) = {
            let mut inner = self.lock();
            for (_, timer) in inner.timers.drain() {
                timer.abort();
            }
            inner.toasts.clear();
            inner.notification()
        };
        notify(&subscribers, &toasts);
    }

    pub fn subscribe(&self, subscriber: impl Fn(&[Toast]) + Send + Sync + 'static) -> SubscriberId {
        let mut inner = self.lock();
        let id = SubscriberId(inner.next_subscriber);
        inner.next_subscriber += 1;
        inner.subscribers.insert(id, Arc::new(subscriber));
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    /// All live toasts, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.clone()
    }

    /// The newest `max` toasts, newest first
    pub fn visible(&self, max: usize) -> Vec<Toast> {
        self.lock().toasts.iter().rev().take(max).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().toasts.is_empty()
    }
}

impl fmt::Debug for ToastStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ToastStore")
            .field("toasts", &inner.toasts)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

fn notify(subscribers: &[ToastSubscriber], toasts: &[Toast]) {
    for subscriber in subscribers {
        subscriber(toasts);
    }
}

static GLOBAL: OnceLock<ToastStore> = OnceLock::new();

/// Process-wide queue shared by every page
pub fn global() -> &'static ToastStore {
    GLOBAL.get_or_init(ToastStore::new)
}

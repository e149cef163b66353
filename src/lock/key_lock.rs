//! FIFO key lock with timeout and force-release

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use crate::error::{TouchlineError, TouchlineResult};

struct Waiter {
    ticket: u64,
    grant: oneshot::Sender<()>,
}

struct Holder {
    ticket: u64,
    since: Instant,
}

#[derive(Default)]
struct KeyQueue {
    holder: Option<Holder>,
    waiters: VecDeque<Waiter>,
}

impl KeyQueue {
    /// Hand the lock to the oldest waiter that is still listening
    fn grant_next(&mut self) {
        self.holder = None;
        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.grant.send(()).is_ok() {
                self.holder = Some(Holder {
                    ticket: waiter.ticket,
                    since: Instant::now(),
                });
                return;
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.holder.is_none() && self.waiters.is_empty()
    }

    fn len(&self) -> usize {
        usize::from(self.holder.is_some()) + self.waiters.len()
    }
}

struct Inner {
    queues: Mutex<HashMap<String, KeyQueue>>,
    next_ticket: AtomicU64,
    timeout: Duration,
}

impl Inner {
    fn queues(&self) -> MutexGuard<'_, HashMap<String, KeyQueue>> {
        // The table is only touched in short non-panicking sections, so a
        // poisoned mutex still holds consistent data.
        self.queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, key: &str, ticket: u64) {
        let mut queues = self.queues();
        let Some(queue) = queues.get_mut(key) else {
            return;
        };

        match &queue.holder {
            Some(holder) if holder.ticket == ticket => queue.grant_next(),
            // Force-released earlier; the lock already belongs to someone else.
            _ => queue.waiters.retain(|w| w.ticket != ticket),
        }

        if queue.is_idle() {
            queues.remove(key);
        }
    }
}

/// Map from storage key to an ordered queue of pending operations
#[derive(Clone)]
pub struct KeyLock {
    inner: Arc<Inner>,
}

/// Exclusive access to one key. Dropping the guard releases the lock and
/// wakes the next waiter.
pub struct KeyLockGuard {
    inner: Arc<Inner>,
    key: String,
    ticket: u64,
}

impl KeyLockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyLockGuard {
    fn drop(&mut self) {
        self.inner.release(&self.key, self.ticket);
    }
}

impl std::fmt::Debug for KeyLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLockGuard")
            .field("key", &self.key)
            .field("ticket", &self.ticket)
            .finish()
    }
}

/// Removes a waiter from its queue if the acquiring future is dropped before
/// it resolves.
struct PendingTicket {
    inner: Arc<Inner>,
    key: String,
    ticket: u64,
    armed: bool,
}

impl PendingTicket {
    fn into_guard(mut self) -> KeyLockGuard {
        self.armed = false;
        KeyLockGuard {
            inner: Arc::clone(&self.inner),
            key: std::mem::take(&mut self.key),
            ticket: self.ticket,
        }
    }
}

impl Drop for PendingTicket {
    fn drop(&mut self) {
        if self.armed {
            self.inner.release(&self.key, self.ticket);
        }
    }
}

impl KeyLock {
    /// Create a lock table whose waiters give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                queues: Mutex::new(HashMap::new()),
                next_ticket: AtomicU64::new(1),
                timeout,
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Wait for exclusive access to `key`
    ///
    /// Fails with `LockTimeout` if the lock is not granted within the
    /// configured timeout. When that happens and the current holder has itself
    /// held the lock longer than the timeout, the holder is force-released so
    /// the rest of the queue can make progress.
    pub async fn acquire(&self, key: &str) -> TouchlineResult<KeyLockGuard> {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);

        let granted = {
            let mut queues = self.inner.queues();
            let queue = queues.entry(key.to_string()).or_default();
            if queue.is_idle() {
                queue.holder = Some(Holder {
                    ticket,
                    since: Instant::now(),
                });
                return Ok(KeyLockGuard {
                    inner: Arc::clone(&self.inner),
                    key: key.to_string(),
                    ticket,
                });
            }
            let (grant, granted) = oneshot::channel();
            queue.waiters.push_back(Waiter { ticket, grant });
            granted
        };

        let pending = PendingTicket {
            inner: Arc::clone(&self.inner),
            key: key.to_string(),
            ticket,
            armed: true,
        };

        let started = Instant::now();
        match tokio::time::timeout(self.inner.timeout, granted).await {
            Ok(Ok(())) => Ok(pending.into_guard()),
            Ok(Err(_)) => {
                // Sender dropped without a grant: the queue entry vanished.
                drop(pending);
                Err(TouchlineError::LockTimeout {
                    key: key.to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                })
            }
            Err(_) => self.give_up(pending, started),
        }
    }

    fn give_up(&self, pending: PendingTicket, started: Instant) -> TouchlineResult<KeyLockGuard> {
        let key = pending.key.clone();
        {
            let mut queues = self.inner.queues();
            if let Some(queue) = queues.get_mut(&key) {
                // The grant raced the timer and won.
                if queue.holder.as_ref().map(|h| h.ticket) == Some(pending.ticket) {
                    drop(queues);
                    return Ok(pending.into_guard());
                }

                queue.waiters.retain(|w| w.ticket != pending.ticket);

                let stale = queue
                    .holder
                    .as_ref()
                    .map(|h| h.since.elapsed() >= self.inner.timeout)
                    .unwrap_or(false);
                if stale {
                    tracing::warn!(
                        key = %key,
                        timeout_ms = self.inner.timeout.as_millis() as u64,
                        "force-releasing key lock held past timeout"
                    );
                    queue.grant_next();
                }

                if queue.is_idle() {
                    queues.remove(&key);
                }
            }
        }

        let mut pending = pending;
        pending.armed = false;

        let waited_ms = started.elapsed().as_millis() as u64;
        tracing::warn!(key = %key, waited_ms, "lock acquisition timed out");
        Err(TouchlineError::LockTimeout { key, waited_ms })
    }

    /// Run `operation` while holding the lock for `key`
    ///
    /// The lock is released on every exit path: success, error, panic or the
    /// returned future being dropped. Errors from `operation` are returned
    /// unchanged after release.
    pub async fn with_key_lock<F, Fut, T>(&self, key: &str, operation: F) -> TouchlineResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TouchlineResult<T>>,
    {
        let _guard = self.acquire(key).await?;
        operation().await
    }

    /// Holder plus waiters currently queued on `key`
    pub fn queue_length(&self, key: &str) -> usize {
        self.inner.queues().get(key).map(KeyQueue::len).unwrap_or(0)
    }

    pub fn is_locked(&self, key: &str) -> bool {
        self.queue_length(key) > 0
    }
}

impl Default for KeyLock {
    fn default() -> Self {
        Self::new(Duration::from_millis(10_000))
    }
}

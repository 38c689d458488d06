//! Debounce primitive.
//!
//! Values are pushed into a [`tokio::sync::watch`] channel; [`Debouncer::settled`]
//! yields a value only after the channel has stayed unchanged for the configured
//! delay. Each new value restarts the window, so only the latest value after
//! quiescence is ever emitted.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

pub struct DebounceConfig<T> {
    pub delay: Duration,
    /// Values matching this predicate are never emitted.
    pub ignore: fn(&T) -> bool,
}

impl<T> DebounceConfig<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ignore: |_| false,
        }
    }

    pub fn ignore(mut self, ignore: fn(&T) -> bool) -> Self {
        self.ignore = ignore;
        self
    }
}

pub struct Debouncer<T> {
    rx: watch::Receiver<T>,
    config: DebounceConfig<T>,
    deadline: Option<Instant>,
    last_emitted: Option<T>,
    initial: Option<T>,
    closed: bool,
}

/// Creates a debounced channel seeded with `initial`.
///
/// The initial value is emitted immediately (unless ignored); later values go
/// through the delay window. Dropping the sender flushes any pending value and
/// then ends the stream.
pub fn channel<T>(initial: T, config: DebounceConfig<T>) -> (watch::Sender<T>, Debouncer<T>)
where
    T: Clone + PartialEq,
{
    let (tx, rx) = watch::channel(initial.clone());
    let debouncer = Debouncer {
        rx,
        config,
        deadline: None,
        last_emitted: None,
        initial: Some(initial),
        closed: false,
    };
    (tx, debouncer)
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq,
{
    /// Waits for the next stable value. Returns `None` once the sender is gone
    /// and nothing is pending.
    ///
    /// Cancel safe: dropping the future keeps the pending window intact.
    pub async fn settled(&mut self) -> Option<T> {
        if let Some(value) = self.initial.take() {
            if let Some(value) = self.accept(value) {
                return Some(value);
            }
        }

        loop {
            let Some(deadline) = self.deadline else {
                if self.closed || self.rx.changed().await.is_err() {
                    self.closed = true;
                    return None;
                }
                self.deadline = Some(Instant::now() + self.config.delay);
                continue;
            };

            tokio::select! {
                changed = self.rx.changed(), if !self.closed => {
                    match changed {
                        Ok(()) => self.deadline = Some(Instant::now() + self.config.delay),
                        Err(_) => self.closed = true,
                    }
                }
                () = tokio::time::sleep_until(deadline) => {
                    self.deadline = None;
                    let value = self.rx.borrow_and_update().clone();
                    if let Some(value) = self.accept(value) {
                        return Some(value);
                    }
                }
            }
        }
    }

    fn accept(&mut self, value: T) -> Option<T> {
        if (self.config.ignore)(&value) || self.last_emitted.as_ref() == Some(&value) {
            return None;
        }
        self.last_emitted = Some(value.clone());
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_config() -> DebounceConfig<String> {
        DebounceConfig::new(DEFAULT_DELAY).ignore(String::is_empty)
    }

    #[tokio::test(start_paused = true)]
    async fn emits_initial_value_immediately() {
        let (_tx, mut debouncer) = channel("foo/bar".to_string(), string_config());
        let started = Instant::now();
        assert_eq!(debouncer.settled().await.as_deref(), Some("foo/bar"));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_collapse_to_final_value() {
        let (tx, mut debouncer) = channel(String::new(), string_config());

        let typing = tokio::spawn(async move {
            for value in ["f", "fo", "foo", "foo/", "foo/bar"] {
                tx.send_replace(value.to_string());
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });

        let started = Instant::now();
        assert_eq!(debouncer.settled().await.as_deref(), Some("foo/bar"));
        // Last edit lands at t=400ms, plus the full window.
        assert_eq!(started.elapsed(), Duration::from_millis(900));

        typing.await.unwrap();
        assert_eq!(debouncer.settled().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn each_change_restarts_the_window() {
        let (tx, mut debouncer) = channel(String::new(), string_config());
        let started = Instant::now();

        let producer = tokio::spawn(async move {
            tx.send_replace("a".to_string());
            tokio::time::sleep(Duration::from_millis(499)).await;
            tx.send_replace("ab".to_string());
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        assert_eq!(debouncer.settled().await.as_deref(), Some("ab"));
        assert_eq!(started.elapsed(), Duration::from_millis(999));
        producer.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn ignored_values_are_never_emitted() {
        let (tx, mut debouncer) = channel(String::new(), string_config());
        drop(tx);
        assert_eq!(debouncer.settled().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_value_after_quiescence_is_not_re_emitted() {
        let (tx, mut debouncer) = channel("foo/bar".to_string(), string_config());
        assert_eq!(debouncer.settled().await.as_deref(), Some("foo/bar"));

        tx.send_replace(String::new());
        tx.send_replace("foo/bar".to_string());
        drop(tx);

        assert_eq!(debouncer.settled().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_sender_flushes_pending_value_after_delay() {
        let (tx, mut debouncer) = channel(String::new(), string_config());
        tx.send_replace("foo/bar".to_string());
        drop(tx);

        let started = Instant::now();
        assert_eq!(debouncer.settled().await.as_deref(), Some("foo/bar"));
        assert_eq!(started.elapsed(), DEFAULT_DELAY);
        assert_eq!(debouncer.settled().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_keeps_pending_window() {
        let (tx, mut debouncer) = channel(String::new(), string_config());
        let idle = tokio::time::timeout(Duration::from_millis(10), debouncer.settled()).await;
        assert!(idle.is_err());

        let sent_at = Instant::now();
        tx.send_replace("foo/bar".to_string());

        let mid_window = tokio::time::timeout(Duration::from_millis(100), debouncer.settled()).await;
        assert!(mid_window.is_err());

        assert_eq!(debouncer.settled().await.as_deref(), Some("foo/bar"));
        assert_eq!(sent_at.elapsed(), DEFAULT_DELAY);
    }
}

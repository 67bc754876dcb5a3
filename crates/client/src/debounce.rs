//! Trailing-edge debounce on tokio timers.
//!
//! A value pushed into the [`Debouncer`] is delivered on its channel once no
//! newer value has been pushed for the configured delay. Dropping the
//! debouncer aborts the pending timer, so nothing is delivered after teardown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its settled values arrive on.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing any value still waiting.
    pub fn push(&mut self, value: T) {
        self.cancel();

        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value);
        }));
    }

    /// Abort the timer of a value that has not been delivered yet.
    ///
    /// A value already sent on the channel stays there; the receiver owns it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_value_settles() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(500));

        debouncer.push("w");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("wid");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("widget");

        assert_eq!(rx.recv().await, Some("widget"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn value_waits_for_the_full_delay() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(500));
        debouncer.push(1);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(rx.try_recv().is_err());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().ok(), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn values_separated_by_the_delay_both_settle() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(50));
        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(60)).await;
        debouncer.push(2);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_deliver_nothing() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(50));
        debouncer.push(1);
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        debouncer.push(2);
        drop(debouncer);
        // Sender side is gone once the aborted task is dropped.
        assert_eq!(rx.recv().await, None);
    }
}

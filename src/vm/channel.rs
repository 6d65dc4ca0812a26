//! Point-to-point integer channels
//!
//! A `Channel` is an unbounded FIFO queue shared by exactly one producer and
//! one consumer. Cloning a channel yields another endpoint of the same queue,
//! so a single value can be wired as one machine's output and another
//! machine's input.
//!
//! A sealed channel holds a fixed list of values and accepts no more; popping
//! it once empty fails with `VMError::ChannelClosed` instead of waiting.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use log::warn;
use tokio::sync::Mutex;

use crate::vm::errors::VMError;

/// Unbounded, order-preserving queue of integers
#[derive(Debug, Clone)]
pub struct Channel {
    tx: Option<UnboundedSender<i64>>,
    rx: Arc<Mutex<UnboundedReceiver<i64>>>,
}

impl Channel {
    /// Create an empty channel
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: Some(tx),
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Create a channel pre-loaded with `values`
    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let channel = Self::new();
        for value in values {
            channel.push(value);
        }
        channel
    }

    /// Create a channel holding exactly `values`; once they are consumed,
    /// `pop` reports `ChannelClosed`
    pub fn sealed<I>(values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let mut channel = Self::with_values(values);
        channel.tx = None;
        channel
    }

    pub fn is_sealed(&self) -> bool {
        self.tx.is_none()
    }

    /// Append a value; never blocks. Values pushed to a sealed channel are
    /// dropped.
    pub fn push(&self, value: i64) {
        match &self.tx {
            // The receiver lives as long as `self`, so the send cannot fail.
            Some(tx) => {
                let _ = tx.send(value);
            }
            None => warn!("dropping {} pushed to a sealed channel", value),
        }
    }

    /// Remove the oldest value, waiting until one is available
    pub async fn pop(&self) -> Result<i64, VMError> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(VMError::ChannelClosed)
    }

    /// Like `pop`, but gives up after `timeout`
    pub async fn try_pop(&self, timeout: Duration) -> Option<i64> {
        tokio::time::timeout(timeout, self.pop())
            .await
            .ok()
            .and_then(Result::ok)
    }

    /// Remove the oldest value if one is queued right now
    pub fn try_pop_now(&self) -> Option<i64> {
        let mut rx = self.rx.try_lock().ok()?;
        rx.try_recv().ok()
    }

    /// Remove everything queued right now, oldest first
    pub fn drain(&self) -> Vec<i64> {
        let mut values = Vec::new();
        while let Some(value) = self.try_pop_now() {
            values.push(value);
        }
        values
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_pop_order() {
        let channel = Channel::new();
        channel.push(1);
        channel.push(2);
        channel.push(3);

        assert_eq!(channel.pop().await.unwrap(), 1);
        assert_eq!(channel.pop().await.unwrap(), 2);
        assert_eq!(channel.drain(), vec![3]);
    }

    #[tokio::test]
    async fn test_try_pop_times_out() {
        let channel = Channel::new();
        assert_eq!(channel.try_pop(Duration::from_millis(10)).await, None);
        assert_eq!(channel.try_pop_now(), None);
    }

    #[tokio::test]
    async fn test_clone_shares_queue() {
        let producer = Channel::with_values([5]);
        let consumer = producer.clone();
        producer.push(6);

        assert_eq!(consumer.pop().await.unwrap(), 5);
        assert_eq!(consumer.pop().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_sealed_channel_runs_dry() {
        let channel = Channel::sealed([4, 5]);
        assert!(channel.is_sealed());
        channel.push(6);

        assert_eq!(channel.pop().await.unwrap(), 4);
        assert_eq!(channel.clone().pop().await.unwrap(), 5);
        assert_eq!(channel.pop().await, Err(VMError::ChannelClosed));
        assert_eq!(channel.try_pop(Duration::from_secs(5)).await, None);
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let channel = Channel::new();
        let consumer = channel.clone();
        let waiter = tokio::spawn(async move { consumer.pop().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        channel.push(9);

        assert_eq!(waiter.await.unwrap().unwrap(), 9);
    }
}

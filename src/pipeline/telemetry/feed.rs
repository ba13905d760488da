use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::models::SensorReading;

/// Key under which the device feed publishes biometric samples.
pub const HEALTH_DATA_KEY: &str = "health_data";

struct Channel {
    sender: watch::Sender<Option<SensorReading>>,
    subscribers: Arc<AtomicUsize>,
}

impl Channel {
    fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Keyed push feed of sensor readings.
///
/// Each key holds only its newest value. Slow subscribers skip
/// intermediate samples rather than queueing them.
#[derive(Default)]
pub struct TelemetryFeed {
    channels: Mutex<HashMap<String, Channel>>,
}

impl TelemetryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_channel<T>(&self, key: &str, f: impl FnOnce(&Channel) -> T) -> T {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let channel = channels.entry(key.to_string()).or_insert_with(Channel::new);
        f(channel)
    }

    /// Replace the value under `key` and wake every subscriber.
    pub fn publish(&self, key: &str, reading: SensorReading) {
        self.with_channel(key, |channel| {
            channel.sender.send_replace(Some(reading));
        });
        tracing::trace!(key, timestamp = reading.timestamp, "Telemetry published");
    }

    pub fn subscribe(&self, key: &str) -> TelemetrySubscription {
        let (receiver, subscribers) = self.with_channel(key, |channel| {
            (channel.sender.subscribe(), Arc::clone(&channel.subscribers))
        });
        let count = subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(key, subscribers = count, "Telemetry subscription opened");
        TelemetrySubscription {
            key: key.to_string(),
            receiver,
            subscribers,
        }
    }

    pub fn latest(&self, key: &str) -> Option<SensorReading> {
        let channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        channels.get(key).and_then(|c| *c.sender.borrow())
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        let channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        channels
            .get(key)
            .map(|c| c.subscribers.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

/// Scoped subscription to one feed key. Dropping it unsubscribes.
pub struct TelemetrySubscription {
    key: String,
    receiver: watch::Receiver<Option<SensorReading>>,
    subscribers: Arc<AtomicUsize>,
}

impl TelemetrySubscription {
    /// Wait for the next published reading.
    ///
    /// Returns `None` once the feed itself has been dropped.
    pub async fn next(&mut self) -> Option<SensorReading> {
        loop {
            self.receiver.changed().await.ok()?;
            if let Some(reading) = *self.receiver.borrow_and_update() {
                return Some(reading);
            }
        }
    }
}

impl Drop for TelemetrySubscription {
    fn drop(&mut self) {
        let remaining = self.subscribers.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        tracing::debug!(key = %self.key, subscribers = remaining, "Telemetry subscription closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reading(ts: i64) -> SensorReading {
        SensorReading::new(70.0, 98.0, 1.0, ts)
    }

    #[test]
    fn latest_is_none_before_publish() {
        let feed = TelemetryFeed::new();
        assert!(feed.latest(HEALTH_DATA_KEY).is_none());
    }

    #[test]
    fn latest_returns_last_published() {
        let feed = TelemetryFeed::new();
        feed.publish(HEALTH_DATA_KEY, reading(1));
        feed.publish(HEALTH_DATA_KEY, reading(2));
        assert_eq!(feed.latest(HEALTH_DATA_KEY).unwrap().timestamp, 2);
    }

    #[test]
    fn keys_are_independent() {
        let feed = TelemetryFeed::new();
        feed.publish("other", reading(9));
        assert!(feed.latest(HEALTH_DATA_KEY).is_none());
    }

    #[test]
    fn dropping_subscription_releases_it() {
        let feed = TelemetryFeed::new();
        let first = feed.subscribe(HEALTH_DATA_KEY);
        let second = feed.subscribe(HEALTH_DATA_KEY);
        assert_eq!(feed.subscriber_count(HEALTH_DATA_KEY), 2);
        drop(first);
        assert_eq!(feed.subscriber_count(HEALTH_DATA_KEY), 1);
        drop(second);
        assert_eq!(feed.subscriber_count(HEALTH_DATA_KEY), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_pushed_reading() {
        let feed = TelemetryFeed::new();
        let mut sub = feed.subscribe(HEALTH_DATA_KEY);
        feed.publish(HEALTH_DATA_KEY, reading(5));

        let got = tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.timestamp, 5);
    }

    #[tokio::test]
    async fn slow_subscriber_sees_only_newest() {
        let feed = TelemetryFeed::new();
        let mut sub = feed.subscribe(HEALTH_DATA_KEY);
        feed.publish(HEALTH_DATA_KEY, reading(1));
        feed.publish(HEALTH_DATA_KEY, reading(2));
        feed.publish(HEALTH_DATA_KEY, reading(3));

        assert_eq!(sub.next().await.unwrap().timestamp, 3);
        let pending = tokio::time::timeout(Duration::from_millis(50), sub.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn subscription_ends_when_feed_dropped() {
        let feed = TelemetryFeed::new();
        let mut sub = feed.subscribe(HEALTH_DATA_KEY);
        drop(feed);
        assert!(sub.next().await.is_none());
    }
}

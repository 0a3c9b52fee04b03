//! Change notification.
//!
//! Every accepted mutation emits a [`ChangeSignal`] keyed by user before the
//! store is touched. The signal carries no data: consumers re-read the user's
//! state and recompute, so a duplicate or spurious signal is harmless.
//!
//! [`ChannelNotifier`] is the producer side of a bounded in-process channel;
//! [`ChangeConsumer`] is the matching message loop a downstream recalculation
//! worker runs.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{EngineError, ResultEngine};

/// Body of every change signal: "recompute this user".
pub const RECOMPUTE_BODY: &str = "update";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeSignal {
    pub user_uid: String,
    pub body: String,
}

impl ChangeSignal {
    pub fn recompute(user_uid: impl Into<String>) -> Self {
        Self {
            user_uid: user_uid.into(),
            body: RECOMPUTE_BODY.to_string(),
        }
    }
}

/// Producer side of the change channel.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn notify(&self, user_uid: &str) -> ResultEngine<()>;
}

#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<ChangeSignal>,
}

impl ChannelNotifier {
    /// Creates a bounded change channel. `notify` waits while it is full.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ChangeSignal>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ChangeNotifier for ChannelNotifier {
    async fn notify(&self, user_uid: &str) -> ResultEngine<()> {
        self.sender
            .send(ChangeSignal::recompute(user_uid))
            .await
            .map_err(|_| EngineError::Notification("change channel closed".to_string()))?;
        tracing::debug!(user_uid, "change signal sent");
        Ok(())
    }
}

/// Downstream handler run once per received signal.
#[async_trait]
pub trait Recalculator: Send + Sync {
    async fn recalculate(&self, user_uid: &str) -> ResultEngine<()>;
}

/// Counters reported by [`ChangeConsumer::run`] when the loop stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub processed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub acknowledged: u64,
}

/// Message loop feeding change signals to a [`Recalculator`].
///
/// Messages are handled one at a time. A message is acknowledged once it has
/// been handled, whether the recalculation succeeded or not, so one bad user
/// cannot stall the queue.
pub struct ChangeConsumer<R> {
    receiver: mpsc::Receiver<ChangeSignal>,
    recalculator: R,
}

impl<R: Recalculator> ChangeConsumer<R> {
    pub fn new(receiver: mpsc::Receiver<ChangeSignal>, recalculator: R) -> Self {
        Self {
            receiver,
            recalculator,
        }
    }

    /// Runs until `cancel` fires or every producer is gone.
    pub async fn run(mut self, cancel: CancellationToken) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        loop {
            let signal = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("change consumer cancelled");
                    break;
                }
                signal = self.receiver.recv() => signal,
            };
            let Some(signal) = signal else {
                tracing::info!("change channel closed, consumer stopping");
                break;
            };
            self.handle(signal, &mut stats).await;
            stats.acknowledged += 1;
        }
        stats
    }

    async fn handle(&self, signal: ChangeSignal, stats: &mut ConsumerStats) {
        if signal.user_uid.is_empty() {
            tracing::error!("change signal without user id");
            stats.skipped += 1;
            return;
        }
        if signal.body != RECOMPUTE_BODY {
            tracing::debug!(body = signal.body.as_str(), "unknown change body, recomputing anyway");
        }

        match self.recalculator.recalculate(&signal.user_uid).await {
            Ok(()) => {
                tracing::info!(user_uid = signal.user_uid.as_str(), "user recalculated");
                stats.processed += 1;
            }
            Err(err) => {
                tracing::error!(
                    user_uid = signal.user_uid.as_str(),
                    "recalculation failed: {err}"
                );
                stats.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Recording {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Recalculator for Recording {
        async fn recalculate(&self, user_uid: &str) -> ResultEngine<()> {
            self.seen.lock().unwrap().push(user_uid.to_string());
            if user_uid == "broken" {
                return Err(EngineError::NotFound("broken".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn notifier_sends_keyed_update_signal() {
        let (notifier, mut rx) = ChannelNotifier::channel(4);
        notifier.notify("alice").await.unwrap();
        assert_eq!(rx.recv().await, Some(ChangeSignal::recompute("alice")));
        assert_eq!(
            ChangeSignal::recompute("alice").body,
            RECOMPUTE_BODY.to_string()
        );
    }

    #[tokio::test]
    async fn notifier_fails_when_channel_closed() {
        let (notifier, rx) = ChannelNotifier::channel(4);
        drop(rx);
        let err = notifier.notify("alice").await.unwrap_err();
        assert!(matches!(err, EngineError::Notification(_)));
    }

    #[tokio::test]
    async fn consumer_acknowledges_failures_and_keeps_going() {
        let (notifier, rx) = ChannelNotifier::channel(8);
        for user in ["alice", "broken", "bob"] {
            notifier.notify(user).await.unwrap();
        }
        drop(notifier);

        let recording = Recording::default();
        let stats = ChangeConsumer::new(rx, recording.clone())
            .run(CancellationToken::new())
            .await;

        assert_eq!(
            stats,
            ConsumerStats {
                processed: 2,
                failed: 1,
                skipped: 0,
                acknowledged: 3,
            }
        );
        assert_eq!(
            *recording.seen.lock().unwrap(),
            vec!["alice".to_string(), "broken".to_string(), "bob".to_string()]
        );
    }

    #[tokio::test]
    async fn consumer_skips_signals_without_user() {
        let (sender, rx) = mpsc::channel(2);
        sender
            .send(ChangeSignal {
                user_uid: String::new(),
                body: RECOMPUTE_BODY.to_string(),
            })
            .await
            .unwrap();
        drop(sender);

        let recording = Recording::default();
        let stats = ChangeConsumer::new(rx, recording.clone())
            .run(CancellationToken::new())
            .await;

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.acknowledged, 1);
        assert!(recording.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn consumer_stops_on_cancellation() {
        let (_notifier, rx) = ChannelNotifier::channel(2);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let recording = Recording::default();
        let stats = ChangeConsumer::new(rx, recording.clone()).run(cancel).await;
        assert_eq!(stats, ConsumerStats::default());
    }
}

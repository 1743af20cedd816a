//! Expiry sweeper.
//!
//! Background task that wakes up on a fixed interval, takes every queued
//! deletion whose deadline has passed and asks Telegram to delete it.
//! Deletion is best effort: an entry is removed from the queue before the
//! delete call and is never requeued, even if the call fails.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, MessageId};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::messenger::Messenger;
use crate::database::ExpiryQueue;
use crate::error::ModerationError;

/// Entries taken from the queue per round trip.
const SWEEP_BATCH_SIZE: usize = 100;

/// Result of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.deleted + self.failed
    }
}

/// Periodic deleter for queued messages.
pub struct Sweeper {
    queue: Arc<dyn ExpiryQueue>,
    messenger: Arc<dyn Messenger>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(queue: Arc<dyn ExpiryQueue>, messenger: Arc<dyn Messenger>, interval: Duration) -> Self {
        Self {
            queue,
            messenger,
            interval,
        }
    }

    /// Delete everything due at `now`.
    ///
    /// Each due entry is handed out by the queue exactly once, so running
    /// two ticks back to back deletes nothing the second time.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<SweepReport, ModerationError> {
        let mut report = SweepReport::default();

        loop {
            let due = self
                .queue
                .take_due(now, SWEEP_BATCH_SIZE)
                .await
                .map_err(ModerationError::storage)?;
            let exhausted = due.len() < SWEEP_BATCH_SIZE;

            for entry in due {
                let result = self
                    .messenger
                    .delete_message(ChatId(entry.chat_id), MessageId(entry.message_id))
                    .await;

                match result {
                    Ok(()) => report.deleted += 1,
                    Err(e) => {
                        warn!("Sweeper: {}", e);
                        report.failed += 1;
                    }
                }
            }

            if exhausted {
                return Ok(report);
            }
        }
    }

    /// Run the sweeper in the background until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Sweeper started (every {}s)", self.interval.as_secs());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Sweeper stopped");
                    return;
                }
                _ = interval.tick() => {}
            }

            match self.run_tick(Utc::now()).await {
                Ok(report) if report.total() > 0 => {
                    info!(
                        "Sweeper: deleted {} messages ({} failed)",
                        report.deleted, report.failed
                    );
                }
                Ok(_) => debug!("Sweeper: nothing due"),
                Err(e) => warn!("Sweeper tick failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, ScheduledDeletion};
    use crate::moderation::testing::{at, RecordingMessenger, UnavailableStore};

    const CHAT: i64 = -1001;

    fn setup() -> (Arc<MemoryStore>, Arc<RecordingMessenger>, Sweeper) {
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let sweeper = Sweeper::new(store.clone(), messenger.clone(), Duration::from_secs(60));
        (store, messenger, sweeper)
    }

    #[tokio::test]
    async fn test_deletes_only_due_entries() {
        let (store, messenger, sweeper) = setup();
        store
            .enqueue(ScheduledDeletion::new(CHAT, 1, at(1000), at(1300)))
            .await
            .unwrap();

        let early = sweeper.run_tick(at(1200)).await.unwrap();
        assert_eq!(early, SweepReport::default());
        assert!(messenger.deleted().is_empty());

        let late = sweeper.run_tick(at(1301)).await.unwrap();
        assert_eq!(late.deleted, 1);
        assert_eq!(messenger.deleted(), vec![(CHAT, 1)]);
    }

    #[tokio::test]
    async fn test_second_tick_finds_nothing() {
        let (store, messenger, sweeper) = setup();
        for id in 1..=3 {
            store
                .enqueue(ScheduledDeletion::new(CHAT, id, at(0), at(10)))
                .await
                .unwrap();
        }

        assert_eq!(sweeper.run_tick(at(20)).await.unwrap().deleted, 3);
        assert_eq!(sweeper.run_tick(at(20)).await.unwrap(), SweepReport::default());
        assert_eq!(messenger.deleted().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_delete_is_not_requeued() {
        let (store, messenger, sweeper) = setup();
        messenger.fail_deletes(true);
        store
            .enqueue(ScheduledDeletion::new(CHAT, 5, at(0), at(10)))
            .await
            .unwrap();

        let report = sweeper.run_tick(at(10)).await.unwrap();
        assert_eq!(report, SweepReport { deleted: 0, failed: 1 });
        assert_eq!(store.pending().await.unwrap(), 0);

        messenger.fail_deletes(false);
        assert_eq!(sweeper.run_tick(at(10)).await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn test_drains_more_than_one_batch() {
        let (store, messenger, sweeper) = setup();
        let count = SWEEP_BATCH_SIZE as i32 + 5;
        for id in 0..count {
            store
                .enqueue(ScheduledDeletion::new(CHAT, id, at(0), at(1)))
                .await
                .unwrap();
        }

        let report = sweeper.run_tick(at(1)).await.unwrap();
        assert_eq!(report.deleted, count as usize);
        assert_eq!(messenger.deleted().len(), count as usize);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let messenger = Arc::new(RecordingMessenger::new());
        let sweeper = Sweeper::new(Arc::new(UnavailableStore), messenger, Duration::from_secs(60));

        let err = sweeper.run_tick(at(0)).await.unwrap_err();
        assert!(matches!(err, ModerationError::StorageUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweeper_stops_on_cancel() {
        let (store, messenger, sweeper) = setup();
        store
            .enqueue(ScheduledDeletion::new(CHAT, 9, at(0), at(1)))
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = sweeper.spawn(cancel.clone());

        // The first interval tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(messenger.deleted(), vec![(CHAT, 9)]);

        cancel.cancel();
        handle.await.unwrap();
    }
}

use std::collections::HashMap;

use entity::{kitchen_race_challenge_responses, sea_orm_active_enums::KitchenRaceResponseStatus};
use futures::{stream, Stream, StreamExt};
use schemas::kitchen_race::responses::ChallengeResponse;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tokio::sync::{broadcast, RwLock};
use tracing::warn;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 16;

/// In-process fan-out of response changes to live watchers. Streams carry
/// notifications only; watchers read actual rows from the database.
pub struct WatchHub {
    status: RwLock<HashMap<(Uuid, Uuid), broadcast::Sender<KitchenRaceResponseStatus>>>,
    validated: broadcast::Sender<()>,
}

impl WatchHub {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(HashMap::new()),
            validated: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    /// Subscribe to status changes of one response, identified by challenge
    /// and cohouse.
    pub async fn subscribe_status(
        &self,
        challenge_id: Uuid,
        cohouse_id: Uuid,
    ) -> broadcast::Receiver<KitchenRaceResponseStatus> {
        self.status
            .write()
            .await
            .entry((challenge_id, cohouse_id))
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish a status change and drop channels without subscribers.
    pub async fn publish_status(
        &self,
        challenge_id: Uuid,
        cohouse_id: Uuid,
        status: KitchenRaceResponseStatus,
    ) {
        let mut channels = self.status.write().await;
        if let Some(sender) = channels.get(&(challenge_id, cohouse_id)) {
            let _ = sender.send(status);
        }
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    pub fn subscribe_validated(&self) -> broadcast::Receiver<()> {
        self.validated.subscribe()
    }

    /// Signal that the set of validated responses may have changed. Without
    /// subscribers this is a no-op; new watchers always start from a fresh
    /// snapshot.
    pub fn publish_validated(&self) {
        let _ = self.validated.send(());
    }
}

/// Turn a status subscription into a stream. A lagged receiver skips ahead
/// to the most recent status instead of terminating.
pub fn status_stream(
    receiver: broadcast::Receiver<KitchenRaceResponseStatus>,
) -> impl Stream<Item = KitchenRaceResponseStatus> + Send {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(status) => break Some((status, receiver)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("status watcher lagged by {skipped} updates");
                }
                Err(broadcast::error::RecvError::Closed) => break None,
            }
        }
    })
}

/// The current status first, then every change. The subscription must be
/// created before the initial status is read; a change arriving in between
/// is then delivered as a (possibly duplicate) event instead of being lost.
pub fn status_stream_with_initial(
    initial: KitchenRaceResponseStatus,
    receiver: broadcast::Receiver<KitchenRaceResponseStatus>,
) -> impl Stream<Item = KitchenRaceResponseStatus> + Send {
    stream::once(async move { initial }).chain(status_stream(receiver))
}

/// All currently validated responses, ordered by submission time.
pub async fn validated_snapshot(
    db: &DatabaseConnection,
) -> Result<Vec<ChallengeResponse>, DbErr> {
    Ok(kitchen_race_challenge_responses::Entity::find()
        .filter(
            kitchen_race_challenge_responses::Column::Status
                .eq(KitchenRaceResponseStatus::Validated),
        )
        .order_by_asc(kitchen_race_challenge_responses::Column::SubmissionTimestamp)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Emit a fresh snapshot of validated responses whenever the hub signals a
/// change. Signals arriving while a snapshot is loading coalesce into the
/// next one.
pub fn validated_snapshot_stream(
    db: DatabaseConnection,
    receiver: broadcast::Receiver<()>,
) -> impl Stream<Item = Vec<ChallengeResponse>> + Send {
    stream::unfold((db, receiver), |(db, mut receiver)| async move {
        loop {
            match receiver.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
            match validated_snapshot(&db).await {
                Ok(snapshot) => return Some((snapshot, (db, receiver))),
                Err(err) => warn!("failed to load validated responses snapshot: {err}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use entity::sea_orm_active_enums::KitchenRaceContentType;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    #[tokio::test]
    async fn test_status_updates_reach_subscribers() {
        let hub = WatchHub::new();
        let challenge_id = Uuid::new_v4();
        let cohouse_id = Uuid::new_v4();

        let receiver = hub.subscribe_status(challenge_id, cohouse_id).await;
        let mut stream = Box::pin(status_stream(receiver));

        hub.publish_status(challenge_id, cohouse_id, KitchenRaceResponseStatus::Waiting)
            .await;
        hub.publish_status(
            challenge_id,
            cohouse_id,
            KitchenRaceResponseStatus::Validated,
        )
        .await;

        assert_eq!(stream.next().await, Some(KitchenRaceResponseStatus::Waiting));
        assert_eq!(
            stream.next().await,
            Some(KitchenRaceResponseStatus::Validated)
        );
    }

    #[tokio::test]
    async fn test_status_updates_are_scoped_to_one_response() {
        let hub = WatchHub::new();
        let challenge_id = Uuid::new_v4();
        let cohouse_id = Uuid::new_v4();
        let other_cohouse = Uuid::new_v4();

        let mut receiver = hub.subscribe_status(challenge_id, cohouse_id).await;
        hub.publish_status(
            challenge_id,
            other_cohouse,
            KitchenRaceResponseStatus::Validated,
        )
        .await;
        hub.publish_status(challenge_id, cohouse_id, KitchenRaceResponseStatus::Waiting)
            .await;

        assert_eq!(receiver.recv().await, Ok(KitchenRaceResponseStatus::Waiting));
    }

    #[tokio::test]
    async fn test_status_change_between_snapshot_and_first_poll_is_delivered() {
        let hub = WatchHub::new();
        let challenge_id = Uuid::new_v4();
        let cohouse_id = Uuid::new_v4();

        let receiver = hub.subscribe_status(challenge_id, cohouse_id).await;
        // a review right after the current status was read must still reach
        // the watcher
        hub.publish_status(
            challenge_id,
            cohouse_id,
            KitchenRaceResponseStatus::Validated,
        )
        .await;

        let mut stream = Box::pin(status_stream_with_initial(
            KitchenRaceResponseStatus::Waiting,
            receiver,
        ));
        assert_eq!(stream.next().await, Some(KitchenRaceResponseStatus::Waiting));
        assert_eq!(
            stream.next().await,
            Some(KitchenRaceResponseStatus::Validated)
        );
    }

    #[tokio::test]
    async fn test_validated_snapshot_stream_reads_fresh_rows_on_signal() {
        let now = Utc::now().naive_utc();
        let row = kitchen_race_challenge_responses::Model {
            id: Uuid::new_v4(),
            challenge_id: Uuid::new_v4(),
            cohouse_id: Uuid::new_v4(),
            content_type: KitchenRaceContentType::NoChoice,
            picture_url: None,
            selected_choices: None,
            answer_text: None,
            status: KitchenRaceResponseStatus::Validated,
            submission_timestamp: now,
            review_timestamp: Some(now),
            reviewer: Some(Uuid::new_v4()),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let hub = WatchHub::new();
        let receiver = hub.subscribe_validated();
        hub.publish_validated();

        let mut stream = Box::pin(validated_snapshot_stream(db, receiver));
        let snapshot = stream.next().await.expect("signal should yield a snapshot");
        assert_eq!(
            snapshot.iter().map(|r| r.id).collect::<Vec<_>>(),
            [row.id]
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_noop() {
        let hub = WatchHub::new();
        hub.publish_status(
            Uuid::new_v4(),
            Uuid::new_v4(),
            KitchenRaceResponseStatus::Waiting,
        )
        .await;
        hub.publish_validated();
    }

    #[tokio::test]
    async fn test_abandoned_status_channels_are_dropped() {
        let hub = WatchHub::new();
        let challenge_id = Uuid::new_v4();
        let cohouse_id = Uuid::new_v4();

        let receiver = hub.subscribe_status(challenge_id, cohouse_id).await;
        drop(receiver);
        hub.publish_status(challenge_id, cohouse_id, KitchenRaceResponseStatus::Waiting)
            .await;

        assert!(hub.status.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_validated_signal_wakes_subscribers() {
        let hub = WatchHub::new();
        let mut receiver = hub.subscribe_validated();
        hub.publish_validated();
        assert_eq!(receiver.recv().await, Ok(()));
    }
}

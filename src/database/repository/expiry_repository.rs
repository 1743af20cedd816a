//! Scheduled deletion queue backed by MongoDB.
//!
//! Entries are polled by the sweeper with a range query on `deadline`.
//! A TTL index on the same field drops entries that stayed unswept for
//! longer than the configured grace period, so the collection cannot grow
//! without bound while the bot is offline.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::{FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::database::models::ScheduledDeletion;
use crate::database::store::ExpiryQueue;
use crate::database::Database;

/// Stored form of a [`ScheduledDeletion`]. Dates are BSON dates so the TTL monitor can read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExpiryDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    chat_id: i64,
    message_id: i32,
    created_at: bson::DateTime,
    deadline: bson::DateTime,
}

impl From<ExpiryDocument> for ScheduledDeletion {
    fn from(doc: ExpiryDocument) -> Self {
        Self::new(
            doc.chat_id,
            doc.message_id,
            from_bson(doc.created_at),
            from_bson(doc.deadline),
        )
    }
}

fn to_bson(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

fn from_bson(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

/// MongoDB-backed [`ExpiryQueue`].
pub struct ExpiryRepository {
    collection: Collection<ExpiryDocument>,
}

impl ExpiryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("messages"),
        }
    }

    /// Create the identity index and the TTL backstop on `deadline`.
    pub async fn ensure_indexes(&self, grace: Duration) -> Result<()> {
        let identity = IndexModel::builder()
            .keys(doc! { "chat_id": 1, "message_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let ttl = IndexModel::builder()
            .keys(doc! { "deadline": 1 })
            .options(
                IndexOptions::builder()
                    .name("deadline_ttl".to_string())
                    .expire_after(grace)
                    .build(),
            )
            .build();

        self.collection.create_indexes([identity, ttl]).await?;
        info!("Expiry indexes ready (TTL grace {}s)", grace.as_secs());
        Ok(())
    }
}

#[async_trait]
impl ExpiryQueue for ExpiryRepository {
    async fn enqueue(&self, entry: ScheduledDeletion) -> Result<()> {
        let filter = doc! { "chat_id": entry.chat_id, "message_id": entry.message_id };
        let update = doc! {
            "$set": {
                "created_at": to_bson(entry.created_at),
                "deadline": to_bson(entry.deadline),
            }
        };
        let options = UpdateOptions::builder().upsert(true).build();

        self.collection
            .update_one(filter, update)
            .with_options(options)
            .await?;

        debug!(
            "Queued message {} in chat {} for deletion at {}",
            entry.message_id, entry.chat_id, entry.deadline
        );
        Ok(())
    }

    async fn take_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ScheduledDeletion>> {
        let filter = doc! { "deadline": { "$lte": to_bson(now) } };
        let options = FindOptions::builder()
            .sort(doc! { "deadline": 1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();

        let candidates: Vec<ExpiryDocument> = self
            .collection
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        // Claim each entry by deleting it; whoever removes the document owns it.
        let mut claimed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(id) = candidate.id else { continue };
            let result = self.collection.delete_one(doc! { "_id": id }).await?;
            if result.deleted_count == 1 {
                claimed.push(ScheduledDeletion::from(candidate));
            }
        }

        Ok(claimed)
    }

    async fn pending(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}

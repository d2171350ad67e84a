//! Durable, append-only per-pair message log on SQLite.

use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::relay::Message;

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS pair_messages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id BIGINT NOT NULL,
    sender TEXT NOT NULL,
    recipient TEXT NOT NULL,
    kind TEXT NOT NULL,
    content TEXT NOT NULL,
    media_url TEXT,
    pair_id TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_pair_messages_pair ON pair_messages (pair_id, seq)";

/// A persisted message, in the shape history consumers receive.
#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub id: i64,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub image_data: Option<String>,
    pub pair_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent; also run lazily when an append fails, so the log survives
    /// out-of-band schema drift.
    pub async fn ensure_schema(&self) -> sqlx::Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Append a message to its pair's log, stamping the server-side creation
    /// time. A failed insert gets one retry after re-ensuring the schema.
    pub async fn append(&self, msg: &Message) -> sqlx::Result<()> {
        let created_at = OffsetDateTime::now_utc();
        match self.insert(msg, created_at).await {
            Ok(()) => Ok(()),
            Err(first) => {
                tracing::warn!(
                    pair_id = %msg.pair_id,
                    message_id = msg.id,
                    error = %first,
                    "append failed, re-ensuring schema and retrying",
                );
                self.ensure_schema().await?;
                self.insert(msg, created_at).await
            }
        }
    }

    async fn insert(&self, msg: &Message, created_at: OffsetDateTime) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO pair_messages (message_id,sender,recipient,kind,content,media_url,pair_id,created_at) \
             VALUES (?,?,?,?,?,?,?,?)",
        )
        .bind(msg.id)
        .bind(&msg.from)
        .bind(&msg.to)
        .bind(&msg.kind)
        .bind(&msg.content)
        .bind(&msg.media)
        .bind(&msg.pair_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The most recent `limit` messages for a pair, presented in ascending
    /// append order so clients can replay them top to bottom. A pair with no
    /// history yields an empty list.
    pub async fn read(&self, pair_id: &str, limit: i64) -> sqlx::Result<Vec<StoredMessage>> {
        let rows: Vec<(i64, String, String, String, String, Option<String>, String, OffsetDateTime)> =
            sqlx::query_as(
                "SELECT message_id,sender,recipient,kind,content,media_url,pair_id,created_at \
                 FROM (SELECT * FROM pair_messages WHERE pair_id=? ORDER BY seq DESC LIMIT ?) \
                 ORDER BY seq ASC",
            )
            .bind(pair_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, from, to, kind, message, image_data, pair_id, created_at)| StoredMessage {
                id,
                from,
                to,
                kind,
                message,
                image_data,
                pair_id,
                created_at,
            })
            .collect())
    }
}

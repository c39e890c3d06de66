//! Message Repository Implementation
//!
//! PostgreSQL implementation of direct message operations with
//! cursor-based pagination over conversations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Message, MessageRepository, User};
use crate::shared::error::AppError;
use crate::shared::pagination::{Cursor, CursorPagination};

/// Internal row type for message queries.
/// Maps to the messages table schema defined in the migration.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    from_id: i64,
    to_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            from_id: self.from_id,
            to_id: self.to_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    name: Option<String>,
    profile_picture: Option<String>,
    is_private: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            profile_picture: self.profile_picture,
            is_private: self.is_private,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL message repository implementation.
///
/// Message IDs are Snowflakes, so ordering by id is chronological and
/// cursors compare directly against the primary key.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verify the cursor row exists inside this conversation. A cursor
    /// from another conversation is reported as not-found.
    async fn check_cursor(
        &self,
        cursor_id: i64,
        user_a: i64,
        user_b: i64,
    ) -> Result<(), AppError> {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM messages
            WHERE id = $1
                AND ((from_id = $2 AND to_id = $3) OR (from_id = $3 AND to_id = $2))
            "#,
        )
        .bind(cursor_id)
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Cursor {} not found", cursor_id))),
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    /// Persist a new message.
    ///
    /// The message ID should be a pre-generated Snowflake ID from the
    /// application layer.
    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, from_id, to_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, from_id, to_id, content, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.from_id)
        .bind(message.to_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    /// Messages exchanged between the pair, newest first.
    ///
    /// `after` pages toward older messages, `before` fetches the page of
    /// newer messages preceding the cursor in listing order.
    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
        page: CursorPagination,
    ) -> Result<Vec<Message>, AppError> {
        let limit = page.limit();

        let rows = match page.cursor() {
            None => {
                sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, from_id, to_id, content, created_at
                    FROM messages
                    WHERE (from_id = $1 AND to_id = $2) OR (from_id = $2 AND to_id = $1)
                    ORDER BY id DESC
                    LIMIT $3
                    "#,
                )
                .bind(user_a)
                .bind(user_b)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::After(cursor_id)) => {
                self.check_cursor(cursor_id, user_a, user_b).await?;
                sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, from_id, to_id, content, created_at
                    FROM messages
                    WHERE ((from_id = $1 AND to_id = $2) OR (from_id = $2 AND to_id = $1))
                        AND id < $4
                    ORDER BY id DESC
                    LIMIT $3
                    "#,
                )
                .bind(user_a)
                .bind(user_b)
                .bind(limit)
                .bind(cursor_id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::Before(cursor_id)) => {
                self.check_cursor(cursor_id, user_a, user_b).await?;
                let mut rows = sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, from_id, to_id, content, created_at
                    FROM messages
                    WHERE ((from_id = $1 AND to_id = $2) OR (from_id = $2 AND to_id = $1))
                        AND id > $4
                    ORDER BY id ASC
                    LIMIT $3
                    "#,
                )
                .bind(user_a)
                .bind(user_b)
                .bind(limit)
                .bind(cursor_id)
                .fetch_all(&self.pool)
                .await?;
                rows.reverse();
                rows
            }
        };

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    /// Distinct users the given user has exchanged messages with,
    /// ordered by most recent conversation first.
    async fn conversation_partners(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.name, u.profile_picture,
                   u.is_private, u.created_at, u.updated_at
            FROM users u
            JOIN (
                SELECT CASE WHEN m.from_id = $1 THEN m.to_id ELSE m.from_id END AS partner_id,
                       MAX(m.id) AS last_message_id
                FROM messages m
                WHERE m.from_id = $1 OR m.to_id = $1
                GROUP BY partner_id
            ) c ON c.partner_id = u.id
            ORDER BY c.last_message_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }
}

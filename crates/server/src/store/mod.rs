//! SQLite-backed credential store: users, their chat history, and trips.
//!
//! Chat history is append-only. An exchange (user turn + assistant turn) is
//! inserted inside one transaction, so either both turns persist or neither
//! does, and concurrent sends from the same user never lose an exchange.

use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::models::{ChatMessage, Role, Trip, User};

/// Sort key for trip listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripSort {
    StartDate,
    EndDate,
    Destination,
    CreatedAt,
}

impl TripSort {
    fn column(&self) -> &'static str {
        match self {
            TripSort::StartDate => "start_date",
            TripSort::EndDate => "end_date",
            TripSort::Destination => "destination",
            TripSort::CreatedAt => "created_at",
        }
    }
}

/// Filter, sort, and page window for trip listings.
#[derive(Debug, Clone, Copy)]
pub struct TripFilter {
    /// Keep trips starting on or after this date
    pub start_date: Option<NaiveDate>,
    /// Keep trips ending on or before this date
    pub end_date: Option<NaiveDate>,
    pub sort: TripSort,
    pub descending: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Default for TripFilter {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            sort: TripSort::StartDate,
            descending: false,
            limit: None,
            offset: None,
        }
    }
}

/// Durable persistence for users and everything they own.
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Open (or create) the database under `base_dir` and ensure the schema.
    pub async fn open(base_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(base_dir).await?;
        let db_path = base_dir.join("smarttravel.sqlite");

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("[Store] Initialized at {:?}", db_path);

        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT UNIQUE NOT NULL,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trips (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                destination TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_user ON chat_messages(user_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trips_user ON trips(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // --- Users ---

    /// Insert a new user. The UNIQUE constraint on email backs up the
    /// caller's existence pre-check.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        info!("[Store] User created: {}", user.email);

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Self::user_from_row(&row)))
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Self::user_from_row(&row)))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Self::user_from_row).collect())
    }

    fn user_from_row(row: &SqliteRow) -> User {
        User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    // --- Chat history ---

    /// Ordered conversation history for a user, oldest first.
    pub async fn chats(&self, user_id: &str) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT id, role, content, created_at, updated_at \
             FROM chat_messages WHERE user_id = ? ORDER BY seq ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::chat_from_row).collect()
    }

    /// Append one {user, assistant} exchange in a single transaction and
    /// return the full updated history.
    pub async fn append_exchange(
        &self,
        user_id: &str,
        user_content: &str,
        assistant_content: &str,
    ) -> Result<Vec<ChatMessage>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (role, content) in [(Role::User, user_content), (Role::Assistant, assistant_content)]
        {
            sqlx::query(
                "INSERT INTO chat_messages (id, user_id, role, content, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(role.as_str())
            .bind(content)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.chats(user_id).await
    }

    /// Delete the user's entire chat history.
    pub async fn clear_chats(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM chat_messages WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("[Store] Chats cleared for user {}", user_id);

        Ok(())
    }

    fn chat_from_row(row: &SqliteRow) -> Result<ChatMessage> {
        let role: String = row.get("role");
        Ok(ChatMessage {
            id: row.get("id"),
            role: role.parse()?,
            content: row.get("content"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    // --- Trips ---

    pub async fn create_trip(
        &self,
        user_id: &str,
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: Option<&str>,
    ) -> Result<Trip> {
        let now = Utc::now();
        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            destination: destination.to_owned(),
            start_date,
            end_date,
            description: description.map(str::to_owned),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO trips \
             (id, user_id, destination, start_date, end_date, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&trip.id)
        .bind(&trip.user_id)
        .bind(&trip.destination)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(&trip.description)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(trip)
    }

    pub async fn get_trip(&self, trip_id: &str) -> Result<Option<Trip>> {
        let row = sqlx::query("SELECT * FROM trips WHERE id = ?")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Self::trip_from_row(&row)))
    }

    pub async fn list_trips(&self, user_id: &str, filter: &TripFilter) -> Result<Vec<Trip>> {
        let mut sql = String::from("SELECT * FROM trips WHERE user_id = ?");
        if filter.start_date.is_some() {
            sql.push_str(" AND start_date >= ?");
        }
        if filter.end_date.is_some() {
            sql.push_str(" AND end_date <= ?");
        }
        sql.push_str(&format!(
            " ORDER BY {} {}",
            filter.sort.column(),
            if filter.descending { "DESC" } else { "ASC" }
        ));
        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }
        if filter.offset.is_some() {
            sql.push_str(" OFFSET ?");
        }

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(date) = filter.start_date {
            query = query.bind(date);
        }
        if let Some(date) = filter.end_date {
            query = query.bind(date);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.bind(offset);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(Self::trip_from_row).collect())
    }

    pub async fn count_trips(&self, user_id: &str, filter: &TripFilter) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS n FROM trips WHERE user_id = ?");
        if filter.start_date.is_some() {
            sql.push_str(" AND start_date >= ?");
        }
        if filter.end_date.is_some() {
            sql.push_str(" AND end_date <= ?");
        }

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(date) = filter.start_date {
            query = query.bind(date);
        }
        if let Some(date) = filter.end_date {
            query = query.bind(date);
        }

        let row = query.fetch_one(&self.pool).await?;
        Ok(row.get("n"))
    }

    /// Persist every mutable field of an existing trip.
    pub async fn update_trip(&self, trip: &Trip) -> Result<()> {
        sqlx::query(
            "UPDATE trips SET destination = ?, start_date = ?, end_date = ?, \
             description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&trip.destination)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(&trip.description)
        .bind(trip.updated_at)
        .bind(&trip.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_trip(&self, trip_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(trip_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn trip_from_row(row: &SqliteRow) -> Trip {
        Trip {
            id: row.get("id"),
            user_id: row.get("user_id"),
            destination: row.get("destination"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            description: row.get("description"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

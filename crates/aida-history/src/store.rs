//! Append-only message log in SQLite

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};

use aida_core::{Error, Message, Result, Role, ToolCall};

/// On-disk shape of a `/save` export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    pub session_id: String,
    pub exported_at: String,
    pub messages: Vec<Message>,
}

/// Chat sessions backed by a SQLite database
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> Error {
    Error::History(e.to_string())
}

impl SessionStore {
    /// Open (or create) the database at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| Error::History(format!("Failed to open {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "opened chat history");
        Self::init(pool).await
    }

    /// A private database that lives as long as the store
    pub async fn open_in_memory() -> Result<Self> {
        let options: SqliteConnectOptions = "sqlite::memory:".parse().map_err(db_err)?;
        // Every connection to :memory: is a separate database, so keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(db_err)?;
        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                tool_calls TEXT,
                tool_call_id TEXT,
                tool_name TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(db_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_session_id ON messages(session_id)")
            .execute(&pool)
            .await
            .map_err(db_err)?;

        Ok(Self { pool })
    }

    /// Append a message and return its row id
    pub async fn add_message(&self, session_id: &str, message: &Message) -> Result<i64> {
        let tool_calls = encode_tool_calls(&message.tool_calls)?;
        let result = sqlx::query(
            "INSERT INTO messages (session_id, role, content, tool_calls, tool_call_id, tool_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(tool_calls)
        .bind(&message.tool_call_id)
        .bind(&message.tool_name)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.last_insert_rowid())
    }

    pub async fn add_user_message(&self, session_id: &str, content: &str) -> Result<i64> {
        self.add_message(session_id, &Message::human(content)).await
    }

    pub async fn add_ai_message(&self, session_id: &str, content: &str) -> Result<i64> {
        self.add_message(session_id, &Message::ai(content)).await
    }

    /// All messages of a session, oldest first
    pub async fn messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT role, content, tool_calls, tool_call_id, tool_name
             FROM messages WHERE session_id = ? ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_message).collect()
    }

    /// Remove every message of a session
    pub async fn clear(&self, session_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    /// Session ids, most recently active first
    pub async fn sessions(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT session_id FROM messages GROUP BY session_id ORDER BY MAX(id) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("session_id").map_err(db_err))
            .collect()
    }

    /// Write the session to `<dir>/<name>.json`
    pub async fn export(&self, session_id: &str, dir: &Path, name: &str) -> Result<PathBuf> {
        let path = export_path(dir, name)?;
        let export = SessionExport {
            session_id: session_id.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            messages: self.messages(session_id).await?,
        };
        let json = serde_json::to_string_pretty(&export)?;

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, json).await?;

        tracing::info!(session = session_id, path = %path.display(), messages = export.messages.len(), "exported chat");
        Ok(path)
    }

    /// Replace the session's contents with the export `<dir>/<name>.json`
    pub async fn import(&self, session_id: &str, dir: &Path, name: &str) -> Result<usize> {
        let path = export_path(dir, name)?;
        if !path.is_file() {
            return Err(Error::History(format!(
                "No saved chat named '{}' in {}",
                name,
                dir.display()
            )));
        }
        let raw = tokio::fs::read_to_string(&path).await?;
        let export: SessionExport = serde_json::from_str(&raw)
            .map_err(|e| Error::History(format!("Invalid chat file {}: {}", path.display(), e)))?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let now = chrono::Utc::now().to_rfc3339();
        for message in &export.messages {
            sqlx::query(
                "INSERT INTO messages (session_id, role, content, tool_calls, tool_call_id, tool_name, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(session_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(encode_tool_calls(&message.tool_calls)?)
            .bind(&message.tool_call_id)
            .bind(&message.tool_name)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;

        tracing::info!(session = session_id, path = %path.display(), messages = export.messages.len(), "imported chat");
        Ok(export.messages.len())
    }
}

fn export_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(Error::InvalidInput(format!("invalid chat name '{}'", name)));
    }
    let file = if name.ends_with(".json") {
        name.to_string()
    } else {
        format!("{}.json", name)
    };
    Ok(dir.join(file))
}

fn encode_tool_calls(calls: &[ToolCall]) -> Result<Option<String>> {
    if calls.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(calls)?))
}

fn row_to_message(row: &SqliteRow) -> Result<Message> {
    let role: String = row.try_get("role").map_err(db_err)?;
    let role = Role::from_str(&role)
        .ok_or_else(|| Error::History(format!("unknown role '{}' in history", role)))?;
    let tool_calls = match row.try_get::<Option<String>, _>("tool_calls").map_err(db_err)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    };

    Ok(Message {
        role,
        content: row.try_get("content").map_err(db_err)?,
        tool_calls,
        tool_call_id: row.try_get("tool_call_id").map_err(db_err)?,
        tool_name: row.try_get("tool_name").map_err(db_err)?,
    })
}

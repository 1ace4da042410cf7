//! # Wardpost Store
//!
//! Read-only queries against the portal SQLite database. The dashboard is
//! the single writer; this crate never executes anything but SELECTs.
//!
//! Each query opens its own connection and closes it when done. That keeps
//! the dispatcher from holding any lock against the dashboard writer; the
//! trade-off is that the announcement and task reads within one job run
//! are not atomic with each other, which no job depends on.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use wardpost_core::error::{Result, WardpostError};

/// One row of the announcements table, newest-first by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Nullable in the schema; the dashboard also stores the literal
    /// string "None" here, which the composer treats as absent.
    pub link: Option<String>,
    pub posted_at: String,
}

/// One pending row of the leadership tasks table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: i64,
    pub description: String,
    /// Free-text recipient name as typed into the dashboard. Compared
    /// case-insensitively downstream.
    pub assignee: String,
    /// "Alta" / "Média" / "Baixa" as the dashboard writes them.
    pub priority: String,
}

/// Read side of the portal store. The dispatch jobs only ever see this
/// trait, so they run against an in-memory fake in tests.
pub trait PortalReader: Send + Sync {
    fn latest_announcement(&self) -> Result<Option<Announcement>>;
    fn pending_tasks(&self) -> Result<Vec<TaskItem>>;
}

/// Handle on the portal database. Cheap to clone; holds no connection.
#[derive(Debug, Clone)]
pub struct PortalStore {
    db_path: PathBuf,
}

impl PortalStore {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path).map_err(store_err)
    }
}

impl PortalReader for PortalStore {
    /// The most recently created announcement, or `None` if the table is
    /// empty. Recency is by id: the dashboard assigns them monotonically.
    fn latest_announcement(&self) -> Result<Option<Announcement>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, titulo, mensagem, link, data_postagem
                 FROM comunicados ORDER BY id DESC LIMIT 1",
            )
            .map_err(store_err)?;
        let mut rows = stmt
            .query_map([], |row| {
                Ok(Announcement {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    body: row.get(2)?,
                    link: row.get(3)?,
                    posted_at: row.get(4)?,
                })
            })
            .map_err(store_err)?;
        match rows.next() {
            Some(row) => Ok(Some(row.map_err(store_err)?)),
            None => Ok(None),
        }
    }

    /// All tasks still marked pending, in the store's natural order.
    fn pending_tasks(&self) -> Result<Vec<TaskItem>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, tarefa, responsavel, prioridade
                 FROM tarefas_bispado WHERE status = 'Pendente'",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TaskItem {
                    id: row.get(0)?,
                    description: row.get(1)?,
                    assignee: row.get(2)?,
                    priority: row.get(3)?,
                })
            })
            .map_err(store_err)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.map_err(store_err)?);
        }
        Ok(tasks)
    }
}

fn store_err(e: rusqlite::Error) -> WardpostError {
    WardpostError::Store(e.to_string())
}

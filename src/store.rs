use crate::error::{Result, TaskError};
use crate::models::{
    NewTask, Priority, ProjectStats, Receipt, SearchMatch, Status, Summary, TaskFilter, TaskRow,
};
use chrono::Local;
use rusqlite::{Connection, Row};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Durable CRUD and query surface over the tasks table. Holds only the
/// database path; every operation opens its own connection and the handle
/// is released when the operation returns, on every exit path.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TaskStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Idempotently ensure the schema exists, creating the file if absent.
    /// The tags column is declared but no operation writes or reads it.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                project TEXT NOT NULL,
                status TEXT DEFAULT 'todo',
                priority TEXT DEFAULT 'normal',
                due_date TEXT,
                description TEXT,
                tags TEXT,
                created_at TEXT
            )",
            [],
        )?;
        Ok(())
    }

    /// Create a task. Status always starts as todo regardless of caller
    /// intent; priority text is stored verbatim.
    pub fn add(&self, task: NewTask) -> Result<Receipt> {
        if task.title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        if task.project.trim().is_empty() {
            return Err(TaskError::EmptyProject);
        }

        let task_id = short_id();
        let priority = task
            .priority
            .unwrap_or_else(|| Priority::Normal.as_str().to_string());
        let created_at = Local::now().to_rfc3339();

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO tasks (id, title, project, status, priority, due_date, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                &task_id,
                &task.title,
                &task.project,
                Status::Todo.as_str(),
                &priority,
                &task.due_date,
                task.description.as_deref().unwrap_or(""),
                &created_at,
            ),
        )?;

        Ok(Receipt::Created {
            task_id,
            title: task.title,
            project: task.project,
        })
    }

    /// List tasks matching the AND-combined filters, urgent first, ties in
    /// insertion order.
    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskRow>> {
        let mut sql = String::from(
            "SELECT id, title, project, status, priority, due_date FROM tasks",
        );
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<&String> = Vec::new();

        if let Some(project) = &filter.project {
            clauses.push("project = ?");
            params.push(project);
        }
        if let Some(status) = &filter.status {
            clauses.push("status = ?");
            params.push(status);
        }
        if let Some(priority) = &filter.priority {
            clauses.push("priority = ?");
            params.push(priority);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY rowid");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), task_row_from_row)?;

        let mut tasks = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        tasks.sort_by_key(|t| Priority::rank_of(&t.priority));
        Ok(tasks)
    }

    /// Apply status and/or priority independently; omitted fields are left
    /// unchanged. The receipt reads updated even when no row matched —
    /// delete is the operation that distinguishes not_found.
    pub fn update(
        &self,
        task_id: &str,
        status: Option<&str>,
        priority: Option<&str>,
    ) -> Result<Receipt> {
        let conn = self.connect()?;
        if let Some(status) = status {
            conn.execute(
                "UPDATE tasks SET status = ?1 WHERE id = ?2",
                (status, task_id),
            )?;
        }
        if let Some(priority) = priority {
            conn.execute(
                "UPDATE tasks SET priority = ?1 WHERE id = ?2",
                (priority, task_id),
            )?;
        }
        Ok(Receipt::Updated {
            task_id: task_id.to_string(),
        })
    }

    pub fn delete(&self, task_id: &str) -> Result<Receipt> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", [task_id])?;
        if removed == 1 {
            Ok(Receipt::Deleted {
                task_id: task_id.to_string(),
            })
        } else {
            Ok(Receipt::NotFound {
                task_id: task_id.to_string(),
            })
        }
    }

    /// Case-sensitive substring match on title or description. Done in Rust
    /// rather than SQL LIKE, which folds ASCII case.
    pub fn search(&self, query: &str) -> Result<Vec<SearchMatch>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, project, status, priority, due_date, description
             FROM tasks ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], search_match_from_row)?;

        let mut hits: Vec<SearchMatch> = rows
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|m| m.row.title.contains(query) || m.description.contains(query))
            .collect();
        hits.sort_by_key(|m| Priority::rank_of(&m.row.priority));
        Ok(hits)
    }

    /// Tasks due on the current local date that are not yet done.
    pub fn tasks_due_today(&self) -> Result<Vec<TaskRow>> {
        let today = Local::now().date_naive().to_string();
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, project, status, priority, due_date FROM tasks
             WHERE due_date = ?1 AND status != ?2 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(
            (today.as_str(), Status::Done.as_str()),
            task_row_from_row,
        )?;

        let mut tasks = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        tasks.sort_by_key(|t| Priority::rank_of(&t.priority));
        Ok(tasks)
    }

    /// Status counts per project, covering only statuses actually present.
    pub fn get_summary(&self) -> Result<Summary> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT project, status, COUNT(*) FROM tasks
             GROUP BY project, status ORDER BY project",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut summary = Summary::new();
        for row in rows {
            let (project, status, count) = row?;
            summary.entry(project).or_default().insert(status, count);
        }
        Ok(summary)
    }

    /// Every distinct project with its total and completed counts, ordered
    /// by name. A project with no tasks does not exist.
    pub fn get_projects(&self) -> Result<Vec<ProjectStats>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT project, COUNT(*), SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END)
             FROM tasks GROUP BY project ORDER BY project",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProjectStats {
                name: row.get(0)?,
                total_tasks: row.get(1)?,
                completed: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

// ==================== Row Parsers ====================

fn task_row_from_row(row: &Row) -> std::result::Result<TaskRow, rusqlite::Error> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        project: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        due_date: row.get(5)?,
    })
}

fn search_match_from_row(row: &Row) -> std::result::Result<SearchMatch, rusqlite::Error> {
    Ok(SearchMatch {
        row: task_row_from_row(row)?,
        description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
    })
}

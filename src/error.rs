use thiserror::Error;

/// All possible errors in the task assistant
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("project name must not be empty")]
    EmptyProject,

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing configuration: {0} is not set")]
    MissingEnv(&'static str),

    #[error("agent run failed: {0}")]
    Agent(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TaskError>;

use crate::error::{Result, TaskError};
use crate::models::{NewTask, TaskFilter};
use crate::store::TaskStore;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// Argument types shared by the MCP server and the chat driver.

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddTaskArgs {
    pub title: String,
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListTasksArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UpdateTaskArgs {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TaskIdArgs {
    pub task_id: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchTasksArgs {
    pub query: String,
}

/// Execute one named tool call against the store. Arguments come in as a
/// JSON object string and the structured result goes out as a JSON
/// document — this adapter is the only place store results meet the wire.
pub fn invoke(store: &TaskStore, name: &str, arguments: &str) -> Result<String> {
    let raw = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };

    let document = match name {
        "add_task" => {
            let args: AddTaskArgs = serde_json::from_str(raw)?;
            let receipt = store.add(NewTask {
                title: args.title,
                project: args.project,
                priority: args.priority,
                due_date: args.due_date,
                description: args.description,
            })?;
            serde_json::to_string(&receipt)?
        }
        "list_tasks" => {
            let args: ListTasksArgs = serde_json::from_str(raw)?;
            let rows = store.list(&TaskFilter {
                project: args.project,
                status: args.status,
                priority: args.priority,
            })?;
            serde_json::to_string(&rows)?
        }
        "update_task" => {
            let args: UpdateTaskArgs = serde_json::from_str(raw)?;
            let receipt = store.update(
                &args.task_id,
                args.status.as_deref(),
                args.priority.as_deref(),
            )?;
            serde_json::to_string(&receipt)?
        }
        "delete_task" => {
            let args: TaskIdArgs = serde_json::from_str(raw)?;
            serde_json::to_string(&store.delete(&args.task_id)?)?
        }
        "search_tasks" => {
            let args: SearchTasksArgs = serde_json::from_str(raw)?;
            serde_json::to_string(&store.search(&args.query)?)?
        }
        "tasks_due_today" => serde_json::to_string(&store.tasks_due_today()?)?,
        "get_summary" => serde_json::to_string(&store.get_summary()?)?,
        "get_projects" => serde_json::to_string(&store.get_projects()?)?,
        other => return Err(TaskError::UnknownTool(other.to_string())),
    };

    Ok(document)
}

/// Tool definitions in chat-completions function format.
pub fn specs() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": "add_task",
                "description": "Add a new task to a project. The task starts with status todo.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string", "description": "Task title"},
                        "project": {"type": "string", "description": "Project name"},
                        "priority": {"type": "string", "enum": ["urgent", "high", "normal", "low"]},
                        "due_date": {"type": "string", "description": "Due date in YYYY-MM-DD format"},
                        "description": {"type": "string", "description": "Task description"}
                    },
                    "required": ["title", "project"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "list_tasks",
                "description": "List tasks filtered by project, status, and/or priority. Urgent tasks sort first.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "project": {"type": "string"},
                        "status": {"type": "string", "enum": ["todo", "in_progress", "done", "blocked"]},
                        "priority": {"type": "string", "enum": ["urgent", "high", "normal", "low"]}
                    }
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "update_task",
                "description": "Update a task's status and/or priority. Only supplied fields change.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "task_id": {"type": "string"},
                        "status": {"type": "string", "enum": ["todo", "in_progress", "done", "blocked"]},
                        "priority": {"type": "string", "enum": ["urgent", "high", "normal", "low"]}
                    },
                    "required": ["task_id"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "delete_task",
                "description": "Delete a task by id.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "task_id": {"type": "string"}
                    },
                    "required": ["task_id"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "search_tasks",
                "description": "Search tasks whose title or description contains the query text.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"}
                    },
                    "required": ["query"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "tasks_due_today",
                "description": "List tasks due today that are not yet done.",
                "parameters": {"type": "object", "properties": {}}
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "get_summary",
                "description": "Get a dashboard summary of task counts by status across all projects.",
                "parameters": {"type": "object", "properties": {}}
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "get_projects",
                "description": "List every project with its total and completed task counts.",
                "parameters": {"type": "object", "properties": {}}
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = TaskStore::new(temp_dir.path().join("test.db"));
        store.initialize().unwrap();
        (store, temp_dir)
    }

    #[test]
    fn add_task_round_trips_as_json() {
        let (store, _temp) = setup();

        let doc = invoke(
            &store,
            "add_task",
            r#"{"title": "Fix bug", "project": "work", "priority": "urgent"}"#,
        )
        .unwrap();

        let value: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(value["status"], "created");
        assert_eq!(value["title"], "Fix bug");
        assert_eq!(value["project"], "work");
        assert_eq!(value["task_id"].as_str().unwrap().len(), 8);
    }

    #[test]
    fn empty_argument_payload_means_no_filters() {
        let (store, _temp) = setup();

        assert_eq!(invoke(&store, "list_tasks", "").unwrap(), "[]");
        assert_eq!(invoke(&store, "get_projects", "").unwrap(), "[]");
        assert_eq!(invoke(&store, "get_summary", "").unwrap(), "{}");
        assert_eq!(invoke(&store, "tasks_due_today", "").unwrap(), "[]");
    }

    #[test]
    fn delete_distinguishes_not_found() {
        let (store, _temp) = setup();

        let doc = invoke(&store, "delete_task", r#"{"task_id": "nosuchid"}"#).unwrap();
        let value: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["task_id"], "nosuchid");
    }

    #[test]
    fn list_projection_omits_description_but_search_keeps_it() {
        let (store, _temp) = setup();

        invoke(
            &store,
            "add_task",
            r#"{"title": "Call client", "project": "work", "description": "about the invoice"}"#,
        )
        .unwrap();

        let listed: Value =
            serde_json::from_str(&invoke(&store, "list_tasks", "{}").unwrap()).unwrap();
        assert!(listed[0].get("description").is_none());

        let found: Value =
            serde_json::from_str(&invoke(&store, "search_tasks", r#"{"query": "invoice"}"#).unwrap())
                .unwrap();
        assert_eq!(found[0]["description"], "about the invoice");
    }

    #[test]
    fn unknown_tool_is_a_typed_error() {
        let (store, _temp) = setup();

        let result = invoke(&store, "launch_rocket", "{}");
        assert!(matches!(result, Err(TaskError::UnknownTool(name)) if name == "launch_rocket"));
    }

    #[test]
    fn specs_cover_the_whole_tool_surface() {
        let names: Vec<String> = specs()
            .iter()
            .map(|s| s["function"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "add_task",
                "list_tasks",
                "update_task",
                "delete_task",
                "search_tasks",
                "tasks_due_today",
                "get_summary",
                "get_projects"
            ]
        );
    }
}

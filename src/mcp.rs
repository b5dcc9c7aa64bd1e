use crate::error::TaskError;
use crate::models::{NewTask, TaskFilter};
use crate::store::TaskStore;
use crate::tools::{AddTaskArgs, ListTasksArgs, SearchTasksArgs, TaskIdArgs, UpdateTaskArgs};
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Serialize;

/// Task store MCP server
#[derive(Clone)]
pub struct TaskStoreMcp {
    store: TaskStore,
    tool_router: ToolRouter<Self>,
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json =
        serde_json::to_string(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn error_doc(e: TaskError) -> serde_json::Value {
    serde_json::json!({"status": "error", "message": e.to_string()})
}

#[tool_router]
impl TaskStoreMcp {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Add a new task to a project. Title and project are required; priority defaults to normal and the task always starts with status todo."
    )]
    async fn add_task(&self, params: Parameters<AddTaskArgs>) -> Result<CallToolResult, McpError> {
        let p = params.0;

        match self.store.add(NewTask {
            title: p.title,
            project: p.project,
            priority: p.priority,
            due_date: p.due_date,
            description: p.description,
        }) {
            Ok(receipt) => to_json(&receipt),
            Err(e) => to_json(&error_doc(e)),
        }
    }

    #[tool(
        description = "List tasks, optionally filtered by project, status, and/or priority. Urgent tasks sort first."
    )]
    async fn list_tasks(
        &self,
        params: Parameters<ListTasksArgs>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;

        match self.store.list(&TaskFilter {
            project: p.project,
            status: p.status,
            priority: p.priority,
        }) {
            Ok(rows) => to_json(&rows),
            Err(e) => to_json(&error_doc(e)),
        }
    }

    #[tool(description = "Update a task's status and/or priority. Only supplied fields change.")]
    async fn update_task(
        &self,
        params: Parameters<UpdateTaskArgs>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;

        match self
            .store
            .update(&p.task_id, p.status.as_deref(), p.priority.as_deref())
        {
            Ok(receipt) => to_json(&receipt),
            Err(e) => to_json(&error_doc(e)),
        }
    }

    #[tool(description = "Delete a task by id.")]
    async fn delete_task(
        &self,
        params: Parameters<TaskIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.delete(&params.0.task_id) {
            Ok(receipt) => to_json(&receipt),
            Err(e) => to_json(&error_doc(e)),
        }
    }

    #[tool(description = "Search tasks whose title or description contains the query text.")]
    async fn search_tasks(
        &self,
        params: Parameters<SearchTasksArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.search(&params.0.query) {
            Ok(hits) => to_json(&hits),
            Err(e) => to_json(&error_doc(e)),
        }
    }

    #[tool(description = "List tasks due today that are not yet done.")]
    async fn tasks_due_today(&self) -> Result<CallToolResult, McpError> {
        match self.store.tasks_due_today() {
            Ok(rows) => to_json(&rows),
            Err(e) => to_json(&error_doc(e)),
        }
    }

    #[tool(
        description = "Get a dashboard summary of task counts by status across all projects. Absent statuses mean zero."
    )]
    async fn get_summary(&self) -> Result<CallToolResult, McpError> {
        match self.store.get_summary() {
            Ok(summary) => to_json(&summary),
            Err(e) => to_json(&error_doc(e)),
        }
    }

    #[tool(description = "List every project with its total and completed task counts.")]
    async fn get_projects(&self) -> Result<CallToolResult, McpError> {
        match self.store.get_projects() {
            Ok(projects) => to_json(&projects),
            Err(e) => to_json(&error_doc(e)),
        }
    }
}

#[tool_handler]
impl ServerHandler for TaskStoreMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Personal task assistant. Manage tasks across projects: add_task to create \
                 (status always starts as todo), list_tasks/search_tasks/tasks_due_today to \
                 query, update_task to change status or priority, delete_task to remove, \
                 get_summary and get_projects for dashboards."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_mcp_server(store: TaskStore) -> Result<(), Box<dyn std::error::Error>> {
    let mcp = TaskStoreMcp::new(store);

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        eprintln!("Error starting MCP server: {e}");
    })?;

    service.waiting().await?;
    Ok(())
}

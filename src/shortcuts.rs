use crate::error::Result;
use crate::models::{Priority, ProjectStats, Status, Summary, TaskFilter, TaskRow};
use crate::store::TaskStore;

const BAR_WIDTH: usize = 20;

/// Outcome of classifying one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Ready-to-display text; nothing goes to the agent this turn.
    Reply(String),
    /// Expanded instruction to submit to the agent as the user's message.
    Forward(String),
    /// Not a shortcut; submit the original text unchanged.
    Passthrough(String),
}

/// Shortcuts executed locally against the store, never reaching the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FastCommand {
    Projects,
    Summary,
    Urgent,
    Today,
    Help,
}

/// Shortcuts expanded into natural language for the agent to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiCommand {
    Add,
    List,
    Done,
    Delete,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortcut {
    Fast(FastCommand),
    Assisted(AiCommand),
}

impl Shortcut {
    fn parse(token: &str) -> Option<Shortcut> {
        match token {
            "/projects" => Some(Shortcut::Fast(FastCommand::Projects)),
            "/summary" => Some(Shortcut::Fast(FastCommand::Summary)),
            "/urgent" => Some(Shortcut::Fast(FastCommand::Urgent)),
            "/today" => Some(Shortcut::Fast(FastCommand::Today)),
            "/help" => Some(Shortcut::Fast(FastCommand::Help)),
            "/add" => Some(Shortcut::Assisted(AiCommand::Add)),
            "/list" => Some(Shortcut::Assisted(AiCommand::List)),
            "/done" => Some(Shortcut::Assisted(AiCommand::Done)),
            "/delete" => Some(Shortcut::Assisted(AiCommand::Delete)),
            "/search" => Some(Shortcut::Assisted(AiCommand::Search)),
            _ => None,
        }
    }
}

impl AiCommand {
    fn requires_args(self) -> bool {
        !matches!(self, AiCommand::List)
    }

    fn expand(self, args: &str) -> String {
        match self {
            AiCommand::Add => format!(
                "Add a new task: {args}. Parse the project name, priority, and description from the text intelligently."
            ),
            AiCommand::List if args.is_empty() => {
                "List all tasks across all projects".to_string()
            }
            AiCommand::List => format!("List all tasks in the '{args}' project"),
            AiCommand::Done => format!("Mark task {args} as done"),
            AiCommand::Delete => format!("Delete task {args}"),
            AiCommand::Search => format!("Search for tasks containing: {args}"),
        }
    }
}

/// Classify one line of raw input. Stateless; holds no memory of prior
/// calls. Storage failures during fast shortcuts come back as advisory
/// `Reply` text, never as an error.
pub fn dispatch(store: &TaskStore, input: &str) -> Dispatch {
    if !input.starts_with('/') {
        return Dispatch::Passthrough(input.to_string());
    }

    let (token, args) = split_line(input);
    let token = token.to_lowercase();

    match Shortcut::parse(&token) {
        Some(Shortcut::Fast(cmd)) => match run_fast(store, cmd) {
            Ok(text) => Dispatch::Reply(text),
            Err(e) => Dispatch::Reply(format!("Error executing shortcut: {e}")),
        },
        Some(Shortcut::Assisted(cmd)) => {
            if args.is_empty() && cmd.requires_args() {
                Dispatch::Reply(format!(
                    "Usage: {token} <arguments>\nType /help for more info."
                ))
            } else {
                Dispatch::Forward(cmd.expand(args))
            }
        }
        None => Dispatch::Reply(format!(
            "Unknown shortcut: {token}\nType /help to see available shortcuts."
        )),
    }
}

fn split_line(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (input, ""),
    }
}

fn run_fast(store: &TaskStore, cmd: FastCommand) -> Result<String> {
    match cmd {
        FastCommand::Projects => Ok(format_projects(&store.get_projects()?)),
        FastCommand::Summary => Ok(format_summary(&store.get_summary()?)),
        FastCommand::Urgent => {
            let filter = TaskFilter {
                priority: Some(Priority::Urgent.as_str().to_string()),
                ..TaskFilter::default()
            };
            Ok(format_tasks(&store.list(&filter)?))
        }
        FastCommand::Today => Ok(format_tasks(&store.tasks_due_today()?)),
        FastCommand::Help => Ok(help_text()),
    }
}

// ==================== Formatting ====================

fn format_projects(projects: &[ProjectStats]) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    let mut out = vec!["Your Projects:".to_string(), String::new()];
    for p in projects {
        let rate = if p.total_tasks > 0 {
            p.completed as f64 / p.total_tasks as f64 * 100.0
        } else {
            0.0
        };
        let filled = (BAR_WIDTH as f64 * rate / 100.0) as usize;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
        out.push(format!(
            "{}: {}/{} tasks [{}] {:.0}%",
            p.name, p.completed, p.total_tasks, bar, rate
        ));
    }
    out.join("\n")
}

fn format_summary(summary: &Summary) -> String {
    if summary.is_empty() {
        return "No tasks found.".to_string();
    }

    let mut out = vec!["Task Summary:".to_string()];
    for (project, statuses) in summary {
        let total: i64 = statuses.values().sum();
        out.push(String::new());
        out.push(format!("{project} ({total} tasks):"));
        for (status, count) in statuses {
            out.push(format!("  {} {status}: {count}", Status::marker_for(status)));
        }
    }
    out.join("\n")
}

fn format_tasks(tasks: &[TaskRow]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let mut out = vec![format!("Found {} task(s):", tasks.len()), String::new()];
    for task in tasks {
        let due = task
            .due_date
            .as_ref()
            .map(|d| format!(" | Due: {d}"))
            .unwrap_or_default();
        out.push(format!(
            "{} {} [{}] {} ({}){}",
            Priority::marker_for(&task.priority),
            Status::marker_for(&task.status),
            task.id,
            task.title,
            task.project,
            due
        ));
    }
    out.join("\n")
}

fn help_text() -> String {
    "\
Task Manager Shortcuts

Fast shortcuts (instant, no agent round trip):
  /projects         - List all projects with progress
  /summary          - Show the task summary dashboard
  /urgent           - List all urgent priority tasks
  /today            - Show tasks due today
  /help             - Show this help message

Assisted shortcuts (expanded for the agent):
  /add <text>       - Quick add a task (the agent parses project/priority)
                      Example: /add Buy milk for grocery project urgent
  /list [project]   - List tasks, optionally for one project
                      Example: /list grocery
  /done <task_id>   - Mark a task as completed
                      Example: /done abc123ef
  /delete <task_id> - Delete a task
                      Example: /delete abc123ef
  /search <query>   - Search tasks by text
                      Example: /search meeting

Anything else is sent to the agent as-is.
Type 'quit' to exit."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use tempfile::TempDir;

    fn setup() -> (TaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = TaskStore::new(temp_dir.path().join("test.db"));
        store.initialize().unwrap();
        (store, temp_dir)
    }

    fn add(store: &TaskStore, title: &str, project: &str, priority: &str) {
        store
            .add(NewTask {
                title: title.to_string(),
                project: project.to_string(),
                priority: Some(priority.to_string()),
                ..NewTask::default()
            })
            .unwrap();
    }

    #[test]
    fn plain_text_passes_through_unchanged() {
        let (store, _temp) = setup();
        let input = "Show me all blocked tasks in the client project";
        assert_eq!(
            dispatch(&store, input),
            Dispatch::Passthrough(input.to_string())
        );
    }

    #[test]
    fn whitespace_only_passes_through() {
        let (store, _temp) = setup();
        assert_eq!(dispatch(&store, "   "), Dispatch::Passthrough("   ".into()));
        assert_eq!(dispatch(&store, ""), Dispatch::Passthrough(String::new()));
    }

    #[test]
    fn help_is_a_direct_reply() {
        let (store, _temp) = setup();
        match dispatch(&store, "/help") {
            Dispatch::Reply(text) => {
                assert!(!text.is_empty());
                assert!(text.contains("/projects"));
                assert!(text.contains("/search"));
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn token_is_case_folded() {
        let (store, _temp) = setup();
        let lower = dispatch(&store, "/help");
        let upper = dispatch(&store, "/HELP");
        assert_eq!(lower, upper);
    }

    #[test]
    fn add_without_args_is_a_usage_error() {
        let (store, _temp) = setup();
        match dispatch(&store, "/add") {
            Dispatch::Reply(text) => assert!(text.contains("Usage: /add")),
            other => panic!("expected usage reply, got {other:?}"),
        }
    }

    #[test]
    fn add_with_args_expands_for_the_agent() {
        let (store, _temp) = setup();
        match dispatch(&store, "/add Buy milk urgent") {
            Dispatch::Forward(text) => {
                assert!(text.contains("Buy milk urgent"));
                assert!(text.contains("intelligently"));
            }
            other => panic!("expected forward, got {other:?}"),
        }
    }

    #[test]
    fn list_argument_is_optional() {
        let (store, _temp) = setup();
        assert_eq!(
            dispatch(&store, "/list"),
            Dispatch::Forward("List all tasks across all projects".to_string())
        );
        assert_eq!(
            dispatch(&store, "/list work"),
            Dispatch::Forward("List all tasks in the 'work' project".to_string())
        );
    }

    #[test]
    fn done_delete_search_expand_with_args() {
        let (store, _temp) = setup();
        assert_eq!(
            dispatch(&store, "/done abc123ef"),
            Dispatch::Forward("Mark task abc123ef as done".to_string())
        );
        assert_eq!(
            dispatch(&store, "/delete abc123ef"),
            Dispatch::Forward("Delete task abc123ef".to_string())
        );
        assert_eq!(
            dispatch(&store, "/search meeting"),
            Dispatch::Forward("Search for tasks containing: meeting".to_string())
        );
    }

    #[test]
    fn unknown_shortcut_is_advisory() {
        let (store, _temp) = setup();
        match dispatch(&store, "/frobnicate now") {
            Dispatch::Reply(text) => {
                assert!(text.contains("Unknown shortcut: /frobnicate"));
                assert!(text.contains("/help"));
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn urgent_lists_only_urgent_tasks() {
        let (store, _temp) = setup();
        add(&store, "drop everything", "work", "urgent");
        add(&store, "whenever", "work", "low");

        match dispatch(&store, "/urgent") {
            Dispatch::Reply(text) => {
                assert!(text.contains("Found 1 task(s):"));
                assert!(text.contains("drop everything"));
                assert!(!text.contains("whenever"));
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn today_with_no_matches_reports_no_tasks() {
        let (store, _temp) = setup();
        match dispatch(&store, "/today") {
            Dispatch::Reply(text) => assert_eq!(text, "No tasks found."),
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn projects_renders_progress_bars() {
        let (store, _temp) = setup();
        add(&store, "a", "work", "normal");
        add(&store, "b", "work", "normal");
        // Mark one of the two as done.
        let id = store
            .list(&TaskFilter::default())
            .unwrap()
            .first()
            .unwrap()
            .id
            .clone();
        store.update(&id, Some("done"), None).unwrap();

        match dispatch(&store, "/projects") {
            Dispatch::Reply(text) => {
                assert!(text.contains("Your Projects:"));
                assert!(text.contains("work: 1/2 tasks"));
                assert!(text.contains("[██████████░░░░░░░░░░] 50%"));
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn summary_groups_by_project_with_markers() {
        let (store, _temp) = setup();
        add(&store, "a", "work", "normal");
        add(&store, "b", "home", "normal");

        match dispatch(&store, "/summary") {
            Dispatch::Reply(text) => {
                assert!(text.contains("Task Summary:"));
                assert!(text.contains("home (1 tasks):"));
                assert!(text.contains("work (1 tasks):"));
                assert!(text.contains("⏳ todo: 1"));
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn storage_failure_becomes_advisory_text() {
        let temp_dir = TempDir::new().unwrap();
        // Point at a database inside a directory that does not exist.
        let store = TaskStore::new(temp_dir.path().join("missing").join("test.db"));

        match dispatch(&store, "/projects") {
            Dispatch::Reply(text) => assert!(text.starts_with("Error executing shortcut:")),
            other => panic!("expected advisory reply, got {other:?}"),
        }
    }
}

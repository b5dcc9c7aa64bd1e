use crate::error::{Result, TaskError};
use crate::store::TaskStore;
use crate::tools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Upper bound on tool-execution rounds within a single user turn.
const MAX_TOOL_ROUNDS: usize = 8;

const INSTRUCTIONS: &str = "You are a helpful task management assistant. You can add, list, \
update and delete tasks, search them, and provide summaries across projects. \
Be concise and helpful.";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let api_key =
            env::var("TASKPAL_API_KEY").map_err(|_| TaskError::MissingEnv("TASKPAL_API_KEY"))?;
        let api_base =
            env::var("TASKPAL_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = env::var("TASKPAL_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(AgentConfig {
            api_base,
            api_key,
            model,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: ToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl Message {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Message {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    tools: &'a [Value],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

/// Conversation driver: one message thread against a chat-completions
/// endpoint, with the task store wired in as the agent's toolset.
pub struct Agent {
    http: reqwest::blocking::Client,
    config: AgentConfig,
    tools: Vec<Value>,
    messages: Vec<Message>,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Agent {
            http: reqwest::blocking::Client::new(),
            config,
            tools: tools::specs(),
            messages: vec![Message::text("system", INSTRUCTIONS)],
        }
    }

    /// Send one user turn and block until the agent produces a plain
    /// reply, executing any tool calls it makes along the way. Tool
    /// failures are reported back to the agent, not to the caller.
    pub fn send(&mut self, store: &TaskStore, text: &str) -> Result<String> {
        self.messages.push(Message::text("user", text));

        for _ in 0..MAX_TOOL_ROUNDS {
            let message = self.complete()?;
            self.messages.push(message.clone());

            let calls = match &message.tool_calls {
                Some(calls) if !calls.is_empty() => calls.clone(),
                _ => return Ok(message.content.unwrap_or_default()),
            };

            for call in calls {
                debug!(tool = %call.function.name, "executing tool call");
                let result = tools::invoke(store, &call.function.name, &call.function.arguments)
                    .unwrap_or_else(|e| {
                        serde_json::json!({"status": "error", "message": e.to_string()})
                            .to_string()
                    });
                self.messages.push(Message {
                    role: "tool".to_string(),
                    content: Some(result),
                    tool_calls: None,
                    tool_call_id: Some(call.id),
                });
            }
        }

        Err(TaskError::Agent(format!(
            "no reply after {MAX_TOOL_ROUNDS} tool rounds"
        )))
    }

    fn complete(&self) -> Result<Message> {
        let url = format!("{}/chat/completions", self.config.api_base);
        let request = ChatRequest {
            model: &self.config.model,
            messages: &self.messages,
            tools: &self.tools,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(TaskError::Agent(format!("{status}: {body}")));
        }

        let mut parsed: ChatResponse = response.json()?;
        if parsed.choices.is_empty() {
            return Err(TaskError::Agent("response contained no choices".to_string()));
        }
        Ok(parsed.choices.remove(0).message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_serializes_without_tool_fields() {
        let json = serde_json::to_string(&Message::text("user", "hello")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }

    #[test]
    fn assistant_tool_call_message_round_trips() {
        let raw = r#"{
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "list_tasks", "arguments": "{}"}
            }]
        }"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(message.role, "assistant");
        assert_eq!(message.content, None);
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "list_tasks");
    }
}

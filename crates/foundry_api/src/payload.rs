use serde::{Deserialize, Serialize};

/// Request body for provisioning a remote agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateAgentRequest {
    pub model: String,
    pub name: String,
    pub instructions: String,
}

impl CreateAgentRequest {
    pub fn new(
        model: impl Into<String>,
        name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            name: name.into(),
            instructions: instructions.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentResource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThreadResource {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMessageRequest {
    pub role: String,
    pub content: String,
}

impl CreateMessageRequest {
    /// A user-authored turn; the service owns every other role.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Wire name of the role the service assigns to agent replies.
pub const ASSISTANT_ROLE: &str = "assistant";

/// One content item of a thread message.
///
/// Items are duck-typed by `type`; only `text` items carry a payload this
/// client reads, everything else deserializes with `text: None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<MessageText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageText {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResource {
    pub id: String,
    /// Left as the raw wire string; the service owns the role vocabulary.
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl MessageResource {
    #[must_use]
    pub fn is_from_agent(&self) -> bool {
        self.role == ASSISTANT_ROLE
    }

    /// First text content item, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find_map(|item| item.text.as_ref())
            .map(|text| text.value.as_str())
    }
}

/// Message listing for a thread, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<MessageResource>,
    #[serde(default)]
    pub has_more: bool,
}

impl MessageList {
    /// The agent's latest reply text.
    ///
    /// Only inspects the newest message: when the newest message is not an
    /// agent turn, the run produced nothing to render.
    #[must_use]
    pub fn latest_agent_text(&self) -> Option<&str> {
        self.data
            .first()
            .filter(|message| message.is_from_agent())
            .and_then(MessageResource::text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
}

impl CreateRunRequest {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
        }
    }
}

/// Canonical run state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
}

impl RunStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "requires_action" => Self::RequiresAction,
            "cancelling" => Self::Cancelling,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "completed" => Self::Completed,
            "expired" => Self::Expired,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    /// Returns true once the service will never change this run again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Failed | Self::Completed | Self::Expired
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunResource {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeletionStatus {
    pub id: String,
    pub deleted: bool,
}

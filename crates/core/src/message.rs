//! Message and conversation-turn domain types.
//!
//! A [`Message`] is what the model sees: the assembler produces an ordered
//! sequence of them for every query. A [`ConversationTurn`] is what the
//! conversation store remembers between queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and injected context
    System,
    /// The end user
    User,
    /// The model
    Assistant,
}

impl Role {
    /// The wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a stored role name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message sent to the model.
///
/// Fields are private so a message cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Create a message with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// One remembered turn of a conversation, scoped to a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Scope key: the workspace directory, or empty when none was given.
    pub workspace_key: String,

    /// Stored role name (`user` or `assistant`). Kept as text because the
    /// store is an external contract; readers drop names they don't know.
    pub role: String,

    /// The text content
    pub content: String,

    /// When the turn was appended
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time.
    pub fn new(workspace_key: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            workspace_key: workspace_key.into(),
            role: role.as_str().to_string(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Convert to a model message. Only `user` and `assistant` turns qualify.
    pub fn to_message(&self) -> Option<Message> {
        match Role::parse(&self.role)? {
            Role::User => Some(Message::user(&self.content)),
            Role::Assistant => Some(Message::assistant(&self.content)),
            Role::System => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, assistant!");
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "Hello, assistant!");
    }

    #[test]
    fn role_names_roundtrip() {
        for role in [Role::System, Role::User, Role::Assistant] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("tool"), None);
    }

    #[test]
    fn message_serializes_lowercase_role() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn turn_converts_known_roles_only() {
        let user = ConversationTurn::new("/ws", Role::User, "q");
        assert_eq!(user.to_message(), Some(Message::user("q")));

        let assistant = ConversationTurn::new("/ws", Role::Assistant, "a");
        assert_eq!(assistant.to_message(), Some(Message::assistant("a")));

        let mut odd = ConversationTurn::new("/ws", Role::User, "x");
        odd.role = "tool".into();
        assert_eq!(odd.to_message(), None);

        let system = ConversationTurn::new("/ws", Role::System, "s");
        assert_eq!(system.to_message(), None);
    }
}

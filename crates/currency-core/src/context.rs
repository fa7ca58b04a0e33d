use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    #[serde(other)]
    Other,
}

/// The invoking user as described by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: UserRole,
}

impl UserInfo {
    pub fn new(role: UserRole) -> Self {
        Self { name: None, role }
    }

    pub fn admin() -> Self {
        Self::new(UserRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Event pushed back to the host's chat surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum NotificationEvent {
    Message { content: String },
}

impl NotificationEvent {
    pub fn message(content: impl Into<String>) -> Self {
        NotificationEvent::Message {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            NotificationEvent::Message { content } => content,
        }
    }
}

/// Host-provided callback for out-of-band messages.
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: NotificationEvent) -> Result<()>;
}

/// Per-call information supplied by the host alongside tool arguments.
#[derive(Clone, Default)]
pub struct InvocationContext {
    pub user: Option<UserInfo>,
    pub emitter: Option<Arc<dyn EventEmitter>>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("user", &self.user)
            .field("emitter", &self.emitter.is_some())
            .finish()
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated principal - supplied by the external auth subsystem.
///
/// The content layer never manages credentials or sessions; it only consumes
/// this identity triple when attributing posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl Principal {
    pub fn new(id: Uuid, username: impl Into<String>, avatar_url: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            avatar_url,
        }
    }
}

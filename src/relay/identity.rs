use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical authenticated user, identical for every provider variant.
///
/// Fields the backend passes through beyond `name`, `email` and `avatar` are
/// kept verbatim in `extra` so a stored record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            avatar: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// The same identity without the pass-through fields.
    #[must_use]
    pub fn without_extra(&self) -> Self {
        Self {
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            extra: Map::new(),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Person taking part in the group's shared expenses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MemberId::generate(),
            name: name.into(),
            avatar: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<MemberId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

impl Identifiable for Member {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl NamedEntity for Member {
    fn name(&self) -> &str {
        &self.name
    }
}

//! Sample group resources.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::resources::{CreateParams, Resource, TrackedResource};

/// A group of samples, usable in annotation query expressions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    /// Human readable group name.
    pub name: Option<String>,
}

impl Resource for Group {
    const KEY: &'static str = "group";
    const NAME: &'static str = "Group";
}

impl TrackedResource<Group> {
    /// Sets the group name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.update("name", |group| group.name = Some(name));
    }
}

/// Arguments for creating a group.
#[derive(Clone, Debug)]
pub struct GroupCreateParams {
    /// Human readable group name.
    pub name: String,
}

impl GroupCreateParams {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CreateParams for GroupCreateParams {
    type Resource = Group;

    fn to_body(&self) -> Value {
        json!({ "name": self.name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_create_body() {
        assert_eq!(
            GroupCreateParams::new("Controls").to_body(),
            json!({"name": "Controls"})
        );
    }

    #[test]
    fn test_set_name() {
        let mut group = TrackedResource::<Group>::from_uri("/groups/1");
        group.set_name("Cases");
        assert_eq!(group.name.as_deref(), Some("Cases"));
        assert!(group.is_dirty());
    }
}

//! User resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::resources::fields::deserialize_timestamp;
use crate::resources::{CreateParams, Resource, TrackedResource};

/// Roles a user can have.
///
/// - `admin`: can do anything
/// - `importer`: can import samples
/// - `annotator`: can annotate variants
/// - `trader`: can annotate variants if they are in an active sample
/// - `querier`: can use any query expression when annotating
/// - `group-querier`: can use group query expressions when annotating
pub const USER_ROLES: [&str; 6] = [
    "admin",
    "importer",
    "annotator",
    "trader",
    "querier",
    "group-querier",
];

/// An API user.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Login name.
    pub login: Option<String>,
    /// Password, only present after it was set locally.
    pub password: Option<String>,
    /// Human readable user name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Roles of this user, from [`USER_ROLES`].
    pub roles: Option<Vec<String>>,
    /// Date and time the user was added.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub added: Option<DateTime<Utc>>,
}

impl Resource for User {
    const KEY: &'static str = "user";
    const NAME: &'static str = "User";
}

impl TrackedResource<User> {
    /// Sets the password.
    pub fn set_password(&mut self, password: impl Into<String>) {
        let password = password.into();
        self.update("password", |user| user.password = Some(password));
    }

    /// Sets the user name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.update("name", |user| user.name = Some(name));
    }

    /// Sets the email address.
    pub fn set_email(&mut self, email: impl Into<String>) {
        let email = email.into();
        self.update("email", |user| user.email = Some(email));
    }

    /// Replaces the roles.
    pub fn set_roles<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = normalize_roles(roles);
        self.update("roles", |user| user.roles = Some(roles));
    }
}

fn normalize_roles<I, S>(roles: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut roles: Vec<String> = roles.into_iter().map(Into::into).collect();
    roles.sort();
    roles.dedup();
    roles
}

/// Arguments for creating a user.
#[derive(Clone, Debug)]
pub struct UserCreateParams {
    /// Login name used for authentication.
    pub login: String,
    /// Password used for authentication.
    pub password: String,
    /// Human readable user name (default: the login).
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Roles, from [`USER_ROLES`].
    pub roles: Vec<String>,
}

impl UserCreateParams {
    /// Creates parameters for a user without name, email, or roles.
    #[must_use]
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            name: None,
            email: None,
            roles: Vec::new(),
        }
    }
}

impl CreateParams for UserCreateParams {
    type Resource = User;

    fn to_body(&self) -> Value {
        let mut body = json!({
            "login": self.login,
            "password": self.password,
            "name": self.name.as_deref().unwrap_or(&self.login),
            "roles": normalize_roles(self.roles.iter().map(String::as_str)),
        });
        if let Some(email) = &self.email {
            body["email"] = json!(email);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_defaults_to_login() {
        let body = UserCreateParams::new("fiona", "secret").to_body();
        assert_eq!(
            body,
            json!({"login": "fiona", "password": "secret", "name": "fiona", "roles": []})
        );
    }

    #[test]
    fn test_create_body_with_email_and_roles() {
        let mut params = UserCreateParams::new("fiona", "secret");
        params.name = Some("Fiona Example".to_string());
        params.email = Some("fiona@example.com".to_string());
        params.roles = vec!["importer".to_string(), "admin".to_string()];

        let body = params.to_body();
        assert_eq!(body["name"], "Fiona Example");
        assert_eq!(body["email"], "fiona@example.com");
        assert_eq!(body["roles"], json!(["admin", "importer"]));
    }

    #[test]
    fn test_user_deserializes_without_password() {
        let user: User = serde_json::from_value(json!({
            "uri": "/users/1",
            "login": "admin",
            "name": "Admin",
            "email": null,
            "roles": ["admin"],
            "added": "2013-11-04T10:00:00"
        }))
        .unwrap();
        assert_eq!(user.login.as_deref(), Some("admin"));
        assert!(user.password.is_none());
        assert_eq!(user.roles, Some(vec!["admin".to_string()]));
    }

    #[test]
    fn test_set_roles_sorts_and_marks_dirty() {
        let mut user = TrackedResource::<User>::from_uri("/users/2");
        user.set_roles(["trader", "annotator", "trader"]);
        assert_eq!(
            user.changed_fields(),
            json!({"roles": ["annotator", "trader"]})
        );
    }

    #[test]
    fn test_known_roles() {
        assert!(USER_ROLES.contains(&"group-querier"));
        assert_eq!(USER_ROLES.len(), 6);
    }
}

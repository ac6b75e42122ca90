//! Text rendering of resources for the command line.
//!
//! Each record is a block of `Label:  value` lines with the values aligned.
//! Missing values render as an empty string.

use std::fmt::Display;

use crate::resources::{DataSource, Group, Sample, Task, TrackedResource, User};

const SAMPLE_WIDTH: usize = 13;
const GROUP_WIDTH: usize = 8;
const USER_WIDTH: usize = 8;
const DATA_SOURCE_WIDTH: usize = 14;

fn line(label: &str, width: usize, value: impl Display) -> String {
    let label = format!("{label}:");
    format!("{label:<width$}{value}")
}

fn or_empty<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn lines(entries: &[String]) -> String {
    entries.join("\n")
}

/// Renders the summary of a sample.
#[must_use]
pub fn sample(sample: &TrackedResource<Sample>) -> String {
    let visibility = if sample.public.unwrap_or(false) {
        "public"
    } else {
        "private"
    };
    let state = if sample.active.unwrap_or(false) {
        "active"
    } else {
        "inactive"
    };

    lines(&[
        line("Sample", SAMPLE_WIDTH, sample.uri()),
        line("Name", SAMPLE_WIDTH, or_empty(sample.name.as_deref())),
        line("Pool size", SAMPLE_WIDTH, or_empty(sample.pool_size)),
        line("Visibility", SAMPLE_WIDTH, visibility),
        line("State", SAMPLE_WIDTH, state),
    ])
}

/// Renders the owner of a sample or data source, aligned to `width`.
fn owner(user: Option<&TrackedResource<User>>, width: usize) -> String {
    lines(&[
        line("User", width, or_empty(user.map(TrackedResource::uri))),
        line(
            "Name",
            width,
            or_empty(user.and_then(|user| user.name.as_deref())),
        ),
    ])
}

/// Renders the owner of a sample.
#[must_use]
pub fn sample_user(user: Option<&TrackedResource<User>>) -> String {
    owner(user, SAMPLE_WIDTH)
}

/// Renders a group as part of a sample's details.
#[must_use]
pub fn sample_group(group: &TrackedResource<Group>) -> String {
    lines(&[
        line("Group", SAMPLE_WIDTH, group.uri()),
        line("Name", SAMPLE_WIDTH, or_empty(group.name.as_deref())),
    ])
}

/// Renders an import task, such as a variation or coverage, of a sample.
#[must_use]
pub fn import_task(label: &str, uri: &str, task: Option<&Task>) -> String {
    let state = if task.is_some_and(|task| task.done) {
        "imported"
    } else {
        "not imported"
    };
    lines(&[
        line(label, SAMPLE_WIDTH, uri),
        line("State", SAMPLE_WIDTH, state),
    ])
}

/// Renders a group.
#[must_use]
pub fn group(group: &TrackedResource<Group>) -> String {
    lines(&[
        line("Group", GROUP_WIDTH, group.uri()),
        line("Name", GROUP_WIDTH, or_empty(group.name.as_deref())),
    ])
}

/// Renders a user. Roles are listed in sorted order.
#[must_use]
pub fn user(user: &TrackedResource<User>) -> String {
    let mut roles: Vec<&str> = user
        .roles
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();
    roles.sort_unstable();

    lines(&[
        line("User", USER_WIDTH, user.uri()),
        line("Name", USER_WIDTH, or_empty(user.name.as_deref())),
        line("Login", USER_WIDTH, or_empty(user.login.as_deref())),
        line("Roles", USER_WIDTH, roles.join(", ")),
    ])
}

/// Renders a data source.
#[must_use]
pub fn data_source(data_source: &TrackedResource<DataSource>) -> String {
    lines(&[
        line("Data source", DATA_SOURCE_WIDTH, data_source.uri()),
        line(
            "Name",
            DATA_SOURCE_WIDTH,
            or_empty(data_source.name.as_deref()),
        ),
        line("Filetype", DATA_SOURCE_WIDTH, or_empty(data_source.filetype)),
    ])
}

/// Renders the owner of a data source.
#[must_use]
pub fn data_source_user(user: Option<&TrackedResource<User>>) -> String {
    owner(user, DATA_SOURCE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tracked<T: crate::resources::Resource>(document: serde_json::Value) -> TrackedResource<T> {
        TrackedResource::from_document(document, "/").unwrap()
    }

    #[test]
    fn test_sample_output() {
        let sample: TrackedResource<Sample> = tracked(json!({
            "uri": "/samples/3",
            "name": "Trio",
            "pool_size": 3,
            "public": true,
            "active": false,
        }));

        assert_eq!(
            super::sample(&sample),
            "Sample:      /samples/3\n\
             Name:        Trio\n\
             Pool size:   3\n\
             Visibility:  public\n\
             State:       inactive"
        );
    }

    #[test]
    fn test_user_output_sorts_roles() {
        let user: TrackedResource<User> = tracked(json!({
            "uri": "/users/2",
            "name": "Fred",
            "login": "fred",
            "roles": ["querier", "admin"],
        }));

        assert_eq!(
            super::user(&user),
            "User:   /users/2\n\
             Name:   Fred\n\
             Login:  fred\n\
             Roles:  admin, querier"
        );
    }

    #[test]
    fn test_group_output() {
        let group: TrackedResource<Group> =
            tracked(json!({"uri": "/groups/1", "name": "Controls"}));
        assert_eq!(super::group(&group), "Group:  /groups/1\nName:   Controls");
    }

    #[test]
    fn test_data_source_output() {
        let data_source: TrackedResource<DataSource> = tracked(json!({
            "uri": "/data_sources/4",
            "name": "Variants from file \"trio.vcf\"",
            "filetype": "vcf",
        }));

        assert_eq!(
            super::data_source(&data_source),
            "Data source:  /data_sources/4\n\
             Name:         Variants from file \"trio.vcf\"\n\
             Filetype:     vcf"
        );
    }

    #[test]
    fn test_import_task_state() {
        let done = Task {
            done: true,
            ..Task::default()
        };
        assert_eq!(
            import_task("Variation", "/variations/1", Some(&done)),
            "Variation:   /variations/1\nState:       imported"
        );
        assert_eq!(
            import_task("Coverage", "/coverages/1", None),
            "Coverage:    /coverages/1\nState:       not imported"
        );
    }

    #[test]
    fn test_missing_owner_renders_empty() {
        assert_eq!(sample_user(None), "User:        \nName:        ");
    }
}

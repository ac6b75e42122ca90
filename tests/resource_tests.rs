//! Integration tests for resource proxies: lazy loading, dirty tracking,
//! saving, and task polling.

use std::time::Duration;

use manwe::resources::{Link, Queries, Sample, User, Variation};
use manwe::{ApiRoot, ManweConfig, ResourceError, ResourceState, Session, Token};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_session(server: &MockServer) -> Session {
    let config = ManweConfig::builder()
        .api_root(ApiRoot::new(server.uri()).unwrap())
        .token(Token::new("test-token").unwrap())
        .task_poll_wait(Duration::from_millis(10))
        .request_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    Session::new(config).unwrap()
}

fn sample_document() -> serde_json::Value {
    json!({
        "sample": {
            "uri": "/samples/3",
            "user": {"uri": "/users/2"},
            "name": "Trio",
            "pool_size": 3,
            "coverage_profile": true,
            "public": false,
            "active": false,
            "notes": null,
            "groups": [{"uri": "/groups/1"}],
            "added": "2014-03-20T12:30:00",
        }
    })
}

async fn mount_sample(server: &MockServer, expected_gets: u64) {
    Mock::given(method("GET"))
        .and(path("/samples/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_document()))
        .expect(expected_gets)
        .mount(server)
        .await;
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_proxy_is_loaded_on_demand() {
    let server = MockServer::start().await;
    mount_sample(&server, 1).await;
    let session = create_test_session(&server);

    let mut sample = session.sample("/samples/3");
    assert_eq!(sample.state(), ResourceState::Unmaterialized);
    assert!(server.received_requests().await.unwrap().is_empty());

    sample.ensure_loaded(&session).await.unwrap();
    sample.ensure_loaded(&session).await.unwrap();

    assert_eq!(sample.state(), ResourceState::Materialized);
    assert_eq!(sample.name.as_deref(), Some("Trio"));
    assert_eq!(sample.pool_size, Some(3));
    assert_eq!(sample.user, Some(Link::new("/users/2")));
    assert_eq!(sample.groups, Some(vec![Link::new("/groups/1")]));
    assert!(sample.added.is_some());
}

#[tokio::test]
async fn test_missing_resource_becomes_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/samples/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "not_found", "message": "The requested entity could not be found"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut sample = session.sample("/samples/9");
    let error = sample.ensure_loaded(&session).await.unwrap_err();
    assert!(error.is_not_found());
    assert_eq!(error.to_string(), "Resource does not exist: \"/samples/9\"");
    assert_eq!(sample.state(), ResourceState::Invalid);

    // No further request is sent for an invalid resource.
    assert!(sample.refresh(&session).await.unwrap_err().is_not_found());
    sample.set_active(true);
    assert!(sample.save(&session).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_fetch_returns_materialized_resource() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "uri": "/users/2",
                "login": "fred",
                "name": "Fred",
                "roles": ["admin"],
                "added": "2014-03-20T12:30:00+00:00",
            }
        })))
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let user = session.fetch::<User>("/users/2").await.unwrap();
    assert!(user.is_materialized());
    assert_eq!(user.login.as_deref(), Some("fred"));
    assert_eq!(user.roles, Some(vec!["admin".to_string()]));
}

// ============================================================================
// Dirty tracking and saving
// ============================================================================

#[tokio::test]
async fn test_set_then_read_without_request() {
    let server = MockServer::start().await;
    let session = create_test_session(&server);

    let mut sample = session.sample("/samples/3");
    sample.set_name("Quartet");
    sample.set_groups([Link::new("/groups/2"), Link::new("/groups/1"), Link::new("/groups/2")]);

    assert_eq!(sample.name.as_deref(), Some("Quartet"));
    assert_eq!(
        sample.groups,
        Some(vec![Link::new("/groups/1"), Link::new("/groups/2")])
    );
    assert!(sample.is_dirty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_loading_keeps_local_changes() {
    let server = MockServer::start().await;
    mount_sample(&server, 1).await;
    let session = create_test_session(&server);

    let mut sample = session.sample("/samples/3");
    sample.set_active(true);
    sample.ensure_loaded(&session).await.unwrap();

    assert_eq!(sample.active, Some(true));
    assert_eq!(sample.name.as_deref(), Some("Trio"));
    assert_eq!(sample.state(), ResourceState::Dirty);
}

#[tokio::test]
async fn test_save_without_changes_sends_nothing() {
    let server = MockServer::start().await;
    mount_sample(&server, 1).await;
    let session = create_test_session(&server);

    let mut sample = session.fetch::<Sample>("/samples/3").await.unwrap();
    sample.save(&session).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_save_sends_only_dirty_fields() {
    let server = MockServer::start().await;
    mount_sample(&server, 1).await;
    Mock::given(method("PATCH"))
        .and(path("/samples/3"))
        .and(body_json(json!({"active": true, "pool_size": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sample": {"uri": "/samples/3", "active": true, "pool_size": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut sample = session.fetch::<Sample>("/samples/3").await.unwrap();
    sample.set_active(true);
    sample.set_pool_size(4);
    sample.save(&session).await.unwrap();

    assert_eq!(sample.state(), ResourceState::Materialized);
    assert_eq!(sample.dirty_fields().count(), 0);
    assert_eq!(sample.active, Some(true));
    assert_eq!(sample.name.as_deref(), Some("Trio"));
}

#[tokio::test]
async fn test_save_merges_fields_returned_by_server() {
    let server = MockServer::start().await;
    mount_sample(&server, 1).await;
    Mock::given(method("PATCH"))
        .and(path("/samples/3"))
        .and(body_json(json!({"active": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sample": {"uri": "/samples/3", "active": true, "notes": "server"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut sample = session.fetch::<Sample>("/samples/3").await.unwrap();
    sample.set_active(true);
    sample.save(&session).await.unwrap();

    assert_eq!(sample.notes.as_deref(), Some("server"));
    assert_eq!(sample.name.as_deref(), Some("Trio"));
    assert!(!sample.is_dirty());
}

#[tokio::test]
async fn test_save_of_deleted_resource_becomes_invalid() {
    let server = MockServer::start().await;
    mount_sample(&server, 1).await;
    Mock::given(method("PATCH"))
        .and(path("/samples/3"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "not_found", "message": "The requested entity could not be found"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut sample = session.fetch::<Sample>("/samples/3").await.unwrap();
    sample.set_active(true);
    let error = sample.save(&session).await.unwrap_err();

    assert!(matches!(error, ResourceError::NotFound { .. }));
    assert_eq!(sample.state(), ResourceState::Invalid);

    let error = sample.refresh(&session).await.unwrap_err();
    assert!(matches!(error, ResourceError::NotFound { .. }));
}

#[tokio::test]
async fn test_failed_save_keeps_changes() {
    let server = MockServer::start().await;
    mount_sample(&server, 1).await;
    Mock::given(method("PATCH"))
        .and(path("/samples/3"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": "forbidden", "message": "Not allowed"}
        })))
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut sample = session.fetch::<Sample>("/samples/3").await.unwrap();
    sample.set_public(true);
    let error = sample.save(&session).await.unwrap_err();

    assert!(matches!(error, ResourceError::Remote { code: 403, .. }));
    assert!(sample.is_dirty());
    assert_eq!(sample.dirty_fields().collect::<Vec<_>>(), vec!["public"]);
    assert_eq!(sample.public, Some(true));
}

#[tokio::test]
async fn test_refresh_discards_changes() {
    let server = MockServer::start().await;
    mount_sample(&server, 2).await;
    let session = create_test_session(&server);

    let mut sample = session.fetch::<Sample>("/samples/3").await.unwrap();
    sample.set_name("Changed");
    sample.refresh(&session).await.unwrap();

    assert_eq!(sample.name.as_deref(), Some("Trio"));
    assert!(!sample.is_dirty());
}

// ============================================================================
// Tasks and variants
// ============================================================================

#[tokio::test]
async fn test_wait_for_task_polls_until_done() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/variations/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "variation": {
                "uri": "/variations/1",
                "sample": {"uri": "/samples/3"},
                "data_source": {"uri": "/data_sources/4"},
                "task": {"done": false, "state": "running", "progress": 40},
            }
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/variations/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "variation": {
                "uri": "/variations/1",
                "sample": {"uri": "/samples/3"},
                "data_source": {"uri": "/data_sources/4"},
                "task": {"done": true, "state": "success"},
            }
        })))
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut variation = session.variation("/variations/1");
    let task = variation.wait_for_task(&session).await.unwrap();

    assert!(task.succeeded());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_wait_for_task_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/variations/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "variation": {
                "uri": "/variations/1",
                "task": {
                    "done": true,
                    "state": "failure",
                    "error": {"code": "invalid_data", "message": "Could not parse VCF"},
                },
            }
        })))
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut variation = session.resource::<Variation>("/variations/1");
    let error = variation.wait_for_task(&session).await.unwrap_err();

    match error {
        ResourceError::TaskFailed { uri, code, message } => {
            assert_eq!(uri, "/variations/1");
            assert_eq!(code, "invalid_data");
            assert_eq!(message, "Could not parse VCF");
        }
        other => panic!("Expected TaskFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_variant_annotate_sends_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/variants/5"))
        .and(query_param(
            "queries",
            r#"[{"expression":"*","name":"all"}]"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "variant": {
                "uri": "/variants/5",
                "annotations": {
                    "all": {
                        "coverage": 120,
                        "frequency": 0.25,
                        "frequency_het": 0.2,
                        "frequency_hom": 0.05,
                    }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let session = create_test_session(&server);

    let mut queries = Queries::new();
    queries.insert("all".to_string(), "*".to_string());

    let variant = session.variant("/variants/5");
    let annotations = variant.annotate(&session, &queries).await.unwrap();

    assert_eq!(annotations["all"].coverage, 120);
    assert!((annotations["all"].frequency - 0.25).abs() < f64::EPSILON);
}

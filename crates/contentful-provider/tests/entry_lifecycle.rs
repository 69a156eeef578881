//! Entry reconciliation: publish/archive sequencing, conflicts and absence.

mod common;

use common::{ENV, SPACE, context, entry_body, env_path};
use contentful_core::{ContentfulError, LifecycleStep};
use contentful_provider::Reconciler;
use contentful_provider::resources::{EntryField, EntryResource, EntryState};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state(version: Option<u64>, published: bool, archived: bool) -> EntryState {
    EntryState {
        space_id: SPACE.into(),
        environment_id: ENV.into(),
        entry_id: "e1".into(),
        contenttype_id: "post".into(),
        fields: vec![EntryField {
            id: "title".into(),
            locale: "en-US".into(),
            content: "Hello".into(),
        }],
        published,
        archived,
        version,
    }
}

#[tokio::test]
async fn create_puts_entry_then_publishes_it() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1")))
        .and(header("x-contentful-content-type", "post"))
        .and(body_json(json!({"fields": {"title": {"en-US": "Hello"}}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(entry_body(1, false, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/published")))
        .and(header("x-contentful-version", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(2, true, false)))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let created = reconciler.create(&state(None, true, false)).await.unwrap();

    assert_eq!(created.version, Some(2));
    assert!(created.published);
    assert!(!created.archived);
    assert_eq!(created.fields, state(None, true, false).fields);
}

/// Publishing and archiving are independent: turning on `published` issues
/// one publish call and no archive call; turning on `archived` afterwards
/// issues one archive call and leaves `published` set.
#[tokio::test]
async fn publish_and_archive_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(1, false, false)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(2, true, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/published")))
        .and(header("x-contentful-version", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(2, true, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/archived")))
        .and(header("x-contentful-version", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(3, true, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));

    let observed = state(Some(1), false, false);
    let published = reconciler
        .update(&state(None, true, false), &observed)
        .await
        .unwrap();
    assert!(published.published);
    assert!(!published.archived);
    assert_eq!(published.version, Some(2));

    let archived = reconciler
        .update(&state(None, true, true), &published)
        .await
        .unwrap();
    assert!(archived.published);
    assert!(archived.archived);
    assert_eq!(archived.version, Some(3));
}

#[tokio::test]
async fn stale_version_surfaces_as_conflict_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1")))
        .and(header("x-contentful-version", "4"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "sys": {"type": "Error", "id": "VersionMismatch"},
            "message": "Version mismatch"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let mut desired = state(None, false, false);
    desired.fields[0].content = "Changed".into();

    let err = reconciler
        .update(&desired, &state(Some(4), false, false))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(err, ContentfulError::Conflict { version: 4, .. }));
}

#[tokio::test]
async fn content_change_on_published_entry_needs_no_publish_call() {
    let server = MockServer::start().await;
    let mut changed = entry_body(6, true, false);
    changed["fields"]["title"]["en-US"] = json!("Changed");

    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1")))
        .and(header("x-contentful-version", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(changed))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/published")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(7, true, false)))
        .expect(0)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let mut desired = state(None, true, false);
    desired.fields[0].content = "Changed".into();

    let updated = reconciler
        .update(&desired, &state(Some(5), true, false))
        .await
        .unwrap();
    assert_eq!(updated.version, Some(6));
    assert!(updated.published);
    assert_eq!(updated.fields[0].content, "Changed");

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().ends_with("/published")));
}

#[tokio::test]
async fn flags_only_update_against_newer_remote_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(2, false, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/published")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(3, true, false)))
        .expect(0)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let err = reconciler
        .update(&state(None, true, false), &state(Some(1), false, false))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(matches!(err, ContentfulError::Conflict { version: 1, .. }));
}

#[tokio::test]
async fn conflict_during_publish_is_a_lifecycle_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(1, false, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/published")))
        .and(header("x-contentful-version", "1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "sys": {"type": "Error", "id": "VersionMismatch"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let err = reconciler
        .update(&state(None, true, false), &state(Some(1), false, false))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    match err {
        ContentfulError::Lifecycle { step, source } => {
            assert_eq!(step, LifecycleStep::Publish);
            assert!(matches!(*source, ContentfulError::Conflict { version: 1, .. }));
        }
        other => panic!("expected lifecycle error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_archive_step_is_named_and_earlier_publish_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(1, false, false)))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/published")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(2, true, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("entries/e1/archived")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "Cannot archive"})))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let err = reconciler
        .update(&state(None, true, true), &state(Some(1), false, false))
        .await
        .unwrap_err();

    match err {
        ContentfulError::Lifecycle { step, source } => {
            assert_eq!(step, LifecycleStep::Archive);
            assert!(matches!(*source, ContentfulError::UnexpectedStatus { actual: 422, .. }));
        }
        other => panic!("expected lifecycle error, got {other:?}"),
    }
}

#[tokio::test]
async fn read_of_missing_entry_is_absence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"sys": {"id": "NotFound"}})))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    assert!(reconciler.read(&state(Some(3), false, false)).await.unwrap().is_none());
}

#[tokio::test]
async fn read_round_trips_user_fields() {
    let server = MockServer::start().await;
    let mut body = entry_body(3, true, false);
    body["fields"]["meta"] = json!({"en-US": {"b": 1, "a": 2}});
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let mut plan = state(Some(3), true, false);
    plan.fields.push(EntryField {
        id: "meta".into(),
        locale: "en-US".into(),
        content: r#"{"b":1,"a":2}"#.into(),
    });

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let observed = reconciler.read(&plan).await.unwrap().unwrap();
    assert_eq!(observed.fields[0].content, "Hello");
    assert_eq!(observed.fields[1].content, r#"{"a":2,"b":1}"#);
    assert!(observed.published);

    // A second read yields byte-identical state.
    let again = reconciler.read(&observed).await.unwrap().unwrap();
    assert_eq!(again, observed);
}

#[tokio::test]
async fn delete_unpublishes_first_with_latest_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(8, true, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(env_path("entries/e1/published")))
        .and(header("x-contentful-version", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(9, false, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(env_path("entries/e1")))
        .and(header("x-contentful-version", "9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    reconciler.delete(&state(Some(5), true, false)).await.unwrap();
}

#[tokio::test]
async fn delete_of_missing_entry_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    reconciler.delete(&state(Some(5), false, false)).await.unwrap();
}

#[tokio::test]
async fn import_parses_id_and_reads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("entries/e1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_body(2, false, true)))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EntryResource, context(&server));
    let imported = reconciler.import("e1:sp1:master").await.unwrap().unwrap();
    assert_eq!(imported.entry_id, "e1");
    assert_eq!(imported.space_id, SPACE);
    assert_eq!(imported.contenttype_id, "post");
    assert!(imported.archived);
    assert!(!imported.published);
}

//! Wire behaviour of the remaining resources and the type-name registry.

mod common;

use std::collections::BTreeMap;

use assert_json_diff::assert_json_include;
use common::{ENV, SPACE, context, env_path, sys};
use contentful_core::ContentfulError;
use contentful_provider::resources::{
    AppInstallationResource, AppInstallationState, ContentTypeField, ContentTypeResource,
    ContentTypeState, EnvironmentResource, EnvironmentState, PermissionValue, RoleResource,
    RoleState, SpaceResource, SpaceState, TaxonomyConceptResource, WebhookResource, WebhookState,
};
use contentful_provider::{ContentfulProvider, Reconciler, Resource};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn malformed_locale_import_makes_no_remote_call() {
    let server = MockServer::start().await;
    let provider = ContentfulProvider::new(context(&server));

    let err = provider
        .resource("contentful_locale")
        .unwrap()
        .import("abc")
        .await
        .unwrap_err();

    assert!(matches!(err, ContentfulError::MalformedImportId { .. }));
    assert!(err.to_string().contains("localeId:environment:spaceId"), "{err}");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn registry_reads_locale_from_json_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(env_path("locales/loc1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "German",
            "code": "de-DE",
            "fallbackCode": "en-US",
            "optional": true,
            "contentDeliveryApi": true,
            "contentManagementApi": true,
            "default": false,
            "sys": sys("loc1", "Locale", 2, false, false)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ContentfulProvider::new(context(&server));
    let observed = provider
        .resource("contentful_locale")
        .unwrap()
        .import("loc1:master:sp1")
        .await
        .unwrap()
        .unwrap();

    assert_json_include!(
        actual: observed,
        expected: json!({
            "space_id": SPACE,
            "environment": ENV,
            "code": "de-DE",
            "fallback_code": "en-US",
            "optional": true,
            "version": 2
        })
    );
}

#[tokio::test]
async fn space_create_sends_organization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spaces"))
        .and(header("x-contentful-organization", "org1"))
        .and(body_json(json!({"name": "Blog", "defaultLocale": "de-DE"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "Blog",
            "sys": sys("sp9", "Space", 1, false, false)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(SpaceResource, context(&server));
    let created = reconciler
        .create(&SpaceState {
            id: None,
            version: None,
            name: "Blog".into(),
            default_locale: "de-DE".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some("sp9"));
    assert_eq!(created.default_locale, "de-DE");
}

#[tokio::test]
async fn webhook_delete_of_missing_object_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/spaces/sp1/webhook_definitions/wh1"))
        .and(header("x-contentful-version", "3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(WebhookResource, context(&server));
    reconciler.delete(&webhook(3)).await.unwrap();
}

#[tokio::test]
async fn webhook_update_conflict_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/spaces/sp1/webhook_definitions/wh1"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(WebhookResource, context(&server));
    let current = webhook(3);
    let mut desired = current.clone();
    desired.name = "renamed".into();
    desired.url = "https://example.com/hook".into();

    let err = reconciler.update(&desired, &current).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn role_read_maps_permission_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces/sp1/roles/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Editor",
            "description": "Edits content",
            "permissions": {
                "ContentModel": ["read"],
                "Settings": "all",
                "ContentDelivery": []
            },
            "policies": [{
                "effect": "allow",
                "actions": ["read", "update"],
                "constraint": {"and": [{"equals": [{"doc": "sys.type"}, "Entry"]}]}
            }],
            "sys": sys("r1", "Role", 4, false, false)
        })))
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(RoleResource, context(&server));
    let role = reconciler
        .import("r1:sp1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(role.permissions["Settings"], PermissionValue::Scalar("all".into()));
    assert_eq!(
        role.permissions["ContentModel"],
        PermissionValue::List(vec!["read".into()])
    );
    assert_eq!(role.permissions["ContentDelivery"], PermissionValue::List(Vec::new()));
    assert_eq!(
        role.policies[0].constraint.as_deref(),
        Some(r#"{"and":[{"equals":[{"doc":"sys.type"},"Entry"]}]}"#)
    );
}

#[tokio::test]
async fn role_read_rejects_unknown_permission_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces/sp1/roles/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Editor",
            "permissions": {"ContentModel": {"read": true}},
            "sys": sys("r1", "Role", 4, false, false)
        })))
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(RoleResource, context(&server));
    let err = reconciler.import("r1:sp1").await.unwrap_err();
    assert!(matches!(err, ContentfulError::InvalidValue { ref field, .. } if field == "permissions.ContentModel"));
}

#[tokio::test]
async fn role_delete_refreshes_version_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces/sp1/roles/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Editor",
            "sys": sys("r1", "Role", 9, false, false)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/spaces/sp1/roles/r1"))
        .and(header("x-contentful-version", "9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(RoleResource, context(&server));
    let state = RoleState {
        space_id: SPACE.into(),
        id: Some("r1".into()),
        version: Some(2),
        name: "Editor".into(),
        description: String::new(),
        permissions: BTreeMap::new(),
        policies: Vec::new(),
    };
    reconciler.delete(&state).await.unwrap();
}

fn webhook(version: u64) -> WebhookState {
    let id = WebhookResource::IMPORT_FORMAT.parse("wh1:sp1").unwrap();
    let mut state = WebhookResource::state_from_import(&id);
    state.version = Some(version);
    state
}

fn ct_field(id: &str) -> ContentTypeField {
    ContentTypeField {
        id: id.into(),
        name: id.into(),
        field_type: "Symbol".into(),
        link_type: None,
        items: None,
        required: false,
        localized: false,
        disabled: false,
        omitted: false,
        validations: Vec::new(),
    }
}

fn ct_body(version: u64, active: bool, fields: Value) -> Value {
    json!({
        "name": "Post",
        "displayField": "title",
        "fields": fields,
        "sys": sys("post", "ContentType", version, active, false)
    })
}

fn ct_state(fields: Vec<ContentTypeField>, version: Option<u64>) -> ContentTypeState {
    ContentTypeState {
        space_id: SPACE.into(),
        environment_id: ENV.into(),
        id: Some("post".into()),
        version,
        name: "Post".into(),
        description: None,
        display_field: "title".into(),
        fields,
    }
}

#[tokio::test]
async fn content_type_create_activates() {
    let server = MockServer::start().await;
    let fields = json!([{"id": "title", "name": "title", "type": "Symbol"}]);
    Mock::given(method("PUT"))
        .and(path(env_path("content_types/post")))
        .respond_with(ResponseTemplate::new(201).set_body_json(ct_body(1, false, fields.clone())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("content_types/post/published")))
        .and(header("x-contentful-version", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(2, true, fields)))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(ContentTypeResource, context(&server));
    let created = reconciler
        .create(&ct_state(vec![ct_field("title")], None))
        .await
        .unwrap();
    assert_eq!(created.version, Some(2));
    assert_eq!(created.fields, vec![ct_field("title")]);
}

#[tokio::test]
async fn content_type_create_errors_name_the_chosen_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(env_path("content_types/post")))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(ContentTypeResource, context(&server));
    let err = reconciler
        .create(&ct_state(vec![ct_field("title")], None))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ContentfulError::Conflict { ref id, .. } if id == "post"),
        "{err:?}"
    );
}

#[tokio::test]
async fn webhook_create_errors_do_not_use_the_display_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spaces/sp1/webhook_definitions"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(WebhookResource, context(&server));
    let mut plan = webhook(0);
    plan.id = None;
    plan.version = None;
    plan.name = "Order hook".into();
    plan.url = "https://example.com/hook".into();

    let err = reconciler.create(&plan).await.unwrap_err();
    assert!(
        matches!(err, ContentfulError::Conflict { ref id, .. } if id == "new"),
        "{err:?}"
    );
    assert!(!err.to_string().contains("Order hook"));
}

#[tokio::test]
async fn content_type_field_removal_omits_before_dropping() {
    let server = MockServer::start().await;
    let both = json!([
        {"id": "title", "name": "title", "type": "Symbol"},
        {"id": "body", "name": "body", "type": "Symbol", "omitted": true}
    ]);
    let title_only = json!([{"id": "title", "name": "title", "type": "Symbol"}]);

    Mock::given(method("PUT"))
        .and(path(env_path("content_types/post")))
        .and(header("x-contentful-version", "2"))
        .and(body_partial_json(json!({"fields": [{"id": "title"}, {"id": "body", "omitted": true}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(3, true, both.clone())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("content_types/post/published")))
        .and(header("x-contentful-version", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(4, true, both)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("content_types/post")))
        .and(header("x-contentful-version", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(5, true, title_only.clone())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env_path("content_types/post/published")))
        .and(header("x-contentful-version", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(6, true, title_only)))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(ContentTypeResource, context(&server));
    let updated = reconciler
        .update(
            &ct_state(vec![ct_field("title")], None),
            &ct_state(vec![ct_field("title"), ct_field("body")], Some(2)),
        )
        .await
        .unwrap();
    assert_eq!(updated.version, Some(6));
    assert_eq!(updated.fields, vec![ct_field("title")]);
}

#[tokio::test]
async fn content_type_delete_deactivates_first() {
    let server = MockServer::start().await;
    let fields = json!([{"id": "title", "name": "title", "type": "Symbol"}]);
    Mock::given(method("GET"))
        .and(path(env_path("content_types/post")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(4, true, fields.clone())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(env_path("content_types/post/published")))
        .and(header("x-contentful-version", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ct_body(5, false, fields)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(env_path("content_types/post")))
        .and(header("x-contentful-version", "5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(ContentTypeResource, context(&server));
    reconciler
        .delete(&ct_state(vec![ct_field("title")], Some(4)))
        .await
        .unwrap();
}

#[tokio::test]
async fn taxonomy_update_sends_json_patch() {
    let server = MockServer::start().await;
    let concept = |version: u64, label: &str| {
        json!({
            "prefLabel": {"en-US": label},
            "sys": sys("c1", "TaxonomyConcept", version, false, false)
        })
    };
    Mock::given(method("GET"))
        .and(path("/organizations/org1/taxonomy/concepts/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(concept(2, "Shoes")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/organizations/org1/taxonomy/concepts/c1"))
        .and(header("content-type", "application/json-patch+json"))
        .and(header("x-contentful-version", "2"))
        .and(body_json(json!([
            {"op": "replace", "path": "/prefLabel/en-US", "value": "Footwear"}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(concept(3, "Footwear")))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(TaxonomyConceptResource, context(&server));
    let current = reconciler.import("sp1:master:c1").await.unwrap().unwrap();
    assert_eq!(current.space_id, SPACE);

    let mut desired = current.clone();
    desired.pref_label.insert("en-US".into(), "Footwear".into());
    let updated = reconciler.update(&desired, &current).await.unwrap();
    assert_eq!(updated.version, Some(3));
    assert_eq!(updated.pref_label["en-US"], "Footwear");
    assert_eq!(updated.environment_id, ENV);
}

#[tokio::test]
async fn environment_create_waits_until_ready() {
    let server = MockServer::start().await;
    let env = |version: u64, status: &str| {
        let mut sys = sys("staging", "Environment", version, false, false);
        sys["status"] = json!({"sys": {"type": "Link", "linkType": "Status", "id": status}});
        json!({"name": "Staging", "sys": sys})
    };
    Mock::given(method("PUT"))
        .and(path("/spaces/sp1/environments/staging"))
        .and(header("x-contentful-source-environment", "master"))
        .respond_with(ResponseTemplate::new(201).set_body_json(env(1, "queued")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spaces/sp1/environments/staging"))
        .respond_with(ResponseTemplate::new(200).set_body_json(env(1, "queued")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spaces/sp1/environments/staging"))
        .respond_with(ResponseTemplate::new(200).set_body_json(env(2, "ready")))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EnvironmentResource, context(&server));
    let created = reconciler
        .create(&EnvironmentState {
            space_id: SPACE.into(),
            id: "staging".into(),
            version: None,
            name: "Staging".into(),
            source_environment_id: Some("master".into()),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(created.status.as_deref(), Some("ready"));
    assert_eq!(created.version, Some(2));
    assert_eq!(created.source_environment_id.as_deref(), Some("master"));
}

#[tokio::test]
async fn environment_gone_before_ready_is_not_found() {
    let server = MockServer::start().await;
    let mut sys = sys("staging", "Environment", 1, false, false);
    sys["status"] = json!({"sys": {"type": "Link", "linkType": "Status", "id": "queued"}});
    Mock::given(method("PUT"))
        .and(path("/spaces/sp1/environments/staging"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "Staging", "sys": sys})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spaces/sp1/environments/staging"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(EnvironmentResource, context(&server));
    let err = reconciler
        .create(&EnvironmentState {
            space_id: SPACE.into(),
            id: "staging".into(),
            version: None,
            name: "Staging".into(),
            source_environment_id: None,
            status: None,
        })
        .await
        .unwrap_err();
    assert!(
        matches!(err, ContentfulError::NotFound { ref id, .. } if id == "staging"),
        "{err:?}"
    );
}

#[tokio::test]
async fn app_installation_upsert_is_unversioned() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(env_path("app_installations/app1")))
        .and(header("x-contentful-marketplace", "i-accept-end-user-license-agreement"))
        .and(body_json(json!({"parameters": {"a": 1, "b": [true]}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "parameters": {"b": [true], "a": 1},
            "sys": {"type": "AppInstallation"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(AppInstallationResource, context(&server));
    let installed = reconciler
        .create(&AppInstallationState {
            space_id: SPACE.into(),
            environment_id: ENV.into(),
            app_definition_id: "app1".into(),
            parameters: r#"{"b":[true],"a":1}"#.into(),
            accepted_terms: vec!["i-accept-end-user-license-agreement".into()],
        })
        .await
        .unwrap();

    assert_eq!(installed.parameters, r#"{"a":1,"b":[true]}"#);
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-contentful-version").is_none());
}

//! Content types and their field definitions.
//!
//! A content type only takes effect once activated, so every create and
//! update ends with an activation and delete starts with a deactivation.
//! Removing a field takes two rounds: the field is first marked `omitted`
//! and activated, then dropped from the definition.

use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{
    ImportFormat, ImportId, LifecycleStep, Result, Sys, content_to_value, normalize_json,
    value_to_content,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::{Api, environment_path};
use crate::context::ProviderContext;
use crate::lifecycle::{self, sys_of};
use crate::resource::{NEW_ID, Resource, require, require_computed, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldItems {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub validations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub items: Option<FieldItems>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub localized: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub omitted: bool,
    /// Validation rules as JSON text.
    #[serde(default)]
    pub validations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeState {
    pub space_id: String,
    #[serde(default)]
    pub environment_id: String,
    /// Optional caller-chosen id; assigned by the server otherwise.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub display_field: String,
    #[serde(default)]
    pub fields: Vec<ContentTypeField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsWire {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link_type: Option<String>,
    #[serde(default)]
    validations: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldWire {
    id: String,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<ItemsWire>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    localized: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    omitted: bool,
    #[serde(default)]
    validations: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentTypeDraft<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    display_field: &'a str,
    fields: Vec<FieldWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentTypeWire {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    display_field: String,
    #[serde(default)]
    fields: Vec<FieldWire>,
    sys: Sys,
}

impl From<&ContentTypeField> for FieldWire {
    fn from(field: &ContentTypeField) -> Self {
        Self {
            id: field.id.clone(),
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            link_type: field.link_type.clone(),
            items: field.items.as_ref().map(|items| ItemsWire {
                item_type: items.item_type.clone(),
                link_type: items.link_type.clone(),
                validations: items.validations.iter().map(|v| content_to_value(v)).collect(),
            }),
            required: field.required,
            localized: field.localized,
            disabled: field.disabled,
            omitted: field.omitted,
            validations: field.validations.iter().map(|v| content_to_value(v)).collect(),
        }
    }
}

impl From<FieldWire> for ContentTypeField {
    fn from(wire: FieldWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            field_type: wire.field_type,
            link_type: wire.link_type,
            items: wire.items.map(|items| FieldItems {
                item_type: items.item_type,
                link_type: items.link_type,
                validations: items.validations.iter().map(value_to_content).collect(),
            }),
            required: wire.required,
            localized: wire.localized,
            disabled: wire.disabled,
            omitted: wire.omitted,
            validations: wire.validations.iter().map(value_to_content).collect(),
        }
    }
}

impl ContentTypeState {
    fn draft(&self, fields: Vec<FieldWire>) -> Result<Value> {
        Ok(serde_json::to_value(ContentTypeDraft {
            name: &self.name,
            description: self.description.as_deref(),
            display_field: &self.display_field,
            fields,
        })?)
    }

    fn wire_fields(&self) -> Vec<FieldWire> {
        self.fields.iter().map(FieldWire::from).collect()
    }

    /// Fields present in `self` but dropped from `plan`, marked omitted, after
    /// the planned fields.
    fn omission_round(&self, plan: &ContentTypeState) -> Option<Vec<FieldWire>> {
        let removed: Vec<FieldWire> = self
            .fields
            .iter()
            .filter(|old| !plan.fields.iter().any(|f| f.id == old.id))
            .map(|old| FieldWire {
                omitted: true,
                ..FieldWire::from(old)
            })
            .collect();
        if removed.is_empty() {
            return None;
        }
        let mut fields = plan.wire_fields();
        fields.extend(removed);
        Some(fields)
    }

    fn import(wire: ContentTypeWire, prior: &ContentTypeState, environment_id: String) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            environment_id,
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            name: wire.name,
            description: wire.description,
            display_field: wire.display_field,
            fields: wire.fields.into_iter().map(ContentTypeField::from).collect(),
        }
    }

    /// Validation strings in canonical form.
    fn normalized(mut self) -> Self {
        for field in &mut self.fields {
            field.validations = field.validations.iter().map(|v| normalize_json(v)).collect();
            if let Some(items) = field.items.as_mut() {
                items.validations = items.validations.iter().map(|v| normalize_json(v)).collect();
            }
        }
        self
    }
}

fn content_types_path(ctx: &ProviderContext, state: &ContentTypeState) -> Result<(String, String)> {
    let space_id = require("space_id", &state.space_id)?;
    let environment = ctx.environment_or(&state.environment_id);
    Ok((
        format!("{}/content_types", environment_path(space_id, &environment)),
        environment,
    ))
}

/// Writes `body` at `path` with `version` and activates the result.
async fn write_and_activate(
    api: &Api<'_>,
    path: &str,
    id: &str,
    version: u64,
    body: Value,
) -> Result<Value> {
    let request = ApiRequest::put(path).with_version(version).with_body(body);
    let remote: Value = api.send(request, &[StatusCode::OK], id).await?;
    let version = sys_of(&remote)?.version;
    lifecycle::transition(api, path, id, LifecycleStep::Activate, version).await
}

pub struct ContentTypeResource;

#[async_trait]
impl Resource for ContentTypeResource {
    type State = ContentTypeState;

    const TYPE_NAME: &'static str = "contentful_content_type";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["contentTypeId", "spaceId", "environmentId"]);

    fn id(state: &ContentTypeState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &ContentTypeState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> ContentTypeState {
        ContentTypeState {
            space_id: id.get("spaceId").to_string(),
            environment_id: id.get("environmentId").to_string(),
            id: Some(id.get("contentTypeId").to_string()),
            version: None,
            name: String::new(),
            description: None,
            display_field: String::new(),
            fields: Vec::new(),
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &ContentTypeState) -> Result<ContentTypeState> {
        let (base, environment) = content_types_path(ctx, plan)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let body = plan.draft(plan.wire_fields())?;

        let (request, id) = match plan.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => (ApiRequest::put(format!("{base}/{id}")), id),
            None => (ApiRequest::post(&base), NEW_ID),
        };
        let created: Value = api
            .send(request.with_body(body), &[StatusCode::CREATED], id)
            .await?;

        let sys = sys_of(&created)?;
        let path = format!("{base}/{}", sys.id);
        let remote =
            lifecycle::transition(&api, &path, &sys.id, LifecycleStep::Activate, sys.version).await?;
        Ok(ContentTypeState::import(serde_json::from_value(remote)?, plan, environment).normalized())
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &ContentTypeState,
    ) -> Result<Option<ContentTypeState>> {
        let id = require_computed("id", &current.id)?;
        let (base, environment) = content_types_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<ContentTypeWire> = api.fetch(&format!("{base}/{id}"), id).await?;
        Ok(wire.map(|w| ContentTypeState::import(w, current, environment).normalized()))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &ContentTypeState,
        current: &ContentTypeState,
    ) -> Result<ContentTypeState> {
        let id = require_computed("id", &current.id)?;
        let (base, environment) = content_types_path(ctx, current)?;
        let path = format!("{base}/{id}");
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut version = require_version(current.version)?;

        if let Some(fields) = current.omission_round(plan) {
            info!(id, "omitting removed fields before dropping them");
            let remote = write_and_activate(&api, &path, id, version, plan.draft(fields)?).await?;
            version = sys_of(&remote)?.version;
        }
        let remote = write_and_activate(&api, &path, id, version, plan.draft(plan.wire_fields())?).await?;

        Ok(ContentTypeState::import(serde_json::from_value(remote)?, plan, environment).normalized())
    }

    async fn delete(&self, ctx: &ProviderContext, current: &ContentTypeState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let (base, _) = content_types_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        lifecycle::retire(&api, &format!("{base}/{id}"), id, LifecycleStep::Deactivate).await
    }
}

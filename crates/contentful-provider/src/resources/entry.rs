//! Entries: localized field content plus the publish/archive flags.

use std::collections::BTreeMap;

use async_trait::async_trait;
use contentful_client::{ApiRequest, CONTENT_TYPE_HEADER, StatusCode};
use contentful_core::{
    ImportFormat, ImportId, LifecycleStep, Result, Sys, content_to_value, normalize_json,
    value_to_content,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::{Api, environment_path};
use crate::context::ProviderContext;
use crate::lifecycle::{self, LifecycleFlags};
use crate::resource::{Resource, require, require_version};

/// One localized value. `content` is plain text or JSON; JSON is kept in
/// canonical form so successive reads compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryField {
    pub id: String,
    pub locale: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryState {
    pub space_id: String,
    #[serde(default)]
    pub environment_id: String,
    pub entry_id: String,
    #[serde(default)]
    pub contenttype_id: String,
    #[serde(default)]
    pub fields: Vec<EntryField>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EntryWire {
    #[serde(default)]
    fields: BTreeMap<String, BTreeMap<String, Value>>,
    sys: Sys,
}

impl EntryState {
    fn flags(&self) -> LifecycleFlags {
        LifecycleFlags::new(self.published, self.archived)
    }

    fn draft(&self) -> Value {
        let mut fields = Map::new();
        for field in &self.fields {
            let localized = fields
                .entry(field.id.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(localized) = localized {
                localized.insert(field.locale.clone(), content_to_value(&field.content));
            }
        }
        serde_json::json!({ "fields": fields })
    }

    /// Field list with every JSON value in canonical form.
    fn normalized_fields(&self) -> Vec<EntryField> {
        self.fields
            .iter()
            .map(|f| EntryField {
                id: f.id.clone(),
                locale: f.locale.clone(),
                content: normalize_json(&f.content),
            })
            .collect()
    }

    /// True when the remote draft already holds the planned content.
    fn same_content(&self, other: &EntryState) -> bool {
        let mut ours = self.normalized_fields();
        let mut theirs = other.normalized_fields();
        ours.sort_by(|a, b| (&a.id, &a.locale).cmp(&(&b.id, &b.locale)));
        theirs.sort_by(|a, b| (&a.id, &a.locale).cmp(&(&b.id, &b.locale)));
        ours == theirs
    }

    fn import(wire: EntryWire, prior: &EntryState, environment_id: String) -> Self {
        let mut fields: Vec<EntryField> = wire
            .fields
            .into_iter()
            .flat_map(|(id, localized)| {
                localized.into_iter().map(move |(locale, value)| EntryField {
                    id: id.clone(),
                    locale,
                    content: value_to_content(&value),
                })
            })
            .collect();
        // Keep the caller's field order; unknown fields go last.
        let position = |f: &EntryField| {
            prior
                .fields
                .iter()
                .position(|p| p.id == f.id && p.locale == f.locale)
                .unwrap_or(usize::MAX)
        };
        fields.sort_by_key(position);

        Self {
            space_id: prior.space_id.clone(),
            environment_id,
            entry_id: wire.sys.id.clone(),
            contenttype_id: wire
                .sys
                .content_type
                .as_ref()
                .map(|link| link.id().to_string())
                .unwrap_or_else(|| prior.contenttype_id.clone()),
            fields,
            published: wire.sys.is_published(),
            archived: wire.sys.is_archived(),
            version: Some(wire.sys.version),
        }
    }
}

fn entry_path(ctx: &ProviderContext, state: &EntryState) -> Result<(String, String)> {
    let space_id = require("space_id", &state.space_id)?;
    let entry_id = require("entry_id", &state.entry_id)?;
    let environment = ctx.environment_or(&state.environment_id);
    Ok((
        format!("{}/entries/{entry_id}", environment_path(space_id, &environment)),
        environment,
    ))
}

pub struct EntryResource;

#[async_trait]
impl Resource for EntryResource {
    type State = EntryState;

    const TYPE_NAME: &'static str = "contentful_entry";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["entryId", "spaceId", "environmentId"]);

    fn id(state: &EntryState) -> Option<&str> {
        Some(state.entry_id.as_str())
    }

    fn version(state: &EntryState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> EntryState {
        EntryState {
            space_id: id.get("spaceId").to_string(),
            environment_id: id.get("environmentId").to_string(),
            entry_id: id.get("entryId").to_string(),
            contenttype_id: String::new(),
            fields: Vec::new(),
            published: false,
            archived: false,
            version: None,
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &EntryState) -> Result<EntryState> {
        let (path, environment) = entry_path(ctx, plan)?;
        let content_type = require("contenttype_id", &plan.contenttype_id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);

        let request = ApiRequest::put(&path)
            .with_header(CONTENT_TYPE_HEADER, content_type)
            .with_body(plan.draft());
        let remote: Value = api.send(request, &[StatusCode::CREATED], &plan.entry_id).await?;
        let remote = lifecycle::reconcile(&api, &path, &plan.entry_id, plan.flags(), remote).await?;

        Ok(EntryState::import(serde_json::from_value(remote)?, plan, environment))
    }

    async fn read(&self, ctx: &ProviderContext, current: &EntryState) -> Result<Option<EntryState>> {
        let (path, environment) = entry_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<EntryWire> = api.fetch(&path, &current.entry_id).await?;
        Ok(wire.map(|w| EntryState::import(w, current, environment)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &EntryState,
        current: &EntryState,
    ) -> Result<EntryState> {
        let (path, environment) = entry_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let version = require_version(current.version)?;

        let remote: Value = if !plan.same_content(current) {
            let request = ApiRequest::put(&path).with_version(version).with_body(plan.draft());
            api.send(request, &[StatusCode::OK], &current.entry_id).await?
        } else {
            lifecycle::refresh_at_version(&api, &path, &current.entry_id, version).await?
        };
        let remote = lifecycle::reconcile(&api, &path, &current.entry_id, plan.flags(), remote).await?;

        Ok(EntryState::import(serde_json::from_value(remote)?, plan, environment))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &EntryState) -> Result<()> {
        let (path, _) = entry_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        lifecycle::retire(&api, &path, &current.entry_id, LifecycleStep::Unpublish).await
    }
}

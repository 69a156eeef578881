//! Assets: localized file metadata, server-side processing and the
//! publish/archive flags.
//!
//! A file declared with an `upload` URL and no `url` is unprocessed. After the
//! asset is written, each such locale is processed in turn and polled until
//! the server reports a `url` for it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{Backoff, ContentfulError, ImportFormat, ImportId, LifecycleStep, Result, Sys};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::{Api, environment_path};
use crate::context::ProviderContext;
use crate::lifecycle::{self, LifecycleFlags, sys_of};
use crate::polling::{PollStatus, poll_until};
use crate::resource::{Resource, require, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
    pub file_name: String,
    pub content_type: String,
    /// Source URL for processing. The server drops it once processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<String>,
    /// Set by the server after processing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl AssetFile {
    fn needs_processing(&self) -> bool {
        self.url.is_none() && self.upload.as_deref().is_some_and(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetState {
    pub space_id: String,
    #[serde(default)]
    pub environment_id: String,
    pub asset_id: String,
    /// Locale code to title.
    #[serde(default)]
    pub title: BTreeMap<String, String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
    /// Locale code to file.
    #[serde(default)]
    pub file: BTreeMap<String, AssetFile>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AssetFields {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    title: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    description: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    file: BTreeMap<String, AssetFile>,
}

#[derive(Debug, Serialize)]
struct AssetDraft {
    fields: AssetFields,
}

#[derive(Debug, Deserialize)]
struct AssetWire {
    #[serde(default)]
    fields: AssetFields,
    sys: Sys,
}

impl AssetState {
    fn flags(&self) -> LifecycleFlags {
        LifecycleFlags::new(self.published, self.archived)
    }

    fn draft(&self) -> Result<Value> {
        let draft = AssetDraft {
            fields: AssetFields {
                title: self.title.clone(),
                description: self.description.clone(),
                file: self.file.clone(),
            },
        };
        Ok(serde_json::to_value(draft)?)
    }

    /// Locales whose file still has to be processed.
    fn pending_locales(&self) -> Vec<String> {
        self.file
            .iter()
            .filter(|(_, file)| file.needs_processing())
            .map(|(locale, _)| locale.clone())
            .collect()
    }

    /// True when the user-controlled fields already match `other`.
    fn same_content(&self, other: &AssetState) -> bool {
        let strip = |files: &BTreeMap<String, AssetFile>| -> BTreeMap<String, (String, String, Option<String>)> {
            files
                .iter()
                .map(|(locale, f)| {
                    (
                        locale.clone(),
                        (f.file_name.clone(), f.content_type.clone(), f.upload.clone()),
                    )
                })
                .collect()
        };
        self.title == other.title
            && self.description == other.description
            && strip(&self.file) == strip(&other.file)
    }

    fn import(wire: AssetWire, prior: &AssetState, environment_id: String) -> Self {
        let file = wire
            .fields
            .file
            .into_iter()
            .map(|(locale, mut file)| {
                if file.upload.is_none() {
                    file.upload = prior.file.get(&locale).and_then(|f| f.upload.clone());
                }
                (locale, file)
            })
            .collect();

        Self {
            space_id: prior.space_id.clone(),
            environment_id,
            asset_id: wire.sys.id.clone(),
            title: wire.fields.title,
            description: wire.fields.description,
            file,
            published: wire.sys.is_published(),
            archived: wire.sys.is_archived(),
            version: Some(wire.sys.version),
        }
    }
}

fn asset_path(ctx: &ProviderContext, state: &AssetState) -> Result<(String, String)> {
    let space_id = require("space_id", &state.space_id)?;
    let asset_id = require("asset_id", &state.asset_id)?;
    let environment = ctx.environment_or(&state.environment_id);
    Ok((
        format!("{}/assets/{asset_id}", environment_path(space_id, &environment)),
        environment,
    ))
}

/// Reports whether the file for `locale` finished processing.
fn processing_status(remote: Value, locale: &str) -> PollStatus<Value> {
    let file = remote.pointer(&format!("/fields/file/{locale}")).cloned();
    let file = file.and_then(|f| serde_json::from_value::<AssetFile>(f).ok());
    match file {
        Some(AssetFile { url: Some(_), .. }) => PollStatus::Ready(remote),
        Some(AssetFile { upload: Some(_), .. }) => PollStatus::Pending,
        _ => PollStatus::Failed(format!(
            "file for locale {locale} has neither a url nor a pending upload"
        )),
    }
}

/// An asset deleted while processing is reported as gone rather than polled
/// until the attempts run out.
async fn check_processing(api: &Api<'_>, path: &str, id: &str, locale: &str) -> Result<PollStatus<Value>> {
    match api.fetch::<Value>(path, id).await? {
        Some(remote) => Ok(processing_status(remote, locale)),
        None => Err(ContentfulError::not_found(api.resource_type(), id)),
    }
}

/// Processes `locales` one after another, each with the version observed
/// after the previous one finished, and returns the final representation.
async fn process_files(
    api: &Api<'_>,
    path: &str,
    id: &str,
    locales: &[String],
    mut remote: Value,
    backoff: Backoff,
) -> Result<Value> {
    for locale in locales {
        let version = sys_of(&remote)?.version;
        let request = ApiRequest::put(format!("{path}/files/{locale}/process")).with_version(version);
        let _: Value = api.send(request, &[StatusCode::NO_CONTENT], id).await?;
        info!(id, locale = locale.as_str(), version, "asset processing started");

        let locale = locale.as_str();
        remote = poll_until(backoff, AssetResource::TYPE_NAME, id, move || {
            check_processing(api, path, id, locale)
        })
        .await?;
    }
    Ok(remote)
}

pub struct AssetResource;

#[async_trait]
impl Resource for AssetResource {
    type State = AssetState;

    const TYPE_NAME: &'static str = "contentful_asset";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["assetId", "spaceId", "environmentId"]);

    fn id(state: &AssetState) -> Option<&str> {
        Some(state.asset_id.as_str())
    }

    fn version(state: &AssetState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> AssetState {
        AssetState {
            space_id: id.get("spaceId").to_string(),
            environment_id: id.get("environmentId").to_string(),
            asset_id: id.get("assetId").to_string(),
            title: BTreeMap::new(),
            description: BTreeMap::new(),
            file: BTreeMap::new(),
            published: false,
            archived: false,
            version: None,
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &AssetState) -> Result<AssetState> {
        let (path, environment) = asset_path(ctx, plan)?;
        let id = plan.asset_id.as_str();
        let api = Api::new(ctx, Self::TYPE_NAME);

        let request = ApiRequest::put(&path).with_body(plan.draft()?);
        let remote: Value = api.send(request, &[StatusCode::CREATED], id).await?;
        let backoff = ctx.config().asset_processing.backoff();
        let remote = process_files(&api, &path, id, &plan.pending_locales(), remote, backoff).await?;
        let remote = lifecycle::reconcile(&api, &path, id, plan.flags(), remote).await?;

        Ok(AssetState::import(serde_json::from_value(remote)?, plan, environment))
    }

    async fn read(&self, ctx: &ProviderContext, current: &AssetState) -> Result<Option<AssetState>> {
        let (path, environment) = asset_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<AssetWire> = api.fetch(&path, &current.asset_id).await?;
        Ok(wire.map(|w| AssetState::import(w, current, environment)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &AssetState,
        current: &AssetState,
    ) -> Result<AssetState> {
        let (path, environment) = asset_path(ctx, current)?;
        let id = current.asset_id.as_str();
        let api = Api::new(ctx, Self::TYPE_NAME);
        let version = require_version(current.version)?;

        let remote = if !plan.same_content(current) {
            // Files whose upload changed must be processed again.
            let mut draft = plan.clone();
            for (locale, file) in draft.file.iter_mut() {
                let unchanged = current
                    .file
                    .get(locale)
                    .is_some_and(|old| old.upload == file.upload && old.url.is_some());
                file.url = if unchanged {
                    current.file.get(locale).and_then(|old| old.url.clone())
                } else {
                    None
                };
            }
            let request = ApiRequest::put(&path).with_version(version).with_body(draft.draft()?);
            let remote: Value = api.send(request, &[StatusCode::OK], id).await?;
            let backoff = ctx.config().asset_processing.backoff();
            process_files(&api, &path, id, &draft.pending_locales(), remote, backoff).await?
        } else {
            lifecycle::refresh_at_version(&api, &path, id, version).await?
        };
        let remote = lifecycle::reconcile(&api, &path, id, plan.flags(), remote).await?;

        Ok(AssetState::import(serde_json::from_value(remote)?, plan, environment))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &AssetState) -> Result<()> {
        let (path, _) = asset_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        lifecycle::retire(&api, &path, &current.asset_id, LifecycleStep::Unpublish).await
    }
}

//! Taxonomy concepts. They live at organization level; the space and
//! environment from the import id are only kept for addressing in state.
//! Updates are sent as an RFC 6902 patch between the observed and the
//! planned representation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use contentful_client::{ApiRequest, JSON_PATCH_CONTENT_TYPE, StatusCode};
use contentful_core::{ImportFormat, ImportId, Link, Result, Sys};
use json_patch::Patch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::{Api, organization_path};
use crate::context::ProviderContext;
use crate::lifecycle;
use crate::resource::{NEW_ID, Resource, require_computed, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConceptState {
    #[serde(default)]
    pub space_id: String,
    #[serde(default)]
    pub environment_id: String,
    /// Optional caller-chosen id; assigned by the server otherwise.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub uri: Option<String>,
    /// Locale code to preferred label.
    pub pref_label: BTreeMap<String, String>,
    #[serde(default)]
    pub alt_labels: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub hidden_labels: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub definition: BTreeMap<String, String>,
    #[serde(default)]
    pub notations: Vec<String>,
    /// Ids of broader concepts.
    #[serde(default)]
    pub broader: Vec<String>,
    /// Ids of related concepts.
    #[serde(default)]
    pub related: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConceptBody {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    pref_label: BTreeMap<String, String>,
    #[serde(default)]
    alt_labels: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    hidden_labels: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    definition: BTreeMap<String, String>,
    #[serde(default)]
    notations: Vec<String>,
    #[serde(default)]
    broader: Vec<Link>,
    #[serde(default)]
    related: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct ConceptWire {
    #[serde(flatten)]
    body: ConceptBody,
    sys: Sys,
}

fn concept_links(ids: &[String]) -> Vec<Link> {
    ids.iter().map(|id| Link::new("TaxonomyConcept", id.clone())).collect()
}

fn link_ids(links: Vec<Link>) -> Vec<String> {
    links.into_iter().map(|link| link.sys.id).collect()
}

impl TaxonomyConceptState {
    fn draft(&self) -> Result<Value> {
        let body = ConceptBody {
            uri: self.uri.clone(),
            pref_label: self.pref_label.clone(),
            alt_labels: self.alt_labels.clone(),
            hidden_labels: self.hidden_labels.clone(),
            definition: self.definition.clone(),
            notations: self.notations.clone(),
            broader: concept_links(&self.broader),
            related: concept_links(&self.related),
        };
        Ok(serde_json::to_value(body)?)
    }

    /// The patch turning `current` into `self`.
    fn patch_from(&self, current: &TaxonomyConceptState) -> Result<Patch> {
        Ok(json_patch::diff(&current.draft()?, &self.draft()?))
    }

    fn import(wire: ConceptWire, prior: &TaxonomyConceptState) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            environment_id: prior.environment_id.clone(),
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            uri: wire.body.uri,
            pref_label: wire.body.pref_label,
            alt_labels: wire.body.alt_labels,
            hidden_labels: wire.body.hidden_labels,
            definition: wire.body.definition,
            notations: wire.body.notations,
            broader: link_ids(wire.body.broader),
            related: link_ids(wire.body.related),
        }
    }
}

fn concepts_path(ctx: &ProviderContext) -> Result<String> {
    Ok(format!(
        "{}/taxonomy/concepts",
        organization_path(ctx.organization_id()?)
    ))
}

pub struct TaxonomyConceptResource;

#[async_trait]
impl Resource for TaxonomyConceptResource {
    type State = TaxonomyConceptState;

    const TYPE_NAME: &'static str = "contentful_taxonomy_concept";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["spaceId", "environmentId", "conceptId"]);

    fn id(state: &TaxonomyConceptState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &TaxonomyConceptState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> TaxonomyConceptState {
        TaxonomyConceptState {
            space_id: id.get("spaceId").to_string(),
            environment_id: id.get("environmentId").to_string(),
            id: Some(id.get("conceptId").to_string()),
            version: None,
            uri: None,
            pref_label: BTreeMap::new(),
            alt_labels: BTreeMap::new(),
            hidden_labels: BTreeMap::new(),
            definition: BTreeMap::new(),
            notations: Vec::new(),
            broader: Vec::new(),
            related: Vec::new(),
        }
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        plan: &TaxonomyConceptState,
    ) -> Result<TaxonomyConceptState> {
        let base = concepts_path(ctx)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let (request, id) = match plan.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => (ApiRequest::put(format!("{base}/{id}")), id),
            None => (ApiRequest::post(&base), NEW_ID),
        };
        let wire: ConceptWire = api
            .send(request.with_body(plan.draft()?), &[StatusCode::CREATED], id)
            .await?;
        Ok(TaxonomyConceptState::import(wire, plan))
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &TaxonomyConceptState,
    ) -> Result<Option<TaxonomyConceptState>> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<ConceptWire> = api.fetch(&format!("{}/{id}", concepts_path(ctx)?), id).await?;
        Ok(wire.map(|w| TaxonomyConceptState::import(w, current)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &TaxonomyConceptState,
        current: &TaxonomyConceptState,
    ) -> Result<TaxonomyConceptState> {
        let id = require_computed("id", &current.id)?;
        let path = format!("{}/{id}", concepts_path(ctx)?);
        let api = Api::new(ctx, Self::TYPE_NAME);
        let version = require_version(current.version)?;

        let patch = plan.patch_from(current)?;
        if patch.0.is_empty() {
            debug!(id, "concept unchanged, nothing to patch");
            let remote = lifecycle::refresh_at_version(&api, &path, id, version).await?;
            return Ok(TaxonomyConceptState::import(serde_json::from_value(remote)?, plan));
        }

        let request = ApiRequest::patch(path)
            .with_version(version)
            .with_content_type(JSON_PATCH_CONTENT_TYPE)
            .with_body(serde_json::to_value(&patch)?);
        let wire: ConceptWire = api.send(request, &[StatusCode::OK], id).await?;
        Ok(TaxonomyConceptState::import(wire, plan))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &TaxonomyConceptState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::delete(format!("{}/{id}", concepts_path(ctx)?));
        if let Some(version) = current.version {
            request = request.with_version(version);
        }
        api.remove(request, id).await
    }
}

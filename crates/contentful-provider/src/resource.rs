//! The per-resource hook set driven by the [`Reconciler`](crate::Reconciler).

use std::fmt::Debug;

use async_trait::async_trait;
use contentful_core::{ContentfulError, ImportFormat, ImportId, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::ProviderContext;

/// One manageable Contentful entity.
///
/// `State` serves as both desired state (plan) and observed state: computed
/// attributes such as `version` are empty in a plan and filled in from the
/// server. Implementations translate state into drafts, issue the calls, and
/// import responses back; the reconciler adds import parsing, absence
/// handling and version checks on top.
///
/// # Contract
///
/// - `read` returns `Ok(None)` when the object no longer exists.
/// - `update` sends the version of `current`; a stale version surfaces as
///   [`ContentfulError::Conflict`] and is never retried with a fresh one.
/// - `delete` may return `NotFound`; the reconciler treats it as success.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type State: Clone + Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Type name used by the orchestrator, e.g. `contentful_entry`.
    const TYPE_NAME: &'static str;

    /// Segments of the colon-delimited import id.
    const IMPORT_FORMAT: ImportFormat;

    /// Remote id, once known.
    fn id(state: &Self::State) -> Option<&str>;

    /// Last observed version; `None` for unversioned resources.
    fn version(state: &Self::State) -> Option<u64>;

    /// Skeleton state carrying only the addressing keys of a parsed import id.
    fn state_from_import(id: &ImportId) -> Self::State;

    async fn create(&self, ctx: &ProviderContext, plan: &Self::State) -> Result<Self::State>;

    async fn read(&self, ctx: &ProviderContext, current: &Self::State)
    -> Result<Option<Self::State>>;

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &Self::State,
        current: &Self::State,
    ) -> Result<Self::State>;

    async fn delete(&self, ctx: &ProviderContext, current: &Self::State) -> Result<()>;
}

/// Stands in for the id in errors from a create whose id the server assigns.
pub(crate) const NEW_ID: &str = "new";

/// Returns `value` or an `InvalidValue` error naming `field` when it is blank.
pub(crate) fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(ContentfulError::invalid_value(field, "must be set"));
    }
    Ok(value)
}

/// Like [`require`] for computed attributes that are only known after create.
pub(crate) fn require_computed<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ContentfulError::invalid_value(
            field,
            "is unknown; the resource has not been created yet",
        )),
    }
}

/// The version an update or delete must carry.
pub(crate) fn require_version(version: Option<u64>) -> Result<u64> {
    version.ok_or_else(|| {
        ContentfulError::invalid_value("version", "is unknown; read the resource before changing it")
    })
}

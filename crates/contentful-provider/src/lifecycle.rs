//! Publish/archive state transitions.
//!
//! Entries and assets carry two independent flags. After a create or update
//! the flags are driven to their desired values with at most one call per
//! flag, publish side first, archive side second. Every call carries the
//! version returned by the call before it. A failing step stops the sequence
//! and is reported as [`ContentfulError::Lifecycle`]; steps that already went
//! through are not rolled back.
//!
//! Content types use the single activate/deactivate pair on the same
//! `/published` endpoint.

use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{ContentfulError, LifecycleStep, Result, Sys};
use serde_json::Value;
use tracing::info;

use crate::api::Api;

/// Desired or observed publish/archive flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleFlags {
    pub published: bool,
    pub archived: bool,
}

impl LifecycleFlags {
    pub fn new(published: bool, archived: bool) -> Self {
        Self {
            published,
            archived,
        }
    }

    pub fn observed(sys: &Sys) -> Self {
        Self {
            published: sys.is_published(),
            archived: sys.is_archived(),
        }
    }
}

/// Reads the `sys` block of a remote object.
pub(crate) fn sys_of(remote: &Value) -> Result<Sys> {
    let sys = remote
        .get("sys")
        .cloned()
        .ok_or_else(|| ContentfulError::invalid_value("sys", "response has no sys block"))?;
    Ok(serde_json::from_value(sys)?)
}

/// Drives `remote` (the object at `item_path`) to `desired` and returns the
/// last remote representation. A flag that already matches costs no call.
pub(crate) async fn reconcile(
    api: &Api<'_>,
    item_path: &str,
    id: &str,
    desired: LifecycleFlags,
    remote: Value,
) -> Result<Value> {
    let mut remote = remote;
    let mut sys = sys_of(&remote)?;

    let observed = LifecycleFlags::observed(&sys);
    let publish_step = match (desired.published, observed.published) {
        (true, false) => Some(LifecycleStep::Publish),
        (false, true) => Some(LifecycleStep::Unpublish),
        _ => None,
    };
    if let Some(step) = publish_step {
        remote = transition(api, item_path, id, step, sys.version).await?;
        sys = sys_of(&remote)?;
    }

    if desired.archived != sys.is_archived() {
        let step = if desired.archived {
            LifecycleStep::Archive
        } else {
            LifecycleStep::Unarchive
        };
        remote = transition(api, item_path, id, step, sys.version).await?;
    }

    Ok(remote)
}

/// Issues one transition call with `version` and returns the response body.
pub(crate) async fn transition(
    api: &Api<'_>,
    item_path: &str,
    id: &str,
    step: LifecycleStep,
    version: u64,
) -> Result<Value> {
    let request = match step {
        LifecycleStep::Publish | LifecycleStep::Activate => {
            ApiRequest::put(format!("{item_path}/published"))
        }
        LifecycleStep::Unpublish | LifecycleStep::Deactivate => {
            ApiRequest::delete(format!("{item_path}/published"))
        }
        LifecycleStep::Archive => ApiRequest::put(format!("{item_path}/archived")),
        LifecycleStep::Unarchive => ApiRequest::delete(format!("{item_path}/archived")),
    }
    .with_version(version);

    let remote: Value = api
        .send(request, &[StatusCode::OK], id)
        .await
        .map_err(|e| ContentfulError::lifecycle(step, e))?;
    info!(id, %step, from_version = version, "lifecycle transition applied");
    Ok(remote)
}

/// Fetches the remote object when only the lifecycle flags change. The remote
/// version must still be the one we last saw.
pub(crate) async fn refresh_at_version(api: &Api<'_>, path: &str, id: &str, version: u64) -> Result<Value> {
    let remote = api
        .fetch::<Value>(path, id)
        .await?
        .ok_or_else(|| ContentfulError::not_found(api.resource_type(), id))?;
    if sys_of(&remote)?.version != version {
        return Err(ContentfulError::conflict(api.resource_type(), id, version));
    }
    Ok(remote)
}

/// Deletes the object at `item_path` using its latest version. A live object
/// is first taken down with `take_down` (unpublish or deactivate). An object
/// that is already gone counts as deleted.
pub(crate) async fn retire(
    api: &Api<'_>,
    item_path: &str,
    id: &str,
    take_down: LifecycleStep,
) -> Result<()> {
    let Some(remote) = api.fetch::<Value>(item_path, id).await? else {
        return Ok(());
    };
    let mut sys = sys_of(&remote)?;
    if sys.is_published() {
        let remote = transition(api, item_path, id, take_down, sys.version).await?;
        sys = sys_of(&remote)?;
    }
    api.remove(ApiRequest::delete(item_path).with_version(sys.version), id)
        .await
}

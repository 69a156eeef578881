//! Generic reconciliation engine.
//!
//! [`Reconciler`] exposes the five operations every resource supports and
//! applies the rules shared by all of them:
//!
//! - `read` turns a vanished object into `Ok(None)`,
//! - `delete` treats an object that is already gone as deleted,
//! - `import` parses the resource's id format before any remote call,
//! - `update` checks that the server moved the version forward.

use contentful_core::{ContentfulError, Result};
use tracing::{Instrument, info, info_span, warn};

use crate::context::ProviderContext;
use crate::resource::Resource;

pub struct Reconciler<R: Resource> {
    resource: R,
    ctx: ProviderContext,
}

impl<R: Resource> Reconciler<R> {
    pub fn new(resource: R, ctx: ProviderContext) -> Self {
        Self { resource, ctx }
    }

    pub fn context(&self) -> &ProviderContext {
        &self.ctx
    }

    pub async fn create(&self, desired: &R::State) -> Result<R::State> {
        let span = info_span!("create", resource_type = R::TYPE_NAME);
        async {
            let observed = self.resource.create(&self.ctx, desired).await?;
            let id = R::id(&observed)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ContentfulError::invalid_value("id", "server did not return an id"))?;
            info!(id, version = ?R::version(&observed), "created");
            Ok(observed)
        }
        .instrument(span)
        .await
    }

    pub async fn read(&self, current: &R::State) -> Result<Option<R::State>> {
        let span = info_span!("read", resource_type = R::TYPE_NAME, id = ?R::id(current));
        async {
            match self.resource.read(&self.ctx, current).await {
                Ok(Some(observed)) => {
                    if let (Some(before), Some(after)) = (R::version(current), R::version(&observed))
                        && after != before
                    {
                        info!(before, after, "remote object changed outside of this provider");
                    }
                    Ok(Some(observed))
                }
                Ok(None) => {
                    info!("remote object no longer exists, dropping it from state");
                    Ok(None)
                }
                Err(err) if err.is_not_found() => {
                    info!("remote object no longer exists, dropping it from state");
                    Ok(None)
                }
                Err(err) => Err(err),
            }
        }
        .instrument(span)
        .await
    }

    pub async fn update(&self, desired: &R::State, current: &R::State) -> Result<R::State> {
        let span = info_span!("update", resource_type = R::TYPE_NAME, id = ?R::id(current));
        async {
            let before = R::version(current);
            let observed = self.resource.update(&self.ctx, desired, current).await?;
            let after = R::version(&observed);
            if let (Some(before), Some(after)) = (before, after)
                && after < before
            {
                warn!(before, after, "server reported a lower version after an update");
            }
            info!(version = ?after, "updated");
            Ok(observed)
        }
        .instrument(span)
        .await
    }

    pub async fn delete(&self, current: &R::State) -> Result<()> {
        let span = info_span!("delete", resource_type = R::TYPE_NAME, id = ?R::id(current));
        async {
            match self.resource.delete(&self.ctx, current).await {
                Ok(()) => {
                    info!("deleted");
                    Ok(())
                }
                Err(err) if err.is_not_found() => {
                    info!("already deleted");
                    Ok(())
                }
                Err(err) => Err(err),
            }
        }
        .instrument(span)
        .await
    }

    /// Parses `raw` with the resource's import format and reads the object.
    pub async fn import(&self, raw: &str) -> Result<Option<R::State>> {
        let id = R::IMPORT_FORMAT.parse(raw)?;
        let skeleton = R::state_from_import(&id);
        info!(resource_type = R::TYPE_NAME, import_id = raw, "importing");
        self.read(&skeleton).await
    }
}

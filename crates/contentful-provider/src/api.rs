//! Status handling shared by every resource.
//!
//! Resources build [`ApiRequest`]s; this module decides what each response
//! means: the expected status yields the decoded body, 404 on reads and deletes
//! means absence, 409 is a version conflict and anything else is an
//! unexpected status carrying both codes.

use contentful_client::{ApiRequest, ApiResponse, StatusCode, Transport};
use contentful_core::{ContentfulError, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::context::ProviderContext;

pub(crate) struct Api<'a> {
    transport: &'a dyn Transport,
    resource_type: &'static str,
}

impl<'a> Api<'a> {
    pub(crate) fn new(ctx: &'a ProviderContext, resource_type: &'static str) -> Self {
        Self {
            transport: ctx.transport(),
            resource_type,
        }
    }

    pub(crate) fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    /// GET `path`. `Ok(None)` when the object does not exist.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<Option<T>> {
        let request = ApiRequest::get(path);
        let operation = request.describe();
        let response = self.transport.execute(request).await?;

        if response.is_not_found() {
            debug!(resource_type = self.resource_type, id, "remote object is gone");
            return Ok(None);
        }
        if response.status != StatusCode::OK {
            return Err(unexpected(&operation, &[StatusCode::OK], &response));
        }
        Ok(Some(serde_json::from_value(response.body)?))
    }

    /// Sends a mutating request and decodes the body of an expected response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        expected: &[StatusCode],
        id: &str,
    ) -> Result<T> {
        let operation = request.describe();
        let version = request.version;
        let response = self.transport.execute(request).await?;

        if expected.contains(&response.status) {
            return Ok(serde_json::from_value(response.body)?);
        }
        if response.is_conflict() {
            return Err(ContentfulError::conflict(
                self.resource_type,
                id,
                version.unwrap_or_default(),
            ));
        }
        if response.is_not_found() {
            return Err(ContentfulError::not_found(self.resource_type, id));
        }
        Err(unexpected(&operation, expected, &response))
    }

    /// Sends a delete. 200, 204 and 404 all mean the object is gone.
    pub(crate) async fn remove(&self, request: ApiRequest, id: &str) -> Result<()> {
        let operation = request.describe();
        let version = request.version;
        let response = self.transport.execute(request).await?;

        match response.status {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(resource_type = self.resource_type, id, "already deleted");
                Ok(())
            }
            StatusCode::CONFLICT => Err(ContentfulError::conflict(
                self.resource_type,
                id,
                version.unwrap_or_default(),
            )),
            _ => Err(unexpected(
                &operation,
                &[StatusCode::NO_CONTENT, StatusCode::OK],
                &response,
            )),
        }
    }
}

fn unexpected(operation: &str, expected: &[StatusCode], response: &ApiResponse) -> ContentfulError {
    let expected: Vec<u16> = expected.iter().map(StatusCode::as_u16).collect();
    ContentfulError::unexpected_status(
        operation,
        &expected,
        response.status.as_u16(),
        response.error_message(),
    )
}

pub(crate) fn space_path(space_id: &str) -> String {
    format!("/spaces/{space_id}")
}

pub(crate) fn environment_path(space_id: &str, environment_id: &str) -> String {
    format!("/spaces/{space_id}/environments/{environment_id}")
}

pub(crate) fn organization_path(organization_id: &str) -> String {
    format!("/organizations/{organization_id}")
}

//! # contentful-provider
//!
//! Reconcilers mapping declarative resource state onto the Contentful Content
//! Management API.
//!
//! Each entity type implements [`Resource`]; [`Reconciler`] wraps it and
//! exposes the five operations an orchestrator drives: create, read, update,
//! delete and import. [`ContentfulProvider`] registers all of them by type
//! name over JSON state.
//!
//! ## Example
//!
//! ```ignore
//! use contentful_config::ProviderConfig;
//! use contentful_provider::{ContentfulProvider, ProviderContext};
//!
//! let ctx = ProviderContext::from_config(ProviderConfig::new(token))?;
//! let provider = ContentfulProvider::new(ctx);
//! let state = provider.resource("contentful_locale")?.import("de:master:sp1").await?;
//! ```
//!
//! ## Concurrency
//!
//! Every operation is one sequential chain of calls. The only consistency
//! mechanism is the object version: mutating calls carry the last observed
//! version and a stale one fails with [`ContentfulError::Conflict`].

mod api;
pub mod context;
pub mod engine;
pub mod lifecycle;
pub mod observability;
pub mod polling;
pub mod provider;
pub mod resource;
pub mod resources;

pub use context::ProviderContext;
pub use contentful_core::{ContentfulError, Result};
pub use engine::Reconciler;
pub use lifecycle::LifecycleFlags;
pub use polling::PollStatus;
pub use provider::{ContentfulProvider, DynResource};
pub use resource::Resource;

pub mod backoff;
pub mod error;
pub mod import_id;
pub mod normalize;
pub mod sys;

pub use backoff::Backoff;
pub use error::{ContentfulError, ErrorCategory, LifecycleStep, Result};
pub use import_id::{ImportFormat, ImportId};
pub use normalize::{content_to_value, normalize_json, sort_keys, to_canonical_string, value_to_content};
pub use sys::{Link, LinkSys, Sys};

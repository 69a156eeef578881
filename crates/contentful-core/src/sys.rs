use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The `sys` block every Content Management API object carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u64>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_version: Option<u64>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub archived_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Link>,
}

impl Sys {
    /// Published state is signalled by the presence of `publishedAt`.
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Archived state is signalled by the presence of `archivedAt`.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn space_id(&self) -> Option<&str> {
        self.space.as_ref().map(Link::id)
    }

    pub fn environment_id(&self) -> Option<&str> {
        self.environment.as_ref().map(Link::id)
    }

    pub fn status_id(&self) -> Option<&str> {
        self.status.as_ref().map(Link::id)
    }
}

/// A `{"sys": {"type": "Link", "linkType": ..., "id": ...}}` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    #[serde(rename = "type", default = "link_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    pub id: String,
}

fn link_kind() -> String {
    "Link".to_string()
}

impl Link {
    pub fn new(link_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                kind: link_kind(),
                link_type: Some(link_type.into()),
                id: id.into(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

//! Space roles: permission sets plus allow/deny policies.

use std::collections::BTreeMap;

use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{
    ContentfulError, ImportFormat, ImportId, Result, Sys, content_to_value, normalize_json,
    value_to_content,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{Api, space_path};
use crate::context::ProviderContext;
use crate::resource::{NEW_ID, Resource, require, require_computed, require_version};

/// A permission or policy action set: either a keyword such as `"all"` or a
/// list of action names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue {
    Scalar(String),
    List(Vec<String>),
}

impl PermissionValue {
    /// Maps a wire value. Anything but a string or an array of strings is
    /// rejected rather than guessed at.
    pub fn from_wire(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Scalar(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(ContentfulError::invalid_value(
                        field.to_string(),
                        format!("expected a string in the list, got {other}"),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            other => Err(ContentfulError::invalid_value(
                field.to_string(),
                format!("expected a string or a list of strings, got {other}"),
            )),
        }
    }

    pub fn to_wire(&self) -> Value {
        match self {
            Self::Scalar(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub effect: String,
    pub actions: PermissionValue,
    /// Constraint as JSON text.
    #[serde(default)]
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleState {
    pub space_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: BTreeMap<String, PermissionValue>,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PolicyWire {
    effect: String,
    actions: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    constraint: Option<Value>,
}

#[derive(Debug, Serialize)]
struct RoleDraft<'a> {
    name: &'a str,
    description: &'a str,
    permissions: BTreeMap<&'a str, Value>,
    policies: Vec<PolicyWire>,
}

#[derive(Debug, Deserialize)]
struct RoleWire {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    permissions: BTreeMap<String, Value>,
    #[serde(default)]
    policies: Vec<PolicyWire>,
    sys: Sys,
}

impl RoleState {
    fn draft(&self) -> Result<Value> {
        let draft = RoleDraft {
            name: &self.name,
            description: &self.description,
            permissions: self
                .permissions
                .iter()
                .map(|(key, value)| (key.as_str(), value.to_wire()))
                .collect(),
            policies: self
                .policies
                .iter()
                .map(|p| PolicyWire {
                    effect: p.effect.clone(),
                    actions: p.actions.to_wire(),
                    constraint: p.constraint.as_deref().map(content_to_value),
                })
                .collect(),
        };
        Ok(serde_json::to_value(draft)?)
    }

    fn import(wire: RoleWire, prior: &RoleState) -> Result<Self> {
        let permissions = wire
            .permissions
            .iter()
            .map(|(key, value)| {
                PermissionValue::from_wire(&format!("permissions.{key}"), value)
                    .map(|v| (key.clone(), v))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        let policies = wire
            .policies
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Ok(Policy {
                    effect: p.effect.clone(),
                    actions: PermissionValue::from_wire(&format!("policies[{i}].actions"), &p.actions)?,
                    constraint: p.constraint.as_ref().map(value_to_content),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            space_id: prior.space_id.clone(),
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            name: wire.name,
            description: wire.description.unwrap_or_default(),
            permissions,
            policies,
        })
    }

    /// Constraint strings in canonical form.
    pub fn normalized(mut self) -> Self {
        for policy in &mut self.policies {
            policy.constraint = policy.constraint.as_deref().map(normalize_json);
        }
        self
    }
}

fn roles_path(state: &RoleState) -> Result<String> {
    Ok(format!("{}/roles", space_path(require("space_id", &state.space_id)?)))
}

pub struct RoleResource;

#[async_trait]
impl Resource for RoleResource {
    type State = RoleState;

    const TYPE_NAME: &'static str = "contentful_role";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(Self::TYPE_NAME, &["roleId", "spaceId"]);

    fn id(state: &RoleState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &RoleState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> RoleState {
        RoleState {
            space_id: id.get("spaceId").to_string(),
            id: Some(id.get("roleId").to_string()),
            version: None,
            name: String::new(),
            description: String::new(),
            permissions: BTreeMap::new(),
            policies: Vec::new(),
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &RoleState) -> Result<RoleState> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::post(roles_path(plan)?).with_body(plan.draft()?);
        let wire: RoleWire = api.send(request, &[StatusCode::CREATED], NEW_ID).await?;
        Ok(RoleState::import(wire, plan)?.normalized())
    }

    async fn read(&self, ctx: &ProviderContext, current: &RoleState) -> Result<Option<RoleState>> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let path = format!("{}/{id}", roles_path(current)?);
        match api.fetch::<RoleWire>(&path, id).await? {
            Some(wire) => Ok(Some(RoleState::import(wire, current)?.normalized())),
            None => Ok(None),
        }
    }

    async fn update(&self, ctx: &ProviderContext, plan: &RoleState, current: &RoleState) -> Result<RoleState> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(format!("{}/{id}", roles_path(current)?))
            .with_version(require_version(current.version)?)
            .with_body(plan.draft()?);
        let wire: RoleWire = api.send(request, &[StatusCode::OK], id).await?;
        Ok(RoleState::import(wire, plan)?.normalized())
    }

    async fn delete(&self, ctx: &ProviderContext, current: &RoleState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let path = format!("{}/{id}", roles_path(current)?);
        let Some(latest) = api.fetch::<RoleWire>(&path, id).await? else {
            return Ok(());
        };
        api.remove(ApiRequest::delete(path).with_version(latest.sys.version), id)
            .await
    }
}

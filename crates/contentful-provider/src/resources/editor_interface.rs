//! Editor interfaces. Contentful creates one per content type; "creating"
//! one means taking over the existing object, and deleting only forgets it.

use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{
    ContentfulError, ImportFormat, ImportId, Result, Sys, content_to_value, normalize_json,
    value_to_content,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::{Api, environment_path};
use crate::context::ProviderContext;
use crate::resource::{Resource, require, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub field_id: String,
    #[serde(default)]
    pub widget_id: Option<String>,
    #[serde(default)]
    pub widget_namespace: Option<String>,
    /// Widget settings as JSON text.
    #[serde(default)]
    pub settings: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarWidget {
    pub widget_id: String,
    pub widget_namespace: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub settings: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorInterfaceState {
    pub space_id: String,
    #[serde(default)]
    pub environment_id: String,
    pub content_type_id: String,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub sidebar: Vec<SidebarWidget>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControlWire {
    field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    widget_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    widget_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidebarWire {
    widget_id: String,
    widget_namespace: String,
    #[serde(default)]
    disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<Value>,
}

#[derive(Debug, Serialize)]
struct EditorInterfaceDraft {
    controls: Vec<ControlWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sidebar: Vec<SidebarWire>,
}

#[derive(Debug, Deserialize)]
struct EditorInterfaceWire {
    #[serde(default)]
    controls: Vec<ControlWire>,
    #[serde(default)]
    sidebar: Vec<SidebarWire>,
    sys: Sys,
}

impl EditorInterfaceState {
    fn draft(&self) -> Result<Value> {
        let draft = EditorInterfaceDraft {
            controls: self
                .controls
                .iter()
                .map(|c| ControlWire {
                    field_id: c.field_id.clone(),
                    widget_id: c.widget_id.clone(),
                    widget_namespace: c.widget_namespace.clone(),
                    settings: c.settings.as_deref().map(content_to_value),
                })
                .collect(),
            sidebar: self
                .sidebar
                .iter()
                .map(|s| SidebarWire {
                    widget_id: s.widget_id.clone(),
                    widget_namespace: s.widget_namespace.clone(),
                    disabled: s.disabled,
                    settings: s.settings.as_deref().map(content_to_value),
                })
                .collect(),
        };
        Ok(serde_json::to_value(draft)?)
    }

    fn import(wire: EditorInterfaceWire, prior: &EditorInterfaceState, environment_id: String) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            environment_id,
            content_type_id: prior.content_type_id.clone(),
            version: Some(wire.sys.version),
            controls: wire
                .controls
                .into_iter()
                .map(|c| Control {
                    field_id: c.field_id,
                    widget_id: c.widget_id,
                    widget_namespace: c.widget_namespace,
                    settings: c.settings.as_ref().map(value_to_content),
                })
                .collect(),
            sidebar: wire
                .sidebar
                .into_iter()
                .map(|s| SidebarWidget {
                    widget_id: s.widget_id,
                    widget_namespace: s.widget_namespace,
                    disabled: s.disabled,
                    settings: s.settings.as_ref().map(value_to_content),
                })
                .collect(),
        }
    }

    /// Settings strings in canonical form.
    fn normalized(mut self) -> Self {
        for control in &mut self.controls {
            control.settings = control.settings.as_deref().map(normalize_json);
        }
        for widget in &mut self.sidebar {
            widget.settings = widget.settings.as_deref().map(normalize_json);
        }
        self
    }
}

fn editor_interface_path(ctx: &ProviderContext, state: &EditorInterfaceState) -> Result<(String, String)> {
    let space_id = require("space_id", &state.space_id)?;
    let content_type_id = require("content_type_id", &state.content_type_id)?;
    let environment = ctx.environment_or(&state.environment_id);
    Ok((
        format!(
            "{}/content_types/{content_type_id}/editor_interface",
            environment_path(space_id, &environment)
        ),
        environment,
    ))
}

pub struct EditorInterfaceResource;

impl EditorInterfaceResource {
    async fn write(
        api: &Api<'_>,
        path: &str,
        plan: &EditorInterfaceState,
        version: u64,
        environment: String,
    ) -> Result<EditorInterfaceState> {
        let request = ApiRequest::put(path).with_version(version).with_body(plan.draft()?);
        let wire: EditorInterfaceWire = api.send(request, &[StatusCode::OK], &plan.content_type_id).await?;
        Ok(EditorInterfaceState::import(wire, plan, environment).normalized())
    }
}

#[async_trait]
impl Resource for EditorInterfaceResource {
    type State = EditorInterfaceState;

    const TYPE_NAME: &'static str = "contentful_editor_interface";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["spaceId", "environmentId", "contentTypeId"]);

    fn id(state: &EditorInterfaceState) -> Option<&str> {
        Some(state.content_type_id.as_str())
    }

    fn version(state: &EditorInterfaceState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> EditorInterfaceState {
        EditorInterfaceState {
            space_id: id.get("spaceId").to_string(),
            environment_id: id.get("environmentId").to_string(),
            content_type_id: id.get("contentTypeId").to_string(),
            version: None,
            controls: Vec::new(),
            sidebar: Vec::new(),
        }
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        plan: &EditorInterfaceState,
    ) -> Result<EditorInterfaceState> {
        let (path, environment) = editor_interface_path(ctx, plan)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let existing: Option<EditorInterfaceWire> = api.fetch(&path, &plan.content_type_id).await?;
        let existing = existing
            .ok_or_else(|| ContentfulError::not_found(Self::TYPE_NAME, &plan.content_type_id))?;
        info!(
            content_type_id = plan.content_type_id.as_str(),
            version = existing.sys.version,
            "taking over editor interface"
        );
        Self::write(&api, &path, plan, existing.sys.version, environment).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &EditorInterfaceState,
    ) -> Result<Option<EditorInterfaceState>> {
        let (path, environment) = editor_interface_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<EditorInterfaceWire> = api.fetch(&path, &current.content_type_id).await?;
        Ok(wire.map(|w| EditorInterfaceState::import(w, current, environment).normalized()))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &EditorInterfaceState,
        current: &EditorInterfaceState,
    ) -> Result<EditorInterfaceState> {
        let (path, environment) = editor_interface_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        Self::write(&api, &path, plan, require_version(current.version)?, environment).await
    }

    async fn delete(&self, _ctx: &ProviderContext, current: &EditorInterfaceState) -> Result<()> {
        info!(
            content_type_id = current.content_type_id.as_str(),
            "editor interfaces live as long as their content type; forgetting it"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_travel_as_json() {
        let state = EditorInterfaceState {
            space_id: "sp".into(),
            environment_id: "master".into(),
            content_type_id: "post".into(),
            version: Some(2),
            controls: vec![Control {
                field_id: "title".into(),
                widget_id: Some("singleLine".into()),
                widget_namespace: Some("builtin".into()),
                settings: Some(r#"{"helpText":"Title"}"#.into()),
            }],
            sidebar: Vec::new(),
        };
        assert_eq!(
            state.draft().unwrap(),
            json!({"controls": [{
                "fieldId": "title",
                "widgetId": "singleLine",
                "widgetNamespace": "builtin",
                "settings": {"helpText": "Title"}
            }]})
        );

        let mut wire = state.draft().unwrap();
        wire["sys"] = json!({"id": "default", "version": 3});
        let back = EditorInterfaceState::import(serde_json::from_value(wire).unwrap(), &state, "master".into());
        assert_eq!(back.controls, state.controls);
        assert_eq!(back.version, Some(3));
    }
}

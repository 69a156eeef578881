//! One module per Contentful entity.

pub mod app_event_subscription;
pub mod app_installation;
pub mod asset;
pub mod content_type;
pub mod editor_interface;
pub mod entry;
pub mod environment;
pub mod environment_alias;
pub mod locale;
pub mod preview_environment;
pub mod role;
pub mod space;
pub mod taxonomy_concept;
pub mod team;
pub mod webhook;

pub use app_event_subscription::{AppEventSubscriptionResource, AppEventSubscriptionState};
pub use app_installation::{AppInstallationResource, AppInstallationState};
pub use asset::{AssetFile, AssetResource, AssetState};
pub use content_type::{ContentTypeField, ContentTypeResource, ContentTypeState, FieldItems};
pub use editor_interface::{Control, EditorInterfaceResource, EditorInterfaceState, SidebarWidget};
pub use entry::{EntryField, EntryResource, EntryState};
pub use environment::{EnvironmentResource, EnvironmentState};
pub use environment_alias::{EnvironmentAliasResource, EnvironmentAliasState};
pub use locale::{LocaleResource, LocaleState};
pub use preview_environment::{
    PreviewConfiguration, PreviewEnvironmentResource, PreviewEnvironmentState,
};
pub use role::{PermissionValue, Policy, RoleResource, RoleState};
pub use space::{SpaceResource, SpaceState};
pub use taxonomy_concept::{TaxonomyConceptResource, TaxonomyConceptState};
pub use team::{TeamResource, TeamState};
pub use webhook::{WebhookHeader, WebhookResource, WebhookState};

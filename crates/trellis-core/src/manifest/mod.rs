//! # Trellis Plugin Manifests
//!
//! The declarative description of a plugin: identity, configuration
//! surface, permission declarations, dependency relationships, and event
//! subscriptions. Manifests are registry-owned records — a new plugin
//! version is published as a new manifest, never by mutating an old one.
//!
//! Validation lives in [`validator`]; the types here are plain data with a
//! builder for ergonomic construction.

pub mod validator;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use validator::{
    validate_config_field, validate_id, validate_manifest, validate_permission,
    validate_version, ValidationReport,
};

/// Declarative description of a plugin known to the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Stable slug identifying the plugin (lowercase alphanumeric + hyphens)
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Plugin version (public semantic-version grammar)
    pub version: String,

    /// Plugin description
    pub description: String,

    /// Marketplace category
    pub category: String,

    /// Author and licensing block
    pub metadata: ManifestMetadata,

    /// Permissions the plugin requests
    #[serde(default)]
    pub permissions: Vec<PermissionDeclaration>,

    /// Configuration fields the plugin exposes to operators
    #[serde(default)]
    pub config_fields: Vec<ConfigField>,

    /// Required/optional dependencies and declared conflicts
    #[serde(default)]
    pub dependencies: PluginDependencies,

    /// Hook names the plugin subscribes to
    #[serde(default)]
    pub events: Vec<String>,

    /// Changelog marker: updating to this version requires explicit
    /// operator confirmation
    #[serde(default)]
    pub breaking_changes: bool,
}

/// Author and licensing information for a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub author: String,
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Dependency relationships declared by a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDependencies {
    /// Plugin id -> version constraint; must be present for install
    #[serde(default)]
    pub required: BTreeMap<String, String>,

    /// Plugin id -> version constraint; used when present, tolerated when not
    #[serde(default)]
    pub optional: BTreeMap<String, String>,

    /// Plugin ids this plugin cannot coexist with
    #[serde(default)]
    pub conflicts: BTreeSet<String>,
}

impl PluginDependencies {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty() && self.conflicts.is_empty()
    }
}

/// Runtime type of a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFieldType {
    String,
    Number,
    Boolean,
    Select,
    #[serde(rename = "multiselect")]
    MultiSelect,
    Json,
}

/// One option of a select/multiselect field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOption {
    pub value: String,
    pub label: String,
}

/// Numeric bounds for a field value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A configuration field definition in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    pub key: String,

    #[serde(rename = "type")]
    pub field_type: ConfigFieldType,

    pub label: String,

    /// Required (non-empty) for select and multiselect fields
    #[serde(default)]
    pub options: Vec<ConfigOption>,

    /// Default value; its JSON type must match `field_type` for primitives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

/// A permission the plugin requests over a platform resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDeclaration {
    /// Resource slug, e.g. `tenants` or `billing-reports`
    pub resource: String,
    /// Action verb, e.g. `read` or `manage`
    pub action: String,
    pub description: String,
}

impl PluginManifest {
    /// Create a minimal manifest; richer construction goes through
    /// [`ManifestBuilder`]
    pub fn new(id: &str, name: &str, version: &str, description: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            metadata: ManifestMetadata::default(),
            permissions: Vec::new(),
            config_fields: Vec::new(),
            dependencies: PluginDependencies::default(),
            events: Vec::new(),
            breaking_changes: false,
        }
    }
}

/// Builder for creating a plugin manifest
pub struct ManifestBuilder {
    manifest: PluginManifest,
}

impl ManifestBuilder {
    /// Start a new manifest builder
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            manifest: PluginManifest::new(id, name, version, "", "general"),
        }
    }

    /// Set the plugin description
    pub fn description(mut self, description: &str) -> Self {
        self.manifest.description = description.to_string();
        self
    }

    /// Set the marketplace category
    pub fn category(mut self, category: &str) -> Self {
        self.manifest.category = category.to_string();
        self
    }

    /// Set the plugin author
    pub fn author(mut self, author: &str) -> Self {
        self.manifest.metadata.author = author.to_string();
        self
    }

    /// Set the license identifier
    pub fn license(mut self, license: &str) -> Self {
        self.manifest.metadata.license = license.to_string();
        self
    }

    /// Set the plugin website
    pub fn website(mut self, website: &str) -> Self {
        self.manifest.metadata.website = Some(website.to_string());
        self
    }

    /// Declare a required dependency with a version constraint
    pub fn requires(mut self, plugin_id: &str, constraint: &str) -> Self {
        self.manifest
            .dependencies
            .required
            .insert(plugin_id.to_string(), constraint.to_string());
        self
    }

    /// Declare an optional dependency with a version constraint
    pub fn optionally_uses(mut self, plugin_id: &str, constraint: &str) -> Self {
        self.manifest
            .dependencies
            .optional
            .insert(plugin_id.to_string(), constraint.to_string());
        self
    }

    /// Declare a conflict with another plugin
    pub fn conflicts_with(mut self, plugin_id: &str) -> Self {
        self.manifest.dependencies.conflicts.insert(plugin_id.to_string());
        self
    }

    /// Add a permission declaration
    pub fn permission(mut self, resource: &str, action: &str, description: &str) -> Self {
        self.manifest.permissions.push(PermissionDeclaration {
            resource: resource.to_string(),
            action: action.to_string(),
            description: description.to_string(),
        });
        self
    }

    /// Add a configuration field
    pub fn config_field(mut self, field: ConfigField) -> Self {
        self.manifest.config_fields.push(field);
        self
    }

    /// Subscribe to a hook by name
    pub fn event(mut self, hook_name: &str) -> Self {
        self.manifest.events.push(hook_name.to_string());
        self
    }

    /// Subscribe to multiple hooks
    pub fn events(mut self, hook_names: &[&str]) -> Self {
        for name in hook_names {
            self.manifest.events.push(name.to_string());
        }
        self
    }

    /// Mark this version as containing breaking changes
    pub fn breaking_changes(mut self, breaking: bool) -> Self {
        self.manifest.breaking_changes = breaking;
        self
    }

    /// Build the manifest
    pub fn build(self) -> PluginManifest {
        self.manifest
    }
}

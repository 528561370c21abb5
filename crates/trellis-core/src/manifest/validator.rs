//! Pure validation over manifest data.
//!
//! Every validator aggregates *all* violations it finds rather than
//! short-circuiting, so a single manifest submission reports every defect
//! at once. Version format checks here use the full public semantic-version
//! grammar via the `semver` crate; the simpler grammar in
//! [`crate::version`] governs comparison and constraint evaluation.

use serde_json::Value;

use crate::manifest::{ConfigField, ConfigFieldType, PermissionDeclaration, PluginManifest};

/// Action verbs the platform knows how to enforce. The vocabulary check is
/// advisory: it is reported as an error, but lifecycle policy may downgrade
/// it to a warning.
pub const KNOWN_ACTIONS: &[&str] =
    &["read", "write", "create", "update", "delete", "manage", "execute"];

const ID_MIN_LEN: usize = 3;
const ID_MAX_LEN: usize = 64;

/// Aggregated result of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Fold another report's errors into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }
}

/// Validate a plugin identifier: 3-64 chars, lowercase alphanumeric and
/// hyphens, no leading or trailing hyphen. Path-separator and traversal
/// sequences are rejected explicitly even though the character rules
/// already exclude them — these ids end up as filesystem and URL path
/// segments downstream.
pub fn validate_id(id: &str) -> Result<(), String> {
    if id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(format!("Plugin id '{}' contains a path traversal sequence", id));
    }
    if id.len() < ID_MIN_LEN || id.len() > ID_MAX_LEN {
        return Err(format!(
            "Plugin id must be {}-{} characters, got {}",
            ID_MIN_LEN,
            ID_MAX_LEN,
            id.len()
        ));
    }
    let bytes = id.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
        return Err(format!("Plugin id '{}' must start and end with a lowercase letter or digit", id));
    }
    if !id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(format!(
            "Plugin id '{}' may only contain lowercase letters, digits and hyphens",
            id
        ));
    }
    Ok(())
}

/// Validate a version string against the public semantic-version grammar
pub fn validate_version(version: &str) -> Result<(), String> {
    semver::Version::parse(version)
        .map(|_| ())
        .map_err(|e| format!("Invalid version '{}': {}", version, e))
}

/// Validate a configuration field definition, aggregating every violation
pub fn validate_config_field(field: &ConfigField) -> ValidationReport {
    let mut report = ValidationReport::new();

    if field.key.trim().is_empty() {
        report.push("Config field key must not be empty");
    }
    if field.label.trim().is_empty() {
        report.push(format!("Config field '{}' is missing a label", field.key));
    }

    match field.field_type {
        ConfigFieldType::Select | ConfigFieldType::MultiSelect => {
            if field.options.is_empty() {
                report.push(format!(
                    "Config field '{}' of a select type must declare options",
                    field.key
                ));
            }
            for (index, option) in field.options.iter().enumerate() {
                if option.value.trim().is_empty() {
                    report.push(format!(
                        "Config field '{}' option {} is missing a value",
                        field.key, index
                    ));
                }
                if option.label.trim().is_empty() {
                    report.push(format!(
                        "Config field '{}' option {} is missing a label",
                        field.key, index
                    ));
                }
            }
        }
        _ => {}
    }

    if let Some(default) = &field.default {
        let matches = match field.field_type {
            ConfigFieldType::String => default.is_string(),
            ConfigFieldType::Number => default.is_number(),
            ConfigFieldType::Boolean => default.is_boolean(),
            // Select defaults reference option values; json accepts anything
            ConfigFieldType::Select | ConfigFieldType::MultiSelect | ConfigFieldType::Json => true,
        };
        if !matches {
            report.push(format!(
                "Config field '{}' default {} does not match declared type",
                field.key,
                default_kind(default)
            ));
        }
    }

    if let Some(validation) = &field.validation {
        if let (Some(min), Some(max)) = (validation.min, validation.max) {
            if min > max {
                report.push(format!(
                    "Config field '{}' validation min {} exceeds max {}",
                    field.key, min, max
                ));
            }
        }
    }

    report
}

fn default_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate a permission declaration
pub fn validate_permission(permission: &PermissionDeclaration) -> ValidationReport {
    let mut report = ValidationReport::new();

    if permission.resource.is_empty()
        || !permission
            .resource
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        report.push(format!(
            "Permission resource '{}' must match ^[a-z0-9-]+$",
            permission.resource
        ));
    }

    if permission.action.is_empty()
        || !permission.action.chars().all(|c| c.is_ascii_lowercase())
    {
        report.push(format!(
            "Permission action '{}' must match ^[a-z]+$",
            permission.action
        ));
    } else if !KNOWN_ACTIONS.contains(&permission.action.as_str()) {
        report.push(format!(
            "Permission action '{}' is not a known action ({})",
            permission.action,
            KNOWN_ACTIONS.join(", ")
        ));
    }

    report
}

/// Validate a whole manifest: identity, version format, completeness, and
/// every configuration field and permission declaration. All violations are
/// aggregated into a single report.
pub fn validate_manifest(manifest: &PluginManifest) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Err(error) = validate_id(&manifest.id) {
        report.push(error);
    }
    if let Err(error) = validate_version(&manifest.version) {
        report.push(error);
    }

    if manifest.name.trim().is_empty() {
        report.push("Manifest is missing a name");
    }
    if manifest.description.trim().is_empty() {
        report.push("Manifest is missing a description");
    }
    if manifest.category.trim().is_empty() {
        report.push("Manifest is missing a category");
    }
    if manifest.metadata.author.trim().is_empty() {
        report.push("Manifest metadata is missing an author");
    }
    if manifest.metadata.license.trim().is_empty() {
        report.push("Manifest metadata is missing a license");
    }

    for field in &manifest.config_fields {
        report.merge(validate_config_field(field));
    }
    for permission in &manifest.permissions {
        report.merge(validate_permission(permission));
    }

    report
}

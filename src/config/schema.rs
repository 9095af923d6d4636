use crate::format::FormatOptions;
use crate::specs::TableRegistry;
use serde::Deserialize;
use thiserror::Error;

/// Contents of `xml-sync.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub format: FormatOptions,
    #[serde(default)]
    pub tables: TablesConfig,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TablesConfig {
    /// Table names known in addition to (or instead of) the built-in list.
    #[serde(default)]
    pub extra: Vec<String>,
    #[serde(default)]
    pub replace_defaults: bool,
    /// Package prefix for newly written class references.
    #[serde(default)]
    pub class_prefix: Option<String>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.format.max_line_length == 0 {
            issues.push(ValidationIssue::OutOfRange {
                field: "format.max_line_length",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.format.indent_unit.is_empty()
            || !self.format.indent_unit.chars().all(|c| c == ' ' || c == '\t')
        {
            issues.push(ValidationIssue::OutOfRange {
                field: "format.indent_unit",
                message: "must be one or more spaces or tabs".to_string(),
            });
        }

        for name in &self.tables.extra {
            if name.trim().is_empty() || name.contains(|c: char| c.is_whitespace() || c == '.') {
                issues.push(ValidationIssue::InvalidTableName { name: name.clone() });
            }
        }
        if self.tables.replace_defaults && self.tables.extra.is_empty() {
            issues.push(ValidationIssue::InvalidCombo {
                message: "tables.replace_defaults requires at least one entry in tables.extra"
                    .to_string(),
            });
        }
        if let Some(prefix) = &self.tables.class_prefix {
            if prefix.trim_end_matches('.').trim().is_empty() {
                issues.push(ValidationIssue::OutOfRange {
                    field: "tables.class_prefix",
                    message: "must not be empty".to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// The table registry this configuration describes.
    pub fn table_registry(&self) -> TableRegistry {
        let registry = if self.tables.replace_defaults {
            TableRegistry::new(self.tables.extra.iter().cloned())
        } else {
            TableRegistry::default().extended(self.tables.extra.iter().cloned())
        };
        match &self.tables.class_prefix {
            Some(prefix) => registry.with_class_prefix(prefix),
            None => registry,
        }
    }
}

/// Every problem found in one config, reported together.
#[derive(Error, Debug, Clone)]
#[error("{}", lines(issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn lines(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Error, Debug, Clone)]
pub enum ValidationIssue {
    #[error("'{field}' {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },

    #[error("invalid table name '{name}' in tables.extra")]
    InvalidTableName { name: String },

    #[error("invalid configuration: {message}")]
    InvalidCombo { message: String },
}

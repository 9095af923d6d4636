//! Coercions between attribute strings and typed values.
//!
//! Each coercion writes back the previous text whenever it still means the
//! same value, so reading and writing an untouched document changes nothing.

use crate::specs::TableRegistry;
use crate::syncer::context::SyncContext;
use crate::syncer::combinators::Syncer;

/// Supplies `value` when the input is absent.
#[derive(Debug, Clone)]
pub struct DefaultValue {
    value: String,
}

pub fn default_value(value: impl Into<String>) -> DefaultValue {
    DefaultValue {
        value: value.into(),
    }
}

impl Syncer for DefaultValue {
    type Input = Option<String>;
    type Output = String;

    fn serialize(&self, input: &Option<String>, _ctx: &mut SyncContext) -> String {
        input.clone().unwrap_or_else(|| self.value.clone())
    }

    fn deserialize(&self, output: &String, previous: &Option<String>) -> Option<String> {
        if previous.as_deref().unwrap_or(&self.value) == output.as_str() {
            return previous.clone();
        }
        Some(output.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Boolean {
    default: bool,
}

pub fn boolean(default: bool) -> Boolean {
    Boolean { default }
}

impl Syncer for Boolean {
    type Input = Option<String>;
    type Output = bool;

    fn serialize(&self, input: &Option<String>, ctx: &mut SyncContext) -> bool {
        let Some(raw) = input else {
            return self.default;
        };
        match raw.trim().to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            "" => self.default,
            _ => {
                ctx.warning(format!("Expected \"true\" or \"false\", found \"{raw}\""));
                self.default
            }
        }
    }

    fn deserialize(&self, output: &bool, previous: &Option<String>) -> Option<String> {
        if self.serialize(previous, &mut SyncContext::new()) == *output {
            return previous.clone();
        }
        Some(output.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Integer {
    default: i64,
}

pub fn integer(default: i64) -> Integer {
    Integer { default }
}

impl Syncer for Integer {
    type Input = Option<String>;
    type Output = i64;

    fn serialize(&self, input: &Option<String>, ctx: &mut SyncContext) -> i64 {
        match input.as_deref().map(str::trim) {
            None | Some("") => self.default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                ctx.warning(format!("Expected a whole number, found \"{raw}\""));
                self.default
            }),
        }
    }

    fn deserialize(&self, output: &i64, previous: &Option<String>) -> Option<String> {
        if self.serialize(previous, &mut SyncContext::new()) == *output {
            return previous.clone();
        }
        Some(output.to_string())
    }
}

/// Restricts a string to a fixed set of values, matched case-insensitively.
///
/// Unknown values are kept as written and reported, with a suggestion when
/// one of the allowed values is close.
#[derive(Debug, Clone)]
pub struct Enumeration {
    values: Vec<String>,
}

pub fn enumeration<I, S>(values: I) -> Enumeration
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Enumeration {
        values: values.into_iter().map(Into::into).collect(),
    }
}

impl Enumeration {
    fn canonical(&self, raw: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.eq_ignore_ascii_case(raw))
            .map(String::as_str)
    }

    fn suggestion(&self, raw: &str) -> Option<&str> {
        let raw = raw.to_lowercase();
        self.values
            .iter()
            .map(|v| (strsim::jaro_winkler(&raw, &v.to_lowercase()), v))
            .filter(|(score, _)| *score >= 0.8)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, v)| v.as_str())
    }
}

impl Syncer for Enumeration {
    type Input = String;
    type Output = String;

    fn serialize(&self, input: &String, ctx: &mut SyncContext) -> String {
        if input.is_empty() {
            return String::new();
        }
        if let Some(value) = self.canonical(input) {
            return value.to_string();
        }
        let message = match self.suggestion(input) {
            Some(suggestion) => {
                format!("Unknown value \"{input}\". Did you mean \"{suggestion}\"?")
            }
            None => format!(
                "Unknown value \"{input}\". Expected one of: {}",
                self.values.join(", ")
            ),
        };
        ctx.warning(message);
        input.clone()
    }

    fn deserialize(&self, output: &String, previous: &String) -> String {
        if previous.eq_ignore_ascii_case(output) {
            return previous.clone();
        }
        output.clone()
    }
}

/// Resolves a table name or Java class name against a [`TableRegistry`].
#[derive(Debug, Clone)]
pub struct TableReference {
    tables: TableRegistry,
}

pub fn table_reference(tables: &TableRegistry) -> TableReference {
    TableReference {
        tables: tables.clone(),
    }
}

impl Syncer for TableReference {
    type Input = String;
    type Output = Option<String>;

    fn serialize(&self, input: &String, ctx: &mut SyncContext) -> Option<String> {
        let raw = input.trim();
        if raw.is_empty() {
            return None;
        }
        match self.tables.resolve(raw) {
            Some(table) => Some(table.to_string()),
            None => {
                ctx.error(format!("Unknown table \"{raw}\""));
                None
            }
        }
    }

    fn deserialize(&self, output: &Option<String>, previous: &String) -> String {
        let Some(table) = output else {
            return previous.clone();
        };
        if self.tables.resolve(previous.trim()) == Some(table.as_str()) {
            return previous.clone();
        }
        match previous.trim().rsplit_once('.') {
            Some((package, _)) => format!("{package}.{table}"),
            None if previous.trim().is_empty() => self.tables.class_name(table),
            None => table.clone(),
        }
    }
}

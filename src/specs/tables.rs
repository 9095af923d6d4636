use std::sync::Arc;

/// Package prefix of the Java classes table references are written as.
pub const DEFAULT_CLASS_PREFIX: &str = "edu.ku.brc.specify.datamodel";

const DEFAULT_TABLES: &[&str] = &[
    "Accession",
    "AccessionAgent",
    "Agent",
    "Borrow",
    "CollectingEvent",
    "Collection",
    "CollectionObject",
    "Collector",
    "Determination",
    "Discipline",
    "Division",
    "Geography",
    "GeologicTimePeriod",
    "Gift",
    "Institution",
    "Loan",
    "LoanPreparation",
    "Locality",
    "Permit",
    "Preparation",
    "PrepType",
    "ReferenceWork",
    "Storage",
    "Taxon",
];

/// The set of known table names that table references resolve against.
///
/// Built once and shared by every syncer that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegistry {
    tables: Arc<[String]>,
    class_prefix: Arc<str>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TABLES.iter().copied())
    }
}

impl TableRegistry {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            class_prefix: Arc::from(DEFAULT_CLASS_PREFIX),
        }
    }

    #[must_use]
    pub fn with_class_prefix(mut self, prefix: &str) -> Self {
        self.class_prefix = Arc::from(prefix.trim_end_matches('.'));
        self
    }

    /// A registry with `extra` appended, skipping names already present.
    #[must_use]
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables: Vec<String> = self.tables.to_vec();
        for name in extra {
            let name = name.into();
            if !tables.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                tables.push(name);
            }
        }
        Self {
            tables: tables.into(),
            class_prefix: self.class_prefix.clone(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }

    /// Canonical table name for a bare table name or a fully qualified class.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        let name = raw.rsplit('.').next().unwrap_or(raw);
        self.tables
            .iter()
            .find(|t| t.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn class_name(&self, table: &str) -> String {
        format!("{}.{}", self.class_prefix, table)
    }
}

//! Entity model produced by a parse and handed to renderers.

use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub tables: Vec<Table>,
    /// Set when part of the input could not be parsed; the rest of the
    /// document is still usable.
    pub has_error: bool,
    /// Human-readable context dumps for each parse error.
    pub diagnostics: Vec<String>,
}

impl Document {
    pub fn table(&self, internal_name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.internal_name == internal_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub internal_name: String,
    pub display_name: Option<String>,
    pub columns: Vec<Column>,
    /// Positions in `columns`.
    pub primary_key_columns: BTreeSet<usize>,
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn new(internal_name: impl Into<String>) -> Self {
        Self {
            internal_name: internal_name.into(),
            ..Self::default()
        }
    }

    pub fn column(&self, internal_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.internal_name == internal_name)
    }

    pub fn column_position(&self, internal_name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.internal_name == internal_name)
    }

    /// Name used in diagrams: the display name if any.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.internal_name)
    }

    /// Comma-separated internal names of the primary key columns.
    pub fn primary_key_column_names(&self) -> String {
        self.primary_key_columns
            .iter()
            .filter_map(|&i| self.columns.get(i))
            .map(|c| c.internal_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub internal_name: String,
    pub display_name: Option<String>,
    pub column_type: String,
    pub nullable: bool,
    pub unique: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub default: Option<String>,
    pub relation: Option<Relation>,
    pub comments: Vec<String>,
    /// Positions in the owning table's `indexes`.
    pub member_of_indexes: BTreeSet<usize>,
    pub excluded_from_diagram: bool,
}

impl Column {
    pub fn new(internal_name: impl Into<String>) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_name: None,
            column_type: String::new(),
            nullable: true,
            unique: false,
            is_primary_key: false,
            is_foreign_key: false,
            default: None,
            relation: None,
            comments: Vec::new(),
            member_of_indexes: BTreeSet::new(),
            excluded_from_diagram: false,
        }
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.internal_name)
    }

    pub fn has_default(&self) -> bool {
        self.default.as_deref().is_some_and(|d| !d.is_empty())
    }

    pub fn has_relation(&self) -> bool {
        self.relation.as_ref().is_some_and(|r| !r.target.is_empty())
    }

    pub fn has_comment(&self) -> bool {
        !self.comments.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub source_cardinality: Option<String>,
    pub dest_cardinality: Option<String>,
    /// Dotted `table.column` reference.
    pub target: String,
}

impl Relation {
    pub fn target_table(&self) -> &str {
        self.target
            .split_once('.')
            .map_or(self.target.as_str(), |(table, _)| table)
    }

    pub fn target_column(&self) -> Option<&str> {
        self.target.split_once('.').map(|(_, column)| column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn column_list(&self) -> String {
        self.columns.join(", ")
    }
}

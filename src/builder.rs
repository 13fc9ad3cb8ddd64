//! Incremental construction of a [`Document`].
//!
//! Opening a table, column or index hands back a handle; every later
//! mutation of that entity goes through the handle. Column and index handles
//! remember their table, so they can only touch the table they were opened
//! in. Handles are only meaningful for the builder that issued them.

use crate::model::{Column, Document, Index, Relation, Table};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHandle {
    table: usize,
    column: usize,
}

impl ColumnHandle {
    pub fn table(&self) -> TableHandle {
        TableHandle(self.table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHandle {
    table: usize,
    index: usize,
}

impl IndexHandle {
    pub fn table(&self) -> TableHandle {
        TableHandle(self.table)
    }
}

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

fn unquote(text: &str) -> String {
    text.trim_matches('"').to_string()
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, text: &str) {
        self.document.title = text.to_string();
    }

    pub fn begin_table(&mut self, internal_name: &str) -> TableHandle {
        self.document.tables.push(Table::new(internal_name));
        TableHandle(self.document.tables.len() - 1)
    }

    pub fn set_table_display_name(&mut self, table: TableHandle, text: &str) {
        self.table_mut(table).display_name = Some(unquote(text));
    }

    /// Record a primary key marker for `table`.
    ///
    /// A numeric marker is a 1-based column ordinal. Anything else (`+`, `*`)
    /// marks the column that is opened next.
    pub fn mark_primary_key(&mut self, table: TableHandle, marker: &str) {
        let table = self.table_mut(table);
        let position = match marker.trim().parse::<usize>() {
            Ok(ordinal) if ordinal >= 1 => ordinal - 1,
            _ => table.columns.len(),
        };
        table.primary_key_columns.insert(position);
        if let Some(column) = table.columns.get_mut(position) {
            column.is_primary_key = true;
        }
    }

    pub fn begin_column(&mut self, table: TableHandle, internal_name: &str) -> ColumnHandle {
        let t = self.table_mut(table);
        let position = t.columns.len();
        let mut column = Column::new(internal_name);
        column.is_primary_key = t.primary_key_columns.contains(&position);
        t.columns.push(column);
        ColumnHandle {
            table: table.0,
            column: position,
        }
    }

    pub fn set_column_display_name(&mut self, column: ColumnHandle, text: &str) {
        self.column_mut(column).display_name = Some(unquote(text));
    }

    pub fn set_column_type(&mut self, column: ColumnHandle, text: &str) {
        self.column_mut(column).column_type = text.to_string();
    }

    pub fn mark_not_null(&mut self, column: ColumnHandle) {
        self.column_mut(column).nullable = false;
    }

    pub fn mark_unique(&mut self, column: ColumnHandle) {
        self.column_mut(column).unique = true;
    }

    pub fn set_column_default(&mut self, column: ColumnHandle, text: &str) {
        self.column_mut(column).default = Some(text.to_string());
    }

    pub fn exclude_from_diagram(&mut self, column: ColumnHandle) {
        self.column_mut(column).excluded_from_diagram = true;
    }

    /// Also marks the column as a foreign key.
    pub fn set_relation_source_cardinality(&mut self, column: ColumnHandle, text: &str) {
        let c = self.column_mut(column);
        c.is_foreign_key = true;
        c.relation.get_or_insert_with(Relation::default).source_cardinality = Some(text.to_string());
    }

    pub fn set_relation_dest_cardinality(&mut self, column: ColumnHandle, text: &str) {
        self.column_mut(column)
            .relation
            .get_or_insert_with(Relation::default)
            .dest_cardinality = Some(text.to_string());
    }

    pub fn set_relation_target(&mut self, column: ColumnHandle, text: &str) {
        self.column_mut(column)
            .relation
            .get_or_insert_with(Relation::default)
            .target = text.to_string();
    }

    pub fn add_comment(&mut self, column: ColumnHandle, text: &str) {
        self.column_mut(column).comments.push(text.to_string());
    }

    pub fn begin_index(&mut self, table: TableHandle, name: &str) -> IndexHandle {
        let t = self.table_mut(table);
        t.indexes.push(Index {
            name: name.to_string(),
            ..Index::default()
        });
        IndexHandle {
            table: table.0,
            index: t.indexes.len() - 1,
        }
    }

    pub fn mark_index_unique(&mut self, index: IndexHandle) {
        self.index_mut(index).unique = true;
    }

    /// Add `name` to the index if the table has such a column. Unknown names
    /// are logged and dropped.
    pub fn add_index_column(&mut self, index: IndexHandle, name: &str) {
        let table = &mut self.document.tables[index.table];
        let Some(position) = table.column_position(name) else {
            warn!(
                table = %table.internal_name,
                index = %table.indexes[index.index].name,
                column = name,
                "index column not found in table, dropping it"
            );
            return;
        };
        table.indexes[index.index].columns.push(name.to_string());
        table.columns[position].member_of_indexes.insert(index.index);
    }

    pub fn mark_error(&mut self, diagnostic: String) {
        self.document.has_error = true;
        self.document.diagnostics.push(diagnostic);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Finish the document. Ordinal primary key markers that never matched a
    /// column are dropped here.
    pub fn finish(mut self) -> Document {
        for table in &mut self.document.tables {
            let len = table.columns.len();
            let before = table.primary_key_columns.len();
            table.primary_key_columns.retain(|&i| i < len);
            if table.primary_key_columns.len() != before {
                warn!(
                    table = %table.internal_name,
                    "primary key marker beyond the last column, dropping it"
                );
            }
        }
        debug!(
            title = %self.document.title,
            tables = self.document.tables.len(),
            has_error = self.document.has_error,
            "document built"
        );
        self.document
    }

    fn table_mut(&mut self, table: TableHandle) -> &mut Table {
        &mut self.document.tables[table.0]
    }

    fn column_mut(&mut self, column: ColumnHandle) -> &mut Column {
        &mut self.document.tables[column.table].columns[column.column]
    }

    fn index_mut(&mut self, index: IndexHandle) -> &mut Index {
        &mut self.document.tables[index.table].indexes[index.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_primary_keys_follow_their_column() {
        let mut b = DocumentBuilder::new();
        let t = b.begin_table("orders");
        b.begin_column(t, "note");
        b.mark_primary_key(t, "+");
        b.begin_column(t, "shop_id");
        b.mark_primary_key(t, "*");
        b.begin_column(t, "order_no");
        let doc = b.finish();

        let cols = &doc.tables[0].columns;
        assert!(!cols[0].is_primary_key);
        assert!(cols[1].is_primary_key);
        assert!(cols[2].is_primary_key);
        assert_eq!(doc.tables[0].primary_key_column_names(), "shop_id, order_no");
    }

    #[test]
    fn test_ordinal_primary_key_marker() {
        let mut b = DocumentBuilder::new();
        let t = b.begin_table("t");
        b.mark_primary_key(t, "2");
        b.begin_column(t, "a");
        b.begin_column(t, "b");
        b.mark_primary_key(t, "1");
        let doc = b.finish();
        assert!(doc.tables[0].columns[0].is_primary_key);
        assert!(doc.tables[0].columns[1].is_primary_key);
    }

    #[test]
    fn test_dangling_ordinal_is_dropped_on_finish() {
        let mut b = DocumentBuilder::new();
        let t = b.begin_table("t");
        b.begin_column(t, "a");
        b.mark_primary_key(t, "5");
        let doc = b.finish();
        assert!(doc.tables[0].primary_key_columns.is_empty());
    }

    #[test]
    fn test_index_back_references() {
        let mut b = DocumentBuilder::new();
        let t = b.begin_table("orders");
        b.begin_column(t, "id");
        b.begin_column(t, "user_id");
        let i = b.begin_index(t, "idx_user");
        b.add_index_column(i, "user_id");
        b.add_index_column(i, "missing");
        b.mark_index_unique(i);
        let doc = b.finish();

        let orders = &doc.tables[0];
        assert_eq!(orders.indexes[0].columns, vec!["user_id"]);
        assert!(orders.indexes[0].unique);
        assert!(orders.columns[1].member_of_indexes.contains(&0));
        assert!(orders.columns[0].member_of_indexes.is_empty());
        assert!(!doc.has_error);
    }

    #[test]
    fn test_relation_parts_and_foreign_key() {
        let mut b = DocumentBuilder::new();
        let t = b.begin_table("posts");
        let c = b.begin_column(t, "user_id");
        b.set_relation_dest_cardinality(c, "1");
        b.set_relation_target(c, "users.id");
        assert!(!b.document().tables[0].columns[0].is_foreign_key);
        b.set_relation_source_cardinality(c, "0..*");
        let doc = b.finish();

        let col = &doc.tables[0].columns[0];
        assert!(col.is_foreign_key);
        let rel = col.relation.as_ref().unwrap();
        assert_eq!(rel.source_cardinality.as_deref(), Some("0..*"));
        assert_eq!(rel.dest_cardinality.as_deref(), Some("1"));
        assert_eq!(rel.target, "users.id");
    }

    #[test]
    fn test_display_names_are_unquoted() {
        let mut b = DocumentBuilder::new();
        let t = b.begin_table("users");
        b.set_table_display_name(t, "\"Site Users\"");
        let c = b.begin_column(t, "id");
        b.set_column_display_name(c, "\"User ID\"");
        let doc = b.finish();
        assert_eq!(doc.tables[0].label(), "Site Users");
        assert_eq!(doc.tables[0].columns[0].label(), "User ID");
    }

    #[test]
    fn test_column_handle_stays_on_its_table() {
        let mut b = DocumentBuilder::new();
        let first = b.begin_table("first");
        let c = b.begin_column(first, "a");
        let second = b.begin_table("second");
        b.begin_column(second, "b");
        b.mark_not_null(c);
        assert_eq!(c.table(), first);
        let doc = b.finish();
        assert!(!doc.tables[0].columns[0].nullable);
        assert!(doc.tables[1].columns[0].nullable);
    }
}

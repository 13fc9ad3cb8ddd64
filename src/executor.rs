//! Replays a committed token stream into a [`Document`].

use crate::builder::{ColumnHandle, DocumentBuilder, IndexHandle, TableHandle};
use crate::model::Document;
use crate::report::context_dump;
use crate::rule::{Action, Rule};
use crate::source::Source;
use crate::token::TokenStream;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("action {action} at offset {offset} needs an open {entity}")]
    NotOpen {
        action: &'static str,
        entity: &'static str,
        offset: usize,
    },
}

/// Entities the next action applies to.
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    table: Option<TableHandle>,
    column: Option<ColumnHandle>,
    index: Option<IndexHandle>,
}

pub struct Executor<'a> {
    source: &'a Source,
    context_lines: usize,
    builder: DocumentBuilder,
    cursor: Cursor,
    /// Most recently captured span.
    capture: (usize, usize),
    text: String,
}

impl<'a> Executor<'a> {
    pub fn new(source: &'a Source, context_lines: usize) -> Self {
        Self {
            source,
            context_lines,
            builder: DocumentBuilder::new(),
            cursor: Cursor::default(),
            capture: (0, 0),
            text: String::new(),
        }
    }

    pub fn run(mut self, tokens: &TokenStream) -> Result<Document, ExecuteError> {
        for token in tokens {
            match token.rule {
                Rule::Capture => {
                    self.capture = (token.begin, token.end);
                    self.text = self.source.text(token.begin, token.end);
                }
                Rule::Action(action) => self.apply(action, token.begin)?,
                _ => {}
            }
        }
        debug!(tokens = tokens.len(), "replayed token stream");
        Ok(self.builder.finish())
    }

    fn apply(&mut self, action: Action, offset: usize) -> Result<(), ExecuteError> {
        let text = self.text.as_str();
        match action {
            Action::TrailingGarbage | Action::Unparseable => {
                let position = self.source.position(self.capture.0);
                error!(
                    kind = action.name(),
                    line = position.line,
                    column = position.column,
                    "unparsed input, document is incomplete"
                );
                let dump = context_dump(self.source, self.capture.0, self.context_lines);
                self.builder.mark_error(dump);
            }
            Action::SetTitle => self.builder.set_title(text),
            Action::BeginTable => {
                let table = self.builder.begin_table(text);
                self.cursor = Cursor {
                    table: Some(table),
                    column: None,
                    index: None,
                };
            }
            Action::SetTableDisplayName => {
                let table = self.table(action, offset)?;
                self.builder.set_table_display_name(table, text);
            }
            Action::MarkPrimaryKey => {
                let table = self.table(action, offset)?;
                self.builder.mark_primary_key(table, text);
            }
            Action::BeginColumn => {
                let table = self.table(action, offset)?;
                self.cursor.column = Some(self.builder.begin_column(table, text));
            }
            Action::SetColumnDisplayName => {
                let column = self.column(action, offset)?;
                self.builder.set_column_display_name(column, text);
            }
            Action::SetColumnType => {
                let column = self.column(action, offset)?;
                self.builder.set_column_type(column, text);
            }
            Action::MarkNotNull => {
                let column = self.column(action, offset)?;
                self.builder.mark_not_null(column);
            }
            Action::MarkUnique => {
                let column = self.column(action, offset)?;
                self.builder.mark_unique(column);
            }
            Action::SetColumnDefault => {
                let column = self.column(action, offset)?;
                self.builder.set_column_default(column, text);
            }
            Action::ExcludeFromDiagram => {
                let column = self.column(action, offset)?;
                self.builder.exclude_from_diagram(column);
            }
            Action::SetRelationSource => {
                let column = self.column(action, offset)?;
                self.builder.set_relation_source_cardinality(column, text);
            }
            Action::SetRelationDest => {
                let column = self.column(action, offset)?;
                self.builder.set_relation_dest_cardinality(column, text);
            }
            Action::SetRelationTarget => {
                let column = self.column(action, offset)?;
                self.builder.set_relation_target(column, text);
            }
            Action::AddComment => {
                let column = self.column(action, offset)?;
                self.builder.add_comment(column, text);
            }
            Action::BeginIndex => {
                let table = self.table(action, offset)?;
                self.cursor.index = Some(self.builder.begin_index(table, text));
            }
            Action::AddIndexColumn => {
                let index = self.index(action, offset)?;
                self.builder.add_index_column(index, text);
            }
            Action::MarkIndexUnique => {
                let index = self.index(action, offset)?;
                self.builder.mark_index_unique(index);
            }
        }
        Ok(())
    }

    fn table(&self, action: Action, offset: usize) -> Result<TableHandle, ExecuteError> {
        self.cursor
            .table
            .ok_or_else(|| not_open(action, "table", offset))
    }

    fn column(&self, action: Action, offset: usize) -> Result<ColumnHandle, ExecuteError> {
        self.cursor
            .column
            .ok_or_else(|| not_open(action, "column", offset))
    }

    fn index(&self, action: Action, offset: usize) -> Result<IndexHandle, ExecuteError> {
        self.cursor
            .index
            .ok_or_else(|| not_open(action, "index", offset))
    }
}

fn not_open(action: Action, entity: &'static str, offset: usize) -> ExecuteError {
    ExecuteError::NotOpen {
        action: action.name(),
        entity,
        offset,
    }
}

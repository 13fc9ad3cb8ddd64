use std::fmt;

/// Every kind of token the matcher can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Root,
    Eot,
    Expression,
    TitleInfo,
    TableInfo,
    Comment,
    EmptyLine,
    TableNameInfo,
    ColumnInfo,
    ColumnAttribute,
    Relation,
    ColumnComment,
    IndexInfo,
    Title,
    CommentString,
    Whitespace,
    Newline,
    Space,
    NotNull,
    Unique,
    Erd,
    RealTableName,
    TableName,
    RealColumnName,
    ColumnName,
    RelationPoint,
    Pkey,
    ColType,
    Default,
    CardinalityRight,
    CardinalityLeft,
    Cardinality,
    /// Span of text handed to the next action during replay.
    Capture,
    /// Zero-width marker replayed as a builder mutation.
    Action(Action),
}

/// Semantic actions embedded in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// A document prefix parsed but the rest did not.
    TrailingGarbage,
    /// Nothing parsed as a document.
    Unparseable,
    SetTitle,
    BeginTable,
    SetTableDisplayName,
    MarkPrimaryKey,
    BeginColumn,
    SetColumnDisplayName,
    SetColumnType,
    MarkNotNull,
    MarkUnique,
    SetColumnDefault,
    ExcludeFromDiagram,
    SetRelationSource,
    SetRelationDest,
    SetRelationTarget,
    AddComment,
    BeginIndex,
    AddIndexColumn,
    MarkIndexUnique,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::TrailingGarbage => "trailing_garbage",
            Action::Unparseable => "unparseable",
            Action::SetTitle => "set_title",
            Action::BeginTable => "begin_table",
            Action::SetTableDisplayName => "set_table_display_name",
            Action::MarkPrimaryKey => "mark_primary_key",
            Action::BeginColumn => "begin_column",
            Action::SetColumnDisplayName => "set_column_display_name",
            Action::SetColumnType => "set_column_type",
            Action::MarkNotNull => "mark_not_null",
            Action::MarkUnique => "mark_unique",
            Action::SetColumnDefault => "set_column_default",
            Action::ExcludeFromDiagram => "exclude_from_diagram",
            Action::SetRelationSource => "set_relation_source",
            Action::SetRelationDest => "set_relation_dest",
            Action::SetRelationTarget => "set_relation_target",
            Action::AddComment => "add_comment",
            Action::BeginIndex => "begin_index",
            Action::AddIndexColumn => "add_index_column",
            Action::MarkIndexUnique => "mark_index_unique",
        }
    }
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::Root => "root",
            Rule::Eot => "EOT",
            Rule::Expression => "expression",
            Rule::TitleInfo => "title_info",
            Rule::TableInfo => "table_info",
            Rule::Comment => "comment",
            Rule::EmptyLine => "empty_line",
            Rule::TableNameInfo => "table_name_info",
            Rule::ColumnInfo => "column_info",
            Rule::ColumnAttribute => "column_attribute",
            Rule::Relation => "relation",
            Rule::ColumnComment => "column_comment",
            Rule::IndexInfo => "index_info",
            Rule::Title => "title",
            Rule::CommentString => "comment_string",
            Rule::Whitespace => "whitespace",
            Rule::Newline => "newline",
            Rule::Space => "space",
            Rule::NotNull => "notnull",
            Rule::Unique => "unique",
            Rule::Erd => "erd",
            Rule::RealTableName => "real_table_name",
            Rule::TableName => "table_name",
            Rule::RealColumnName => "real_column_name",
            Rule::ColumnName => "column_name",
            Rule::RelationPoint => "relation_point",
            Rule::Pkey => "pkey",
            Rule::ColType => "col_type",
            Rule::Default => "default",
            Rule::CardinalityRight => "cardinality_right",
            Rule::CardinalityLeft => "cardinality_left",
            Rule::Cardinality => "cardinality",
            Rule::Capture => "capture",
            Rule::Action(action) => action.name(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

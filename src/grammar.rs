//! The erdm grammar.
//!
//! ```text
//! root             <- expression EOT
//!                   / expression <.+> TrailingGarbage EOT
//!                   / <.+> Unparseable EOT
//! expression       <- title_info (table_info / comment / empty_line)*
//! title_info       <- '#' space* 'Title:' space* <title> SetTitle (newline / !.)
//! table_info       <- table_name_info column_info* index_info*
//! comment          <- space* '//' comment_string newline?
//! empty_line       <- whitespace
//! table_name_info  <- <real_table_name> BeginTable space*
//!                     ('/' space* <table_name> SetTableDisplayName)? space* newline*
//! column_info      <- column_attribute (space* relation (space* relation)*)?
//!                     (newline? column_comment)* newline?
//! column_attribute <- space+ (<pkey> MarkPrimaryKey)? <real_column_name> BeginColumn
//!                     ('/' <column_name> SetColumnDisplayName)?
//!                     space+ '[' <col_type> SetColumnType ']'
//!                     (space* ( '[' notnull MarkNotNull ']'
//!                             / '[' unique MarkUnique ']'
//!                             / '[' '=' <default> SetColumnDefault ']'
//!                             / '[' <erd> ExcludeFromDiagram ']'))* newline?
//! relation         <- (<cardinality_left> SetRelationSource)? space* '--' space*
//!                     (<cardinality_right> SetRelationDest space)? space*
//!                     <relation_point> SetRelationTarget
//! column_comment   <- space+ '#' space? <comment_string> AddComment
//! index_info       <- space+ 'index'i space+ <real_column_name> BeginIndex space+
//!                     '(' space* <real_column_name> AddIndexColumn
//!                     (space* ',' space* <real_column_name> AddIndexColumn space*)*
//!                     space* ')' (space+ 'unique' MarkIndexUnique)? space* newline*
//! ```

use crate::matcher::{MatchResult, NoMatch, ParserState};
use crate::rule::{Action, Rule};

const LINE_BREAK: &str = "\r\n";
const CARDINALITY: &str = "01*";

/// Match `rule` at the current position.
pub fn match_rule(p: &mut ParserState, rule: Rule) -> MatchResult {
    match rule {
        Rule::Root => root(p),
        Rule::Eot => eot(p),
        Rule::Expression => expression(p),
        Rule::TitleInfo => title_info(p),
        Rule::TableInfo => table_info(p),
        Rule::Comment => comment(p),
        Rule::EmptyLine => empty_line(p),
        Rule::TableNameInfo => table_name_info(p),
        Rule::ColumnInfo => column_info(p),
        Rule::ColumnAttribute => column_attribute(p),
        Rule::Relation => relation(p),
        Rule::ColumnComment => column_comment(p),
        Rule::IndexInfo => index_info(p),
        Rule::Title => title(p),
        Rule::CommentString => comment_string(p),
        Rule::Whitespace => whitespace(p),
        Rule::Newline => newline(p),
        Rule::Space => space(p),
        Rule::NotNull => notnull(p),
        Rule::Unique => unique(p),
        Rule::Erd => erd(p),
        Rule::RealTableName => real_table_name(p),
        Rule::TableName => table_name(p),
        Rule::RealColumnName => real_column_name(p),
        Rule::ColumnName => column_name(p),
        Rule::RelationPoint => relation_point(p),
        Rule::Pkey => pkey(p),
        Rule::ColType => col_type(p),
        Rule::Default => default(p),
        Rule::CardinalityRight => cardinality_right(p),
        Rule::CardinalityLeft => cardinality_left(p),
        Rule::Cardinality => cardinality(p),
        // a capture only ever wraps another rule
        Rule::Capture => Err(NoMatch),
        Rule::Action(action) => p.action(action),
    }
}

pub fn root(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Root, |p| {
        p.choice(&[complete_document, document_with_trailer, opaque_document])
    })
}

fn complete_document(p: &mut ParserState) -> MatchResult {
    expression(p)?;
    eot(p)
}

fn document_with_trailer(p: &mut ParserState) -> MatchResult {
    expression(p)?;
    p.capture(|p| p.many1(|p| p.any()))?;
    p.action(Action::TrailingGarbage)?;
    eot(p)
}

fn opaque_document(p: &mut ParserState) -> MatchResult {
    p.capture(|p| p.many1(|p| p.any()))?;
    p.action(Action::Unparseable)?;
    eot(p)
}

pub fn eot(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Eot, |p| p.not(|p| p.any()))
}

pub fn expression(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Expression, |p| {
        title_info(p)?;
        p.many0(|p| p.choice(&[table_info, comment, empty_line]))
    })
}

pub fn title_info(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::TitleInfo, |p| {
        p.char('#')?;
        p.many0(space)?;
        p.literal("Title:")?;
        p.many0(space)?;
        p.capture(title)?;
        p.action(Action::SetTitle)?;
        line_end(p)
    })
}

/// A line break, or the end of the input.
fn line_end(p: &mut ParserState) -> MatchResult {
    if newline(p).is_ok() {
        return Ok(());
    }
    p.not(|p| p.any())
}

pub fn table_info(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::TableInfo, |p| {
        table_name_info(p)?;
        p.many0(column_info)?;
        p.many0(index_info)
    })
}

pub fn comment(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Comment, |p| {
        p.many0(space)?;
        p.literal("//")?;
        comment_string(p)?;
        p.optional(newline)
    })
}

pub fn empty_line(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::EmptyLine, whitespace)
}

pub fn table_name_info(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::TableNameInfo, |p| {
        p.capture(real_table_name)?;
        p.action(Action::BeginTable)?;
        p.many0(space)?;
        p.optional(|p| {
            p.char('/')?;
            p.many0(space)?;
            p.capture(table_name)?;
            p.action(Action::SetTableDisplayName)
        })?;
        p.many0(space)?;
        p.many0(newline)
    })
}

pub fn column_info(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::ColumnInfo, |p| {
        column_attribute(p)?;
        p.optional(|p| {
            p.many0(space)?;
            relation(p)?;
            p.many0(|p| {
                p.many0(space)?;
                relation(p)
            })
        })?;
        p.many0(|p| {
            p.optional(newline)?;
            column_comment(p)
        })?;
        p.optional(newline)
    })
}

pub fn column_attribute(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::ColumnAttribute, |p| {
        p.many1(space)?;
        p.optional(|p| {
            p.capture(pkey)?;
            p.action(Action::MarkPrimaryKey)
        })?;
        p.capture(real_column_name)?;
        p.action(Action::BeginColumn)?;
        p.optional(|p| {
            p.char('/')?;
            p.capture(column_name)?;
            p.action(Action::SetColumnDisplayName)
        })?;
        p.many1(space)?;
        p.char('[')?;
        p.capture(col_type)?;
        p.action(Action::SetColumnType)?;
        p.char(']')?;
        p.many0(|p| {
            p.many0(space)?;
            p.choice(&[
                not_null_attribute,
                unique_attribute,
                default_attribute,
                erd_attribute,
            ])
        })?;
        p.optional(newline)
    })
}

fn not_null_attribute(p: &mut ParserState) -> MatchResult {
    p.char('[')?;
    notnull(p)?;
    p.action(Action::MarkNotNull)?;
    p.char(']')
}

fn unique_attribute(p: &mut ParserState) -> MatchResult {
    p.char('[')?;
    unique(p)?;
    p.action(Action::MarkUnique)?;
    p.char(']')
}

fn default_attribute(p: &mut ParserState) -> MatchResult {
    p.char('[')?;
    p.char('=')?;
    p.capture(default)?;
    p.action(Action::SetColumnDefault)?;
    p.char(']')
}

fn erd_attribute(p: &mut ParserState) -> MatchResult {
    p.char('[')?;
    p.capture(erd)?;
    p.action(Action::ExcludeFromDiagram)?;
    p.char(']')
}

pub fn relation(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Relation, |p| {
        p.optional(|p| {
            p.capture(cardinality_left)?;
            p.action(Action::SetRelationSource)
        })?;
        p.many0(space)?;
        p.literal("--")?;
        p.many0(space)?;
        p.optional(|p| {
            p.capture(cardinality_right)?;
            p.action(Action::SetRelationDest)?;
            space(p)
        })?;
        p.many0(space)?;
        p.capture(relation_point)?;
        p.action(Action::SetRelationTarget)
    })
}

pub fn column_comment(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::ColumnComment, |p| {
        p.many1(space)?;
        p.char('#')?;
        p.optional(space)?;
        p.capture(comment_string)?;
        p.action(Action::AddComment)
    })
}

pub fn index_info(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::IndexInfo, |p| {
        p.many1(space)?;
        p.keyword("index")?;
        p.many1(space)?;
        p.capture(real_column_name)?;
        p.action(Action::BeginIndex)?;
        p.many1(space)?;
        p.char('(')?;
        p.many0(space)?;
        p.capture(real_column_name)?;
        p.action(Action::AddIndexColumn)?;
        p.many0(|p| {
            p.many0(space)?;
            p.char(',')?;
            p.many0(space)?;
            p.capture(real_column_name)?;
            p.action(Action::AddIndexColumn)?;
            p.many0(space)
        })?;
        p.many0(space)?;
        p.char(')')?;
        p.optional(|p| {
            p.many1(space)?;
            p.literal("unique")?;
            p.action(Action::MarkIndexUnique)
        })?;
        p.many0(space)?;
        p.many0(newline)
    })
}

pub fn title(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Title, |p| p.many1(|p| p.none_of(LINE_BREAK)))
}

pub fn comment_string(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::CommentString, |p| p.many0(|p| p.none_of(LINE_BREAK)))
}

pub fn whitespace(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Whitespace, |p| p.many1(|p| p.one_of(" \t\r\n")))
}

pub fn newline(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Newline, |p| p.many1(|p| p.one_of(LINE_BREAK)))
}

pub fn space(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Space, |p| p.many1(|p| p.one_of(" \t")))
}

pub fn notnull(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::NotNull, |p| p.literal("NN"))
}

pub fn unique(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Unique, |p| p.char('U'))
}

pub fn erd(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Erd, |p| p.literal("-erd"))
}

pub fn real_table_name(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::RealTableName, |p| p.many1(|p| p.word_char("")))
}

pub fn table_name(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::TableName, display_name)
}

pub fn real_column_name(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::RealColumnName, |p| p.many1(|p| p.word_char("")))
}

pub fn column_name(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::ColumnName, display_name)
}

/// Either `"quoted text"` or a bare run up to whitespace or `/`.
fn display_name(p: &mut ParserState) -> MatchResult {
    p.choice(&[quoted_display_name, bare_display_name])
}

fn quoted_display_name(p: &mut ParserState) -> MatchResult {
    p.char('"')?;
    p.many1(|p| p.none_of("\t\r\n\""))?;
    p.char('"')
}

fn bare_display_name(p: &mut ParserState) -> MatchResult {
    p.many1(|p| p.none_of("\t\r\n/ "))
}

pub fn relation_point(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::RelationPoint, |p| p.many1(|p| p.word_char(".")))
}

pub fn pkey(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Pkey, |p| p.one_of("+*"))
}

pub fn col_type(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::ColType, |p| p.many1(|p| p.word_char("() .,")))
}

pub fn default(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Default, |p| {
        p.many0(|p| p.choice(&[escaped_bracket, default_char]))
    })
}

fn escaped_bracket(p: &mut ParserState) -> MatchResult {
    p.literal("\\]")
}

fn default_char(p: &mut ParserState) -> MatchResult {
    p.none_of("\r\n]")
}

pub fn cardinality_right(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::CardinalityRight, cardinality)
}

pub fn cardinality_left(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::CardinalityLeft, cardinality)
}

/// `0`, `1` or `*`, optionally ranged as in `0..1` or `1..*`.
pub fn cardinality(p: &mut ParserState) -> MatchResult {
    p.rule(Rule::Cardinality, |p| {
        p.one_of(CARDINALITY)?;
        p.optional(|p| {
            p.any()?;
            p.any()?;
            p.one_of(CARDINALITY)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn run(rule: Rule, input: &str) -> (MatchResult, ParserState) {
        let mut p = ParserState::new(Source::new(input));
        let result = match_rule(&mut p, rule);
        (result, p)
    }

    fn consumed(rule: Rule, input: &str) -> Option<usize> {
        let (result, p) = run(rule, input);
        result.ok().map(|_| p.position())
    }

    fn actions(p: &ParserState) -> Vec<Action> {
        p.tokens()
            .iter()
            .filter_map(|t| match t.rule {
                Rule::Action(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_title_info() {
        assert_eq!(consumed(Rule::TitleInfo, "#Title: Shop\n\nusers"), Some(14));
        assert_eq!(consumed(Rule::TitleInfo, "# Title:Shop"), Some(12));
        assert_eq!(consumed(Rule::TitleInfo, "Title: Shop\n"), None);
    }

    #[test]
    fn test_cardinality_forms() {
        assert_eq!(consumed(Rule::Cardinality, "1"), Some(1));
        assert_eq!(consumed(Rule::Cardinality, "*"), Some(1));
        assert_eq!(consumed(Rule::Cardinality, "0..1"), Some(4));
        assert_eq!(consumed(Rule::Cardinality, "1..*"), Some(4));
        assert_eq!(consumed(Rule::Cardinality, "2"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(consumed(Rule::TableName, "\"Order Items\" rest"), Some(13));
        assert_eq!(consumed(Rule::TableName, "会員 rest"), Some(2));
        assert_eq!(consumed(Rule::ColumnName, "name/other"), Some(4));
    }

    #[test]
    fn test_column_type_allows_parens_and_spaces() {
        assert_eq!(consumed(Rule::ColType, "numeric(10, 2)]"), Some(14));
    }

    #[test]
    fn test_default_keeps_escaped_bracket() {
        assert_eq!(consumed(Rule::Default, "'[a\\]'] x"), Some(6));
    }

    #[test]
    fn test_column_attribute_actions_in_order() {
        let (result, p) = run(Rule::ColumnAttribute, "  +id/ID [int] [NN][U] [=0] [-erd]\n");
        assert!(result.is_ok());
        assert_eq!(
            actions(&p),
            vec![
                Action::MarkPrimaryKey,
                Action::BeginColumn,
                Action::SetColumnDisplayName,
                Action::SetColumnType,
                Action::MarkNotNull,
                Action::MarkUnique,
                Action::SetColumnDefault,
                Action::ExcludeFromDiagram,
            ]
        );
    }

    #[test]
    fn test_column_info_with_relation_and_comments() {
        let input = "  user_id [int] 0..* -- 1 users.id\n    # owner\n    # second line\n";
        let (result, p) = run(Rule::ColumnInfo, input);
        assert!(result.is_ok());
        assert_eq!(p.position(), input.chars().count());
        assert_eq!(
            actions(&p),
            vec![
                Action::BeginColumn,
                Action::SetColumnType,
                Action::SetRelationSource,
                Action::SetRelationDest,
                Action::SetRelationTarget,
                Action::AddComment,
                Action::AddComment,
            ]
        );
    }

    #[test]
    fn test_index_info() {
        let input = "  INDEX idx_name_email (name , email) unique\n";
        let (result, p) = run(Rule::IndexInfo, input);
        assert!(result.is_ok());
        assert_eq!(
            actions(&p),
            vec![
                Action::BeginIndex,
                Action::AddIndexColumn,
                Action::AddIndexColumn,
                Action::MarkIndexUnique,
            ]
        );
    }

    #[test]
    fn test_index_line_is_not_a_column() {
        assert_eq!(consumed(Rule::ColumnAttribute, "  index idx (a)\n"), None);
    }

    #[test]
    fn test_root_falls_back_to_opaque_document() {
        let (result, p) = run(Rule::Root, "no title here\n");
        assert!(result.is_ok());
        assert_eq!(actions(&p), vec![Action::Unparseable]);
    }

    #[test]
    fn test_root_fails_on_empty_input() {
        let (result, p) = run(Rule::Root, "");
        assert!(result.is_err());
        assert!(p.tokens().is_empty());
    }

    #[test]
    fn test_failed_alternatives_leave_no_tokens() {
        let (result, p) = run(Rule::Root, "#Title: T\nusers\n  id [int]\n%%%\n");
        assert!(result.is_ok());
        let acts = actions(&p);
        assert_eq!(acts.last(), Some(&Action::TrailingGarbage));
        // the first, failed, attempt at `expression EOT` must not leak its tokens
        assert_eq!(acts.iter().filter(|a| **a == Action::SetTitle).count(), 1);
    }
}

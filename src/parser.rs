use crate::ast::Node;
use crate::executor::{ExecuteError, Executor};
use crate::grammar::match_rule;
use crate::matcher::{FailureMark, ParserState};
use crate::model::Document;
use crate::rule::Rule;
use crate::source::{Source, TextPosition};
use crate::token::TokenStream;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Colour rule names in syntax trees and parse errors.
    pub pretty: bool,
    /// Lines shown before the offending one in error dumps.
    pub context_lines: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            context_lines: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("parse error near {near} ({start} - {end}): {text:?}")]
    NoMatch {
        near: String,
        mark: FailureMark,
        start: TextPosition,
        end: TextPosition,
        text: String,
    },
}

impl ParseError {
    pub fn mark(&self) -> FailureMark {
        match self {
            ParseError::NoMatch { mark, .. } => *mark,
        }
    }
}

pub struct Parser {
    state: ParserState,
    options: ParseOptions,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &str, options: ParseOptions) -> Self {
        Self {
            state: ParserState::new(Source::new(input)),
            options,
        }
    }

    /// Keep every rule failure of the next parse, see [`Parser::failure_trace`].
    pub fn with_failure_trace(mut self) -> Self {
        self.state = self.state.with_failure_trace();
        self
    }

    pub fn failure_trace(&self) -> &[FailureMark] {
        self.state.failure_trace()
    }

    pub fn parse(&mut self) -> Result<Parsed, ParseError> {
        self.parse_rule(Rule::Root)
    }

    /// Parse with `rule` as the start symbol. Unlike [`Parser::parse`] the
    /// rule need not consume the whole input.
    pub fn parse_rule(&mut self, rule: Rule) -> Result<Parsed, ParseError> {
        self.state.reset();
        let matched = match_rule(&mut self.state, rule);
        debug!(
            start = %rule,
            matched = matched.is_ok(),
            position = self.state.position(),
            tokens = self.state.tokens().len(),
            "match finished"
        );
        match matched {
            Ok(()) => Ok(Parsed {
                source: self.state.source().clone(),
                tokens: self.state.tokens().clone(),
                options: self.options.clone(),
            }),
            Err(_) => Err(self.error(rule)),
        }
    }

    fn error(&self, rule: Rule) -> ParseError {
        let source = self.state.source();
        let mark = self.state.failure().unwrap_or(FailureMark {
            rule,
            begin: 0,
            end: 0,
        });
        let near = if self.options.pretty {
            format!("\x1B[34m{}\x1B[m", mark.rule)
        } else {
            mark.rule.to_string()
        };
        ParseError::NoMatch {
            near,
            mark,
            start: source.position(mark.begin),
            end: source.position(mark.end),
            text: source.text(mark.begin, mark.end),
        }
    }
}

/// A successful match: the source and its committed token stream.
#[derive(Debug, Clone)]
pub struct Parsed {
    source: Source,
    tokens: TokenStream,
    options: ParseOptions,
}

impl Parsed {
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn syntax_tree(&self) -> Option<Node> {
        Node::build(&self.tokens)
    }

    pub fn print_syntax_tree(&self) -> String {
        self.syntax_tree()
            .map(|root| root.pretty_print(&self.source, self.options.pretty))
            .unwrap_or_default()
    }

    /// Replay the token stream into a document.
    ///
    /// Streams from [`Parser::parse`] always replay. A stream started below
    /// `table_info` (see [`Parser::parse_rule`]) has no open table for its
    /// column or index actions and fails with [`ExecuteError::NotOpen`].
    pub fn execute(&self) -> Result<Document, ExecuteError> {
        Executor::new(&self.source, self.options.context_lines).run(&self.tokens)
    }
}

//! Backtracking matcher over a code-point buffer.
//!
//! Every combinator takes a [`Checkpoint`] on entry and rewinds both the
//! position and the token stream to it when its body fails, so a failed
//! branch never leaves tokens behind. Repetitions commit each successful
//! iteration; lookaheads always rewind.

use crate::rule::{Action, Rule};
use crate::source::{END_OF_BUFFER, Source};
use crate::token::TokenStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoMatch;

pub type MatchResult = Result<(), NoMatch>;

/// A matcher that can be used as one alternative of [`ParserState::choice`].
pub type Matcher = fn(&mut ParserState) -> MatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub position: usize,
    pub token_index: usize,
}

/// Furthest point any failed rule got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureMark {
    pub rule: Rule,
    pub begin: usize,
    pub end: usize,
}

#[derive(Debug)]
pub struct ParserState {
    source: Source,
    position: usize,
    tokens: TokenStream,
    furthest: usize,
    failure: Option<FailureMark>,
    trace: Option<Vec<FailureMark>>,
}

impl ParserState {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            position: 0,
            tokens: TokenStream::new(),
            furthest: 0,
            failure: None,
            trace: None,
        }
    }

    /// Also keep every rule failure, not just the furthest one.
    pub fn with_failure_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Back to the initial state, keeping the source.
    pub fn reset(&mut self) {
        self.position = 0;
        self.tokens.trim(0);
        self.furthest = 0;
        self.failure = None;
        if let Some(trace) = &mut self.trace {
            trace.clear();
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn failure(&self) -> Option<FailureMark> {
        self.failure
    }

    pub fn failure_trace(&self) -> &[FailureMark] {
        self.trace.as_deref().unwrap_or_default()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            token_index: self.tokens.len(),
        }
    }

    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.tokens.trim(checkpoint.token_index);
    }

    #[inline]
    fn current(&self) -> u32 {
        self.source.at(self.position)
    }

    #[inline]
    fn advance(&mut self) {
        self.position += 1;
        if self.position > self.furthest {
            self.furthest = self.position;
        }
    }

    fn accept(&mut self, ok: bool) -> MatchResult {
        if ok {
            self.advance();
            Ok(())
        } else {
            Err(NoMatch)
        }
    }

    // -- primitives ---------------------------------------------------------

    /// Any code point except the end sentinel.
    pub fn any(&mut self) -> MatchResult {
        let ok = self.current() != END_OF_BUFFER;
        self.accept(ok)
    }

    pub fn char(&mut self, c: char) -> MatchResult {
        let ok = self.current() == u32::from(c);
        self.accept(ok)
    }

    pub fn range(&mut self, lower: char, upper: char) -> MatchResult {
        let c = self.current();
        let ok = c >= u32::from(lower) && c <= u32::from(upper);
        self.accept(ok)
    }

    pub fn one_of(&mut self, set: &str) -> MatchResult {
        let c = self.current();
        let ok = set.chars().any(|s| u32::from(s) == c);
        self.accept(ok)
    }

    /// Any code point outside `set`; never the end sentinel.
    pub fn none_of(&mut self, set: &str) -> MatchResult {
        let c = self.current();
        let ok = c != END_OF_BUFFER && !set.chars().any(|s| u32::from(s) == c);
        self.accept(ok)
    }

    /// `[A-Za-z0-9_]`, plus any extra code points in `extra`.
    pub fn word_char(&mut self, extra: &str) -> MatchResult {
        let ok = char::from_u32(self.current())
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || extra.contains(c));
        self.accept(ok)
    }

    pub fn literal(&mut self, text: &str) -> MatchResult {
        self.seq(|p| text.chars().try_for_each(|c| p.char(c)))
    }

    /// ASCII case-insensitive literal.
    pub fn keyword(&mut self, text: &str) -> MatchResult {
        self.seq(|p| {
            text.chars().try_for_each(|c| {
                let current = char::from_u32(p.current());
                let ok = current.is_some_and(|cur| cur.eq_ignore_ascii_case(&c));
                p.accept(ok)
            })
        })
    }

    // -- combinators --------------------------------------------------------

    pub fn seq(&mut self, body: impl FnOnce(&mut Self) -> MatchResult) -> MatchResult {
        let checkpoint = self.checkpoint();
        let result = body(self);
        if result.is_err() {
            self.rewind(checkpoint);
        }
        result
    }

    /// Ordered choice: the first alternative that matches wins.
    pub fn choice(&mut self, alternatives: &[Matcher]) -> MatchResult {
        for alternative in alternatives {
            if self.seq(*alternative).is_ok() {
                return Ok(());
            }
        }
        Err(NoMatch)
    }

    pub fn many0(&mut self, mut body: impl FnMut(&mut Self) -> MatchResult) -> MatchResult {
        loop {
            let checkpoint = self.checkpoint();
            if body(self).is_err() {
                self.rewind(checkpoint);
                return Ok(());
            }
            if self.position == checkpoint.position {
                // an empty iteration would repeat forever
                return Ok(());
            }
        }
    }

    pub fn many1(&mut self, mut body: impl FnMut(&mut Self) -> MatchResult) -> MatchResult {
        self.seq(&mut body)?;
        self.many0(body)
    }

    pub fn optional(&mut self, body: impl FnOnce(&mut Self) -> MatchResult) -> MatchResult {
        let _ = self.seq(body);
        Ok(())
    }

    /// Negative lookahead.
    pub fn not(&mut self, body: impl FnOnce(&mut Self) -> MatchResult) -> MatchResult {
        let checkpoint = self.checkpoint();
        let result = body(self);
        self.rewind(checkpoint);
        match result {
            Ok(()) => Err(NoMatch),
            Err(NoMatch) => Ok(()),
        }
    }

    /// Positive lookahead.
    pub fn peek(&mut self, body: impl FnOnce(&mut Self) -> MatchResult) -> MatchResult {
        let checkpoint = self.checkpoint();
        let result = body(self);
        self.rewind(checkpoint);
        result
    }

    /// Match a named rule, appending its token once the body succeeds.
    pub fn rule(
        &mut self,
        rule: Rule,
        body: impl FnOnce(&mut Self) -> MatchResult,
    ) -> MatchResult {
        let checkpoint = self.checkpoint();
        // measure how far this attempt alone gets
        let outer = self.furthest;
        self.furthest = checkpoint.position;
        let result = body(self);
        let reach = self.furthest;
        self.furthest = outer.max(reach);
        match result {
            Ok(()) => {
                self.tokens.add(rule, checkpoint.position, self.position);
                Ok(())
            }
            Err(NoMatch) => {
                self.rewind(checkpoint);
                self.record_failure(rule, checkpoint.position, reach);
                Err(NoMatch)
            }
        }
    }

    /// Expose the text consumed by `body` to the next action.
    pub fn capture(&mut self, body: impl FnOnce(&mut Self) -> MatchResult) -> MatchResult {
        self.rule(Rule::Capture, body)
    }

    /// Emit a zero-width action token. Never fails.
    pub fn action(&mut self, action: Action) -> MatchResult {
        self.tokens
            .add(Rule::Action(action), self.position, self.position);
        Ok(())
    }

    fn record_failure(&mut self, rule: Rule, begin: usize, reach: usize) {
        let mark = FailureMark {
            rule,
            begin,
            end: reach.max(begin),
        };
        if let Some(trace) = &mut self.trace {
            trace.push(mark);
        }
        let replace = match self.failure {
            None => true,
            Some(current) => mark.end > current.end,
        };
        if replace {
            self.failure = Some(mark);
        }
    }
}

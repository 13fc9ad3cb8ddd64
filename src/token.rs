use crate::rule::Rule;
use std::fmt;

const INITIAL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub rule: Rule,
    pub begin: usize,
    pub end: usize,
}

impl Token {
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// True if `other` lies entirely within this token's interval.
    pub fn contains(&self, other: &Token) -> bool {
        other.begin >= self.begin && other.end <= self.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.rule, self.begin, self.end)
    }
}

/// Append-only token buffer. Entries are only ever removed from the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl Default for TokenStream {
    fn default() -> Self {
        Self {
            tokens: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token and return its index.
    pub fn add(&mut self, rule: Rule, begin: usize, end: usize) -> usize {
        if self.tokens.len() == self.tokens.capacity() {
            // double, like the backing array always has
            let extra = self.tokens.capacity().max(INITIAL_CAPACITY);
            self.tokens.reserve_exact(extra);
        }
        self.tokens.push(Token { rule, begin, end });
        self.tokens.len() - 1
    }

    /// Drop every token at or after `len`.
    pub fn trim(&mut self, len: usize) {
        self.tokens.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            writeln!(f, "{}", token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Action;

    #[test]
    fn test_add_assigns_monotonic_indexes() {
        let mut stream = TokenStream::new();
        assert_eq!(stream.add(Rule::Space, 0, 1), 0);
        assert_eq!(stream.add(Rule::Newline, 1, 2), 1);
        assert_eq!(stream.add(Rule::Capture, 2, 4), 2);
        assert_eq!(stream.len(), 3);
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut stream = TokenStream::new();
        for i in 0..(INITIAL_CAPACITY * 3) {
            stream.add(Rule::Space, i, i + 1);
        }
        assert_eq!(stream.len(), INITIAL_CAPACITY * 3);
        assert_eq!(stream.as_slice()[INITIAL_CAPACITY * 2].begin, INITIAL_CAPACITY * 2);
    }

    #[test]
    fn test_trim_drops_tail_only() {
        let mut stream = TokenStream::new();
        stream.add(Rule::Space, 0, 1);
        stream.add(Rule::Action(Action::MarkUnique), 1, 1);
        stream.add(Rule::Space, 1, 3);
        stream.trim(1);
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.as_slice()[0].rule, Rule::Space);

        // trimming beyond the length is a no-op
        stream.trim(5);
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn test_display_lists_one_token_per_line() {
        let mut stream = TokenStream::new();
        stream.add(Rule::RealTableName, 0, 5);
        stream.add(Rule::Capture, 0, 5);
        assert_eq!(stream.to_string(), "real_table_name 0 5\ncapture 0 5\n");
    }

    #[test]
    fn test_contains() {
        let outer = Token { rule: Rule::TableInfo, begin: 2, end: 10 };
        let inner = Token { rule: Rule::Space, begin: 4, end: 6 };
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
    }
}

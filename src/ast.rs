//! Syntax tree rebuilt from a committed token stream.
//!
//! Rules emit their own token after their children, and a child's interval
//! always lies inside its parent's. One left-to-right pass with a stack of
//! open nodes is therefore enough: each token adopts every open node it
//! contains, then becomes open itself.

use crate::source::Source;
use crate::token::{Token, TokenStream};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub token: Token,
    pub children: Vec<Node>,
}

impl Node {
    /// Rebuild the forest of top-level nodes. Zero-width tokens are skipped.
    pub fn forest(tokens: &TokenStream) -> Vec<Node> {
        let mut stack: Vec<Node> = Vec::new();
        for token in tokens.iter().filter(|t| !t.is_empty()) {
            let split = stack
                .iter()
                .rposition(|open| !token.contains(&open.token))
                .map_or(0, |i| i + 1);
            let children = stack.split_off(split);
            stack.push(Node {
                token: *token,
                children,
            });
        }
        stack
    }

    /// The node covering the whole match: the last top-level node.
    pub fn build(tokens: &TokenStream) -> Option<Node> {
        Self::forest(tokens).pop()
    }

    /// One line per node: indentation by depth, the rule name and the quoted
    /// text it matched.
    pub fn pretty_print(&self, source: &Source, pretty: bool) -> String {
        let mut out = String::new();
        self.write_into(&mut out, source, pretty, 0);
        out
    }

    fn write_into(&self, out: &mut String, source: &Source, pretty: bool, depth: usize) {
        let text = source.text(self.token.begin, self.token.end);
        let indent = " ".repeat(depth);
        if pretty {
            writeln!(out, "{}\x1B[34m{}\x1B[m {:?}", indent, self.token.rule, text).unwrap();
        } else {
            writeln!(out, "{}{} {:?}", indent, self.token.rule, text).unwrap();
        }
        for child in &self.children {
            child.write_into(out, source, pretty, depth + 1);
        }
    }
}

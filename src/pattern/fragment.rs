//! Rendering slices of the rewritten token tree as standalone host
//! patterns.
//!
//! Host group numbers inside a fragment differ from those in the full
//! pattern, so capturing groups are renumbered as they are written and
//! backreferences follow them. A backreference whose group lies outside the
//! fragment is replaced by the text that group last captured.

use std::collections::HashMap;
use std::fmt::Write;

use crate::groups::GroupRegistry;
use crate::rewrite::host_literal;
use crate::syntax::token::{BackrefTarget, Token, TokenKind};

use super::recovery::Captures;

pub(super) struct FragmentWriter<'a> {
    registry: &'a GroupRegistry,
    captures: &'a Captures<'a>,
    out: String,
    /// Raw index to group number within this fragment.
    local: HashMap<usize, usize>,
    next_ordinal: usize,
}

impl<'a> FragmentWriter<'a> {
    pub fn new(registry: &'a GroupRegistry, captures: &'a Captures<'a>) -> Self {
        Self {
            registry,
            captures,
            out: String::new(),
            local: HashMap::new(),
            next_ordinal: 0,
        }
    }

    /// Write `tokens` as one non-capturing group, case-folded when the
    /// first token was.
    pub fn piece(&mut self, tokens: &[Token]) -> &mut Self {
        let Some(first) = tokens.first() else {
            return self;
        };
        self.out
            .push_str(if first.options.ignore_case { "(?i:" } else { "(?:" });
        for token in tokens {
            self.token(token);
        }
        self.out.push(')');
        self
    }

    /// `(?=pieces... end)`, or nothing when there is nothing to assert.
    pub fn lookahead(&mut self, pieces: &[&[Token]], end: &str) -> &mut Self {
        if pieces.iter().all(|p| p.is_empty()) && end.is_empty() {
            return self;
        }
        self.out.push_str("(?=");
        for piece in pieces {
            self.piece(piece);
        }
        self.out.push_str(end);
        self.out.push(')');
        self
    }

    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    pub fn finish(&mut self) -> String {
        self.local.clear();
        self.next_ordinal = 0;
        std::mem::take(&mut self.out)
    }

    fn token(&mut self, token: &Token) {
        if let TokenKind::Backreference(target) = &token.kind {
            self.backreference(target);
            return;
        }
        self.out.push_str(&token.text);
        if token.kind == TokenKind::Group
            && let Some(raw) = token.group
            && self.registry.get(raw).is_some_and(|g| g.is_capturing())
        {
            self.next_ordinal += 1;
            self.local.insert(raw, self.next_ordinal);
        }
        for child in &token.children {
            self.token(child);
        }
        self.out.push_str(&token.suffix);
    }

    fn backreference(&mut self, target: &BackrefTarget) {
        let Some(raw) = target.resolved else {
            self.out.push_str("(?!)");
            return;
        };
        if let Some(ordinal) = self.local.get(&raw) {
            let _ = write!(self.out, r"(?:\{ordinal})");
        } else if let Some(value) = self.captures.last_value(raw) {
            let _ = write!(self.out, "(?:{})", host_literal(value));
        } else {
            // The group has not taken part in the match, so the reference
            // cannot match.
            self.out.push_str("(?!)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::options::RegexOptions;

    fn render(pattern: &str, options: RegexOptions, pick: impl Fn(&[Token]) -> &[Token]) -> String {
        let compiled = Engine::new().compile(pattern, options).unwrap();
        let program = compiled.program();
        let captures = Captures::new("");
        let mut writer = FragmentWriter::new(&program.registry, &captures);
        writer.piece(pick(&program.tokens));
        writer.finish()
    }

    #[test]
    fn groups_are_renumbered_locally() {
        let out = render(r"(a)(b)\2", RegexOptions::default(), |t| &t[1..]);
        assert_eq!(out, r"(?:(b)(?:\1))");
    }

    #[test]
    fn outside_reference_without_capture_never_matches() {
        let out = render(r"(a)?b\1", RegexOptions::default(), |t| &t[2..]);
        assert_eq!(out, "(?:b(?!))");
    }

    #[test]
    fn outside_reference_uses_last_capture() {
        let compiled = Engine::new().compile(r"(a.)b\1", RegexOptions::default()).unwrap();
        let program = compiled.program();
        let mut captures = Captures::new("a+b");
        captures.record(1, 0, 2);
        let mut writer = FragmentWriter::new(&program.registry, &captures);
        writer.piece(&program.tokens[1..]);
        assert_eq!(writer.finish(), r"(?:b(?:a\+))");
    }

    #[test]
    fn case_folding_follows_the_first_token() {
        let out = render("ab", RegexOptions::new().ignore_case(true), |t| &t[1..]);
        assert_eq!(out, "(?i:ab)");
    }

    #[test]
    fn empty_lookahead_is_omitted() {
        let compiled = Engine::new().compile("a", RegexOptions::default()).unwrap();
        let program = compiled.program();
        let captures = Captures::new("");
        let mut writer = FragmentWriter::new(&program.registry, &captures);
        writer.piece(&program.tokens).lookahead(&[&[]], "");
        assert_eq!(writer.finish(), "(?:a)");
        writer.piece(&program.tokens).lookahead(&[&[]], r"\z");
        assert_eq!(writer.finish(), r"(?:a)(?=\z)");
    }
}

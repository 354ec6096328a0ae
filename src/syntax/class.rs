//! Character classes: `[...]`, `[^...]`, and .NET subtraction `[a-z-[aeiou]]`.
//!
//! The tokenizer uses [`parse_class`] to find the end of a class and reject
//! malformed ones; the rewriter uses [`ParsedClass::to_host`] to re-emit the
//! class in host syntax.

use crate::error::{PatternSyntaxError, SyntaxErrorKind, syntax};

use super::escape::{self, ScannedEscape, char_at};
use super::token::ClassEscape;

#[derive(Debug, Clone, PartialEq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Escape(ClassEscape),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClass {
    pub negated: bool,
    pub items: Vec<ClassItem>,
    pub subtraction: Option<Box<ParsedClass>>,
    /// Offset just past the closing `]`.
    pub end: usize,
}

/// Parse the class whose `[` sits at `start`.
pub fn parse_class(src: &str, start: usize) -> Result<ParsedClass, PatternSyntaxError> {
    ClassParser { src, pos: start + 1 }.parse(start)
}

struct ClassParser<'a> {
    src: &'a str,
    pos: usize,
}

/// One scanned element before ranges are formed.
enum Atom {
    Char(char),
    Escape(ClassEscape),
}

impl ClassParser<'_> {
    fn peek(&self) -> Option<char> {
        char_at(self.src, self.pos)
    }

    fn peek_second(&self) -> Option<char> {
        let c = self.peek()?;
        char_at(self.src, self.pos + c.len_utf8())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn parse(&mut self, start: usize) -> Result<ParsedClass, PatternSyntaxError> {
        let unterminated = || syntax(SyntaxErrorKind::UnterminatedCharClass, start);
        let negated = if self.peek() == Some('^') {
            self.bump();
            true
        } else {
            false
        };
        let mut items = Vec::new();
        let mut subtraction = None;
        let mut first = true;
        loop {
            let c = self.peek().ok_or_else(unterminated)?;
            if c == ']' && !first {
                self.bump();
                break;
            }
            if subtraction.is_some() {
                return Err(syntax(SyntaxErrorKind::SubtractionMustBeLast, self.pos));
            }
            if c == '-' && !first && self.peek_second() == Some('[') {
                self.bump();
                subtraction = Some(Box::new(self.parse_subtraction()?));
                continue;
            }
            first = false;
            let atom_at = self.pos;
            let atom = self.scan_atom()?;
            if self.peek() == Some('-') {
                match self.peek_second() {
                    Some('[') => {
                        push_atom(&mut items, atom);
                        self.bump();
                        subtraction = Some(Box::new(self.parse_subtraction()?));
                        continue;
                    }
                    Some(']') | None => {
                        push_atom(&mut items, atom);
                        continue;
                    }
                    Some(_) => {
                        self.bump();
                        let hi_at = self.pos;
                        let hi = self.scan_atom()?;
                        match (atom, hi) {
                            (Atom::Char(lo), Atom::Char(hi)) => {
                                if lo > hi {
                                    return Err(syntax(SyntaxErrorKind::ReversedCharRange, atom_at));
                                }
                                items.push(ClassItem::Range(lo, hi));
                            }
                            (Atom::Escape(_), _) => {
                                return Err(syntax(SyntaxErrorKind::RangeWithClassEscape, atom_at));
                            }
                            (_, Atom::Escape(_)) => {
                                return Err(syntax(SyntaxErrorKind::RangeWithClassEscape, hi_at));
                            }
                        }
                        continue;
                    }
                }
            }
            push_atom(&mut items, atom);
        }
        Ok(ParsedClass {
            negated,
            items,
            subtraction,
            end: self.pos,
        })
    }

    /// Parse the subtraction class whose `[` is under the cursor.
    fn parse_subtraction(&mut self) -> Result<ParsedClass, PatternSyntaxError> {
        let start = self.pos;
        let parsed = ClassParser {
            src: self.src,
            pos: start + 1,
        }
        .parse(start)?;
        self.pos = parsed.end;
        Ok(parsed)
    }

    fn scan_atom(&mut self) -> Result<Atom, PatternSyntaxError> {
        let at = self.pos;
        match self.bump() {
            None => Err(syntax(SyntaxErrorKind::UnterminatedCharClass, at)),
            Some('\\') => {
                let (escape, end) = escape::scan_escape(self.src, at, true)?;
                self.pos = end;
                Ok(match escape {
                    ScannedEscape::Char(kind) => Atom::Char(code_point_char(kind.code_point())),
                    ScannedEscape::Class(class) => Atom::Escape(class),
                })
            }
            Some(c) => Ok(Atom::Char(c)),
        }
    }
}

fn push_atom(items: &mut Vec<ClassItem>, atom: Atom) {
    items.push(match atom {
        Atom::Char(c) => ClassItem::Char(c),
        Atom::Escape(e) => ClassItem::Escape(e),
    });
}

pub(crate) fn code_point_char(cp: u32) -> char {
    char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
}

impl ParsedClass {
    /// Re-emit the class in host syntax.
    pub fn to_host(&self) -> String {
        let mut base = String::from("[");
        if self.negated {
            base.push('^');
        }
        for item in &self.items {
            match item {
                ClassItem::Char(c) => push_class_char(&mut base, *c),
                ClassItem::Range(lo, hi) => {
                    push_class_char(&mut base, *lo);
                    base.push('-');
                    push_class_char(&mut base, *hi);
                }
                ClassItem::Escape(e) => push_class_escape(&mut base, e),
            }
        }
        base.push(']');
        match &self.subtraction {
            None => base,
            Some(sub) => format!("[{base}&&[^{}]]", sub.to_host()),
        }
    }
}

/// A class member as host text; anything but letters, digits and non-ASCII
/// text goes through a hex escape so it cannot be read as class syntax.
pub(crate) fn push_class_char(out: &mut String, c: char) {
    if c.is_alphanumeric() || (!c.is_ascii() && !c.is_control() && !c.is_whitespace()) {
        out.push(c);
    } else {
        push_hex(out, c as u32);
    }
}

pub(crate) fn push_hex(out: &mut String, cp: u32) {
    out.push_str(&format!("\\x{{{cp:X}}}"));
}

/// A class escape as host text, usable inside a host class.
pub(crate) fn push_class_escape(out: &mut String, escape: &ClassEscape) {
    match escape {
        ClassEscape::Digit { negated } => out.push_str(if *negated { r"\D" } else { r"\d" }),
        ClassEscape::Word { negated } => out.push_str(if *negated { r"\W" } else { r"\w" }),
        ClassEscape::Space { negated } => out.push_str(if *negated { r"\S" } else { r"\s" }),
        ClassEscape::Category { name, negated } => match escape::block_range(name) {
            Some((lo, hi)) => {
                out.push('[');
                if *negated {
                    out.push('^');
                }
                push_hex(out, lo);
                out.push('-');
                push_hex(out, hi);
                out.push(']');
            }
            None => {
                out.push_str(if *negated { r"\P{" } else { r"\p{" });
                out.push_str(name);
                out.push('}');
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ParsedClass {
        parse_class(src, 0).expect("class should parse")
    }

    fn err(src: &str) -> SyntaxErrorKind {
        parse_class(src, 0).expect_err("class should fail").kind
    }

    #[test]
    fn simple_range() {
        let c = parse("[a-z]");
        assert_eq!(c.items, vec![ClassItem::Range('a', 'z')]);
        assert_eq!(c.end, 5);
        assert_eq!(c.to_host(), "[a-z]");
    }

    #[test]
    fn leading_bracket_is_literal() {
        let c = parse("[]a]");
        assert_eq!(c.items, vec![ClassItem::Char(']'), ClassItem::Char('a')]);
        assert_eq!(c.to_host(), r"[\x{5D}a]");
    }

    #[test]
    fn open_bracket_inside_is_literal() {
        let c = parse("[[x]");
        assert_eq!(c.items, vec![ClassItem::Char('['), ClassItem::Char('x')]);
        assert_eq!(c.to_host(), r"[\x{5B}x]");
    }

    #[test]
    fn trailing_dash_is_literal() {
        let c = parse("[a-]");
        assert_eq!(c.items, vec![ClassItem::Char('a'), ClassItem::Char('-')]);
    }

    #[test]
    fn negated_with_escapes() {
        let c = parse(r"[^\d\s_]");
        assert!(c.negated);
        assert_eq!(c.to_host(), r"[^\d\s\x{5F}]");
    }

    #[test]
    fn subtraction() {
        let c = parse("[a-z-[aeiou]]");
        assert_eq!(c.end, 13);
        assert!(c.subtraction.is_some());
        assert_eq!(c.to_host(), "[[a-z]&&[^[aeiou]]]");
    }

    #[test]
    fn block_names_become_ranges() {
        let c = parse(r"[\p{IsGreek}x]");
        assert_eq!(c.to_host(), r"[[\x{370}-\x{3FF}]x]");
    }

    #[test]
    fn backspace_escape() {
        assert_eq!(parse(r"[\b]").items, vec![ClassItem::Char('\u{8}')]);
    }

    #[test]
    fn errors() {
        assert_eq!(err("[abc"), SyntaxErrorKind::UnterminatedCharClass);
        assert_eq!(err("[z-a]"), SyntaxErrorKind::ReversedCharRange);
        assert_eq!(err(r"[\d-z]"), SyntaxErrorKind::RangeWithClassEscape);
        assert_eq!(err("[a-[b]c]"), SyntaxErrorKind::SubtractionMustBeLast);
    }
}

//! Backslash escapes: scanning the character and class escapes shared by the
//! tokenizer and the character-class scanner, and the late pass that decides
//! whether a multi-digit `\NN` is a backreference or an octal code.

use crate::error::{PatternSyntaxError, SyntaxErrorKind, syntax};
use crate::groups::SlotTable;

use super::char_table::{self, PropertyName};
use super::token::{ClassEscape, EscapeKind, GroupRef, Token, TokenKind};

/// A scanned escape that is not an anchor or backreference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedEscape {
    Char(EscapeKind),
    Class(ClassEscape),
}

pub(crate) fn char_at(src: &str, pos: usize) -> Option<char> {
    src.get(pos..).and_then(|s| s.chars().next())
}

/// Scan the escape whose backslash sits at `start`.
///
/// Returns the escape and the offset just past it. `in_class` selects the
/// character-class reading of `\b` (backspace) and of `\1`..`\7` (octal).
pub(crate) fn scan_escape(
    src: &str,
    start: usize,
    in_class: bool,
) -> Result<(ScannedEscape, usize), PatternSyntaxError> {
    let at = start + 1;
    let c = char_at(src, at).ok_or_else(|| syntax(SyntaxErrorKind::DanglingEscape, start))?;
    let next = at + c.len_utf8();
    let class = |e: ClassEscape| Ok((ScannedEscape::Class(e), next));
    match c {
        'd' | 'D' => class(ClassEscape::Digit {
            negated: c == 'D',
        }),
        'w' | 'W' => class(ClassEscape::Word {
            negated: c == 'W',
        }),
        's' | 'S' => class(ClassEscape::Space {
            negated: c == 'S',
        }),
        'p' | 'P' => {
            let (name, end) = scan_property(src, next, start)?;
            Ok((
                ScannedEscape::Class(ClassEscape::Category {
                    name,
                    negated: c == 'P',
                }),
                end,
            ))
        }
        't' | 'n' | 'r' | 'f' | 'v' | 'a' | 'e' => {
            Ok((ScannedEscape::Char(EscapeKind::Named(c)), next))
        }
        'b' if in_class => Ok((ScannedEscape::Char(EscapeKind::Named('b')), next)),
        'x' => {
            let (value, end) = scan_hex(src, next, 2, SyntaxErrorKind::InsufficientHexDigits, start)?;
            Ok((ScannedEscape::Char(EscapeKind::Hex(value)), end))
        }
        'u' => {
            let (value, end) =
                scan_hex(src, next, 4, SyntaxErrorKind::InsufficientUnicodeDigits, start)?;
            Ok((ScannedEscape::Char(EscapeKind::Unicode(value)), end))
        }
        'c' => {
            let letter = char_at(src, next)
                .ok_or_else(|| syntax(SyntaxErrorKind::MissingControlChar, start))?;
            let upper = letter.to_ascii_uppercase();
            if !('@'..='_').contains(&upper) {
                return Err(syntax(SyntaxErrorKind::UnrecognizedControlChar(letter), start));
            }
            Ok((
                ScannedEscape::Char(EscapeKind::Control(upper as u32 - '@' as u32)),
                next + letter.len_utf8(),
            ))
        }
        '0' => {
            let (value, end) = scan_octal(src, at);
            Ok((ScannedEscape::Char(EscapeKind::Octal(value)), end))
        }
        '1'..='7' if in_class => {
            let (value, end) = scan_octal(src, at);
            Ok((ScannedEscape::Char(EscapeKind::Octal(value)), end))
        }
        c if char_table::is_word_char(c) => Err(syntax(SyntaxErrorKind::UnrecognizedEscape(c), start)),
        c => Ok((ScannedEscape::Char(EscapeKind::Meta(c)), next)),
    }
}

/// Up to three octal digits starting at `at`, masked to a byte.
pub(crate) fn scan_octal(src: &str, at: usize) -> (u32, usize) {
    let mut value = 0u32;
    let mut end = at;
    for c in src[at..].chars().take(3) {
        match c.to_digit(8) {
            Some(d) => {
                value = value * 8 + d;
                end += 1;
            }
            None => break,
        }
    }
    (value & 0xFF, end)
}

fn scan_hex(
    src: &str,
    at: usize,
    digits: usize,
    kind: SyntaxErrorKind,
    start: usize,
) -> Result<(u32, usize), PatternSyntaxError> {
    let text = src.get(at..).unwrap_or("");
    let hex: Vec<u32> = text.chars().take(digits).map_while(|c| c.to_digit(16)).collect();
    if hex.len() < digits {
        return Err(syntax(kind, start));
    }
    let value = hex.iter().fold(0u32, |acc, d| acc * 16 + d);
    Ok((value, at + digits))
}

fn scan_property(src: &str, at: usize, start: usize) -> Result<(String, usize), PatternSyntaxError> {
    if char_at(src, at) != Some('{') {
        return Err(syntax(SyntaxErrorKind::MalformedCategory, start));
    }
    let body = &src[at + 1..];
    let close = body
        .find('}')
        .ok_or_else(|| syntax(SyntaxErrorKind::MalformedCategory, start))?;
    let name = &body[..close];
    if name.is_empty() {
        return Err(syntax(SyntaxErrorKind::MalformedCategory, start));
    }
    if char_table::lookup_property(name).is_none() {
        return Err(syntax(SyntaxErrorKind::UnknownCategory(name.to_string()), start));
    }
    Ok((name.to_string(), at + 1 + close + 1))
}

/// Resolve every `\N` backreference against the slot table.
///
/// A multi-digit `\NN` naming no slot is re-read as an octal escape followed
/// by literal digits; anything else naming no slot is an error.
pub fn resolve_numeric_escapes(
    tokens: &mut Vec<Token>,
    slots: &SlotTable,
) -> Result<(), PatternSyntaxError> {
    let mut out = Vec::with_capacity(tokens.len());
    for mut token in tokens.drain(..) {
        if !token.children.is_empty() {
            resolve_numeric_escapes(&mut token.children, slots)?;
        }
        match &token.kind {
            TokenKind::Backreference(target) => {
                let exists = match &target.name {
                    GroupRef::Number(n) => slots.contains_number(*n),
                    GroupRef::Name(name) => slots.number_for_name(name).is_some(),
                };
                if exists {
                    out.push(token);
                } else if target.ambiguous {
                    out.extend(reread_as_octal(&token)?);
                } else {
                    return Err(syntax(
                        SyntaxErrorKind::UndefinedGroupReference(target.name.to_string()),
                        token.offset,
                    ));
                }
            }
            _ => out.push(token),
        }
    }
    *tokens = out;
    Ok(())
}

fn reread_as_octal(token: &Token) -> Result<Vec<Token>, PatternSyntaxError> {
    let digits = &token.text[1..];
    let first = digits.chars().next().unwrap_or('0');
    if first.to_digit(8).is_none() {
        return Err(syntax(SyntaxErrorKind::UnrecognizedEscape(first), token.offset));
    }
    let (value, end) = scan_octal(&token.text, 1);
    let mut parts = vec![Token::leaf(
        TokenKind::EscapedChar(EscapeKind::Octal(value)),
        token.offset,
        &token.text[..end],
        token.options,
    )];
    if end < token.text.len() {
        parts.push(Token::leaf(
            TokenKind::Literal,
            token.offset + end,
            &token.text[end..],
            token.options,
        ));
    }
    Ok(parts)
}

/// True when `name` is a `\p{...}` Unicode block rather than a category.
pub(crate) fn block_range(name: &str) -> Option<(u32, u32)> {
    match char_table::lookup_property(name) {
        Some(PropertyName::Block(lo, hi)) => Some((lo, hi)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Result<(ScannedEscape, usize), PatternSyntaxError> {
        scan_escape(src, 0, false)
    }

    #[test]
    fn named_and_meta() {
        assert_eq!(
            scan(r"\t").unwrap(),
            (ScannedEscape::Char(EscapeKind::Named('t')), 2)
        );
        assert_eq!(
            scan(r"\.").unwrap(),
            (ScannedEscape::Char(EscapeKind::Meta('.')), 2)
        );
    }

    #[test]
    fn hex_needs_two_digits() {
        assert_eq!(
            scan(r"\x41").unwrap(),
            (ScannedEscape::Char(EscapeKind::Hex(0x41)), 4)
        );
        assert_eq!(
            scan(r"\x4").unwrap_err().kind,
            SyntaxErrorKind::InsufficientHexDigits
        );
        assert_eq!(
            scan(r"\u12").unwrap_err().kind,
            SyntaxErrorKind::InsufficientUnicodeDigits
        );
    }

    #[test]
    fn control_and_octal() {
        assert_eq!(
            scan(r"\cA").unwrap(),
            (ScannedEscape::Char(EscapeKind::Control(1)), 3)
        );
        assert_eq!(
            scan(r"\012").unwrap(),
            (ScannedEscape::Char(EscapeKind::Octal(0o12)), 4)
        );
        assert_eq!(scan(r"\c").unwrap_err().kind, SyntaxErrorKind::MissingControlChar);
    }

    #[test]
    fn categories_are_checked() {
        assert!(matches!(
            scan(r"\p{Lu}").unwrap().0,
            ScannedEscape::Class(ClassEscape::Category { .. })
        ));
        assert_eq!(
            scan(r"\p{Nope}").unwrap_err().kind,
            SyntaxErrorKind::UnknownCategory("Nope".into())
        );
        assert_eq!(scan(r"\pL").unwrap_err().kind, SyntaxErrorKind::MalformedCategory);
    }

    #[test]
    fn dangling_and_unknown() {
        assert_eq!(scan("\\").unwrap_err().kind, SyntaxErrorKind::DanglingEscape);
        assert_eq!(
            scan(r"\q").unwrap_err().kind,
            SyntaxErrorKind::UnrecognizedEscape('q')
        );
    }

    #[test]
    fn class_reading_of_b_and_digits() {
        assert_eq!(
            scan_escape(r"\b", 0, true).unwrap().0,
            ScannedEscape::Char(EscapeKind::Named('b'))
        );
        assert_eq!(
            scan_escape(r"\12", 0, true).unwrap().0,
            ScannedEscape::Char(EscapeKind::Octal(0o12))
        );
    }
}

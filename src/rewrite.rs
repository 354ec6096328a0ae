//! Dialect rewriting: turn a .NET token tree into one the host engine reads
//! the same way, and record what the host pattern cannot say by itself.

use crate::error::{CompileError, NotSupportedKind, SyntaxErrorKind, not_supported, syntax};
use crate::groups::registry::{GroupKind, GroupRegistry};
use crate::groups::slots::{self, SlotTable};
use crate::options::{CompileFlags, RegexOptions};
use crate::syntax::class::{self, push_class_escape, push_hex};
use crate::syntax::token::*;

/// Rewrite `tokens` in place for the host engine.
///
/// Assigns host ordinals to the capturing descriptors in `registry` and
/// resolves every backreference to the raw index of its target.
pub fn rewrite(
    tokens: &mut Vec<Token>,
    registry: &mut GroupRegistry,
    slots: &SlotTable,
    options: RegexOptions,
) -> Result<CompileFlags, CompileError> {
    let mut ordinal = 0;
    for group in registry.iter_mut() {
        if group.is_capturing() {
            ordinal += 1;
            group.host_ordinal = Some(ordinal);
        }
    }

    let mut rewriter = Rewriter {
        registry,
        slots,
        flags: CompileFlags::from_options(options),
        open: Vec::new(),
        top_level_alternation: tokens.iter().any(|t| t.kind == TokenKind::Alternation),
    };
    let taken = std::mem::take(tokens);
    *tokens = rewriter.rewrite_sequence(taken, 0)?;
    if options.ignore_case {
        tokens.insert(0, Token::leaf(TokenKind::TempGroup, 0, "(?i)", options));
    }
    Ok(rewriter.flags)
}

struct Rewriter<'a> {
    registry: &'a GroupRegistry,
    slots: &'a SlotTable,
    flags: CompileFlags,
    /// Raw indices of the descriptors enclosing the current token.
    open: Vec<usize>,
    top_level_alternation: bool,
}

/// Where a token sits relative to the start of its top-level alternative.
#[derive(Clone, Copy)]
struct Position {
    /// First meaningful token of a top-level alternative.
    leading: bool,
    /// ... and that alternative is the first one.
    pattern_start: bool,
}

impl Rewriter<'_> {
    fn rewrite_sequence(&mut self, tokens: Vec<Token>, depth: usize) -> Result<Vec<Token>, CompileError> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut position = Position {
            leading: depth == 0,
            pattern_start: depth == 0,
        };
        for token in tokens {
            let transparent = token.kind == TokenKind::Comment || token.is_bare_options();
            let alternation = token.kind == TokenKind::Alternation;
            if let Some(token) = self.rewrite_token(token, depth, position)? {
                out.push(token);
            }
            if alternation && depth == 0 {
                position = Position {
                    leading: true,
                    pattern_start: false,
                };
            } else if !transparent {
                position.leading = false;
                position.pattern_start = false;
            }
        }
        Ok(out)
    }

    /// `None` when the token disappears from the host pattern.
    fn rewrite_token(
        &mut self,
        mut token: Token,
        depth: usize,
        position: Position,
    ) -> Result<Option<Token>, CompileError> {
        let options = token.options;
        if let TokenKind::Backreference(target) = &mut token.kind {
            // The host compares backreferenced text exactly.
            if options.ignore_case {
                let label = target.name.to_string();
                return Err(
                    not_supported(NotSupportedKind::CaseInsensitiveBackreference(label), token.offset).into(),
                );
            }
            let (raw_index, ordinal) = self.resolve_backreference(target, token.offset)?;
            target.resolved = Some(raw_index);
            token.text = format!(r"(?:\{ordinal})");
            token.length = token.text.len();
            return Ok(Some(token));
        }
        let text = match &token.kind {
            TokenKind::Comment => return Ok(None),
            TokenKind::Literal => host_literal(&token.text),
            TokenKind::EscapedChar(kind) => escaped_char(kind),
            TokenKind::EscapedCharClass(escape) => {
                let mut out = String::new();
                push_class_escape(&mut out, escape);
                out
            }
            TokenKind::CharGroup => class::parse_class(&token.text, 0)
                .map_err(|e| syntax(e.kind, token.offset + e.offset))?
                .to_host(),
            TokenKind::AnyChar => {
                if options.singleline {
                    r"(?:.|\r|\n)".to_string()
                } else {
                    r"(?:.|\r)".to_string()
                }
            }
            TokenKind::Anchor(Anchor::Start) => {
                if !position.leading {
                    self.flags.always_fails = true;
                }
                if options.multiline {
                    r"(?:^|(?<=\n))".to_string()
                } else {
                    "^".to_string()
                }
            }
            TokenKind::Anchor(Anchor::End) => {
                self.flags.has_multiline_end_anchor = true;
                if options.multiline {
                    r"(?=\r?\n|\r?\z)".to_string()
                } else {
                    r"(?=\z)".to_string()
                }
            }
            TokenKind::EscapedAnchor(anchor) => match anchor {
                EscapedAnchor::StartOfInput => {
                    if !position.leading {
                        self.flags.always_fails = true;
                    } else if position.pattern_start && !self.top_level_alternation {
                        self.flags.must_capture_first_char = true;
                    }
                    "^".to_string()
                }
                EscapedAnchor::EndOfInputOrNewline => r"(?=\n?\z)".to_string(),
                EscapedAnchor::EndOfInput => r"(?=\z)".to_string(),
                EscapedAnchor::Contiguous => {
                    if !position.pattern_start || self.top_level_alternation {
                        return Err(
                            not_supported(NotSupportedKind::ContiguousAnchorPosition, token.offset).into(),
                        );
                    }
                    self.flags.is_contiguous_anchor = true;
                    String::new()
                }
                EscapedAnchor::WordBoundary => r"\b".to_string(),
                EscapedAnchor::NonWordBoundary => r"\B".to_string(),
            },
            TokenKind::Backreference(_) => token.text.clone(),
            TokenKind::Quantifier(_) | TokenKind::Alternation => token.text.clone(),
            TokenKind::AlternationGroup => {
                return Err(not_supported(NotSupportedKind::ConditionalGroup, token.offset).into());
            }
            TokenKind::Group => return self.rewrite_group(token, depth).map(Some),
            TokenKind::GroupConstruct(_)
            | TokenKind::GroupConstructName(_)
            | TokenKind::GroupConstructImnsx(_)
            | TokenKind::TempGroup => token.text.clone(),
        };
        if matches!(
            token.kind,
            TokenKind::EscapedAnchor(EscapedAnchor::Contiguous)
        ) {
            token.kind = TokenKind::TempGroup;
        }
        token.text = text;
        token.length = token.text.len();
        Ok(Some(token))
    }

    fn rewrite_group(&mut self, token: Token, depth: usize) -> Result<Token, CompileError> {
        let construct = token.construct().cloned();
        let Token {
            offset,
            options,
            group,
            mut children,
            ..
        } = token;
        if construct.is_some() {
            children.remove(0);
        }

        let mut head = Vec::new();
        match construct.as_ref().map(|c| c.kind.clone()) {
            Some(TokenKind::GroupConstructImnsx(inline)) => {
                let prefix = match inline.delta.ignore_case() {
                    Some(true) => "(?i",
                    Some(false) => "(?-i",
                    None => "(?",
                };
                if !inline.scoped {
                    let text = if prefix == "(?" {
                        String::new()
                    } else {
                        format!("{prefix})")
                    };
                    return Ok(Token::leaf(TokenKind::TempGroup, offset, text, options));
                }
                let body = self.rewrite_sequence(children, depth + 1)?;
                return Ok(Token::container(
                    TokenKind::TempGroup,
                    offset,
                    format!("{prefix}:"),
                    body,
                    ")",
                    options,
                ));
            }
            // Names live in the slot table; the host only sees numbered groups.
            Some(TokenKind::GroupConstructName(_)) | None => {}
            Some(_) => head.extend(construct.clone()),
        }

        if let Some(descriptor) = group.and_then(|raw| self.registry.get(raw)) {
            match descriptor.kind {
                GroupKind::Balancing { .. } => {
                    return Err(not_supported(NotSupportedKind::BalancingGroup, offset).into());
                }
                GroupKind::NonCapturing if construct.is_none() => {
                    head.push(Token::leaf(
                        TokenKind::GroupConstruct(Construct::NonCapturing),
                        offset + 1,
                        "?:",
                        options,
                    ));
                }
                _ => {}
            }
        }

        if let Some(raw) = group {
            self.open.push(raw);
        }
        let body = self.rewrite_sequence(children, depth + 1);
        if group.is_some() {
            self.open.pop();
        }
        head.extend(body?);

        let mut rewritten = Token::container(TokenKind::Group, offset, "(", head, ")", options);
        rewritten.group = group;
        Ok(rewritten)
    }

    /// Validate a backreference and return its target's raw index and host
    /// ordinal.
    fn resolve_backreference(
        &self,
        target: &BackrefTarget,
        offset: usize,
    ) -> Result<(usize, usize), CompileError> {
        let label = target.name.to_string();
        let number = self.slots.number_for_ref(&target.name).ok_or_else(|| {
            syntax(SyntaxErrorKind::UndefinedGroupReference(label.clone()), offset)
        })?;
        let raw = slots::single_member(self.slots, self.registry, number).ok_or_else(|| {
            not_supported(NotSupportedKind::AmbiguousBackreference(label.clone()), offset)
        })?;
        if self.open.last() == Some(&raw) {
            return Err(not_supported(NotSupportedKind::SelfReference(label), offset).into());
        }
        if self.open.contains(&raw) {
            return Err(not_supported(NotSupportedKind::AncestorReference(label), offset).into());
        }
        let group = self.registry.get(raw).ok_or_else(|| {
            syntax(SyntaxErrorKind::UndefinedGroupReference(label.clone()), offset)
        })?;
        if group.source_span.start > offset {
            return Err(not_supported(NotSupportedKind::ForwardReference(label), offset).into());
        }
        let ordinal = group.host_ordinal.ok_or_else(|| {
            syntax(SyntaxErrorKind::UndefinedGroupReference(label.clone()), offset)
        })?;
        Ok((raw, ordinal))
    }
}

/// Characters the host reads as syntax outside a class.
fn is_host_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
    )
}

/// Push `c` so that the host reads it as itself.
pub(crate) fn push_host_char(out: &mut String, c: char) {
    if is_host_meta(c) {
        out.push('\\');
        out.push(c);
    } else if c.is_control() || (c.is_whitespace() && c != ' ') {
        push_hex(out, c as u32);
    } else {
        out.push(c);
    }
}

/// Literal text as a host pattern.
pub fn host_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_host_char(&mut out, c);
    }
    out
}

fn escaped_char(kind: &EscapeKind) -> String {
    match kind {
        EscapeKind::Named(c @ ('t' | 'n' | 'r' | 'f' | 'v')) => format!("\\{c}"),
        EscapeKind::Meta(c) if is_host_meta(*c) => format!("\\{c}"),
        _ => {
            let mut out = String::new();
            push_hex(&mut out, class::code_point_char(kind.code_point()) as u32);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupRegistry;
    use crate::syntax::escape::resolve_numeric_escapes;
    use crate::syntax::{serialize, tokenize};

    fn translate(src: &str, options: RegexOptions) -> Result<(String, CompileFlags), CompileError> {
        let mut tokens = tokenize(src, options)?;
        let mut registry = GroupRegistry::build(&mut tokens);
        let slots = SlotTable::resolve(&mut registry)?;
        resolve_numeric_escapes(&mut tokens, &slots)?;
        let flags = rewrite(&mut tokens, &mut registry, &slots, options)?;
        Ok((serialize(&tokens), flags))
    }

    fn host(src: &str) -> String {
        translate(src, RegexOptions::default()).unwrap().0
    }

    fn unsupported(src: &str) -> NotSupportedKind {
        match translate(src, RegexOptions::default()) {
            Err(CompileError::NotSupported(e)) => e.kind,
            other => panic!("expected NotSupported, got {other:?}"),
        }
    }

    #[test]
    fn named_groups_become_plain_groups() {
        assert_eq!(host(r"(?<year>\d{4})-(?'m'\d\d)"), r"(\d{4})-(\d\d)");
    }

    #[test]
    fn non_capturing_and_lookarounds_survive() {
        assert_eq!(host("(?:ab)(?=c)(?<!d)(?>e)"), "(?:ab)(?=c)(?<!d)(?>e)");
    }

    #[test]
    fn explicit_capture_turns_off_unnamed_groups() {
        let (pattern, _) = translate("(a)(?<n>b)", RegexOptions::new().explicit_capture(true)).unwrap();
        assert_eq!(pattern, "(?:a)(b)");
    }

    #[test]
    fn dot_and_anchors() {
        assert_eq!(host("^a.b$"), r"^a(?:.|\r)b(?=\z)");
        let (pattern, flags) = translate("^a.$", RegexOptions::new().multiline(true).singleline(true)).unwrap();
        assert_eq!(pattern, r"(?:^|(?<=\n))a(?:.|\r|\n)(?=\r?\n|\r?\z)");
        assert!(flags.has_multiline_end_anchor);
        assert_eq!(host(r"a\Zb\z"), r"a(?=\n?\z)b(?=\z)");
    }

    #[test]
    fn start_anchor_position_rules() {
        let (_, flags) = translate("a^b", RegexOptions::default()).unwrap();
        assert!(flags.always_fails);
        let (_, flags) = translate("a|^b", RegexOptions::default()).unwrap();
        assert!(!flags.always_fails);
        let (pattern, flags) = translate(r"\Aabc", RegexOptions::default()).unwrap();
        assert_eq!(pattern, "^abc");
        assert!(flags.must_capture_first_char);
        let (_, flags) = translate(r"a\A", RegexOptions::default()).unwrap();
        assert!(flags.always_fails);
    }

    #[test]
    fn contiguous_anchor_is_removed() {
        let (pattern, flags) = translate(r"\Gab", RegexOptions::default()).unwrap();
        assert_eq!(pattern, "ab");
        assert!(flags.is_contiguous_anchor);
        assert_eq!(unsupported(r"a\Gb"), NotSupportedKind::ContiguousAnchorPosition);
    }

    #[test]
    fn inline_options_become_temp_groups() {
        assert_eq!(host("(?i:ab)c"), "(?i:ab)c");
        assert_eq!(host("a(?-i)b"), "a(?-i)b");
        assert_eq!(host("(?m)^a$"), r"(?:^|(?<=\n))a(?=\r?\n|\r?\z)");
        assert_eq!(host("(?x: a b )"), "(?:ab)");
        let (pattern, _) = translate("ab", RegexOptions::new().ignore_case(true)).unwrap();
        assert_eq!(pattern, "(?i)ab");
    }

    #[test]
    fn comments_are_removed() {
        assert_eq!(host("a(?#note)b"), "ab");
        let (pattern, _) = translate("a b # tail", RegexOptions::new().ignore_whitespace(true)).unwrap();
        assert_eq!(pattern, "ab");
    }

    #[test]
    fn escapes_are_canonical() {
        assert_eq!(host(r"\t\x41é\cA\."), r"\t\x{41}é\x{1}\.");
        assert_eq!(host(r"\/\#"), r"\x{2F}\x{23}");
        assert_eq!(host(r"\p{IsGreek}\p{Lu}\d"), r"[\x{370}-\x{3FF}]\p{Lu}\d");
    }

    #[test]
    fn class_subtraction_is_translated() {
        assert_eq!(host("[a-z-[aeiou]]"), "[[a-z]&&[^[aeiou]]]");
    }

    #[test]
    fn backreferences_use_host_ordinals() {
        assert_eq!(host(r"(?<x>a)(?:b)(c)\k<x>\1"), r"(a)(?:b)(c)(?:\1)(?:\2)");
    }

    #[test]
    fn octal_fallback_for_missing_group() {
        assert_eq!(host(r"(a)(b)\10"), r"(a)(b)\x{8}");
        assert_eq!(host(r"(a)\11x"), r"(a)\x{9}x");
    }

    #[test]
    fn invalid_backreferences() {
        assert_eq!(unsupported(r"\1(a)"), NotSupportedKind::ForwardReference("1".into()));
        assert_eq!(unsupported(r"(a\1)"), NotSupportedKind::SelfReference("1".into()));
        assert_eq!(unsupported(r"(a(b\1))"), NotSupportedKind::AncestorReference("1".into()));
        assert_eq!(
            unsupported(r"(?<w>a)|(?<w>b)\k<w>"),
            NotSupportedKind::AmbiguousBackreference("w".into())
        );
        match translate(r"(a)\2", RegexOptions::default()) {
            Err(CompileError::Syntax(e)) => {
                assert_eq!(e.kind, SyntaxErrorKind::UndefinedGroupReference("2".into()))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn case_insensitive_backreferences_are_rejected() {
        let kind = NotSupportedKind::CaseInsensitiveBackreference("1".into());
        assert_eq!(unsupported(r"(?i)(a)\1"), kind);
        assert_eq!(unsupported(r"(a)(?i:x\1)"), kind);
        let err = translate(r"(a)\1", RegexOptions::new().ignore_case(true)).unwrap_err();
        assert_eq!(err, CompileError::from(not_supported(kind, 3)));
        assert_eq!(host(r"(?i:(a))\1"), r"(?i:(a))(?:\1)");
    }

    #[test]
    fn unsupported_constructs() {
        assert_eq!(unsupported("(?<a-b>x)"), NotSupportedKind::BalancingGroup);
        assert_eq!(unsupported("(?(x)a|b)"), NotSupportedKind::ConditionalGroup);
    }
}

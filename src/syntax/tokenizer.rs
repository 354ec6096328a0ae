//! Recursive descent tokenizer for .NET-dialect patterns.
//!
//! Produces a [`Token`] tree whose serialization reproduces the source text
//! exactly. Groups nest as containers; everything else is a leaf.

use crate::error::{PatternSyntaxError, SyntaxErrorKind, syntax};
use crate::options::{OptionDelta, RegexOptions};

use super::char_table::{self, CharCategory};
use super::class;
use super::escape::{self, ScannedEscape, char_at};
use super::token::*;

/// Tokenize `pattern` under the ambient `options`.
pub fn tokenize(pattern: &str, options: RegexOptions) -> Result<Vec<Token>, PatternSyntaxError> {
    let mut tokenizer = Tokenizer {
        src: pattern,
        pos: 0,
    };
    let mut options = options;
    let tokens = tokenizer.parse_sequence(&mut options, 0)?;
    if tokenizer.pos < pattern.len() {
        return Err(syntax(SyntaxErrorKind::UnbalancedParenthesis, tokenizer.pos));
    }
    Ok(tokens)
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl Tokenizer<'_> {
    fn peek(&self) -> Option<char> {
        char_at(self.src, self.pos)
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        char_at(self.src, pos)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn text_from(&self, start: usize) -> &str {
        &self.src[start..self.pos]
    }

    /// Parse tokens until `)` or end of input; the `)` is left unconsumed.
    ///
    /// `options` is updated in place by bare `(?imnsx)` groups, which apply to
    /// the rest of the enclosing group.
    fn parse_sequence(
        &mut self,
        options: &mut RegexOptions,
        depth: usize,
    ) -> Result<Vec<Token>, PatternSyntaxError> {
        let mut tokens: Vec<Token> = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.pos;
            let opts = *options;
            let token = match c {
                ')' => {
                    if depth == 0 {
                        return Err(syntax(SyntaxErrorKind::UnbalancedParenthesis, start));
                    }
                    break;
                }
                '(' => {
                    let token = self.parse_group(options)?;
                    if let Some(Token {
                        kind: TokenKind::GroupConstructImnsx(inline),
                        ..
                    }) = token.construct()
                        && !inline.scoped
                    {
                        *options = options.apply(&inline.delta);
                    }
                    token
                }
                '[' => {
                    let parsed = class::parse_class(self.src, start)?;
                    self.pos = parsed.end;
                    Token::leaf(TokenKind::CharGroup, start, self.text_from(start), opts)
                }
                '|' => {
                    self.bump();
                    Token::leaf(TokenKind::Alternation, start, "|", opts)
                }
                '.' => {
                    self.bump();
                    Token::leaf(TokenKind::AnyChar, start, ".", opts)
                }
                '^' => {
                    self.bump();
                    Token::leaf(TokenKind::Anchor(Anchor::Start), start, "^", opts)
                }
                '$' => {
                    self.bump();
                    Token::leaf(TokenKind::Anchor(Anchor::End), start, "$", opts)
                }
                '\\' => self.parse_backslash(opts)?,
                '*' | '+' | '?' | '{' => match self.scan_quantifier()? {
                    Some(q) => {
                        check_quantifiable(&tokens, start)?;
                        Token::leaf(TokenKind::Quantifier(q), start, self.text_from(start), opts)
                    }
                    None => self.parse_literal_run(opts, true),
                },
                c if opts.ignore_whitespace && category_of(c) == CharCategory::Whitespace => {
                    while self
                        .peek()
                        .is_some_and(|c| category_of(c) == CharCategory::Whitespace)
                    {
                        self.bump();
                    }
                    Token::leaf(TokenKind::Comment, start, self.text_from(start), opts)
                }
                '#' if opts.ignore_whitespace => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                    Token::leaf(TokenKind::Comment, start, self.text_from(start), opts)
                }
                _ => self.parse_literal_run(opts, false),
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Consume a run of ordinary characters.
    ///
    /// When the run is followed by a quantifier, its last character is left
    /// for a token of its own so the quantifier binds to that character only.
    fn parse_literal_run(&mut self, options: RegexOptions, force_first: bool) -> Token {
        let start = self.pos;
        let mut last_char_at = start;
        if force_first {
            self.bump();
        }
        while let Some(c) = self.peek() {
            let ordinary = match category_of(c) {
                CharCategory::Ordinary => true,
                CharCategory::Whitespace | CharCategory::Comment => !options.ignore_whitespace,
                CharCategory::Stopper | CharCategory::Quantifier => false,
            };
            if !ordinary {
                break;
            }
            last_char_at = self.pos;
            self.bump();
        }
        if last_char_at > start && self.quantifier_follows(options) {
            self.pos = last_char_at;
        }
        Token::leaf(TokenKind::Literal, start, self.text_from(start), options)
    }

    /// True when the next meaningful token is a quantifier.
    fn quantifier_follows(&self, options: RegexOptions) -> bool {
        let mut probe = Tokenizer {
            src: self.src,
            pos: self.pos,
        };
        if options.ignore_whitespace {
            loop {
                match probe.peek() {
                    Some(c) if category_of(c) == CharCategory::Whitespace => {
                        probe.bump();
                    }
                    Some('#') => {
                        while let Some(c) = probe.bump() {
                            if c == '\n' {
                                break;
                            }
                        }
                    }
                    _ => break,
                }
            }
        }
        matches!(probe.peek(), Some('*' | '+' | '?'))
            || (probe.peek() == Some('{') && matches!(probe.scan_quantifier(), Ok(Some(_))))
    }

    /// Scan `* + ? {n} {n,} {n,m}` plus an optional lazy `?`.
    ///
    /// Returns `None` (without consuming) when a `{` does not start a
    /// well-formed quantifier.
    fn scan_quantifier(&mut self) -> Result<Option<Quantifier>, PatternSyntaxError> {
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some('*') => {
                self.bump();
                (0, None)
            }
            Some('+') => {
                self.bump();
                (1, None)
            }
            Some('?') => {
                self.bump();
                (0, Some(1))
            }
            Some('{') => match self.scan_braces() {
                Some((min, max)) => {
                    if max.is_some_and(|max| max < min) {
                        return Err(syntax(SyntaxErrorKind::ReversedQuantifierRange, start));
                    }
                    (min, max)
                }
                None => {
                    self.pos = start;
                    return Ok(None);
                }
            },
            _ => return Ok(None),
        };
        let lazy = self.eat('?');
        Ok(Some(Quantifier { min, max, lazy }))
    }

    fn scan_braces(&mut self) -> Option<(usize, Option<usize>)> {
        self.bump();
        let min = self.scan_number()?;
        if self.eat('}') {
            return Some((min, Some(min)));
        }
        if !self.eat(',') {
            return None;
        }
        if self.eat('}') {
            return Some((min, None));
        }
        let max = self.scan_number()?;
        self.eat('}').then_some((min, Some(max)))
    }

    fn scan_number(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == start {
            return None;
        }
        self.text_from(start).parse().ok()
    }

    fn parse_backslash(&mut self, options: RegexOptions) -> Result<Token, PatternSyntaxError> {
        let start = self.pos;
        let next = self
            .peek_at(start + 1)
            .ok_or_else(|| syntax(SyntaxErrorKind::DanglingEscape, start))?;
        let anchor = match next {
            'A' => Some(EscapedAnchor::StartOfInput),
            'Z' => Some(EscapedAnchor::EndOfInputOrNewline),
            'z' => Some(EscapedAnchor::EndOfInput),
            'G' => Some(EscapedAnchor::Contiguous),
            'b' => Some(EscapedAnchor::WordBoundary),
            'B' => Some(EscapedAnchor::NonWordBoundary),
            _ => None,
        };
        if let Some(anchor) = anchor {
            self.pos = start + 2;
            return Ok(Token::leaf(
                TokenKind::EscapedAnchor(anchor),
                start,
                self.text_from(start),
                options,
            ));
        }
        match next {
            'k' => {
                self.pos = start + 2;
                let name = self.parse_reference_name(start)?;
                Ok(Token::leaf(
                    TokenKind::Backreference(BackrefTarget {
                        name,
                        ambiguous: false,
                        resolved: None,
                    }),
                    start,
                    self.text_from(start),
                    options,
                ))
            }
            '1'..='9' => {
                self.pos = start + 1;
                let digits_at = self.pos;
                let number = self.scan_number().unwrap_or(usize::MAX);
                let ambiguous = self.pos - digits_at > 1;
                Ok(Token::leaf(
                    TokenKind::Backreference(BackrefTarget {
                        name: GroupRef::Number(number),
                        ambiguous,
                        resolved: None,
                    }),
                    start,
                    self.text_from(start),
                    options,
                ))
            }
            _ => {
                let (scanned, end) = escape::scan_escape(self.src, start, false)?;
                self.pos = end;
                let kind = match scanned {
                    ScannedEscape::Char(kind) => TokenKind::EscapedChar(kind),
                    ScannedEscape::Class(class) => TokenKind::EscapedCharClass(class),
                };
                Ok(Token::leaf(kind, start, self.text_from(start), options))
            }
        }
    }

    /// `<name>` or `'name'` after `\k`.
    fn parse_reference_name(&mut self, start: usize) -> Result<GroupRef, PatternSyntaxError> {
        let malformed = || syntax(SyntaxErrorKind::MalformedNamedReference, start);
        let close = match self.bump() {
            Some('<') => '>',
            Some('\'') => '\'',
            _ => return Err(malformed()),
        };
        let name = self.scan_group_name().map_err(|_| malformed())?;
        if !self.eat(close) {
            return Err(malformed());
        }
        Ok(name)
    }

    /// A group name: all digits (a number) or a run of word characters.
    fn scan_group_name(&mut self) -> Result<GroupRef, PatternSyntaxError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                let n = self.scan_number().unwrap_or(usize::MAX);
                Ok(GroupRef::Number(n))
            }
            Some(c) if char_table::is_word_char(c) => {
                while self.peek().is_some_and(char_table::is_word_char) {
                    self.bump();
                }
                Ok(GroupRef::Name(self.text_from(start).to_string()))
            }
            Some(c) => Err(syntax(SyntaxErrorKind::InvalidGroupNameStart(c), start)),
            None => Err(syntax(SyntaxErrorKind::MalformedGroupName, start)),
        }
    }

    /// Parse a group starting at `(`.
    fn parse_group(&mut self, options: &RegexOptions) -> Result<Token, PatternSyntaxError> {
        let start = self.pos;
        let outer = *options;
        self.bump();
        let mut inner = outer;
        let mut children = Vec::new();

        if self.peek() == Some('?') {
            let construct_at = self.pos;
            self.bump();
            let kind = match self.peek() {
                Some(':') => {
                    self.bump();
                    TokenKind::GroupConstruct(Construct::NonCapturing)
                }
                Some('=') | Some('!') => {
                    let negated = self.bump() == Some('!');
                    TokenKind::GroupConstruct(Construct::Lookahead { negated })
                }
                Some('>') => {
                    self.bump();
                    TokenKind::GroupConstruct(Construct::Atomic)
                }
                Some('<') if matches!(self.peek_at(self.pos + 1), Some('=') | Some('!')) => {
                    self.bump();
                    let negated = self.bump() == Some('!');
                    TokenKind::GroupConstruct(Construct::Lookbehind { negated })
                }
                Some('<') | Some('\'') => {
                    let close = if self.bump() == Some('<') { '>' } else { '\'' };
                    let name = self.parse_construct_name(close)?;
                    TokenKind::GroupConstructName(name)
                }
                Some('#') => return self.parse_comment(start, outer),
                Some('(') => return self.parse_conditional(start, options),
                Some(c) if c == '-' || "imnsxIMNSX".contains(c) => {
                    let inline = self.parse_inline_options(start)?;
                    if !inline.scoped {
                        let construct = Token::leaf(
                            TokenKind::GroupConstructImnsx(inline),
                            construct_at,
                            self.text_from(construct_at),
                            outer,
                        );
                        if !self.eat(')') {
                            return Err(syntax(SyntaxErrorKind::UnterminatedGroup, start));
                        }
                        return Ok(Token::container(
                            TokenKind::Group,
                            start,
                            "(",
                            vec![construct],
                            ")",
                            outer,
                        ));
                    }
                    inner = outer.apply(&inline.delta);
                    TokenKind::GroupConstructImnsx(inline)
                }
                _ => {
                    return Err(syntax(
                        SyntaxErrorKind::UnrecognizedGroupingConstruct,
                        construct_at,
                    ));
                }
            };
            children.push(Token::leaf(
                kind,
                construct_at,
                self.text_from(construct_at),
                outer,
            ));
        }

        children.extend(self.parse_sequence(&mut inner, 1)?);
        if !self.eat(')') {
            return Err(syntax(SyntaxErrorKind::UnterminatedGroup, start));
        }
        Ok(Token::container(
            TokenKind::Group,
            start,
            "(",
            children,
            ")",
            outer,
        ))
    }

    /// `name>`, `a-b>`, `-b>` after `?<` (or the `'` forms).
    fn parse_construct_name(&mut self, close: char) -> Result<GroupName, PatternSyntaxError> {
        let name = if self.peek() == Some('-') {
            None
        } else {
            Some(self.scan_group_name()?)
        };
        let balance = if self.eat('-') {
            Some(self.scan_group_name()?)
        } else {
            None
        };
        if !self.eat(close) {
            return Err(syntax(SyntaxErrorKind::MalformedGroupName, self.pos));
        }
        Ok(GroupName { name, balance })
    }

    /// `imnsx-imnsx` followed by `:` (scoped) or `)` (bare; left unconsumed).
    fn parse_inline_options(&mut self, start: usize) -> Result<InlineOptions, PatternSyntaxError> {
        let mut delta = OptionDelta::default();
        let mut enabling = true;
        loop {
            match self.peek() {
                Some('-') => {
                    self.bump();
                    enabling = false;
                }
                Some(':') => {
                    self.bump();
                    return Ok(InlineOptions {
                        delta,
                        scoped: true,
                    });
                }
                Some(')') => {
                    return Ok(InlineOptions {
                        delta,
                        scoped: false,
                    });
                }
                Some(c) => {
                    let target = if enabling {
                        &mut delta.enable
                    } else {
                        &mut delta.disable
                    };
                    if !target.set_letter(c, true) {
                        return Err(syntax(
                            SyntaxErrorKind::UnrecognizedGroupingConstruct,
                            self.pos,
                        ));
                    }
                    self.bump();
                }
                None => return Err(syntax(SyntaxErrorKind::UnterminatedGroup, start)),
            }
        }
    }

    /// `(?#...)`; comments do not nest and end at the first `)`.
    fn parse_comment(
        &mut self,
        start: usize,
        options: RegexOptions,
    ) -> Result<Token, PatternSyntaxError> {
        let body = &self.src[self.pos..];
        let close = body
            .find(')')
            .ok_or_else(|| syntax(SyntaxErrorKind::UnterminatedComment, start))?;
        self.pos += close + 1;
        Ok(Token::leaf(
            TokenKind::Comment,
            start,
            self.text_from(start),
            options,
        ))
    }

    /// `(?(condition)yes|no)`; the condition becomes the first child.
    fn parse_conditional(
        &mut self,
        start: usize,
        options: &RegexOptions,
    ) -> Result<Token, PatternSyntaxError> {
        let condition = self.parse_group(options)?;
        let mut inner = *options;
        let mut children = vec![condition];
        children.extend(self.parse_sequence(&mut inner, 1)?);
        if !self.eat(')') {
            return Err(syntax(SyntaxErrorKind::UnterminatedGroup, start));
        }
        Ok(Token::container(
            TokenKind::AlternationGroup,
            start,
            "(?",
            children,
            ")",
            *options,
        ))
    }
}

fn category_of(c: char) -> CharCategory {
    char_table::category(c)
}

/// A quantifier needs something to apply to, and that thing must not itself
/// be a quantifier.
fn check_quantifiable(tokens: &[Token], at: usize) -> Result<(), PatternSyntaxError> {
    let previous = tokens.iter().rev().find(|t| t.kind != TokenKind::Comment);
    match previous.map(|t| &t.kind) {
        None | Some(TokenKind::Alternation) => {
            Err(syntax(SyntaxErrorKind::QuantifierFollowsNothing, at))
        }
        Some(TokenKind::Quantifier(_)) => Err(syntax(SyntaxErrorKind::NestedQuantifier, at)),
        Some(TokenKind::Group) if previous.is_some_and(Token::is_bare_options) => {
            Err(syntax(SyntaxErrorKind::QuantifierFollowsNothing, at))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::serializer::serialize;

    fn tok(src: &str) -> Vec<Token> {
        tokenize(src, RegexOptions::default()).expect("pattern should tokenize")
    }

    fn tok_err(src: &str) -> SyntaxErrorKind {
        tokenize(src, RegexOptions::default())
            .expect_err("pattern should fail")
            .kind
    }

    fn kinds(tokens: &[Token]) -> Vec<&TokenKind> {
        tokens.iter().map(|t| &t.kind).collect()
    }

    #[test]
    fn literal_run_backs_off_before_quantifier() {
        let tokens = tok("abc*");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "ab");
        assert_eq!(tokens[1].text, "c");
        assert!(matches!(tokens[2].kind, TokenKind::Quantifier(_)));
    }

    #[test]
    fn quantifier_forms() {
        let tokens = tok("a{2,5}?b{3}c{1,}");
        let qs: Vec<Quantifier> = tokens.iter().filter_map(|t| t.quantifier().copied()).collect();
        assert_eq!(
            qs,
            vec![
                Quantifier { min: 2, max: Some(5), lazy: true },
                Quantifier { min: 3, max: Some(3), lazy: false },
                Quantifier { min: 1, max: None, lazy: false },
            ]
        );
    }

    #[test]
    fn malformed_brace_is_literal() {
        let tokens = tok("a{,3}");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Literal));
        assert_eq!(serialize(&tokens), "a{,3}");
    }

    #[test]
    fn groups_nest() {
        let tokens = tok("(a(b)c)");
        assert_eq!(tokens.len(), 1);
        let outer = &tokens[0];
        assert_eq!(outer.kind, TokenKind::Group);
        assert_eq!(outer.length, 7);
        assert_eq!(outer.children.len(), 3);
        assert_eq!(outer.children[1].kind, TokenKind::Group);
        assert_eq!(outer.children[1].offset, 2);
    }

    #[test]
    fn named_group_constructs() {
        let tokens = tok("(?<year>x)(?'m'y)(?<2>z)");
        let names: Vec<&TokenKind> = tokens.iter().filter_map(|t| t.construct()).map(|c| &c.kind).collect();
        assert_eq!(
            names,
            vec![
                &TokenKind::GroupConstructName(GroupName {
                    name: Some(GroupRef::Name("year".into())),
                    balance: None
                }),
                &TokenKind::GroupConstructName(GroupName {
                    name: Some(GroupRef::Name("m".into())),
                    balance: None
                }),
                &TokenKind::GroupConstructName(GroupName {
                    name: Some(GroupRef::Number(2)),
                    balance: None
                }),
            ]
        );
    }

    #[test]
    fn balancing_group_is_recognized() {
        let tokens = tok("(?<open-close>x)");
        match &tokens[0].construct().unwrap().kind {
            TokenKind::GroupConstructName(n) => {
                assert_eq!(n.balance, Some(GroupRef::Name("close".into())));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lookarounds_and_atomic() {
        let tokens = tok("(?=a)(?!b)(?<=c)(?<!d)(?>e)");
        let constructs: Vec<&TokenKind> =
            tokens.iter().filter_map(|t| t.construct()).map(|c| &c.kind).collect();
        assert_eq!(
            constructs,
            vec![
                &TokenKind::GroupConstruct(Construct::Lookahead { negated: false }),
                &TokenKind::GroupConstruct(Construct::Lookahead { negated: true }),
                &TokenKind::GroupConstruct(Construct::Lookbehind { negated: false }),
                &TokenKind::GroupConstruct(Construct::Lookbehind { negated: true }),
                &TokenKind::GroupConstruct(Construct::Atomic),
            ]
        );
    }

    #[test]
    fn comment_does_not_nest() {
        let tokens = tok("a(?#x(y)b");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].text, "(?#x(y)");
        assert_eq!(tokens[2].text, "b");
    }

    #[test]
    fn bare_inline_options_apply_to_rest_of_group() {
        let tokens = tok("a(?i)b(c)");
        assert!(!tokens[0].options.ignore_case);
        assert!(tokens[2].options.ignore_case);
        assert!(tokens[3].children[0].options.ignore_case);
    }

    #[test]
    fn scoped_inline_options() {
        let tokens = tok("(?x: a b )c d");
        let inner = &tokens[0];
        assert!(inner.children.iter().any(|t| t.kind == TokenKind::Comment));
        assert_eq!(tokens[1].text, "c d");
    }

    #[test]
    fn ignore_whitespace_comments() {
        let tokens = tokenize("a # note\nb", RegexOptions::new().ignore_whitespace(true)).unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                &TokenKind::Literal,
                &TokenKind::Comment,
                &TokenKind::Comment,
                &TokenKind::Literal
            ]
        );
    }

    #[test]
    fn backreferences_and_anchors() {
        let tokens = tok(r"(a)\1\k<x>\A\z\G");
        assert!(matches!(
            &tokens[1].kind,
            TokenKind::Backreference(BackrefTarget { name: GroupRef::Number(1), ambiguous: false, .. })
        ));
        assert!(matches!(
            &tokens[2].kind,
            TokenKind::Backreference(BackrefTarget { name: GroupRef::Name(n), .. }) if n == "x"
        ));
        assert_eq!(tokens[3].kind, TokenKind::EscapedAnchor(EscapedAnchor::StartOfInput));
        assert_eq!(tokens[5].kind, TokenKind::EscapedAnchor(EscapedAnchor::Contiguous));
    }

    #[test]
    fn multi_digit_escape_is_ambiguous() {
        let tokens = tok(r"\10");
        assert!(matches!(
            &tokens[0].kind,
            TokenKind::Backreference(BackrefTarget { name: GroupRef::Number(10), ambiguous: true, .. })
        ));
    }

    #[test]
    fn conditional_group() {
        let tokens = tok("(?(x)a|b)");
        assert_eq!(tokens[0].kind, TokenKind::AlternationGroup);
        assert_eq!(tokens[0].children[0].kind, TokenKind::Group);
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(tok_err("(ab"), SyntaxErrorKind::UnterminatedGroup);
        assert_eq!(tok_err("ab)"), SyntaxErrorKind::UnbalancedParenthesis);
        assert_eq!(tok_err("[ab"), SyntaxErrorKind::UnterminatedCharClass);
        assert_eq!(tok_err("ab\\"), SyntaxErrorKind::DanglingEscape);
        assert_eq!(tok_err(r"\x4"), SyntaxErrorKind::InsufficientHexDigits);
        assert_eq!(tok_err(r"\u004"), SyntaxErrorKind::InsufficientUnicodeDigits);
        assert_eq!(
            tok_err(r"\p{Bogus}"),
            SyntaxErrorKind::UnknownCategory("Bogus".into())
        );
        assert_eq!(tok_err("(?<na me>x)"), SyntaxErrorKind::MalformedGroupName);
        assert_eq!(tok_err("(?<$x>x)"), SyntaxErrorKind::InvalidGroupNameStart('$'));
        assert_eq!(tok_err("*a"), SyntaxErrorKind::QuantifierFollowsNothing);
        assert_eq!(tok_err("a|*"), SyntaxErrorKind::QuantifierFollowsNothing);
        assert_eq!(tok_err("a**"), SyntaxErrorKind::NestedQuantifier);
        assert_eq!(tok_err("a{3,1}"), SyntaxErrorKind::ReversedQuantifierRange);
        assert_eq!(tok_err("(?Q)"), SyntaxErrorKind::UnrecognizedGroupingConstruct);
        assert_eq!(tok_err("(?#abc"), SyntaxErrorKind::UnterminatedComment);
    }

    #[test]
    fn error_offsets_point_at_the_problem() {
        let err = tokenize("ab(cd", RegexOptions::default()).unwrap_err();
        assert_eq!(err.offset, 2);
    }
}

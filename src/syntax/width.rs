//! Static bounds on how much text a token sequence can touch.

use super::token::{Anchor, Construct, EscapedAnchor, Token, TokenKind};

/// Most characters `tokens` can consume, or `None` when unbounded.
pub fn max_width(tokens: &[Token]) -> Option<usize> {
    tokens
        .split(|t| t.kind == TokenKind::Alternation)
        .try_fold(0, |widest, branch| Some(widest.max(branch_width(branch)?)))
}

/// How many characters past the furthest point `tokens` consume any of
/// their assertions can read. `None` when a lookahead can read arbitrarily
/// far.
pub fn reach(tokens: &[Token]) -> Option<usize> {
    tokens.iter().try_fold(0, |far, t| Some(far.max(token_reach(t)?)))
}

fn branch_width(tokens: &[Token]) -> Option<usize> {
    let mut total = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.quantifier().is_some() {
            continue;
        }
        let mut width = atom_width(token)?;
        if let Some(q) = tokens.get(i + 1).and_then(Token::quantifier) {
            width = match q.max {
                Some(max) => width.checked_mul(max)?,
                None if width == 0 => 0,
                None => return None,
            };
        }
        total = total.checked_add(width)?;
    }
    Some(total)
}

fn atom_width(token: &Token) -> Option<usize> {
    match &token.kind {
        // Host escapes only lengthen a literal, so this stays an upper bound.
        TokenKind::Literal => Some(token.text.chars().count()),
        TokenKind::EscapedChar(_)
        | TokenKind::EscapedCharClass(_)
        | TokenKind::CharGroup
        | TokenKind::AnyChar => Some(1),
        TokenKind::Backreference(_) => None,
        TokenKind::Group if token.lookaround().is_some() => Some(0),
        TokenKind::Group => max_width(token.body()),
        TokenKind::TempGroup | TokenKind::AlternationGroup => max_width(&token.children),
        _ => Some(0),
    }
}

fn token_reach(token: &Token) -> Option<usize> {
    match &token.kind {
        // `$` may read `\r\n`; `\Z`, `\z`, `\b` and `\B` read less.
        TokenKind::Anchor(Anchor::End) => Some(2),
        TokenKind::EscapedAnchor(EscapedAnchor::StartOfInput | EscapedAnchor::Contiguous) => Some(0),
        TokenKind::EscapedAnchor(_) => Some(2),
        TokenKind::Group if matches!(token.lookaround(), Some(Construct::Lookahead { .. })) => {
            let body = token.body();
            max_width(body)?.checked_add(reach(body)?)
        }
        _ => reach(&token.children),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RegexOptions;
    use crate::syntax::tokenize;

    fn width_of(pattern: &str) -> Option<usize> {
        max_width(&tokenize(pattern, RegexOptions::default()).unwrap())
    }

    fn reach_of(pattern: &str) -> Option<usize> {
        reach(&tokenize(pattern, RegexOptions::default()).unwrap())
    }

    #[test]
    fn widths() {
        assert_eq!(width_of("abc"), Some(3));
        assert_eq!(width_of("a|bcd"), Some(3));
        assert_eq!(width_of("(ab){2,3}"), Some(6));
        assert_eq!(width_of(r"\d\w?"), Some(2));
        assert_eq!(width_of("(?=xyz)a"), Some(1));
        assert_eq!(width_of("a+"), None);
        assert_eq!(width_of(r"(a)\1"), None);
    }

    #[test]
    fn reaches() {
        assert_eq!(reach_of("a(b)c"), Some(0));
        assert_eq!(reach_of(r"\Aa"), Some(0));
        assert_eq!(reach_of(r"(a\b)"), Some(2));
        assert_eq!(reach_of("a(?=bcd)"), Some(3));
        assert_eq!(reach_of("a(?!b$)"), Some(3));
        assert_eq!(reach_of("(?<=ab)c"), Some(0));
        assert_eq!(reach_of("a(?=.*z)"), None);
    }
}

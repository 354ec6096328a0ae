//! Turn a token tree back into pattern text.

use super::token::Token;

/// Concatenate the text of `tokens` in order.
pub fn serialize(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        write_token(&mut out, token);
    }
    out
}

fn write_token(out: &mut String, token: &Token) {
    out.push_str(&token.text);
    for child in &token.children {
        write_token(out, child);
    }
    out.push_str(&token.suffix);
}

/// Recompute `offset` and `length` for every token as if the tree were
/// serialized starting at `start`. Returns the end offset.
pub fn layout(tokens: &mut [Token], start: usize) -> usize {
    let mut pos = start;
    for token in tokens {
        token.offset = pos;
        let body_end = layout(&mut token.children, pos + token.text.len());
        token.length = body_end + token.suffix.len() - pos;
        pos = token.end();
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RegexOptions;
    use crate::syntax::token::TokenKind;
    use crate::syntax::tokenize;

    #[test]
    fn serialize_reproduces_source() {
        for src in [
            "abc",
            r"(?<year>\d{4})-(?<m>\d\d)",
            "(?i:a|b)+?(?#note)c",
            r"[a-z-[aeiou]]\p{Lu}\k<year>",
            "(?(x)yes|no)",
            r"(?=a)(?<!b)(?>c*)\A\z",
        ] {
            let tokens = tokenize(src, RegexOptions::default()).unwrap();
            assert_eq!(serialize(&tokens), src);
        }
        let x = "a b # comment\n(c)";
        let tokens = tokenize(x, RegexOptions::new().ignore_whitespace(true)).unwrap();
        assert_eq!(serialize(&tokens), x);
    }

    #[test]
    fn layout_tracks_edits() {
        let opts = RegexOptions::default();
        let mut tokens = vec![
            Token::leaf(TokenKind::Literal, 0, "ab", opts),
            Token::container(
                TokenKind::Group,
                0,
                "(",
                vec![Token::leaf(TokenKind::Literal, 0, "xyz", opts)],
                ")",
                opts,
            ),
            Token::leaf(TokenKind::Literal, 0, "c", opts),
        ];
        tokens[0].text = "a".into();
        let end = layout(&mut tokens, 0);
        assert_eq!(end, 7);
        assert_eq!(tokens[1].offset, 1);
        assert_eq!(tokens[1].length, 5);
        assert_eq!(tokens[1].children[0].offset, 2);
        assert_eq!(tokens[2].offset, 6);
        assert_eq!(serialize(&tokens), "a(xyz)c");
    }
}

//! Replacement: substitution templates and the [`Replacer`] trait.

use crate::error::MatchError;
use crate::host::HostMatcher;
use crate::result::MatchResult;

use super::CompiledPattern;

/// Something that can write the replacement for one match.
///
/// Implemented for template strings, for [`NoExpand`] literal text, and for
/// closures returning the replacement.
pub trait Replacer {
    /// Append the replacement for `m`, found in `input`, to `dst`.
    fn replace_append(&mut self, m: &MatchResult, input: &str, dst: &mut String);
}

impl Replacer for &str {
    fn replace_append(&mut self, m: &MatchResult, input: &str, dst: &mut String) {
        expand(self, m, input, dst);
    }
}

impl Replacer for String {
    fn replace_append(&mut self, m: &MatchResult, input: &str, dst: &mut String) {
        expand(self, m, input, dst);
    }
}

impl Replacer for &String {
    fn replace_append(&mut self, m: &MatchResult, input: &str, dst: &mut String) {
        expand(self, m, input, dst);
    }
}

impl<F, T> Replacer for F
where
    F: FnMut(&MatchResult) -> T,
    T: AsRef<str>,
{
    fn replace_append(&mut self, m: &MatchResult, _input: &str, dst: &mut String) {
        dst.push_str(self(m).as_ref());
    }
}

/// Replacement text used as is, with no `$` substitutions.
#[derive(Debug, Clone, Copy)]
pub struct NoExpand<'t>(pub &'t str);

impl Replacer for NoExpand<'_> {
    fn replace_append(&mut self, _m: &MatchResult, _input: &str, dst: &mut String) {
        dst.push_str(self.0);
    }
}

/// Expand a substitution template for one match.
///
/// A `$` that does not start a valid substitution is copied literally.
pub fn expand(template: &str, m: &MatchResult, input: &str, dst: &mut String) {
    let mut rest = template;
    while let Some(at) = rest.find('$') {
        dst.push_str(&rest[..at]);
        rest = &rest[at..];
        let (consumed, text) = substitution(&rest[1..], m, input);
        match text {
            Some(text) => {
                dst.push_str(text);
                rest = &rest[1 + consumed..];
            }
            None => {
                dst.push('$');
                rest = &rest[1..];
            }
        }
    }
    dst.push_str(rest);
}

/// The substitution named right after a `$`, and how many bytes it spans.
fn substitution<'a>(after: &str, m: &'a MatchResult, input: &'a str) -> (usize, Option<&'a str>) {
    let Some(c) = after.chars().next() else {
        return (0, None);
    };
    match c {
        '$' => (1, Some("$")),
        '&' => (1, Some(m.value.as_str())),
        '`' => (1, Some(&input[..m.index])),
        '\'' => (1, Some(&input[m.end()..])),
        '+' => (1, Some(m.last_group().map_or("", |g| g.value()))),
        '_' => (1, Some(input)),
        '{' => {
            let Some(close) = after.find('}') else {
                return (0, None);
            };
            let name = &after[1..close];
            let group = if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                name.parse().ok().and_then(|n| m.get(n))
            } else {
                m.group(name)
            };
            match group {
                Some(g) => (close + 1, Some(g.value())),
                None => (0, None),
            }
        }
        '0'..='9' => {
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            // Longest run of digits that names a group.
            (1..=digits)
                .rev()
                .find_map(|len| {
                    let n: usize = after[..len].parse().ok()?;
                    m.get(n).map(|g| (len, Some(g.value())))
                })
                .unwrap_or((0, None))
        }
        _ => (0, None),
    }
}

impl<H: HostMatcher> CompiledPattern<H> {
    /// Replace up to `limit` matches found from `start` (all when `None`).
    ///
    /// Text before `start` is kept unchanged.
    pub fn replace<R: Replacer>(
        &self,
        input: &str,
        mut replacer: R,
        limit: Option<usize>,
        start: usize,
    ) -> Result<String, MatchError> {
        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for m in self.matches(input, start).take(limit.unwrap_or(usize::MAX)) {
            let m = m?;
            out.push_str(&input[last..m.index]);
            replacer.replace_append(&m, input, &mut out);
            last = m.end();
        }
        out.push_str(&input[last..]);
        Ok(out)
    }

    /// Replace every match.
    pub fn replace_all<R: Replacer>(&self, input: &str, replacer: R) -> Result<String, MatchError> {
        self.replace(input, replacer, None, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::options::RegexOptions;

    fn replace_all(pattern: &str, input: &str, template: &str) -> String {
        Engine::new()
            .compile(pattern, RegexOptions::default())
            .unwrap()
            .replace_all(input, template)
            .unwrap()
    }

    #[test]
    fn numbered_and_named_groups() {
        assert_eq!(replace_all(r"(\w+)@(\w+)", "me@host", "$2 at $1"), "host at me");
        assert_eq!(
            replace_all(r"(?<user>\w+)@(?<site>\w+)", "me@host", "${site}/${user}"),
            "host/me"
        );
        assert_eq!(replace_all(r"(a)", "a", "${1}1"), "a1");
    }

    #[test]
    fn whole_match_and_surroundings() {
        assert_eq!(replace_all("b", "abc", "[$&]"), "a[b]c");
        assert_eq!(replace_all("b", "abc", "[$0]"), "a[b]c");
        assert_eq!(replace_all("b", "abc", "[$`]"), "a[a]c");
        assert_eq!(replace_all("b", "abc", "[$']"), "a[c]c");
        assert_eq!(replace_all("b", "abc", "[$_]"), "a[abc]c");
        assert_eq!(replace_all("b", "abc", "$$"), "a$c");
    }

    #[test]
    fn last_group_substitution() {
        assert_eq!(replace_all(r"(a)(b)?", "a", "<$+>"), "<>");
        assert_eq!(replace_all(r"(a)(b)", "ab", "<$+>"), "<b>");
    }

    #[test]
    fn longest_valid_group_number_wins() {
        // Only group 1 exists, so `$10` is group 1 followed by `0`.
        assert_eq!(replace_all(r"(a)", "a", "$10"), "a0");
        assert_eq!(replace_all(r"(a)", "a", "$2"), "$2");
    }

    #[test]
    fn invalid_substitutions_are_literal() {
        assert_eq!(replace_all(r"(a)", "a", "${nope}"), "${nope}");
        assert_eq!(replace_all(r"(a)", "a", "${1"), "${1");
        assert_eq!(replace_all(r"(a)", "a", "x$"), "x$");
        assert_eq!(replace_all(r"(a)", "a", "$%"), "$%");
    }

    #[test]
    fn closures_and_literals() {
        let p = Engine::new().compile(r"\d+", RegexOptions::default()).unwrap();
        let doubled = p
            .replace_all("1 22 3", |m: &MatchResult| (m.value.parse::<u32>().unwrap() * 2).to_string())
            .unwrap();
        assert_eq!(doubled, "2 44 6");
        assert_eq!(p.replace_all("a1", NoExpand("$0")).unwrap(), "a$0");
    }

    #[test]
    fn limit_and_start() {
        let p = Engine::new().compile("a", RegexOptions::default()).unwrap();
        assert_eq!(p.replace("aaaa", "b", Some(2), 0).unwrap(), "bbaa");
        assert_eq!(p.replace("aaaa", "b", Some(0), 0).unwrap(), "aaaa");
        assert_eq!(p.replace("aaaa", "b", None, 2).unwrap(), "aabb");
    }
}

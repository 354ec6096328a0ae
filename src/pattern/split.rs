use crate::error::MatchError;
use crate::host::HostMatcher;

use super::CompiledPattern;

impl<H: HostMatcher> CompiledPattern<H> {
    /// Split `input` around matches found from `start`.
    ///
    /// At most `limit` pieces are returned; `Some(0)` means no limit, like
    /// `None`. The text of every group that took part in a match is inserted
    /// after the piece that precedes it.
    pub fn split(&self, input: &str, limit: Option<usize>, start: usize) -> Result<Vec<String>, MatchError> {
        let splits = match limit {
            Some(1) => return Ok(vec![input.to_string()]),
            None | Some(0) => usize::MAX,
            Some(n) => n - 1,
        };
        let mut pieces = Vec::new();
        let mut prev = 0;
        for m in self.matches(input, start).take(splits) {
            let m = m?;
            pieces.push(input[prev..m.index].to_string());
            prev = m.end();
            pieces.extend(
                m.groups
                    .iter()
                    .skip(1)
                    .filter(|g| g.success())
                    .map(|g| g.value().to_string()),
            );
        }
        pieces.push(input[prev..].to_string());
        Ok(pieces)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Engine;
    use crate::options::RegexOptions;

    fn split(pattern: &str, input: &str, limit: Option<usize>) -> Vec<String> {
        Engine::new()
            .compile(pattern, RegexOptions::default())
            .unwrap()
            .split(input, limit, 0)
            .unwrap()
    }

    #[test]
    fn plain_delimiters() {
        assert_eq!(split(",", "a,b,,c", None), vec!["a", "b", "", "c"]);
        assert_eq!(split("x", "abc", None), vec!["abc"]);
    }

    #[test]
    fn limit_counts_pieces() {
        assert_eq!(split(",", "a,b,c", Some(2)), vec!["a", "b,c"]);
        assert_eq!(split(",", "a,b,c", Some(1)), vec!["a,b,c"]);
        assert_eq!(split(",", "a,b,c", Some(0)), vec!["a", "b", "c"]);
    }

    #[test]
    fn captured_delimiters_are_kept() {
        assert_eq!(split("(-)|(,)", "a-b,c", None), vec!["a", "-", "b", ",", "c"]);
    }

    #[test]
    fn start_offset_keeps_the_prefix_whole() {
        let p = Engine::new().compile(",", RegexOptions::default()).unwrap();
        assert_eq!(p.split("a,b,c", None, 2).unwrap(), vec!["a,b", "c"]);
    }
}

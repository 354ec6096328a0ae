//! The host matcher: the flat regex engine every primitive match is
//! delegated to.
//!
//! The host sees only translated patterns. It reports the leftmost match at
//! or after an offset and nothing about groups, so the recovery engine can
//! drive any engine that supports lookaround, backreferences and inline
//! case folding.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use fancy_regex::{Regex, RegexBuilder};

use crate::cache::LruCache;

/// Span of one host match, in byte offsets into the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostMatch {
    pub start: usize,
    pub end: usize,
}

impl HostMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The host engine refused a pattern or gave up while matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError(pub String);

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HostError {}

pub trait HostMatcher: Send + Sync {
    /// Check that `pattern` compiles.
    fn validate(&self, pattern: &str) -> Result<(), HostError>;

    /// Leftmost match of `pattern` in `text` starting the search at `start`.
    ///
    /// Anchors and lookbehinds see all of `text`, not just the part after
    /// `start`.
    fn find_at(&self, pattern: &str, text: &str, start: usize) -> Result<Option<HostMatch>, HostError>;
}

/// [`HostMatcher`] backed by `fancy-regex`, with its own cache of compiled
/// programs.
pub struct FancyHost {
    programs: Mutex<LruCache<String, Arc<Regex>>>,
    backtrack_limit: usize,
}

impl FancyHost {
    pub fn new(cache_capacity: usize, backtrack_limit: usize) -> Self {
        Self {
            programs: Mutex::new(LruCache::new(cache_capacity)),
            backtrack_limit,
        }
    }

    fn program(&self, pattern: &str) -> Result<Arc<Regex>, HostError> {
        let mut programs = self.programs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(regex) = programs.get(pattern) {
            return Ok(Arc::clone(regex));
        }
        let regex = Arc::new(self.build(pattern)?);
        programs.insert(pattern.to_string(), Arc::clone(&regex));
        Ok(regex)
    }

    fn build(&self, pattern: &str) -> Result<Regex, HostError> {
        RegexBuilder::new(pattern)
            .backtrack_limit(self.backtrack_limit)
            .build()
            .map_err(|e| HostError(e.to_string()))
    }
}

impl Default for FancyHost {
    fn default() -> Self {
        Self::new(256, 1_000_000)
    }
}

impl fmt::Debug for FancyHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FancyHost")
            .field("backtrack_limit", &self.backtrack_limit)
            .finish_non_exhaustive()
    }
}

impl HostMatcher for FancyHost {
    fn validate(&self, pattern: &str) -> Result<(), HostError> {
        self.program(pattern).map(|_| ())
    }

    fn find_at(&self, pattern: &str, text: &str, start: usize) -> Result<Option<HostMatch>, HostError> {
        let regex = self.program(pattern)?;
        let found = regex
            .find_from_pos(text, start)
            .map_err(|e| HostError(e.to_string()))?;
        Ok(found.map(|m| HostMatch {
            start: m.start(),
            end: m.end(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_leftmost_from_offset() {
        let host = FancyHost::default();
        assert_eq!(
            host.find_at("b+", "abbcb", 0).unwrap(),
            Some(HostMatch { start: 1, end: 3 })
        );
        assert_eq!(
            host.find_at("b+", "abbcb", 3).unwrap(),
            Some(HostMatch { start: 4, end: 5 })
        );
        assert_eq!(host.find_at("z", "abc", 0).unwrap(), None);
    }

    #[test]
    fn anchors_see_the_whole_text() {
        let host = FancyHost::default();
        assert_eq!(host.find_at("^a", "aa", 1).unwrap(), None);
        assert_eq!(
            host.find_at(r"(?<=a)b", "ab", 1).unwrap(),
            Some(HostMatch { start: 1, end: 2 })
        );
    }

    #[test]
    fn supports_backreferences_and_lookahead() {
        let host = FancyHost::default();
        assert_eq!(
            host.find_at(r"(a|b)(?:\1)(?=c)", "abbc", 0).unwrap(),
            Some(HostMatch { start: 1, end: 3 })
        );
    }

    #[test]
    fn rejects_bad_patterns() {
        let host = FancyHost::default();
        assert!(host.validate("(a").is_err());
        assert!(host.validate("a(?=b)").is_ok());
    }
}

//! Compiled patterns: matching, iteration, replacement and splitting.
//!
//! A [`CompiledPattern`] is cheap to clone and shares its compiled program
//! with every other clone. Each call builds its own result state.

mod fragment;
mod recovery;
mod replace;
mod split;

use std::sync::Arc;
use std::time::Duration;

use crate::engine::Program;
use crate::error::MatchError;
use crate::host::{FancyHost, HostMatcher};
use crate::options::CompileFlags;
use crate::result::MatchResult;

pub use replace::{NoExpand, Replacer};

#[derive(Debug)]
pub struct CompiledPattern<H: HostMatcher = FancyHost> {
    program: Arc<Program>,
    host: Arc<H>,
    timeout: Option<Duration>,
}

impl<H: HostMatcher> Clone for CompiledPattern<H> {
    fn clone(&self) -> Self {
        Self {
            program: Arc::clone(&self.program),
            host: Arc::clone(&self.host),
            timeout: self.timeout,
        }
    }
}

impl<H: HostMatcher> CompiledPattern<H> {
    pub(crate) fn new(program: Arc<Program>, host: Arc<H>, timeout: Option<Duration>) -> Self {
        Self {
            program,
            host,
            timeout,
        }
    }

    #[cfg(test)]
    pub(crate) fn program(&self) -> &Program {
        &self.program
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.program.source
    }

    /// The translated pattern handed to the host engine.
    pub fn host_pattern(&self) -> &str {
        &self.program.host_pattern
    }

    pub fn flags(&self) -> CompileFlags {
        self.program.flags
    }

    /// Same pattern with a different recovery deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// First match at or after byte offset `start`.
    ///
    /// A failed match is `Ok` with `success == false`.
    pub fn match_at(&self, input: &str, start: usize) -> Result<MatchResult, MatchError> {
        if start > input.len() || !input.is_char_boundary(start) {
            return Err(MatchError::StartOutOfRange {
                start,
                len: input.len(),
            });
        }
        recovery::run(&self.program, self.host.as_ref(), input, start, self.timeout)
    }

    pub fn is_match(&self, input: &str) -> Result<bool, MatchError> {
        self.match_at(input, 0).map(|m| m.success)
    }

    /// Successive non-overlapping matches from `start`.
    ///
    /// After an empty match the next attempt begins one character later.
    /// Iteration stops after the first error.
    pub fn matches<'p, 't>(&'p self, input: &'t str, start: usize) -> Matches<'p, 't, H> {
        Matches {
            pattern: self,
            input,
            next: Some(start),
        }
    }

    pub fn group_names(&self) -> Vec<String> {
        self.program.group_names.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn group_numbers(&self) -> Vec<usize> {
        self.program.slots.numbers().to_vec()
    }

    pub fn group_number_from_name(&self, name: &str) -> Option<usize> {
        self.program.slots.number_for_name(name)
    }

    pub fn group_name_from_number(&self, number: usize) -> Option<String> {
        self.program.slots.name_for_number(number)
    }
}

/// Iterator returned by [`CompiledPattern::matches`].
pub struct Matches<'p, 't, H: HostMatcher = FancyHost> {
    pattern: &'p CompiledPattern<H>,
    input: &'t str,
    next: Option<usize>,
}

impl<H: HostMatcher> Iterator for Matches<'_, '_, H> {
    type Item = Result<MatchResult, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next.take()?;
        let m = match self.pattern.match_at(self.input, start) {
            Ok(m) => m,
            Err(e) => return Some(Err(e)),
        };
        if !m.success {
            return None;
        }
        self.next = if m.length > 0 {
            Some(m.end())
        } else {
            self.input[m.end()..]
                .chars()
                .next()
                .map(|c| m.end() + c.len_utf8())
        };
        Some(Ok(m))
    }
}

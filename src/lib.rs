//! .NET-dialect regular expressions on top of a flat host engine.
//!
//! Patterns are tokenized, their groups numbered the way .NET numbers them,
//! and the tree rewritten into a pattern `fancy-regex` runs directly. The
//! host reports only where the whole pattern matched; every group's full
//! capture history, including each repetition of a quantified group, is
//! recovered afterwards by matching fragments of the rewritten pattern.
//!
//! # Example
//!
//! ```rust
//! use netregex::{RegexOptions, compile};
//!
//! let date = compile(r"(?<year>\d{4})-(?<month>\d{2})", RegexOptions::default()).unwrap();
//! let m = date.match_at("2024-06", 0).unwrap();
//! assert_eq!(m.group("year").unwrap().value(), "2024");
//! assert_eq!(m.group("month").unwrap().index(), 5);
//!
//! let list = compile(r"(\d+,)+", RegexOptions::default()).unwrap();
//! let m = list.match_at("1,2,3,", 0).unwrap();
//! assert_eq!(m.get(1).unwrap().captures.len(), 3);
//!
//! assert_eq!(date.replace_all("2024-06", "${month}/${year}").unwrap(), "06/2024");
//! ```

mod cache;
pub mod engine;
pub mod error;
pub mod groups;
pub mod host;
pub mod options;
mod pattern;
mod result;
pub mod rewrite;
pub mod syntax;

pub use engine::{CacheStats, Engine, EngineConfig};
pub use error::{
    CompileError, MatchError, MatchTimeoutError, NotSupportedError, NotSupportedKind,
    PatternSyntaxError, SyntaxErrorKind,
};
pub use host::{FancyHost, HostError, HostMatch, HostMatcher};
pub use options::{CompileFlags, RegexOptions};
pub use pattern::{CompiledPattern, Matches, NoExpand, Replacer};
pub use result::{CaptureResult, GroupResult, MatchResult};

use syntax::char_table::should_escape;
use syntax::class::code_point_char;
use syntax::escape::{ScannedEscape, scan_escape};

/// Compile `pattern` with a default [`Engine`] of its own.
///
/// Every call builds a fresh engine, so nothing is cached between calls.
/// Keep an [`Engine`] around to reuse compiled patterns:
///
/// ```rust
/// use netregex::{Engine, RegexOptions};
///
/// let engine = Engine::new();
/// for _ in 0..3 {
///     engine.compile(r"(\w+)@(\w+)", RegexOptions::default()).unwrap();
/// }
/// assert_eq!(engine.cache_stats().hits, 2);
/// ```
pub fn compile(pattern: &str, options: RegexOptions) -> Result<CompiledPattern, CompileError> {
    Engine::new().compile(pattern, options)
}

/// Escape `text` so it matches itself literally.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !should_escape(c) {
            out.push(c);
            continue;
        }
        out.push('\\');
        match c {
            '\t' => out.push('t'),
            '\n' => out.push('n'),
            '\r' => out.push('r'),
            '\x0b' => out.push('v'),
            '\x0c' => out.push('f'),
            c => out.push(c),
        }
    }
    out
}

/// Undo [`escape`], and decode every other character escape as well.
pub fn unescape(text: &str) -> Result<String, PatternSyntaxError> {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(at) = text[pos..].find('\\').map(|i| pos + i) {
        out.push_str(&text[pos..at]);
        let (escape, end) = scan_escape(text, at, true)?;
        match escape {
            ScannedEscape::Char(kind) => out.push(code_point_char(kind.code_point())),
            ScannedEscape::Class(_) => {
                let c = syntax::escape::char_at(text, at + 1).unwrap_or('\\');
                return Err(error::syntax(SyntaxErrorKind::UnrecognizedEscape(c), at));
            }
        }
        pos = end;
    }
    out.push_str(&text[pos..]);
    Ok(out)
}

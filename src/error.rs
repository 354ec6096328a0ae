//! Error taxonomy for compiling and matching patterns.

use std::fmt;
use std::time::Duration;

/// Malformed pattern syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSyntaxError {
    pub kind: SyntaxErrorKind,
    /// Byte offset into the source pattern where the problem was detected.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnterminatedGroup,
    UnbalancedParenthesis,
    UnterminatedCharClass,
    UnterminatedComment,
    DanglingEscape,
    UnrecognizedEscape(char),
    InsufficientHexDigits,
    InsufficientUnicodeDigits,
    MissingControlChar,
    UnrecognizedControlChar(char),
    UnknownCategory(String),
    MalformedCategory,
    MalformedGroupName,
    InvalidGroupNameStart(char),
    UnrecognizedGroupingConstruct,
    QuantifierFollowsNothing,
    NestedQuantifier,
    ReversedQuantifierRange,
    ReversedCharRange,
    RangeWithClassEscape,
    SubtractionMustBeLast,
    UndefinedGroupReference(String),
    MalformedNamedReference,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedGroup => write!(f, "Not enough )'s"),
            Self::UnbalancedParenthesis => write!(f, "Too many )'s"),
            Self::UnterminatedCharClass => write!(f, "Unterminated [] set"),
            Self::UnterminatedComment => write!(f, "Unterminated (?#...) comment"),
            Self::DanglingEscape => write!(f, "Illegal \\ at end of pattern"),
            Self::UnrecognizedEscape(c) => write!(f, "Unrecognized escape sequence \\{c}"),
            Self::InsufficientHexDigits => write!(f, "Insufficient hex digits"),
            Self::InsufficientUnicodeDigits => write!(f, "Insufficient unicode digits"),
            Self::MissingControlChar => write!(f, "Missing control character"),
            Self::UnrecognizedControlChar(c) => write!(f, "Unrecognized control character {c:?}"),
            Self::UnknownCategory(name) => write!(f, "Unknown property '{name}'"),
            Self::MalformedCategory => write!(f, "Malformed \\p{{X}} character escape"),
            Self::MalformedGroupName => write!(f, "Invalid group name"),
            Self::InvalidGroupNameStart(c) => {
                write!(f, "Invalid group name: group names must begin with a word character, not {c:?}")
            }
            Self::UnrecognizedGroupingConstruct => write!(f, "Unrecognized grouping construct"),
            Self::QuantifierFollowsNothing => write!(f, "Quantifier following nothing"),
            Self::NestedQuantifier => write!(f, "Nested quantifier"),
            Self::ReversedQuantifierRange => write!(f, "Illegal {{x,y}} with x > y"),
            Self::ReversedCharRange => write!(f, "[x-y] range in reverse order"),
            Self::RangeWithClassEscape => {
                write!(f, "A subtraction or class escape cannot be a range endpoint")
            }
            Self::SubtractionMustBeLast => {
                write!(f, "A subtraction must be the last element in a character class")
            }
            Self::UndefinedGroupReference(name) => {
                write!(f, "Reference to undefined group '{name}'")
            }
            Self::MalformedNamedReference => write!(f, "Malformed \\k<...> named back reference"),
        }
    }
}

impl fmt::Display for PatternSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid pattern at offset {}: {}", self.offset, self.kind)
    }
}

impl std::error::Error for PatternSyntaxError {}

/// A well-formed construct the flat host engine cannot reproduce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotSupportedError {
    pub kind: NotSupportedKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotSupportedKind {
    ForwardReference(String),
    SelfReference(String),
    AncestorReference(String),
    AmbiguousBackreference(String),
    AmbiguousSlot(String),
    CaseInsensitiveBackreference(String),
    BalancingGroup,
    ConditionalGroup,
    ContiguousAnchorPosition,
    HostRejected(String),
}

impl fmt::Display for NotSupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForwardReference(name) => {
                write!(f, "backreference to group '{name}' before it is opened")
            }
            Self::SelfReference(name) => {
                write!(f, "backreference to group '{name}' from inside itself")
            }
            Self::AncestorReference(name) => {
                write!(f, "backreference to enclosing group '{name}'")
            }
            Self::AmbiguousBackreference(name) => {
                write!(f, "backreference to '{name}', which names more than one group")
            }
            Self::AmbiguousSlot(name) => {
                write!(f, "group '{name}' is shared by nested groups")
            }
            Self::CaseInsensitiveBackreference(name) => {
                write!(f, "case-insensitive backreference to group '{name}'")
            }
            Self::BalancingGroup => write!(f, "balancing groups"),
            Self::ConditionalGroup => write!(f, "conditional alternation groups"),
            Self::ContiguousAnchorPosition => write!(f, "\\G anywhere but the start of the pattern"),
            Self::HostRejected(msg) => write!(f, "host engine rejected the translated pattern: {msg}"),
        }
    }
}

impl fmt::Display for NotSupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not supported at offset {}: {}", self.offset, self.kind)
    }
}

impl std::error::Error for NotSupportedError {}

/// Any error raised by `compile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Syntax(PatternSyntaxError),
    NotSupported(NotSupportedError),
}

impl CompileError {
    pub fn offset(&self) -> usize {
        match self {
            Self::Syntax(e) => e.offset,
            Self::NotSupported(e) => e.offset,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => e.fmt(f),
            Self::NotSupported(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(e) => Some(e),
            Self::NotSupported(e) => Some(e),
        }
    }
}

impl From<PatternSyntaxError> for CompileError {
    fn from(e: PatternSyntaxError) -> Self {
        Self::Syntax(e)
    }
}

impl From<NotSupportedError> for CompileError {
    fn from(e: NotSupportedError) -> Self {
        Self::NotSupported(e)
    }
}

/// The match deadline passed while captures were being recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTimeoutError {
    pub elapsed: Duration,
    pub limit: Duration,
}

impl fmt::Display for MatchTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match timed out after {:?} (limit {:?})",
            self.elapsed, self.limit
        )
    }
}

impl std::error::Error for MatchTimeoutError {}

/// Any error raised while matching. A failed match is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    Timeout(MatchTimeoutError),
    StartOutOfRange { start: usize, len: usize },
    Host(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(e) => e.fmt(f),
            Self::StartOutOfRange { start, len } => {
                write!(f, "Start offset {start} is not a character boundary in input of length {len}")
            }
            Self::Host(msg) => write!(f, "Host engine failure: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<MatchTimeoutError> for MatchError {
    fn from(e: MatchTimeoutError) -> Self {
        Self::Timeout(e)
    }
}

pub(crate) fn syntax(kind: SyntaxErrorKind, offset: usize) -> PatternSyntaxError {
    PatternSyntaxError { kind, offset }
}

pub(crate) fn not_supported(kind: NotSupportedKind, offset: usize) -> NotSupportedError {
    NotSupportedError { kind, offset }
}

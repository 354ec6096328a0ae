//! Token tree produced by the tokenizer.
//!
//! Leaves keep their raw text in `text`. Containers (`Group`,
//! `AlternationGroup`, `TempGroup`) keep a fixed prefix in `text`, an ordered
//! list of children, and a fixed suffix, so that
//! `length == text.len() + sum(children.length) + suffix.len()`.

use crate::options::{OptionDelta, RegexOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset in the pattern this token was last serialized into.
    pub offset: usize,
    /// Byte length, including children for containers.
    pub length: usize,
    /// Raw text for leaves, opening text for containers.
    pub text: String,
    /// Closing text for containers, empty for leaves.
    pub suffix: String,
    pub children: Vec<Token>,
    /// Options in effect where this token appears.
    pub options: RegexOptions,
    /// Raw index of the group descriptor owning this `Group` token.
    pub group: Option<usize>,
}

impl Token {
    pub fn leaf(kind: TokenKind, offset: usize, text: impl Into<String>, options: RegexOptions) -> Self {
        let text = text.into();
        Self {
            kind,
            offset,
            length: text.len(),
            text,
            suffix: String::new(),
            children: Vec::new(),
            options,
            group: None,
        }
    }

    pub fn container(
        kind: TokenKind,
        offset: usize,
        prefix: impl Into<String>,
        children: Vec<Token>,
        suffix: impl Into<String>,
        options: RegexOptions,
    ) -> Self {
        let text = prefix.into();
        let suffix = suffix.into();
        let length = text.len() + children.iter().map(|c| c.length).sum::<usize>() + suffix.len();
        Self {
            kind,
            offset,
            length,
            text,
            suffix,
            children,
            options,
            group: None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Group | TokenKind::AlternationGroup | TokenKind::TempGroup
        ) && !(self.kind == TokenKind::TempGroup && self.children.is_empty() && self.suffix.is_empty())
    }

    /// The construct child of a `Group`, if any (`?:`, `?<name>`, `?i:` …).
    pub fn construct(&self) -> Option<&Token> {
        if self.kind != TokenKind::Group {
            return None;
        }
        self.children.first().filter(|c| {
            matches!(
                c.kind,
                TokenKind::GroupConstruct(_)
                    | TokenKind::GroupConstructName(_)
                    | TokenKind::GroupConstructImnsx(_)
            )
        })
    }

    /// Children of a container after its construct token.
    pub fn body(&self) -> &[Token] {
        let skip = usize::from(self.construct().is_some());
        &self.children[skip..]
    }

    /// The lookahead or lookbehind construct of a lookaround group.
    pub fn lookaround(&self) -> Option<Construct> {
        match self.construct().map(|c| &c.kind) {
            Some(TokenKind::GroupConstruct(
                c @ (Construct::Lookahead { .. } | Construct::Lookbehind { .. }),
            )) => Some(*c),
            _ => None,
        }
    }

    pub fn is_lookaround(&self) -> bool {
        self.lookaround().is_some()
    }

    /// True for a bare `(?imnsx)` group, which only changes options.
    pub fn is_bare_options(&self) -> bool {
        matches!(
            self.construct().map(|c| &c.kind),
            Some(TokenKind::GroupConstructImnsx(InlineOptions { scoped: false, .. }))
        )
    }

    pub fn quantifier(&self) -> Option<&Quantifier> {
        match &self.kind {
            TokenKind::Quantifier(q) => Some(q),
            _ => None,
        }
    }

    /// End offset (exclusive).
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Pre-order walk over this token and every descendant.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Token)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A run of ordinary characters.
    Literal,
    EscapedChar(EscapeKind),
    EscapedCharClass(ClassEscape),
    /// `^` or `$`.
    Anchor(Anchor),
    /// `.`
    AnyChar,
    EscapedAnchor(EscapedAnchor),
    Backreference(BackrefTarget),
    /// `[...]`, kept as raw text.
    CharGroup,
    /// `( ... )`; the first child may be a construct token.
    Group,
    GroupConstruct(Construct),
    GroupConstructName(GroupName),
    GroupConstructImnsx(InlineOptions),
    Quantifier(Quantifier),
    Alternation,
    /// `(?(condition)yes|no)`; the first child is the condition.
    AlternationGroup,
    /// `(?#...)`, or whitespace and `#` comments under `x`.
    Comment,
    /// Transparent wrapper introduced by the rewriter.
    TempGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    /// `\t \n \r \f \v \a \e`
    Named(char),
    Octal(u32),
    Hex(u32),
    Unicode(u32),
    Control(u32),
    /// An escaped character that stands for itself, like `\.` or `\\`.
    Meta(char),
}

impl EscapeKind {
    pub fn code_point(&self) -> u32 {
        match *self {
            Self::Named(c) => match c {
                't' => 0x09,
                'n' => 0x0A,
                'v' => 0x0B,
                'f' => 0x0C,
                'r' => 0x0D,
                'a' => 0x07,
                'e' => 0x1B,
                'b' => 0x08,
                other => other as u32,
            },
            Self::Octal(n) | Self::Hex(n) | Self::Unicode(n) | Self::Control(n) => n,
            Self::Meta(c) => c as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassEscape {
    Digit { negated: bool },
    Word { negated: bool },
    Space { negated: bool },
    /// `\p{name}` / `\P{name}`.
    Category { name: String, negated: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapedAnchor {
    /// `\A`
    StartOfInput,
    /// `\Z`
    EndOfInputOrNewline,
    /// `\z`
    EndOfInput,
    /// `\G`
    Contiguous,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
}

/// What a backreference names, and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackrefTarget {
    pub name: GroupRef,
    /// `true` for `\NN` with two or more digits, which may turn out to be octal.
    pub ambiguous: bool,
    /// Raw index of the referenced descriptor, set by the rewriter.
    pub resolved: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupRef {
    Number(usize),
    Name(String),
}

impl std::fmt::Display for GroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    /// `?:`
    NonCapturing,
    /// `?=` / `?!`
    Lookahead { negated: bool },
    /// `?<=` / `?<!`
    Lookbehind { negated: bool },
    /// `?>`
    Atomic,
}

/// `?<name>`, `?'name'`, or the balancing forms `?<a-b>` / `?<-b>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupName {
    pub name: Option<GroupRef>,
    pub balance: Option<GroupRef>,
}

/// `?imnsx-imnsx` with or without a trailing `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineOptions {
    pub delta: OptionDelta,
    /// `true` for the scoped `(?i:...)` form.
    pub scoped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub min: usize,
    pub max: Option<usize>,
    pub lazy: bool,
}

impl Quantifier {
    /// True when more than one repetition is possible.
    pub fn repeats(&self) -> bool {
        self.max.is_none_or(|m| m > 1)
    }
}

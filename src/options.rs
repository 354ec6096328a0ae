//! Compile options and the per-pattern flags derived from them.

use std::fmt;

/// User-facing compile options, one bit per inline option letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegexOptions {
    /// `i`: case-insensitive matching.
    pub ignore_case: bool,
    /// `m`: `^` and `$` match at line boundaries.
    pub multiline: bool,
    /// `n`: unnamed groups do not capture.
    pub explicit_capture: bool,
    /// `s`: `.` also matches `\n`.
    pub singleline: bool,
    /// `x`: unescaped whitespace and `#` comments are ignored.
    pub ignore_whitespace: bool,
}

impl RegexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a letter string such as `"imx"`.
    ///
    /// Returns the first unrecognized letter on failure.
    pub fn parse(letters: &str) -> Result<Self, char> {
        let mut options = Self::default();
        for c in letters.chars() {
            if !options.set_letter(c, true) {
                return Err(c);
            }
        }
        Ok(options)
    }

    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    pub fn multiline(mut self, yes: bool) -> Self {
        self.multiline = yes;
        self
    }

    pub fn explicit_capture(mut self, yes: bool) -> Self {
        self.explicit_capture = yes;
        self
    }

    pub fn singleline(mut self, yes: bool) -> Self {
        self.singleline = yes;
        self
    }

    pub fn ignore_whitespace(mut self, yes: bool) -> Self {
        self.ignore_whitespace = yes;
        self
    }

    /// Set or clear the option named by an inline letter.
    ///
    /// Returns `false` if the letter is not one of `imnsx`.
    pub fn set_letter(&mut self, letter: char, value: bool) -> bool {
        match letter.to_ascii_lowercase() {
            'i' => self.ignore_case = value,
            'm' => self.multiline = value,
            'n' => self.explicit_capture = value,
            's' => self.singleline = value,
            'x' => self.ignore_whitespace = value,
            _ => return false,
        }
        true
    }

    /// Apply an inline `(?on-off)` delta.
    pub fn apply(self, delta: &OptionDelta) -> Self {
        let pick = |current: bool, on: bool, off: bool| {
            if off {
                false
            } else if on {
                true
            } else {
                current
            }
        };
        Self {
            ignore_case: pick(
                self.ignore_case,
                delta.enable.ignore_case,
                delta.disable.ignore_case,
            ),
            multiline: pick(
                self.multiline,
                delta.enable.multiline,
                delta.disable.multiline,
            ),
            explicit_capture: pick(
                self.explicit_capture,
                delta.enable.explicit_capture,
                delta.disable.explicit_capture,
            ),
            singleline: pick(
                self.singleline,
                delta.enable.singleline,
                delta.disable.singleline,
            ),
            ignore_whitespace: pick(
                self.ignore_whitespace,
                delta.enable.ignore_whitespace,
                delta.disable.ignore_whitespace,
            ),
        }
    }
}

impl fmt::Display for RegexOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, letter) in [
            (self.ignore_case, 'i'),
            (self.multiline, 'm'),
            (self.explicit_capture, 'n'),
            (self.singleline, 's'),
            (self.ignore_whitespace, 'x'),
        ] {
            if on {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// The letters switched on and off by one inline option construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionDelta {
    pub enable: RegexOptions,
    pub disable: RegexOptions,
}

impl OptionDelta {
    /// Net effect on case sensitivity: `Some(true)` turns `i` on,
    /// `Some(false)` turns it off.
    pub fn ignore_case(&self) -> Option<bool> {
        if self.disable.ignore_case {
            Some(false)
        } else if self.enable.ignore_case {
            Some(true)
        } else {
            None
        }
    }
}

/// Immutable flags attached to one compiled pattern.
///
/// The derived fields record what the host pattern itself cannot express and
/// must be enforced by the match driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileFlags {
    pub ignore_case: bool,
    pub multiline: bool,
    pub singleline: bool,
    pub ignore_whitespace: bool,
    pub explicit_capture: bool,
    /// `\A` at the very start: a match must begin at absolute position 0.
    pub must_capture_first_char: bool,
    /// `\G` at the very start: a match must begin exactly at the start offset.
    pub is_contiguous_anchor: bool,
    /// The pattern contains a rewritten `$`.
    pub has_multiline_end_anchor: bool,
    /// The pattern can never match.
    pub always_fails: bool,
}

impl CompileFlags {
    pub fn from_options(options: RegexOptions) -> Self {
        Self {
            ignore_case: options.ignore_case,
            multiline: options.multiline,
            singleline: options.singleline,
            ignore_whitespace: options.ignore_whitespace,
            explicit_capture: options.explicit_capture,
            ..Self::default()
        }
    }
}

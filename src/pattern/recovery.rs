//! Capture recovery.
//!
//! The host reports only where the whole pattern matched. To learn where
//! each group matched, the rewritten token tree is walked left to right and
//! small fragments of it are matched one at a time, each anchored where the
//! previous one ended and constrained by a lookahead over everything that
//! must still follow. Inside a capture the walk repeats on the group's body
//! with the capture's end as the new end of text.

use std::collections::HashMap;
use std::ops::Range;
use std::time::{Duration, Instant};

use itertools::Itertools;

use crate::engine::Program;
use crate::error::{MatchError, MatchTimeoutError};
use crate::groups::GroupRegistry;
use crate::host::{HostMatch, HostMatcher};
use crate::result::{CaptureResult, GroupResult, MatchResult};
use crate::rewrite::host_literal;
use crate::syntax::token::{Construct, Quantifier, Token, TokenKind};
use crate::syntax::width::max_width;

use super::fragment::FragmentWriter;

/// Every capture recorded so far, per raw group index.
pub(super) struct Captures<'i> {
    input: &'i str,
    by_group: HashMap<usize, Vec<Capture>>,
    seq: u64,
}

#[derive(Debug, Clone, Copy)]
struct Capture {
    seq: u64,
    start: usize,
    end: usize,
}

impl<'i> Captures<'i> {
    pub fn new(input: &'i str) -> Self {
        Self {
            input,
            by_group: HashMap::new(),
            seq: 0,
        }
    }

    pub fn record(&mut self, raw: usize, start: usize, end: usize) {
        self.seq += 1;
        self.by_group.entry(raw).or_default().push(Capture {
            seq: self.seq,
            start,
            end,
        });
    }

    /// Text of the most recent capture of group `raw`.
    pub fn last_value(&self, raw: usize) -> Option<&'i str> {
        let last = self.by_group.get(&raw)?.last()?;
        Some(&self.input[last.start..last.end])
    }
}

struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    fn check(&self) -> Result<(), MatchTimeoutError> {
        let Some(limit) = self.limit else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed >= limit {
            return Err(MatchTimeoutError { elapsed, limit });
        }
        Ok(())
    }
}

/// Where the text currently being recovered ends. `None` is the end of the
/// whole match, which needs no constraint.
#[derive(Clone, Copy)]
struct Context {
    end: Option<usize>,
}

/// One atom of a sequence and the quantifier applied to it.
struct Item<'t> {
    atom: &'t Token,
    quantifier: Option<&'t Quantifier>,
    range: Range<usize>,
}

pub(super) fn run<H: HostMatcher>(
    program: &Program,
    host: &H,
    input: &str,
    start: usize,
    timeout: Option<Duration>,
) -> Result<MatchResult, MatchError> {
    let failure = || Ok(MatchResult::failure(&program.group_names));
    let flags = program.flags;
    if flags.always_fails {
        return failure();
    }
    let mut recovery = Recovery {
        program,
        host,
        input,
        deadline: Deadline {
            started: Instant::now(),
            limit: timeout,
        },
        captures: Captures::new(input),
    };
    let Some(found) = recovery.find(&program.host_pattern, input, start)? else {
        return failure();
    };
    if (flags.is_contiguous_anchor && found.start != start)
        || (flags.must_capture_first_char && found.start != 0)
    {
        return failure();
    }
    recovery.sequence(&program.tokens, found.start, Context { end: None })?;
    Ok(recovery.assemble(found))
}

struct Recovery<'p, 'i, H> {
    program: &'p Program,
    host: &'p H,
    input: &'i str,
    deadline: Deadline,
    captures: Captures<'i>,
}

impl<H: HostMatcher> Recovery<'_, '_, H> {
    fn find(&self, pattern: &str, text: &str, at: usize) -> Result<Option<HostMatch>, MatchError> {
        self.deadline.check()?;
        self.host
            .find_at(pattern, text, at)
            .map_err(|e| MatchError::Host(e.to_string()))
    }

    /// End of a match of `pattern` that starts exactly at `at`.
    fn anchored(&self, pattern: &str, text: &str, at: usize) -> Result<Option<usize>, MatchError> {
        Ok(self
            .find(pattern, text, at)?
            .filter(|m| m.start == at)
            .map(|m| m.end))
    }

    fn writer(&self) -> FragmentWriter<'_> {
        FragmentWriter::new(&self.program.registry, &self.captures)
    }

    /// Length of the text a fragment searches. Past a context end the input
    /// is kept only as far as the pattern's assertions can read, plus two
    /// characters so none of them sees the cut.
    fn text_len(&self, ctx: Context) -> usize {
        let (Some(end), Some(reach)) = (ctx.end, self.program.reach) else {
            return self.input.len();
        };
        if reach == 0 {
            return end;
        }
        self.input[end..]
            .char_indices()
            .nth(reach + 2)
            .map_or(self.input.len(), |(i, _)| end + i)
    }

    fn text(&self, ctx: Context) -> &str {
        &self.input[..self.text_len(ctx)]
    }

    /// Pins the context end: the kept text past it, then the end of the
    /// searched text.
    fn end_pattern(&self, ctx: Context) -> String {
        match ctx.end {
            None => String::new(),
            Some(end) => format!(r"{}\z", host_literal(&self.input[end..self.text_len(ctx)])),
        }
    }

    fn sequence(&mut self, tokens: &[Token], start: usize, ctx: Context) -> Result<(), MatchError> {
        if !contains_captures(&self.program.registry, tokens) {
            return Ok(());
        }
        let end = self.end_pattern(ctx);
        let Some(branch) = self.choose_branch(tokens, start, ctx, &end)? else {
            return Ok(());
        };

        let items = items(branch);
        let mut cursor = start;
        let mut done = 0;
        for item in &items {
            if !self.is_stop(item.atom) {
                continue;
            }
            let stop = &branch[item.range.clone()];
            let rest = &branch[item.range.end..];
            let between = &branch[done..item.range.start];
            let text = self.text(ctx);
            if !between.is_empty() {
                let pattern = self.writer().piece(between).lookahead(&[stop, rest], &end).finish();
                match self.anchored(&pattern, text, cursor)? {
                    Some(e) => cursor = e,
                    None => return Ok(()),
                }
            }
            let pattern = self.writer().piece(stop).lookahead(&[rest], &end).finish();
            let Some(stop_end) = self.anchored(&pattern, text, cursor)? else {
                return Ok(());
            };
            self.stop(item, cursor, stop_end)?;
            cursor = stop_end;
            done = item.range.end;
        }
        Ok(())
    }

    /// The alternative of `tokens` that matched at `start`.
    fn choose_branch<'t>(
        &self,
        tokens: &'t [Token],
        start: usize,
        ctx: Context,
        end: &str,
    ) -> Result<Option<&'t [Token]>, MatchError> {
        let branches: Vec<&[Token]> = tokens.split(|t| t.kind == TokenKind::Alternation).collect();
        if branches.len() == 1 {
            return Ok(Some(tokens));
        }
        let text = self.text(ctx);
        for branch in branches {
            let pattern = self.writer().piece(branch).lookahead(&[], end).finish();
            if self.anchored(&pattern, text, start)?.is_some() {
                return Ok(Some(branch));
            }
        }
        Ok(None)
    }

    /// Record the captures of one stop spanning `[a, b)` and recover inside
    /// each repetition.
    fn stop(&mut self, item: &Item<'_>, a: usize, b: usize) -> Result<(), MatchError> {
        if item.atom.is_lookaround() {
            return self.lookaround(item.atom, a);
        }
        let reps = match item.quantifier {
            Some(q) if a == b && q.min == 0 => self.empty_iteration(item.atom, a, q)?,
            Some(q) if q.repeats() => self.repetitions(item.atom, a, b)?,
            _ => vec![(a, b)],
        };
        let atom = item.atom;
        if let Some(raw) = atom.group.filter(|&raw| self.is_capturing(raw)) {
            for &(s, e) in &reps {
                self.captures.record(raw, s, e);
            }
        }
        let body = match atom.kind {
            TokenKind::Group => atom.body(),
            _ => &atom.children[..],
        };
        for (s, e) in reps {
            self.sequence(body, s, Context { end: Some(e) })?;
        }
        Ok(())
    }

    /// A greedy optional atom that matched nothing still ran once when its
    /// body can match empty there.
    fn empty_iteration(
        &self,
        atom: &Token,
        at: usize,
        q: &Quantifier,
    ) -> Result<Vec<(usize, usize)>, MatchError> {
        if q.lazy {
            return Ok(Vec::new());
        }
        let ctx = Context { end: Some(at) };
        let pattern = self
            .writer()
            .piece(std::slice::from_ref(atom))
            .lookahead(&[], &self.end_pattern(ctx))
            .finish();
        Ok(match self.anchored(&pattern, self.text(ctx), at)? {
            Some(_) => vec![(at, at)],
            None => Vec::new(),
        })
    }

    /// Split `[a, b)`, matched by a quantified atom, into its repetitions.
    fn repetitions(&self, atom: &Token, a: usize, b: usize) -> Result<Vec<(usize, usize)>, MatchError> {
        if a == b {
            return Ok(vec![(a, a)]);
        }
        let unit = std::slice::from_ref(atom);
        let ctx = Context { end: Some(b) };
        let text = self.text(ctx);

        let bare = self.writer().piece(unit).finish();
        if let Some(reps) = self.sweep(&bare, text, a, b)? {
            return Ok(reps);
        }

        // Greedy units can overshoot a boundary the following repetitions
        // need; require the remainder to still be made of units.
        let mut writer = self.writer();
        writer.piece(unit).raw("(?=(?:");
        writer.piece(unit).raw(")*").raw(&self.end_pattern(ctx)).raw(")");
        let tiled = writer.finish();
        if let Some(reps) = self.sweep(&tiled, text, a, b)? {
            return Ok(reps);
        }
        Ok(vec![(a, b)])
    }

    /// Recover inside a positive lookaround that held at `at`. A lookahead's
    /// body starts there and a lookbehind's ends there; both saw the whole
    /// input.
    fn lookaround(&mut self, atom: &Token, at: usize) -> Result<(), MatchError> {
        let body = atom.body();
        let span = match atom.lookaround() {
            Some(Construct::Lookahead { negated: false }) => {
                let pattern = self.writer().piece(body).finish();
                self.anchored(&pattern, self.input, at)?.map(|end| (at, end))
            }
            Some(Construct::Lookbehind { negated: false }) => {
                self.behind(body, at)?.map(|start| (start, at))
            }
            _ => None,
        };
        match span {
            Some((start, end)) => self.sequence(body, start, Context { end: Some(end) }),
            None => Ok(()),
        }
    }

    /// Nearest start from which `body` matches up to exactly `at`.
    fn behind(&self, body: &[Token], at: usize) -> Result<Option<usize>, MatchError> {
        let ctx = Context { end: Some(at) };
        let pattern = self
            .writer()
            .piece(body)
            .lookahead(&[], &self.end_pattern(ctx))
            .finish();
        let text = self.text(ctx);
        let limit = max_width(body).map_or(usize::MAX, |w| w.saturating_add(1));
        let earlier = self.input[..at].char_indices().rev().map(|(i, _)| i);
        for start in std::iter::once(at).chain(earlier).take(limit) {
            if self.anchored(&pattern, text, start)?.is_some() {
                return Ok(Some(start));
            }
        }
        Ok(None)
    }

    /// Match `pattern` repeatedly from `a`; `Some` only if the matches tile
    /// `[a, b)` exactly with non-empty pieces.
    fn sweep(&self, pattern: &str, text: &str, a: usize, b: usize) -> Result<Option<Vec<(usize, usize)>>, MatchError> {
        let mut reps = Vec::new();
        let mut pos = a;
        while pos < b {
            match self.anchored(pattern, text, pos)? {
                Some(e) if e > pos && e <= b => {
                    reps.push((pos, e));
                    pos = e;
                }
                _ => return Ok(None),
            }
        }
        Ok(Some(reps))
    }

    fn is_capturing(&self, raw: usize) -> bool {
        self.program.registry.get(raw).is_some_and(|g| g.is_capturing())
    }

    /// Groups and temporary groups that capture, or hold something that does.
    fn is_stop(&self, atom: &Token) -> bool {
        let body = match atom.kind {
            TokenKind::Group if !is_negative_lookaround(atom) => atom.body(),
            TokenKind::TempGroup if atom.is_container() => &atom.children[..],
            _ => return false,
        };
        atom.group.is_some_and(|raw| self.is_capturing(raw))
            || contains_captures(&self.program.registry, body)
    }

    fn assemble(self, found: HostMatch) -> MatchResult {
        let input = self.input;
        let slots = &self.program.slots;
        let groups = self
            .program
            .group_names
            .iter()
            .enumerate()
            .map(|(dense, (number, name))| {
                let captures = if *number == 0 {
                    vec![CaptureResult::new(input, found.start, found.end)]
                } else {
                    // Members of a shared slot interleave in match order.
                    slots
                        .members(dense)
                        .iter()
                        .filter_map(|raw| self.captures.by_group.get(raw))
                        .kmerge_by(|a, b| a.seq < b.seq)
                        .map(|c| CaptureResult::new(input, c.start, c.end))
                        .collect()
                };
                GroupResult {
                    name: name.clone(),
                    number: *number,
                    captures,
                }
            })
            .collect();
        MatchResult {
            success: true,
            index: found.start,
            length: found.len(),
            value: input[found.start..found.end].to_string(),
            groups,
        }
    }
}

fn items(tokens: &[Token]) -> Vec<Item<'_>> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let quantifier = tokens.get(i + 1).and_then(Token::quantifier);
        let len = if quantifier.is_some() { 2 } else { 1 };
        items.push(Item {
            atom: &tokens[i],
            quantifier,
            range: i..i + len,
        });
        i += len;
    }
    items
}

/// A capturing group appears in `tokens` outside any negative lookaround.
fn contains_captures(registry: &GroupRegistry, tokens: &[Token]) -> bool {
    tokens.iter().any(|t| {
        if is_negative_lookaround(t) {
            return false;
        }
        let capturing = t.kind == TokenKind::Group
            && t.group.and_then(|raw| registry.get(raw)).is_some_and(|g| g.is_capturing());
        capturing || contains_captures(registry, &t.children)
    })
}

/// Groups in a negative lookaround never keep a capture.
fn is_negative_lookaround(token: &Token) -> bool {
    matches!(
        token.lookaround(),
        Some(Construct::Lookahead { negated: true } | Construct::Lookbehind { negated: true })
    )
}

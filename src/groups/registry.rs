//! Group descriptors: one per grouping construct, in source order.

use std::ops::Range;

use crate::syntax::token::{Construct, GroupRef, Quantifier, Token, TokenKind};

/// What kind of group a descriptor stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    /// `( ... )` without explicit capture in effect.
    Unnamed,
    /// `(?<name> ... )` or `(?<5> ... )`.
    Named(GroupRef),
    /// `(?<a-b> ... )` / `(?<-b> ... )`.
    Balancing {
        name: Option<GroupRef>,
        balance: GroupRef,
    },
    /// `(?: ... )`, or `( ... )` under explicit capture.
    NonCapturing,
    Lookahead { negated: bool },
    Lookbehind { negated: bool },
    Atomic,
}

#[derive(Debug, Clone)]
pub struct GroupDescriptor {
    /// 1-based position among all descriptors in source order.
    pub raw_index: usize,
    pub kind: GroupKind,
    /// Raw index of the nearest enclosing descriptor. Never owning.
    pub parent: Option<usize>,
    /// Raw indices of directly nested descriptors, in source order.
    pub children: Vec<usize>,
    /// Quantifier applied to the group, if any.
    pub quantifier: Option<Quantifier>,
    pub quantifier_text: String,
    /// Span of the group in the source pattern.
    pub source_span: Range<usize>,
    /// Span of the group in the host pattern; set after serialization.
    pub host_span: Range<usize>,
    /// Slot number, for capturing groups; set by the slot resolver.
    pub slot: Option<usize>,
    /// 1-based group number in the host pattern, for capturing groups.
    pub host_ordinal: Option<usize>,
}

impl GroupDescriptor {
    pub fn is_capturing(&self) -> bool {
        matches!(
            self.kind,
            GroupKind::Unnamed | GroupKind::Named(_) | GroupKind::Balancing { name: Some(_), .. }
        )
    }

    pub fn is_named(&self) -> bool {
        matches!(self.kind, GroupKind::Named(_))
    }

    /// The name or explicit number the group was declared with.
    pub fn declared_name(&self) -> Option<&GroupRef> {
        match &self.kind {
            GroupKind::Named(name) => Some(name),
            GroupKind::Balancing { name, .. } => name.as_ref(),
            _ => None,
        }
    }

    pub fn is_lookaround(&self) -> bool {
        matches!(
            self.kind,
            GroupKind::Lookahead { .. } | GroupKind::Lookbehind { .. }
        )
    }
}

/// Arena of descriptors indexed by raw index.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Vec<GroupDescriptor>,
}

impl GroupRegistry {
    /// Walk `tokens`, create a descriptor for every group and record its raw
    /// index in the owning token.
    pub fn build(tokens: &mut [Token]) -> Self {
        let mut registry = Self::default();
        registry.visit(tokens, None);
        registry
    }

    fn visit(&mut self, tokens: &mut [Token], parent: Option<usize>) {
        for i in 0..tokens.len() {
            let next = tokens[i + 1..].iter().find(|t| t.kind != TokenKind::Comment);
            let (quantifier, quantifier_text) = match next.and_then(|t| Some((t.quantifier()?, t))) {
                Some((q, t)) => (Some(*q), t.text.clone()),
                None => (None, String::new()),
            };
            let token = &mut tokens[i];
            match token.kind {
                TokenKind::Group => match group_kind(token) {
                    Some(kind) => {
                        let raw_index = self.groups.len() + 1;
                        self.groups.push(GroupDescriptor {
                            raw_index,
                            kind,
                            parent,
                            children: Vec::new(),
                            quantifier,
                            quantifier_text,
                            source_span: token.offset..token.end(),
                            host_span: 0..0,
                            slot: None,
                            host_ordinal: None,
                        });
                        if let Some(p) = parent {
                            self.groups[p - 1].children.push(raw_index);
                        }
                        token.group = Some(raw_index);
                        self.visit(&mut token.children, Some(raw_index));
                    }
                    None => self.visit(&mut token.children, parent),
                },
                // The condition of `(?(cond)yes|no)` is not a group of its own.
                TokenKind::AlternationGroup => {
                    let skip = usize::from(!token.children.is_empty());
                    self.visit(&mut token.children[skip..], parent);
                }
                TokenKind::TempGroup => self.visit(&mut token.children, parent),
                _ => {}
            }
        }
    }

    pub fn get(&self, raw_index: usize) -> Option<&GroupDescriptor> {
        raw_index.checked_sub(1).and_then(|i| self.groups.get(i))
    }

    pub(crate) fn get_mut(&mut self, raw_index: usize) -> Option<&mut GroupDescriptor> {
        raw_index.checked_sub(1).and_then(|i| self.groups.get_mut(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupDescriptor> {
        self.groups.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut GroupDescriptor> {
        self.groups.iter_mut()
    }

    pub fn capturing(&self) -> impl Iterator<Item = &GroupDescriptor> {
        self.groups.iter().filter(|g| g.is_capturing())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True when `ancestor` encloses `raw_index` (at any depth).
    pub fn is_ancestor(&self, ancestor: usize, raw_index: usize) -> bool {
        let mut current = self.get(raw_index).and_then(|g| g.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.get(p).and_then(|g| g.parent);
        }
        false
    }
}

/// `None` for inline-option groups, which get no descriptor.
fn group_kind(token: &Token) -> Option<GroupKind> {
    let Some(construct) = token.construct() else {
        return Some(if token.options.explicit_capture {
            GroupKind::NonCapturing
        } else {
            GroupKind::Unnamed
        });
    };
    match &construct.kind {
        TokenKind::GroupConstruct(c) => Some(match *c {
            Construct::NonCapturing => GroupKind::NonCapturing,
            Construct::Lookahead { negated } => GroupKind::Lookahead { negated },
            Construct::Lookbehind { negated } => GroupKind::Lookbehind { negated },
            Construct::Atomic => GroupKind::Atomic,
        }),
        TokenKind::GroupConstructName(name) => Some(match &name.balance {
            Some(balance) => GroupKind::Balancing {
                name: name.name.clone(),
                balance: balance.clone(),
            },
            None => match &name.name {
                Some(n) => GroupKind::Named(n.clone()),
                None => GroupKind::NonCapturing,
            },
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RegexOptions;
    use crate::syntax::tokenize;

    fn registry(src: &str, options: RegexOptions) -> (Vec<Token>, GroupRegistry) {
        let mut tokens = tokenize(src, options).unwrap();
        let registry = GroupRegistry::build(&mut tokens);
        (tokens, registry)
    }

    #[test]
    fn raw_indices_follow_source_order() {
        let (tokens, reg) = registry("(a(?:b(c)))(?<n>d)", RegexOptions::default());
        assert_eq!(reg.len(), 4);
        assert_eq!(tokens[0].group, Some(1));
        let kinds: Vec<&GroupKind> = reg.iter().map(|g| &g.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &GroupKind::Unnamed,
                &GroupKind::NonCapturing,
                &GroupKind::Unnamed,
                &GroupKind::Named(GroupRef::Name("n".into())),
            ]
        );
        assert_eq!(reg.get(3).unwrap().parent, Some(2));
        assert_eq!(reg.get(1).unwrap().children, vec![2]);
        assert!(reg.is_ancestor(1, 3));
        assert!(!reg.is_ancestor(4, 3));
    }

    #[test]
    fn inline_option_groups_get_no_descriptor() {
        let (_, reg) = registry("(?i:(a))(?m)(b)", RegexOptions::default());
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(1).unwrap().parent, None);
    }

    #[test]
    fn explicit_capture_makes_unnamed_groups_plain() {
        let (_, reg) = registry("(a)(?<x>b)", RegexOptions::new().explicit_capture(true));
        assert_eq!(reg.capturing().count(), 1);
        assert_eq!(reg.get(1).unwrap().kind, GroupKind::NonCapturing);
    }

    #[test]
    fn quantifier_and_span_are_recorded() {
        let (_, reg) = registry("x(ab){2,}?", RegexOptions::default());
        let g = reg.get(1).unwrap();
        assert_eq!(g.source_span, 1..5);
        assert_eq!(g.quantifier_text, "{2,}?");
        assert_eq!(
            g.quantifier,
            Some(Quantifier {
                min: 2,
                max: None,
                lazy: true
            })
        );
    }

    #[test]
    fn lookarounds_are_descriptors_but_not_captures() {
        let (_, reg) = registry("(?=(a))(?<!b)", RegexOptions::default());
        assert_eq!(reg.len(), 3);
        assert!(reg.get(1).unwrap().is_lookaround());
        assert_eq!(reg.capturing().count(), 1);
    }
}

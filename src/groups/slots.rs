//! Slot numbering for capturing groups.
//!
//! Unnamed groups take slots `1..=k` in source order. Groups declared with an
//! explicit number keep it, sharing the slot with an unnamed group of the same
//! number. Named groups then take the lowest slots nobody has claimed, in
//! order of first appearance. Slot 0 is the whole match. Slots are stored
//! densely in ascending slot-number order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{NotSupportedError, NotSupportedKind, not_supported};
use crate::syntax::token::GroupRef;

use super::registry::{GroupKind, GroupRegistry};

#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    /// Slot numbers in ascending order; `numbers[dense] == slot`.
    numbers: Vec<usize>,
    dense_of: HashMap<usize, usize>,
    name_to_slot: HashMap<String, usize>,
    slot_to_name: HashMap<usize, String>,
    /// Raw indices of the descriptors sharing each dense slot.
    members: Vec<Vec<usize>>,
}

impl SlotTable {
    /// Number every capturing group in `registry` and record the slot on each
    /// descriptor.
    pub fn resolve(registry: &mut GroupRegistry) -> Result<Self, NotSupportedError> {
        let mut claimed: BTreeSet<usize> = BTreeSet::new();
        claimed.insert(0);
        let mut assigned: BTreeMap<usize, usize> = BTreeMap::new();
        let mut autocap = 1;

        for group in registry.capturing() {
            match group.declared_name() {
                None => {
                    assigned.insert(group.raw_index, autocap);
                    claimed.insert(autocap);
                    autocap += 1;
                }
                Some(GroupRef::Number(n)) => {
                    assigned.insert(group.raw_index, *n);
                    claimed.insert(*n);
                }
                Some(GroupRef::Name(_)) => {}
            }
        }

        let mut name_to_slot: HashMap<String, usize> = HashMap::new();
        let mut next_free = 1;
        for group in registry.capturing() {
            let Some(GroupRef::Name(name)) = group.declared_name() else {
                continue;
            };
            let slot = match name_to_slot.get(name) {
                Some(&slot) => slot,
                None => {
                    while claimed.contains(&next_free) {
                        next_free += 1;
                    }
                    claimed.insert(next_free);
                    name_to_slot.insert(name.clone(), next_free);
                    next_free
                }
            };
            assigned.insert(group.raw_index, slot);
        }

        let numbers: Vec<usize> = claimed.into_iter().collect();
        let dense_of: HashMap<usize, usize> =
            numbers.iter().enumerate().map(|(dense, &slot)| (slot, dense)).collect();
        let mut members = vec![Vec::new(); numbers.len()];
        for (&raw_index, &slot) in &assigned {
            members[dense_of[&slot]].push(raw_index);
            if let Some(group) = registry.get_mut(raw_index) {
                group.slot = Some(slot);
            }
        }

        let slot_to_name = name_to_slot
            .iter()
            .map(|(name, &slot)| (slot, name.clone()))
            .collect();

        let table = Self {
            numbers,
            dense_of,
            name_to_slot,
            slot_to_name,
            members,
        };
        table.check_nesting(registry)?;
        Ok(table)
    }

    /// A slot shared by two groups where one encloses the other has no single
    /// owner for a given stretch of text.
    fn check_nesting(&self, registry: &GroupRegistry) -> Result<(), NotSupportedError> {
        for (dense, members) in self.members.iter().enumerate() {
            for &a in members {
                for &b in members {
                    if a != b && registry.is_ancestor(a, b) {
                        let offset = registry.get(b).map_or(0, |g| g.source_span.start);
                        let name = self.name_for_number(self.numbers[dense]).unwrap_or_default();
                        return Err(not_supported(NotSupportedKind::AmbiguousSlot(name), offset));
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of dense slots, including slot 0.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn numbers(&self) -> &[usize] {
        &self.numbers
    }

    pub fn contains_number(&self, number: usize) -> bool {
        self.dense_of.contains_key(&number)
    }

    pub fn dense_index(&self, number: usize) -> Option<usize> {
        self.dense_of.get(&number).copied()
    }

    /// Slot number for a group name; all-digit names are read as numbers.
    pub fn number_for_name(&self, name: &str) -> Option<usize> {
        if let Some(&slot) = self.name_to_slot.get(name) {
            return Some(slot);
        }
        name.parse::<usize>().ok().filter(|n| self.contains_number(*n))
    }

    pub fn number_for_ref(&self, name: &GroupRef) -> Option<usize> {
        match name {
            GroupRef::Number(n) => self.contains_number(*n).then_some(*n),
            GroupRef::Name(name) => self.number_for_name(name),
        }
    }

    /// The group's name, or its number as text when it has none.
    pub fn name_for_number(&self, number: usize) -> Option<String> {
        if !self.contains_number(number) {
            return None;
        }
        Some(
            self.slot_to_name
                .get(&number)
                .cloned()
                .unwrap_or_else(|| number.to_string()),
        )
    }

    /// Names of all slots in slot order.
    pub fn names(&self) -> Vec<String> {
        self.numbers
            .iter()
            .filter_map(|&n| self.name_for_number(n))
            .collect()
    }

    /// Raw indices of the descriptors sharing a dense slot, in source order.
    pub fn members(&self, dense: usize) -> &[usize] {
        self.members.get(dense).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True for slots declared by name rather than by position.
    pub fn is_named(&self, number: usize) -> bool {
        self.slot_to_name.contains_key(&number)
    }
}

/// The one descriptor owning slot `number`, if exactly one does.
pub(crate) fn single_member(table: &SlotTable, registry: &GroupRegistry, number: usize) -> Option<usize> {
    let dense = table.dense_index(number)?;
    match table.members(dense) {
        [only] if registry.get(*only).is_some_and(|g| !matches!(g.kind, GroupKind::Balancing { .. })) => {
            Some(*only)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RegexOptions;
    use crate::syntax::tokenize;

    fn resolve(src: &str) -> Result<(GroupRegistry, SlotTable), NotSupportedError> {
        let mut tokens = tokenize(src, RegexOptions::default()).unwrap();
        let mut registry = GroupRegistry::build(&mut tokens);
        let table = SlotTable::resolve(&mut registry)?;
        Ok((registry, table))
    }

    #[test]
    fn unnamed_before_named() {
        let (reg, table) = resolve("(?<x>a)(b)(?<y>c)(d)").unwrap();
        assert_eq!(table.numbers(), &[0, 1, 2, 3, 4]);
        assert_eq!(reg.get(2).unwrap().slot, Some(1));
        assert_eq!(reg.get(4).unwrap().slot, Some(2));
        assert_eq!(table.number_for_name("x"), Some(3));
        assert_eq!(table.number_for_name("y"), Some(4));
        assert_eq!(table.names(), vec!["0", "1", "2", "x", "y"]);
    }

    #[test]
    fn explicit_numbers_are_sparse_and_shared() {
        let (_, table) = resolve("(a)(?<5>b)(?<1>c)(?<n>d)").unwrap();
        assert_eq!(table.numbers(), &[0, 1, 2, 5]);
        assert_eq!(table.number_for_name("n"), Some(2));
        assert_eq!(table.members(1), &[1, 3]);
        assert_eq!(table.dense_index(5), Some(3));
        assert!(!table.contains_number(3));
    }

    #[test]
    fn same_name_shares_a_slot() {
        let (_, table) = resolve("(?<w>a)|(?<w>b)").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.members(1), &[1, 2]);
    }

    #[test]
    fn name_and_number_maps_are_inverse() {
        let (_, table) = resolve("(?<a>.)(x)(?<b>.)(?<7>.)(?<c>.)").unwrap();
        for name in ["a", "b", "c"] {
            let n = table.number_for_name(name).unwrap();
            assert_eq!(table.name_for_number(n).as_deref(), Some(name));
        }
        for &n in table.numbers() {
            let name = table.name_for_number(n).unwrap();
            assert_eq!(table.number_for_name(&name), Some(n));
        }
    }

    #[test]
    fn nested_shared_slot_is_rejected() {
        let err = resolve("(?<x>a(?<x>b))").unwrap_err();
        assert_eq!(err.kind, NotSupportedKind::AmbiguousSlot("x".into()));
    }

    #[test]
    fn no_groups_leaves_only_the_whole_match() {
        let (_, table) = resolve("(?:abc)(?=d)").unwrap();
        assert_eq!(table.numbers(), &[0]);
        assert!(table.members(0).is_empty());
    }
}

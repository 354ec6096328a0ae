//! Match results. Built fresh for every match attempt and never mutated
//! afterwards.

/// One matched occurrence of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    /// Byte offset into the input.
    pub index: usize,
    /// Byte length.
    pub length: usize,
    pub value: String,
}

impl CaptureResult {
    pub(crate) fn new(input: &str, index: usize, end: usize) -> Self {
        Self {
            index,
            length: end - index,
            value: input[index..end].to_string(),
        }
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// Every capture of one slot, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupResult {
    /// The group's name, or its number as text.
    pub name: String,
    /// Slot number.
    pub number: usize,
    pub captures: Vec<CaptureResult>,
}

impl GroupResult {
    /// The group took part in the match.
    pub fn success(&self) -> bool {
        !self.captures.is_empty()
    }

    /// The last capture, which is what the group reports as its value.
    pub fn last(&self) -> Option<&CaptureResult> {
        self.captures.last()
    }

    pub fn value(&self) -> &str {
        self.last().map_or("", |c| c.value.as_str())
    }

    pub fn index(&self) -> usize {
        self.last().map_or(0, |c| c.index)
    }

    pub fn length(&self) -> usize {
        self.last().map_or(0, |c| c.length)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub success: bool,
    pub index: usize,
    pub length: usize,
    pub value: String,
    /// One entry per slot in ascending slot order; entry 0 is the whole match.
    pub groups: Vec<GroupResult>,
}

impl MatchResult {
    /// A failed match. Every group is present and empty.
    pub(crate) fn failure(names: &[(usize, String)]) -> Self {
        Self {
            success: false,
            index: 0,
            length: 0,
            value: String::new(),
            groups: names
                .iter()
                .map(|(number, name)| GroupResult {
                    name: name.clone(),
                    number: *number,
                    captures: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }

    /// Group by slot number.
    pub fn get(&self, number: usize) -> Option<&GroupResult> {
        self.groups.iter().find(|g| g.number == number)
    }

    /// Group by name; all-digit names are slot numbers.
    pub fn group(&self, name: &str) -> Option<&GroupResult> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The group with the highest slot number, whether or not it took part
    /// in the match. This is what `$+` substitutes.
    pub fn last_group(&self) -> Option<&GroupResult> {
        self.groups.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        let input = "2024-06";
        MatchResult {
            success: true,
            index: 0,
            length: 7,
            value: input.to_string(),
            groups: vec![
                GroupResult {
                    name: "0".into(),
                    number: 0,
                    captures: vec![CaptureResult::new(input, 0, 7)],
                },
                GroupResult {
                    name: "1".into(),
                    number: 1,
                    captures: vec![],
                },
                GroupResult {
                    name: "year".into(),
                    number: 2,
                    captures: vec![CaptureResult::new(input, 0, 4)],
                },
            ],
        }
    }

    #[test]
    fn lookups() {
        let m = sample();
        assert_eq!(m.group("year").unwrap().value(), "2024");
        assert_eq!(m.get(2).unwrap().name, "year");
        assert!(!m.get(1).unwrap().success());
        assert_eq!(m.get(1).unwrap().value(), "");
        assert!(m.group("nope").is_none());
    }

    #[test]
    fn last_group_is_highest_slot() {
        let mut m = sample();
        assert_eq!(m.last_group().unwrap().number, 2);
        m.groups[2].captures.clear();
        assert_eq!(m.last_group().unwrap().number, 2);
        assert_eq!(m.last_group().unwrap().value(), "");
    }
}

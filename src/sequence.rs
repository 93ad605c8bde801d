use crate::error::{Result, SequenceError};
use crate::name::{parse_item, parse_pattern};
use crate::rename::{RenamePlan, RenameTarget, plan_rename};
use crate::types::{SequenceItem, SequenceKey};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::iter::FusedIterator;
use std::ops::RangeInclusive;

/// All items sharing one [`SequenceKey`], ordered by value.
///
/// Values are unique within a group: two strings with the same key and the
/// same value are the same string. Groups are built by [`group_sequences`]
/// or [`Catalog::build`] and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceGroup {
    key: SequenceKey,
    items: Vec<SequenceItem>,
}

impl SequenceGroup {
    fn from_map(key: SequenceKey, items: BTreeMap<u64, SequenceItem>) -> Self {
        Self {
            key,
            items: items.into_values().collect(),
        }
    }

    pub fn key(&self) -> &SequenceKey {
        &self.key
    }

    pub fn items(&self) -> &[SequenceItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceItem> {
        self.items.iter()
    }

    /// Numeric values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.items.iter().map(SequenceItem::value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Result<&SequenceItem> {
        self.items.first().ok_or(SequenceError::EmptySequence)
    }

    pub fn last(&self) -> Result<&SequenceItem> {
        self.items.last().ok_or(SequenceError::EmptySequence)
    }

    /// The lower median: index `(len - 1) / 2`, so `{1, 3, 5, 7}` gives `3`.
    pub fn middle(&self) -> Result<&SequenceItem> {
        self.items
            .get(self.items.len().saturating_sub(1) / 2)
            .ok_or(SequenceError::EmptySequence)
    }

    /// The member with the smallest value strictly greater than `item`'s.
    ///
    /// Only the value of `item` is consulted; it need not be a member.
    pub fn next(&self, item: &SequenceItem) -> Option<&SequenceItem> {
        self.next_after(item.value())
    }

    pub fn next_after(&self, value: u64) -> Option<&SequenceItem> {
        let idx = self.items.partition_point(|i| i.value() <= value);
        self.items.get(idx)
    }

    /// The member with the largest value strictly less than `item`'s.
    pub fn previous(&self, item: &SequenceItem) -> Option<&SequenceItem> {
        self.previous_before(item.value())
    }

    pub fn previous_before(&self, value: u64) -> Option<&SequenceItem> {
        let idx = self.items.partition_point(|i| i.value() < value);
        idx.checked_sub(1).map(|i| &self.items[i])
    }

    pub fn get(&self, value: u64) -> Option<&SequenceItem> {
        self.items
            .binary_search_by_key(&value, SequenceItem::value)
            .ok()
            .map(|i| &self.items[i])
    }

    pub fn contains(&self, value: u64) -> bool {
        self.get(value).is_some()
    }

    /// Whether `s` is literally one of this group's members.
    pub fn contains_str(&self, s: &str) -> bool {
        self.key
            .matches(s)
            .is_some_and(|item| self.contains(item.value()))
    }

    /// Missing values between the first and last member, ascending.
    ///
    /// The iterator is lazy, so sparse sequences spanning huge ranges cost
    /// nothing up front. Call `gaps()` again to start over.
    pub fn gaps(&self) -> Gaps<'_> {
        Gaps::new(&self.items)
    }

    /// Maximal runs of consecutive values.
    pub fn ranges(&self) -> Vec<RangeInclusive<u64>> {
        let mut ranges: Vec<RangeInclusive<u64>> = Vec::new();
        for value in self.values() {
            match ranges.last_mut() {
                Some(r) if r.end().checked_add(1) == Some(value) => {
                    *r = *r.start()..=value;
                }
                _ => ranges.push(value..=value),
            }
        }
        ranges
    }

    /// Ranges in the compact `1-3, 5, 7-9` form.
    pub fn range_summary(&self) -> String {
        self.ranges()
            .iter()
            .map(|r| {
                if r.start() == r.end() {
                    r.start().to_string()
                } else {
                    format!("{}-{}", r.start(), r.end())
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Plan a rename of every member without looking at anything outside
    /// the group. Use [`Catalog::plan_rename`] to also guard against
    /// overwriting other inputs.
    pub fn plan_rename(&self, target: &RenameTarget) -> Result<RenamePlan> {
        plan_rename(self, target, |_| false)
    }
}

impl<'a> IntoIterator for &'a SequenceGroup {
    type Item = &'a SequenceItem;
    type IntoIter = std::slice::Iter<'a, SequenceItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for SequenceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.key, self.range_summary())
    }
}

/// Lazy iterator over the missing values of a group.
///
/// # Examples
///
/// ```rust
/// use numseq::group_sequences;
///
/// let groups = group_sequences(["f.1", "f.3", "f.5"]);
/// let gaps: Vec<u64> = groups[0].gaps().collect();
/// assert_eq!(gaps, vec![2, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct Gaps<'a> {
    items: &'a [SequenceItem],
    index: usize,
    cursor: u64,
}

impl<'a> Gaps<'a> {
    fn new(items: &'a [SequenceItem]) -> Self {
        let cursor = items.first().map_or(0, |i| i.value().saturating_add(1));
        Self {
            items,
            index: 0,
            cursor,
        }
    }
}

impl Iterator for Gaps<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            let upper = self.items.get(self.index + 1)?.value();
            if self.cursor < upper {
                let v = self.cursor;
                self.cursor += 1;
                return Some(v);
            }
            self.index += 1;
            self.cursor = upper.saturating_add(1);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.items.last() {
            Some(last) if self.index + 1 < self.items.len() => {
                let span = last.value().saturating_sub(self.cursor);
                (0, usize::try_from(span).ok())
            }
            _ => (0, Some(0)),
        }
    }
}

impl FusedIterator for Gaps<'_> {}

/// Partition `paths` into sequences, ordered by key.
///
/// Strings without a numeric run are skipped; duplicates collapse.
///
/// # Examples
///
/// ```rust
/// use numseq::group_sequences;
///
/// let groups = group_sequences(["a.0001.exr", "a.0002.exr", "a.3.exr", "notes.txt"]);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].key().to_string(), "a.#.exr");
/// assert_eq!(groups[1].key().to_string(), "a.####.exr");
/// assert_eq!(groups[1].len(), 2);
/// ```
pub fn group_sequences<I, S>(paths: I) -> Vec<SequenceGroup>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Catalog::build(paths).groups
}

/// An immutable snapshot of one input collection: its sequences plus the
/// strings that did not parse.
///
/// Renames planned through a catalog are checked against every input, so a
/// sequence can't be renamed on top of an unrelated file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    groups: Vec<SequenceGroup>,
    unmatched: Vec<String>,
    #[serde(skip)]
    inputs: BTreeSet<String>,
}

impl Catalog {
    pub fn build<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut grouped: BTreeMap<SequenceKey, BTreeMap<u64, SequenceItem>> = BTreeMap::new();
        let mut inputs = BTreeSet::new();
        let mut unmatched = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if !inputs.insert(path.to_owned()) {
                continue;
            }
            match parse_item(path) {
                Ok(item) => {
                    grouped
                        .entry(item.key())
                        .or_default()
                        .insert(item.value(), item);
                }
                Err(e) => {
                    tracing::trace!(path, error = %e, "skipping non-sequence input");
                    unmatched.push(path.to_owned());
                }
            }
        }

        let groups: Vec<_> = grouped
            .into_iter()
            .map(|(key, items)| SequenceGroup::from_map(key, items))
            .collect();
        tracing::debug!(
            inputs = inputs.len(),
            groups = groups.len(),
            unmatched = unmatched.len(),
            "grouped sequences"
        );

        Self {
            groups,
            unmatched,
            inputs,
        }
    }

    pub fn groups(&self) -> &[SequenceGroup] {
        &self.groups
    }

    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    pub fn group(&self, key: &SequenceKey) -> Option<&SequenceGroup> {
        self.groups
            .binary_search_by(|g| g.key.cmp(key))
            .ok()
            .map(|i| &self.groups[i])
    }

    /// Find the sequence for a placeholder pattern or a member string.
    ///
    /// Patterns are tried first so `shot010.####.exr` isn't read as item 10.
    pub fn find(&self, item_or_pattern: &str) -> Option<&SequenceGroup> {
        let key = parse_pattern(item_or_pattern)
            .or_else(|_| parse_item(item_or_pattern).map(|item| item.key()))
            .ok()?;
        self.group(&key)
    }

    /// Plan a rename of `group`, rejecting targets that equal any input
    /// outside it.
    pub fn plan_rename(&self, group: &SequenceGroup, target: &RenameTarget) -> Result<RenamePlan> {
        plan_rename(group, target, |name| {
            self.inputs.contains(name) && !group.contains_str(name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Padding;

    fn group(paths: &[&str]) -> SequenceGroup {
        let mut groups = group_sequences(paths);
        assert_eq!(groups.len(), 1, "expected a single sequence");
        groups.remove(0)
    }

    #[test]
    fn first_last_middle() {
        let g = group(&["f.5", "f.1", "f.3"]);
        assert_eq!(g.first().unwrap().as_str(), "f.1");
        assert_eq!(g.last().unwrap().as_str(), "f.5");
        assert_eq!(g.middle().unwrap().as_str(), "f.3");

        let g = group(&["f.7", "f.5", "f.1", "f.3"]);
        assert_eq!(g.middle().unwrap().as_str(), "f.3");

        let g = group(&["f.9"]);
        assert_eq!(g.middle().unwrap().as_str(), "f.9");
    }

    #[test]
    fn empty_group_is_guarded() {
        let g = SequenceGroup {
            key: SequenceKey::new("f.", "", Padding::Variable),
            items: Vec::new(),
        };
        assert_eq!(g.first(), Err(SequenceError::EmptySequence));
        assert_eq!(g.last(), Err(SequenceError::EmptySequence));
        assert_eq!(g.middle(), Err(SequenceError::EmptySequence));
        assert_eq!(g.gaps().next(), None);
        assert!(g.ranges().is_empty());
    }

    #[test]
    fn next_and_previous() {
        let g = group(&["f.1", "f.3", "f.5"]);
        let f1 = g.get(1).unwrap();
        let f3 = g.get(3).unwrap();
        let f5 = g.get(5).unwrap();
        assert_eq!(g.next(f1), Some(f3));
        assert_eq!(g.next(f5), None);
        assert_eq!(g.previous(f3), Some(f1));
        assert_eq!(g.previous(f1), None);

        // non-members are located by value
        assert_eq!(g.next_after(2).map(SequenceItem::value), Some(3));
        assert_eq!(g.previous_before(4).map(SequenceItem::value), Some(3));
        assert_eq!(g.next_after(0).map(SequenceItem::value), Some(1));
    }

    #[test]
    fn gaps_are_lazy_and_restartable() {
        let g = group(&["f.1", "f.3", "f.5"]);
        assert_eq!(g.gaps().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(g.gaps().collect::<Vec<_>>(), vec![2, 4]);

        let mut it = g.gaps();
        assert_eq!(it.next(), Some(2));
        let resumed = it.clone();
        assert_eq!(it.next(), Some(4));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
        assert_eq!(resumed.collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn gaps_none_for_contiguous() {
        let g = group(&["f.0001", "f.0002", "f.0003"]);
        assert_eq!(g.gaps().count(), 0);
    }

    #[test]
    fn gaps_over_wide_range_take_lazily() {
        let max = format!("f.{}", u64::MAX);
        let g = group(&["f.1", max.as_str()]);
        let head: Vec<u64> = g.gaps().take(3).collect();
        assert_eq!(head, vec![2, 3, 4]);
    }

    #[test]
    fn ranges_and_summary() {
        let g = group(&["f.1", "f.2", "f.3", "f.5", "f.7", "f.8", "f.9"]);
        assert_eq!(g.ranges(), vec![1..=3, 5..=5, 7..=9]);
        assert_eq!(g.range_summary(), "1-3, 5, 7-9");
        assert_eq!(g.to_string(), "f.# [1-3, 5, 7-9]");
    }

    #[test]
    fn duplicates_collapse() {
        let g = group(&["f.01", "f.02", "f.01"]);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn catalog_tracks_unmatched_and_finds() {
        let catalog = Catalog::build(["a.0001.exr", "a.0002.exr", "notes.txt", "b_1.wav"]);
        assert_eq!(catalog.groups().len(), 2);
        assert_eq!(catalog.unmatched(), ["notes.txt".to_string()]);
        assert_eq!(catalog.find("a.0099.exr").map(SequenceGroup::len), Some(2));
        assert_eq!(catalog.find("a.####.exr").map(SequenceGroup::len), Some(2));
        assert_eq!(catalog.find("b_%d.wav").map(SequenceGroup::len), Some(1));
        assert!(catalog.find("a.99.exr").is_none());
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn contains_str_only_for_members() {
        let g = group(&["f.01", "f.03"]);
        assert!(g.contains_str("f.01"));
        assert!(!g.contains_str("f.02"));
        assert!(!g.contains_str("f.1"));
    }

    #[test]
    fn gaps_size_hint_bounds_remaining() {
        let g = group(&["f.1", "f.3", "f.5"]);
        let mut gaps = g.gaps();
        for remaining in [2usize, 1, 0] {
            let (lower, upper) = gaps.size_hint();
            assert!(lower <= remaining);
            assert!(upper.is_some_and(|u| u >= remaining));
            assert_eq!(gaps.clone().count(), remaining);
            gaps.next();
        }
        assert_eq!(gaps.size_hint(), (0, Some(0)));
        assert_eq!(gaps.next(), None);
        assert_eq!(gaps.size_hint(), (0, Some(0)));

        let single = group(&["f.7"]);
        let mut gaps = single.gaps();
        assert_eq!(gaps.size_hint(), (0, Some(0)));
        assert_eq!(gaps.next(), None);
        assert_eq!(gaps.size_hint(), (0, Some(0)));
    }

    #[test]
    fn oversized_numbers_are_unmatched() {
        let catalog = Catalog::build(["f.1", "f.99999999999999999999999"]);
        assert_eq!(catalog.groups().len(), 1);
        assert_eq!(catalog.groups()[0].len(), 1);
        assert_eq!(catalog.unmatched(), ["f.99999999999999999999999"]);
        assert_eq!(
            group_sequences(["f.1", "f.99999999999999999999999"]).len(),
            1
        );
    }
}

//! Per-document match statistics and cross-document navigation.
//!
//! For each rule the index keeps one [`DocumentMatchStats`] per document
//! with matches, in a `BTreeMap` keyed by the location's normalized form, so
//! two spellings of one file share an entry. Iterating that map yields the
//! global order directly: documents by URI, ranges by start then end.

use std::collections::BTreeMap;

use hl_core::{FxHashMap, Location, RuleId, Selection, TextRange};
use serde::{Deserialize, Serialize};

/// Match statistics of one rule in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMatchStats {
    ranges: Vec<TextRange>,
    current: Option<usize>,
}

impl DocumentMatchStats {
    /// Number of matches.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.ranges.len()
    }

    /// Match ranges in document order.
    #[inline]
    #[must_use]
    pub fn ranges(&self) -> &[TextRange] {
        &self.ranges
    }

    /// 1-based index of the locally selected match.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }
}

/// Direction of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards later matches, wrapping to the first.
    Next,
    /// Towards earlier matches, wrapping to the last.
    Previous,
}

/// Where navigation should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    /// Document holding the match.
    pub document: Location,
    /// The match.
    pub range: TextRange,
    /// 1-based index within the document.
    pub local_index: usize,
    /// 1-based index across all documents.
    pub global_index: usize,
    /// Total matches across all documents.
    pub total: usize,
}

/// The positions navigation may start from, most preferred first.
#[derive(Debug, Clone, Default)]
pub struct NavigationOrigin<'a> {
    /// The active document and the 1-based match index its live selection
    /// sits on, if any.
    pub active: Option<(&'a Location, Option<usize>)>,
    /// The document the request was issued from.
    pub document: Option<&'a Location>,
}

#[derive(Debug)]
struct DocumentEntry {
    /// Spelling of the location last recorded.
    location: Location,
    stats: DocumentMatchStats,
}

#[derive(Debug, Default)]
struct RuleMatches {
    documents: BTreeMap<String, DocumentEntry>,
    /// 0-based position in the global order of the last visited match.
    cursor: Option<usize>,
}

impl RuleMatches {
    fn total(&self) -> usize {
        self.documents.values().map(|e| e.stats.count()).sum()
    }

    fn get(&self, document: &Location) -> Option<&DocumentMatchStats> {
        self.documents
            .get(&document.normalized_key())
            .map(|e| &e.stats)
    }

    fn get_mut(&mut self, document: &Location) -> Option<&mut DocumentMatchStats> {
        self.documents
            .get_mut(&document.normalized_key())
            .map(|e| &mut e.stats)
    }

    /// 0-based global position of `document`'s `local` (1-based) match.
    fn position_of(&self, document: &Location, local: usize) -> Option<usize> {
        let key = document.normalized_key();
        let stats = &self.documents.get(&key)?.stats;
        if local == 0 || local > stats.count() {
            return None;
        }
        let before: usize = self
            .documents
            .range(..key)
            .map(|(_, e)| e.stats.count())
            .sum();
        Some(before + local - 1)
    }

    /// Document, 1-based local index, and range at a 0-based position.
    fn at(&self, mut position: usize) -> Option<(&Location, usize, TextRange)> {
        for entry in self.documents.values() {
            let count = entry.stats.count();
            if position < count {
                return Some((&entry.location, position + 1, entry.stats.ranges[position]));
            }
            position -= count;
        }
        None
    }
}

/// 1-based index of the match `selection` designates.
///
/// A non-empty selection designates a match it equals, lies inside, or
/// fully covers; a caret designates the match containing it.
///
/// # Examples
///
/// ```
/// use hl_core::{Selection, TextRange};
/// use hl_engine::selection_match_index;
///
/// let ranges = [TextRange::new(0, 3), TextRange::new(10, 13)];
/// assert_eq!(selection_match_index(Selection::new(10, 13), &ranges), Some(2));
/// assert_eq!(selection_match_index(Selection::caret(3), &ranges), Some(1));
/// assert_eq!(selection_match_index(Selection::caret(5), &ranges), None);
/// ```
#[must_use]
pub fn selection_match_index(selection: Selection, ranges: &[TextRange]) -> Option<usize> {
    let selected = selection.range();
    let position = if selection.is_empty() {
        ranges.iter().position(|r| r.contains_offset(selected.start))
    } else {
        ranges
            .iter()
            .position(|r| *r == selected)
            .or_else(|| {
                ranges
                    .iter()
                    .position(|r| r.contains_range(selected) || selected.contains_range(*r))
            })
    };
    position.map(|p| p + 1)
}

/// Match statistics for every rule.
#[derive(Debug, Default)]
pub struct NavigationIndex {
    rules: FxHashMap<RuleId, RuleMatches>,
}

impl NavigationIndex {
    /// Creates an empty index.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `ranges` as `rule`'s matches in `document`.
    ///
    /// Zero ranges clears the entry. The local current index survives if it
    /// is still in bounds.
    pub fn set_document(&mut self, rule: RuleId, document: &Location, mut ranges: Vec<TextRange>) {
        if ranges.is_empty() {
            self.clear_document(rule, document);
            return;
        }
        ranges.sort_unstable();
        let matches = self.rules.entry(rule).or_default();
        let entry = matches
            .documents
            .entry(document.normalized_key())
            .or_insert_with(|| DocumentEntry {
                location: document.clone(),
                stats: DocumentMatchStats::default(),
            });
        entry.location = document.clone();
        entry.stats.current = entry.stats.current.filter(|c| *c <= ranges.len());
        entry.stats.ranges = ranges;
    }

    /// Replaces all of `rule`'s statistics, as after a scope scan.
    ///
    /// A document whose ranges did not change keeps its local current index.
    pub fn replace_all(&mut self, rule: RuleId, files: impl IntoIterator<Item = (Location, Vec<TextRange>)>) {
        let matches = self.rules.entry(rule).or_default();
        let mut previous = std::mem::take(&mut matches.documents);
        for (location, mut ranges) in files {
            if ranges.is_empty() {
                continue;
            }
            ranges.sort_unstable();
            let key = location.normalized_key();
            let current = previous
                .remove(&key)
                .filter(|old| old.stats.ranges == ranges)
                .and_then(|old| old.stats.current);
            matches.documents.insert(
                key,
                DocumentEntry {
                    location,
                    stats: DocumentMatchStats { ranges, current },
                },
            );
        }
        matches.cursor = None;
    }

    /// Drops `rule`'s statistics for one document.
    pub fn clear_document(&mut self, rule: RuleId, document: &Location) {
        if let Some(matches) = self.rules.get_mut(&rule) {
            matches.documents.remove(&document.normalized_key());
        }
    }

    /// Drops every rule's statistics for `document`.
    pub fn clear_document_all(&mut self, document: &Location) {
        let key = document.normalized_key();
        for matches in self.rules.values_mut() {
            matches.documents.remove(&key);
        }
    }

    /// Forgets everything about `rule`.
    pub fn clear_rule(&mut self, rule: RuleId) {
        self.rules.remove(&rule);
    }

    /// Forgets the rule's last visited global position.
    pub fn clear_global_index(&mut self, rule: RuleId) {
        if let Some(matches) = self.rules.get_mut(&rule) {
            matches.cursor = None;
        }
    }

    /// Sets the locally selected match in `document`.
    ///
    /// When `local` designates a match, the global position is refreshed as
    /// well.
    pub fn set_current(&mut self, rule: RuleId, document: &Location, local: Option<usize>) {
        let Some(matches) = self.rules.get_mut(&rule) else {
            return;
        };
        let Some(stats) = matches.get_mut(document) else {
            return;
        };
        stats.current = local.filter(|l| (1..=stats.count()).contains(l));
        if let Some(local) = stats.current {
            matches.cursor = matches.position_of(document, local);
        }
    }

    /// Statistics of `rule` in `document`.
    #[must_use]
    pub fn stats(&self, rule: RuleId, document: &Location) -> Option<&DocumentMatchStats> {
        self.rules.get(&rule)?.get(document)
    }

    /// Documents where `rule` currently has matches, in global order.
    #[must_use]
    pub fn documents(&self, rule: RuleId) -> Vec<Location> {
        self.rules
            .get(&rule)
            .map(|m| m.documents.values().map(|e| e.location.clone()).collect())
            .unwrap_or_default()
    }

    /// Total matches of `rule` across all documents.
    #[must_use]
    pub fn total(&self, rule: RuleId) -> usize {
        self.rules.get(&rule).map_or(0, RuleMatches::total)
    }

    /// 1-based global index of the last visited match.
    #[must_use]
    pub fn global_index(&self, rule: RuleId) -> Option<usize> {
        self.rules.get(&rule)?.cursor.map(|c| c + 1)
    }

    /// 1-based global index of `document`'s `local` match.
    #[must_use]
    pub fn global_index_of(&self, rule: RuleId, document: &Location, local: usize) -> Option<usize> {
        self.rules
            .get(&rule)?
            .position_of(document, local)
            .map(|p| p + 1)
    }

    /// Every match of `rule`: documents by URI, then ranges by start and end.
    #[must_use]
    pub fn global_order(&self, rule: RuleId) -> Vec<(Location, TextRange)> {
        self.rules
            .get(&rule)
            .map(|matches| {
                matches
                    .documents
                    .values()
                    .flat_map(|entry| {
                        entry
                            .stats
                            .ranges
                            .iter()
                            .map(move |range| (entry.location.clone(), *range))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Picks the next or previous match without recording anything.
    ///
    /// The starting position is, in order of preference: the active
    /// document's selected match, the origin document's last selected match,
    /// the rule's last visited match. Without any, `Next` lands on the first
    /// match and `Previous` on the last.
    ///
    /// Returns `None` when the rule has no matches.
    #[must_use]
    pub fn peek(
        &self,
        rule: RuleId,
        direction: Direction,
        origin: &NavigationOrigin<'_>,
    ) -> Option<NavigationTarget> {
        let matches = self.rules.get(&rule)?;
        let total = matches.total();
        if total == 0 {
            return None;
        }

        let from_active = origin
            .active
            .and_then(|(document, local)| matches.position_of(document, local?));
        let from_document = || {
            let document = origin.document?;
            let local = matches.get(document)?.current?;
            matches.position_of(document, local)
        };
        let current = from_active
            .or_else(from_document)
            .or(matches.cursor)
            .filter(|c| *c < total);

        let target = match (direction, current) {
            (Direction::Next, Some(c)) => (c + 1) % total,
            (Direction::Next, None) => 0,
            (Direction::Previous, Some(c)) => (c + total - 1) % total,
            (Direction::Previous, None) => total - 1,
        };

        let (document, local_index, range) = matches.at(target)?;
        Some(NavigationTarget {
            document: document.clone(),
            range,
            local_index,
            global_index: target + 1,
            total,
        })
    }

    /// Records `target` as the visited match.
    ///
    /// Ignored when the matches changed since `target` was picked.
    pub fn commit(&mut self, rule: RuleId, target: &NavigationTarget) {
        let Some(matches) = self.rules.get_mut(&rule) else {
            return;
        };
        if matches.total() != target.total {
            return;
        }
        let Some(stats) = matches.get_mut(&target.document) else {
            return;
        };
        if stats.ranges.get(target.local_index.wrapping_sub(1)) != Some(&target.range) {
            return;
        }
        stats.current = Some(target.local_index);
        matches.cursor = Some(target.global_index - 1);
    }

    /// [`peek`](Self::peek) followed by [`commit`](Self::commit).
    pub fn navigate(
        &mut self,
        rule: RuleId,
        direction: Direction,
        origin: &NavigationOrigin<'_>,
    ) -> Option<NavigationTarget> {
        let target = self.peek(rule, direction, origin)?;
        self.commit(rule, &target);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn ranges(spans: &[(usize, usize)]) -> Vec<TextRange> {
        spans.iter().map(|&(s, e)| TextRange::new(s, e)).collect()
    }

    /// Two matches in `a`, three in `b`.
    fn two_documents() -> (NavigationIndex, RuleId, Location, Location) {
        let mut index = NavigationIndex::new();
        let rule = RuleId::new(1);
        let a = loc("file:///w/a.txt");
        let b = loc("file:///w/b.txt");
        index.set_document(rule, &b, ranges(&[(20, 23), (0, 3), (10, 13)]));
        index.set_document(rule, &a, ranges(&[(5, 8), (0, 3)]));
        (index, rule, a, b)
    }

    #[test]
    fn test_selection_match_index() {
        let r = ranges(&[(0, 3), (10, 13)]);
        assert_eq!(selection_match_index(Selection::new(10, 13), &r), Some(2));
        assert_eq!(selection_match_index(Selection::new(13, 10), &r), Some(2));
        assert_eq!(selection_match_index(Selection::new(11, 12), &r), Some(2));
        assert_eq!(selection_match_index(Selection::new(9, 14), &r), Some(2));
        assert_eq!(selection_match_index(Selection::new(2, 11), &r), None);
        assert_eq!(selection_match_index(Selection::caret(0), &r), Some(1));
        assert_eq!(selection_match_index(Selection::caret(13), &r), Some(2));
        assert_eq!(selection_match_index(Selection::caret(7), &r), None);
        assert_eq!(selection_match_index(Selection::caret(0), &[]), None);
    }

    #[test]
    fn test_global_order_is_sorted_and_stable() {
        let (index, rule, a, b) = two_documents();
        let order = index.global_order(rule);
        assert_eq!(
            order,
            vec![
                (a.clone(), TextRange::new(0, 3)),
                (a, TextRange::new(5, 8)),
                (b.clone(), TextRange::new(0, 3)),
                (b.clone(), TextRange::new(10, 13)),
                (b, TextRange::new(20, 23)),
            ]
        );
        assert_eq!(index.global_order(rule), order);
    }

    #[test]
    fn test_next_three_times_lands_on_b1() {
        let (mut index, rule, a, b) = two_documents();
        let origin = NavigationOrigin::default();
        let first = index.navigate(rule, Direction::Next, &origin).unwrap();
        assert_eq!((first.document.clone(), first.local_index), (a.clone(), 1));
        index.navigate(rule, Direction::Next, &origin).unwrap();
        let third = index.navigate(rule, Direction::Next, &origin).unwrap();
        assert_eq!(third.document, b);
        assert_eq!(third.local_index, 1);
        assert_eq!(third.global_index, 3);
        assert_eq!(third.total, 5);
    }

    #[test]
    fn test_next_wraps_after_n_steps() {
        let (mut index, rule, ..) = two_documents();
        let origin = NavigationOrigin::default();
        let first = index.navigate(rule, Direction::Next, &origin).unwrap();
        let mut last = first.clone();
        for _ in 0..5 {
            last = index.navigate(rule, Direction::Next, &origin).unwrap();
        }
        assert_eq!(last, first);
    }

    #[test]
    fn test_previous_from_none_is_last() {
        let (mut index, rule, _, b) = two_documents();
        let target = index
            .navigate(rule, Direction::Previous, &NavigationOrigin::default())
            .unwrap();
        assert_eq!(target.document, b);
        assert_eq!(target.range, TextRange::new(20, 23));
        assert_eq!(target.global_index, 5);
    }

    #[test]
    fn test_active_selection_takes_precedence() {
        let (mut index, rule, a, b) = two_documents();
        index.navigate(rule, Direction::Next, &NavigationOrigin::default());
        let origin = NavigationOrigin {
            active: Some((&b, Some(2))),
            document: Some(&a),
        };
        let target = index.navigate(rule, Direction::Next, &origin).unwrap();
        assert_eq!(target.document, b);
        assert_eq!(target.local_index, 3);
    }

    #[test]
    fn test_document_local_index_before_cursor() {
        let (mut index, rule, a, b) = two_documents();
        index.set_current(rule, &b, Some(1));
        index.set_current(rule, &a, Some(2));
        // The cursor now points at a#2; the origin document's own index wins.
        let origin = NavigationOrigin {
            active: Some((&a, None)),
            document: Some(&b),
        };
        let target = index.navigate(rule, Direction::Previous, &origin).unwrap();
        assert_eq!((target.document, target.local_index), (a, 2));
    }

    #[test]
    fn test_no_matches() {
        let mut index = NavigationIndex::new();
        let rule = RuleId::new(1);
        assert!(index.navigate(rule, Direction::Next, &NavigationOrigin::default()).is_none());
        index.set_document(rule, &loc("file:///a"), Vec::new());
        assert_eq!(index.total(rule), 0);
        assert!(index.documents(rule).is_empty());
    }

    #[test]
    fn test_zero_matches_clears_document() {
        let (mut index, rule, a, _) = two_documents();
        index.set_document(rule, &a, Vec::new());
        assert!(index.stats(rule, &a).is_none());
        assert_eq!(index.total(rule), 3);
    }

    #[test]
    fn test_set_current_updates_global_index() {
        let (mut index, rule, _, b) = two_documents();
        index.set_current(rule, &b, Some(2));
        assert_eq!(index.stats(rule, &b).unwrap().current(), Some(2));
        assert_eq!(index.global_index(rule), Some(4));
        index.set_current(rule, &b, Some(9));
        assert_eq!(index.stats(rule, &b).unwrap().current(), None);
        assert_eq!(index.global_index_of(rule, &b, 3), Some(5));
    }

    #[test]
    fn test_replace_all_resets_cursor() {
        let (mut index, rule, a, _) = two_documents();
        index.navigate(rule, Direction::Next, &NavigationOrigin::default());
        index.replace_all(rule, vec![(a.clone(), ranges(&[(1, 2)])), (loc("file:///w/c"), Vec::new())]);
        assert_eq!(index.global_index(rule), None);
        assert_eq!(index.documents(rule), vec![a]);
    }

    #[test]
    fn test_clear_document_all() {
        let (mut index, rule, a, b) = two_documents();
        let other = RuleId::new(2);
        index.set_document(other, &a, ranges(&[(0, 1)]));
        index.clear_document_all(&a);
        assert!(index.stats(rule, &a).is_none());
        assert!(index.stats(other, &a).is_none());
        assert!(index.stats(rule, &b).is_some());
        index.clear_rule(rule);
        assert_eq!(index.total(rule), 0);
    }

    #[test]
    fn test_peek_does_not_record() {
        let (mut index, rule, a, _) = two_documents();
        let origin = NavigationOrigin::default();
        let target = index.peek(rule, Direction::Next, &origin).unwrap();
        assert_eq!((target.document.clone(), target.global_index), (a.clone(), 1));
        assert_eq!(index.global_index(rule), None);
        assert_eq!(index.stats(rule, &a).unwrap().current(), None);

        index.commit(rule, &target);
        assert_eq!(index.global_index(rule), Some(1));
        assert_eq!(index.stats(rule, &a).unwrap().current(), Some(1));
    }

    #[test]
    fn test_commit_ignores_outdated_target() {
        let (mut index, rule, a, _) = two_documents();
        let target = index
            .peek(rule, Direction::Next, &NavigationOrigin::default())
            .unwrap();
        index.set_document(rule, &a, ranges(&[(1, 2), (5, 8)]));
        index.commit(rule, &target);
        assert_eq!(index.global_index(rule), None);
        assert_eq!(index.stats(rule, &a).unwrap().current(), None);
    }

    #[test]
    fn test_replace_all_keeps_unchanged_current() {
        let (mut index, rule, a, b) = two_documents();
        index.set_current(rule, &a, Some(2));
        index.set_current(rule, &b, Some(1));
        index.replace_all(
            rule,
            vec![
                (a.clone(), ranges(&[(5, 8), (0, 3)])),
                (b.clone(), ranges(&[(0, 3)])),
            ],
        );
        assert_eq!(index.stats(rule, &a).unwrap().current(), Some(2));
        assert_eq!(index.stats(rule, &b).unwrap().current(), None);
        assert_eq!(index.global_index(rule), None);
    }

    #[test]
    fn test_documents_keyed_by_normalized_location() {
        let mut index = NavigationIndex::new();
        let rule = RuleId::new(1);
        let upper = loc("file:///w/Notes.txt");
        let lower = loc("file:///w/notes.txt");
        index.set_document(rule, &upper, ranges(&[(0, 1)]));
        index.set_document(rule, &lower, ranges(&[(0, 1), (4, 5)]));

        if upper.same_location(&lower) {
            assert_eq!(index.total(rule), 2);
            assert_eq!(index.documents(rule), vec![lower.clone()]);
            assert_eq!(index.stats(rule, &upper).unwrap().count(), 2);
            index.clear_document(rule, &upper);
            assert_eq!(index.total(rule), 0);
        } else {
            assert_eq!(index.total(rule), 3);
            assert_eq!(index.documents(rule).len(), 2);
        }
    }
}

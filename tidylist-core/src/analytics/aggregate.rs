//! Grouping of task metrics.
//!
//! Groups keep first-seen insertion order; callers that want a different
//! order sort explicitly (the dashboard sorts by category creation order).

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, FixedOffset, Timelike, Weekday};
use serde::Serialize;

use super::extract::TaskMetric;

/// One group: how many items and how many minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group<K> {
    pub key: K,
    pub count: usize,
    pub total_minutes: u64,
}

impl<K> Group<K> {
    /// Mean minutes per item, rounded; 0 for an empty group.
    pub fn average_minutes(&self) -> u32 {
        if self.count == 0 {
            0
        } else {
            (self.total_minutes as f64 / self.count as f64).round() as u32
        }
    }
}

/// Insertion-ordered collection of groups.
#[derive(Debug, Clone)]
pub struct Groups<K> {
    groups: Vec<Group<K>>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> Default for Groups<K> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Groups<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one item with `minutes` under `key`.
    pub fn add(&mut self, key: K, minutes: u32) {
        let slot = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(Group {
                    key,
                    count: 0,
                    total_minutes: 0,
                });
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[slot];
        group.count += 1;
        group.total_minutes += minutes as u64;
    }

    pub fn get(&self, key: &K) -> Option<&Group<K>> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group<K>> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_minutes(&self) -> u64 {
        self.groups.iter().map(|g| g.total_minutes).sum()
    }

    pub fn total_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    /// Reorder groups with a stable sort.
    pub fn sort_by_key<T: Ord>(&mut self, mut f: impl FnMut(&Group<K>) -> T) {
        self.groups.sort_by_key(|g| f(g));
        self.index = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.key.clone(), i))
            .collect();
    }

    pub fn into_vec(self) -> Vec<Group<K>> {
        self.groups
    }
}

/// Group metrics by an arbitrary key. Items whose selector returns `None`
/// are left out.
pub fn group_by<'a, K, I, F>(items: I, mut key: F) -> Groups<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = &'a TaskMetric>,
    F: FnMut(&TaskMetric) -> Option<K>,
{
    let mut groups = Groups::new();
    for item in items {
        if let Some(k) = key(item) {
            groups.add(k, item.duration_used);
        }
    }
    groups
}

/// Category grouping key.
///
/// Identity is the category name; color and rank come from the first task
/// seen in that category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryKey {
    pub name: String,
    pub color: String,
    pub rank: usize,
}

impl PartialEq for CategoryKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CategoryKey {}

impl Hash for CategoryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl From<&TaskMetric> for CategoryKey {
    fn from(m: &TaskMetric) -> Self {
        Self {
            name: m.category_name.clone(),
            color: m.category_color.clone(),
            rank: m.category_rank,
        }
    }
}

pub fn by_category<'a, I>(items: I) -> Groups<CategoryKey>
where
    I: IntoIterator<Item = &'a TaskMetric>,
{
    group_by(items, |m| Some(CategoryKey::from(m)))
}

/// Weekday of completion in the given offset. Incomplete tasks are left out.
pub fn by_weekday<'a, I>(items: I, offset: &FixedOffset) -> Groups<Weekday>
where
    I: IntoIterator<Item = &'a TaskMetric>,
{
    group_by(items, |m| m.completed_at.map(|ts| ts.with_timezone(offset).weekday()))
}

/// Hour of day (0-23) at which work started, taken from the history entry.
/// Tasks without a history entry are left out.
pub fn by_hour<'a, I>(items: I, offset: &FixedOffset) -> Groups<u32>
where
    I: IntoIterator<Item = &'a TaskMetric>,
{
    group_by(items, |m| m.started_at.map(|ts| ts.with_timezone(offset).hour()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::extract::extract;
    use crate::analytics::testutil::{category, completed, now, SnapshotBuilder};
    use chrono::{Duration, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_group_by_preserves_first_seen_order() {
        let t0 = now() - Duration::days(40);
        let snapshot = SnapshotBuilder::new()
            .category(category("w", "Work", t0))
            .category(category("h", "Home", t0 + Duration::hours(1)))
            .task(completed("1", "h", now(), 10))
            .task(completed("2", "w", now(), 20))
            .task(completed("3", "h", now(), 5))
            .build();
        let extraction = extract(&snapshot, None);

        let mut groups = by_category(extraction.iter());
        let names: Vec<_> = groups.iter().map(|g| g.key.name.as_str()).collect();
        assert_eq!(names, ["Home", "Work"]);

        let home = groups.get(&CategoryKey::from(&extraction.metrics[0])).unwrap();
        assert_eq!(home.count, 2);
        assert_eq!(home.total_minutes, 15);
        assert_eq!(groups.total_minutes(), 35);
        assert_eq!(groups.total_count(), 3);

        groups.sort_by_key(|g| g.key.rank);
        let names: Vec<_> = groups.iter().map(|g| g.key.name.as_str()).collect();
        assert_eq!(names, ["Work", "Home"]);
        let work = groups.get(&CategoryKey::from(&extraction.metrics[1])).unwrap();
        assert_eq!(work.total_minutes, 20);
    }

    #[test]
    fn test_empty_input_yields_empty_groups() {
        let groups = by_category(std::iter::empty::<&TaskMetric>());
        assert!(groups.is_empty());
        assert_eq!(groups.total_minutes(), 0);
    }

    #[test]
    fn test_weekday_and_hour_keys() {
        // 2024-03-10 is a Sunday
        let sunday_late = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let snapshot = SnapshotBuilder::new()
            .category(category("w", "Work", sunday_late - Duration::days(5)))
            .task(completed("1", "w", sunday_late, 10))
            .history("1", sunday_late - Duration::hours(2), sunday_late)
            .build();
        let extraction = extract(&snapshot, None);

        let days = by_weekday(extraction.iter(), &utc());
        assert_eq!(days.get(&Weekday::Sun).map(|g| g.count), Some(1));

        // One hour ahead of UTC pushes the completion into Monday
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let days = by_weekday(extraction.iter(), &plus_one);
        assert_eq!(days.get(&Weekday::Mon).map(|g| g.count), Some(1));

        let hours = by_hour(extraction.iter(), &utc());
        assert_eq!(hours.get(&21).map(|g| g.total_minutes), Some(10));
    }

    #[test]
    fn test_group_average() {
        let mut groups = Groups::new();
        groups.add("a", 10);
        groups.add("a", 15);
        assert_eq!(groups.get(&"a").unwrap().average_minutes(), 13);
    }
}

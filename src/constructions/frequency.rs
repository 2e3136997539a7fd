// Streaming frequency tables for qualifying constructions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::Construction;

/// One exported row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRecord {
    pub construction: String,
    pub frequency: u64,
}

/// Construction -> count, remembering first-insertion order for tie breaks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    index: FxHashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `construction`
    pub fn add(&mut self, construction: &str, count: u64) {
        match self.index.get(construction) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(construction.to_owned(), self.entries.len());
                self.entries.push((construction.to_owned(), count));
            }
        }
    }

    pub fn increment(&mut self, construction: &str) {
        self.add(construction, 1);
    }

    /// Count for `construction`, zero when never seen
    pub fn get(&self, construction: &str) -> u64 {
        self.index
            .get(construction)
            .map_or(0, |&slot| self.entries[slot].1)
    }

    /// Number of distinct constructions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Add every count from `other`, visiting its keys in their insertion order
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (construction, count) in &other.entries {
            self.add(construction, *count);
        }
    }

    /// Pairs by descending count; ties keep first-insertion order
    pub fn export(&self) -> Vec<(&str, u64)> {
        let mut rows: Vec<(&str, u64)> = self
            .entries
            .iter()
            .map(|(construction, count)| (construction.as_str(), *count))
            .collect();
        // sort_by is stable, so equal counts stay in insertion order
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }

    /// First `k` rows of [`FrequencyTable::export`]
    pub fn top_k(&self, k: usize) -> Vec<(&str, u64)> {
        let mut rows = self.export();
        rows.truncate(k);
        rows
    }

    pub fn records(&self) -> Vec<FrequencyRecord> {
        self.export()
            .into_iter()
            .map(|(construction, frequency)| FrequencyRecord {
                construction: construction.to_owned(),
                frequency,
            })
            .collect()
    }
}

impl FromIterator<FrequencyRecord> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = FrequencyRecord>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for record in iter {
            table.add(&record.construction, record.frequency);
        }
        table
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FrequencyTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<FrequencyRecord>::deserialize(deserializer).map(|records| records.into_iter().collect())
    }
}

/// Selects one of the aggregator's two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    All,
    NounBearing,
}

/// Paired counters for one batch: every qualifying construction, and the noun-bearing subset.
///
/// Always starts empty; `record` and `merge` are the only mutators, and counts never decrease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyAggregator {
    all: FrequencyTable,
    noun_bearing: FrequencyTable,
}

impl FrequencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, construction: &str, is_noun_bearing: bool) {
        self.all.increment(construction);
        if is_noun_bearing {
            self.noun_bearing.increment(construction);
        }
    }

    pub fn record_construction(&mut self, construction: &Construction) {
        self.record(&construction.text, construction.noun_bearing);
    }

    /// Sum `other`'s counters into this aggregator, key by key
    pub fn merge(&mut self, other: &FrequencyAggregator) {
        self.all.merge(&other.all);
        self.noun_bearing.merge(&other.noun_bearing);
    }

    pub fn all(&self) -> &FrequencyTable {
        &self.all
    }

    pub fn noun_bearing(&self) -> &FrequencyTable {
        &self.noun_bearing
    }

    pub fn table(&self, kind: TableKind) -> &FrequencyTable {
        match kind {
            TableKind::All => &self.all,
            TableKind::NounBearing => &self.noun_bearing,
        }
    }

    pub fn export(&self, kind: TableKind) -> Vec<(&str, u64)> {
        self.table(kind).export()
    }

    pub fn top_k(&self, kind: TableKind, k: usize) -> Vec<(&str, u64)> {
        self.table(kind).top_k(k)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

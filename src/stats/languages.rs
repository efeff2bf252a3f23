// Language usage aggregation.
// Folds per-repository language byte counts into totals and percentage lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::github::LanguageBytes;

/// Bytes of one language across the aggregated repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageUsage {
    pub name: String,
    pub bytes: u64,
}

/// Name of the bucket that collects languages outside the top entries.
pub const OTHER_LANGUAGES: &str = "Other";

/// Running per-language byte totals.
///
/// Language names are kept exactly as GitHub reports them. Merging is
/// order-independent.
#[derive(Debug, Clone, Default)]
pub struct LanguageAggregator {
    totals: HashMap<String, u64>,
}

impl LanguageAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one repository's language map.
    pub fn merge<'a, I>(&mut self, languages: I)
    where
        I: IntoIterator<Item = (&'a String, &'a u64)>,
    {
        for (name, bytes) in languages {
            let entry = self.totals.entry(name.clone()).or_insert(0);
            *entry = entry.saturating_add(*bytes);
        }
    }

    /// Add every map in `maps`.
    pub fn merge_all<'a>(&mut self, maps: impl IntoIterator<Item = &'a LanguageBytes>) {
        for map in maps {
            self.merge(map);
        }
    }

    pub fn totals(&self) -> &HashMap<String, u64> {
        &self.totals
    }

    /// Sum of all bytes seen so far.
    pub fn total(&self) -> u64 {
        self.totals
            .values()
            .fold(0u64, |sum, bytes| sum.saturating_add(*bytes))
    }

    /// Share of `language` (case-insensitive) in the total.
    ///
    /// `None` when the language is unknown or nothing has been merged.
    pub fn percentage(&self, language: &str) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let wanted = language.to_lowercase();
        self.totals
            .iter()
            .filter(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, bytes)| *bytes)
            .reduce(u64::saturating_add)
            .map(|bytes| bytes as f64 / total as f64)
    }

    /// Freeze the totals into a view.
    pub fn finish(self) -> LanguageUsages {
        LanguageUsages::new(
            self.totals
                .into_iter()
                .map(|(name, bytes)| LanguageUsage { name, bytes })
                .collect(),
        )
    }
}

/// Immutable language statistics handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageUsages {
    data: Vec<LanguageUsage>,
    total: u64,
}

impl LanguageUsages {
    /// Build a view; entries are ordered by bytes, largest first, then by name.
    pub fn new(mut data: Vec<LanguageUsage>) -> Self {
        data.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
        let total = data
            .iter()
            .fold(0u64, |sum, usage| sum.saturating_add(usage.bytes));
        Self { data, total }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Share of `language` (case-insensitive) in the total, as a fraction.
    pub fn get(&self, language: &str) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let wanted = language.to_lowercase();
        self.data
            .iter()
            .filter(|usage| usage.name.to_lowercase() == wanted)
            .map(|usage| usage.bytes)
            .reduce(u64::saturating_add)
            .map(|bytes| bytes as f64 / self.total as f64)
    }

    pub fn data(&self) -> &[LanguageUsage] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `n` largest languages, plus an "Other" entry for the rest when non-zero.
    pub fn top(&self, n: usize) -> Vec<LanguageUsage> {
        let mut top: Vec<LanguageUsage> = self.data.iter().take(n).cloned().collect();
        let other = self
            .data
            .iter()
            .skip(n)
            .fold(0u64, |sum, usage| sum.saturating_add(usage.bytes));
        if other > 0 {
            top.push(LanguageUsage {
                name: OTHER_LANGUAGES.to_string(),
                bytes: other,
            });
        }
        top
    }
}

impl Default for LanguageUsages {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(pairs: &[(&str, u64)]) -> LanguageBytes {
        pairs.iter().map(|(n, b)| (n.to_string(), *b)).collect()
    }

    #[test]
    fn test_merge_accumulates() {
        let mut agg = LanguageAggregator::new();
        agg.merge(&langs(&[("Go", 100)]));
        agg.merge(&langs(&[("Go", 50), ("Rust", 30)]));

        assert_eq!(agg.totals().get("Go"), Some(&150));
        assert_eq!(agg.totals().get("Rust"), Some(&30));
        assert_eq!(agg.total(), 180);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let maps = [
            langs(&[("TypeScript", 200), ("CSS", 10)]),
            langs(&[("TypeScript", 100), ("CSS", 50)]),
            langs(&[("Rust", 7)]),
            langs(&[]),
        ];
        let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];

        let results: Vec<_> = orders
            .iter()
            .map(|order| {
                let mut agg = LanguageAggregator::new();
                agg.merge_all(order.iter().map(|i| &maps[*i]));
                agg.finish()
            })
            .collect();

        for result in &results[1..] {
            assert_eq!(result, &results[0]);
        }
        assert_eq!(results[0].total(), 367);
    }

    #[test]
    fn test_percentage() {
        let mut agg = LanguageAggregator::new();
        agg.merge(&langs(&[("Go", 150), ("Rust", 30)]));

        let go = agg.percentage("go").unwrap();
        assert!((go - 150.0 / 180.0).abs() < 1e-9);
        assert!(agg.percentage("python").is_none());

        let usages = agg.finish();
        assert!((usages.get("GO").unwrap() - 0.8333).abs() < 1e-4);
        assert!(usages.get("python").is_none());
    }

    #[test]
    fn test_empty_aggregation() {
        let agg = LanguageAggregator::new();
        assert_eq!(agg.total(), 0);
        assert!(agg.percentage("go").is_none());

        let usages = agg.finish();
        assert_eq!(usages.total(), 0);
        assert!(usages.get("go").is_none());
        assert!(usages.is_empty());
        assert!(usages.top(5).is_empty());
    }

    #[test]
    fn test_zero_byte_languages_have_no_share() {
        let mut agg = LanguageAggregator::new();
        agg.merge(&langs(&[("Makefile", 0)]));
        assert_eq!(agg.total(), 0);
        assert!(agg.percentage("makefile").is_none());
    }

    #[test]
    fn test_saturating_addition() {
        let mut agg = LanguageAggregator::new();
        agg.merge(&langs(&[("C", u64::MAX)]));
        agg.merge(&langs(&[("C", 10)]));
        assert_eq!(agg.totals().get("C"), Some(&u64::MAX));
    }

    #[test]
    fn test_data_ordering_and_top() {
        let usages = LanguageUsages::new(vec![
            LanguageUsage { name: "Shell".into(), bytes: 5 },
            LanguageUsage { name: "Rust".into(), bytes: 500 },
            LanguageUsage { name: "Go".into(), bytes: 300 },
            LanguageUsage { name: "C".into(), bytes: 300 },
            LanguageUsage { name: "Lua".into(), bytes: 20 },
        ]);

        let names: Vec<_> = usages.data().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Rust", "C", "Go", "Lua", "Shell"]);

        let top = usages.top(2);
        assert_eq!(top.len(), 3);
        assert_eq!(top[2], LanguageUsage { name: OTHER_LANGUAGES.into(), bytes: 325 });

        assert_eq!(usages.top(10).len(), 5);
    }
}

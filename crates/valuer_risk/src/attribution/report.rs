//! Attribution report types.

use serde::Serialize;
use std::collections::BTreeMap;

use valuer_core::ParameterKey;

use super::method::AttributionMethod;

/// Contribution of one differing parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributionEntry {
    /// Parameter that differs
    pub key: ParameterKey,
    /// Value in the baseline scenario
    pub baseline_value: f64,
    /// Value in the variant scenario
    pub variant_value: f64,
    /// Change in total valuation attributed to this parameter
    pub contribution: f64,
}

impl AttributionEntry {
    /// Fraction of `total_delta` carried by this entry.
    ///
    /// Zero when the total delta is zero.
    pub fn share(&self, total_delta: f64) -> f64 {
        if total_delta != 0.0 {
            self.contribution / total_delta
        } else {
            0.0
        }
    }

    /// Move in the parameter value itself.
    pub fn value_change(&self) -> f64 {
        self.variant_value - self.baseline_value
    }
}

/// Decomposition of a valuation delta into per-parameter contributions.
///
/// Entries are in schema declaration order. The residual is
/// `total_delta − Σ contributions`, so contributions plus residual always
/// reproduce the delta.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributionReport {
    method: AttributionMethod,
    baseline_total: f64,
    variant_total: f64,
    total_delta: f64,
    entries: Vec<AttributionEntry>,
    residual: f64,
}

impl AttributionReport {
    pub(crate) fn new(
        method: AttributionMethod,
        baseline_total: f64,
        variant_total: f64,
        entries: Vec<AttributionEntry>,
    ) -> Self {
        let total_delta = variant_total - baseline_total;
        let explained: f64 = entries.iter().map(|e| e.contribution).sum();
        Self {
            method,
            baseline_total,
            variant_total,
            total_delta,
            residual: total_delta - explained,
            entries,
        }
    }

    /// Method used to build the probes.
    pub fn method(&self) -> AttributionMethod {
        self.method
    }

    /// Baseline total valuation.
    pub fn baseline_total(&self) -> f64 {
        self.baseline_total
    }

    /// Variant total valuation.
    pub fn variant_total(&self) -> f64 {
        self.variant_total
    }

    /// `variant_total − baseline_total`.
    pub fn total_delta(&self) -> f64 {
        self.total_delta
    }

    /// Per-parameter entries in declaration order.
    pub fn entries(&self) -> &[AttributionEntry] {
        &self.entries
    }

    /// Part of the delta not explained by any single parameter.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Sum of all contributions.
    pub fn explained(&self) -> f64 {
        self.entries.iter().map(|e| e.contribution).sum()
    }

    /// Entry for `key`, if that parameter differs.
    pub fn entry(&self, key: &ParameterKey) -> Option<&AttributionEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Whether contributions plus residual match the delta within `tolerance`,
    /// relative to the larger of the two totals.
    pub fn is_additive(&self, tolerance: f64) -> bool {
        let scale = self.baseline_total.abs().max(self.variant_total.abs());
        let gap = (self.explained() + self.residual - self.total_delta).abs();
        gap <= tolerance * scale
    }

    /// Entry with the largest absolute contribution.
    ///
    /// Ties resolve to the earlier entry.
    pub fn largest_contributor(&self) -> Option<&AttributionEntry> {
        self.entries.iter().fold(None, |best, e| match best {
            Some(b) if b.contribution.abs() >= e.contribution.abs() => Some(b),
            _ => Some(e),
        })
    }

    /// Contributions summed per parameter domain.
    pub fn domain_subtotals(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            *totals.entry(entry.key.domain().to_string()).or_insert(0.0) += entry.contribution;
        }
        totals
    }

    /// Whether no parameter differs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn entry(domain: &str, name: &str, contribution: f64) -> AttributionEntry {
        AttributionEntry {
            key: ParameterKey::new(domain, name),
            baseline_value: 1.0,
            variant_value: 2.0,
            contribution,
        }
    }

    fn report() -> AttributionReport {
        AttributionReport::new(
            AttributionMethod::OneAtATime,
            100.0,
            130.0,
            vec![
                entry("financial", "discount_rate", -10.0),
                entry("market", "market_volume", 25.0),
                entry("market", "price_per_unit", 12.0),
            ],
        )
    }

    #[test]
    fn test_residual_closes_delta() {
        let report = report();
        assert_relative_eq!(report.total_delta(), 30.0);
        assert_relative_eq!(report.explained(), 27.0);
        assert_relative_eq!(report.residual(), 3.0);
        assert!(report.is_additive(1e-12));
    }

    #[test]
    fn test_largest_contributor_by_magnitude() {
        let report = report();
        let largest = report.largest_contributor().unwrap();
        assert_eq!(largest.key, ParameterKey::new("market", "market_volume"));
    }

    #[test]
    fn test_largest_contributor_prefers_earlier_on_tie() {
        let report = AttributionReport::new(
            AttributionMethod::OneAtATime,
            0.0,
            0.0,
            vec![
                entry("financial", "discount_rate", -5.0),
                entry("market", "market_volume", 5.0),
            ],
        );
        assert_eq!(
            report.largest_contributor().unwrap().key.name(),
            "discount_rate"
        );
    }

    #[test]
    fn test_domain_subtotals() {
        let subtotals = report().domain_subtotals();
        assert_relative_eq!(subtotals["financial"], -10.0);
        assert_relative_eq!(subtotals["market"], 37.0);
    }

    #[test]
    fn test_share_of_zero_delta_is_zero() {
        let e = entry("market", "market_volume", 5.0);
        assert_eq!(e.share(0.0), 0.0);
        assert_relative_eq!(e.share(20.0), 0.25);
        assert_relative_eq!(e.value_change(), 1.0);
    }

    #[test]
    fn test_empty_report() {
        let report = AttributionReport::new(AttributionMethod::OneAtATime, 50.0, 50.0, vec![]);
        assert!(report.is_empty());
        assert_eq!(report.residual(), 0.0);
        assert!(report.largest_contributor().is_none());
        assert!(report.domain_subtotals().is_empty());
    }

    #[test]
    fn test_serialises_in_entry_order() {
        let json = serde_json::to_string(&report()).unwrap();
        let discount = json.find("financial.discount_rate").unwrap();
        let volume = json.find("market.market_volume").unwrap();
        assert!(discount < volume);
        assert!(json.starts_with("{\"method\":\"one_at_a_time\""));
    }
}

//! Core domain types shared by the report pipeline and its callers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PrelyticsError, Result};

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// The organization an analysis run is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Organization name as entered by the user.
    pub name: String,
    /// Primary website.
    pub url: Url,
}

impl Target {
    /// Build a target, rejecting blank names and URLs without a host.
    pub fn new(name: impl Into<String>, url: &str) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(PrelyticsError::validation("organization name is empty"));
        }

        let url = Url::parse(url.trim())
            .map_err(|e| PrelyticsError::validation(format!("invalid URL '{url}': {e}")))?;
        if url.host_str().is_none() {
            return Err(PrelyticsError::validation(format!("URL has no host: {url}")));
        }

        Ok(Self { name, url })
    }
}

// ---------------------------------------------------------------------------
// MetricTable
// ---------------------------------------------------------------------------

/// Insertion-ordered metric name → display string mapping.
///
/// Re-inserting an existing name replaces its value in place, so the entry
/// keeps the position of its first occurrence. Serializes as a JSON object in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricTable {
    entries: IndexMap<String, String>,
}

impl MetricTable {
    /// Insert or overwrite a metric.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Look up a metric's display value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SWOT
// ---------------------------------------------------------------------------

/// One of the four fixed SWOT categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwotCategory {
    Strengths,
    Weaknesses,
    Opportunities,
    Threats,
}

impl SwotCategory {
    /// All categories in presentation order.
    pub const ALL: [SwotCategory; 4] = [
        Self::Strengths,
        Self::Weaknesses,
        Self::Opportunities,
        Self::Threats,
    ];

    /// The exact label used in documents and JSON output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Strengths => "Strengths",
            Self::Weaknesses => "Weaknesses",
            Self::Opportunities => "Opportunities",
            Self::Threats => "Threats",
        }
    }

    /// Case-sensitive exact match against the four labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// SWOT statements grouped by category; every category is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwotAnalysis {
    #[serde(rename = "Strengths", default)]
    pub strengths: Vec<String>,
    #[serde(rename = "Weaknesses", default)]
    pub weaknesses: Vec<String>,
    #[serde(rename = "Opportunities", default)]
    pub opportunities: Vec<String>,
    #[serde(rename = "Threats", default)]
    pub threats: Vec<String>,
}

impl SwotAnalysis {
    pub fn items(&self, category: SwotCategory) -> &[String] {
        match category {
            SwotCategory::Strengths => &self.strengths,
            SwotCategory::Weaknesses => &self.weaknesses,
            SwotCategory::Opportunities => &self.opportunities,
            SwotCategory::Threats => &self.threats,
        }
    }

    pub fn items_mut(&mut self, category: SwotCategory) -> &mut Vec<String> {
        match category {
            SwotCategory::Strengths => &mut self.strengths,
            SwotCategory::Weaknesses => &mut self.weaknesses,
            SwotCategory::Opportunities => &mut self.opportunities,
            SwotCategory::Threats => &mut self.threats,
        }
    }

    pub fn is_empty(&self) -> bool {
        SwotCategory::ALL
            .into_iter()
            .all(|c| self.items(c).is_empty())
    }
}

// ---------------------------------------------------------------------------
// ParsedReport
// ---------------------------------------------------------------------------

/// Structured record decomposed from an assembled report document.
///
/// Every field is always populated; sections missing from the document map to
/// the field type's empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub financial_metrics: MetricTable,
    pub swot_analysis: SwotAnalysis,
    pub operational_signals: Vec<String>,
    pub competitor_analysis: Vec<String>,
    pub client_intelligence: String,
    pub product_analysis: String,
    pub key_decision_makers: String,
    /// The untouched assembled document.
    pub raw_results: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_rejects_blank_name() {
        assert!(Target::new("  ", "https://acme.example").is_err());
    }

    #[test]
    fn target_rejects_bad_url() {
        let err = Target::new("Acme", "not a url").unwrap_err();
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn target_trims_name() {
        let target = Target::new("  Acme  ", "https://acme.example/").unwrap();
        assert_eq!(target.name, "Acme");
        assert_eq!(target.url.host_str(), Some("acme.example"));
    }

    #[test]
    fn metric_table_overwrite_keeps_first_position() {
        let mut table = MetricTable::default();
        table.insert("Revenue", "$1.00B");
        table.insert("Net Income", "$200.00M");
        table.insert("Revenue", "$1.50B");

        let entries: Vec<_> = table.iter().collect();
        assert_eq!(
            entries,
            vec![("Revenue", "$1.50B"), ("Net Income", "$200.00M")]
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn metric_table_serializes_in_insertion_order() {
        let mut table = MetricTable::default();
        table.insert("Zeta", "1");
        table.insert("Alpha", "2");
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"Zeta":"1","Alpha":"2"}"#);

        let back: MetricTable = serde_json::from_str(&json).unwrap();
        let order: Vec<_> = back.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn metric_table_deserialize_keeps_last_duplicate_at_first_position() {
        let table: MetricTable =
            serde_json::from_str(r#"{"Revenue":"$1.00B","Debt":"$2.00M","Revenue":"$1.50B"}"#)
                .unwrap();
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![("Revenue", "$1.50B"), ("Debt", "$2.00M")]);
    }

    #[test]
    fn swot_category_label_match_is_exact() {
        assert_eq!(
            SwotCategory::from_label("Threats"),
            Some(SwotCategory::Threats)
        );
        assert_eq!(SwotCategory::from_label("threats"), None);
        assert_eq!(SwotCategory::from_label("Threats:"), None);
    }

    #[test]
    fn parsed_report_default_has_every_key() {
        let json = serde_json::to_value(ParsedReport::default()).unwrap();
        for key in [
            "financial_metrics",
            "swot_analysis",
            "operational_signals",
            "competitor_analysis",
            "client_intelligence",
            "product_analysis",
            "key_decision_makers",
            "raw_results",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        let swot = &json["swot_analysis"];
        for key in ["Strengths", "Weaknesses", "Opportunities", "Threats"] {
            assert!(swot[key].as_array().unwrap().is_empty());
        }
    }
}

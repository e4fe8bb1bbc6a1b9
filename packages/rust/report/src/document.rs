//! The section schema shared by the assembler and the extractor.
//!
//! Both directions of the pipeline go through [`SectionHeader`]: the assembler
//! renders markers from it and the extractor searches for the same markers, so
//! the header vocabulary can never drift between writer and reader.

use std::fmt;

/// Reserved delimiter token bounding every section marker.
pub const DELIMITER: &str = "====";

/// Every section marker a report document may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionHeader {
    ClientIntelligence,
    FinancialInsights,
    /// Nested inside [`SectionHeader::FinancialInsights`].
    FinancialMetrics,
    /// Nested inside [`SectionHeader::FinancialInsights`].
    SwotAnalysis,
    OperationalSignals,
    CompetitorAnalysis,
    ProductAnalysis,
    KeyDecisionMakers,
}

impl SectionHeader {
    /// Top-level sections in document order.
    pub const TOP_LEVEL: [SectionHeader; 6] = [
        Self::ClientIntelligence,
        Self::FinancialInsights,
        Self::OperationalSignals,
        Self::CompetitorAnalysis,
        Self::ProductAnalysis,
        Self::KeyDecisionMakers,
    ];

    /// Upper-case label as it appears between the delimiters.
    pub fn label(self) -> &'static str {
        match self {
            Self::ClientIntelligence => "CLIENT INTELLIGENCE REPORT",
            Self::FinancialInsights => "FINANCIAL INSIGHTS",
            Self::FinancialMetrics => "FINANCIAL METRICS",
            Self::SwotAnalysis => "SWOT ANALYSIS",
            Self::OperationalSignals => "OPERATIONAL SIGNALS",
            Self::CompetitorAnalysis => "COMPETITOR ANALYSIS",
            Self::ProductAnalysis => "PRODUCT ANALYSIS",
            Self::KeyDecisionMakers => "KEY DECISION MAKERS",
        }
    }

    /// The literal marker line, e.g. `==== PRODUCT ANALYSIS ====`.
    pub fn marker(self) -> String {
        marker_for(self.label())
    }

    /// Sentinel body substituted when the producing stage yields nothing.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::ClientIntelligence => "[No client intelligence available]",
            Self::FinancialInsights => "[No financial data found]",
            Self::FinancialMetrics => "[No financial metrics found]",
            Self::SwotAnalysis => "[No SWOT analysis found]",
            Self::OperationalSignals => "[No operational signals found]",
            Self::CompetitorAnalysis => "[No competitor report found]",
            Self::ProductAnalysis => "[No product analysis found]",
            Self::KeyDecisionMakers => "[No key decision makers found]",
        }
    }

    /// Whether the assembler must emit this section even without a stage.
    pub fn is_required(self) -> bool {
        !matches!(
            self,
            Self::KeyDecisionMakers | Self::FinancialMetrics | Self::SwotAnalysis
        )
    }

    /// Markers a body of this section may legitimately carry.
    pub fn nested(self) -> &'static [SectionHeader] {
        match self {
            Self::FinancialInsights => &[Self::FinancialMetrics, Self::SwotAnalysis],
            _ => &[],
        }
    }

    /// Look a header up by its label.
    pub fn from_label(label: &str) -> Option<Self> {
        [
            Self::ClientIntelligence,
            Self::FinancialInsights,
            Self::FinancialMetrics,
            Self::SwotAnalysis,
            Self::OperationalSignals,
            Self::CompetitorAnalysis,
            Self::ProductAnalysis,
            Self::KeyDecisionMakers,
        ]
        .into_iter()
        .find(|h| h.label() == label)
    }
}

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build the marker for an arbitrary label.
pub fn marker_for(label: &str) -> String {
    format!("{DELIMITER} {label} {DELIMITER}")
}

/// Render a nested sub-section (marker line followed by its body).
///
/// Used by stages that produce a body with internal structure, such as the
/// financial stage's metrics table and SWOT block.
pub fn render_nested(header: SectionHeader, body: &str) -> String {
    let body = body.trim();
    let body = if body.is_empty() {
        header.placeholder()
    } else {
        body
    };
    format!("{}\n{body}", header.marker())
}

// ---------------------------------------------------------------------------
// AssembledDocument
// ---------------------------------------------------------------------------

/// One header and its (never empty) body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: SectionHeader,
    pub body: String,
}

/// Ordered sections of a report, prior to rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledDocument {
    pub(crate) sections: Vec<Section>,
}

impl AssembledDocument {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Body stored for a header, if the document has that section.
    pub fn body(&self, header: SectionHeader) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.header == header)
            .map(|s| s.body.as_str())
    }

    /// Render into the linear delimited text form.
    ///
    /// Each section becomes `\n==== LABEL ====\n<body>\n`.
    pub fn render(&self) -> String {
        let capacity = self
            .sections
            .iter()
            .map(|s| s.body.len() + s.header.label().len() + 16)
            .sum();
        let mut out = String::with_capacity(capacity);
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.header.marker());
            out.push('\n');
            out.push_str(&section.body);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for AssembledDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

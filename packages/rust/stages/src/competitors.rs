//! COMPETITOR ANALYSIS: firms competing with the vendor for this client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use prelytics_report::SectionHeader;
use prelytics_shared::{Result, Target};

use crate::Stage;
use crate::llm::{Prompt, TextGenerator};

/// Replies shorter than this are treated as unusable.
const MIN_REPLY_CHARS: usize = 100;

pub struct CompetitorStage {
    llm: Arc<dyn TextGenerator>,
    vendor: String,
}

impl CompetitorStage {
    pub fn new(llm: Arc<dyn TextGenerator>, vendor: impl Into<String>) -> Self {
        Self {
            llm,
            vendor: vendor.into(),
        }
    }

    fn prompt(&self, client: &str) -> Prompt {
        let vendor = &self.vendor;
        Prompt::new(format!(
            "You work at {vendor} and your client is {client}.\n\n\
             Identify the top 3 consulting, data analytics and technology firms that compete \
             with {vendor} for {client} and similar life sciences clients.\n\n\
             For each competitor use exactly this format:\n\n\
             • [Competitor Name]:\n  \
             Services: [their main services for {client} or similar clients]\n  \
             Strengths: [3-4 key strengths]\n  \
             Weaknesses: [3-4 key weaknesses]\n  \
             {vendor} Advantage: [how {vendor} can differentiate]"
        ))
    }
}

#[async_trait]
impl Stage for CompetitorStage {
    fn section(&self) -> SectionHeader {
        SectionHeader::CompetitorAnalysis
    }

    #[instrument(skip_all, fields(target = %target.name, vendor = %self.vendor))]
    async fn gather(&self, target: &Target) -> Result<Option<String>> {
        let analysis = match self.llm.complete(&self.prompt(&target.name)).await {
            Ok(reply) if is_usable(&reply) => reply,
            Ok(reply) => {
                info!(chars = reply.chars().count(), "competitor reply unusable; using fallback");
                fallback_analysis(&self.vendor, &target.name)
            }
            Err(e) => {
                warn!(error = %e, "competitor generation failed; using fallback");
                fallback_analysis(&self.vendor, &target.name)
            }
        };
        Ok(Some(analysis))
    }
}

fn is_usable(reply: &str) -> bool {
    reply.chars().count() >= MIN_REPLY_CHARS && !reply.contains("Error")
}

/// Static competitor overview used when generation is unusable.
pub fn fallback_analysis(vendor: &str, client: &str) -> String {
    let competitors: [(&str, &str, &str, &str); 3] = [
        (
            "Accenture",
            "Enterprise transformation, cloud migration and R&D analytics",
            "Global scale, broad partner ecosystem, deep pharma relationships",
            "High cost, long engagement cycles, generic delivery teams",
        ),
        (
            "Deloitte",
            "Regulatory consulting, data governance and commercial analytics",
            "Compliance depth, executive access, integrated audit and advisory",
            "Premium pricing, slower technical execution",
        ),
        (
            "ZS Associates",
            "Commercial analytics, sales force effectiveness and forecasting",
            "Life sciences focus, strong analytics talent",
            "Narrower engineering depth, limited platform build capacity",
        ),
    ];

    competitors
        .iter()
        .map(|(name, services, strengths, weaknesses)| {
            format!(
                "• {name}:\n  Services: {services} for {client} and similar clients\n  \
                 Strengths: {strengths}\n  Weaknesses: {weaknesses}\n  \
                 {vendor} Advantage: faster delivery, life sciences data specialists and lower cost"
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

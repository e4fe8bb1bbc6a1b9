//! PRODUCT ANALYSIS: strategy memo plus vendor offering matches.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use prelytics_report::SectionHeader;
use prelytics_shared::{Result, Target, VendorConfig};

use crate::Stage;
use crate::llm::{Prompt, TextGenerator};
use crate::scrape::WebsiteScraper;

pub struct ProductStage {
    scraper: Arc<WebsiteScraper>,
    llm: Arc<dyn TextGenerator>,
    vendor: VendorConfig,
}

impl ProductStage {
    pub fn new(
        scraper: Arc<WebsiteScraper>,
        llm: Arc<dyn TextGenerator>,
        vendor: VendorConfig,
    ) -> Self {
        Self {
            scraper,
            llm,
            vendor,
        }
    }
}

#[async_trait]
impl Stage for ProductStage {
    fn section(&self) -> SectionHeader {
        SectionHeader::ProductAnalysis
    }

    #[instrument(skip_all, fields(target = %target.name))]
    async fn gather(&self, target: &Target) -> Result<Option<String>> {
        let text = self.scraper.scrape(&target.url, &[]).await;
        if text.trim().is_empty() {
            debug!("no website text; skipping product analysis");
            return Ok(None);
        }

        let vendor = &self.vendor.name;
        let memo = match self.llm.complete(&memo_prompt(vendor, &target.name, &text)).await {
            Ok(memo) => memo,
            Err(e) => {
                warn!(error = %e, "product memo generation failed; using fallback");
                fallback_memo(vendor, &target.name)
            }
        };

        let matches = match_offerings(&self.vendor, &text);
        let mut body = format!(
            "PRODUCT ANALYSIS FOR {}\n\n{memo}\n\n{} OFFERING MATCHES:\n",
            target.name.to_uppercase(),
            vendor.to_uppercase()
        );
        if matches.is_empty() {
            body.push_str(
                "• No direct matches found, but opportunities may exist based on industry analysis",
            );
        } else {
            let lines: Vec<String> = matches
                .iter()
                .map(|(offering, keywords)| format!("• {offering}: {}", keywords.join(", ")))
                .collect();
            body.push_str(&lines.join("\n"));
        }

        Ok(Some(body))
    }
}

/// Offerings whose keywords occur (case-insensitively) in `text`, with the
/// keywords that matched.
pub fn match_offerings<'a>(vendor: &'a VendorConfig, text: &str) -> Vec<(&'a str, Vec<&'a str>)> {
    let haystack = text.to_lowercase();
    vendor
        .offerings
        .iter()
        .filter_map(|(offering, keywords)| {
            let hits: Vec<&str> = keywords
                .iter()
                .filter(|kw| haystack.contains(&kw.to_lowercase()))
                .map(String::as_str)
                .collect();
            (!hits.is_empty()).then_some((offering.as_str(), hits))
        })
        .collect()
}

fn memo_prompt(vendor: &str, client: &str, text: &str) -> Prompt {
    Prompt::new(format!(
        "Create a product analysis for {client} based on this website text:\n\n{text}\n\n\
         Use exactly these headings:\n\n\
         CLIENT STRATEGY MEMO\n[business model, market position, key challenges]\n\n\
         CLIENT OPPORTUNITY BRIEF\n[where {vendor} can add value: pain points and needs]\n\n\
         {} PRODUCT FIT\n[how {vendor}'s services align with the client's needs]\n\n\
         COMPETITIVE POSITIONING\n[how {vendor} can differentiate]\n\n\
         PITCH STRATEGY\n[step-by-step pitch for {client}, using only facts from the text: \
         business lines, products, recent news, relevant offerings, stakeholders to target]",
        vendor.to_uppercase()
    ))
}

/// Generic memo used when generation fails.
pub fn fallback_memo(vendor: &str, client: &str) -> String {
    format!(
        "CLIENT STRATEGY MEMO\n\
         {client} operates in the biotech/life sciences sector with a focus on research and \
         innovation. Likely challenges include data management, regulatory compliance and \
         scaling operations efficiently.\n\n\
         CLIENT OPPORTUNITY BRIEF\n\
         • Data analytics for clinical trial optimization\n\
         • Regulatory compliance and reporting automation\n\
         • Digital transformation of R&D processes\n\n\
         {upper} PRODUCT FIT\n\
         • Cloud-based data management and security\n\
         • Machine learning for discovery and operations\n\
         • Clinical data integration and analysis\n\n\
         COMPETITIVE POSITIONING\n\
         • Life sciences domain expertise\n\
         • Faster time-to-value than large consultancies\n\n\
         PITCH STRATEGY\n\
         • Open with specific clinical data pain points at {client}\n\
         • Offer a short pilot to prove value\n\
         • Back the pitch with {vendor} case studies and measurable ROI",
        upper = vendor.to_uppercase()
    )
}

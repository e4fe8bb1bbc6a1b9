//! KEY DECISION MAKERS: top leaders named on the company's leadership pages.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use prelytics_report::SectionHeader;
use prelytics_shared::{Result, Target};

use crate::Stage;
use crate::llm::{Prompt, TextGenerator};
use crate::scrape::WebsiteScraper;

const LEADERSHIP_PATHS: [&str; 3] = ["/leadership", "/executives", "/management"];

pub struct LeadershipStage {
    scraper: Arc<WebsiteScraper>,
    llm: Arc<dyn TextGenerator>,
}

impl LeadershipStage {
    pub fn new(scraper: Arc<WebsiteScraper>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { scraper, llm }
    }
}

#[async_trait]
impl Stage for LeadershipStage {
    fn section(&self) -> SectionHeader {
        SectionHeader::KeyDecisionMakers
    }

    #[instrument(skip_all, fields(target = %target.name))]
    async fn gather(&self, target: &Target) -> Result<Option<String>> {
        let text = self.scraper.scrape(&target.url, &LEADERSHIP_PATHS).await;
        if text.trim().is_empty() {
            debug!("no leadership content");
            return Ok(None);
        }

        let prompt = Prompt::new(format!(
            "From the following content, extract the top 3 leadership members (name and title).\n\
             Answer with one line per person, each starting with •. Do not use asterisks.\n\n\
             Content:\n{text}"
        ))
        .with_system("You are a business intelligence analyst. Extract leadership information accurately.")
        .with_max_tokens(500);

        let leaders = self.llm.complete(&prompt).await?;
        Ok(Some(leaders))
    }
}

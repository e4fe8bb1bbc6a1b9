//! CLIENT INTELLIGENCE: a four-point profile built from the company website.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use prelytics_report::SectionHeader;
use prelytics_shared::{Result, Target};

use crate::Stage;
use crate::llm::{Prompt, TextGenerator};
use crate::scrape::WebsiteScraper;

pub struct ClientIntelligenceStage {
    scraper: Arc<WebsiteScraper>,
    llm: Arc<dyn TextGenerator>,
}

impl ClientIntelligenceStage {
    pub fn new(scraper: Arc<WebsiteScraper>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { scraper, llm }
    }
}

#[async_trait]
impl Stage for ClientIntelligenceStage {
    fn section(&self) -> SectionHeader {
        SectionHeader::ClientIntelligence
    }

    #[instrument(skip_all, fields(target = %target.name))]
    async fn gather(&self, target: &Target) -> Result<Option<String>> {
        let text = self.scraper.scrape(&target.url, &[]).await;
        if text.trim().is_empty() {
            debug!("no website text; skipping profile");
            return Ok(None);
        }

        let profile = self.llm.complete(&profile_prompt(&target.name, &text)).await?;
        Ok(Some(profile))
    }
}

pub(crate) fn profile_prompt(name: &str, website_text: &str) -> Prompt {
    Prompt::new(format!(
        "Explain clearly what {name} does, based on the raw website content below.\n\
         Be specific and grounded; avoid buzzwords.\n\n\
         Respond in exactly this format, one bullet per line, keeping the labels:\n\n\
         • What the company does: ...\n\
         • Who their typical customers are: ...\n\
         • What technologies or platforms they rely on: ...\n\
         • Strategic priorities or focus areas: ...\n\n\
         Raw website content:\n{website_text}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;
    use prelytics_shared::ScrapeConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scraper() -> Arc<WebsiteScraper> {
        Arc::new(WebsiteScraper::new(&ScrapeConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn profile_is_generated_from_site_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<main><p>Acme makes widgets.</p></main>", "text/html"),
            )
            .mount(&server)
            .await;

        let llm = Arc::new(ScriptedGenerator::replying(&["• What the company does: widgets"]));
        let stage = ClientIntelligenceStage::new(scraper(), llm.clone());
        let target = Target::new("Acme", &server.uri()).unwrap();

        let body = stage.gather(&target).await.unwrap();
        assert_eq!(body.as_deref(), Some("• What the company does: widgets"));

        let prompt = llm.prompt(0);
        assert!(prompt.user.contains("Acme makes widgets."));
        assert!(prompt.user.contains("• Strategic priorities or focus areas"));
    }

    #[tokio::test]
    async fn empty_site_skips_generation() {
        let server = MockServer::start().await;
        let llm = Arc::new(ScriptedGenerator::replying(&[]));
        let stage = ClientIntelligenceStage::new(scraper(), llm.clone());
        let target = Target::new("Acme", &server.uri()).unwrap();

        assert!(stage.gather(&target).await.unwrap().is_none());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }
}

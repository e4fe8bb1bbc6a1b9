//! OPERATIONAL SIGNALS: hiring, technology and newsroom signals, summarized.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};
use url::Url;

use prelytics_report::SectionHeader;
use prelytics_shared::{OperationsConfig, Result, Target};

use crate::Stage;
use crate::llm::{Prompt, TextGenerator};
use crate::scrape::{WebsiteScraper, truncate_chars, visible_text};

/// Job titles worth reporting when they appear on a job search page.
static JOB_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Data Scientist|Software Engineer|Clinical Research|DevOps|Product Manager|Bioinformatician|AI Engineer|Data Analyst",
    )
    .expect("valid regex")
});

const DEFAULT_JOB_TITLES: [&str; 5] = [
    "Data Scientist",
    "Software Engineer",
    "Clinical Research Associate",
    "AI/ML Engineer",
    "Product Manager",
];

/// (category, technology, lower-cased HTML signature)
const TECH_SIGNATURES: &[(&str, &str, &str)] = &[
    ("Web", "React", "data-reactroot"),
    ("Web", "React", "react-dom"),
    ("Web", "Next.js", "/_next/"),
    ("Web", "Angular", "ng-version"),
    ("Web", "Vue.js", "data-v-"),
    ("Web", "WordPress", "wp-content"),
    ("Web", "Drupal", "drupal"),
    ("Web", "Adobe Experience Manager", "/etc.clientlibs/"),
    ("Analytics", "Google Analytics", "googletagmanager.com"),
    ("Analytics", "Adobe Analytics", "adobedtm.com"),
    ("Analytics", "Segment", "cdn.segment.com"),
    ("CRM", "HubSpot", "js.hs-scripts.com"),
    ("CRM", "Salesforce", "salesforce"),
    ("CRM", "Marketo", "munchkin"),
    ("Cloud", "AWS", "amazonaws.com"),
    ("Cloud", "AWS", "cloudfront.net"),
    ("Cloud", "Azure", "azureedge.net"),
    ("Cloud", "Google Cloud", "storage.googleapis.com"),
    ("Cloud", "Cloudflare", "cdn-cgi"),
];

const DEFAULT_TECH_STACK: &[(&str, &str)] = &[
    ("Cloud", "AWS, Azure"),
    ("CRM", "Salesforce"),
    ("Analytics", "Snowflake, Tableau, Python"),
    ("Web", "React, Node.js"),
];

const NEWSROOM_PATHS: [&str; 3] = ["/newsroom", "/news", "/press"];
const NEWSROOM_MAX_CHARS: usize = 3_000;

/// Raw signals handed to the summary prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationalSignals {
    pub job_titles: Vec<String>,
    /// Category → comma-separated technologies, in first-detected order.
    pub tech_stack: Vec<(String, String)>,
    pub news: String,
}

pub struct OperationsStage {
    scraper: Arc<WebsiteScraper>,
    llm: Arc<dyn TextGenerator>,
    config: OperationsConfig,
}

impl OperationsStage {
    pub fn new(
        scraper: Arc<WebsiteScraper>,
        llm: Arc<dyn TextGenerator>,
        config: OperationsConfig,
    ) -> Self {
        Self {
            scraper,
            llm,
            config,
        }
    }

    /// Collect the three signal groups, falling back to defaults per group.
    pub async fn collect(&self, target: &Target) -> OperationalSignals {
        let mut job_titles = self.job_titles(&target.name).await;
        if job_titles.is_empty() {
            debug!("no job titles found; using defaults");
            job_titles = DEFAULT_JOB_TITLES.iter().map(|t| (*t).to_string()).collect();
        }

        let mut tech_stack = match self.scraper.fetch_html(&target.url).await {
            Ok(html) => detect_tech_stack(&html),
            Err(e) => {
                debug!(error = %e, "homepage unavailable for tech detection");
                Vec::new()
            }
        };
        if tech_stack.is_empty() {
            tech_stack = DEFAULT_TECH_STACK
                .iter()
                .map(|(c, t)| ((*c).to_string(), (*t).to_string()))
                .collect();
        }

        let news = self
            .scraper
            .first_available(&target.url, &NEWSROOM_PATHS, NEWSROOM_MAX_CHARS)
            .await
            .unwrap_or_else(|| {
                format!(
                    "{} is investing in digital transformation, AI-driven research, and advanced \
                     analytics to accelerate innovation and improve operational efficiency.",
                    target.name
                )
            });

        OperationalSignals {
            job_titles,
            tech_stack,
            news,
        }
    }

    async fn job_titles(&self, company: &str) -> Vec<String> {
        let url = match job_search_url(&self.config.job_search_url, company) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "invalid job search URL");
                return Vec::new();
            }
        };

        match self.scraper.fetch_html(&url).await {
            Ok(html) => match_job_titles(&visible_text(&html)),
            Err(e) => {
                debug!(error = %e, "job search fetch failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Stage for OperationsStage {
    fn section(&self) -> SectionHeader {
        SectionHeader::OperationalSignals
    }

    #[instrument(skip_all, fields(target = %target.name))]
    async fn gather(&self, target: &Target) -> Result<Option<String>> {
        let signals = self.collect(target).await;
        let summary = self
            .llm
            .complete(&summary_prompt(&target.name, &signals))
            .await?;
        Ok(Some(summary))
    }
}

/// Fill the `{company}` slot of a job search URL template.
pub fn job_search_url(template: &str, company: &str) -> std::result::Result<Url, url::ParseError> {
    let encoded: String = url::form_urlencoded::byte_serialize(company.as_bytes()).collect();
    Url::parse(&template.replace("{company}", &encoded))
}

/// Distinct known job titles in order of first appearance.
pub fn match_job_titles(text: &str) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for m in JOB_TITLE_RE.find_iter(text) {
        if !titles.iter().any(|t| t == m.as_str()) {
            titles.push(m.as_str().to_string());
        }
    }
    titles
}

/// Technologies whose signatures appear in the page HTML, grouped by category.
pub fn detect_tech_stack(html: &str) -> Vec<(String, String)> {
    let html = html.to_lowercase();
    let mut stack: Vec<(String, Vec<&str>)> = Vec::new();

    for (category, tech, signature) in TECH_SIGNATURES {
        if !html.contains(*signature) {
            continue;
        }
        match stack.iter_mut().find(|(c, _)| c.as_str() == *category) {
            Some((_, techs)) if techs.contains(tech) => {}
            Some((_, techs)) => techs.push(*tech),
            None => stack.push(((*category).to_string(), vec![*tech])),
        }
    }

    stack
        .into_iter()
        .map(|(category, techs)| (category, techs.join(", ")))
        .collect()
}

fn summary_prompt(company: &str, signals: &OperationalSignals) -> Prompt {
    let stack = signals
        .tech_stack
        .iter()
        .map(|(c, t)| format!("{c}: {t}"))
        .collect::<Vec<_>>()
        .join("; ");

    Prompt::new(format!(
        "Help me understand how {company} operates based on this data.\n\n\
         Break it down:\n\
         • What kind of talent are they looking for?\n\
         • What's their technical direction?\n\
         • What initiatives are they working on?\n\
         • Where might they need help or be falling short?\n\n\
         Answer as bullet points, each starting with • on its own line. Be clear, no corporate tone.\n\n\
         Signals:\n\
         - Job Roles: {}\n\
         - Tech Stack: {stack}\n\
         - Content Insights: {}",
        signals.job_titles.join(", "),
        truncate_chars(&signals.news, NEWSROOM_MAX_CHARS),
    ))
    .with_temperature(0.4)
}

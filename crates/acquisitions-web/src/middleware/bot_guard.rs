//! User-agent based bot detection.

/// HTTP libraries and automation tools. These are denied even when an
/// allowed crawler name also appears in the agent.
const TOOL_SIGNATURES: &[&str] = &[
    "curl", "wget", "python-requests", "httpie", "go-http", "headless", "phantomjs", "scrapy",
    "scrape", "java/", "libwww", "okhttp",
];

/// Generic crawler markers, denied unless the agent is allow-listed.
const BOT_PATTERNS: &[&str] = &["bot", "crawl", "spider"];

/// Search engines and link-preview fetchers that are let through.
const ALLOWED_AGENTS: &[&str] = &[
    "googlebot",
    "bingbot",
    "duckduckbot",
    "yandexbot",
    "applebot",
    "slackbot",
    "twitterbot",
    "facebookexternalhit",
    "linkedinbot",
    "discordbot",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentVerdict {
    Human,
    AllowedBot,
    Automated,
}

impl AgentVerdict {
    pub fn is_denied(self) -> bool {
        self == AgentVerdict::Automated
    }
}

/// Classifies a request by its `User-Agent`. A missing or blank agent is
/// treated as automated.
pub fn classify(user_agent: Option<&str>) -> AgentVerdict {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return AgentVerdict::Automated;
    };

    let ua_lower = ua.to_lowercase();
    if TOOL_SIGNATURES.iter().any(|t| ua_lower.contains(t)) {
        return AgentVerdict::Automated;
    }
    if ALLOWED_AGENTS.iter().any(|a| ua_lower.contains(a)) {
        return AgentVerdict::AllowedBot;
    }
    if BOT_PATTERNS.iter().any(|p| ua_lower.contains(p)) {
        return AgentVerdict::Automated;
    }
    AgentVerdict::Human
}

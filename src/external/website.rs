// ABOUTME: Website text extractor feeding report synthesis
// ABOUTME: Fetches a page and reduces its HTML to normalized plain text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::LazyLock;

use outreach_core::constants::extraction;
use outreach_core::errors::{OutreachError, OutreachResult};
use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response};
use tracing::{debug, instrument};
use url::Url;

use crate::config::ExtractionConfig;
use crate::utils::http_client::shared_client;

/// Elements whose content is never page text
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "head",
];

/// Non-content elements dropped to the end of input when never closed
///
/// `head` is excluded because its end tag may legally be omitted.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "iframe"];

/// Elements that end a line of text
const BLOCK_TAGS: &str = "p|div|section|article|header|footer|nav|aside|main|h[1-6]|li|ul|ol|dl|dt|dd|tr|table|thead|tbody|blockquote|pre|address|figure|figcaption|form|fieldset|hr";

static COMMENT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").ok());

static NON_CONTENT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let alternatives: Vec<String> = NON_CONTENT_TAGS
        .iter()
        .map(|tag| {
            if RAW_TEXT_TAGS.contains(tag) {
                format!(r"<{tag}\b[^>]*(?:>.*?(?:</{tag}\s*>|\z)|\z)")
            } else {
                format!(r"<{tag}\b[^>]*>.*?</{tag}\s*>")
            }
        })
        .collect();
    Regex::new(&format!("(?is){}", alternatives.join("|"))).ok()
});

static LINE_BREAK_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)<br\s*/?>|</?(?:{BLOCK_TAGS})\b[^>]*>")).ok()
});

static TAG_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

static SPACE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\s\u{00A0}]+").ok());

/// Website extractor configuration
#[derive(Debug, Clone)]
pub struct WebsiteExtractorConfig {
    /// Maximum characters of text returned
    pub max_chars: usize,
    /// Maximum bytes of response body read
    pub max_bytes: usize,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for WebsiteExtractorConfig {
    fn default() -> Self {
        Self {
            max_chars: extraction::DEFAULT_MAX_CHARS,
            max_bytes: extraction::DEFAULT_MAX_BYTES,
            user_agent: extraction::USER_AGENT.to_owned(),
        }
    }
}

impl From<&ExtractionConfig> for WebsiteExtractorConfig {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            max_chars: config.max_chars,
            max_bytes: config.max_bytes,
            ..Self::default()
        }
    }
}

/// Fetches web pages and returns their readable text
#[derive(Clone)]
pub struct WebsiteExtractor {
    config: WebsiteExtractorConfig,
    http: Client,
}

impl WebsiteExtractor {
    /// Create an extractor sharing the process-wide HTTP client
    #[must_use]
    pub fn new(config: WebsiteExtractorConfig) -> Self {
        Self {
            config,
            http: shared_client().clone(),
        }
    }

    /// Fetch `url` and return its normalized plain text
    ///
    /// A URL without a scheme is fetched over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` for an unusable URL, a transport failure, or a
    /// non-2xx status
    #[instrument(skip(self))]
    pub async fn extract_text(&self, url: &str) -> OutreachResult<String> {
        let target = normalize_url(url)?;

        let response = self
            .http
            .get(target.clone())
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.5")
            .send()
            .await
            .map_err(|e| fetch_error(url, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(
                url,
                Some(status.as_u16()),
                format!("HTTP {status}"),
            ));
        }

        let is_plain_text = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/plain"));

        let body = read_capped(response, self.config.max_bytes)
            .await
            .map_err(|e| fetch_error(url, Some(status.as_u16()), e.to_string()))?;

        let text = if is_plain_text {
            collapse_whitespace(&body)
        } else {
            html_to_text(&body)
        };
        let text = truncate_chars(text, self.config.max_chars);

        debug!(url = %target, chars = text.chars().count(), "Extracted website text");
        Ok(text)
    }
}

/// Read at most `max_bytes` of the body; the rest is never downloaded
async fn read_capped(mut response: Response, max_bytes: usize) -> reqwest::Result<String> {
    if let Some(length) = response.content_length().filter(|&len| len > max_bytes as u64) {
        debug!(content_length = length, max_bytes, "Page larger than read limit, truncating");
    }

    let mut buffer = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = max_bytes.saturating_sub(buffer.len());
        buffer.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if buffer.len() >= max_bytes {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn fetch_error(url: &str, status: Option<u16>, reason: String) -> OutreachError {
    OutreachError::FetchError {
        url: url.to_owned(),
        status,
        reason,
    }
}

fn normalize_url(raw: &str) -> OutreachResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(fetch_error(raw, None, "URL is empty".to_owned()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| fetch_error(raw, None, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(fetch_error(
            raw,
            None,
            format!("unsupported scheme '{other}'"),
        )),
    }
}

fn replace_all(pattern: &LazyLock<Option<Regex>>, text: &str, replacement: &str) -> String {
    pattern.as_ref().map_or_else(
        || text.to_owned(),
        |regex| regex.replace_all(text, replacement).into_owned(),
    )
}

/// Reduce an HTML document to plain text
///
/// Non-content elements are dropped with their children, block elements end
/// a line, remaining tags are removed, entities are decoded, and whitespace is
/// collapsed with blank lines removed.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let text = replace_all(&COMMENT_PATTERN, html, "");
    let text = replace_all(&NON_CONTENT_PATTERN, &text, "");
    let text = replace_all(&LINE_BREAK_PATTERN, &text, "\n");
    let text = replace_all(&TAG_PATTERN, &text, "");
    let text = html_escape::decode_html_entities(&text);
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| replace_all(&SPACE_PATTERN, line, " ").trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].trim_end().to_owned(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_and_style_content_removed() {
        let html = r#"<html><head><title>Ignored</title><style>body { color: red; }</style></head>
            <body><script type="text/javascript">var secret = "tracking";</script>
            <p>Acme Foundation reduces hunger.</p><SCRIPT>alert(1)</SCRIPT></body></html>"#;
        let text = html_to_text(html);

        assert_eq!(text, "Acme Foundation reduces hunger.");
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_unclosed_non_content_elements_removed() {
        assert_eq!(html_to_text("<p>Hi</p><script>var secret = 'tracking';"), "Hi");
        assert_eq!(html_to_text("<p>Hi</p><style>p { color: red }"), "Hi");
        assert_eq!(html_to_text("<p>Hi</p><script src=\"/a.js\" async"), "Hi");
        assert_eq!(
            html_to_text("<script>a()</script><p>Kept</p><noscript>Enable JS"),
            "Kept"
        );
    }

    #[test]
    fn test_unclosed_head_keeps_body() {
        assert_eq!(
            html_to_text("<html><head><title>T</title><body><p>Body text</p>"),
            "T\nBody text"
        );
    }

    #[test]
    fn test_block_elements_break_lines() {
        let html = "<h1>Our Mission</h1><p>Feed   families.</p><ul><li>Food banks</li><li>Meals</li></ul>Line<br/>break";
        assert_eq!(
            html_to_text(html),
            "Our Mission\nFeed families.\nFood banks\nMeals\nLine\nbreak"
        );
    }

    #[test]
    fn test_inline_tags_do_not_split_words() {
        assert_eq!(html_to_text("<p>Ac<b>me</b> &amp; Co&nbsp;Ltd</p>"), "Acme & Co Ltd");
    }

    #[test]
    fn test_comments_and_hidden_blocks_removed() {
        let html = "<!-- nav <p>hidden</p> --><noscript>Enable JS</noscript><div>Visible</div>";
        assert_eq!(html_to_text(html), "Visible");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld".to_owned(), 7), "héllo w");
        assert_eq!(truncate_chars("short".to_owned(), 10), "short");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("acme.org/about").expect("url").as_str(),
            "https://acme.org/about"
        );
        assert!(normalize_url("ftp://acme.org").is_err());
        assert!(normalize_url("  ").is_err());
    }
}

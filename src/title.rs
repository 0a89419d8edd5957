//! Fetching a page title for `[title](url)` links.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::config::Settings;
use crate::error::LinkError;

/// Anything that can turn a URL into a page title. Implementations block;
/// callers that must not block run them on a worker thread.
pub trait TitleSource: Send + Sync {
    fn fetch_title(&self, url: &Url, timeout: Duration) -> Result<String, LinkError>;
}

/// Plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpTitleSource {
    max_redirects: u32,
}

impl HttpTitleSource {
    /// Redirects are not followed while local networks are blocked, since a
    /// redirect could point anywhere.
    pub fn new(settings: &Settings) -> HttpTitleSource {
        HttpTitleSource {
            max_redirects: if settings.security.block_local_networks { 0 } else { 5 },
        }
    }
}

impl TitleSource for HttpTitleSource {
    fn fetch_title(&self, url: &Url, timeout: Duration) -> Result<String, LinkError> {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .redirects(self.max_redirects)
            .build();

        let failed = |reason: String| LinkError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = match agent.get(url.as_str()).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                return Err(failed(format!("status {code} ({})", response.status_text())))
            }
            Err(err) => return Err(failed(err.to_string())),
        };

        if response.status() != 200 {
            return Err(failed(format!("status {}", response.status())));
        }

        let body = response
            .into_string()
            .map_err(|err| failed(format!("failed reading response body: {err}")))?;
        if body.trim().is_empty() {
            return Err(failed("empty body".to_string()));
        }

        extract_title(&body).ok_or_else(|| LinkError::NoTitleFound {
            url: url.to_string(),
        })
    }
}

/// Text of the first `<title>` element, entity-decoded with whitespace
/// collapsed. `None` when there is no title or it is blank.
pub fn extract_title(html: &str) -> Option<String> {
    static TITLE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<title(?:\s[^>]*)?>(?<title>.*?)</title\s*>").unwrap());

    let raw = TITLE_RE.captures(html)?.name("title")?.as_str();
    let title = html_escape::decode_html_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    (!title.is_empty()).then_some(title)
}

/// `[title](url)` with brackets in the title escaped.
pub fn markdown_link(title: &str, url: &str) -> String {
    let title = title.replace('[', "\\[").replace(']', "\\]");
    format!("[{title}]({url})")
}

use std::{borrow::Cow, collections::HashMap};

use async_trait::async_trait;
use common::{error::AppError, utils::config::AppConfig};
use reqwest::Client;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::Document;

/// Elements that start a new line when storage markup is flattened.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section", "table", "tbody",
    "td", "th", "thead", "tr", "ul", "ac:plain-text-body",
];

/// Macro arguments such as a code block's language; never page text.
const SKIPPED_ELEMENTS: &[&str] = &["ac:parameter"];

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Anything able to produce the complete, current set of documentation pages.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Document>, AppError>;
}

#[derive(Debug, Deserialize)]
struct ContentPage {
    #[serde(default)]
    results: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    id: String,
    #[serde(default)]
    title: String,
    body: Option<ContentBody>,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    storage: Option<StorageBody>,
}

#[derive(Debug, Deserialize)]
struct StorageBody {
    #[serde(default)]
    value: String,
}

impl From<ContentItem> for Document {
    fn from(item: ContentItem) -> Self {
        let markup = item
            .body
            .and_then(|body| body.storage)
            .map(|storage| storage.value)
            .unwrap_or_default();

        Document::new(item.id, item.title, strip_markup(&markup))
    }
}

/// Pulls every page of one Confluence space through the content REST API.
pub struct ConfluenceFetcher {
    http: Client,
    base_url: String,
    user: String,
    api_token: String,
    space_key: String,
    page_size: usize,
}

impl ConfluenceFetcher {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        user: impl Into<String>,
        api_token: impl Into<String>,
        space_key: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: user.into(),
            api_token: api_token.into(),
            space_key: space_key.into(),
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(config: &AppConfig, http: Client) -> Self {
        Self::new(
            http,
            &config.confluence_url,
            &config.confluence_user,
            &config.confluence_api_token,
            &config.space_key,
            config.confluence_page_size,
        )
    }

    /// Fetches one page of results starting at `start`.
    pub async fn fetch_page(&self, start: usize) -> Result<Vec<Document>, AppError> {
        let start = start.to_string();
        let limit = self.page_size.to_string();

        let response = self
            .http
            .get(format!("{}/rest/api/content", self.base_url))
            .basic_auth(&self.user, Some(&self.api_token))
            .header("Accept", "application/json")
            .query(&[
                ("spaceKey", self.space_key.as_str()),
                ("type", "page"),
                ("start", start.as_str()),
                ("limit", limit.as_str()),
                ("expand", "body.storage"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Confluence request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Confluence responded with {status}"
            )));
        }

        let page: ContentPage = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Unreadable Confluence response: {e}")))?;

        Ok(page.results.into_iter().map(Document::from).collect())
    }
}

#[async_trait]
impl DocumentSource for ConfluenceFetcher {
    /// Walks the space page by page until an empty page comes back. Titles are
    /// unique in the result; a repeated title replaces the earlier page in place.
    #[instrument(skip_all, fields(space_key = %self.space_key, page_size = self.page_size))]
    async fn fetch_all(&self) -> Result<Vec<Document>, AppError> {
        let mut documents: Vec<Document> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut start = 0usize;
        let mut requests = 0usize;

        loop {
            let page = self.fetch_page(start).await?;
            requests = requests.saturating_add(1);
            if page.is_empty() {
                break;
            }

            debug!(start, received = page.len(), "Fetched documentation page");
            for document in page {
                match positions.get(&document.title).copied() {
                    Some(position) => {
                        if let Some(slot) = documents.get_mut(position) {
                            *slot = document;
                        }
                    }
                    None => {
                        positions.insert(document.title.clone(), documents.len());
                        documents.push(document);
                    }
                }
            }
            start = start.saturating_add(self.page_size);
        }

        info!(
            documents = documents.len(),
            requests, "Fetched documentation space"
        );
        Ok(documents)
    }
}

/// Reduces storage-format markup to plain text, with block elements on their
/// own lines.
pub fn strip_markup(markup: &str) -> String {
    let fragment = Html::parse_fragment(&unwrap_cdata(markup));
    let mut text = String::with_capacity(markup.len());
    push_text(fragment.root_element(), &mut text);
    text
}

/// Replaces CDATA sections (code macro bodies) with their escaped contents;
/// an HTML parser would otherwise turn them into comments.
fn unwrap_cdata(markup: &str) -> Cow<'_, str> {
    if !markup.contains(CDATA_OPEN) {
        return Cow::Borrowed(markup);
    }

    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some((before, after_open)) = rest.split_once(CDATA_OPEN) {
        out.push_str(before);
        let (body, tail) = after_open
            .split_once(CDATA_CLOSE)
            .unwrap_or((after_open, ""));
        for ch in body.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(ch),
            }
        }
        rest = tail;
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            let is_block = BLOCK_ELEMENTS.contains(&name);
            if is_block {
                out.push('\n');
            }
            push_text(child_element, out);
            if is_block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

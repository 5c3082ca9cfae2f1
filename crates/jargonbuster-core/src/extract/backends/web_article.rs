use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;
use url::Url;

use crate::extract::backend::{Backend, BackendError, BackendResult};
use crate::extract::content_type::detect_content_type;
use crate::extract::http::HttpClient;
use crate::extract::request::{ExtractionRequest, ExtractionResponse};
use crate::meta::Meta;

const MIN_PARAGRAPH_CHARS: usize = 30;

/// HTML pages scraped as articles: body paragraphs plus the page's metadata.
pub struct WebArticleBackend {
    http: HttpClient,
}

fn select<'a>(root: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    Selector::parse(css).map_or_else(|_| Vec::new(), |s| root.select(&s).collect())
}

fn first_attr(root: &Html, css: &str, attr: &str) -> Option<String> {
    select(root, css)
        .into_iter()
        .find_map(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fields scraped from one article page.
#[derive(Debug, Default)]
struct Article {
    title: Option<String>,
    text: String,
    authors: Vec<String>,
    language: Option<String>,
    keywords: Vec<String>,
    publish_date: Option<String>,
    top_image: Option<String>,
    images: Vec<String>,
    videos: Vec<String>,
}

impl Article {
    fn parse(html: &str, base: &Url) -> Self {
        let doc = Html::parse_document(html);
        let resolve = |src: &str| base.join(src).map(|u| u.to_string()).ok();

        let title = first_attr(&doc, r#"meta[property="og:title"]"#, "content").or_else(|| {
            select(&doc, "title")
                .first()
                .map(element_text)
                .filter(|t| !t.is_empty())
        });

        let mut seen = HashSet::new();
        let authors = select(
            &doc,
            r#"meta[name="author"], meta[property="article:author"], [rel="author"]"#,
        )
        .into_iter()
        .filter_map(|el| {
            el.value()
                .attr("content")
                .map(str::to_string)
                .or_else(|| Some(element_text(&el)))
        })
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty() && seen.insert(a.clone()))
        .collect();

        let language = first_attr(&doc, "html[lang]", "lang")
            .or_else(|| first_attr(&doc, r#"meta[http-equiv="content-language"]"#, "content"))
            .map(|l| l.split(['-', '_']).next().unwrap_or(&l).to_lowercase());

        let keywords = first_attr(&doc, r#"meta[name="keywords"]"#, "content")
            .map(|k| {
                k.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let publish_date = first_attr(&doc, r#"meta[property="article:published_time"]"#, "content")
            .or_else(|| first_attr(&doc, "time[datetime]", "datetime"));

        let top_image = first_attr(&doc, r#"meta[property="og:image"]"#, "content")
            .and_then(|src| resolve(&src));

        let mut seen = HashSet::new();
        let images = select(&doc, "img[src]")
            .into_iter()
            .filter_map(|el| el.value().attr("src").and_then(resolve))
            .filter(|src| seen.insert(src.clone()))
            .collect();

        let videos = select(&doc, "video[src], video source[src], iframe[src]")
            .into_iter()
            .filter_map(|el| el.value().attr("src").and_then(resolve))
            .collect();

        let mut paragraphs: Vec<String> = select(&doc, "article p")
            .iter()
            .map(element_text)
            .filter(|p| p.len() >= MIN_PARAGRAPH_CHARS)
            .collect();
        if paragraphs.is_empty() {
            paragraphs = select(&doc, "p")
                .iter()
                .map(element_text)
                .filter(|p| p.len() >= MIN_PARAGRAPH_CHARS)
                .collect();
        }

        Self {
            title,
            text: paragraphs.join("\n\n"),
            authors,
            language,
            keywords,
            publish_date,
            top_image,
            images,
            videos,
        }
    }

    fn into_meta(self, base: &Url) -> (String, Meta) {
        let mut meta = Meta::new();
        meta.insert("source".into(), Value::from("web_article"));
        meta.insert(
            "source_url".into(),
            Value::from(base.origin().ascii_serialization()),
        );
        meta.insert("title".into(), self.title.map_or(Value::Null, Value::from));
        meta.insert("top_image".into(), self.top_image.map_or(Value::Null, Value::from));
        meta.insert("images".into(), Value::from(self.images));
        meta.insert("videos".into(), Value::from(self.videos));
        meta.insert("meta_language".into(), self.language.map_or(Value::Null, Value::from));
        meta.insert("meta_keywords".into(), Value::from(self.keywords));
        meta.insert("authors".into(), Value::from(self.authors));
        meta.insert(
            "publish_date".into(),
            self.publish_date.map_or(Value::Null, Value::from),
        );
        (self.text, meta)
    }
}

impl WebArticleBackend {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Backend for WebArticleBackend {
    fn name(&self) -> &'static str {
        "web_article"
    }

    async fn can_handle(&self, request: &ExtractionRequest) -> bool {
        if request.url().is_none() {
            return false;
        }
        detect_content_type(request, &self.http)
            .await
            .is_some_and(|ct| ct.contains("html"))
    }

    async fn extract(&self, request: &ExtractionRequest) -> BackendResult<ExtractionResponse> {
        let url = request
            .url()
            .ok_or_else(|| BackendError::Unsupported("web articles need a url".to_string()))?;

        info!("Extracting text via article scraper: {} ...", url);

        let base = Url::parse(url).map_err(|e| BackendError::Unsupported(e.to_string()))?;
        let html = self.http.get_text(url).await?;
        let (text, meta) = Article::parse(&html, &base).into_meta(&base);

        Ok(ExtractionResponse::new(text, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en-US">
<head>
  <title>Fallback title</title>
  <meta property="og:title" content="Knee injuries on the rise">
  <meta name="author" content="Jane Doe">
  <meta name="keywords" content="health, sports ,knee">
  <meta property="article:published_time" content="2021-03-04T10:00:00Z">
  <meta property="og:image" content="/img/top.jpg">
</head>
<body>
  <nav><p>Home | News | Contact us today for more</p></nav>
  <article>
    <p>Doctors report more patellar dislocations among young athletes.</p>
    <p>Short.</p>
    <img src="/img/knee.png"><img src="/img/knee.png">
    <p>Physical therapy remains the most common treatment for the injury.</p>
  </article>
</body>
</html>"#;

    fn parsed() -> (String, Meta) {
        let base = Url::parse("https://news.example.org/health/knee").unwrap();
        Article::parse(PAGE, &base).into_meta(&base)
    }

    #[test]
    fn test_article_text_uses_article_paragraphs() {
        let (text, _) = parsed();
        assert_eq!(
            text,
            "Doctors report more patellar dislocations among young athletes.\n\n\
             Physical therapy remains the most common treatment for the injury."
        );
    }

    #[test]
    fn test_article_metadata() {
        let (_, meta) = parsed();
        assert_eq!(meta["source"], "web_article");
        assert_eq!(meta["source_url"], "https://news.example.org");
        assert_eq!(meta["title"], "Knee injuries on the rise");
        assert_eq!(meta["authors"], serde_json::json!(["Jane Doe"]));
        assert_eq!(meta["meta_language"], "en");
        assert_eq!(meta["meta_keywords"], serde_json::json!(["health", "sports", "knee"]));
        assert_eq!(meta["publish_date"], "2021-03-04T10:00:00Z");
        assert_eq!(meta["top_image"], "https://news.example.org/img/top.jpg");
        assert_eq!(
            meta["images"],
            serde_json::json!(["https://news.example.org/img/knee.png"])
        );
    }

    #[tokio::test]
    async fn test_files_are_not_articles() {
        let http = HttpClient::new(&crate::config::ExtractorConfig::default()).unwrap();
        let backend = WebArticleBackend::new(http);
        assert!(!backend.can_handle(&ExtractionRequest::from_file("page.html")).await);
    }
}

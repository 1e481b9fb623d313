use crate::extract::{extract_content, LinkData};
use crate::util::to_feed_body;
use futures::future::try_join_all;
use futures::StreamExt;
use thiserror::Error;

/// Upper bound on any upstream page body.
const MAX_PAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching an upstream page.
///
/// No retries are attempted for any of these; the caller decides whether the
/// failure is fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, timeout, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Body of one announcement, ready to embed in a feed item.
///
/// `content` is already escaped and line-break converted. `index` is the
/// announcement's position in the listing; `None` marks a placeholder used
/// when content-mode is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentData {
    pub content: String,
    pub index: Option<usize>,
}

impl ContentData {
    /// Converts extracted page text into feed body markup tagged with `index`.
    pub fn new(text: &str, index: usize) -> Self {
        Self {
            content: to_feed_body(text),
            index: Some(index),
        }
    }

    /// An empty body standing in for an announcement whose page was not fetched.
    pub fn placeholder() -> Self {
        Self {
            content: String::new(),
            index: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.index.is_none()
    }
}

/// Fetches `url` and returns its body as text.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection, TLS or timeout errors
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - Body exceeded 10MB
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_PAGE_SIZE).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetches one announcement page and extracts its body.
///
/// The result carries `index` so callers can restore listing order after
/// fetching concurrently.
pub async fn fetch_content(
    client: &reqwest::Client,
    link: &str,
    index: usize,
) -> Result<ContentData, FetchError> {
    let html = fetch_page(client, link).await?;
    let text = extract_content(&html);

    tracing::debug!(
        link = %link,
        index = index,
        chars = text.chars().count(),
        "Extracted announcement content"
    );

    Ok(ContentData::new(&text, index))
}

/// Fetches every announcement page concurrently.
///
/// All requests are started before any is awaited and there is no cap on how
/// many run at once. The gather is all-or-nothing: the first failure is
/// returned and the remaining fetches are dropped.
///
/// # Returns
///
/// One [`ContentData`] per link, sorted by index so that `result[i]`
/// belongs to `links[i]` regardless of completion order.
pub async fn fetch_all_content(
    client: &reqwest::Client,
    links: &[LinkData],
) -> Result<Vec<ContentData>, FetchError> {
    tracing::info!(pages = links.len(), "Fetching announcement pages");

    let fetches = links
        .iter()
        .enumerate()
        .map(|(index, link)| fetch_content(client, &link.link, index));

    let mut contents = try_join_all(fetches).await?;
    contents.sort_by_key(|c| c.index);
    Ok(contents)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn detail_page(body: &str) -> String {
        format!(
            r#"<html><body><span id="ctl00_ContentPlaceHolder1_lbl_content">{body}</span></body></html>"#
        )
    }

    fn link(server: &MockServer, title: &str) -> LinkData {
        LinkData {
            title: title.to_string(),
            link: format!("{}/{}", server.uri(), title),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let body = fetch_page(&client, &mock_server.uri()).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1) // No retry
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        match fetch_page(&client, &mock_server.uri()).await {
            Err(FetchError::HttpStatus(503)) => {}
            other => panic!("Expected HttpStatus(503), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused() {
        let client = reqwest::Client::new();
        let result = fetch_page(&client, "http://127.0.0.1:1/unreachable").await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_page_too_large() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; MAX_PAGE_SIZE + 1]))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_page(&client, &mock_server.uri()).await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge)));
    }

    #[tokio::test]
    async fn test_fetch_content_escapes_and_tags_index() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(detail_page("Q&amp;A &lt;today&gt;<br>Room 'B'")),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let content = fetch_content(&client, &format!("{}/page", mock_server.uri()), 7)
            .await
            .unwrap();

        assert_eq!(content.index, Some(7));
        assert_eq!(content.content, "Q&amp;A &lt;today&gt;<br />Room &#39;B&#39;");
    }

    #[tokio::test]
    async fn test_fetch_content_without_body_element_is_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><p>moved</p></html>"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let content = fetch_content(&client, &mock_server.uri(), 0).await.unwrap();
        assert_eq!(content, ContentData::new("", 0));
        assert!(!content.is_placeholder());
    }

    #[tokio::test]
    async fn test_fetch_all_restores_listing_order() {
        let mock_server = MockServer::start().await;

        // The first page answers last
        Mock::given(method("GET"))
            .and(path("/first"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_page("one"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/second"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_page("two"))
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/third"))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("three")))
            .mount(&mock_server)
            .await;

        let links = vec![
            link(&mock_server, "first"),
            link(&mock_server, "second"),
            link(&mock_server, "third"),
        ];
        let client = reqwest::Client::new();
        let contents = fetch_all_content(&client, &links).await.unwrap();

        let bodies: Vec<&str> = contents.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
        let indices: Vec<Option<usize>> = contents.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_fetch_all_runs_concurrently() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_page("slow"))
                    .set_delay(Duration::from_millis(400)),
            )
            .expect(5)
            .mount(&mock_server)
            .await;

        let links: Vec<LinkData> = (0..5).map(|i| link(&mock_server, &format!("p{i}"))).collect();
        let client = reqwest::Client::new();

        let started = std::time::Instant::now();
        let contents = fetch_all_content(&client, &links).await.unwrap();

        assert_eq!(contents.len(), 5);
        // Sequential fetching would take at least 2s
        assert!(started.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_fetch_all_fails_as_a_whole() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/good"))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("fine")))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let links = vec![link(&mock_server, "good"), link(&mock_server, "broken")];
        let client = reqwest::Client::new();

        match fetch_all_content(&client, &links).await {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_empty_listing() {
        let client = reqwest::Client::new();
        let contents = fetch_all_content(&client, &[]).await.unwrap();
        assert!(contents.is_empty());
    }

    #[test]
    fn test_placeholder_is_empty_and_untagged() {
        let placeholder = ContentData::placeholder();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.content, "");
    }
}

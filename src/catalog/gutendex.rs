use crate::catalog::ClientError;
use crate::configs::CatalogConfig;
use crate::item::{Book, PageResult, Query};
use crate::catalog;
use reqwest::{blocking, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Gutendex 공개 API 주소
pub const DEFAULT_BASE_URL: &str = "https://gutendex.com";
/// API 요청의 기본 타임아웃 시간(초)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
/// Gutendex 가 한 페이지에 내려주는 도서 수
pub const DEFAULT_PAGE_SIZE: u32 = 32;

/// 목록 조회 응답
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    /// 필터에 해당하는 전체 도서 수
    pub count: u64,
    /// 다음 페이지 주소
    #[serde(default)]
    pub next: Option<String>,
    /// 이전 페이지 주소
    #[serde(default)]
    pub previous: Option<String>,
    /// 현재 페이지의 도서 목록
    pub results: Vec<Book>,
}

/// Gutendex API 클라이언트
pub struct Client {
    http: blocking::Client,
    base_url: Url,
    page_size: u32,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, page_size: u32) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl);
        }

        let http = blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::RequestFailed(format!("클라이언트 생성 실패: {}", e)))?;

        Ok(Self { http, base_url, page_size })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, ClientError> {
        Client::new(
            config.base_url(),
            Duration::from_secs(config.timeout_seconds()),
            config.page_size(),
        )
    }

    fn fetch_text(&self, url: Url) -> Result<String, ClientError> {
        debug!("GET {}", url);
        let response = self.http.get(url)
            .send()
            .map_err(|err| ClientError::RequestFailed(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::UnexpectedStatus(response.status().as_u16()));
        }

        response.text()
            .map_err(|err| ClientError::ResponseTextExtractionFailed(err.to_string()))
    }
}

impl catalog::Client for Client {
    fn list_books(&self, query: &Query) -> Result<PageResult, ClientError> {
        let url = build_list_url(&self.base_url, query)?;
        let text = self.fetch_text(url)?;
        parse_list_response(&text, self.page_size)
    }

    fn get_book(&self, id: u64) -> Result<Book, ClientError> {
        let url = build_book_url(&self.base_url, id)?;
        let text = self.fetch_text(url)?;
        serde_json::from_str::<Book>(&text)
            .map_err(|err| ClientError::ResponseParseFailed(err.to_string()))
    }
}

/// `{base}/books?page=N[&search=S][&topic=T]` 형태의 주소를 만든다. 비어있는 필터는 보내지 않는다.
pub fn build_list_url(base_url: &Url, query: &Query) -> Result<Url, ClientError> {
    let mut url = books_url(base_url)?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("page", &query.page().to_string());
        if let Some(search) = query.search() {
            pairs.append_pair("search", search);
        }
        if let Some(genre) = query.genre() {
            pairs.append_pair("topic", genre);
        }
    }
    Ok(url)
}

pub fn build_book_url(base_url: &Url, id: u64) -> Result<Url, ClientError> {
    let mut url = books_url(base_url)?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidBaseUrl)?
        .push(&id.to_string());
    Ok(url)
}

fn books_url(base_url: &Url) -> Result<Url, ClientError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidBaseUrl)?
        .pop_if_empty()
        .push("books");
    Ok(url)
}

pub fn parse_list_response(text: &str, page_size: u32) -> Result<PageResult, ClientError> {
    let parsed = serde_json::from_str::<ListResponse>(text)
        .map_err(|err| ClientError::ResponseParseFailed(err.to_string()))?;

    Ok(PageResult::new(parsed.results, parsed.count, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FailureKind;

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn list_url_omits_empty_filters() {
        let query = Query::builder().page(2).search("").genre("  ").build().unwrap();

        let url = build_list_url(&base(), &query).unwrap();

        assert_eq!(url.as_str(), "https://gutendex.com/books?page=2");
    }

    #[test]
    fn list_url_sends_search_and_topic() {
        let query = Query::builder().page(1).search("great expectations").genre("Best Books Ever Listings").build().unwrap();

        let url = build_list_url(&base(), &query).unwrap();

        assert_eq!(
            url.as_str(),
            "https://gutendex.com/books?page=1&search=great+expectations&topic=Best+Books+Ever+Listings"
        );
    }

    #[test]
    fn book_url_appends_id_to_base_path() {
        let base = Url::parse("http://localhost:8000/api/").unwrap();

        let url = build_book_url(&base, 1342).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8000/api/books/1342");
    }

    #[test]
    fn parse_list_response_computes_total_pages() {
        let text = r#"{
            "count": 65,
            "next": "https://gutendex.com/books/?page=2",
            "previous": null,
            "results": [{"id": 1, "title": "The Declaration of Independence of the United States of America"}]
        }"#;

        let result = parse_list_response(text, DEFAULT_PAGE_SIZE).unwrap();

        assert_eq!(result.total_count, 65);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.books.len(), 1);
        assert!(result.books[0].subjects.is_empty());
    }

    #[test]
    fn parse_list_response_accepts_zero_matches() {
        let text = r#"{"count": 0, "next": null, "previous": null, "results": []}"#;

        let result = parse_list_response(text, DEFAULT_PAGE_SIZE).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn malformed_body_is_invalid_response() {
        let err = parse_list_response("<html>Bad Gateway</html>", DEFAULT_PAGE_SIZE).unwrap_err();

        assert!(matches!(err, ClientError::ResponseParseFailed(_)));
        assert_eq!(err.kind(), FailureKind::InvalidResponse);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = Client::new("not a url", Duration::from_secs(1), DEFAULT_PAGE_SIZE);

        assert!(matches!(result, Err(ClientError::InvalidBaseUrl)));
    }
}

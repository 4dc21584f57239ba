use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};

/// 표지 이미지로 사용하는 포맷의 MIME 타입
pub const COVER_IMAGE_MIME: &str = "image/jpeg";

/// Item 모듈에서 사용할 에러 열거
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// 유효하지 않은 매개변수
    InvalidArgument(String),
}

impl Display for ItemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::InvalidArgument(message) => write!(f, "Invalid argument, {}", message),
        }
    }
}

impl std::error::Error for ItemError {}

/// 저자 혹은 번역가
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_year: None,
            death_year: None,
        }
    }
}

/// 카탈로그 API 에서 조회한 도서 정보
///
/// API 응답의 스냅샷으로 로컬에서 수정하지 않는다.
/// 목록 필드들은 API 가 `null`을 내려줄 경우 빈 목록으로 처리 된다.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub translators: Vec<Author>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub bookshelves: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub copyright: Option<bool>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub download_count: u64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub formats: HashMap<String, String>,
}

impl Book {
    /// 저자 이름들을 `", "`로 이어 붙인다.
    pub fn author_names(&self) -> String {
        self.authors.iter()
            .map(|author| author.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.formats.get(COVER_IMAGE_MIME).map(|url| url.as_str())
    }
}

/// 위시리스트에 저장 되는 도서 요약
///
/// 위시리스트 안에서 `id`는 유일하다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: u64,
    pub title: String,
    pub authors: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&Book> for WishlistEntry {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            authors: book.author_names(),
            image: book.cover_image().map(|url| url.to_owned()),
        }
    }
}

/// 한 페이지 분량의 목록 조회 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub books: Vec<Book>,
    pub total_count: u64,
    pub total_pages: u32,
}

impl PageResult {
    pub fn new(books: Vec<Book>, total_count: u64, page_size: u32) -> Self {
        Self {
            books,
            total_count,
            total_pages: total_pages(total_count, page_size),
        }
    }

    pub fn empty() -> Self {
        Self {
            books: Vec::new(),
            total_count: 0,
            total_pages: 0,
        }
    }

    /// 검색 결과가 하나도 없는 경우로 에러가 아닌 정상적인 빈 상태이다.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// `ceil(total_count / page_size)`, 페이지 크기가 0 이면 0 을 반환한다.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64) as u32
}

/// 검색어와 장르 필터
///
/// 비어있는 문자열은 필터가 없는 것으로 정규화 되어 `None`으로 저장 된다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    genre: Option<String>,
}

impl Filters {
    pub fn new(search: Option<&str>, genre: Option<&str>) -> Self {
        Self {
            search: normalize(search),
            genre: normalize(genre),
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn set_search(&mut self, search: Option<&str>) {
        self.search = normalize(search);
    }

    pub fn set_genre(&mut self, genre: Option<&str>) {
        self.genre = normalize(genre);
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.genre.is_none()
    }

    /// 역직렬화 처럼 생성자를 거치지 않은 값을 다시 정규화 한다.
    pub fn normalized(self) -> Self {
        Self::new(self.search.as_deref(), self.genre.as_deref())
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_owned())
}

/// 카탈로그 목록 조회 요청
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    page: u32,
    filters: Filters,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn search(&self) -> Option<&str> {
        self.filters.search()
    }

    pub fn genre(&self) -> Option<&str> {
        self.filters.genre()
    }

    /// 같은 필터로 다른 페이지를 조회하는 요청을 만든다.
    pub fn with_page(&self, page: u32) -> Result<Query, ItemError> {
        Query::builder()
            .page(page)
            .filters(self.filters.clone())
            .build()
    }
}

#[derive(Debug, Default)]
pub struct QueryBuilder {
    page: Option<u32>,
    search: Option<String>,
    genre: Option<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn genre<S: Into<String>>(mut self, genre: S) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.search = filters.search;
        self.genre = filters.genre;
        self
    }

    pub fn build(self) -> Result<Query, ItemError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ItemError::InvalidArgument("page must be greater than or equal to 1".to_string()));
        }

        Ok(Query {
            page,
            filters: Filters::new(self.search.as_deref(), self.genre.as_deref()),
        })
    }
}

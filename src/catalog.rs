use crate::item::{Book, PageResult, Query};
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod gutendex;

/// 실패 원인의 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 요청 자체가 실패 했거나 성공 상태 코드를 받지 못함
    Network,
    /// 응답 본문을 읽을 수 없거나 JSON 형식이 아님
    InvalidResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    InvalidBaseUrl,
    RequestFailed(String),
    UnexpectedStatus(u16),
    ResponseTextExtractionFailed(String),
    ResponseParseFailed(String),
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::InvalidBaseUrl
            | ClientError::RequestFailed(_)
            | ClientError::UnexpectedStatus(_) => FailureKind::Network,
            ClientError::ResponseTextExtractionFailed(_)
            | ClientError::ResponseParseFailed(_) => FailureKind::InvalidResponse,
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidBaseUrl => write!(f, "Invalid catalog base url"),
            ClientError::RequestFailed(message) => write!(f, "Request failed, {}", message),
            ClientError::UnexpectedStatus(status) => write!(f, "HTTP error, status {}", status),
            ClientError::ResponseTextExtractionFailed(message) => write!(f, "Cannot read response, {}", message),
            ClientError::ResponseParseFailed(message) => write!(f, "Malformed response, {}", message),
        }
    }
}

impl std::error::Error for ClientError {}

/// 카탈로그 API 클라이언트
///
/// 실패는 항상 [`ClientError`]로 반환하며 재시도는 하지 않는다.
/// 재시도 여부는 호출자가 결정한다.
pub trait Client: Send + Sync {
    fn list_books(&self, query: &Query) -> Result<PageResult, ClientError>;

    fn get_book(&self, id: u64) -> Result<Book, ClientError>;
}

impl<C: Client + ?Sized> Client for std::sync::Arc<C> {
    fn list_books(&self, query: &Query) -> Result<PageResult, ClientError> {
        (**self).list_books(query)
    }

    fn get_book(&self, id: u64) -> Result<Book, ClientError> {
        (**self).get_book(id)
    }
}

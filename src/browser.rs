use crate::browser::prefetch::Prefetcher;
use crate::browser::sequence::{RequestSequence, RequestToken};
use crate::catalog::{Client, ClientError};
use crate::item::{Book, Filters, ItemError, PageResult, Query};
use crate::page::{extract_genres, PageCache};
use crate::storage::{load_json, save_json, KeyValueStore, FILTERS_KEY};
use crate::view::{PageView, WishlistView};
use crate::wishlist::WishlistStore;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod prefetch;
pub mod sequence;

#[derive(Debug)]
pub enum BrowseError {
    /// 카탈로그 API 호출 실패
    Client(ClientError),
    /// 상세 화면에 도서 아이디가 전달 되지 않음
    MissingIdentifier,
    /// 도서 아이디가 정수가 아님
    InvalidIdentifier(String),
    InvalidArgument(ItemError),
}

impl Display for BrowseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BrowseError::Client(err) => write!(f, "{}", err),
            BrowseError::MissingIdentifier => write!(f, "No book ID provided."),
            BrowseError::InvalidIdentifier(raw) => write!(f, "Invalid book ID: {}", raw),
            BrowseError::InvalidArgument(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BrowseError {}

impl From<ClientError> for BrowseError {
    fn from(err: ClientError) -> Self {
        BrowseError::Client(err)
    }
}

impl From<ItemError> for BrowseError {
    fn from(err: ItemError) -> Self {
        BrowseError::InvalidArgument(err)
    }
}

/// 목록 조회 결과가 화면에 어떻게 반영 되었는지
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 결과가 화면에 반영 됨
    Displayed,
    /// 검색 결과가 없는 빈 상태가 반영 됨
    Empty,
    /// 더 최근의 요청이 있어 응답을 버림
    Stale,
    /// 이동할 페이지가 없어 아무것도 하지 않음
    Unchanged,
}

/// 재시도 결과
#[derive(Debug)]
pub enum Retried {
    Nothing,
    Page(LoadOutcome),
    Detail(Book),
}

/// 수동 재시도를 위해 기억해 두는 마지막 실패 동작
#[derive(Debug, Clone)]
enum Action {
    List(Query),
    Detail(u64),
}

/// 발급은 되었지만 아직 응답이 반영 되지 않은 목록 조회 요청
#[derive(Debug)]
pub struct PendingLoad {
    token: RequestToken,
    query: Query,
}

impl PendingLoad {
    pub fn query(&self) -> &Query {
        &self.query
    }
}

/// 화면에 보여지는 상태
#[derive(Debug)]
pub struct AppState {
    current_page: u32,
    filters: Filters,
    result: Option<PageResult>,
    genres: Vec<String>,
}

impl AppState {
    fn new(filters: Filters) -> Self {
        Self { current_page: 1, filters, result: None, genres: Vec::new() }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn result(&self) -> Option<&PageResult> {
        self.result.as_ref()
    }

    /// 마지막으로 로드된 페이지의 도서들에서 뽑은 장르 목록
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn total_pages(&self) -> u32 {
        self.result.as_ref().map(|r| r.total_pages).unwrap_or(0)
    }
}

/// 카탈로그 브라우저
///
/// 현재 페이지, 필터, 페이지 캐시, 위시리스트를 소유하며 모든 상태 변경은 이 구조체의 메서드를 통해서만 일어난다.
/// 화면은 메서드 호출이 끝난 뒤의 상태로 그린다.
pub struct Browser<C: Client + 'static> {
    client: Arc<C>,
    state: AppState,
    cache: PageCache,
    wishlist: WishlistStore,
    settings: Rc<dyn KeyValueStore>,
    sequence: RequestSequence,
    prefetcher: Prefetcher<C>,
    last_failed: Option<Action>,
}

impl<C: Client + 'static> Browser<C> {
    /// 저장소에서 위시리스트와 마지막으로 사용한 필터를 읽어 브라우저를 만든다.
    pub fn new(client: C, storage: Rc<dyn KeyValueStore>) -> Self {
        let filters = load_json::<Filters>(storage.as_ref(), FILTERS_KEY)
            .unwrap_or_else(|err| {
                warn!("저장된 필터를 읽을 수 없어 기본값을 사용 합니다. => {}", err);
                None
            })
            .map(Filters::normalized)
            .unwrap_or_default();

        let client = Arc::new(client);
        Self {
            prefetcher: Prefetcher::new(Arc::clone(&client)),
            client,
            state: AppState::new(filters),
            cache: PageCache::new(),
            wishlist: WishlistStore::load(Box::new(Rc::clone(&storage))),
            settings: storage,
            sequence: RequestSequence::new(),
            last_failed: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    pub fn page_view(&self) -> Option<PageView> {
        self.state.result.as_ref()
            .map(|result| PageView::build(result, self.state.current_page, &self.wishlist))
    }

    pub fn wishlist_view(&self) -> WishlistView {
        WishlistView::build(&self.wishlist)
    }

    /// 현재 필터로 `page` 를 조회해 화면 상태에 반영한다.
    pub fn load(&mut self, page: u32) -> Result<LoadOutcome, BrowseError> {
        let pending = self.begin_load(page)?;
        let fetched = match self.cache.lookup(pending.query()) {
            Some(hit) => {
                debug!("{} 페이지를 캐시에서 가져 옵니다.", page);
                Ok(hit.clone())
            }
            None => self.client.list_books(pending.query()),
        };
        self.finish_load(pending, fetched)
    }

    /// 요청 순번을 발급하고 조회할 요청을 만든다. 응답은 [`Browser::finish_load`]로 반영한다.
    pub fn begin_load(&mut self, page: u32) -> Result<PendingLoad, BrowseError> {
        self.drain_prefetched();

        let query = Query::builder()
            .page(page)
            .filters(self.state.filters.clone())
            .build()?;

        Ok(PendingLoad { token: self.sequence.issue(), query })
    }

    /// 가장 최근에 발급된 요청의 응답만 반영하고 나머지는 버린다.
    pub fn finish_load(
        &mut self,
        pending: PendingLoad,
        fetched: Result<PageResult, ClientError>,
    ) -> Result<LoadOutcome, BrowseError> {
        if !self.sequence.is_latest(pending.token) {
            debug!("더 최근의 요청이 있어 {} 페이지 응답을 버립니다.", pending.query.page());
            return Ok(LoadOutcome::Stale);
        }

        let result = match fetched {
            Ok(result) => result,
            Err(err) => {
                warn!("{} 페이지 조회에 실패 하였습니다. => {}", pending.query.page(), err);
                self.last_failed = Some(Action::List(pending.query));
                return Err(BrowseError::Client(err));
            }
        };

        self.last_failed = None;
        self.state.current_page = pending.query.page();
        self.state.genres = extract_genres(&result.books);

        if result.is_empty() {
            info!("검색 결과가 없습니다. (필터: {:?})", self.state.filters);
            self.state.result = Some(result);
            self.prefetcher.cancel();
            return Ok(LoadOutcome::Empty);
        }

        let total_pages = result.total_pages;
        self.state.result = Some(result);
        self.prefetcher.refresh(&pending.query, total_pages);
        Ok(LoadOutcome::Displayed)
    }

    pub fn next(&mut self) -> Result<LoadOutcome, BrowseError> {
        if self.state.current_page >= self.state.total_pages() {
            return Ok(LoadOutcome::Unchanged);
        }
        self.load(self.state.current_page + 1)
    }

    pub fn previous(&mut self) -> Result<LoadOutcome, BrowseError> {
        if self.state.current_page <= 1 {
            return Ok(LoadOutcome::Unchanged);
        }
        self.load(self.state.current_page - 1)
    }

    /// 페이지 번호는 알려진 전체 페이지 범위 안으로 보정 된다.
    pub fn goto(&mut self, page: u32) -> Result<LoadOutcome, BrowseError> {
        let total_pages = self.state.total_pages();
        let page = if total_pages > 0 { page.clamp(1, total_pages) } else { page.max(1) };
        self.load(page)
    }

    pub fn set_search(&mut self, search: &str) -> Result<LoadOutcome, BrowseError> {
        let mut filters = self.state.filters.clone();
        filters.set_search(Some(search));
        self.apply_filters(filters)
    }

    pub fn set_genre(&mut self, genre: &str) -> Result<LoadOutcome, BrowseError> {
        let mut filters = self.state.filters.clone();
        filters.set_genre(Some(genre));
        self.apply_filters(filters)
    }

    pub fn clear_filters(&mut self) -> Result<LoadOutcome, BrowseError> {
        self.apply_filters(Filters::default())
    }

    /// 필터를 바꾸면 저장하고 캐시를 비운 뒤 첫 페이지부터 다시 조회한다.
    pub fn apply_filters(&mut self, filters: Filters) -> Result<LoadOutcome, BrowseError> {
        info!("필터를 변경 합니다. => {:?}", filters);
        if let Err(err) = save_json(self.settings.as_ref(), FILTERS_KEY, &filters) {
            warn!("필터를 저장할 수 없습니다. => {}", err);
        }

        self.state.filters = filters;
        self.cache.invalidate();
        self.prefetcher.cancel();
        self.load(1)
    }

    /// URL 쿼리 파라미터처럼 전달된 아이디로 상세 정보를 조회한다.
    pub fn open_detail(&mut self, raw_id: Option<&str>) -> Result<Book, BrowseError> {
        let raw_id = raw_id.map(|id| id.trim()).filter(|id| !id.is_empty())
            .ok_or(BrowseError::MissingIdentifier)?;
        let id = raw_id.parse::<u64>()
            .map_err(|_| BrowseError::InvalidIdentifier(raw_id.to_owned()))?;

        self.detail(id)
    }

    pub fn detail(&mut self, id: u64) -> Result<Book, BrowseError> {
        self.drain_prefetched();
        match self.client.get_book(id) {
            Ok(book) => {
                self.last_failed = None;
                Ok(book)
            }
            Err(err) => {
                warn!("{} 도서 상세 조회에 실패 하였습니다. => {}", id, err);
                self.last_failed = Some(Action::Detail(id));
                Err(BrowseError::Client(err))
            }
        }
    }

    /// 마지막으로 실패한 동작을 다시 실행한다. 자동 재시도는 하지 않는다.
    pub fn retry(&mut self) -> Result<Retried, BrowseError> {
        match self.last_failed.take() {
            None => Ok(Retried::Nothing),
            Some(Action::List(query)) => self.load(query.page()).map(Retried::Page),
            Some(Action::Detail(id)) => self.detail(id).map(Retried::Detail),
        }
    }

    pub fn can_retry(&self) -> bool {
        self.last_failed.is_some()
    }

    /// 이미 끝난 미리 조회 결과를 캐시에 반영한다.
    pub fn drain_prefetched(&mut self) {
        self.prefetcher.drain(&mut self.cache);
    }

    /// 진행 중인 미리 조회가 모두 끝날 때까지 기다린다.
    pub fn settle(&mut self) {
        self.prefetcher.settle(&mut self.cache);
    }
}

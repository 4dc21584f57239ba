use crate::catalog::{Client, ClientError};
use crate::item::{PageResult, Query};
use crate::page::{PageCache, Slot};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// `settle` 에서 응답을 기다리는 최대 시간
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// 백그라운드 조회 결과
pub(crate) struct PrefetchReply {
    pub(crate) generation: u64,
    pub(crate) slot: Slot,
    pub(crate) query: Query,
    pub(crate) result: Result<PageResult, ClientError>,
}

/// 인접 페이지를 백그라운드 스레드에서 미리 조회한다.
///
/// 조회 결과는 채널로 전달되고 캐시 반영은 소유자 스레드에서 `drain`/`settle` 을 호출할 때만 일어난다.
/// `refresh` 나 `cancel` 이 호출되면 세대(generation)가 바뀌고 이전 세대의 응답은 버려진다.
pub(crate) struct Prefetcher<C: Client + 'static> {
    client: Arc<C>,
    sender: Sender<PrefetchReply>,
    receiver: Receiver<PrefetchReply>,
    generation: u64,
    pending: usize,
}

impl<C: Client + 'static> Prefetcher<C> {
    pub(crate) fn new(client: Arc<C>) -> Self {
        let (sender, receiver) = channel();
        Self { client, sender, receiver, generation: 0, pending: 0 }
    }

    /// 진행 중인 조회 결과를 모두 무시하도록 세대를 올린다.
    pub(crate) fn cancel(&mut self) {
        self.generation += 1;
    }

    /// `current_page`의 이전, 다음 페이지를 현재 필터로 조회한다. 범위 밖의 페이지는 건너뛴다.
    pub(crate) fn refresh(&mut self, current: &Query, total_pages: u32) {
        self.cancel();

        let page = current.page();
        let neighbours = [page.checked_sub(1), page.checked_add(1)];

        for target in neighbours.into_iter().flatten().filter(|p| (1..=total_pages).contains(p)) {
            let Some(slot) = Slot::of(page, target) else { continue };
            match current.with_page(target) {
                Ok(query) => self.spawn(slot, query),
                Err(err) => warn!("미리 조회할 페이지를 만들 수 없습니다. => {}", err),
            }
        }
    }

    fn spawn(&mut self, slot: Slot, query: Query) {
        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();
        let generation = self.generation;

        let spawned = thread::Builder::new()
            .name(format!("prefetch-{}", query.page()))
            .spawn(move || {
                let result = client.list_books(&query);
                // 수신자가 사라진 경우는 브라우저가 종료된 것이므로 무시한다.
                let _ = sender.send(PrefetchReply { generation, slot, query, result });
            });

        match spawned {
            Ok(_) => self.pending += 1,
            Err(err) => warn!("미리 조회 스레드를 생성할 수 없습니다. => {}", err),
        }
    }

    /// 이미 도착한 응답만 캐시에 반영한다.
    pub(crate) fn drain(&mut self, cache: &mut PageCache) {
        while let Ok(reply) = self.receiver.try_recv() {
            self.apply(reply, cache);
        }
    }

    /// 진행 중인 조회가 모두 끝날 때까지 기다린 후 캐시에 반영한다.
    pub(crate) fn settle(&mut self, cache: &mut PageCache) {
        while self.pending > 0 {
            match self.receiver.recv_timeout(SETTLE_TIMEOUT) {
                Ok(reply) => self.apply(reply, cache),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    warn!("미리 조회 응답을 기다리다 중단 합니다. (남은 요청: {})", self.pending);
                    self.pending = 0;
                }
            }
        }
    }

    pub(crate) fn apply(&mut self, reply: PrefetchReply, cache: &mut PageCache) {
        self.pending = self.pending.saturating_sub(1);

        if reply.generation != self.generation {
            debug!("이전 세대의 미리 조회 응답을 버립니다. (페이지: {})", reply.query.page());
            return;
        }

        match reply.result {
            Ok(result) => cache.store(reply.slot, reply.query, result),
            Err(err) => warn!("{} 페이지 미리 조회에 실패 하였습니다. => {}", reply.query.page(), err),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

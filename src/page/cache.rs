use crate::item::{PageResult, Query};
use tracing::debug;

/// 현재 페이지를 기준으로 한 캐시 슬롯의 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Previous,
    Next,
}

impl Slot {
    /// 현재 페이지 기준으로 `page`가 들어갈 슬롯을 찾는다. 인접한 페이지가 아니면 `None`을 반환한다.
    pub fn of(current_page: u32, page: u32) -> Option<Slot> {
        if page + 1 == current_page {
            Some(Slot::Previous)
        } else if page == current_page + 1 {
            Some(Slot::Next)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct CacheSlot {
    entry: Option<(Query, PageResult)>,
}

/// 이전/다음 페이지 결과를 하나씩만 보관하는 캐시
///
/// 슬롯은 페이지 번호만이 아니라 조회에 사용한 필터까지 포함한 [`Query`]로 구분된다.
/// 필터가 다른 같은 번호의 페이지는 캐시 미스로 처리 된다.
#[derive(Debug, Default)]
pub struct PageCache {
    previous: CacheSlot,
    next: CacheSlot,
}

impl PageCache {
    pub fn new() -> Self {
        PageCache::default()
    }

    /// 요청과 같은 필터, 같은 페이지 번호로 저장된 슬롯이 있을 때만 결과를 반환한다.
    pub fn lookup(&self, query: &Query) -> Option<&PageResult> {
        [&self.previous, &self.next]
            .into_iter()
            .filter_map(|slot| slot.entry.as_ref())
            .find(|(key, _)| key == query)
            .map(|(_, result)| result)
    }

    /// 슬롯의 기존 내용을 덮어쓴다.
    pub fn store(&mut self, slot: Slot, query: Query, result: PageResult) {
        debug!("{:?} 슬롯에 {} 페이지를 저장 합니다.", slot, query.page());
        self.slot_mut(slot).entry = Some((query, result));
    }

    pub fn invalidate(&mut self) {
        self.previous.entry = None;
        self.next.entry = None;
    }

    pub fn page_of(&self, slot: Slot) -> Option<u32> {
        let slot = match slot {
            Slot::Previous => &self.previous,
            Slot::Next => &self.next,
        };
        slot.entry.as_ref().map(|(key, _)| key.page())
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut CacheSlot {
        match slot {
            Slot::Previous => &mut self.previous,
            Slot::Next => &mut self.next,
        }
    }
}

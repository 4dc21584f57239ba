use crate::item::{Book, WishlistEntry};
use crate::storage::{load_json, save_json, KeyValueStore, StorageError, WISHLIST_KEY};
use std::fmt;
use std::fmt::{Display, Formatter};
use tracing::{info, warn};

/// 위시리스트 토글 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

impl Display for Toggle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Toggle::Added => write!(f, "Added to Wishlist"),
            Toggle::Removed => write!(f, "Removed from Wishlist"),
        }
    }
}

/// 위시리스트 저장소
///
/// 생성 시점에 한 번 저장소에서 읽어오고 이후에는 메모리의 목록을 기준으로 동작한다.
/// 변경이 있을 때마다 목록 전체를 다시 저장하며, 다른 프로세스가 저장소를 수정한 내용은
/// 새로 로드하기 전까지 반영 되지 않는다.
pub struct WishlistStore {
    storage: Box<dyn KeyValueStore>,
    entries: Vec<WishlistEntry>,
}

impl WishlistStore {
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let entries = load_json::<Vec<WishlistEntry>>(storage.as_ref(), WISHLIST_KEY)
            .unwrap_or_else(|err| {
                warn!("저장된 위시리스트를 읽을 수 없어 빈 목록으로 시작 합니다. => {}", err);
                None
            })
            .map(dedup_by_id)
            .unwrap_or_default();

        Self { storage, entries }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn list(&self) -> &[WishlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn toggle(&mut self, book: &Book) -> Result<Toggle, StorageError> {
        self.toggle_entry(WishlistEntry::from(book))
    }

    /// 위시리스트에 없으면 추가하고 있으면 제거한다. 호출 한 번에 상태는 정확히 한 번 바뀐다.
    ///
    /// 저장에 실패하면 메모리의 목록도 변경 되지 않는다.
    pub fn toggle_entry(&mut self, entry: WishlistEntry) -> Result<Toggle, StorageError> {
        let mut updated = self.entries.clone();
        let toggle = match updated.iter().position(|e| e.id == entry.id) {
            Some(index) => {
                updated.remove(index);
                Toggle::Removed
            }
            None => {
                updated.push(entry);
                Toggle::Added
            }
        };

        self.replace(updated)?;
        Ok(toggle)
    }

    /// 위시리스트에서 제거한다. 제거된 항목이 있었는지 여부를 반환한다.
    pub fn remove(&mut self, id: u64) -> Result<bool, StorageError> {
        if !self.contains(id) {
            return Ok(false);
        }

        let updated = self.entries.iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.replace(updated)?;
        Ok(true)
    }

    /// 목록 전체를 저장한 후 저장에 성공한 경우에만 메모리의 목록을 교체한다.
    fn replace(&mut self, updated: Vec<WishlistEntry>) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), WISHLIST_KEY, &updated)?;
        info!("위시리스트를 저장 하였습니다. (항목 수: {})", updated.len());
        self.entries = updated;
        Ok(())
    }
}

fn dedup_by_id(entries: Vec<WishlistEntry>) -> Vec<WishlistEntry> {
    let mut unique: Vec<WishlistEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !unique.iter().any(|e| e.id == entry.id) {
            unique.push(entry);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::tests::book;
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    fn store_with(raw: Option<&str>) -> (Rc<MemoryStore>, WishlistStore) {
        let memory = Rc::new(MemoryStore::new());
        if let Some(raw) = raw {
            memory.set(WISHLIST_KEY, raw).unwrap();
        }
        let wishlist = WishlistStore::load(Box::new(memory.clone()));
        (memory, wishlist)
    }

    #[test]
    fn toggle_adds_then_removes() {
        let (_, mut wishlist) = store_with(None);
        let book = book(11, "Alice's Adventures in Wonderland");

        assert_eq!(wishlist.toggle(&book).unwrap(), Toggle::Added);
        assert!(wishlist.contains(11));
        assert_eq!(wishlist.toggle(&book).unwrap(), Toggle::Removed);
        assert!(!wishlist.contains(11));
    }

    #[test]
    fn double_toggle_restores_persisted_value() {
        let raw = r#"[{"id":1,"title":"Moby Dick","authors":"Melville, Herman","image":null}]"#;
        let (memory, mut wishlist) = store_with(Some(raw));
        let before = memory.get(WISHLIST_KEY).unwrap();
        let book = book(2701, "Moby Dick; Or, The Whale");

        wishlist.toggle(&book).unwrap();
        wishlist.toggle(&book).unwrap();

        let after: Vec<WishlistEntry> = load_json(&*memory, WISHLIST_KEY).unwrap().unwrap();
        let before: Vec<WishlistEntry> = serde_json::from_str(&before.unwrap()).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn every_mutation_rewrites_the_whole_list() {
        let (memory, mut wishlist) = store_with(None);

        wishlist.toggle(&book(1, "A")).unwrap();
        wishlist.toggle(&book(2, "B")).unwrap();

        let saved: Vec<WishlistEntry> = load_json(&*memory, WISHLIST_KEY).unwrap().unwrap();
        assert_eq!(saved.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(wishlist.list(), saved.as_slice());
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let (_, mut wishlist) = store_with(None);
        wishlist.toggle(&book(5, "E")).unwrap();

        assert!(wishlist.remove(5).unwrap());
        assert!(!wishlist.remove(5).unwrap());
        assert!(wishlist.is_empty());
    }

    #[test]
    fn load_keeps_one_entry_per_id() {
        let raw = r#"[
            {"id":7,"title":"First","authors":"","image":null},
            {"id":7,"title":"Duplicate","authors":"","image":null}
        ]"#;
        let (_, wishlist) = store_with(Some(raw));

        assert_eq!(wishlist.len(), 1);
        assert_eq!(wishlist.list()[0].title, "First");
    }

    #[test]
    fn corrupt_blob_starts_empty() {
        let (_, wishlist) = store_with(Some("{broken"));

        assert!(wishlist.is_empty());
    }

    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io("disk full".to_string()))
        }
    }

    #[test]
    fn failed_save_leaves_the_list_unchanged() {
        let inner = MemoryStore::new();
        inner.set(WISHLIST_KEY, r#"[{"id":2,"title":"B","authors":"","image":null}]"#).unwrap();
        let mut wishlist = WishlistStore::load(Box::new(ReadOnlyStore { inner }));

        assert!(wishlist.toggle(&book(1, "A")).is_err());
        assert!(!wishlist.contains(1));

        assert!(wishlist.toggle(&book(2, "B")).is_err());
        assert!(wishlist.contains(2));

        assert!(wishlist.remove(2).is_err());
        assert_eq!(wishlist.list().iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn external_changes_are_not_observed_until_reload() {
        let (memory, wishlist) = store_with(None);
        memory.set(WISHLIST_KEY, r#"[{"id":3,"title":"C","authors":"","image":null}]"#).unwrap();

        assert!(!wishlist.contains(3));
        assert!(WishlistStore::load(Box::new(memory.clone())).contains(3));
    }
}

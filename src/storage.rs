use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// 위시리스트가 저장 되는 키
pub const WISHLIST_KEY: &str = "wishlist";
/// 마지막으로 사용한 검색어와 장르가 저장 되는 키
pub const FILTERS_KEY: &str = "filters";

#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Serialize(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(message) => write!(f, "Storage I/O failed, {}", message),
            StorageError::Serialize(message) => write!(f, "Storage serialization failed, {}", message),
        }
    }
}

impl std::error::Error for StorageError {}

/// 문자열 값을 키 단위로 통째로 읽고 쓰는 저장소
///
/// 부분 갱신은 지원하지 않으며 `set`은 항상 기존 값을 덮어쓴다.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// 디렉토리 아래 `<key>.json` 파일 하나에 키 하나를 저장한다.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_of(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_of(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| StorageError::Io(err.to_string()))?;

        let path = self.path_of(key);
        debug!("{} 키를 {:?}에 저장 합니다.", key, path);
        fs::write(path, value).map_err(|err| StorageError::Io(err.to_string()))
    }
}

/// 메모리 위에서만 동작하는 저장소
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// 저장된 JSON 값을 읽는다. 값이 없으면 `None`을 반환한다.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Serialize(err.to_string())),
    }
}

pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)
        .map_err(|err| StorageError::Serialize(err.to_string()))?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Filters;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("gutendex-browser-{}-{}-{}", name, std::process::id(), nanos))
    }

    #[test]
    fn file_store_returns_none_for_missing_key() {
        let store = FileStore::new(temp_dir("missing"));

        assert_eq!(store.get(WISHLIST_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_rewrites_whole_value() {
        let dir = temp_dir("rewrite");
        let store = FileStore::new(&dir);

        store.set(FILTERS_KEY, r#"{"search":"a long first value"}"#).unwrap();
        store.set(FILTERS_KEY, r#"{"search":"b"}"#).unwrap();

        assert_eq!(store.get(FILTERS_KEY).unwrap().as_deref(), Some(r#"{"search":"b"}"#));
        assert!(dir.join("filters.json").exists());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn json_helpers_round_trip_filters() {
        let store = MemoryStore::new();
        let filters = Filters::new(Some("twain"), None);

        save_json(&store, FILTERS_KEY, &filters).unwrap();
        let loaded: Option<Filters> = load_json(&store, FILTERS_KEY).unwrap();

        assert_eq!(loaded, Some(filters));
    }

    #[test]
    fn load_json_reports_corrupt_value() {
        let store = MemoryStore::new();
        store.set(WISHLIST_KEY, "not json").unwrap();

        let loaded: Result<Option<Vec<u64>>, _> = load_json(&store, WISHLIST_KEY);

        assert!(matches!(loaded, Err(StorageError::Serialize(_))));
    }
}

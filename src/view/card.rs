use crate::item::{Book, WishlistEntry};
use crate::storage::StorageError;
use crate::wishlist::{Toggle, WishlistStore};
use std::fmt;
use std::fmt::{Debug, Formatter};

/// 카드 요약에 보여줄 최대 주제 수
pub const SUMMARY_SUBJECTS: usize = 3;

pub const WISHLISTED_MARK: &str = "♥";
pub const NOT_WISHLISTED_MARK: &str = "♡";

/// 카드에 묶인 위시리스트 버튼 동작
pub type ToggleAction = Box<dyn Fn(&mut WishlistStore) -> Result<Toggle, StorageError>>;

/// 도서 한 권을 표시하는 카드
///
/// 카드는 자신이 표시하는 도서의 데이터를 캡처한 위시리스트 콜백을 직접 가지고 있다.
pub struct BookCard {
    id: u64,
    fragment: String,
    on_toggle: ToggleAction,
}

impl BookCard {
    /// 목록 페이지의 카드. 버튼을 누르면 위시리스트에 추가하거나 제거한다.
    pub fn from_book(book: &Book, wishlisted: bool) -> Self {
        let entry = WishlistEntry::from(book);
        let mut fragment = format!("{} {} (#{})\n", mark(wishlisted), book.title, book.id);

        let authors = book.author_names();
        if !authors.is_empty() {
            fragment.push_str(&format!("  by {}\n", authors));
        }

        let subjects = book.subjects.iter()
            .take(SUMMARY_SUBJECTS)
            .map(|s| s.as_str())
            .collect::<Vec<_>>();
        if !subjects.is_empty() {
            fragment.push_str(&format!("  Subjects: {}\n", subjects.join("; ")));
        }

        if let Some(image) = book.cover_image() {
            fragment.push_str(&format!("  Cover: {}\n", image));
        }

        Self {
            id: book.id,
            fragment,
            on_toggle: Box::new(move |wishlist| wishlist.toggle_entry(entry.clone())),
        }
    }

    /// 위시리스트 페이지의 카드. 버튼을 누르면 위시리스트에서 제거한다.
    pub fn from_entry(entry: &WishlistEntry) -> Self {
        let id = entry.id;
        let mut fragment = format!("{} {} (#{})\n", WISHLISTED_MARK, entry.title, entry.id);
        if !entry.authors.is_empty() {
            fragment.push_str(&format!("  by {}\n", entry.authors));
        }
        if let Some(image) = &entry.image {
            fragment.push_str(&format!("  Cover: {}\n", image));
        }

        Self {
            id,
            fragment,
            on_toggle: Box::new(move |wishlist| {
                wishlist.remove(id)?;
                Ok(Toggle::Removed)
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn toggle(&self, wishlist: &mut WishlistStore) -> Result<Toggle, StorageError> {
        (self.on_toggle)(wishlist)
    }
}

impl Debug for BookCard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookCard")
            .field("id", &self.id)
            .field("fragment", &self.fragment)
            .finish()
    }
}

pub fn mark(wishlisted: bool) -> &'static str {
    if wishlisted { WISHLISTED_MARK } else { NOT_WISHLISTED_MARK }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::tests::book;
    use crate::storage::MemoryStore;

    fn wishlist() -> WishlistStore {
        WishlistStore::load(Box::new(MemoryStore::new()))
    }

    #[test]
    fn summary_shows_only_first_three_subjects() {
        let mut book = book(1661, "The Adventures of Sherlock Holmes");
        book.subjects = vec!["Detective and mystery stories", "Holmes, Sherlock", "Private investigators", "Short stories"]
            .into_iter()
            .map(String::from)
            .collect();

        let card = BookCard::from_book(&book, false);

        assert!(card.fragment().contains("Subjects: Detective and mystery stories; Holmes, Sherlock; Private investigators\n"));
        assert!(!card.fragment().contains("Short stories"));
    }

    #[test]
    fn card_marks_wishlisted_books() {
        let book = book(1, "A");

        assert!(BookCard::from_book(&book, true).fragment().starts_with(WISHLISTED_MARK));
        assert!(BookCard::from_book(&book, false).fragment().starts_with(NOT_WISHLISTED_MARK));
    }

    #[test]
    fn bound_callback_toggles_its_own_book() {
        let mut wishlist = wishlist();
        let first = BookCard::from_book(&book(1, "A"), false);
        let second = BookCard::from_book(&book(2, "B"), false);

        assert_eq!(second.toggle(&mut wishlist).unwrap(), Toggle::Added);
        assert!(wishlist.contains(2));
        assert!(!wishlist.contains(1));

        assert_eq!(second.toggle(&mut wishlist).unwrap(), Toggle::Removed);
        assert_eq!(first.toggle(&mut wishlist).unwrap(), Toggle::Added);
        assert_eq!(wishlist.list().iter().map(|e| e.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn entry_card_callback_removes() {
        let mut wishlist = wishlist();
        wishlist.toggle(&book(9, "I")).unwrap();
        let card = BookCard::from_entry(&wishlist.list()[0]);

        assert_eq!(card.toggle(&mut wishlist).unwrap(), Toggle::Removed);
        assert!(wishlist.is_empty());
        assert_eq!(card.toggle(&mut wishlist).unwrap(), Toggle::Removed);
    }
}

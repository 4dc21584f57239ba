use crate::item::PageResult;
use crate::page::{labels, Label};
use crate::wishlist::WishlistStore;
use std::fmt::Display;

pub mod card;
pub mod detail;

pub use card::BookCard;

pub const EMPTY_RESULT_MESSAGE: &str = "No books found.";
pub const EMPTY_WISHLIST_MESSAGE: &str = "Your wishlist is empty.";

/// 목록 페이지 화면
#[derive(Debug)]
pub struct PageView {
    cards: Vec<BookCard>,
    labels: Vec<Label>,
    empty_message: Option<&'static str>,
}

impl PageView {
    /// 검색 결과가 없으면 카드와 페이지 이동 컨트롤 없이 빈 상태 메시지만 가진다.
    pub fn build(result: &PageResult, current_page: u32, wishlist: &WishlistStore) -> Self {
        if result.is_empty() {
            return Self {
                cards: Vec::new(),
                labels: Vec::new(),
                empty_message: Some(EMPTY_RESULT_MESSAGE),
            };
        }

        let cards = result.books.iter()
            .map(|book| BookCard::from_book(book, wishlist.contains(book.id)))
            .collect();

        Self {
            cards,
            labels: labels(current_page, result.total_pages),
            empty_message: None,
        }
    }

    pub fn cards(&self) -> &[BookCard] {
        &self.cards
    }

    /// 화면에 표시되는 1부터 시작하는 카드 번호로 카드를 찾는다.
    pub fn card(&self, number: usize) -> Option<&BookCard> {
        number.checked_sub(1).and_then(|index| self.cards.get(index))
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.empty_message
    }

    pub fn render(&self) -> String {
        if let Some(message) = self.empty_message {
            return format!("{}\n", message);
        }

        let mut out = render_cards(&self.cards);
        if !self.labels.is_empty() {
            let controls = self.labels.iter()
                .map(|label| label.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!("\n< {} >\n", controls));
        }
        out
    }
}

/// 위시리스트 화면
#[derive(Debug)]
pub struct WishlistView {
    cards: Vec<BookCard>,
}

impl WishlistView {
    pub fn build(wishlist: &WishlistStore) -> Self {
        Self {
            cards: wishlist.list().iter().map(BookCard::from_entry).collect(),
        }
    }

    pub fn cards(&self) -> &[BookCard] {
        &self.cards
    }

    pub fn render(&self) -> String {
        if self.cards.is_empty() {
            return format!("{}\n", EMPTY_WISHLIST_MESSAGE);
        }
        render_cards(&self.cards)
    }
}

/// 재시도 안내를 포함한 에러 패널. 빈 결과 메시지와는 구분 된다.
pub fn render_error(context: &str, err: &dyn Display) -> String {
    format!("Error loading {}: {}\nEnter 'r' to retry.\n", context, err)
}

fn render_cards(cards: &[BookCard]) -> String {
    cards.iter()
        .enumerate()
        .map(|(index, card)| format!("{:>2}. {}", index + 1, card.fragment()))
        .collect()
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
    fn zero_count_renders_empty_state_without_cards_or_pagination() {
        let view = PageView::build(&PageResult::new(Vec::new(), 0, 32), 1, &wishlist());

        assert!(view.cards().is_empty());
        assert!(view.labels().is_empty());
        assert_eq!(view.empty_message(), Some(EMPTY_RESULT_MESSAGE));
        assert_eq!(view.render(), "No books found.\n");
    }

    #[test]
    fn page_view_numbers_cards_and_adds_controls() {
        let result = PageResult::new(vec![book(1, "A"), book(2, "B")], 64, 32);

        let view = PageView::build(&result, 2, &wishlist());
        let rendered = view.render();

        assert_eq!(view.card(2).map(|c| c.id()), Some(2));
        assert!(view.card(0).is_none());
        assert!(view.card(3).is_none());
        assert!(rendered.starts_with(" 1. ♡ A (#1)\n"));
        assert!(rendered.ends_with("\n< 1 [2] >\n"));
    }

    #[test]
    fn page_view_reflects_wishlist_membership() {
        let mut wishlist = wishlist();
        wishlist.toggle(&book(2, "B")).unwrap();
        let result = PageResult::new(vec![book(1, "A"), book(2, "B")], 2, 32);

        let rendered = PageView::build(&result, 1, &wishlist).render();

        assert!(rendered.contains("♡ A (#1)"));
        assert!(rendered.contains("♥ B (#2)"));
    }

    #[test]
    fn empty_wishlist_message() {
        assert_eq!(WishlistView::build(&wishlist()).render(), "Your wishlist is empty.\n");
    }

    #[test]
    fn error_panel_is_distinct_from_empty_state() {
        let panel = render_error("books", &"timed out");

        assert!(panel.starts_with("Error loading books: timed out"));
        assert!(!panel.contains(EMPTY_RESULT_MESSAGE));
    }
}

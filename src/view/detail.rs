use crate::item::Book;
use crate::view::card::mark;

/// 표지 이미지가 없는 도서에 사용하는 이미지
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300";

pub fn toggle_label(wishlisted: bool) -> &'static str {
    if wishlisted { "Remove from Wishlist" } else { "Add to Wishlist" }
}

/// 도서 상세 화면
pub fn render_detail(book: &Book, wishlisted: bool) -> String {
    let mut lines = vec![
        book.title.clone(),
        format!("Cover: {}", book.cover_image().unwrap_or(PLACEHOLDER_IMAGE)),
        format!("Author(s): {}", book.author_names()),
    ];

    if !book.translators.is_empty() {
        let translators = book.translators.iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Translator(s): {}", translators));
    }

    lines.push(format!("Genres: {}", book.subjects.join(", ")));
    lines.push(format!("Languages: {}", book.languages.join(", ")));
    lines.push(format!("Download Count: {}", book.download_count));
    lines.push(format!("ID: {}", book.id));
    lines.push(format!("[{} {}]", mark(wishlisted), toggle_label(wishlisted)));

    let mut detail = lines.join("\n");
    detail.push('\n');
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::tests::book;
    use crate::item::COVER_IMAGE_MIME;

    #[test]
    fn detail_falls_back_to_placeholder_cover() {
        let detail = render_detail(&book(5, "E"), false);

        assert!(detail.contains(&format!("Cover: {}", PLACEHOLDER_IMAGE)));
        assert!(detail.ends_with("[♡ Add to Wishlist]\n"));
    }

    #[test]
    fn detail_lists_every_subject_and_the_remove_button() {
        let mut book = book(2600, "War and Peace");
        book.subjects = vec!["A", "B", "C", "D"].into_iter().map(String::from).collect();
        book.download_count = 4321;
        book.formats.insert(COVER_IMAGE_MIME.to_string(), "https://example.org/2600.jpg".to_string());

        let detail = render_detail(&book, true);

        assert!(detail.starts_with("War and Peace\nCover: https://example.org/2600.jpg\n"));
        assert!(detail.contains("Genres: A, B, C, D\n"));
        assert!(detail.contains("Download Count: 4321\n"));
        assert!(detail.contains("ID: 2600\n"));
        assert!(detail.contains("Remove from Wishlist"));
    }
}

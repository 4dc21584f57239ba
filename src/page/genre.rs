use crate::item::Book;

/// Gutendex 책장 이름에 붙어있는 접두사
const BOOKSHELF_PREFIX: &str = "Browsing: ";

/// 현재 로드된 페이지의 책장(bookshelves) 값들로 장르 필터 목록을 만든다.
///
/// 전체 카탈로그가 아닌 현재 페이지의 도서만 대상으로 하기 때문에 완전한 분류 목록은 아니다.
/// 처음 나온 순서를 유지하며 중복은 제거한다.
pub fn extract_genres(books: &[Book]) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();

    let shelves = books.iter().flat_map(|book| book.bookshelves.iter());
    for shelf in shelves {
        let genre = shelf.strip_prefix(BOOKSHELF_PREFIX).unwrap_or(shelf.as_str()).trim();
        if genre.is_empty() || genres.iter().any(|g| g == genre) {
            continue;
        }
        genres.push(genre.to_owned());
    }

    genres
}

use std::fmt;
use std::fmt::{Display, Formatter};

/// 전체 페이지 수가 이 값 이하면 모든 페이지 번호를 출력한다.
const SHOW_ALL_LIMIT: u32 = 10;

/// 페이지 이동 컨트롤의 라벨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Page { number: u32, current: bool },
    Ellipsis,
}

impl Label {
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Label::Page { number, .. } => Some(*number),
            Label::Ellipsis => None,
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Label::Page { number, current: true } => write!(f, "[{}]", number),
            Label::Page { number, current: false } => write!(f, "{}", number),
            Label::Ellipsis => write!(f, "…"),
        }
    }
}

/// 현재 페이지와 전체 페이지 수로 페이지 이동 라벨 목록을 만든다.
///
/// 첫 페이지와 마지막 페이지, 현재 페이지는 항상 포함된다. 전체 페이지가 10 이하면 모든 페이지를,
/// 그보다 많으면 최대 9개의 라벨을 반환한다. 페이지 번호는 항상 오름차순이며 중복 되지 않는다.
///
/// - 전체 페이지가 0 이면 빈 목록을 반환한다.
/// - 현재 페이지는 `1..=total_pages` 범위로 보정 된다.
///
/// # Example
/// ```
/// use gutendex_browser::page::labels::labels;
///
/// let rendered: Vec<String> = labels(10, 20).iter().map(|l| l.to_string()).collect();
/// assert_eq!(rendered, vec!["1", "2", "…", "9", "[10]", "11", "…", "19", "20"]);
/// ```
pub fn labels(current_page: u32, total_pages: u32) -> Vec<Label> {
    if total_pages == 0 {
        return Vec::new();
    }

    let current = current_page.clamp(1, total_pages);
    let mut builder = LabelBuilder::new(current);

    if total_pages <= SHOW_ALL_LIMIT {
        builder.pages(1, total_pages);
        return builder.finish();
    }

    builder.pages(1, 2);
    if current > 4 {
        builder.ellipsis();
    }
    builder.pages(current.saturating_sub(1).max(3), (current + 1).min(total_pages - 2));
    if current + 3 < total_pages {
        builder.ellipsis();
    }
    builder.pages(total_pages - 1, total_pages);

    builder.finish()
}

struct LabelBuilder {
    current: u32,
    last_page: u32,
    labels: Vec<Label>,
}

impl LabelBuilder {
    fn new(current: u32) -> Self {
        Self { current, last_page: 0, labels: Vec::new() }
    }

    /// `from..=to` 범위를 추가한다. 이미 추가된 번호 이하의 페이지는 건너뛰고 빈 범위는 무시한다.
    fn pages(&mut self, from: u32, to: u32) {
        for number in from.max(self.last_page + 1)..=to {
            self.labels.push(Label::Page { number, current: number == self.current });
            self.last_page = number;
        }
    }

    fn ellipsis(&mut self) {
        if self.labels.last() != Some(&Label::Ellipsis) {
            self.labels.push(Label::Ellipsis);
        }
    }

    fn finish(self) -> Vec<Label> {
        self.labels
    }
}

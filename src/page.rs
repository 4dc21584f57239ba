pub mod cache;
pub mod genre;
pub mod labels;

pub use cache::{PageCache, Slot};
pub use genre::extract_genres;
pub use labels::{labels, Label};

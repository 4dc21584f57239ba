pub mod browser;
pub mod catalog;
pub mod configs;
pub mod item;
pub mod page;
pub mod storage;
pub mod view;
pub mod wishlist;

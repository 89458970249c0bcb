mod page_dto;

pub use page_dto::{normalize_url, GotoQuery, NewPage, PageForm};

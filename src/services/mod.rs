pub mod answer_matcher;
pub mod document;
pub mod media_repository;
pub mod media_store;
pub mod record_store;

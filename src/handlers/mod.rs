pub mod health_handlers;
pub mod media_handlers;
pub mod qa_handlers;

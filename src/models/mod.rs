//! Core data models for the voice Q&A service.
//!
//! Q&A records map to the persisted JSON document via `serde`; media
//! references describe files held in the upload directories.

pub mod media;
pub mod qa;

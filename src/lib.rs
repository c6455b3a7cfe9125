//! Voice-driven question/answer service.
//!
//! A browser transcribes a spoken question and posts it to `/get_answer`;
//! the server returns the stored answer for speech playback. Q&A pairs live
//! in a single JSON document and uploaded videos/images in two directories.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

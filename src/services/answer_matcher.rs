//! AnswerMatcher: exact-match question lookup plus the add/update/delete
//! operations on the Q&A collection.
//!
//! Every mutation loads the full collection, changes it in memory and saves it
//! back in one piece. Matching is an exact comparison after lowercasing and
//! trimming; nothing else is normalized.

use crate::{models::qa::QaRecord, services::record_store::RecordStore};
use thiserror::Error;
use tracing::{info, warn};

/// Answer returned when no stored question matches.
pub const UNKNOWN_ANSWER: &str = "Sorry, I don't know the answer to that question.";

/// Answer returned when the lookup request itself could not be processed.
pub const ERROR_ANSWER: &str = "An error occurred while processing your request.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QaError {
    #[error("Question and answer cannot be empty")]
    EmptyField,
    #[error("Q&A not found")]
    NotFound(String),
}

pub type QaResult<T> = Result<T, QaError>;

pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_string()
}

/// First record, in collection order, whose stored question equals the
/// normalized `question`.
pub fn match_answer<'a>(question: &str, records: &'a [QaRecord]) -> Option<&'a str> {
    let question = normalize_question(question);
    records
        .iter()
        .find(|record| record.question == question)
        .map(|record| record.answer.as_str())
}

#[derive(Clone)]
pub struct AnswerMatcher {
    store: RecordStore,
}

impl AnswerMatcher {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub async fn list(&self) -> Vec<QaRecord> {
        self.store.load().await
    }

    /// Look up the answer for a spoken question. Never fails; `None` means
    /// no stored question matched.
    pub async fn find_answer(&self, question: &str) -> Option<String> {
        let records = self.store.load().await;
        match match_answer(question, &records) {
            Some(answer) => {
                info!("Found answer for question: {}", normalize_question(question));
                Some(answer.to_string())
            }
            None => {
                warn!("No answer found for question: {}", normalize_question(question));
                None
            }
        }
    }

    /// Append a new record with a fresh id and persist the collection.
    pub async fn add(&self, question: &str, answer: &str) -> QaResult<QaRecord> {
        let (question, answer) = validated(question, answer)?;

        let mut records = self.store.load().await;
        let record = QaRecord::new(question, answer);
        records.push(record.clone());
        self.store.save(&records).await;

        info!(
            "Added Q&A: {} -> {} with ID: {}",
            record.question, record.answer, record.id
        );
        Ok(record)
    }

    /// Replace question and answer of the record with `id`, keeping the id.
    pub async fn update(&self, id: &str, question: &str, answer: &str) -> QaResult<QaRecord> {
        let (question, answer) = validated(question, answer)?;

        let mut records = self.store.load().await;
        let Some(record) = records.iter_mut().find(|record| record.id == id) else {
            warn!("Q&A not found for ID: {}", id);
            return Err(QaError::NotFound(id.to_string()));
        };
        record.question = question;
        record.answer = answer;
        let updated = record.clone();

        self.store.save(&records).await;
        info!("Updated Q&A with ID: {}", id);
        Ok(updated)
    }

    /// Remove the record with `id` and persist the remaining collection.
    pub async fn delete(&self, id: &str) -> QaResult<()> {
        let mut records = self.store.load().await;
        let before = records.len();
        records.retain(|record| record.id != id);

        if records.len() == before {
            warn!("Q&A not found for ID: {}", id);
            return Err(QaError::NotFound(id.to_string()));
        }

        self.store.save(&records).await;
        info!("Deleted Q&A with ID: {}", id);
        Ok(())
    }
}

fn validated(question: &str, answer: &str) -> QaResult<(String, String)> {
    let question = normalize_question(question);
    let answer = normalize_answer(answer);
    if question.is_empty() || answer.is_empty() {
        warn!("Empty question or answer received");
        return Err(QaError::EmptyField);
    }
    Ok((question, answer))
}

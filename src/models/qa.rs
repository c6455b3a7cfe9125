//! Represents a stored question/answer pair.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single question/answer record as persisted in the Q&A document.
///
/// The whole collection is serialized as a JSON array of these objects.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QaRecord {
    /// Opaque unique identifier (UUID v4 string), immutable once assigned.
    pub id: String,

    /// Normalized question text (lowercased, trimmed).
    pub question: String,

    /// Trimmed answer text.
    pub answer: String,
}

impl QaRecord {
    /// Build a record with a freshly generated id.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// On-disk shape of a record, accepting documents written before ids existed.
///
/// `WithId` is tried first so records carrying an id keep it.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum StoredRecord {
    WithId {
        id: String,
        question: String,
        answer: String,
    },
    Legacy {
        question: String,
        answer: String,
    },
}

impl StoredRecord {
    /// Convert into a [`QaRecord`], generating an id when none (or an empty
    /// one) was stored. The flag reports whether an id was assigned.
    pub fn into_record(self) -> (QaRecord, bool) {
        match self {
            StoredRecord::WithId {
                id,
                question,
                answer,
            } if !id.is_empty() => (
                QaRecord {
                    id,
                    question,
                    answer,
                },
                false,
            ),
            StoredRecord::WithId {
                question, answer, ..
            }
            | StoredRecord::Legacy { question, answer } => (QaRecord::new(question, answer), true),
        }
    }
}

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

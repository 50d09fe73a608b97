//! Controlled vocabularies
//!
//! Statuses and UniProt entry types are small lookup tables. They are read
//! once at startup and shared read-only through an `Arc`.

use crate::db::DbResult;
use crate::models::VocabularyEntry;
use crate::store::MappingStore;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Unknown status '{0}'")]
    Unknown(String),
    #[error("Status '{0}' matches more than one vocabulary entry")]
    Ambiguous(String),
}

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    statuses: Vec<VocabularyEntry>,
    entry_types: Vec<VocabularyEntry>,
}

impl Vocabulary {
    pub fn new(statuses: Vec<VocabularyEntry>, entry_types: Vec<VocabularyEntry>) -> Self {
        Self {
            statuses,
            entry_types,
        }
    }

    pub async fn load(store: &dyn MappingStore) -> DbResult<Self> {
        let statuses = store.statuses().await?;
        let entry_types = store.entry_types().await?;
        tracing::info!(
            statuses = statuses.len(),
            entry_types = entry_types.len(),
            "Vocabulary loaded"
        );
        Ok(Self::new(statuses, entry_types))
    }

    pub fn statuses(&self) -> &[VocabularyEntry] {
        &self.statuses
    }

    /// Resolve a status label, ignoring case and surrounding whitespace
    pub fn status_id(&self, label: &str) -> Result<i64, VocabularyError> {
        let wanted = label.trim();
        let mut hits = self
            .statuses
            .iter()
            .filter(|s| s.description.eq_ignore_ascii_case(wanted));

        match (hits.next(), hits.next()) {
            (Some(entry), None) => Ok(entry.id),
            (Some(_), Some(_)) => Err(VocabularyError::Ambiguous(wanted.to_string())),
            (None, _) => Err(VocabularyError::Unknown(wanted.to_string())),
        }
    }

    pub fn status_label(&self, id: i64) -> Option<&str> {
        lookup(&self.statuses, id)
    }

    pub fn entry_type_label(&self, id: i64) -> Option<&str> {
        lookup(&self.entry_types, id)
    }
}

fn lookup(entries: &[VocabularyEntry], id: i64) -> Option<&str> {
    entries
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.description.as_str())
}

//! External sequence services
//!
//! Protein sequences come from the Ensembl and UniProt REST APIs. Features
//! only see the [`SequenceService`] trait, so tests can substitute a fake.

pub mod alignment;
pub mod ensembl;
pub mod uniprot;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::ExternalConfig;

pub use alignment::{align_proteins, PairwiseAlignment};
pub use ensembl::EnsemblClient;
pub use uniprot::UniprotClient;

#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} answered {status} for '{id}'")]
    Status {
        service: &'static str,
        status: u16,
        id: String,
    },

    #[error("{service} returned no sequence for '{id}'")]
    EmptySequence { service: &'static str, id: String },

    #[error("Alignment failed: {0}")]
    Alignment(String),
}

#[async_trait]
pub trait SequenceService: Send + Sync {
    /// Protein translation of an Ensembl transcript
    async fn ensembl_protein(&self, transcript_id: &str) -> Result<String, ExternalError>;

    /// Canonical sequence of a UniProt accession
    async fn uniprot_protein(&self, accession: &str) -> Result<String, ExternalError>;
}

pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<Client, ExternalError> {
    let mut builder =
        Client::builder().user_agent(concat!("gifts-server/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(ExternalError::Client)
}

/// Both REST clients behind one service
pub struct RestSequenceService {
    ensembl: EnsemblClient,
    uniprot: UniprotClient,
}

impl RestSequenceService {
    pub fn new(config: &ExternalConfig) -> Result<Self, ExternalError> {
        let client = http_client(config.timeout_secs)?;
        Ok(Self {
            ensembl: EnsemblClient::with_client(client.clone(), &config.ensembl_url),
            uniprot: UniprotClient::with_client(client, &config.uniprot_url),
        })
    }
}

#[async_trait]
impl SequenceService for RestSequenceService {
    async fn ensembl_protein(&self, transcript_id: &str) -> Result<String, ExternalError> {
        self.ensembl.protein_sequence(transcript_id).await
    }

    async fn uniprot_protein(&self, accession: &str) -> Result<String, ExternalError> {
        self.uniprot.protein_sequence(accession).await
    }
}

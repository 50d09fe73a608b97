//! UniProt REST sequence client

use reqwest::{Client, StatusCode};

use super::{http_client, ExternalError};

const SERVICE: &str = "UniProt";

pub struct UniprotClient {
    client: Client,
    base_url: String,
}

/// Concatenate the sequence lines of a single-record FASTA document
pub fn parse_fasta(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('>'))
        .collect()
}

impl UniprotClient {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, ExternalError> {
        Ok(Self::with_client(http_client(timeout_secs)?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /uniprotkb/{accession}.fasta`
    #[tracing::instrument(skip(self))]
    pub async fn protein_sequence(&self, accession: &str) -> Result<String, ExternalError> {
        let url = format!("{}/uniprotkb/{}.fasta", self.base_url, accession);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ExternalError::Request {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExternalError::Status {
                service: SERVICE,
                status: status.as_u16(),
                id: accession.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ExternalError::Request {
                service: SERVICE,
                source,
            })?;

        let seq = parse_fasta(&body);
        if seq.is_empty() {
            return Err(ExternalError::EmptySequence {
                service: SERVICE,
                id: accession.to_string(),
            });
        }

        tracing::debug!(length = seq.len(), "Fetched UniProt protein");
        Ok(seq)
    }
}

//! Ensembl REST sequence client

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use super::{http_client, ExternalError};

const SERVICE: &str = "Ensembl";

#[derive(Debug, Deserialize)]
struct SequenceResponse {
    #[serde(default)]
    seq: String,
}

pub struct EnsemblClient {
    client: Client,
    base_url: String,
}

impl EnsemblClient {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, ExternalError> {
        Ok(Self::with_client(http_client(timeout_secs)?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /sequence/id/{id}?type=protein`
    #[tracing::instrument(skip(self))]
    pub async fn protein_sequence(&self, id: &str) -> Result<String, ExternalError> {
        let url = format!("{}/sequence/id/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .query(&[("type", "protein")])
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
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
                id: id.to_string(),
            });
        }

        let body: SequenceResponse =
            response
                .json()
                .await
                .map_err(|source| ExternalError::Request {
                    service: SERVICE,
                    source,
                })?;

        if body.seq.is_empty() {
            return Err(ExternalError::EmptySequence {
                service: SERVICE,
                id: id.to_string(),
            });
        }

        tracing::debug!(length = body.seq.len(), "Fetched Ensembl protein");
        Ok(body.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_fetches_protein_sequence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sequence/id/ENST00000269305"))
            .and(query_param("type", "protein"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "ENSP00000269305",
                "molecule": "protein",
                "seq": "MEEPQSDPSV"
            })))
            .mount(&server)
            .await;

        let client = EnsemblClient::new(&server.uri(), None).unwrap();
        let seq = client.protein_sequence("ENST00000269305").await.unwrap();
        assert_eq!(seq, "MEEPQSDPSV");
    }

    #[tokio::test]
    async fn test_unknown_id_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = EnsemblClient::new(&format!("{}/", server.uri()), None).unwrap();
        let err = client.protein_sequence("ENST0").await.unwrap_err();
        assert!(matches!(err, ExternalError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_empty_sequence_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"seq": ""})))
            .mount(&server)
            .await;

        let client = EnsemblClient::new(&server.uri(), None).unwrap();
        let err = client.protein_sequence("ENST1").await.unwrap_err();
        assert!(matches!(err, ExternalError::EmptySequence { .. }));
    }
}

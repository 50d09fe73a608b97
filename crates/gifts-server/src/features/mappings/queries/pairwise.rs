//! Pairwise alignment of a mapping's two protein sequences

use serde::Serialize;

use crate::db::DbError;
use crate::external::{align_proteins, ExternalError, PairwiseAlignment};
use crate::features::FeatureState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseResponse {
    pub mapping_id: i64,
    pub enst_id: String,
    pub uniprot_accession: String,
    pub alignment: PairwiseAlignment,
}

#[derive(Debug, thiserror::Error)]
pub enum PairwiseError {
    #[error("Mapping '{0}' not found")]
    NotFound(i64),
    #[error(transparent)]
    External(#[from] ExternalError),
    #[error(transparent)]
    Database(#[from] DbError),
}

#[tracing::instrument(skip(state))]
pub async fn handle(state: &FeatureState, mapping_id: i64) -> Result<PairwiseResponse, PairwiseError> {
    let record = state
        .store
        .mapping(mapping_id)
        .await?
        .ok_or(PairwiseError::NotFound(mapping_id))?;

    let enst_id = record.transcript.enst_id;
    let accession = record.uniprot.uniprot_acc;

    let (ensembl, uniprot) = futures::try_join!(
        state.sequences.ensembl_protein(&enst_id),
        state.sequences.uniprot_protein(&accession),
    )?;

    // Quadratic in sequence length, keep it off the async workers
    let alignment = tokio::task::spawn_blocking(move || align_proteins(&ensembl, &uniprot))
        .await
        .map_err(|e| ExternalError::Alignment(e.to_string()))?;

    tracing::debug!(
        differences = alignment.differences,
        score = alignment.score,
        "Pairwise alignment computed"
    );

    Ok(PairwiseResponse {
        mapping_id,
        enst_id,
        uniprot_accession: accession,
        alignment,
    })
}

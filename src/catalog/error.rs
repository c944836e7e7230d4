use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Dataset '{0}' is not known to the server")]
    DatasetNotFound(String),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse dataset metadata JSON for '{0}'")]
    MetadataJson(String, #[source] serde_json::Error),

    #[error("Unexpected metadata table shape for dataset '{dataset_id}': {message}")]
    MetadataShape { dataset_id: String, message: String },
}

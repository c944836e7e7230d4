//! Blocking retrieval of griddap/tabledap CSV responses.
//!
//! ERDDAP CSV responses carry a units line directly under the header row.
//! The loader spools the body to a temp file, reads it with polars with the
//! units line skipped, and deliberately ingests every column as text: the
//! response normalizer owns all type coercion.

use crate::dap::error::DapError;
use log::{info, warn};
use polars::frame::DataFrame;
use polars::prelude::*;
use reqwest::blocking::Client;
use std::io::Write;
use tempfile::NamedTempFile;

pub struct DapLoader {
    http: Client,
}

impl DapLoader {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// The underlying HTTP client, shared with the catalog lookup.
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Executes one rendered query and parses the CSV body. All-or-nothing:
    /// any transport or parse failure surfaces with no partial result.
    pub fn fetch_table(&self, url: &str, dataset_id: &str) -> Result<DataFrame, DapError> {
        let bytes = self.fetch_csv(url)?;
        info!(
            "Received {} CSV bytes for dataset {}",
            bytes.len(),
            dataset_id
        );
        Self::dataframe_from_csv(&bytes, dataset_id)
    }

    fn fetch_csv(&self, url: &str) -> Result<Vec<u8>, DapError> {
        info!("Requesting {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| DapError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    DapError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    DapError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let body = response
            .bytes()
            .map_err(|e| DapError::ResponseBody(url.to_string(), e))?;
        Ok(body.to_vec())
    }

    /// Parses ERDDAP CSV bytes into an all-text DataFrame, skipping the
    /// units line under the header.
    pub(crate) fn dataframe_from_csv(bytes: &[u8], dataset_id: &str) -> Result<DataFrame, DapError> {
        let mut temp_file = NamedTempFile::new().map_err(|e| DapError::CsvSpoolIo {
            dataset_id: dataset_id.to_string(),
            path: std::env::temp_dir(),
            source: e,
        })?;
        temp_file.write_all(bytes).map_err(|e| DapError::CsvSpoolIo {
            dataset_id: dataset_id.to_string(),
            path: temp_file.path().to_path_buf(),
            source: e,
        })?;
        temp_file.flush().map_err(|e| DapError::CsvSpoolIo {
            dataset_id: dataset_id.to_string(),
            path: temp_file.path().to_path_buf(),
            source: e,
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_skip_rows_after_header(1)
            // Zero inference rows leaves every column as text; typing is the
            // normalizer's job.
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
            .map_err(|e| DapError::CsvReadPolars {
                dataset_id: dataset_id.to_string(),
                source: e,
            })?
            .finish()
            .map_err(|e| DapError::CsvReadPolars {
                dataset_id: dataset_id.to_string(),
                source: e,
            })?;

        Ok(df)
    }
}

impl Default for DapLoader {
    fn default() -> Self {
        Self::new()
    }
}

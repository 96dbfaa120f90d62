use std::fmt;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::grid::{self, GridExpression, Measurement};
use super::types::{AmbaProduct, Gene, ReferenceSpace, SectionDataSet};

pub const DEFAULT_BASE_URL: &str = "http://api.brain-map.org";

/// Errors that can occur while talking to the Atlas API.
#[derive(Debug)]
pub enum AtlasError {
    /// Network-level failure (DNS, connection refused, body read).
    Network(String),
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// The body was not the JSON we expected.
    Parse(String),
    /// A query response without a `msg` array. The API reports failures this way.
    MissingMsg(String),
    /// The grid data archive could not be read.
    Archive(String),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::Network(msg) => write!(f, "network error: {msg}"),
            AtlasError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            AtlasError::Parse(msg) => write!(f, "parse error: {msg}"),
            AtlasError::MissingMsg(body) => write!(f, "response has no msg array: {body}"),
            AtlasError::Archive(msg) => write!(f, "archive error: {msg}"),
        }
    }
}

impl std::error::Error for AtlasError {}

/// One RMA model query: `criteria` filters plus an optional `include`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelQuery {
    pub model: &'static str,
    pub criteria: Vec<String>,
    pub include: Option<String>,
}

impl ModelQuery {
    pub fn new(model: &'static str) -> Self {
        Self {
            model,
            criteria: Vec::new(),
            include: None,
        }
    }

    /// Adds an `association[field$eqvalue]` filter.
    pub fn filter_eq(mut self, association: &str, field: &str, value: impl fmt::Display) -> Self {
        self.criteria.push(format!("{association}[{field}$eq{value}]"));
        self
    }

    pub fn include(mut self, related: &str) -> Self {
        self.include = Some(related.to_string());
        self
    }

    pub fn path(&self) -> String {
        format!("/api/v2/data/{}/query.json", self.model)
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.criteria.is_empty() {
            params.push(("criteria", self.criteria.join(",")));
        }
        if let Some(ref include) = self.include {
            params.push(("include", include.clone()));
        }
        params.push(("num_rows", "all".to_string()));
        params
    }
}

/// Thin client over the Atlas query and grid download endpoints.
#[derive(Clone)]
pub struct AtlasClient {
    base_url: String,
    client: reqwest::Client,
}

impl AtlasClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a model query and deserializes each element of `msg`.
    pub async fn query<T: DeserializeOwned>(&self, query: &ModelQuery) -> Result<Vec<T>, AtlasError> {
        let url = format!("{}{}", self.base_url, query.path());
        info!("Atlas query: model={}, criteria={:?}", query.model, query.criteria);

        let response = self
            .client
            .get(&url)
            .query(&query.params())
            .send()
            .await
            .map_err(|e| AtlasError::Network(e.to_string()))?;

        debug!("Atlas response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Atlas API error: {} - {}", status, message);
            return Err(AtlasError::Api { status, message });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AtlasError::Parse(e.to_string()))?;
        parse_msg(body)
    }

    pub async fn products(&self) -> Result<Vec<AmbaProduct>, AtlasError> {
        self.query(&ModelQuery::new("Product")).await
    }

    pub async fn reference_spaces(&self) -> Result<Vec<ReferenceSpace>, AtlasError> {
        self.query(&ModelQuery::new("ReferenceSpace")).await
    }

    pub async fn genes_for_product(&self, product_id: i64) -> Result<Vec<Gene>, AtlasError> {
        let query = ModelQuery::new("Gene").filter_eq("products", "id", product_id);
        self.query(&query).await
    }

    /// Section datasets in a reference space, with their genes attached.
    pub async fn section_datasets(
        &self,
        reference_space_id: i64,
        product_id: Option<i64>,
    ) -> Result<Vec<SectionDataSet>, AtlasError> {
        let mut query =
            ModelQuery::new("SectionDataSet").filter_eq("reference_space", "id", reference_space_id);
        if let Some(product_id) = product_id {
            query = query.filter_eq("products", "id", product_id);
        }
        self.query(&query.include("genes")).await
    }

    /// Downloads and decodes the grid data archive for one section dataset.
    pub async fn grid_expression(
        &self,
        section_dataset_id: i64,
        measurements: &[Measurement],
    ) -> Result<GridExpression, AtlasError> {
        let url = format!("{}/grid_data/download/{}", self.base_url, section_dataset_id);
        let include = measurements
            .iter()
            .map(Measurement::as_str)
            .collect::<Vec<_>>()
            .join(",");
        info!("Downloading grid data for section dataset {} ({})", section_dataset_id, include);

        let response = self
            .client
            .get(&url)
            .query(&[("include", include)])
            .send()
            .await
            .map_err(|e| AtlasError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Grid download failed: {} - {}", status, message);
            return Err(AtlasError::Api { status, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AtlasError::Network(e.to_string()))?;
        debug!("Grid archive for {}: {} bytes", section_dataset_id, bytes.len());
        grid::decode_archive(section_dataset_id, &bytes, measurements)
    }
}

/// Extracts and deserializes the `msg` array of a query response.
pub fn parse_msg<T: DeserializeOwned>(mut body: serde_json::Value) -> Result<Vec<T>, AtlasError> {
    let msg = match body.get_mut("msg").map(serde_json::Value::take) {
        Some(serde_json::Value::Array(items)) => items,
        // On failure the API puts an error string in `msg`.
        Some(other) => return Err(AtlasError::MissingMsg(other.to_string())),
        None => return Err(AtlasError::MissingMsg(body.to_string())),
    };
    msg.into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| AtlasError::Parse(e.to_string())))
        .collect()
}

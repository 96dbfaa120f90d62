pub mod catalog;
pub mod client;
pub mod grid;
pub mod types;

pub use catalog::ProductCatalog;
pub use client::{AtlasClient, AtlasError, ModelQuery, DEFAULT_BASE_URL};
pub use grid::{GridExpression, Measurement};
pub use types::{AmbaProduct, Gene, IdOrText, ReferenceSpace, SectionDataSet};

//! # Data Retrieval
//!
//! The boundary between the menus and the Atlas API. Every call blocks on
//! the async client, logs how it went, and hands back `None` on any failure
//! so screens only have to deal with "data" or "no data".

use std::collections::HashSet;
use std::future::Future;
use std::io;

use log::{error, info};
use tokio::runtime::Handle;

use super::Service;
use crate::atlas::{
    AtlasClient, AtlasError, Gene, GridExpression, Measurement, ReferenceSpace, SectionDataSet,
};
use crate::core::format::{comma_separated, format_duration, timed};

/// Which section datasets survive retrieval. Failed datasets are always dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetFilter {
    /// Keep only datasets flagged with expression.
    pub expression_only: bool,
    /// Keep only datasets cut in this plane (1 coronal, 2 sagittal).
    pub plane_of_section_id: Option<i64>,
}

impl DatasetFilter {
    pub fn accepts(&self, dataset: &SectionDataSet) -> bool {
        !dataset.failed
            && (!self.expression_only || dataset.expression)
            && self
                .plane_of_section_id
                .is_none_or(|plane| dataset.plane_of_section_id == plane)
    }
}

pub struct DataRetrievalService {
    client: AtlasClient,
    runtime: Handle,
}

impl DataRetrievalService {
    /// `runtime` must belong to a runtime that outlives the service and is
    /// not the one calling into it.
    pub fn new(client: AtlasClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    pub fn client(&self) -> &AtlasClient {
        &self.client
    }

    fn fetch<T>(&self, what: &str, request: impl Future<Output = Result<T, AtlasError>>) -> Option<T> {
        let (result, elapsed) = timed(|| self.runtime.block_on(request));
        match result {
            Ok(value) => {
                info!("Retrieved {} in {}", what, format_duration(elapsed));
                Some(value)
            }
            Err(e) => {
                error!("Failed to retrieve {}: {}", what, e);
                None
            }
        }
    }

    /// Genes of a product, deduplicated by acronym.
    pub fn geneset_from_product(&self, product_id: i64) -> Option<Vec<Gene>> {
        let genes = self.fetch(
            &format!("gene set for product {product_id}"),
            self.client.genes_for_product(product_id),
        )?;
        let genes = dedupe_genes(genes);
        info!("{} unique genes in product {}", comma_separated(genes.len() as u64), product_id);
        Some(genes)
    }

    /// Reference spaces sorted by id.
    pub fn reference_spaces(&self) -> Option<Vec<ReferenceSpace>> {
        let mut spaces = self.fetch("reference spaces", self.client.reference_spaces())?;
        spaces.sort_by_key(|space| space.id);
        Some(spaces)
    }

    pub fn section_datasets(
        &self,
        reference_space_id: i64,
        product_id: Option<i64>,
        filter: &DatasetFilter,
    ) -> Option<Vec<SectionDataSet>> {
        let datasets = self.fetch(
            &format!("section datasets for reference space {reference_space_id}"),
            self.client.section_datasets(reference_space_id, product_id),
        )?;
        let total = datasets.len();
        let datasets = filter_section_datasets(datasets, filter);
        info!(
            "Kept {} of {} section datasets for reference space {}",
            datasets.len(),
            total,
            reference_space_id
        );
        Some(datasets)
    }

    /// Grid data for each dataset, in order. One failed download fails the lot.
    pub fn grid_expression(
        &self,
        datasets: &[SectionDataSet],
        measurements: &[Measurement],
    ) -> Option<Vec<GridExpression>> {
        datasets
            .iter()
            .map(|dataset| {
                self.fetch(
                    &format!("grid data for section dataset {}", dataset.id),
                    self.client.grid_expression(dataset.id, measurements),
                )
            })
            .collect()
    }
}

impl Service for DataRetrievalService {
    fn name(&self) -> &str {
        "Data Retrieval Service"
    }

    fn docs(&self) -> &str {
        "Retrieves gene sets, section datasets and grid expression data from the Allen Mouse Brain Atlas."
    }

    fn startup(&mut self) -> io::Result<()> {
        info!("{} using {}", self.name(), self.client.base_url());
        Ok(())
    }
}

/// Keeps the first gene seen for each acronym.
pub fn dedupe_genes(genes: Vec<Gene>) -> Vec<Gene> {
    let mut seen = HashSet::new();
    genes
        .into_iter()
        .filter(|gene| seen.insert(gene.acronym.clone()))
        .collect()
}

/// Applies `filter` and drops repeated dataset ids, keeping the first.
pub fn filter_section_datasets(
    datasets: Vec<SectionDataSet>,
    filter: &DatasetFilter,
) -> Vec<SectionDataSet> {
    let mut seen = HashSet::new();
    datasets
        .into_iter()
        .filter(|dataset| filter.accepts(dataset) && seen.insert(dataset.id))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn gene(id: i64, acronym: &str) -> Gene {
        Gene {
            acronym: acronym.to_string(),
            alias_tags: None,
            chromosome_id: None,
            ensembl_id: None,
            entrez_id: None,
            genomic_reference_update_id: None,
            homologene_id: None,
            id,
            legacy_ensembl_gene_id: None,
            name: format!("{acronym} gene"),
            organism_id: 2,
            original_name: format!("{acronym} gene"),
            original_symbol: acronym.to_string(),
            reference_genome_id: None,
            sphinx_id: id,
            version_status: None,
        }
    }

    pub(crate) fn dataset(id: i64, failed: bool, expression: bool, genes: &[&str]) -> SectionDataSet {
        SectionDataSet {
            blue_channel: None,
            delegate: true,
            expression,
            failed,
            failed_facet: 734881840,
            green_channel: None,
            id,
            name: None,
            plane_of_section_id: 1,
            qc_date: None,
            red_channel: None,
            reference_space_id: 9,
            rnaseq_design_id: None,
            section_thickness: 25,
            specimen_id: id + 1,
            sphinx_id: id + 2,
            storage_directory: None,
            weight: 5470,
            genes: Some(
                genes
                    .iter()
                    .enumerate()
                    .map(|(i, acronym)| gene(i as i64, acronym))
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_dedupe_genes_keeps_first() {
        let genes = vec![gene(1, "Pzp"), gene(2, "Rora"), gene(3, "Pzp")];
        let unique = dedupe_genes(genes);
        let ids: Vec<i64> = unique.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_failed_datasets_always_dropped() {
        let datasets = vec![dataset(1, true, true, &[]), dataset(2, false, false, &[])];
        let kept = filter_section_datasets(datasets, &DatasetFilter::default());
        let ids: Vec<i64> = kept.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_expression_only_filter() {
        let datasets = vec![
            dataset(1, false, true, &["Pzp"]),
            dataset(2, false, false, &["Rora"]),
            dataset(3, false, true, &["Gad1"]),
        ];
        let filter = DatasetFilter {
            expression_only: true,
            ..Default::default()
        };
        let ids: Vec<i64> = filter_section_datasets(datasets, &filter)
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_plane_of_section_filter() {
        let mut sagittal = dataset(2, false, true, &["Rora"]);
        sagittal.plane_of_section_id = 2;
        let datasets = vec![dataset(1, false, true, &["Pzp"]), sagittal];
        let filter = DatasetFilter {
            plane_of_section_id: Some(2),
            ..Default::default()
        };
        let ids: Vec<i64> = filter_section_datasets(datasets, &filter)
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_duplicate_dataset_ids_removed() {
        let datasets = vec![
            dataset(7, false, true, &["Pzp"]),
            dataset(8, false, true, &["Rora"]),
            dataset(7, false, true, &["Pzp"]),
        ];
        let kept = filter_section_datasets(datasets, &DatasetFilter::default());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_service_name() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let service = DataRetrievalService::new(
            AtlasClient::new("http://127.0.0.1:9"),
            runtime.handle().clone(),
        );
        assert_eq!(service.name(), "Data Retrieval Service");
        assert!(!service.docs().is_empty());
    }

    #[test]
    fn test_network_failure_becomes_none() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        // Port 9 (discard) on loopback refuses connections.
        let service = DataRetrievalService::new(
            AtlasClient::new("http://127.0.0.1:9"),
            runtime.handle().clone(),
        );
        assert!(service.geneset_from_product(1).is_none());
        assert_eq!(service.grid_expression(&[], &[Measurement::Energy]), Some(vec![]));
    }
}

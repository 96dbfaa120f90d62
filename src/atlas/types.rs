use serde::{Deserialize, Serialize};
use std::fmt;

/// A value the Atlas serves as either a number or a string, depending on the record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum IdOrText {
    Id(i64),
    Text(String),
}

impl fmt::Display for IdOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrText::Id(id) => write!(f, "{id}"),
            IdOrText::Text(text) => write!(f, "{text}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Gene {
    pub acronym: String,
    pub alias_tags: Option<String>,
    pub chromosome_id: Option<i64>,
    pub ensembl_id: Option<String>,
    pub entrez_id: Option<i64>,
    pub genomic_reference_update_id: Option<i64>,
    pub homologene_id: Option<i64>,
    pub id: i64,
    pub legacy_ensembl_gene_id: Option<IdOrText>,
    pub name: String,
    pub organism_id: i64,
    pub original_name: String,
    pub original_symbol: String,
    pub reference_genome_id: Option<IdOrText>,
    pub sphinx_id: i64,
    pub version_status: Option<String>,
}

/// An imaging series tied to a reference space, optionally carrying its genes
/// when requested with `include=genes`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SectionDataSet {
    pub blue_channel: Option<String>,
    pub delegate: bool,
    pub expression: bool,
    pub failed: bool,
    pub failed_facet: i64,
    pub green_channel: Option<String>,
    pub id: i64,
    pub name: Option<String>,
    pub plane_of_section_id: i64,
    pub qc_date: Option<String>,
    pub red_channel: Option<String>,
    pub reference_space_id: i64,
    pub rnaseq_design_id: Option<i64>,
    pub section_thickness: i64,
    pub specimen_id: i64,
    pub sphinx_id: i64,
    pub storage_directory: Option<String>,
    pub weight: i64,
    #[serde(default)]
    pub genes: Option<Vec<Gene>>,
}

impl SectionDataSet {
    /// Acronym of the first attached gene, if any.
    pub fn primary_gene(&self) -> Option<&str> {
        self.genes
            .as_ref()
            .and_then(|genes| genes.first())
            .map(|gene| gene.acronym.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AmbaProduct {
    pub abbreviation: String,
    pub description: Option<String>,
    pub id: i64,
    pub name: String,
    pub product_name_facet: i64,
    pub resource: Option<String>,
    pub species: Option<String>,
    pub species_name_facet: i64,
    pub tags: Option<String>,
}

impl AmbaProduct {
    /// True when the product's resource names a brain atlas.
    pub fn is_brain_atlas(&self) -> bool {
        self.resource.as_deref().is_some_and(|resource| {
            let resource = resource.to_lowercase();
            resource.contains("brain") && resource.contains("atlas")
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReferenceSpace {
    pub age_id: Option<i64>,
    pub anatomy_id: Option<IdOrText>,
    pub name: String,
    pub id: i64,
    pub organism_id: i64,
    pub storage_directory: Option<String>,
}

//! # File Export
//!
//! Writes retrieved data under the data directory:
//!
//! ```text
//! <data_dir>/generated/
//! ├── geneset/            one gene acronym per line
//! ├── section_dataset/    one section dataset id per line
//! └── grid_expression/    one CSV per measurement, a column per gene
//! ```
//!
//! Directories are created on demand. Every save returns the path it wrote.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use super::Service;
use crate::atlas::{Gene, GridExpression, Measurement, SectionDataSet};

pub struct FileSaveService {
    data_dir: PathBuf,
}

impl FileSaveService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.data_dir.join("generated")
    }

    pub fn geneset_dir(&self) -> PathBuf {
        self.generated_dir().join("geneset")
    }

    pub fn section_dataset_dir(&self) -> PathBuf {
        self.generated_dir().join("section_dataset")
    }

    pub fn grid_expression_dir(&self) -> PathBuf {
        self.generated_dir().join("grid_expression")
    }

    fn write_lines<I, T>(dir: &Path, file_name: &str, lines: I) -> io::Result<PathBuf>
    where
        I: IntoIterator<Item = T>,
        T: std::fmt::Display,
    {
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let mut writer = BufWriter::new(File::create(&path)?);
        let mut count = 0usize;
        for line in lines {
            writeln!(writer, "{line}")?;
            count += 1;
        }
        writer.flush()?;
        info!("Wrote {} lines to {}", count, path.display());
        Ok(path)
    }

    pub fn save_geneset_to_file(&self, genes: &[Gene], file_name: &str) -> io::Result<PathBuf> {
        Self::write_lines(
            &self.geneset_dir(),
            file_name,
            genes.iter().map(|gene| gene.acronym.as_str()),
        )
    }

    pub fn save_section_dataset_ids_to_file(
        &self,
        section_dataset_ids: &[i64],
        file_name: &str,
    ) -> io::Result<PathBuf> {
        Self::write_lines(&self.section_dataset_dir(), file_name, section_dataset_ids)
    }

    /// Writes one measurement as CSV: a header of column names, then one row per voxel.
    ///
    /// All columns must hold the same number of voxels.
    pub fn save_grid_expression_csv(
        &self,
        measurement: Measurement,
        columns: &[(String, &[f32])],
        file_name: &str,
    ) -> io::Result<PathBuf> {
        let rows = columns.first().map_or(0, |(_, values)| values.len());
        if let Some((name, values)) = columns.iter().find(|(_, values)| values.len() != rows) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "column {} has {} voxels, expected {}",
                    name,
                    values.len(),
                    rows
                ),
            ));
        }

        let dir = self.grid_expression_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(columns.iter().map(|(name, _)| name.as_str()))?;
        for row in 0..rows {
            writer.write_record(columns.iter().map(|(_, values)| values[row].to_string()))?;
        }
        writer.flush()?;

        info!(
            "Wrote {} CSV ({} columns x {} voxels) to {}",
            measurement,
            columns.len(),
            rows,
            path.display()
        );
        Ok(path)
    }
}

impl Service for FileSaveService {
    fn name(&self) -> &str {
        "File Save Service"
    }

    fn docs(&self) -> &str {
        "Saves gene sets, section dataset ids and grid expression tables to files."
    }
}

/// Column names for grid exports: the dataset's gene acronym, suffixed with
/// the dataset id when an acronym repeats, or `sds_<id>` without a gene.
pub fn grid_column_names(datasets: &[SectionDataSet]) -> Vec<String> {
    let mut acronym_counts: HashMap<&str, usize> = HashMap::new();
    for dataset in datasets {
        if let Some(acronym) = dataset.primary_gene() {
            *acronym_counts.entry(acronym).or_default() += 1;
        }
    }

    datasets
        .iter()
        .map(|dataset| match dataset.primary_gene() {
            Some(acronym) if acronym_counts[acronym] > 1 => format!("{acronym}_{}", dataset.id),
            Some(acronym) => acronym.to_string(),
            None => format!("sds_{}", dataset.id),
        })
        .collect()
}

/// Pairs column names with the grids' volumes for one measurement.
/// Grids without that measurement are skipped.
pub fn grid_columns<'g>(
    names: &[String],
    grids: &'g [GridExpression],
    measurement: Measurement,
) -> Vec<(String, &'g [f32])> {
    names
        .iter()
        .zip(grids)
        .filter_map(|(name, grid)| grid.volume(measurement).map(|volume| (name.clone(), volume)))
        .collect()
}

/// Lowercases `text` and replaces anything but letters and digits with `_`.
pub fn file_stem(text: &str) -> String {
    let stem: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    stem.trim_matches('_').to_string()
}

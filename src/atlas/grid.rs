//! # Grid Expression Data
//!
//! The Atlas serves grid data for a section dataset as a zip archive holding
//! one `<measurement>.raw` volume per requested measurement (plus `.mhd`
//! headers we don't need). Each raw volume is a flat run of little-endian
//! `f32` voxels; voxels without data carry `-1`.

use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::str::FromStr;

use log::debug;
use zip::ZipArchive;

use super::client::AtlasError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measurement {
    Energy,
    Density,
    Intensity,
}

impl Measurement {
    pub const ALL: [Measurement; 3] = [
        Measurement::Energy,
        Measurement::Density,
        Measurement::Intensity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Measurement::Energy => "energy",
            Measurement::Density => "density",
            Measurement::Intensity => "intensity",
        }
    }

    fn raw_file_name(&self) -> String {
        format!("{}.raw", self.as_str())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Measurement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "energy" => Ok(Measurement::Energy),
            "density" => Ok(Measurement::Density),
            "intensity" => Ok(Measurement::Intensity),
            other => Err(format!("unknown measurement type: {other}")),
        }
    }
}

/// Decoded volumes for one section dataset, keyed by measurement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridExpression {
    pub section_dataset_id: i64,
    pub volumes: HashMap<Measurement, Vec<f32>>,
}

impl GridExpression {
    pub fn volume(&self, measurement: Measurement) -> Option<&[f32]> {
        self.volumes.get(&measurement).map(Vec::as_slice)
    }
}

/// Reinterprets a raw volume as little-endian `f32` voxels.
pub fn decode_raw_volume(bytes: &[u8]) -> Result<Vec<f32>, AtlasError> {
    if bytes.len() % 4 != 0 {
        return Err(AtlasError::Archive(format!(
            "raw volume length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Pulls the requested measurement volumes out of a grid data archive.
///
/// Every requested measurement must be present in the archive.
pub fn decode_archive(
    section_dataset_id: i64,
    archive_bytes: &[u8],
    measurements: &[Measurement],
) -> Result<GridExpression, AtlasError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))
        .map_err(|e| AtlasError::Archive(e.to_string()))?;

    let mut grid = GridExpression {
        section_dataset_id,
        volumes: HashMap::new(),
    };

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| AtlasError::Archive(e.to_string()))?;
        if file.is_dir() {
            continue;
        }

        let base_name = file
            .name()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let Some(measurement) = measurements
            .iter()
            .find(|m| m.raw_file_name() == base_name)
            .copied()
        else {
            continue;
        };

        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| AtlasError::Archive(e.to_string()))?;
        let volume = decode_raw_volume(&bytes)?;
        debug!(
            "Decoded {} volume for section dataset {}: {} voxels",
            measurement,
            section_dataset_id,
            volume.len()
        );
        grid.volumes.insert(measurement, volume);
    }

    if let Some(missing) = measurements.iter().find(|m| !grid.volumes.contains_key(m)) {
        return Err(AtlasError::Archive(format!(
            "archive for section dataset {} has no {}",
            section_dataset_id,
            missing.raw_file_name()
        )));
    }

    Ok(grid)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Builds an in-memory archive shaped like an Atlas grid download.
    pub(crate) fn grid_archive(files: &[(&str, &[f32])]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = SimpleFileOptions::default();
            for (name, voxels) in files {
                writer.start_file(*name, options).unwrap();
                for v in *voxels {
                    writer.write_all(&v.to_le_bytes()).unwrap();
                }
            }
            writer.start_file("energy.mhd", options).unwrap();
            writer.write_all(b"ObjectType = Image\n").unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_measurement_parsing() {
        assert_eq!(" Energy ".parse::<Measurement>(), Ok(Measurement::Energy));
        assert_eq!("INTENSITY".parse::<Measurement>(), Ok(Measurement::Intensity));
        assert!("volume".parse::<Measurement>().is_err());
    }

    #[test]
    fn test_decode_raw_volume_little_endian() {
        let bytes: Vec<u8> = [1.5f32, -1.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        assert_eq!(decode_raw_volume(&bytes).unwrap(), vec![1.5, -1.0]);
    }

    #[test]
    fn test_decode_raw_volume_rejects_partial_voxel() {
        assert!(matches!(
            decode_raw_volume(&[0, 0, 0]),
            Err(AtlasError::Archive(_))
        ));
    }

    #[test]
    fn test_decode_archive_picks_requested_volumes() {
        let bytes = grid_archive(&[
            ("energy.raw", &[0.25, 0.5]),
            ("density.raw", &[1.0, 2.0]),
        ]);
        let grid = decode_archive(42, &bytes, &[Measurement::Density]).unwrap();
        assert_eq!(grid.section_dataset_id, 42);
        assert_eq!(grid.volume(Measurement::Density), Some(&[1.0, 2.0][..]));
        assert!(grid.volume(Measurement::Energy).is_none());
    }

    #[test]
    fn test_decode_archive_missing_measurement() {
        let bytes = grid_archive(&[("energy.raw", &[0.25])]);
        let err = decode_archive(7, &bytes, &[Measurement::Intensity]).unwrap_err();
        assert!(err.to_string().contains("intensity.raw"));
    }

    #[test]
    fn test_decode_archive_not_a_zip() {
        assert!(matches!(
            decode_archive(1, b"not a zip", &[Measurement::Energy]),
            Err(AtlasError::Archive(_))
        ));
    }
}

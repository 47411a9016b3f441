use glam::DVec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::registry::{FrameCode, FrameRegistry};
use common::{deserialize, FileFormat};

/// One 7-parameter (Bursa-Wolf) record, fit for the `from` -> `to` direction.
///
/// Translations are meters, rotations arc-seconds, scale parts-per-million.
/// Applying a record against its direction requires the matrix inverse, never
/// parameter negation; see [`crate::helmert`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformParameters {
    pub from: FrameCode,
    pub to: FrameCode,
    pub translation_m: DVec3,
    pub rotation_arcsec: DVec3,
    pub scale_ppm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<f64>,
}

impl TransformParameters {
    /// Numeric fields that must be finite, paired with names for diagnostics.
    fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("translation_m.x", self.translation_m.x),
            ("translation_m.y", self.translation_m.y),
            ("translation_m.z", self.translation_m.z),
            ("rotation_arcsec.x", self.rotation_arcsec.x),
            ("rotation_arcsec.y", self.rotation_arcsec.y),
            ("rotation_arcsec.z", self.rotation_arcsec.z),
            ("scale_ppm", self.scale_ppm),
        ];
        if let Some(epoch) = self.epoch {
            fields.push(("epoch", epoch));
        }
        fields
    }
}

/// On-disk shape of a parameter source: an optional list of frames that
/// exist without any record, plus the records themselves.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<FrameCode>,
    pub parameters: Vec<TransformParameters>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Parameter record {from} -> {to}: field {field} is not finite")]
    MalformedParameters {
        from: FrameCode,
        to: FrameCode,
        field: &'static str,
    },
    #[error("Parameter record {index} has an empty frame code")]
    EmptyFrameCode { index: usize },
    #[error("Parameter record maps frame {0} to itself")]
    SelfReferential(FrameCode),
    #[error("Duplicate parameter record for pair {from} -> {to}")]
    DuplicateParameters { from: FrameCode, to: FrameCode },
    #[error("Failed to read parameter source: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] common::SerdeFormatError),
    #[error(transparent)]
    Extension(#[from] common::FileExtensionError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only index of transformation parameter records, keyed by ordered
/// frame pair. Built once at startup; safe to share across requests.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct ParameterStore {
    declared_frames: Vec<FrameCode>,
    records: Vec<TransformParameters>,
}

impl ParameterStore {
    pub fn from_set(set: ParameterSet) -> StoreResult<ParameterStore> {
        let store = ParameterStore {
            declared_frames: set.frames,
            records: set.parameters,
        };
        store.validate()?;

        info!(
            records = store.records.len(),
            frames = store.registry().len(),
            "parameter store loaded"
        );
        Ok(store)
    }

    pub fn from_yaml(yaml: &str) -> StoreResult<ParameterStore> {
        let set: ParameterSet = deserialize(yaml, FileFormat::Yaml)?;
        Self::from_set(set)
    }

    pub fn from_json(json: &str) -> StoreResult<ParameterStore> {
        let set: ParameterSet = deserialize(json, FileFormat::Json)?;
        Self::from_set(set)
    }

    /// Loads a parameter source, selecting the format by file extension.
    pub fn from_file(path: &str) -> StoreResult<ParameterStore> {
        let format = FileFormat::from_file_name(path)?;
        let contents = std::fs::read_to_string(path)?;
        let set: ParameterSet = deserialize(&contents, format)?;
        Self::from_set(set)
    }

    fn validate(&self) -> StoreResult<()> {
        let mut seen: HashMap<(&FrameCode, &FrameCode), usize> =
            HashMap::with_capacity(self.records.len());

        for (index, record) in self.records.iter().enumerate() {
            if record.from.is_empty() || record.to.is_empty() {
                return Err(StoreError::EmptyFrameCode { index });
            }
            if record.from == record.to {
                return Err(StoreError::SelfReferential(record.from.clone()));
            }

            for (field, value) in record.numeric_fields() {
                if !value.is_finite() {
                    return Err(StoreError::MalformedParameters {
                        from: record.from.clone(),
                        to: record.to.clone(),
                        field,
                    });
                }
            }

            let prev = seen.insert((&record.from, &record.to), index);
            if prev.is_some() {
                return Err(StoreError::DuplicateParameters {
                    from: record.from.clone(),
                    to: record.to.clone(),
                });
            }
        }

        Ok(())
    }

    /// Record stored exactly for the ordered pair (from, to).
    /// No inversion, no composition.
    pub fn lookup_direct(&self, from: &FrameCode, to: &FrameCode) -> Option<&TransformParameters> {
        self.records
            .iter()
            .find(|record| &record.from == from && &record.to == to)
    }

    pub fn records(&self) -> &[TransformParameters] {
        self.records.as_slice()
    }

    /// All frames this store knows about: declared frames plus every record
    /// endpoint.
    pub fn registry(&self) -> FrameRegistry {
        let codes = self
            .declared_frames
            .iter()
            .cloned()
            .chain(self.records.iter().flat_map(|record| {
                [record.from.clone(), record.to.clone()]
            }));
        FrameRegistry::new(codes)
    }

    /// Undirected adjacency over stored record pairs, with neighbor lists in
    /// lexical order so traversal is deterministic.
    pub fn adjacency(&self) -> HashMap<FrameCode, Vec<FrameCode>> {
        let mut adjacency: HashMap<FrameCode, Vec<FrameCode>> = HashMap::new();
        for record in self.records.iter() {
            adjacency
                .entry(record.from.clone())
                .or_default()
                .push(record.to.clone());
            adjacency
                .entry(record.to.clone())
                .or_default()
                .push(record.from.clone());
        }
        for neighbors in adjacency.values_mut() {
            neighbors.sort();
            neighbors.dedup();
        }
        adjacency
    }
}

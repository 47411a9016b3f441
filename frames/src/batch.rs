use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::route::TransformPath;
use common::parallel::{par_map_indexed, try_par_map_indexed};

/// A labeled 3-D point. Immutable once ingested; transformation produces a
/// new point, never mutates in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub label: String,
    pub coords: DVec3,
}

impl Point {
    pub fn new(label: impl Into<String>, x: f64, y: f64, z: f64) -> Point {
        Point {
            label: label.into(),
            coords: DVec3::new(x, y, z),
        }
    }
}

/// Ordered point table; output row i corresponds to input row i.
pub type PointTable = Vec<Point>;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchError {
    #[error("Non-finite coordinate in row {row} (label \"{label}\")")]
    InvalidCoordinate { row: usize, label: String },
    #[error("Point in row {row} has an empty label")]
    EmptyLabel { row: usize },
}

/// Outcome for one input row: the transformed point, the per-axis delta
/// against the *original* input point, and the Euclidean displacement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformRow {
    pub original: Point,
    pub transformed: Point,
    pub delta: DVec3,
    pub displacement: f64,
}

pub type RowResult = Result<TransformRow, BatchError>;

/// Per-row result union over an entire table, plus the path that produced
/// it for audit and reporting. Rows that failed validation do not discard
/// rows that transformed fine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub path: TransformPath,
    pub rows: Vec<RowResult>,
}

impl BatchResult {
    pub fn ok_rows(&self) -> impl Iterator<Item = &TransformRow> {
        self.rows.iter().filter_map(|row| row.as_ref().ok())
    }

    pub fn failed_rows(&self) -> impl Iterator<Item = &BatchError> {
        self.rows.iter().filter_map(|row| row.as_ref().err())
    }
}

fn transform_point(path: &TransformPath, row: usize, point: &Point) -> RowResult {
    if point.label.is_empty() {
        return Err(BatchError::EmptyLabel { row });
    }
    if !point.coords.is_finite() {
        return Err(BatchError::InvalidCoordinate {
            row,
            label: point.label.clone(),
        });
    }

    // an identity path falls through untouched, so input bits survive exactly
    let mut coords = point.coords;
    for step in path.steps.iter() {
        coords = step.apply(coords);
    }

    let delta = coords - point.coords;
    Ok(TransformRow {
        original: point.clone(),
        transformed: Point {
            label: point.label.clone(),
            coords,
        },
        delta,
        displacement: delta.length(),
    })
}

/// Applies every step of `path` to every point, fail-fast: the first invalid
/// row aborts the batch. Row order and labels are preserved verbatim; an
/// empty table yields an empty result.
pub fn transform_table(
    path: &TransformPath,
    table: &[Point],
) -> Result<Vec<TransformRow>, BatchError> {
    try_par_map_indexed(table, |row, point| transform_point(path, row, point))
}

/// Like [`transform_table`], but returns a per-row result union so callers
/// can keep successfully transformed rows alongside per-row failures.
pub fn transform_rows(path: &TransformPath, table: &[Point]) -> BatchResult {
    BatchResult {
        path: path.clone(),
        rows: par_map_indexed(table, |row, point| transform_point(path, row, point)),
    }
}

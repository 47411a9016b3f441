//! Pure formatting over batch results: aggregate displacement figures,
//! per-axis coordinate statistics and a Markdown rendering. No I/O here.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::batch::{BatchResult, TransformRow};

/// Per-axis statistics over the transformed coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisStats {
    pub mean: DVec3,
    pub median: DVec3,
    pub std: DVec3,
    pub min: DVec3,
    pub max: DVec3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub path: String,
    pub total_points: usize,
    pub transformed_points: usize,
    pub failed_points: usize,
    pub displacement_mean: f64,
    pub displacement_max: f64,
    pub coordinate_stats: Option<AxisStats>,
}

pub fn summarize(result: &BatchResult) -> Summary {
    let rows: Vec<&TransformRow> = result.ok_rows().collect();

    let displacement_mean = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|row| row.displacement).sum::<f64>() / rows.len() as f64
    };
    let displacement_max = rows
        .iter()
        .map(|row| row.displacement)
        .fold(0.0, f64::max);

    Summary {
        path: result.path.describe(),
        total_points: result.rows.len(),
        transformed_points: rows.len(),
        failed_points: result.rows.len() - rows.len(),
        displacement_mean,
        displacement_max,
        coordinate_stats: coordinate_stats(&rows),
    }
}

/// Mean, median, sample standard deviation, min and max for each axis of
/// the transformed coordinates. None when no rows transformed.
pub fn coordinate_stats(rows: &[&TransformRow]) -> Option<AxisStats> {
    if rows.is_empty() {
        return None;
    }

    let xs: Vec<f64> = rows.iter().map(|row| row.transformed.coords.x).collect();
    let ys: Vec<f64> = rows.iter().map(|row| row.transformed.coords.y).collect();
    let zs: Vec<f64> = rows.iter().map(|row| row.transformed.coords.z).collect();

    Some(AxisStats {
        mean: DVec3::new(mean(&xs), mean(&ys), mean(&zs)),
        median: DVec3::new(median(&xs), median(&ys), median(&zs)),
        std: DVec3::new(std_dev(&xs), std_dev(&ys), std_dev(&zs)),
        min: DVec3::new(min(&xs), min(&ys), min(&zs)),
        max: DVec3::new(max(&xs), max(&ys), max(&zs)),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n - 1 denominator); zero for a single value.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Renders the full report as Markdown: summary header, coordinate
/// statistics table and the per-point table with failed rows inline.
pub fn render_markdown(result: &BatchResult) -> String {
    let summary = summarize(result);

    let mut report = String::new();
    report.push_str("# Coordinate transformation report\n\n");
    report.push_str(&format!("**Path:** {}\n", summary.path));
    report.push_str(&format!(
        "**Points:** {} ({} transformed, {} failed)\n",
        summary.total_points, summary.transformed_points, summary.failed_points
    ));
    report.push_str(&format!(
        "**Mean displacement:** {:.4} m\n",
        summary.displacement_mean
    ));
    report.push_str(&format!(
        "**Max displacement:** {:.4} m\n\n",
        summary.displacement_max
    ));

    if let Some(stats) = &summary.coordinate_stats {
        report.push_str("## Coordinate statistics\n\n");
        report.push_str("| Metric | X | Y | Z |\n");
        report.push_str("|--------|---|---|---|\n");
        for (name, value) in [
            ("Mean", stats.mean),
            ("Median", stats.median),
            ("Std deviation", stats.std),
            ("Minimum", stats.min),
            ("Maximum", stats.max),
        ] {
            report.push_str(&format!(
                "| {} | {:.4} | {:.4} | {:.4} |\n",
                name, value.x, value.y, value.z
            ));
        }
        report.push('\n');
    }

    report.push_str("## Points\n\n");
    report.push_str("| Label | X | Y | Z | X' | Y' | Z' | dX | dY | dZ | Displacement |\n");
    report.push_str("|-------|---|---|---|----|----|----|----|----|----|--------------|\n");
    for row in result.rows.iter() {
        match row {
            Ok(row) => {
                let o = row.original.coords;
                let t = row.transformed.coords;
                let d = row.delta;
                report.push_str(&format!(
                    "| {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |\n",
                    row.original.label, o.x, o.y, o.z, t.x, t.y, t.z, d.x, d.y, d.z, row.displacement
                ));
            }
            Err(error) => {
                report.push_str(&format!("| (failed) | {error} ||||||||||\n"));
            }
        }
    }

    report
}

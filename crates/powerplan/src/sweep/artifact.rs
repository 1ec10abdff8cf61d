//! Sweep artifact export: a CSV table and an SVG graph per leaf.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;

use crate::design::Leaf;
use crate::engine::SweepPoint;
use crate::error::{PowerError, Result};

/// Files written for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Artifacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<PathBuf>,
}

impl Artifacts {
    /// All written paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.table.iter().chain(self.graph.iter()).map(PathBuf::as_path)
    }
}

/// Writes sweep artifacts into a fixed output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    table: bool,
    graph: bool,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            table: true,
            graph: true,
        }
    }

    pub fn with_table(mut self, enabled: bool) -> Self {
        self.table = enabled;
        self
    }

    pub fn with_graph(mut self, enabled: bool) -> Self {
        self.graph = enabled;
        self
    }

    /// Path an artifact of `leaf` would be written to.
    pub fn path_for(&self, leaf: Leaf, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", leaf.artifact_stem(), extension))
    }

    /// Write the enabled artifacts for `series`.
    pub fn export(&self, leaf: Leaf, series: &[SweepPoint]) -> Result<Artifacts> {
        let mut artifacts = Artifacts::default();

        if self.table {
            let path = self.path_for(leaf, "csv");
            write_table(&path, leaf, series)?;
            artifacts.table = Some(path);
        }

        if self.graph {
            let path = self.path_for(leaf, "svg");
            draw_graph(&path, leaf, series)?;
            artifacts.graph = Some(path);
        }

        Ok(artifacts)
    }
}

fn write_table(path: &Path, leaf: Leaf, series: &[SweepPoint]) -> Result<()> {
    let axis = leaf.spec().axis;
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([axis.label(), axis.value_label()])?;
    for point in series {
        writer.write_record([point.axis_value.to_string(), point.value.to_string()])?;
    }
    writer.flush().map_err(|source| PowerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn draw_graph(path: &Path, leaf: Leaf, series: &[SweepPoint]) -> Result<()> {
    let axis = leaf.spec().axis;
    let fail = |err: &dyn Display| PowerError::Render {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let (x_min, x_max) = padded_bounds(series.iter().map(|p| p.axis_value));
    let (y_min, y_max) = padded_bounds(series.iter().map(|p| p.value));

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| fail(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(leaf.title(), ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| fail(&e))?;

    chart
        .configure_mesh()
        .x_desc(axis.label())
        .y_desc(axis.value_label())
        .draw()
        .map_err(|e| fail(&e))?;

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|p| (p.axis_value, p.value)),
            &BLUE,
        ))
        .map_err(|e| fail(&e))?;

    chart
        .draw_series(
            series
                .iter()
                .map(|p| Circle::new((p.axis_value, p.value), 3, BLUE.filled())),
        )
        .map_err(|e| fail(&e))?;

    root.present().map_err(|e| fail(&e))?;
    Ok(())
}

/// Min/max with a 5% margin; a flat series gets a unit margin.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - pad, max + pad)
}

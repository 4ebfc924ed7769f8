//! CSV persistence for cleaned series

use std::path::Path;

use anyhow::{Context, Result};

use crate::series::NamedSeries;

/// Write a series as a two-column CSV with a `Date,<series name>` header.
pub fn write_series(path: &Path, series: &NamedSeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["Date", series.name()])?;
    for point in series.points() {
        writer.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            point.value.to_string(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

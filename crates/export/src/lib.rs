//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod record {
    use std::io::{self, Write};
    use std::path::Path;

    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use super::writer_for_path;

    /// Write any serialisable record as pretty-printed JSON followed by a newline.
    pub fn write_json<T: Serialize>(path: &Path, record: &T) -> io::Result<()> {
        let mut writer = writer_for_path(path)?;
        to_writer_pretty(&mut writer, record)?;
        writeln!(writer)?;
        writer.flush()
    }
}

pub mod points {
    use std::io;
    use std::path::Path;

    use lunar_core::Vector3;
    use serde::Serialize;

    use super::writer_for_path;

    /// CSV row emitted by the trajectory point exporter.
    #[derive(Debug, Clone, Copy, Serialize)]
    struct Row {
        index: usize,
        x_km: f64,
        y_km: f64,
        z_km: f64,
    }

    /// Write trajectory points with the header `index,x_km,y_km,z_km`.
    pub fn write_csv(path: &Path, points: &[Vector3]) -> io::Result<()> {
        let mut writer = csv::Writer::from_writer(writer_for_path(path)?);
        for (index, point) in points.iter().enumerate() {
            writer.serialize(Row {
                index,
                x_km: point.x,
                y_km: point.y,
                z_km: point.z,
            })?;
        }
        writer.flush()
    }
}

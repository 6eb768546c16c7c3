//! Tabular export of a trajectory bundle.
//!
//! Samples a bundle on a fixed time grid and writes four aligned CSV tables:
//! the reference state, the control input, the flattened gain schedule, and
//! the feed-forward offset schedule. Row `k` of every table corresponds to
//! the same sample time, which is the invariant downstream tooling relies on.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::Writer;
use log::info;
use thiserror::Error;
use trajectories::bundle::TrajectoryBundle;

/// Errors that can occur during an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("sample step must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("export target already exists: {0}")]
    FileExists(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// What an export produced: the shared row count and the four files written,
/// in state/control/gains/offsets order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    pub files: [PathBuf; 4],
}

type WriterToFile = Writer<BufWriter<File>>;

fn table_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(format!("-{suffix}.csv"));
    PathBuf::from(name)
}

/// The sample grid `t_k = k * dt` for `k = 0, 1, ...` while `t_k <= end`.
///
/// Known limitation kept for compatibility with the original tables: unless
/// `dt` divides the trajectory duration exactly, the final sample falls
/// strictly short of the end time rather than landing on it.
fn sample_grid(end: f64, dt: f64) -> Vec<f64> {
    let mut times = Vec::new();
    let mut k = 0usize;
    loop {
        let t = k as f64 * dt;
        if t > end {
            break;
        }
        times.push(t);
        k += 1;
    }
    times
}

fn open_writer(path: &Path, headers: &[String]) -> Result<WriterToFile, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = Writer::from_writer(BufWriter::new(File::create(path)?));
    writer.write_record(headers)?;
    Ok(writer)
}

fn write_table(
    path: &Path,
    headers: &[String],
    times: &[f64],
    mut row: impl FnMut(f64) -> Vec<f64>,
) -> Result<(), ExportError> {
    let mut writer = open_writer(path, headers)?;
    for &t in times {
        let mut record = Vec::with_capacity(headers.len());
        record.push(t.to_string());
        record.extend(row(t).iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("wrote {} rows to {}", times.len(), path.display());
    Ok(())
}

fn state_headers(bundle: &TrajectoryBundle) -> Vec<String> {
    let mut headers = vec!["t".to_string()];
    headers.extend(bundle.frame().state_labels().iter().map(|s| s.to_string()));
    headers
}

fn control_headers(control_dim: usize) -> Vec<String> {
    let mut headers = vec!["t".to_string()];
    headers.extend((0..control_dim).map(|i| format!("u{i}")));
    headers
}

fn gain_headers(control_dim: usize) -> Vec<String> {
    let mut headers = vec!["t".to_string()];
    for i in 0..control_dim {
        for j in 0..12 {
            headers.push(format!("k{i}_{j}"));
        }
    }
    headers
}

fn offset_headers(control_dim: usize) -> Vec<String> {
    let mut headers = vec!["t".to_string()];
    headers.extend((0..control_dim).map(|i| format!("u{i}_ff")));
    headers
}

/// Samples the bundle every `dt` seconds and writes the four tables
/// `<prefix>-x.csv`, `<prefix>-u.csv`, `<prefix>-controller.csv`, and
/// `<prefix>-affine.csv`.
///
/// With `overwrite` unset, all four target paths are checked before anything
/// is created; a collision fails the whole export without touching any file.
/// Concurrent exports against the same prefix are not guarded against: the
/// existence check and the writes are separate filesystem operations, so
/// callers must serialize them.
pub fn export_tables(
    bundle: &TrajectoryBundle,
    prefix: &Path,
    dt: f64,
    overwrite: bool,
) -> Result<ExportSummary, ExportError> {
    if dt <= 0.0 {
        return Err(ExportError::NonPositiveStep(dt));
    }

    let files = [
        table_path(prefix, "x"),
        table_path(prefix, "u"),
        table_path(prefix, "controller"),
        table_path(prefix, "affine"),
    ];
    if !overwrite {
        if let Some(existing) = files.iter().find(|path| path.exists()) {
            return Err(ExportError::FileExists(existing.clone()));
        }
    }

    let times = sample_grid(bundle.end_time(), dt);
    let control_dim = bundle.controller().control_dim();

    write_table(&files[0], &state_headers(bundle), &times, |t| {
        bundle.state().evaluate(t).as_slice().to_vec()
    })?;
    write_table(&files[1], &control_headers(control_dim), &times, |t| {
        bundle.control().evaluate(t).as_slice().to_vec()
    })?;
    write_table(&files[2], &gain_headers(control_dim), &times, |t| {
        let gains = bundle.controller().gains().evaluate(t);
        // row-major flattening: all 12 state columns of output 0, then output 1, ...
        (0..gains.nrows())
            .flat_map(|i| (0..gains.ncols()).map(move |j| (i, j)))
            .map(|(i, j)| gains[(i, j)])
            .collect()
    })?;
    write_table(&files[3], &offset_headers(control_dim), &times, |t| {
        bundle.controller().offsets().evaluate(t).as_slice().to_vec()
    })?;

    Ok(ExportSummary { rows: times.len(), files })
}

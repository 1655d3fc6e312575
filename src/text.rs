//! Read spectra and label tables from CSV files, and write feature tables
//! back out.
//!
//! A spectrum file is a header row followed by exactly two columns, m/z
//! then intensity. Files are matched to samples by name: the file stem is
//! the sample identifier.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use thiserror::Error;

use crate::spectrum::Spectrum;
use crate::table::{FeatureTable, JoinedTable, LabelRow, LabelTable, TableError};

/// All the ways reading spectra or labels can fail. Any error aborts the
/// run; there is no per-file recovery.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("{count} columns detected for {id}, only m/z and intensity values are valid columns")]
    ColumnCount { id: String, count: usize },
    #[error("invalid number in {id} on line {line}")]
    InvalidNumber {
        id: String,
        line: usize,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The sample identifier for a file path: its name without the extension.
pub fn sample_id(path: &Path) -> String {
    path.file_stem().unwrap_or_default().to_string_lossy().into_owned()
}

/// Read one sample's spectrum from a two-column CSV file.
pub fn spectrum_from_path<P: AsRef<Path>>(path: P) -> Result<Spectrum, ReadError> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    spectrum_from_reader(sample_id(path), io::BufReader::new(file))
}

/// Read a spectrum from any CSV source, labeling it with `id`.
///
/// The header row must have exactly two fields; any other count raises
/// [`ReadError::ColumnCount`] naming the sample and the count detected.
pub fn spectrum_from_reader<R: io::Read>(
    id: impl Into<String>,
    reader: R,
) -> Result<Spectrum, ReadError> {
    let id = id.into();
    let mut reader = csv::Reader::from_reader(reader);

    let count = reader.headers()?.len();
    if count != 2 {
        return Err(ReadError::ColumnCount { id, count });
    }

    let mut spectrum = Spectrum::empty(id);
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // line 1 is the header
        let line = i + 2;
        let mz: f64 = record[0].trim().parse().map_err(|source| ReadError::InvalidNumber {
            id: spectrum.id.clone(),
            line,
            source,
        })?;
        let intensity: f32 = record[1].trim().parse().map_err(|source| ReadError::InvalidNumber {
            id: spectrum.id.clone(),
            line,
            source,
        })?;
        spectrum.push(mz, intensity);
    }
    Ok(spectrum)
}

/// List the `.csv` files directly under `dir` in lexicographic order.
///
/// Other entries are ignored, so spectra directories can carry stray files
/// without breaking a run.
pub fn csv_paths_sorted<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Read every spectrum CSV in `dir`, in lexicographic file order.
pub fn spectra_from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Spectrum>, ReadError> {
    let paths = csv_paths_sorted(dir)?;
    let mut spectra = Vec::with_capacity(paths.len());
    for path in paths {
        debug!("reading spectrum from {}", path.display());
        spectra.push(spectrum_from_path(&path)?);
    }
    Ok(spectra)
}

/// Read a directory of per-sample label CSVs into a [`LabelTable`].
///
/// Each file holds a header row and one data row of arbitrary label
/// columns. The first file read fixes the column set; a later file with
/// different columns fails the run.
pub fn labels_from_dir<P: AsRef<Path>>(dir: P) -> Result<LabelTable, ReadError> {
    let paths = csv_paths_sorted(dir)?;
    let mut table: Option<LabelTable> = None;
    for path in paths {
        let id = sample_id(&path);
        debug!("reading labels from {}", path.display());
        let mut reader = csv::Reader::from_path(&path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        let table = table.get_or_insert_with(|| LabelTable::new(columns.clone()));
        if table.columns != columns {
            return Err(TableError::LabelColumnMismatch { id }.into());
        }

        let fields = match reader.records().next() {
            Some(record) => record?.iter().map(|s| s.to_string()).collect(),
            None => vec![String::new(); columns.len()],
        };
        table.push(LabelRow { id, fields })?;
    }
    Ok(table.unwrap_or_default())
}

/// Write a feature table as CSV: a header of window labels behind an empty
/// index cell, then one row per sample keyed by its identifier.
pub fn feature_table_to_writer<W: io::Write>(
    table: &FeatureTable,
    writer: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.window_labels.len() + 1);
    header.push("");
    header.extend(table.window_labels.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(row.id.clone());
        record.extend(row.intensities.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn feature_table_to_path<P: AsRef<Path>>(
    table: &FeatureTable,
    path: P,
) -> Result<(), csv::Error> {
    let file = fs::File::create(path)?;
    feature_table_to_writer(table, io::BufWriter::new(file))
}

/// Write a joined table as CSV: feature columns first, label columns after.
/// Samples that matched no label row get empty label cells.
pub fn joined_table_to_writer<W: io::Write>(
    table: &JoinedTable,
    writer: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.window_labels.len() + table.label_columns.len() + 1);
    header.push("");
    header.extend(table.window_labels.iter().map(String::as_str));
    header.extend(table.label_columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.id.clone());
        record.extend(row.intensities.iter().map(|v| v.to_string()));
        match &row.labels {
            Some(fields) => record.extend(fields.iter().cloned()),
            None => record.extend(std::iter::repeat(String::new()).take(table.label_columns.len())),
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn joined_table_to_path<P: AsRef<Path>>(
    table: &JoinedTable,
    path: P,
) -> Result<(), csv::Error> {
    let file = fs::File::create(path)?;
    joined_table_to_writer(table, io::BufWriter::new(file))
}

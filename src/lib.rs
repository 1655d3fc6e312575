//! `mzbin` is a library for turning MALDI-TOF mass spectra into fixed-width
//! feature vectors by summing intensity over a grid of m/z windows, the
//! common preprocessing step ahead of training antibiotic resistance
//! classifiers on bacterial spectra.
//!
//! The [`SpectrumBinner`] applies a [`WindowGrid`] of half-open
//! `[start, start + width)` intervals to a [`Spectrum`], producing one
//! [`FeatureRow`](crate::binner::FeatureRow) per sample. Rows are gathered
//! into a [`FeatureTable`](crate::table::FeatureTable) and optionally
//! left-joined with per-sample antibiotic labels. The [`crate::text`]
//! module reads and writes all of these as CSV.
//!
//! # Usage
//! ```
//! use mzbin::{Spectrum, SpectrumBinner};
//!
//! let mut spectrum = Spectrum::empty("sample_a");
//! spectrum.push(2000.4, 13.5);
//! spectrum.push(2001.9, 2.25);
//! spectrum.push(7500.0, 7.0);
//!
//! // 3 Da windows over 1-10 kDa
//! let binner = SpectrumBinner::maldi();
//! let row = binner.bin(&spectrum);
//! assert_eq!(row.len(), 3000);
//! assert_eq!(row.intensities.iter().filter(|i| **i > 0.0).count(), 2);
//! ```
pub mod binner;
pub mod spectrum;
pub mod table;
pub mod text;

pub use crate::binner::{FeatureRow, SpectrumBinner, WindowGrid};
pub use crate::spectrum::{Spectrum, SpectrumError};
pub use crate::table::{FeatureTable, JoinedTable, LabelRow, LabelTable, TableError};
pub use crate::text::ReadError;

//! Bin a spectrum onto a fixed sequence of m/z windows, summing the
//! intensity that falls inside each window.
//!
//! Windows are half-open `[start, start + width)` intervals tiling the
//! configured m/z range, so every mass belongs to at most one window and a
//! mass sitting exactly on a boundary belongs to the window it starts.

use log::debug;

use num_traits::{Float, ToPrimitive};

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::spectrum::Spectrum;

/// The lower edge of the default MALDI-TOF window grid, in daltons.
pub const MALDI_MZ_START: f64 = 1000.0;
/// The upper edge of the default MALDI-TOF window grid, in daltons.
pub const MALDI_MZ_END: f64 = 10000.0;
/// The default window width, in daltons.
pub const MALDI_WINDOW_WIDTH: f64 = 3.0;

/// Generate an evenly spaced sequence of values over `[start, end)` with
/// spacing `step`. An inverted or degenerate range produces an empty grid.
pub fn gridspace<T: Float + ToPrimitive>(start: T, end: T, step: T) -> Vec<T> {
    let steps = ((end - start) / step).to_usize().unwrap_or_default();
    (0..steps)
        .map(|i| start + T::from(i).unwrap() * step)
        .collect()
}

/// A fixed sequence of half-open `[start, start + width)` windows tiling an
/// m/z range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowGrid {
    /// The lowest m/z covered by any window. Masses below this are ignored.
    pub mz_start: f64,
    /// The m/z at which coverage stops. Masses at or above this are ignored.
    pub mz_end: f64,
    /// The width of each window
    pub width: f64,
    starts: Vec<f64>,
}

impl WindowGrid {
    pub fn new(mz_start: f64, mz_end: f64, width: f64) -> Self {
        Self {
            starts: gridspace(mz_start, mz_end, width),
            mz_start,
            mz_end,
            width,
        }
    }

    /// The conventional MALDI-TOF grid, 3 Da windows spanning 1-10 kDa,
    /// 3000 windows in all.
    pub fn maldi() -> Self {
        Self::new(MALDI_MZ_START, MALDI_MZ_END, MALDI_WINDOW_WIDTH)
    }

    /// The number of windows in the grid
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// The lower edge of every window, in ascending order
    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    /// The `[start, end)` interval of the `index`-th window
    pub fn window_at(&self, index: usize) -> Option<(f64, f64)> {
        self.starts
            .get(index)
            .map(|start| (*start, *start + self.width))
    }

    /// The window's range label, e.g. `"1000-1003"`
    pub fn label_at(&self, index: usize) -> Option<String> {
        self.window_at(index)
            .map(|(start, end)| format!("{}-{}", start, end))
    }

    /// Range labels for every window, in window order
    pub fn labels(&self) -> Vec<String> {
        self.starts
            .iter()
            .map(|start| format!("{}-{}", start, start + self.width))
            .collect()
    }

    /// Find the window whose half-open interval contains `mz`, if any.
    ///
    /// When `width` does not evenly divide the range, the last window
    /// absorbs the remainder, so it covers masses up to `mz_end`.
    pub fn index_of(&self, mz: f64) -> Option<usize> {
        if self.starts.is_empty() || !(self.mz_start..self.mz_end).contains(&mz) {
            return None;
        }
        let i = ((mz - self.mz_start) / self.width).floor() as usize;
        Some(i.min(self.starts.len() - 1))
    }
}

impl Default for WindowGrid {
    fn default() -> Self {
        Self::maldi()
    }
}

/// One sample's windowed intensity sums, one value per window of the grid
/// that produced it.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureRow {
    /// The sample identifier carried over from the source [`Spectrum`]
    pub id: String,
    /// The summed intensity per window, in window order
    pub intensities: Vec<f32>,
}

impl FeatureRow {
    pub fn new(id: impl Into<String>, intensities: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            intensities,
        }
    }

    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }
}

/// Sums spectrum intensities over a shared [`WindowGrid`].
///
/// Binning is a pure transform. The row produced for a spectrum always has
/// exactly one value per window, no matter how many measurements the
/// spectrum holds; an empty spectrum produces an all-zero row.
#[derive(Debug, Default, Clone)]
pub struct SpectrumBinner {
    pub grid: WindowGrid,
}

impl SpectrumBinner {
    pub fn new(grid: WindowGrid) -> Self {
        Self { grid }
    }

    /// A binner over the conventional MALDI-TOF grid, see [`WindowGrid::maldi`].
    pub fn maldi() -> Self {
        Self::new(WindowGrid::maldi())
    }

    /// Bin a single spectrum into its feature row.
    ///
    /// Masses outside the grid's range contribute nothing. The sum over a
    /// window with no matching measurements is `0.0`.
    pub fn bin(&self, spectrum: &Spectrum) -> FeatureRow {
        let mut intensities = vec![0.0f32; self.grid.len()];
        for (mz, intensity) in spectrum.iter() {
            if let Some(i) = self.grid.index_of(mz) {
                intensities[i] += intensity;
            }
        }
        FeatureRow::new(spectrum.id.clone(), intensities)
    }

    /// Bin a batch of spectra, one row per spectrum in input order.
    ///
    /// Each spectrum is independent, so with the `parallelism` feature the
    /// batch fans out across threads.
    pub fn bin_all(&self, spectra: &[Spectrum]) -> Vec<FeatureRow> {
        debug!(
            "binning {} spectra over {} windows",
            spectra.len(),
            self.grid.len()
        );
        bin_all_inner(self, spectra)
    }
}

// Can't inline cfg-if
cfg_if::cfg_if! {
    if #[cfg(feature = "parallelism")] {
        fn bin_all_inner(binner: &SpectrumBinner, spectra: &[Spectrum]) -> Vec<FeatureRow> {
            spectra.par_iter().map(|s| binner.bin(s)).collect()
        }
    } else {
        fn bin_all_inner(binner: &SpectrumBinner, spectra: &[Spectrum]) -> Vec<FeatureRow> {
            spectra.iter().map(|s| binner.bin(s)).collect()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_maldi_grid_shape() {
        let grid = WindowGrid::maldi();
        assert_eq!(grid.len(), 3000);
        assert_eq!(grid.label_at(0).unwrap(), "1000-1003");
        assert_eq!(grid.label_at(2999).unwrap(), "9997-10000");
        assert_eq!(grid.labels().len(), 3000);
        assert_eq!(grid.window_at(1).unwrap(), (1003.0, 1006.0));
    }

    #[test]
    fn test_fractional_width_labels() {
        let grid = WindowGrid::new(1000.0, 1002.0, 0.5);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.label_at(0).unwrap(), "1000-1000.5");
        assert_eq!(grid.label_at(3).unwrap(), "1001.5-1002");
    }

    #[rstest]
    #[case(1000.0, Some(0))]
    #[case(1002.999, Some(0))]
    #[case(1003.0, Some(1))]
    #[case(5000.5, Some(1333))]
    #[case(9997.0, Some(2999))]
    #[case(9999.9, Some(2999))]
    #[case(999.999, None)]
    #[case(10000.0, None)]
    #[case(f64::NAN, None)]
    fn test_index_of(#[case] mz: f64, #[case] expected: Option<usize>) {
        let grid = WindowGrid::maldi();
        assert_eq!(grid.index_of(mz), expected);
    }

    #[test]
    fn test_gridspace_degenerate_ranges() {
        assert!(gridspace(1000.0, 1000.0, 3.0).is_empty());
        assert!(gridspace(1000.0, 900.0, 3.0).is_empty());
        assert_eq!(gridspace(0.0f32, 10.0, 2.5), vec![0.0, 2.5, 5.0, 7.5]);
    }

    #[test]
    fn test_bin_empty_spectrum_is_all_zero() {
        let binner = SpectrumBinner::maldi();
        let row = binner.bin(&Spectrum::empty("blank"));
        assert_eq!(row.len(), 3000);
        assert!(row.intensities.iter().all(|i| *i == 0.0));
        assert_eq!(row.id, "blank");
    }

    #[test]
    fn test_bin_sums_window_members() {
        let binner = SpectrumBinner::maldi();
        let spectrum: Spectrum = vec![
            (1000.0, 1.0f32),
            (1001.5, 2.0),
            (1002.999, 4.0),
            (1003.0, 8.0),
            (999.9, 100.0),
            (10000.0, 100.0),
            (12000.0, 100.0),
        ]
        .into_iter()
        .collect();

        let row = binner.bin(&spectrum);
        assert_eq!(row.len(), 3000);
        assert_eq!(row.intensities[0], 7.0);
        assert_eq!(row.intensities[1], 8.0);
        assert_eq!(row.intensities.iter().sum::<f32>(), 15.0);
    }

    #[test]
    fn test_bin_ignores_input_order() {
        let binner = SpectrumBinner::maldi();
        let forward: Spectrum = vec![(2500.0, 1.0f32), (1500.0, 2.0), (2500.5, 3.0)]
            .into_iter()
            .collect();
        let backward: Spectrum = vec![(2500.5, 3.0f32), (2500.0, 1.0), (1500.0, 2.0)]
            .into_iter()
            .collect();
        assert_eq!(binner.bin(&forward).intensities, binner.bin(&backward).intensities);
    }

    #[test]
    fn test_bin_is_idempotent() {
        let binner = SpectrumBinner::maldi();
        let spectrum: Spectrum = (0..500)
            .map(|i| (1000.0 + i as f64 * 17.93, (i % 13) as f32))
            .collect();
        assert_eq!(binner.bin(&spectrum), binner.bin(&spectrum));
    }

    #[test]
    fn test_bin_all_matches_single_bins() {
        let binner = SpectrumBinner::maldi();
        let spectra: Vec<Spectrum> = (0..4)
            .map(|k| {
                let mut sp = Spectrum::empty(format!("sample_{}", k));
                for i in 0..200 {
                    sp.push(1000.0 + (i * (k + 1)) as f64 * 3.7, i as f32);
                }
                sp
            })
            .collect();

        let rows = binner.bin_all(&spectra);
        assert_eq!(rows.len(), spectra.len());
        for (row, sp) in rows.iter().zip(spectra.iter()) {
            assert_eq!(*row, binner.bin(sp));
        }
    }

    #[test]
    fn test_nan_intensity_propagates() {
        let binner = SpectrumBinner::maldi();
        let spectrum: Spectrum = vec![(1500.0, f32::NAN), (1500.5, 3.0)].into_iter().collect();
        let row = binner.bin(&spectrum);
        let i = binner.grid.index_of(1500.0).unwrap();
        assert!(row.intensities[i].is_nan());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_feature_row_serde() {
        let row = FeatureRow::new("sample_a", vec![0.0, 1.5, 3.0]);
        let text = serde_json::to_string(&row).unwrap();
        let dup: FeatureRow = serde_json::from_str(&text).unwrap();
        assert_eq!(row, dup);
    }
}

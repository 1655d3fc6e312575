//! A single sample's mass spectrum as paired m/z and intensity arrays.

use mzpeaks::{CoordinateLike, IntensityMeasurement, MZ};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use thiserror::Error;

/// The ways constructing a [`Spectrum`] can fail
#[derive(Debug, Clone, Error)]
pub enum SpectrumError {
    #[error("The m/z and intensity arrays do not match in length")]
    MZIntensityMismatch,
}

/// One sample's list of (m/z, intensity) measurements, stored as parallel
/// arrays, with the sample's identifier.
///
/// The m/z values need not be sorted or unique. The identifier is
/// conventionally the source file name without its extension.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spectrum {
    /// The sample identifier
    pub id: String,
    /// The m/z coordinate of each measurement
    pub mz_array: Vec<f64>,
    /// The measured intensity at each m/z coordinate
    pub intensity_array: Vec<f32>,
}

impl Spectrum {
    /// Wrap a pair of parallel arrays, failing if their lengths differ.
    pub fn new(
        id: impl Into<String>,
        mz_array: Vec<f64>,
        intensity_array: Vec<f32>,
    ) -> Result<Self, SpectrumError> {
        if mz_array.len() != intensity_array.len() {
            return Err(SpectrumError::MZIntensityMismatch);
        }
        Ok(Self {
            id: id.into(),
            mz_array,
            intensity_array,
        })
    }

    /// Create an empty spectrum with the given identifier.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Copy the coordinates of a slice of peak-like entries into a new spectrum.
    pub fn from_peaks<P: CoordinateLike<MZ> + IntensityMeasurement>(
        id: impl Into<String>,
        peaks: &[P],
    ) -> Self {
        let mut inst = Self::empty(id);
        for peak in peaks {
            inst.push(peak.coordinate(), peak.intensity());
        }
        inst
    }

    pub fn push(&mut self, mz: f64, intensity: f32) {
        self.mz_array.push(mz);
        self.intensity_array.push(intensity);
    }

    pub fn len(&self) -> usize {
        self.mz_array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz_array.is_empty()
    }

    /// Iterate over the (m/z, intensity) pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        self.mz_array
            .iter()
            .copied()
            .zip(self.intensity_array.iter().copied())
    }
}

impl FromIterator<(f64, f32)> for Spectrum {
    fn from_iter<T: IntoIterator<Item = (f64, f32)>>(iter: T) -> Self {
        let mut inst = Self::default();
        for (mz, intensity) in iter {
            inst.push(mz, intensity);
        }
        inst
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mzpeaks::CentroidPeak;

    #[test]
    fn test_new_checks_lengths() {
        let err = Spectrum::new("sample_a", vec![1000.0, 1001.0], vec![5.0]);
        assert!(matches!(err, Err(SpectrumError::MZIntensityMismatch)));

        let sp = Spectrum::new("sample_a", vec![1000.0, 1001.0], vec![5.0, 2.5]).unwrap();
        assert_eq!(sp.len(), 2);
        assert_eq!(sp.id, "sample_a");
    }

    #[test]
    fn test_from_peaks() {
        let peaks = vec![
            CentroidPeak::new(1500.0, 6e3, 0),
            CentroidPeak::new(1650.25, 2e3, 1),
        ];
        let sp = Spectrum::from_peaks("sample_a", &peaks);
        assert_eq!(sp.len(), 2);
        assert_eq!(sp.mz_array, vec![1500.0, 1650.25]);
        assert_eq!(sp.intensity_array, vec![6e3, 2e3]);
    }

    #[test]
    fn test_iter_pairs() {
        let sp: Spectrum = vec![(1000.0, 1.0f32), (1003.5, 2.0)].into_iter().collect();
        let pairs: Vec<_> = sp.iter().collect();
        assert_eq!(pairs, vec![(1000.0, 1.0), (1003.5, 2.0)]);
    }
}

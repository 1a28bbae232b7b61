//! Feature scaling

use crate::{Error, Result};

/// Per-column z-score scaler
///
/// Fits column means and standard deviations over a flattened row-major
/// feature matrix; transform maps each value to `(x - mean) / std`.
/// Zero-variance columns are centered but not divided.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Vec<f32>,
    stds: Vec<f32>,
}

impl StandardScaler {
    /// Fit a scaler over `rows × n_features` data
    pub fn fit(features: &[f32], n_features: usize) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::EmptyBatch);
        }
        if n_features == 0 || features.len() % n_features != 0 {
            return Err(Error::ShapeMismatch {
                expected: vec![n_features],
                got: vec![features.len()],
            });
        }

        let rows = features.len() / n_features;
        let mut means = vec![0.0; n_features];
        let mut stds = vec![0.0; n_features];

        for row in 0..rows {
            for col in 0..n_features {
                means[col] += features[row * n_features + col];
            }
        }
        for mean in &mut means {
            *mean /= rows as f32;
        }

        for row in 0..rows {
            for col in 0..n_features {
                let centered = features[row * n_features + col] - means[col];
                stds[col] += centered * centered;
            }
        }
        for std in &mut stds {
            *std = (*std / rows as f32).sqrt();
        }

        Ok(Self { means, stds })
    }

    /// Apply the learned scaling
    pub fn transform(&self, features: &[f32]) -> Result<Vec<f32>> {
        let n_features = self.means.len();
        if features.len() % n_features != 0 {
            return Err(Error::ShapeMismatch {
                expected: vec![n_features],
                got: vec![features.len()],
            });
        }

        Ok(features
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let col = i % n_features;
                let centered = value - self.means[col];
                if self.stds[col] > 0.0 {
                    centered / self.stds[col]
                } else {
                    centered
                }
            })
            .collect())
    }

    /// Fit and transform in one step
    pub fn fit_transform(features: &[f32], n_features: usize) -> Result<Vec<f32>> {
        Self::fit(features, n_features)?.transform(features)
    }

    /// Learned column means
    pub fn means(&self) -> &[f32] {
        &self.means
    }

    /// Learned column standard deviations
    pub fn stds(&self) -> &[f32] {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fit_means_and_stds() {
        // Two columns: (1, 3) and (10, 14)
        let features = vec![1.0, 10.0, 3.0, 14.0];
        let scaler = StandardScaler::fit(&features, 2).unwrap();

        assert_abs_diff_eq!(scaler.means()[0], 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(scaler.means()[1], 12.0, epsilon = 1e-5);
        assert_abs_diff_eq!(scaler.stds()[0], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(scaler.stds()[1], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_transform_zero_mean_unit_variance() {
        let features = vec![1.0, 10.0, 3.0, 14.0];
        let scaled = StandardScaler::fit_transform(&features, 2).unwrap();

        assert_abs_diff_eq!(scaled[0], -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(scaled[1], -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(scaled[2], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(scaled[3], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_variance_column_centered() {
        let features = vec![5.0, 5.0, 5.0];
        let scaled = StandardScaler::fit_transform(&features, 1).unwrap();
        assert!(scaled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fit_empty() {
        assert!(matches!(
            StandardScaler::fit(&[], 2),
            Err(Error::EmptyBatch)
        ));
    }

    #[test]
    fn test_transform_shape_mismatch() {
        let scaler = StandardScaler::fit(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0, 2.0, 3.0]),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}

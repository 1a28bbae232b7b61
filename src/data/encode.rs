//! Label encoding and one-hot expansion

use crate::{Error, Result};

/// Maps raw labels to dense class indices
///
/// Classes are the sorted unique labels seen at fit time; transforming an
/// unseen label is an error.
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Create an unfitted encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the class set from raw labels
    pub fn fit(&mut self, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        self.classes = classes;
        Ok(())
    }

    /// Map labels to class indices
    pub fn transform(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| Error::UnknownLabel(label.clone()))
            })
            .collect()
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, labels: &[String]) -> Result<Vec<usize>> {
        self.fit(labels)?;
        self.transform(labels)
    }

    /// The learned classes in index order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of learned classes
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// Expand class indices into a flattened row-major one-hot matrix
pub fn one_hot(indices: &[usize], n_classes: usize) -> Result<Vec<f32>> {
    if n_classes == 0 {
        return Err(Error::InvalidParameter(
            "one-hot encoding needs at least one class".to_string(),
        ));
    }

    let mut encoded = vec![0.0; indices.len() * n_classes];
    for (row, &idx) in indices.iter().enumerate() {
        if idx >= n_classes {
            return Err(Error::InvalidParameter(format!(
                "class index {idx} out of range for {n_classes} classes"
            )));
        }
        encoded[row * n_classes + idx] = 1.0;
    }
    Ok(encoded)
}

//! Training batch

use crate::Tensor;

/// A pairing of input and target tensors, immutable for the run
///
/// Matrix-shaped inputs/targets are stored flattened row-major; the consuming
/// loss carries the column count.
#[derive(Clone)]
pub struct Batch {
    /// Input features
    pub inputs: Tensor,
    /// Target values
    pub targets: Tensor,
}

impl Batch {
    /// Create a new batch
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Self { inputs, targets }
    }

    /// Number of input elements
    pub fn size(&self) -> usize {
        self.inputs.len()
    }

    /// Whether the batch holds no samples
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

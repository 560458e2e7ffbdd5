use crate::common::*;

/// The record with image pixels and the fixed-capacity label tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord<I> {
    pub image: I,
    /// Boxes in `class cx cy w h` rows, zero padded to capacity.
    pub label: Array1<f32>,
}

//! Fixed-capacity label tensors.

use crate::common::*;
use label::{Label, LABEL_ROW_LEN};

/// Pack flattened label rows into a vector of `max_objects * 5` numbers.
///
/// Rows beyond `max_objects` are truncated. Fewer rows are placed at the
/// front and the rest is filled with zeros.
pub fn pack_labels(flat: &[f32], max_objects: usize) -> Array1<f32> {
    let capacity = max_objects * LABEL_ROW_LEN;
    let len = flat.len().min(capacity);
    let mut tensor = Array1::zeros(capacity);
    tensor
        .slice_mut(s![..len])
        .assign(&ArrayView1::from(&flat[..len]));
    tensor
}

/// Pack labels into a fixed-capacity tensor.
pub fn labels_to_tensor<'a>(
    labels: impl IntoIterator<Item = &'a Label>,
    max_objects: usize,
) -> Array1<f32> {
    pack_labels(&label::flatten_labels(labels), max_objects)
}

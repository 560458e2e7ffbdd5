use super::*;
use crate::common::*;

/// The dataset that can be random accessed.
pub trait RandomAccessDataset
where
    Self: Debug + Send,
{
    type Image;

    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth record in the dataset.
    fn nth(&mut self, index: usize) -> Result<DataRecord<Self::Image>>;
}

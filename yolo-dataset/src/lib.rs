//! Indexed sample loading for object detection training.

mod common;
pub mod config;
pub mod dataset;
pub mod label_tensor;
pub mod processor;
pub mod scheduler;
pub mod shape;

pub use config::{Config, DistortionConfig};
pub use dataset::{DataRecord, RandomAccessDataset, SampleIndex, SampleLoader};
pub use scheduler::ResolutionScheduler;
pub use shape::Shape;

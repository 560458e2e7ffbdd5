//! Image and label processors consumed by the sample loader.

mod augment;
mod color_jitter;
mod image_source;
mod truth;

pub use augment::*;
pub use color_jitter::*;
pub use image_source::*;
pub use truth::*;

use crate::{common::*, config::DistortionConfig, shape::Shape};
use label::Label;

/// Decodes and resizes images for evaluation.
pub trait ImageSource
where
    Self: Debug + Send,
{
    type Image;

    /// Decode the image file.
    fn decode(&self, path: &Path) -> Result<Self::Image>;

    /// Resize the image to exactly the shape.
    fn resize(&self, image: Self::Image, shape: Shape) -> Result<Self::Image>;

    /// The width of the image in pixels.
    fn width(&self, image: &Self::Image) -> u32;
}

/// Produces augmented image and label pairs for training.
pub trait Augmenter
where
    Self: Debug + Send,
{
    type Image;

    /// Load the image and its labels, and apply joint random augmentation.
    ///
    /// The returned label has `max_objects * 5` numbers.
    fn augment(
        &mut self,
        image_path: &Path,
        label_path: &Path,
        shape: Shape,
        distortion: &DistortionConfig,
        max_objects: usize,
    ) -> Result<(Self::Image, Array1<f32>)>;
}

/// Parses ground truth files for evaluation.
pub trait TruthParser
where
    Self: Debug + Send,
{
    /// Parse the ground truth boxes.
    ///
    /// * `min_box_scale` - Boxes narrower than this ratio are dropped.
    /// * `normalize` - If set, boxes are normalized to the image frame.
    fn parse(&self, label_path: &Path, min_box_scale: f32, normalize: bool) -> Result<Vec<Label>>;
}

use super::ImageSource;
use crate::{common::*, shape::Shape};

/// Loads image files from disk into RGB images.
#[derive(Debug, Clone, Copy)]
pub struct ImageFileSource {
    filter: FilterType,
}

impl ImageFileSource {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Default for ImageFileSource {
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

impl ImageSource for ImageFileSource {
    type Image = RgbImage;

    fn decode(&self, path: &Path) -> Result<RgbImage> {
        let image = image::open(path)
            .with_context(|| format!("failed to load image file '{}'", path.display()))?;
        Ok(image.to_rgb8())
    }

    fn resize(&self, image: RgbImage, shape: Shape) -> Result<RgbImage> {
        if image.dimensions() == (shape.width(), shape.height()) {
            return Ok(image);
        }
        Ok(image::imageops::resize(
            &image,
            shape.width(),
            shape.height(),
            self.filter,
        ))
    }

    fn width(&self, image: &RgbImage) -> u32 {
        image.width()
    }
}

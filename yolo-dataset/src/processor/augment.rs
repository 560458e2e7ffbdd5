//! Darknet-style training augmentation.

use super::{Augmenter, ColorJitterInit, ImageFileSource, ImageSource};
use crate::{common::*, config::DistortionConfig, label_tensor::labels_to_tensor, shape::Shape};
use label::{Label, RatioRect};

/// The upper bound of relocated box coordinates.
const MAX_COORD: f32 = 0.999;

/// Relocated boxes narrower or shorter than this ratio are dropped.
const MIN_BOX_SIZE: f32 = 0.001;

/// The crop window in source image pixels.
///
/// The window may extend beyond the image, in which case the outside is
/// filled with black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    /// Draw a random crop window that moves each side by at most `jitter` of the image size.
    pub fn random<R>(image_width: u32, image_height: u32, jitter: f64, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let dw = (image_width as f64 * jitter) as i64;
        let dh = (image_height as f64 * jitter) as i64;

        let left = rng.gen_range(-dw..=dw);
        let right = rng.gen_range(-dw..=dw);
        let top = rng.gen_range(-dh..=dh);
        let bottom = rng.gen_range(-dh..=dh);

        let width = image_width as i64 - left - right;
        let height = image_height as i64 - top - bottom;
        ensure!(
            width > 0 && height > 0,
            "jitter {} is too large for image of size {}x{}",
            jitter,
            image_width,
            image_height
        );

        Ok(Self {
            left,
            top,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Copy the window out of the image.
    pub fn crop(&self, image: &RgbImage) -> RgbImage {
        let (image_w, image_h) = image.dimensions();
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let src_x = x as i64 + self.left;
            let src_y = y as i64 + self.top;
            if (0..image_w as i64).contains(&src_x) && (0..image_h as i64).contains(&src_y) {
                *image.get_pixel(src_x as u32, src_y as u32)
            } else {
                Rgb([0, 0, 0])
            }
        })
    }
}

/// Map boxes from the source image frame into the crop window frame.
///
/// Corners are clamped to `[0, 0.999]`, degenerate boxes are dropped and at
/// most `max_objects` boxes are kept.
pub fn relocate_labels(
    labels: &[Label],
    image_width: u32,
    image_height: u32,
    window: &CropWindow,
    flip: bool,
    max_objects: usize,
) -> Vec<Label> {
    let scale_x = image_width as f32 / window.width as f32;
    let scale_y = image_height as f32 / window.height as f32;
    let offset_x = window.left as f32 / window.width as f32;
    let offset_y = window.top as f32 / window.height as f32;
    let clamp = |value: f32| value.max(0.0).min(MAX_COORD);

    labels
        .iter()
        .filter_map(|label| {
            let [t, l, b, r] = label.rect.tlbr();
            let t = clamp(t * scale_y - offset_y);
            let l = clamp(l * scale_x - offset_x);
            let b = clamp(b * scale_y - offset_y);
            let r = clamp(r * scale_x - offset_x);

            let w = r - l;
            let h = b - t;
            if w < MIN_BOX_SIZE || h < MIN_BOX_SIZE {
                return None;
            }

            let cx = (l + r) / 2.0;
            let cx = if flip { MAX_COORD - cx } else { cx };
            let cy = (t + b) / 2.0;

            Some(Label {
                rect: RatioRect::from_cxcywh(cx, cy, w, h),
                class: label.class,
            })
        })
        .take(max_objects)
        .collect()
}

/// Random crop, flip and color distortion on image files and Darknet labels.
#[derive(Debug, Clone)]
pub struct DarknetAugmenter {
    source: ImageFileSource,
    rng: StdRng,
}

impl DarknetAugmenter {
    pub fn new(source: ImageFileSource, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { source, rng }
    }
}

impl Default for DarknetAugmenter {
    fn default() -> Self {
        Self::new(ImageFileSource::default(), None)
    }
}

impl Augmenter for DarknetAugmenter {
    type Image = RgbImage;

    fn augment(
        &mut self,
        image_path: &Path,
        label_path: &Path,
        shape: Shape,
        distortion: &DistortionConfig,
        max_objects: usize,
    ) -> Result<(RgbImage, Array1<f32>)> {
        let Self {
            ref source,
            ref mut rng,
        } = *self;

        let image = source.decode(image_path)?;
        let (orig_w, orig_h) = image.dimensions();

        // crop, resize and flip
        let window = CropWindow::random(orig_w, orig_h, distortion.jitter.raw(), rng)?;
        let cropped = window.crop(&image);
        let mut sized = source.resize(cropped, shape)?;
        let flip = rng.gen_bool(0.5);
        if flip {
            image::imageops::flip_horizontal_in_place(&mut sized);
        }

        // distort colors
        let color_jitter = ColorJitterInit {
            hue_shift: distortion.hue,
            saturation_scale: distortion.saturation,
            exposure_scale: distortion.exposure,
        }
        .build()?;
        color_jitter.forward(&mut sized, rng);

        // move boxes along with the image
        let labels = label::load_labels(label_path)?;
        let labels = relocate_labels(&labels, orig_w, orig_h, &window, flip, max_objects);
        let label = labels_to_tensor(&labels, max_objects);

        Ok((sized, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn label(cx: f32, cy: f32, w: f32, h: f32, class: usize) -> Label {
        Label {
            rect: RatioRect::from_cxcywh(cx, cy, w, h),
            class,
        }
    }

    #[test]
    fn identity_window_keeps_boxes() {
        let window = CropWindow {
            left: 0,
            top: 0,
            width: 100,
            height: 50,
        };
        let labels = vec![label(0.5, 0.5, 0.2, 0.4, 1)];
        let relocated = relocate_labels(&labels, 100, 50, &window, false, 10);

        assert_eq!(relocated.len(), 1);
        assert_eq!(relocated[0].class, 1);
        assert_abs_diff_eq!(relocated[0].rect.cx(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(relocated[0].rect.cy(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(relocated[0].rect.w(), 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(relocated[0].rect.h(), 0.4, epsilon = 1e-6);
    }

    #[test]
    fn shifted_window_moves_and_drops_boxes() {
        // keep the right half of the image
        let window = CropWindow {
            left: 50,
            top: 0,
            width: 50,
            height: 100,
        };
        let labels = vec![
            label(0.75, 0.5, 0.1, 0.1, 0),
            // entirely on the removed half
            label(0.2, 0.5, 0.1, 0.1, 1),
        ];
        let relocated = relocate_labels(&labels, 100, 100, &window, false, 10);

        assert_eq!(relocated.len(), 1);
        assert_abs_diff_eq!(relocated[0].rect.cx(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(relocated[0].rect.w(), 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(relocated[0].rect.h(), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn flip_mirrors_center() {
        let window = CropWindow {
            left: 0,
            top: 0,
            width: 10,
            height: 10,
        };
        let labels = vec![label(0.25, 0.5, 0.1, 0.1, 0)];
        let relocated = relocate_labels(&labels, 10, 10, &window, true, 10);
        assert_abs_diff_eq!(relocated[0].rect.cx(), MAX_COORD - 0.25, epsilon = 1e-6);
    }

    #[test]
    fn relocate_respects_capacity() {
        let window = CropWindow {
            left: 0,
            top: 0,
            width: 10,
            height: 10,
        };
        let labels: Vec<_> = (0..5).map(|class| label(0.5, 0.5, 0.2, 0.2, class)).collect();
        let relocated = relocate_labels(&labels, 10, 10, &window, false, 3);
        assert_eq!(
            relocated.iter().map(|label| label.class).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn crop_pads_outside_with_black() {
        let image = RgbImage::from_pixel(4, 4, Rgb([200, 200, 200]));
        let window = CropWindow {
            left: -2,
            top: 1,
            width: 4,
            height: 4,
        };
        let cropped = window.crop(&image);
        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(*cropped.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*cropped.get_pixel(2, 0), Rgb([200, 200, 200]));
        assert_eq!(*cropped.get_pixel(3, 3), Rgb([0, 0, 0]));
    }

    #[test]
    fn random_window_within_jitter() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let window = CropWindow::random(200, 100, 0.2, &mut rng).unwrap();
            assert!((-40..=40).contains(&window.left));
            assert!((-20..=20).contains(&window.top));
            assert!((120..=280).contains(&window.width));
            assert!((60..=140).contains(&window.height));
        }
    }
}

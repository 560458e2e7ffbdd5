//! The random color distortion algorithm.

use crate::common::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorJitterInit {
    /// The maximum hue shift in ratio of the hue circle.
    pub hue_shift: R64,
    /// The maximum saturation scaling factor, at least 1.
    pub saturation_scale: R64,
    /// The maximum value scaling factor, at least 1.
    pub exposure_scale: R64,
}

impl ColorJitterInit {
    pub fn build(self) -> Result<ColorJitter> {
        let Self {
            hue_shift,
            saturation_scale,
            exposure_scale,
        } = self;

        ensure!(hue_shift >= 0.0, "hue_shift must be non-negative");
        ensure!(saturation_scale >= 1.0, "saturation_scale must be at least 1");
        ensure!(exposure_scale >= 1.0, "exposure_scale must be at least 1");

        Ok(ColorJitter {
            max_hue_shift: hue_shift.raw() as f32,
            max_saturation_scale: saturation_scale.raw() as f32,
            max_exposure_scale: exposure_scale.raw() as f32,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ColorJitter {
    max_hue_shift: f32,
    max_saturation_scale: f32,
    max_exposure_scale: f32,
}

impl ColorJitter {
    /// Randomly shift hue, and scale saturation and value of the image in place.
    pub fn forward<R>(&self, image: &mut RgbImage, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let hue_shift = rng.gen_range(-self.max_hue_shift..=self.max_hue_shift);
        let saturation_scale = random_scale(self.max_saturation_scale, rng);
        let exposure_scale = random_scale(self.max_exposure_scale, rng);
        distort(image, hue_shift, saturation_scale, exposure_scale);
    }
}

/// Apply a fixed HSV distortion to the image in place.
pub fn distort(image: &mut RgbImage, hue_shift: f32, saturation_scale: f32, exposure_scale: f32) {
    image.pixels_mut().for_each(|pixel| {
        let [h, s, v] = rgb_to_hsv(pixel.0);
        let h = (h + hue_shift).rem_euclid(1.0);
        let s = (s * saturation_scale).clamp(0.0, 1.0);
        let v = (v * exposure_scale).clamp(0.0, 1.0);
        pixel.0 = hsv_to_rgb([h, s, v]);
    });
}

/// Draw a scaling factor in `[1, max]`, inverted with probability 0.5.
fn random_scale<R>(max: f32, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    let scale = rng.gen_range(1.0..=max);
    if rng.gen_bool(0.5) {
        scale
    } else {
        1.0 / scale
    }
}

/// Convert RGB bytes to HSV, each component in `[0, 1]`.
fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [f32; 3] {
    let [r, g, b] = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    [h, s, max]
}

fn hsv_to_rgb([h, s, v]: [f32; 3]) -> [u8; 3] {
    let sector = h * 6.0;
    let c = v * s;
    let x = c * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |value: f32| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

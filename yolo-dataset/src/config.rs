//! Sample loader configuration format.

use crate::{common::*, shape::Shape};

/// The sample loader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The manifest file listing one image path per line.
    pub image_manifest: PathBuf,
    /// The optional manifest file listing one label path per line.
    ///
    /// If not set, label paths are derived from image paths.
    pub label_manifest: Option<PathBuf>,
    /// The initial input shape in `[width, height]`.
    pub shape: Option<Shape>,
    /// If set, shuffle the samples once on construction.
    #[serde(default)]
    pub shuffle: bool,
    /// The random seed for shuffling, multi-scale and augmentation.
    ///
    /// It is seeded from system entropy if not set.
    pub seed: Option<u64>,
    /// If set, produce augmented training samples.
    #[serde(default)]
    pub is_train: bool,
    /// The initial number of samples seen by the training.
    #[serde(default = "default_seen")]
    pub seen: usize,
    /// The number of loader instances working in parallel.
    ///
    /// Every loader instance advances its seen counter by this number per sample
    /// to track the global progress. Zero is treated as one. Negative values
    /// make every sample load fail before any loader state changes.
    #[serde(default = "default_num_workers")]
    pub num_workers: isize,
    /// If set, vary the input shape per batch during training.
    #[serde(default)]
    pub is_multiscale: bool,
    /// The batch size. It is required for multi-scale training.
    pub batch_size: Option<NonZeroUsize>,
    /// The maximum number of boxes per sample.
    #[serde(default = "default_max_objects")]
    pub max_objects: usize,
    /// The training image distortion parameters.
    #[serde(default)]
    pub distortion: DistortionConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config: Self = json5::from_str(&text)?;
        Ok(config)
    }

    /// Build a configuration with default options for the given image manifest.
    pub fn new(image_manifest: impl Into<PathBuf>) -> Self {
        Self {
            image_manifest: image_manifest.into(),
            label_manifest: None,
            shape: None,
            shuffle: false,
            seed: None,
            is_train: false,
            seen: default_seen(),
            num_workers: default_num_workers(),
            is_multiscale: false,
            batch_size: None,
            max_objects: default_max_objects(),
            distortion: DistortionConfig::default(),
        }
    }

    /// The batch size used by multi-scale training, if it is in effect.
    pub fn multiscale_batch_size(&self) -> Option<NonZeroUsize> {
        (self.is_train && self.is_multiscale)
            .then(|| self.batch_size)
            .flatten()
    }

    /// Check option presence and ranges.
    pub fn validate(&self) -> Result<()> {
        if self.is_train && self.is_multiscale {
            ensure!(
                self.batch_size.is_some(),
                "batch_size must be set for multi-scale training"
            );
        }
        if self.is_train && !self.is_multiscale {
            ensure!(
                self.shape.is_some(),
                "shape must be set for training without multi-scale"
            );
        }
        self.distortion.validate()?;
        Ok(())
    }
}

/// Random distortion parameters for training images.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistortionConfig {
    /// The maximum crop offset per side in ratio of the image size.
    #[serde(default = "default_jitter")]
    pub jitter: R64,
    /// The maximum hue shift in ratio of the full hue circle.
    #[serde(default = "default_hue")]
    pub hue: R64,
    /// The maximum saturation scaling factor.
    #[serde(default = "default_saturation")]
    pub saturation: R64,
    /// The maximum exposure scaling factor.
    #[serde(default = "default_exposure")]
    pub exposure: R64,
}

impl DistortionConfig {
    pub fn validate(&self) -> Result<()> {
        let Self {
            jitter,
            hue,
            saturation,
            exposure,
        } = *self;
        ensure!(
            (0.0..0.5).contains(&jitter.raw()),
            "jitter must be in range [0, 0.5), but get {}",
            jitter
        );
        ensure!(
            (0.0..=0.5).contains(&hue.raw()),
            "hue must be in range [0, 0.5], but get {}",
            hue
        );
        ensure!(
            saturation >= 1.0,
            "saturation must be at least 1, but get {}",
            saturation
        );
        ensure!(
            exposure >= 1.0,
            "exposure must be at least 1, but get {}",
            exposure
        );
        Ok(())
    }
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            jitter: default_jitter(),
            hue: default_hue(),
            saturation: default_saturation(),
            exposure: default_exposure(),
        }
    }
}

fn default_seen() -> usize {
    1
}

fn default_num_workers() -> isize {
    1
}

fn default_max_objects() -> usize {
    50
}

fn default_jitter() -> R64 {
    r64(0.2)
}

fn default_hue() -> R64 {
    r64(0.1)
}

fn default_saturation() -> R64 {
    r64(1.5)
}

fn default_exposure() -> R64 {
    r64(1.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_minimal_config() {
        let config: Config = json5::from_str(
            r#"{
                image_manifest: "train.txt",
            }"#,
        )
        .unwrap();

        assert_eq!(config, Config::new("train.txt"));
        assert_eq!(config.seen, 1);
        assert_eq!(config.num_workers, 1);
        assert_eq!(config.max_objects, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_full_config() {
        let config: Config = json5::from_str(
            r#"{
                image_manifest: "train.txt",
                label_manifest: "train_labels.txt",
                shape: [608, 416],
                shuffle: true,
                seed: 3,
                is_train: true,
                seen: 0,
                num_workers: 4,
                is_multiscale: true,
                batch_size: 16,
                max_objects: 30,
                distortion: { jitter: 0.3, hue: 0.1, saturation: 1.5, exposure: 1.2 },
            }"#,
        )
        .unwrap();

        assert_eq!(config.shape, Some(Shape::new(608, 416).unwrap()));
        assert_eq!(config.seen, 0);
        assert_eq!(config.multiscale_batch_size(), NonZeroUsize::new(16));
        assert_eq!(config.distortion.exposure, r64(1.2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_invalid_shape() {
        let result: Result<Config, _> = json5::from_str(
            r#"{
                image_manifest: "train.txt",
                shape: [400, 416],
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn multiscale_requires_batch_size() {
        let config = Config {
            is_train: true,
            is_multiscale: true,
            ..Config::new("train.txt")
        };
        assert!(config.validate().is_err());

        let config = Config {
            is_train: true,
            ..Config::new("train.txt")
        };
        assert!(config.validate().is_err());

        // batch size is not needed outside training
        let config = Config {
            is_multiscale: true,
            ..Config::new("test.txt")
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.multiscale_batch_size(), None);
    }
}

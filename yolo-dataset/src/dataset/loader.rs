use super::*;
use crate::{
    common::*,
    config::Config,
    label_tensor::pack_labels,
    processor::{
        Augmenter, DarknetAugmenter, DarknetLabelParser, ImageFileSource, ImageSource,
        TruthParser,
    },
    scheduler::ResolutionScheduler,
    shape::Shape,
};
use label::LABEL_ROW_LEN;

/// The post-processing hook on loaded images.
pub type ImageTransform<I> = Box<dyn FnMut(I) -> I + Send>;

/// The post-processing hook on label tensors.
pub type LabelTransform = Box<dyn FnMut(Array1<f32>) -> Array1<f32> + Send>;

/// Materializes indexed samples into image and label tensor pairs.
///
/// The loader keeps a counter of seen samples that drives the multi-scale
/// curriculum. When several loaders feed the same training in parallel, each
/// one keeps its own counter and shape, and `num_workers` in the
/// configuration must equal the number of loaders so that every counter
/// follows the global progress.
pub struct SampleLoader<S = ImageFileSource, A = DarknetAugmenter, P = DarknetLabelParser>
where
    S: ImageSource,
    A: Augmenter<Image = S::Image>,
    P: TruthParser,
{
    config: Config,
    index: SampleIndex,
    source: S,
    augmenter: A,
    parser: P,
    scheduler: Option<ResolutionScheduler>,
    shape: Option<Shape>,
    seen: usize,
    transform: Option<ImageTransform<S::Image>>,
    target_transform: Option<LabelTransform>,
}

impl SampleLoader {
    /// Load the manifests and build a loader with the default image file processors.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let mut rng = seeded_rng(config.seed);
        let index = SampleIndex::open(&config.image_manifest, config.label_manifest.as_ref())?;
        let source = ImageFileSource::default();
        let augmenter = DarknetAugmenter::new(source, Some(rng.gen()));
        Self::build(config, index, source, augmenter, DarknetLabelParser, &mut rng)
    }
}

impl<S, A, P> SampleLoader<S, A, P>
where
    S: ImageSource,
    A: Augmenter<Image = S::Image>,
    P: TruthParser,
{
    /// Build a loader on a sample index with custom processors.
    ///
    /// The index is shuffled if the `shuffle` option is set.
    pub fn with_processors(
        config: Config,
        index: SampleIndex,
        source: S,
        augmenter: A,
        parser: P,
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        Self::build(config, index, source, augmenter, parser, &mut rng)
    }

    /// Shuffle the index and seed the scheduler from the loader random source.
    fn build(
        config: Config,
        index: SampleIndex,
        source: S,
        augmenter: A,
        parser: P,
        rng: &mut StdRng,
    ) -> Result<Self> {
        let index = if config.shuffle {
            index.shuffled(rng)
        } else {
            index
        };

        let scheduler_seed: u64 = rng.gen();
        let scheduler = config
            .multiscale_batch_size()
            .map(|batch_size| ResolutionScheduler::new(batch_size, Some(scheduler_seed)));
        let shape = config.shape;
        let seen = config.seen;

        info!(
            "loaded {} samples from '{}' for {}",
            index.len(),
            config.image_manifest.display(),
            if config.is_train {
                "training"
            } else {
                "evaluation"
            }
        );

        Ok(Self {
            config,
            index,
            source,
            augmenter,
            parser,
            scheduler,
            shape,
            seen,
            transform: None,
            target_transform: None,
        })
    }

    /// Set the hook applied to every produced image.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: 'static + FnMut(S::Image) -> S::Image + Send,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Set the hook applied to every produced label tensor.
    pub fn with_target_transform<F>(mut self, transform: F) -> Self
    where
        F: 'static + FnMut(Array1<f32>) -> Array1<f32> + Send,
    {
        self.target_transform = Some(Box::new(transform));
        self
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The number of samples seen so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// The currently active input shape.
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    pub fn index(&self) -> &SampleIndex {
        &self.index
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The length of every produced label tensor.
    pub fn label_len(&self) -> usize {
        self.config.max_objects * LABEL_ROW_LEN
    }

    /// Produce the image and label tensor of the nth sample, and advance the seen counter.
    pub fn materialize(&mut self, index: usize) -> Result<(S::Image, Array1<f32>)> {
        let num_samples = self.index.len();
        ensure!(
            index < num_samples,
            "sample index {} is out of range, the dataset has {} samples",
            index,
            num_samples
        );
        let step = self.seen_step()?;
        let (image_path, label_path) = {
            let (image_path, label_path) = self
                .index
                .paths(index)
                .ok_or_else(|| format_err!("invalid index {}", index))?;
            (image_path.to_owned(), label_path)
        };

        if let Some(scheduler) = &mut self.scheduler {
            scheduler.update(index, self.seen, &mut self.shape);
        }

        let (image, label) = if self.config.is_train {
            self.load_training_sample(index, &image_path, &label_path)?
        } else {
            self.load_evaluation_sample(&image_path, &label_path)?
        };

        let image = match &mut self.transform {
            Some(transform) => transform(image),
            None => image,
        };
        let label = match &mut self.target_transform {
            Some(transform) => transform(label),
            None => label,
        };

        self.seen = self.seen.saturating_add(step);

        Ok((image, label))
    }

    fn load_training_sample(
        &mut self,
        index: usize,
        image_path: &Path,
        label_path: &Path,
    ) -> Result<(S::Image, Array1<f32>)> {
        let Self {
            ref config,
            ref mut augmenter,
            shape,
            ..
        } = *self;
        let shape = shape
            .ok_or_else(|| format_err!("no input shape is available for sample {}", index))?;

        let (image, label) = augmenter.augment(
            image_path,
            label_path,
            shape,
            &config.distortion,
            config.max_objects,
        )?;

        // the delegate is expected to pack the label already
        let label = if label.len() == config.max_objects * LABEL_ROW_LEN {
            label
        } else {
            pack_labels(&label.to_vec(), config.max_objects)
        };

        Ok((image, label))
    }

    fn load_evaluation_sample(
        &self,
        image_path: &Path,
        label_path: &Path,
    ) -> Result<(S::Image, Array1<f32>)> {
        let image = self.source.decode(image_path)?;
        let image = match self.shape {
            Some(shape) => self.source.resize(image, shape)?,
            None => image,
        };

        let min_box_scale = 8.0 / self.source.width(&image) as f32;
        let flat = match self.parser.parse(label_path, min_box_scale, true) {
            Ok(labels) => label::flatten_labels(&labels),
            Err(err) => {
                warn!("{} has no data: {:#}", label_path.display(), err);
                vec![0.0; LABEL_ROW_LEN]
            }
        };
        let label = pack_labels(&flat, self.config.max_objects);

        Ok((image, label))
    }

    /// The seen counter increment per produced sample.
    fn seen_step(&self) -> Result<usize> {
        let step = match self.config.num_workers {
            num_workers if num_workers > 0 => num_workers as usize,
            0 => 1,
            num_workers => bail!(
                "num_workers must be non-negative, but get {}",
                num_workers
            ),
        };
        Ok(step)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl<S, A, P> RandomAccessDataset for SampleLoader<S, A, P>
where
    S: ImageSource,
    A: Augmenter<Image = S::Image>,
    P: TruthParser,
{
    type Image = S::Image;

    fn num_records(&self) -> usize {
        self.len()
    }

    fn nth(&mut self, index: usize) -> Result<DataRecord<S::Image>> {
        let (image, label) = self.materialize(index)?;
        Ok(DataRecord { image, label })
    }
}

impl<S, A, P> Debug for SampleLoader<S, A, P>
where
    S: ImageSource,
    A: Augmenter<Image = S::Image>,
    P: TruthParser,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleLoader")
            .field("config", &self.config)
            .field("num_samples", &self.index.len())
            .field("source", &self.source)
            .field("augmenter", &self.augmenter)
            .field("parser", &self.parser)
            .field("scheduler", &self.scheduler)
            .field("shape", &self.shape)
            .field("seen", &self.seen)
            .field("transform", &self.transform.is_some())
            .field("target_transform", &self.target_transform.is_some())
            .finish()
    }
}

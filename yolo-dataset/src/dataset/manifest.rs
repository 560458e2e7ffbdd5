use crate::common::*;

/// Substring substitutions that turn an image path into its label path, applied in order.
const LABEL_PATH_SUBSTITUTIONS: [(&str, &str); 4] = [
    ("images", "labels"),
    ("JPEGImages", "labels"),
    (".jpg", ".txt"),
    (".png", ".txt"),
];

/// Derive the label file path from the image file path.
///
/// Every substitution applies to all occurrences, whether or not an earlier one matched.
pub fn derive_label_path(image_path: impl AsRef<Path>) -> PathBuf {
    let path = image_path.as_ref().to_string_lossy();
    let path = LABEL_PATH_SUBSTITUTIONS
        .iter()
        .fold(path.into_owned(), |path, (from, to)| path.replace(from, to));
    PathBuf::from(path)
}

/// An image path with an optional explicit label path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestEntry {
    pub image_path: PathBuf,
    /// The label path listed in the label manifest, if any.
    pub label_path: Option<PathBuf>,
}

impl ManifestEntry {
    /// The label path, derived from the image path when not listed explicitly.
    pub fn resolve_label_path(&self) -> PathBuf {
        match &self.label_path {
            Some(path) => path.clone(),
            None => derive_label_path(&self.image_path),
        }
    }
}

/// The ordered list of samples listed in manifest files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleIndex {
    entries: Vec<ManifestEntry>,
}

impl SampleIndex {
    /// Load the image manifest and the optional label manifest.
    ///
    /// Both manifests list one path per line. The label manifest must have as
    /// many lines as the image manifest.
    pub fn open<P, Q>(image_manifest: P, label_manifest: Option<Q>) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let image_manifest = image_manifest.as_ref();
        let image_paths = read_manifest(image_manifest)?;

        let label_paths = label_manifest
            .map(|label_manifest| -> Result<_> {
                let label_manifest = label_manifest.as_ref();
                let label_paths = read_manifest(label_manifest)?;
                ensure!(
                    label_paths.len() == image_paths.len(),
                    "the label manifest '{}' has {} lines, but the image manifest '{}' has {} lines",
                    label_manifest.display(),
                    label_paths.len(),
                    image_manifest.display(),
                    image_paths.len()
                );
                Ok(label_paths)
            })
            .transpose()?;

        Self::from_paths(image_paths, label_paths)
    }

    /// Build the index from image paths and optional label paths of the same length.
    pub fn from_paths<I, L>(image_paths: Vec<I>, label_paths: Option<Vec<L>>) -> Result<Self>
    where
        I: Into<PathBuf>,
        L: Into<PathBuf>,
    {
        let entries: Vec<_> = match label_paths {
            Some(label_paths) => {
                ensure!(
                    image_paths.len() == label_paths.len(),
                    "expect {} label paths, but get {}",
                    image_paths.len(),
                    label_paths.len()
                );
                image_paths
                    .into_iter()
                    .zip(label_paths)
                    .map(|(image_path, label_path)| ManifestEntry {
                        image_path: image_path.into(),
                        label_path: Some(label_path.into()),
                    })
                    .collect()
            }
            None => image_paths
                .into_iter()
                .map(|image_path| ManifestEntry {
                    image_path: image_path.into(),
                    label_path: None,
                })
                .collect(),
        };

        Ok(Self { entries })
    }

    /// Randomly permute the samples, keeping image and label paths paired.
    pub fn shuffled<R>(mut self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        self.entries.shuffle(rng);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&ManifestEntry> {
        self.entries.get(index)
    }

    /// The label path of the nth sample, derived from the image path when not listed.
    pub fn label_path(&self, index: usize) -> Option<PathBuf> {
        Some(self.entries.get(index)?.resolve_label_path())
    }

    /// Get the image path and resolved label path of the nth sample.
    pub fn paths(&self, index: usize) -> Option<(&Path, PathBuf)> {
        let entry = self.entries.get(index)?;
        Some((&entry.image_path, entry.resolve_label_path()))
    }
}

/// Read one path per line with trailing whitespace trimmed.
fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest file '{}'", path.display()))?;
    let lines = text
        .lines()
        .map(|line| line.trim_end().to_owned())
        .collect();
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_label_path_substitutions() {
        assert_eq!(
            derive_label_path("/data/images/JPEGImages/foo.jpg"),
            PathBuf::from("/data/labels/labels/foo.txt")
        );
        assert_eq!(
            derive_label_path("/voc/VOC2007/JPEGImages/000001.jpg"),
            PathBuf::from("/voc/VOC2007/labels/000001.txt")
        );
        assert_eq!(
            derive_label_path("coco/images/train2014/x.png"),
            PathBuf::from("coco/labels/train2014/x.txt")
        );
        assert_eq!(
            derive_label_path("plain/file.bmp"),
            PathBuf::from("plain/file.bmp")
        );
    }

    #[test]
    fn explicit_label_paths_are_kept() {
        let index = SampleIndex::from_paths(
            vec!["a/images/1.jpg", "a/images/2.jpg"],
            Some(vec!["b/1.txt", "b/2.txt"]),
        )
        .unwrap();
        assert_eq!(index.len(), 2);

        let (image_path, label_path) = index.paths(1).unwrap();
        assert_eq!(image_path, Path::new("a/images/2.jpg"));
        assert_eq!(label_path, PathBuf::from("b/2.txt"));
        assert!(index.paths(2).is_none());
    }

    #[test]
    fn derived_label_paths() {
        let index = SampleIndex::from_paths(vec!["a/images/1.jpg"], None::<Vec<String>>).unwrap();
        let entry = index.entry(0).unwrap();
        assert_eq!(entry.label_path, None);
        assert_eq!(entry.resolve_label_path(), PathBuf::from("a/labels/1.txt"));
        assert_eq!(index.label_path(0), Some(PathBuf::from("a/labels/1.txt")));
        assert_eq!(index.label_path(1), None);
    }

    #[test]
    fn length_mismatch() {
        let result = SampleIndex::from_paths(vec!["1.jpg", "2.jpg"], Some(vec!["1.txt"]));
        assert!(result.is_err());
    }

    #[test]
    fn shuffle_keeps_pairs() {
        let image_paths: Vec<_> = (0..100).map(|index| format!("{}.jpg", index)).collect();
        let label_paths: Vec<_> = (0..100).map(|index| format!("{}.txt", index)).collect();
        let index = SampleIndex::from_paths(image_paths, Some(label_paths)).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        let shuffled = index.clone().shuffled(&mut rng);
        assert_eq!(shuffled.len(), 100);
        assert_ne!(shuffled, index);

        shuffled.entries().iter().for_each(|entry| {
            let image_stem = entry.image_path.file_stem().unwrap();
            let label_stem = entry.label_path.as_ref().unwrap().file_stem().unwrap();
            assert_eq!(image_stem, label_stem);
        });

        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(index.shuffled(&mut rng), shuffled);
    }
}

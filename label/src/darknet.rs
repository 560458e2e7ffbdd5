//! Darknet label files, one `class cx cy w h` row per box in ratio units.

use crate::{Label, RatioRect, LABEL_ROW_LEN};
use anyhow::{ensure, Context, Result};
use itertools::Itertools;
use std::{fs, path::Path};

/// The largest accepted class id.
const MAX_CLASS_ID: f32 = u32::MAX as f32;

/// Parse the content of a Darknet label file.
///
/// Blank content yields an empty list.
pub fn parse_labels(text: &str) -> Result<Vec<Label>> {
    let values: Vec<f32> = text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f32>()
                .with_context(|| format!("invalid number '{}'", token))
        })
        .try_collect()?;

    ensure!(
        values.len() % LABEL_ROW_LEN == 0,
        "expect {} numbers per row, but get {} numbers in total",
        LABEL_ROW_LEN,
        values.len()
    );

    values
        .chunks_exact(LABEL_ROW_LEN)
        .map(|row| -> Result<_> {
            let (class, cx, cy, w, h) = (row[0], row[1], row[2], row[3], row[4]);
            ensure!(
                class >= 0.0 && class.fract() == 0.0,
                "class id must be a non-negative integer, but get {}",
                class
            );
            ensure!(
                class <= MAX_CLASS_ID,
                "class id {} exceeds the maximum {}",
                class,
                MAX_CLASS_ID
            );
            Ok(Label {
                rect: RatioRect::try_from_cxcywh(cx, cy, w, h)?,
                class: class as usize,
            })
        })
        .try_collect()
}

/// Load the labels in a Darknet label file.
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<Label>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read label file '{}'", path.display()))?;
    parse_labels(&text).with_context(|| format!("malformed label file '{}'", path.display()))
}

/// Load the ground truth of a sample for evaluation.
///
/// Unlike [load_labels], a file without any row is an error. If `normalize` is
/// set, boxes are clipped to the image frame. Boxes narrower than
/// `min_box_scale` are dropped afterwards.
pub fn load_ground_truth(
    path: impl AsRef<Path>,
    min_box_scale: f32,
    normalize: bool,
) -> Result<Vec<Label>> {
    let path = path.as_ref();
    let labels = load_labels(path)?;
    ensure!(
        !labels.is_empty(),
        "no ground truth found in '{}'",
        path.display()
    );

    let labels = labels
        .into_iter()
        .map(|label| {
            if normalize {
                label.clip_to_unit()
            } else {
                label
            }
        })
        .filter(|label| label.rect.w() >= min_box_scale)
        .collect();
    Ok(labels)
}

use super::TruthParser;
use crate::common::*;
use label::Label;

/// Ground truth parser for Darknet label files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DarknetLabelParser;

impl TruthParser for DarknetLabelParser {
    fn parse(&self, label_path: &Path, min_box_scale: f32, normalize: bool) -> Result<Vec<Label>> {
        label::load_ground_truth(label_path, min_box_scale, normalize)
    }
}

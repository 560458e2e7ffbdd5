//! Ground truth labels in Darknet text format.

mod darknet;
mod rect;

pub use darknet::*;
pub use rect::*;

/// The number of numbers per label row, the class id followed by four box coordinates.
pub const LABEL_ROW_LEN: usize = 5;

/// A class index paired with a bounding box in ratio units.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub rect: RatioRect,
    pub class: usize,
}

impl Label {
    /// The label row in `class cx cy w h` order.
    pub fn to_row(&self) -> [f32; LABEL_ROW_LEN] {
        let Self { ref rect, class } = *self;
        [class as f32, rect.cx(), rect.cy(), rect.w(), rect.h()]
    }

    /// Clip the box to the unit square and keep the class.
    pub fn clip_to_unit(&self) -> Self {
        Self {
            rect: self.rect.clip_to_unit(),
            class: self.class,
        }
    }
}

/// Flatten labels to rows of numbers in `class cx cy w h` order.
pub fn flatten_labels<'a>(labels: impl IntoIterator<Item = &'a Label>) -> Vec<f32> {
    labels
        .into_iter()
        .flat_map(|label| label.to_row())
        .collect()
}

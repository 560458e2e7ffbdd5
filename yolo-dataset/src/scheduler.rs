//! The multi-scale input resolution curriculum.

use crate::{common::*, shape::Shape};

/// Curriculum stages as `(seen threshold in batches, min steps, extra steps)`.
///
/// A stage applies while `seen < threshold * batch_size`. The width is drawn
/// as `(uniform[0, extra] + min) * 32`.
const STAGES: [(usize, u32, u32); 4] = [
    (4000, 13, 0),
    (8000, 13, 3),
    (12000, 12, 5),
    (16000, 11, 7),
];

/// The stage applied once all thresholds are passed.
const FINAL_STAGE: (u32, u32) = (10, 9);

/// Draw the square input shape for the next batch.
///
/// Training starts at a fixed 416x416 and samples from a wider range of
/// resolutions as `seen` grows.
pub fn multiscale_shape<R>(seen: usize, batch_size: NonZeroUsize, rng: &mut R) -> Shape
where
    R: Rng + ?Sized,
{
    let batch_size = batch_size.get();
    let (min_steps, extra_steps) = STAGES
        .iter()
        .find(|(threshold, _, _)| seen < threshold.saturating_mul(batch_size))
        .map(|&(_, min_steps, extra_steps)| (min_steps, extra_steps))
        .unwrap_or(FINAL_STAGE);
    let steps = rng.gen_range(0..=extra_steps) + min_steps;
    Shape::square_unchecked(steps)
}

/// Decides the render shape at batch boundaries during multi-scale training.
///
/// The scheduler owns the random source only. The seen counter and the
/// active shape belong to the loader and are passed in on every call.
#[derive(Debug, Clone)]
pub struct ResolutionScheduler {
    batch_size: NonZeroUsize,
    rng: StdRng,
}

impl ResolutionScheduler {
    pub fn new(batch_size: NonZeroUsize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { batch_size, rng }
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// Update `shape` if `index` starts a new batch.
    ///
    /// Returns true if the shape was recomputed.
    pub fn update(&mut self, index: usize, seen: usize, shape: &mut Option<Shape>) -> bool {
        if index % self.batch_size.get() != 0 {
            return false;
        }

        let new_shape = multiscale_shape(seen, self.batch_size, &mut self.rng);
        if *shape != Some(new_shape) {
            debug!(
                "switch input shape to {} at index {} (seen {})",
                new_shape, index, seen
            );
        }
        *shape = Some(new_shape);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).unwrap()
    }

    fn widths_at(seen: usize, batch_size: usize) -> Vec<u32> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut widths: Vec<_> = (0..2000)
            .map(|_| multiscale_shape(seen, batch(batch_size), &mut rng))
            .map(|shape| {
                assert_eq!(shape.width(), shape.height());
                shape.width() / 32
            })
            .collect();
        widths.sort_unstable();
        widths.dedup();
        widths
    }

    #[test]
    fn fixed_shape_at_start() {
        assert_eq!(widths_at(0, 16), vec![13]);
        assert_eq!(widths_at(4000 * 16 - 1, 16), vec![13]);
    }

    #[test]
    fn range_widens_with_seen() {
        assert_eq!(widths_at(4000 * 16, 16), (13..=16).collect::<Vec<_>>());
        assert_eq!(widths_at(8000 * 16, 16), (12..=17).collect::<Vec<_>>());
        assert_eq!(widths_at(12000 * 16, 16), (11..=18).collect::<Vec<_>>());
        assert_eq!(widths_at(16000 * 16, 16), (10..=19).collect::<Vec<_>>());
        assert_eq!(widths_at(usize::MAX, 16), (10..=19).collect::<Vec<_>>());
    }

    #[test]
    fn thresholds_scale_with_batch_size() {
        assert_eq!(widths_at(70000, 1), (10..=19).collect::<Vec<_>>());
        assert_eq!(widths_at(70000, 16), (13..=16).collect::<Vec<_>>());
        assert_eq!(widths_at(70000, 64), vec![13]);
    }

    #[test]
    fn update_only_at_batch_boundary() {
        let mut scheduler = ResolutionScheduler::new(batch(16), Some(1));
        let mut shape = None;

        assert!(!scheduler.update(3, 0, &mut shape));
        assert_eq!(shape, None);

        assert!(scheduler.update(0, 0, &mut shape));
        assert_eq!(shape, Some(Shape::new(416, 416).unwrap()));

        assert!(scheduler.update(32, 70000, &mut shape));
        let width = shape.unwrap().width();
        assert!(width % 32 == 0 && (320..=608).contains(&width));
    }

    #[test]
    fn seeded_scheduler_is_reproducible() {
        let draw = |seed| {
            let mut scheduler = ResolutionScheduler::new(batch(2), Some(seed));
            (0..20)
                .map(|step| {
                    let mut shape = None;
                    scheduler.update(step * 2, 40000, &mut shape);
                    shape.unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }
}

use anyhow::{ensure, Result};

/// Bounding box in ratio units, stored in center/size form.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioRect {
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
}

impl RatioRect {
    pub fn try_from_cxcywh(cx: f32, cy: f32, w: f32, h: f32) -> Result<Self> {
        ensure!(
            [cx, cy, w, h].iter().all(|value| value.is_finite()),
            "box coordinates must be finite, but get {:?}",
            [cx, cy, w, h]
        );
        ensure!(
            w >= 0.0 && h >= 0.0,
            "box width and height must be non-negative, but get w={} h={}",
            w,
            h
        );
        Ok(Self { cx, cy, w, h })
    }

    /// Build a box from center and size without validation.
    ///
    /// Width and height are expected to be non-negative.
    pub fn from_cxcywh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        debug_assert!(w >= 0.0 && h >= 0.0);
        Self { cx, cy, w, h }
    }

    /// Build a box from corners in `[t, l, b, r]` order.
    pub fn try_from_tlbr(tlbr: [f32; 4]) -> Result<Self> {
        let [t, l, b, r] = tlbr;
        ensure!(
            b >= t && r >= l,
            "invalid box corners, get t={} l={} b={} r={}",
            t,
            l,
            b,
            r
        );
        Self::try_from_cxcywh((l + r) / 2.0, (t + b) / 2.0, r - l, b - t)
    }

    pub fn cx(&self) -> f32 {
        self.cx
    }

    pub fn cy(&self) -> f32 {
        self.cy
    }

    pub fn w(&self) -> f32 {
        self.w
    }

    pub fn h(&self) -> f32 {
        self.h
    }

    pub fn t(&self) -> f32 {
        self.cy - self.h / 2.0
    }

    pub fn l(&self) -> f32 {
        self.cx - self.w / 2.0
    }

    pub fn b(&self) -> f32 {
        self.cy + self.h / 2.0
    }

    pub fn r(&self) -> f32 {
        self.cx + self.w / 2.0
    }

    pub fn tlbr(&self) -> [f32; 4] {
        [self.t(), self.l(), self.b(), self.r()]
    }

    /// Clip the box to the `[0, 1]` square.
    ///
    /// A box lying entirely outside collapses to zero area on the boundary.
    pub fn clip_to_unit(&self) -> Self {
        let clip = |value: f32| value.max(0.0).min(1.0);
        let [t, l, b, r] = self.tlbr();
        if [t, l, b, r].iter().all(|&value| clip(value) == value) {
            return self.clone();
        }
        let [t, l, b, r] = [clip(t), clip(l), clip(b), clip(r)];
        Self::from_cxcywh((l + r) / 2.0, (t + b) / 2.0, r - l, b - t)
    }
}

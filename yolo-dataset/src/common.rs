pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use image::{imageops::FilterType, Rgb, RgbImage};
pub use log::{debug, info, warn};
pub use ndarray::{s, Array1, ArrayView1};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    convert::TryFrom,
    fmt::{self, Debug},
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

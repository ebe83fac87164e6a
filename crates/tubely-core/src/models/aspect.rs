//! Aspect ratio classification for uploaded videos.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Rounded width/height ratio of a 9:16 video.
const PORTRAIT_RATIO: f64 = 0.56;
/// Rounded width/height ratio of a 16:9 video.
const LANDSCAPE_RATIO: f64 = 1.78;

/// Closed set of aspect classes; also the pseudo-directory a video is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Classify from pixel dimensions.
    ///
    /// The ratio is rounded to two decimals and compared exactly against 0.56 and 1.78.
    /// Degenerate input (zero height, zero width over zero height) yields `Other`.
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        let ratio = width / height;
        if !ratio.is_finite() {
            return AspectClass::Other;
        }

        let rounded = (ratio * 100.0).round() / 100.0;
        if rounded == PORTRAIT_RATIO {
            AspectClass::Portrait
        } else if rounded == LANDSCAPE_RATIO {
            AspectClass::Landscape
        } else {
            AspectClass::Other
        }
    }

    /// Storage key prefix for this class.
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.prefix())
    }
}

//! Stage document model.
//!
//! A [`Stage`](stage::Stage) is the composed, layered scene-description
//! document; prims are the addressable nodes in its path namespace. This
//! module only models the parts of the document the bridge touches:
//! - `PrimPath`: hierarchical path addressing
//! - `Prim`: per-node record with a time-sampled local transform
//! - `Stage`: the prim store plus the document-wide reader/writer lock

pub mod path;
pub mod prim;
pub mod stage;

pub use path::PrimPath;
pub use prim::{Prim, Specifier};
pub use stage::{Stage, StagePtr};

use bitflags::bitflags;
use slotmap::new_key_type;

new_key_type! {
    /// Stable identity of a prim within its stage. Keys survive redefinition
    /// (`define_prim` on an existing path re-types the prim in place).
    pub struct PrimKey;
}

bitflags! {
    /// Visibility-purpose flags filtering which prims are considered during
    /// read traversal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PurposeSet: u32 {
        const DEFAULT = 1 << 0;
        const RENDER  = 1 << 1;
        const PROXY   = 1 << 2;
        const GUIDE   = 1 << 3;
    }
}

impl Default for PurposeSet {
    fn default() -> Self {
        PurposeSet::DEFAULT | PurposeSet::PROXY
    }
}

/// A point on the stage's time axis.
///
/// `TimeCode::DEFAULT` addresses the static (non-animated) value of an
/// attribute rather than any numbered frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeCode(f64);

impl TimeCode {
    /// The static default-value time.
    pub const DEFAULT: TimeCode = TimeCode(f64::NAN);

    #[inline]
    #[must_use]
    pub fn from_frame(frame: f64) -> Self {
        TimeCode(frame)
    }

    /// Returns the numeric frame, or `None` for the default time.
    #[inline]
    #[must_use]
    pub fn frame(self) -> Option<f64> {
        if self.0.is_nan() { None } else { Some(self.0) }
    }

    #[inline]
    #[must_use]
    pub fn is_default(self) -> bool {
        self.0.is_nan()
    }
}

impl Default for TimeCode {
    fn default() -> Self {
        TimeCode::DEFAULT
    }
}

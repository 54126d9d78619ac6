//! Per-operation bridge context.

use glam::DMat4;
use rustc_hash::FxHashMap;

use crate::stage::path::PrimPath;
use crate::stage::{PurposeSet, TimeCode};

/// Settings a geometry pipeline passes into wrapper operations.
#[derive(Clone, Copy, Debug)]
pub struct BridgeContext {
    /// Time coordinate values are authored at / resolved against.
    pub time: TimeCode,
    /// Write as an overlay onto existing prims instead of defining new
    /// ones.
    pub overlay: bool,
    /// Visibility purposes considered during read traversal.
    pub purposes: PurposeSet,
}

impl Default for BridgeContext {
    fn default() -> Self {
        BridgeContext {
            time: TimeCode::DEFAULT,
            overlay: false,
            purposes: PurposeSet::default(),
        }
    }
}

impl BridgeContext {
    #[must_use]
    pub fn at_time(time: TimeCode) -> Self {
        BridgeContext {
            time,
            ..BridgeContext::default()
        }
    }

    #[must_use]
    pub fn overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }
}

/// World transforms accumulated during a hierarchical export, keyed by
/// prim path. Lets each wrapper compose its world matrix from its parent's
/// without re-reading the stage.
pub type XformCache = FxHashMap<PrimPath, DMat4>;

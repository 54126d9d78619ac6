//! Bridge prim wrappers.
//!
//! Wrappers mirror prims between the procedural-geometry runtime and the
//! stage. A wrapper is bound for write (export: define or override a prim,
//! then author onto it) or for read (import: traverse and refine existing
//! prims). [`PrimWrapper`] is the runtime-facing surface shared by every
//! wrapper family; [`XformWrapper`](xform::XformWrapper) is the transform
//! bridge.
//!
//! The group helpers here ([`refine_group`], [`update_group_from_source`])
//! carry the traversal and authoring logic shared by all grouping wrapper
//! families.

pub mod context;
pub mod registry;
pub mod xform;

use glam::{DMat4, DVec3};

use crate::holder::schema::{Schema, Xformable};
use crate::holder::PrimHolder;
use crate::refine::{RefineParms, Refiner};
use crate::stage::path::PrimPath;
use crate::stage::{PurposeSet, TimeCode};
use crate::token::{self, Token};
use crate::wrapper::context::{BridgeContext, XformCache};

/// Axis-aligned bounds, one box per motion segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    #[must_use]
    pub fn empty() -> Self {
        BoundingBox {
            min: DVec3::INFINITY,
            max: DVec3::NEG_INFINITY,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn union_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Runtime-facing surface of a bridge wrapper.
pub trait PrimWrapper {
    /// Wrapper family name, also the key under which the family's stable
    /// type id is registered.
    fn class_name(&self) -> &'static str;

    /// Stable id of this wrapper family, constant for the process lifetime.
    fn unique_type_id(&self) -> i64;

    /// True when either the read or the write binding is active and
    /// well-formed.
    fn is_valid(&self) -> bool;

    /// Path of the bound prim, when any binding is active.
    fn path(&self) -> Option<&PrimPath>;

    /// Decomposes the bound prim into lower-level primitives, handing each
    /// to `refiner`. Consumes the read lock internally. Returns whether
    /// anything was produced; refining an unbound wrapper produces nothing
    /// and logs an error.
    fn refine(&self, refiner: &mut dyn Refiner, parms: &RefineParms) -> bool;

    /// Enlarges `boxes` (one per motion segment) by this prim's bounds.
    ///
    /// Not implemented yet: leaves the boxes untouched. Callers must not
    /// rely on this for correctness.
    fn extend_bounds(&self, _boxes: &mut [BoundingBox]) {}

    /// Number of motion segments this prim carries. Defaults to 1.
    fn motion_segments(&self) -> usize {
        1
    }

    /// Approximate retained memory in bytes.
    ///
    /// Not implemented yet: reports 0. Callers must not rely on this for
    /// correctness.
    fn memory_usage(&self) -> u64 {
        0
    }

    /// Duplicates the wrapper; bindings are shared (refcounted), never
    /// deep-copied, and the copy locks against the same document lock.
    fn soft_copy(&self) -> Box<dyn PrimWrapper>;

    /// Authors the source prim's local transform onto the write binding at
    /// the context's time. Returns false on a wrapper with no write
    /// binding.
    fn update_from_source(
        &self,
        _local_xform: DMat4,
        _ctxt: &BridgeContext,
        _xform_cache: &mut XformCache,
    ) -> bool {
        false
    }
}

// ============================================================================
// Shared group-wrapper logic
// ============================================================================

/// Refines a group prim by emitting one read wrapper per child, filtered by
/// purpose. Child paths and types are collected under a single read scope;
/// wrapper construction happens after the scope is released, so factory
/// constructors may lock freely.
pub(crate) fn refine_group<S: Schema>(
    read: &PrimHolder<S>,
    time: TimeCode,
    purposes: PurposeSet,
    refiner: &mut dyn Refiner,
    parms: &RefineParms,
) -> bool {
    let children: Vec<(PrimPath, Token)> = {
        let scope = read.acquire_read();
        scope
            .prim()
            .children()
            .iter()
            .filter_map(|&key| scope.data().prim(key))
            .filter(|prim| parms.include_all_purposes || purposes.intersects(prim.purpose()))
            .map(|prim| (prim.path().clone(), prim.type_name()))
            .collect()
    };

    let mut produced = false;
    for (path, type_name) in children {
        match registry::new_read_wrapper(type_name, read.stage(), &path, time, purposes) {
            Some(wrapper) => {
                refiner.add_primitive(wrapper);
                produced = true;
            }
            None => {
                log::debug!(
                    "No read wrapper registered for type '{}' at '{path}', skipping",
                    token::resolve(type_name)
                );
            }
        }
    }
    produced
}

/// Authors a group prim's local transform at the context time and records
/// the composed world transform in the cache for descendants.
pub(crate) fn update_group_from_source(
    write: &PrimHolder<Xformable>,
    local_xform: DMat4,
    ctxt: &BridgeContext,
    xform_cache: &mut XformCache,
) -> bool {
    {
        let mut scope = write.acquire_write();
        scope.prim_mut().set_transform(ctxt.time, local_xform);
    }
    let parent_world = write
        .path()
        .parent()
        .and_then(|p| xform_cache.get(&p).copied())
        .unwrap_or(DMat4::IDENTITY);
    xform_cache.insert(write.path().clone(), parent_world * local_xform);
    true
}

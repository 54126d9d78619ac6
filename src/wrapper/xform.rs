//! Transform bridge wrapper.
//!
//! Mirrors one transform node between the procedural-geometry runtime and
//! the stage. Write-bound wrappers define a new structural prim or overlay
//! an existing one and author its local transform; read-bound wrappers
//! traverse the prim's children during refinement.
//!
//! When overriding an existing prim, the write binding carries the widened
//! [`Xformable`] capability: an overlay export that encounters a prim of
//! another type still authors just the transform onto it.

use glam::DMat4;
use parking_lot::Mutex;

use crate::errors::{BridgeError, Result};
use crate::holder::schema::{Xform, Xformable};
use crate::holder::{ImageableView, PrimHolder};
use crate::refine::{RefineParms, Refiner};
use crate::stage::path::PrimPath;
use crate::stage::stage::StagePtr;
use crate::stage::{PurposeSet, TimeCode};
use crate::token;
use crate::wrapper::context::{BridgeContext, XformCache};
use crate::wrapper::{registry, update_group_from_source};
use crate::wrapper::{refine_group, PrimWrapper};

/// Derived values computed from a binding. Rebinding bumps the generation
/// and drops every cached value; accessors only trust entries carrying the
/// current generation.
#[derive(Clone, Default)]
struct DerivedCache {
    generation: u64,
    motion_segments: Option<(u64, usize)>,
}

/// Bridge wrapper for a transform prim.
pub struct XformWrapper {
    time: TimeCode,
    purposes: PurposeSet,
    read: Option<PrimHolder<Xform>>,
    write: Option<PrimHolder<Xformable>>,
    created: bool,
    cache: Mutex<DerivedCache>,
}

impl Clone for XformWrapper {
    fn clone(&self) -> Self {
        XformWrapper {
            time: self.time,
            purposes: self.purposes,
            read: self.read.clone(),
            write: self.write.clone(),
            created: self.created,
            cache: Mutex::new(self.cache.lock().clone()),
        }
    }
}

impl XformWrapper {
    const CLASS_NAME: &'static str = "XformWrapper";

    fn unbound(time: TimeCode, purposes: PurposeSet) -> Self {
        XformWrapper {
            time,
            purposes,
            read: None,
            write: None,
            created: false,
            cache: Mutex::new(DerivedCache::default()),
        }
    }

    /// Binds a wrapper for export at `path`.
    ///
    /// Definition failure yields an invalid wrapper plus a logged warning,
    /// never an error: an interactive export must survive partial document
    /// states. Check [`PrimWrapper::is_valid`] before authoring.
    #[must_use]
    pub fn define_for_write(stage: &StagePtr, path: &PrimPath, ctxt: &BridgeContext) -> Self {
        let mut wrapper = Self::unbound(ctxt.time, ctxt.purposes);
        wrapper.init_prim(stage, path, ctxt.overlay);
        wrapper
    }

    /// Binds a wrapper for import of the prim at `path`, qualified by time
    /// and purposes. A missing or mistyped prim yields a wrapper whose
    /// read-side operations fail later.
    #[must_use]
    pub fn define_for_read(
        stage: &StagePtr,
        path: &PrimPath,
        time: TimeCode,
        purposes: PurposeSet,
    ) -> Self {
        let mut wrapper = Self::unbound(time, purposes);
        match PrimHolder::bind(stage, path) {
            Ok(holder) => wrapper.read = Some(holder),
            Err(err) => log::debug!("Read bind of xform '{path}' deferred failure: {err}"),
        }
        wrapper
    }

    /// Re-targets this wrapper to a new path/override mode, invalidating
    /// all cached derived values. Returns whether the resulting binding is
    /// valid.
    pub fn redefine(&mut self, stage: &StagePtr, path: &PrimPath, ctxt: &BridgeContext) -> bool {
        let bound = self.init_prim(stage, path, ctxt.overlay);
        self.clear_caches();
        bound
    }

    /// Whether the last write bind defined a new prim (as opposed to
    /// overriding an existing one).
    #[inline]
    #[must_use]
    pub fn created(&self) -> bool {
        self.created
    }

    /// The read binding, surfacing unbound use as an error.
    pub fn read_holder(&self) -> Result<&PrimHolder<Xform>> {
        self.read.as_ref().ok_or_else(|| BridgeError::InvalidHandle {
            context: format!("{} has no read binding", Self::CLASS_NAME),
        })
    }

    /// The write binding, surfacing unbound use as an error.
    pub fn write_holder(&self) -> Result<&PrimHolder<Xformable>> {
        self.write.as_ref().ok_or_else(|| BridgeError::InvalidHandle {
            context: format!("{} has no write binding", Self::CLASS_NAME),
        })
    }

    /// Runs `f` against a widened, read-only view of the bound prim under
    /// a single read scope. The view reuses the scope's lock and cannot
    /// escape `f`.
    pub fn with_imageable<R>(&self, f: impl FnOnce(&ImageableView<'_>) -> R) -> Result<R> {
        let read = self.read_holder()?;
        let scope = read.acquire_read();
        Ok(f(&scope.as_imageable()))
    }

    fn init_prim(&mut self, stage: &StagePtr, path: &PrimPath, as_override: bool) -> bool {
        // Transient unbound state while rebinding.
        self.read = None;
        self.write = None;

        let mut created = true;
        let defined = if as_override {
            if stage.prim_at_path(path).is_some() {
                created = false;
                stage.override_prim(path)
            } else {
                let defined = stage.define_prim(path, Xform::type_token());
                if defined.is_ok() {
                    repair_untyped_ancestors(stage, path);
                }
                defined
            }
        } else {
            stage.define_prim(path, Xform::type_token())
        };
        self.created = created;

        match defined.and_then(|_| PrimHolder::bind(stage, path)) {
            Ok(holder) => {
                self.write = Some(holder);
                true
            }
            Err(err) => {
                log::warn!(
                    "Unable to create {} xform '{path}': {err}",
                    if created { "new" } else { "override" }
                );
                false
            }
        }
    }

    fn clear_caches(&mut self) {
        let cache = self.cache.get_mut();
        cache.generation += 1;
        cache.motion_segments = None;
    }

    #[cfg(test)]
    fn cache_generation(&self) -> u64 {
        self.cache.lock().generation
    }
}

/// Re-types ancestors that pre-exist as typeless `over` specs, walking
/// upwards until the first typed ancestor. Keeps the composed type
/// hierarchy consistent after defining under an overlay root.
fn repair_untyped_ancestors(stage: &StagePtr, path: &PrimPath) {
    let mut parent = path.parent();
    while let Some(ancestor) = parent {
        if ancestor.is_root() {
            break;
        }
        let untyped = stage
            .prim_at_path(&ancestor)
            .and_then(|key| stage.type_name_of(key))
            .is_some_and(|t| t == token::empty());
        if !untyped {
            break;
        }
        if stage.define_prim(&ancestor, Xform::type_token()).is_err() {
            break;
        }
        parent = ancestor.parent();
    }
}

impl PrimWrapper for XformWrapper {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn unique_type_id(&self) -> i64 {
        registry::wrapper_type_id(Self::CLASS_NAME)
    }

    fn is_valid(&self) -> bool {
        self.read.is_some() || self.write.is_some()
    }

    fn path(&self) -> Option<&PrimPath> {
        self.read
            .as_ref()
            .map(PrimHolder::path)
            .or_else(|| self.write.as_ref().map(PrimHolder::path))
    }

    fn refine(&self, refiner: &mut dyn Refiner, parms: &RefineParms) -> bool {
        match self.read_holder() {
            Ok(read) => refine_group(read, self.time, self.purposes, refiner, parms),
            Err(err) => {
                log::error!("Cannot refine: {err}");
                false
            }
        }
    }

    fn motion_segments(&self) -> usize {
        let Some(read) = &self.read else {
            return 1;
        };
        let mut cache = self.cache.lock();
        let generation = cache.generation;
        if let Some((cached_gen, segments)) = cache.motion_segments {
            if cached_gen == generation {
                return segments;
            }
        }
        let segments = read.acquire_read().prim().transform_sample_count().max(1);
        cache.motion_segments = Some((generation, segments));
        segments
    }

    fn soft_copy(&self) -> Box<dyn PrimWrapper> {
        Box::new(self.clone())
    }

    fn update_from_source(
        &self,
        local_xform: DMat4,
        ctxt: &BridgeContext,
        xform_cache: &mut XformCache,
    ) -> bool {
        let Some(write) = &self.write else {
            return false;
        };
        update_group_from_source(write, local_xform, ctxt, xform_cache)
    }
}

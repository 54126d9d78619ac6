//! Proxy-locked prim handles.
//!
//! A [`PrimHolder`] is a shared, refcounted reference to one prim in a
//! stage. It never hands out an unscoped reference to the prim: all access
//! goes through a stack-scoped [`ReadScope`] or [`WriteScope`] acquired
//! against the document-wide lock. Holders bound to the same stage share
//! that lock, so two independently constructed holders on the same path
//! still mutually exclude each other.
//!
//! # Lock contract
//!
//! - Any number of read scopes may be live at once; they never block each
//!   other.
//! - A write scope is exclusive against all read and write scopes.
//! - Acquisition blocks (unbounded, no timeout) until the lock is
//!   available; release happens on every exit path when the scope drops.
//! - A scope borrows its holder and cannot outlive it.
//!
//! Capability widening during traversal goes through
//! [`ReadScope::as_imageable`], which reuses the already-held scope instead
//! of re-acquiring the lock; the resulting [`ImageableView`] borrows the
//! scope and never manages the lock's lifetime itself.

pub mod schema;

use std::marker::PhantomData;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{BridgeError, Result};
use crate::stage::path::PrimPath;
use crate::stage::prim::Prim;
use crate::stage::stage::{StageData, StagePtr};
use crate::stage::PrimKey;
use crate::holder::schema::{Imageable, Schema};

/// Shared handle to one prim, typed by the capability it grants.
///
/// Cloning shares the underlying stage (and therefore its lock); dropping
/// only releases the local reference and never touches the document.
pub struct PrimHolder<S: Schema> {
    stage: StagePtr,
    path: PrimPath,
    key: PrimKey,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> Clone for PrimHolder<S> {
    fn clone(&self) -> Self {
        PrimHolder {
            stage: self.stage.clone(),
            path: self.path.clone(),
            key: self.key,
            _schema: PhantomData,
        }
    }
}

impl<S: Schema> PrimHolder<S> {
    /// Binds to the existing prim at `path`, checking the capability.
    pub fn bind(stage: &StagePtr, path: &PrimPath) -> Result<Self> {
        let key = {
            let data = stage.lock_read();
            let key = data
                .key_at_path(path)
                .ok_or_else(|| BridgeError::PrimNotFound(path.clone()))?;
            let prim = data.prim(key).ok_or_else(|| BridgeError::PrimNotFound(path.clone()))?;
            if !S::can_hold(prim) {
                return Err(BridgeError::InvalidHandle {
                    context: format!("prim '{path}' cannot be held as {}", S::schema_name()),
                });
            }
            key
        };
        Ok(Self::from_parts(stage.clone(), path.clone(), key))
    }

    /// Constructs a holder from parts already resolved under an active
    /// guard. Takes no lock; used when a scope is held and re-acquisition
    /// would self-deadlock (e.g. building child holders during refinement).
    pub(crate) fn from_parts(stage: StagePtr, path: PrimPath, key: PrimKey) -> Self {
        PrimHolder {
            stage,
            path,
            key,
            _schema: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &PrimPath {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> &StagePtr {
        &self.stage
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> PrimKey {
        self.key
    }

    /// Acquires a shared read scope. Blocks only while a writer holds the
    /// document lock.
    #[must_use]
    pub fn acquire_read(&self) -> ReadScope<'_, S> {
        ReadScope {
            guard: self.stage.lock_read(),
            holder: self,
        }
    }

    /// Acquires an exclusive write scope. Blocks until no other scope on
    /// this document is live.
    #[must_use]
    pub fn acquire_write(&self) -> WriteScope<'_, S> {
        WriteScope {
            guard: self.stage.lock_write(),
            holder: self,
        }
    }
}

// ============================================================================
// Scoped access
// ============================================================================

/// Shared read access to a holder's prim, released on drop.
pub struct ReadScope<'a, S: Schema> {
    guard: RwLockReadGuard<'a, StageData>,
    holder: &'a PrimHolder<S>,
}

impl<'a, S: Schema> ReadScope<'a, S> {
    /// The bound prim.
    ///
    /// # Panics
    /// Panics if the prim was removed from the stage while the holder was
    /// bound; the stage offers no removal operation, so this is an internal
    /// invariant.
    #[must_use]
    pub fn prim(&self) -> &Prim {
        self.guard
            .prim(self.holder.key)
            .expect("bound prim present while scope is held")
    }

    /// Read access to the whole document under the same scope, for
    /// traversal of related prims.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &StageData {
        &self.guard
    }

    /// Widens this scope's prim to the imageable capability, reusing the
    /// already-held lock. The view borrows this scope and cannot outlive
    /// it; lock ownership stays here.
    #[must_use]
    pub fn as_imageable(&self) -> ImageableView<'_> {
        ImageableView { prim: self.prim() }
    }

    /// A holder for another prim visible under this scope, constructed
    /// without re-acquiring the lock.
    pub fn holder_for<T: Schema>(&self, key: PrimKey) -> Result<PrimHolder<T>> {
        let prim = self.guard.prim(key).ok_or_else(|| BridgeError::InvalidHandle {
            context: "stale prim key passed to holder_for".to_string(),
        })?;
        if !T::can_hold(prim) {
            return Err(BridgeError::InvalidHandle {
                context: format!(
                    "prim '{}' cannot be held as {}",
                    prim.path(),
                    T::schema_name()
                ),
            });
        }
        Ok(PrimHolder::from_parts(
            self.holder.stage.clone(),
            prim.path().clone(),
            key,
        ))
    }
}

/// Exclusive write access to a holder's prim, released on drop.
pub struct WriteScope<'a, S: Schema> {
    guard: RwLockWriteGuard<'a, StageData>,
    holder: &'a PrimHolder<S>,
}

impl<'a, S: Schema> WriteScope<'a, S> {
    /// See [`ReadScope::prim`] for the panic condition.
    #[must_use]
    pub fn prim(&self) -> &Prim {
        self.guard
            .prim(self.holder.key)
            .expect("bound prim present while scope is held")
    }

    #[must_use]
    pub fn prim_mut(&mut self) -> &mut Prim {
        self.guard
            .prim_mut(self.holder.key)
            .expect("bound prim present while scope is held")
    }
}

/// Weakly-typed, read-only view of a prim, borrowed from a live
/// [`ReadScope`]. Never owns or releases the lock.
pub struct ImageableView<'v> {
    prim: &'v Prim,
}

impl<'v> ImageableView<'v> {
    #[inline]
    #[must_use]
    pub fn prim(&self) -> &Prim {
        self.prim
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &PrimPath {
        self.prim.path()
    }
}

/// Convenience alias for the widest read holder.
pub type ImageableHolder = PrimHolder<Imageable>;

//! The stage: prim storage plus the document-wide reader/writer lock.
//!
//! All handles bound into the same [`Stage`] share one `RwLock`, so locking
//! is document-wide rather than per-handle: two independently constructed
//! handles on the same path still mutually exclude each other. Scoped
//! access goes through [`PrimHolder`](crate::holder::PrimHolder); the raw
//! guards never leave the crate.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::errors::{BridgeError, Result};
use crate::stage::path::PrimPath;
use crate::stage::prim::{Prim, Specifier};
use crate::stage::PrimKey;
use crate::token::{self, Token};

/// Fallback structural type assigned to ancestors auto-created by
/// [`Stage::define_prim`], keeping the composed type hierarchy consistent.
pub const DEFAULT_STRUCTURAL_TYPE: &str = "Xform";

/// Shared, refcounted stage handle. Copies share the document lock.
pub type StagePtr = Arc<Stage>;

/// Prim storage, protected by the stage lock.
pub struct StageData {
    prims: SlotMap<PrimKey, Prim>,
    lookup: FxHashMap<PrimPath, PrimKey>,
}

impl StageData {
    #[inline]
    #[must_use]
    pub fn prim(&self, key: PrimKey) -> Option<&Prim> {
        self.prims.get(key)
    }

    #[inline]
    pub(crate) fn prim_mut(&mut self, key: PrimKey) -> Option<&mut Prim> {
        self.prims.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn key_at_path(&self, path: &PrimPath) -> Option<PrimKey> {
        self.lookup.get(path).copied()
    }

    fn insert(
        &mut self,
        path: &PrimPath,
        type_name: Token,
        specifier: Specifier,
    ) -> PrimKey {
        let parent_key = path.parent().and_then(|p| self.key_at_path(&p));
        let mut prim = Prim::new(path.clone(), type_name, specifier);
        prim.parent = parent_key;
        let key = self.prims.insert(prim);
        self.lookup.insert(path.clone(), key);
        if let Some(pk) = parent_key {
            self.prims[pk].children.push(key);
        }
        key
    }
}

/// The composed scene-description document.
pub struct Stage {
    read_only: bool,
    inner: RwLock<StageData>,
}

impl Stage {
    /// Creates an empty, writable in-memory stage.
    #[must_use]
    pub fn in_memory() -> StagePtr {
        Arc::new(Stage {
            read_only: false,
            inner: RwLock::new(StageData {
                prims: SlotMap::with_key(),
                lookup: FxHashMap::default(),
            }),
        })
    }

    /// Snapshots this stage into a read-only copy, as handed to read-side
    /// import pipelines. Definition on the copy fails with
    /// [`BridgeError::ReadOnlyStage`].
    #[must_use]
    pub fn open_read_only(&self) -> StagePtr {
        let guard = self.inner.read();
        Arc::new(Stage {
            read_only: true,
            inner: RwLock::new(StageData {
                prims: guard.prims.clone(),
                lookup: guard.lookup.clone(),
            }),
        })
    }

    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    // ========================================================================
    // Definition
    // ========================================================================

    /// Defines (or re-types) the prim at `path` as a `Def` of `type_name`,
    /// preserving the identity of an already-existing prim.
    ///
    /// Missing ancestors are created as `Def`s of
    /// [`DEFAULT_STRUCTURAL_TYPE`]; existing ancestors are left untouched.
    pub fn define_prim(&self, path: &PrimPath, type_name: Token) -> Result<PrimKey> {
        self.check_definable(path)?;
        let mut data = self.inner.write();

        let structural = token::intern(DEFAULT_STRUCTURAL_TYPE);
        let mut ancestor = PrimPath::root();
        let depth = path.depth();
        for component in path.components().take(depth - 1) {
            ancestor = ancestor.child(component);
            if data.key_at_path(&ancestor).is_none() {
                data.insert(&ancestor, structural, Specifier::Def);
            }
        }

        if let Some(key) = data.key_at_path(path) {
            let prim = &mut data.prims[key];
            prim.set_type_name(type_name);
            prim.specifier = Specifier::Def;
            Ok(key)
        } else {
            Ok(data.insert(path, type_name, Specifier::Def))
        }
    }

    /// Returns the prim at `path` for sparse overriding, creating a
    /// typeless `Over` (with typeless `Over` ancestors) when absent.
    pub fn override_prim(&self, path: &PrimPath) -> Result<PrimKey> {
        self.check_definable(path)?;
        let mut data = self.inner.write();

        let empty = token::empty();
        let mut ancestor = PrimPath::root();
        let depth = path.depth();
        for component in path.components().take(depth - 1) {
            ancestor = ancestor.child(component);
            if data.key_at_path(&ancestor).is_none() {
                data.insert(&ancestor, empty, Specifier::Over);
            }
        }

        match data.key_at_path(path) {
            Some(key) => Ok(key),
            None => Ok(data.insert(path, empty, Specifier::Over)),
        }
    }

    fn check_definable(&self, path: &PrimPath) -> Result<()> {
        if path.is_root() {
            return Err(BridgeError::InvalidPath(path.to_string()));
        }
        if self.read_only {
            return Err(BridgeError::ReadOnlyStage(path.clone()));
        }
        Ok(())
    }

    // ========================================================================
    // Read-side queries
    // ========================================================================

    #[must_use]
    pub fn prim_at_path(&self, path: &PrimPath) -> Option<PrimKey> {
        self.inner.read().key_at_path(path)
    }

    #[must_use]
    pub fn path_of(&self, key: PrimKey) -> Option<PrimPath> {
        self.inner.read().prim(key).map(|p| p.path().clone())
    }

    #[must_use]
    pub fn parent_of(&self, key: PrimKey) -> Option<PrimKey> {
        self.inner.read().prim(key).and_then(Prim::parent)
    }

    #[must_use]
    pub fn type_name_of(&self, key: PrimKey) -> Option<Token> {
        self.inner.read().prim(key).map(Prim::type_name)
    }

    #[must_use]
    pub fn prim_count(&self) -> usize {
        self.inner.read().prims.len()
    }

    // ========================================================================
    // Document lock
    // ========================================================================

    // The raw guards stay crate-internal; external callers lock through
    // `PrimHolder` scopes only.

    pub(crate) fn lock_read(&self) -> RwLockReadGuard<'_, StageData> {
        self.inner.read()
    }

    pub(crate) fn lock_write(&self) -> RwLockWriteGuard<'_, StageData> {
        self.inner.write()
    }
}

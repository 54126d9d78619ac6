//! Process-wide wrapper registries.
//!
//! Two registries live here, both explicit process-wide state initialized
//! once and read thereafter:
//!
//! - The **type-id registry** hands out one stable `i64` per wrapper family
//!   name. Ids are constant for the process lifetime but not across runs.
//! - The **read-factory registry** maps prim type tokens to constructors
//!   used during refinement to build child wrappers. The built-in
//!   [`XformWrapper`](super::xform::XformWrapper) is pre-registered for the
//!   structural type.

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::holder::schema::Xform;
use crate::stage::path::PrimPath;
use crate::stage::stage::StagePtr;
use crate::stage::{PurposeSet, TimeCode};
use crate::token::Token;
use crate::wrapper::xform::XformWrapper;
use crate::wrapper::PrimWrapper;

// ============================================================================
// Type ids
// ============================================================================

struct TypeIdRegistry {
    next: i64,
    ids: FxHashMap<&'static str, i64>,
}

static TYPE_IDS: Lazy<Mutex<TypeIdRegistry>> = Lazy::new(|| {
    Mutex::new(TypeIdRegistry {
        next: 1,
        ids: FxHashMap::default(),
    })
});

/// Returns the stable type id of a wrapper family, allocating one on first
/// use.
#[must_use]
pub fn wrapper_type_id(family: &'static str) -> i64 {
    let mut reg = TYPE_IDS.lock();
    if let Some(&id) = reg.ids.get(family) {
        return id;
    }
    let id = reg.next;
    reg.next += 1;
    reg.ids.insert(family, id);
    id
}

// ============================================================================
// Read-wrapper factories
// ============================================================================

/// Constructor for a read-bound wrapper of one prim type.
///
/// Called after any refinement scope has been released; constructors may
/// acquire the stage lock.
pub type ReadWrapperCtor =
    fn(&StagePtr, &PrimPath, TimeCode, PurposeSet) -> Box<dyn PrimWrapper>;

fn xform_read_ctor(
    stage: &StagePtr,
    path: &PrimPath,
    time: TimeCode,
    purposes: PurposeSet,
) -> Box<dyn PrimWrapper> {
    Box::new(XformWrapper::define_for_read(stage, path, time, purposes))
}

static READ_FACTORIES: Lazy<RwLock<FxHashMap<Token, ReadWrapperCtor>>> = Lazy::new(|| {
    let mut factories = FxHashMap::default();
    factories.insert(Xform::type_token(), xform_read_ctor as ReadWrapperCtor);
    RwLock::new(factories)
});

/// Registers (or replaces) the read-wrapper constructor for a prim type.
pub fn register_read_wrapper(type_name: Token, ctor: ReadWrapperCtor) {
    READ_FACTORIES.write().insert(type_name, ctor);
}

/// Builds a read wrapper for a prim of the given type, or `None` when no
/// family is registered for it.
#[must_use]
pub fn new_read_wrapper(
    type_name: Token,
    stage: &StagePtr,
    path: &PrimPath,
    time: TimeCode,
    purposes: PurposeSet,
) -> Option<Box<dyn PrimWrapper>> {
    let ctor = *READ_FACTORIES.read().get(&type_name)?;
    Some(ctor(stage, path, time, purposes))
}

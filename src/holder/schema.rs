//! Schema capability markers.
//!
//! A [`PrimHolder`](crate::holder::PrimHolder) is typed by the capability it
//! grants, not by the prim's concrete type. The markers form a widening
//! chain: `Xform` (the specific structural type) ⊂ `Xformable` (any typed
//! prim whose transform may be authored) ⊂ `Imageable` (anything that can
//! appear in a read traversal).
//!
//! Overriding binds use `Xformable` deliberately: when writing an overlay
//! onto an existing prim of another type, only the transform opinion is
//! authored, so the handle carries the most general capability needed
//! rather than the most specific type.

use crate::stage::prim::Prim;
use crate::stage::stage::DEFAULT_STRUCTURAL_TYPE;
use crate::token::{self, Token};

/// Marker trait for holder capabilities.
pub trait Schema: 'static {
    /// Human-readable capability name for diagnostics.
    fn schema_name() -> &'static str;

    /// Whether a holder of this capability may bind the given prim.
    fn can_hold(prim: &Prim) -> bool;
}

/// The specific structural transform type.
pub struct Xform;

impl Xform {
    /// The type token prims of this schema are defined with.
    #[must_use]
    pub fn type_token() -> Token {
        token::intern(DEFAULT_STRUCTURAL_TYPE)
    }
}

impl Schema for Xform {
    fn schema_name() -> &'static str {
        "Xform"
    }

    fn can_hold(prim: &Prim) -> bool {
        prim.type_name() == Xform::type_token()
    }
}

/// Any typed prim whose local transform may be read or authored.
pub struct Xformable;

impl Schema for Xformable {
    fn schema_name() -> &'static str {
        "Xformable"
    }

    fn can_hold(prim: &Prim) -> bool {
        prim.has_type()
    }
}

/// The widest read capability: any prim reachable by traversal.
pub struct Imageable;

impl Schema for Imageable {
    fn schema_name() -> &'static str {
        "Imageable"
    }

    fn can_hold(_prim: &Prim) -> bool {
        true
    }
}

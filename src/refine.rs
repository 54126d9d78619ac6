//! Refinement seam.
//!
//! A [`Refiner`] is the external consumer that decomposes a wrapper prim
//! into lower-level primitives: the bridge walks the stage and hands each
//! resulting wrapper to the refiner, which owns whatever happens next
//! (collection, conversion, further refinement).

use crate::wrapper::PrimWrapper;

/// Consumer of refined primitives.
pub trait Refiner {
    /// Receives one primitive produced by refinement.
    fn add_primitive(&mut self, prim: Box<dyn PrimWrapper>);
}

/// Parameters steering refinement.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefineParms {
    /// Emit children regardless of their visibility purpose instead of
    /// filtering against the wrapper's purpose set.
    pub include_all_purposes: bool,
}

//! Global string interner.
//!
//! Prim type names, prim names and purpose names are compared and hashed
//! constantly during traversal; interning turns them into compact integer
//! [`Token`]s so those operations never touch string data.

use lasso::{Spur, ThreadedRodeo};
use once_cell::sync::Lazy;

/// Global interner instance.
static INTERNER: Lazy<ThreadedRodeo> = Lazy::new(ThreadedRodeo::new);

/// A compact integer identifier for an interned string.
pub type Token = Spur;

/// Interns a string, returning its [`Token`].
///
/// Returns the existing token when the string was interned before.
#[inline]
pub fn intern(s: &str) -> Token {
    INTERNER.get_or_intern(s)
}

/// Looks up the [`Token`] of an already-interned string without allocating.
#[inline]
#[must_use]
pub fn get(s: &str) -> Option<Token> {
    INTERNER.get(s)
}

/// Resolves a [`Token`] back to its string.
///
/// # Panics
/// Panics if the token did not come from this interner (does not normally
/// happen).
#[inline]
#[must_use]
pub fn resolve(sym: Token) -> &'static str {
    INTERNER.resolve(&sym)
}

/// The token for the empty string, used as the type name of typeless prims
/// (`over` specs whose concrete type is supplied by a stronger layer).
#[inline]
#[must_use]
pub fn empty() -> Token {
    INTERNER.get_or_intern_static("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let a = intern("Xform");
        let b = intern("Xform");
        assert_eq!(a, b);
        assert_eq!(resolve(a), "Xform");
    }

    #[test]
    fn get_does_not_intern() {
        assert!(get("NeverInternedTypeName").is_none());
    }
}

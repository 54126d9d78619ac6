//! Prim records.
//!
//! A [`Prim`] is one addressable node in the stage namespace. The bridge
//! only authors and resolves the pieces the transform wrapper needs:
//! identity (name/type tokens), the def/over specifier, a visibility
//! purpose, hierarchy links and a time-sampled local transform.

use glam::DMat4;

use crate::stage::path::PrimPath;
use crate::stage::{PrimKey, PurposeSet, TimeCode};
use crate::token::{self, Token};

/// Whether a prim is a concrete definition or a sparse override spec.
///
/// An `Over` carries opinions for a prim whose definition lives in a
/// stronger layer; it may be typeless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Specifier {
    Def,
    Over,
}

/// A single prim in a stage.
#[derive(Clone, Debug)]
pub struct Prim {
    // === Identity ===
    pub(crate) path: PrimPath,
    pub(crate) name: Token,
    pub(crate) type_name: Token,
    pub(crate) specifier: Specifier,

    // === Hierarchy ===
    pub(crate) parent: Option<PrimKey>,
    pub(crate) children: Vec<PrimKey>,

    // === Read-traversal filtering ===
    pub(crate) purpose: PurposeSet,

    // === Authored local transform ===
    default_transform: Option<DMat4>,
    transform_samples: Vec<(f64, DMat4)>,
}

impl Prim {
    pub(crate) fn new(path: PrimPath, type_name: Token, specifier: Specifier) -> Self {
        let name = token::intern(path.name());
        Prim {
            path,
            name,
            type_name,
            specifier,
            parent: None,
            children: Vec::new(),
            purpose: PurposeSet::DEFAULT,
            default_transform: None,
            transform_samples: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &PrimPath {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Token {
        self.name
    }

    /// The prim's type token; the empty token for typeless `over` specs.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> Token {
        self.type_name
    }

    #[inline]
    #[must_use]
    pub fn has_type(&self) -> bool {
        self.type_name != token::empty()
    }

    #[inline]
    #[must_use]
    pub fn specifier(&self) -> Specifier {
        self.specifier
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<PrimKey> {
        self.parent
    }

    /// Child prim keys in definition order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[PrimKey] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn purpose(&self) -> PurposeSet {
        self.purpose
    }

    pub fn set_purpose(&mut self, purpose: PurposeSet) {
        self.purpose = purpose;
    }

    pub(crate) fn set_type_name(&mut self, type_name: Token) {
        self.type_name = type_name;
    }

    // ========================================================================
    // Local transform attribute
    // ========================================================================

    /// Authors the local transform at `time`. The default time replaces the
    /// static value; a numbered time inserts or replaces a sample.
    pub fn set_transform(&mut self, time: TimeCode, matrix: DMat4) {
        match time.frame() {
            None => self.default_transform = Some(matrix),
            Some(frame) => {
                match self
                    .transform_samples
                    .binary_search_by(|(t, _)| t.partial_cmp(&frame).expect("non-NaN sample time"))
                {
                    Ok(idx) => self.transform_samples[idx].1 = matrix,
                    Err(idx) => self.transform_samples.insert(idx, (frame, matrix)),
                }
            }
        }
    }

    /// Resolves the local transform at `time` with held interpolation:
    /// the sample at or before `time`, the first sample before the range,
    /// then the static value, then identity.
    #[must_use]
    pub fn transform(&self, time: TimeCode) -> DMat4 {
        if let Some(frame) = time.frame() {
            let at_or_before = self
                .transform_samples
                .iter()
                .take_while(|(t, _)| *t <= frame)
                .last();
            if let Some((_, m)) = at_or_before {
                return *m;
            }
            if let Some((_, m)) = self.transform_samples.first() {
                return *m;
            }
        }
        self.default_transform.unwrap_or(DMat4::IDENTITY)
    }

    /// Number of authored time samples (excludes the static value).
    #[inline]
    #[must_use]
    pub fn transform_sample_count(&self) -> usize {
        self.transform_samples.len()
    }
}

//! Error Types
//!
//! This module defines the error types used throughout the bridge.
//!
//! # Overview
//!
//! The main error type [`BridgeError`] covers all failure modes including:
//! - Malformed prim paths
//! - Prim definition failures on read-only stages
//! - Read-side lookups of missing prims
//! - Operations attempted through unbound wrapper handles
//!
//! Definition failures inside the wrapper layer are deliberately *not*
//! propagated as errors: in an interactive authoring session a failed
//! define degrades to an invalid binding plus a logged warning, and the
//! surrounding export keeps running. `BridgeError` is for the cases a
//! caller must handle explicitly.

use crate::stage::path::PrimPath;
use thiserror::Error;

/// The main error type for the stage bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    // ========================================================================
    // Path & Definition Errors
    // ========================================================================
    /// The path is empty, relative, or names the pseudo-root where a
    /// concrete prim is required.
    #[error("Invalid prim path: '{0}'")]
    InvalidPath(String),

    /// A prim definition was attempted on a stage opened for read only.
    #[error("Stage is read-only, cannot define prim at '{0}'")]
    ReadOnlyStage(PrimPath),

    // ========================================================================
    // Read-Side Errors
    // ========================================================================
    /// No prim exists at the requested path.
    #[error("No prim at path '{0}'")]
    PrimNotFound(PrimPath),

    // ========================================================================
    // Handle Misuse
    // ========================================================================
    /// An operation was attempted through a wrapper whose binding failed
    /// or was never established. This is a caller error and is surfaced
    /// rather than silently tolerated.
    #[error("Invalid handle use: {context}")]
    InvalidHandle {
        /// Description of the attempted operation
        context: String,
    },
}

/// Alias for `Result<T, BridgeError>`.
pub type Result<T> = std::result::Result<T, BridgeError>;

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod holder;
pub mod refine;
pub mod stage;
pub mod token;
pub mod wrapper;

pub use errors::{BridgeError, Result};
pub use holder::schema::{Imageable, Schema, Xform, Xformable};
pub use holder::{ImageableView, PrimHolder, ReadScope, WriteScope};
pub use refine::{RefineParms, Refiner};
pub use stage::path::PrimPath;
pub use stage::prim::{Prim, Specifier};
pub use stage::stage::{Stage, StagePtr};
pub use stage::{PrimKey, PurposeSet, TimeCode};
pub use wrapper::context::{BridgeContext, XformCache};
pub use wrapper::registry::{register_read_wrapper, wrapper_type_id};
pub use wrapper::xform::XformWrapper;
pub use wrapper::{BoundingBox, PrimWrapper};

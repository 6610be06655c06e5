//! # ffi-handle
//!
//! Owning smart handles for objects of a foreign reference-counted object
//! system (GObject-style) whose API hands out raw pointers under three
//! ownership contracts:
//!
//! - **transfer full**: the caller receives a reference and must release it,
//! - **floating**: the object carries a transient flag that must be claimed
//!   once before normal reference counting applies,
//! - **transfer none**: the pointer is only borrowed; keeping it requires a
//!   new reference.
//!
//! Mixing them up leaks or over-releases. [`Handle<T>`] makes the contract an
//! explicit choice of entry point and funnels every transition through one
//! release-then-store primitive.
//!
//! ## Features
//!
//! - **Per-type operation tables**: [`ObjectType`] supplies retain/release,
//!   optional floating support and the runtime type check, resolved at
//!   compile time
//! - **Hierarchy without inheritance**: [`IsA`] declares the foreign type
//!   tree; [`upcast`] is checked by the compiler, [`downcast`] by the foreign
//!   runtime and reports [`CastError`] on mismatch
//! - **Always-safe floating claim**: [`Handle::claim_floating`] is a no-op
//!   for types and objects that are not floating
//! - **Opt-in thread safety**: [`ThreadSafeRefs`] makes handles `Send + Sync`
//!
//! ## Quick Start
//!
//! ```rust
//! use ffi_handle::{downcast, upcast, Handle};
//! use ffi_handle_mock::{new_full, GObject, GstPipeline};
//!
//! // A function documented as returning a full reference.
//! let pipeline = unsafe { Handle::<GstPipeline>::from_full(new_full()) };
//! assert_eq!(pipeline.ref_count(), 1);
//!
//! let object: Handle<GObject> = upcast(&pipeline);
//! let again: Handle<GstPipeline> = downcast(&object).unwrap();
//! assert_eq!(again.ref_count(), 3);
//! ```
//!
//! Only registered types can be wrapped:
//!
//! ```compile_fail
//! struct Unregistered;
//! let _handle: ffi_handle::Handle<Unregistered> = ffi_handle::Handle::new();
//! ```

mod cast;
mod error;
mod handle;
mod registry;
mod table;

#[cfg(test)]
mod testing;

pub use cast::{downcast, upcast};
pub use error::{CastError, CastResult};
pub use handle::{Handle, HandleState};
pub use table::{
    Ancestors, FloatingOps, IsA, ObjectType, OpTable, RuntimeType, ThreadSafeRefs, TypeInfo,
};

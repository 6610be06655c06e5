//! # ffi-handle-mock
//!
//! A small in-process object system shaped like GLib/GStreamer, used to
//! exercise `ffi-handle` without linking the real libraries.
//!
//! Every instance carries an atomic reference count and a floating flag.
//! Objects start with one reference (`new_full`) or one floating reference
//! (`new_floating`) and are destroyed when the count drops to zero;
//! [`FinalizeProbe`] counts those destructions so tests can assert that an
//! object was freed exactly once. Dropping below zero trips an assertion.
//!
//! All types are registered with `ffi_handle::object_type!`, so they can be
//! wrapped directly:
//!
//! ```
//! use ffi_handle::Handle;
//! use ffi_handle_mock::{new_floating, GstBin};
//!
//! let bin = unsafe { Handle::<GstBin>::from_floating(new_floating()) };
//! assert_eq!(bin.ref_count(), 1);
//! assert!(!bin.is_floating());
//! ```

mod instance;
mod register;
mod types;

pub use instance::{
    g_type_check_instance_cast, g_type_check_instance_is_a, new_floating, new_floating_tracked,
    new_full, new_full_tracked, ref_count, Class, FinalizeProbe, Instance, TypeInstance, DUMMY,
};
pub use types::*;

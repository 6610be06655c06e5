//! Concrete types and their entry points.
//!
//! ```text
//! GObject ── GstObject ─┬─ GstElement ── GstBin ── GstPipeline
//!                       ├─ GstPad
//!                       └─ GstBus
//! GstMiniObject ─┬─ GstCaps
//!                ├─ GstBuffer
//!                └─ GstEvent
//! GParamSpec
//! GMainLoop
//! ```

use std::ops::Deref;

use ffi_handle::RuntimeType;

use crate::instance::{
    finalize_boxed, instance_is_floating, instance_ref, instance_ref_sink, instance_unref, Class,
    Instance, TypeInstance,
};

pub const G_TYPE_OBJECT: RuntimeType = RuntimeType::from_raw(0x01);
pub const GST_TYPE_OBJECT: RuntimeType = RuntimeType::from_raw(0x02);
pub const GST_TYPE_ELEMENT: RuntimeType = RuntimeType::from_raw(0x03);
pub const GST_TYPE_BIN: RuntimeType = RuntimeType::from_raw(0x04);
pub const GST_TYPE_PIPELINE: RuntimeType = RuntimeType::from_raw(0x05);
pub const GST_TYPE_CAPS: RuntimeType = RuntimeType::from_raw(0x06);
pub const GST_TYPE_BUS: RuntimeType = RuntimeType::from_raw(0x07);
pub const G_TYPE_NONE: RuntimeType = RuntimeType::from_raw(0x08);
pub const G_TYPE_PARAM: RuntimeType = RuntimeType::from_raw(0x09);
pub const GST_TYPE_PAD: RuntimeType = RuntimeType::from_raw(0x0A);
pub const GST_TYPE_BUFFER: RuntimeType = RuntimeType::from_raw(0x0B);
pub const GST_TYPE_EVENT: RuntimeType = RuntimeType::from_raw(0x0C);
pub const GST_TYPE_MINI_OBJECT: RuntimeType = RuntimeType::from_raw(0x0D);

macro_rules! mock_class {
    ($(#[$meta:meta])* $name:ident: TypeInstance = $rt:expr) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Debug)]
        pub struct $name {
            instance: TypeInstance,
        }

        unsafe impl Instance for $name {
            const CLASS: &'static Class =
                &Class::new(stringify!($name), $rt, None, finalize_boxed::<$name>);

            fn wrap(instance: TypeInstance) -> Self {
                Self { instance }
            }
        }

        impl Deref for $name {
            type Target = TypeInstance;

            fn deref(&self) -> &TypeInstance {
                &self.instance
            }
        }
    };
    ($(#[$meta:meta])* $name:ident: $parent:ident = $rt:expr) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Debug)]
        pub struct $name {
            parent: $parent,
        }

        unsafe impl Instance for $name {
            const CLASS: &'static Class = &Class::new(
                stringify!($name),
                $rt,
                Some(<$parent as Instance>::CLASS),
                finalize_boxed::<$name>,
            );

            fn wrap(instance: TypeInstance) -> Self {
                Self {
                    parent: <$parent as Instance>::wrap(instance),
                }
            }
        }

        impl Deref for $name {
            type Target = $parent;

            fn deref(&self) -> &$parent {
                &self.parent
            }
        }
    };
}

mock_class!(
    /// Root of the object hierarchy; supports floating references.
    GObject: TypeInstance = G_TYPE_OBJECT
);
mock_class!(GstObject: GObject = GST_TYPE_OBJECT);
mock_class!(GstElement: GstObject = GST_TYPE_ELEMENT);
mock_class!(GstBin: GstElement = GST_TYPE_BIN);
mock_class!(GstPipeline: GstBin = GST_TYPE_PIPELINE);
mock_class!(GstPad: GstObject = GST_TYPE_PAD);
mock_class!(GstBus: GstObject = GST_TYPE_BUS);
mock_class!(
    /// Lightweight counted object without floating references.
    GstMiniObject: TypeInstance = GST_TYPE_MINI_OBJECT
);
mock_class!(GstCaps: GstMiniObject = GST_TYPE_CAPS);
mock_class!(GstBuffer: GstMiniObject = GST_TYPE_BUFFER);
mock_class!(GstEvent: GstMiniObject = GST_TYPE_EVENT);
mock_class!(GParamSpec: TypeInstance = G_TYPE_PARAM);
mock_class!(
    /// Counted object outside the runtime type system.
    GMainLoop: TypeInstance = G_TYPE_NONE
);

// ============================================================================
// Entry points
// ============================================================================

/// # Safety
///
/// `object` is null or points to a live object.
pub unsafe fn g_object_ref(object: *mut GObject) -> *mut GObject {
    unsafe { instance_ref(object.cast()) };
    object
}

/// # Safety
///
/// `object` is null or points to a live object whose reference the caller owns.
pub unsafe fn g_object_unref(object: *mut GObject) {
    unsafe { instance_unref(object.cast()) }
}

/// Claims a floating reference, or adds one if the object is not floating.
///
/// # Safety
///
/// `object` is null or points to a live object.
pub unsafe fn g_object_ref_sink(object: *mut GObject) -> *mut GObject {
    unsafe { instance_ref_sink(object.cast()) };
    object
}

/// # Safety
///
/// `object` is null or points to a live object.
pub unsafe fn g_object_is_floating(object: *mut GObject) -> bool {
    unsafe { instance_is_floating(object.cast()) }
}

/// # Safety
///
/// `object` is null or points to a live object.
pub unsafe fn gst_mini_object_ref(object: *mut GstMiniObject) -> *mut GstMiniObject {
    unsafe { instance_ref(object.cast()) };
    object
}

/// # Safety
///
/// `object` is null or points to a live object whose reference the caller owns.
pub unsafe fn gst_mini_object_unref(object: *mut GstMiniObject) {
    unsafe { instance_unref(object.cast()) }
}

/// # Safety
///
/// `pspec` is null or points to a live object.
pub unsafe fn g_param_spec_ref(pspec: *mut GParamSpec) -> *mut GParamSpec {
    unsafe { instance_ref(pspec.cast()) };
    pspec
}

/// # Safety
///
/// `pspec` is null or points to a live object whose reference the caller owns.
pub unsafe fn g_param_spec_unref(pspec: *mut GParamSpec) {
    unsafe { instance_unref(pspec.cast()) }
}

/// # Safety
///
/// `main_loop` is null or points to a live object.
pub unsafe fn g_main_loop_ref(main_loop: *mut GMainLoop) -> *mut GMainLoop {
    unsafe { instance_ref(main_loop.cast()) };
    main_loop
}

/// # Safety
///
/// `main_loop` is null or points to a live object whose reference the caller owns.
pub unsafe fn g_main_loop_unref(main_loop: *mut GMainLoop) {
    unsafe { instance_unref(main_loop.cast()) }
}

//! Operation tables and hierarchy of every mock type.

use std::ffi::c_void;
use std::ptr::NonNull;

use ffi_handle::{object_type, OpTable, RuntimeType, ThreadSafeRefs};

use crate::instance::{g_type_check_instance_cast, g_type_check_instance_is_a};
use crate::types::*;

unsafe fn instance_is_a<T>(ptr: NonNull<T>, ty: RuntimeType) -> bool {
    unsafe { g_type_check_instance_is_a(ptr.cast().as_ptr(), ty) }
}

unsafe fn instance_cast<T>(ptr: NonNull<T>, ty: RuntimeType) -> *mut c_void {
    unsafe { g_type_check_instance_cast(ptr.cast().as_ptr(), ty) }.cast()
}

// ============================================================================
// GObject family
// ============================================================================

unsafe fn gobject_retain(ptr: NonNull<GObject>) {
    unsafe { g_object_ref(ptr.as_ptr()) };
}

unsafe fn gobject_release(ptr: NonNull<GObject>) {
    unsafe { g_object_unref(ptr.as_ptr()) }
}

unsafe fn gobject_is_floating(ptr: NonNull<GObject>) -> bool {
    unsafe { g_object_is_floating(ptr.as_ptr()) }
}

unsafe fn gobject_claim(ptr: NonNull<GObject>) {
    unsafe { g_object_ref_sink(ptr.as_ptr()) };
}

object_type! {
    unsafe impl GObject {
        runtime_type: Some(G_TYPE_OBJECT),
        ops: OpTable::new(
            gobject_retain,
            gobject_release,
            instance_is_a::<GObject>,
            instance_cast::<GObject>,
        )
        .with_floating(gobject_is_floating, gobject_claim),
    }
}

object_type! {
    unsafe impl GstObject {
        runtime_type: Some(GST_TYPE_OBJECT),
        extends: [GObject],
    }
}

object_type! {
    unsafe impl GstElement {
        runtime_type: Some(GST_TYPE_ELEMENT),
        extends: [GstObject, GObject],
    }
}

object_type! {
    unsafe impl GstBin {
        runtime_type: Some(GST_TYPE_BIN),
        extends: [GstElement, GstObject, GObject],
    }
}

object_type! {
    unsafe impl GstPipeline {
        runtime_type: Some(GST_TYPE_PIPELINE),
        extends: [GstBin, GstElement, GstObject, GObject],
    }
}

object_type! {
    unsafe impl GstPad {
        runtime_type: Some(GST_TYPE_PAD),
        extends: [GstObject, GObject],
    }
}

object_type! {
    unsafe impl GstBus {
        runtime_type: Some(GST_TYPE_BUS),
        extends: [GstObject, GObject],
    }
}

// ============================================================================
// Mini objects
// ============================================================================

unsafe fn mini_object_retain(ptr: NonNull<GstMiniObject>) {
    unsafe { gst_mini_object_ref(ptr.as_ptr()) };
}

unsafe fn mini_object_release(ptr: NonNull<GstMiniObject>) {
    unsafe { gst_mini_object_unref(ptr.as_ptr()) }
}

object_type! {
    unsafe impl GstMiniObject {
        runtime_type: Some(GST_TYPE_MINI_OBJECT),
        ops: OpTable::new(
            mini_object_retain,
            mini_object_release,
            instance_is_a::<GstMiniObject>,
            instance_cast::<GstMiniObject>,
        ),
    }
}

object_type! {
    unsafe impl GstCaps {
        runtime_type: Some(GST_TYPE_CAPS),
        extends: [GstMiniObject],
    }
}

object_type! {
    unsafe impl GstBuffer {
        runtime_type: Some(GST_TYPE_BUFFER),
        extends: [GstMiniObject],
    }
}

object_type! {
    unsafe impl GstEvent {
        runtime_type: Some(GST_TYPE_EVENT),
        extends: [GstMiniObject],
    }
}

// ============================================================================
// Standalone counted types
// ============================================================================

unsafe fn param_spec_retain(ptr: NonNull<GParamSpec>) {
    unsafe { g_param_spec_ref(ptr.as_ptr()) };
}

unsafe fn param_spec_release(ptr: NonNull<GParamSpec>) {
    unsafe { g_param_spec_unref(ptr.as_ptr()) }
}

object_type! {
    unsafe impl GParamSpec {
        runtime_type: Some(G_TYPE_PARAM),
        ops: OpTable::new(
            param_spec_retain,
            param_spec_release,
            instance_is_a::<GParamSpec>,
            instance_cast::<GParamSpec>,
        ),
    }
}

unsafe fn main_loop_retain(ptr: NonNull<GMainLoop>) {
    unsafe { g_main_loop_ref(ptr.as_ptr()) };
}

unsafe fn main_loop_release(ptr: NonNull<GMainLoop>) {
    unsafe { g_main_loop_unref(ptr.as_ptr()) }
}

// Main loops are not type instances of the runtime type system.
object_type! {
    unsafe impl GMainLoop {
        runtime_type: None,
        ops: OpTable::untyped(main_loop_retain, main_loop_release),
    }
}

// GObject and mini-object counts are atomic. GParamSpec and GMainLoop are
// left single-threaded.
unsafe impl ThreadSafeRefs for GObject {}
unsafe impl ThreadSafeRefs for GstObject {}
unsafe impl ThreadSafeRefs for GstElement {}
unsafe impl ThreadSafeRefs for GstBin {}
unsafe impl ThreadSafeRefs for GstPipeline {}
unsafe impl ThreadSafeRefs for GstPad {}
unsafe impl ThreadSafeRefs for GstBus {}
unsafe impl ThreadSafeRefs for GstMiniObject {}
unsafe impl ThreadSafeRefs for GstCaps {}
unsafe impl ThreadSafeRefs for GstBuffer {}
unsafe impl ThreadSafeRefs for GstEvent {}

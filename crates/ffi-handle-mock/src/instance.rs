//! Instances, classes and the reference-count primitives.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use ffi_handle::RuntimeType;
use tracing::{trace, warn};

/// Marker value stored in every instance.
pub const DUMMY: i32 = 0x69;

/// Runtime class record: one per concrete type.
#[derive(Debug)]
pub struct Class {
    /// Type name.
    pub name: &'static str,
    /// Runtime type identifier.
    pub runtime_type: RuntimeType,
    /// Parent class.
    pub parent: Option<&'static Class>,
    finalize: unsafe fn(NonNull<TypeInstance>),
}

impl Class {
    pub(crate) const fn new(
        name: &'static str,
        runtime_type: RuntimeType,
        parent: Option<&'static Class>,
        finalize: unsafe fn(NonNull<TypeInstance>),
    ) -> Self {
        Self {
            name,
            runtime_type,
            parent,
            finalize,
        }
    }

    /// Whether this class is `ty` or derives from it.
    pub fn is_a(&self, ty: RuntimeType) -> bool {
        let mut class = Some(self);
        while let Some(current) = class {
            if current.runtime_type == ty {
                return true;
            }
            class = current.parent;
        }
        false
    }
}

/// Counts finalized instances it was attached to.
#[derive(Debug, Clone, Default)]
pub struct FinalizeProbe(Arc<AtomicUsize>);

impl FinalizeProbe {
    /// Create a probe with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached instances destroyed so far.
    pub fn finalized(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Header shared by every object of the system.
///
/// Concrete types embed it (through their parents) as the first field.
#[repr(C)]
#[derive(Debug)]
pub struct TypeInstance {
    class: &'static Class,
    ref_count: AtomicI64,
    floating: AtomicBool,
    probe: Option<FinalizeProbe>,
    /// Constant payload, readable through a handle.
    pub dummy: i32,
}

impl TypeInstance {
    fn new(class: &'static Class, floating: bool, probe: Option<FinalizeProbe>) -> Self {
        Self {
            class,
            ref_count: AtomicI64::new(1),
            floating: AtomicBool::new(floating),
            probe,
            dummy: DUMMY,
        }
    }

    /// Current reference count.
    pub fn ref_count(&self) -> i64 {
        self.ref_count.load(Ordering::SeqCst)
    }

    /// Whether the floating flag is set.
    pub fn is_floating(&self) -> bool {
        self.floating.load(Ordering::SeqCst)
    }

    /// Class of the concrete (most derived) type.
    pub fn class(&self) -> &'static Class {
        self.class
    }

    /// Name of the concrete type.
    pub fn type_name(&self) -> &'static str {
        self.class.name
    }
}

/// A concrete type of the object system.
///
/// # Safety
///
/// Implementors are `#[repr(C)]` with a [`TypeInstance`] at offset zero.
pub unsafe trait Instance: Sized + Send + Sync + 'static {
    /// Class record of the type.
    const CLASS: &'static Class;

    /// Build the value around its header.
    fn wrap(instance: TypeInstance) -> Self;
}

pub(crate) unsafe fn finalize_boxed<T: Instance>(instance: NonNull<TypeInstance>) {
    drop(unsafe { Box::from_raw(instance.cast::<T>().as_ptr()) });
}

fn alloc<T: Instance>(floating: bool, probe: Option<FinalizeProbe>) -> *mut T {
    let object = Box::into_raw(Box::new(T::wrap(TypeInstance::new(
        T::CLASS,
        floating,
        probe,
    ))));
    trace!(ty = T::CLASS.name, ptr = ?object, floating, "allocated instance");
    object
}

/// New object holding one reference owned by the caller.
pub fn new_full<T: Instance>() -> *mut T {
    alloc(false, None)
}

/// New object in the floating state.
pub fn new_floating<T: Instance>() -> *mut T {
    alloc(true, None)
}

/// Like [`new_full`], reporting its destruction to `probe`.
pub fn new_full_tracked<T: Instance>(probe: &FinalizeProbe) -> *mut T {
    alloc(false, Some(probe.clone()))
}

/// Like [`new_floating`], reporting its destruction to `probe`.
pub fn new_floating_tracked<T: Instance>(probe: &FinalizeProbe) -> *mut T {
    alloc(true, Some(probe.clone()))
}

/// Read the reference count of a live object.
///
/// # Safety
///
/// `object` points to a live instance.
pub unsafe fn ref_count<T: Instance>(object: *const T) -> i64 {
    unsafe { &*object.cast::<TypeInstance>() }.ref_count()
}

pub(crate) unsafe fn instance_ref(instance: *mut TypeInstance) {
    let Some(instance) = NonNull::new(instance) else {
        warn!("ref: assertion 'instance != NULL' failed");
        return;
    };
    unsafe { instance.as_ref() }.ref_count.fetch_add(1, Ordering::SeqCst);
}

pub(crate) unsafe fn instance_unref(instance: *mut TypeInstance) {
    let Some(instance) = NonNull::new(instance) else {
        warn!("unref: assertion 'instance != NULL' failed");
        return;
    };
    let header = unsafe { instance.as_ref() };
    let class = header.class;
    let previous = header.ref_count.fetch_sub(1, Ordering::SeqCst);
    assert!(previous > 0, "{}: reference count underflow", class.name);
    if previous == 1 {
        let probe = header.probe.clone();
        trace!(ty = class.name, ptr = ?instance, "finalizing instance");
        unsafe { (class.finalize)(instance) };
        if let Some(probe) = probe {
            probe.record();
        }
    }
}

pub(crate) unsafe fn instance_ref_sink(instance: *mut TypeInstance) {
    let Some(ptr) = NonNull::new(instance) else {
        warn!("ref_sink: assertion 'instance != NULL' failed");
        return;
    };
    let header = unsafe { ptr.as_ref() };
    if !header.floating.swap(false, Ordering::SeqCst) {
        header.ref_count.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) unsafe fn instance_is_floating(instance: *mut TypeInstance) -> bool {
    match NonNull::new(instance) {
        Some(ptr) => unsafe { ptr.as_ref() }.is_floating(),
        None => false,
    }
}

/// Runtime check: is `instance` of type `ty` or a subtype?
///
/// # Safety
///
/// `instance` is null or points to a live instance.
pub unsafe fn g_type_check_instance_is_a(instance: *mut TypeInstance, ty: RuntimeType) -> bool {
    match NonNull::new(instance) {
        Some(ptr) => unsafe { ptr.as_ref() }.class.is_a(ty),
        None => false,
    }
}

/// Runtime cast: returns `instance` if it is a `ty`, otherwise logs a
/// warning and returns null.
///
/// # Safety
///
/// `instance` is null or points to a live instance.
pub unsafe fn g_type_check_instance_cast(
    instance: *mut TypeInstance,
    ty: RuntimeType,
) -> *mut TypeInstance {
    if unsafe { g_type_check_instance_is_a(instance, ty) } {
        return instance;
    }
    if let Some(ptr) = NonNull::new(instance) {
        warn!(
            from = unsafe { ptr.as_ref() }.class.name,
            to = ?ty,
            "invalid cast"
        );
    }
    std::ptr::null_mut()
}

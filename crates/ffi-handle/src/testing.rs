//! Minimal counted objects for unit tests.
//!
//! `Counted` is a root type with floating support, `Labelled` derives from
//! it and `Plain` is an untyped family whose release never frees.

use std::cell::Cell;
use std::ffi::c_void;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::{OpTable, RuntimeType};

pub(crate) const COUNTED_TYPE: RuntimeType = RuntimeType::from_raw(0x01);
pub(crate) const LABELLED_TYPE: RuntimeType = RuntimeType::from_raw(0x02);

#[repr(C)]
pub(crate) struct Counted {
    refs: AtomicI64,
    floating: AtomicBool,
    kind: RuntimeType,
    free: unsafe fn(NonNull<Counted>),
}

#[repr(C)]
pub(crate) struct Labelled {
    base: Counted,
    pub(crate) label: &'static str,
}

impl Counted {
    fn header(
        kind: RuntimeType,
        count: i64,
        floating: bool,
        free: unsafe fn(NonNull<Counted>),
    ) -> Self {
        Self {
            refs: AtomicI64::new(count),
            floating: AtomicBool::new(floating),
            kind,
            free,
        }
    }

    pub(crate) fn alloc(count: i64, floating: bool) -> *mut Counted {
        Box::into_raw(Box::new(Self::header(
            COUNTED_TYPE,
            count,
            floating,
            free_boxed::<Counted>,
        )))
    }

    pub(crate) fn count(&self) -> i64 {
        self.refs.load(Ordering::SeqCst)
    }

    pub(crate) fn is_floating(&self) -> bool {
        self.floating.load(Ordering::SeqCst)
    }
}

impl Labelled {
    pub(crate) fn alloc(label: &'static str) -> *mut Labelled {
        Box::into_raw(Box::new(Self {
            base: Counted::header(LABELLED_TYPE, 1, false, free_boxed::<Labelled>),
            label,
        }))
    }

    pub(crate) fn count(&self) -> i64 {
        self.base.count()
    }
}

unsafe fn free_boxed<T>(ptr: NonNull<Counted>) {
    drop(unsafe { Box::from_raw(ptr.cast::<T>().as_ptr()) });
}

unsafe fn counted_retain(ptr: NonNull<Counted>) {
    unsafe { ptr.as_ref() }.refs.fetch_add(1, Ordering::SeqCst);
}

unsafe fn counted_release(ptr: NonNull<Counted>) {
    let (prev, free) = {
        let counted = unsafe { ptr.as_ref() };
        (counted.refs.fetch_sub(1, Ordering::SeqCst), counted.free)
    };
    assert!(prev > 0, "released a dead object");
    if prev == 1 {
        unsafe { free(ptr) };
    }
}

unsafe fn counted_is_floating(ptr: NonNull<Counted>) -> bool {
    unsafe { ptr.as_ref() }.is_floating()
}

unsafe fn counted_claim(ptr: NonNull<Counted>) {
    let counted = unsafe { ptr.as_ref() };
    if !counted.floating.swap(false, Ordering::SeqCst) {
        counted.refs.fetch_add(1, Ordering::SeqCst);
    }
}

unsafe fn counted_is_a(ptr: NonNull<Counted>, ty: RuntimeType) -> bool {
    let kind = unsafe { ptr.as_ref() }.kind;
    kind == ty || ty == COUNTED_TYPE
}

unsafe fn counted_cast(ptr: NonNull<Counted>, ty: RuntimeType) -> *mut c_void {
    if unsafe { counted_is_a(ptr, ty) } {
        ptr.as_ptr().cast()
    } else {
        ptr::null_mut()
    }
}

crate::object_type! {
    unsafe impl Counted {
        runtime_type: Some(COUNTED_TYPE),
        ops: OpTable::new(counted_retain, counted_release, counted_is_a, counted_cast)
            .with_floating(counted_is_floating, counted_claim),
    }
}

crate::object_type! {
    unsafe impl Labelled {
        runtime_type: Some(LABELLED_TYPE),
        extends: [Counted],
    }
}

/// Stack-allocated object; the count is only observed.
#[derive(Default)]
pub(crate) struct Plain {
    pub(crate) refs: Cell<i64>,
}

unsafe fn plain_retain(ptr: NonNull<Plain>) {
    let plain = unsafe { ptr.as_ref() };
    plain.refs.set(plain.refs.get() + 1);
}

unsafe fn plain_release(ptr: NonNull<Plain>) {
    let plain = unsafe { ptr.as_ref() };
    plain.refs.set(plain.refs.get() - 1);
}

crate::object_type! {
    unsafe impl Plain {
        runtime_type: None,
        ops: OpTable::untyped(plain_retain, plain_release),
    }
}

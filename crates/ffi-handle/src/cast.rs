//! Static and dynamic casts between handles.
//!
//! Upcasts are checked at compile time through [`IsA`]. Downcasts go through
//! the foreign runtime type check of the source type's table and fail with a
//! [`CastError`] instead of producing an empty handle.

use std::ptr::NonNull;

use tracing::debug;

use crate::error::{CastError, CastResult};
use crate::handle::Handle;
use crate::table::{IsA, ObjectType};

impl<T: ObjectType> Handle<T> {
    /// Borrow the raw pointer as one of the type's ancestors.
    ///
    /// Checked at compile time:
    ///
    /// ```compile_fail
    /// use ffi_handle::Handle;
    /// use ffi_handle_mock::{GstCaps, GstPipeline};
    ///
    /// let caps: Handle<GstCaps> = Handle::new();
    /// let _ = caps.as_ptr_of::<GstPipeline>();
    /// ```
    #[inline]
    pub fn as_ptr_of<B: ObjectType>(&self) -> *mut B
    where
        T: IsA<B>,
    {
        self.as_ptr().cast()
    }

    /// Borrow the raw pointer as `D` after a runtime type check.
    ///
    /// The reference count is not touched.
    pub fn as_ptr_dynamic<D: ObjectType>(&self) -> CastResult<*mut D> {
        let ptr = self.as_non_null().ok_or(CastError::NullCast { to: D::INFO.name })?;
        // SAFETY: a non-empty handle keeps the object alive.
        unsafe { checked_cast::<T, D>(ptr) }.map(NonNull::as_ptr)
    }
}

/// Run the foreign runtime type check and cast of `S`'s table towards `D`.
///
/// # Safety
///
/// `ptr` points to a live `S`.
unsafe fn checked_cast<S: ObjectType, D: ObjectType>(ptr: NonNull<S>) -> CastResult<NonNull<D>> {
    let Some(target) = D::INFO.runtime_type else {
        return Err(CastError::NoRuntimeType { to: D::INFO.name });
    };
    let mismatch = CastError::TypeMismatch {
        from: S::INFO.name,
        to: D::INFO.name,
    };
    if !unsafe { (S::OPS.type_check)(ptr, target) } {
        debug!(from = S::INFO.name, to = D::INFO.name, ?ptr, "runtime type check rejected cast");
        return Err(mismatch);
    }
    NonNull::new(unsafe { (S::OPS.type_cast)(ptr, target) }.cast::<D>()).ok_or(mismatch)
}

/// Share a derived handle as one of its ancestors.
///
/// The new handle owns one more reference to the same object.
///
/// ```
/// use ffi_handle::{upcast, Handle};
/// use ffi_handle_mock::{new_full, GstObject, GstPipeline};
///
/// let pipeline = unsafe { Handle::<GstPipeline>::from_full(new_full()) };
/// let object: Handle<GstObject> = upcast(&pipeline);
/// assert_eq!(object.ref_count(), 2);
/// ```
///
/// Casting to a type that is not an ancestor does not compile:
///
/// ```compile_fail
/// use ffi_handle::{upcast, Handle};
/// use ffi_handle_mock::{GstCaps, GstPipeline};
///
/// let caps: Handle<GstCaps> = Handle::new();
/// let _: Handle<GstPipeline> = upcast(&caps);
/// ```
#[must_use]
pub fn upcast<B: ObjectType, D: IsA<B>>(derived: &Handle<D>) -> Handle<B> {
    // SAFETY: `D: IsA<B>` makes the pointer a valid `B`; it is live while
    // `derived` holds it.
    unsafe { Handle::from_none(derived.as_ptr_of::<B>()) }
}

/// Share a handle as a more derived type after a runtime type check.
///
/// On success the new handle owns one more reference to the same object.
/// On mismatch the source is left untouched and
/// [`CastError::TypeMismatch`] is returned. An empty source fails with
/// [`CastError::NullCast`], like [`Handle::as_ptr_dynamic`].
pub fn downcast<D: ObjectType, B: ObjectType>(base: &Handle<B>) -> CastResult<Handle<D>> {
    let ptr = base.as_non_null().ok_or(CastError::NullCast { to: D::INFO.name })?;
    // SAFETY: `base` keeps the object alive; the foreign check vouches that
    // the cast pointer is a `D`.
    let derived = unsafe { checked_cast::<B, D>(ptr)? };
    Ok(unsafe { Handle::from_none(derived.as_ptr()) })
}

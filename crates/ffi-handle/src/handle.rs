//! Owning handle over a foreign reference-counted object.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::Deref;
use std::ptr::{self, NonNull};

use tracing::trace;

use crate::table::{ObjectType, ThreadSafeRefs};

/// Observable state of a [`Handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleState {
    /// Holds nothing.
    Empty,
    /// Owns exactly one counted reference.
    Owning,
}

/// A smart pointer owning one reference to a foreign object.
///
/// Every non-empty handle owns exactly one reference count unit, whichever
/// entry point created it. Pick the entry point that matches the ownership
/// contract the foreign function documents:
///
/// | Foreign contract            | Entry point                                   |
/// |-----------------------------|-----------------------------------------------|
/// | transfer full               | [`from_full`], [`take_full`], [`set_full`]     |
/// | floating                    | [`from_floating`], or the above + [`claim_floating`] |
/// | transfer none               | [`from_none`], [`set_none`]                   |
/// | transfer none, maybe floating | [`from_none_sink`]                          |
///
/// and to hand the pointer back:
///
/// | Foreign parameter           | Method                                        |
/// |-----------------------------|-----------------------------------------------|
/// | transfer none / `self`      | [`as_ptr`], [`as_ptr_of`], [`as_ptr_dynamic`] |
/// | transfer full               | [`transfer_full`], [`into_raw`]               |
///
/// Using the wrong entry point leaks the object or releases it one time too
/// many. The handle cannot detect either mistake.
///
/// [`from_full`]: Handle::from_full
/// [`take_full`]: Handle::take_full
/// [`set_full`]: Handle::set_full
/// [`from_floating`]: Handle::from_floating
/// [`claim_floating`]: Handle::claim_floating
/// [`from_none`]: Handle::from_none
/// [`set_none`]: Handle::set_none
/// [`from_none_sink`]: Handle::from_none_sink
/// [`as_ptr`]: Handle::as_ptr
/// [`as_ptr_of`]: Handle::as_ptr_of
/// [`as_ptr_dynamic`]: Handle::as_ptr_dynamic
/// [`transfer_full`]: Handle::transfer_full
/// [`into_raw`]: Handle::into_raw
#[repr(transparent)]
pub struct Handle<T: ObjectType> {
    ptr: Option<NonNull<T>>,
}

impl<T: ObjectType> Handle<T> {
    /// Create an empty handle.
    #[inline]
    pub const fn new() -> Self {
        Self { ptr: None }
    }

    // ------------------------------------------------------------------
    // Transfer full
    // ------------------------------------------------------------------

    /// Adopt a pointer returned under the transfer-full contract.
    ///
    /// The reference count is not touched: the handle now owns the reference
    /// the caller was given. A null pointer yields an empty handle.
    ///
    /// # Safety
    ///
    /// `ptr` is null or points to a live `T` carrying one reference that the
    /// caller owns and gives up.
    #[inline]
    pub unsafe fn from_full(ptr: *mut T) -> Self {
        Self {
            ptr: NonNull::new(ptr),
        }
    }

    /// Like [`from_full`](Self::from_full), and nulls the caller's variable
    /// so the raw pointer cannot be used again by accident.
    ///
    /// # Safety
    ///
    /// Same as [`from_full`](Self::from_full).
    #[inline]
    pub unsafe fn take_full(ptr: &mut *mut T) -> Self {
        unsafe { Self::from_full(mem::replace(ptr, ptr::null_mut())) }
    }

    /// Replace the held object with a transfer-full pointer.
    ///
    /// The previously held reference, if any, is released.
    ///
    /// # Safety
    ///
    /// Same as [`from_full`](Self::from_full).
    #[inline]
    pub unsafe fn set_full(&mut self, ptr: *mut T) {
        self.replace(NonNull::new(ptr));
    }

    /// Like [`set_full`](Self::set_full), and nulls the caller's variable.
    ///
    /// # Safety
    ///
    /// Same as [`from_full`](Self::from_full).
    #[inline]
    pub unsafe fn set_full_take(&mut self, ptr: &mut *mut T) {
        unsafe { self.set_full(mem::replace(ptr, ptr::null_mut())) }
    }

    // ------------------------------------------------------------------
    // Floating
    // ------------------------------------------------------------------

    /// Adopt a pointer returned under the floating contract and claim it.
    ///
    /// Equivalent to [`from_full`](Self::from_full) followed by
    /// [`claim_floating`](Self::claim_floating).
    ///
    /// # Safety
    ///
    /// `ptr` is null or points to a live `T` that is either floating or
    /// carries one reference the caller gives up.
    pub unsafe fn from_floating(ptr: *mut T) -> Self {
        let mut handle = unsafe { Self::from_full(ptr) };
        handle.claim_floating();
        handle
    }

    /// Turn a floating reference into an owned one.
    ///
    /// If the object is floating the flag is cleared and the count is left
    /// alone: the handle acquires the floating reference for free. If it is
    /// not floating, or the type has no floating support, nothing happens.
    /// Calling this any number of times is safe, which makes it the right
    /// default for every pointer obtained under the floating contract, even
    /// from functions that return full references with the flag still set.
    pub fn claim_floating(&mut self) {
        let (Some(ptr), Some(floating)) = (self.ptr, T::OPS.floating) else {
            return;
        };
        // SAFETY: a non-empty handle owns a reference, so the object is live.
        // The check and the claim are two foreign calls. If another owner
        // claims the same object in between, the foreign claim adds a
        // reference that nobody owns. The foreign system gives no atomic
        // check-and-claim, so this relies on floating objects not being
        // shared before they are claimed.
        unsafe {
            if (floating.is_floating)(ptr) {
                trace!(ty = T::INFO.name, ?ptr, "claiming floating reference");
                (floating.claim)(ptr);
            }
        }
    }

    // ------------------------------------------------------------------
    // Transfer none
    // ------------------------------------------------------------------

    /// Retain a pointer returned under the transfer-none contract.
    ///
    /// Adds one reference; the caller's pointer stays valid and untouched.
    ///
    /// # Safety
    ///
    /// `ptr` is null or points to a live `T`.
    pub unsafe fn from_none(ptr: *mut T) -> Self {
        let mut handle = Self::new();
        unsafe { handle.set_none(ptr) };
        handle
    }

    /// Replace the held object with a retained transfer-none pointer.
    ///
    /// # Safety
    ///
    /// Same as [`from_none`](Self::from_none).
    pub unsafe fn set_none(&mut self, ptr: *mut T) {
        let new = NonNull::new(ptr);
        if let Some(new) = new {
            // Retain before releasing the old reference: `ptr` may be the
            // object this handle already holds.
            unsafe { (T::OPS.retain)(new) };
        }
        self.replace(new);
    }

    /// Take ownership of a transfer-none pointer that may still be floating.
    ///
    /// Applies the foreign claim primitive directly: a floating object is
    /// adopted without changing its count, any other object gets one more
    /// reference. Types without floating support are simply retained.
    ///
    /// # Safety
    ///
    /// `ptr` is null or points to a live `T`.
    pub unsafe fn from_none_sink(ptr: *mut T) -> Self {
        let ptr = NonNull::new(ptr);
        if let Some(ptr) = ptr {
            match T::OPS.floating {
                Some(floating) => unsafe { (floating.claim)(ptr) },
                None => unsafe { (T::OPS.retain)(ptr) },
            }
        }
        Self { ptr }
    }

    // ------------------------------------------------------------------
    // Handing the pointer back
    // ------------------------------------------------------------------

    /// Give the owned reference away, leaving the handle empty.
    ///
    /// Use this for foreign parameters documented as transfer full. The
    /// reference is not released; the receiver owns it now.
    pub fn transfer_full(&mut self) -> *mut T {
        match self.ptr.take() {
            Some(ptr) => {
                trace!(ty = T::INFO.name, ?ptr, "transferring ownership out");
                ptr.as_ptr()
            }
            None => ptr::null_mut(),
        }
    }

    /// Consume the handle, returning the owned reference.
    #[inline]
    pub fn into_raw(mut self) -> *mut T {
        self.transfer_full()
    }

    /// Borrow the raw pointer for a call that does not take ownership.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Borrow the pointer as `NonNull`, `None` when empty.
    #[inline]
    pub fn as_non_null(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Shared reference to the object, `None` when empty.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: the owned reference keeps the object alive for as long as
        // the handle is borrowed.
        self.ptr.map(|ptr| unsafe { ptr.as_ref() })
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// Move the reference into a new handle, leaving this one empty.
    #[inline]
    pub fn take(&mut self) -> Self {
        Self {
            ptr: self.ptr.take(),
        }
    }

    /// Exchange the objects of two handles without touching any count.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
    }

    /// Release the held reference, if any, and become empty.
    #[inline]
    pub fn reset(&mut self) {
        self.replace(None);
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> HandleState {
        match self.ptr {
            Some(_) => HandleState::Owning,
            None => HandleState::Empty,
        }
    }

    /// Returns true if the handle holds nothing.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns true if the handle owns a reference.
    #[inline]
    pub fn is_owning(&self) -> bool {
        self.ptr.is_some()
    }

    /// Store `new` and release the previously held reference.
    ///
    /// Every ownership transition ends here. `new` must already be owned.
    fn replace(&mut self, new: Option<NonNull<T>>) {
        if let Some(old) = mem::replace(&mut self.ptr, new) {
            // SAFETY: the handle owned this reference.
            unsafe { (T::OPS.release)(old) };
        }
    }
}

impl<T: ObjectType> Default for Handle<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ObjectType> Drop for Handle<T> {
    fn drop(&mut self) {
        self.replace(None);
    }
}

impl<T: ObjectType> Clone for Handle<T> {
    /// Share the object: the clone owns one more reference.
    fn clone(&self) -> Self {
        if let Some(ptr) = self.ptr {
            // SAFETY: the object is kept alive by our own reference.
            unsafe { (T::OPS.retain)(ptr) };
        }
        Self { ptr: self.ptr }
    }

    fn clone_from(&mut self, source: &Self) {
        // Same object: each handle already owns its own reference.
        if self.ptr != source.ptr {
            *self = source.clone();
        }
    }
}

impl<T: ObjectType> Deref for Handle<T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the handle is empty.
    #[track_caller]
    fn deref(&self) -> &T {
        match self.as_ref() {
            Some(object) => object,
            None => empty_deref(T::INFO.name),
        }
    }
}

#[cold]
#[track_caller]
#[allow(clippy::panic)]
fn empty_deref(name: &str) -> ! {
    panic!("dereferenced an empty Handle<{name}>")
}

// Manual PartialEq: identity of the foreign object, not its contents
impl<T: ObjectType> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T: ObjectType> Eq for Handle<T> {}

impl<T: ObjectType> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.hash(state);
    }
}

impl<T: ObjectType> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type", &T::INFO.name)
            .field("ptr", &self.as_ptr())
            .finish()
    }
}

impl<T: ObjectType> fmt::Pointer for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

// SAFETY: the foreign count is atomic and the object may be destroyed on any
// thread; shared access goes through `&T`, hence `T: Sync`.
unsafe impl<T: ThreadSafeRefs + Send + Sync> Send for Handle<T> {}
unsafe impl<T: ThreadSafeRefs + Send + Sync> Sync for Handle<T> {}

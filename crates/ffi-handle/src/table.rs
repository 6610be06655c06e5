//! Per-type operation tables.
//!
//! A foreign type becomes usable with [`Handle`](crate::Handle) by
//! implementing [`ObjectType`], which supplies two constants:
//!
//! - an [`OpTable`] with the reference-count primitives of the foreign system
//!   (`retain`, `release`, optional floating-reference support) and the
//!   runtime type check/cast used by downcasts,
//! - a [`TypeInfo`] naming the type, its runtime type identifier and its
//!   declared parent.
//!
//! The hierarchy itself is expressed with [`IsA`], which static upcasts
//! require. Nothing here has runtime state: every table is a constant
//! resolved at compile time.

use std::ffi::c_void;
use std::fmt;
use std::ptr::{self, NonNull};

/// Opaque runtime type identifier handed out by the foreign type system.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeType(usize);

impl RuntimeType {
    /// Wrap a raw identifier of the foreign type system.
    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Get the raw identifier.
    #[inline]
    pub const fn into_raw(self) -> usize {
        self.0
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeType({:#04x})", self.0)
    }
}

/// Floating-reference primitives of a type family.
///
/// `claim` follows the foreign "ref sink" contract: on a floating object it
/// clears the flag and keeps the count, on any other object it adds a
/// reference. `is_floating` lets callers that already own a reference tell
/// the two cases apart.
pub struct FloatingOps<T> {
    /// Returns true while the object is in the floating state.
    pub is_floating: unsafe fn(NonNull<T>) -> bool,
    /// Claims the floating reference (or adds one if not floating).
    pub claim: unsafe fn(NonNull<T>),
}

// Manual Clone/Copy that don't require T: Clone
impl<T> Clone for FloatingOps<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FloatingOps<T> {}

/// Reference-management primitives for one concrete foreign type.
///
/// All function pointers require a non-null pointer to a live instance.
pub struct OpTable<T> {
    /// Adds one reference.
    pub retain: unsafe fn(NonNull<T>),
    /// Drops one reference, destroying the object when the count reaches zero.
    pub release: unsafe fn(NonNull<T>),
    /// Floating-reference support, if the family has any.
    pub floating: Option<FloatingOps<T>>,
    /// Runtime check: is the instance of the given type or one of its subtypes?
    pub type_check: unsafe fn(NonNull<T>, RuntimeType) -> bool,
    /// Runtime cast to the given type. Returns null when not possible.
    pub type_cast: unsafe fn(NonNull<T>, RuntimeType) -> *mut c_void,
}

impl<T> Clone for OpTable<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OpTable<T> {}

impl<T> OpTable<T> {
    /// Table for a type with a runtime type system but no floating references.
    pub const fn new(
        retain: unsafe fn(NonNull<T>),
        release: unsafe fn(NonNull<T>),
        type_check: unsafe fn(NonNull<T>, RuntimeType) -> bool,
        type_cast: unsafe fn(NonNull<T>, RuntimeType) -> *mut c_void,
    ) -> Self {
        Self {
            retain,
            release,
            floating: None,
            type_check,
            type_cast,
        }
    }

    /// Table for a plain reference-counted type outside any runtime type
    /// system. Every runtime type check on it fails.
    pub const fn untyped(retain: unsafe fn(NonNull<T>), release: unsafe fn(NonNull<T>)) -> Self {
        Self::new(retain, release, never_is_a::<T>, never_cast::<T>)
    }

    /// Add floating-reference support.
    pub const fn with_floating(
        self,
        is_floating: unsafe fn(NonNull<T>) -> bool,
        claim: unsafe fn(NonNull<T>),
    ) -> Self {
        Self {
            floating: Some(FloatingOps { is_floating, claim }),
            ..self
        }
    }

    /// Reuse the primitives of `P` for a type derived from it.
    ///
    /// Every function forwards to `P`'s table with the pointer reinterpreted
    /// as a `P`, which `T: IsA<P>` makes valid.
    pub const fn inherit<P: ObjectType>() -> Self
    where
        T: IsA<P>,
    {
        let floating = if P::OPS.floating.is_some() {
            Some(FloatingOps {
                is_floating: is_floating_as::<T, P>,
                claim: claim_as::<T, P>,
            })
        } else {
            None
        };
        Self {
            retain: retain_as::<T, P>,
            release: release_as::<T, P>,
            floating,
            type_check: type_check_as::<T, P>,
            type_cast: type_cast_as::<T, P>,
        }
    }

    /// Whether the family supports floating references.
    #[inline]
    pub const fn has_floating(&self) -> bool {
        self.floating.is_some()
    }
}

impl<T> fmt::Debug for OpTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpTable")
            .field("floating", &self.floating.is_some())
            .finish_non_exhaustive()
    }
}

unsafe fn never_is_a<T>(_ptr: NonNull<T>, _ty: RuntimeType) -> bool {
    false
}

unsafe fn never_cast<T>(_ptr: NonNull<T>, _ty: RuntimeType) -> *mut c_void {
    ptr::null_mut()
}

unsafe fn retain_as<T, P: ObjectType>(ptr: NonNull<T>) {
    unsafe { (P::OPS.retain)(ptr.cast()) }
}

unsafe fn release_as<T, P: ObjectType>(ptr: NonNull<T>) {
    unsafe { (P::OPS.release)(ptr.cast()) }
}

unsafe fn is_floating_as<T, P: ObjectType>(ptr: NonNull<T>) -> bool {
    match P::OPS.floating {
        Some(floating) => unsafe { (floating.is_floating)(ptr.cast()) },
        None => false,
    }
}

unsafe fn claim_as<T, P: ObjectType>(ptr: NonNull<T>) {
    match P::OPS.floating {
        Some(floating) => unsafe { (floating.claim)(ptr.cast()) },
        None => unsafe { (P::OPS.retain)(ptr.cast()) },
    }
}

unsafe fn type_check_as<T, P: ObjectType>(ptr: NonNull<T>, ty: RuntimeType) -> bool {
    unsafe { (P::OPS.type_check)(ptr.cast(), ty) }
}

unsafe fn type_cast_as<T, P: ObjectType>(ptr: NonNull<T>, ty: RuntimeType) -> *mut c_void {
    unsafe { (P::OPS.type_cast)(ptr.cast(), ty) }
}

/// Static description of a registered type.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// Type name, used in diagnostics.
    pub name: &'static str,
    /// Runtime type identifier, if the foreign system has one for this type.
    pub runtime_type: Option<RuntimeType>,
    /// Declared parent type.
    pub parent: Option<&'static TypeInfo>,
}

impl TypeInfo {
    /// Describe a type with no parent.
    pub const fn root(name: &'static str, runtime_type: Option<RuntimeType>) -> Self {
        Self {
            name,
            runtime_type,
            parent: None,
        }
    }

    /// Describe a type derived from `parent`.
    pub const fn derived(
        name: &'static str,
        runtime_type: Option<RuntimeType>,
        parent: &'static TypeInfo,
    ) -> Self {
        Self {
            name,
            runtime_type,
            parent: Some(parent),
        }
    }

    /// Iterate the declared ancestors, nearest first.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: self.parent }
    }

    /// Hierarchy depth: 0 for a root type.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Whether this type is `other` or declares it as an ancestor.
    pub fn is_a(&self, other: &TypeInfo) -> bool {
        self == other || self.ancestors().any(|ancestor| ancestor == other)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a [`TypeInfo`]'s ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<&'static TypeInfo>,
}

impl Iterator for Ancestors {
    type Item = &'static TypeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

/// Registration of a foreign type.
///
/// Usually implemented through [`object_type!`](crate::object_type).
///
/// # Safety
///
/// `OPS` must implement the foreign system's contract for `Self`: `retain`
/// and `release` operate on the same count, `release` destroys the object at
/// zero, floating `claim` is safe in any floating state, and `type_cast`
/// only returns non-null when `type_check` holds.
pub unsafe trait ObjectType: Sized + 'static {
    /// Reference-management primitives.
    const OPS: OpTable<Self>;
    /// Name, runtime type and parent.
    const INFO: &'static TypeInfo;
}

/// Declares that `Self` specializes `Base` in the foreign hierarchy.
///
/// The relation is reflexive. Transitive ancestors must be declared one by
/// one (the registration macro does this from its `extends` list).
///
/// # Safety
///
/// A pointer to a live `Self` must also be a valid pointer to a `Base`,
/// and `Base`'s table must be able to manage it.
pub unsafe trait IsA<Base: ObjectType>: ObjectType {}

unsafe impl<T: ObjectType> IsA<T> for T {}

/// Declares that the foreign retain/release of a type are safe to call from
/// several threads at once on the same object.
///
/// Only then is [`Handle<T>`](crate::Handle) `Send` and `Sync`.
///
/// # Safety
///
/// The foreign reference count of `Self` must be atomic and the object must
/// tolerate being destroyed on any thread.
pub unsafe trait ThreadSafeRefs: ObjectType {}

//! Compile-time registration of foreign types.
//!
//! Registration is additive: any crate can register its own foreign types
//! next to the ones it binds, there is no central list to edit and nothing
//! to populate at runtime.

/// Register a foreign type with its operation table and hierarchy.
///
/// Three forms are accepted:
///
/// ```text
/// // Root type: explicit table.
/// object_type! { unsafe impl Root { runtime_type: Some(ROOT), ops: ROOT_OPS } }
///
/// // Derived type: reuses the direct parent's table.
/// object_type! { unsafe impl Leaf { runtime_type: Some(LEAF), extends: [Mid, Root] } }
///
/// // Derived type with its own table.
/// object_type! { unsafe impl Leaf { runtime_type: None, extends: [Mid, Root], ops: LEAF_OPS } }
/// ```
///
/// `extends` lists the direct parent first, then every further ancestor.
/// One [`IsA`](crate::IsA) impl is emitted per entry, so upcasts to any
/// listed ancestor type-check.
///
/// The `unsafe` keyword is part of the syntax: the caller vouches for the
/// table and the hierarchy as described on [`ObjectType`](crate::ObjectType).
#[macro_export]
macro_rules! object_type {
    (
        $(#[$meta:meta])*
        unsafe impl $ty:ty {
            runtime_type: $rt:expr,
            ops: $ops:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        unsafe impl $crate::ObjectType for $ty {
            const OPS: $crate::OpTable<Self> = $ops;
            const INFO: &'static $crate::TypeInfo =
                &$crate::TypeInfo::root(stringify!($ty), $rt);
        }
    };
    (
        $(#[$meta:meta])*
        unsafe impl $ty:ty {
            runtime_type: $rt:expr,
            extends: [$parent:ty $(, $ancestor:ty)* $(,)?],
            ops: $ops:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        unsafe impl $crate::ObjectType for $ty {
            const OPS: $crate::OpTable<Self> = $ops;
            const INFO: &'static $crate::TypeInfo = &$crate::TypeInfo::derived(
                stringify!($ty),
                $rt,
                <$parent as $crate::ObjectType>::INFO,
            );
        }
        $crate::object_type!(@extends $ty, [$parent $(, $ancestor)*]);
    };
    (
        $(#[$meta:meta])*
        unsafe impl $ty:ty {
            runtime_type: $rt:expr,
            extends: [$parent:ty $(, $ancestor:ty)* $(,)?] $(,)?
        }
    ) => {
        $crate::object_type! {
            $(#[$meta])*
            unsafe impl $ty {
                runtime_type: $rt,
                extends: [$parent $(, $ancestor)*],
                ops: $crate::OpTable::inherit::<$parent>(),
            }
        }
    };
    (@extends $ty:ty, [$($ancestor:ty),*]) => {
        $(
            unsafe impl $crate::IsA<$ancestor> for $ty {}
        )*
    };
}

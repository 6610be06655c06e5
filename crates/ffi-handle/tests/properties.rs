//! Property tests: reference counts observed through handles always match the
//! number of owning handles, whatever sequence of operations produced them.

#![allow(clippy::unwrap_used)]

mod common;

use ffi_handle::{downcast, upcast, Handle};
use ffi_handle_mock::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An object with `count` references, all owned by the caller.
fn object_with_count(count: i64, probe: &FinalizeProbe) -> *mut GObject {
    let object = new_full_tracked(probe);
    for _ in 1..count {
        unsafe { g_object_ref(object) };
    }
    object
}

fn release_n(object: *mut GObject, count: i64) {
    for _ in 0..count {
        unsafe { g_object_unref(object) };
    }
}

const SLOTS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Clone { from: usize, to: usize },
    CloneFrom { from: usize, to: usize },
    Move { from: usize, to: usize },
    Swap { a: usize, b: usize },
    Reset(usize),
    TransferOut(usize),
    Claim(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    let slot = 0..SLOTS;
    prop_oneof![
        (slot.clone(), slot.clone()).prop_map(|(from, to)| Op::Clone { from, to }),
        (slot.clone(), slot.clone()).prop_map(|(from, to)| Op::CloneFrom { from, to }),
        (slot.clone(), slot.clone()).prop_map(|(from, to)| Op::Move { from, to }),
        (slot.clone(), slot.clone()).prop_map(|(a, b)| Op::Swap { a, b }),
        slot.clone().prop_map(Op::Reset),
        slot.clone().prop_map(Op::TransferOut),
        slot.prop_map(Op::Claim),
    ]
}

fn apply(slots: &mut [Handle<GObject>], op: &Op) {
    match *op {
        Op::Clone { from, to } => slots[to] = slots[from].clone(),
        Op::CloneFrom { from, to } => {
            let source = slots[from].clone();
            slots[to].clone_from(&source);
        }
        Op::Move { from, to } => {
            let moved = slots[from].take();
            slots[to] = moved;
        }
        Op::Swap { a, b } => slots.swap(a, b),
        Op::Reset(slot) => slots[slot].reset(),
        Op::TransferOut(slot) => {
            let raw = slots[slot].transfer_full();
            if !raw.is_null() {
                unsafe { g_object_unref(raw) };
            }
        }
        Op::Claim(slot) => slots[slot].claim_floating(),
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Full transfer adopts the caller's single reference.
    #[test]
    fn full_transfer_observes_one(from_variable in any::<bool>()) {
        let probe = FinalizeProbe::new();
        let handle = if from_variable {
            let mut raw = object_with_count(1, &probe);
            let handle = unsafe { Handle::take_full(&mut raw) };
            prop_assert!(raw.is_null());
            handle
        } else {
            unsafe { Handle::from_full(object_with_count(1, &probe)) }
        };
        prop_assert_eq!(handle.ref_count(), 1);
        drop(handle);
        prop_assert_eq!(probe.finalized(), 1);
    }

    /// Borrow-and-retain adds one reference that outlives the caller's.
    #[test]
    fn transfer_none_adds_one(count in 1i64..16) {
        let probe = FinalizeProbe::new();
        let raw = object_with_count(count, &probe);
        let handle = unsafe { Handle::from_none(raw) };
        prop_assert_eq!(handle.ref_count(), count + 1);

        release_n(raw, 1);
        prop_assert_eq!(handle.ref_count(), count);

        release_n(raw, count - 1);
        prop_assert_eq!(handle.ref_count(), 1);
        prop_assert_eq!(probe.finalized(), 0);
        drop(handle);
        prop_assert_eq!(probe.finalized(), 1);
    }

    /// A copy adds one reference; dropping either side removes it.
    #[test]
    fn copy_adds_one(count in 1i64..16, drop_original in any::<bool>()) {
        let probe = FinalizeProbe::new();
        let raw = object_with_count(count, &probe);
        let original = unsafe { Handle::from_full(raw) };
        let copy = original.clone();
        prop_assert_eq!(original.ref_count(), count + 1);
        prop_assert_eq!(copy.ref_count(), count + 1);

        let remaining = if drop_original {
            drop(original);
            copy
        } else {
            drop(copy);
            original
        };
        prop_assert_eq!(remaining.ref_count(), count);
        release_n(raw, count - 1);
        drop(remaining);
        prop_assert_eq!(probe.finalized(), 1);
    }

    /// A move leaves the source empty and the count untouched.
    #[test]
    fn move_keeps_count(count in 1i64..16) {
        let probe = FinalizeProbe::new();
        let raw = object_with_count(count, &probe);
        let mut source = unsafe { Handle::from_full(raw) };
        let destination = source.take();
        prop_assert!(source.is_null());
        prop_assert_eq!(destination.ref_count(), count);
        release_n(raw, count - 1);
        drop(destination);
        prop_assert_eq!(probe.finalized(), 1);
    }

    /// Any number of claims on a floating object counts as one.
    #[test]
    fn claim_is_idempotent(claims in 1usize..8) {
        let mut handle = unsafe { Handle::<GObject>::from_full(new_floating()) };
        for _ in 0..claims {
            handle.claim_floating();
        }
        prop_assert_eq!(handle.ref_count(), 1);
        prop_assert!(!handle.is_floating());
    }

    /// Upcast and successful downcast each add exactly one reference.
    #[test]
    fn casts_add_one(count in 1i64..16) {
        let probe = FinalizeProbe::new();
        let raw: *mut GstPipeline = new_full_tracked(&probe);
        for _ in 1..count {
            unsafe { g_object_ref(raw.cast()) };
        }
        let pipeline = unsafe { Handle::from_full(raw) };

        let object: Handle<GObject> = upcast(&pipeline);
        prop_assert_eq!(object.ref_count(), count + 1);
        prop_assert_eq!(pipeline.ref_count(), count + 1);

        let back: Handle<GstBin> = downcast(&object).unwrap();
        prop_assert_eq!(back.ref_count(), count + 2);

        prop_assert!(downcast::<GstPad, _>(&object).is_err());
        prop_assert_eq!(object.ref_count(), count + 2);

        drop((object, back));
        for _ in 1..count {
            unsafe { g_object_unref(raw.cast()) };
        }
        drop(pipeline);
        prop_assert_eq!(probe.finalized(), 1);
    }

    /// Random sequences of handle operations on one object: every owning
    /// handle observes a count equal to the number of owning handles, and the
    /// object is destroyed exactly once, when the last one lets go.
    #[test]
    fn operation_sequences_keep_counts_exact(
        ops in prop::collection::vec(arb_op(), 0..48),
        floating in any::<bool>(),
    ) {
        common::init_tracing();
        let probe = FinalizeProbe::new();
        let raw = if floating {
            new_floating_tracked(&probe)
        } else {
            new_full_tracked(&probe)
        };

        let mut slots: Vec<Handle<GObject>> = (0..SLOTS).map(|_| Handle::new()).collect();
        slots[0] = unsafe { Handle::from_floating(raw) };

        for op in &ops {
            apply(&mut slots, op);

            let owning = slots.iter().filter(|slot| slot.is_owning()).count();
            for slot in &slots {
                prop_assert_eq!(slot.is_owning(), !slot.as_ptr().is_null());
                if slot.is_owning() {
                    prop_assert_eq!(slot.ref_count(), owning as i64);
                }
            }
            let expected_finalized = usize::from(owning == 0);
            prop_assert_eq!(probe.finalized(), expected_finalized);
        }

        slots.clear();
        prop_assert_eq!(probe.finalized(), 1);
    }
}

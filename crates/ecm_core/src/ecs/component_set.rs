//! Ordered component lists
//!
//! A [`ComponentSet`] is a tuple of component kinds such as
//! `(Position, LinearVelocity)`. Its ordered ids form the [`ViewKey`] that
//! identifies a cached view, and it knows how to turn a row of slot indices
//! into a tuple of `&mut` references in the same order.
//!
//! Order is part of the key: `(Position, LinearVelocity)` and
//! `(LinearVelocity, Position)` are distinct views.

use crate::ecs::{Component, ComponentRecord, ComponentTypeId, EcmError, Entity, INVALID_COMPONENT};
use std::fmt;

/// The ordered list of component ids identifying a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey(Box<[ComponentTypeId]>);

impl ViewKey {
    /// Build a key, rejecting empty lists, the reserved id, and repeats.
    pub fn new(ids: impl Into<Vec<ComponentTypeId>>) -> Result<Self, EcmError> {
        let ids = ids.into();
        if ids.is_empty() {
            return Err(EcmError::EmptyViewKey);
        }
        for (i, &id) in ids.iter().enumerate() {
            if id == INVALID_COMPONENT {
                return Err(EcmError::InvalidComponentType);
            }
            if ids[..i].contains(&id) {
                return Err(EcmError::DuplicateComponentType { id });
            }
        }
        Ok(Self(ids.into_boxed_slice()))
    }

    /// Key for a component tuple.
    pub fn of<S: ComponentSet>() -> Result<Self, EcmError> {
        Self::new(S::type_ids())
    }

    #[inline]
    pub fn as_slice(&self) -> &[ComponentTypeId] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.0.contains(&id)
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", crate::ecs::name_of(*id))?;
        }
        f.write_str("]")
    }
}

/// A tuple of component kinds that can be iterated together.
pub trait ComponentSet {
    /// Mutable references handed to `each` callbacks, in tuple order.
    type Refs<'a>;

    /// Component ids in tuple order.
    fn type_ids() -> Vec<ComponentTypeId>;

    /// Resolve a row of slot indices (one per tuple element, distinct) into
    /// references into `records`.
    fn fetch<'a>(
        entity: Entity,
        records: &'a mut [ComponentRecord],
        slots: &[usize],
    ) -> Result<Self::Refs<'a>, EcmError>;
}

/// Raw pointers to `N` records of one entity, bounds-checked.
fn record_ptrs<const N: usize>(
    entity: Entity,
    records: &mut [ComponentRecord],
    slots: &[usize],
) -> Result<[*mut ComponentRecord; N], EcmError> {
    debug_assert_eq!(slots.len(), N, "slot row does not match tuple arity");
    let len = records.len();
    if let Some(&slot) = slots.iter().find(|&&slot| slot >= len) {
        return Err(EcmError::SlotOutOfRange { entity, slot, len });
    }
    // Distinct component ids always map to distinct slots.
    debug_assert!(
        (0..N).all(|i| !slots[..i].contains(&slots[i])),
        "duplicate slot in view row"
    );
    let base = records.as_mut_ptr();
    // SAFETY: every slot was checked to be < len.
    Ok(std::array::from_fn(|i| unsafe { base.add(slots[i]) }))
}

fn downcast_record<T: Component>(record: &mut ComponentRecord) -> Result<&mut T, EcmError> {
    debug_assert!(!record.is_ignored(), "view row points at a tombstoned record");
    let id = record.type_id();
    record
        .downcast_mut::<T>()
        .ok_or(EcmError::ComponentTypeMismatch {
            id,
            expected: T::NAME,
        })
}

macro_rules! impl_component_set {
    ($n:literal; $($T:ident => $idx:tt),+) => {
        impl<$($T: Component),+> ComponentSet for ($($T,)+) {
            type Refs<'a> = ($(&'a mut $T,)+);

            fn type_ids() -> Vec<ComponentTypeId> {
                vec![$($T::ID),+]
            }

            fn fetch<'a>(
                entity: Entity,
                records: &'a mut [ComponentRecord],
                slots: &[usize],
            ) -> Result<Self::Refs<'a>, EcmError> {
                let ptrs = record_ptrs::<$n>(entity, records, slots)?;
                // SAFETY: the pointers come from one exclusive borrow of
                // `records` and address pairwise distinct slots, so the
                // resulting references never alias.
                Ok(($(
                    downcast_record::<$T>(unsafe { &mut *ptrs[$idx] })?,
                )+))
            }
        }
    };
}

impl_component_set!(1; A => 0);
impl_component_set!(2; A => 0, B => 1);
impl_component_set!(3; A => 0, B => 1, C => 2);
impl_component_set!(4; A => 0, B => 1, C => 2, D => 3);
impl_component_set!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_component_set!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_component_set!(7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_component_set!(8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);

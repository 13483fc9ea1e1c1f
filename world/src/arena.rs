//! Generational slot storage addressed by stable handles.

use elemental_arena_core::{EntityId, HazardId, ProjectileId};

/// Handle made of a slot index and the generation of the slot.
pub(crate) trait Handle: Copy {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn slot(&self) -> u32;
    fn generation_of(&self) -> u32;
}

macro_rules! handle {
    ($id:ty) => {
        impl Handle for $id {
            fn from_parts(index: u32, generation: u32) -> Self {
                <$id>::new(index, generation)
            }

            fn slot(&self) -> u32 {
                self.index()
            }

            fn generation_of(&self) -> u32 {
                self.generation()
            }
        }
    };
}

handle!(EntityId);
handle!(ProjectileId);
handle!(HazardId);

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slots reused through a free list; a freed slot bumps its generation so
/// stale handles stop resolving.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub(crate) fn insert<H: Handle>(&mut self, value: T) -> H {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return H::from_parts(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        H::from_parts(index, 0)
    }

    pub(crate) fn get<H: Handle>(&self, handle: H) -> Option<&T> {
        self.slots
            .get(handle.slot() as usize)
            .filter(|slot| slot.generation == handle.generation_of())
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut<H: Handle>(&mut self, handle: H) -> Option<&mut T> {
        self.slots
            .get_mut(handle.slot() as usize)
            .filter(|slot| slot.generation == handle.generation_of())
            .and_then(|slot| slot.value.as_mut())
    }

    pub(crate) fn remove<H: Handle>(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.slot() as usize)?;
        if slot.generation != handle.generation_of() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.slot());
        self.len -= 1;
        Some(value)
    }

    /// Live entries in slot order.
    pub(crate) fn iter<H: Handle>(&self) -> impl Iterator<Item = (H, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.value.as_ref()?;
            Some((H::from_parts(index as u32, slot.generation), value))
        })
    }

    pub(crate) fn iter_mut<H: Handle>(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            let value = slot.value.as_mut()?;
            Some((H::from_parts(index as u32, generation), value))
        })
    }

    pub(crate) fn handles<H: Handle>(&self) -> Vec<H> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(index as u32);
            }
        }
        self.len = 0;
    }
}

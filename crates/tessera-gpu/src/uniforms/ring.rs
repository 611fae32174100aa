use bytemuck::Pod;

use crate::device::{BufferDescriptor, BufferResource, BufferUsage, CacheMode, ResourceAllocator};
use crate::error::{Error, Result};

/// Ring of `capacity` uniform buffers holding one value of type `U`.
///
/// Every [`set`](Self::set) is written through to **all** slots, so any slot
/// handed out by [`next_slot`](Self::next_slot) carries the latest value.
/// Writing a slot the device is still reading from is not prevented here:
/// callers that overwrite a value while earlier frames are in flight must
/// fence those frames first.
#[derive(Debug)]
pub struct UniformRing<U, B> {
    value: U,
    slots: Vec<B>,
    cursor: usize,
}

impl<U: Pod, B: BufferResource> UniformRing<U, B> {
    /// Allocates `capacity` shared uniform buffers sized for `U` and writes
    /// `initial` into each of them.
    pub fn new<A>(initial: U, allocator: &A, capacity: usize) -> Result<Self>
    where
        A: ResourceAllocator<Buffer = B>,
    {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }

        let desc = BufferDescriptor {
            label: Some("uniform ring slot"),
            size: size_of::<U>() as u64,
            usage: BufferUsage::Uniform,
            cache_mode: CacheMode::Shared,
        };
        let slots = (0..capacity)
            .map(|_| allocator.allocate_buffer(&desc))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut ring = Self {
            value: initial,
            slots,
            cursor: 0,
        };
        ring.write_all()?;

        log::debug!(
            "uniform ring: {capacity} slot(s) of {} bytes",
            size_of::<U>()
        );
        Ok(ring)
    }

    /// Replaces the value and writes it to every slot.
    pub fn set(&mut self, value: U) -> Result<()> {
        self.value = value;
        self.write_all()
    }

    /// Edits the value in place, then writes it to every slot.
    pub fn update(&mut self, f: impl FnOnce(&mut U)) -> Result<()> {
        f(&mut self.value);
        self.write_all()
    }

    fn write_all(&mut self) -> Result<()> {
        let bytes = bytemuck::bytes_of(&self.value);
        for slot in &mut self.slots {
            slot.write_bytes(0, bytes)?;
        }
        Ok(())
    }
}

impl<U, B> UniformRing<U, B> {
    /// Current CPU-side value.
    pub fn get(&self) -> &U {
        &self.value
    }

    /// Returns the slot under the cursor and advances the cursor, wrapping
    /// after the last slot.
    pub fn next_slot(&mut self) -> &B {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.slots.len();
        log::trace!("uniform ring slot {index}");
        &self.slots[index]
    }

    pub fn slots(&self) -> &[B] {
        &self.slots
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot the next `next_slot` call returns.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{HostAllocator, HostBuffer};
    use bytemuck::Zeroable;

    #[repr(C)]
    #[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    struct Globals {
        tint: [f32; 4],
        frame: u32,
        _pad: [u32; 3],
    }

    fn globals(frame: u32) -> Globals {
        Globals {
            tint: [1.0, 0.5, 0.25, 1.0],
            frame,
            ..Globals::zeroed()
        }
    }

    fn ring(capacity: usize) -> UniformRing<Globals, HostBuffer> {
        UniformRing::new(globals(0), &HostAllocator, capacity).unwrap()
    }

    #[test]
    fn new_writes_initial_value_to_every_slot() {
        let ring = ring(3);
        assert_eq!(ring.capacity(), 3);
        for slot in ring.slots() {
            assert_eq!(slot.contents(), bytemuck::bytes_of(&globals(0)));
            assert_eq!(slot.usage(), BufferUsage::Uniform);
            assert_eq!(slot.cache_mode(), CacheMode::Shared);
        }
    }

    #[test]
    fn set_writes_through_to_every_slot() {
        let mut ring = ring(3);
        ring.next_slot();
        ring.set(globals(7)).unwrap();
        assert_eq!(ring.get(), &globals(7));
        assert!(ring
            .slots()
            .iter()
            .all(|s| s.contents() == bytemuck::bytes_of(&globals(7))));
    }

    #[test]
    fn update_edits_in_place() {
        let mut ring = ring(2);
        ring.update(|g| g.frame += 5).unwrap();
        assert_eq!(ring.get().frame, 5);
        assert_eq!(ring.slots()[1].contents(), bytemuck::bytes_of(&globals(5)));
    }

    #[test]
    fn next_slot_cycles_in_order() {
        let mut ring = ring(3);
        let order: Vec<usize> = (0..4)
            .map(|_| {
                let slot: *const HostBuffer = ring.next_slot();
                ring.slots()
                    .iter()
                    .position(|s| std::ptr::eq(s, slot))
                    .unwrap()
            })
            .collect();
        assert_eq!(order, vec![0, 1, 2, 0]);
        assert_eq!(ring.cursor(), 1);
    }

    #[test]
    fn single_slot_ring_always_returns_it() {
        let mut ring = ring(1);
        for _ in 0..3 {
            let slot: *const HostBuffer = ring.next_slot();
            assert!(std::ptr::eq(slot, &ring.slots()[0]));
        }
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let result = UniformRing::<Globals, HostBuffer>::new(globals(0), &HostAllocator, 0);
        assert!(matches!(result, Err(Error::InvalidCapacity)));
    }
}

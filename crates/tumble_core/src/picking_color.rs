//! Unique colors for GPU picking
//!
//! Every block renders into an offscreen buffer with a flat color that
//! identifies it. Colors come from a fixed palette chosen so each channel
//! value survives the float -> unorm8 -> float round trip exactly.

/// Number of distinct picking colors available
pub const PALETTE_SIZE: usize = 63;

/// An exact RGB picking color (one byte per channel)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickingColor(pub [u8; 3]);

impl PickingColor {
    /// The color as shader-side floats in [0, 1]
    pub fn to_floats(self) -> [f32; 3] {
        [
            self.0[0] as f32 / 255.0,
            self.0[1] as f32 / 255.0,
            self.0[2] as f32 / 255.0,
        ]
    }

    /// Exact byte comparison against a pixel read back from the GPU
    pub fn matches(self, rgb: [u8; 3]) -> bool {
        self.0 == rgb
    }
}

/// The nth palette entry
///
/// Channels step through {0, 85, 170, 255}, a 4x4x4 grid. Each value is
/// k * 255 / 3 for integer k, so rendering at 8 bits per channel cannot
/// perturb it. The grid holds 64 entries but black (0,0,0) is reserved as
/// the clear color, leaving 63 usable: n runs 1..=63, and every n in that
/// range has a nonzero bit in its low six, so no channel triple is all
/// zero.
pub fn palette_color(index: usize) -> PickingColor {
    debug_assert!(index < PALETTE_SIZE);
    let n = index + 1; // skip black, which is the clear color
    let step = |k: usize| (k * 255 / 3) as u8;
    PickingColor([step((n >> 4) & 3), step((n >> 2) & 3), step(n & 3)])
}

/// Hands out palette colors one at a time
///
/// Allocation is monotonic; colors are only reclaimed in bulk via `reset`,
/// which happens when the scene is rebuilt. Returns `None` once the
/// palette is exhausted, in which case the block is spawned unpickable.
#[derive(Debug, Default)]
pub struct PickingColorAllocator {
    next: usize,
}

impl PickingColorAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next unused color, or `None` if the palette ran out
    pub fn allocate(&mut self) -> Option<PickingColor> {
        if self.next >= PALETTE_SIZE {
            return None;
        }
        let color = palette_color(self.next);
        self.next += 1;
        Some(color)
    }

    /// Return every color to the pool
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// How many colors have been handed out since the last reset
    pub fn allocated(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_palette_colors_are_distinct() {
        let mut seen = HashSet::new();
        for i in 0..PALETTE_SIZE {
            assert!(seen.insert(palette_color(i).0), "duplicate at index {}", i);
        }
    }

    #[test]
    fn test_palette_never_yields_clear_color() {
        for i in 0..PALETTE_SIZE {
            assert_ne!(palette_color(i).0, [0, 0, 0]);
        }
    }

    #[test]
    fn test_last_entry_stays_clear_of_black() {
        // One past the palette would be n = 64, whose low six bits are all
        // zero; the palette must end before it
        assert_ne!(palette_color(PALETTE_SIZE - 1).0, [0, 0, 0]);
        assert_eq!(PALETTE_SIZE, 63);
    }

    #[test]
    fn test_channel_values_are_byte_exact() {
        // float -> unorm8 quantization must reproduce the original byte
        for i in 0..PALETTE_SIZE {
            let color = palette_color(i);
            for (byte, f) in color.0.iter().zip(color.to_floats()) {
                let quantized = (f * 255.0).round() as u8;
                assert_eq!(quantized, *byte);
            }
        }
    }

    #[test]
    fn test_allocator_exhaustion() {
        let mut alloc = PickingColorAllocator::new();
        for _ in 0..PALETTE_SIZE {
            assert!(alloc.allocate().is_some());
        }
        assert!(alloc.allocate().is_none());
        assert_eq!(alloc.allocated(), PALETTE_SIZE);
    }

    #[test]
    fn test_allocator_reset() {
        let mut alloc = PickingColorAllocator::new();
        let first = alloc.allocate().unwrap();
        alloc.allocate().unwrap();

        alloc.reset();
        assert_eq!(alloc.allocated(), 0);
        // After reset the sequence restarts from the same color
        assert_eq!(alloc.allocate().unwrap(), first);
    }

    #[test]
    fn test_matches_is_exact() {
        let color = palette_color(5);
        assert!(color.matches(color.0));
        let mut off = color.0;
        off[1] = off[1].wrapping_add(1);
        assert!(!color.matches(off));
    }
}

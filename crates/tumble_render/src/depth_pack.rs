//! CPU mirror of the RGBA depth packing used by the fallback shadow path
//!
//! Some mobile drivers render depth textures incorrectly when sampled with
//! comparison samplers, so the fallback path writes depth into an ordinary
//! RGBA8 target, one byte of precision per channel. These functions mirror
//! the WGSL pack/unpack exactly and exist so the encoding is testable on
//! the CPU.

/// Encode a depth value in [0, 1) into four unorm channels
///
/// Base 255, not 256: after the carry subtraction every channel is an
/// exact multiple of 1/255, which is precisely what an 8-bit unorm
/// render target can store without loss.
pub fn pack_depth(depth: f32) -> [f32; 4] {
    let mut enc = [
        (depth).fract(),
        (depth * 255.0).fract(),
        (depth * 255.0 * 255.0).fract(),
        (depth * 255.0 * 255.0 * 255.0).fract(),
    ];
    // Remove the bits already stored in the next-finer channel
    enc[0] -= enc[1] / 255.0;
    enc[1] -= enc[2] / 255.0;
    enc[2] -= enc[3] / 255.0;
    enc
}

/// Decode four unorm channels back into a depth value
pub fn unpack_depth(rgba: [f32; 4]) -> f32 {
    rgba[0]
        + rgba[1] / 255.0
        + rgba[2] / (255.0 * 255.0)
        + rgba[3] / (255.0 * 255.0 * 255.0)
}

/// Quantize to 8 bits per channel, as the RGBA8 target does
pub fn quantize(rgba: [f32; 4]) -> [f32; 4] {
    let q = |v: f32| (v * 255.0).round() / 255.0;
    [q(rgba[0]), q(rgba[1]), q(rgba[2]), q(rgba[3])]
}

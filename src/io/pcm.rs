/// Clip to [-1, 1] and scale to 16-bit.
#[inline]
pub fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Write left/right planes as interleaved 16-bit frames.
/// Converts `min(left, right, out / 2)` frames.
pub fn interleave(left: &[f32], right: &[f32], out: &mut [i16]) {
    for ((frame, &l), &r) in out.chunks_exact_mut(2).zip(left).zip(right) {
        frame[0] = to_i16(l);
        frame[1] = to_i16(r);
    }
}

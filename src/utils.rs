/// `interpolate_88(t, x)` is the value of table `t` at 16 bit position `x`, linearly interpolated
///
/// # Arguments:
///
/// * `table` - a 257 entry table, the upper 8 bits of `x` index into it
///
/// * `x` - the position to look up, the lower 8 bits are the fractional distance to the next entry
pub fn interpolate_88<T: Copy + Into<i32>>(table: &[T; 257], x: u16) -> i32 {
    let idx = (x >> 8) as usize;
    let frac = (x & 0xFF) as i32;
    let y0: i32 = table[idx].into();
    let y1: i32 = table[idx + 1].into();
    y0 + (((y1 - y0) * frac) >> 8)
}

/// `constrain(v, lo, hi)` is `v` clamped to `[lo, hi]`
pub fn constrain<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo {
        lo
    } else if hi < v {
        hi
    } else {
        v
    }
}

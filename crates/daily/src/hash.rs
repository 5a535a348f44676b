//! Seeded date hash.
//!
//! Every step is 64-bit two's-complement arithmetic that wraps on overflow,
//! and every shift is arithmetic (sign-extending). Changing either changes
//! which verse every existing device sees, so these are fixed forever.

use time::Date;

const MULTIPLIER: i64 = 31;
const MIX_1: i64 = 0x85eb_ca6b;
const MIX_2: i64 = 0xc2b2_ae35;

/// Mix a seed with a calendar date into a 64-bit hash.
///
/// # Examples
///
/// ```
/// use time::macros::date;
/// use verse_daily::hash::mix;
///
/// assert_eq!(mix(42, date!(2025 - 01 - 15)), 976375977222058904);
/// ```
pub fn mix(seed: u64, date: Date) -> i64 {
    // Seeds are generated in 0..=i64::MAX; anything larger wraps like the
    // bit pattern it is.
    let mut h = seed as i64;
    for component in [i64::from(date.year()), i64::from(u8::from(date.month())), i64::from(date.day())] {
        h = h.wrapping_mul(MULTIPLIER).wrapping_add(component);
    }
    h ^= h >> 16;
    h = h.wrapping_mul(MIX_1);
    h ^= h >> 13;
    h = h.wrapping_mul(MIX_2);
    h ^= h >> 16;
    h
}

/// Index into a list of `len` entries for this seed and date, or `None` for
/// an empty list.
///
/// Uses the unsigned magnitude of the hash, so `i64::MIN` is handled rather
/// than overflowing.
pub fn select(seed: u64, date: Date, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let magnitude = mix(seed, date).unsigned_abs();
    Some((magnitude % len as u64) as usize)
}

//! String-seeded pseudo-random numbers for poster layout.
//!
//! A seed string is folded into a 32-bit hash (FNV-1a offset basis with the
//! shift-add multiply step), and the hash seeds a linear-congruential
//! generator using the Numerical Recipes constants.
//!
//! The generator state is an `f64` in `[0, 2^32)`. The initial state keeps the
//! fractional part of `hash / 2^32 * 1e9`, and each step is evaluated in double
//! precision (`(s * 1664525 + 1013904223) % 2^32`, no fused multiply-add); only
//! the returned value drops the fraction. IEEE-754 makes this bit-identical on
//! every platform.
//!
//! **Not cryptographically secure.** The output is predictable from the seed
//! string and must only be used for cosmetic layout (star positions, ray
//! jitter). Never use it for tokens, keys, sampling with security impact, or
//! anything an attacker could benefit from predicting.

/// FNV-1a 32-bit offset basis
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

const LCG_MULTIPLIER: f64 = 1_664_525.0;
const LCG_INCREMENT: f64 = 1_013_904_223.0;
const TWO_POW_32: f64 = 4_294_967_296.0;
const SEED_SCALE: f64 = 1e9;

/// Hash a seed string to 32 bits.
///
/// Folds UTF-16 code units, so strings in the Basic Multilingual Plane hash
/// by code point.
pub fn hash_seed(input: &str) -> u32 {
    let mut h = FNV_OFFSET_BASIS;
    for unit in input.encode_utf16() {
        h ^= u32::from(unit);
        h = h.wrapping_add(
            (h << 1)
                .wrapping_add(h << 4)
                .wrapping_add(h << 7)
                .wrapping_add(h << 8)
                .wrapping_add(h << 24),
        );
    }
    h
}

/// Normalize a 32-bit hash to `[0, 1)`.
pub fn unit_interval(hash: u32) -> f64 {
    f64::from(hash) / TWO_POW_32
}

/// Deterministic generator carrying its own state.
///
/// Every render owns a fresh generator; nothing is shared between renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SeededRandom {
    state: f64,
    draws: u64,
}

impl SeededRandom {
    /// Build a generator from an arbitrary seed string.
    pub fn from_seed_str(seed: &str) -> Self {
        Self {
            state: unit_interval(hash_seed(seed)) * SEED_SCALE,
            draws: 0,
        }
    }

    /// Generator for a poster: seeded by `title + "|" + subtitle`.
    pub fn for_poster(title: &str, subtitle: &str) -> Self {
        Self::from_seed_str(&seed_string(title, subtitle))
    }

    /// Advance the generator and return a value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % TWO_POW_32;
        self.draws += 1;
        // state is in [0, 2^32), so the cast only drops the fraction
        f64::from(self.state as u32) / TWO_POW_32
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Current internal state, fraction included.
    pub fn state(&self) -> f64 {
        self.state
    }
}

impl Iterator for SeededRandom {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// The seed string for a `(title, subtitle)` pair.
pub fn seed_string(title: &str, subtitle: &str) -> String {
    format!("{}|{}", title, subtitle)
}

/// Closure form of the generator: each call returns the next value in `[0, 1)`.
pub fn make_generator(seed: &str) -> impl FnMut() -> f64 {
    let mut rng = SeededRandom::from_seed_str(seed);
    move || rng.next_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(hash_seed(""), FNV_OFFSET_BASIS);
        // FNV-1a of "a" is 0xe40c292c
        assert_eq!(hash_seed("a"), 0xe40c_292c);
        assert_eq!(hash_seed("A|B"), 1_809_348_118);
    }

    #[test]
    fn initial_state_is_scaled_hash() {
        assert_eq!(SeededRandom::from_seed_str("").state(), 504_342_899.890_616_54);
        assert_eq!(SeededRandom::for_poster("A", "B").state(), 421_271_686.907_857_66);
    }

    #[test]
    fn sequence_matches_known_values() {
        let mut rng = SeededRandom::for_poster("A", "B");
        let expected = [432_973_084u32, 25_528_916, 127_630_892, 3_858_296_868, 2_371_389_885];
        for raw in expected {
            let v = rng.next_f64();
            assert_eq!(v, f64::from(raw) / 4_294_967_296.0);
        }
        assert_eq!(rng.draws(), 5);

        let empty: Vec<u32> = SeededRandom::from_seed_str("")
            .take(3)
            .map(|v| (v * 4_294_967_296.0) as u32)
            .collect();
        assert_eq!(empty, [2_366_635_787, 2_919_037_940, 2_039_196_105]);
    }

    #[test]
    fn fraction_is_carried_between_steps() {
        let mut rng = SeededRandom::for_poster("A", "B");
        rng.next_f64();
        assert_eq!(rng.state(), 432_973_084.75);
        rng.next_f64();
        assert_eq!(rng.state(), 25_528_916.75);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a: Vec<f64> = SeededRandom::from_seed_str("عنوان|سطر").take(64).collect();
        let b: Vec<f64> = SeededRandom::from_seed_str("عنوان|سطر").take(64).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn subtitle_change_changes_sequence() {
        let mut g1 = make_generator("a|b");
        let mut g2 = make_generator("a|c");
        let s1: Vec<f64> = (0..10).map(|_| g1()).collect();
        let s2: Vec<f64> = (0..10).map(|_| g2()).collect();
        assert_ne!(s1, s2);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        for v in SeededRandom::from_seed_str("|").take(10_000) {
            assert!((0.0..1.0).contains(&v), "{} out of range", v);
        }
    }
}

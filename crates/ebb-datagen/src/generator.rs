//! Typed value generation.
//!
//! [`TypedValueGenerator`] produces `count` values of one column type in
//! either ordered or random mode. Ordered sequences step evenly from the
//! domain minimum and pin the final value to the domain maximum, so both
//! extremes appear whenever `count >= 2`. Random sequences draw uniformly
//! from the legal domain (null sentinels excluded) with a small bias
//! toward the extremes so large samples exercise both boundaries.
//!
//! Every sequence is a pure function of `(type, count, order, seed)`;
//! per-type streams are decorrelated by mixing the type tag into the seed.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ebb_common::constants::SEED_MIX;
use ebb_common::{ColumnType, Value, ValueOrder};

use crate::error::{DatagenError, DatagenResult};

/// Prefix for ordered binary payloads.
const BINARY_PREFIX: &str = "bin_";

/// Prefix for ordered nchar payloads.
const NCHAR_PREFIX: &str = "nc_";

/// Alphabet for random nchar payloads; mixes ASCII with multibyte
/// characters so character-count bounds diverge from byte counts.
const NCHAR_ALPHABET: &[char] = &[
    'a', 'b', 'c', 'x', 'y', 'z', '0', '9', '数', '据', '库', '表', '测', '试', 'é', 'ß',
];

/// Denominator of the extreme-bias ratio in random mode: one draw in 32
/// is replaced by a domain extreme.
const EXTREME_BIAS_DEN: u32 = 32;

/// Seeded generator of typed value sequences.
#[derive(Debug, Clone, Copy)]
pub struct TypedValueGenerator {
    seed: u64,
}

impl TypedValueGenerator {
    /// Creates a generator with the run's fixed seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generates `count` values of `ty` in the requested order.
    ///
    /// # Errors
    ///
    /// [`DatagenError::OutOfDomain`] when `ty` declares an illegal text
    /// bound; values are never silently clamped into range.
    pub fn generate(
        &self,
        ty: ColumnType,
        count: usize,
        order: ValueOrder,
    ) -> DatagenResult<Vec<Value>> {
        if !ty.bound_is_legal() {
            return Err(DatagenError::OutOfDomain { ty: ty.sql_name() });
        }
        let mut rng = StdRng::seed_from_u64(self.stream_seed(ty));
        let values = match order {
            ValueOrder::Ordered => ordered(ty, count),
            ValueOrder::Random => (0..count).map(|_| random(ty, &mut rng)).collect(),
        };
        debug_assert_eq!(values.len(), count);
        Ok(values)
    }

    /// Seed for one type's stream, decorrelated from every other type's.
    fn stream_seed(&self, ty: ColumnType) -> u64 {
        (self.seed ^ type_tag(ty)).wrapping_mul(SEED_MIX)
    }
}

/// Stable per-type tag used for stream decorrelation; text variants fold
/// in their bound so `Binary(16)` and `Binary(64)` get distinct streams.
fn type_tag(ty: ColumnType) -> u64 {
    match ty {
        ColumnType::Timestamp => 1,
        ColumnType::Bool => 2,
        ColumnType::TinyInt => 3,
        ColumnType::SmallInt => 4,
        ColumnType::Int => 5,
        ColumnType::BigInt => 6,
        ColumnType::UTinyInt => 7,
        ColumnType::USmallInt => 8,
        ColumnType::UInt => 9,
        ColumnType::UBigInt => 10,
        ColumnType::Float => 11,
        ColumnType::Double => 12,
        ColumnType::Binary(n) => 13 | (u64::from(n) << 8),
        ColumnType::NChar(n) => 14 | (u64::from(n) << 8),
    }
}

fn ordered(ty: ColumnType, count: usize) -> Vec<Value> {
    if let Some((min, max)) = ty.integer_domain() {
        return (0..count)
            .map(|i| from_i128(ty, stepped(min, max, i, count)))
            .collect();
    }
    match ty {
        ColumnType::Bool => (0..count).map(|i| Value::Bool(i * 2 >= count)).collect(),
        ColumnType::Float => (0..count)
            .map(|i| Value::Float(lerp(f64::from(f32::MIN), f64::from(f32::MAX), i, count) as f32))
            .collect(),
        ColumnType::Double => (0..count)
            .map(|i| Value::Double(lerp(f64::MIN, f64::MAX, i, count)))
            .collect(),
        ColumnType::Binary(n) => (0..count)
            .map(|i| Value::Binary(ordered_text(BINARY_PREFIX, i, count, n)))
            .collect(),
        ColumnType::NChar(n) => (0..count)
            .map(|i| Value::NChar(ordered_text(NCHAR_PREFIX, i, count, n)))
            .collect(),
        _ => unreachable!("integer domains handled above"),
    }
}

/// The i-th of `count` evenly spaced points over `[min, max]`; the last
/// point is exactly `max`, the first exactly `min`.
fn stepped(min: i128, max: i128, i: usize, count: usize) -> i128 {
    if count <= 1 || i == 0 {
        return min;
    }
    if i + 1 == count {
        return max;
    }
    min + (max - min) / (count as i128 - 1) * i as i128
}

/// Linear interpolation in the form that stays finite for full float
/// domains (`max - min` would overflow to infinity).
fn lerp(min: f64, max: f64, i: usize, count: usize) -> f64 {
    if count <= 1 || i == 0 {
        return min;
    }
    if i + 1 == count {
        return max;
    }
    let t = i as f64 / (count - 1) as f64;
    min * (1.0 - t) + max * t
}

/// Ordered text payload: prefix plus zero-padded index, truncated to the
/// bound so lexicographic order is non-decreasing. The final value is
/// padded out to exactly the bound to cover the maximum-length boundary.
fn ordered_text(prefix: &str, i: usize, count: usize, bound: u32) -> String {
    let bound = bound as usize;
    let mut s = format!("{prefix}{i:010}");
    s.truncate(bound);
    if i + 1 == count {
        while s.len() < bound {
            s.push('z');
        }
    }
    s
}

fn random(ty: ColumnType, rng: &mut StdRng) -> Value {
    if let Some((min, max)) = ty.integer_domain() {
        let v = if rng.gen_ratio(1, EXTREME_BIAS_DEN) {
            if rng.gen::<bool>() { max } else { min }
        } else {
            rng.gen_range(min..=max)
        };
        return from_i128(ty, v);
    }
    match ty {
        ColumnType::Bool => Value::Bool(rng.gen()),
        ColumnType::Float => {
            if rng.gen_ratio(1, EXTREME_BIAS_DEN) {
                Value::Float(if rng.gen::<bool>() { f32::MAX } else { f32::MIN })
            } else {
                Value::Float(((rng.gen::<f64>() * 2.0 - 1.0) * f64::from(f32::MAX)) as f32)
            }
        }
        ColumnType::Double => {
            if rng.gen_ratio(1, EXTREME_BIAS_DEN) {
                Value::Double(if rng.gen::<bool>() { f64::MAX } else { f64::MIN })
            } else {
                Value::Double((rng.gen::<f64>() * 2.0 - 1.0) * f64::MAX)
            }
        }
        ColumnType::Binary(n) => Value::Binary(random_binary(rng, n)),
        ColumnType::NChar(n) => Value::NChar(random_nchar(rng, n)),
        _ => unreachable!("integer domains handled above"),
    }
}

fn random_binary(rng: &mut StdRng, bound: u32) -> String {
    let len = if rng.gen_ratio(1, EXTREME_BIAS_DEN) {
        bound as usize
    } else {
        rng.gen_range(1..=bound as usize)
    };
    rng.sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

fn random_nchar(rng: &mut StdRng, bound: u32) -> String {
    let len = if rng.gen_ratio(1, EXTREME_BIAS_DEN) {
        bound as usize
    } else {
        rng.gen_range(1..=bound as usize)
    };
    (0..len)
        .map(|_| NCHAR_ALPHABET[rng.gen_range(0..NCHAR_ALPHABET.len())])
        .collect()
}

fn from_i128(ty: ColumnType, v: i128) -> Value {
    match ty {
        ColumnType::TinyInt => Value::TinyInt(v as i8),
        ColumnType::SmallInt => Value::SmallInt(v as i16),
        ColumnType::Int => Value::Int(v as i32),
        ColumnType::BigInt => Value::BigInt(v as i64),
        ColumnType::UTinyInt => Value::UTinyInt(v as u8),
        ColumnType::USmallInt => Value::USmallInt(v as u16),
        ColumnType::UInt => Value::UInt(v as u32),
        ColumnType::UBigInt => Value::UBigInt(v as u64),
        ColumnType::Timestamp => Value::Timestamp(v as i64),
        _ => unreachable!("not an integer-domain type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebb_common::constants::DEFAULT_SEED;

    const ALL_TYPES: &[ColumnType] = &[
        ColumnType::Timestamp,
        ColumnType::Bool,
        ColumnType::TinyInt,
        ColumnType::SmallInt,
        ColumnType::Int,
        ColumnType::BigInt,
        ColumnType::UTinyInt,
        ColumnType::USmallInt,
        ColumnType::UInt,
        ColumnType::UBigInt,
        ColumnType::Float,
        ColumnType::Double,
        ColumnType::Binary(16),
        ColumnType::NChar(32),
    ];

    fn generator() -> TypedValueGenerator {
        TypedValueGenerator::new(DEFAULT_SEED)
    }

    #[test]
    fn test_every_type_yields_exact_count_in_domain() {
        let generator = generator();
        for &ty in ALL_TYPES {
            for order in [ValueOrder::Ordered, ValueOrder::Random] {
                let values = generator.generate(ty, 100, order).unwrap();
                assert_eq!(values.len(), 100, "{ty}");
                for v in &values {
                    assert!(v.matches(&ty), "{v:?} out of domain for {ty}");
                }
            }
        }
    }

    #[test]
    fn test_ordered_is_monotonic_and_covers_extremes() {
        let generator = generator();
        let values = generator
            .generate(ColumnType::SmallInt, 50, ValueOrder::Ordered)
            .unwrap();
        let ints: Vec<i64> = values.iter().map(|v| v.as_i64().unwrap()).collect();
        assert!(ints.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*ints.first().unwrap(), -32_767);
        assert_eq!(*ints.last().unwrap(), 32_767);
    }

    #[test]
    fn test_ordered_two_values_are_min_and_max() {
        let generator = generator();
        let values = generator
            .generate(ColumnType::UTinyInt, 2, ValueOrder::Ordered)
            .unwrap();
        assert_eq!(values, vec![Value::UTinyInt(0), Value::UTinyInt(254)]);
    }

    #[test]
    fn test_ordered_floats_are_finite_and_monotonic() {
        let generator = generator();
        let values = generator
            .generate(ColumnType::Double, 64, ValueOrder::Ordered)
            .unwrap();
        let mut prev = f64::NEG_INFINITY;
        for v in values {
            let Value::Double(d) = v else { panic!("wrong variant") };
            assert!(d.is_finite());
            assert!(d >= prev);
            prev = d;
        }
        assert_eq!(prev, f64::MAX);
    }

    #[test]
    fn test_ordered_bool_starts_false_ends_true() {
        let generator = generator();
        let values = generator.generate(ColumnType::Bool, 10, ValueOrder::Ordered).unwrap();
        assert_eq!(values[0], Value::Bool(false));
        assert_eq!(values[9], Value::Bool(true));
    }

    #[test]
    fn test_ordered_text_respects_bound_and_order() {
        let generator = generator();
        let values = generator
            .generate(ColumnType::Binary(16), 30, ValueOrder::Ordered)
            .unwrap();
        let strings: Vec<&str> = values.iter().map(|v| v.as_str().unwrap()).collect();
        assert!(strings.windows(2).all(|w| w[0] <= w[1]));
        assert!(strings.iter().all(|s| s.len() <= 16));
        // Max-length boundary hit by the final value.
        assert_eq!(strings.last().unwrap().len(), 16);
    }

    #[test]
    fn test_nchar_bound_counts_characters() {
        let generator = generator();
        let values = generator
            .generate(ColumnType::NChar(8), 500, ValueOrder::Random)
            .unwrap();
        assert!(values
            .iter()
            .all(|v| v.as_str().unwrap().chars().count() <= 8));
        // The multibyte alphabet should surface payloads whose byte length
        // exceeds their character count.
        assert!(values
            .iter()
            .any(|v| v.as_str().unwrap().len() > v.as_str().unwrap().chars().count()));
    }

    #[test]
    fn test_random_covers_extremes_over_large_sample() {
        let generator = generator();
        let values = generator
            .generate(ColumnType::TinyInt, 5_000, ValueOrder::Random)
            .unwrap();
        let ints: Vec<i64> = values.iter().map(|v| v.as_i64().unwrap()).collect();
        assert!(ints.contains(&-127));
        assert!(ints.contains(&127));
        // The null sentinel never appears.
        assert!(!ints.contains(&-128));
    }

    #[test]
    fn test_same_seed_reproduces_same_sequence() {
        let a = TypedValueGenerator::new(7)
            .generate(ColumnType::NChar(32), 64, ValueOrder::Random)
            .unwrap();
        let b = TypedValueGenerator::new(7)
            .generate(ColumnType::NChar(32), 64, ValueOrder::Random)
            .unwrap();
        assert_eq!(a, b);

        let c = TypedValueGenerator::new(8)
            .generate(ColumnType::NChar(32), 64, ValueOrder::Random)
            .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_illegal_bound_is_domain_error() {
        let generator = generator();
        assert!(matches!(
            generator.generate(ColumnType::Binary(0), 10, ValueOrder::Ordered),
            Err(DatagenError::OutOfDomain { .. })
        ));
        assert!(matches!(
            generator.generate(ColumnType::NChar(1_000_000), 10, ValueOrder::Random),
            Err(DatagenError::OutOfDomain { .. })
        ));
    }
}

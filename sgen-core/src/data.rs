//! Random sources, configuration and the generation context.

use crate::value::Value;
use chrono::{Local, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::fmt;
use std::ops::RangeInclusive;

const ASCII_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A source of randomness for intrinsic value synthesis.
///
/// Any [`RngCore`] can back a source. Swapping the source changes the
/// literals emitted, never the shape of the generated value sets.
pub trait RandomSource: RngCore {
    /// Uniform integer in `[min, max]`. Returns `min` when the range is empty.
    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.gen_range(min..=max)
    }

    /// Uniform length in `range`.
    fn length(&mut self, range: &RangeInclusive<usize>) -> usize {
        if range.is_empty() {
            return *range.start();
        }
        self.gen_range(range.clone())
    }

    /// Uniform float in `[min, max)`.
    fn float_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.gen_range(min..max)
    }

    /// Random string of ASCII letters with exactly `length` characters.
    fn letters(&mut self, length: usize) -> String {
        (0..length)
            .filter_map(|_| ASCII_LETTERS.choose(&mut *self))
            .map(|&letter| char::from(letter))
            .collect()
    }

    /// The current local date and time.
    fn now(&mut self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Splittable random seed for deterministic generation.
///
/// Seeds can be split to create independent random streams,
/// ensuring deterministic and reproducible generation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Split a seed into two independent seeds.
    /// Uses SplitMix64 splitting strategy for independence.
    pub fn split(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Generate the next random value and the advanced seed.
    pub fn advance(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate the next random value, advancing this seed in place.
    pub fn draw(&mut self) -> u64 {
        let (value, next) = self.advance();
        *self = next;
        value
    }
}

impl RngCore for Seed {
    fn next_u32(&mut self) -> u32 {
        (self.draw() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.draw()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.draw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl RandomSource for Seed {}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// Random source backed by the thread-local generator of `rand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSource;

impl RngCore for ThreadSource {
    fn next_u32(&mut self) -> u32 {
        rand::thread_rng().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        rand::thread_rng().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        rand::thread_rng().try_fill_bytes(dest)
    }
}

impl RandomSource for ThreadSource {}

/// Configuration for value generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum attempts at synthesizing a value outside a rejected set.
    pub retry_limit: usize,

    /// Length range of intrinsic positive strings.
    pub string_length: RangeInclusive<usize>,

    /// Repeat-count range of intrinsic collection values.
    pub collection_length: RangeInclusive<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            retry_limit: 100,
            string_length: 1..=10,
            collection_length: 1..=5,
        }
    }
}

impl Config {
    /// Set the retry budget for distinct-value synthesis.
    pub fn with_retry_limit(mut self, limit: usize) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Set the length range of intrinsic strings.
    pub fn with_string_length(mut self, range: RangeInclusive<usize>) -> Self {
        self.string_length = range;
        self
    }

    /// Set the repeat-count range of intrinsic collection values.
    pub fn with_collection_length(mut self, range: RangeInclusive<usize>) -> Self {
        self.collection_length = range;
        self
    }
}

/// State of one generation pass: the random source and the configuration.
pub struct Context {
    source: Box<dyn RandomSource>,
    config: Config,
    elements: Option<Vec<Value>>,
}

impl Context {
    pub fn new<S>(config: Config, source: S) -> Self
    where
        S: RandomSource + 'static,
    {
        Context {
            source: Box::new(source),
            config,
            elements: None,
        }
    }

    /// Reproducible context with the default configuration.
    pub fn seeded(seed: u64) -> Self {
        Context::new(Config::default(), Seed::from_u64(seed))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&mut self) -> &mut dyn RandomSource {
        self.source.as_mut()
    }

    /// Element values prepared by the collection currently generating.
    pub fn elements(&self) -> Option<&[Value]> {
        self.elements.as_deref()
    }

    /// Run `f` with `elements` prepared, restoring the previous ones after.
    pub fn with_elements<R, F>(&mut self, elements: Vec<Value>, f: F) -> R
    where
        F: FnOnce(&mut Context) -> R,
    {
        let previous = self.elements.replace(elements);
        let result = f(self);
        self.elements = previous;
        result
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Config::default(), ThreadSource)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("elements", &self.elements.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Ensure gamma is odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic() {
        let mut a = Seed::from_u64(42);
        let mut b = Seed::from_u64(42);
        for _ in 0..10 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_split_seeds_diverge() {
        let (left, right) = Seed::from_u64(7).split();
        assert_ne!(left.advance().0, right.advance().0);
    }

    #[test]
    fn test_seed_drives_rand() {
        let mut a = Seed::from_u64(5);
        let mut b = Seed::from_u64(5);
        assert_eq!(a.next_u64(), b.draw());

        let mut bytes = [0u8; 11];
        a.fill_bytes(&mut bytes);
        let mut expected = b.draw().to_le_bytes().to_vec();
        expected.extend_from_slice(&b.draw().to_le_bytes()[..3]);
        assert_eq!(bytes.to_vec(), expected);
    }

    #[test]
    fn test_int_range_stays_in_bounds() {
        let mut seed = Seed::from_u64(1);
        for _ in 0..1000 {
            let value = seed.int_range(-100, 100);
            assert!((-100..=100).contains(&value));
        }
        assert_eq!(seed.int_range(5, 5), 5);
        assert_eq!(seed.int_range(9, 3), 9);
        assert_eq!(seed.int_range(i64::MIN, i64::MIN), i64::MIN);
        let _ = seed.int_range(i64::MIN, i64::MAX);
    }

    #[test]
    fn test_thread_source_stays_in_bounds() {
        let mut source = ThreadSource;
        for _ in 0..100 {
            assert!((1..=5).contains(&source.length(&(1..=5))));
        }
        assert_eq!(source.letters(12).len(), 12);
    }

    #[test]
    fn test_letters_have_exact_length() {
        let mut seed = Seed::from_u64(3);
        for length in [0, 1, 10, 250] {
            let text = seed.letters(length);
            assert_eq!(text.len(), length);
            assert!(text.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn test_float_range_stays_in_bounds() {
        let mut seed = Seed::from_u64(9);
        for _ in 0..1000 {
            let value = seed.float_range(-1.0, 1.0);
            assert!((-1.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_with_elements_restores_previous() {
        let mut cx = Context::seeded(0);
        let outer = vec![Value::Int(1)];
        let seen = cx.with_elements(outer.clone(), |cx| {
            let inner = cx.with_elements(vec![Value::Null], |cx| cx.elements().map(<[Value]>::to_vec));
            assert_eq!(inner, Some(vec![Value::Null]));
            cx.elements().map(<[Value]>::to_vec)
        });
        assert_eq!(seen, Some(outer));
        assert_eq!(cx.elements(), None);
    }

    #[test]
    fn test_config_builders() {
        let config = Config::default()
            .with_retry_limit(3)
            .with_string_length(4..=4)
            .with_collection_length(2..=3);
        assert_eq!(config.retry_limit, 3);
        assert_eq!(config.string_length, 4..=4);
        assert_eq!(config.collection_length, 2..=3);
    }
}

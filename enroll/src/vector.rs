//! Dense vector helpers shared by the fuser.

use std::ops::{Add, Div, Mul};

/// Scalar type used for embedding arithmetic.
///
/// Implemented for `f32` and `f64` so the fuser can run its normalization
/// math at the precision the caller asks for.
pub trait Element:
    Copy + PartialOrd + Add<Output = Self> + Mul<Output = Self> + Div<Output = Self> + Send + Sync
{
    const ZERO: Self;
    fn from_f32(v: f32) -> Self;
    fn from_f64(v: f64) -> Self;
    fn to_f32(self) -> f32;
    fn sqrt(self) -> Self;
}

impl Element for f32 {
    const ZERO: Self = 0.0;
    fn from_f32(v: f32) -> Self {
        v
    }
    fn from_f64(v: f64) -> Self {
        v as f32
    }
    fn to_f32(self) -> f32 {
        self
    }
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
}

impl Element for f64 {
    const ZERO: Self = 0.0;
    fn from_f32(v: f32) -> Self {
        v as f64
    }
    fn from_f64(v: f64) -> Self {
        v
    }
    fn to_f32(self) -> f32 {
        self as f32
    }
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

/// Dot product of two equal-length vectors.
pub fn dot<T: Element>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b)
        .fold(T::ZERO, |acc, (&x, &y)| acc + x * y)
}

/// Scales `v` to unit L2 norm in place. Zero vectors are left unchanged.
pub fn l2_normalize<T: Element>(v: &mut [T]) {
    let norm = dot(v, v).sqrt();
    if norm > T::ZERO {
        for x in v.iter_mut() {
            *x = *x / norm;
        }
    }
}

/// Converts an f32 embedding to `T` and L2-normalizes it.
pub fn normalized<T: Element>(v: &[f32]) -> Vec<T> {
    let mut out: Vec<T> = v.iter().map(|&x| T::from_f32(x)).collect();
    l2_normalize(&mut out);
    out
}

/// Cosine similarity between two vectors in `[-1, 1]`.
///
/// Uses f64 intermediate precision. Returns 0 for zero vectors or
/// dimension mismatches.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}

/// Returns the L2 norm of an f32 vector, accumulated in f64.
#[cfg(test)]
pub(crate) fn l2_norm(v: &[f32]) -> f32 {
    v.iter()
        .map(|&x| (x as f64) * (x as f64))
        .sum::<f64>()
        .sqrt() as f32
}

//! Weighted fusion of per-sample speaker embeddings.
//!
//! # Algorithm
//!
//! 1. L2-normalize every embedding.
//! 2. Centroid = L2-normalized mean of the normalized embeddings.
//! 3. Drop embeddings whose cosine similarity to the centroid is below the
//!    outlier threshold. If that drops all of them, keep all of them.
//! 4. Renormalize the surviving weights to sum to 1.
//! 5. Fused = L2-normalized weighted sum of the surviving embeddings.
//!
//! A single embedding skips all of this and is only normalized.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::EnrollError;
use crate::vector::{Element, dot, l2_normalize, normalized};

/// Arithmetic precision for the fuser's normalization math.
///
/// Inputs and outputs are always f32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    F32,
    #[default]
    F64,
}

/// Options for [`fuse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuseOptions {
    /// Minimum cosine similarity to the centroid for an embedding to be
    /// kept (default: 0.7). 0 or below disables outlier rejection.
    pub outlier_threshold: f32,
    /// Precision of intermediate arithmetic (default: f64).
    pub precision: Precision,
}

impl Default for FuseOptions {
    fn default() -> Self {
        Self {
            outlier_threshold: 0.7,
            precision: Precision::F64,
        }
    }
}

/// Result of a fusion with the bookkeeping behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fusion {
    /// L2-normalized fused embedding.
    pub embedding: Vec<f32>,
    /// Indices of the embeddings that contributed, ascending.
    pub kept: Vec<usize>,
    /// `(index, similarity)` of embeddings rejected as outliers.
    pub excluded: Vec<(usize, f32)>,
    /// True if every embedding fell below the threshold and the full set
    /// was used instead.
    pub fell_back: bool,
}

/// Fuses embeddings into one L2-normalized vector.
///
/// `weights`, when given, must have one entry per embedding. Negative or
/// non-finite weights count as 0. If no weights are given, or the weights
/// of the surviving embeddings sum to 0, the survivors are averaged
/// uniformly.
///
/// Fails only on invalid input: no embeddings, embeddings of differing
/// dimension, or a weight count that does not match.
pub fn fuse_embeddings(
    embeddings: &[Vec<f32>],
    weights: Option<&[f64]>,
    opts: &FuseOptions,
) -> Result<Vec<f32>, EnrollError> {
    fuse(embeddings, weights, opts).map(|f| f.embedding)
}

/// Like [`fuse_embeddings`] but also reports which embeddings were used.
pub fn fuse(
    embeddings: &[Vec<f32>],
    weights: Option<&[f64]>,
    opts: &FuseOptions,
) -> Result<Fusion, EnrollError> {
    let first = embeddings.first().ok_or(EnrollError::NoEmbeddings)?;
    if let Some(w) = weights {
        if w.len() != embeddings.len() {
            return Err(EnrollError::WeightCountMismatch {
                embeddings: embeddings.len(),
                weights: w.len(),
            });
        }
    }
    for (index, e) in embeddings.iter().enumerate().skip(1) {
        if e.len() != first.len() {
            return Err(EnrollError::DimensionMismatch {
                index,
                expected: first.len(),
                got: e.len(),
            });
        }
    }

    Ok(match opts.precision {
        Precision::F32 => fuse_in::<f32>(embeddings, weights, opts.outlier_threshold),
        Precision::F64 => fuse_in::<f64>(embeddings, weights, opts.outlier_threshold),
    })
}

fn fuse_in<T: Element>(embeddings: &[Vec<f32>], weights: Option<&[f64]>, threshold: f32) -> Fusion {
    if embeddings.len() == 1 {
        return Fusion {
            embedding: to_f32(&normalized::<T>(&embeddings[0])),
            kept: vec![0],
            excluded: Vec::new(),
            fell_back: false,
        };
    }

    let normed: Vec<Vec<T>> = embeddings.iter().map(|e| normalized(e)).collect();
    let dim = normed[0].len();

    let mut centroid = vec![T::ZERO; dim];
    for e in &normed {
        for (c, &x) in centroid.iter_mut().zip(e) {
            *c = *c + x;
        }
    }
    let n = T::from_f64(normed.len() as f64);
    for c in centroid.iter_mut() {
        *c = *c / n;
    }
    l2_normalize(&mut centroid);

    let mut kept = Vec::with_capacity(normed.len());
    let mut excluded = Vec::new();
    for (i, e) in normed.iter().enumerate() {
        if threshold > 0.0 {
            let sim = dot(e, &centroid).to_f32();
            if sim < threshold {
                info!(
                    sample = i,
                    similarity = sim,
                    threshold,
                    "enroll: excluding outlier embedding"
                );
                excluded.push((i, sim));
                continue;
            }
        }
        kept.push(i);
    }

    let fell_back = kept.is_empty();
    if fell_back {
        warn!(
            samples = normed.len(),
            threshold, "enroll: all embeddings below outlier threshold, using all"
        );
        kept = (0..normed.len()).collect();
    }

    let weight_of = |i: usize| -> f64 {
        let w = weights.map_or(1.0, |w| w[i]);
        if w.is_finite() && w > 0.0 { w } else { 0.0 }
    };
    let mut total: f64 = kept.iter().map(|&i| weight_of(i)).sum();
    let uniform = total <= 0.0;
    if uniform {
        total = kept.len() as f64;
    }

    let mut combined = vec![T::ZERO; dim];
    for &i in &kept {
        let w = if uniform { 1.0 } else { weight_of(i) };
        let w = T::from_f64(w / total);
        for (c, &x) in combined.iter_mut().zip(&normed[i]) {
            *c = *c + w * x;
        }
    }
    l2_normalize(&mut combined);

    Fusion {
        embedding: to_f32(&combined),
        kept,
        excluded,
        fell_back,
    }
}

fn to_f32<T: Element>(v: &[T]) -> Vec<f32> {
    v.iter().map(|&x| x.to_f32()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{cosine_similarity, l2_norm};

    fn opts(threshold: f32) -> FuseOptions {
        FuseOptions {
            outlier_threshold: threshold,
            ..Default::default()
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = fuse_embeddings(&[], None, &FuseOptions::default()).unwrap_err();
        assert!(matches!(err, EnrollError::NoEmbeddings));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn single_embedding_is_normalized() {
        let out = fuse_embeddings(&[vec![3.0, 0.0, 4.0]], None, &FuseOptions::default()).unwrap();
        assert!((out[0] - 0.6).abs() < 1e-6);
        assert_eq!(out[1], 0.0);
        assert!((out[2] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn single_embedding_keeps_direction_at_any_scale() {
        for scale in [1e-3f32, 1.0, 250.0] {
            let e: Vec<f32> = (0..16).map(|i| (i as f32 - 7.5) * scale).collect();
            let out = fuse_embeddings(&[e.clone()], None, &FuseOptions::default()).unwrap();
            assert!((l2_norm(&out) - 1.0).abs() < 1e-5);
            assert!((cosine_similarity(&out, &e) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn outlier_is_excluded() {
        let a = vec![1.0, 0.0, 0.0, 0.0];
        let b = vec![0.99, 0.14, 0.0, 0.0];
        let outlier = vec![0.0, 0.0, 1.0, 0.0];
        let f = fuse(
            &[a.clone(), b.clone(), outlier.clone()],
            None,
            &FuseOptions::default(),
        )
        .unwrap();

        assert_eq!(f.kept, vec![0, 1]);
        assert_eq!(f.excluded.len(), 1);
        assert_eq!(f.excluded[0].0, 2);
        assert!(f.excluded[0].1 < 0.7);
        assert!(!f.fell_back);

        let to_a = cosine_similarity(&f.embedding, &a);
        let to_b = cosine_similarity(&f.embedding, &b);
        let to_outlier = cosine_similarity(&f.embedding, &outlier);
        assert!(to_a > 0.99 && to_b > 0.99);
        assert!(to_outlier.abs() < 1e-6);
    }

    #[test]
    fn all_excluded_falls_back_to_full_set() {
        let es = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        let f = fuse(&es, None, &opts(0.99)).unwrap();
        assert!(f.fell_back);
        assert_eq!(f.kept, vec![0, 1, 2]);
        assert_eq!(f.excluded.len(), 3);
        assert!((l2_norm(&f.embedding) - 1.0).abs() < 1e-5);
        let expected = 1.0 / 3.0f32.sqrt();
        for x in &f.embedding {
            assert!((x - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_threshold_disables_rejection() {
        let es = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.1]];
        let f = fuse(&es, None, &opts(0.0)).unwrap();
        assert_eq!(f.kept, vec![0, 1, 2]);
        assert!(f.excluded.is_empty());
    }

    #[test]
    fn weights_pull_toward_heavier_sample() {
        let es = vec![vec![1.0, 0.0], vec![0.8, 0.6]];
        let heavy_first = fuse_embeddings(&es, Some(&[0.9, 0.1][..]), &opts(0.0)).unwrap();
        let heavy_second = fuse_embeddings(&es, Some(&[0.1, 0.9][..]), &opts(0.0)).unwrap();
        assert!(cosine_similarity(&heavy_first, &es[0]) > cosine_similarity(&heavy_second, &es[0]));
        assert!(cosine_similarity(&heavy_second, &es[1]) > cosine_similarity(&heavy_first, &es[1]));
    }

    #[test]
    fn scale_differences_do_not_matter() {
        let es = vec![vec![100.0, 0.0], vec![0.0, 0.01]];
        let out = fuse_embeddings(&es, Some(&[1.0, 1.0][..]), &opts(0.0)).unwrap();
        assert!((out[0] - out[1]).abs() < 1e-6);
    }

    #[test]
    fn zero_weights_average_uniformly() {
        let es = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let uniform = fuse_embeddings(&es, None, &opts(0.0)).unwrap();
        let zeroed = fuse_embeddings(&es, Some(&[0.0, 0.0][..]), &opts(0.0)).unwrap();
        let bad = fuse_embeddings(&es, Some(&[f64::NAN, -1.0][..]), &opts(0.0)).unwrap();
        assert_eq!(uniform, zeroed);
        assert_eq!(uniform, bad);
    }

    #[test]
    fn excluded_weight_is_redistributed() {
        let es = vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.05, 0.0], vec![0.0, 0.0, 1.0]];
        let with_outlier_weight =
            fuse_embeddings(&es, Some(&[0.2, 0.2, 0.6][..]), &FuseOptions::default()).unwrap();
        let without = fuse_embeddings(&es[..2], Some(&[0.5, 0.5][..]), &opts(0.0)).unwrap();
        for (x, y) in with_outlier_weight.iter().zip(&without) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn precisions_agree() {
        let es: Vec<Vec<f32>> = (0..5)
            .map(|k| (0..64).map(|i| ((i * (k + 3)) % 17) as f32 - 8.0 + k as f32 * 0.1).collect())
            .collect();
        let w = [0.1, 0.3, 0.2, 0.25, 0.15];
        let single = fuse_embeddings(
            &es,
            Some(&w[..]),
            &FuseOptions {
                outlier_threshold: 0.0,
                precision: Precision::F32,
            },
        )
        .unwrap();
        let double = fuse_embeddings(
            &es,
            Some(&w[..]),
            &FuseOptions {
                outlier_threshold: 0.0,
                precision: Precision::F64,
            },
        )
        .unwrap();
        for (a, b) in single.iter().zip(&double) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let es = vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]];
        let err = fuse_embeddings(&es, None, &FuseOptions::default()).unwrap_err();
        assert!(matches!(err, EnrollError::DimensionMismatch { index: 1, expected: 2, got: 3 }));

        let es = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let err = fuse_embeddings(&es, Some(&[1.0][..]), &FuseOptions::default()).unwrap_err();
        assert!(matches!(err, EnrollError::WeightCountMismatch { embeddings: 2, weights: 1 }));
        assert!(err.is_invalid_input());
    }
}

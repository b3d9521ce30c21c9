//! External embedding providers
//!
//! The encoder depends on two capabilities: a text embedder for the font
//! description and an image embedder for screenshots. Both are async traits
//! so real backends (HTTP APIs, local models) can be plugged in. Errors are
//! surfaced as [`ProviderError`]; retry policy belongs to the caller.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use stylevec_core::{Error, ProviderError, Result};
use tracing::{debug, warn};

use crate::model::TypographyTokens;

/// Embeds a free-form text description into a fixed-size vector
#[async_trait]
pub trait FontEmbeddingProvider: Send + Sync {
    async fn embed_text(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError>;

    /// Declared output dimension
    fn dimension(&self) -> usize;

    /// Name used in logs and dimension errors
    fn name(&self) -> &str;
}

/// Embeds an encoded image (PNG/JPEG bytes) into a fixed-size vector
#[async_trait]
pub trait VisualEmbeddingProvider: Send + Sync {
    async fn embed_image(&self, image: &Bytes) -> std::result::Result<Vec<f32>, ProviderError>;

    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}

/// Check a provider's output against the expected dimension and reject
/// non-finite components
pub(crate) fn validate_embedding(provider: &str, embedding: &[f32], expected: usize) -> Result<()> {
    if embedding.len() != expected {
        warn!(
            provider,
            expected,
            actual = embedding.len(),
            "embedding provider returned a vector of the wrong size"
        );
        return Err(Error::EmbeddingDimension {
            provider: provider.to_string(),
            expected,
            actual: embedding.len(),
        });
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(ProviderError::MalformedResponse(format!(
            "{provider} returned non-finite embedding values"
        ))
        .into());
    }
    Ok(())
}

/// Fail fast when a provider declares a dimension other than `expected`
pub(crate) fn check_declared_dimension(provider: &str, declared: usize, expected: usize) -> Result<()> {
    if declared != expected {
        return Err(Error::EmbeddingDimension {
            provider: provider.to_string(),
            expected,
            actual: declared,
        });
    }
    Ok(())
}

/// Embed a screenshot and validate both the declared and the returned
/// dimension
pub async fn fetch_visual_embedding<P>(provider: &P, image: &Bytes, expected_dim: usize) -> Result<Vec<f32>>
where
    P: VisualEmbeddingProvider + ?Sized,
{
    check_declared_dimension(provider.name(), provider.dimension(), expected_dim)?;
    let embedding = provider.embed_image(image).await?;
    validate_embedding(provider.name(), &embedding, expected_dim)?;
    debug!(provider = provider.name(), bytes = image.len(), "fetched visual embedding");
    Ok(embedding)
}

fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value:.1}px")
    }
}

fn sorted_distinct(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite() && *x > 0.0).collect();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

/// Deterministic one-paragraph description of a typography system.
///
/// Families keep their declared order (the first is the primary face);
/// sizes and weights are sorted so token order does not leak in.
pub fn font_description(typography: &TypographyTokens) -> String {
    let families: Vec<&str> = typography
        .font_families
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();

    let mut parts = Vec::with_capacity(4);
    if families.is_empty() {
        parts.push("Font families: system default.".to_string());
    } else {
        parts.push(format!("Font families: {}.", families.join(", ")));
    }

    let sizes = sorted_distinct(&typography.font_sizes);
    if let (Some(min), Some(max)) = (sizes.first(), sizes.last()) {
        parts.push(format!(
            "Sizes {} to {} across {} steps.",
            format_px(*min),
            format_px(*max),
            sizes.len()
        ));
    }

    let weights = sorted_distinct(&typography.font_weights);
    if !weights.is_empty() {
        let listed: Vec<String> = weights.iter().map(|w| format!("{}", w.round() as i64)).collect();
        parts.push(format!("Weights {}.", listed.join(", ")));
    }

    let line_heights = sorted_distinct(&typography.line_heights);
    if !line_heights.is_empty() {
        let listed: Vec<String> = line_heights.iter().map(|l| format!("{l:.2}")).collect();
        parts.push(format!("Line heights {}.", listed.join(", ")));
    }

    parts.join(" ")
}

/// Offline text embedder hashing character trigrams and words into a fixed
/// number of buckets.
///
/// Deterministic and dependency free, so it backs the CLI and tests. It
/// captures lexical overlap only; production deployments plug in a semantic
/// model through [`FontEmbeddingProvider`].
#[derive(Debug, Clone)]
pub struct HashingTextEmbedder {
    dim: usize,
}

impl HashingTextEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        if self.dim == 0 {
            return vector;
        }
        let normalized = text.to_lowercase();

        let chars: Vec<char> = normalized.chars().collect();
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            vector[bucket(&trigram, self.dim)] += 1.0;
        }

        // Whole words weigh more than their trigrams
        for word in normalized.split_whitespace() {
            vector[bucket(word, self.dim)] += 2.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        vector
    }
}

fn bucket(token: &str, dim: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() % dim as u64) as usize
}

#[async_trait]
impl FontEmbeddingProvider for HashingTextEmbedder {
    async fn embed_text(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
        Ok(self.embed(text))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hashing-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedImageEmbedder {
        declared: usize,
        returned: usize,
    }

    #[async_trait]
    impl VisualEmbeddingProvider for FixedImageEmbedder {
        async fn embed_image(&self, _image: &Bytes) -> std::result::Result<Vec<f32>, ProviderError> {
            Ok(vec![0.1; self.returned])
        }

        fn dimension(&self) -> usize {
            self.declared
        }

        fn name(&self) -> &str {
            "fixed-image"
        }
    }

    struct FailingImageEmbedder;

    #[async_trait]
    impl VisualEmbeddingProvider for FailingImageEmbedder {
        async fn embed_image(&self, _image: &Bytes) -> std::result::Result<Vec<f32>, ProviderError> {
            Err(ProviderError::RateLimited { retry_after_secs: Some(30) })
        }

        fn dimension(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "failing-image"
        }
    }

    fn typography() -> TypographyTokens {
        TypographyTokens {
            font_families: vec!["Inter".into(), "Source Code Pro".into()],
            font_sizes: vec![48.0, 16.0, 14.0, 16.0],
            font_weights: vec![700.0, 400.0],
            line_heights: vec![1.5],
        }
    }

    #[test]
    fn test_font_description_is_stable() {
        let description = font_description(&typography());
        assert_eq!(
            description,
            "Font families: Inter, Source Code Pro. Sizes 14px to 48px across 3 steps. \
             Weights 400, 700. Line heights 1.50."
        );

        let mut shuffled = typography();
        shuffled.font_sizes.reverse();
        shuffled.font_weights.reverse();
        assert_eq!(font_description(&shuffled), description);
    }

    #[test]
    fn test_font_description_empty() {
        assert_eq!(
            font_description(&TypographyTokens::default()),
            "Font families: system default."
        );
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingTextEmbedder::new(64);
        let a = embedder.embed("Font families: Inter.");
        let b = embedder.embed("Font families: Inter.");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(embedder.embed("").iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_visual_embedding_dimension_checks() {
        let image = Bytes::from_static(b"\x89PNG");

        let ok = FixedImageEmbedder { declared: 8, returned: 8 };
        assert_eq!(fetch_visual_embedding(&ok, &image, 8).await.unwrap().len(), 8);

        let wrong_declared = FixedImageEmbedder { declared: 4, returned: 8 };
        let err = fetch_visual_embedding(&wrong_declared, &image, 8).await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingDimension { expected: 8, actual: 4, .. }));

        let wrong_returned = FixedImageEmbedder { declared: 8, returned: 5 };
        let err = fetch_visual_embedding(&wrong_returned, &image, 8).await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingDimension { expected: 8, actual: 5, .. }));
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let image = Bytes::from_static(b"\x89PNG");
        let err = fetch_visual_embedding(&FailingImageEmbedder, &image, 4).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::RateLimited { retry_after_secs: Some(30) })
        ));
    }

    #[test]
    fn test_rejects_non_finite_embedding() {
        let err = validate_embedding("p", &[0.0, f32::NAN], 2).unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::MalformedResponse(_))));
    }
}

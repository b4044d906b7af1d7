/// Sequential batching over an embedding provider
use super::{EmbeddingError, EmbeddingProvider};
use tracing::{debug, info};

/// Embed all texts in order, one request per chunk of `batch_size`
///
/// Batches are issued sequentially. The first failing batch aborts the run.
pub fn embed_in_batches<P: EmbeddingProvider + ?Sized>(
    provider: &P,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let start = std::time::Instant::now();
    let batch_size = batch_size.max(1);
    let total_batches = texts.len().div_ceil(batch_size);

    info!(
        "Embedding {} texts in {} batch(es) with model {}",
        texts.len(),
        total_batches,
        provider.model_name()
    );

    let mut vectors = Vec::with_capacity(texts.len());
    for (batch_no, chunk) in texts.chunks(batch_size).enumerate() {
        let embedded = provider.embed_batch(chunk)?;
        if embedded.len() != chunk.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: chunk.len(),
                actual: embedded.len(),
            });
        }
        debug!(
            "Batch {}/{}: {} vectors",
            batch_no + 1,
            total_batches,
            embedded.len()
        );
        vectors.extend(embedded);
    }

    info!(
        "Embedding complete: {} vectors, {}ms",
        vectors.len(),
        start.elapsed().as_millis()
    );

    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records batch sizes and embeds each text as [len, 1.0]
    struct RecordingProvider {
        batches: RefCell<Vec<usize>>,
    }

    impl EmbeddingProvider for RecordingProvider {
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.batches.borrow_mut().push(texts.len());
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    struct ShortProvider;

    impl EmbeddingProvider for ShortProvider {
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0]).collect())
        }

        fn model_name(&self) -> &str {
            "short"
        }
    }

    #[test]
    fn test_batches_preserve_order() {
        let provider = RecordingProvider {
            batches: RefCell::new(Vec::new()),
        };
        let texts: Vec<String> = (1..=5).map(|n| "x".repeat(n)).collect();

        let vectors = embed_in_batches(&provider, &texts, 2).unwrap();

        assert_eq!(*provider.batches.borrow(), vec![2, 2, 1]);
        let lens: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lens, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let provider = RecordingProvider {
            batches: RefCell::new(Vec::new()),
        };
        let texts = vec!["a".to_string(), "b".to_string()];

        embed_in_batches(&provider, &texts, 0).unwrap();
        assert_eq!(*provider.batches.borrow(), vec![1, 1]);
    }

    #[test]
    fn test_short_batch_is_rejected() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let err = embed_in_batches(&ShortProvider, &texts, 8).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }
}

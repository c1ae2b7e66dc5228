// src/filter/batch.rs
//! Order-preserving partition of the aggregated job list into the
//! fixed-size batches the filter client submits.

use tracing::warn;

/// Pure partition: batches come back in input order, every batch is full
/// except possibly the last one, and concatenating them reconstructs the
/// input exactly. An empty input yields one empty batch marker, which the
/// filter client short-circuits without an API call.
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    if items.is_empty() {
        warn!("No jobs found to process");
        return vec![&[]];
    }
    items.chunks(size.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_reconstruct_the_input() {
        let items: Vec<u32> = (0..10).collect();
        let batches = chunk(&items, 3);

        assert_eq!(batches.len(), 4);
        for batch in &batches[..batches.len() - 1] {
            assert_eq!(batch.len(), 3);
        }
        assert_eq!(batches.last().unwrap().len(), 1);

        let rebuilt: Vec<u32> = batches.concat();
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn test_exact_multiple_has_no_short_tail() {
        let items: Vec<u32> = (0..9).collect();
        let batches = chunk(&items, 3);
        assert!(batches.iter().all(|batch| batch.len() == 3));
    }

    #[test]
    fn test_empty_input_yields_one_empty_batch() {
        let items: Vec<u32> = Vec::new();
        let batches = chunk(&items, 3);
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let items = vec![1, 2, 3];
        let batches = chunk(&items, 0);
        assert_eq!(batches.len(), 3);
    }
}

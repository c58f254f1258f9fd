//! Order-preserving map that switches to rayon for large inputs.

use rayon::prelude::*;

use crate::config::ParallelConfig;

/// Map `f` over `items`, in parallel when the configuration allows it.
///
/// Output order always matches input order, so both paths give identical
/// results.
pub(crate) fn map_slice<T, R, F>(items: &[T], config: &ParallelConfig, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if config.should_parallelize(items.len()) {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_and_sequential_agree() {
        let items: Vec<u32> = (0..500).collect();
        let parallel = ParallelConfig {
            enabled: true,
            min_items_for_parallel: 1,
        };
        let sequential = ParallelConfig::sequential();

        assert_eq!(
            map_slice(&items, &parallel, |n| n * 2),
            map_slice(&items, &sequential, |n| n * 2)
        );
    }
}

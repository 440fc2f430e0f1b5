// src/range.rs

use crate::models::Range;

/// Bytes assigned to every worker but the last.
pub fn chunk_size(file_size: u64, worker_count: usize) -> u64 {
    if worker_count == 0 {
        return 0;
    }
    file_size / worker_count as u64
}

/// Range for one worker.
///
/// The last worker's `high` is `file_size` itself rather than
/// `file_size - 1`: it is the upper bound requested from the server, which
/// clamps it to the last byte of the resource.
pub fn compute_range(worker: usize, chunk_size: u64, worker_count: usize, file_size: u64) -> Range {
    let low = chunk_size * worker as u64;
    let high = if worker + 1 == worker_count {
        file_size
    } else {
        (low + chunk_size).saturating_sub(1)
    };
    Range::new(low, high, worker)
}

/// Splits `file_size` bytes into `worker_count` contiguous ranges, ordered by
/// worker index.
pub fn compute_ranges(file_size: u64, worker_count: usize) -> Vec<Range> {
    let chunk = chunk_size(file_size, worker_count);
    (0..worker_count)
        .map(|worker| compute_range(worker, chunk, worker_count, file_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(ranges: &[Range]) -> Vec<(u64, u64)> {
        ranges.iter().map(|r| (r.low(), r.high())).collect()
    }

    #[test]
    fn four_workers_over_a_thousand_bytes() {
        let ranges = compute_ranges(1000, 4);
        assert_eq!(chunk_size(1000, 4), 250);
        assert_eq!(
            bounds(&ranges),
            vec![(0, 249), (250, 499), (500, 749), (750, 1000)]
        );
        let workers: Vec<usize> = ranges.iter().map(Range::worker).collect();
        assert_eq!(workers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn ranges_cover_the_file_without_gaps_or_overlap() {
        for file_size in [1u64, 2, 7, 100, 1001, 4096, 65_537] {
            for workers in 1..=16usize {
                if workers as u64 > file_size {
                    continue;
                }
                let ranges = compute_ranges(file_size, workers);
                assert_eq!(ranges.len(), workers);
                assert_eq!(ranges[0].low(), 0);
                for pair in ranges.windows(2) {
                    assert_eq!(
                        pair[0].high() + 1,
                        pair[1].low(),
                        "gap or overlap at size={file_size} workers={workers}"
                    );
                }
                assert_eq!(ranges[workers - 1].high(), file_size);
            }
        }
    }

    #[test]
    fn remainder_goes_to_the_last_worker() {
        let ranges = compute_ranges(10, 3);
        assert_eq!(bounds(&ranges), vec![(0, 2), (3, 5), (6, 10)]);
    }

    #[test]
    fn single_worker_takes_everything() {
        assert_eq!(bounds(&compute_ranges(42, 1)), vec![(0, 42)]);
    }

    #[test]
    fn zero_workers_yields_no_ranges() {
        assert!(compute_ranges(42, 0).is_empty());
    }
}

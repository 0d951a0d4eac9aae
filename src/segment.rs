/// One contiguous byte range of the resource, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Partitions `[0, total_size - 1]` into contiguous segments, one per worker.
///
/// Segments share `total_size / worker_count` bytes each and the last one
/// absorbs the remainder. When the resource is smaller than the worker count
/// the plan emits one single-byte segment per available byte instead of
/// empty ranges, so every returned segment owns at least one byte and the
/// union of all segments covers the resource exactly once.
///
/// A zero `total_size` yields an empty plan; callers treat that as "nothing
/// to split" and fetch unsegmented.
pub fn plan_segments(total_size: u64, worker_count: u64) -> Vec<Segment> {
    if total_size == 0 || worker_count == 0 {
        return Vec::new();
    }
    let segment_count = worker_count.min(total_size);
    let base_length = total_size / segment_count;
    let mut segments = Vec::with_capacity(segment_count as usize);
    for index in 0..segment_count {
        let start = index * base_length;
        let end = match index == segment_count - 1 {
            true => total_size - 1,
            false => start + base_length - 1,
        };
        segments.push(Segment {
            index: index as usize,
            start,
            end,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_full_coverage(segments: &[Segment], total_size: u64) {
        let length_sum: u64 = segments.iter().map(Segment::length).sum();
        assert_eq!(length_sum, total_size);
        let mut expected_start = 0;
        for segment in segments {
            assert_eq!(segment.start, expected_start);
            assert!(segment.end >= segment.start);
            expected_start = segment.end + 1;
        }
        assert_eq!(expected_start, total_size);
    }

    #[test]
    fn splits_a_million_bytes_across_four_workers() {
        let segments = plan_segments(1_000_000, 4);
        let bounds: Vec<(u64, u64)> = segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(
            bounds,
            vec![
                (0, 249_999),
                (250_000, 499_999),
                (500_000, 749_999),
                (750_000, 999_999),
            ]
        );
        assert_full_coverage(&segments, 1_000_000);
    }

    #[test]
    fn last_segment_absorbs_the_remainder() {
        let segments = plan_segments(100, 3);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].length(), 33);
        assert_eq!(segments[1].length(), 33);
        assert_eq!(segments[2].length(), 34);
        assert_full_coverage(&segments, 100);
    }

    #[test]
    fn covers_awkward_sizes_exactly_once() {
        for total_size in [1, 2, 7, 99, 100, 101, 4096, 65_537] {
            for worker_count in 1..=9 {
                let segments = plan_segments(total_size, worker_count);
                assert_full_coverage(&segments, total_size);
            }
        }
    }

    #[test]
    fn one_worker_takes_the_full_range() {
        let segments = plan_segments(5000, 1);
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start, segments[0].end), (0, 4999));
    }

    #[test]
    fn tiny_resources_get_one_byte_segments() {
        let segments = plan_segments(3, 8);
        assert_eq!(segments.len(), 3);
        for segment in &segments {
            assert_eq!(segment.length(), 1);
        }
        assert_full_coverage(&segments, 3);
    }

    #[test]
    fn empty_resource_yields_no_segments() {
        assert!(plan_segments(0, 4).is_empty());
    }
}

use crate::common::*;

/// Split `0..total` into consecutive ranges of `chunk_size` indices.
///
/// The last range holds the remainder `total % chunk_size` if it is
/// nonzero. An empty index set yields no ranges.
pub fn partition_ranges(total: usize, chunk_size: usize) -> Result<Vec<Range<usize>>> {
    let chunk_size =
        NonZeroUsize::new(chunk_size).ok_or_else(|| format_err!("chunk size must be positive"))?;
    Ok(PartitionIter::new(total, chunk_size).collect())
}

/// Lazy form of [partition_ranges].
#[derive(Debug, Clone)]
pub struct PartitionIter {
    start: usize,
    total: usize,
    chunk_size: NonZeroUsize,
}

impl PartitionIter {
    pub fn new(total: usize, chunk_size: NonZeroUsize) -> Self {
        Self {
            start: 0,
            total,
            chunk_size,
        }
    }
}

impl Iterator for PartitionIter {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.total {
            return None;
        }

        let end = self
            .start
            .saturating_add(self.chunk_size.get())
            .min(self.total);
        let range = self.start..end;
        self.start = end;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.start.min(self.total);
        let chunk_size = self.chunk_size.get();
        let count = remaining / chunk_size + usize::from(remaining % chunk_size != 0);
        (count, Some(count))
    }
}

impl ExactSizeIterator for PartitionIter {}

/// Check that `ranges` tile `0..total` in order without gaps or overlaps.
pub fn check_contiguous(ranges: &[Range<usize>], total: usize) -> Result<()> {
    let mut expect_start = 0;

    for range in ranges {
        ensure!(
            range.start == expect_start,
            "range {:?} does not start at {}",
            range,
            expect_start
        );
        ensure!(range.end >= range.start, "range {:?} is reversed", range);
        expect_start = range.end;
    }

    ensure!(
        expect_start == total,
        "ranges cover 0..{}, but expect 0..{}",
        expect_start,
        total
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_example() {
        let ranges = partition_ranges(2500, 1000).unwrap();
        assert_eq!(ranges, vec![0..1000, 1000..2000, 2000..2500]);
    }

    #[test]
    fn partition_cover() {
        for total in 0..60 {
            for chunk_size in 1..13 {
                let ranges = partition_ranges(total, chunk_size).unwrap();
                check_contiguous(&ranges, total).unwrap();

                let count = PartitionIter::new(total, NonZeroUsize::new(chunk_size).unwrap()).len();
                assert_eq!(count, ranges.len());

                if let Some((last, init)) = ranges.split_last() {
                    assert!(init.iter().all(|range| range.len() == chunk_size));
                    let rem = total % chunk_size;
                    let expect = if rem == 0 { chunk_size } else { rem };
                    assert_eq!(last.len(), expect);
                } else {
                    assert_eq!(total, 0);
                }
            }
        }
    }

    #[test]
    fn partition_zero_chunk_size() {
        assert!(partition_ranges(10, 0).is_err());
    }

    #[test]
    fn contiguity_violations() {
        assert!(check_contiguous(&[0..5, 6..10], 10).is_err());
        assert!(check_contiguous(&[0..5, 4..10], 10).is_err());
        assert!(check_contiguous(&[0..5], 10).is_err());
        assert!(check_contiguous(&[], 0).is_ok());
    }
}

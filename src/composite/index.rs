//! Logical to local page mapping.

use serde::Serialize;

use crate::error::IndexError;

/// Contiguous run of logical pages owned by one constituent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    /// Constituent index in manifest order
    pub constituent: usize,
    /// First logical page of the run (1-indexed)
    pub start: u32,
    /// Number of pages, possibly zero
    pub count: u32,
}

impl PageRange {
    /// One past the last logical page of the run.
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    /// Check if a logical page falls inside this run.
    pub fn contains(&self, logical: u32) -> bool {
        logical >= self.start && logical < self.end()
    }
}

/// Page table of a composite document.
///
/// Built once from per-constituent page counts. Ranges are contiguous, in
/// constituent order, and together cover `[1, total_page_count]`.
/// Constituents with zero pages keep an empty range so constituent indices
/// stay aligned with the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageIndex {
    ranges: Vec<PageRange>,
    total: u32,
}

impl PageIndex {
    /// Largest logical page number a table can hold.
    pub const MAX_PAGES: u32 = u32::MAX - 1;

    /// Build the table from page counts in constituent order.
    ///
    /// Fails with [`IndexError::TooManyPages`] naming the first constituent
    /// whose pages would run past [`MAX_PAGES`](Self::MAX_PAGES).
    pub fn build(counts: &[u32]) -> Result<Self, IndexError> {
        let mut ranges = Vec::with_capacity(counts.len());
        let mut next = 1u32;
        for (constituent, &count) in counts.iter().enumerate() {
            ranges.push(PageRange {
                constituent,
                start: next,
                count,
            });
            next = next
                .checked_add(count)
                .ok_or(IndexError::TooManyPages {
                    constituent,
                    max: Self::MAX_PAGES,
                })?;
        }
        Ok(Self {
            ranges,
            total: next - 1,
        })
    }

    /// Map a logical page to `(constituent, local page)`.
    ///
    /// # Example
    ///
    /// ```
    /// use vbkm::composite::PageIndex;
    ///
    /// let index = PageIndex::build(&[3, 0, 2])?;
    /// assert_eq!(index.resolve(4).unwrap(), (2, 1));
    /// assert!(index.resolve(6).is_err());
    /// # Ok::<(), vbkm::error::IndexError>(())
    /// ```
    pub fn resolve(&self, logical: u32) -> Result<(usize, u32), IndexError> {
        if logical == 0 || logical > self.total {
            return Err(IndexError::OutOfRange {
                page: logical,
                total: self.total,
            });
        }
        // First range whose end lies past the page; empty ranges are skipped
        // because their end equals their start.
        let pos = self.ranges.partition_point(|r| r.end() <= logical);
        let range = &self.ranges[pos];
        Ok((range.constituent, logical - range.start + 1))
    }

    /// Map a constituent's local page back to its logical page.
    pub fn to_logical(&self, constituent: usize, local: u32) -> Option<u32> {
        let range = self.ranges.get(constituent)?;
        (local >= 1 && local <= range.count).then(|| range.start + local - 1)
    }

    /// `(start, count)` of a constituent's range.
    pub fn range_of(&self, constituent: usize) -> Option<(u32, u32)> {
        self.ranges.get(constituent).map(|r| (r.start, r.count))
    }

    /// Total logical page count.
    pub fn total_page_count(&self) -> u32 {
        self.total
    }

    /// Number of constituents, including empty ones.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the table has no constituents.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// All ranges in constituent order.
    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_empty_constituent() {
        let index = PageIndex::build(&[3, 0, 2]).unwrap();
        assert_eq!(index.total_page_count(), 5);
        assert_eq!(index.resolve(1).unwrap(), (0, 1));
        assert_eq!(index.resolve(3).unwrap(), (0, 3));
        assert_eq!(index.resolve(4).unwrap(), (2, 1));
        assert_eq!(index.resolve(5).unwrap(), (2, 2));
        assert_eq!(
            index.resolve(0),
            Err(IndexError::OutOfRange { page: 0, total: 5 })
        );
        assert_eq!(
            index.resolve(6),
            Err(IndexError::OutOfRange { page: 6, total: 5 })
        );
    }

    #[test]
    fn test_single_constituent_is_identity() {
        let index = PageIndex::build(&[7]).unwrap();
        for page in 1..=7 {
            assert_eq!(index.resolve(page).unwrap(), (0, page));
            assert_eq!(index.to_logical(0, page), Some(page));
        }
    }

    #[test]
    fn test_leading_empty_constituents() {
        let index = PageIndex::build(&[0, 0, 4]).unwrap();
        assert_eq!(index.resolve(1).unwrap(), (2, 1));
        assert_eq!(index.range_of(1), Some((1, 0)));
        assert_eq!(index.range_of(2), Some((1, 4)));
    }

    #[test]
    fn test_to_logical() {
        let index = PageIndex::build(&[9, 5]).unwrap();
        assert_eq!(index.to_logical(1, 2), Some(11));
        assert_eq!(index.to_logical(1, 0), None);
        assert_eq!(index.to_logical(1, 6), None);
        assert_eq!(index.to_logical(2, 1), None);
    }

    #[test]
    fn test_ranges_cover_all_pages() {
        let counts = [4, 1, 0, 12, 3];
        let index = PageIndex::build(&counts).unwrap();
        for page in 1..=index.total_page_count() {
            let (constituent, local) = index.resolve(page).unwrap();
            assert!(local >= 1 && local <= counts[constituent]);
            assert_eq!(index.to_logical(constituent, local), Some(page));
        }
        assert!(index
            .ranges()
            .windows(2)
            .all(|w| w[0].end() == w[1].start));
    }

    #[test]
    fn test_page_total_overflow() {
        assert_eq!(
            PageIndex::build(&[u32::MAX, 1]),
            Err(IndexError::TooManyPages {
                constituent: 0,
                max: PageIndex::MAX_PAGES
            })
        );
        assert_eq!(
            PageIndex::build(&[5, PageIndex::MAX_PAGES - 5, 1]),
            Err(IndexError::TooManyPages {
                constituent: 2,
                max: PageIndex::MAX_PAGES
            })
        );

        let index = PageIndex::build(&[1, PageIndex::MAX_PAGES - 1]).unwrap();
        assert_eq!(index.total_page_count(), PageIndex::MAX_PAGES);
        assert_eq!(
            index.resolve(PageIndex::MAX_PAGES).unwrap(),
            (1, PageIndex::MAX_PAGES - 1)
        );
        assert_eq!(index.ranges()[1].end(), u32::MAX);
    }

    #[test]
    fn test_empty_index() {
        let index = PageIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.total_page_count(), 0);
        assert!(index.resolve(1).is_err());
    }
}

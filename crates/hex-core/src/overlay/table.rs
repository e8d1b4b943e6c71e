use std::ops::AddAssign;

use crate::overlay::run::{EditRun, OverlaySlice};

#[derive(Debug, Default)]
pub struct EditOverlay {
    /// Run start offset -> run bytes. Normalized: no two runs overlap or abut.
    runs: std::collections::BTreeMap<u64, Vec<u8>>,
    /// Logical file length; writes must stay inside it.
    file_len: u64,
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl EditOverlay {
    #[must_use]
    pub fn new(file_len: u64) -> Self {
        Self {
            runs: std::collections::BTreeMap::new(),
            file_len,
        }
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl EditOverlay {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    #[inline]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    #[inline]
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Total number of overridden bytes.
    pub fn dirty_bytes(&self) -> u64 {
        self.runs.values().map(|bytes| bytes.len() as u64).sum()
    }

    /// Runs in offset order.
    pub fn runs(&self) -> impl Iterator<Item = OverlaySlice<'_>> + '_ {
        self.runs.iter().map(|(&offset, bytes)| OverlaySlice {
            offset,
            bytes: bytes.as_slice(),
        })
    }

    /// Owned copy of the run set, for inspection and tests.
    pub fn to_runs(&self) -> Vec<EditRun> {
        self.runs
            .iter()
            .map(|(&start, bytes)| EditRun {
                start,
                bytes: bytes.clone(),
            })
            .collect()
    }
}

/*

===========================
========= WRITING =========
===========================

*/

impl EditOverlay {
    /// Records `bytes` at `offset`, merging with every run it overlaps or
    /// touches. New bytes win where they overlap older ones.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Range`] if the write runs past the file end.
    ///   The run set is untouched in that case.
    pub fn write(&mut self, offset: u64, bytes: &[u8]) -> crate::errors::HexResult<()> {
        let len = bytes.len() as u64;

        crate::errors::check_range(offset, len, self.file_len)?;

        if bytes.is_empty() {
            return Ok(());
        }

        let end = offset + len;
        // Runs are disjoint and sorted, so their ends grow with their starts:
        // walking back from the last run starting at or before `end` stops at
        // the first one that ends before `offset`.
        let absorbed: Vec<u64> = self
            .runs
            .range(..=end)
            .rev()
            .take_while(|(start, run)| **start + run.len() as u64 >= offset)
            .map(|(start, _)| *start)
            .collect();

        let merged_start = absorbed.last().map_or(offset, |first| (*first).min(offset));
        let mut merged_end = end;
        let mut parts = Vec::with_capacity(absorbed.len());

        for start in absorbed.iter().rev() {
            if let Some(run) = self.runs.remove(start) {
                merged_end = merged_end.max(start + run.len() as u64);
                parts.push((*start, run));
            }
        }

        let mut merged = if parts.len() == 1 && parts[0].0 == merged_start {
            // Common case: growing or patching one run in place.
            let mut only = parts.pop().map(|(_, run)| run).unwrap_or_default();
            only.resize(to_usize(merged_end - merged_start)?, 0);
            only
        } else {
            let mut buf = vec![0u8; to_usize(merged_end - merged_start)?];

            for (start, run) in &parts {
                let at = to_usize(start - merged_start)?;
                buf[at..at + run.len()].copy_from_slice(run);
            }

            buf
        };

        let at = to_usize(offset - merged_start)?;
        merged[at..at + bytes.len()].copy_from_slice(bytes);

        self.runs.insert(merged_start, merged);

        Ok(())
    }

    /// Removes overlay coverage for `offset..offset + length`, trimming or
    /// splitting runs that straddle the edges.
    pub fn clear(&mut self, offset: u64, length: u64) {
        if length == 0 || self.runs.is_empty() {
            return;
        }

        let end = offset.saturating_add(length);
        let touched: Vec<u64> = self
            .runs
            .range(..end)
            .rev()
            .take_while(|(start, run)| **start + run.len() as u64 > offset)
            .map(|(start, _)| *start)
            .collect();

        for start in touched {
            let Some(mut run) = self.runs.remove(&start) else {
                continue;
            };
            let run_end = start + run.len() as u64;

            if run_end > end {
                // `end - start` fits: it is bounded by the run length
                let tail = run.split_off((end - start) as usize);
                self.runs.insert(end, tail);
            }

            if start < offset {
                run.truncate((offset - start) as usize);
                self.runs.insert(start, run);
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.runs.clear();
    }
}

/*

===========================
========= READING =========
===========================

*/

impl EditOverlay {
    /// Overridden sub-ranges of `offset..offset + length`, in offset order,
    /// each clipped to the request.
    pub fn read(&self, offset: u64, length: u64) -> Vec<OverlaySlice<'_>> {
        let mut slices = Vec::new();

        if length == 0 {
            return slices;
        }

        let end = offset.saturating_add(length);
        let first = self
            .runs
            .range(..=offset)
            .next_back()
            .map_or(offset, |(start, _)| *start);

        for (&start, run) in self.runs.range(first..end) {
            let run_end = start + run.len() as u64;

            if run_end <= offset {
                continue;
            }

            let lo = start.max(offset);
            let hi = run_end.min(end);

            slices.push(OverlaySlice {
                offset: lo,
                bytes: &run[(lo - start) as usize..(hi - start) as usize],
            });
        }

        slices
    }

    /// Copies overridden bytes over `out`, which holds the backing bytes for
    /// `offset..offset + out.len()`.
    pub fn apply(&self, offset: u64, out: &mut [u8]) {
        for slice in self.read(offset, out.len() as u64) {
            let at = (slice.offset - offset) as usize;
            out[at..at + slice.bytes.len()].copy_from_slice(slice.bytes);
        }
    }

    /// Number of overridden bytes inside `offset..offset + length`.
    pub fn covered(&self, offset: u64, length: u64) -> u64 {
        let mut total = 0u64;

        for slice in self.read(offset, length) {
            total.add_assign(slice.bytes.len() as u64);
        }

        total
    }
}

#[inline]
fn to_usize(value: u64) -> Result<usize, crate::enums::MathError> {
    Ok(<u64 as TryInto<usize>>::try_into(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(start: u64, bytes: &[u8]) -> EditRun {
        EditRun {
            start,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn disjoint_writes_stay_separate() {
        let mut overlay = EditOverlay::new(100);

        overlay.write(10, b"ab").unwrap();
        overlay.write(20, b"cd").unwrap();

        assert_eq!(overlay.to_runs(), vec![run(10, b"ab"), run(20, b"cd")]);
        assert_eq!(overlay.dirty_bytes(), 4);
    }

    #[test]
    fn abutting_writes_merge() {
        let mut overlay = EditOverlay::new(100);

        overlay.write(10, b"ab").unwrap();
        overlay.write(12, b"cd").unwrap();
        overlay.write(8, b"xy").unwrap();

        assert_eq!(overlay.to_runs(), vec![run(8, b"xyabcd")]);
    }

    #[test]
    fn overlapping_write_takes_new_bytes() {
        let mut overlay = EditOverlay::new(100);

        overlay.write(10, b"aaaa").unwrap();
        overlay.write(20, b"bbbb").unwrap();
        overlay.write(12, b"XXXXXXXXXX").unwrap();

        assert_eq!(overlay.to_runs(), vec![run(10, b"aaXXXXXXXXXXbb")]);
    }

    #[test]
    fn write_inside_existing_run() {
        let mut overlay = EditOverlay::new(100);

        overlay.write(10, b"abcdef").unwrap();
        overlay.write(12, b"Z").unwrap();

        assert_eq!(overlay.to_runs(), vec![run(10, b"abZdef")]);
    }

    #[test]
    fn write_past_end_is_rejected_without_mutation() {
        let mut overlay = EditOverlay::new(10);

        overlay.write(0, b"a").unwrap();

        assert!(matches!(
            overlay.write(9, b"xy"),
            Err(crate::errors::HexError::Range { .. })
        ));
        assert_eq!(overlay.to_runs(), vec![run(0, b"a")]);
        overlay.write(9, b"z").unwrap();
        assert_eq!(overlay.run_count(), 2);
    }

    #[test]
    fn read_reports_clipped_slices() {
        let mut overlay = EditOverlay::new(100);

        overlay.write(5, b"abcde").unwrap();
        overlay.write(20, b"xyz").unwrap();

        let slices = overlay.read(7, 15);

        assert_eq!(
            slices,
            vec![
                OverlaySlice {
                    offset: 7,
                    bytes: b"cde"
                },
                OverlaySlice {
                    offset: 20,
                    bytes: b"xy"
                },
            ]
        );
        assert!(overlay.read(10, 10).is_empty());
        assert_eq!(overlay.covered(0, 100), 8);
    }

    #[test]
    fn apply_overlays_backing_bytes() {
        let mut overlay = EditOverlay::new(10);
        let mut out = *b"0123456789";

        overlay.write(2, b"AB").unwrap();
        overlay.write(9, b"Z").unwrap();
        overlay.apply(0, &mut out);

        assert_eq!(&out, b"01AB45678Z");
    }

    #[test]
    fn clear_splits_runs() {
        let mut overlay = EditOverlay::new(100);

        overlay.write(10, b"abcdefghij").unwrap();
        overlay.clear(13, 3);

        assert_eq!(overlay.to_runs(), vec![run(10, b"abc"), run(16, b"ghij")]);

        overlay.clear(0, 100);
        assert!(overlay.is_empty());
    }

    #[test]
    fn clear_trims_edges() {
        let mut overlay = EditOverlay::new(100);

        overlay.write(10, b"abcd").unwrap();
        overlay.write(20, b"efgh").unwrap();
        overlay.clear(12, 10);

        assert_eq!(overlay.to_runs(), vec![run(10, b"ab"), run(22, b"gh")]);
    }

    proptest! {
        #[test]
        fn runs_stay_normalized(
            writes in prop::collection::vec(
                (0u64..200, prop::collection::vec(any::<u8>(), 1..16)),
                1..40,
            )
        ) {
            let mut overlay = EditOverlay::new(256);
            let mut model = vec![None::<u8>; 256];

            for (offset, bytes) in &writes {
                overlay.write(*offset, bytes).unwrap();
                for (i, b) in bytes.iter().enumerate() {
                    model[*offset as usize + i] = Some(*b);
                }
            }

            let runs = overlay.to_runs();

            prop_assert!(runs.len() <= writes.len());
            for pair in runs.windows(2) {
                // strictly separated: overlapping or abutting runs would have merged
                prop_assert!(pair[0].end() < pair[1].start);
            }
            for r in &runs {
                prop_assert!(!r.is_empty());
            }

            let mut seen = vec![None::<u8>; 256];
            for r in &runs {
                for (i, b) in r.bytes.iter().enumerate() {
                    seen[r.start as usize + i] = Some(*b);
                }
            }
            prop_assert_eq!(seen, model);
        }
    }
}

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::errors::{HexError, HexResult};

/// Session bookmarks into the logical address space.
///
/// Three independent kinds:
/// - named marks, a name -> offset mapping overwritten on re-set;
/// - the jump history, unnamed marks most-recent-first with bounded length;
/// - toggled bookmarks, an ordered set walked with next/previous.
///
/// Offsets are absolute and do not follow content.
#[derive(Debug)]
pub struct MarkTable {
    named: BTreeMap<String, u64>,
    jumps: VecDeque<u64>,
    jump_capacity: usize,
    bookmarks: BTreeSet<u64>,
    file_len: u64,
}

impl MarkTable {
    #[must_use]
    pub fn new(file_len: u64, jump_capacity: usize) -> Self {
        Self {
            named: BTreeMap::new(),
            jumps: VecDeque::with_capacity(jump_capacity.min(1024)),
            jump_capacity: jump_capacity.max(1),
            bookmarks: BTreeSet::new(),
            file_len,
        }
    }

    #[inline]
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    fn check(&self, offset: u64) -> HexResult<()> {
        if offset < self.file_len {
            Ok(())
        } else {
            Err(HexError::range(offset, 1, self.file_len))
        }
    }

    /// With a name, sets or moves that named mark. Without one, pushes
    /// `offset` onto the jump history, dropping the oldest entry when full.
    ///
    /// # Errors
    ///
    /// - [`HexError::Range`] if `offset` is not inside the file.
    /// - [`HexError::Argument`] if `name` is empty.
    pub fn set_mark(&mut self, offset: u64, name: Option<&str>) -> HexResult<()> {
        self.check(offset)?;

        match name {
            Some("") => Err(HexError::Argument("mark name is empty".into())),
            Some(name) => {
                self.named.insert(name.to_owned(), offset);
                Ok(())
            }
            None => {
                if self.jumps.len() == self.jump_capacity {
                    self.jumps.pop_back();
                }
                self.jumps.push_front(offset);
                Ok(())
            }
        }
    }

    #[inline]
    pub fn get_mark(&self, name: &str) -> Option<u64> {
        self.named.get(name).copied()
    }

    pub fn remove(&mut self, name: &str) -> Option<u64> {
        self.named.remove(name)
    }

    /// Named marks in name order.
    pub fn named(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.named.iter().map(|(name, offset)| (name.as_str(), *offset))
    }

    /// Unnamed marks, most recent first.
    pub fn jump_history(&self) -> Vec<u64> {
        self.jumps.iter().copied().collect()
    }

    /// Removes and returns the most recent unnamed mark.
    pub fn pop_jump(&mut self) -> Option<u64> {
        self.jumps.pop_front()
    }

    /// Flips the bookmark at `offset`; returns whether it is now set.
    ///
    /// # Errors
    ///
    /// - [`HexError::Range`] if `offset` is not inside the file.
    pub fn toggle(&mut self, offset: u64) -> HexResult<bool> {
        self.check(offset)?;

        if self.bookmarks.remove(&offset) {
            Ok(false)
        } else {
            self.bookmarks.insert(offset);
            Ok(true)
        }
    }

    #[inline]
    pub fn is_bookmarked(&self, offset: u64) -> bool {
        self.bookmarks.contains(&offset)
    }

    /// First bookmark after `offset`, wrapping to the lowest.
    pub fn next_after(&self, offset: u64) -> Option<u64> {
        self.bookmarks
            .range(offset.saturating_add(1)..)
            .next()
            .or_else(|| self.bookmarks.first())
            .copied()
    }

    /// Last bookmark before `offset`, wrapping to the highest.
    pub fn prev_before(&self, offset: u64) -> Option<u64> {
        self.bookmarks
            .range(..offset)
            .next_back()
            .or_else(|| self.bookmarks.last())
            .copied()
    }

    /// Bookmarks inside `range`, for highlighting a visible window.
    pub fn bookmarks_in(&self, range: std::ops::Range<u64>) -> impl Iterator<Item = u64> + '_ {
        self.bookmarks.range(range).copied()
    }

    pub fn clear(&mut self) {
        self.named.clear();
        self.jumps.clear();
        self.bookmarks.clear();
    }
}

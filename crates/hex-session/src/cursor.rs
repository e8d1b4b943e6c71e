/// Byte cursor with an anchor/head selection model.
///
/// `head` is where edits and decodes happen. When `anchor` is set the
/// selection spans both ends inclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub head: u64,
    pub anchor: Option<u64>,
}

impl Cursor {
    #[must_use]
    pub fn new(head: u64) -> Self {
        Self { head, anchor: None }
    }

    #[inline]
    #[must_use]
    pub fn no_selection(&self) -> bool {
        self.anchor.is_none()
    }

    /// Inclusive `(start, end)` of the selection, or `None` without one.
    #[inline]
    #[must_use]
    pub fn selection(&self) -> Option<(u64, u64)> {
        self.anchor
            .map(|anchor| (anchor.min(self.head), anchor.max(self.head)))
    }

    /// Moves the head, keeping any anchor.
    pub fn set_head(&mut self, head: u64) {
        self.head = head;
    }

    pub fn set_anchor(&mut self, anchor: Option<u64>) {
        self.anchor = anchor;
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Pulls both ends back inside a file of `len` bytes.
    pub fn clamp(&mut self, len: u64) {
        self.head = clamp_offset(self.head, len);
        self.anchor = self.anchor.map(|anchor| clamp_offset(anchor, len));
    }
}

/// Clamps `offset` to `[0, len - 1]`, or 0 for an empty file.
#[inline]
#[must_use]
pub fn clamp_offset(offset: u64, len: u64) -> u64 {
    offset.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_normalized() {
        let mut cursor = Cursor::new(10);
        assert!(cursor.no_selection());
        assert_eq!(cursor.selection(), None);

        cursor.set_anchor(Some(20));
        assert_eq!(cursor.selection(), Some((10, 20)));

        cursor.set_head(30);
        assert_eq!(cursor.selection(), Some((20, 30)));

        cursor.clear_selection();
        assert_eq!(cursor.selection(), None);
    }

    #[test]
    fn clamp_keeps_offsets_inside() {
        let mut cursor = Cursor {
            head: 50,
            anchor: Some(70),
        };
        cursor.clamp(40);
        assert_eq!(cursor.head, 39);
        assert_eq!(cursor.anchor, Some(39));

        assert_eq!(clamp_offset(5, 0), 0);
        assert_eq!(clamp_offset(u64::MAX, 1), 0);
    }
}

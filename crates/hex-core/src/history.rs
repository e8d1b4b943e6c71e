/// One overwrite, with enough information to reverse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    pub offset: u64,
    pub previous: Vec<u8>,
    pub new: Vec<u8>,
}

impl UndoEntry {
    #[inline]
    pub fn len(&self) -> u64 {
        self.new.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.new.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct History {
    pub undo_stack: Vec<UndoEntry>,
    pub redo_stack: Vec<UndoEntry>,
}

impl History {
    /// Records a fresh overwrite. Any new action invalidates the redo stack.
    pub fn record(&mut self, entry: UndoEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);
    }

    pub fn undo(&mut self) -> Option<UndoEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry.clone());
        Some(entry)
    }

    pub fn redo(&mut self) -> Option<UndoEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry.clone());
        Some(entry)
    }

    /// Puts back an entry popped by [`History::undo`] whose replay failed.
    pub(crate) fn revert_undo(&mut self) {
        if let Some(entry) = self.redo_stack.pop() {
            self.undo_stack.push(entry);
        }
    }

    /// Puts back an entry popped by [`History::redo`] whose replay failed.
    pub(crate) fn revert_redo(&mut self) {
        if let Some(entry) = self.undo_stack.pop() {
            self.redo_stack.push(entry);
        }
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

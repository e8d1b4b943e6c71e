/// A contiguous range of overridden bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditRun {
    pub start: u64,
    pub bytes: Vec<u8>,
}

impl EditRun {
    #[inline]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.start + self.len()
    }
}

/// Overridden bytes clipped to a read request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlaySlice<'a> {
    pub offset: u64,
    pub bytes: &'a [u8],
}

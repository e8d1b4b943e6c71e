/// Positioned, read-only access to a file of fixed length.
///
/// Implementations take `&self` for reads so a single handle can serve
/// every page load without seeking state leaking between callers.
pub trait ReadAt: std::fmt::Debug {
    /// File length in bytes, captured when the handle was opened.
    fn len(&self) -> u64;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fills `buf` with the bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// - `std::io::ErrorKind::UnexpectedEof` if the range runs past the end of
    ///   the file (including a file truncated behind our back).
    /// - Any error reported by the operating system for the read.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()>;

    /// Path the handle was opened from.
    fn path(&self) -> &std::path::Path;
}

pub(crate) fn eof(offset: u64, len: usize) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("read of {len} bytes at offset {offset} runs past end of file"),
    )
}

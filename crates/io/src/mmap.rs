#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: memmap2::Mmap,
    path: std::path::PathBuf,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;

        // SAFETY:
        // - File is opened read-only
        // - We keep the file handle alive in struct
        // - Callers only get copies of the mapped bytes through `ReadAt`
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        Ok(Self {
            _file: file,
            mmap,
            path: path_buf,
        })
    }

    /// STRICT: Gets an exact slice of bytes.
    /// Returns `None` if the requested range goes out of bounds or overflows.
    #[inline]
    #[must_use]
    pub fn get_bytes_exact(&self, start: usize, length: usize) -> Option<&[u8]> {
        let end = start.checked_add(length)?;

        self.mmap.get(start..end)
    }
}

impl crate::read_at::ReadAt for MmapFile {
    #[inline]
    fn len(&self) -> u64 {
        // usize -> u64 never truncates on supported targets
        self.mmap.len() as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        let start = <u64 as TryInto<usize>>::try_into(offset)
            .map_err(|_| crate::read_at::eof(offset, buf.len()))?;
        let src = self
            .get_bytes_exact(start, buf.len())
            .ok_or_else(|| crate::read_at::eof(offset, buf.len()))?;

        buf.copy_from_slice(src);

        Ok(())
    }

    #[inline]
    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// A plain file handle read with positioned I/O.
///
/// Used when memory mapping is disabled or unavailable (pipes, some network
/// file systems, 32-bit targets with very large files).
#[derive(Debug)]
pub struct SeekFile {
    file: std::fs::File,
    len: u64,
    path: std::path::PathBuf,
}

impl SeekFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or its metadata read.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;
        let len = file.metadata()?.len();

        Ok(Self {
            file,
            len,
            path: path_buf,
        })
    }
}

impl crate::read_at::ReadAt for SeekFile {
    #[inline]
    fn len(&self) -> u64 {
        self.len
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        let end = <usize as TryInto<u64>>::try_into(buf.len())
            .ok()
            .and_then(|len| offset.checked_add(len));

        if end.is_none_or(|end| end > self.len) {
            return Err(crate::read_at::eof(offset, buf.len()));
        }

        read_exact_at(&self.file, offset, buf)
    }

    #[inline]
    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(unix)]
fn read_exact_at(file: &std::fs::File, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    std::os::unix::fs::FileExt::read_exact_at(file, buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &std::fs::File, mut offset: u64, mut buf: &mut [u8]) -> std::io::Result<()> {
    while !buf.is_empty() {
        match std::os::windows::fs::FileExt::seek_read(file, buf, offset) {
            Ok(0) => return Err(crate::read_at::eof(offset, buf.len())),
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

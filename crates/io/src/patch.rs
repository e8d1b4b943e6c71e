/// Positioned writes into an existing file of fixed length.
pub trait WriteAt {
    /// Writes all of `bytes` at `offset`.
    ///
    /// # Errors
    ///
    /// - `std::io::Error` if the write fails; some bytes may already be on disk.
    fn write_all_at(&mut self, offset: u64, bytes: &[u8]) -> std::io::Result<()>;

    /// Flushes written bytes to the storage device.
    ///
    /// # Errors
    ///
    /// - `std::io::Error` if the operating system reports a sync failure.
    fn sync(&mut self) -> std::io::Result<()>;
}

/// Write handle used to fold pending edits into the backing file.
///
/// Opened without `create` or `truncate`: the file must already exist and
/// its length is checked against the length the caller expects, so a flush
/// never silently targets a file that was replaced or resized.
#[derive(Debug)]
pub struct PatchFile {
    file: std::fs::File,
}

impl PatchFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened for writing.
    /// - `std::io::ErrorKind::InvalidData` if its length differs from
    ///   `expected_len`.
    pub fn open(path: impl AsRef<std::path::Path>, expected_len: u64) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())?;
        let actual = file.metadata()?.len();

        if actual != expected_len {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("file length changed on disk: expected {expected_len}, found {actual}"),
            ));
        }

        Ok(Self { file })
    }
}

impl WriteAt for PatchFile {
    fn write_all_at(&mut self, offset: u64, bytes: &[u8]) -> std::io::Result<()> {
        use std::io::{Seek, Write};

        self.file.seek(std::io::SeekFrom::Start(offset))?;
        self.file.write_all(bytes)
    }

    fn sync(&mut self) -> std::io::Result<()> {
        self.file.sync_data()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::WriteAt;

    #[test]
    fn patches_in_place_without_changing_length() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"aaaaaaaa").unwrap();
        temp.as_file().sync_all().unwrap();

        let mut patch = super::PatchFile::open(temp.path(), 8).unwrap();
        patch.write_all_at(2, b"XY").unwrap();
        patch.write_all_at(7, b"Z").unwrap();
        patch.sync().unwrap();

        assert_eq!(std::fs::read(temp.path()).unwrap(), b"aaXYaaaZ");
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"abc").unwrap();
        temp.as_file().sync_all().unwrap();

        let err = super::PatchFile::open(temp.path(), 4).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}

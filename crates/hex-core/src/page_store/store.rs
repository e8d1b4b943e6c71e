use std::ops::AddAssign;

use crate::page_store::page::Page;
use crate::page_store::stats::PageStoreStats;

pub struct PageStore {
    source: Box<dyn io::read_at::ReadAt>,
    page_size: u64,
    cache: lru::LruCache<u64, Page>,
    stats: PageStoreStats,
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("source", &self.source)
            .field("page_size", &self.page_size)
            .field("cached_pages", &self.cache.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl PageStore {
    /// Opens `path` for reading, honouring `config.use_mmap`.
    ///
    /// A map that cannot be created is not fatal: the store falls back to
    /// positioned reads through a plain handle.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Io`] if the file cannot be opened at all.
    /// - [`crate::errors::HexError::Argument`] if the config is invalid.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        config: &crate::config::EngineConfig,
    ) -> crate::errors::HexResult<Self> {
        config.validate()?;

        let path = path.as_ref();
        let source: Box<dyn io::read_at::ReadAt> = if config.use_mmap {
            match io::mmap::MmapFile::open(path) {
                Ok(mmap) => Box::new(mmap),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to open file using mmap, using positioned reads"
                    );
                    Box::new(io::file::SeekFile::open(path)?)
                }
            }
        } else {
            Box::new(io::file::SeekFile::open(path)?)
        };

        tracing::debug!(
            path = %path.display(),
            len = source.len(),
            page_size = config.page_size,
            cache_pages = config.cache_pages,
            "opened page store"
        );

        Self::from_source(source, config.page_size, config.cache_pages)
    }

    /// Builds a store over an already-open source.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Argument`] if `page_size` or `capacity` is zero.
    pub fn from_source(
        source: Box<dyn io::read_at::ReadAt>,
        page_size: usize,
        capacity: usize,
    ) -> crate::errors::HexResult<Self> {
        let capacity = std::num::NonZeroUsize::new(capacity).ok_or_else(|| {
            crate::errors::HexError::Argument("page cache capacity must be nonzero".into())
        })?;

        if page_size == 0 {
            return Err(crate::errors::HexError::Argument(
                "page size must be nonzero".into(),
            ));
        }

        Ok(Self {
            source,
            page_size: <usize as TryInto<u64>>::try_into(page_size)
                .map_err(crate::enums::MathError::from)?,
            cache: lru::LruCache::new(capacity),
            stats: PageStoreStats::default(),
        })
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PageStore {
    /// Backing file length, fixed at open time.
    #[inline]
    pub fn len(&self) -> u64 {
        self.source.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    #[inline]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    #[inline]
    pub fn path(&self) -> &std::path::Path {
        self.source.path()
    }

    #[inline]
    pub fn stats(&self) -> PageStoreStats {
        self.stats
    }

    #[inline]
    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Whether page `index` is resident. Does not touch its recency.
    #[inline]
    pub fn is_cached(&self, index: u64) -> bool {
        self.cache.contains(&index)
    }

    #[inline]
    pub fn page_index(&self, offset: u64) -> u64 {
        offset / self.page_size
    }
}

/*

===========================
========= READING =========
===========================

*/

impl PageStore {
    /// Returns raw backing-file bytes for `offset..offset + length`.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Range`] if the range is outside the file.
    /// - [`crate::errors::HexError::Io`] if a page load fails.
    pub fn read(&mut self, offset: u64, length: u64) -> crate::errors::HexResult<Vec<u8>> {
        crate::errors::check_range(offset, length, self.len())?;

        let size =
            <u64 as TryInto<usize>>::try_into(length).map_err(crate::enums::MathError::from)?;
        let mut out = vec![0u8; size];

        self.read_into(offset, &mut out)?;

        Ok(out)
    }

    /// Fills `out` with raw backing-file bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Range`] if the range is outside the file.
    /// - [`crate::errors::HexError::Io`] if a page load fails. Bytes already
    ///   copied into `out` are unspecified.
    pub fn read_into(&mut self, offset: u64, out: &mut [u8]) -> crate::errors::HexResult<()> {
        let length = out.len() as u64;

        crate::errors::check_range(offset, length, self.len())?;

        let mut pos = offset;
        let mut written = 0usize;

        while written < out.len() {
            let index = self.page_index(pos);
            let page = self.page(index)?;
            let in_page = <u64 as TryInto<usize>>::try_into(pos - page.offset)
                .map_err(crate::enums::MathError::from)?;
            let take = (page.data.len() - in_page).min(out.len() - written);

            out[written..written + take].copy_from_slice(&page.data[in_page..in_page + take]);

            written.add_assign(take);
            pos.add_assign(take as u64);
        }

        Ok(())
    }

    /// Returns page `index`, loading it on a miss and promoting it on a hit.
    fn page(&mut self, index: u64) -> crate::errors::HexResult<&Page> {
        if self.cache.contains(&index) {
            self.stats.hits.add_assign(1);
        } else {
            let page = self.load(index)?;

            if let Some((evicted, _)) = self.cache.push(index, page)
                && evicted != index
            {
                self.stats.evictions.add_assign(1);
                tracing::trace!(page = evicted, "evicted page");
            }
        }

        self.cache
            .get(&index)
            .ok_or(crate::errors::HexError::Math(crate::enums::MathError::OutOfBounds(index)))
    }

    fn load(&mut self, index: u64) -> crate::errors::HexResult<Page> {
        let offset = index
            .checked_mul(self.page_size)
            .ok_or(crate::enums::MathError::Overflow)?;

        if offset >= self.len() {
            return Err(crate::errors::HexError::range(offset, 1, self.len()));
        }

        let len = self.page_size.min(self.len() - offset);
        let size = <u64 as TryInto<usize>>::try_into(len).map_err(crate::enums::MathError::from)?;
        let mut data = vec![0u8; size].into_boxed_slice();

        self.source.read_exact_at(offset, &mut data)?;
        self.stats.loads.add_assign(1);

        tracing::trace!(page = index, offset, len, "loaded page");

        Ok(Page { offset, data })
    }
}

/*

================================
========= INVALIDATION =========
================================

*/

impl PageStore {
    /// Drops every cached page overlapping `offset..offset + length`.
    pub fn invalidate(&mut self, offset: u64, length: u64) {
        if length == 0 {
            return;
        }

        let first = self.page_index(offset);
        let last = self.page_index(offset.saturating_add(length - 1));

        for index in first..=last {
            self.cache.pop(&index);
        }
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(len: usize) -> (tempfile::NamedTempFile, Vec<u8>) {
        let content: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(&content).unwrap();
        temp.as_file().sync_all().unwrap();
        (temp, content)
    }

    fn store(path: &std::path::Path, page_size: usize, capacity: usize) -> PageStore {
        let source = Box::new(io::file::SeekFile::open(path).unwrap());
        PageStore::from_source(source, page_size, capacity).unwrap()
    }

    #[test]
    fn read_spans_pages() {
        let (temp, content) = fixture(1000);
        let mut store = store(temp.path(), 64, 4);

        assert_eq!(store.read(60, 10).unwrap(), &content[60..70]);
        assert_eq!(store.read(0, 1000).unwrap(), content);
        assert_eq!(store.read(999, 1).unwrap(), &content[999..]);
        assert_eq!(store.read(1000, 0).unwrap(), b"");
    }

    #[test]
    fn short_last_page() {
        let (temp, content) = fixture(100);
        let mut store = store(temp.path(), 64, 2);

        assert_eq!(store.read(64, 36).unwrap(), &content[64..]);
        assert!(store.is_cached(1));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let (temp, _) = fixture(100);
        let mut store = store(temp.path(), 64, 2);

        assert!(matches!(
            store.read(90, 11),
            Err(crate::errors::HexError::Range { .. })
        ));
        assert_eq!(store.stats().loads, 0);
    }

    #[test]
    fn lru_eviction_and_reload() {
        let (temp, _) = fixture(64 * 5);
        let mut store = store(temp.path(), 64, 2);

        store.read(0, 1).unwrap(); // page 0
        store.read(64, 1).unwrap(); // page 1
        store.read(0, 1).unwrap(); // page 0 again, now most recent
        store.read(128, 1).unwrap(); // page 2 evicts page 1

        assert!(store.is_cached(0));
        assert!(!store.is_cached(1));
        assert!(store.is_cached(2));
        assert_eq!(
            store.stats(),
            PageStoreStats {
                loads: 3,
                hits: 1,
                evictions: 1
            }
        );

        store.read(64, 1).unwrap();
        assert_eq!(store.stats().loads, 4);
        assert_eq!(store.cached_pages(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let (temp, _) = fixture(256);
        let mut store = store(temp.path(), 64, 8);

        store.read(0, 256).unwrap();
        assert_eq!(store.stats().loads, 4);

        store.invalidate(70, 60); // pages 1 and 2
        assert!(store.is_cached(0));
        assert!(!store.is_cached(1));
        assert!(!store.is_cached(2));
        assert!(store.is_cached(3));

        store.read(0, 256).unwrap();
        assert_eq!(store.stats().loads, 6);

        store.invalidate_all();
        assert_eq!(store.cached_pages(), 0);
    }

    #[test]
    fn truncated_file_surfaces_io_error() {
        let (temp, _) = fixture(200);
        let mut store = store(temp.path(), 64, 2);

        temp.as_file().set_len(10).unwrap();

        assert!(matches!(
            store.read(100, 10),
            Err(crate::errors::HexError::Io(_))
        ));
    }

    #[test]
    fn mmap_and_fallback_agree() {
        let (temp, content) = fixture(5000);
        let mapped = crate::config::EngineConfig {
            use_mmap: true,
            page_size: 128,
            ..Default::default()
        };
        let mut a = PageStore::open(temp.path(), &mapped).unwrap();
        let mut b = PageStore::open(temp.path(), &crate::config::EngineConfig::default()).unwrap();

        assert_eq!(a.read(100, 1000).unwrap(), &content[100..1100]);
        assert_eq!(b.read(100, 1000).unwrap(), &content[100..1100]);
        assert_eq!(a.path(), temp.path());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let (temp, _) = fixture(10);
        let source = Box::new(io::file::SeekFile::open(temp.path()).unwrap());

        assert!(PageStore::from_source(source, 64, 0).is_err());
    }
}

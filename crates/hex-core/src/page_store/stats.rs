/// Counters for page cache activity.
///
/// `loads` counts reads from the backing file; a page evicted and touched
/// again shows up as a second load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageStoreStats {
    pub loads: u64,
    pub hits: u64,
    pub evictions: u64,
}

/// # Backing File Access.
///
/// Read handles implement [`read_at::ReadAt`]; the page store only ever
/// sees that trait. [`patch::PatchFile`] is the one write path and is opened
/// only for the duration of a flush.
pub mod file;
pub mod mmap;
pub mod patch;
pub mod read_at;

/// # Page Store Module.
///
/// Read-only, page-granular access to the backing file with a bounded
/// least-recently-used cache. Pages never carry edits, so evicting one can
/// never lose data.
pub mod page;
pub mod stats;
pub mod store;

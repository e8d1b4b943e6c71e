/// # Paged Binary Buffer Engine.
///
/// - [`page_store`] loads fixed-size pages of the backing file on demand into
///   a bounded LRU cache.
/// - [`overlay`] keeps pending overwrites as normalized runs over the pages.
/// - [`buffer::Buffer`] merges both into one fixed-length byte view with
///   undo/redo and an explicit flush.
/// - [`search`], [`marks`] and [`codec`] work on top of that view.
pub mod buffer;
pub mod codec;
pub mod config;
pub mod enums;
pub mod errors;
pub mod hex;
pub mod history;
pub mod marks;
pub mod overlay;
pub mod page_store;
pub mod search;

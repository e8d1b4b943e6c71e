/// # Edit Overlay Module.
///
/// Pending overwrites kept as a normalized set of runs: sorted by offset,
/// never overlapping, never touching. The backing file is not modified
/// until the buffer flushes.
pub mod run;
pub mod table;

/// One open file as an interactive front end sees it.
///
/// - [`cursor`] tracks the active offset and an optional selection anchor.
/// - [`command`] is the closed set of operations a key binding can trigger.
/// - [`session::Session`] owns the buffer, marks and search state and
///   dispatches commands against them.
pub mod command;
pub mod cursor;
pub mod session;

/// Tunables for one open buffer.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bytes per cached page.
    pub page_size: usize,
    /// Maximum number of pages held by the page cache.
    pub cache_pages: usize,
    /// Bytes read per search step; cancellation is checked between steps.
    pub search_chunk: usize,
    /// Whether searches wrap around the ends of the file.
    pub search_wrap: bool,
    /// Capacity of the unnamed-mark jump history.
    pub jump_history: usize,
    /// Read pages through a memory map instead of positioned reads.
    pub use_mmap: bool,
    /// Allow overwrite and flush.
    pub writable: bool,
}

pub const DEFAULT_PAGE_SIZE: usize = 4096;
pub const DEFAULT_CACHE_PAGES: usize = 256;
pub const DEFAULT_SEARCH_CHUNK: usize = 0x10000;
pub const DEFAULT_JUMP_HISTORY: usize = 64;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_pages: DEFAULT_CACHE_PAGES,
            search_chunk: DEFAULT_SEARCH_CHUNK,
            search_wrap: true,
            jump_history: DEFAULT_JUMP_HISTORY,
            use_mmap: false,
            writable: true,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Argument`] naming the first zero-sized field.
    pub fn validate(&self) -> crate::errors::HexResult<()> {
        for (name, value) in [
            ("page_size", self.page_size),
            ("cache_pages", self.cache_pages),
            ("search_chunk", self.search_chunk),
            ("jump_history", self.jump_history),
        ] {
            if value == 0 {
                return Err(crate::errors::HexError::Argument(format!(
                    "config field `{name}` must be nonzero"
                )));
            }
        }

        Ok(())
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Argument`] if the JSON is malformed or a
    ///   field fails validation.
    pub fn from_json_str(text: &str) -> crate::errors::HexResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| crate::errors::HexError::Argument(format!("bad config: {e}")))?;

        config.validate()?;

        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Io`] if the file cannot be read.
    /// - [`crate::errors::HexError::Argument`] if it does not parse or validate.
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::errors::HexResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;

        tracing::debug!(path = %path.as_ref().display(), "loading engine config");

        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

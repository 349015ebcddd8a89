use std::{fmt, sync::Arc, time::Duration};

/// Transformation applied to every identifier before it is quoted.
pub type IdentifierTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Compilation and execution settings shared by every builder compiled through a client.
#[derive(Clone)]
pub struct Config {
    /// Applied to each identifier part before quoting, never to `*`.
    pub identifier_transform: Option<IdentifierTransform>,
    /// Write `NULL` instead of `DEFAULT` for keys missing from some rows of a multi-row insert.
    pub use_null_as_default: bool,
    /// Timeout given to statements that did not set one explicitly.
    pub default_timeout: Option<Duration>,
    /// Rows per insert statement when a table is migrated through a shadow copy.
    pub migration_chunk_size: usize,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier_transform(
        mut self,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.identifier_transform = Some(Arc::new(transform));
        self
    }

    pub fn use_null_as_default(mut self, value: bool) -> Self {
        self.use_null_as_default = value;
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn migration_chunk_size(mut self, size: usize) -> Self {
        self.migration_chunk_size = size;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identifier_transform: None,
            use_null_as_default: false,
            default_timeout: None,
            migration_chunk_size: 20,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("identifier_transform", &self.identifier_transform.is_some())
            .field("use_null_as_default", &self.use_null_as_default)
            .field("default_timeout", &self.default_timeout)
            .field("migration_chunk_size", &self.migration_chunk_size)
            .finish()
    }
}

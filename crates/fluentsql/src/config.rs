//! Process-wide configuration.

use std::sync::{LazyLock, PoisonError, RwLock};

/// Tunables shared by every statement build.
///
/// ```ignore
/// fluentsql::configure(
///     FluentConfig::new()
///         .metadata_cache_capacity(16)
///         .log_statements(true),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluentConfig {
    /// Maximum number of entity types kept in the metadata cache.
    pub metadata_cache_capacity: usize,
    /// Emit a `fluentsql.sql` debug event before each executor dispatch.
    pub log_statements: bool,
    /// Truncate logged SQL to this many bytes (`None` = no limit).
    pub max_logged_sql_length: Option<usize>,
}

impl Default for FluentConfig {
    fn default() -> Self {
        Self {
            metadata_cache_capacity: 5,
            log_statements: false,
            max_logged_sql_length: Some(500),
        }
    }
}

impl FluentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metadata cache capacity.
    pub fn metadata_cache_capacity(mut self, capacity: usize) -> Self {
        self.metadata_cache_capacity = capacity;
        self
    }

    /// Enable or disable statement logging.
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Set the maximum logged SQL length.
    pub fn max_logged_sql_length(mut self, max: Option<usize>) -> Self {
        self.max_logged_sql_length = max;
        self
    }
}

static CONFIG: LazyLock<RwLock<FluentConfig>> =
    LazyLock::new(|| RwLock::new(FluentConfig::default()));

/// Install a new configuration.
///
/// Resizes the metadata cache immediately; entries beyond the new capacity
/// are evicted oldest first.
pub fn configure(config: FluentConfig) {
    crate::resolver::metadata_cache().set_capacity(config.metadata_cache_capacity);
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config;
}

/// Snapshot of the current configuration.
pub fn config() -> FluentConfig {
    CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(feature = "tracing")]
pub(crate) fn truncate_for_log(sql: &str, max: Option<usize>) -> &str {
    match max {
        Some(max) if sql.len() > max => {
            let mut end = max;
            while !sql.is_char_boundary(end) {
                end -= 1;
            }
            &sql[..end]
        }
        _ => sql,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_setters() {
        let cfg = FluentConfig::new()
            .metadata_cache_capacity(9)
            .log_statements(true)
            .max_logged_sql_length(None);
        assert_eq!(cfg.metadata_cache_capacity, 9);
        assert!(cfg.log_statements);
        assert_eq!(cfg.max_logged_sql_length, None);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_log("SELECT 1", Some(3)), "SEL");
        assert_eq!(truncate_for_log("é", Some(1)), "");
        assert_eq!(truncate_for_log("SELECT 1", None), "SELECT 1");
    }
}

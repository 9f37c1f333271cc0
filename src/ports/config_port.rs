//! Configuration access port trait.

/// Sectioned key/value settings. Values are returned raw; typing and range
/// checks happen in [`crate::domain::config_validation`].
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Trimmed string value, `None` when absent or blank.
    fn get_non_empty(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

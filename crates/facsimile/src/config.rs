//! Configuration types for copy/paste behavior.
//!
//! All types implement [`serde::Deserialize`] for loading from external
//! sources such as a TOML file.
//!
//! # Example
//!
//! ```
//! # use facsimile::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(!config.paste().behavior());
//! assert_eq!(config.paste().pointer_event(), "mousemove");
//! ```

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Paste configuration section.
    #[serde(default)]
    paste: PasteConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the given paste section.
    pub fn new(paste: PasteConfig) -> Self {
        Self { paste }
    }

    /// Returns the paste configuration.
    pub fn paste(&self) -> &PasteConfig {
        &self.paste
    }
}

/// Settings applied on every paste.
#[derive(Debug, Clone, Deserialize)]
pub struct PasteConfig {
    /// Whether host modeling behaviors run for pasted elements.
    ///
    /// When `false` (the default) every paste carries the hint
    /// `behavior = false`.
    #[serde(default)]
    behavior: bool,

    /// Pointer event forwarded to the create interaction when pasting
    /// without an explicit target.
    #[serde(default = "default_pointer_event")]
    pointer_event: String,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            behavior: false,
            pointer_event: default_pointer_event(),
        }
    }
}

impl PasteConfig {
    /// Creates a new [`PasteConfig`].
    ///
    /// # Arguments
    ///
    /// * `behavior` - Whether modeling behaviors stay enabled on paste.
    /// * `pointer_event` - Name of the pointer event used to start dragging.
    pub fn new(behavior: bool, pointer_event: impl Into<String>) -> Self {
        Self {
            behavior,
            pointer_event: pointer_event.into(),
        }
    }

    pub fn behavior(&self) -> bool {
        self.behavior
    }

    pub fn pointer_event(&self) -> &str {
        &self.pointer_event
    }
}

fn default_pointer_event() -> String {
    "mousemove".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert!(!config.paste().behavior());
        assert_eq!(config.paste().pointer_event(), "mousemove");
    }

    #[test]
    fn test_deserialize_paste_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [paste]
            behavior = true
            pointer_event = "element.hover"
            "#,
        )
        .unwrap();

        assert!(config.paste().behavior());
        assert_eq!(config.paste().pointer_event(), "element.hover");
    }
}

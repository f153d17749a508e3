//! Configuration for the embedded terminals

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::Color;

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Grid width in columns
    pub cols: usize,
    /// Grid height in rows
    pub rows: usize,
    /// Number of terminals in the session pool
    pub pool_size: usize,
    /// Shell launch settings
    pub shell: ShellConfig,
    /// Color palette for the renderer
    pub palette: ColorPalette,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            pool_size: 8,
            shell: ShellConfig::default(),
            palette: ColorPalette::default(),
        }
    }
}

/// How the child shell is started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell tried first
    pub primary: String,
    /// Shell tried if the primary cannot be executed
    pub fallback: String,
    /// Extra arguments passed to either shell
    pub args: Vec<String>,
    /// Value of `TERM` in the child
    pub term: String,
    /// Value of `COLORTERM` in the child
    pub colorterm: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            primary: "/bin/bash".to_string(),
            fallback: "/bin/sh".to_string(),
            args: Vec::new(),
            term: "ansi".to_string(),
            colorterm: "truecolor".to_string(),
        }
    }
}

impl ShellConfig {
    /// Shell paths in the order they are tried, skipping empty and repeated ones
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        let primary = self.primary.as_str();
        let fallback = Some(self.fallback.as_str()).filter(|f| *f != primary);
        std::iter::once(primary)
            .chain(fallback)
            .filter(|path| !path.is_empty())
    }
}

/// Color palette configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Cursor overlay color
    pub cursor: (u8, u8, u8),
    /// The 16 ANSI colors (0-15)
    pub ansi: [(u8, u8, u8); 16],
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            cursor: (255, 255, 255),
            // VGA-style palette
            ansi: [
                (0x00, 0x00, 0x00), // 0: Black
                (0xAA, 0x00, 0x00), // 1: Red
                (0x00, 0xAA, 0x00), // 2: Green
                (0xAA, 0x55, 0x00), // 3: Yellow/Brown
                (0x00, 0x00, 0xAA), // 4: Blue
                (0xAA, 0x00, 0xAA), // 5: Magenta
                (0x00, 0xAA, 0xAA), // 6: Cyan
                (0xAA, 0xAA, 0xAA), // 7: White/Gray
                (0x55, 0x55, 0x55), // 8: Bright Black
                (0xFF, 0x55, 0x55), // 9: Bright Red
                (0x55, 0xFF, 0x55), // 10: Bright Green
                (0xFF, 0xFF, 0x55), // 11: Bright Yellow
                (0x55, 0x55, 0xFF), // 12: Bright Blue
                (0xFF, 0x55, 0xFF), // 13: Bright Magenta
                (0x55, 0xFF, 0xFF), // 14: Bright Cyan
                (0xFF, 0xFF, 0xFF), // 15: Bright White
            ],
        }
    }
}

impl ColorPalette {
    /// Get the RGB color for a cell color
    pub fn rgb(&self, color: Color) -> (u8, u8, u8) {
        self.ansi[usize::from(color.index() & 0x0F)]
    }

    /// Packed `0xAARRGGBB`, opaque, as a framebuffer expects
    pub fn argb(&self, color: Color) -> u32 {
        let (r, g, b) = self.rgb(color);
        0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }
}

impl TerminalConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: TerminalConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            },
        }
    }

    /// Reject settings no terminal can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::Invalid("pool_size must be at least 1".to_string()));
        }
        if self.shell.candidates().next().is_none() {
            return Err(ConfigError::Invalid("no shell configured".to_string()));
        }
        Ok(())
    }
}

/// `$HOME/.config/cabinet-term/config.json`
fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("cabinet-term")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

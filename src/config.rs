//! Run configuration and per-folder overrides.
//!
//! Two kinds of configuration exist:
//!
//! ## Run configuration (`gallery.toml`)
//!
//! Optional defaults for the command-line flags, read from `gallery.toml` in
//! the gallery root or from the file given with `--config`:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! sizes = []                # Thumbnail bounding boxes in pixels
//! order = "exifTimeAsc"     # exifTimeAsc | exifTimeDesc | filenameAsc | filenameDesc
//! cc_size = 1280            # Size used for the casting feed (omit to disable)
//! max_threads = 4           # Thumbnail workers (omit for one per CPU)
//! folder_time = "newest"    # newest | oldest: which image time dates a folder
//! quality = 75              # JPEG quality of the thumbnails (1-100)
//! ```
//!
//! Flags given on the command line win over values from the file. Unknown
//! keys are rejected to catch typos early.
//!
//! ## Folder overrides (`content.ini`)
//!
//! Any folder may contain a `content.ini` whose leading, unnamed section
//! sets `title`, `description` and `cover`:
//!
//! ```ini
//! title = Summer in Lisbon
//! description = "Two weeks, one camera"
//! cover = IMG_0042.jpg
//! ```

use crate::imaging::Quality;
use crate::metadata::FolderTimePolicy;
use crate::sorting::ImageOrder;
use crate::types::FolderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional run configuration file in the gallery root.
pub const CONFIG_FILE: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid line {line} in {path}: {content}")]
    Ini {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Thumbnail bounding boxes in pixels.
    pub sizes: Vec<u32>,
    /// Image order inside each folder.
    pub order: ImageOrder,
    /// Thumbnail size referenced by the casting feed. `None` disables the feed.
    pub cc_size: Option<u32>,
    /// Maximum number of thumbnail workers. `None` means one per CPU.
    pub max_threads: Option<usize>,
    /// Which of a folder's own image times represents the folder.
    pub folder_time: FolderTimePolicy,
    /// JPEG quality of generated thumbnails.
    pub quality: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            sizes: Vec::new(),
            order: ImageOrder::default(),
            cc_size: None,
            max_threads: None,
            folder_time: FolderTimePolicy::default(),
            quality: Quality::default().value(),
        }
    }
}

impl GalleryConfig {
    /// Validate values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(size) = self.sizes.iter().find(|s| **s == 0) {
            return Err(ConfigError::Validation(format!(
                "sizes must be positive, got {size}"
            )));
        }
        if self.cc_size == Some(0) {
            return Err(ConfigError::Validation(
                "cc_size must be positive".into(),
            ));
        }
        if self.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "max_threads must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        Ok(())
    }

    /// Thumbnail sizes in first-seen order, without repeats, with the
    /// casting feed size appended when missing.
    pub fn thumbnail_sizes(&self) -> Vec<u32> {
        let mut sizes: Vec<u32> = Vec::with_capacity(self.sizes.len() + 1);
        for &size in self.sizes.iter().chain(self.cc_size.as_ref()) {
            if !sizes.contains(&size) {
                sizes.push(size);
            }
        }
        sizes
    }
}

/// Load the run configuration.
///
/// An explicit path must exist. Without one, `gallery.toml` in the gallery
/// root is used if present, else the defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = root.join(CONFIG_FILE);
            if !path.exists() {
                return Ok(GalleryConfig::default());
            }
            path
        }
    };
    let content = fs::read_to_string(&path)?;
    let config: GalleryConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Resolve the effective worker count.
///
/// - `None` → number of available CPUs
/// - `Some(n)` → `n` as requested
pub fn effective_threads(max_threads: Option<usize>) -> usize {
    max_threads.filter(|n| *n > 0).unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

/// Read a folder's `content.ini`.
pub fn load_folder_config(path: &Path) -> Result<FolderConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_folder_ini(&content).map_err(|(line, content)| ConfigError::Ini {
        path: path.to_path_buf(),
        line,
        content,
    })
}

/// Parse the leading unnamed section of an INI document.
///
/// Keys are case-sensitive, values are trimmed and may be wrapped in single
/// or double quotes. Lines starting with `;` or `#` are comments. Everything
/// from the first `[section]` header on is ignored, as are unknown keys.
/// On a malformed line, returns its 1-based number and content.
pub fn parse_folder_ini(content: &str) -> Result<FolderConfig, (usize, String)> {
    let mut config = FolderConfig::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            break;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err((idx + 1, raw.to_string()));
        };
        let value = unquote(value.trim()).to_string();
        match key.trim() {
            "title" => config.title = Some(value),
            "description" => config.description = Some(value),
            "cover" => config.cover = Some(value),
            _ => {}
        }
    }

    Ok(config)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // gallery.toml
    // =========================================================================

    #[test]
    fn default_config_values() {
        let config = GalleryConfig::default();
        assert!(config.sizes.is_empty());
        assert_eq!(config.order, ImageOrder::ExifTimeAsc);
        assert_eq!(config.cc_size, None);
        assert_eq!(config.max_threads, None);
        assert_eq!(config.folder_time, FolderTimePolicy::Newest);
        assert_eq!(config.quality, 75);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
sizes = [200, 1280]
order = "filenameDesc"
cc_size = 800
max_threads = 2
folder_time = "oldest"
quality = 90
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.sizes, vec![200, 1280]);
        assert_eq!(config.order, ImageOrder::FilenameDesc);
        assert_eq!(config.cc_size, Some(800));
        assert_eq!(config.max_threads, Some(2));
        assert_eq!(config.folder_time, FolderTimePolicy::Oldest);
        assert_eq!(config.quality, 90);
        config.validate().unwrap();
    }

    #[test]
    fn sparse_config_keeps_defaults() {
        let config: GalleryConfig = toml::from_str("sizes = [400]").unwrap();
        assert_eq!(config.sizes, vec![400]);
        assert_eq!(config.quality, 75);
        assert_eq!(config.order, ImageOrder::ExifTimeAsc);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<GalleryConfig, _> = toml::from_str("sizez = [400]");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_order_rejected() {
        let result: Result<GalleryConfig, _> = toml::from_str(r#"order = "random""#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_size() {
        let config = GalleryConfig {
            sizes: vec![200, 0],
            ..GalleryConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_bad_quality_and_threads() {
        let config = GalleryConfig {
            quality: 0,
            ..GalleryConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GalleryConfig {
            max_threads: Some(0),
            ..GalleryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cc_size_added_to_sizes_once() {
        let config = GalleryConfig {
            sizes: vec![200, 400],
            cc_size: Some(1280),
            ..GalleryConfig::default()
        };
        assert_eq!(config.thumbnail_sizes(), vec![200, 400, 1280]);

        let config = GalleryConfig {
            sizes: vec![200, 400],
            cc_size: Some(400),
            ..GalleryConfig::default()
        };
        assert_eq!(config.thumbnail_sizes(), vec![200, 400]);
    }

    #[test]
    fn repeated_sizes_collapse_in_order() {
        let config = GalleryConfig {
            sizes: vec![400, 200, 400, 200],
            cc_size: Some(200),
            ..GalleryConfig::default()
        };
        assert_eq!(config.thumbnail_sizes(), vec![400, 200]);
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn load_config_from_root_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "sizes = [300]\ncc_size = 900").unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.sizes, vec![300]);
        assert_eq!(config.cc_size, Some(900));
    }

    #[test]
    fn load_config_explicit_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        assert!(matches!(
            load_config(tmp.path(), Some(&missing)),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "quality = 101").unwrap();
        assert!(matches!(
            load_config(tmp.path(), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(None), cores);
    }

    #[test]
    fn effective_threads_honors_request() {
        assert_eq!(effective_threads(Some(3)), 3);
        assert_eq!(effective_threads(Some(1)), 1);
    }

    // =========================================================================
    // content.ini
    // =========================================================================

    #[test]
    fn ini_all_keys() {
        let ini = "title = Summer in Lisbon\ndescription = \"Two weeks, one camera\"\ncover=IMG_0042.jpg\n";
        let config = parse_folder_ini(ini).unwrap();
        assert_eq!(config.title.as_deref(), Some("Summer in Lisbon"));
        assert_eq!(config.description.as_deref(), Some("Two weeks, one camera"));
        assert_eq!(config.cover.as_deref(), Some("IMG_0042.jpg"));
    }

    #[test]
    fn ini_comments_blank_lines_and_unknown_keys() {
        let ini = "; comment\n\n# another\nauthor = me\ntitle='Quoted'\n";
        let config = parse_folder_ini(ini).unwrap();
        assert_eq!(config.title.as_deref(), Some("Quoted"));
        assert_eq!(config.description, None);
        assert_eq!(config.cover, None);
    }

    #[test]
    fn ini_named_sections_ignored() {
        let ini = "title = Root\n[other]\ntitle = Ignored\ncover = x.jpg\n";
        let config = parse_folder_ini(ini).unwrap();
        assert_eq!(config.title.as_deref(), Some("Root"));
        assert_eq!(config.cover, None);
    }

    #[test]
    fn ini_value_may_contain_equals() {
        let config = parse_folder_ini("description = a = b").unwrap();
        assert_eq!(config.description.as_deref(), Some("a = b"));
    }

    #[test]
    fn ini_malformed_line_reported() {
        let err = parse_folder_ini("title = ok\njust words\n").unwrap_err();
        assert_eq!(err, (2, "just words".to_string()));
    }

    #[test]
    fn load_folder_config_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("content.ini");
        fs::write(&path, "broken").unwrap();
        match load_folder_config(&path) {
            Err(ConfigError::Ini { path: p, line, .. }) => {
                assert_eq!(p, path);
                assert_eq!(line, 1);
            }
            other => panic!("expected Ini error, got {other:?}"),
        }
    }
}

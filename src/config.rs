// src/config.rs

use crate::error::{Error, Result};
use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf};

pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 22;
pub const DEFAULT_FONT_SIZE: u32 = 16;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub sheet: SheetSection,
    #[serde(default)]
    pub output: OutputSection,
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Item font size is the only sheet setting; anything else is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetSection {
    #[serde(default = "default_font_size")]
    pub item_font_size: u32,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

impl Default for SheetSection {
    fn default() -> Self {
        Self {
            item_font_size: DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    #[serde(default = "default_pdf_path")]
    pub pdf_path: PathBuf,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("expedicao.csv")
}

fn default_pdf_path() -> PathBuf {
    PathBuf::from("pedido.pdf")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            pdf_path: default_pdf_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            sheet: SheetSection::default(),
            output: OutputSection::default(),
        }
    }
}

impl Config {
    /// Load the TOML config at `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let cfg: Self = toml::from_str(&content)?;
        check_font_size(cfg.sheet.item_font_size)?;
        Ok(cfg)
    }
}

/// Item font size is the one external knob; keep it inside the printable range.
pub fn check_font_size(size: u32) -> Result<u32> {
    if (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(Error::FontSize(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.sheet.item_font_size, 16);
        assert_eq!(cfg.output.csv_path, PathBuf::from("expedicao.csv"));
        assert_eq!(cfg.output.pdf_path, PathBuf::from("pedido.pdf"));
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sheet]\nitem_font_size = 20\n\n[output]\ncsv_path = \"out/items.csv\"").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.sheet.item_font_size, 20);
        assert_eq!(cfg.output.csv_path, PathBuf::from("out/items.csv"));
        assert_eq!(cfg.output.pdf_path, PathBuf::from("pedido.pdf"));
    }

    #[test]
    fn test_out_of_range_font_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sheet]\nitem_font_size = 30").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::FontSize(30)));
    }

    #[test]
    fn test_description_font_size_is_not_configurable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sheet]\nitem_font_size = 16\ndescription_font_size = 0").unwrap();

        assert!(matches!(Config::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sheet\nitem_font_size = ").unwrap();

        assert!(matches!(Config::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_font_size_bounds() {
        assert!(check_font_size(10).is_ok());
        assert!(check_font_size(22).is_ok());
        assert!(check_font_size(9).is_err());
        assert!(check_font_size(23).is_err());
    }
}

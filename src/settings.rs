use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::layout::DEFAULT_CHAR_WIDTH;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
const LOCAL_SETTINGS_FILE: &str = "ocr-format.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub language: String,
    pub tesseract_args: String,
    pub thresholding: String,
    pub method: String,
    pub fallback_char_width: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            tesseract_args: "--oem 3 --psm 11 -c preserve_interword_spaces=1".to_string(),
            thresholding: "otsu".to_string(),
            method: "with_format".to_string(),
            fallback_char_width: DEFAULT_CHAR_WIDTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    ocr: Option<OcrSettings>,
    layout: Option<LayoutSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrSettings {
    language: Option<String>,
    tesseract_args: Option<String>,
    thresholding: Option<String>,
    method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSettings {
    fallback_char_width: Option<f64>,
}

/// Built-in defaults, then `./ocr-format.toml`, then
/// `$HOME/.ocr-format/settings.toml`, then `extra_path`.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    settings.merge(parse_settings(DEFAULT_SETTINGS_TOML, Path::new("<builtin>"))?);

    let mut ordered_paths = vec![PathBuf::from(LOCAL_SETTINGS_FILE)];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(Error::Settings(format!(
                "settings file not found: {}",
                extra.display()
            )));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|err| {
                Error::Settings(format!("failed to read settings {}: {}", path.display(), err))
            })?;
            settings.merge(parse_settings(&content, &path)?);
            tracing::debug!("loaded settings from {}", path.display());
        }
    }

    Ok(settings)
}

fn parse_settings(content: &str, path: &Path) -> Result<SettingsFile> {
    toml::from_str(content).map_err(|err| {
        Error::Settings(format!("failed to parse settings {}: {}", path.display(), err))
    })
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(ocr) = incoming.ocr {
            if let Some(language) = ocr.language {
                if !language.trim().is_empty() {
                    self.language = language;
                }
            }
            if let Some(args) = ocr.tesseract_args {
                self.tesseract_args = args;
            }
            if let Some(thresholding) = ocr.thresholding {
                self.thresholding = thresholding;
            }
            if let Some(method) = ocr.method {
                self.method = method;
            }
        }
        if let Some(layout) = incoming.layout {
            if let Some(width) = layout.fallback_char_width {
                if width > 0.0 {
                    self.fallback_char_width = width;
                }
            }
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".ocr-format"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn builtin_settings_match_defaults() {
        let mut settings = Settings::default();
        settings.merge(parse_settings(DEFAULT_SETTINGS_TOML, Path::new("<builtin>")).unwrap());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn home_and_extra_files_override_in_order() {
        with_temp_home(|home| {
            let dir = home.join(".ocr-format");
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("settings.toml"),
                "[ocr]\nlanguage = \"fra\"\nthresholding = \"all\"\n",
            )
            .unwrap();
            let extra = home.join("extra.toml");
            fs::write(&extra, "[ocr]\nlanguage = \"eng+fra\"\n[layout]\nfallback_char_width = 12.5\n")
                .unwrap();

            let settings = load_settings(Some(&extra)).unwrap();
            assert_eq!(settings.language, "eng+fra");
            assert_eq!(settings.thresholding, "all");
            assert_eq!(settings.fallback_char_width, 12.5);
            assert_eq!(settings.method, "with_format");
        });
    }

    #[test]
    fn missing_extra_file_is_an_error() {
        with_temp_home(|home| {
            let err = load_settings(Some(&home.join("nope.toml"))).unwrap_err();
            assert!(matches!(err, Error::Settings(_)));
        });
    }

    #[test]
    fn malformed_file_is_reported() {
        with_temp_home(|home| {
            let extra = home.join("bad.toml");
            fs::write(&extra, "[ocr\nlanguage = ").unwrap();
            assert!(matches!(load_settings(Some(&extra)), Err(Error::Settings(_))));
        });
    }
}

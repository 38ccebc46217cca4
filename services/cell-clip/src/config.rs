//! Configuration directory and settings file
//!
//! Base directory precedence: `--config-dir` > `CELL_CLIP_HOME` env var >
//! `~/.cell-clip`. The settings file `config.toml` in that directory maps a
//! setting name to one cell:
//!
//! ```toml
//! [budget]
//! spreadsheet = "https://docs.google.com/spreadsheets/d/1AbC.../edit"
//! sheet = "Summary"
//! column = "B"
//! row = 4
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sheets_auth::DEFAULT_DIR_NAME;

pub const SETTINGS_FILE: &str = "config.toml";

/// One named cell reference
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Setting {
    /// Spreadsheet ID or a full spreadsheet URL
    pub spreadsheet: String,
    pub sheet: String,
    #[serde(alias = "x_axis")]
    pub column: String,
    #[serde(alias = "y_axis")]
    pub row: u32,
}

impl Setting {
    fn validate(&self, name: &str) -> common::Result<()> {
        if self.spreadsheet.trim().is_empty() {
            return Err(common::Error::Config(format!(
                "setting '{name}': spreadsheet must not be empty"
            )));
        }
        if self.sheet.trim().is_empty() {
            return Err(common::Error::Config(format!(
                "setting '{name}': sheet must not be empty"
            )));
        }
        if self.column.is_empty() || !self.column.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(common::Error::Config(format!(
                "setting '{name}': column must be letters like \"B\" or \"AA\", got {:?}",
                self.column
            )));
        }
        if self.row == 0 {
            return Err(common::Error::Config(format!(
                "setting '{name}': row must be greater than 0"
            )));
        }
        Ok(())
    }
}

/// All settings from `config.toml`, ordered by name.
#[derive(Debug, Default)]
pub struct Settings {
    entries: BTreeMap<String, Setting>,
}

impl Settings {
    /// Load and validate the settings file.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| common::Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: BTreeMap<String, Setting> =
            toml::from_str(&contents).map_err(|source| common::Error::Toml {
                path: path.to_path_buf(),
                source,
            })?;

        for (name, setting) in &entries {
            setting.validate(name)?;
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the base directory from CLI arg, `CELL_CLIP_HOME`, or the home
/// directory.
pub fn resolve_base_dir(cli_dir: Option<&str>) -> common::Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(dir) = std::env::var("CELL_CLIP_HOME")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIR_NAME))
        .ok_or_else(|| {
            common::Error::Config(
                "cannot determine home directory; pass --config-dir or set CELL_CLIP_HOME".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn write_settings(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(
            &dir,
            r#"
[budget]
spreadsheet = "https://docs.google.com/spreadsheets/d/1AbC/edit#gid=0"
sheet = "Summary"
column = "B"
row = 4

[rent]
spreadsheet = "1XyZ"
sheet = "Sheet1"
x_axis = "AA"
y_axis = 12
"#,
        );

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.names().collect::<Vec<_>>(), vec!["budget", "rent"]);
        let rent = settings.get("rent").unwrap();
        assert_eq!(rent.column, "AA");
        assert_eq!(rent.row, 12);
        assert!(settings.get("missing").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Settings::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(common::Error::Io { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(&dir, "not valid {{{{ toml");
        assert!(matches!(
            Settings::load(&path),
            Err(common::Error::Toml { .. })
        ));
    }

    #[test]
    fn test_zero_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(
            &dir,
            "[a]\nspreadsheet = \"id\"\nsheet = \"S\"\ncolumn = \"A\"\nrow = 0\n",
        );
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("row must be greater than 0"), "got: {err}");
    }

    #[test]
    fn test_bad_column_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(
            &dir,
            "[a]\nspreadsheet = \"id\"\nsheet = \"S\"\ncolumn = \"B2\"\nrow = 1\n",
        );
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("column must be letters"), "got: {err}");
    }

    #[test]
    fn test_resolve_base_dir_precedence() {
        let _lock = ENV_MUTEX.lock().unwrap();

        unsafe { std::env::set_var("CELL_CLIP_HOME", "/tmp/from-env") };
        assert_eq!(
            resolve_base_dir(Some("/tmp/from-cli")).unwrap(),
            PathBuf::from("/tmp/from-cli")
        );
        assert_eq!(
            resolve_base_dir(None).unwrap(),
            PathBuf::from("/tmp/from-env")
        );

        unsafe { std::env::remove_var("CELL_CLIP_HOME") };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_base_dir(None).unwrap(), home.join(".cell-clip"));
        }
    }
}

//! Per-dataset configuration.
//!
//! A dataset config is a YAML document describing how the files of one
//! dataset are cleaned: where the header sits, which columns to drop or
//! coerce, and which dimensions to factor out. Rules at the top level apply
//! to every file; entries under `files` replace them for files whose name
//! contains the entry's `matches` text.
//!
//! ```yaml
//! keywords: [code, district, total, population, name]
//! drop_columns: [table]
//! integer_columns: [persons, males, females]
//! dimensions:
//!   - column: religion
//!     drop: [district, subdistt]
//! files:
//!   - matches: age
//!     header_rows: [4, 5]
//!     dimensions:
//!       - column: tru
//! ```

use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    describe::ForeignKey, error::ConfigurationError, factorize::DimensionSpec,
    header::DEFAULT_HEADER_KEYWORDS, loader::HeaderSelection,
};

/// How one file is cleaned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRules {
    /// Fixed header row(s); located heuristically when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_rows: Option<HeaderSelection>,
    /// Header keywords used when locating the header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_rows: Option<usize>,
    /// Workbook sheet name or zero-based index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Treat every workbook sheet as one region of a single table.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub combine_sheets: bool,
    /// Destination name overriding the one derived from the file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integer_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    /// Links to tables persisted by earlier files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
}

impl FileRules {
    pub fn keywords(&self) -> Vec<String> {
        self.keywords.clone().unwrap_or_else(|| {
            DEFAULT_HEADER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect()
        })
    }

    fn validate(&self, scope: &str) -> Result<(), ConfigurationError> {
        let invalid = |message: String| ConfigurationError::Invalid(format!("{scope}: {message}"));
        if self.preview_rows == Some(0) {
            return Err(invalid("preview_rows must be at least 1".to_string()));
        }
        if let Some(HeaderSelection::Rows(rows)) = &self.header_rows
            && rows.is_empty()
        {
            return Err(invalid("header_rows cannot be an empty list".to_string()));
        }
        let mut lookups = HashSet::new();
        for dimension in &self.dimensions {
            if dimension.column.trim().is_empty() {
                return Err(invalid("dimension column cannot be empty".to_string()));
            }
            let name = dimension.lookup_table_name();
            if !lookups.insert(name.clone()) {
                return Err(invalid(format!(
                    "lookup table '{name}' is produced by more than one dimension"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOverride {
    /// Case-insensitive text searched for in the file name.
    pub matches: String,
    #[serde(flatten)]
    pub rules: FileRules,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(flatten)]
    pub defaults: FileRules,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileOverride>,
}

impl DatasetConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let file = File::open(path).map_err(|source| ConfigurationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DatasetConfig =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| {
                ConfigurationError::ConfigParse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.defaults.validate("defaults")?;
        for entry in &self.files {
            if entry.matches.trim().is_empty() {
                return Err(ConfigurationError::Invalid(
                    "file override with empty 'matches'".to_string(),
                ));
            }
            entry.rules.validate(&format!("files[{}]", entry.matches))?;
        }
        Ok(())
    }

    /// Rules for `path`: the first override whose `matches` occurs in the
    /// file name, otherwise the defaults.
    pub fn rules_for(&self, path: &Path) -> &FileRules {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.files
            .iter()
            .find(|entry| file_name.contains(&entry.matches.to_lowercase()))
            .map(|entry| &entry.rules)
            .unwrap_or(&self.defaults)
    }
}

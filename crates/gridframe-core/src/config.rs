//! Per-call option values and their TOML form
//!
//! Every operation receives its options explicitly. [`EngineConfig`] groups
//! them so a caller can keep defaults in a file:
//!
//! ```toml
//! [search]
//! max = 100
//!
//! [search.parallel]
//! num_threads = 1
//!
//! [interpolate]
//! strategy = "linear"
//! region = "interior"
//!
//! [csv]
//! missing_token = "NA"
//! dictate = { price = "float64", when = "time" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};
use crate::interpolate::{Direction, Region, Strategy};
use crate::parallel::ParallelConfig;
use crate::range::Range;
use crate::value::ColumnType;

/// Options for [`search`](crate::search::search)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Rows to scan
    pub range: Range,
    /// Stop after this many matches
    pub max: Option<usize>,
    pub parallel: ParallelConfig,
}

impl SearchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Options for [`interpolate`](crate::interpolate::interpolate)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolateOptions {
    pub range: Range,
    pub strategy: Strategy,
    pub direction: Direction,
    pub region: Region,
    /// Most consecutive missing values filled per run
    pub limit: Option<usize>,
}

impl InterpolateOptions {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Default spelling of a missing cell in CSV text
pub const DEFAULT_MISSING_TOKEN: &str = "NaN";

/// Options for the CSV reader and writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub has_header: bool,
    pub delimiter: char,
    /// Text written for, and read as, a missing cell
    pub missing_token: String,
    /// Column type per column name; other columns import as strings
    pub dictate: BTreeMap<String, ColumnType>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: ',',
            missing_token: DEFAULT_MISSING_TOKEN.to_string(),
            dictate: BTreeMap::new(),
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_missing_token(mut self, token: impl Into<String>) -> Self {
        self.missing_token = token.into();
        self
    }

    /// Import the named column as `column_type`
    #[must_use]
    pub fn dictate(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.dictate.insert(name.into(), column_type);
        self
    }

    /// The delimiter as the single byte the CSV codec expects
    ///
    /// # Errors
    /// Returns `Config` for a non-ASCII delimiter
    pub fn delimiter_byte(&self) -> DataResult<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                DataError::Config(format!("delimiter {:?} is not ASCII", self.delimiter))
            })
    }
}

/// Defaults for every operation, loadable from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchOptions,
    pub interpolate: InterpolateOptions,
    pub csv: CsvOptions,
}

impl EngineConfig {
    /// Parse a configuration; absent sections and keys keep their defaults
    ///
    /// # Errors
    /// Returns `Config` on malformed TOML or unknown enum names
    pub fn from_toml_str(content: &str) -> DataResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.csv.delimiter_byte()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    ///
    /// # Errors
    /// Returns `Config` if serialization fails
    pub fn to_toml_string(&self) -> DataResult<String> {
        toml::to_string_pretty(self).map_err(|e| DataError::Config(e.to_string()))
    }
}

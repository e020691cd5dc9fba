//! Adapter configuration.
//!
//! Loaded from the `datatables` section of a [`Figment`]; a missing section
//! yields the defaults.
//!
//! ```yaml
//! datatables:
//!   max_page_length: 500
//!   value_separator: "+"
//!   case_insensitive: true
//! ```

use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Figment key holding the adapter configuration.
pub const CONFIG_KEY: &str = "datatables";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataTablesConfig {
    /// Upper bound on rows per page, also applied to "all rows" requests.
    #[serde(default)]
    pub max_page_length: Option<u64>,
    /// Splits a column search value into an IN list (`a+b+c`).
    #[serde(default = "default_value_separator")]
    pub value_separator: String,
    /// Lower-case both sides of text searches.
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

impl Default for DataTablesConfig {
    fn default() -> Self {
        Self {
            max_page_length: None,
            value_separator: default_value_separator(),
            case_insensitive: default_case_insensitive(),
        }
    }
}

impl DataTablesConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        if figment.find_value(CONFIG_KEY).is_err() {
            tracing::debug!("No datatables configuration; using defaults");
            return Ok(Self::default());
        }

        let cfg: Self = figment
            .extract_inner(CONFIG_KEY)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.value_separator.is_empty() {
            return Err(Error::InvalidConfig(
                "value_separator must not be empty".into(),
            ));
        }
        if self.max_page_length == Some(0) {
            return Err(Error::InvalidConfig(
                "max_page_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_value_separator() -> String {
    "+".to_string()
}

fn default_case_insensitive() -> bool {
    true
}

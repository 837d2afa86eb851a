//! Settings - Tunables for presenters and views.
//!
//! Settings are plain data read once at startup. Every field has a default so
//! a partial (or empty) JSON document is valid.
//!
//! ```ignore
//! let settings = Settings::from_json_str(r#"{ "blankPointType": "taxi" }"#)?;
//! assert_eq!(settings.default_sort, SortKind::Day);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};
use crate::types::{PointType, SortKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Sort key restored on MAJOR updates and on "create new".
    pub default_sort: SortKind,
    /// Type preselected in a blank "new point" form.
    pub blank_point_type: PointType,
    /// `chrono` format used by the form's date inputs.
    pub form_date_format: String,
    /// Route titles with more destinations than this collapse to the first and last destination.
    pub route_title_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_sort: SortKind::Day,
            blank_point_type: PointType::Flight,
            form_date_format: "%d/%m/%y %H:%M".to_string(),
            route_title_limit: 3,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|err| TripError::Config(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_sort.is_enabled() {
            return Err(TripError::Config(format!(
                "default sort `{}` cannot be selected",
                self.default_sort.as_str()
            )));
        }
        if self.form_date_format.trim().is_empty() {
            return Err(TripError::Config("form date format is empty".to_string()));
        }
        if self.route_title_limit < 2 {
            return Err(TripError::Config(
                "route title limit must keep at least two destinations".to_string(),
            ));
        }
        Ok(())
    }
}

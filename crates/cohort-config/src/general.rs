//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_start_date() -> String {
    String::from("30daysAgo")
}

fn default_end_date() -> String {
    String::from("today")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Start of the report window when no `--start` is given.
    #[serde(default = "default_start_date")]
    pub default_start_date: String,

    /// End of the report window when no `--end` is given.
    #[serde(default = "default_end_date")]
    pub default_end_date: String,

    /// Retain member lists in overlap reports by default.
    #[serde(default)]
    pub keep_members: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_start_date: default_start_date(),
            default_end_date: default_end_date(),
            keep_members: false,
        }
    }
}

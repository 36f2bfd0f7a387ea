//! Output format of the `hyprload` tracing subscriber.
//!
//! Accepted spellings are `compact` and `json`, case-insensitive, from the
//! config file, `HYPRLOAD_LOG_FORMAT`, or `--log-format`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How log events are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for running under a session logger.
    Json,
    /// One terse line per event, for reading in a terminal.
    #[default]
    Compact,
}

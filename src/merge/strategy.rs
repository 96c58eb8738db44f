use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Replace every existing client entry with the harvested servers
    Cover,
    /// Append the harvested servers after the existing entries
    Add,
    /// Leave the client configuration untouched
    None,
}

impl MergeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Add => "add",
            Self::None => "none",
        }
    }

    /// Whether this mode writes to the client configuration at all.
    pub const fn touches_target(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cover" => Ok(Self::Cover),
            "add" => Ok(Self::Add),
            "none" => Ok(Self::None),
            other => Err(format!("unknown merge mode '{other}' (expected cover, add or none)")),
        }
    }
}

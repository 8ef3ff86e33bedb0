use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Who may read an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Public,
    Private,
    /// Only the roles listed in `allowed_roles`.
    Restricted,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::Private => "private",
            AccessLevel::Restricted => "restricted",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "public" => AccessLevel::Public,
            "private" => AccessLevel::Private,
            "restricted" => AccessLevel::Restricted,
            _ => anyhow::bail!("unknown access level: {s}"),
        })
    }
}

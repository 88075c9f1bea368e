//! Platform, disk and discipline vocabularies used when building a context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system family, used to pick a default drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Mac,
    Other,
}

impl Platform {
    /// Detect the platform this binary was built for.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS name as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "macos" => Self::Mac,
            _ => Self::Other,
        }
    }

    /// Root under which pipelines live when no drive is given.
    pub fn default_drive(&self) -> Option<&'static str> {
        match self {
            Self::Windows => Some("C:/"),
            Self::Linux | Self::Mac => Some("/home/"),
            Self::Other => None,
        }
    }
}

/// Error returned when a name does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: String,
}

/// Storage disks a pipeline spreads its data over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskType {
    Code,
    Config,
    Data,
    Render,
    Store,
    Work,
}

impl DiskType {
    const VARIANTS: [DiskType; 6] = [
        DiskType::Code,
        DiskType::Config,
        DiskType::Data,
        DiskType::Render,
        DiskType::Store,
        DiskType::Work,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Config => "config",
            Self::Data => "data",
            Self::Render => "render",
            Self::Store => "store",
            Self::Work => "work",
        }
    }
}

impl fmt::Display for DiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::VARIANTS
            .into_iter()
            .find(|disk| disk.as_str() == lower)
            .ok_or_else(|| ParseEnumError {
                kind: "disk type",
                value: s.to_string(),
                expected: Self::VARIANTS.map(|d| d.as_str()).join(", "),
            })
    }
}

/// Production disciplines, each with a long and a short name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Modeling,
    Shading,
    Rigging,
    Layout,
    Animation,
    Lighting,
    Compositing,
}

impl Discipline {
    pub const ALL: [Discipline; 7] = [
        Discipline::Modeling,
        Discipline::Shading,
        Discipline::Rigging,
        Discipline::Layout,
        Discipline::Animation,
        Discipline::Lighting,
        Discipline::Compositing,
    ];

    pub fn long(&self) -> &'static str {
        match self {
            Self::Modeling => "modeling",
            Self::Shading => "shading",
            Self::Rigging => "rigging",
            Self::Layout => "layout",
            Self::Animation => "animation",
            Self::Lighting => "lighting",
            Self::Compositing => "compositing",
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            Self::Modeling => "mdl",
            Self::Shading => "surf",
            Self::Rigging => "rig",
            Self::Layout => "lay",
            Self::Animation => "ani",
            Self::Lighting => "lit",
            Self::Compositing => "comp",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long())
    }
}

impl FromStr for Discipline {
    type Err = ParseEnumError;

    /// Accepts either the long or the short name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.long() == lower || d.short() == lower)
            .ok_or_else(|| ParseEnumError {
                kind: "discipline",
                value: s.to_string(),
                expected: Self::ALL.map(|d| d.long()).join(", "),
            })
    }
}

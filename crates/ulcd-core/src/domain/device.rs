//! Device-level value types: colours and firmware identification.

use serde::{Deserialize, Serialize};

/// A 16-bit RGB565 colour as understood by the graphics processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Colour(pub u16);

impl Colour {
    pub const BLACK: Colour = Colour(0x0000);
    pub const WHITE: Colour = Colour(0xFFFF);
    pub const RED: Colour = Colour(0xF800);
    pub const GREEN: Colour = Colour(0x07E0);
    pub const BLUE: Colour = Colour(0x001F);
}

/// Model name and firmware versions reported by the module.
///
/// Versions are reported as a 16-bit word: high byte major, low byte minor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub model: String,
    pub spe_version: u16,
    pub pmmc_version: u16,
}

impl VersionInfo {
    /// Formats a version word as `major.minor`.
    pub fn format_version(word: u16) -> String {
        format!("{}.{}", word >> 8, word & 0xFF)
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "model: {}", self.model)?;
        writeln!(f, "SPE:   {}", Self::format_version(self.spe_version))?;
        write!(f, "PmmC:  {}", Self::format_version(self.pmmc_version))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

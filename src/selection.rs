use std::fmt;
use std::str::FromStr;

/// A parsed switcher control value: the `off` sentinel, or a zero-based
/// index into the stylesheet registry.
///
/// Raw control values are parsed exactly once at the boundary (CLI flag or
/// control read); everything past that point carries `Selection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Off,
    Index(u32),
}

impl Selection {
    pub fn is_off(self) -> bool {
        matches!(self, Selection::Off)
    }
}

impl FromStr for Selection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim();
        if v.is_empty() {
            anyhow::bail!("empty selection; expected `off` or a registry index");
        }
        // The sentinel comparison is case-sensitive, matching the control's
        // fixed `off` option value.
        if v == "off" {
            return Ok(Selection::Off);
        }
        let index: u32 = v
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid selection {:?}; expected `off` or a registry index", v))?;
        Ok(Selection::Index(index))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Off => f.write_str("off"),
            Selection::Index(i) => write!(f, "{}", i),
        }
    }
}

//! Layout tuning knobs.
//!
//! [`LayoutConfig`] is the user-facing, partially-specified form (every field optional, loadable
//! from JSON). [`Spacing`] is what the algorithms consume: the config resolved against the
//! defaults for one [`LayoutKind`].

use crate::{Error, Result};
use onelook_core::LayoutKind;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HORIZONTAL_GAP: f64 = 60.0;
pub const MIND_VERTICAL_GAP: f64 = 20.0;
pub const TREE_VERTICAL_GAP: f64 = 24.0;
pub const ORG_VERTICAL_GAP: f64 = 60.0;
pub const DEFAULT_NODE_WIDTH: f64 = 120.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 40.0;

/// Which side(s) of the root the mind layout grows towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Right,
    Left,
    Both,
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" => Ok(Self::Right),
            "left" => Ok(Self::Left),
            "both" => Ok(Self::Both),
            other => Err(Error::InvalidConfig {
                message: format!("unknown direction `{other}`"),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LayoutConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_gap: Option<f64>,
    /// Nominal node width; only fishbone uses it for spine spacing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_width: Option<f64>,
    /// Nominal node height; fishbone steps branches by this amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_height: Option<f64>,
    pub direction: Direction,
}

impl LayoutConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects negative or non-finite values.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("horizontalGap", self.horizontal_gap),
            ("verticalGap", self.vertical_gap),
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
        ];
        for (name, value) in fields {
            match value {
                Some(v) if !(v.is_finite() && v >= 0.0) => {
                    return Err(Error::InvalidConfig {
                        message: format!("`{name}` must be a non-negative number, got {v}"),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Fills unset fields with the defaults for `kind`. Invalid values fall back to defaults too.
    pub fn resolve(&self, kind: LayoutKind) -> Spacing {
        let defaults = Spacing::defaults(kind);
        let pick = |value: Option<f64>, fallback: f64| {
            value
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(fallback)
        };
        Spacing {
            horizontal_gap: pick(self.horizontal_gap, defaults.horizontal_gap),
            vertical_gap: pick(self.vertical_gap, defaults.vertical_gap),
            node_width: pick(self.node_width, defaults.node_width),
            node_height: pick(self.node_height, defaults.node_height),
            direction: self.direction,
        }
    }
}

/// Fully resolved spacing for one algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub node_width: f64,
    pub node_height: f64,
    pub direction: Direction,
}

impl Spacing {
    pub fn defaults(kind: LayoutKind) -> Self {
        let vertical_gap = match kind {
            LayoutKind::Mind => MIND_VERTICAL_GAP,
            LayoutKind::Tree | LayoutKind::Fishbone => TREE_VERTICAL_GAP,
            LayoutKind::Org => ORG_VERTICAL_GAP,
        };
        Self {
            horizontal_gap: DEFAULT_HORIZONTAL_GAP,
            vertical_gap,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            direction: Direction::Right,
        }
    }
}

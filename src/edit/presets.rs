//! Button and icon style presets.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tree::{ElementKind, ElementTree};

/// Button color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Outline,
    Ghost,
    Danger,
    Success,
}

impl ButtonVariant {
    pub const ALL: [ButtonVariant; 6] = [
        Self::Primary,
        Self::Secondary,
        Self::Outline,
        Self::Ghost,
        Self::Danger,
        Self::Success,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Outline => "outline",
            Self::Ghost => "ghost",
            Self::Danger => "danger",
            Self::Success => "success",
        }
    }

    /// `(backgroundColor, color, border, fontWeight)`
    fn styles(self) -> [(&'static str, &'static str); 4] {
        let (background, color, border, weight) = match self {
            Self::Primary => ("#e0ac7e", "#fff", "none", "600"),
            Self::Secondary => ("#374151", "#fff", "none", "500"),
            Self::Outline => ("transparent", "#e0ac7e", "2px solid #e0ac7e", "500"),
            Self::Ghost => ("transparent", "#9ca3af", "none", "500"),
            Self::Danger => ("#dc2626", "#fff", "none", "600"),
            Self::Success => ("#059669", "#fff", "none", "600"),
        };
        [
            ("backgroundColor", background),
            ("color", color),
            ("border", border),
            ("fontWeight", weight),
        ]
    }

    fn class(self) -> String {
        format!("btn-{}", self.as_str())
    }
}

/// Button padding and font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Sm,
    Md,
    Lg,
    Xl,
}

impl ButtonSize {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sm" => Some(Self::Sm),
            "md" => Some(Self::Md),
            "lg" => Some(Self::Lg),
            "xl" => Some(Self::Xl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }

    /// `(padding, fontSize)`
    fn metrics(self) -> (&'static str, &'static str) {
        match self {
            Self::Sm => ("0.5rem 1rem", "0.875rem"),
            Self::Md => ("0.75rem 1.5rem", "1rem"),
            Self::Lg => ("1rem 2rem", "1.125rem"),
            Self::Xl => ("1.25rem 2.5rem", "1.25rem"),
        }
    }
}

/// Icon glyph size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconSize {
    #[serde(rename = "sm")]
    Sm,
    #[serde(rename = "md")]
    Md,
    #[serde(rename = "lg")]
    Lg,
    #[serde(rename = "xl")]
    Xl,
    #[serde(rename = "2xl")]
    Xl2,
    #[serde(rename = "3xl")]
    Xl3,
}

impl IconSize {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sm" => Some(Self::Sm),
            "md" => Some(Self::Md),
            "lg" => Some(Self::Lg),
            "xl" => Some(Self::Xl),
            "2xl" => Some(Self::Xl2),
            "3xl" => Some(Self::Xl3),
            _ => None,
        }
    }

    pub fn font_size(self) -> &'static str {
        match self {
            Self::Sm => "1rem",
            Self::Md => "1.5rem",
            Self::Lg => "2rem",
            Self::Xl => "2.5rem",
            Self::Xl2 => "3rem",
            Self::Xl3 => "4rem",
        }
    }
}

impl ElementTree {
    /// Restyle a button with a color preset.
    ///
    /// The previous `btn-<variant>` class is swapped for the new one and the
    /// variant name is stored on the element.
    pub fn apply_button_variant(&mut self, id: &str, variant: ButtonVariant) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let before = node.clone();
        match &mut node.kind {
            ElementKind::Button { variant: stored, .. } => {
                *stored = Some(variant.as_str().to_string());
            }
            _ => {
                return Err(Error::InvalidProperty {
                    path: "buttonVariant".to_string(),
                    element_type: before.element_type().to_string(),
                });
            }
        }
        for other in ButtonVariant::ALL {
            node.classes.remove(&other.class());
        }
        node.classes.add("btn");
        node.classes.add(&variant.class());
        for (key, value) in variant.styles() {
            node.styles.set(key, value);
        }
        Ok(*node != before)
    }

    /// Resize a button with a padding preset.
    pub fn apply_button_size(&mut self, id: &str, size: ButtonSize) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let before = node.clone();
        match &mut node.kind {
            ElementKind::Button { size: stored, .. } => {
                *stored = Some(size.as_str().to_string());
            }
            _ => {
                return Err(Error::InvalidProperty {
                    path: "buttonSize".to_string(),
                    element_type: before.element_type().to_string(),
                });
            }
        }
        let (padding, font_size) = size.metrics();
        node.styles.set("padding", padding);
        node.styles.set("fontSize", font_size);
        Ok(*node != before)
    }

    /// Set an icon's font size from a preset.
    pub fn apply_icon_size(&mut self, id: &str, size: IconSize) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        if !matches!(node.kind, ElementKind::Icon { .. }) {
            return Err(Error::InvalidProperty {
                path: "styles.fontSize".to_string(),
                element_type: node.element_type().to_string(),
            });
        }
        let changed = node.styles.get("fontSize") != Some(size.font_size());
        node.styles.set("fontSize", size.font_size());
        Ok(changed)
    }
}

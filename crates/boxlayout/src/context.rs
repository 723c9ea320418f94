//! Per-pass configuration threaded explicitly into measurement.

use geom::{LayoutConstraint, Size};
use serde::{Deserialize, Serialize};

/// Reading direction used to resolve start/end.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    /// Inherit from the layout context.
    #[default]
    Auto,
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

/// Inputs that would otherwise be process-wide lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutContext {
    /// Size of the root viewport. Bounds the root when no constraint is given.
    pub viewport: Size,
    /// Default reading direction.
    pub text_direction: TextDirection,
    /// Reference for root percentages. Defaults to the viewport.
    pub percent_reference: Option<Size>,
    /// Density scale for `vp` units.
    pub scale: f32,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            viewport: Size::ZERO,
            text_direction: TextDirection::Ltr,
            percent_reference: None,
            scale: 1.0,
        }
    }
}

impl LayoutContext {
    /// A context for the given viewport with default direction and scale.
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Set the reading direction.
    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = direction;
        self
    }

    /// The constraint synthesized for a node measured without one.
    pub fn root_constraint(&self) -> LayoutConstraint {
        LayoutConstraint::root(
            self.viewport,
            self.percent_reference.unwrap_or(self.viewport),
            self.scale,
        )
    }

    /// Resolve a node's declared direction, falling back to this context.
    pub fn resolve_direction(&self, declared: TextDirection) -> TextDirection {
        match declared {
            TextDirection::Auto => match self.text_direction {
                TextDirection::Rtl => TextDirection::Rtl,
                TextDirection::Auto | TextDirection::Ltr => TextDirection::Ltr,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resolves_through_context() {
        let cx = LayoutContext::new(Size::new(10.0, 10.0)).with_direction(TextDirection::Rtl);
        assert_eq!(cx.resolve_direction(TextDirection::Auto), TextDirection::Rtl);
        assert_eq!(cx.resolve_direction(TextDirection::Ltr), TextDirection::Ltr);
        let cx = LayoutContext {
            text_direction: TextDirection::Auto,
            ..LayoutContext::default()
        };
        assert_eq!(cx.resolve_direction(TextDirection::Auto), TextDirection::Ltr);
    }

    #[test]
    fn root_constraint_bounds_viewport() {
        let cx = LayoutContext::new(Size::new(720.0, 1280.0));
        let c = cx.root_constraint();
        assert_eq!(c.max_size, Size::new(720.0, 1280.0));
        assert_eq!(c.percent_reference, Size::new(720.0, 1280.0));
        assert_eq!(c.min_size, Size::ZERO);
    }
}

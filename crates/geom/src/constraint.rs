use serde::{Deserialize, Serialize};

use super::{Axis, Edges, OptionalSize, Size, is_infinite};

/// Input constraint for one node's measurement.
///
/// `min_size <= resolved size <= max_size` on every axis, except where
/// `max_size` holds the infinite sentinel. `self_ideal` forces an extent on
/// an axis; `parent_ideal` carries the parent's forced content extent, used
/// by match-parent sizing. `percent_reference` is the length that percentage
/// dimensions resolve against, and `scale` converts density-independent
/// units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConstraint {
    /// Lower bound on the resolved size.
    pub min_size: Size,
    /// Upper bound on the resolved size.
    pub max_size: Size,
    /// Forced extents, overriding content sizing on the axes that are set.
    pub self_ideal: OptionalSize,
    /// The parent's forced content extents.
    pub parent_ideal: OptionalSize,
    /// Reference for percentage lengths.
    pub percent_reference: Size,
    /// Density scale for `vp` lengths.
    pub scale: f32,
}

impl Default for LayoutConstraint {
    fn default() -> Self {
        Self {
            min_size: Size::ZERO,
            max_size: Size::INFINITE,
            self_ideal: OptionalSize::default(),
            parent_ideal: OptionalSize::default(),
            percent_reference: Size::INFINITE,
            scale: 1.0,
        }
    }
}

impl LayoutConstraint {
    /// A root constraint bounded by the viewport.
    pub fn root(viewport: Size, percent_reference: Size, scale: f32) -> Self {
        Self {
            max_size: viewport,
            percent_reference,
            scale,
            ..Self::default()
        }
    }

    /// A constraint that forces exactly `size`.
    pub fn exact(size: Size) -> Self {
        Self {
            min_size: size,
            max_size: size,
            self_ideal: size.into(),
            percent_reference: size,
            ..Self::default()
        }
    }

    /// True if the upper bound on `axis` is the infinite sentinel.
    pub fn is_unbounded(&self, axis: Axis) -> bool {
        is_infinite(self.max_size.main(axis))
    }

    /// Clamp a size into this constraint's bounds.
    pub fn clamp(&self, size: Size) -> Size {
        size.clamp(self.min_size, self.max_size)
    }

    /// The forced size on each set axis, clamped into bounds.
    pub fn ideal_size(&self) -> OptionalSize {
        let clamp = |v: Option<f32>, lo: f32, hi: f32| v.map(|v| v.min(hi).max(lo.min(hi)));
        OptionalSize {
            width: clamp(
                self.self_ideal.width,
                self.min_size.width,
                self.max_size.width,
            ),
            height: clamp(
                self.self_ideal.height,
                self.min_size.height,
                self.max_size.height,
            ),
        }
    }

    /// Force the extent along `axis`.
    pub fn set_ideal_main(&mut self, axis: Axis, value: f32) {
        self.self_ideal.set_main(axis, value);
    }

    /// Force the extent perpendicular to `axis`.
    pub fn set_ideal_cross(&mut self, axis: Axis, value: f32) {
        self.self_ideal.set_cross(axis, value);
    }

    /// Shrink every bound by `edges`, saturating at zero.
    pub fn deflate(&self, edges: Edges) -> Self {
        let shrink_opt = |v: Option<f32>, by: f32| v.map(|v| (v - by).max(0.0));
        Self {
            min_size: self.min_size.deflate(edges),
            max_size: self.max_size.deflate(edges),
            self_ideal: OptionalSize {
                width: shrink_opt(self.self_ideal.width, edges.horizontal()),
                height: shrink_opt(self.self_ideal.height, edges.vertical()),
            },
            parent_ideal: self.parent_ideal,
            percent_reference: self.percent_reference,
            scale: self.scale,
        }
    }

    /// Build the constraint handed to children.
    ///
    /// Children may use up to this node's ideal size (or its max size on
    /// axes without one), less `padding`. Minimums are dropped and the
    /// child's own ideal size is left unset.
    pub fn child_constraint(&self, padding: Edges) -> Self {
        let ideal = self.ideal_size();
        let content_max = ideal.unwrap_or(self.max_size).deflate(padding);
        let parent_ideal = OptionalSize {
            width: ideal.width.map(|w| (w - padding.horizontal()).max(0.0)),
            height: ideal.height.map(|h| (h - padding.vertical()).max(0.0)),
        };
        Self {
            min_size: Size::ZERO,
            max_size: content_max,
            self_ideal: OptionalSize::default(),
            parent_ideal,
            percent_reference: content_max,
            scale: self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_constraint_uses_ideal_less_padding() {
        let mut c = LayoutConstraint::root(Size::new(400.0, 300.0), Size::new(400.0, 300.0), 1.0);
        c.self_ideal.width = Some(200.0);
        let child = c.child_constraint(Edges::all(10.0));
        assert_eq!(child.max_size, Size::new(180.0, 280.0));
        assert_eq!(child.parent_ideal.width, Some(180.0));
        assert_eq!(child.parent_ideal.height, None);
        assert_eq!(child.min_size, Size::ZERO);
        assert!(child.self_ideal.is_empty());
    }

    #[test]
    fn ideal_is_clamped() {
        let mut c = LayoutConstraint::root(Size::new(100.0, 100.0), Size::ZERO, 1.0);
        c.self_ideal = OptionalSize::new(150.0, 50.0);
        assert_eq!(c.ideal_size(), OptionalSize::new(100.0, 50.0));
    }

    #[test]
    fn infinite_bounds_survive_deflate() {
        let c = LayoutConstraint::default().deflate(Edges::all(4.0));
        assert!(c.is_unbounded(Axis::Horizontal));
        assert!(c.is_unbounded(Axis::Vertical));
    }
}

use serde::{Deserialize, Serialize};

/// A declared length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Physical pixels.
    Px(f32),
    /// Density-independent pixels, scaled by the constraint's scale factor.
    Vp(f32),
    /// Fraction of the reference length, where `1.0` is 100%.
    Percent(f32),
}

impl Dimension {
    /// Resolve against a reference length and density scale.
    ///
    /// Returns `None` for a percentage of an unbounded reference.
    pub fn resolve(self, reference: f32, scale: f32) -> Option<f32> {
        match self {
            Self::Px(v) => Some(v),
            Self::Vp(v) => Some(v * scale),
            Self::Percent(p) => {
                if super::is_infinite(reference) {
                    None
                } else {
                    Some(reference * p)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_units() {
        assert_eq!(Dimension::Px(12.0).resolve(100.0, 2.0), Some(12.0));
        assert_eq!(Dimension::Vp(12.0).resolve(100.0, 2.0), Some(24.0));
        assert_eq!(Dimension::Percent(0.2).resolve(720.0, 1.0), Some(144.0));
        assert_eq!(Dimension::Percent(0.2).resolve(f32::INFINITY, 1.0), None);
    }
}

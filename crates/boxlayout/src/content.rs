//! Leaf content measurement.

use std::fmt;

use geom::{LayoutConstraint, Size};

/// Measures a node's own content, independent of its children.
pub trait Content {
    /// Natural content size under `constraint`, excluding padding and border.
    fn measure(&mut self, constraint: &LayoutConstraint) -> Size;

    /// Distance from the content top to its text baseline.
    fn baseline(&self, _size: Size) -> Option<f32> {
        None
    }
}

impl fmt::Debug for dyn Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Content")
    }
}

/// Content with a fixed natural size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedContent {
    /// Natural size.
    pub size: Size,
    /// Optional baseline from the top.
    pub baseline: Option<f32>,
}

impl FixedContent {
    /// Fixed content without a baseline.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            baseline: None,
        }
    }

    /// Set the baseline.
    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.baseline = Some(baseline);
        self
    }
}

impl Content for FixedContent {
    fn measure(&mut self, _constraint: &LayoutConstraint) -> Size {
        self.size
    }

    fn baseline(&self, _size: Size) -> Option<f32> {
        self.baseline
    }
}

/// A run of fixed-advance glyphs that wraps at the available width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextContent {
    /// Number of glyphs.
    pub glyphs: usize,
    /// Advance of one glyph.
    pub glyph_width: f32,
    /// Height of one line.
    pub line_height: f32,
    /// Baseline distance from the top of the first line.
    pub ascent: f32,
}

impl Content for TextContent {
    fn measure(&mut self, constraint: &LayoutConstraint) -> Size {
        if self.glyphs == 0 || self.glyph_width <= 0.0 {
            return Size::ZERO;
        }
        let avail = constraint
            .ideal_size()
            .width
            .unwrap_or(constraint.max_size.width);
        let full = self.glyphs as f32 * self.glyph_width;
        if full <= avail {
            return Size::new(full, self.line_height);
        }
        let per_line = ((avail / self.glyph_width).floor() as usize).max(1);
        let lines = self.glyphs.div_ceil(per_line);
        Size::new(
            per_line as f32 * self.glyph_width,
            lines as f32 * self.line_height,
        )
    }

    fn baseline(&self, _size: Size) -> Option<f32> {
        Some(self.ascent)
    }
}

/// Adapts a closure into [`Content`].
pub struct ContentFn<F>(pub F);

impl<F> Content for ContentFn<F>
where
    F: FnMut(&LayoutConstraint) -> Size,
{
    fn measure(&mut self, constraint: &LayoutConstraint) -> Size {
        (self.0)(constraint)
    }
}

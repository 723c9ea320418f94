use geom::{Edges, LayoutConstraint, Offset, Rect, Size};

/// Output of measurement and layout for one node.
///
/// `frame` is the border box. Its offset is relative to the parent's content
/// origin. `content` is the content box relative to the frame origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    /// Border box.
    pub frame: Rect,
    /// Content box inside padding and border.
    pub content: Option<Rect>,
    /// Margin outside the frame.
    pub margin: Edges,
    /// Padding plus border.
    pub padding_border: Edges,
    /// Constraint handed in by the parent on the last measure.
    pub parent_constraint: Option<LayoutConstraint>,
    /// Constraint this node resolved for itself.
    pub layout_constraint: Option<LayoutConstraint>,
    /// Constraint offered to children.
    pub content_constraint: Option<LayoutConstraint>,
    /// Baseline distance from the frame top.
    pub baseline: Option<f32>,
}

impl Geometry {
    /// Frame size including margin.
    pub fn margin_frame_size(&self) -> Size {
        self.frame.size.inflate(self.margin)
    }

    /// Offset of the margin box.
    pub fn margin_frame_offset(&self) -> Offset {
        self.frame.offset - self.margin.top_left()
    }

    /// Position the node by its margin box.
    pub fn set_margin_frame_offset(&mut self, offset: Offset) {
        self.frame.offset = offset + self.margin.top_left();
    }

    /// Set the frame size and derive the content box from it.
    pub fn set_frame_size(&mut self, size: Size) {
        self.frame.size = size;
        self.content = Some(Rect::from_parts(
            self.padding_border.top_left(),
            size.deflate(self.padding_border),
        ));
    }

    /// Size of the content box.
    pub fn content_size(&self) -> Size {
        self.content.map(|c| c.size).unwrap_or_default()
    }

    /// Baseline from the frame top, defaulting to the frame bottom.
    pub fn baseline_distance(&self) -> f32 {
        self.baseline.unwrap_or(self.frame.size.height)
    }

    /// Collapse to an empty box at the origin.
    pub fn collapse(&mut self) {
        self.frame = Rect::default();
        self.content = None;
        self.baseline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_frame_round_trips_offset() {
        let mut g = Geometry {
            margin: Edges::new(1.0, 2.0, 3.0, 4.0),
            padding_border: Edges::all(5.0),
            ..Geometry::default()
        };
        g.set_frame_size(Size::new(20.0, 30.0));
        g.set_margin_frame_offset(Offset::new(10.0, 10.0));
        assert_eq!(g.frame.offset, Offset::new(11.0, 12.0));
        assert_eq!(g.margin_frame_offset(), Offset::new(10.0, 10.0));
        assert_eq!(g.margin_frame_size(), Size::new(24.0, 36.0));
        assert_eq!(g.content, Some(Rect::new(5.0, 5.0, 10.0, 20.0)));
        assert_eq!(g.baseline_distance(), 30.0);
    }
}

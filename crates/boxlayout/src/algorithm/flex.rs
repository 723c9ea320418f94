use std::{collections::BTreeMap, mem};

use geom::{Axis, LayoutConstraint, Offset, Size, is_infinite, near_zero};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AlgorithmState;
use crate::{
    NodeId,
    context::TextDirection,
    pass::LayoutPass,
    props::{CrossAlign, FlexItem},
};

/// Direction of the main axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexDirection {
    /// Reading-direction start to end.
    #[default]
    Row,
    /// Reading-direction end to start.
    RowReverse,
    /// Top to bottom.
    Column,
    /// Bottom to top.
    ColumnReverse,
}

impl FlexDirection {
    /// The main axis.
    pub fn axis(self) -> Axis {
        match self {
            Self::Row | Self::RowReverse => Axis::Horizontal,
            Self::Column | Self::ColumnReverse => Axis::Vertical,
        }
    }

    /// The direction of the cross axis.
    fn cross(self) -> Self {
        match self {
            Self::Row | Self::RowReverse => Self::Column,
            Self::Column | Self::ColumnReverse => Self::Row,
        }
    }

    /// True if items flow from the top-left corner under `text`.
    fn starts_top_left(self, text: TextDirection) -> bool {
        match self {
            Self::Row => text != TextDirection::Rtl,
            Self::RowReverse => text == TextDirection::Rtl,
            Self::Column => true,
            Self::ColumnReverse => false,
        }
    }
}

/// Distribution of free main-axis space.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainAlign {
    /// Pack at the start.
    #[default]
    Start,
    /// Pack in the middle.
    Center,
    /// Pack at the end.
    End,
    /// Free space between items only.
    SpaceBetween,
    /// Equal space around each item.
    SpaceAround,
    /// Equal space between and around items.
    SpaceEvenly,
}

impl MainAlign {
    /// True for the modes that replace the declared item spacing.
    fn distributes_space(self) -> bool {
        matches!(self, Self::SpaceBetween | Self::SpaceAround | Self::SpaceEvenly)
    }
}

/// Flex container parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexParams {
    /// Main axis direction.
    pub direction: FlexDirection,
    /// Free space distribution.
    pub main_align: MainAlign,
    /// Default cross alignment for items.
    pub cross_align: CrossAlign,
    /// Gap between items.
    pub space: f32,
    /// Reading direction; `Auto` uses the layout context.
    pub text_direction: TextDirection,
}

/// Flex accounting kept from measure for layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlexState {
    /// Main-axis length used by kept items and their gaps.
    pub allocated: f32,
    /// Kept in-flow items in child order.
    pub kept: Vec<NodeId>,
    /// Items with an explicit position.
    pub out_of_flow: Vec<NodeId>,
    /// Largest distance above the shared baseline.
    pub max_baseline: f32,
}

/// One in-flow item and the constraint it is measured with.
#[derive(Debug, Clone, Copy)]
struct Item {
    /// Child node.
    id: NodeId,
    /// Flex metadata.
    flex: FlexItem,
    /// Constraint for the item's next measure.
    constraint: LayoutConstraint,
}

/// Items sharing a display priority.
#[derive(Debug, Default)]
struct Group {
    /// Items in child order.
    items: Vec<Item>,
    /// Sum of positive weights.
    weight: f32,
    /// Main-axis length this group added to the allocation.
    added: f32,
    /// Still displayed.
    kept: bool,
}

/// Accumulators for one flex measure.
struct FlexMeasure {
    /// Container parameters.
    params: FlexParams,
    /// Linear defaults in effect.
    linear: bool,
    /// Main axis.
    axis: Axis,
    /// Content extent along the main axis.
    main_size: f32,
    /// Content extent along the cross axis.
    cross_size: f32,
    /// Forced content cross extent.
    ideal_cross: Option<f32>,
    /// Main-axis length allocated so far.
    allocated: f32,
    /// Main axis sized to content; grow and shrink disabled.
    infinite: bool,
    /// Highest display priority among items.
    max_priority: i32,
    /// Sum of positive weights.
    total_weight: f32,
    /// Sum of grow factors of kept items.
    total_grow: f32,
    /// Sum of shrink factors scaled by item size.
    total_shrink: f32,
    /// Items revisited by the grow/shrink/stretch pass.
    secondary: Vec<Item>,
}

impl FlexMeasure {
    /// Item margin-box length along the main axis. Infinite lengths count
    /// as zero.
    fn item_main(&self, pass: &LayoutPass<'_>, id: NodeId) -> f32 {
        let main = pass.geometry(id).margin_frame_size().main(self.axis);
        if is_infinite(main) { 0.0 } else { main }
    }

    /// Item margin-box length along the cross axis.
    fn item_cross(&self, pass: &LayoutPass<'_>, id: NodeId) -> f32 {
        pass.geometry(id).margin_frame_size().cross(self.axis)
    }

    /// Effective cross alignment of an item.
    fn align_of(&self, item: &Item) -> CrossAlign {
        item.flex.align_self.unwrap_or(self.params.cross_align)
    }

    /// Shrink factor, clamped to be non-negative.
    fn shrink_of(&self, item: &Item) -> f32 {
        let default = if self.linear { 0.0 } else { 1.0 };
        item.flex.shrink.unwrap_or(default).max(0.0)
    }

    /// Item constraint with its flex basis forced on the main axis.
    fn with_basis(&self, item: &Item) -> LayoutConstraint {
        let mut constraint = item.constraint;
        let reference = constraint.percent_reference.main(self.axis);
        if let Some(basis) = item
            .flex
            .basis
            .and_then(|b| b.resolve(reference, constraint.scale))
        {
            constraint.set_ideal_main(self.axis, basis);
        }
        constraint
    }

    /// Measure an item and return its main length.
    fn measure_item(&self, pass: &mut LayoutPass<'_>, id: NodeId, c: LayoutConstraint) -> f32 {
        pass.measure(id, Some(c));
        self.item_main(pass, id)
    }

    /// Drop a group from display.
    fn evict(pass: &mut LayoutPass<'_>, group: &mut Group) {
        group.kept = false;
        for item in &group.items {
            pass.set_active(item.id, false);
            pass.collapse(item.id);
        }
    }

    /// Weighted distribution over priority groups.
    fn measure_weighted(&mut self, pass: &mut LayoutPass<'_>, groups: &mut BTreeMap<i32, Group>) {
        let space = self.params.space;
        let mut evicting = false;
        let mut first = true;
        for (priority, group) in groups.iter_mut().rev() {
            if evicting {
                Self::evict(pass, group);
                continue;
            }
            let mut added = 0.0;
            for item in &group.items {
                if item.flex.weight > 0.0 {
                    added += space;
                } else {
                    added += self.measure_item(pass, item.id, item.constraint) + space;
                }
            }
            self.allocated += added;
            group.added = added;
            if self.allocated - space > self.main_size && !first {
                warn!(priority, "weighted group does not fit, evicting");
                self.allocated -= added;
                Self::evict(pass, group);
                evicting = true;
            } else {
                group.kept = true;
            }
            first = false;
        }
        self.allocated -= space;

        let per_weight = loop {
            let kept_weight: f32 = groups.values().filter(|g| g.kept).map(|g| g.weight).sum();
            let per_weight = if near_zero(kept_weight) {
                0.0
            } else {
                (self.main_size - self.allocated) / kept_weight
            };
            let kept_groups = groups.values().filter(|g| g.kept).count();
            if kept_groups <= 1 || !self.share_too_small(pass, groups, per_weight) {
                break per_weight;
            }
            if let Some((priority, lowest)) = groups.iter_mut().find(|(_, g)| g.kept) {
                warn!(priority, "weighted share below item minimum, evicting");
                self.allocated -= lowest.added;
                Self::evict(pass, lowest);
            }
        };

        let remaining = self.main_size - self.allocated;
        let last_weighted = groups
            .values()
            .rev()
            .filter(|g| g.kept)
            .flat_map(|g| g.items.iter())
            .rfind(|i| i.flex.weight > 0.0)
            .map(|i| i.id);
        let mut distributed = 0.0;
        for group in groups.values_mut().rev().filter(|g| g.kept) {
            for item in &mut group.items {
                if item.flex.weight > 0.0 {
                    let share = if Some(item.id) == last_weighted {
                        (remaining - distributed).max(0.0)
                    } else {
                        (per_weight * item.flex.weight).max(0.0)
                    };
                    distributed += share;
                    item.constraint.set_ideal_main(self.axis, share);
                    pass.measure(item.id, Some(item.constraint));
                }
                self.secondary.push(*item);
            }
        }
    }

    /// True if any weighted item's declared minimum exceeds its share.
    fn share_too_small(
        &self,
        pass: &LayoutPass<'_>,
        groups: &BTreeMap<i32, Group>,
        per_weight: f32,
    ) -> bool {
        groups
            .values()
            .filter(|g| g.kept)
            .flat_map(|g| g.items.iter())
            .filter(|i| i.flex.weight > 0.0)
            .any(|item| {
                let Some(props) = pass.props(item.id) else {
                    return false;
                };
                let declared = match self.axis {
                    Axis::Horizontal => props.min_width,
                    Axis::Vertical => props.min_height,
                };
                let reference = item.constraint.percent_reference.main(self.axis);
                declared
                    .and_then(|d| d.resolve(reference, item.constraint.scale))
                    .is_some_and(|min| min + props.margin.along(self.axis) > per_weight * item.flex.weight)
            })
    }

    /// Drop whole low-priority groups that overflow.
    fn measure_by_priority(&mut self, pass: &mut LayoutPass<'_>, groups: &mut BTreeMap<i32, Group>) {
        let space = self.params.space;
        let mut evicting = false;
        let mut first = true;
        for (priority, group) in groups.iter_mut().rev() {
            if evicting {
                Self::evict(pass, group);
                continue;
            }
            let mut added = 0.0;
            let mut grow = 0.0;
            for item in &mut group.items {
                item.constraint = self.with_basis(item);
                added += self.measure_item(pass, item.id, item.constraint) + space;
                grow += item.flex.grow.max(0.0);
            }
            self.allocated += added;
            if self.allocated - space > self.main_size && !first {
                warn!(priority, "priority group does not fit, evicting");
                self.allocated -= added;
                Self::evict(pass, group);
                evicting = true;
            } else {
                group.kept = true;
                self.total_grow += grow;
                self.secondary.extend(group.items.iter().copied());
            }
            first = false;
        }
        self.allocated -= space;
    }

    /// Measure every item at its basis and total the flex factors.
    fn measure_plain(&mut self, pass: &mut LayoutPass<'_>, groups: &mut BTreeMap<i32, Group>) {
        for group in groups.values_mut().rev() {
            group.kept = true;
            for item in &mut group.items {
                item.constraint = self.with_basis(item);
                let main = self.measure_item(pass, item.id, item.constraint);
                self.allocated += main + self.params.space;
                if !self.infinite {
                    self.total_grow += item.flex.grow.max(0.0);
                    self.total_shrink += self.shrink_of(item) * main;
                }
                self.secondary.push(*item);
            }
        }
        self.allocated -= self.params.space;
    }

    /// Grow, shrink and stretch re-measurement.
    fn secondary_measure(&mut self, pass: &mut LayoutPass<'_>) {
        let remain = self.main_size - self.allocated;
        let use_grow = remain >= 0.0 || self.max_priority > 1;
        let total = if use_grow { self.total_grow } else { self.total_shrink };
        let per_flex = if near_zero(total) { 0.0 } else { remain / total };
        let distribute = self.total_weight <= 0.0 && !self.infinite;
        let factor = |m: &Self, item: &Item| {
            if use_grow { item.flex.grow.max(0.0) } else { m.shrink_of(item) }
        };
        let last = if distribute && !near_zero(total) {
            self.secondary
                .iter()
                .rfind(|i| factor(self, i) > 0.0)
                .map(|i| i.id)
        } else {
            None
        };
        let stretch_cross = self.ideal_cross.unwrap_or(self.cross_size).max(0.0);

        let mut distributed = 0.0;
        for item in mem::take(&mut self.secondary) {
            let mut constraint = item.constraint;
            let mut remeasure = false;
            if self.align_of(&item) == CrossAlign::Stretch {
                constraint.set_ideal_cross(self.axis, stretch_cross);
                remeasure = true;
            }
            if distribute {
                let main = self.item_main(pass, item.id);
                let share = if Some(item.id) == last {
                    remain - distributed
                } else if use_grow {
                    per_flex * factor(self, &item)
                } else {
                    per_flex * factor(self, &item) * main
                };
                if !near_zero(share) {
                    distributed += share;
                    constraint.set_ideal_main(self.axis, (main + share).max(0.0));
                    remeasure = true;
                }
            }
            if remeasure {
                pass.measure(item.id, Some(constraint));
            }
        }
    }

    /// Recompute the allocation over kept items and settle the cross size.
    /// Returns the largest distance above the baseline.
    fn settle(&mut self, pass: &LayoutPass<'_>, kept: &[NodeId]) -> f32 {
        let gaps = if self.params.main_align.distributes_space() {
            0.0
        } else {
            self.params.space * kept.len().saturating_sub(1) as f32
        };
        self.allocated = gaps + kept.iter().map(|id| self.item_main(pass, *id)).sum::<f32>();
        if self.infinite {
            self.main_size = self.allocated;
        }

        let mut cross = 0.0_f32;
        let mut above = 0.0_f32;
        let mut below = 0.0_f32;
        for id in kept {
            cross = cross.max(self.item_cross(pass, *id));
            let align = pass.flex_item(*id).align_self.unwrap_or(self.params.cross_align);
            if align == CrossAlign::Baseline && self.axis == Axis::Horizontal {
                let geometry = pass.geometry(*id);
                let distance = geometry.margin.top + geometry.baseline_distance();
                above = above.max(distance);
                below = below.max(geometry.margin_frame_size().height - distance);
            }
        }
        if self.params.cross_align == CrossAlign::Baseline && self.axis == Axis::Horizontal {
            cross = cross.max(above + below);
        }
        self.cross_size = cross;
        above
    }
}

/// Measure a flex container.
pub fn measure(params: &FlexParams, linear: bool, pass: &mut LayoutPass<'_>, id: NodeId) {
    let axis = params.direction.axis();
    let children = pass.visible_children(id);
    if children.is_empty() {
        let size = pass.resolve_frame_size(id, Size::ZERO);
        pass.set_frame_size(id, size);
        pass.set_state(id, AlgorithmState::Flex(FlexState::default()));
        return;
    }

    let layout_constraint = pass.layout_constraint(id);
    let child_constraint = pass.content_constraint(id);
    let padding = pass.padding_border(id);
    let ideal = layout_constraint.ideal_size();
    let (main_limit, mut infinite) = match ideal.main(axis) {
        Some(main) => (main, false),
        None => (layout_constraint.max_size.main(axis), linear),
    };
    infinite |= is_infinite(main_limit);

    let mut groups: BTreeMap<i32, Group> = BTreeMap::new();
    let mut out_of_flow = Vec::new();
    let mut flow = Vec::new();
    for child in children {
        if pass.position(child).is_some() {
            out_of_flow.push(child);
            continue;
        }
        flow.push(child);
        let flex = pass.flex_item(child);
        let group = groups.entry(flex.display_priority).or_default();
        group.weight += flex.weight.max(0.0);
        group.items.push(Item {
            id: child,
            flex,
            constraint: child_constraint,
        });
    }
    let total_weight: f32 = groups.values().map(|g| g.weight).sum();
    if total_weight > 0.0 && !is_infinite(main_limit) {
        infinite = false;
    }

    let mut m = FlexMeasure {
        params: *params,
        linear,
        axis,
        main_size: (main_limit - padding.along(axis)).max(0.0),
        cross_size: 0.0,
        ideal_cross: ideal
            .cross(axis)
            .map(|c| (c - padding.along(axis.flip())).max(0.0)),
        allocated: 0.0,
        infinite,
        max_priority: groups.keys().next_back().copied().unwrap_or(1),
        total_weight,
        total_grow: 0.0,
        total_shrink: 0.0,
        secondary: Vec::new(),
    };

    if total_weight > 0.0 && !m.infinite {
        m.measure_weighted(pass, &mut groups);
    } else if m.max_priority > 1 && !m.infinite {
        m.measure_by_priority(pass, &mut groups);
    } else {
        m.measure_plain(pass, &mut groups);
    }
    let kept_ids: Vec<NodeId> = groups
        .values()
        .filter(|g| g.kept)
        .flat_map(|g| g.items.iter().map(|i| i.id))
        .collect();
    m.cross_size = kept_ids
        .iter()
        .map(|c| m.item_cross(pass, *c))
        .fold(0.0, f32::max);
    m.secondary_measure(pass);

    for child in &out_of_flow {
        pass.measure(*child, Some(child_constraint));
    }

    let kept: Vec<NodeId> = flow.into_iter().filter(|c| kept_ids.contains(c)).collect();
    let max_baseline = m.settle(pass, &kept);
    let size = pass.resolve_frame_size(id, Size::from_main_cross(axis, m.main_size, m.cross_size));
    pass.set_frame_size(id, size);
    debug!(?size, allocated = m.allocated, kept = kept.len(), "flex measured");

    let state = FlexState {
        allocated: m.allocated,
        kept,
        out_of_flow,
        max_baseline,
    };
    if let Some((first, offset)) = placements(params, pass, id, &state).first().copied() {
        pass.inherit_baseline(id, first, offset);
    }
    pass.set_state(id, AlgorithmState::Flex(state));
}

/// Leading offset and inter-item gap for `count` items sharing `remain`.
pub(super) fn calculate_space(align: MainAlign, remain: f32, space: f32, count: usize) -> (f32, f32) {
    let n = count as f32;
    match align {
        MainAlign::Start => (0.0, space),
        MainAlign::End => (remain, space),
        MainAlign::Center => (remain / 2.0, space),
        MainAlign::SpaceBetween => {
            let between = if count > 1 { remain / (n - 1.0) } else { 0.0 };
            (0.0, between)
        }
        MainAlign::SpaceAround => {
            let between = if count > 0 { remain / n } else { 0.0 };
            (between / 2.0, between)
        }
        MainAlign::SpaceEvenly => {
            let between = if count > 0 { remain / (n + 1.0) } else { 0.0 };
            (between, between)
        }
    }
}

/// Margin-box offsets of kept items within the content box.
fn placements(
    params: &FlexParams,
    pass: &LayoutPass<'_>,
    id: NodeId,
    state: &FlexState,
) -> Vec<(NodeId, Offset)> {
    let axis = params.direction.axis();
    let content = pass.geometry(id).content_size();
    let main = content.main(axis);
    let cross = content.cross(axis);
    let remain = (main - state.allocated).max(0.0);
    let (front, between) = calculate_space(params.main_align, remain, params.space, state.kept.len());
    let text = pass.direction(params.text_direction);
    let forward = params.direction.starts_top_left(text);
    let cross_forward = params.direction.cross().starts_top_left(text);

    let mut cursor = if forward { front } else { main - front };
    let mut out = Vec::with_capacity(state.kept.len());
    for child in &state.kept {
        let geometry = pass.geometry(*child);
        let size = geometry.margin_frame_size();
        let (child_main, child_cross) = (size.main(axis), size.cross(axis));
        let align = pass.flex_item(*child).align_self.unwrap_or(params.cross_align);
        let cross_pos = match align {
            CrossAlign::Start | CrossAlign::End => {
                if cross_forward == (align == CrossAlign::Start) {
                    0.0
                } else {
                    cross - child_cross
                }
            }
            CrossAlign::Center => cross / 2.0 - child_cross / 2.0,
            CrossAlign::Stretch => {
                if cross_forward {
                    0.0
                } else {
                    cross - child_cross
                }
            }
            CrossAlign::Baseline if axis == Axis::Horizontal => {
                state.max_baseline - (geometry.margin.top + geometry.baseline_distance())
            }
            CrossAlign::Baseline => 0.0,
        };
        let main_pos = if forward {
            let pos = cursor;
            cursor += child_main + between;
            pos
        } else {
            cursor -= child_main;
            let pos = cursor;
            cursor -= between;
            pos
        };
        out.push((*child, Offset::from_main_cross(axis, main_pos, cross_pos)));
    }
    out
}

/// Position kept and out-of-flow items, then lay them out.
pub fn layout(params: &FlexParams, pass: &mut LayoutPass<'_>, id: NodeId) {
    let Some(AlgorithmState::Flex(state)) = pass.state(id).cloned() else {
        warn!("flex layout without measure state");
        return;
    };
    for (child, offset) in placements(params, pass, id, &state) {
        pass.set_margin_frame_offset(child, offset);
        pass.layout(child);
    }
    for child in &state.out_of_flow {
        let position = pass.position(*child).unwrap_or(Offset::ZERO);
        pass.set_margin_frame_offset(*child, position);
        pass.layout(*child);
    }
}

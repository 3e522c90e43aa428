//! Placement model and rectangle geometry.
//!
//! Pure functions over placements and rectangles. Everything the middleware
//! pipeline needs to turn a declarative placement into coordinates lives here:
//! sides, alignments, axes, sign conventions, and the base coordinate
//! computation.
//!
//! # Axes
//!
//! The **main axis** of a placement is the axis along which the floating
//! element is pushed away from the reference (`y` for top/bottom, `x` for
//! left/right). The **cross axis** is the other one, along which alignment
//! happens.
//!
//! ```
//! use zenfloat::{Alignment, Axis, Placement, Side};
//!
//! let p: Placement = "right-start".parse().unwrap();
//! assert_eq!(p.side(), Side::Right);
//! assert_eq!(p.alignment(), Some(Alignment::Start));
//! assert_eq!(p.main_axis(), Axis::X);
//! assert_eq!(Side::Top.multiplier(), -1.0);
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PositionError;

// ============================================================================
// Axes, sides, alignments
// ============================================================================

/// A coordinate axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// The other axis.
    pub const fn opposite(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// The sides bounding this axis, `(start, end)`.
    pub const fn sides(self) -> (Side, Side) {
        match self {
            Self::X => (Side::Left, Side::Right),
            Self::Y => (Side::Top, Side::Bottom),
        }
    }
}

/// Base side of a placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All sides in clockwise order starting at the top.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The side across the reference.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Main axis for a floating element placed on this side.
    pub const fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Y,
            Self::Left | Self::Right => Axis::X,
        }
    }

    /// Sign of displacement away from the reference: -1 toward top/left,
    /// +1 toward bottom/right.
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Top | Self::Left => -1.0,
            Self::Bottom | Self::Right => 1.0,
        }
    }

    /// Lowercase name, as used in placement strings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alignment of the floating element along the cross axis.
///
/// Absence of an alignment (`None` where an `Option<Alignment>` is expected)
/// means centered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Start,
    End,
}

impl Alignment {
    /// Swap start and end.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }

    /// Lowercase name, as used in placement strings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Where to put the floating element relative to the reference.
///
/// One of 12 values: a base [`Side`] plus an optional [`Alignment`].
/// Serialized as the kebab-case string (`"bottom-start"`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Top,
    TopStart,
    TopEnd,
    Right,
    RightStart,
    RightEnd,
    #[default]
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
}

impl Placement {
    /// All placements in enumeration order. Tie-breaks between candidate
    /// placements follow this order.
    pub const ALL: [Self; 12] = [
        Self::Top,
        Self::TopStart,
        Self::TopEnd,
        Self::Right,
        Self::RightStart,
        Self::RightEnd,
        Self::Bottom,
        Self::BottomStart,
        Self::BottomEnd,
        Self::Left,
        Self::LeftStart,
        Self::LeftEnd,
    ];

    /// Build a placement from its side and alignment.
    pub const fn new(side: Side, alignment: Option<Alignment>) -> Self {
        match (side, alignment) {
            (Side::Top, None) => Self::Top,
            (Side::Top, Some(Alignment::Start)) => Self::TopStart,
            (Side::Top, Some(Alignment::End)) => Self::TopEnd,
            (Side::Right, None) => Self::Right,
            (Side::Right, Some(Alignment::Start)) => Self::RightStart,
            (Side::Right, Some(Alignment::End)) => Self::RightEnd,
            (Side::Bottom, None) => Self::Bottom,
            (Side::Bottom, Some(Alignment::Start)) => Self::BottomStart,
            (Side::Bottom, Some(Alignment::End)) => Self::BottomEnd,
            (Side::Left, None) => Self::Left,
            (Side::Left, Some(Alignment::Start)) => Self::LeftStart,
            (Side::Left, Some(Alignment::End)) => Self::LeftEnd,
        }
    }

    /// Base side with the alignment stripped.
    pub const fn side(self) -> Side {
        match self {
            Self::Top | Self::TopStart | Self::TopEnd => Side::Top,
            Self::Right | Self::RightStart | Self::RightEnd => Side::Right,
            Self::Bottom | Self::BottomStart | Self::BottomEnd => Side::Bottom,
            Self::Left | Self::LeftStart | Self::LeftEnd => Side::Left,
        }
    }

    /// Alignment, or `None` when centered.
    pub const fn alignment(self) -> Option<Alignment> {
        match self {
            Self::TopStart | Self::RightStart | Self::BottomStart | Self::LeftStart => {
                Some(Alignment::Start)
            }
            Self::TopEnd | Self::RightEnd | Self::BottomEnd | Self::LeftEnd => {
                Some(Alignment::End)
            }
            Self::Top | Self::Right | Self::Bottom | Self::Left => None,
        }
    }

    /// Axis along which the floating element is pushed away from the reference.
    pub const fn main_axis(self) -> Axis {
        self.side().axis()
    }

    /// Axis along which alignment happens.
    pub const fn cross_axis(self) -> Axis {
        self.main_axis().opposite()
    }

    /// Same alignment on the opposite side.
    pub const fn opposite(self) -> Self {
        Self::new(self.side().opposite(), self.alignment())
    }

    /// Same side with start and end swapped. Centered placements are unchanged.
    pub const fn opposite_alignment(self) -> Self {
        match self.alignment() {
            Some(a) => Self::new(self.side(), Some(a.opposite())),
            None => self,
        }
    }

    /// Fallbacks for an aligned placement: the opposite alignment, the
    /// opposite side, and the opposite side with the opposite alignment.
    pub const fn expanded(self) -> [Self; 3] {
        let opposite = self.opposite();
        [
            self.opposite_alignment(),
            opposite,
            opposite.opposite_alignment(),
        ]
    }

    /// Placements on the perpendicular sides, ordered by `direction`.
    ///
    /// For aligned placements the alignment is carried over, and with
    /// `flip_alignment` the opposite-alignment variants are appended.
    pub fn opposite_axis_placements(
        self,
        flip_alignment: bool,
        direction: Alignment,
        rtl: bool,
    ) -> Vec<Self> {
        let is_start = direction == Alignment::Start;
        let sides = match self.side() {
            Side::Top | Side::Bottom => {
                let left_first = if rtl { !is_start } else { is_start };
                if left_first {
                    [Side::Left, Side::Right]
                } else {
                    [Side::Right, Side::Left]
                }
            }
            Side::Left | Side::Right => {
                if is_start {
                    [Side::Top, Side::Bottom]
                } else {
                    [Side::Bottom, Side::Top]
                }
            }
        };

        let alignment = self.alignment();
        let mut list: Vec<Self> = sides.iter().map(|&s| Self::new(s, alignment)).collect();
        if alignment.is_some() && flip_alignment {
            let flipped: Vec<Self> = list.iter().map(|p| p.opposite_alignment()).collect();
            list.extend(flipped);
        }
        list
    }

    /// The two sides relevant to alignment overflow, `(main, opposite)`.
    ///
    /// The first side is the one the floating element grows toward from its
    /// aligned edge; when the reference is longer than the floating element on
    /// the cross axis the order is swapped.
    pub fn alignment_sides(self, rects: &ElementRects, rtl: bool) -> (Side, Side) {
        let axis = self.cross_axis();
        let alignment = self.alignment();
        let mut side = match axis {
            Axis::X => {
                let start = if rtl { Alignment::End } else { Alignment::Start };
                if alignment == Some(start) {
                    Side::Right
                } else {
                    Side::Left
                }
            }
            Axis::Y => {
                if alignment == Some(Alignment::Start) {
                    Side::Bottom
                } else {
                    Side::Top
                }
            }
        };
        if rects.reference.length(axis) > rects.floating.length(axis) {
            side = side.opposite();
        }
        (side, side.opposite())
    }

    /// Kebab-case string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::TopStart => "top-start",
            Self::TopEnd => "top-end",
            Self::Right => "right",
            Self::RightStart => "right-start",
            Self::RightEnd => "right-end",
            Self::Bottom => "bottom",
            Self::BottomStart => "bottom-start",
            Self::BottomEnd => "bottom-end",
            Self::Left => "left",
            Self::LeftStart => "left-start",
            Self::LeftEnd => "left-end",
        }
    }

    /// Map a displacement along this placement's axes to x/y.
    ///
    /// `main` is scaled by the side multiplier (positive moves away from the
    /// reference); `cross` is applied as-is.
    pub fn project(self, main: f64, cross: f64) -> Coords {
        let mut coords = Coords::default();
        coords.set(self.main_axis(), main * self.side().multiplier());
        coords.set(self.cross_axis(), cross);
        coords
    }

    /// Inverse of [`project`](Self::project): split an x/y displacement into
    /// `(main, cross)` components for this placement.
    pub fn decompose(self, delta: Coords) -> (f64, f64) {
        (
            delta.get(self.main_axis()) * self.side().multiplier(),
            delta.get(self.cross_axis()),
        )
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PositionError::InvalidPlacement(s.to_owned()))
    }
}

/// Positioning mode of the floating element. Passed through untouched.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Absolute,
    Fixed,
}

// ============================================================================
// Rectangles and points
// ============================================================================

/// A 2D point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component on `axis`.
    pub const fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Overwrite the component on `axis`.
    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    /// Whether both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl core::ops::Add for Coords {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for Coords {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width × height.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Create new dimensions.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along `axis`.
    pub const fn length(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Axis-aligned rectangle in the caller's coordinate space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect spanning the given edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub const fn left(&self) -> f64 {
        self.x
    }

    pub const fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edge coordinate for `side`.
    pub fn edge(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top(),
            Side::Right => self.right(),
            Side::Bottom => self.bottom(),
            Side::Left => self.left(),
        }
    }

    /// Origin component on `axis`.
    pub const fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Extent along `axis`.
    pub const fn length(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Same size, moved to `coords`.
    pub const fn at(self, coords: Coords) -> Self {
        Self::new(coords.x, coords.y, self.width, self.height)
    }

    /// Overlap of two rects.
    ///
    /// Not clamped: disjoint rects yield a negative width or height, which
    /// keeps overflow arithmetic linear.
    pub fn intersection(&self, other: &Self) -> Self {
        Self::from_edges(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
    }
}

/// Reference and floating rects for one computation pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRects {
    pub reference: Rect,
    pub floating: Rect,
}

/// One value per side. Used for overflow amounts, padding, and side offsets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Signed overflow per side. Positive means the floating element extends past
/// the boundary by that amount.
pub type Overflow = Sides;

impl Sides {
    /// Create from explicit values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same value on every side.
    pub const fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    /// Value for `side`.
    pub const fn get(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

/// Padding between an element and its boundary.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Padding {
    /// Same padding on every side.
    Uniform(f64),
    /// Per-side padding.
    PerSide(Sides),
}

impl Default for Padding {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

impl From<f64> for Padding {
    fn from(v: f64) -> Self {
        Self::Uniform(v)
    }
}

impl From<Sides> for Padding {
    fn from(sides: Sides) -> Self {
        Self::PerSide(sides)
    }
}

impl Padding {
    /// Expand to explicit per-side values.
    pub const fn resolve(&self) -> Sides {
        match *self {
            Self::Uniform(v) => Sides::uniform(v),
            Self::PerSide(sides) => sides,
        }
    }
}

// ============================================================================
// Coordinate computation
// ============================================================================

/// Clamp `value` into `[start, end]`. When `start > end`, `start` wins.
pub(crate) fn clamp(start: f64, value: f64, end: f64) -> f64 {
    start.max(value.min(end))
}

/// Base coordinates for the floating element before any middleware runs.
///
/// The floating element is placed flush against `placement.side()` of the
/// reference and centered on the cross axis; `start` and `end` alignments move
/// it so the matching edges line up. RTL mirrors alignment on the x axis.
///
/// ```
/// use zenfloat::{ElementRects, Placement, Rect, compute_coords_from_placement};
///
/// let rects = ElementRects {
///     reference: Rect::new(100.0, 100.0, 50.0, 20.0),
///     floating: Rect::new(0.0, 0.0, 30.0, 10.0),
/// };
/// let c = compute_coords_from_placement(&rects, Placement::Bottom, false);
/// assert_eq!((c.x, c.y), (110.0, 120.0));
/// ```
pub fn compute_coords_from_placement(
    rects: &ElementRects,
    placement: Placement,
    rtl: bool,
) -> Coords {
    let ElementRects {
        reference,
        floating,
    } = rects;
    let common_x = reference.x + reference.width / 2.0 - floating.width / 2.0;
    let common_y = reference.y + reference.height / 2.0 - floating.height / 2.0;

    let mut coords = match placement.side() {
        Side::Top => Coords::new(common_x, reference.y - floating.height),
        Side::Bottom => Coords::new(common_x, reference.y + reference.height),
        Side::Right => Coords::new(reference.x + reference.width, common_y),
        Side::Left => Coords::new(reference.x - floating.width, common_y),
    };

    let axis = placement.cross_axis();
    let common_align = reference.length(axis) / 2.0 - floating.length(axis) / 2.0;
    let direction = if rtl && placement.main_axis() == Axis::Y {
        -1.0
    } else {
        1.0
    };
    match placement.alignment() {
        Some(Alignment::Start) => {
            coords.set(axis, coords.get(axis) - common_align * direction);
        }
        Some(Alignment::End) => {
            coords.set(axis, coords.get(axis) + common_align * direction);
        }
        None => {}
    }
    coords
}

// ============================================================================
// Offset values
// ============================================================================

/// Offset along the placement's axes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetAxes {
    /// Distance away from the reference (gutter).
    pub main_axis: f64,
    /// Skid along the alignment axis.
    pub cross_axis: f64,
    /// For aligned placements, replaces `cross_axis`; applied in the
    /// alignment's direction (negated for `end`).
    pub alignment_axis: Option<f64>,
}

/// A static offset: a scalar main-axis distance or explicit axes.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OffsetValue {
    Scalar(f64),
    Axes(OffsetAxes),
}

impl Default for OffsetValue {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl From<f64> for OffsetValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<OffsetAxes> for OffsetValue {
    fn from(axes: OffsetAxes) -> Self {
        Self::Axes(axes)
    }
}

impl OffsetValue {
    /// Normalize to axes. A scalar becomes `{ main_axis: v, cross_axis: 0 }`.
    pub const fn to_axes(self) -> OffsetAxes {
        match self {
            Self::Scalar(v) => OffsetAxes {
                main_axis: v,
                cross_axis: 0.0,
                alignment_axis: None,
            },
            Self::Axes(axes) => axes,
        }
    }
}

/// Inputs handed to a dynamic offset function.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OffsetContext {
    pub reference: Rect,
    pub floating: Rect,
    pub placement: Placement,
}

/// Offset configuration: a fixed value, or a function of the current rects
/// and placement.
pub enum OffsetOptions {
    Static(OffsetValue),
    Dynamic(Box<dyn Fn(OffsetContext) -> OffsetValue>),
}

impl fmt::Debug for OffsetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self::Static(OffsetValue::default())
    }
}

impl From<f64> for OffsetOptions {
    fn from(v: f64) -> Self {
        Self::Static(OffsetValue::Scalar(v))
    }
}

impl From<OffsetAxes> for OffsetOptions {
    fn from(axes: OffsetAxes) -> Self {
        Self::Static(OffsetValue::Axes(axes))
    }
}

impl From<OffsetValue> for OffsetOptions {
    fn from(value: OffsetValue) -> Self {
        Self::Static(value)
    }
}

impl OffsetOptions {
    /// Wrap a function evaluated on every pipeline pass.
    pub fn dynamic(f: impl Fn(OffsetContext) -> OffsetValue + 'static) -> Self {
        Self::Dynamic(Box::new(f))
    }

    /// Evaluate against the current rects and placement.
    pub fn resolve(&self, rects: &ElementRects, placement: Placement) -> OffsetValue {
        match self {
            Self::Static(v) => *v,
            Self::Dynamic(f) => f(OffsetContext {
                reference: rects.reference,
                floating: rects.floating,
                placement,
            }),
        }
    }
}

/// Translate an offset configuration into an x/y displacement.
///
/// The main-axis value moves the floating element away from the reference
/// (sign from [`Side::multiplier`]); the cross-axis value maps onto the other
/// coordinate unscaled, except that RTL mirrors it for top/bottom placements.
///
/// ```
/// use zenfloat::{ElementRects, OffsetAxes, Placement, coords_from_offset_value};
///
/// let rects = ElementRects::default();
/// let axes = OffsetAxes { main_axis: 10.0, cross_axis: 5.0, ..Default::default() };
/// let c = coords_from_offset_value(Placement::RightStart, &rects, &axes.into(), false);
/// assert_eq!((c.x, c.y), (10.0, 5.0));
/// ```
pub fn coords_from_offset_value(
    placement: Placement,
    rects: &ElementRects,
    options: &OffsetOptions,
    rtl: bool,
) -> Coords {
    let axes = options.resolve(rects, placement).to_axes();
    let mut cross = axes.cross_axis;
    if let (Some(alignment), Some(alignment_axis)) = (placement.alignment(), axes.alignment_axis) {
        cross = match alignment {
            Alignment::Start => alignment_axis,
            Alignment::End => -alignment_axis,
        };
    }
    let cross_multiplier = if rtl && placement.main_axis() == Axis::Y {
        -1.0
    } else {
        1.0
    };
    placement.project(axes.main_axis, cross * cross_multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects(reference: Rect, floating: Rect) -> ElementRects {
        ElementRects {
            reference,
            floating,
        }
    }

    // ── placement parsing ───────────────────────────────────────────────

    #[test]
    fn side_and_alignment_round_trip_all_placements() {
        for p in Placement::ALL {
            assert_eq!(Placement::new(p.side(), p.alignment()), p);
            let parsed: Placement = p.as_str().parse().unwrap();
            assert_eq!(parsed, p);
            assert_eq!(p.to_string(), p.as_str());
        }
    }

    #[test]
    fn rejects_unknown_placement() {
        for bad in ["", "center", "top-middle", "Top", "bottom-", "left-start-end"] {
            let err = bad.parse::<Placement>().unwrap_err();
            assert!(matches!(err, PositionError::InvalidPlacement(ref s) if s == bad));
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Placement::BottomStart).unwrap();
        assert_eq!(json, "\"bottom-start\"");
        let p: Placement = serde_json::from_str("\"left-end\"").unwrap();
        assert_eq!(p, Placement::LeftEnd);
        assert!(serde_json::from_str::<Placement>("\"middle\"").is_err());
    }

    // ── axes and signs ──────────────────────────────────────────────────

    #[test]
    fn side_multipliers() {
        assert_eq!(Side::Top.multiplier(), -1.0);
        assert_eq!(Side::Left.multiplier(), -1.0);
        assert_eq!(Side::Bottom.multiplier(), 1.0);
        assert_eq!(Side::Right.multiplier(), 1.0);
    }

    #[test]
    fn main_axis_is_push_away_axis() {
        assert_eq!(Placement::Top.main_axis(), Axis::Y);
        assert_eq!(Placement::BottomEnd.main_axis(), Axis::Y);
        assert_eq!(Placement::Left.main_axis(), Axis::X);
        assert_eq!(Placement::RightStart.cross_axis(), Axis::Y);
    }

    #[test]
    fn opposites() {
        assert_eq!(Placement::TopStart.opposite(), Placement::BottomStart);
        assert_eq!(Placement::LeftEnd.opposite_alignment(), Placement::LeftStart);
        assert_eq!(Placement::Right.opposite_alignment(), Placement::Right);
        assert_eq!(
            Placement::BottomStart.expanded(),
            [Placement::BottomEnd, Placement::TopStart, Placement::TopEnd]
        );
    }

    #[test]
    fn opposite_axis_placements_order() {
        assert_eq!(
            Placement::Top.opposite_axis_placements(true, Alignment::Start, false),
            vec![Placement::Left, Placement::Right]
        );
        assert_eq!(
            Placement::Top.opposite_axis_placements(true, Alignment::Start, true),
            vec![Placement::Right, Placement::Left]
        );
        assert_eq!(
            Placement::RightStart.opposite_axis_placements(true, Alignment::End, false),
            vec![
                Placement::BottomStart,
                Placement::TopStart,
                Placement::BottomEnd,
                Placement::TopEnd
            ]
        );
    }

    #[test]
    fn alignment_sides_swap_for_wide_reference() {
        let narrow_ref = rects(Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 0.0, 50.0, 10.0));
        assert_eq!(
            Placement::BottomStart.alignment_sides(&narrow_ref, false),
            (Side::Right, Side::Left)
        );
        let wide_ref = rects(Rect::new(0.0, 0.0, 100.0, 10.0), Rect::new(0.0, 0.0, 50.0, 10.0));
        assert_eq!(
            Placement::BottomStart.alignment_sides(&wide_ref, false),
            (Side::Left, Side::Right)
        );
    }

    #[test]
    fn project_and_decompose_are_inverse() {
        for p in Placement::ALL {
            let c = p.project(7.0, -3.0);
            assert_eq!(p.decompose(c), (7.0, -3.0));
        }
    }

    // ── base coordinates ────────────────────────────────────────────────

    #[test]
    fn base_coords_for_each_side() {
        let r = rects(Rect::new(100.0, 100.0, 50.0, 20.0), Rect::new(0.0, 0.0, 30.0, 10.0));
        assert_eq!(
            compute_coords_from_placement(&r, Placement::Bottom, false),
            Coords::new(110.0, 120.0)
        );
        assert_eq!(
            compute_coords_from_placement(&r, Placement::Top, false),
            Coords::new(110.0, 90.0)
        );
        assert_eq!(
            compute_coords_from_placement(&r, Placement::Right, false),
            Coords::new(150.0, 105.0)
        );
        assert_eq!(
            compute_coords_from_placement(&r, Placement::Left, false),
            Coords::new(70.0, 105.0)
        );
    }

    #[test]
    fn base_coords_alignment() {
        let r = rects(Rect::new(100.0, 100.0, 50.0, 20.0), Rect::new(0.0, 0.0, 30.0, 10.0));
        assert_eq!(
            compute_coords_from_placement(&r, Placement::BottomStart, false),
            Coords::new(100.0, 120.0)
        );
        assert_eq!(
            compute_coords_from_placement(&r, Placement::BottomEnd, false),
            Coords::new(120.0, 120.0)
        );
        // RTL mirrors start/end for vertical placements only.
        assert_eq!(
            compute_coords_from_placement(&r, Placement::BottomStart, true),
            Coords::new(120.0, 120.0)
        );
        assert_eq!(
            compute_coords_from_placement(&r, Placement::RightStart, true),
            Coords::new(150.0, 100.0)
        );
    }

    // ── offset values ───────────────────────────────────────────────────

    #[test]
    fn scalar_offset_per_side() {
        let r = ElementRects::default();
        let n = OffsetOptions::from(8.0);
        assert_eq!(
            coords_from_offset_value(Placement::Bottom, &r, &n, false),
            Coords::new(0.0, 8.0)
        );
        assert_eq!(
            coords_from_offset_value(Placement::Top, &r, &n, false),
            Coords::new(0.0, -8.0)
        );
        assert_eq!(
            coords_from_offset_value(Placement::Left, &r, &n, false),
            Coords::new(-8.0, 0.0)
        );
        assert_eq!(
            coords_from_offset_value(Placement::Right, &r, &n, false),
            Coords::new(8.0, 0.0)
        );
    }

    #[test]
    fn centered_placement_has_no_cross_contribution() {
        let r = ElementRects::default();
        for p in Placement::ALL.into_iter().filter(|p| p.alignment().is_none()) {
            let c = coords_from_offset_value(p, &r, &OffsetOptions::from(4.0), false);
            assert_eq!(c.get(p.cross_axis()), 0.0);
        }
    }

    #[test]
    fn alignment_axis_overrides_cross_axis() {
        let r = ElementRects::default();
        let axes = OffsetAxes {
            main_axis: 0.0,
            cross_axis: 3.0,
            alignment_axis: Some(6.0),
        };
        let opts = OffsetOptions::from(axes);
        assert_eq!(coords_from_offset_value(Placement::TopStart, &r, &opts, false).x, 6.0);
        assert_eq!(coords_from_offset_value(Placement::TopEnd, &r, &opts, false).x, -6.0);
        // Unaligned: alignment_axis ignored.
        assert_eq!(coords_from_offset_value(Placement::Top, &r, &opts, false).x, 3.0);
    }

    #[test]
    fn rtl_mirrors_cross_axis_for_vertical_sides() {
        let r = ElementRects::default();
        let opts = OffsetOptions::from(OffsetAxes {
            main_axis: 1.0,
            cross_axis: 5.0,
            alignment_axis: None,
        });
        assert_eq!(
            coords_from_offset_value(Placement::Bottom, &r, &opts, true),
            Coords::new(-5.0, 1.0)
        );
        assert_eq!(
            coords_from_offset_value(Placement::Right, &r, &opts, true),
            Coords::new(1.0, 5.0)
        );
    }

    #[test]
    fn dynamic_offset_sees_rects_and_placement() {
        let r = rects(Rect::new(0.0, 0.0, 40.0, 10.0), Rect::new(0.0, 0.0, 20.0, 10.0));
        let opts = OffsetOptions::dynamic(|ctx| {
            if ctx.placement.side() == Side::Top {
                OffsetValue::Scalar(ctx.reference.width / 4.0)
            } else {
                OffsetValue::Scalar(ctx.floating.width)
            }
        });
        assert_eq!(
            coords_from_offset_value(Placement::Top, &r, &opts, false),
            Coords::new(0.0, -10.0)
        );
        assert_eq!(
            coords_from_offset_value(Placement::Left, &r, &opts, false),
            Coords::new(-20.0, 0.0)
        );
    }

    // ── rect helpers ────────────────────────────────────────────────────

    #[test]
    fn intersection_keeps_negative_extent_for_disjoint_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        let i = a.intersection(&b);
        assert_eq!(i.left(), 20.0);
        assert_eq!(i.right(), 10.0);
        assert!(i.width < 0.0);
        assert_eq!(i.top(), 5.0);
        assert_eq!(i.bottom(), 10.0);
    }

    #[test]
    fn clamp_prefers_start_when_inverted() {
        assert_eq!(clamp(0.0, 5.0, 10.0), 5.0);
        assert_eq!(clamp(0.0, -5.0, 10.0), 0.0);
        assert_eq!(clamp(0.0, 15.0, 10.0), 10.0);
        assert_eq!(clamp(10.0, 5.0, 0.0), 10.0);
    }

    #[test]
    fn padding_resolves() {
        assert_eq!(Padding::from(4.0).resolve(), Sides::uniform(4.0));
        let per = Sides::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Padding::from(per).resolve().get(Side::Left), 4.0);
    }
}

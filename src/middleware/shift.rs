//! Shift: slide the floating element back inside its boundary.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Axis, Coords, OffsetOptions, OffsetValue, Overflow, Padding, Side, clamp};
use crate::middleware::{Middleware, MiddlewareReturn, MiddlewareState};
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::platform::{Boundary, RootBoundary};

/// Which axes a [`Shift`] was allowed to move on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledAxes {
    pub x: bool,
    pub y: bool,
}

/// Displacement applied by [`Shift`] (after limiting).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftData {
    pub x: f64,
    pub y: f64,
    pub enabled: EnabledAxes,
}

/// Translate the floating element by the least amount that removes boundary
/// overflow. Never changes the placement.
///
/// By default only the cross axis (the alignment axis) is checked, so a
/// tooltip above a button slides left/right but never overlaps the button.
#[derive(Debug)]
pub struct Shift<E> {
    main_axis: bool,
    cross_axis: bool,
    limiter: Option<LimitShift>,
    detect_overflow: DetectOverflowOptions<E>,
}

impl<E> Default for Shift<E> {
    fn default() -> Self {
        Self {
            main_axis: false,
            cross_axis: true,
            limiter: None,
            detect_overflow: DetectOverflowOptions::default(),
        }
    }
}

/// Create a [`Shift`] middleware with default options.
pub fn shift<E>() -> Shift<E> {
    Shift::default()
}

impl<E> Shift<E> {
    pub const NAME: &'static str = "shift";

    /// Shift along the main (push-away) axis too. Default: false.
    pub fn main_axis(mut self, enabled: bool) -> Self {
        self.main_axis = enabled;
        self
    }

    /// Shift along the cross (alignment) axis. Default: true.
    pub fn cross_axis(mut self, enabled: bool) -> Self {
        self.cross_axis = enabled;
        self
    }

    /// Limit how far the shift may go, see [`limit_shift`].
    pub fn limiter(mut self, limiter: LimitShift) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn detect_overflow(mut self, options: DetectOverflowOptions<E>) -> Self {
        self.detect_overflow = options;
        self
    }

    pub fn boundary(mut self, boundary: Boundary<E>) -> Self {
        self.detect_overflow.boundary = boundary;
        self
    }

    pub fn root_boundary(mut self, root_boundary: RootBoundary) -> Self {
        self.detect_overflow.root_boundary = root_boundary;
        self
    }

    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.detect_overflow.padding = padding.into();
        self
    }
}

/// Move `value` on `axis` toward the overflowing side by at most the room
/// left on the opposite side.
///
/// An element that fits ends up fully inside. One larger than the boundary
/// slides until its opposite edge meets the boundary and no further, so
/// overflow never grows on either side.
fn shift_into_bounds(value: f64, axis: Axis, overflow: &Overflow) -> f64 {
    let (min_side, max_side) = axis.sides();
    let start = overflow.get(min_side);
    let end = overflow.get(max_side);
    if start > 0.0 {
        value + start.min((-end).max(0.0))
    } else if end > 0.0 {
        value - end.min((-start).max(0.0))
    } else {
        value
    }
}

impl<E> Middleware<E> for Shift<E> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        async move {
            let overflow = detect_overflow(&state, &self.detect_overflow).await?;
            let main = state.placement.main_axis();
            let cross = main.opposite();

            let mut coords = Coords::new(state.x, state.y);
            if self.cross_axis {
                coords.set(cross, shift_into_bounds(coords.get(cross), cross, &overflow));
            }
            if self.main_axis {
                coords.set(main, shift_into_bounds(coords.get(main), main, &overflow));
            }

            let limited = match &self.limiter {
                Some(limiter) => limiter.limit(&state, coords),
                None => coords,
            };

            let enabled =
                |axis: Axis| (axis == cross && self.cross_axis) || (axis == main && self.main_axis);
            MiddlewareReturn::coords(limited.x, limited.y).with_data(&ShiftData {
                x: limited.x - state.x,
                y: limited.y - state.y,
                enabled: EnabledAxes {
                    x: enabled(Axis::X),
                    y: enabled(Axis::Y),
                },
            })
        }
        .boxed_local()
    }
}

// ============================================================================
// limit_shift
// ============================================================================

/// Limiter for [`Shift`] that keeps the floating element attached to the
/// reference.
///
/// On the cross axis the floating element may slide until its far edge meets
/// the reference's opposite edge (moved inward by the cross-axis offset). On
/// the main axis it may not cross over the reference, accounting for any
/// [`Offset`](crate::Offset) already applied.
///
/// The limit offset is read along the shift's axes: a scalar applies to the
/// cross axis; [`OffsetAxes`](crate::OffsetAxes) sets both.
#[derive(Debug)]
pub struct LimitShift {
    offset: OffsetOptions,
    main_axis: bool,
    cross_axis: bool,
}

impl Default for LimitShift {
    fn default() -> Self {
        Self {
            offset: OffsetOptions::default(),
            main_axis: true,
            cross_axis: true,
        }
    }
}

/// Create a [`LimitShift`] with default options.
pub fn limit_shift() -> LimitShift {
    LimitShift::default()
}

impl LimitShift {
    pub fn offset(mut self, offset: impl Into<OffsetOptions>) -> Self {
        self.offset = offset.into();
        self
    }

    /// Limit the main axis. Default: true.
    pub fn main_axis(mut self, enabled: bool) -> Self {
        self.main_axis = enabled;
        self
    }

    /// Limit the cross axis. Default: true.
    pub fn cross_axis(mut self, enabled: bool) -> Self {
        self.cross_axis = enabled;
        self
    }

    /// Clamp shifted coordinates.
    pub fn limit<E>(&self, state: &MiddlewareState<'_, E>, coords: Coords) -> Coords {
        let rects = state.rects;
        let placement = state.placement;
        let main = placement.main_axis();
        let cross = main.opposite();

        let (cross_offset, main_offset) = match self.offset.resolve(rects, placement) {
            OffsetValue::Scalar(v) => (v, 0.0),
            OffsetValue::Axes(axes) => (axes.cross_axis, axes.main_axis),
        };

        let mut out = coords;
        if self.cross_axis {
            let lo = rects.reference.coord(cross) - rects.floating.length(cross) + cross_offset;
            let hi = rects.reference.coord(cross) + rects.reference.length(cross) - cross_offset;
            out.set(cross, clamp(lo, out.get(cross), hi));
        }
        if self.main_axis {
            let applied = state
                .middleware_data
                .offset()
                .map(|d| Coords::new(d.x, d.y).get(main))
                .unwrap_or(0.0);
            let origin_side = matches!(placement.side(), Side::Top | Side::Left);
            let base_lo = rects.reference.coord(main) - rects.floating.length(main);
            let base_hi = rects.reference.coord(main) + rects.reference.length(main);
            let (lo, hi) = if origin_side {
                (base_lo + applied, base_hi - main_offset)
            } else {
                (base_lo + main_offset, base_hi + applied)
            };
            out.set(main, clamp(lo, out.get(main), hi));
        }
        out
    }
}

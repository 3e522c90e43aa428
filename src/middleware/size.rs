//! Size: measure the space available to the floating element.

use core::fmt;

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Alignment, Axis, Padding, Side};
use crate::middleware::{Middleware, MiddlewareReturn, MiddlewareState, Reset};
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::platform::{Boundary, RootBoundary};

/// Space left for the floating element inside its boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeData {
    pub available_width: f64,
    pub available_height: f64,
}

type ApplyFn = Box<dyn Fn(&SizeData)>;

/// Compute the largest width and height the floating element can take at
/// its current placement without overflowing.
///
/// The result is advisory: it is published as [`SizeData`] and passed to the
/// optional [`apply`](Size::apply) callback, which may resize the element on
/// the host. If the platform then reports different floating dimensions, the
/// pipeline restarts with freshly measured rects.
pub struct Size<E> {
    apply: Option<ApplyFn>,
    detect_overflow: DetectOverflowOptions<E>,
}

impl<E: fmt::Debug> fmt::Debug for Size<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Size")
            .field("apply", &self.apply.as_ref().map(|_| "<fn>"))
            .field("detect_overflow", &self.detect_overflow)
            .finish()
    }
}

impl<E> Default for Size<E> {
    fn default() -> Self {
        Self {
            apply: None,
            detect_overflow: DetectOverflowOptions::default(),
        }
    }
}

/// Create a [`Size`] middleware with default options.
pub fn size<E>() -> Size<E> {
    Size::default()
}

impl<E> Size<E> {
    pub const NAME: &'static str = "size";

    /// Called with the available space on every run.
    pub fn apply(mut self, apply: impl Fn(&SizeData) + 'static) -> Self {
        self.apply = Some(Box::new(apply));
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

/// Sides the floating element grows toward: `(width_side, height_side)`.
fn growth_sides(side: Side, alignment: Option<Alignment>, rtl: bool) -> (Side, Side) {
    match side {
        Side::Top | Side::Bottom => {
            let leftward = if rtl { Alignment::Start } else { Alignment::End };
            let width_side = if alignment == Some(leftward) {
                Side::Left
            } else {
                Side::Right
            };
            (width_side, side)
        }
        Side::Left | Side::Right => {
            let height_side = if alignment == Some(Alignment::End) {
                Side::Top
            } else {
                Side::Bottom
            };
            (side, height_side)
        }
    }
}

impl<E> Middleware<E> for Size<E> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        async move {
            let overflow = detect_overflow(&state, &self.detect_overflow).await?;
            let placement = state.placement;
            let alignment = placement.alignment();
            let width = state.rects.floating.width;
            let height = state.rects.floating.height;
            let (width_side, height_side) = growth_sides(placement.side(), alignment, state.rtl);

            let max_height = height - overflow.top - overflow.bottom;
            let max_width = width - overflow.left - overflow.right;
            let mut available_height = (height - overflow.get(height_side)).min(max_height);
            let mut available_width = (width - overflow.get(width_side)).min(max_width);

            let shift = state.middleware_data.shift();
            if let Some(shift) = &shift {
                if shift.enabled.x {
                    available_width = max_width;
                }
                if shift.enabled.y {
                    available_height = max_height;
                }
            }

            // Centered and unshifted: the element grows symmetrically, so the
            // tighter side bounds both.
            if shift.is_none() && alignment.is_none() {
                let symmetric = |length: f64, min: f64, max: f64| {
                    let (lo, hi) = (min.max(0.0), max.max(0.0));
                    let used = if lo != 0.0 || hi != 0.0 { lo + hi } else { min.max(max) };
                    length - 2.0 * used
                };
                match placement.main_axis() {
                    Axis::Y => available_width = symmetric(width, overflow.left, overflow.right),
                    Axis::X => available_height = symmetric(height, overflow.top, overflow.bottom),
                }
            }

            let data = SizeData {
                available_width: available_width.max(0.0),
                available_height: available_height.max(0.0),
            };
            let floating = state.elements.floating;
            let before = state.platform.get_dimensions(floating).await?;
            if let Some(apply) = &self.apply {
                apply(&data);
            }
            let next = state.platform.get_dimensions(floating).await?;

            let ret = MiddlewareReturn::default().with_data(&data)?;
            if next != before {
                tracing::debug!(
                    width = next.width,
                    height = next.height,
                    "size: floating element resized, refetching rects"
                );
                return Ok(ret.with_reset(Reset::refetch_rects()));
            }
            Ok(ret)
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ElementRects, Placement, Rect, Strategy, compute_coords_from_placement};
    use crate::middleware::{Elements, MiddlewareData};
    use crate::platform::MemoryPlatform;
    use futures::executor::block_on;
    use serde_json::json;

    const RECTS: ElementRects = ElementRects {
        reference: Rect::new(50.0, 40.0, 20.0, 10.0),
        floating: Rect::new(0.0, 0.0, 30.0, 20.0),
    };

    fn platform(floating: Rect) -> MemoryPlatform<&'static str> {
        MemoryPlatform::new(Rect::new(0.0, 0.0, 200.0, 100.0))
            .with_element("ref", RECTS.reference)
            .with_element("float", floating)
    }

    fn run(
        size: &Size<&'static str>,
        platform: &MemoryPlatform<&'static str>,
        placement: Placement,
        data: &MiddlewareData,
    ) -> MiddlewareReturn {
        let at = compute_coords_from_placement(&RECTS, placement, false);
        let state = MiddlewareState {
            x: at.x,
            y: at.y,
            initial_placement: placement,
            placement,
            strategy: Strategy::Absolute,
            rtl: false,
            rects: &RECTS,
            middleware_data: data,
            elements: Elements {
                reference: &"ref",
                floating: &"float",
            },
            platform,
            reset_count: 0,
        };
        block_on(size.compute(state)).unwrap()
    }

    fn size_data(r: &MiddlewareReturn) -> SizeData {
        serde_json::from_value(r.data.clone().unwrap()).unwrap()
    }

    #[test]
    fn growth_sides_follow_alignment() {
        assert_eq!(growth_sides(Side::Bottom, None, false), (Side::Right, Side::Bottom));
        assert_eq!(
            growth_sides(Side::Top, Some(Alignment::End), false),
            (Side::Left, Side::Top)
        );
        assert_eq!(
            growth_sides(Side::Top, Some(Alignment::Start), true),
            (Side::Left, Side::Top)
        );
        assert_eq!(
            growth_sides(Side::Right, Some(Alignment::End), false),
            (Side::Right, Side::Top)
        );
    }

    #[test]
    fn centered_width_is_symmetric() {
        let p = platform(RECTS.floating);
        let r = run(&size(), &p, Placement::Bottom, &MiddlewareData::default());
        // Center x = 60, nearest edge 60 away; below the reference 50 rows remain.
        assert_eq!(
            size_data(&r),
            SizeData {
                available_width: 120.0,
                available_height: 50.0
            }
        );
        assert_eq!(r.reset, None);
    }

    #[test]
    fn aligned_width_runs_to_edge() {
        let p = platform(RECTS.floating);
        let r = run(&size(), &p, Placement::BottomStart, &MiddlewareData::default());
        assert_eq!(size_data(&r).available_width, 150.0);
    }

    #[test]
    fn shift_enabled_axis_gets_full_boundary() {
        let p = platform(RECTS.floating);
        let mut data = MiddlewareData::default();
        data.merge(
            "shift",
            json!({"x": 0.0, "y": 0.0, "enabled": {"x": true, "y": false}}),
        );
        let r = run(&size(), &p, Placement::Bottom, &data);
        assert_eq!(size_data(&r).available_width, 200.0);
    }

    #[test]
    fn never_negative() {
        let p = MemoryPlatform::new(Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_element("float", RECTS.floating);
        let r = run(&size(), &p, Placement::Bottom, &MiddlewareData::default());
        let d = size_data(&r);
        assert_eq!(d.available_height, 0.0);
        assert!(d.available_width >= 0.0);
    }

    #[test]
    fn apply_sees_data_and_resize_requests_refetch() {
        use std::cell::Cell;
        use std::rc::Rc;

        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        let s = size().apply(move |d| sink.set(d.available_height));

        let same = platform(RECTS.floating);
        let r = run(&s, &same, Placement::Bottom, &MiddlewareData::default());
        assert_eq!(seen.get(), 50.0);
        assert_eq!(r.reset, None);

        let host = Rc::new(platform(RECTS.floating));
        let target = Rc::clone(&host);
        let grow = size().apply(move |d| {
            target.set_rect("float", Rect::new(0.0, 0.0, 30.0, d.available_height));
        });
        let r = run(&grow, &host, Placement::Bottom, &MiddlewareData::default());
        assert_eq!(r.reset, Some(Reset::refetch_rects()));
        assert!(r.data.is_some());
    }

    #[test]
    fn unchanged_dimensions_do_not_refetch() {
        // Rects may be in offset-parent space and differ from the measured
        // dimensions; only a change made during `apply` counts.
        let p = platform(Rect::new(0.0, 0.0, 60.0, 40.0));
        let s = size().apply(|_| {});
        let r = run(&s, &p, Placement::Bottom, &MiddlewareData::default());
        assert_eq!(r.reset, None);
    }
}

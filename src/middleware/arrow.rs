//! Arrow: position an arrow element on the floating element's edge.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Axis, Padding, Side, clamp};
use crate::middleware::{Middleware, MiddlewareReturn, MiddlewareState};
use crate::platform::OffsetParent;

/// Arrow position, relative to the floating element.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrowData {
    /// Offset along x; set for top/bottom placements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Offset along y; set for left/right placements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Distance from the ideal centered position lost to clamping. Zero when
    /// the arrow points at the reference's center.
    pub center_offset: f64,
    /// How far the floating element was moved to keep the arrow on a small
    /// reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_offset: Option<f64>,
    /// Edge of the floating element the arrow sits on.
    pub static_side: Side,
}

/// Center an arrow element on the reference, clamped to stay within the
/// floating element with `padding` from its corners.
#[derive(Clone, Debug)]
pub struct Arrow<E> {
    element: E,
    padding: Padding,
}

/// Create an [`Arrow`] middleware for `element`.
pub fn arrow<E>(element: E) -> Arrow<E> {
    Arrow {
        element,
        padding: Padding::default(),
    }
}

impl<E> Arrow<E> {
    pub const NAME: &'static str = "arrow";

    /// Minimum distance between the arrow and the floating element's corners.
    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn element(&self) -> &E {
        &self.element
    }
}

impl<E> Middleware<E> for Arrow<E> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        async move {
            let placement = state.placement;
            let rects = state.rects;
            let axis = placement.cross_axis();
            let padding = self.padding.resolve();
            let (min_side, max_side) = axis.sides();

            let arrow_len = state.platform.get_dimensions(&self.element).await?.length(axis);
            let coord = match axis {
                Axis::X => state.x,
                Axis::Y => state.y,
            };

            let end_diff = rects.reference.length(axis) + rects.reference.coord(axis)
                - coord
                - rects.floating.length(axis);
            let start_diff = coord - rects.reference.coord(axis);

            let parent_len = match state.platform.get_offset_parent(&self.element).await? {
                Some(OffsetParent::Element(parent)) => {
                    state.platform.get_dimensions(&parent).await?.length(axis)
                }
                _ => 0.0,
            };
            let client = if parent_len > 0.0 {
                parent_len
            } else {
                rects.floating.length(axis)
            };

            let largest_padding = client / 2.0 - arrow_len / 2.0 - 1.0;
            let min_padding = padding.get(min_side).min(largest_padding);
            let max_padding = padding.get(max_side).min(largest_padding);
            let min = min_padding;
            let max = client - arrow_len - max_padding;
            let center = client / 2.0 - arrow_len / 2.0 + (end_diff / 2.0 - start_diff / 2.0);
            let offset = clamp(min, center, max);

            // On an aligned placement with a reference too small to host the
            // clamped arrow, move the floating element instead.
            let edge_padding = if center < min { min_padding } else { max_padding };
            let needs_alignment_offset = placement.alignment().is_some()
                && center != offset
                && rects.reference.length(axis) / 2.0 - edge_padding - arrow_len / 2.0 < 0.0;
            let alignment_offset = if !needs_alignment_offset {
                0.0
            } else if center < min {
                center - min
            } else {
                center - max
            };

            let data = ArrowData {
                x: (axis == Axis::X).then_some(offset),
                y: (axis == Axis::Y).then_some(offset),
                center_offset: center - offset - alignment_offset,
                alignment_offset: needs_alignment_offset.then_some(alignment_offset),
                static_side: placement.side().opposite(),
            };
            let moved = coord + alignment_offset;
            let ret = match axis {
                Axis::X => MiddlewareReturn::coords(moved, state.y),
                Axis::Y => MiddlewareReturn::coords(state.x, moved),
            };
            ret.with_data(&data)
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ElementRects, Placement, Rect, Strategy};
    use crate::middleware::{Elements, MiddlewareData};
    use crate::platform::MemoryPlatform;
    use futures::executor::block_on;

    fn run(
        arrow: &Arrow<&'static str>,
        platform: &MemoryPlatform<&'static str>,
        rects: &ElementRects,
        placement: Placement,
        x: f64,
        y: f64,
    ) -> (MiddlewareReturn, ArrowData) {
        let data = MiddlewareData::default();
        let state = MiddlewareState {
            x,
            y,
            initial_placement: placement,
            placement,
            strategy: Strategy::Absolute,
            rtl: false,
            rects,
            middleware_data: &data,
            elements: Elements {
                reference: &"ref",
                floating: &"float",
            },
            platform,
            reset_count: 0,
        };
        let r = block_on(arrow.compute(state)).unwrap();
        let d = serde_json::from_value(r.data.clone().unwrap()).unwrap();
        (r, d)
    }

    fn platform() -> MemoryPlatform<&'static str> {
        MemoryPlatform::new(Rect::new(0.0, 0.0, 200.0, 100.0))
            .with_element("arrow", Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    const RECTS: ElementRects = ElementRects {
        reference: Rect::new(50.0, 40.0, 20.0, 10.0),
        floating: Rect::new(0.0, 0.0, 30.0, 20.0),
    };

    #[test]
    fn centered_on_reference() {
        let (r, d) = run(&arrow("arrow"), &platform(), &RECTS, Placement::Bottom, 45.0, 50.0);
        assert_eq!(d.x, Some(10.0));
        assert_eq!(d.y, None);
        assert_eq!(d.center_offset, 0.0);
        assert_eq!(d.alignment_offset, None);
        assert_eq!(d.static_side, Side::Top);
        assert_eq!((r.x, r.y), (Some(45.0), Some(50.0)));
    }

    #[test]
    fn clamped_inside_floating_when_shifted_away() {
        let (r, d) = run(&arrow("arrow"), &platform(), &RECTS, Placement::Bottom, 100.0, 50.0);
        assert_eq!(d.x, Some(0.0));
        assert_eq!(d.center_offset, -45.0);
        assert_eq!(r.x, Some(100.0));
    }

    #[test]
    fn vertical_placement_uses_y() {
        let rects = ElementRects {
            reference: Rect::new(50.0, 40.0, 20.0, 30.0),
            floating: Rect::new(0.0, 0.0, 30.0, 50.0),
        };
        let (_, d) = run(&arrow("arrow"), &platform(), &rects, Placement::Right, 70.0, 30.0);
        assert_eq!(d.y, Some(20.0));
        assert_eq!(d.x, None);
        assert_eq!(d.static_side, Side::Left);
    }

    #[test]
    fn small_reference_moves_aligned_floating() {
        let rects = ElementRects {
            reference: Rect::new(50.0, 40.0, 4.0, 10.0),
            floating: Rect::new(0.0, 0.0, 30.0, 20.0),
        };
        let a = arrow("arrow").padding(5.0);
        let (r, d) = run(&a, &platform(), &rects, Placement::BottomStart, 50.0, 50.0);
        assert_eq!(d.x, Some(5.0));
        assert_eq!(d.alignment_offset, Some(-8.0));
        assert_eq!(d.center_offset, 0.0);
        assert_eq!(r.x, Some(42.0));
    }

    #[test]
    fn offset_parent_sets_client_length() {
        let p = platform()
            .with_element("wrapper", Rect::new(0.0, 0.0, 50.0, 50.0))
            .with_offset_parent("arrow", "wrapper");
        let (_, d) = run(&arrow("arrow"), &p, &RECTS, Placement::Bottom, 45.0, 50.0);
        // client 50: center = 25 - 5 + 0 = 20.
        assert_eq!(d.x, Some(20.0));
    }

    #[test]
    fn missing_arrow_element_fails() {
        let data = MiddlewareData::default();
        let p = platform();
        let state = MiddlewareState {
            x: 0.0,
            y: 0.0,
            initial_placement: Placement::Top,
            placement: Placement::Top,
            strategy: Strategy::Absolute,
            rtl: false,
            rects: &RECTS,
            middleware_data: &data,
            elements: Elements {
                reference: &"ref",
                floating: &"float",
            },
            platform: &p,
            reset_count: 0,
        };
        let err = block_on(arrow("gone").compute(state)).unwrap_err();
        assert!(matches!(err, PositionError::UnknownElement(_)));
    }
}

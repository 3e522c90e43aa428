//! Offset: move the floating element away from (or along) the reference.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{OffsetOptions, coords_from_offset_value};
use crate::middleware::{Middleware, MiddlewareReturn, MiddlewareState};

/// Displacement applied by [`Offset`], relative to the coordinates it received.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetData {
    pub x: f64,
    pub y: f64,
}

/// Translate by a distance along the placement's main and cross axes.
///
/// Dynamic options are evaluated on every run against the current placement,
/// so an offset that depends on the side follows a flip.
#[derive(Debug, Default)]
pub struct Offset {
    options: OffsetOptions,
}

impl Offset {
    pub const NAME: &'static str = "offset";

    pub fn new(options: impl Into<OffsetOptions>) -> Self {
        Self {
            options: options.into(),
        }
    }

    pub fn options(&self) -> &OffsetOptions {
        &self.options
    }
}

/// Create an [`Offset`] middleware.
///
/// ```
/// use zenfloat::{OffsetAxes, offset};
///
/// let gutter = offset(8.0);
/// let skidded = offset(OffsetAxes { main_axis: 8.0, cross_axis: 4.0, ..Default::default() });
/// # let _ = (gutter, skidded);
/// ```
pub fn offset(options: impl Into<OffsetOptions>) -> Offset {
    Offset::new(options)
}

impl<E> Middleware<E> for Offset {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        async move {
            let diff =
                coords_from_offset_value(state.placement, state.rects, &self.options, state.rtl);
            MiddlewareReturn::coords(state.x + diff.x, state.y + diff.y)
                .with_data(&OffsetData {
                    x: diff.x,
                    y: diff.y,
                })
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ElementRects, OffsetAxes, OffsetValue, Placement, Rect, Side, Strategy};
    use crate::middleware::{Elements, MiddlewareData};
    use crate::platform::MemoryPlatform;
    use futures::executor::block_on;

    fn run(offset: &Offset, placement: Placement) -> MiddlewareReturn {
        let platform = MemoryPlatform::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let rects = ElementRects {
            reference: Rect::new(10.0, 10.0, 40.0, 20.0),
            floating: Rect::new(0.0, 0.0, 10.0, 10.0),
        };
        let data = MiddlewareData::default();
        let state = MiddlewareState {
            x: 100.0,
            y: 200.0,
            initial_placement: placement,
            placement,
            strategy: Strategy::Absolute,
            rtl: false,
            rects: &rects,
            middleware_data: &data,
            elements: Elements {
                reference: &0u8,
                floating: &1u8,
            },
            platform: &platform,
            reset_count: 0,
        };
        block_on(Middleware::<u8>::compute(offset, state)).unwrap()
    }

    #[test]
    fn adds_delta_and_records_it() {
        let r = run(&offset(5.0), Placement::Bottom);
        assert_eq!((r.x, r.y), (Some(100.0), Some(205.0)));
        assert_eq!(
            r.data.map(|d| serde_json::from_value::<OffsetData>(d).unwrap()),
            Some(OffsetData { x: 0.0, y: 5.0 })
        );
        assert_eq!(r.reset, None);
    }

    #[test]
    fn axes_on_right_start() {
        let o = offset(OffsetAxes {
            main_axis: 10.0,
            cross_axis: 5.0,
            alignment_axis: None,
        });
        let r = run(&o, Placement::RightStart);
        assert_eq!((r.x, r.y), (Some(110.0), Some(205.0)));
    }

    #[test]
    fn default_is_noop() {
        let r = run(&Offset::default(), Placement::LeftEnd);
        assert_eq!((r.x, r.y), (Some(100.0), Some(200.0)));
    }

    #[test]
    fn function_matches_static_value() {
        let dynamic = offset(OffsetOptions::dynamic(|_| {
            OffsetValue::Axes(OffsetAxes {
                main_axis: 3.0,
                cross_axis: -2.0,
                alignment_axis: None,
            })
        }));
        let fixed = offset(OffsetAxes {
            main_axis: 3.0,
            cross_axis: -2.0,
            alignment_axis: None,
        });
        for p in Placement::ALL {
            assert_eq!(run(&dynamic, p), run(&fixed, p));
        }
    }

    #[test]
    fn function_sees_current_placement() {
        let o = offset(OffsetOptions::dynamic(|ctx| match ctx.placement.side() {
            Side::Top => OffsetValue::Scalar(ctx.reference.height),
            _ => OffsetValue::Scalar(1.0),
        }));
        assert_eq!(run(&o, Placement::Top).y, Some(180.0));
        assert_eq!(run(&o, Placement::Bottom).y, Some(201.0));
    }
}

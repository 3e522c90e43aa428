//! The positioning pipeline.
//!
//! [`compute_position`] measures the elements, derives base coordinates from
//! the placement, then runs the middleware in order. A middleware may request
//! a [`Reset`](crate::Reset): the placement and/or rects are replaced, base
//! coordinates are recomputed, and the list restarts from the first
//! middleware. Resets are bounded by [`ComputePositionConfig::max_resets`];
//! further requests are ignored together with the data returned alongside
//! them.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Placement, Strategy, compute_coords_from_placement};
use crate::middleware::{Elements, Middleware, MiddlewareData, MiddlewareState, ResetRects};
use crate::platform::Platform;

/// Default bound on resets per computation.
pub const DEFAULT_MAX_RESETS: usize = 50;

/// Input to [`compute_position`].
pub struct ComputePositionConfig<E> {
    pub placement: Placement,
    pub strategy: Strategy,
    /// Run in order. Nothing is added implicitly.
    pub middleware: Vec<Box<dyn Middleware<E>>>,
    /// Resets honored before further reset requests are ignored.
    pub max_resets: usize,
}

impl<E> fmt::Debug for ComputePositionConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.middleware.iter().map(|m| m.name()).collect();
        f.debug_struct("ComputePositionConfig")
            .field("placement", &self.placement)
            .field("strategy", &self.strategy)
            .field("middleware", &names)
            .field("max_resets", &self.max_resets)
            .finish()
    }
}

impl<E> Default for ComputePositionConfig<E> {
    fn default() -> Self {
        Self {
            placement: Placement::Bottom,
            strategy: Strategy::Absolute,
            middleware: Vec::new(),
            max_resets: DEFAULT_MAX_RESETS,
        }
    }
}

impl<E> ComputePositionConfig<E> {
    /// `bottom`, `absolute`, no middleware.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Append a middleware.
    pub fn middleware(mut self, middleware: impl Middleware<E> + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Append an already boxed middleware.
    pub fn boxed_middleware(mut self, middleware: Box<dyn Middleware<E>>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn max_resets(mut self, max_resets: usize) -> Self {
        self.max_resets = max_resets;
        self
    }
}

/// Final position of the floating element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComputePositionReturn {
    pub x: f64,
    pub y: f64,
    /// Placement after any flips.
    pub placement: Placement,
    pub strategy: Strategy,
    pub middleware_data: MiddlewareData,
}

/// Compute the position of `floating` next to `reference`.
///
/// Fails with the platform's error when a geometry query fails, and with
/// [`PositionError::NonFiniteCoords`] when a middleware produces NaN or
/// infinite coordinates. Never returns a partial result.
///
/// ```
/// use futures::executor::block_on;
/// use zenfloat::{
///     ComputePositionConfig, MemoryPlatform, Placement, Rect, compute_position, offset,
/// };
///
/// let platform = MemoryPlatform::new(Rect::new(0.0, 0.0, 800.0, 600.0))
///     .with_element("button", Rect::new(100.0, 100.0, 50.0, 20.0))
///     .with_element("tooltip", Rect::new(0.0, 0.0, 30.0, 10.0));
/// let config = ComputePositionConfig::new()
///     .placement(Placement::Bottom)
///     .middleware(offset(5.0));
///
/// let pos = block_on(compute_position(&"button", &"tooltip", &config, &platform)).unwrap();
/// assert_eq!((pos.x, pos.y), (110.0, 125.0));
/// ```
pub async fn compute_position<E, P>(
    reference: &E,
    floating: &E,
    config: &ComputePositionConfig<E>,
    platform: &P,
) -> Result<ComputePositionReturn, PositionError>
where
    P: Platform<E>,
{
    let strategy = config.strategy;
    let initial_placement = config.placement;
    let rtl = platform.is_rtl(floating).await?;
    let mut rects = platform.get_element_rects(reference, floating, strategy).await?;
    let mut placement = initial_placement;
    let mut coords = compute_coords_from_placement(&rects, placement, rtl);
    let mut middleware_data = MiddlewareData::default();
    let mut reset_count = 0usize;
    let elements = Elements {
        reference,
        floating,
    };

    let mut index = 0;
    while let Some(middleware) = config.middleware.get(index) {
        let name = middleware.name();
        let state = MiddlewareState {
            x: coords.x,
            y: coords.y,
            initial_placement,
            placement,
            strategy,
            rtl,
            rects: &rects,
            middleware_data: &middleware_data,
            elements,
            platform,
            reset_count,
        };
        let result = middleware.compute(state).await?;

        let next_x = result.x.unwrap_or(coords.x);
        let next_y = result.y.unwrap_or(coords.y);
        if !next_x.is_finite() || !next_y.is_finite() {
            return Err(PositionError::NonFiniteCoords {
                middleware: name.to_owned(),
                x: next_x,
                y: next_y,
            });
        }
        coords.x = next_x;
        coords.y = next_y;
        tracing::trace!(index, middleware = name, x = coords.x, y = coords.y, "middleware step");

        let Some(reset) = result.reset else {
            if let Some(data) = result.data {
                middleware_data.merge(name, data);
            }
            index += 1;
            continue;
        };
        // A refused reset also drops the data describing it.
        if reset_count >= config.max_resets {
            tracing::warn!(
                middleware = name,
                max_resets = config.max_resets,
                "reset limit reached, ignoring reset request"
            );
            index += 1;
            continue;
        }
        if let Some(data) = result.data {
            middleware_data.merge(name, data);
        }

        reset_count += 1;
        if let Some(next) = reset.placement {
            placement = next;
        }
        match reset.rects {
            Some(ResetRects::Refetch) => {
                rects = platform.get_element_rects(reference, floating, strategy).await?;
            }
            Some(ResetRects::Rects(replacement)) => rects = replacement,
            None => {}
        }
        coords = compute_coords_from_placement(&rects, placement, rtl);

        // Everything after the resetting middleware reruns from scratch.
        for later in &config.middleware[index + 1..] {
            if later.name() != name {
                middleware_data.remove(later.name());
            }
        }
        tracing::debug!(
            middleware = name,
            placement = %placement,
            reset_count,
            "pipeline reset"
        );
        index = 0;
    }

    Ok(ComputePositionReturn {
        x: coords.x,
        y: coords.y,
        placement,
        strategy,
        middleware_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::middleware::{MiddlewareReturn, Reset, offset};
    use crate::platform::MemoryPlatform;
    use futures::executor::block_on;
    use futures::future::{FutureExt, LocalBoxFuture};

    /// Requests a reset on every run.
    struct AlwaysReset;

    impl<E> Middleware<E> for AlwaysReset {
        fn name(&self) -> &str {
            "always"
        }

        fn compute<'a>(
            &'a self,
            state: MiddlewareState<'a, E>,
        ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
            let next = if state.placement == Placement::Top {
                Placement::Bottom
            } else {
                Placement::Top
            };
            async move { Ok(MiddlewareReturn::reset(Reset::placement(next))) }.boxed_local()
        }
    }

    /// Records how many resets it has seen.
    struct Counter;

    impl<E> Middleware<E> for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn compute<'a>(
            &'a self,
            state: MiddlewareState<'a, E>,
        ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
            async move {
                MiddlewareReturn::default()
                    .with_data(&serde_json::json!({ "resets": state.reset_count }))
            }
            .boxed_local()
        }
    }

    /// Moves to the top and says so.
    struct Announce;

    impl<E> Middleware<E> for Announce {
        fn name(&self) -> &str {
            "announce"
        }

        fn compute<'a>(
            &'a self,
            state: MiddlewareState<'a, E>,
        ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
            async move {
                MiddlewareReturn::reset(Reset::placement(Placement::Top))
                    .with_data(&serde_json::json!({ "from": state.placement }))
            }
            .boxed_local()
        }
    }

    fn platform() -> MemoryPlatform<&'static str> {
        MemoryPlatform::new(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_element("ref", Rect::new(100.0, 100.0, 50.0, 20.0))
            .with_element("float", Rect::new(0.0, 0.0, 30.0, 10.0))
    }

    #[test]
    fn no_middleware_returns_base_coords() {
        let config = ComputePositionConfig::new().placement(Placement::Top);
        let r = block_on(compute_position(&"ref", &"float", &config, &platform())).unwrap();
        assert_eq!((r.x, r.y), (110.0, 90.0));
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.strategy, Strategy::Absolute);
        assert!(r.middleware_data.is_empty());
    }

    #[test]
    fn resets_are_bounded() {
        let config = ComputePositionConfig::new()
            .middleware(AlwaysReset)
            .middleware(Counter)
            .max_resets(3);
        let r = block_on(compute_position(&"ref", &"float", &config, &platform())).unwrap();
        // Bottom -> Top -> Bottom -> Top, then the fourth request is ignored.
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.middleware_data.get_as::<serde_json::Value>("counter").unwrap()["resets"], 3);
    }

    #[test]
    fn zero_max_resets_disables_resets() {
        let config = ComputePositionConfig::new().middleware(AlwaysReset).max_resets(0);
        let r = block_on(compute_position(&"ref", &"float", &config, &platform())).unwrap();
        assert_eq!(r.placement, Placement::Bottom);
        assert_eq!((r.x, r.y), (110.0, 120.0));
    }

    #[test]
    fn refused_reset_drops_its_data() {
        let config = ComputePositionConfig::new().middleware(Announce).max_resets(0);
        let r = block_on(compute_position(&"ref", &"float", &config, &platform())).unwrap();
        assert_eq!(r.placement, Placement::Bottom);
        assert!(!r.middleware_data.contains("announce"));

        // The honored reset is recorded; the refused one on the rerun is not.
        let config = ComputePositionConfig::new().middleware(Announce).max_resets(1);
        let r = block_on(compute_position(&"ref", &"float", &config, &platform())).unwrap();
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(
            r.middleware_data.get("announce"),
            Some(&serde_json::json!({ "from": "bottom" }))
        );
    }

    #[test]
    fn config_debug_lists_middleware_names() {
        let config: ComputePositionConfig<&str> =
            ComputePositionConfig::new().middleware(offset(1.0));
        let text = format!("{config:?}");
        assert!(text.contains("\"offset\""));
        assert!(text.contains("max_resets: 50"));
    }
}

//! Flip: move to another placement when the current one overflows.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Alignment, Padding, Placement};
use crate::middleware::{Middleware, MiddlewareReturn, MiddlewareState, PlacementOverflow, Reset};
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::platform::{Boundary, RootBoundary};

/// What to do when every candidate placement overflows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// The attempted placement with the least total positive overflow.
    #[default]
    BestFit,
    /// Go back to the placement the caller asked for.
    InitialPlacement,
}

/// Attempt history published by [`Flip`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlipData {
    /// Index of the current candidate in `[initial, ...fallbacks]`.
    pub index: usize,
    /// Overflow of every placement tried so far, in attempt order.
    pub overflows: Vec<PlacementOverflow>,
}

/// Flip to a fallback placement when the current one overflows.
///
/// Each failed attempt requests a reset into the next candidate, so the whole
/// pipeline reruns against it. When candidates run out, the best attempted
/// placement wins.
#[derive(Clone, Debug)]
pub struct Flip<E> {
    main_axis: bool,
    cross_axis: bool,
    fallback_placements: Option<Vec<Placement>>,
    fallback_strategy: FallbackStrategy,
    fallback_axis_side_direction: Option<Alignment>,
    flip_alignment: bool,
    tolerance: f64,
    detect_overflow: DetectOverflowOptions<E>,
}

impl<E> Default for Flip<E> {
    fn default() -> Self {
        Self {
            main_axis: true,
            cross_axis: true,
            fallback_placements: None,
            fallback_strategy: FallbackStrategy::BestFit,
            fallback_axis_side_direction: Some(Alignment::Start),
            flip_alignment: true,
            tolerance: 0.0,
            detect_overflow: DetectOverflowOptions::default(),
        }
    }
}

/// Create a [`Flip`] middleware with default options.
pub fn flip<E>() -> Flip<E> {
    Flip::default()
}

impl<E> Flip<E> {
    pub const NAME: &'static str = "flip";

    /// Check overflow on the placement's side. Default: true.
    pub fn main_axis(mut self, check: bool) -> Self {
        self.main_axis = check;
        self
    }

    /// Check overflow on the alignment sides. Default: true.
    pub fn cross_axis(mut self, check: bool) -> Self {
        self.cross_axis = check;
        self
    }

    /// Explicit fallback order, replacing the derived one.
    pub fn fallback_placements(mut self, placements: Vec<Placement>) -> Self {
        self.fallback_placements = Some(placements);
        self
    }

    pub fn fallback_strategy(mut self, strategy: FallbackStrategy) -> Self {
        self.fallback_strategy = strategy;
        self
    }

    /// Order of the perpendicular sides tried after the opposite side.
    /// Default: `Start`. `None` tries the opposite side only. Ignored when
    /// explicit fallbacks are set.
    pub fn fallback_axis_side_direction(mut self, direction: impl Into<Option<Alignment>>) -> Self {
        self.fallback_axis_side_direction = direction.into();
        self
    }

    /// Try the opposite alignment before the opposite side. Default: true.
    pub fn flip_alignment(mut self, flip_alignment: bool) -> Self {
        self.flip_alignment = flip_alignment;
        self
    }

    /// Overflow up to this amount still counts as fitting. Default: 0.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
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

    /// `[initial, ...fallbacks]` for this run.
    fn candidates(&self, initial: Placement, rtl: bool) -> Vec<Placement> {
        let mut list = vec![initial];
        match &self.fallback_placements {
            Some(explicit) => list.extend(explicit.iter().copied()),
            None => {
                if initial.alignment().is_none() || !self.flip_alignment {
                    list.push(initial.opposite());
                } else {
                    list.extend(initial.expanded());
                }
                if let Some(direction) = self.fallback_axis_side_direction {
                    list.extend(initial.opposite_axis_placements(
                        self.flip_alignment,
                        direction,
                        rtl,
                    ));
                }
            }
        }
        list
    }

    /// Placement to settle on once every candidate has been tried.
    fn settle(&self, initial: Placement, attempts: &[PlacementOverflow]) -> Option<Placement> {
        let mut fitting_main: Vec<&PlacementOverflow> = attempts
            .iter()
            .filter(|a| a.overflows.first().copied().unwrap_or(0.0) <= self.tolerance)
            .collect();
        fitting_main.sort_by(|a, b| second(a).total_cmp(&second(b)));
        if let Some(best) = fitting_main.first() {
            return Some(best.placement);
        }

        match self.fallback_strategy {
            FallbackStrategy::BestFit => {
                let mut scored: Vec<(Placement, f64)> = attempts
                    .iter()
                    .map(|a| {
                        let total = a.overflows.iter().filter(|&&o| o > 0.0).sum::<f64>();
                        (a.placement, total)
                    })
                    .collect();
                scored.sort_by(|a, b| a.1.total_cmp(&b.1));
                scored.first().map(|(p, _)| *p)
            }
            FallbackStrategy::InitialPlacement => Some(initial),
        }
    }
}

fn second(attempt: &PlacementOverflow) -> f64 {
    attempt.overflows.get(1).copied().unwrap_or(0.0)
}

impl<E> Middleware<E> for Flip<E> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        async move {
            let placement = state.placement;
            let side = placement.side();
            let candidates = self.candidates(state.initial_placement, state.rtl);

            let overflow = detect_overflow(&state, &self.detect_overflow).await?;
            let mut overflows = Vec::with_capacity(3);
            if self.main_axis {
                overflows.push(overflow.get(side));
            }
            if self.cross_axis {
                let (a, b) = placement.alignment_sides(state.rects, state.rtl);
                overflows.push(overflow.get(a));
                overflows.push(overflow.get(b));
            }

            if overflows.iter().all(|&o| o <= self.tolerance) {
                return Ok(MiddlewareReturn::default());
            }

            let previous = state.middleware_data.flip().unwrap_or_default();
            let mut attempts = previous.overflows;
            attempts.push(PlacementOverflow {
                placement,
                overflows,
            });

            let next_index = previous.index + 1;
            if let Some(&next) = candidates.get(next_index) {
                tracing::debug!(from = %placement, to = %next, "flip: trying fallback placement");
                return MiddlewareReturn::reset(Reset::placement(next)).with_data(&FlipData {
                    index: next_index,
                    overflows: attempts,
                });
            }

            match self.settle(state.initial_placement, &attempts) {
                Some(settled) if settled != placement => {
                    tracing::debug!(placement = %settled, "flip: candidates exhausted, settling");
                    Ok(MiddlewareReturn::reset(Reset::placement(settled)))
                }
                _ => Ok(MiddlewareReturn::default()),
            }
        }
        .boxed_local()
    }
}

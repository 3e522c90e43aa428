//! AutoPlacement: choose the placement with the most space.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Alignment, Coords, Padding, Placement, compute_coords_from_placement};
use crate::middleware::{Middleware, MiddlewareReturn, MiddlewareState, PlacementOverflow, Reset};
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::platform::{Boundary, RootBoundary};

/// Outcome published by [`AutoPlacement`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoPlacementData {
    /// The chosen placement.
    pub placement: Placement,
    /// Overflow of every evaluated candidate, in candidate order.
    pub overflows: Vec<PlacementOverflow>,
}

/// Pick the placement with the least overflow among a candidate set.
///
/// Unlike [`Flip`](crate::Flip) there is no preferred placement: all
/// candidates are measured in one pass and the winner is adopted with a
/// reset. Once the decision is recorded in the middleware data, later passes
/// leave the placement alone.
#[derive(Clone, Debug)]
pub struct AutoPlacement<E> {
    cross_axis: bool,
    alignment: Option<Alignment>,
    allowed_placements: Vec<Placement>,
    auto_alignment: bool,
    detect_overflow: DetectOverflowOptions<E>,
}

impl<E> Default for AutoPlacement<E> {
    fn default() -> Self {
        Self {
            cross_axis: false,
            alignment: None,
            allowed_placements: Placement::ALL.to_vec(),
            auto_alignment: true,
            detect_overflow: DetectOverflowOptions::default(),
        }
    }
}

/// Create an [`AutoPlacement`] middleware with default options.
pub fn auto_placement<E>() -> AutoPlacement<E> {
    AutoPlacement::default()
}

impl<E> AutoPlacement<E> {
    pub const NAME: &'static str = "autoPlacement";

    /// Add the first alignment side's overflow to the score of aligned
    /// candidates. Default: false.
    pub fn cross_axis(mut self, enabled: bool) -> Self {
        self.cross_axis = enabled;
        self
    }

    /// Prefer placements with this alignment.
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Restrict the candidates. Default: all twelve.
    pub fn allowed_placements(mut self, placements: Vec<Placement>) -> Self {
        self.allowed_placements = placements;
        self
    }

    /// With an alignment set, also consider the opposite alignment.
    /// Default: true.
    pub fn auto_alignment(mut self, enabled: bool) -> Self {
        self.auto_alignment = enabled;
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

    /// Candidates in evaluation order.
    fn candidates(&self) -> Vec<Placement> {
        let all_allowed = self.allowed_placements == Placement::ALL;
        if self.alignment.is_none() && !all_allowed {
            return self.allowed_placements.clone();
        }
        match self.alignment {
            Some(alignment) => {
                let (matching, rest): (Vec<Placement>, Vec<Placement>) = self
                    .allowed_placements
                    .iter()
                    .partition(|p| p.alignment() == Some(alignment));
                matching
                    .into_iter()
                    .chain(rest)
                    .filter(|p| {
                        p.alignment() == Some(alignment)
                            || (self.auto_alignment && p.alignment().is_some())
                    })
                    .collect()
            }
            None => self
                .allowed_placements
                .iter()
                .copied()
                .filter(|p| p.alignment().is_none())
                .collect(),
        }
    }

    fn score(&self, attempt: &PlacementOverflow) -> f64 {
        let main = attempt.overflows[0];
        if self.cross_axis && attempt.placement.alignment().is_some() {
            main + attempt.overflows[1]
        } else {
            main
        }
    }

    /// Winner among evaluated candidates: the roomiest one that fits on every
    /// checked side, else the roomiest overall.
    fn choose(&self, attempts: &[PlacementOverflow]) -> Option<Placement> {
        let mut ranked: Vec<(&PlacementOverflow, f64)> =
            attempts.iter().map(|a| (a, self.score(a))).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let fits = |a: &PlacementOverflow| {
            let checked = if a.placement.alignment().is_some() { 2 } else { 3 };
            a.overflows.iter().take(checked).all(|&o| o <= 0.0)
        };
        ranked
            .iter()
            .find(|(a, _)| fits(*a))
            .or(ranked.first())
            .map(|(a, _)| a.placement)
    }
}

impl<E> Middleware<E> for AutoPlacement<E> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        async move {
            if let Some(decided) = state.middleware_data.auto_placement()
                && decided.placement == state.placement
            {
                return Ok(MiddlewareReturn::default());
            }

            let candidates = self.candidates();
            if candidates.is_empty() {
                return Ok(MiddlewareReturn::default());
            }

            // Displacement applied by earlier middleware, carried over to
            // every candidate in its own frame.
            let base = compute_coords_from_placement(state.rects, state.placement, state.rtl);
            let (main, cross) = state.placement.decompose(Coords::new(state.x, state.y) - base);

            let mut attempts = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                let at = compute_coords_from_placement(state.rects, candidate, state.rtl)
                    + candidate.project(main, cross);
                let trial = MiddlewareState {
                    x: at.x,
                    y: at.y,
                    placement: candidate,
                    ..state
                };
                let overflow = detect_overflow(&trial, &self.detect_overflow).await?;
                let (a, b) = candidate.alignment_sides(state.rects, state.rtl);
                attempts.push(PlacementOverflow {
                    placement: candidate,
                    overflows: vec![
                        overflow.get(candidate.side()),
                        overflow.get(a),
                        overflow.get(b),
                    ],
                });
            }

            let Some(winner) = self.choose(&attempts) else {
                return Ok(MiddlewareReturn::default());
            };
            let data = AutoPlacementData {
                placement: winner,
                overflows: attempts,
            };
            if winner == state.placement {
                return MiddlewareReturn::default().with_data(&data);
            }
            tracing::debug!(
                from = %state.placement,
                to = %winner,
                "autoPlacement: adopting placement"
            );
            MiddlewareReturn::reset(Reset::placement(winner)).with_data(&data)
        }
        .boxed_local()
    }
}

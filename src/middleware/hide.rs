//! Hide: report when the floating element should be hidden.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Padding, Rect, Sides};
use crate::middleware::{Middleware, MiddlewareReturn, MiddlewareState};
use crate::overflow::{DetectOverflowOptions, ElementContext, detect_overflow};
use crate::platform::{Boundary, RootBoundary};

/// What [`Hide`] checks for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideStrategy {
    /// The reference is fully clipped by its boundary.
    #[default]
    ReferenceHidden,
    /// The floating element is fully outside the reference's boundary.
    Escaped,
}

/// Visibility flags published by [`Hide`]. Each strategy fills its own pair
/// of fields, so two hide middleware with different strategies share one
/// entry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HideData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_hidden_offsets: Option<Sides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escaped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escaped_offsets: Option<Sides>,
}

/// Detect clipped references and escaped floating elements. Never moves
/// anything.
#[derive(Clone, Debug)]
pub struct Hide<E> {
    strategy: HideStrategy,
    detect_overflow: DetectOverflowOptions<E>,
}

impl<E> Default for Hide<E> {
    fn default() -> Self {
        Self {
            strategy: HideStrategy::ReferenceHidden,
            detect_overflow: DetectOverflowOptions::default(),
        }
    }
}

/// Create a [`Hide`] middleware with default options.
pub fn hide<E>() -> Hide<E> {
    Hide::default()
}

impl<E> Hide<E> {
    pub const NAME: &'static str = "hide";

    pub fn strategy(mut self, strategy: HideStrategy) -> Self {
        self.strategy = strategy;
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

/// Overflow minus the element's extent. A side at or above zero is clipped
/// entirely.
fn side_offsets(overflow: &Sides, rect: &Rect) -> Sides {
    Sides::new(
        overflow.top - rect.height,
        overflow.right - rect.width,
        overflow.bottom - rect.height,
        overflow.left - rect.width,
    )
}

fn any_side_fully_clipped(offsets: &Sides) -> bool {
    [offsets.top, offsets.right, offsets.bottom, offsets.left]
        .iter()
        .any(|&v| v >= 0.0)
}

impl<E: Clone> Middleware<E> for Hide<E> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        async move {
            let data = match self.strategy {
                HideStrategy::ReferenceHidden => {
                    let options = self
                        .detect_overflow
                        .clone()
                        .element_context(ElementContext::Reference);
                    let overflow = detect_overflow(&state, &options).await?;
                    let offsets = side_offsets(&overflow, &state.rects.reference);
                    HideData {
                        reference_hidden: Some(any_side_fully_clipped(&offsets)),
                        reference_hidden_offsets: Some(offsets),
                        ..HideData::default()
                    }
                }
                HideStrategy::Escaped => {
                    let options = self.detect_overflow.clone().alt_boundary(true);
                    let overflow = detect_overflow(&state, &options).await?;
                    let offsets = side_offsets(&overflow, &state.rects.floating);
                    HideData {
                        escaped: Some(any_side_fully_clipped(&offsets)),
                        escaped_offsets: Some(offsets),
                        ..HideData::default()
                    }
                }
            };
            MiddlewareReturn::default().with_data(&data)
        }
        .boxed_local()
    }
}

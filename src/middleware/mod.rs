//! Middleware contract and the built-in middleware.
//!
//! A middleware is a named unit that looks at the current
//! [`MiddlewareState`] and returns a [`MiddlewareReturn`]: new coordinates,
//! diagnostic data published under its name, and optionally a [`Reset`] that
//! restarts the pipeline. Custom middleware implement [`Middleware`] the same
//! way the built-ins do.
//!
//! # Writing a middleware
//!
//! ```
//! use futures::future::{FutureExt, LocalBoxFuture};
//! use zenfloat::{Middleware, MiddlewareReturn, MiddlewareState, PositionError};
//!
//! /// Snap the floating element to a 4px grid.
//! struct Snap;
//!
//! impl<E> Middleware<E> for Snap {
//!     fn name(&self) -> &str {
//!         "snap"
//!     }
//!
//!     fn compute<'a>(
//!         &'a self,
//!         state: MiddlewareState<'a, E>,
//!     ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
//!         async move {
//!             Ok(MiddlewareReturn::coords(
//!                 (state.x / 4.0).round() * 4.0,
//!                 (state.y / 4.0).round() * 4.0,
//!             ))
//!         }
//!         .boxed_local()
//!     }
//! }
//! ```

mod arrow;
mod auto_placement;
mod flip;
mod hide;
mod offset;
mod shift;
mod size;

pub use arrow::{Arrow, ArrowData, arrow};
pub use auto_placement::{AutoPlacement, AutoPlacementData, auto_placement};
pub use flip::{FallbackStrategy, Flip, FlipData, flip};
pub use hide::{Hide, HideData, HideStrategy, hide};
pub use offset::{Offset, OffsetData, offset};
pub use shift::{EnabledAxes, LimitShift, Shift, ShiftData, limit_shift, shift};
pub use size::{Size, SizeData, size};

use std::collections::BTreeMap;

use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PositionError;
use crate::geometry::{ElementRects, Placement, Strategy};
use crate::platform::Platform;

/// A named, configurable positioning step.
pub trait Middleware<E> {
    /// Key under which this middleware's data is published.
    fn name(&self) -> &str;

    /// Run against the current state.
    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>>;
}

impl<E, M: Middleware<E> + ?Sized> Middleware<E> for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compute<'a>(
        &'a self,
        state: MiddlewareState<'a, E>,
    ) -> LocalBoxFuture<'a, Result<MiddlewareReturn, PositionError>> {
        (**self).compute(state)
    }
}

/// The reference and floating element handles.
pub struct Elements<'a, E> {
    pub reference: &'a E,
    pub floating: &'a E,
}

impl<E> Clone for Elements<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Elements<'_, E> {}

/// Everything a middleware can see for one step of the pipeline.
///
/// A read-only, copyable view over the orchestrator's locals. Middleware that
/// need to evaluate hypothetical positions (e.g. auto-placement) copy it with
/// different coordinates: `MiddlewareState { x, y, ..state }`.
pub struct MiddlewareState<'a, E> {
    /// Current floating x.
    pub x: f64,
    /// Current floating y.
    pub y: f64,
    /// Placement the caller asked for.
    pub initial_placement: Placement,
    /// Placement after any resets.
    pub placement: Placement,
    pub strategy: Strategy,
    /// Whether the floating element lays out right-to-left.
    pub rtl: bool,
    /// Rect snapshot for this pass.
    pub rects: &'a ElementRects,
    /// Data published so far.
    pub middleware_data: &'a MiddlewareData,
    pub elements: Elements<'a, E>,
    pub platform: &'a dyn Platform<E>,
    /// Number of resets so far in this computation.
    pub reset_count: usize,
}

impl<E> Clone for MiddlewareState<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for MiddlewareState<'_, E> {}

/// How the rect snapshot changes on reset.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResetRects {
    /// Query the platform again.
    Refetch,
    /// Use these rects.
    Rects(ElementRects),
}

/// Request to restart the pipeline from the first middleware.
///
/// Base coordinates are always recomputed from the (possibly new) placement
/// and rects.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Reset {
    pub placement: Option<Placement>,
    pub rects: Option<ResetRects>,
}

impl Reset {
    /// Restart with a new placement.
    pub const fn placement(placement: Placement) -> Self {
        Self {
            placement: Some(placement),
            rects: None,
        }
    }

    /// Restart with freshly measured rects.
    pub const fn refetch_rects() -> Self {
        Self {
            placement: None,
            rects: Some(ResetRects::Refetch),
        }
    }
}

/// Result of one middleware step. `None` fields leave the state unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MiddlewareReturn {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Shallow-merged into this middleware's entry in [`MiddlewareData`].
    pub data: Option<Value>,
    pub reset: Option<Reset>,
}

impl MiddlewareReturn {
    /// Move the floating element.
    pub const fn coords(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            data: None,
            reset: None,
        }
    }

    /// Restart the pipeline.
    pub const fn reset(reset: Reset) -> Self {
        Self {
            x: None,
            y: None,
            data: None,
            reset: Some(reset),
        }
    }

    /// Attach serialized diagnostic data.
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Result<Self, PositionError> {
        self.data = Some(serde_json::to_value(data)?);
        Ok(self)
    }

    pub fn with_reset(mut self, reset: Reset) -> Self {
        self.reset = Some(reset);
        self
    }
}

// ============================================================================
// Middleware data
// ============================================================================

/// Diagnostic data published by middleware, keyed by middleware name.
///
/// Built-in payloads have typed accessors; custom middleware read their own
/// entries with [`get_as`](Self::get_as).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MiddlewareData {
    entries: BTreeMap<String, Value>,
}

impl MiddlewareData {
    /// Raw entry for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Decode the entry for `name`. `None` when absent or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.entries
            .get(name)
            .and_then(|v| T::deserialize(v).ok())
    }

    /// Merge `value` into the entry for `name`. Objects merge key by key;
    /// anything else replaces the entry.
    pub fn merge(&mut self, name: &str, value: Value) {
        let value = match (self.entries.get_mut(name), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                existing.extend(incoming);
                return;
            }
            (_, value) => value,
        };
        self.entries.insert(name.to_owned(), value);
    }

    /// Drop the entry for `name`.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names with published data, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn offset(&self) -> Option<OffsetData> {
        self.get_as(Offset::NAME)
    }

    pub fn flip(&self) -> Option<FlipData> {
        self.get_as(Flip::<()>::NAME)
    }

    pub fn shift(&self) -> Option<ShiftData> {
        self.get_as(Shift::<()>::NAME)
    }

    pub fn auto_placement(&self) -> Option<AutoPlacementData> {
        self.get_as(AutoPlacement::<()>::NAME)
    }

    pub fn size(&self) -> Option<SizeData> {
        self.get_as(Size::<()>::NAME)
    }

    pub fn arrow(&self) -> Option<ArrowData> {
        self.get_as(Arrow::<()>::NAME)
    }

    pub fn hide(&self) -> Option<HideData> {
        self.get_as(Hide::<()>::NAME)
    }
}

/// Overflow recorded for one attempted placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementOverflow {
    pub placement: Placement,
    /// Main side first, then alignment sides when checked.
    pub overflows: Vec<f64>,
}

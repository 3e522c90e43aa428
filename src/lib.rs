//! Floating element positioning with placements, overflow detection, and
//! composable middleware.
//!
//! Given a reference element (a button, a text selection) and a floating
//! element (tooltip, popover, dropdown), [`compute_position`] returns the
//! coordinates that put the floating element at the requested [`Placement`],
//! adjusted by an ordered list of [`Middleware`]: [`offset`], [`flip`],
//! [`shift`], [`auto_placement`], [`size`], [`arrow`], [`hide`].
//!
//! Element geometry comes from a [`Platform`], implemented by the host for
//! its element handle type. [`MemoryPlatform`] serves registered rectangles
//! and works for non-DOM hosts and tests.
//!
//! # Modules
//!
//! - [`geometry`]: placements, axes, rectangles, base coordinates
//! - [`platform`]: the `Platform` contract and `MemoryPlatform`
//! - [`overflow`]: boundary overflow detection
//! - [`middleware`]: the middleware contract and built-in middleware
//! - [`compute`]: the pipeline orchestrator
//! - [`config`]: declarative, serde-backed configuration
//! - `svg` (feature `svg`): SVG rendering of a computed position
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use zenfloat::{
//!     ComputePositionConfig, MemoryPlatform, Placement, Rect, compute_position, flip, offset,
//!     shift,
//! };
//!
//! let platform = MemoryPlatform::new(Rect::new(0.0, 0.0, 800.0, 600.0))
//!     .with_element("button", Rect::new(100.0, 570.0, 80.0, 24.0))
//!     .with_element("menu", Rect::new(0.0, 0.0, 160.0, 120.0));
//!
//! let config = ComputePositionConfig::new()
//!     .placement(Placement::BottomStart)
//!     .middleware(offset(4.0))
//!     .middleware(flip())
//!     .middleware(shift().padding(8.0));
//!
//! let pos = block_on(compute_position(&"button", &"menu", &config, &platform)).unwrap();
//! // No room below the button, so the menu opens above it.
//! assert_eq!(pos.placement, Placement::TopStart);
//! assert_eq!((pos.x, pos.y), (100.0, 446.0));
//! ```

#![forbid(unsafe_code)]

pub mod compute;
pub mod config;
pub mod error;
pub mod geometry;
pub mod middleware;
pub mod overflow;
pub mod platform;

#[cfg(feature = "svg")]
pub mod svg;

pub use compute::{
    ComputePositionConfig, ComputePositionReturn, DEFAULT_MAX_RESETS, compute_position,
};
pub use error::PositionError;
pub use geometry::{
    Alignment, Axis, Coords, Dimensions, ElementRects, OffsetAxes, OffsetContext, OffsetOptions,
    OffsetValue, Overflow, Padding, Placement, Rect, Side, Sides, Strategy,
    compute_coords_from_placement, coords_from_offset_value,
};
pub use middleware::{
    Arrow, ArrowData, AutoPlacement, AutoPlacementData, Elements, EnabledAxes, FallbackStrategy,
    Flip, FlipData, Hide, HideData, HideStrategy, LimitShift, Middleware, MiddlewareData,
    MiddlewareReturn, MiddlewareState, Offset, OffsetData, PlacementOverflow, Reset, ResetRects,
    Shift, ShiftData, Size, SizeData, arrow, auto_placement, flip, hide, limit_shift, offset,
    shift, size,
};
pub use overflow::{DetectOverflowOptions, ElementContext, detect_overflow};
pub use platform::{Boundary, MemoryPlatform, OffsetParent, Platform, PlatformFuture, RootBoundary};

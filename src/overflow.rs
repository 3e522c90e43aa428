//! Overflow detection against clipping boundaries.

use crate::error::PositionError;
use crate::geometry::{Coords, Overflow, Padding, Rect};
use crate::middleware::MiddlewareState;
use crate::platform::{Boundary, OffsetParent, RootBoundary};

/// Which element's rect is checked for overflow.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementContext {
    #[default]
    Floating,
    Reference,
}

impl ElementContext {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Floating => Self::Reference,
            Self::Reference => Self::Floating,
        }
    }
}

/// Options for [`detect_overflow`]. Embedded in every middleware that checks
/// boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectOverflowOptions<E> {
    /// Clipping boundary.
    pub boundary: Boundary<E>,
    /// Outermost boundary the clipping boundary is intersected with.
    pub root_boundary: RootBoundary,
    /// Element whose rect is measured.
    pub element_context: ElementContext,
    /// Resolve the clipping boundary of the other element instead of the
    /// measured one.
    pub alt_boundary: bool,
    /// Virtual padding inside the boundary.
    pub padding: Padding,
}

impl<E> Default for DetectOverflowOptions<E> {
    fn default() -> Self {
        Self {
            boundary: Boundary::ClippingAncestors,
            root_boundary: RootBoundary::Viewport,
            element_context: ElementContext::Floating,
            alt_boundary: false,
            padding: Padding::default(),
        }
    }
}

impl<E> DetectOverflowOptions<E> {
    pub fn boundary(mut self, boundary: Boundary<E>) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn root_boundary(mut self, root_boundary: RootBoundary) -> Self {
        self.root_boundary = root_boundary;
        self
    }

    pub fn element_context(mut self, element_context: ElementContext) -> Self {
        self.element_context = element_context;
        self
    }

    pub fn alt_boundary(mut self, alt_boundary: bool) -> Self {
        self.alt_boundary = alt_boundary;
        self
    }

    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }
}

/// Signed overflow of the measured element past its clipping boundary.
///
/// Positive values mean the element extends past the boundary (plus padding)
/// by that many units on that side; zero or negative means it fits. Values are
/// in the offset parent's (unscaled) units. `state` is read, never changed.
pub async fn detect_overflow<E>(
    state: &MiddlewareState<'_, E>,
    options: &DetectOverflowOptions<E>,
) -> Result<Overflow, PositionError> {
    let platform = state.platform;
    let padding = options.padding.resolve();

    let context = if options.alt_boundary {
        options.element_context.opposite()
    } else {
        options.element_context
    };
    let clipping_element = match context {
        ElementContext::Floating => state.elements.floating,
        ElementContext::Reference => state.elements.reference,
    };
    let clip = platform
        .get_clipping_rect(
            clipping_element,
            &options.boundary,
            &options.root_boundary,
            state.strategy,
        )
        .await?;

    let rect = match options.element_context {
        ElementContext::Floating => state.rects.floating.at(Coords::new(state.x, state.y)),
        ElementContext::Reference => state.rects.reference,
    };

    let offset_parent = platform.get_offset_parent(state.elements.floating).await?;
    let scale = match &offset_parent {
        Some(OffsetParent::Element(parent)) => {
            let s = platform.get_scale(parent).await?;
            Coords::new(
                if s.x == 0.0 { 1.0 } else { s.x },
                if s.y == 0.0 { 1.0 } else { s.y },
            )
        }
        _ => Coords::new(1.0, 1.0),
    };
    let element: Rect = platform
        .convert_offset_parent_relative_rect_to_viewport_relative_rect(
            rect,
            offset_parent.as_ref(),
            state.strategy,
        )
        .await?;

    Ok(Overflow {
        top: (clip.top() - element.top() + padding.top) / scale.y,
        bottom: (element.bottom() - clip.bottom() + padding.bottom) / scale.y,
        left: (clip.left() - element.left() + padding.left) / scale.x,
        right: (element.right() - clip.right() + padding.right) / scale.x,
    })
}

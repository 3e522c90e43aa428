//! Platform adapter contract and an in-memory implementation.
//!
//! The core never measures anything itself. Every rectangle, clipping region,
//! and element size comes from a [`Platform`], which a host (DOM bindings, a
//! terminal UI, a canvas scene graph) implements for its own element handle
//! type `E`. Queries return boxed local futures so hosts that must wait for
//! layout can suspend.
//!
//! [`MemoryPlatform`] answers the same queries from registered rectangles.

use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;

use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::geometry::{Coords, Dimensions, ElementRects, Rect, Strategy};

/// Future returned by platform queries.
pub type PlatformFuture<'a, T> = LocalBoxFuture<'a, Result<T, PositionError>>;

/// Clipping region(s) the floating element must stay inside, intersected with
/// the [`RootBoundary`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Boundary<E> {
    /// Every ancestor of the element that clips its overflow.
    #[default]
    ClippingAncestors,
    /// The visible area of specific elements.
    Elements(Vec<E>),
    /// A fixed rectangle.
    Rect(Rect),
}

/// Outermost clipping region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootBoundary {
    /// The visible viewport.
    #[default]
    Viewport,
    /// The whole scrollable document.
    Document,
    /// A fixed rectangle.
    Rect(Rect),
}

/// The element a floating element is positioned against, or the window when
/// it has none.
#[derive(Clone, Debug, PartialEq)]
pub enum OffsetParent<E> {
    Element(E),
    Window,
}

/// Geometry queries the positioning pipeline consumes.
///
/// Only the first three methods are required. The rest have defaults suitable
/// for hosts without nested coordinate spaces or right-to-left layout.
pub trait Platform<E> {
    /// Reference rect (relative to the floating element's offset parent) and
    /// floating size (its origin is not meaningful).
    fn get_element_rects<'a>(
        &'a self,
        reference: &'a E,
        floating: &'a E,
        strategy: Strategy,
    ) -> PlatformFuture<'a, ElementRects>;

    /// Clipping rect for `element`: `boundary` intersected with
    /// `root_boundary`, in viewport space.
    fn get_clipping_rect<'a>(
        &'a self,
        element: &'a E,
        boundary: &'a Boundary<E>,
        root_boundary: &'a RootBoundary,
        strategy: Strategy,
    ) -> PlatformFuture<'a, Rect>;

    /// Layout size of an element.
    fn get_dimensions<'a>(&'a self, element: &'a E) -> PlatformFuture<'a, Dimensions>;

    /// Offset parent of `element`, if the host has such a concept.
    fn get_offset_parent<'a>(
        &'a self,
        element: &'a E,
    ) -> PlatformFuture<'a, Option<OffsetParent<E>>> {
        let _ = element;
        future::ready(Ok(None)).boxed_local()
    }

    /// Convert a rect relative to `offset_parent` into viewport space.
    fn convert_offset_parent_relative_rect_to_viewport_relative_rect<'a>(
        &'a self,
        rect: Rect,
        offset_parent: Option<&'a OffsetParent<E>>,
        strategy: Strategy,
    ) -> PlatformFuture<'a, Rect> {
        let _ = (offset_parent, strategy);
        future::ready(Ok(rect)).boxed_local()
    }

    /// Visual scale applied to `element` (e.g. CSS transforms).
    fn get_scale<'a>(&'a self, element: &'a E) -> PlatformFuture<'a, Coords> {
        let _ = element;
        future::ready(Ok(Coords::new(1.0, 1.0))).boxed_local()
    }

    /// Whether `element` lays out right-to-left.
    fn is_rtl<'a>(&'a self, element: &'a E) -> PlatformFuture<'a, bool> {
        let _ = element;
        future::ready(Ok(false)).boxed_local()
    }
}

// ============================================================================
// In-memory platform
// ============================================================================

/// A [`Platform`] backed by registered rectangles.
///
/// Element rects are stored in viewport space. When the floating element has
/// an offset parent, the reference rect and the floating size are reported in
/// that parent's space (divided by its scale) and converted back for overflow
/// detection, the same way a browser reports positioned descendants.
///
/// ```
/// use zenfloat::{MemoryPlatform, Rect};
///
/// let platform = MemoryPlatform::new(Rect::new(0.0, 0.0, 800.0, 600.0))
///     .with_element("button", Rect::new(100.0, 100.0, 80.0, 24.0))
///     .with_element("tooltip", Rect::new(0.0, 0.0, 120.0, 40.0));
/// assert!(platform.contains(&"tooltip"));
/// ```
pub struct MemoryPlatform<E> {
    rects: RefCell<HashMap<E, Rect>>,
    clipping_ancestors: HashMap<E, Vec<Rect>>,
    offset_parents: HashMap<E, E>,
    scales: HashMap<E, Coords>,
    viewport: Rect,
    document: Option<Rect>,
    rtl: bool,
}

impl<E: fmt::Debug> fmt::Debug for MemoryPlatform<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPlatform")
            .field("rects", &self.rects)
            .field("viewport", &self.viewport)
            .field("document", &self.document)
            .field("rtl", &self.rtl)
            .finish_non_exhaustive()
    }
}

impl<E: Eq + Hash + Clone + fmt::Debug> MemoryPlatform<E> {
    /// Create an empty platform with the given viewport.
    pub fn new(viewport: Rect) -> Self {
        Self {
            rects: RefCell::new(HashMap::new()),
            clipping_ancestors: HashMap::new(),
            offset_parents: HashMap::new(),
            scales: HashMap::new(),
            viewport,
            document: None,
            rtl: false,
        }
    }

    /// Register an element rect.
    pub fn with_element(self, element: E, rect: Rect) -> Self {
        self.rects.borrow_mut().insert(element, rect);
        self
    }

    /// Add a clipping ancestor for `element`. Multiple ancestors intersect.
    pub fn with_clipping_ancestor(mut self, element: E, clip: Rect) -> Self {
        self.clipping_ancestors.entry(element).or_default().push(clip);
        self
    }

    /// Position `element` relative to `parent`.
    pub fn with_offset_parent(mut self, element: E, parent: E) -> Self {
        self.offset_parents.insert(element, parent);
        self
    }

    /// Set the visual scale of `element`.
    pub fn with_scale(mut self, element: E, scale: Coords) -> Self {
        self.scales.insert(element, scale);
        self
    }

    /// Set the document rect used for [`RootBoundary::Document`].
    /// Defaults to the viewport.
    pub fn with_document(mut self, document: Rect) -> Self {
        self.document = Some(document);
        self
    }

    /// Lay out right-to-left.
    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    /// Replace an element rect, e.g. after a resize.
    pub fn set_rect(&self, element: E, rect: Rect) {
        self.rects.borrow_mut().insert(element, rect);
    }

    /// Forget an element. Later queries for it fail.
    pub fn remove(&self, element: &E) -> Option<Rect> {
        self.rects.borrow_mut().remove(element)
    }

    /// Whether `element` is registered.
    pub fn contains(&self, element: &E) -> bool {
        self.rects.borrow().contains_key(element)
    }

    fn rect(&self, element: &E) -> Result<Rect, PositionError> {
        self.rects
            .borrow()
            .get(element)
            .copied()
            .ok_or_else(|| PositionError::UnknownElement(format!("{element:?}")))
    }

    fn scale_of(&self, element: &E) -> Coords {
        let s = self.scales.get(element).copied().unwrap_or(Coords::new(1.0, 1.0));
        Coords::new(
            if s.x == 0.0 { 1.0 } else { s.x },
            if s.y == 0.0 { 1.0 } else { s.y },
        )
    }

    fn element_rects(&self, reference: &E, floating: &E) -> Result<ElementRects, PositionError> {
        let mut reference = self.rect(reference)?;
        let mut size = self.rect(floating)?.dimensions();
        if let Some(parent) = self.offset_parents.get(floating) {
            let origin = self.rect(parent)?;
            let scale = self.scale_of(parent);
            reference = Rect::new(
                (reference.x - origin.x) / scale.x,
                (reference.y - origin.y) / scale.y,
                reference.width / scale.x,
                reference.height / scale.y,
            );
            size = Dimensions::new(size.width / scale.x, size.height / scale.y);
        }
        Ok(ElementRects {
            reference,
            floating: Rect::new(0.0, 0.0, size.width, size.height),
        })
    }

    fn clipping_rect(
        &self,
        element: &E,
        boundary: &Boundary<E>,
        root_boundary: &RootBoundary,
    ) -> Result<Rect, PositionError> {
        let root = match root_boundary {
            RootBoundary::Viewport => self.viewport,
            RootBoundary::Document => self.document.unwrap_or(self.viewport),
            RootBoundary::Rect(r) => *r,
        };
        let clips = match boundary {
            Boundary::ClippingAncestors => self
                .clipping_ancestors
                .get(element)
                .cloned()
                .unwrap_or_default(),
            Boundary::Elements(elements) => elements
                .iter()
                .map(|e| self.rect(e))
                .collect::<Result<Vec<_>, _>>()?,
            Boundary::Rect(r) => vec![*r],
        };
        Ok(clips.iter().fold(root, |acc, clip| acc.intersection(clip)))
    }

    fn to_viewport(
        &self,
        rect: Rect,
        offset_parent: Option<&OffsetParent<E>>,
    ) -> Result<Rect, PositionError> {
        match offset_parent {
            Some(OffsetParent::Element(parent)) => {
                let origin = self.rect(parent)?;
                let scale = self.scale_of(parent);
                Ok(Rect::new(
                    origin.x + rect.x * scale.x,
                    origin.y + rect.y * scale.y,
                    rect.width * scale.x,
                    rect.height * scale.y,
                ))
            }
            Some(OffsetParent::Window) | None => Ok(rect),
        }
    }
}

impl<E: Eq + Hash + Clone + fmt::Debug> Platform<E> for MemoryPlatform<E> {
    fn get_element_rects<'a>(
        &'a self,
        reference: &'a E,
        floating: &'a E,
        _strategy: Strategy,
    ) -> PlatformFuture<'a, ElementRects> {
        future::ready(self.element_rects(reference, floating)).boxed_local()
    }

    fn get_clipping_rect<'a>(
        &'a self,
        element: &'a E,
        boundary: &'a Boundary<E>,
        root_boundary: &'a RootBoundary,
        _strategy: Strategy,
    ) -> PlatformFuture<'a, Rect> {
        future::ready(self.clipping_rect(element, boundary, root_boundary)).boxed_local()
    }

    fn get_dimensions<'a>(&'a self, element: &'a E) -> PlatformFuture<'a, Dimensions> {
        future::ready(self.rect(element).map(|r| r.dimensions())).boxed_local()
    }

    fn get_offset_parent<'a>(
        &'a self,
        element: &'a E,
    ) -> PlatformFuture<'a, Option<OffsetParent<E>>> {
        let parent = self.offset_parents.get(element).cloned().map(OffsetParent::Element);
        future::ready(Ok(parent)).boxed_local()
    }

    fn convert_offset_parent_relative_rect_to_viewport_relative_rect<'a>(
        &'a self,
        rect: Rect,
        offset_parent: Option<&'a OffsetParent<E>>,
        _strategy: Strategy,
    ) -> PlatformFuture<'a, Rect> {
        future::ready(self.to_viewport(rect, offset_parent)).boxed_local()
    }

    fn get_scale<'a>(&'a self, element: &'a E) -> PlatformFuture<'a, Coords> {
        future::ready(Ok(self.scale_of(element))).boxed_local()
    }

    fn is_rtl<'a>(&'a self, _element: &'a E) -> PlatformFuture<'a, bool> {
        future::ready(Ok(self.rtl)).boxed_local()
    }
}

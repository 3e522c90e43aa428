//! SVG visualization of a computed position.
//!
//! Draws the clipping boundary, the reference, and the floating element at
//! its final coordinates, annotated with the placement and middleware
//! outcomes (flip attempts, shift, arrow, hide). Useful for debugging
//! middleware stacks and for documentation.
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use zenfloat::svg::render_position_svg;
//! use zenfloat::{ComputePositionConfig, MemoryPlatform, Rect, compute_position, flip, offset};
//!
//! let viewport = Rect::new(0.0, 0.0, 400.0, 300.0);
//! let platform = MemoryPlatform::new(viewport)
//!     .with_element("ref", Rect::new(150.0, 270.0, 80.0, 20.0))
//!     .with_element("tip", Rect::new(0.0, 0.0, 120.0, 40.0));
//! let config = ComputePositionConfig::new().middleware(offset(6.0)).middleware(flip());
//! let pos = block_on(compute_position(&"ref", &"tip", &config, &platform)).unwrap();
//!
//! let rects = block_on(zenfloat::Platform::get_element_rects(
//!     &platform, &"ref", &"tip", pos.strategy,
//! )).unwrap();
//! let svg = render_position_svg(viewport, &rects, &pos);
//! assert!(svg.starts_with("<svg"));
//! ```

use crate::compute::ComputePositionReturn;
use crate::geometry::{Coords, ElementRects, Rect, Side};

/// Maximum drawing width for the scene.
const MAX_SCENE_W: f64 = 480.0;
/// Maximum drawing height for the scene.
const MAX_SCENE_H: f64 = 360.0;
/// Margin around the scene.
const MARGIN: f64 = 30.0;
/// Height of the title line.
const LABEL_H: f64 = 22.0;
/// Line height for annotations below the scene.
const NOTE_H: f64 = 16.0;
/// Drawn arrow size in scene pixels.
const ARROW_SIZE: f64 = 8.0;

/// Maps scene coordinates into the drawing.
struct Frame {
    origin_x: f64,
    origin_y: f64,
    scale: f64,
    left: f64,
    top: f64,
}

impl Frame {
    fn rect(&self, r: &Rect) -> (f64, f64, f64, f64) {
        (
            self.left + (r.x - self.origin_x) * self.scale,
            self.top + (r.y - self.origin_y) * self.scale,
            r.width * self.scale,
            r.height * self.scale,
        )
    }
}

/// Smallest rect covering all of `rects`.
fn bounds(rects: &[Rect]) -> Rect {
    let mut left = f64::INFINITY;
    let mut top = f64::INFINITY;
    let mut right = f64::NEG_INFINITY;
    let mut bottom = f64::NEG_INFINITY;
    for r in rects {
        left = left.min(r.left());
        top = top.min(r.top());
        right = right.max(r.right());
        bottom = bottom.max(r.bottom());
    }
    Rect::from_edges(left, top, right, bottom)
}

/// Scale factor to fit `w` × `h` within the scene limits. Never upscales
/// past 2×.
fn scale_to_fit(w: f64, h: f64) -> f64 {
    if w <= 0.0 || h <= 0.0 {
        return 1.0;
    }
    (MAX_SCENE_W / w).min(MAX_SCENE_H / h).min(2.0)
}

/// Render a complete SVG document for a computed position.
///
/// `boundary` is the clipping region the computation ran against and
/// `rects` the reference/floating rects it measured. The floating element is
/// drawn at `result.x`, `result.y`.
pub fn render_position_svg(
    boundary: Rect,
    rects: &ElementRects,
    result: &ComputePositionReturn,
) -> String {
    let floating = rects.floating.at(Coords::new(result.x, result.y));
    let scene = bounds(&[boundary, rects.reference, floating]);
    let scale = scale_to_fit(scene.width, scene.height);
    let frame = Frame {
        origin_x: scene.x,
        origin_y: scene.y,
        scale,
        left: MARGIN,
        top: MARGIN + LABEL_H,
    };

    let notes = annotations(result);
    let total_w = scene.width * scale + 2.0 * MARGIN;
    let total_h =
        MARGIN + LABEL_H + scene.height * scale + 10.0 + notes.len() as f64 * NOTE_H + MARGIN;

    let mut svg = String::with_capacity(4096);
    svg.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
    svg.push_str(&format!(
        r#"width="{}" height="{}" viewBox="0 0 {:.1} {:.1}">"#,
        total_w as u32, total_h as u32, total_w, total_h
    ));
    svg.push('\n');

    // Style: light/dark mode via prefers-color-scheme
    svg.push_str(r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .annotation { font-size: 11px; fill: #666; }
  .boundary { fill: #f4f4f4; stroke: #999; stroke-width: 1; stroke-dasharray: 4,2; }
  .reference { fill: #e8c27a; stroke: #b08930; stroke-width: 1.5; }
  .floating { fill: #6ba3d6; fill-opacity: 0.85; stroke: #2c6faa; stroke-width: 1.5; }
  .hidden { fill-opacity: 0.3; stroke-dasharray: 3,3; }
  .arrow { fill: #2c6faa; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .annotation { fill: #aaa; }
    .boundary { fill: #262626; stroke: #555; }
    .reference { fill: #8a6a2a; stroke: #c9a250; }
    .floating { fill: #3a72a4; stroke: #5a9fd4; }
    .arrow { fill: #5a9fd4; }
  }
</style>
"##);

    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" class="label">{}</text>"#,
        MARGIN,
        MARGIN + 14.0,
        escape_xml(&format!(
            "{}  ({:.1}, {:.1})  {:?}",
            result.placement, result.x, result.y, result.strategy
        ))
    ));
    svg.push('\n');

    let (bx, by, bw, bh) = frame.rect(&boundary);
    svg.push_str(&format!(
        r#"<rect x="{bx:.1}" y="{by:.1}" width="{bw:.1}" height="{bh:.1}" class="boundary"/>"#
    ));
    svg.push('\n');

    let (rx, ry, rw, rh) = frame.rect(&rects.reference);
    svg.push_str(&format!(
        r#"<rect x="{rx:.1}" y="{ry:.1}" width="{rw:.1}" height="{rh:.1}" "#
    ));
    svg.push_str(r#"class="reference" rx="2"/>"#);
    svg.push('\n');

    let hidden = result
        .middleware_data
        .hide()
        .is_some_and(|h| h.reference_hidden == Some(true) || h.escaped == Some(true));
    let (fx, fy, fw, fh) = frame.rect(&floating);
    svg.push_str(&format!(
        r#"<rect x="{fx:.1}" y="{fy:.1}" width="{fw:.1}" height="{fh:.1}" class="{}" rx="3"/>"#,
        if hidden { "floating hidden" } else { "floating" }
    ));
    svg.push('\n');

    if let Some(arrow) = result.middleware_data.arrow() {
        // Triangle on the static side, pointing at the reference.
        let s = ARROW_SIZE;
        let points = match arrow.static_side {
            Side::Top => {
                let cx = fx + arrow.x.unwrap_or(0.0) * scale + s / 2.0;
                format!(
                    "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
                    cx - s / 2.0,
                    fy,
                    cx,
                    fy - s,
                    cx + s / 2.0,
                    fy,
                )
            }
            Side::Bottom => {
                let cx = fx + arrow.x.unwrap_or(0.0) * scale + s / 2.0;
                let b = fy + fh;
                format!(
                    "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
                    cx - s / 2.0,
                    b,
                    cx,
                    b + s,
                    cx + s / 2.0,
                    b,
                )
            }
            Side::Left => {
                let cy = fy + arrow.y.unwrap_or(0.0) * scale + s / 2.0;
                format!(
                    "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
                    fx,
                    cy - s / 2.0,
                    fx - s,
                    cy,
                    fx,
                    cy + s / 2.0,
                )
            }
            Side::Right => {
                let cy = fy + arrow.y.unwrap_or(0.0) * scale + s / 2.0;
                let r = fx + fw;
                format!(
                    "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
                    r,
                    cy - s / 2.0,
                    r + s,
                    cy,
                    r,
                    cy + s / 2.0,
                )
            }
        };
        svg.push_str(&format!(r#"<polygon points="{points}" class="arrow"/>"#));
        svg.push('\n');
    }

    let mut y = frame.top + scene.height * scale + 10.0;
    for note in &notes {
        y += NOTE_H;
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" class="annotation">{}</text>"#,
            MARGIN,
            y - 4.0,
            escape_xml(note)
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

/// One line per middleware outcome worth showing.
fn annotations(result: &ComputePositionReturn) -> Vec<String> {
    let data = &result.middleware_data;
    let mut notes = Vec::new();
    if let Some(o) = data.offset() {
        notes.push(format!("offset ({:.1}, {:.1})", o.x, o.y));
    }
    if let Some(f) = data.flip() {
        let tried: Vec<&str> = f.overflows.iter().map(|a| a.placement.as_str()).collect();
        notes.push(format!("flip tried {}", tried.join(" → ")));
    }
    if let Some(a) = data.auto_placement() {
        notes.push(format!("autoPlacement chose {}", a.placement));
    }
    if let Some(s) = data.shift() {
        notes.push(format!("shift ({:.1}, {:.1})", s.x, s.y));
    }
    if let Some(s) = data.size() {
        notes.push(format!(
            "available {:.1}×{:.1}",
            s.available_width, s.available_height
        ));
    }
    if let Some(h) = data.hide() {
        if let Some(v) = h.reference_hidden {
            notes.push(format!("referenceHidden {v}"));
        }
        if let Some(v) = h.escaped {
            notes.push(format!("escaped {v}"));
        }
    }
    notes
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

//! Declarative position configuration.
//!
//! A [`PositionSpec`] describes placement, strategy, and an ordered
//! middleware list as plain data, so a configuration can live in a JSON
//! file or travel over the wire. Only static options are expressible; dynamic
//! offsets, `size` callbacks, arrow elements, and element boundaries need the
//! builder API.
//!
//! ```
//! use zenfloat::config::PositionSpec;
//! use zenfloat::Placement;
//!
//! let spec = PositionSpec::from_json(r#"{
//!     "placement": "top-start",
//!     "middleware": [
//!         {"offset": 8},
//!         {"flip": {"fallback_placements": ["bottom-start"]}},
//!         {"shift": {"padding": 4, "limit": {}}}
//!     ]
//! }"#).unwrap();
//! assert_eq!(spec.placement, Placement::TopStart);
//!
//! let config = spec.into_config::<u32>().unwrap();
//! assert_eq!(config.middleware.len(), 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::compute::{ComputePositionConfig, DEFAULT_MAX_RESETS};
use crate::error::PositionError;
use crate::geometry::{Alignment, OffsetValue, Padding, Placement, Rect, Strategy};
use crate::middleware::{
    AutoPlacement, FallbackStrategy, Flip, Hide, HideStrategy, Middleware, Offset, Shift, Size,
    auto_placement, flip, hide, limit_shift, offset, shift, size,
};
use crate::overflow::{DetectOverflowOptions, ElementContext};
use crate::platform::{Boundary, RootBoundary};

/// A complete positioning configuration as data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositionSpec {
    pub placement: Placement,
    pub strategy: Strategy,
    pub max_resets: usize,
    pub middleware: Vec<MiddlewareSpec>,
}

impl Default for PositionSpec {
    fn default() -> Self {
        Self {
            placement: Placement::Bottom,
            strategy: Strategy::Absolute,
            max_resets: DEFAULT_MAX_RESETS,
            middleware: Vec::new(),
        }
    }
}

/// One middleware entry, keyed by middleware kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiddlewareSpec {
    Offset(OffsetValue),
    Flip(FlipSpec),
    Shift(ShiftSpec),
    AutoPlacement(AutoPlacementSpec),
    Size(OverflowSpec),
    Hide(HideSpec),
}

/// Boundary options shared by every overflow-checking middleware.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverflowSpec {
    /// Fixed clipping rectangle. Clipping ancestors when absent.
    pub boundary: Option<Rect>,
    pub root_boundary: RootBoundary,
    /// Measure the reference instead of the floating element.
    pub reference_context: bool,
    pub alt_boundary: bool,
    pub padding: Padding,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipSpec {
    pub main_axis: bool,
    pub cross_axis: bool,
    pub fallback_placements: Option<Vec<Placement>>,
    pub fallback_strategy: FallbackStrategy,
    /// Perpendicular sides tried after the opposite side. `null` disables.
    pub fallback_axis_side_direction: Option<Alignment>,
    pub flip_alignment: bool,
    pub tolerance: f64,
    #[serde(flatten)]
    pub overflow: OverflowSpec,
}

impl Default for FlipSpec {
    fn default() -> Self {
        Self {
            main_axis: true,
            cross_axis: true,
            fallback_placements: None,
            fallback_strategy: FallbackStrategy::BestFit,
            fallback_axis_side_direction: Some(Alignment::Start),
            flip_alignment: true,
            tolerance: 0.0,
            overflow: OverflowSpec::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftSpec {
    pub main_axis: bool,
    pub cross_axis: bool,
    /// Attach a `limit_shift` limiter.
    pub limit: Option<LimitShiftSpec>,
    #[serde(flatten)]
    pub overflow: OverflowSpec,
}

impl Default for ShiftSpec {
    fn default() -> Self {
        Self {
            main_axis: false,
            cross_axis: true,
            limit: None,
            overflow: OverflowSpec::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitShiftSpec {
    pub offset: OffsetValue,
    pub main_axis: bool,
    pub cross_axis: bool,
}

impl Default for LimitShiftSpec {
    fn default() -> Self {
        Self {
            offset: OffsetValue::default(),
            main_axis: true,
            cross_axis: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPlacementSpec {
    pub cross_axis: bool,
    pub alignment: Option<Alignment>,
    /// All twelve when absent.
    pub allowed_placements: Option<Vec<Placement>>,
    pub auto_alignment: bool,
    #[serde(flatten)]
    pub overflow: OverflowSpec,
}

impl Default for AutoPlacementSpec {
    fn default() -> Self {
        Self {
            cross_axis: false,
            alignment: None,
            allowed_placements: None,
            auto_alignment: true,
            overflow: OverflowSpec::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HideSpec {
    pub strategy: HideStrategy,
    #[serde(flatten)]
    pub overflow: OverflowSpec,
}

impl PositionSpec {
    /// Parse from JSON.
    pub fn from_json(text: &str) -> Result<Self, PositionError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the middleware pipeline.
    ///
    /// Rejects non-finite numbers and empty candidate lists, which would
    /// otherwise only surface as odd positions.
    pub fn into_config<E: Clone + 'static>(
        self,
    ) -> Result<ComputePositionConfig<E>, PositionError> {
        let mut config = ComputePositionConfig::new()
            .placement(self.placement)
            .strategy(self.strategy)
            .max_resets(self.max_resets);
        for (i, entry) in self.middleware.into_iter().enumerate() {
            let built = entry.build().map_err(|reason| {
                PositionError::InvalidConfig(format!("middleware[{i}]: {reason}"))
            })?;
            config = config.boxed_middleware(built);
        }
        Ok(config)
    }
}

impl MiddlewareSpec {
    /// Name the built middleware publishes under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Offset(_) => Offset::NAME,
            Self::Flip(_) => Flip::<()>::NAME,
            Self::Shift(_) => Shift::<()>::NAME,
            Self::AutoPlacement(_) => AutoPlacement::<()>::NAME,
            Self::Size(_) => Size::<()>::NAME,
            Self::Hide(_) => Hide::<()>::NAME,
        }
    }

    fn build<E: Clone + 'static>(self) -> Result<Box<dyn Middleware<E>>, String> {
        let built: Box<dyn Middleware<E>> = match self {
            Self::Offset(value) => {
                check_offset(&value)?;
                Box::new(offset(value))
            }
            Self::Flip(spec) => {
                finite("tolerance", spec.tolerance)?;
                if spec.fallback_placements.as_ref().is_some_and(Vec::is_empty) {
                    return Err("fallback_placements is empty".into());
                }
                let mut m = flip::<E>()
                    .main_axis(spec.main_axis)
                    .cross_axis(spec.cross_axis)
                    .fallback_strategy(spec.fallback_strategy)
                    .fallback_axis_side_direction(spec.fallback_axis_side_direction)
                    .flip_alignment(spec.flip_alignment)
                    .tolerance(spec.tolerance)
                    .detect_overflow(spec.overflow.resolve()?);
                if let Some(list) = spec.fallback_placements {
                    m = m.fallback_placements(list);
                }
                Box::new(m)
            }
            Self::Shift(spec) => {
                let mut m = shift::<E>()
                    .main_axis(spec.main_axis)
                    .cross_axis(spec.cross_axis)
                    .detect_overflow(spec.overflow.resolve()?);
                if let Some(limit) = spec.limit {
                    check_offset(&limit.offset)?;
                    m = m.limiter(
                        limit_shift()
                            .offset(limit.offset)
                            .main_axis(limit.main_axis)
                            .cross_axis(limit.cross_axis),
                    );
                }
                Box::new(m)
            }
            Self::AutoPlacement(spec) => {
                let mut m = auto_placement::<E>()
                    .cross_axis(spec.cross_axis)
                    .auto_alignment(spec.auto_alignment)
                    .detect_overflow(spec.overflow.resolve()?);
                if let Some(alignment) = spec.alignment {
                    m = m.alignment(alignment);
                }
                if let Some(list) = spec.allowed_placements {
                    if list.is_empty() {
                        return Err("allowed_placements is empty".into());
                    }
                    m = m.allowed_placements(list);
                }
                Box::new(m)
            }
            Self::Size(spec) => Box::new(size::<E>().detect_overflow(spec.resolve()?)),
            Self::Hide(spec) => Box::new(
                hide::<E>()
                    .strategy(spec.strategy)
                    .detect_overflow(spec.overflow.resolve()?),
            ),
        };
        Ok(built)
    }
}

impl OverflowSpec {
    fn resolve<E>(&self) -> Result<DetectOverflowOptions<E>, String> {
        let padding = self.padding.resolve();
        for (side, v) in [
            ("top", padding.top),
            ("right", padding.right),
            ("bottom", padding.bottom),
            ("left", padding.left),
        ] {
            finite(side, v)?;
        }
        if let Some(rect) = &self.boundary {
            check_rect("boundary", rect)?;
        }
        if let RootBoundary::Rect(rect) = &self.root_boundary {
            check_rect("root_boundary", rect)?;
        }
        Ok(DetectOverflowOptions {
            boundary: self.boundary.map_or(Boundary::ClippingAncestors, Boundary::Rect),
            root_boundary: self.root_boundary,
            element_context: if self.reference_context {
                ElementContext::Reference
            } else {
                ElementContext::Floating
            },
            alt_boundary: self.alt_boundary,
            padding: self.padding,
        })
    }
}

fn finite(what: &str, v: f64) -> Result<(), String> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(format!("{what} must be finite, got {v}"))
    }
}

fn check_offset(value: &OffsetValue) -> Result<(), String> {
    let axes = value.to_axes();
    finite("offset main_axis", axes.main_axis)?;
    finite("offset cross_axis", axes.cross_axis)?;
    if let Some(v) = axes.alignment_axis {
        finite("offset alignment_axis", v)?;
    }
    Ok(())
}

fn check_rect(what: &str, rect: &Rect) -> Result<(), String> {
    for v in [rect.x, rect.y, rect.width, rect.height] {
        finite(what, v)?;
    }
    if rect.width < 0.0 || rect.height < 0.0 {
        return Err(format!("{what} has negative size"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::compute_position;
    use crate::platform::MemoryPlatform;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn empty_object_is_default() {
        let spec = PositionSpec::from_json("{}").unwrap();
        assert_eq!(spec, PositionSpec::default());
        let config = spec.into_config::<u8>().unwrap();
        assert_eq!(config.placement, Placement::Bottom);
        assert_eq!(config.max_resets, DEFAULT_MAX_RESETS);
        assert!(config.middleware.is_empty());
    }

    #[test]
    fn middleware_order_and_names_preserved() {
        let spec: PositionSpec = serde_json::from_value(json!({
            "placement": "left-end",
            "strategy": "fixed",
            "middleware": [
                {"offset": {"main_axis": 4, "cross_axis": 2}},
                {"auto_placement": {"alignment": "end"}},
                {"size": {"padding": {"top": 1, "right": 2, "bottom": 3, "left": 4}}},
                {"hide": {"strategy": "escaped"}}
            ]
        }))
        .unwrap();
        let names: Vec<&str> = spec.middleware.iter().map(MiddlewareSpec::name).collect();
        assert_eq!(names, ["offset", "autoPlacement", "size", "hide"]);

        let config = spec.into_config::<u8>().unwrap();
        assert_eq!(config.strategy, Strategy::Fixed);
        let built: Vec<&str> = config.middleware.iter().map(|m| m.name()).collect();
        assert_eq!(built, names);
    }

    #[test]
    fn unknown_placement_rejected() {
        let err = PositionSpec::from_json(r#"{"placement": "middle"}"#).unwrap_err();
        assert!(matches!(err, PositionError::Data(_)));
    }

    #[test]
    fn unknown_middleware_rejected() {
        let err = PositionSpec::from_json(r#"{"middleware": [{"teleport": {}}]}"#).unwrap_err();
        assert!(matches!(err, PositionError::Data(_)));
    }

    #[test]
    fn flip_direction_defaults_to_start_and_null_disables() {
        let spec = PositionSpec::from_json(r#"{"middleware": [{"flip": {}}]}"#).unwrap();
        let MiddlewareSpec::Flip(flip) = &spec.middleware[0] else {
            panic!("expected flip");
        };
        assert_eq!(flip.fallback_axis_side_direction, Some(Alignment::Start));

        let spec = PositionSpec::from_json(
            r#"{"middleware": [{"flip": {"fallback_axis_side_direction": null}}]}"#,
        )
        .unwrap();
        let MiddlewareSpec::Flip(flip) = &spec.middleware[0] else {
            panic!("expected flip");
        };
        assert_eq!(flip.fallback_axis_side_direction, None);
    }

    #[test]
    fn empty_fallbacks_rejected() {
        let spec = PositionSpec {
            middleware: vec![MiddlewareSpec::Flip(FlipSpec {
                fallback_placements: Some(vec![]),
                ..FlipSpec::default()
            })],
            ..PositionSpec::default()
        };
        let err = spec.into_config::<u8>().unwrap_err();
        assert!(matches!(
            err,
            PositionError::InvalidConfig(ref m) if m.starts_with("middleware[0]")
        ));
    }

    #[test]
    fn non_finite_numbers_rejected() {
        let spec = PositionSpec {
            middleware: vec![MiddlewareSpec::Offset(OffsetValue::Scalar(f64::NAN))],
            ..PositionSpec::default()
        };
        assert!(spec.into_config::<u8>().is_err());

        let spec = PositionSpec {
            middleware: vec![MiddlewareSpec::Shift(ShiftSpec {
                overflow: OverflowSpec {
                    padding: Padding::Uniform(f64::INFINITY),
                    ..OverflowSpec::default()
                },
                ..ShiftSpec::default()
            })],
            ..PositionSpec::default()
        };
        assert!(spec.into_config::<u8>().is_err());
    }

    #[test]
    fn serializes_back_to_equal_position() {
        let spec = PositionSpec {
            placement: Placement::RightStart,
            middleware: vec![
                MiddlewareSpec::Offset(OffsetValue::Scalar(6.0)),
                MiddlewareSpec::Flip(FlipSpec::default()),
                MiddlewareSpec::Shift(ShiftSpec {
                    limit: Some(LimitShiftSpec::default()),
                    ..ShiftSpec::default()
                }),
            ],
            ..PositionSpec::default()
        };
        let text = serde_json::to_string(&spec).unwrap();
        assert!(text.contains("\"right-start\""));
        assert_eq!(PositionSpec::from_json(&text).unwrap(), spec);
    }

    #[test]
    fn built_config_positions_like_builder() {
        let platform = MemoryPlatform::new(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_element("ref", Rect::new(100.0, 100.0, 50.0, 20.0))
            .with_element("float", Rect::new(0.0, 0.0, 30.0, 10.0));
        let config = PositionSpec::from_json(r#"{"middleware": [{"offset": 5}]}"#)
            .unwrap()
            .into_config()
            .unwrap();
        let r = block_on(compute_position(&"ref", &"float", &config, &platform)).unwrap();
        assert_eq!((r.x, r.y), (110.0, 125.0));
    }
}

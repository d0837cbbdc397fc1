//! # Viewport Configuration
//!
//! Immutable per-viewport settings and the model descriptors that say what each
//! viewport shows. A [`ShowcaseConfig`] is the full set handed to the host at
//! startup, usually deserialized from JSON:
//!
//! ```json
//! {
//!   "asset_root": "site",
//!   "viewports": [
//!     { "container": "canvas-cerebro",
//!       "models": [{ "format": "obj", "path": "assets/models/cerebro/texturedMesh.obj" }] },
//!     { "container": "canvas-gem",
//!       "models": [{ "format": "procedural:icosahedron", "detail": 1 }],
//!       "target_size": 1.8 }
//!   ]
//! }
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid viewport '{container}': {reason}")]
    Invalid { container: String, reason: String },
    #[error("no viewports configured")]
    NoViewports,
}

/// Errors raised when a model descriptor cannot be interpreted
#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("unknown model format '{0}'")]
    UnknownFormat(String),
    #[error("format '{0}' requires a source path")]
    MissingPath(String),
    #[error("unknown procedural shape '{0}'")]
    UnknownShape(String),
    #[error("procedural model without a shape name")]
    MissingShape,
    #[error("invalid {shape}: {reason}")]
    InvalidShape {
        shape: &'static str,
        reason: &'static str,
    },
}

/// Largest icosahedron subdivision; each face becomes `(detail + 1)^2` triangles
pub const MAX_DETAIL: u32 = 32;
/// Largest segment or ring count of the other shapes
pub const MAX_SEGMENTS: u32 = 512;

/// Deterministic geometry that needs no I/O
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProceduralShape {
    Icosahedron {
        radius: f32,
        detail: u32,
    },
    Cube {
        size: f32,
    },
    Sphere {
        radius: f32,
        longitude_segments: u32,
        latitude_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius: f32,
        height: f32,
        segments: u32,
    },
}

impl ProceduralShape {
    /// The solid substituted when an asset fails to load.
    pub const FALLBACK: ProceduralShape = ProceduralShape::Icosahedron {
        radius: 0.9,
        detail: 2,
    };

    /// Builds a shape from its tag name, filling unset parameters with defaults
    pub fn from_name(name: &str, params: &ShapeParams) -> Result<Self, DescriptorError> {
        let shape = match name {
            "icosahedron" => ProceduralShape::Icosahedron {
                radius: params.radius.unwrap_or(0.9),
                detail: params.detail.unwrap_or(2),
            },
            "cube" => ProceduralShape::Cube {
                size: params.size.unwrap_or(1.0),
            },
            "sphere" => ProceduralShape::Sphere {
                radius: params.radius.unwrap_or(1.0),
                longitude_segments: params.segments.unwrap_or(32),
                latitude_segments: params.rings.unwrap_or(16),
            },
            "plane" => ProceduralShape::Plane {
                width: params.width.unwrap_or(2.0),
                height: params.height.unwrap_or(2.0),
                width_segments: params.segments.unwrap_or(1),
                height_segments: params.rings.unwrap_or(1),
            },
            "cylinder" => ProceduralShape::Cylinder {
                radius: params.radius.unwrap_or(0.5),
                height: params.height.unwrap_or(1.0),
                segments: params.segments.unwrap_or(32),
            },
            other => return Err(DescriptorError::UnknownShape(other.to_string())),
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Checks that dimensions are positive and finite and that tessellation
    /// counts stay within [`MAX_DETAIL`] and [`MAX_SEGMENTS`]
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let shape = self.name();
        let invalid = |reason| DescriptorError::InvalidShape { shape, reason };
        let dimension = |value: f32| value.is_finite() && value > 0.0;
        let segments = |value: u32| value <= MAX_SEGMENTS;

        match *self {
            ProceduralShape::Icosahedron { radius, detail } => {
                if !dimension(radius) {
                    return Err(invalid("radius must be positive and finite"));
                }
                if detail > MAX_DETAIL {
                    return Err(invalid("detail is too high"));
                }
            }
            ProceduralShape::Cube { size } => {
                if !dimension(size) {
                    return Err(invalid("size must be positive and finite"));
                }
            }
            ProceduralShape::Sphere {
                radius,
                longitude_segments,
                latitude_segments,
            } => {
                if !dimension(radius) {
                    return Err(invalid("radius must be positive and finite"));
                }
                if !segments(longitude_segments) || !segments(latitude_segments) {
                    return Err(invalid("too many segments"));
                }
            }
            ProceduralShape::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => {
                if !dimension(width) || !dimension(height) {
                    return Err(invalid("width and height must be positive and finite"));
                }
                if !segments(width_segments) || !segments(height_segments) {
                    return Err(invalid("too many segments"));
                }
            }
            ProceduralShape::Cylinder {
                radius,
                height,
                segments: count,
            } => {
                if !dimension(radius) || !dimension(height) {
                    return Err(invalid("radius and height must be positive and finite"));
                }
                if !segments(count) {
                    return Err(invalid("too many segments"));
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProceduralShape::Icosahedron { .. } => "icosahedron",
            ProceduralShape::Cube { .. } => "cube",
            ProceduralShape::Sphere { .. } => "sphere",
            ProceduralShape::Plane { .. } => "plane",
            ProceduralShape::Cylinder { .. } => "cylinder",
        }
    }

    fn params(&self) -> ShapeParams {
        let mut params = ShapeParams::default();
        match *self {
            ProceduralShape::Icosahedron { radius, detail } => {
                params.radius = Some(radius);
                params.detail = Some(detail);
            }
            ProceduralShape::Cube { size } => params.size = Some(size),
            ProceduralShape::Sphere {
                radius,
                longitude_segments,
                latitude_segments,
            } => {
                params.radius = Some(radius);
                params.segments = Some(longitude_segments);
                params.rings = Some(latitude_segments);
            }
            ProceduralShape::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => {
                params.width = Some(width);
                params.height = Some(height);
                params.segments = Some(width_segments);
                params.rings = Some(height_segments);
            }
            ProceduralShape::Cylinder {
                radius,
                height,
                segments,
            } => {
                params.radius = Some(radius);
                params.height = Some(height);
                params.segments = Some(segments);
            }
        }
        params
    }
}

/// Optional shape parameters as they appear in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rings: Option<u32>,
}

/// What a viewport should display.
///
/// The format tag is a closed set: `obj` and `fbx` name a source location to
/// fetch and parse, `procedural:<shape>` is synthesized in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor", into = "RawDescriptor")]
pub enum ModelDescriptor {
    Obj { path: String },
    Fbx { path: String },
    Procedural(ProceduralShape),
}

impl ModelDescriptor {
    pub fn obj(path: impl Into<String>) -> Self {
        ModelDescriptor::Obj { path: path.into() }
    }

    pub fn fbx(path: impl Into<String>) -> Self {
        ModelDescriptor::Fbx { path: path.into() }
    }

    /// True when resolving this descriptor needs no I/O
    pub fn is_procedural(&self) -> bool {
        matches!(self, ModelDescriptor::Procedural(_))
    }

    /// Source location for loaded formats
    pub fn location(&self) -> Option<&str> {
        match self {
            ModelDescriptor::Obj { path } | ModelDescriptor::Fbx { path } => Some(path),
            ModelDescriptor::Procedural(_) => None,
        }
    }

    pub fn format_tag(&self) -> String {
        match self {
            ModelDescriptor::Obj { .. } => "obj".to_string(),
            ModelDescriptor::Fbx { .. } => "fbx".to_string(),
            ModelDescriptor::Procedural(shape) => format!("procedural:{}", shape.name()),
        }
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(path) => write!(f, "{}:{}", self.format_tag(), path),
            None => write!(f, "{}", self.format_tag()),
        }
    }
}

impl FromStr for ModelDescriptor {
    type Err = DescriptorError;

    /// Parses `obj:<path>`, `fbx:<path>` or `procedural:<shape>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (format, rest) = s.split_once(':').unwrap_or((s, ""));
        match format {
            "obj" | "fbx" if rest.is_empty() => Err(DescriptorError::MissingPath(format.into())),
            "obj" => Ok(ModelDescriptor::obj(rest)),
            "fbx" => Ok(ModelDescriptor::fbx(rest)),
            "procedural" => Ok(ModelDescriptor::Procedural(ProceduralShape::from_name(
                rest,
                &ShapeParams::default(),
            )?)),
            other => Err(DescriptorError::UnknownFormat(other.to_string())),
        }
    }
}

/// Wire form of [`ModelDescriptor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDescriptor {
    format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    /// Shape name for the `{ "format": "procedural", "shape": ... }` spelling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape: Option<String>,
    #[serde(flatten)]
    params: ShapeParams,
}

impl TryFrom<RawDescriptor> for ModelDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        if let Some(shape) = raw.format.strip_prefix("procedural:") {
            return Ok(ModelDescriptor::Procedural(ProceduralShape::from_name(
                shape,
                &raw.params,
            )?));
        }
        if raw.format == "procedural" {
            let shape = raw.shape.as_deref().ok_or(DescriptorError::MissingShape)?;
            return Ok(ModelDescriptor::Procedural(ProceduralShape::from_name(
                shape,
                &raw.params,
            )?));
        }
        match raw.format.as_str() {
            "obj" | "fbx" => {
                let path = raw
                    .path
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| DescriptorError::MissingPath(raw.format.clone()))?;
                Ok(if raw.format == "obj" {
                    ModelDescriptor::Obj { path }
                } else {
                    ModelDescriptor::Fbx { path }
                })
            }
            other => Err(DescriptorError::UnknownFormat(other.to_string())),
        }
    }
}

impl From<ModelDescriptor> for RawDescriptor {
    fn from(descriptor: ModelDescriptor) -> Self {
        let format = descriptor.format_tag();
        match descriptor {
            ModelDescriptor::Obj { path } | ModelDescriptor::Fbx { path } => RawDescriptor {
                format,
                path: Some(path),
                shape: None,
                params: ShapeParams::default(),
            },
            ModelDescriptor::Procedural(shape) => RawDescriptor {
                format,
                path: None,
                shape: None,
                params: shape.params(),
            },
        }
    }
}

/// Angular increment applied to the active mesh each frame, in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationSpeed {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Default for RotationSpeed {
    fn default() -> Self {
        Self {
            x: 0.002,
            y: 0.008,
            z: 0.0,
        }
    }
}

/// Settings for one viewport. Immutable once the viewport is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Stable identity of the container the viewport renders into
    pub container: String,
    pub models: Vec<ModelDescriptor>,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance from the origin along +Z
    pub camera_distance: f32,
    pub rotation_speed: RotationSpeed,
    pub min_height: u32,
    /// Used when the container reports a zero width
    pub fallback_width: u32,
    /// Used when the container reports a zero height
    pub fallback_height: u32,
    /// Largest bounding-box dimension of every installed mesh
    pub target_size: f32,
    pub max_pixel_ratio: f64,
    pub load_timeout_ms: Option<u64>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            container: String::new(),
            models: Vec::new(),
            fov_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
            camera_distance: 5.0,
            rotation_speed: RotationSpeed::default(),
            min_height: 280,
            fallback_width: 400,
            fallback_height: 320,
            target_size: 2.2,
            max_pixel_ratio: 2.0,
            load_timeout_ms: None,
        }
    }
}

impl ViewportConfig {
    pub fn new(container: impl Into<String>, models: Vec<ModelDescriptor>) -> Self {
        Self {
            container: container.into(),
            models,
            ..Default::default()
        }
    }

    pub fn with_target_size(mut self, target_size: f32) -> Self {
        self.target_size = target_size;
        self
    }

    pub fn with_rotation_speed(mut self, rotation_speed: RotationSpeed) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_min_height(mut self, min_height: u32) -> Self {
        self.min_height = min_height;
        self
    }

    pub fn with_load_timeout_ms(mut self, timeout: u64) -> Self {
        self.load_timeout_ms = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            container: self.container.clone(),
            reason: reason.to_string(),
        };

        if self.container.is_empty() {
            return Err(invalid("container id is empty"));
        }
        if self.models.is_empty() {
            return Err(invalid("no models configured"));
        }
        for model in &self.models {
            if let ModelDescriptor::Procedural(shape) = model {
                shape
                    .validate()
                    .map_err(|err| invalid(&err.to_string()))?;
            }
        }
        if !self.target_size.is_finite() || self.target_size <= 0.0 {
            return Err(invalid("target_size must be positive and finite"));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fov_degrees must lie in (0, 180)"));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(invalid("clip planes must satisfy 0 < near < far"));
        }
        if !(self.max_pixel_ratio >= 1.0) {
            return Err(invalid("max_pixel_ratio must be at least 1"));
        }
        Ok(())
    }
}

/// The full set of viewports on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    pub viewports: Vec<ViewportConfig>,
}

fn default_asset_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ShowcaseConfig {
    /// A single viewport showing the brain scan used on the landing page
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            viewports: vec![ViewportConfig::new(
                "canvas-cerebro",
                vec![ModelDescriptor::obj(
                    "assets/models/cerebro/texturedMesh.obj",
                )],
            )],
        }
    }
}

impl ShowcaseConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ShowcaseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewports.is_empty() {
            return Err(ConfigError::NoViewports);
        }
        self.viewports.iter().try_for_each(ViewportConfig::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_str() {
        assert_eq!(
            "obj:valid.obj".parse::<ModelDescriptor>(),
            Ok(ModelDescriptor::obj("valid.obj"))
        );
        assert_eq!(
            "procedural:icosahedron".parse::<ModelDescriptor>(),
            Ok(ModelDescriptor::Procedural(ProceduralShape::FALLBACK))
        );
        assert_eq!(
            "fbx".parse::<ModelDescriptor>(),
            Err(DescriptorError::MissingPath("fbx".into()))
        );
        assert_eq!(
            "gltf:scene.glb".parse::<ModelDescriptor>(),
            Err(DescriptorError::UnknownFormat("gltf".into()))
        );
        assert_eq!(
            "procedural:teapot".parse::<ModelDescriptor>(),
            Err(DescriptorError::UnknownShape("teapot".into()))
        );
    }

    #[test]
    fn test_descriptor_json_forms() {
        let obj: ModelDescriptor =
            serde_json::from_str(r#"{ "format": "obj", "path": "valid.obj" }"#).unwrap();
        assert_eq!(obj, ModelDescriptor::obj("valid.obj"));

        let ico: ModelDescriptor =
            serde_json::from_str(r#"{ "format": "procedural:icosahedron", "detail": 1 }"#)
                .unwrap();
        assert_eq!(
            ico,
            ModelDescriptor::Procedural(ProceduralShape::Icosahedron {
                radius: 0.9,
                detail: 1
            })
        );

        let spelled: ModelDescriptor =
            serde_json::from_str(r#"{ "format": "procedural", "shape": "icosahedron" }"#)
                .unwrap();
        assert_eq!(spelled, ModelDescriptor::Procedural(ProceduralShape::FALLBACK));

        let missing = serde_json::from_str::<ModelDescriptor>(r#"{ "format": "fbx" }"#);
        assert!(missing.is_err());

        let json = serde_json::to_string(&ico).unwrap();
        let back: ModelDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ico);
    }

    #[test]
    fn test_viewport_defaults_from_json() {
        let truncated =
            ShowcaseConfig::from_json_str(r#"{ "viewports": [ { "container": "hero", "models": ["#);
        assert!(matches!(truncated, Err(ConfigError::Json(_))));

        let config = ShowcaseConfig::from_json_str(
            r#"{ "viewports": [
                { "container": "hero", "models": [{ "format": "obj", "path": "a.obj" }] }
            ] }"#,
        )
        .unwrap();
        let viewport = &config.viewports[0];
        assert_eq!(config.asset_root, PathBuf::from("."));
        assert_eq!(viewport.fov_degrees, 50.0);
        assert_eq!(viewport.min_height, 280);
        assert_eq!(viewport.target_size, 2.2);
        assert_eq!(viewport.rotation_speed, RotationSpeed::default());
        assert_eq!(viewport.load_timeout_ms, None);
    }

    #[test]
    fn test_validation() {
        let good = ViewportConfig::new("hero", vec![ModelDescriptor::obj("a.obj")]);
        assert!(good.validate().is_ok());

        let empty = ViewportConfig::new("hero", Vec::new());
        assert!(matches!(empty.validate(), Err(ConfigError::Invalid { .. })));

        let zero = good.clone().with_target_size(0.0);
        assert!(zero.validate().is_err());

        let mut clipped = good.clone();
        clipped.near = 10.0;
        clipped.far = 1.0;
        assert!(clipped.validate().is_err());

        let nothing = ShowcaseConfig::from_json_str(r#"{ "viewports": [] }"#);
        assert!(matches!(nothing, Err(ConfigError::NoViewports)));
    }

    #[test]
    fn test_shape_parameters_are_bounded() {
        let huge: Result<ModelDescriptor, _> = serde_json::from_str(
            r#"{ "format": "procedural:icosahedron", "detail": 4294967295 }"#,
        );
        assert!(huge.is_err());

        let flat: Result<ModelDescriptor, _> =
            serde_json::from_str(r#"{ "format": "procedural:cube", "size": 0.0 }"#);
        assert!(flat.is_err());

        let params = ShapeParams {
            segments: Some(MAX_SEGMENTS + 1),
            ..Default::default()
        };
        for name in ["sphere", "plane", "cylinder"] {
            assert!(matches!(
                ProceduralShape::from_name(name, &params),
                Err(DescriptorError::InvalidShape { .. })
            ));
        }

        let nan = ProceduralShape::Sphere {
            radius: f32::NAN,
            longitude_segments: 8,
            latitude_segments: 8,
        };
        assert!(nan.validate().is_err());

        // Shapes built directly skip from_name, so viewport validation checks them too
        let direct = ViewportConfig::new(
            "gem",
            vec![ModelDescriptor::Procedural(ProceduralShape::Icosahedron {
                radius: 1.0,
                detail: u32::MAX,
            })],
        );
        assert!(matches!(direct.validate(), Err(ConfigError::Invalid { .. })));

        assert!(ProceduralShape::FALLBACK.validate().is_ok());
        let edge = ShapeParams {
            detail: Some(MAX_DETAIL),
            ..Default::default()
        };
        assert!(ProceduralShape::from_name("icosahedron", &edge).is_ok());
    }
}

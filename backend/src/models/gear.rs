//! Cameras, optics and the imaging setups built from them.
//!
//! An [`OpticalSetup`] is the only gear type the scorers see. It is resolved once,
//! at load time, from a [`SetupSource`]: either a builtin catalog setup (which may
//! carry measured pixel scale / field of view values) or a custom pairing of a
//! camera and an optic, whose sampling is derived from the sensor geometry.

use qtty::Arcminutes;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

crate::define_id_type!(SetupId);
crate::define_id_type!(CameraId);
crate::define_id_type!(OpticId);

/// Arcseconds per radian divided by 1000 (µm pixel over mm focal length).
const PIXEL_SCALE_FACTOR: f64 = 206.265;

/// Arcminutes per radian, as used for field-of-view estimates.
const FOV_FACTOR: f64 = 3438.0;

/// Sensor resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Imaging camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
    /// Sensor width in mm
    pub sensor_width: f64,
    /// Sensor height in mm
    pub sensor_height: f64,
    /// Pixel pitch in microns
    pub pixel_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub color: bool,
}

/// Telescope or lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optic {
    pub id: OpticId,
    pub name: String,
    /// Focal length in mm
    pub focal_length: f64,
    /// Aperture in mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,
    #[serde(default)]
    pub kind: String,
}

impl Optic {
    /// Focal ratio, when the aperture is known.
    pub fn f_ratio(&self) -> Option<f64> {
        match self.aperture {
            Some(aperture) if aperture > 0.0 => Some(self.focal_length / aperture),
            _ => None,
        }
    }
}

/// Role of a setup in the user's kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupCategory {
    GrabAndGo,
    #[default]
    MainRig,
    Widefield,
}

/// Field of view in arcminutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub width: Arcminutes,
    pub height: Arcminutes,
}

impl FieldOfView {
    pub fn new(width_arcmin: f64, height_arcmin: f64) -> Self {
        Self {
            width: Arcminutes::new(width_arcmin),
            height: Arcminutes::new(height_arcmin),
        }
    }
}

/// Measured sampling of a builtin setup (for example from plate solving).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredOptics {
    /// Arcseconds per pixel
    pub pixel_scale: f64,
    pub fov: FieldOfView,
}

/// Catalog entry pairing an optic with a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupRecord {
    pub id: SetupId,
    pub name: String,
    pub optic: OpticId,
    pub camera: CameraId,
    #[serde(default)]
    pub category: SetupCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<MeasuredOptics>,
}

/// User-defined pairing of catalog gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSetup {
    pub id: SetupId,
    pub name: String,
    pub camera: CameraId,
    pub optic: OpticId,
    #[serde(default)]
    pub category: SetupCategory,
}

/// Where a setup comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SetupSource {
    /// Setup shipped with the gear catalog, looked up by id
    Builtin { id: SetupId },
    /// User-supplied camera + optic pairing
    Custom(CustomSetup),
}

impl SetupSource {
    pub fn builtin(id: impl Into<SetupId>) -> Self {
        SetupSource::Builtin { id: id.into() }
    }

    pub fn id(&self) -> &SetupId {
        match self {
            SetupSource::Builtin { id } => id,
            SetupSource::Custom(custom) => &custom.id,
        }
    }
}

/// Resolved imaging setup.
///
/// Immutable once constructed: changing the focal length or sensor means building a
/// new setup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpticalSetup {
    id: SetupId,
    name: String,
    focal_length: f64,
    pixel_scale: f64,
    fov: FieldOfView,
    category: SetupCategory,
    custom: bool,
}

impl OpticalSetup {
    /// Derive sampling from the camera's pixel pitch and sensor size.
    pub fn from_components(
        id: SetupId,
        name: impl Into<String>,
        camera: &Camera,
        optic: &Optic,
        category: SetupCategory,
    ) -> Result<Self> {
        validate_gear(camera, optic)?;
        let focal = optic.focal_length;
        Ok(Self {
            id,
            name: name.into(),
            focal_length: focal,
            pixel_scale: camera.pixel_size / focal * PIXEL_SCALE_FACTOR,
            fov: FieldOfView::new(
                camera.sensor_width / focal * FOV_FACTOR,
                camera.sensor_height / focal * FOV_FACTOR,
            ),
            category,
            custom: false,
        })
    }

    /// Setup with explicitly known sampling.
    pub fn with_measured(
        id: SetupId,
        name: impl Into<String>,
        focal_length: f64,
        measured: MeasuredOptics,
        category: SetupCategory,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            focal_length,
            pixel_scale: measured.pixel_scale,
            fov: measured.fov,
            category,
            custom: false,
        }
    }

    pub(crate) fn mark_custom(mut self) -> Self {
        self.custom = true;
        self
    }

    pub fn id(&self) -> &SetupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Focal length in mm.
    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    /// Arcseconds per pixel.
    pub fn pixel_scale(&self) -> f64 {
        self.pixel_scale
    }

    pub fn fov(&self) -> FieldOfView {
        self.fov
    }

    pub fn category(&self) -> SetupCategory {
        self.category
    }

    /// Whether the setup was defined by the user rather than shipped with the catalog.
    pub fn is_custom(&self) -> bool {
        self.custom
    }
}

fn validate_gear(camera: &Camera, optic: &Optic) -> Result<()> {
    if !optic.focal_length.is_finite() || optic.focal_length <= 0.0 {
        return Err(PlannerError::InvalidGear {
            id: optic.id.to_string(),
            reason: "focal length must be positive".to_string(),
        });
    }
    if !camera.pixel_size.is_finite() || camera.pixel_size <= 0.0 {
        return Err(PlannerError::InvalidGear {
            id: camera.id.to_string(),
            reason: "pixel size must be positive".to_string(),
        });
    }
    if camera.sensor_width.is_nan()
        || camera.sensor_height.is_nan()
        || camera.sensor_width <= 0.0
        || camera.sensor_height <= 0.0
    {
        return Err(PlannerError::InvalidGear {
            id: camera.id.to_string(),
            reason: "sensor dimensions must be positive".to_string(),
        });
    }
    Ok(())
}

impl MeasuredOptics {
    /// Reject non-finite or non-positive sampling values.
    pub fn validate(&self, setup_id: &SetupId) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.pixel_scale) {
            return Err(PlannerError::InvalidGear {
                id: setup_id.to_string(),
                reason: "measured pixel scale must be positive".to_string(),
            });
        }
        if !positive(self.fov.width.value()) || !positive(self.fov.height.value()) {
            return Err(PlannerError::InvalidGear {
                id: setup_id.to_string(),
                reason: "measured field of view must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Fail on the first setup id that appears twice.
pub fn ensure_unique_setup_ids<'a>(ids: impl IntoIterator<Item = &'a SetupId>) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(PlannerError::Catalog(format!("duplicate setup id '{}'", id)));
        }
    }
    Ok(())
}

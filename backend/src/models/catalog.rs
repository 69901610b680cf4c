// ============================================================================
// Catalog loading
// ============================================================================
//
// Target and gear catalogs are plain JSON documents. They are parsed and
// validated once; afterwards they are read-only and can be shared freely
// between recommendation requests.

use anyhow::{Context, Result};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::gear::{
    ensure_unique_setup_ids, Camera, CameraId, Optic, OpticId, OpticalSetup, SetupRecord,
    SetupSource,
};
use super::target::{FocalLengthBand, Target, TargetType};
use crate::error::PlannerError;

const BUNDLED_TARGETS: &str = include_str!("../../data/targets.json");
const BUNDLED_GEAR: &str = include_str!("../../data/gear.json");

#[derive(serde::Deserialize)]
struct TargetDocument {
    targets: Vec<Target>,
}

#[derive(serde::Deserialize)]
struct GearDocument {
    #[serde(default)]
    cameras: Vec<Camera>,
    #[serde(default)]
    optics: Vec<Optic>,
    #[serde(default)]
    setups: Vec<SetupRecord>,
}

/// Immutable collection of deep-sky targets, in catalog order.
#[derive(Debug, Clone)]
pub struct TargetCatalog {
    targets: Vec<Target>,
    checksum: String,
}

impl TargetCatalog {
    /// Build a catalog from already-parsed targets.
    pub fn new(targets: Vec<Target>) -> Result<Self> {
        validate_targets(&targets)?;
        let serialized =
            serde_json::to_string(&targets).context("Failed to serialize target catalog")?;
        Ok(Self {
            checksum: compute_checksum(&serialized),
            targets,
        })
    }

    /// Parse a `{ "targets": [...] }` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: TargetDocument =
            serde_json::from_str(json).context("Failed to deserialize target catalog JSON")?;
        let catalog = Self::new(document.targets)?;

        debug!("Loaded target catalog with {} targets", catalog.len());

        Ok(catalog)
    }

    /// Read and parse a target catalog file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read target catalog {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid target catalog {}", path.display()))
    }

    /// Catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_TARGETS).context("Bundled target catalog is invalid")
    }

    /// SHA-256 (hex) of the serialized targets.
    ///
    /// Computed from the parsed records rather than the raw text, so the same targets
    /// hash the same whether built in code or loaded from differently formatted JSON.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.targets
    }

    /// Look up a target by id, display name or alternate name (case-insensitive).
    pub fn get(&self, query: &str) -> Option<&Target> {
        self.targets
            .iter()
            .find(|t| t.id.as_str() == query)
            .or_else(|| self.targets.iter().find(|t| t.matches_name(query)))
    }

    pub fn by_type(&self, target_type: TargetType) -> impl Iterator<Item = &Target> {
        self.targets
            .iter()
            .filter(move |t| t.target_type == target_type)
    }

    /// Targets whose best months include `month` (1-12).
    pub fn in_season(&self, month: u32) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(move |t| t.is_in_season(month))
    }

    /// Apply the type and focal-length filters. An empty type set means "any type".
    pub fn filter<'a>(
        &'a self,
        types: &'a HashSet<TargetType>,
        focal_length: Option<FocalLengthBand>,
    ) -> impl Iterator<Item = &'a Target> + 'a {
        self.targets.iter().filter(move |t| {
            (types.is_empty() || types.contains(&t.target_type))
                && focal_length.map_or(true, |band| t.focal_length == band)
        })
    }
}

fn validate_targets(targets: &[Target]) -> Result<()> {
    let mut seen = HashSet::new();
    for target in targets {
        if !seen.insert(target.id.as_str()) {
            return Err(PlannerError::Catalog(format!("duplicate target id '{}'", target.id)).into());
        }
        if !(0.0..24.0).contains(&target.ra) {
            return Err(PlannerError::Catalog(format!(
                "target '{}' has right ascension {} outside [0, 24)",
                target.id, target.ra
            ))
            .into());
        }
        if !(-90.0..=90.0).contains(&target.dec.value()) {
            return Err(PlannerError::Catalog(format!(
                "target '{}' has declination {} outside [-90, 90]",
                target.id,
                target.dec.value()
            ))
            .into());
        }
        if target.size.width.value() <= 0.0 || target.size.height.value() <= 0.0 {
            return Err(PlannerError::Catalog(format!(
                "target '{}' must have a positive angular size",
                target.id
            ))
            .into());
        }
        if let Some(month) = target.best_months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(PlannerError::Catalog(format!(
                "target '{}' lists invalid month {}",
                target.id, month
            ))
            .into());
        }
    }
    Ok(())
}

/// Cameras, optics and setup records.
#[derive(Debug, Clone)]
pub struct GearCatalog {
    cameras: Vec<Camera>,
    optics: Vec<Optic>,
    setups: Vec<SetupRecord>,
    checksum: String,
}

impl GearCatalog {
    /// Parse a `{ "cameras": [...], "optics": [...], "setups": [...] }` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: GearDocument =
            serde_json::from_str(json).context("Failed to deserialize gear catalog JSON")?;
        ensure_unique_setup_ids(document.setups.iter().map(|r| &r.id))?;

        debug!(
            "Loaded gear catalog: {} cameras, {} optics, {} setups",
            document.cameras.len(),
            document.optics.len(),
            document.setups.len()
        );

        Ok(Self {
            cameras: document.cameras,
            optics: document.optics,
            setups: document.setups,
            checksum: compute_checksum(json),
        })
    }

    /// Read and parse a gear catalog file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read gear catalog {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid gear catalog {}", path.display()))
    }

    /// Gear shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_GEAR).context("Bundled gear catalog is invalid")
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn optics(&self) -> &[Optic] {
        &self.optics
    }

    pub fn setup_records(&self) -> &[SetupRecord] {
        &self.setups
    }

    pub fn camera(&self, id: &str) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id.as_str() == id)
    }

    pub fn optic(&self, id: &str) -> Option<&Optic> {
        self.optics.iter().find(|o| o.id.as_str() == id)
    }

    /// Resolve a setup source into an immutable [`OpticalSetup`].
    pub fn resolve(&self, source: &SetupSource) -> crate::error::Result<OpticalSetup> {
        match source {
            SetupSource::Builtin { id } => {
                let record = self
                    .setups
                    .iter()
                    .find(|r| &r.id == id)
                    .ok_or_else(|| PlannerError::UnknownSetup(id.to_string()))?;
                let optic = self.require_optic(&record.optic)?;
                let camera = self.require_camera(&record.camera)?;
                match record.measured {
                    Some(measured) => {
                        measured.validate(&record.id)?;
                        Ok(OpticalSetup::with_measured(
                            record.id.clone(),
                            record.name.clone(),
                            optic.focal_length,
                            measured,
                            record.category,
                        ))
                    }
                    None => OpticalSetup::from_components(
                        record.id.clone(),
                        record.name.clone(),
                        camera,
                        optic,
                        record.category,
                    ),
                }
            }
            SetupSource::Custom(custom) => {
                let camera = self.require_camera(&custom.camera)?;
                let optic = self.require_optic(&custom.optic)?;
                OpticalSetup::from_components(
                    custom.id.clone(),
                    custom.name.clone(),
                    camera,
                    optic,
                    custom.category,
                )
                .map(OpticalSetup::mark_custom)
            }
        }
    }

    /// Resolve several sources, failing on the first unresolvable one.
    pub fn resolve_all(&self, sources: &[SetupSource]) -> crate::error::Result<Vec<OpticalSetup>> {
        sources.iter().map(|s| self.resolve(s)).collect()
    }

    /// Every setup record in the catalog, resolved, in catalog order.
    pub fn builtin_setups(&self) -> crate::error::Result<Vec<OpticalSetup>> {
        self.setups
            .iter()
            .map(|r| self.resolve(&SetupSource::builtin(r.id.clone())))
            .collect()
    }

    fn require_camera(&self, id: &CameraId) -> crate::error::Result<&Camera> {
        self.camera(id.as_str())
            .ok_or_else(|| PlannerError::UnknownCamera(id.to_string()))
    }

    fn require_optic(&self, id: &OpticId) -> crate::error::Result<&Optic> {
        self.optic(id.as_str())
            .ok_or_else(|| PlannerError::UnknownOptic(id.to_string()))
    }
}

/// Compute a checksum for a catalog document
fn compute_checksum(json_str: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(json_str.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

// ============================================================================
// Tests
// ============================================================================

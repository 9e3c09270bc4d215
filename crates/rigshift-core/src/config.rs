//! Retargeting configuration.
//!
//! A [`RetargetConfig`] is supplied once at setup. It selects how each
//! skeleton's bones are named, where rest stacking stops, and the runtime
//! options of the transformer.
//!
//! ```
//! use rigshift_core::config::RetargetConfig;
//!
//! let config = RetargetConfig::from_json(r#"{
//!     "source": {"asset_name": "Skeleton1", "convention": "motive"},
//!     "destination": {"convention": "fbx", "asset_name": "Avatar"},
//!     "gap_policy": "rest",
//!     "mirrors": [{"slot": "left_hand", "axes": ["x"]}]
//! }"#).unwrap();
//! assert!(config.apply_position);
//! ```

use std::collections::BTreeMap;

use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::error::{RetargetError, RetargetResult};
use crate::mirror::{MirrorAxes, MirrorAxis, MirrorSpec};
use crate::naming::{BoneNameTable, NamingConvention};
use crate::slot::{CanonicalSlot, SlotArray};
use crate::transformer::{Calibration, GapPolicy};

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Naming of the streamed source skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Asset name prefix of streamed bone names. May be empty.
    pub asset_name: String,
    #[serde(default)]
    pub convention: NamingConvention,
    /// Bone at which rest stacking stops; the skeleton origin when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_root: Option<String>,
}

/// Naming of the destination skeleton: a convention with an asset name, or
/// an explicit bone map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convention: Option<NamingConvention>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bone_map: Option<BTreeMap<CanonicalSlot, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_root: Option<String>,
}

/// Mirror axes for one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorEntry {
    pub slot: CanonicalSlot,
    pub axes: Vec<MirrorAxis>,
}

/// Manual rotation offset for one slot, `[x, y, z, w]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManualOffsetEntry {
    pub slot: CanonicalSlot,
    pub rotation: [f32; 4],
}

/// Complete setup configuration for one skeleton pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetargetConfig {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    /// Write positions as well as rotations.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub apply_position: bool,
    #[serde(default)]
    pub gap_policy: GapPolicy,
    /// Reject duplicate bone names and doubly-claimed bones.
    #[serde(default)]
    pub strict: bool,
    /// Apply the convention's rest correction to the source skeleton.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub thumb_rest_correction: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mirrors: Vec<MirrorEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual_offsets: Vec<ManualOffsetEntry>,
}

impl RetargetConfig {
    /// Config for a source and destination both named by convention.
    pub fn new(
        source_convention: NamingConvention,
        source_asset: impl Into<String>,
        destination_convention: NamingConvention,
        destination_asset: impl Into<String>,
    ) -> Self {
        Self {
            source: SourceConfig {
                asset_name: source_asset.into(),
                convention: source_convention,
                reference_root: None,
            },
            destination: DestinationConfig {
                convention: Some(destination_convention),
                asset_name: Some(destination_asset.into()),
                ..Default::default()
            },
            apply_position: true,
            gap_policy: GapPolicy::default(),
            strict: false,
            thumb_rest_correction: true,
            mirrors: Vec::new(),
            manual_offsets: Vec::new(),
        }
    }

    /// Config for a destination named by an explicit bone map.
    pub fn with_bone_map<I, S>(
        source_convention: NamingConvention,
        source_asset: impl Into<String>,
        bone_map: I,
    ) -> Self
    where
        I: IntoIterator<Item = (CanonicalSlot, S)>,
        S: Into<String>,
    {
        let mut config = Self::new(source_convention, source_asset, source_convention, "");
        config.destination = DestinationConfig {
            bone_map: Some(
                bone_map
                    .into_iter()
                    .map(|(slot, name)| (slot, name.into()))
                    .collect(),
            ),
            ..Default::default()
        };
        config
    }

    /// Parses and validates a config.
    pub fn from_json(json: &str) -> RetargetResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> RetargetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the values serde cannot.
    pub fn validate(&self) -> RetargetResult<()> {
        let dest = &self.destination;
        match (&dest.convention, &dest.bone_map) {
            (Some(_), Some(_)) => {
                return Err(RetargetError::invalid_config(
                    "destination sets both a convention and a bone_map",
                ))
            }
            (None, None) => {
                return Err(RetargetError::invalid_config(
                    "destination needs a convention or a bone_map",
                ))
            }
            (Some(_), None) if dest.asset_name.is_none() => {
                return Err(RetargetError::invalid_config(
                    "destination convention requires an asset_name",
                ))
            }
            (None, Some(map)) if map.is_empty() => {
                return Err(RetargetError::invalid_config("destination bone_map is empty"))
            }
            (None, Some(_)) if dest.asset_name.is_some() => {
                return Err(RetargetError::invalid_config(
                    "destination asset_name only applies with a convention",
                ))
            }
            _ => {}
        }

        for (side, root) in [
            ("source", &self.source.reference_root),
            ("destination", &dest.reference_root),
        ] {
            if matches!(root, Some(name) if name.is_empty()) {
                return Err(RetargetError::invalid_config(format!(
                    "{} reference_root must not be empty",
                    side
                )));
            }
        }

        for (i, entry) in self.mirrors.iter().enumerate() {
            if self.mirrors[..i].iter().any(|e| e.slot == entry.slot) {
                return Err(RetargetError::invalid_config(format!(
                    "mirror for {} listed twice",
                    entry.slot
                )));
            }
        }

        for (i, entry) in self.manual_offsets.iter().enumerate() {
            if self.manual_offsets[..i].iter().any(|e| e.slot == entry.slot) {
                return Err(RetargetError::invalid_config(format!(
                    "manual offset for {} listed twice",
                    entry.slot
                )));
            }
            let q = Quat::from_array(entry.rotation);
            if !q.is_finite() || q.length_squared() < 1e-6 {
                return Err(RetargetError::invalid_config(format!(
                    "manual offset for {} is not a rotation",
                    entry.slot
                )));
            }
        }

        Ok(())
    }

    /// Name table of the source skeleton.
    pub fn source_names(&self) -> BoneNameTable {
        BoneNameTable::resolve(self.source.convention, &self.source.asset_name)
    }

    /// Name table of the destination skeleton.
    pub fn destination_names(&self) -> BoneNameTable {
        match (&self.destination.bone_map, self.destination.convention) {
            (Some(map), _) => {
                BoneNameTable::custom(map.iter().map(|(slot, name)| (*slot, name.as_str())))
            }
            (None, Some(convention)) => BoneNameTable::resolve(
                convention,
                self.destination.asset_name.as_deref().unwrap_or_default(),
            ),
            (None, None) => BoneNameTable::custom(std::iter::empty::<(CanonicalSlot, String)>()),
        }
    }

    /// Initial evaluation-time calibration.
    pub fn calibration(&self) -> Calibration {
        let mut mirrors = MirrorSpec::splat(MirrorAxes::NONE);
        for entry in &self.mirrors {
            mirrors[entry.slot] = MirrorAxes::from_axes(&entry.axes);
        }
        let mut manual_offsets = SlotArray::splat(Quat::IDENTITY);
        for entry in &self.manual_offsets {
            manual_offsets[entry.slot] = Quat::from_array(entry.rotation).normalize();
        }
        Calibration {
            mirrors,
            manual_offsets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RetargetConfig::from_json(
            r#"{
                "source": {"asset_name": "Skeleton1"},
                "destination": {"convention": "bvh", "asset_name": "Avatar"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.source.convention, NamingConvention::Motive);
        assert!(config.apply_position);
        assert!(config.thumb_rest_correction);
        assert!(!config.strict);
        assert_eq!(config.gap_policy, GapPolicy::Hold);
        assert_eq!(
            config.destination_names().get(CanonicalSlot::LeftHand),
            Some("Avatar_LeftWrist")
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RetargetConfig::from_json(
            r#"{
                "source": {"asset_name": "A"},
                "destination": {"convention": "fbx", "asset_name": "B"},
                "scale": 2.0
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RetargetError::Json(_)));
    }

    #[test]
    fn test_bone_map_destination() {
        let config = RetargetConfig::from_json(
            r#"{
                "source": {"asset_name": "Skeleton1", "reference_root": "Skeleton1_Hip"},
                "destination": {
                    "bone_map": {"hips": "pelvis", "left_thumb_proximal": "thumb_01_l"},
                    "reference_root": "root"
                },
                "strict": true
            }"#,
        )
        .unwrap();
        let names = config.destination_names();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(CanonicalSlot::LeftThumbProximal), Some("thumb_01_l"));
        assert_eq!(names.convention(), None);
        assert_eq!(config.destination.reference_root.as_deref(), Some("root"));
    }

    #[test]
    fn test_destination_naming_must_be_unambiguous() {
        let mut config = RetargetConfig::new(NamingConvention::Motive, "A", NamingConvention::Fbx, "B");
        config.destination.bone_map = Some(BTreeMap::from([(CanonicalSlot::Hips, "hips".to_string())]));
        assert_eq!(config.validate().unwrap_err().code(), "RETARGET_009");

        config.destination.convention = None;
        config.destination.asset_name = None;
        assert!(config.validate().is_ok());

        config.destination.bone_map = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_calibration_from_config() {
        let config = RetargetConfig::from_json(
            r#"{
                "source": {"asset_name": "A"},
                "destination": {"convention": "fbx", "asset_name": "B"},
                "mirrors": [{"slot": "right_hand", "axes": ["x", "z"]}],
                "manual_offsets": [{"slot": "head", "rotation": [0.0, 0.0, 0.0, 2.0]}]
            }"#,
        )
        .unwrap();
        let calibration = config.calibration();
        assert_eq!(
            calibration.mirrors[CanonicalSlot::RightHand],
            MirrorAxes { x: true, y: false, z: true }
        );
        assert_eq!(calibration.manual_offsets[CanonicalSlot::Head], Quat::IDENTITY);
        assert_eq!(calibration.manual_offsets[CanonicalSlot::Neck], Quat::IDENTITY);
    }

    #[test]
    fn test_invalid_offsets_rejected() {
        let mut config = RetargetConfig::new(NamingConvention::Motive, "A", NamingConvention::Fbx, "B");
        config.manual_offsets.push(ManualOffsetEntry {
            slot: CanonicalSlot::Head,
            rotation: [0.0; 4],
        });
        assert!(config.validate().is_err());

        config.manual_offsets[0].rotation = [0.0, 0.0, 0.0, 1.0];
        config.manual_offsets.push(ManualOffsetEntry {
            slot: CanonicalSlot::Head,
            rotation: [0.0, 0.0, 0.0, 1.0],
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn test_json_roundtrip_omits_defaults() {
        let config = RetargetConfig::new(NamingConvention::Bvh, "Actor", NamingConvention::Fbx, "Avatar");
        let json = config.to_json_pretty().unwrap();
        assert!(!json.contains("apply_position"));
        assert!(!json.contains("mirrors"));
        let parsed = RetargetConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }
}

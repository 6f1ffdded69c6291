use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{bounds::BoundsConfig, projection::ViewTransform};

/// Camera used for a whole render run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ViewMode {
    /// Looking down the Z axis onto the X-Y plane.
    #[default]
    FaceOn,
    /// Looking along Y at the X-Z plane.
    EdgeOn,
    /// X tilt followed by Z rotation, both in degrees.
    Tilted { angle_x_deg: f64, angle_z_deg: f64 },
}

impl ViewMode {
    #[must_use]
    pub fn tilted(angle_x_deg: f64, angle_z_deg: f64) -> Self {
        ViewMode::Tilted {
            angle_x_deg,
            angle_z_deg,
        }
    }

    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        match *self {
            ViewMode::FaceOn => ViewTransform::face_on(),
            ViewMode::EdgeOn => ViewTransform::edge_on(),
            ViewMode::Tilted {
                angle_x_deg,
                angle_z_deg,
            } => ViewTransform::Rotate {
                angle_x_deg,
                angle_z_deg,
            },
        }
    }

    /// Whether the vertical screen axis is the thin axis of the disks.
    #[must_use]
    pub fn thin_axis(&self, config: &BoundsConfig) -> bool {
        match self {
            ViewMode::FaceOn => false,
            ViewMode::EdgeOn => true,
            ViewMode::Tilted { .. } => config.tilted_thin_axis,
        }
    }

    /// Caption naming the camera.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            ViewMode::FaceOn => "Face-on view (X-Y plane)".to_owned(),
            ViewMode::EdgeOn => "Edge-on view (X-Z plane)".to_owned(),
            ViewMode::Tilted {
                angle_x_deg,
                angle_z_deg,
            } => format!("View: {angle_x_deg}° tilt, {angle_z_deg}° rotation"),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::FaceOn => f.write_str("face-on"),
            ViewMode::EdgeOn => f.write_str("edge-on"),
            ViewMode::Tilted { .. } => f.write_str("tilted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Axis;

    #[test]
    fn test_transforms() {
        assert_eq!(
            ViewMode::EdgeOn.transform(),
            ViewTransform::AxisDrop(Axis::X, Axis::Z)
        );
        assert_eq!(
            ViewMode::tilted(30., 20.).transform(),
            ViewTransform::Rotate {
                angle_x_deg: 30.,
                angle_z_deg: 20.
            }
        );
    }

    #[test]
    fn test_thin_axis_policy() {
        let mut config = BoundsConfig::default();
        assert!(!ViewMode::FaceOn.thin_axis(&config));
        assert!(ViewMode::EdgeOn.thin_axis(&config));
        assert!(ViewMode::tilted(30., 20.).thin_axis(&config));

        config.tilted_thin_axis = false;
        assert!(!ViewMode::tilted(30., 20.).thin_axis(&config));
        assert!(ViewMode::EdgeOn.thin_axis(&config));
    }

    #[test]
    fn test_labels() {
        assert_eq!(ViewMode::tilted(30., 20.).label(), "View: 30° tilt, 20° rotation");
        assert_eq!(ViewMode::EdgeOn.to_string(), "edge-on");
    }

    #[test]
    fn test_serde() {
        let mode: ViewMode =
            serde_json::from_str(r#"{"kind": "tilted", "angle_x_deg": 45, "angle_z_deg": 10}"#)
                .unwrap();
        assert_eq!(mode, ViewMode::tilted(45., 10.));

        let mode: ViewMode = serde_json::from_str(r#"{"kind": "edge-on"}"#).unwrap();
        assert_eq!(mode, ViewMode::EdgeOn);
    }

    #[test]
    fn test_default_is_face_on() {
        assert_eq!(ViewMode::default(), ViewMode::FaceOn);
    }
}

use nalgebra::{Rotation3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            other => Err(other),
        }
    }
}

/// A map from 3D positions to 2D screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewTransform {
    /// Keep the two named axes verbatim, in order.
    AxisDrop(Axis, Axis),
    /// Rotate about X, then about Z, then keep (x, y).
    Rotate { angle_x_deg: f64, angle_z_deg: f64 },
}

impl ViewTransform {
    #[must_use]
    pub fn face_on() -> Self {
        ViewTransform::AxisDrop(Axis::X, Axis::Y)
    }

    #[must_use]
    pub fn edge_on() -> Self {
        ViewTransform::AxisDrop(Axis::X, Axis::Z)
    }

    /// Project every position. An empty input gives an empty output.
    #[must_use]
    pub fn project(&self, positions: &[Vector3<f64>]) -> Vec<Vector2<f64>> {
        match *self {
            ViewTransform::AxisDrop(a, b) => {
                let (i, j) = (a.index(), b.index());
                positions.iter().map(|p| Vector2::new(p[i], p[j])).collect()
            }
            ViewTransform::Rotate {
                angle_x_deg,
                angle_z_deg,
            } => {
                let rot = rotation(angle_x_deg, angle_z_deg);
                positions
                    .iter()
                    .map(|p| (rot * p).xy())
                    .collect()
            }
        }
    }
}

/// The rotation `Rz(angle_z) * Rx(angle_x)`: the X rotation acts first.
///
/// Both rotations are right-handed and take their angles in degrees.
#[must_use]
pub fn rotation(angle_x_deg: f64, angle_z_deg: f64) -> Rotation3<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), angle_x_deg.to_radians());
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), angle_z_deg.to_radians());

    rz * rx
}

/// Rotated 3D positions, before the final axis drop.
#[must_use]
pub fn rotate(positions: &[Vector3<f64>], angle_x_deg: f64, angle_z_deg: f64) -> Vec<Vector3<f64>> {
    let rot = rotation(angle_x_deg, angle_z_deg);
    positions.iter().map(|p| rot * p).collect()
}

#[must_use]
pub fn project(positions: &[Vector3<f64>], transform: ViewTransform) -> Vec<Vector2<f64>> {
    transform.project(positions)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::Matrix3;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn cloud(n: usize, seed: u64) -> Vec<Vector3<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Vector3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_axis_drop_selects_columns() {
        let pos = cloud(50, 0);

        let xz = project(&pos, ViewTransform::AxisDrop(Axis::X, Axis::Z));
        assert_eq!(xz.len(), pos.len());
        for (p, q) in pos.iter().zip(&xz) {
            assert_eq!(q.x, p.x);
            assert_eq!(q.y, p.z);
        }

        let zy = project(&pos, ViewTransform::AxisDrop(Axis::Z, Axis::Y));
        for (p, q) in pos.iter().zip(&zy) {
            assert_eq!(q.x, p.z);
            assert_eq!(q.y, p.y);
        }
    }

    #[test]
    fn test_axis_from_index() {
        assert_eq!(Axis::try_from(2), Ok(Axis::Z));
        assert_eq!(Axis::try_from(3), Err(3));
    }

    #[test]
    fn test_zero_rotation_is_face_on() {
        let pos = cloud(50, 1);

        let rotated = ViewTransform::Rotate {
            angle_x_deg: 0.,
            angle_z_deg: 0.,
        }
        .project(&pos);
        let face_on = ViewTransform::face_on().project(&pos);

        for (r, f) in rotated.iter().zip(&face_on) {
            assert_abs_diff_eq!(r, f, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rotation_matrix() {
        let (ax, az) = (30f64.to_radians(), 20f64.to_radians());
        let rx = Matrix3::new(
            1., 0., 0., //
            0., ax.cos(), -ax.sin(), //
            0., ax.sin(), ax.cos(),
        );
        let rz = Matrix3::new(
            az.cos(), -az.sin(), 0., //
            az.sin(), az.cos(), 0., //
            0., 0., 1.,
        );

        assert_abs_diff_eq!(*rotation(30., 20.).matrix(), rz * rx, epsilon = 1e-12);
    }

    #[test]
    fn test_x_rotation_applies_first() {
        let pos = vec![Vector3::new(0., 0., 1.), Vector3::new(0., 1., 0.)];

        let projected = ViewTransform::Rotate {
            angle_x_deg: 90.,
            angle_z_deg: 90.,
        }
        .project(&pos);

        assert_abs_diff_eq!(projected[0], Vector2::new(1., 0.), epsilon = 1e-12);
        assert_abs_diff_eq!(projected[1], Vector2::new(0., 0.), epsilon = 1e-12);

        // the reversed composition lands elsewhere
        let reversed = rotation(90., 0.) * rotation(0., 90.) * pos[0];
        assert_abs_diff_eq!(reversed.xy(), Vector2::new(0., -1.), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_preserves_distances() {
        let pos = cloud(40, 2);
        let rotated = rotate(&pos, 37., -112.);

        for i in 0..pos.len() {
            for j in i + 1..pos.len() {
                assert_abs_diff_eq!(
                    (pos[i] - pos[j]).norm(),
                    (rotated[i] - rotated[j]).norm(),
                    epsilon = 1e-10
                );
            }
        }
    }

    #[test]
    fn test_empty_positions() {
        let empty: Vec<Vector3<f64>> = Vec::new();

        assert!(ViewTransform::edge_on().project(&empty).is_empty());
        assert!(ViewTransform::Rotate {
            angle_x_deg: 30.,
            angle_z_deg: 20.
        }
        .project(&empty)
        .is_empty());
    }
}

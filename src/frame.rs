use nalgebra::Vector2;

use crate::{
    projection::ViewTransform,
    snapshot::{ParticleClass, Snapshot},
};

/// One snapshot after projection to screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedFrame {
    pub time: f64,
    points: [Vec<Vector2<f64>>; 3],
    new_star_mass: f64,
}

impl ProjectedFrame {
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot, transform: &ViewTransform) -> Self {
        let points = ParticleClass::ALL.map(|class| transform.project(snapshot.positions(class)));

        Self {
            time: snapshot.time(),
            points,
            new_star_mass: snapshot.new_stars().total_mass(),
        }
    }

    #[must_use]
    pub fn points(&self, class: ParticleClass) -> &[Vector2<f64>] {
        &self.points[class.index()]
    }

    /// Every class's points, empty classes included.
    pub fn point_sets(&self) -> impl Iterator<Item = &[Vector2<f64>]> {
        self.points.iter().map(Vec::as_slice)
    }

    /// Disk and bulge, drawn together as the old stellar population.
    pub fn old_stars(&self) -> impl Iterator<Item = &Vector2<f64>> {
        self.points(ParticleClass::PreexistingDisk)
            .iter()
            .chain(self.points(ParticleClass::Bulge))
    }

    #[must_use]
    pub fn new_star_count(&self) -> usize {
        self.points(ParticleClass::NewlyFormedStar).len()
    }

    #[must_use]
    pub fn new_star_mass(&self) -> f64 {
        self.new_star_mass
    }

    #[must_use]
    pub fn total_particles(&self) -> usize {
        self.points.iter().map(Vec::len).sum()
    }
}

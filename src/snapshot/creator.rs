use std::f64::consts::PI;

use nalgebra::Vector3;
use rand::rngs::ThreadRng;
use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal, Uniform};

use super::{NewStars, Snapshot, SnapshotSequence};

/// Generates synthetic snapshots of two thin disks approaching along X.
///
/// Each disk has an exponential surface density and a Gaussian vertical
/// profile. Newly formed stars appear near the collision centre at a constant
/// rate, so early frames have none.
#[derive(Clone, Debug)]
pub struct DiskSnapshotCreator<R: Rng> {
    rng: R,
    disk_particles: usize,
    bulge_particles: usize,
    scale_length: f64,
    scale_height: f64,
    separation: f64,
    approach_speed: f64,
    formation_rate: f64,
}

impl DiskSnapshotCreator<ThreadRng> {
    #[must_use]
    pub fn new(disk_particles: usize, bulge_particles: usize) -> Self {
        Self::rng(disk_particles, bulge_particles, rand::thread_rng())
    }
}

impl<R: Rng> DiskSnapshotCreator<R> {
    pub fn rng(disk_particles: usize, bulge_particles: usize, rng: R) -> Self {
        Self {
            rng,
            disk_particles,
            bulge_particles,
            scale_length: 3.,
            scale_height: 0.3,
            separation: 40.,
            approach_speed: 20.,
            formation_rate: 500.,
        }
    }

    /// Radial and vertical scale of each disk in kpc.
    #[must_use]
    pub fn scales(mut self, scale_length: f64, scale_height: f64) -> Self {
        self.scale_length = scale_length;
        self.scale_height = scale_height;
        self
    }

    /// Initial centre separation (kpc) and closing speed (kpc/Gyr).
    #[must_use]
    pub fn orbit(mut self, separation: f64, approach_speed: f64) -> Self {
        self.separation = separation;
        self.approach_speed = approach_speed;
        self
    }

    /// New stars per Gyr.
    #[must_use]
    pub fn formation_rate(mut self, formation_rate: f64) -> Self {
        self.formation_rate = formation_rate;
        self
    }

    fn centres(&self, time: f64) -> [Vector3<f64>; 2] {
        let half = (0.5 * self.separation - 0.5 * self.approach_speed * time).max(0.);
        [Vector3::new(-half, 0., 0.), Vector3::new(half, 0., 0.)]
    }

    fn disk_particle(&mut self, centre: Vector3<f64>) -> Vector3<f64> {
        let rng = &mut self.rng;

        // Gamma(2) radius gives an exponential surface density
        let e1: f64 = Exp1.sample(rng);
        let e2: f64 = Exp1.sample(rng);
        let r = self.scale_length * (e1 + e2);
        let phi = Uniform::new(0., 2. * PI).sample(rng);
        let z: f64 = StandardNormal.sample(rng);

        centre + Vector3::new(r * phi.cos(), r * phi.sin(), self.scale_height * z)
    }

    fn bulge_particle(&mut self, centre: Vector3<f64>) -> Vector3<f64> {
        let rng = &mut self.rng;
        let sigma = 0.5 * self.scale_length;
        let offset = Vector3::from_fn(|_, _| {
            let n: f64 = StandardNormal.sample(rng);
            sigma * n
        });

        centre + offset
    }

    pub fn create_snapshot(&mut self, time: f64) -> Snapshot {
        let centres = self.centres(time);

        let disk = (0..self.disk_particles)
            .map(|i| self.disk_particle(centres[i % 2]))
            .collect();
        let bulge = (0..self.bulge_particles)
            .map(|i| self.bulge_particle(centres[i % 2]))
            .collect();

        let n_new = (self.formation_rate * time).max(0.) as usize;
        let new_stars: NewStars = (0..n_new)
            .map(|_| {
                let pos = self.disk_particle(Vector3::zeros());
                let age = Uniform::new_inclusive(0., time).sample(&mut self.rng);
                (pos, 1e-5, time - age)
            })
            .collect();

        Snapshot::new(time, disk, bulge, new_stars)
    }

    pub fn create_sequence(&mut self, times: impl IntoIterator<Item = f64>) -> SnapshotSequence {
        let snapshots = times
            .into_iter()
            .map(|t| self.create_snapshot(t))
            .collect();
        SnapshotSequence::from_snapshots(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::ParticleClass;

    #[test]
    fn test_counts() {
        let mut creator = DiskSnapshotCreator::rng(100, 20, StdRng::seed_from_u64(0));

        let first = creator.create_snapshot(0.);
        assert_eq!(first.positions(ParticleClass::PreexistingDisk).len(), 100);
        assert_eq!(first.positions(ParticleClass::Bulge).len(), 20);
        assert!(first.new_stars().is_empty());

        let later = creator.create_snapshot(0.5);
        assert_eq!(later.new_stars().len(), 250);
        assert!(later
            .new_stars()
            .formation_times()
            .iter()
            .all(|&t| (0. ..=0.5).contains(&t)));
    }

    #[test]
    fn test_disks_are_thin() {
        let mut creator =
            DiskSnapshotCreator::rng(2_000, 0, StdRng::seed_from_u64(1)).scales(3., 0.1);
        let snap = creator.create_snapshot(0.);

        let disk = snap.positions(ParticleClass::PreexistingDisk);
        let mean_abs_z = disk.iter().map(|p| p.z.abs()).sum::<f64>() / disk.len() as f64;
        let mean_abs_y = disk.iter().map(|p| p.y.abs()).sum::<f64>() / disk.len() as f64;
        assert!(mean_abs_z < 0.2);
        assert!(mean_abs_y > 1.);
    }

    #[test]
    fn test_sequence_is_time_ordered() {
        let mut creator = DiskSnapshotCreator::rng(10, 0, StdRng::seed_from_u64(2));
        let seq = creator.create_sequence([1.0, 0.0, 0.5]);

        let times: Vec<_> = seq.iter().map(Snapshot::time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
    }
}

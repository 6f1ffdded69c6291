#[cfg(feature = "randomization")]
mod creator;
#[cfg(feature = "hdf5")]
mod hdf5_reader;

#[cfg(feature = "randomization")]
pub use creator::*;
#[cfg(feature = "hdf5")]
pub use hdf5_reader::*;

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

use nalgebra::Vector3;

use crate::{RenderError, Result};

/// A category of simulated bodies with its own visual treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleClass {
    PreexistingDisk,
    Bulge,
    NewlyFormedStar,
}

impl ParticleClass {
    pub const ALL: [ParticleClass; 3] = [
        ParticleClass::PreexistingDisk,
        ParticleClass::Bulge,
        ParticleClass::NewlyFormedStar,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ParticleClass::PreexistingDisk => 0,
            ParticleClass::Bulge => 1,
            ParticleClass::NewlyFormedStar => 2,
        }
    }

    /// Name of the group holding this class inside a snapshot file.
    #[must_use]
    pub fn group_name(self) -> &'static str {
        match self {
            ParticleClass::PreexistingDisk => "PartType2",
            ParticleClass::Bulge => "PartType3",
            ParticleClass::NewlyFormedStar => "PartType4",
        }
    }
}

impl fmt::Display for ParticleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParticleClass::PreexistingDisk => "pre-existing disk",
            ParticleClass::Bulge => "bulge",
            ParticleClass::NewlyFormedStar => "newly formed stars",
        };
        f.write_str(name)
    }
}

/// Newly formed stars, stored as a Struct-of-Arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewStars {
    pub(crate) positions: Vec<Vector3<f64>>,
    pub(crate) masses: Vec<f64>,
    pub(crate) formation_times: Vec<f64>,
}

impl NewStars {
    #[must_use]
    pub fn new(
        positions: Vec<Vector3<f64>>,
        masses: Vec<f64>,
        formation_times: Vec<f64>,
    ) -> Self {
        let len = positions.len();
        assert_eq!(len, masses.len());
        assert_eq!(len, formation_times.len());

        Self {
            positions,
            masses,
            formation_times,
        }
    }

    #[must_use]
    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    #[must_use]
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    #[must_use]
    pub fn formation_times(&self) -> &[f64] {
        &self.formation_times
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }
}

impl FromIterator<(Vector3<f64>, f64, f64)> for NewStars {
    fn from_iter<T: IntoIterator<Item = (Vector3<f64>, f64, f64)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let cap = iter.size_hint().0;
        let mut positions = Vec::with_capacity(cap);
        let mut masses = Vec::with_capacity(cap);
        let mut formation_times = Vec::with_capacity(cap);

        for (p, m, t) in iter {
            positions.push(p);
            masses.push(m);
            formation_times.push(t);
        }

        Self {
            positions,
            masses,
            formation_times,
        }
    }
}

/// One simulation instant.
///
/// Classes absent from the source file hold empty position sets, so frames can
/// always be pooled without special cases.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub(crate) source: Option<PathBuf>,
    pub(crate) time: f64,
    pub(crate) disk: Vec<Vector3<f64>>,
    pub(crate) bulge: Vec<Vector3<f64>>,
    pub(crate) new_stars: NewStars,
}

impl Snapshot {
    #[must_use]
    pub fn new(
        time: f64,
        disk: Vec<Vector3<f64>>,
        bulge: Vec<Vector3<f64>>,
        new_stars: NewStars,
    ) -> Self {
        Self {
            source: None,
            time,
            disk,
            bulge,
            new_stars,
        }
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Simulation time in Gyr.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn positions(&self, class: ParticleClass) -> &[Vector3<f64>] {
        match class {
            ParticleClass::PreexistingDisk => &self.disk,
            ParticleClass::Bulge => &self.bulge,
            ParticleClass::NewlyFormedStar => &self.new_stars.positions,
        }
    }

    #[must_use]
    pub fn new_stars(&self) -> &NewStars {
        &self.new_stars
    }

    #[must_use]
    pub fn total_particles(&self) -> usize {
        ParticleClass::ALL
            .iter()
            .map(|&class| self.positions(class).len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_particles() == 0
    }
}

/// Extracts a [`Snapshot`] from one input file.
pub trait SnapshotReader {
    fn read(&self, path: &Path) -> Result<Snapshot>;
}

impl<R: SnapshotReader + ?Sized> SnapshotReader for &R {
    fn read(&self, path: &Path) -> Result<Snapshot> {
        (**self).read(path)
    }
}

/// List the files in `dir` named `<prefix>*.<extension>`, sorted lexicographically.
pub fn discover_snapshots(
    dir: impl AsRef<Path>,
    prefix: &str,
    extension: &str,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| RenderError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| RenderError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        let matches_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix));
        let matches_ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == extension);
        if matches_name && matches_ext {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Snapshots of one run, ordered by ascending simulation time.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSequence {
    snapshots: Vec<Snapshot>,
}

impl SnapshotSequence {
    /// Read every file in order. Any failing file aborts the whole load.
    pub fn load<R: SnapshotReader + ?Sized>(reader: &R, paths: &[PathBuf]) -> Result<Self> {
        let mut snapshots = Vec::with_capacity(paths.len());
        for path in paths {
            log::debug!("loading {}", path.display());
            snapshots.push(reader.read(path)?);
        }

        Ok(Self::from_snapshots(snapshots))
    }

    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<Snapshot>) -> Self {
        // stable, so equal times keep their discovery order
        snapshots.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { snapshots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn total_particles(&self) -> usize {
        self.snapshots.iter().map(Snapshot::total_particles).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

impl<'a> IntoIterator for &'a SnapshotSequence {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MapReader(HashMap<PathBuf, f64>);

    impl SnapshotReader for MapReader {
        fn read(&self, path: &Path) -> Result<Snapshot> {
            let time = *self.0.get(path).ok_or_else(|| RenderError::MissingData {
                path: path.to_path_buf(),
                field: "Header/Time".into(),
            })?;
            Ok(Snapshot::new(time, Vec::new(), Vec::new(), NewStars::default()).with_source(path))
        }
    }

    #[test]
    fn test_absent_classes_are_empty() {
        let snap = Snapshot::new(
            0.,
            vec![Vector3::new(1., 0., 0.)],
            Vec::new(),
            NewStars::default(),
        );

        assert!(snap.positions(ParticleClass::Bulge).is_empty());
        assert!(snap.positions(ParticleClass::NewlyFormedStar).is_empty());
        assert_eq!(snap.total_particles(), 1);
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_sequence_sorted_by_time() {
        let reader = MapReader(HashMap::from([
            (PathBuf::from("snapshot_000.hdf5"), 1.0),
            (PathBuf::from("snapshot_001.hdf5"), 0.5),
            (PathBuf::from("snapshot_002.hdf5"), 0.0),
        ]));
        let paths = vec![
            PathBuf::from("snapshot_000.hdf5"),
            PathBuf::from("snapshot_001.hdf5"),
            PathBuf::from("snapshot_002.hdf5"),
        ];

        let seq = SnapshotSequence::load(&reader, &paths).unwrap();
        let times: Vec<_> = seq.iter().map(Snapshot::time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(
            seq.as_slice()[0].source(),
            Some(Path::new("snapshot_002.hdf5"))
        );
    }

    #[test]
    fn test_failing_file_aborts_load() {
        let reader = MapReader(HashMap::from([(PathBuf::from("a.hdf5"), 0.0)]));
        let paths = vec![PathBuf::from("a.hdf5"), PathBuf::from("b.hdf5")];

        let err = SnapshotSequence::load(&reader, &paths).unwrap_err();
        assert!(matches!(err, RenderError::MissingData { .. }));
    }

    #[test]
    fn test_new_stars_from_iter() {
        let stars: NewStars = (0..4)
            .map(|i| (Vector3::new(i as f64, 0., 0.), 2., 0.5 * i as f64))
            .collect();

        assert_eq!(stars.len(), 4);
        assert_eq!(stars.total_mass(), 8.);
        assert_eq!(stars.formation_times()[3], 1.5);
    }

    #[test]
    #[should_panic]
    fn test_new_stars_mismatched_lengths() {
        let _ = NewStars::new(vec![Vector3::zeros()], vec![], vec![0.]);
    }
}

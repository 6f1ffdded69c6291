use std::path::{Path, PathBuf};

use hdf5::{Dataset, File, Group};
use nalgebra::Vector3;

use super::{NewStars, ParticleClass, Snapshot, SnapshotReader};
use crate::{RenderError, Result};

const HEADER: &str = "Header";
const TIME: &str = "Time";
const COORDINATES: &str = "Coordinates";
const MASSES: &str = "Masses";
const FORMATION_TIME: &str = "StellarFormationTime";

/// Reads Gadget-style HDF5 snapshots.
///
/// Only the header time, the coordinates of the disk, bulge and new-star
/// groups, and the masses and formation times of new stars are read.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hdf5Reader;

impl Hdf5Reader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotReader for Hdf5Reader {
    fn read(&self, path: &Path) -> Result<Snapshot> {
        let h5 = |source| RenderError::Hdf5 {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(h5)?;
        let time = read_time(&file, path)?;

        let disk = read_class_positions(&file, ParticleClass::PreexistingDisk, path)?;
        let bulge = read_class_positions(&file, ParticleClass::Bulge, path)?;

        let new_stars = match optional_group(&file, ParticleClass::NewlyFormedStar, path)? {
            Some(group) => {
                let positions = read_positions(&group.dataset(COORDINATES).map_err(h5)?, path)?;
                let masses: Vec<f64> = group
                    .dataset(MASSES)
                    .and_then(|ds| ds.read_raw())
                    .map_err(h5)?;
                let formation_times: Vec<f64> = group
                    .dataset(FORMATION_TIME)
                    .and_then(|ds| ds.read_raw())
                    .map_err(h5)?;

                check_len(path, MASSES, masses.len(), positions.len())?;
                check_len(path, FORMATION_TIME, formation_times.len(), positions.len())?;

                NewStars::new(positions, masses, formation_times)
            }
            None => NewStars::default(),
        };

        Ok(Snapshot::new(time, disk, bulge, new_stars).with_source(path))
    }
}

fn read_time(file: &File, path: &Path) -> Result<f64> {
    let missing = || RenderError::MissingData {
        path: path.to_path_buf(),
        field: format!("{HEADER}/{TIME}"),
    };
    let h5 = |source| RenderError::Hdf5 {
        path: path.to_path_buf(),
        source,
    };

    if !file.link_exists(HEADER) {
        return Err(missing());
    }
    let header = file.group(HEADER).map_err(h5)?;
    if !header.attr_names().map_err(h5)?.iter().any(|name| name == TIME) {
        return Err(missing());
    }

    header.attr(TIME).and_then(|a| a.read_scalar()).map_err(h5)
}

fn optional_group(file: &File, class: ParticleClass, path: &Path) -> Result<Option<Group>> {
    let name = class.group_name();
    if !file.link_exists(name) {
        return Ok(None);
    }

    file.group(name).map(Some).map_err(|source| RenderError::Hdf5 {
        path: path.to_path_buf(),
        source,
    })
}

fn read_class_positions(
    file: &File,
    class: ParticleClass,
    path: &Path,
) -> Result<Vec<Vector3<f64>>> {
    match optional_group(file, class, path)? {
        Some(group) => {
            let ds = group
                .dataset(COORDINATES)
                .map_err(|source| RenderError::Hdf5 {
                    path: path.to_path_buf(),
                    source,
                })?;
            read_positions(&ds, path)
        }
        None => Ok(Vec::new()),
    }
}

fn read_positions(ds: &Dataset, path: &Path) -> Result<Vec<Vector3<f64>>> {
    let shape = ds.shape();
    let empty = shape.iter().product::<usize>() == 0;
    if !(empty || (shape.len() == 2 && shape[1] == 3)) {
        return Err(RenderError::MalformedData {
            path: path.to_path_buf(),
            reason: format!("{} has shape {shape:?}, expected N x 3", ds.name()),
        });
    }

    let flat: Vec<f64> = ds.read_raw().map_err(|source| RenderError::Hdf5 {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(flat
        .chunks_exact(3)
        .map(|xyz| Vector3::new(xyz[0], xyz[1], xyz[2]))
        .collect())
}

fn check_len(path: &Path, field: &str, len: usize, expected: usize) -> Result<()> {
    if len == expected {
        return Ok(());
    }

    Err(RenderError::MalformedData {
        path: PathBuf::from(path),
        reason: format!("{field} has {len} entries for {expected} positions"),
    })
}

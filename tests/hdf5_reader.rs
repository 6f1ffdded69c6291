#![cfg(feature = "hdf5")]

use std::{fs, path::PathBuf};

use galaxy_frames::{
    snapshot::Hdf5Reader, ParticleClass, RenderError, SnapshotReader,
};
use nalgebra::Vector3;

fn path(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("hdf5_reader");
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn write_time(file: &hdf5::File, time: f64) -> hdf5::Result<()> {
    let header = file.create_group("Header")?;
    header
        .new_attr::<f64>()
        .shape(())
        .create("Time")?
        .write_scalar(&time)
}

fn write_coordinates(group: &hdf5::Group, coords: &[[f64; 3]]) -> hdf5::Result<()> {
    let flat: Vec<f64> = coords.iter().flatten().copied().collect();
    group
        .new_dataset::<f64>()
        .shape((coords.len(), 3))
        .create("Coordinates")?
        .write_raw(&flat)
}

#[test]
fn test_reads_disk_and_new_stars() {
    let path = path("snapshot_000.hdf5");
    {
        let file = hdf5::File::create(&path).unwrap();
        write_time(&file, 0.75).unwrap();

        let disk = file.create_group("PartType2").unwrap();
        write_coordinates(&disk, &[[1., 0., 0.], [-1., 0., 0.]]).unwrap();

        let stars = file.create_group("PartType4").unwrap();
        write_coordinates(&stars, &[[0., 1., 0.]]).unwrap();
        stars
            .new_dataset::<f64>()
            .shape(1)
            .create("Masses")
            .unwrap()
            .write_raw(&[2e-5])
            .unwrap();
        stars
            .new_dataset::<f64>()
            .shape(1)
            .create("StellarFormationTime")
            .unwrap()
            .write_raw(&[0.5])
            .unwrap();
    }

    let snap = Hdf5Reader::new().read(&path).unwrap();
    assert_eq!(snap.time(), 0.75);
    assert_eq!(
        snap.positions(ParticleClass::PreexistingDisk),
        &[Vector3::new(1., 0., 0.), Vector3::new(-1., 0., 0.)]
    );
    assert!(snap.positions(ParticleClass::Bulge).is_empty());
    assert_eq!(snap.new_stars().masses(), &[2e-5]);
    assert_eq!(snap.new_stars().formation_times(), &[0.5]);
    assert_eq!(snap.source(), Some(path.as_path()));
}

#[test]
fn test_missing_time_is_fatal() {
    let path = path("snapshot_no_time.hdf5");
    {
        let file = hdf5::File::create(&path).unwrap();
        file.create_group("Header").unwrap();
    }

    let err = Hdf5Reader::new().read(&path).unwrap_err();
    match err {
        RenderError::MissingData { field, .. } => assert_eq!(field, "Header/Time"),
        other => panic!("expected missing data, got {other}"),
    }
}

#[test]
fn test_mismatched_masses_rejected() {
    let path = path("snapshot_bad_masses.hdf5");
    {
        let file = hdf5::File::create(&path).unwrap();
        write_time(&file, 0.).unwrap();
        let stars = file.create_group("PartType4").unwrap();
        write_coordinates(&stars, &[[0., 1., 0.], [0., 2., 0.]]).unwrap();
        stars
            .new_dataset::<f64>()
            .shape(1)
            .create("Masses")
            .unwrap()
            .write_raw(&[1.])
            .unwrap();
        stars
            .new_dataset::<f64>()
            .shape(2)
            .create("StellarFormationTime")
            .unwrap()
            .write_raw(&[0., 0.])
            .unwrap();
    }

    let err = Hdf5Reader::new().read(&path).unwrap_err();
    assert!(matches!(err, RenderError::MalformedData { .. }));
}

//! render-snapshots: frame and animate a directory of HDF5 snapshots.
//!
//! Usage:
//!   render-snapshots --mode face-on --input ../output
//!   render-snapshots --mode tilted --angle-x 30 --angle-z 20 --output tilted_view.mp4
//!   render-snapshots --config render.json --no-video

use std::{env, path::PathBuf, str::FromStr};

use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use galaxy_frames::{
    render::{Assembly, FfmpegAssembler, GifAssembler, RasterRenderer, SequenceAssembler},
    snapshot::Hdf5Reader,
    Pipeline, RenderConfig, ViewMode,
};

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = config_from_args(&args)?;

    let pipeline = Pipeline::new(config);
    let renderer = RasterRenderer::new(pipeline.config().frame_size());
    let assemblers: Vec<Box<dyn SequenceAssembler>> = if args.iter().any(|a| a == "--no-video") {
        Vec::new()
    } else {
        vec![Box::new(FfmpegAssembler::new()), Box::new(GifAssembler)]
    };

    let summary = pipeline
        .run(&Hdf5Reader::new(), &renderer, &assemblers)
        .wrap_err("rendering failed")?;

    println!(
        "{} frames in {}",
        summary.frames.len(),
        pipeline.config().frames_dir.display()
    );
    match summary.assembly {
        Assembly::Encoded { encoder, path } => {
            println!("animation ({encoder}): {}", path.display());
        }
        Assembly::ImageSequence { .. } => println!("no animation written"),
    }

    Ok(())
}

fn config_from_args(args: &[String]) -> Result<RenderConfig> {
    let mut config = match flag(args, "--config") {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };

    if let Some(dir) = flag(args, "--input") {
        config.input_dir = PathBuf::from(dir);
    }
    if let Some(dir) = flag(args, "--frames") {
        config.frames_dir = PathBuf::from(dir);
    }
    if let Some(file) = flag(args, "--output") {
        config.save_file = PathBuf::from(file);
    }
    config.fps = parse_arg(args, "--fps", config.fps)?;

    let (default_x, default_z) = match config.mode {
        ViewMode::Tilted {
            angle_x_deg,
            angle_z_deg,
        } => (angle_x_deg, angle_z_deg),
        _ => (30., 20.),
    };
    let angle_x = parse_arg(args, "--angle-x", default_x)?;
    let angle_z = parse_arg(args, "--angle-z", default_z)?;

    match flag(args, "--mode") {
        Some("face-on") => config.mode = ViewMode::FaceOn,
        Some("edge-on") => config.mode = ViewMode::EdgeOn,
        Some("tilted") => config.mode = ViewMode::tilted(angle_x, angle_z),
        Some(other) => bail!("unknown mode `{other}`, expected face-on, edge-on or tilted"),
        None => {
            if let ViewMode::Tilted { .. } = config.mode {
                config.mode = ViewMode::tilted(angle_x, angle_z);
            }
        }
    }

    let angles_given = ["--angle-x", "--angle-z"]
        .iter()
        .any(|name| flag(args, name).is_some());
    if angles_given && !matches!(config.mode, ViewMode::Tilted { .. }) {
        bail!("--angle-x and --angle-z need --mode tilted, the mode is {}", config.mode);
    }

    config.validate()?;
    Ok(config)
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: FromStr>(args: &[String], name: &str, default: T) -> Result<T> {
    match flag(args, name) {
        Some(value) => value
            .parse()
            .map_err(|_| eyre!("invalid value `{value}` for {name}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("render-snapshots")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_tilted_angles() {
        let config = config_from_args(&args(&["--mode", "tilted", "--angle-x", "45"])).unwrap();
        assert_eq!(config.mode, ViewMode::tilted(45., 20.));
    }

    #[test]
    fn test_angles_rejected_without_tilt() {
        assert!(config_from_args(&args(&["--mode", "edge-on", "--angle-x", "45"])).is_err());
        assert!(config_from_args(&args(&["--angle-z", "10"])).is_err());
        assert_eq!(config_from_args(&args(&[])).unwrap().mode, ViewMode::FaceOn);
    }
}

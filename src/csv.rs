use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{frame::ProjectedFrame, render::Overlay, snapshot::ParticleClass};

/// One rendered frame, as listed in the frame index.
#[derive(Clone, Debug)]
pub struct FrameRecord<'a> {
    pub file: PathBuf,
    pub frame: &'a ProjectedFrame,
    pub overlay: Overlay,
}

/// Write `frame,file,time_gyr,disk,bulge,new_stars,new_star_mass,caption...`
/// with one row per rendered frame.
pub fn write_frame_index(records: &[FrameRecord<'_>], path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(
        file,
        "frame,file,time_gyr,disk,bulge,new_stars,new_star_mass,time_label,count_label,view_label"
    )?;

    for (i, rec) in records.iter().enumerate() {
        let name = rec
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(
            file,
            "{i},{},{},{},{},{},{},{},{},{}",
            quote(&name),
            rec.frame.time,
            rec.frame.points(ParticleClass::PreexistingDisk).len(),
            rec.frame.points(ParticleClass::Bulge).len(),
            rec.frame.new_star_count(),
            rec.frame.new_star_mass(),
            quote(&rec.overlay.time),
            quote(&rec.overlay.new_stars),
            quote(&rec.overlay.view),
        )?;
    }

    file.flush()
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote("frame_000.png"), "frame_000.png");
        assert_eq!(quote("New stars: 1,500"), "\"New stars: 1,500\"");
        assert_eq!(quote("a \"b\""), "\"a \"\"b\"\"\"");
    }
}

use galaxy_frames::{
    render::{FfmpegAssembler, GifAssembler, RasterRenderer, SequenceAssembler},
    snapshot::DiskSnapshotCreator,
    Pipeline, RenderConfig, ViewMode,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Two disks closing in over 2 Gyr, sampled every 0.1 Gyr.
    let mut creator = DiskSnapshotCreator::new(20_000, 2_000).orbit(40., 20.);
    let sequence = creator.create_sequence((0..=20).map(|i| 0.1 * f64::from(i)));

    for mode in [ViewMode::FaceOn, ViewMode::EdgeOn, ViewMode::tilted(30., 20.)] {
        let config = RenderConfig {
            frames_dir: format!("frames_{mode}").into(),
            save_file: format!("synthetic_{mode}.mp4").into(),
            mode,
            width: Some(if matches!(mode, ViewMode::Tilted { .. }) { 900 } else { 750 }),
            height: Some(750),
            ..Default::default()
        };
        let renderer = RasterRenderer::new(config.frame_size()).dpi(75.);
        let assemblers: Vec<Box<dyn SequenceAssembler>> =
            vec![Box::new(FfmpegAssembler::new()), Box::new(GifAssembler)];

        let summary = Pipeline::new(config)
            .run_sequence(&sequence, &renderer, &assemblers)
            .unwrap();
        println!("{mode}: {} frames, {:?}", summary.frames.len(), summary.assembly);
    }
}

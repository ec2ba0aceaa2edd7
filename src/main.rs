use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;

use swordball::bridge::SocketBridge;
use swordball::config::Config;
use swordball::excite::FixedFrameExcitation;
use swordball::record::{FrameDirWriter, FrameUploader, GifWriter, Recorder};
use swordball::render::PixelFrame;
use swordball::train::{SwordDuelTrain, TrainManager};
use swordball::TrainWorkflow;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trainer WebSocket URL (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// Stop after this many simulation ticks (runs forever by default)
    #[arg(long)]
    ticks: Option<u64>,

    /// Virtual frames per simulated second
    #[arg(long, default_value_t = 60)]
    fps: u16,

    /// Framebuffer width in pixels
    #[arg(long, default_value_t = 400)]
    width: usize,

    /// Framebuffer height in pixels
    #[arg(long, default_value_t = 300)]
    height: usize,

    /// Record into a timestamped GIF under recordings/
    #[arg(long)]
    record: bool,

    /// Record every frame into an animated GIF at this path
    #[arg(long)]
    record_gif: Option<PathBuf>,

    /// Record every frame as numbered PNGs into a directory
    #[arg(long)]
    record_frames: Option<PathBuf>,

    /// Stream frames to a remote collector (base URL)
    #[arg(long)]
    upload: Option<String>,

    /// RON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for combatant spawn placement
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn build_recorder(args: &Args) -> anyhow::Result<Recorder> {
    if let Some(path) = &args.record_gif {
        return Ok(Recorder::to(Box::new(GifWriter::new(path, args.fps))));
    }
    if args.record {
        let dir = PathBuf::from("recordings");
        std::fs::create_dir_all(&dir)?;
        let name = format!("duel_{}.gif", chrono::Local::now().format("%Y%m%d_%H%M%S"));
        return Ok(Recorder::to(Box::new(GifWriter::new(dir.join(name), args.fps))));
    }
    if let Some(dir) = &args.record_frames {
        return Ok(Recorder::to(Box::new(FrameDirWriter::new(dir)?)));
    }
    if let Some(url) = &args.upload {
        return Ok(Recorder::to(Box::new(FrameUploader::connect(url)?)));
    }
    Ok(Recorder::disabled())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(url) = &args.url {
        config.train.socket_url = url.clone();
    }

    // The trainer hosts the server; without one the duel still simulates,
    // it just never receives actions
    let bridge = match SocketBridge::connect(&config.train.socket_url) {
        Ok(bridge) => Some(bridge),
        Err(e) => {
            log::warn!(
                "No trainer at {}: {e}; running without one",
                config.train.socket_url
            );
            None
        }
    };

    let mut manager = TrainManager::new(bridge);
    manager.add(Box::new(SwordDuelTrain::new(&config, args.seed)));
    let manager = Rc::new(RefCell::new(manager));

    let mut excitation = FixedFrameExcitation::new(1000.0 / args.fps as f64);
    excitation.excite(manager.clone());

    let recorder = build_recorder(&args)?;
    let frame = PixelFrame::new(args.width, args.height);

    log::info!("Starting the sword duel workflow");
    let mut workflow = TrainWorkflow::new(manager, excitation, frame, recorder);
    workflow.run(args.ticks)?;
    Ok(())
}

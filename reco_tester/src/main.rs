use anyhow::Context;
use chroma_reco::{Command, Event, RecoConfig, RecognitionSession};
use std::env;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "camera")]
mod camera;
mod overlay;

/// Keys replayed when no script is given: learn the background, create an
/// object from the selection, give it one exemplar, start recognition.
const DEFAULT_SCRIPT: &str = "bnar";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if let Some(result) = try_camera(&args) {
        return result;
    }
    if args.len() < 3 {
        println!("Usage: reco_tester <input_image> <output_image> [keys]");
        #[cfg(feature = "camera")]
        println!("       reco_tester --camera");
        print_help();
        return Ok(());
    }
    let script = args.get(3).map(String::as_str).unwrap_or(DEFAULT_SCRIPT);

    replay(Path::new(&args[1]), Path::new(&args[2]), script).await
}

/// Terminal logger at Info level, without location, target or thread noise.
fn init_logging() -> anyhow::Result<()> {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .context("initialize logger")
}

pub fn print_help() {
    println!("Available commands:");
    println!("----------------------------------");
    for command in Command::ALL {
        println!("'{}' : {}", command.key(), command.description());
    }
    println!("----------------------------------");
}

#[cfg(feature = "camera")]
fn try_camera(args: &[String]) -> Option<anyhow::Result<()>> {
    (args.get(1).map(String::as_str) == Some("--camera")).then(|| camera::run(RecoConfig::default()))
}

#[cfg(not(feature = "camera"))]
fn try_camera(_args: &[String]) -> Option<anyhow::Result<()>> {
    None
}

/// Replays a key script against a single still frame and writes the composed
/// output image.
async fn replay(input_path: &Path, output_path: &Path, script: &str) -> anyhow::Result<()> {
    // --- 2. Frame Loading ---
    let frame = image::open(input_path)
        .with_context(|| format!("opening {}", input_path.display()))?
        .to_rgb8();
    let (frame_width, frame_height) = frame.dimensions();

    // --- 3. Session Initialization ---
    let mut session = RecognitionSession::new(RecoConfig::for_frame(frame_width, frame_height))?;

    // --- 4. Command Replay ---
    for key in script.chars() {
        let Some(command) = Command::from_key(key) else {
            log::warn!("ignoring unknown key '{}'", key);
            continue;
        };
        match session.handle(command, &frame) {
            Ok(Event::Quit) => break,
            Ok(_) => {}
            Err(e) => log::warn!("'{}' rejected: {}", key, e),
        }
    }

    // --- 5. Recognition & Composition ---
    let painted = session.recognize_parallel(Arc::new(frame.clone())).await?;
    let output = overlay::compose(&frame, painted.as_ref(), &session);

    for (index, class) in session.registry().classes().iter().enumerate() {
        let color = class.display_color;
        log::info!(
            "legend {}: {} ({}, {}, {}), {} exemplars",
            index,
            class.label,
            color.red,
            color.green,
            color.blue,
            class.exemplars.len()
        );
    }

    // --- 6. Write Output Frame ---
    output
        .save(output_path)
        .with_context(|| format!("writing {}", output_path.display()))?;
    log::info!("processing complete, output saved to {}", output_path.display());
    Ok(())
}

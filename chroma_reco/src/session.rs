// THEORY:
// The `session` module is the editor side of the engine: the small state machine
// that an interactive front-end drives with key presses. It owns the mutable class
// registry and two flags, and it is the only place where classes are created or
// changed.
//
// Key architectural principles:
// 1.  **Explicit state**: The whole interactive state is `frozen` (the frame source
//     should stop advancing) × `recognition` (each frame should be classified),
//     plus the registry. Every transition goes through `handle`.
// 2.  **No I/O**: Commands receive the current frame as an argument and return an
//     `Event` describing what happened. Reading the camera, drawing and printing
//     belong to the caller.
// 3.  **Snapshot isolation**: Recognition never reads the live registry. Each call
//     to `recognize` scans against a cloned snapshot of the classes, so edits made
//     between frames can never be observed halfway through a scan.

use crate::config::RecoConfig;
use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::color_class::ClassRegistry;
use crate::core_modules::color_distribution::{ColorDistribution, Distance};
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::region_scanner::RegionScanner;
use crate::error::{RecoError, Result};
use crate::parallel_scanner::ParallelScanner;
use image::RgbImage;
use std::sync::Arc;

const ESCAPE: char = '\u{1b}';

/// A user request, usually bound to a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `f`: freeze or unfreeze the frame source.
    ToggleFreeze,
    /// `h`: compute the histogram of the central selection.
    DescribeSelection,
    /// `v`: distance between the left and right halves of the frame.
    CompareHalves,
    /// `b`: re-learn the background from the whole frame.
    ScanBackground,
    /// `n`: create a new object class colored after the selection.
    NewObject,
    /// `a`: add the selection's histogram to the last object class.
    AddExemplar,
    /// `r`: turn recognition on or off.
    ToggleRecognition,
    /// `q` or ESC.
    Quit,
}

impl Command {
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            'f' => Some(Command::ToggleFreeze),
            'h' => Some(Command::DescribeSelection),
            'v' => Some(Command::CompareHalves),
            'b' => Some(Command::ScanBackground),
            'n' => Some(Command::NewObject),
            'a' => Some(Command::AddExemplar),
            'r' => Some(Command::ToggleRecognition),
            'q' | ESCAPE => Some(Command::Quit),
            _ => None,
        }
    }

    pub fn key(&self) -> char {
        match self {
            Command::ToggleFreeze => 'f',
            Command::DescribeSelection => 'h',
            Command::CompareHalves => 'v',
            Command::ScanBackground => 'b',
            Command::NewObject => 'n',
            Command::AddExemplar => 'a',
            Command::ToggleRecognition => 'r',
            Command::Quit => 'q',
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::ToggleFreeze => "freeze/unfreeze the image",
            Command::DescribeSelection => "compute the color distribution of the central area",
            Command::CompareHalves => "distance between the left and right color distributions",
            Command::ScanBackground => "scan the background",
            Command::NewObject => "add a new object",
            Command::AddExemplar => "add the central area histogram to the last object",
            Command::ToggleRecognition => "turn recognition mode on/off",
            Command::Quit => "quit",
        }
    }

    pub const ALL: [Command; 8] = [
        Command::ToggleFreeze,
        Command::DescribeSelection,
        Command::CompareHalves,
        Command::ScanBackground,
        Command::NewObject,
        Command::AddExemplar,
        Command::ToggleRecognition,
        Command::Quit,
    ];
}

/// What a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Frozen(bool),
    SelectionDescribed {
        sample_count: u32,
        average_color: Pixel,
    },
    HalvesCompared(Distance),
    BackgroundScanned {
        exemplars: usize,
    },
    ObjectCreated {
        index: usize,
        display_color: Pixel,
    },
    ExemplarAdded {
        index: usize,
        exemplars: usize,
    },
    Recognition(bool),
    Quit,
}

/// Interactive recognition state: the class registry plus the freeze and
/// recognition flags.
#[derive(Debug, Clone)]
pub struct RecognitionSession {
    config: RecoConfig,
    registry: ClassRegistry,
    frozen: bool,
    recognition: bool,
}

impl RecognitionSession {
    pub fn new(config: RecoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: ClassRegistry::new(),
            frozen: false,
            recognition: false,
        })
    }

    pub fn config(&self) -> &RecoConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_recognizing(&self) -> bool {
        self.recognition
    }

    /// The square selection centered in the configured frame.
    pub fn selection(&self) -> Chunk {
        Chunk::centered(self.config.frame_width, self.config.frame_height, self.config.selection_size)
    }

    fn selection_distribution(&self, frame: &RgbImage) -> Result<ColorDistribution> {
        self.selection().distribution(frame)
    }

    /// Applies one command to the session, reading `frame` where needed.
    pub fn handle(&mut self, command: Command, frame: &RgbImage) -> Result<Event> {
        let event = match command {
            Command::ToggleFreeze => {
                self.frozen = !self.frozen;
                Event::Frozen(self.frozen)
            }
            Command::DescribeSelection => {
                let distribution = self.selection_distribution(frame)?;
                Event::SelectionDescribed {
                    sample_count: distribution.sample_count(),
                    average_color: distribution.average_color(),
                }
            }
            Command::CompareHalves => {
                let (width, height) = frame.dimensions();
                let half = width / 2;
                let left = Chunk::new(0, 0, half, height).distribution(frame)?;
                let right = Chunk::new(half, 0, width - half, height).distribution(frame)?;
                Event::HalvesCompared(left.distance(&right))
            }
            Command::ScanBackground => {
                let exemplars = self
                    .registry
                    .scan_background(frame, self.config.background_block_size)?;
                Event::BackgroundScanned { exemplars }
            }
            Command::NewObject => {
                let sample = self.selection_distribution(frame)?;
                let index = self.registry.add_object(&sample);
                Event::ObjectCreated {
                    index,
                    display_color: sample.average_color(),
                }
            }
            Command::AddExemplar => {
                if self.registry.object_count() == 0 {
                    return Err(RecoError::NoObjectClass);
                }
                let exemplar = self.selection_distribution(frame)?;
                let (index, exemplars) = self.registry.add_exemplar(exemplar)?;
                Event::ExemplarAdded { index, exemplars }
            }
            Command::ToggleRecognition => {
                if self.registry.object_count() == 0 {
                    return Err(RecoError::RecognitionUnavailable);
                }
                self.recognition = !self.recognition;
                Event::Recognition(self.recognition)
            }
            Command::Quit => Event::Quit,
        };
        log::info!("{}", describe(&event));
        Ok(event)
    }

    /// The painted label image of `frame` when recognition is on.
    pub fn recognize(&self, frame: &RgbImage) -> Result<Option<RgbImage>> {
        if !self.recognition {
            return Ok(None);
        }
        let scanner = RegionScanner::new(self.config.recognition_block_size)?;
        let classes = self.registry.snapshot();
        scanner.classify(frame, &classes).map(Some)
    }

    /// Same as `recognize`, with the scan spread over the configured worker count.
    pub async fn recognize_parallel(&self, frame: Arc<RgbImage>) -> Result<Option<RgbImage>> {
        if !self.recognition {
            return Ok(None);
        }
        let scanner = ParallelScanner::with_workers(
            self.config.recognition_block_size,
            self.config.worker_count,
        )?;
        scanner.classify(frame, self.registry.snapshot()).await.map(Some)
    }
}

/// One-line, human-readable summary of an event.
pub fn describe(event: &Event) -> String {
    match event {
        Event::Frozen(true) => "image frozen".to_string(),
        Event::Frozen(false) => "image unfrozen".to_string(),
        Event::SelectionDescribed {
            sample_count,
            average_color,
        } => format!(
            "central area distribution computed from {} pixels, average color ({}, {}, {})",
            sample_count, average_color.red, average_color.green, average_color.blue
        ),
        Event::HalvesCompared(distance) => {
            format!("distance between left and right color distributions: {}", distance)
        }
        Event::BackgroundScanned { exemplars } => {
            format!("background color distributions: {}", exemplars)
        }
        Event::ObjectCreated { index, .. } => {
            format!("object {} created", index)
        }
        Event::ExemplarAdded { index, exemplars } => {
            format!("histogram added to object {} ({} histograms)", index, exemplars)
        }
        Event::Recognition(true) => "recognition mode on".to_string(),
        Event::Recognition(false) => "recognition mode off".to_string(),
        Event::Quit => "quit".to_string(),
    }
}

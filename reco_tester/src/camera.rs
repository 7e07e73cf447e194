use crate::overlay;
use anyhow::{Context, bail};
use chroma_reco::{Command, Event, RecoConfig, RecognitionSession};
use image::RgbImage;
use opencv::{
    core::{self, Mat, Point, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

const WINDOW: &str = "input";
const KEY_POLL_MS: i32 = 50;

/// Live loop: grab frames from the default camera, apply key commands, and show
/// the composed output until `q` or ESC.
pub fn run(config: RecoConfig) -> anyhow::Result<()> {
    crate::print_help();

    // --- 1. Camera Initialization ---
    let mut cap = VideoCapture::new(0, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        bail!("unable to open the camera");
    }
    cap.set(videoio::CAP_PROP_FRAME_WIDTH, config.frame_width as f64)?;
    cap.set(videoio::CAP_PROP_FRAME_HEIGHT, config.frame_height as f64)?;

    let mut bgr = Mat::default();
    if !cap.read(&mut bgr)? || bgr.empty() {
        bail!("camera returned no frame");
    }
    let mut frame = to_rgb_image(&bgr)?;

    // The session follows the size the camera actually delivers.
    let (frame_width, frame_height) = frame.dimensions();
    let mut session = RecognitionSession::new(RecoConfig {
        frame_width,
        frame_height,
        selection_size: config.selection_size.min(frame_width).min(frame_height),
        ..config
    })?;

    highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;

    // --- 2. Main Loop ---
    loop {
        let key = highgui::wait_key(KEY_POLL_MS)?;
        if !session.is_frozen() && cap.read(&mut bgr)? && !bgr.empty() {
            frame = to_rgb_image(&bgr)?;
        }

        if let Some(command) = u8::try_from(key).ok().map(char::from).and_then(Command::from_key) {
            match session.handle(command, &frame) {
                Ok(Event::Quit) => break,
                Ok(_) => {}
                Err(e) => log::warn!("{}", e),
            }
        }

        // --- 3. Recognition & Display ---
        let painted = session.recognize(&frame)?;
        let composed = overlay::compose(&frame, painted.as_ref(), &session);
        let mut output = to_bgr_mat(&composed)?;
        draw_legend_labels(&mut output, &session)?;
        highgui::imshow(WINDOW, &output)?;
    }

    Ok(())
}

/// Converts an OpenCV BGR frame into an RGB image buffer.
fn to_rgb_image(bgr: &Mat) -> anyhow::Result<RgbImage> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let size = rgb.size()?;
    let data = rgb.data_bytes()?.to_vec();
    RgbImage::from_raw(size.width as u32, size.height as u32, data)
        .context("frame buffer does not match its dimensions")
}

/// Converts an RGB image buffer back into an OpenCV BGR matrix.
fn to_bgr_mat(image: &RgbImage) -> anyhow::Result<Mat> {
    let (width, height) = image.dimensions();
    let mut rgb = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(image.as_raw());
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

/// Writes each class label to the right of its legend swatch.
fn draw_legend_labels(output: &mut Mat, session: &RecognitionSession) -> anyhow::Result<()> {
    for (index, class) in session.registry().classes().iter().enumerate() {
        let baseline = overlay::legend_baseline(index) as i32;
        imgproc::put_text(
            output,
            &class.label,
            Point::new(overlay::LEGEND_X as i32 + 30, baseline - 5),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            Scalar::new(255.0, 255.0, 255.0, 0.0),
            1,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(())
}

//! Garment/background separation
//!
//! Every isolator returns an image of the same size as its input in which
//! background pixels are black (all channels zero) and garment pixels keep
//! their original color. Three implementations:
//! - [`PassthroughIsolator`]: input is already isolated
//! - [`BorderColorIsolator`]: backdrop estimated from the image border in
//!   CIE Lab, pixels within a ΔE threshold of it are cleared
//! - [`CommandIsolator`]: PNG bytes piped through an external
//!   background-removal program

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use image::RgbImage;
use palette::Lab;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::color::conversion::{delta_e, Color};
use crate::config::IsolationMethod;
use crate::constants::isolation::{DEFAULT_BORDER_WIDTH, DEFAULT_MIN_DELTA_E};
use crate::image_loader::{decode_image, encode_png};
use crate::{AnalysisError, Result};

/// Removes the background from a garment photo
///
/// Implementations are shared across garments and threads.
pub trait BackgroundIsolator: Send + Sync + fmt::Debug {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Clear the background of `image`, returning an image of equal size
    fn isolate(&self, image: &RgbImage) -> Result<RgbImage>;
}

/// Build the isolator selected by a configuration section
pub fn build_isolator(method: &IsolationMethod) -> Box<dyn BackgroundIsolator> {
    match method {
        IsolationMethod::Passthrough => Box::new(PassthroughIsolator),
        IsolationMethod::BorderColor {
            min_delta_e,
            border_width,
        } => Box::new(BorderColorIsolator::with_params(*min_delta_e, *border_width)),
        IsolationMethod::Command { program, args } => {
            Box::new(CommandIsolator::new(program.clone(), args.clone()))
        }
    }
}

/// Run an isolator and reject output that does not line up with its input
///
/// # Errors
///
/// Propagates the isolator's error, and returns `UpstreamIsolation` when
/// the output dimensions differ from the input.
pub fn run_isolator(isolator: &dyn BackgroundIsolator, image: &RgbImage) -> Result<RgbImage> {
    let started = Instant::now();
    let isolated = isolator.isolate(image)?;

    if isolated.dimensions() != image.dimensions() {
        return Err(AnalysisError::isolation_msg(format!(
            "{} returned a {}x{} image for a {}x{} input",
            isolator.name(),
            isolated.width(),
            isolated.height(),
            image.width(),
            image.height()
        )));
    }

    let background = isolated.pixels().filter(|p| p.0 == [0, 0, 0]).count();
    debug!(
        isolator = isolator.name(),
        width = image.width(),
        height = image.height(),
        background_pixels = background,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "isolated background"
    );
    Ok(isolated)
}

/// Leaves the image untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughIsolator;

impl BackgroundIsolator for PassthroughIsolator {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn isolate(&self, image: &RgbImage) -> Result<RgbImage> {
        Ok(image.clone())
    }
}

/// Clears pixels that match the backdrop color sampled along the border
///
/// Works for garments photographed flat on a roughly uniform surface that
/// is visible on all four edges of the frame.
#[derive(Debug, Clone)]
pub struct BorderColorIsolator {
    min_delta_e: f32,
    border_width: u32,
}

impl Default for BorderColorIsolator {
    fn default() -> Self {
        Self::new()
    }
}

impl BorderColorIsolator {
    /// Create an isolator with default parameters
    pub fn new() -> Self {
        Self {
            min_delta_e: DEFAULT_MIN_DELTA_E,
            border_width: DEFAULT_BORDER_WIDTH,
        }
    }

    /// Create an isolator with custom parameters
    pub fn with_params(min_delta_e: f32, border_width: u32) -> Self {
        Self {
            min_delta_e,
            border_width: border_width.max(1),
        }
    }

    /// Estimate the backdrop color as the per-channel Lab median of the
    /// border band
    pub fn estimate_backdrop(&self, image: &RgbImage) -> Option<Lab> {
        let (width, height) = image.dimensions();
        let band = self.border_width;

        let mut l = Vec::new();
        let mut a = Vec::new();
        let mut b = Vec::new();
        for (x, y, pixel) in image.enumerate_pixels() {
            let on_border =
                x < band || y < band || x + band >= width || y + band >= height;
            if on_border {
                let lab = Color::from_rgb8(pixel.0).to_lab();
                l.push(lab.l);
                a.push(lab.a);
                b.push(lab.b);
            }
        }

        Some(Lab::new(median(&mut l)?, median(&mut a)?, median(&mut b)?))
    }

    /// Segment image by color difference from the backdrop
    fn segment_by_color(&self, image: &RgbImage, backdrop: Lab) -> RgbImage {
        let mut isolated = image.clone();
        isolated.par_chunks_exact_mut(3).for_each(|pixel| {
            let lab = Color::from_rgb8([pixel[0], pixel[1], pixel[2]]).to_lab();
            if delta_e(lab, backdrop) < self.min_delta_e {
                pixel.fill(0);
            }
        });
        isolated
    }
}

impl BackgroundIsolator for BorderColorIsolator {
    fn name(&self) -> &'static str {
        "border_color"
    }

    fn isolate(&self, image: &RgbImage) -> Result<RgbImage> {
        let backdrop = self
            .estimate_backdrop(image)
            .ok_or_else(|| AnalysisError::isolation_msg("image has no border pixels"))?;
        debug!(
            l = backdrop.l,
            a = backdrop.a,
            b = backdrop.b,
            "estimated backdrop color"
        );
        Ok(self.segment_by_color(image, backdrop))
    }
}

fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    Some(values[values.len() / 2])
}

/// Pipes the image through an external background-removal program
///
/// The program receives a PNG on stdin and must write an image of the same
/// size to stdout; transparent output pixels count as background.
#[derive(Debug, Clone)]
pub struct CommandIsolator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandIsolator {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn describe(&self) -> String {
        self.program.display().to_string()
    }
}

impl BackgroundIsolator for CommandIsolator {
    fn name(&self) -> &'static str {
        "command"
    }

    fn isolate(&self, image: &RgbImage) -> Result<RgbImage> {
        let input = encode_png(image)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AnalysisError::isolation(format!("cannot start {}", self.describe()), e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnalysisError::isolation_msg("child stdin unavailable"))?;

        // Feed stdin from a second thread so a program that writes before
        // it finishes reading cannot deadlock against us.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(&input));
            let output = child.wait_with_output();
            (output, writer.join())
        });

        let output = output
            .map_err(|e| AnalysisError::isolation(format!("{} did not finish", self.describe()), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::isolation_msg(format!(
                "{} exited with {}: {}",
                self.describe(),
                output.status,
                stderr.trim()
            )));
        }

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(program = %self.describe(), error = %e, "isolator did not read its whole input");
            }
            Err(_) => return Err(AnalysisError::isolation_msg("stdin writer panicked")),
        }

        decode_image(&output.stdout).map_err(|e| {
            AnalysisError::isolation(format!("{} returned malformed image data", self.describe()), e)
        })
    }
}

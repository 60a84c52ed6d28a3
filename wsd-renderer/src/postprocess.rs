//! Post-processing applied to rendered images before they are written.
//!
//! The service stamps a 16 px footer onto every image and paints the
//! background opaque white. [`ClipFooter`] removes both.

use std::io::Cursor;
use std::sync::Arc;

use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, Pixel, Primitive, Rgba};

use crate::error::PostProcessError;

/// Height of the footer band cut off the bottom of every image.
pub const FOOTER_HEIGHT: u32 = 16;

/// Transform applied to the raw bytes returned by the service.
pub trait PostProcessor: Send + Sync {
    fn process(&self, raw: &[u8]) -> Result<Vec<u8>, PostProcessError>;
}

/// Writes the service's bytes as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl PostProcessor for Passthrough {
    fn process(&self, raw: &[u8]) -> Result<Vec<u8>, PostProcessError> {
        Ok(raw.to_vec())
    }
}

/// Crops the footer band and makes the white background transparent.
///
/// Images no taller than [`FOOTER_HEIGHT`] keep their height; only the colour
/// key is applied to them. Output always carries an alpha channel and keeps
/// the bit depth of the input: 16-bit images stay 16-bit, everything else is
/// written as 8-bit RGBA.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipFooter;

impl PostProcessor for ClipFooter {
    fn process(&self, raw: &[u8]) -> Result<Vec<u8>, PostProcessError> {
        let format = image::guess_format(raw).map_err(PostProcessError::Decode)?;
        let decoded =
            image::load_from_memory_with_format(raw, format).map_err(PostProcessError::Decode)?;

        let processed = match decoded.color() {
            ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
                let mut rgba = clip_footer(decoded.to_rgba16());
                key_out_white(&mut rgba);
                DynamicImage::ImageRgba16(rgba)
            }
            _ => {
                let mut rgba = clip_footer(decoded.to_rgba8());
                key_out_white(&mut rgba);
                DynamicImage::ImageRgba8(rgba)
            }
        };

        let mut out = Cursor::new(Vec::new());
        processed
            .write_to(&mut out, format)
            .map_err(PostProcessError::Encode)?;
        Ok(out.into_inner())
    }
}

fn clip_footer<P: Pixel + 'static>(
    img: ImageBuffer<P, Vec<P::Subpixel>>,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (width, height) = img.dimensions();
    if height <= FOOTER_HEIGHT {
        tracing::debug!("image is {height}px tall, leaving footer in place");
        return img;
    }
    image::imageops::crop_imm(&img, 0, 0, width, height - FOOTER_HEIGHT).to_image()
}

/// Exactly opaque white (every channel at its maximum) becomes fully
/// transparent white.
fn key_out_white<T: Primitive + 'static>(img: &mut ImageBuffer<Rgba<T>, Vec<T>>)
where
    Rgba<T>: Pixel<Subpixel = T>,
{
    let max = T::DEFAULT_MAX_VALUE;
    let opaque_white = Rgba([max; 4]);
    let keyed_out = Rgba([max, max, max, T::DEFAULT_MIN_VALUE]);
    for pixel in img.pixels_mut() {
        if *pixel == opaque_white {
            *pixel = keyed_out;
        }
    }
}

/// Post-processing strategy chosen for an output format.
pub struct PostProcess;

impl PostProcess {
    /// [`ClipFooter`] for PNG output, [`Passthrough`] for anything else
    /// (`svg` and `pdf` are not raster formats the decoder understands).
    pub fn for_format(format: &str) -> Arc<dyn PostProcessor> {
        match ImageFormat::from_extension(format) {
            Some(ImageFormat::Png) => Arc::new(ClipFooter),
            _ => Arc::new(Passthrough),
        }
    }

    pub fn none() -> Arc<dyn PostProcessor> {
        Arc::new(Passthrough)
    }
}

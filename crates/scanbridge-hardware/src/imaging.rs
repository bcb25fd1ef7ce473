//! Raw frame to PNG conversion.

use png::{BitDepth, ColorType, Encoder, EncodingError};

/// Encode a row-major 8-bit grayscale frame as PNG.
///
/// # Errors
///
/// Returns an error if the dimensions are zero or do not match the pixel
/// count.
///
/// # Examples
///
/// ```
/// use scanbridge_hardware::imaging::encode_grayscale_png;
///
/// let png = encode_grayscale_png(4, 2, &[128u8; 8]).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub fn encode_grayscale_png(width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, width, height);
        encoder.set_color(ColorType::Grayscale);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixels)?;
        writer.finish()?;
    }
    Ok(out)
}

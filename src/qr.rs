use crate::error::BadgeError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{GrayImage, ImageEncoder, Luma};
use qrcode::{Color, QrCode};
use tracing::debug;

/// Pixels per QR module
const MODULE_SIZE: u32 = 4;
/// Quiet zone width in modules, per the QR standard
const QUIET_ZONE: u32 = 4;

/// Encode a URL into a QR code PNG data URL.
///
/// Deterministic: the same input always produces the same data URL, so a
/// stored QR image never drifts from the profile URL it was generated for.
pub fn data_url(url: &str) -> Result<String, BadgeError> {
    let code = QrCode::new(url.as_bytes()).map_err(|e| BadgeError::Encode(e.to_string()))?;
    let image = rasterize(&code);

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::L8,
        )
        .map_err(|e| BadgeError::Encode(e.to_string()))?;

    debug!(url = %url, png_bytes = png.len(), "QR code generated");

    Ok(format!("data:image/png;base64,{}", BASE64.encode(&png)))
}

/// Render the QR matrix into a grayscale image with a quiet zone
fn rasterize(code: &QrCode) -> GrayImage {
    let modules = code.width() as u32;
    let size = (modules + 2 * QUIET_ZONE) * MODULE_SIZE;
    let colors = code.to_colors();

    GrayImage::from_fn(size, size, |x, y| {
        let mx = (x / MODULE_SIZE).checked_sub(QUIET_ZONE);
        let my = (y / MODULE_SIZE).checked_sub(QUIET_ZONE);
        let dark = match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                colors[(my * modules + mx) as usize] == Color::Dark
            }
            _ => false,
        };
        if dark { Luma([0u8]) } else { Luma([255u8]) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_has_png_prefix() {
        let url = data_url("http://localhost:8080/profile/1700000000000").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_data_url_is_deterministic() {
        let a = data_url("http://localhost:8080/profile/42").unwrap();
        let b = data_url("http://localhost:8080/profile/42").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_urls_produce_different_codes() {
        let a = data_url("http://localhost:8080/profile/1").unwrap();
        let b = data_url("http://localhost:8080/profile/2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_payload_decodes_as_png() {
        let url = data_url("http://localhost:8080/profile/7").unwrap();
        let b64 = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = BASE64.decode(b64).unwrap();
        // PNG magic bytes
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}

//! Magic-byte format detection.

use super::params::ImageFormat;

const MARKER_JPEG: &[u8] = &[0xFF, 0xD8];
const MARKER_PNG: &[u8] = &[0x89, 0x50];
const MARKER_RIFF: &[u8] = b"RIFF";
const MARKER_WEBP: &[u8] = b"WEBP";

/// Shortest buffer that can hold every signature we check (RIFF header + fourcc).
const MIN_SNIFF_LEN: usize = 12;

/// Classify an encoded buffer by its leading bytes.
///
/// Returns `None` for anything unrecognized, including buffers shorter than
/// 12 bytes.
pub fn classify(buf: &[u8]) -> Option<ImageFormat> {
    if buf.len() < MIN_SNIFF_LEN {
        return None;
    }
    if buf.starts_with(MARKER_JPEG) {
        Some(ImageFormat::Jpeg)
    } else if buf.starts_with(MARKER_PNG) {
        Some(ImageFormat::Png)
    } else if buf.starts_with(MARKER_RIFF) && &buf[8..12] == MARKER_WEBP {
        Some(ImageFormat::Webp)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(prefix: &[u8]) -> Vec<u8> {
        let mut buf = prefix.to_vec();
        buf.resize(16, 0);
        buf
    }

    #[test]
    fn detects_jpeg() {
        assert_eq!(classify(&padded(&[0xFF, 0xD8, 0xFF, 0xE0])), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn detects_png() {
        assert_eq!(classify(&padded(b"\x89PNG\r\n\x1a\n")), Some(ImageFormat::Png));
    }

    #[test]
    fn detects_webp() {
        assert_eq!(classify(&padded(b"RIFF\x24\x00\x00\x00WEBPVP8 ")), Some(ImageFormat::Webp));
    }

    #[test]
    fn riff_without_webp_fourcc_is_unknown() {
        assert_eq!(classify(&padded(b"RIFF\x24\x00\x00\x00WAVEfmt ")), None);
    }

    #[test]
    fn zero_bytes_are_unknown() {
        assert_eq!(classify(&[0u8; 32]), None);
    }

    #[test]
    fn short_buffers_are_unknown() {
        assert_eq!(classify(&[]), None);
        assert_eq!(classify(&[0xFF, 0xD8]), None);
        assert_eq!(classify(b"RIFF\0\0\0\0WEB"), None);
    }
}

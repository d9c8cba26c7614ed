//! Grayscale frames and QR decoding via `rqrr`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has zero width or height")]
    Empty,

    #[error("expected {expected} luma bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// One 8-bit grayscale frame, row-major with no stride padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl LumaFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty);
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Uniform white frame.
    pub fn blank(width: u32, height: u32) -> Result<Self, FrameError> {
        Self::new(width, height, vec![u8::MAX; width as usize * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width as usize + x]
    }
}

/// Decode every QR symbol in `frame`, in detection order.
///
/// Grids that are found but fail to decode are skipped.
pub fn decode_qr(frame: &LumaFrame) -> Vec<String> {
    let start = std::time::Instant::now();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        frame.width as usize,
        frame.height as usize,
        |x, y| frame.luma(x, y),
    );

    let grids = prepared.detect_grids();
    let mut values = Vec::with_capacity(grids.len());
    for grid in grids {
        match grid.decode() {
            Ok((_, content)) => values.push(content),
            Err(e) => log::debug!("QR grid found but not decodable: {}", e),
        }
    }

    if !values.is_empty() {
        log::debug!(
            "decoded {} QR code(s) in {}ms",
            values.len(),
            start.elapsed().as_millis()
        );
    }
    values
}

/// Render `payload` as a QR code, four pixels per module, inside the
/// standard four-module quiet zone.
#[cfg(test)]
pub(crate) fn render_qr(payload: &str) -> LumaFrame {
    use qrcode::types::Color;

    const QUIET_ZONE: usize = 4;
    const SCALE: usize = 4;

    let code = qrcode::QrCode::new(payload.as_bytes()).expect("payload fits in a QR code");
    let modules = code.width();
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE) * SCALE;

    let mut pixels = vec![u8::MAX; side * side];
    for y in 0..side {
        for x in 0..side {
            let (mx, my) = (x / SCALE, y / SCALE);
            if mx < QUIET_ZONE || my < QUIET_ZONE {
                continue;
            }
            let (mx, my) = (mx - QUIET_ZONE, my - QUIET_ZONE);
            if mx < modules && my < modules && matches!(colors[my * modules + mx], Color::Dark) {
                pixels[y * side + x] = 0;
            }
        }
    }
    LumaFrame::new(side as u32, side as u32, pixels).expect("square frame")
}

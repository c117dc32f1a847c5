use std::io;
use std::io::Write;
use std::ops::ControlFlow;

use image::Delay;
use image::Frame;
use image::ImageBuffer;
use image::ImageResult;
use image::Rgba;
use image::RgbaImage;
use image::codecs::gif::GifEncoder;
use image::codecs::gif::Repeat;

use crate::driver::Renderer;
use crate::driver::Status;
use crate::grid::Snapshot;

/// Side of a live cell, in pixels
const CELL_SIZE: u32 = 8;

/// Gap between cells, in pixels
const CELL_PADDING: u32 = 2;

/// Extra time the final frame stays up, in hundredths of a second
const FINAL_FRAME_HOLD: u32 = 300;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// How long a frame is shown, in hundredths of a second.
pub fn frame_delay(rate: u32, last: bool) -> u32 {
    let delay = 100 / rate.max(1);

    if last { FINAL_FRAME_HOLD + delay } else { delay }
}

/// Pixel size of a frame for a `rows` by `cols` board. `None` if it doesn't fit in a GIF, whose
/// sides are 16 bit.
pub fn frame_size(rows: usize, cols: usize) -> Option<(u32, u32)> {
    let side = |cells: usize| {
        u32::try_from(cells)
            .ok()?
            .checked_mul(CELL_SIZE + CELL_PADDING)
            .filter(|&px| px <= u32::from(u16::MAX))
    };

    Some((side(cols)?, side(rows)?))
}

/// Draw one generation: black cells on white with a one pixel black frame.
pub fn draw_frame(snapshot: &Snapshot<'_>) -> io::Result<RgbaImage> {
    let pitch = CELL_SIZE + CELL_PADDING;

    let Some((w, h)) = frame_size(snapshot.rows(), snapshot.cols()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "A {}x{} board is too large for a GIF frame",
                snapshot.rows(),
                snapshot.cols()
            ),
        ));
    };

    let mut img: RgbaImage = ImageBuffer::from_pixel(w, h, WHITE);

    for x in 0..w {
        img.put_pixel(x, 0, BLACK);
        img.put_pixel(x, h - 1, BLACK);
    }

    for y in 0..h {
        img.put_pixel(0, y, BLACK);
        img.put_pixel(w - 1, y, BLACK);
    }

    for (r, line) in snapshot.lines().enumerate() {
        for (c, &age) in line.iter().enumerate() {
            if age == 0 {
                continue;
            }

            let (x0, y0) = (c as u32 * pitch, r as u32 * pitch);

            for dy in 0..CELL_SIZE {
                for dx in 0..CELL_SIZE {
                    img.put_pixel(x0 + dx, y0 + dy, BLACK);
                }
            }
        }
    }

    Ok(img)
}

/// Collects one frame per generation, to be encoded as an animated GIF once the run is over.
#[derive(Default)]
pub struct GifRecorder {
    frames: Vec<Frame>,

    /// Times the animation is replayed, `None` loops forever
    loops: Option<u16>,
}

impl GifRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay the animation `loops` times, capped at what a GIF can express.
    pub fn loops(mut self, loops: u64) -> Self {
        self.loops = Some(u16::try_from(loops).unwrap_or(u16::MAX));
        self
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Encode every recorded frame into `out`.
    pub fn finish<W: Write>(self, out: W) -> ImageResult<()> {
        let repeat = match self.loops {
            Some(n) => Repeat::Finite(n),
            None => Repeat::Infinite,
        };

        let mut encoder = GifEncoder::new(out);
        encoder.set_repeat(repeat)?;
        encoder.encode_frames(self.frames)
    }
}

impl Renderer for GifRecorder {
    fn render(&mut self, snapshot: Snapshot<'_>, status: &Status) -> io::Result<ControlFlow<()>> {
        let centis = frame_delay(status.rate, status.last);
        let delay = Delay::from_numer_denom_ms(centis * 10, 1);

        self.frames
            .push(Frame::from_parts(draw_frame(&snapshot)?, 0, 0, delay));

        Ok(ControlFlow::Continue(()))
    }
}

use crate::render::Canvas;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// Dots per terminal column
pub const DOTS_PER_COL: usize = 2;

/// Dots per terminal row
pub const DOTS_PER_ROW: usize = 4;

/// A terminal frame buffer. Every character cell holds a 2x4 block of braille dots, and one dot
/// is one real unit of the viewport.
pub struct Camera {
    /// The dot buffer
    cb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the dot buffer
    w: usize,

    /// Height of the dot buffer
    h: usize,
}

impl Camera {
    /// A camera covering `cols x rows` terminal cells
    pub fn new(cols: u16, rows: u16) -> Self {
        let (w, h) = Self::dots(cols, rows);

        // For each braille character we need 3 bytes, and each of the `bh` lines ends with a one
        // byte newline.
        let (bw, bh) = (w.div_ceil(DOTS_PER_COL), h.div_ceil(DOTS_PER_ROW));

        Self {
            cb: vec![false; w * h],
            fb: String::with_capacity(3 * (bw * bh) + bh),
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
        }
    }

    /// Width in dots
    pub fn width(&self) -> usize {
        self.w
    }

    /// Height in dots
    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows);
    }

    /// Turns on a single dot
    pub fn draw_pixel(&mut self, x: usize, y: usize) {
        assert!(x < self.w, "x is out of bounds");
        assert!(y < self.h, "y is out of bounds");

        let i = self.xy_from(x, y);

        self.cb[i] = true;
    }

    /// Turns on every dot of `[x0, x1) x [y0, y1)` that lies on the screen
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) {
        let clip = |v: i64, max: usize| v.clamp(0, max as i64) as usize;

        let (x0, x1) = (clip(x0, self.w), clip(x1, self.w));
        let (y0, y1) = (clip(y0, self.h), clip(y1, self.h));

        for y in y0..y1 {
            let row = self.xy_from(0, y);
            self.cb[row + x0..row + x1].fill(true);
        }
    }

    /// Reset the dot buffer
    pub fn reset(&mut self) {
        self.cb.fill(false);
    }

    /// Pack the dot buffer into braille characters, one line per terminal row.
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(DOTS_PER_COL);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.cb.iter().enumerate() {
            if px {
                let (x, y) = self.xy_to(n);
                self.cp[(y / DOTS_PER_ROW) * bw + (x / DOTS_PER_COL)] += Self::get_hex_value(x, y);
            }
        }

        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            // The codepoints stay within U+2800..=U+28FF
            self.fb
                .push(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        self.fb.push('\n');

        &self.fb
    }

    fn dots(cols: u16, rows: u16) -> (usize, usize) {
        (
            cols as usize * DOTS_PER_COL,
            rows as usize * DOTS_PER_ROW,
        )
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

impl Canvas for Camera {
    fn size(&self) -> (f64, f64) {
        (self.w as f64, self.h as f64)
    }

    fn clear_frame(&mut self) {
        self.reset();
    }

    /// Grid lines would fill the screen at this resolution, so only their intersections are drawn.
    fn draw_tiled_background(&mut self, offset: (f64, f64), scale: f64, spacing: f64) {
        // distance between two lines on screen
        let step = spacing / scale;

        // Too dense to tell apart from a filled screen
        if !step.is_finite() || step < DOTS_PER_COL as f64 {
            return;
        }

        // Line `k` sits at `k * step - offset`; start from the first one on screen
        let start = |offset: f64| (-offset).rem_euclid(step);

        let mut y = start(offset.1);
        while y < self.h as f64 {
            let mut x = start(offset.0);
            while x < self.w as f64 {
                self.draw_pixel(x as usize, y as usize);
                x += step;
            }
            y += step;
        }
    }

    fn draw_sprite(&mut self, (x, y): (f64, f64), size: f64) {
        // Sprites smaller than a dot still get one
        let span = |v: f64| {
            let lo = v.floor() as i64;
            let hi = ((v + size).floor() as i64).max(lo + 1);
            (lo, hi)
        };

        let (x0, x1) = span(x);
        let (y0, y1) = span(y);

        self.fill_rect(x0, y0, x1, y1);
    }
}

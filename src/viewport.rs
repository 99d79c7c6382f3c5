use thiserror::Error;

/// A point in real (screen) or virtual (canvas) space
pub type Point = (f64, f64);

#[derive(Debug, Error, PartialEq)]
pub enum ViewportError {
    #[error("Scale must be finite, got {0}")]
    NonFiniteScale(f64),

    #[error("Scale must be positive, got {0}")]
    NonPositiveScale(f64),

    #[error("Viewport input must be finite, got {0}")]
    NonFiniteInput(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zoom {
    /// Lowers the scale, which magnifies
    In,

    /// Raises the scale
    Out,
}

/// Pan and zoom over an unbounded virtual canvas.
///
/// ```notrust
/// virtual = (real + offset) * scale
/// real    = virtual / scale - offset
/// ```
///
/// The offset is expressed in real units and follows the content: panning right increases it.
/// A virtual length `l` covers `l / scale` real units, so lowering the scale magnifies.
///
/// None of the operations redraw anything. They return `Ok(())` when the state changed and the
/// caller is expected to redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    offset_x: f64,
    offset_y: f64,
    scale: f64,

    /// Screen size in real units
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            width,
            height,
        }
    }

    pub fn offset(&self) -> Point {
        (self.offset_x, self.offset_y)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_virtual(&self, (x, y): Point) -> Point {
        (
            (x + self.offset_x) * self.scale,
            (y + self.offset_y) * self.scale,
        )
    }

    pub fn to_real(&self, (x, y): Point) -> Point {
        (x / self.scale - self.offset_x, y / self.scale - self.offset_y)
    }

    /// Width of the virtual canvas currently visible
    pub fn virtual_width(&self) -> f64 {
        self.width / self.scale
    }

    /// Height of the virtual canvas currently visible
    pub fn virtual_height(&self) -> f64 {
        self.height / self.scale
    }

    /// Move the view by `amount` real units. Left and up decrease the offset, right and down
    /// increase it.
    pub fn pan(&mut self, direction: Direction, amount: f64) -> Result<(), ViewportError> {
        finite(amount)?;

        match direction {
            Direction::Left => self.offset_x -= amount,
            Direction::Right => self.offset_x += amount,
            Direction::Up => self.offset_y -= amount,
            Direction::Down => self.offset_y += amount,
        }

        Ok(())
    }

    /// Multiply the scale by `factor`. Rejected, with no change, if the new scale would not be a
    /// finite positive number.
    pub fn zoom_by(&mut self, factor: f64) -> Result<(), ViewportError> {
        self.scale = self.scaled(factor)?;

        Ok(())
    }

    /// Zoom by `1 -/+ speed` while keeping the virtual point under `pointer` in place.
    ///
    /// Scale and offset change together or not at all.
    pub fn zoom_at(&mut self, pointer: Point, zoom: Zoom, speed: f64) -> Result<(), ViewportError> {
        finite(pointer.0)?;
        finite(pointer.1)?;

        let factor = match zoom {
            Zoom::In => 1.0 - speed,
            Zoom::Out => 1.0 + speed,
        };

        // `pre` under the old scale, `post` under the new one
        let pre = self.to_virtual(pointer);
        let scale = self.scaled(factor)?;
        let post = (
            (pointer.0 + self.offset_x) * scale,
            (pointer.1 + self.offset_y) * scale,
        );

        // `pre - post` is in virtual units, the offset in real ones
        let offset_x = self.offset_x + (pre.0 - post.0) / scale;
        let offset_y = self.offset_y + (pre.1 - post.1) / scale;
        finite(offset_x)?;
        finite(offset_y)?;

        self.scale = scale;
        self.offset_x = offset_x;
        self.offset_y = offset_y;

        Ok(())
    }

    /// The scale after multiplying by `factor`, if it is finite and positive
    fn scaled(&self, factor: f64) -> Result<f64, ViewportError> {
        let scale = self.scale * factor;

        if !scale.is_finite() {
            return Err(ViewportError::NonFiniteScale(scale));
        }

        if scale <= 0.0 {
            return Err(ViewportError::NonPositiveScale(scale));
        }

        Ok(scale)
    }

    /// The screen changed size
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ViewportError> {
        finite(width)?;
        finite(height)?;

        self.width = width.max(0.0);
        self.height = height.max(0.0);

        Ok(())
    }

    /// Back to no offset and unit scale
    pub fn reset(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.scale = 1.0;
    }
}

fn finite(v: f64) -> Result<(), ViewportError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ViewportError::NonFiniteInput(v))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::Direction;
    use super::Viewport;
    use super::ViewportError;
    use super::Zoom;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        let eps = |x: f64, y: f64| (x - y).abs() <= 1e-9 * x.abs().max(y.abs()).max(1.0);
        eps(a.0, b.0) && eps(a.1, b.1)
    }

    #[test]
    fn starts_at_identity() {
        let vp = Viewport::new(800.0, 600.0);

        assert_eq!(vp.offset(), (0.0, 0.0));
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.to_virtual((12.0, -3.0)), (12.0, -3.0));
        assert_eq!(vp.virtual_width(), 800.0);
        assert_eq!(vp.virtual_height(), 600.0);
    }

    #[test]
    fn transforms() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.pan(Direction::Right, 10.0).unwrap();
        vp.pan(Direction::Up, 4.0).unwrap();
        vp.zoom_by(2.0).unwrap();

        assert_eq!(vp.offset(), (10.0, -4.0));
        assert_eq!(vp.to_virtual((0.0, 0.0)), (20.0, -8.0));
        assert_eq!(vp.to_real((20.0, -8.0)), (0.0, 0.0));
        assert_eq!(vp.virtual_width(), 400.0);
    }

    #[test]
    fn pan_directions() {
        let mut vp = Viewport::new(0.0, 0.0);

        vp.pan(Direction::Left, 10.0).unwrap();
        assert_eq!(vp.offset(), (-10.0, 0.0));
        vp.pan(Direction::Down, 10.0).unwrap();
        assert_eq!(vp.offset(), (-10.0, 10.0));
        vp.pan(Direction::Right, 25.0).unwrap();
        vp.pan(Direction::Up, 25.0).unwrap();
        assert_eq!(vp.offset(), (15.0, -15.0));
    }

    #[test]
    fn cursor_anchored_zoom_in() {
        let mut vp = Viewport::new(800.0, 600.0);
        let pointer = (100.0, 100.0);
        let under = vp.to_virtual(pointer);

        vp.zoom_at(pointer, Zoom::In, 0.1).unwrap();

        assert!((vp.scale() - 0.9).abs() < 1e-12);
        assert!(close(vp.to_real(under), pointer), "{:?}", vp.to_real(under));
    }

    #[test]
    fn cursor_anchored_zoom_out_after_pan() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.pan(Direction::Left, 37.0).unwrap();
        vp.zoom_by(1.7).unwrap();

        let pointer = (-20.0, 410.5);
        let under = vp.to_virtual(pointer);

        vp.zoom_at(pointer, Zoom::Out, 0.1).unwrap();

        assert!((vp.scale() - 1.87).abs() < 1e-12);
        assert!(close(vp.to_real(under), pointer));
    }

    #[test]
    fn bad_scale_is_rejected() {
        let mut vp = Viewport::new(800.0, 600.0);

        assert_eq!(vp.zoom_by(0.0), Err(ViewportError::NonPositiveScale(0.0)));
        assert_eq!(vp.zoom_by(-2.0), Err(ViewportError::NonPositiveScale(-2.0)));
        assert!(matches!(
            vp.zoom_by(f64::NAN),
            Err(ViewportError::NonFiniteScale(_))
        ));
        assert_eq!(
            vp.zoom_by(f64::INFINITY),
            Err(ViewportError::NonFiniteScale(f64::INFINITY))
        );
        assert!(vp.zoom_at((0.0, 0.0), Zoom::In, 1.0).is_err());
        assert!(vp.pan(Direction::Left, f64::NAN).is_err());

        assert_eq!(vp, Viewport::new(800.0, 600.0));
    }

    #[test]
    fn overflowing_zoom_at_is_rejected() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom_by(1e306).unwrap();
        let before = vp.clone();

        // the virtual position under the pointer no longer fits in an f64
        assert!(matches!(
            vp.zoom_at((1000.0, 1000.0), Zoom::Out, 0.1),
            Err(ViewportError::NonFiniteInput(_))
        ));

        assert_eq!(vp, before);
        assert!(vp.offset().0.is_finite() && vp.offset().1.is_finite());
    }

    #[test]
    fn reset() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom_at((3.0, 4.0), Zoom::Out, 0.1).unwrap();
        vp.pan(Direction::Down, 1.0).unwrap();

        vp.reset();

        assert_eq!(vp, Viewport::new(800.0, 600.0));
    }

    #[test]
    fn resize_changes_visible_extent() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom_by(0.5).unwrap();

        vp.resize(100.0, 50.0).unwrap();

        assert_eq!(vp.virtual_width(), 200.0);
        assert_eq!(vp.virtual_height(), 100.0);
    }

    proptest! {
        #[test]
        fn to_real_inverts_to_virtual(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            ox in -1e4f64..1e4,
            oy in -1e4f64..1e4,
            scale in 1e-3f64..1e3,
        ) {
            let mut vp = Viewport::new(800.0, 600.0);
            vp.pan(Direction::Right, ox).unwrap();
            vp.pan(Direction::Down, oy).unwrap();
            vp.zoom_by(scale).unwrap();

            let back = vp.to_real(vp.to_virtual((x, y)));

            // relative to the largest magnitude involved in the computation
            let tol = 1e-9 * (x.abs() + y.abs() + ox.abs() + oy.abs() + 1.0);
            prop_assert!((back.0 - x).abs() <= tol, "{:?} vs {:?}", back, (x, y));
            prop_assert!((back.1 - y).abs() <= tol, "{:?} vs {:?}", back, (x, y));
        }

        #[test]
        fn zoom_keeps_pointer_anchored(
            px in -2e3f64..2e3,
            py in -2e3f64..2e3,
            zoom_in: bool,
            steps in 1usize..20,
        ) {
            let mut vp = Viewport::new(800.0, 600.0);
            let zoom = if zoom_in { Zoom::In } else { Zoom::Out };

            for _ in 0..steps {
                let under = vp.to_virtual((px, py));
                vp.zoom_at((px, py), zoom, 0.1).unwrap();

                let back = vp.to_real(under);
                let tol = 1e-9 * (px.abs() + py.abs() + 1.0) / vp.scale().min(1.0);
                prop_assert!((back.0 - px).abs() <= tol);
                prop_assert!((back.1 - py).abs() <= tol);
            }
        }
    }
}

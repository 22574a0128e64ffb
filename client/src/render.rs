use web_sys::CanvasRenderingContext2d;

use shapeboard_shared::{Point, Size, Surface};

/// `Surface` over a 2d canvas context, in CSS pixels.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    size: Size,
    line_width: f64,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, line_width: f64) -> Self {
        Self {
            ctx,
            size: Size::default(),
            line_width,
        }
    }

    pub fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.size.width, self.size.height);
    }

    fn line(&mut self, from: Point, to: Point, color: &str) {
        // Resizing the canvas resets context state, so set it per stroke.
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(self.line_width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(origin.x, origin.y, width, height);
    }

    fn fill_arc(&mut self, center: Point, radius: f64, color: &str) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        if let Err(error) = self
            .ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::PI * 2.0)
        {
            log::warn!("Failed to trace circle at {center:?}: {error:?}");
            return;
        }
        self.ctx.fill();
    }

    fn fill_polygon(&mut self, points: &[Point], color: &str) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for point in rest {
            self.ctx.line_to(point.x, point.y);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }
}

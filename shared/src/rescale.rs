use crate::{Shape, Size};

/// Per-axis factors mapping `old` onto `new`, or `None` when either size is degenerate.
pub fn scale_factors(old: Size, new: Size) -> Option<(f64, f64)> {
    if !old.is_drawable() || !new.is_drawable() {
        return None;
    }
    Some((new.width / old.width, new.height / old.height))
}

/// Rescales one shape, keeping it unchanged when the result would not be finite.
pub fn rescale_shape(shape: &mut Shape, x_scale: f64, y_scale: f64) -> bool {
    let mut scaled = shape.clone();
    scaled.rescale(x_scale, y_scale);
    if !scaled.is_finite() {
        log::warn!(
            "Skipping rescale of {} at {:?}: geometry overflows",
            shape.kind_name(),
            shape.anchor()
        );
        return false;
    }
    *shape = scaled;
    true
}

/// Rescales every shape in place and returns the factors used, or `None`
/// when either size is degenerate and nothing was transformed.
pub fn rescale_shapes(shapes: &mut [Shape], old: Size, new: Size) -> Option<(f64, f64)> {
    let (x_scale, y_scale) = scale_factors(old, new)?;
    for shape in shapes.iter_mut() {
        rescale_shape(shape, x_scale, y_scale);
    }
    Some((x_scale, y_scale))
}

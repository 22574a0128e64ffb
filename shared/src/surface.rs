use crate::Point;

/// Drawing primitives the board paints with. Extents passed to `fill_rect`
/// may be negative; implementations fill towards the sign.
pub trait Surface {
    fn clear(&mut self);
    fn line(&mut self, from: Point, to: Point, color: &str);
    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str);
    fn fill_arc(&mut self, center: Point, radius: f64, color: &str);
    fn fill_polygon(&mut self, points: &[Point], color: &str);
}

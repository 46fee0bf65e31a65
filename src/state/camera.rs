// Map camera: projected coordinates <-> canvas pixels
use crate::model::{Pixel, ProjectedCoordinate};

/// Metres per pixel at zoom level 0 for 256 px tiles.
const RESOLUTION_Z0: f64 = 156_543.033_928_040_97;
const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 19.0;

/// Maps between the map projection and screen pixels for the current view.
pub trait ViewTransform {
    fn pixel_from_coordinate(&self, coordinate: ProjectedCoordinate) -> Pixel;
    fn coordinate_from_pixel(&self, pixel: Pixel) -> ProjectedCoordinate;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub center: ProjectedCoordinate,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
    pub panning: bool,
    pub last_x: f64,
    pub last_y: f64,
    /// Pixels travelled since the button went down; tells a drag from a click.
    pub drag_distance: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            // central Europe
            center: ProjectedCoordinate::new(1_113_194.9, 6_621_293.7),
            zoom: 7.0,
            width: 800.0,
            height: 600.0,
            panning: false,
            last_x: 0.0,
            last_y: 0.0,
            drag_distance: 0.0,
        }
    }
}

impl Camera {
    pub fn resolution(&self) -> f64 {
        RESOLUTION_Z0 / 2f64.powf(self.zoom)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Zoom by `factor` keeping the coordinate under `anchor` in place.
    pub fn zoom_at(&mut self, anchor: Pixel, factor: f64) {
        let fixed = self.coordinate_from_pixel(anchor);
        self.zoom = (self.zoom + factor.log2()).clamp(MIN_ZOOM, MAX_ZOOM);
        let moved = self.coordinate_from_pixel(anchor);
        self.center.x += fixed.x - moved.x;
        self.center.y += fixed.y - moved.y;
    }

    /// Move the view by a screen delta (content follows the pointer).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let res = self.resolution();
        self.center.x -= dx * res;
        self.center.y += dy * res;
    }

    pub fn center_on(&mut self, coordinate: ProjectedCoordinate) {
        self.center = coordinate;
    }
}

impl ViewTransform for Camera {
    fn pixel_from_coordinate(&self, coordinate: ProjectedCoordinate) -> Pixel {
        let res = self.resolution();
        Pixel {
            x: (coordinate.x - self.center.x) / res + self.width * 0.5,
            y: (self.center.y - coordinate.y) / res + self.height * 0.5,
        }
    }

    fn coordinate_from_pixel(&self, pixel: Pixel) -> ProjectedCoordinate {
        let res = self.resolution();
        ProjectedCoordinate {
            x: self.center.x + (pixel.x - self.width * 0.5) * res,
            y: self.center.y - (pixel.y - self.height * 0.5) * res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn center_is_middle_of_viewport() {
        let cam = Camera::default();
        let px = cam.pixel_from_coordinate(cam.center);
        assert!(close(px.x, 400.0) && close(px.y, 300.0));
    }

    #[test]
    fn pixel_mapping_inverts() {
        let cam = Camera::default();
        let p = ProjectedCoordinate::new(1_200_000.0, 6_500_000.0);
        let back = cam.coordinate_from_pixel(cam.pixel_from_coordinate(p));
        assert!(close(back.x, p.x) && close(back.y, p.y));
    }

    #[test]
    fn screen_y_grows_southwards() {
        let cam = Camera::default();
        let north = ProjectedCoordinate::new(cam.center.x, cam.center.y + 10_000.0);
        assert!(cam.pixel_from_coordinate(north).y < 300.0);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut cam = Camera::default();
        let anchor = Pixel::new(120.0, 80.0);
        let before = cam.coordinate_from_pixel(anchor);
        cam.zoom_at(anchor, 2.0);
        assert!(close(cam.zoom, 8.0));
        let after = cam.coordinate_from_pixel(anchor);
        assert!((before.x - after.x).abs() < 1e-3 && (before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.zoom_at(Pixel::new(0.0, 0.0), 1e12);
        assert!(close(cam.zoom, MAX_ZOOM));
        cam.zoom_at(Pixel::new(0.0, 0.0), 1e-12);
        assert!(close(cam.zoom, MIN_ZOOM));
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut cam = Camera::default();
        let p = ProjectedCoordinate::new(1_100_000.0, 6_600_000.0);
        let before = cam.pixel_from_coordinate(p);
        cam.pan_by(15.0, -7.0);
        let after = cam.pixel_from_coordinate(p);
        assert!(close(after.x - before.x, 15.0) && close(after.y - before.y, -7.0));
    }
}

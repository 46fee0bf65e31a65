use crate::model::{ClickEvent, ClosestPointResult};
use crate::state::camera::ViewTransform;
use crate::state::features::{FeatureSource, HasGeometry, HasIdentity};

/// Squared screen distance below which a click selects a feature (~10 px).
pub const HIT_TOLERANCE_SQUARED_PX: f64 = 100.0;

/// Resolves the feature the user clicked on, if any.
///
/// The tolerance is applied in screen pixels so hit-testing feels the same
/// at every zoom level.
pub fn nearest_feature<S, V>(click: &ClickEvent, source: &S, view: &V) -> Option<ClosestPointResult>
where
    S: FeatureSource,
    V: ViewTransform,
{
    let feature = source.closest_feature_to(click.point)?;
    let closest = feature.closest_point(click.point)?;

    let feature_pixel = view.pixel_from_coordinate(closest.coordinate);
    let mouse_pixel = view.pixel_from_coordinate(click.point);
    if feature_pixel.distance_squared(mouse_pixel) < HIT_TOLERANCE_SQUARED_PX {
        Some(ClosestPointResult {
            point: closest.coordinate,
            timestamp: closest.time,
            feature_id: feature.id().to_string(),
        })
    } else {
        None
    }
}

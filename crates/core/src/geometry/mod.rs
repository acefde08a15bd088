use crate::{Joint, Point, PoseFrame};

/// Unsigned interior angle in degrees at `vertex`, formed by the segments to
/// `a` and `b`. Always lies in [0, 180].
pub fn vertex_angle(a: Point, vertex: Point, b: Point) -> f32 {
    let to_b = direction(vertex, b);
    let to_a = direction(vertex, a);

    let angle = (to_b - to_a).to_degrees().abs() as f32;
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

// Taken in f64 so that the difference of any two pixel positions fits.
fn direction(from: Point, to: Point) -> f64 {
    let dx = f64::from(to.x) - f64::from(from.x);
    let dy = f64::from(to.y) - f64::from(from.y);
    dy.atan2(dx)
}

/// Angle at the middle joint of `triple`, or `None` when any of the three
/// joints was not supplied with sufficient visibility this frame.
pub fn joint_angle(
    frame: &PoseFrame,
    triple: [Joint; 3],
    visibility_threshold: f32,
) -> Option<f32> {
    let [a, vertex, b] = triple;
    Some(vertex_angle(
        frame.position(a, visibility_threshold)?,
        frame.position(vertex, visibility_threshold)?,
        frame.position(b, visibility_threshold)?,
    ))
}

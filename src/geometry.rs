//! Screen-space predicates shared by the hover passes.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Circle hit used for nodes: the cheap box rejection runs before the sqrt.
pub fn in_circle(point: Point, center: Point, radius: f64) -> bool {
    let dx = (center.x - point.x).abs();
    let dy = (center.y - point.y).abs();
    dx < radius && dy < radius && (dx * dx + dy * dy).sqrt() < radius
}

/// Square of half-side `half` around `center`.
pub fn in_box(point: Point, center: Point, half: f64) -> bool {
    (center.x - point.x).abs() < half && (center.y - point.y).abs() < half
}

/// True when `point` lies on the segment `start`-`end` of thickness `width`.
///
/// The bounding box test is inclusive so axis-aligned segments can be hit.
pub fn is_on_segment(point: Point, start: Point, end: Point, width: f64, epsilon: f64) -> bool {
    let within_x = start.x.min(end.x) <= point.x && point.x <= start.x.max(end.x);
    let within_y = start.y.min(end.y) <= point.y && point.y <= start.y.max(end.y);
    if !(within_x && within_y) {
        return false;
    }

    let cross =
        ((point.y - start.y) * (end.x - start.x) - (point.x - start.x) * (end.y - start.y)).abs();
    cross < width * epsilon
}

/// Control point used when an edge is drawn as a quadratic curve.
pub fn curve_control_point(start: Point, end: Point) -> Point {
    Point::new(
        (start.x + end.x) / 2.0 + (end.y - start.y) / 4.0,
        (start.y + end.y) / 2.0 + (start.x - end.x) / 4.0,
    )
}

/// Point at parameter `t` in `[0, 1]` along the quadratic bezier `start`-`control`-`end`.
pub fn point_on_quadratic_curve(t: f64, start: Point, end: Point, control: Point) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * start.x + 2.0 * u * t * control.x + t * t * end.x,
        u * u * start.y + 2.0 * u * t * control.y + t * t * end.y,
    )
}

/// Approximate curve hit: walks the curve parameter toward the pointer with a
/// shrinking step until the sampled point is close enough or the step vanishes.
pub fn is_on_quadratic_curve(
    point: Point,
    start: Point,
    end: Point,
    control: Point,
    width: f64,
    epsilon: f64,
) -> bool {
    let extremities = start.distance(end);
    if (point.x - start.x).abs() > extremities || (point.y - start.y).abs() > extremities {
        return false;
    }

    const STEP_THRESHOLD: f64 = 0.025;
    let distance_threshold = (1.0 + width).ln() * epsilon / 20.0;

    let mut t = 0.5;
    let mut step: f64 = if point.distance(start) < point.distance(end) {
        -0.1
    } else {
        0.1
    };
    let mut distance = point.distance(point_on_quadratic_curve(t, start, end, control));

    while (0.0..=1.0).contains(&t)
        && distance > distance_threshold
        && step.abs() > STEP_THRESHOLD
    {
        let previous = distance;
        distance = point.distance(point_on_quadratic_curve(t, start, end, control));
        if distance > previous {
            step = -step / 2.0;
            t += step;
        } else if t + step < 0.0 || t + step > 1.0 {
            step /= 2.0;
            distance = previous;
        } else {
            t += step;
        }
    }

    distance < distance_threshold
}

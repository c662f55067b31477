//! Knee geometry in 2-objective space.

/// Perpendicular distance from `point` to the line through `line_start`
/// and `line_end`. A degenerate line (length below 1e-12) yields 0.
pub fn compute(line_start: (f64, f64), line_end: (f64, f64), point: (f64, f64)) -> f64 {
    let (x1, y1) = line_start;
    let (x2, y2) = line_end;

    let vx = x2 - x1;
    let vy = y2 - y1;
    let line_length = (vx * vx + vy * vy).sqrt();
    if line_length < 1e-12 {
        return 0.0;
    }

    let ux = vx / line_length;
    let uy = vy / line_length;

    let wx = point.0 - x1;
    let wy = point.1 - y1;

    let projection = wx * ux + wy * uy;

    let perp_x = wx - projection * ux;
    let perp_y = wy - projection * uy;

    (perp_x * perp_x + perp_y * perp_y).sqrt()
}

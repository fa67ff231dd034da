//! Per-constraint error measures and relaxation steps.
//!
//! Every rule works on point indices into [`Points`]. A rule never moves a
//! fixed point; when its natural subject is fixed it moves the free points of
//! the reference geometry instead, so fixed anchors cannot stall the solve.

use std::f64::consts::FRAC_PI_2;

use crate::math::distance_2d::project_onto_line;
use crate::math::{rotate_about, wrap_angle, Point2, Vector2};

use super::solver::SolverOptions;

/// A constraint resolved to point and line indices.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Rule {
    Distance { a: usize, b: usize, distance: f64 },
    Coincident { a: usize, b: usize },
    Angle { a: usize, vertex: usize, b: usize, angle: f64 },
    Horizontal { line: usize },
    Vertical { line: usize },
    /// Lines meet at `offset` radians (0 for parallel, π/2 for perpendicular).
    Orientation { l1: usize, l2: usize, offset: f64 },
    PointOnLine { point: usize, line: usize },
    Midpoint { point: usize, line: usize },
    EqualLength { l1: usize, l2: usize },
    Collinear { a: usize, middle: usize, c: usize },
}

impl Rule {
    pub(crate) fn parallel(l1: usize, l2: usize) -> Self {
        Self::Orientation { l1, l2, offset: 0.0 }
    }

    pub(crate) fn perpendicular(l1: usize, l2: usize) -> Self {
        Self::Orientation {
            l1,
            l2,
            offset: FRAC_PI_2,
        }
    }
}

/// Mutable point state of a solve.
#[derive(Debug, Clone)]
pub(crate) struct Points {
    pub positions: Vec<Point2>,
    pub fixed: Vec<bool>,
    pub lines: Vec<(usize, usize)>,
}

impl Points {
    fn free(&self, i: usize) -> bool {
        !self.fixed[i]
    }

    fn line_free(&self, line: usize) -> bool {
        let (p, q) = self.lines[line];
        self.free(p) || self.free(q)
    }

    /// Moves a free point by `delta`, clamped to `max_step`.
    fn nudge(&mut self, i: usize, delta: Vector2, max_step: f64) {
        if self.free(i) {
            self.positions[i] += clamp_step(delta, max_step);
        }
    }

    /// Applies `-delta/2` to `a` and `+delta/2` to `b`, or the full delta to
    /// whichever one is free.
    fn nudge_pair(&mut self, a: usize, b: usize, delta: Vector2, max_step: f64) {
        match (self.free(a), self.free(b)) {
            (true, true) => {
                self.nudge(a, -delta * 0.5, max_step);
                self.nudge(b, delta * 0.5, max_step);
            }
            (true, false) => self.nudge(a, -delta, max_step),
            (false, true) => self.nudge(b, delta, max_step),
            (false, false) => {}
        }
    }

    fn translate_line(&mut self, line: usize, delta: Vector2, max_step: f64) {
        let (p, q) = self.lines[line];
        self.nudge(p, delta, max_step);
        self.nudge(q, delta, max_step);
    }

    /// Rotates a line about its midpoint, or about its fixed endpoint when
    /// only one endpoint is free.
    fn rotate_line(&mut self, line: usize, angle: f64) {
        let (p, q) = self.lines[line];
        let (pp, pq) = (self.positions[p], self.positions[q]);
        match (self.free(p), self.free(q)) {
            (true, true) => {
                let mid = nalgebra::center(&pp, &pq);
                self.positions[p] = rotate_about(&pp, &mid, angle);
                self.positions[q] = rotate_about(&pq, &mid, angle);
            }
            (true, false) => self.positions[p] = rotate_about(&pp, &pq, angle),
            (false, true) => self.positions[q] = rotate_about(&pq, &pp, angle),
            (false, false) => {}
        }
    }

    /// Sets a line's length, keeping its midpoint (or its fixed endpoint).
    fn rescale_line(&mut self, line: usize, length: f64) {
        let (p, q) = self.lines[line];
        let (pp, pq) = (self.positions[p], self.positions[q]);
        let v = pq - pp;
        let current = v.norm();
        if current <= 0.0 {
            return;
        }
        let dir = v / current;
        match (self.free(p), self.free(q)) {
            (true, true) => {
                let mid = nalgebra::center(&pp, &pq);
                self.positions[p] = mid - dir * (length * 0.5);
                self.positions[q] = mid + dir * (length * 0.5);
            }
            (true, false) => self.positions[p] = pq - dir * length,
            (false, true) => self.positions[q] = pp + dir * length,
            (false, false) => {}
        }
    }

    fn line_vector(&self, line: usize) -> Vector2 {
        let (p, q) = self.lines[line];
        self.positions[q] - self.positions[p]
    }
}

fn clamp_step(delta: Vector2, max_step: f64) -> Vector2 {
    let len = delta.norm();
    if len > max_step {
        delta * (max_step / len)
    } else {
        delta
    }
}

/// Unsigned angle between two vectors in `[0, π]`.
fn unsigned_angle(u: &Vector2, v: &Vector2) -> f64 {
    u.perp(v).abs().atan2(u.dot(v))
}

/// Signed deviation of the angle from `u` to `v` from `offset`, folded into
/// `(-π/2, π/2]` so that anti-parallel counts as parallel.
fn orientation_deviation(u: &Vector2, v: &Vector2, offset: f64) -> f64 {
    let theta = u.perp(v).atan2(u.dot(v));
    wrap_angle(2.0 * (theta - offset)) * 0.5
}

/// Scalar error of a rule, or `0` when its reference geometry is degenerate.
pub(crate) fn error(rule: &Rule, pts: &Points, eps: f64) -> f64 {
    let pos = &pts.positions;
    match *rule {
        Rule::Distance { a, b, distance } => distance - (pos[b] - pos[a]).norm(),
        Rule::Coincident { a, b } => (pos[b] - pos[a]).norm(),
        Rule::Angle {
            a,
            vertex,
            b,
            angle,
        } => {
            let ra = pos[a] - pos[vertex];
            let rb = pos[b] - pos[vertex];
            if ra.norm() < eps || rb.norm() < eps {
                return 0.0;
            }
            angle - unsigned_angle(&ra, &rb)
        }
        Rule::Horizontal { line } => pts.line_vector(line).y,
        Rule::Vertical { line } => pts.line_vector(line).x,
        Rule::Orientation { l1, l2, offset } => {
            let (u, v) = (pts.line_vector(l1), pts.line_vector(l2));
            if u.norm() < eps || v.norm() < eps {
                return 0.0;
            }
            orientation_deviation(&u, &v, offset)
        }
        Rule::PointOnLine { point, line } => {
            let (p, q) = pts.lines[line];
            if (pos[q] - pos[p]).norm() < eps {
                return 0.0;
            }
            project_onto_line(&pos[point], &pos[p], &pos[q])
                .map_or(0.0, |proj| (proj - pos[point]).norm())
        }
        Rule::Midpoint { point, line } => {
            let (p, q) = pts.lines[line];
            (nalgebra::center(&pos[p], &pos[q]) - pos[point]).norm()
        }
        Rule::EqualLength { l1, l2 } => {
            pts.line_vector(l1).norm() - pts.line_vector(l2).norm()
        }
        Rule::Collinear { a, middle, c } => {
            if (pos[c] - pos[a]).norm() < eps {
                return 0.0;
            }
            project_onto_line(&pos[middle], &pos[a], &pos[c])
                .map_or(0.0, |proj| (proj - pos[middle]).norm())
        }
    }
}

/// Applies one relaxation step of `rule` to `pts`.
pub(crate) fn apply(rule: &Rule, pts: &mut Points, opts: &SolverOptions) {
    let lr = opts.learning_rate;
    let eps = opts.epsilon;
    let max_step = opts.max_step;

    match *rule {
        Rule::Distance { a, b, distance } => {
            let v = pts.positions[b] - pts.positions[a];
            let current = v.norm();
            if current < eps {
                return;
            }
            let dir = v / current;
            let delta = dir * ((distance - current) * lr);
            pts.nudge_pair(a, b, delta, max_step);
        }
        Rule::Coincident { a, b } => {
            let v = pts.positions[b] - pts.positions[a];
            pts.nudge_pair(a, b, -v * lr, max_step);
        }
        Rule::Angle {
            a,
            vertex,
            b,
            angle,
        } => apply_angle(pts, a, vertex, b, angle, opts),
        Rule::Horizontal { line } => {
            let (p, q) = pts.lines[line];
            let dy = pts.line_vector(line).y * lr;
            pts.nudge_pair(p, q, Vector2::new(0.0, -dy), max_step);
        }
        Rule::Vertical { line } => {
            let (p, q) = pts.lines[line];
            let dx = pts.line_vector(line).x * lr;
            pts.nudge_pair(p, q, Vector2::new(-dx, 0.0), max_step);
        }
        Rule::Orientation { l1, l2, offset } => {
            let (u, v) = (pts.line_vector(l1), pts.line_vector(l2));
            if u.norm() < eps || v.norm() < eps {
                return;
            }
            let step = (orientation_deviation(&u, &v, offset) * lr)
                .clamp(-opts.max_rotation_step, opts.max_rotation_step);
            match (pts.line_free(l1), pts.line_free(l2)) {
                (true, true) => {
                    pts.rotate_line(l1, step * 0.5);
                    pts.rotate_line(l2, -step * 0.5);
                }
                (true, false) => pts.rotate_line(l1, step),
                (false, true) => pts.rotate_line(l2, -step),
                (false, false) => {}
            }
        }
        Rule::PointOnLine { point, line } => {
            let (p, q) = pts.lines[line];
            let (pp, pq) = (pts.positions[p], pts.positions[q]);
            if (pq - pp).norm() < eps {
                return;
            }
            if let Some(proj) = project_onto_line(&pts.positions[point], &pp, &pq) {
                pull_point_or_line(pts, point, line, proj, lr, max_step);
            }
        }
        Rule::Midpoint { point, line } => {
            let (p, q) = pts.lines[line];
            let target = nalgebra::center(&pts.positions[p], &pts.positions[q]);
            pull_point_or_line(pts, point, line, target, lr, max_step);
        }
        Rule::EqualLength { l1, l2 } => {
            let len1 = pts.line_vector(l1).norm();
            let len2 = pts.line_vector(l2).norm();
            if len1 < eps || len2 < eps {
                return;
            }
            let gap = ((len1 - len2) * lr).clamp(-max_step, max_step);
            match (pts.line_free(l1), pts.line_free(l2)) {
                (true, true) => {
                    pts.rescale_line(l1, len1 - gap * 0.5);
                    pts.rescale_line(l2, len2 + gap * 0.5);
                }
                (true, false) => pts.rescale_line(l1, len1 - gap),
                (false, true) => pts.rescale_line(l2, len2 + gap),
                (false, false) => {}
            }
        }
        Rule::Collinear { a, middle, c } => {
            let (pa, pc) = (pts.positions[a], pts.positions[c]);
            if (pc - pa).norm() < eps {
                return;
            }
            let Some(proj) = project_onto_line(&pts.positions[middle], &pa, &pc) else {
                return;
            };
            let v = proj - pts.positions[middle];
            if pts.free(middle) {
                pts.nudge(middle, v * lr, max_step);
            } else {
                pts.nudge(a, -v * lr, max_step);
                pts.nudge(c, -v * lr, max_step);
            }
        }
    }
}

/// Moves `point` toward `target`, or the line the other way when the point
/// is fixed.
fn pull_point_or_line(
    pts: &mut Points,
    point: usize,
    line: usize,
    target: Point2,
    lr: f64,
    max_step: f64,
) {
    let v = target - pts.positions[point];
    if pts.free(point) {
        pts.nudge(point, v * lr, max_step);
    } else {
        pts.translate_line(line, -v * lr, max_step);
    }
}

fn apply_angle(
    pts: &mut Points,
    a: usize,
    vertex: usize,
    b: usize,
    angle: f64,
    opts: &SolverOptions,
) {
    let pv = pts.positions[vertex];
    let ra = pts.positions[a] - pv;
    let rb = pts.positions[b] - pv;
    if ra.norm() < opts.epsilon || rb.norm() < opts.epsilon {
        return;
    }
    // Opening direction: rotating b by +sign and a by -sign widens the angle.
    let sign = if ra.perp(&rb) < 0.0 { -1.0 } else { 1.0 };
    let step = ((angle - unsigned_angle(&ra, &rb)) * opts.learning_rate)
        .clamp(-opts.max_rotation_step, opts.max_rotation_step);

    let (wa, wb) = match (pts.free(a), pts.free(b)) {
        (true, true) => (0.5, 0.5),
        (true, false) => (1.0, 0.0),
        (false, true) => (0.0, 1.0),
        (false, false) => return,
    };
    if pts.free(a) {
        pts.positions[a] = rotate_about(&pts.positions[a], &pv, -sign * step * wa);
    }
    if pts.free(b) {
        pts.positions[b] = rotate_about(&pts.positions[b], &pv, sign * step * wb);
    }
}

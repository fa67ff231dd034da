use std::collections::HashMap;
use std::f64::consts::FRAC_PI_8;

use tracing::{debug, trace};

use super::rules::{self, Points, Rule};
use super::{ConstraintKind, Sketch};
use crate::error::{Result, SketchError};

/// Tuning knobs of the relaxation solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverOptions {
    pub max_iterations: usize,
    /// Converged once the summed squared constraint error drops below this.
    pub tolerance: f64,
    /// Fraction of each constraint's error corrected per step.
    pub learning_rate: f64,
    /// Largest translation applied to a point in one step.
    pub max_step: f64,
    /// Largest rotation (radians) applied to a line in one step.
    pub max_rotation_step: f64,
    /// Lengths below this are treated as degenerate.
    pub epsilon: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            learning_rate: 0.5,
            max_step: 50.0,
            max_rotation_step: FRAC_PI_8,
            epsilon: 1e-9,
        }
    }
}

impl SolverOptions {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    #[must_use]
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    #[must_use]
    pub fn with_max_rotation_step(mut self, max_rotation_step: f64) -> Self {
        self.max_rotation_step = max_rotation_step;
        self
    }
}

/// Result of a solve. `sketch` carries the updated point positions; all
/// other primitives are unchanged.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub success: bool,
    pub iterations: usize,
    /// Summed squared constraint error of the returned positions.
    pub residual: f64,
    pub sketch: Sketch,
}

/// Iteratively relaxes a sketch's constraints.
///
/// Each iteration applies every constraint once, in sketch order. The
/// positions with the lowest residual seen are returned, whether or not the
/// solve converged.
#[derive(Debug)]
pub struct SolveSketch<'a> {
    sketch: &'a Sketch,
    options: SolverOptions,
}

impl<'a> SolveSketch<'a> {
    #[must_use]
    pub fn new(sketch: &'a Sketch) -> Self {
        Self {
            sketch,
            options: SolverOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.options.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    /// Runs the solver.
    ///
    /// # Errors
    ///
    /// Returns a [`SketchError`] if the sketch does not validate. Failing to
    /// converge is not an error; see [`SolveOutcome::success`].
    pub fn execute(&self) -> Result<SolveOutcome> {
        self.sketch.validate()?;
        let (mut pts, rule_list, ids) = resolve(self.sketch)?;
        let opts = &self.options;

        debug!(
            points = pts.positions.len(),
            constraints = rule_list.len(),
            max_iterations = opts.max_iterations,
            "solving sketch"
        );

        let mut residual = total_residual(&rule_list, &pts, opts.epsilon);
        let mut best = pts.positions.clone();
        let mut best_residual = residual;
        let mut iterations = 0;

        while residual >= opts.tolerance && iterations < opts.max_iterations {
            for rule in &rule_list {
                rules::apply(rule, &mut pts, opts);
            }
            iterations += 1;
            residual = total_residual(&rule_list, &pts, opts.epsilon);
            if residual < best_residual {
                best_residual = residual;
                best.clone_from(&pts.positions);
            }
            trace!(iterations, residual, "solver iteration");
        }

        let success = best_residual < opts.tolerance;
        debug!(success, iterations, residual = best_residual, "sketch solve finished");

        let mut sketch = self.sketch.clone();
        for point in sketch.points_mut() {
            if let Some(&i) = ids.get(point.id.as_str()) {
                point.x = best[i].x;
                point.y = best[i].y;
            }
        }

        Ok(SolveOutcome {
            success,
            iterations,
            residual: best_residual,
            sketch,
        })
    }
}

/// Solves `sketch` with default options apart from the iteration cap and
/// tolerance.
///
/// # Errors
///
/// Returns a [`SketchError`] if the sketch does not validate.
pub fn solve(sketch: &Sketch, max_iterations: usize, tolerance: f64) -> Result<SolveOutcome> {
    SolveSketch::new(sketch)
        .with_max_iterations(max_iterations)
        .with_tolerance(tolerance)
        .execute()
}

fn total_residual(rule_list: &[Rule], pts: &Points, eps: f64) -> f64 {
    rule_list
        .iter()
        .map(|r| rules::error(r, pts, eps).powi(2))
        .sum()
}

type Resolved<'s> = (Points, Vec<Rule>, HashMap<&'s str, usize>);

/// Maps ids to indices. Expects a validated sketch.
fn resolve(sketch: &Sketch) -> Result<Resolved<'_>> {
    let mut ids = HashMap::new();
    let mut positions = Vec::new();
    let mut fixed = Vec::new();
    for (i, p) in sketch.points().enumerate() {
        ids.insert(p.id.as_str(), i);
        positions.push(p.position());
        fixed.push(p.fixed);
    }

    let point = |id: &str| -> Result<usize> {
        ids.get(id)
            .copied()
            .ok_or_else(|| SketchError::MissingPoint(id.to_owned()).into())
    };

    let mut line_ids = HashMap::new();
    let mut lines = Vec::new();
    for (i, l) in sketch.lines().enumerate() {
        line_ids.insert(l.id.as_str(), i);
        lines.push((point(&l.p1)?, point(&l.p2)?));
    }
    let line = |owner: &str, id: &str| -> Result<usize> {
        line_ids.get(id).copied().ok_or_else(|| {
            SketchError::UnknownReference {
                owner: owner.to_owned(),
                target: id.to_owned(),
            }
            .into()
        })
    };

    let mut rule_list = Vec::new();
    for c in sketch.constraints() {
        let rule = match &c.kind {
            ConstraintKind::Distance { p1, p2, distance } => Rule::Distance {
                a: point(p1)?,
                b: point(p2)?,
                distance: *distance,
            },
            ConstraintKind::Coincident { p1, p2 } => Rule::Coincident {
                a: point(p1)?,
                b: point(p2)?,
            },
            ConstraintKind::Angle {
                p1,
                vertex,
                p2,
                angle,
            } => Rule::Angle {
                a: point(p1)?,
                vertex: point(vertex)?,
                b: point(p2)?,
                angle: *angle,
            },
            ConstraintKind::Horizontal { line: l } => Rule::Horizontal {
                line: line(&c.id, l)?,
            },
            ConstraintKind::Vertical { line: l } => Rule::Vertical {
                line: line(&c.id, l)?,
            },
            ConstraintKind::Perpendicular { l1, l2 } => {
                Rule::perpendicular(line(&c.id, l1)?, line(&c.id, l2)?)
            }
            ConstraintKind::Parallel { l1, l2 } => {
                Rule::parallel(line(&c.id, l1)?, line(&c.id, l2)?)
            }
            ConstraintKind::PointOnLine { point: p, line: l } => Rule::PointOnLine {
                point: point(p)?,
                line: line(&c.id, l)?,
            },
            ConstraintKind::Midpoint { point: p, line: l } => Rule::Midpoint {
                point: point(p)?,
                line: line(&c.id, l)?,
            },
            ConstraintKind::EqualLength { l1, l2 } => Rule::EqualLength {
                l1: line(&c.id, l1)?,
                l2: line(&c.id, l2)?,
            },
            ConstraintKind::Collinear { p1, p2, p3 } => Rule::Collinear {
                a: point(p1)?,
                middle: point(p2)?,
                c: point(p3)?,
            },
        };
        rule_list.push(rule);
    }

    Ok((
        Points {
            positions,
            fixed,
            lines,
        },
        rule_list,
        ids,
    ))
}

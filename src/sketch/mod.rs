//! Parametric sketches and the relaxation solver that keeps them consistent.
//!
//! A [`Sketch`] is an ordered list of point, line and constraint primitives
//! addressed by string ids. [`solve`] (or the configurable [`SolveSketch`])
//! moves the non-fixed points until the constraints hold.

mod polygon;
mod rules;
mod solver;

pub use polygon::{polygon_sketch, read_polygon};
pub use solver::{solve, SolveOutcome, SolveSketch, SolverOptions};

use std::collections::HashSet;

use crate::error::{Result, SketchError};
use crate::math::Point2;

/// A sketch point. Fixed points are never moved by the solver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointPrimitive {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub fixed: bool,
}

impl PointPrimitive {
    #[must_use]
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A line between two sketch points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinePrimitive {
    pub id: String,
    pub p1: String,
    pub p2: String,
}

/// Geometric relation between sketch primitives. Angles are in radians.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ConstraintKind {
    #[cfg_attr(feature = "serde", serde(rename = "p2p_distance"))]
    Distance { p1: String, p2: String, distance: f64 },
    #[cfg_attr(feature = "serde", serde(rename = "p2p_coincident"))]
    Coincident { p1: String, p2: String },
    /// Unsigned angle at `vertex` between the rays to `p1` and `p2`.
    #[cfg_attr(feature = "serde", serde(rename = "p2p_angle"))]
    Angle {
        p1: String,
        vertex: String,
        p2: String,
        angle: f64,
    },
    Horizontal { line: String },
    Vertical { line: String },
    Perpendicular { l1: String, l2: String },
    Parallel { l1: String, l2: String },
    PointOnLine { point: String, line: String },
    Midpoint { point: String, line: String },
    EqualLength { l1: String, l2: String },
    /// `p2` is the middle point pulled onto the line through `p1` and `p3`.
    Collinear { p1: String, p2: String, p3: String },
}

impl ConstraintKind {
    /// Ids of referenced points, in declaration order.
    fn point_refs(&self) -> Vec<&str> {
        match self {
            Self::Distance { p1, p2, .. } | Self::Coincident { p1, p2 } => {
                vec![p1.as_str(), p2.as_str()]
            }
            Self::Angle { p1, vertex, p2, .. } => vec![p1.as_str(), vertex.as_str(), p2.as_str()],
            Self::PointOnLine { point, .. } | Self::Midpoint { point, .. } => vec![point.as_str()],
            Self::Collinear { p1, p2, p3 } => vec![p1.as_str(), p2.as_str(), p3.as_str()],
            Self::Horizontal { .. }
            | Self::Vertical { .. }
            | Self::Perpendicular { .. }
            | Self::Parallel { .. }
            | Self::EqualLength { .. } => Vec::new(),
        }
    }

    /// Ids of referenced lines, in declaration order.
    fn line_refs(&self) -> Vec<&str> {
        match self {
            Self::Horizontal { line }
            | Self::Vertical { line }
            | Self::PointOnLine { line, .. }
            | Self::Midpoint { line, .. } => vec![line.as_str()],
            Self::Perpendicular { l1, l2 }
            | Self::Parallel { l1, l2 }
            | Self::EqualLength { l1, l2 } => vec![l1.as_str(), l2.as_str()],
            Self::Distance { .. }
            | Self::Coincident { .. }
            | Self::Angle { .. }
            | Self::Collinear { .. } => Vec::new(),
        }
    }
}

/// A named constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintPrimitive {
    pub id: String,
    pub kind: ConstraintKind,
}

/// Any sketch element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "primitive", rename_all = "snake_case"))]
pub enum Primitive {
    Point(PointPrimitive),
    Line(LinePrimitive),
    Constraint(ConstraintPrimitive),
}

impl Primitive {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Point(p) => &p.id,
            Self::Line(l) => &l.id,
            Self::Constraint(c) => &c.id,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::Line(_) => "line",
            Self::Constraint(_) => "constraint",
        }
    }
}

/// An ordered collection of primitives. Constraint order is the order in
/// which the solver applies them.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sketch {
    primitives: Vec<Primitive>,
}

impl Sketch {
    /// Creates an empty sketch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing primitive list without validating it.
    #[must_use]
    pub fn from_primitives(primitives: Vec<Primitive>) -> Self {
        Self { primitives }
    }

    pub fn push(&mut self, primitive: Primitive) -> &mut Self {
        self.primitives.push(primitive);
        self
    }

    pub fn add_point(&mut self, id: &str, x: f64, y: f64, fixed: bool) -> &mut Self {
        self.push(Primitive::Point(PointPrimitive {
            id: id.to_owned(),
            x,
            y,
            fixed,
        }))
    }

    pub fn add_line(&mut self, id: &str, p1: &str, p2: &str) -> &mut Self {
        self.push(Primitive::Line(LinePrimitive {
            id: id.to_owned(),
            p1: p1.to_owned(),
            p2: p2.to_owned(),
        }))
    }

    pub fn add_constraint(&mut self, id: &str, kind: ConstraintKind) -> &mut Self {
        self.push(Primitive::Constraint(ConstraintPrimitive {
            id: id.to_owned(),
            kind,
        }))
    }

    #[must_use]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.id() == id)
    }

    /// Returns the point with the given id, if it exists and is a point.
    #[must_use]
    pub fn point(&self, id: &str) -> Option<&PointPrimitive> {
        match self.get(id) {
            Some(Primitive::Point(p)) => Some(p),
            _ => None,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &PointPrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Point(pt) => Some(pt),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &LinePrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line(l) => Some(l),
            _ => None,
        })
    }

    pub fn constraints(&self) -> impl Iterator<Item = &ConstraintPrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Constraint(c) => Some(c),
            _ => None,
        })
    }

    pub(crate) fn points_mut(&mut self) -> impl Iterator<Item = &mut PointPrimitive> {
        self.primitives.iter_mut().filter_map(|p| match p {
            Primitive::Point(pt) => Some(pt),
            _ => None,
        })
    }

    /// Checks that ids are unique and every reference resolves to a primitive
    /// of the expected kind.
    ///
    /// # Errors
    ///
    /// Returns the first [`SketchError`] found, in primitive order.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for p in &self.primitives {
            if !seen.insert(p.id()) {
                return Err(SketchError::DuplicateId(p.id().to_owned()).into());
            }
        }

        for p in &self.primitives {
            match p {
                Primitive::Point(_) => {}
                Primitive::Line(l) => {
                    self.expect_kind(&l.id, &l.p1, "point")?;
                    self.expect_kind(&l.id, &l.p2, "point")?;
                }
                Primitive::Constraint(c) => {
                    for target in c.kind.point_refs() {
                        self.expect_kind(&c.id, target, "point")?;
                    }
                    for target in c.kind.line_refs() {
                        self.expect_kind(&c.id, target, "line")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn expect_kind(&self, owner: &str, target: &str, expected: &'static str) -> Result<()> {
        match self.get(target) {
            None => Err(SketchError::UnknownReference {
                owner: owner.to_owned(),
                target: target.to_owned(),
            }
            .into()),
            Some(p) if p.kind_name() != expected => Err(SketchError::WrongKind {
                owner: owner.to_owned(),
                target: target.to_owned(),
                expected,
            }
            .into()),
            Some(_) => Ok(()),
        }
    }
}

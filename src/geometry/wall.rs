use std::fmt;

use crate::math::Point2;

/// Thickness of the standard interior wall, in plan units (cm).
pub const STANDARD_INTERIOR_THICKNESS: f64 = 15.0;

/// Distance from a room's floor boundary to its wall centerline.
///
/// Half the standard interior thickness, independent of the actual wall type,
/// so two rooms separated by a standard wall share one centerline.
pub const CENTERLINE_OFFSET: f64 = STANDARD_INTERIOR_THICKNESS / 2.0;

/// Positional tolerance for treating two room edges or vertices as shared.
pub const MATCH_TOLERANCE: f64 = 0.5;

/// Construction type of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WallType {
    Exterior,
    InteriorDivision,
    InteriorStructural,
    InteriorPartition,
    TerrainContact,
    Adiabatic,
}

impl WallType {
    fn index(self) -> usize {
        match self {
            Self::Exterior => 0,
            Self::InteriorDivision => 1,
            Self::InteriorStructural => 2,
            Self::InteriorPartition => 3,
            Self::TerrainContact => 4,
            Self::Adiabatic => 5,
        }
    }
}

impl fmt::Display for WallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exterior => "exterior",
            Self::InteriorDivision => "interior_division",
            Self::InteriorStructural => "interior_structural",
            Self::InteriorPartition => "interior_partition",
            Self::TerrainContact => "terrain_contact",
            Self::Adiabatic => "adiabatic",
        };
        f.write_str(name)
    }
}

/// Wall thickness per [`WallType`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallThicknessTable {
    thickness: [f64; 6],
}

impl Default for WallThicknessTable {
    fn default() -> Self {
        Self {
            thickness: [30.0, STANDARD_INTERIOR_THICKNESS, 25.0, 10.0, 35.0, 20.0],
        }
    }
}

impl WallThicknessTable {
    /// Returns the thickness of the given wall type.
    #[must_use]
    pub fn thickness(&self, wall_type: WallType) -> f64 {
        self.thickness[wall_type.index()]
    }

    /// Overrides the thickness of one wall type.
    #[must_use]
    pub fn with_thickness(mut self, wall_type: WallType, thickness: f64) -> Self {
        self.thickness[wall_type.index()] = thickness;
        self
    }
}

/// Kind of opening cut into a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ApertureKind {
    Door,
    Window,
}

/// Which wall end an aperture's `distance` is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnchorVertex {
    Start,
    End,
}

/// A door or window positioned along a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aperture {
    pub kind: ApertureKind,
    pub width: f64,
    /// Distance from the anchor end to the near side of the opening.
    pub distance: f64,
    pub anchor: AnchorVertex,
}

impl Aperture {
    #[must_use]
    pub fn door(width: f64, distance: f64, anchor: AnchorVertex) -> Self {
        Self {
            kind: ApertureKind::Door,
            width,
            distance,
            anchor,
        }
    }

    #[must_use]
    pub fn window(width: f64, distance: f64, anchor: AnchorVertex) -> Self {
        Self {
            kind: ApertureKind::Window,
            width,
            distance,
            anchor,
        }
    }

    /// Start and end offsets of the opening, measured from the wall start.
    #[must_use]
    pub fn span_along(&self, wall_length: f64) -> (f64, f64) {
        match self.anchor {
            AnchorVertex::Start => (self.distance, self.distance + self.width),
            AnchorVertex::End => {
                let end = wall_length - self.distance;
                (end - self.width, end)
            }
        }
    }
}

/// Per-edge attributes of a room's floor polygon.
///
/// Edge `i` runs from floor vertex `i` to vertex `i + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSpec {
    /// Forces a wall type instead of the interior/exterior classification.
    pub wall_type: Option<WallType>,
    pub apertures: Vec<Aperture>,
}

/// An aperture resolved onto a built wall.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedAperture {
    pub aperture: Aperture,
    /// Offset of the opening start from the wall start.
    pub start: f64,
    /// Offset of the opening end from the wall start.
    pub end: f64,
    /// Opening endpoints on the wall centerline.
    pub points: [Point2; 2],
}

/// Whether a wall faces another room or the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WallSide {
    Interior,
    Exterior,
}

/// Solid geometry of one wall: `[inner_start, inner_end, outer_end, outer_start]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallQuad {
    /// Index of the floor edge this wall was built from.
    pub edge: usize,
    pub corners: [Point2; 4],
    pub side: WallSide,
    pub wall_type: WallType,
    pub thickness: f64,
    pub apertures: Vec<PlacedAperture>,
}

impl WallQuad {
    #[must_use]
    pub fn inner_start(&self) -> Point2 {
        self.corners[0]
    }

    #[must_use]
    pub fn inner_end(&self) -> Point2 {
        self.corners[1]
    }

    #[must_use]
    pub fn outer_end(&self) -> Point2 {
        self.corners[2]
    }

    #[must_use]
    pub fn outer_start(&self) -> Point2 {
        self.corners[3]
    }
}

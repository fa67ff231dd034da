use tracing::trace;

use super::transform::Transform2;
use super::wall::{AnchorVertex, Aperture, EdgeSpec, WallThicknessTable, WallType, CENTERLINE_OFFSET};
use crate::error::{Result, TopologyError};
use crate::math::polygon_2d::{is_ccw, signed_area_2d};
use crate::math::{Point2, Vector2};
use crate::operations::offset::offset_polygon;
use crate::operations::validate::validate_polygon;

/// A room: a counter-clockwise floor polygon in room-local coordinates, its
/// placement in the plan, and per-edge wall attributes.
///
/// The centerline and external polygons are derived from the floor polygon
/// and recomputed on every committed edit, so they always have the same
/// vertex count as the floor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    floor: Vec<Point2>,
    edges: Vec<EdgeSpec>,
    transform: Transform2,
    exterior_thickness: f64,
    centerline: Vec<Point2>,
    external: Vec<Point2>,
}

impl Room {
    /// Creates a room from its floor polygon.
    ///
    /// Clockwise input is reversed to counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if the polygon is not a valid room boundary.
    pub fn new(
        floor: Vec<Point2>,
        transform: Transform2,
        thickness: &WallThicknessTable,
    ) -> Result<Self> {
        let floor = normalized(floor)?;
        let mut room = Self {
            edges: vec![EdgeSpec::default(); floor.len()],
            floor,
            transform,
            exterior_thickness: thickness.thickness(WallType::Exterior),
            centerline: Vec::new(),
            external: Vec::new(),
        };
        room.refresh_derived();
        Ok(room)
    }

    /// Axis-aligned rectangle with its lower-left corner at the local origin.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` or `height` is zero.
    pub fn rectangle(
        width: f64,
        height: f64,
        transform: Transform2,
        thickness: &WallThicknessTable,
    ) -> Result<Self> {
        let floor = vec![
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(width, height),
            Point2::new(0.0, height),
        ];
        Self::new(floor, transform, thickness)
    }

    /// Floor polygon in room-local coordinates.
    #[must_use]
    pub fn floor_polygon(&self) -> &[Point2] {
        &self.floor
    }

    /// Wall centerline polygon in room-local coordinates.
    #[must_use]
    pub fn centerline_polygon(&self) -> &[Point2] {
        &self.centerline
    }

    /// Outer wall face polygon in room-local coordinates.
    #[must_use]
    pub fn external_polygon(&self) -> &[Point2] {
        &self.external
    }

    #[must_use]
    pub fn world_floor_polygon(&self) -> Vec<Point2> {
        self.transform.polygon_to_world(&self.floor)
    }

    #[must_use]
    pub fn world_centerline_polygon(&self) -> Vec<Point2> {
        self.transform.polygon_to_world(&self.centerline)
    }

    #[must_use]
    pub fn world_external_polygon(&self) -> Vec<Point2> {
        self.transform.polygon_to_world(&self.external)
    }

    #[must_use]
    pub fn transform(&self) -> &Transform2 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform2) {
        self.transform = transform;
    }

    /// Moves the room in the world frame.
    pub fn translate(&mut self, delta: &Vector2) {
        self.transform = self.transform.translated(delta);
    }

    /// Floor area (always positive for a committed room).
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.floor)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.floor.len()
    }

    #[must_use]
    pub fn edge_specs(&self) -> &[EdgeSpec] {
        &self.edges
    }

    /// Replaces the attributes of floor edge `index`.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::IndexOutOfRange` for an unknown edge.
    pub fn set_edge_spec(&mut self, index: usize, spec: EdgeSpec) -> Result<()> {
        let len = self.edges.len();
        let slot = self
            .edges
            .get_mut(index)
            .ok_or(TopologyError::IndexOutOfRange { index, len })?;
        *slot = spec;
        Ok(())
    }

    /// Replaces the whole floor polygon.
    ///
    /// Edge attributes survive when the vertex count and winding are
    /// unchanged; otherwise every edge resets to the default.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] and leaves the room untouched if the new
    /// polygon is invalid.
    pub fn set_floor_polygon(&mut self, floor: Vec<Point2>) -> Result<()> {
        let keep_edges = floor.len() == self.floor.len() && is_ccw(&floor);
        let floor = normalized(floor)?;
        if !keep_edges {
            self.edges = vec![EdgeSpec::default(); floor.len()];
        }
        self.floor = floor;
        self.refresh_derived();
        Ok(())
    }

    /// Moves one floor vertex.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] and leaves the room untouched if the index
    /// is out of range or the edit would make the polygon invalid.
    pub fn move_vertex(&mut self, index: usize, position: Point2) -> Result<()> {
        let len = self.floor.len();
        if index >= len {
            return Err(TopologyError::IndexOutOfRange { index, len }.into());
        }
        let mut candidate = self.floor.clone();
        candidate[index] = position;
        validate_polygon(&candidate)?;
        if !is_ccw(&candidate) {
            return Err(TopologyError::WindingFlipped.into());
        }
        self.floor = candidate;
        self.refresh_derived();
        Ok(())
    }

    /// Inserts a vertex so that it becomes vertex `index`, splitting the edge
    /// that previously ended at that position.
    ///
    /// Both halves of the split edge keep its wall type. Apertures anchored
    /// at the edge's end vertex move to the second half, so their distance
    /// stays measured from the same corner; the others stay on the first.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] and leaves the room untouched if `index`
    /// is greater than the vertex count or the result is invalid.
    pub fn insert_vertex(&mut self, index: usize, position: Point2) -> Result<()> {
        let len = self.floor.len();
        if index > len {
            return Err(TopologyError::IndexOutOfRange { index, len }.into());
        }
        let mut candidate = self.floor.clone();
        candidate.insert(index, position);
        validate_polygon(&candidate)?;

        let split = (index + len - 1) % len;
        let (second, first): (Vec<Aperture>, Vec<Aperture>) = self.edges[split]
            .apertures
            .iter()
            .copied()
            .partition(|a| matches!(a.anchor, AnchorVertex::End));
        self.edges[split].apertures = first;
        let inherited = EdgeSpec {
            wall_type: self.edges[split].wall_type,
            apertures: second,
        };
        self.edges.insert(index, inherited);
        self.floor = candidate;
        trace!(index, x = position.x, y = position.y, "inserted floor vertex");
        self.refresh_derived();
        Ok(())
    }

    /// Removes vertex `index`, merging its two edges into the earlier one.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] and leaves the room untouched if the index
    /// is out of range or fewer than 3 vertices would remain.
    pub fn remove_vertex(&mut self, index: usize) -> Result<()> {
        let len = self.floor.len();
        if index >= len {
            return Err(TopologyError::IndexOutOfRange { index, len }.into());
        }
        let mut candidate = self.floor.clone();
        candidate.remove(index);
        validate_polygon(&candidate)?;
        self.edges.remove(index);
        self.floor = candidate;
        self.refresh_derived();
        Ok(())
    }

    fn refresh_derived(&mut self) {
        self.centerline = offset_polygon(&self.floor, CENTERLINE_OFFSET);
        self.external = offset_polygon(&self.floor, self.exterior_thickness);
    }
}

fn normalized(floor: Vec<Point2>) -> Result<Vec<Point2>> {
    validate_polygon(&floor)?;
    let mut floor = floor;
    if !is_ccw(&floor) {
        floor.reverse();
    }
    Ok(floor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn room(w: f64, h: f64) -> Room {
        Room::rectangle(w, h, Transform2::identity(), &WallThicknessTable::default()).unwrap()
    }

    #[test]
    fn derived_polygons_follow_floor() {
        let r = room(400.0, 300.0);
        assert_eq!(r.centerline_polygon().len(), 4);
        assert_abs_diff_eq!(r.centerline_polygon()[0].x, -CENTERLINE_OFFSET, epsilon = 1e-9);
        assert_abs_diff_eq!(r.external_polygon()[2].x, 430.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.external_polygon()[2].y, 330.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_floor_is_reversed() {
        let floor = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
        ];
        let r = Room::new(floor, Transform2::identity(), &WallThicknessTable::default()).unwrap();
        assert!(r.area() > 0.0);
    }

    #[test]
    fn invalid_move_keeps_previous_state() {
        let mut r = room(10.0, 10.0);
        let before = r.floor_polygon().to_vec();
        // Dragging vertex 1 across the opposite edge makes a bowtie.
        assert!(r.move_vertex(1, Point2::new(-5.0, 5.0)).is_err());
        assert_eq!(r.floor_polygon(), before.as_slice());
        assert!(r.move_vertex(9, Point2::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn move_vertex_recomputes_centerline() {
        let mut r = room(10.0, 10.0);
        r.move_vertex(2, Point2::new(20.0, 10.0)).unwrap();
        let plain = offset_polygon(r.floor_polygon(), CENTERLINE_OFFSET);
        assert_eq!(r.centerline_polygon(), plain.as_slice());
    }

    #[test]
    fn insert_vertex_splits_edge_spec() {
        let mut r = room(200.0, 100.0);
        r.set_edge_spec(
            0,
            EdgeSpec {
                wall_type: Some(WallType::Adiabatic),
                apertures: vec![
                    Aperture::door(80.0, 10.0, AnchorVertex::Start),
                    Aperture::window(40.0, 20.0, AnchorVertex::End),
                ],
            },
        )
        .unwrap();
        r.insert_vertex(1, Point2::new(100.0, 0.0)).unwrap();
        assert_eq!(r.vertex_count(), 5);
        assert_eq!(r.centerline_polygon().len(), 5);
        let specs = r.edge_specs();
        assert_eq!(specs[0].apertures.len(), 1);
        assert_eq!(specs[0].apertures[0].anchor, AnchorVertex::Start);
        assert_eq!(specs[1].wall_type, Some(WallType::Adiabatic));
        assert_eq!(specs[1].apertures.len(), 1);
        assert_eq!(specs[1].apertures[0].anchor, AnchorVertex::End);
    }

    #[test]
    fn end_anchored_aperture_keeps_its_corner() {
        let mut r = room(200.0, 100.0);
        let window = Aperture::window(40.0, 20.0, AnchorVertex::End);
        r.set_edge_spec(
            0,
            EdgeSpec {
                wall_type: None,
                apertures: vec![window],
            },
        )
        .unwrap();
        let before = r.centerline_polygon()[1];
        r.insert_vertex(1, Point2::new(100.0, 0.0)).unwrap();
        // The window still ends 20 units short of the (200,0) corner, now
        // measured on the second half of the split edge.
        assert_eq!(r.edge_specs()[1].apertures, vec![window]);
        assert_abs_diff_eq!(r.centerline_polygon()[2], before, epsilon = 1e-9);
    }

    #[test]
    fn remove_vertex_needs_three_left() {
        let mut r = room(10.0, 10.0);
        r.insert_vertex(1, Point2::new(5.0, 0.0)).unwrap();
        r.remove_vertex(1).unwrap();
        assert_eq!(r.vertex_count(), 4);
        let mut tri = Room::new(
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
            Transform2::identity(),
            &WallThicknessTable::default(),
        )
        .unwrap();
        assert!(tri.remove_vertex(0).is_err());
    }

    #[test]
    fn world_polygons_use_transform() {
        let mut r = room(10.0, 10.0);
        r.translate(&Vector2::new(100.0, 0.0));
        assert_abs_diff_eq!(r.world_floor_polygon()[0].x, 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.floor_polygon()[0].x, 0.0, epsilon = 1e-12);
    }
}

//! Arena of rooms that keeps wall geometry in step with room edits.

use slotmap::{SecondaryMap, SlotMap};
use tracing::debug;

use crate::error::{OperationError, Result, TopologyError};
use crate::geometry::{EdgeSpec, Room, Transform2, WallThicknessTable, MATCH_TOLERANCE};
use crate::math::polygon_2d::is_ccw;
use crate::math::{Point2, Vector2};
use crate::operations::join::{are_rooms_adjacent, join_rooms};
use crate::operations::snap::{compute_snap, SnapResult, SnapThresholds};
use crate::operations::walls::{build_walls, WallBuild};
use crate::sketch::{read_polygon, SolveOutcome, SolveSketch, SolverOptions, Sketch};

slotmap::new_key_type! {
    /// Unique identifier for a room in a floor plan.
    pub struct RoomId;
}

/// Owns the rooms of a floor plan and their built walls.
///
/// Every mutation validates before committing. After a commit the walls of
/// the edited room are rebuilt from scratch, together with those of every
/// room adjacent to it before or after the edit.
#[derive(Debug)]
pub struct FloorPlan {
    rooms: SlotMap<RoomId, Room>,
    walls: SecondaryMap<RoomId, WallBuild>,
    thickness: WallThicknessTable,
    tolerance: f64,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorPlan {
    /// Creates an empty plan with default wall thicknesses.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: SlotMap::with_key(),
            walls: SecondaryMap::new(),
            thickness: WallThicknessTable::default(),
            tolerance: MATCH_TOLERANCE,
        }
    }

    #[must_use]
    pub fn with_thickness(mut self, thickness: WallThicknessTable) -> Self {
        self.thickness = thickness;
        self
    }

    /// Overrides the tolerance used for adjacency and vertex joining.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn thickness(&self) -> &WallThicknessTable {
        &self.thickness
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, &Room)> {
        self.rooms.iter()
    }

    /// Adds a room and builds its walls.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if the floor polygon is invalid.
    pub fn add_room(&mut self, floor: Vec<Point2>, transform: Transform2) -> Result<RoomId> {
        let room = Room::new(floor, transform, &self.thickness)?;
        let id = self.rooms.insert(room);
        let after = self.neighbors(id)?;
        self.rebuild(id, &[], &after);
        Ok(id)
    }

    /// Removes a room and rebuilds the walls of its former neighbors.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the room does not exist.
    pub fn remove_room(&mut self, id: RoomId) -> Result<Room> {
        let before = self.neighbors(id)?;
        let room = self.rooms.remove(id).ok_or_else(not_found)?;
        self.walls.remove(id);
        for n in before {
            self.rebuild_one(n);
        }
        debug!(remaining = self.rooms.len(), "removed room");
        Ok(room)
    }

    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the room does not exist.
    pub fn room(&self, id: RoomId) -> Result<&Room> {
        Ok(self.rooms.get(id).ok_or_else(not_found)?)
    }

    /// Built walls of a room.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the room does not exist.
    pub fn walls(&self, id: RoomId) -> Result<&WallBuild> {
        Ok(self.walls.get(id).ok_or_else(not_found)?)
    }

    /// Rooms sharing a centerline edge with `id`.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the room does not exist.
    pub fn adjacent_rooms(&self, id: RoomId) -> Result<Vec<RoomId>> {
        self.neighbors(id)
    }

    /// Replaces a room's floor polygon.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the plan untouched if the room does not
    /// exist or the polygon is invalid.
    pub fn set_floor_polygon(&mut self, id: RoomId, floor: Vec<Point2>) -> Result<()> {
        self.edit(id, |room| room.set_floor_polygon(floor))
    }

    /// Moves one floor vertex of a room.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the plan untouched if the room does not
    /// exist or the edit is invalid.
    pub fn move_vertex(&mut self, id: RoomId, index: usize, position: Point2) -> Result<()> {
        self.edit(id, |room| room.move_vertex(index, position))
    }

    /// Replaces the attributes of one floor edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the room or edge does not exist.
    pub fn set_edge_spec(&mut self, id: RoomId, index: usize, spec: EdgeSpec) -> Result<()> {
        self.edit(id, |room| room.set_edge_spec(index, spec))
    }

    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the room does not exist.
    pub fn set_transform(&mut self, id: RoomId, transform: Transform2) -> Result<()> {
        self.edit(id, |room| {
            room.set_transform(transform);
            Ok(())
        })
    }

    /// Computes a snap for dragging room `id` by `offset` against every other
    /// room. The plan is not modified.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the room does not exist.
    pub fn snap_room(
        &self,
        id: RoomId,
        offset: &Vector2,
        thresholds: &SnapThresholds,
    ) -> Result<SnapResult> {
        let moving = self.room(id)?.world_floor_polygon();
        let stationary: Vec<Vec<Point2>> = self
            .rooms
            .iter()
            .filter(|(k, _)| *k != id)
            .map(|(_, r)| r.world_floor_polygon())
            .collect();
        Ok(compute_snap(&moving, offset, &stationary, thresholds))
    }

    /// Commits a drag: moves room `id` by `offset`, then applies the snap
    /// rotation and translation.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the room does not exist.
    pub fn apply_snap(&mut self, id: RoomId, offset: &Vector2, snap: &SnapResult) -> Result<()> {
        self.edit(id, |room| {
            let placed = room
                .transform()
                .translated(offset)
                .rotated_about(&snap.pivot, snap.rotation)
                .translated(&snap.translation);
            room.set_transform(placed);
            Ok(())
        })
    }

    /// Injects T-junction vertices between two rooms.
    ///
    /// Edge attributes survive: each injected vertex splits an edge the way
    /// [`Room::insert_vertex`] does. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if `a == b`, or an error if a
    /// room does not exist or an injection would make a polygon invalid; in
    /// that case neither room changes.
    pub fn join_rooms(&mut self, a: RoomId, b: RoomId) -> Result<bool> {
        if a == b {
            return Err(OperationError::InvalidInput("cannot join a room with itself".into()).into());
        }
        let (ra, rb) = (self.room(a)?, self.room(b)?);
        let outcome = join_rooms(ra, rb, self.tolerance);
        if !outcome.modified {
            return Ok(false);
        }

        let mut new_a = ra.clone();
        for (index, p) in &outcome.injected_a {
            new_a.insert_vertex(*index, *p)?;
        }
        let mut new_b = rb.clone();
        for (index, p) in &outcome.injected_b {
            new_b.insert_vertex(*index, *p)?;
        }

        let before = self.neighbors_of_all(&[a, b])?;
        self.rooms[a] = new_a;
        self.rooms[b] = new_b;
        let after = self.neighbors_of_all(&[a, b])?;
        self.rebuild(a, &before, &after);
        self.rebuild_one(b);
        Ok(true)
    }

    /// Solves a sketch of room `id`'s floor polygon and commits the result.
    ///
    /// The sketch must name the polygon vertices `p0..p{n-1}` as produced by
    /// [`crate::sketch::polygon_sketch`]. The polygon is only committed when
    /// the solve converges; otherwise the outcome is returned with the room
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the room does not exist, the sketch is malformed,
    /// or the solved polygon is invalid. A solve that mirrors the polygon
    /// into clockwise order is rejected with [`TopologyError::WindingFlipped`].
    /// The room is left unchanged in every error case.
    pub fn solve_room(
        &mut self,
        id: RoomId,
        sketch: &Sketch,
        options: SolverOptions,
    ) -> Result<SolveOutcome> {
        let count = self.room(id)?.vertex_count();
        let outcome = SolveSketch::new(sketch).with_options(options).execute()?;
        if outcome.success {
            let polygon = read_polygon(&outcome.sketch, count)?;
            if !is_ccw(&polygon) {
                return Err(TopologyError::WindingFlipped.into());
            }
            self.set_floor_polygon(id, polygon)?;
        }
        Ok(outcome)
    }

    fn edit<F>(&mut self, id: RoomId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Room) -> Result<()>,
    {
        let before = self.neighbors(id)?;
        let room = self.rooms.get_mut(id).ok_or_else(not_found)?;
        f(room)?;
        let after = self.neighbors(id)?;
        self.rebuild(id, &before, &after);
        Ok(())
    }

    fn neighbors(&self, id: RoomId) -> Result<Vec<RoomId>> {
        let room = self.rooms.get(id).ok_or_else(not_found)?;
        Ok(self
            .rooms
            .iter()
            .filter(|(k, other)| *k != id && are_rooms_adjacent(room, other, self.tolerance))
            .map(|(k, _)| k)
            .collect())
    }

    fn neighbors_of_all(&self, ids: &[RoomId]) -> Result<Vec<RoomId>> {
        let mut out = Vec::new();
        for id in ids {
            for n in self.neighbors(*id)? {
                if !out.contains(&n) {
                    out.push(n);
                }
            }
        }
        Ok(out)
    }

    /// Rebuilds `id` and every room in `before` or `after`.
    fn rebuild(&mut self, id: RoomId, before: &[RoomId], after: &[RoomId]) {
        let mut affected = vec![id];
        for n in before.iter().chain(after) {
            if !affected.contains(n) {
                affected.push(*n);
            }
        }
        for room in &affected {
            self.rebuild_one(*room);
        }
        debug!(rooms = affected.len(), "rebuilt walls");
    }

    fn rebuild_one(&mut self, id: RoomId) {
        let Some(room) = self.rooms.get(id) else {
            return;
        };
        let others: Vec<&Room> = self
            .rooms
            .iter()
            .filter(|(k, _)| *k != id)
            .map(|(_, r)| r)
            .collect();
        let build = build_walls(room, &self.thickness, &others);
        self.walls.insert(id, build);
    }
}

fn not_found() -> TopologyError {
    TopologyError::EntityNotFound("room".into())
}

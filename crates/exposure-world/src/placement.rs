//! Spawning, dragging, and committing placeable units.
//!
//! The controller owns at most one held unit. While held, the unit follows
//! the cursor reported by a [`PlacementSurface`]. Committing checks the
//! surface, mints a [`UnitId`], and moves the unit into the placed-unit
//! registry. The host answers spatial questions; this module never does
//! geometry beyond what [`PlotGrid`] offers as a reference surface.

use std::collections::BTreeMap;

use exposure_types::{EntityTag, UnitId, UnitKind, Vec3};
use tracing::{debug, info};

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Surface contract
// ---------------------------------------------------------------------------

/// What lies under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorHit {
    /// Nothing the game cares about.
    Nothing,
    /// Open ground at the given position.
    Ground(Vec3),
    /// A unit that has already been placed.
    Unit(UnitId),
    /// A tagged interactive entity (message box, remove confirmation).
    Tagged(EntityTag),
}

/// Spatial queries the host answers for the placement controller.
pub trait PlacementSurface {
    /// World position under the cursor, if the cursor is over the world.
    fn cursor_position(&self) -> Option<Vec3>;

    /// Whether a unit may be committed at `position`.
    fn can_place_at(&self, position: Vec3) -> bool;

    /// The entity under the cursor.
    fn hit_under_cursor(&self) -> CursorHit;

    /// Called after a unit was committed at `position`.
    fn unit_committed(&mut self, _id: UnitId, _position: Vec3) {}

    /// Called after a placed unit was removed.
    fn unit_removed(&mut self, _id: UnitId) {}
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// The unit currently attached to the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldUnit {
    /// What is being placed.
    pub kind: UnitKind,
    /// Where it is drawn right now.
    pub position: Vec3,
}

/// A committed unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedUnit {
    /// Registry handle.
    pub id: UnitId,
    /// Unit kind.
    pub kind: UnitKind,
    /// Where it stands.
    pub position: Vec3,
}

/// Owner of the held unit and the placed-unit registry.
#[derive(Debug, Clone, Default)]
pub struct UnitPlacementController {
    held: Option<HeldUnit>,
    placed: BTreeMap<UnitId, PlacedUnit>,
    spawn_point: Vec3,
}

impl UnitPlacementController {
    /// Create a controller whose new units appear at `spawn_point`.
    pub fn new(spawn_point: Vec3) -> Self {
        Self {
            held: None,
            placed: BTreeMap::new(),
            spawn_point,
        }
    }

    /// Attach a fresh unit of `kind` to the cursor, replacing any held one.
    pub fn spawn(&mut self, kind: UnitKind) {
        if let Some(previous) = self.held.take() {
            debug!(kind = ?previous.kind, "Held unit discarded by new spawn");
        }
        self.held = Some(HeldUnit {
            kind,
            position: self.spawn_point,
        });
        debug!(?kind, "Unit spawned");
    }

    /// Move the held unit to the cursor. Does nothing when nothing is held
    /// or the cursor is off the world.
    pub fn follow_cursor<S: PlacementSurface + ?Sized>(&mut self, surface: &S) {
        if let Some(held) = self.held.as_mut()
            && let Some(position) = surface.cursor_position()
        {
            held.position = position;
        }
    }

    /// Commit the held unit at the cursor.
    ///
    /// Returns `Ok(None)` when the surface refuses the spot; the unit stays
    /// held in that case.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NothingHeld`] when no unit is held.
    pub fn try_commit_at_cursor<S: PlacementSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<Option<UnitId>, WorldError> {
        let held = self.held.ok_or(WorldError::NothingHeld)?;
        let position = surface.cursor_position().unwrap_or(held.position);
        if !surface.can_place_at(position) {
            debug!(kind = ?held.kind, "Placement refused by surface");
            return Ok(None);
        }

        let id = UnitId::new();
        self.held = None;
        self.placed.insert(
            id,
            PlacedUnit {
                id,
                kind: held.kind,
                position,
            },
        );
        surface.unit_committed(id, position);
        info!(unit_id = %id, kind = ?held.kind, "Unit placed");
        Ok(Some(id))
    }

    /// Drop the held unit without placing it. Returns what was dropped.
    pub fn cancel(&mut self) -> Option<HeldUnit> {
        let dropped = self.held.take();
        if let Some(unit) = &dropped {
            debug!(kind = ?unit.kind, "Placement cancelled");
        }
        dropped
    }

    /// Type index of the held unit, `0` when nothing is held.
    pub fn type_index(&self) -> u8 {
        self.held.map_or(0, |unit| unit.kind.type_index())
    }

    /// The held unit, if any.
    pub const fn held(&self) -> Option<&HeldUnit> {
        self.held.as_ref()
    }

    /// Remove a placed unit from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnitNotFound`] if `id` is not registered.
    pub fn remove<S: PlacementSurface + ?Sized>(
        &mut self,
        id: UnitId,
        surface: &mut S,
    ) -> Result<PlacedUnit, WorldError> {
        let unit = self.placed.remove(&id).ok_or(WorldError::UnitNotFound(id))?;
        surface.unit_removed(id);
        info!(unit_id = %id, kind = ?unit.kind, "Unit removed");
        Ok(unit)
    }

    /// Look up a placed unit.
    pub fn get(&self, id: UnitId) -> Option<&PlacedUnit> {
        self.placed.get(&id)
    }

    /// All placed units.
    pub fn placed(&self) -> impl Iterator<Item = &PlacedUnit> {
        self.placed.values()
    }

    /// Number of placed units.
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }
}

// ---------------------------------------------------------------------------
// Reference surface
// ---------------------------------------------------------------------------

/// A rectangular grid of plots on the ground plane (x/y), one unit per plot.
///
/// Used by the headless host and by tests. The cursor is set explicitly
/// since there is no pointer.
#[derive(Debug, Clone)]
pub struct PlotGrid {
    origin: Vec3,
    cell_size: f32,
    columns: u32,
    rows: u32,
    cursor: Option<Vec3>,
    occupied: BTreeMap<(u32, u32), UnitId>,
    tags: Vec<(EntityTag, Vec3, f32)>,
}

impl PlotGrid {
    /// Create an empty grid whose cell `(0, 0)` starts at `origin`.
    pub fn new(origin: Vec3, cell_size: f32, columns: u32, rows: u32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            origin,
            cell_size,
            columns,
            rows,
            cursor: None,
            occupied: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Point the cursor at a world position (or off the world).
    pub const fn set_cursor(&mut self, position: Option<Vec3>) {
        self.cursor = position;
    }

    /// Point the cursor at the centre of a cell.
    pub fn point_at_cell(&mut self, column: u32, row: u32) {
        self.cursor = Some(self.cell_centre(column, row));
    }

    /// World position of a cell's centre.
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_centre(&self, column: u32, row: u32) -> Vec3 {
        let half = self.cell_size / 2.0;
        self.origin
            + Vec3::new(
                (column as f32).mul_add(self.cell_size, half),
                (row as f32).mul_add(self.cell_size, half),
                0.0,
            )
    }

    /// Show a tagged entity at `position`, clickable within `radius`.
    pub fn show_tag(&mut self, tag: EntityTag, position: Vec3, radius: f32) {
        self.hide_tag(tag);
        self.tags.push((tag, position, radius.max(0.0)));
    }

    /// Hide a tagged entity.
    pub fn hide_tag(&mut self, tag: EntityTag) {
        self.tags.retain(|(existing, _, _)| *existing != tag);
    }

    /// First free cell in row-major order.
    pub fn first_free_cell(&self) -> Option<(u32, u32)> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| (column, row)))
            .find(|cell| !self.occupied.contains_key(cell))
    }

    /// Cell of a placed unit.
    pub fn cell_of_unit(&self, id: UnitId) -> Option<(u32, u32)> {
        self.occupied
            .iter()
            .find_map(|(cell, occupant)| (*occupant == id).then_some(*cell))
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Grid cell containing `position`, if inside the grid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell_at(&self, position: Vec3) -> Option<(u32, u32)> {
        let local = (position - self.origin) / self.cell_size;
        if !local.x.is_finite() || !local.y.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let column = local.x.floor() as u32;
        let row = local.y.floor() as u32;
        (column < self.columns && row < self.rows).then_some((column, row))
    }
}

impl PlacementSurface for PlotGrid {
    fn cursor_position(&self) -> Option<Vec3> {
        self.cursor
    }

    fn can_place_at(&self, position: Vec3) -> bool {
        self.cell_at(position)
            .is_some_and(|cell| !self.occupied.contains_key(&cell))
    }

    fn hit_under_cursor(&self) -> CursorHit {
        let Some(cursor) = self.cursor else {
            return CursorHit::Nothing;
        };
        if let Some((tag, _, _)) = self
            .tags
            .iter()
            .find(|(_, position, radius)| position.distance(cursor) <= *radius)
        {
            return CursorHit::Tagged(*tag);
        }
        match self.cell_at(cursor) {
            Some(cell) => self
                .occupied
                .get(&cell)
                .map_or(CursorHit::Ground(cursor), |id| CursorHit::Unit(*id)),
            None => CursorHit::Nothing,
        }
    }

    fn unit_committed(&mut self, id: UnitId, position: Vec3) {
        if let Some(cell) = self.cell_at(position) {
            self.occupied.insert(cell, id);
        }
    }

    fn unit_removed(&mut self, id: UnitId) {
        self.occupied.retain(|_, occupant| *occupant != id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid() -> PlotGrid {
        PlotGrid::new(Vec3::ZERO, 100.0, 3, 2)
    }

    #[test]
    fn spawn_follow_commit() {
        let mut surface = grid();
        let mut placement = UnitPlacementController::new(Vec3::ZERO);

        placement.spawn(UnitKind::Windmill);
        assert_eq!(placement.type_index(), 2);

        surface.point_at_cell(1, 1);
        placement.follow_cursor(&surface);
        assert_eq!(
            placement.held().unwrap().position,
            Vec3::new(150.0, 150.0, 0.0)
        );

        let id = placement.try_commit_at_cursor(&mut surface).unwrap().unwrap();
        assert!(placement.held().is_none());
        assert_eq!(placement.type_index(), 0);
        assert_eq!(placement.get(id).unwrap().kind, UnitKind::Windmill);
        assert_eq!(surface.cell_of_unit(id), Some((1, 1)));
    }

    #[test]
    fn occupied_cell_refuses_and_keeps_holding() {
        let mut surface = grid();
        let mut placement = UnitPlacementController::new(Vec3::ZERO);
        surface.point_at_cell(0, 0);

        placement.spawn(UnitKind::OilRig);
        let first = placement.try_commit_at_cursor(&mut surface).unwrap();
        assert!(first.is_some());

        placement.spawn(UnitKind::NuclearReactor);
        let second = placement.try_commit_at_cursor(&mut surface).unwrap();
        assert!(second.is_none());
        assert_eq!(placement.held().unwrap().kind, UnitKind::NuclearReactor);
        assert_eq!(placement.placed_count(), 1);
    }

    #[test]
    fn commit_without_held_unit_errors() {
        let mut surface = grid();
        let mut placement = UnitPlacementController::new(Vec3::ZERO);
        assert_eq!(
            placement.try_commit_at_cursor(&mut surface),
            Err(WorldError::NothingHeld)
        );
    }

    #[test]
    fn remove_frees_the_cell() {
        let mut surface = grid();
        let mut placement = UnitPlacementController::new(Vec3::ZERO);
        surface.point_at_cell(2, 0);
        placement.spawn(UnitKind::Windmill);
        let id = placement.try_commit_at_cursor(&mut surface).unwrap().unwrap();
        assert_eq!(surface.hit_under_cursor(), CursorHit::Unit(id));

        let removed = placement.remove(id, &mut surface).unwrap();
        assert_eq!(removed.kind, UnitKind::Windmill);
        assert_eq!(surface.occupied_count(), 0);
        assert!(matches!(surface.hit_under_cursor(), CursorHit::Ground(_)));
        assert_eq!(
            placement.remove(id, &mut surface),
            Err(WorldError::UnitNotFound(id))
        );
    }

    #[test]
    fn cancel_drops_held_unit() {
        let mut placement = UnitPlacementController::new(Vec3::ZERO);
        placement.spawn(UnitKind::OilRig);
        placement.spawn(UnitKind::Windmill);
        let dropped = placement.cancel().unwrap();
        assert_eq!(dropped.kind, UnitKind::Windmill);
        assert!(placement.cancel().is_none());
    }

    #[test]
    fn tags_take_precedence_over_ground() {
        let mut surface = grid();
        surface.point_at_cell(0, 0);
        surface.show_tag(EntityTag::MinigameMessage, Vec3::new(50.0, 50.0, 0.0), 10.0);
        assert_eq!(
            surface.hit_under_cursor(),
            CursorHit::Tagged(EntityTag::MinigameMessage)
        );
        surface.hide_tag(EntityTag::MinigameMessage);
        assert!(matches!(surface.hit_under_cursor(), CursorHit::Ground(_)));
    }

    #[test]
    fn outside_grid_is_nothing() {
        let mut surface = grid();
        surface.set_cursor(Some(Vec3::new(-5.0, 10.0, 0.0)));
        assert_eq!(surface.hit_under_cursor(), CursorHit::Nothing);
        assert!(!surface.can_place_at(Vec3::new(1000.0, 0.0, 0.0)));
        surface.set_cursor(None);
        assert_eq!(surface.hit_under_cursor(), CursorHit::Nothing);
    }

    #[test]
    fn first_free_cell_skips_occupied() {
        let mut surface = grid();
        let mut placement = UnitPlacementController::new(Vec3::ZERO);
        surface.point_at_cell(0, 0);
        placement.spawn(UnitKind::Windmill);
        let _ = placement.try_commit_at_cursor(&mut surface).unwrap();
        assert_eq!(surface.first_free_cell(), Some((1, 0)));
    }
}

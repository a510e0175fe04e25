use hashbrown::HashMap;
use hexaxial_data::{
    coord::AxialCoord,
    geometry::{Fill, HexGeometry},
    layout::HexLayout,
    math::Vec2,
};
use rayon::prelude::*;

use crate::GridError;

/// Read/write access to cached cell geometry, regardless of how it is stored.
pub trait GeometryStore {
    /// Inserts or replaces the geometry of `coord`.
    fn upsert(&mut self, coord: AxialCoord, geometry: HexGeometry);

    fn remove(&mut self, coord: AxialCoord) -> Option<HexGeometry>;

    fn get(&self, coord: AxialCoord) -> Option<&HexGeometry>;

    /// Every cell with geometry, in storage order.
    fn all(&self) -> Vec<(AxialCoord, HexGeometry)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Geometry of a whole grid, keyed by coordinate.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GridGeometry {
    cells: HashMap<AxialCoord, HexGeometry>,
}

impl GridGeometry {
    /// Computes the geometry of every coordinate in `coords` under `layout`.
    pub fn from_coords(coords: &[AxialCoord], layout: &HexLayout) -> Self {
        let cells = coords
            .par_iter()
            .map(|&coord| {
                (
                    coord,
                    HexGeometry::new(layout.to_pixel(coord), layout.side_length(), Fill::default()),
                )
            })
            .collect::<HashMap<_, _>>();

        Self { cells }
    }

    pub fn contains(&self, coord: AxialCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AxialCoord, &HexGeometry)> {
        self.cells.iter()
    }

    pub fn coords(&self) -> impl Iterator<Item = AxialCoord> + '_ {
        self.cells.keys().copied()
    }
}

impl GeometryStore for GridGeometry {
    fn upsert(&mut self, coord: AxialCoord, geometry: HexGeometry) {
        self.cells.insert(coord, geometry);
    }

    fn remove(&mut self, coord: AxialCoord) -> Option<HexGeometry> {
        self.cells.remove(&coord)
    }

    fn get(&self, coord: AxialCoord) -> Option<&HexGeometry> {
        self.cells.get(&coord)
    }

    fn all(&self) -> Vec<(AxialCoord, HexGeometry)> {
        self.cells.iter().map(|(coord, geometry)| (*coord, *geometry)).collect()
    }

    fn len(&self) -> usize {
        self.cells.len()
    }
}

/// A cell placed by hand at a pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCell {
    pub pointer: Vec2,
    pub coord: AxialCoord,
    pub geometry: HexGeometry,
}

impl PlacedCell {
    pub fn new(pointer: Vec2, layout: &HexLayout) -> Self {
        let coord = layout.from_pixel(pointer);

        Self {
            pointer,
            coord,
            geometry: HexGeometry::new(layout.to_pixel(coord), layout.side_length(), Fill::Dark),
        }
    }
}

/// What a toggle did to a placed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Filled(Fill),
    Removed,
}

/// Fixed-size slots of placed cells, newest first.
///
/// Emptied slots stay where they are, so indices of other cells don't move until the next placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSlots {
    slots: Vec<Option<PlacedCell>>,
}

impl PlacementSlots {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<PlacedCell>] {
        &self.slots
    }

    pub fn cell(&self, index: usize) -> Option<&PlacedCell> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn find(&self, coord: AxialCoord) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|cell| cell.coord == coord))
    }

    /// The occupied slots and their indices, in slot order.
    pub fn populated(&self) -> impl Iterator<Item = (usize, &PlacedCell)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|cell| (index, cell)))
    }

    pub fn populated_len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Puts `cell` in the first slot, pushing every other slot back by one.
    ///
    /// Returns whatever fell off the end.
    pub fn place(&mut self, cell: PlacedCell) -> Option<PlacedCell> {
        if self.slots.is_empty() {
            log::warn!("No slots to place {} into", cell.coord);

            return Some(cell);
        }

        self.slots.rotate_right(1);
        let dropped = self.slots[0].replace(cell);

        if let Some(dropped) = &dropped {
            log::debug!("Dropped the oldest placed cell at {}", dropped.coord);
        }

        dropped
    }

    /// Moves the cell at `coord` to its next fill, emptying its slot after the last one.
    pub fn toggle(&mut self, coord: AxialCoord) -> Result<Toggle, GridError> {
        let index = self.find(coord).ok_or(GridError::MissingCell(coord))?;
        let slot = &mut self.slots[index];

        let next = slot.as_ref().and_then(|cell| cell.geometry.fill.toggled());

        match next {
            Some(fill) => {
                if let Some(cell) = slot {
                    cell.geometry.fill = fill;
                }

                Ok(Toggle::Filled(fill))
            }
            None => {
                *slot = None;

                Ok(Toggle::Removed)
            }
        }
    }

    /// Overwrites the slot at `index`.
    pub fn set_slot(&mut self, index: usize, cell: Option<PlacedCell>) -> Result<(), GridError> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or(GridError::IndexOutOfRange { index, len })?;

        *slot = cell;

        Ok(())
    }
}

impl GeometryStore for PlacementSlots {
    fn upsert(&mut self, coord: AxialCoord, geometry: HexGeometry) {
        match self.find(coord) {
            Some(index) => {
                if let Some(cell) = &mut self.slots[index] {
                    cell.geometry = geometry;
                }
            }
            None => {
                self.place(PlacedCell {
                    pointer: geometry.origin,
                    coord,
                    geometry,
                });
            }
        }
    }

    fn remove(&mut self, coord: AxialCoord) -> Option<HexGeometry> {
        let index = self.find(coord)?;

        self.slots[index].take().map(|cell| cell.geometry)
    }

    fn get(&self, coord: AxialCoord) -> Option<&HexGeometry> {
        self.find(coord).and_then(|index| self.cell(index)).map(|cell| &cell.geometry)
    }

    fn all(&self) -> Vec<(AxialCoord, HexGeometry)> {
        self.populated().map(|(_, cell)| (cell.coord, cell.geometry)).collect()
    }

    fn len(&self) -> usize {
        self.populated_len()
    }
}

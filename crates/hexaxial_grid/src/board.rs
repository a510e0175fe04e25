use hashbrown::HashMap;
use hexaxial_data::{
    coord::AxialCoord,
    layout::WorldLayout,
    math::{Float, Vec3, consts},
};

use crate::GridError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldCell {
    pub coord: AxialCoord,
    pub position: Vec3,
}

/// A grid placed in the 3D world, one cell per coordinate.
#[derive(Debug, Clone)]
pub struct WorldBoard {
    layout: WorldLayout,
    cells: Vec<WorldCell>,
    index: HashMap<AxialCoord, usize>,
}

impl WorldBoard {
    pub fn generate(layout: WorldLayout, coords: &[AxialCoord]) -> Self {
        let cells = coords
            .iter()
            .map(|&coord| WorldCell {
                coord,
                position: layout.to_world(coord),
            })
            .collect::<Vec<_>>();

        let index = cells.iter().enumerate().map(|(i, cell)| (cell.coord, i)).collect();

        log::debug!("Generated a world board of {} cells", cells.len());

        Self { layout, cells, index }
    }

    pub fn layout(&self) -> WorldLayout {
        self.layout
    }

    pub fn cells(&self) -> &[WorldCell] {
        &self.cells
    }

    pub fn contains(&self, coord: AxialCoord) -> bool {
        self.index.contains_key(&coord)
    }

    pub fn find(&self, coord: AxialCoord) -> Result<&WorldCell, GridError> {
        self.index
            .get(&coord)
            .map(|&i| &self.cells[i])
            .ok_or(GridError::MissingCell(coord))
    }

    /// The cell under a picked world position, if it is on the board.
    pub fn hit(&self, pos: Vec3) -> Option<&WorldCell> {
        self.find(self.layout.from_world(pos)).ok()
    }

    /// Moves a cell, e.g. after the scene it lives in was transformed.
    pub fn move_cell(&mut self, coord: AxialCoord, position: Vec3) -> Result<(), GridError> {
        let i = *self.index.get(&coord).ok_or(GridError::MissingCell(coord))?;

        self.cells[i].position = position;

        Ok(())
    }

    /// Recomputes every cell position at a new side length.
    pub fn set_side_length(&mut self, side_length: Float) -> Result<(), GridError> {
        self.layout = self.layout.with_side_length(side_length)?;

        for cell in &mut self.cells {
            cell.position = self.layout.to_world(cell.coord);
        }

        Ok(())
    }

    /// Derives the side length from the distance between the zero cell and its right neighbor,
    /// so that hit tests agree with where the cells actually are.
    pub fn calibrate(&mut self) -> Result<Float, GridError> {
        let zero = self.find(AxialCoord::ZERO)?.position;
        let right = self.find(AxialCoord::RIGHT)?.position;

        let side_length = zero.distance(right) / consts::SQRT_3;
        self.layout = self.layout.with_side_length(side_length)?;

        log::info!("Calibrated world board side length to {side_length}");

        Ok(side_length)
    }
}

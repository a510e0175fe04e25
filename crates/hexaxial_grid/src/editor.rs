use std::sync::{
    Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    atomic::{AtomicBool, Ordering},
};

use hexaxial_data::{
    coord::AxialCoord,
    geometry::Fill,
    layout::HexLayout,
    math::{Float, UInt, Vec2},
};
use tokio::{
    runtime::Runtime,
    task::{JoinError, JoinHandle},
};

use crate::{
    GridError,
    builder::GridBuilder,
    cache::{GridGeometry, PlacedCell, PlacementSlots, Toggle},
    options::GridOptions,
    rescale::{RescaleOutput, RescalePipeline},
};

/// Squared distance the pointer has to move before the hovered cell is looked up again.
const HOVER_MOVE_THRESHOLD: Float = 1.0;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// What a click did to the placed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementChange {
    Placed(AxialCoord),
    Filled(AxialCoord, Fill),
    Removed(AxialCoord),
}

/// Everything a reader sees at once. The geometry always matches `layout`.
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    pub layout: HexLayout,
    pub coords: Arc<Vec<AxialCoord>>,
    pub grid: Arc<GridGeometry>,
    pub placed: Arc<PlacementSlots>,
    /// The grid build `coords` came from.
    generation: u64,
}

impl GridSnapshot {
    fn empty(layout: HexLayout, placement_capacity: usize) -> Self {
        Self {
            layout,
            coords: Arc::default(),
            grid: Arc::default(),
            placed: Arc::new(PlacementSlots::with_capacity(placement_capacity)),
            generation: 0,
        }
    }
}

#[derive(Debug)]
struct Published {
    snapshot: RwLock<Arc<GridSnapshot>>,
    refresh: AtomicBool,
}

impl Published {
    fn snapshot(&self) -> Arc<GridSnapshot> {
        read(&self.snapshot).clone()
    }

    fn request_refresh(&self) {
        self.refresh.store(true, Ordering::Release);
    }

    /// Publishes the coordinates of build `generation` with geometry at the current layout.
    ///
    /// Returns false if a newer build was published first.
    fn publish_build(&self, generation: u64, coords: Arc<Vec<AxialCoord>>) -> bool {
        loop {
            let base = self.snapshot();
            if base.generation > generation {
                return false;
            }

            let grid = Arc::new(GridGeometry::from_coords(&coords, &base.layout));

            let mut snapshot = write(&self.snapshot);
            if snapshot.generation > generation {
                return false;
            }
            if snapshot.layout != base.layout {
                continue;
            }

            let placed = snapshot.placed.clone();
            *snapshot = Arc::new(GridSnapshot {
                layout: base.layout,
                coords: coords.clone(),
                grid,
                placed,
                generation,
            });
            break;
        }

        self.request_refresh();

        true
    }

    /// Publishes rescaled cells together with `layout` and the current grid rebuilt under it.
    fn publish_rescale(&self, layout: HexLayout, placed: PlacementSlots) {
        let placed = Arc::new(placed);

        loop {
            let base = self.snapshot();
            let grid = Arc::new(GridGeometry::from_coords(&base.coords, &layout));

            let mut snapshot = write(&self.snapshot);
            if !Arc::ptr_eq(&snapshot.coords, &base.coords) {
                continue;
            }

            let generation = snapshot.generation;
            *snapshot = Arc::new(GridSnapshot {
                layout,
                coords: base.coords.clone(),
                grid,
                placed: placed.clone(),
                generation,
            });
            break;
        }

        self.request_refresh();
    }
}

/// A hex grid being edited: a built grid of some radius plus cells placed by pointer.
///
/// Long running work (grid builds, rescales) runs on the editor's runtime. Readers only ever see
/// finished results, through [`GridSnapshot`]s.
pub struct HexEditor {
    options: GridOptions,
    tokio: Runtime,

    published: Arc<Published>,
    builder: GridBuilder,
    rescaler: Arc<RescalePipeline>,
    builds: u64,

    last_pointer: Option<Vec2>,
    hovered: Option<AxialCoord>,
}

impl HexEditor {
    pub fn new(options: GridOptions) -> anyhow::Result<Self> {
        let tokio = Runtime::new()?;
        let layout = options.layout()?;

        let rescaler = Arc::new(RescalePipeline::new(options.workers())?);
        let builder = GridBuilder::new(tokio.handle().clone());

        let published = Arc::new(Published {
            snapshot: RwLock::new(Arc::new(GridSnapshot::empty(layout, options.placement_capacity))),
            refresh: AtomicBool::new(false),
        });

        Ok(Self {
            options,
            tokio,
            published,
            builder,
            rescaler,
            builds: 0,
            last_pointer: None,
            hovered: None,
        })
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Saves the options if a radius or side length change hasn't been saved yet.
    pub fn save_options(&mut self) -> anyhow::Result<bool> {
        self.options.sync()
    }

    pub fn snapshot(&self) -> Arc<GridSnapshot> {
        self.published.snapshot()
    }

    pub fn layout(&self) -> HexLayout {
        self.snapshot().layout
    }

    pub fn side_length(&self) -> Float {
        self.layout().side_length()
    }

    pub fn coords(&self) -> Arc<Vec<AxialCoord>> {
        self.snapshot().coords.clone()
    }

    pub fn grid(&self) -> Arc<GridGeometry> {
        self.snapshot().grid.clone()
    }

    pub fn placed(&self) -> Arc<PlacementSlots> {
        self.snapshot().placed.clone()
    }

    pub fn is_rescaling(&self) -> bool {
        self.rescaler.is_in_flight()
    }

    pub fn is_building(&self) -> bool {
        self.builder.is_building()
    }

    /// Returns true once after anything visible changed.
    pub fn take_refresh(&self) -> bool {
        self.published.refresh.swap(false, Ordering::AcqRel)
    }

    /// Blocks until a background job spawned by this editor finishes.
    pub fn join<T>(&self, handle: JoinHandle<T>) -> Result<T, JoinError> {
        self.tokio.block_on(handle)
    }

    /// Starts building the grid of `radius`. Once built, the grid is replaced as a whole.
    ///
    /// The returned task resolves to the number of cells in the new grid. If the build doesn't finish within the
    /// configured timeout the old grid is kept.
    pub fn set_grid_radius(&mut self, radius: UInt) -> Result<JoinHandle<Result<usize, GridError>>, GridError> {
        let build = self.builder.spawn(radius)?;

        self.builds += 1;
        let generation = self.builds;

        self.options.grid_radius = radius;
        self.options.synced = false;

        let published = self.published.clone();
        let timeout = self.options.build_timeout();

        Ok(self.tokio.spawn(async move {
            let build = build.wait(timeout).await.inspect_err(|err| {
                log::error!("Grid of radius {radius} was not built, keeping the previous one. Error: {err}");
            })?;

            let count = build.coords.len();
            let coords = Arc::new(build.coords);

            let published = tokio::task::spawn_blocking(move || published.publish_build(generation, coords))
                .await
                .map_err(|_| GridError::BuildAborted)?;

            if published {
                log::info!("Total hexes: {count}");
            } else {
                log::debug!("Grid of radius {radius} was replaced by a newer build before it was published");
            }

            Ok(count)
        }))
    }

    /// Changes the side length, rescaling placed cells and the grid in the background.
    ///
    /// The new layout is published together with the rescaled geometry. Rejected while a previous rescale is
    /// still running.
    pub fn set_side_length(&mut self, side_length: Float) -> Result<JoinHandle<()>, GridError> {
        self.set_side_length_then(side_length, |_| {})
    }

    /// [`Self::set_side_length`], calling `on_rescaled` on the finished rescale right before it is published.
    pub fn set_side_length_then<F>(&mut self, side_length: Float, on_rescaled: F) -> Result<JoinHandle<()>, GridError>
    where
        F: FnOnce(&RescaleOutput) + Send + 'static,
    {
        let snapshot = self.snapshot();
        let old = snapshot.layout;
        let new = old.with_side_length(side_length).inspect_err(|err| {
            log::error!("Cannot change side length: {err}");
        })?;

        let ticket = self.rescaler.begin(&snapshot.placed, old, new)?;

        log::info!(
            "Side length was set to {side_length} from {}. Rescaling geometry.",
            old.side_length()
        );

        self.options.side_length = side_length;
        self.options.synced = false;

        let published = self.published.clone();
        let rescaler = self.rescaler.clone();

        Ok(self.tokio.spawn_blocking(move || {
            let output = ticket.run(&rescaler);
            on_rescaled(&output);

            let written = output.written();
            let layout = output.layout();
            output.commit_with(|slots| published.publish_rescale(layout, slots));

            log::debug!("Rescaled {written} placed cells");
        }))
    }

    /// Handles a click at `pointer`: places a new cell, or moves an existing one to its next fill.
    pub fn click(&mut self, pointer: Vec2) -> Result<PlacementChange, GridError> {
        log::debug!("Registered click at {pointer:?}");

        let viewport = self.options.viewport;
        if pointer.x < 0.0 || pointer.x > viewport.x || pointer.y < 0.0 || pointer.y > viewport.y {
            log::info!("Click at {pointer:?} is out of bounds. Ignoring input");

            return Err(GridError::PointerOutOfBounds(pointer));
        }

        if self.rescaler.is_in_flight() {
            log::error!("Cannot place a cell while a rescale has not finished.");

            return Err(GridError::RescaleInFlight);
        }

        let change = {
            let mut snapshot = write(&self.published.snapshot);
            let snapshot = Arc::make_mut(&mut snapshot);

            let layout = snapshot.layout;
            let coord = layout.from_pixel(pointer);
            let slots = Arc::make_mut(&mut snapshot.placed);

            if slots.find(coord).is_none() {
                log::debug!("Is new cell ({coord})");
                slots.place(PlacedCell::new(pointer, &layout));

                PlacementChange::Placed(coord)
            } else {
                log::debug!("Is existing cell ({coord})");

                match slots.toggle(coord)? {
                    Toggle::Filled(fill) => PlacementChange::Filled(coord, fill),
                    Toggle::Removed => PlacementChange::Removed(coord),
                }
            }
        };

        self.published.request_refresh();

        Ok(change)
    }

    /// Tracks the pointer, returning the hovered cell.
    ///
    /// Small movements keep the previously hovered cell.
    pub fn hover(&mut self, pointer: Vec2) -> AxialCoord {
        let moved = self
            .last_pointer
            .is_none_or(|last| (pointer - last).magnitude_squared() > HOVER_MOVE_THRESHOLD);

        match self.hovered {
            Some(hovered) if !moved => hovered,
            _ => {
                let coord = self.layout().from_pixel(pointer);

                self.last_pointer = Some(pointer);
                if self.hovered != Some(coord) {
                    self.hovered = Some(coord);
                    self.published.request_refresh();
                }

                coord
            }
        }
    }

    /// The hovered cell and its neighbors, in direction order.
    pub fn hovered(&self) -> Option<(AxialCoord, [AxialCoord; 6])> {
        self.hovered.map(|coord| (coord, coord.neighbors()))
    }

    /// The grid cell under `pointer`, if the built grid has one there.
    pub fn hit_test(&self, pointer: Vec2) -> Option<AxialCoord> {
        let snapshot = self.snapshot();
        let coord = snapshot.layout.from_pixel(pointer);

        snapshot.grid.contains(coord).then_some(coord)
    }
}

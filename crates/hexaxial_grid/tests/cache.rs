use hexaxial_data::{
    coord::AxialCoord,
    geometry::{Fill, HexGeometry},
    layout::HexLayout,
    math::Vec2,
};
use hexaxial_grid::{
    GridError,
    builder::build_coords,
    cache::{GeometryStore, GridGeometry, PlacedCell, PlacementSlots, Toggle},
};

fn layout() -> HexLayout {
    HexLayout::new(Vec2::new(100.0, 100.0), 10.0).unwrap()
}

#[test]
fn test_grid_geometry_covers_coords() {
    let layout = layout();
    let coords = build_coords(3);
    let grid = GridGeometry::from_coords(&coords, &layout);

    assert_eq!(grid.len(), coords.len());

    for coord in coords {
        let geometry = grid.get(coord).unwrap();

        assert_eq!(geometry.origin, layout.to_pixel(coord));
        assert_eq!(geometry.fill, Fill::Dark);
    }

    assert!(!grid.contains(AxialCoord::new(4, 0)));
}

#[test]
fn test_upsert_and_remove() {
    let layout = layout();
    let mut grid = GridGeometry::default();
    assert!(grid.is_empty());

    let coord = AxialCoord::new(2, -1);
    grid.upsert(coord, HexGeometry::new(layout.to_pixel(coord), 10.0, Fill::Dark));
    grid.upsert(coord, HexGeometry::new(layout.to_pixel(coord), 10.0, Fill::Light));

    assert_eq!(grid.len(), 1);
    assert_eq!(grid.get(coord).unwrap().fill, Fill::Light);

    assert!(grid.remove(coord).is_some());
    assert!(grid.get(coord).is_none());
    assert!(grid.remove(coord).is_none());
}

#[test]
fn test_placed_cell_snaps_to_center() {
    let layout = layout();
    let cell = PlacedCell::new(Vec2::new(103.0, 98.0), &layout);

    assert_eq!(cell.coord, AxialCoord::ZERO);
    assert_eq!(cell.pointer, Vec2::new(103.0, 98.0));
    assert_eq!(cell.geometry.origin, Vec2::new(100.0, 100.0));
    assert_eq!(cell.geometry.fill, Fill::Dark);
}

#[test]
fn test_newest_placement_comes_first() {
    let layout = layout();
    let mut slots = PlacementSlots::with_capacity(3);

    for coord in [AxialCoord::ZERO, AxialCoord::RIGHT, AxialCoord::LEFT] {
        assert!(slots.place(PlacedCell::new(layout.to_pixel(coord), &layout)).is_none());
    }

    let order = slots.populated().map(|(_, cell)| cell.coord).collect::<Vec<_>>();
    assert_eq!(order, vec![AxialCoord::LEFT, AxialCoord::RIGHT, AxialCoord::ZERO]);

    let dropped = slots.place(PlacedCell::new(layout.to_pixel(AxialCoord::TOP_LEFT), &layout));
    assert_eq!(dropped.unwrap().coord, AxialCoord::ZERO);
    assert_eq!(slots.populated_len(), 3);
    assert_eq!(slots.find(AxialCoord::TOP_LEFT), Some(0));
}

#[test]
fn test_toggle_cycle() {
    let layout = layout();
    let mut slots = PlacementSlots::with_capacity(4);
    slots.place(PlacedCell::new(layout.to_pixel(AxialCoord::ZERO), &layout));
    slots.place(PlacedCell::new(layout.to_pixel(AxialCoord::RIGHT), &layout));

    assert_eq!(slots.toggle(AxialCoord::ZERO), Ok(Toggle::Filled(Fill::Light)));
    assert_eq!(slots.get(AxialCoord::ZERO).unwrap().fill, Fill::Light);

    assert_eq!(slots.toggle(AxialCoord::ZERO), Ok(Toggle::Removed));
    assert!(slots.get(AxialCoord::ZERO).is_none());
    assert_eq!(slots.len(), 1);

    // the emptied slot stays in place
    assert!(slots.slots()[1].is_none());
    assert_eq!(slots.find(AxialCoord::RIGHT), Some(0));

    assert_eq!(
        slots.toggle(AxialCoord::ZERO),
        Err(GridError::MissingCell(AxialCoord::ZERO))
    );
}

#[test]
fn test_set_slot_out_of_range() {
    let mut slots = PlacementSlots::with_capacity(2);

    assert_eq!(
        slots.set_slot(2, None),
        Err(GridError::IndexOutOfRange { index: 2, len: 2 })
    );
    assert!(slots.set_slot(1, None).is_ok());
}

#[test]
fn test_store_trait_on_slots() {
    let layout = layout();
    let mut slots = PlacementSlots::with_capacity(4);
    let coord = AxialCoord::BOTTOM_LEFT;

    slots.upsert(coord, HexGeometry::new(layout.to_pixel(coord), 10.0, Fill::Dark));
    slots.upsert(coord, HexGeometry::new(layout.to_pixel(coord), 10.0, Fill::Light));

    assert_eq!(slots.len(), 1);
    assert_eq!(slots.all(), vec![(coord, HexGeometry::new(layout.to_pixel(coord), 10.0, Fill::Light))]);

    assert!(slots.remove(coord).is_some());
    assert!(slots.is_empty());
}

#[test]
fn test_zero_capacity_rejects_placement() {
    let layout = layout();
    let mut slots = PlacementSlots::with_capacity(0);
    let cell = PlacedCell::new(Vec2::new(100.0, 100.0), &layout);

    assert_eq!(slots.place(cell), Some(cell));
    assert!(slots.is_empty());
}

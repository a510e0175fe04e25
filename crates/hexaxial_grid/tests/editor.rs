use std::sync::{Arc, mpsc};

use approx::assert_abs_diff_eq;
use hexaxial_data::{coord::AxialCoord, geometry::Fill, math::Vec2};
use hexaxial_grid::{
    GridError,
    cache::GeometryStore,
    editor::{HexEditor, PlacementChange},
    options::GridOptions,
};
use tokio::task::JoinHandle;

fn editor() -> HexEditor {
    HexEditor::new(GridOptions::default()).unwrap()
}

fn center() -> Vec2 {
    GridOptions::default().offset
}

/// Starts a rescale that finishes its work but isn't published until the returned sender is used or dropped.
fn held_rescale(editor: &mut HexEditor, side_length: f32) -> (JoinHandle<()>, mpsc::Sender<()>) {
    let (release, gate) = mpsc::channel::<()>();

    let handle = editor
        .set_side_length_then(side_length, move |output| {
            assert_abs_diff_eq!(output.layout().side_length(), side_length);
            let _ = gate.recv();
        })
        .unwrap();

    (handle, release)
}

#[test]
fn test_grid_radius_builds_grid() {
    let mut editor = editor();
    assert!(editor.grid().is_empty());

    let build = editor.set_grid_radius(2).unwrap();
    assert_eq!(editor.join(build).unwrap(), Ok(19));

    assert_eq!(editor.coords().len(), 19);
    assert_eq!(editor.grid().len(), 19);
    assert_eq!(editor.options().grid_radius, 2);
    assert!(editor.take_refresh());
    assert!(!editor.take_refresh());

    let build = editor.set_grid_radius(4).unwrap();
    assert_eq!(editor.join(build).unwrap(), Ok(61));
    assert_eq!(editor.grid().len(), 61);
}

#[test]
fn test_click_cycles_a_cell() {
    let mut editor = editor();
    let pointer = center() + Vec2::new(4.0, -3.0);

    assert_eq!(editor.click(pointer), Ok(PlacementChange::Placed(AxialCoord::ZERO)));
    assert_eq!(
        editor.click(center()),
        Ok(PlacementChange::Filled(AxialCoord::ZERO, Fill::Light))
    );
    assert_eq!(editor.click(center()), Ok(PlacementChange::Removed(AxialCoord::ZERO)));

    assert!(editor.placed().get(AxialCoord::ZERO).is_none());
    assert!(editor.placed().is_empty());
}

#[test]
fn test_click_outside_viewport() {
    let mut editor = editor();
    let pointer = Vec2::new(-1.0, 10.0);

    assert_eq!(editor.click(pointer), Err(GridError::PointerOutOfBounds(pointer)));
    assert!(editor.placed().is_empty());
}

#[test]
fn test_side_length_rescales_everything() {
    let mut editor = editor();
    let build = editor.set_grid_radius(2).unwrap();
    editor.join(build).unwrap().unwrap();

    let old = editor.layout();
    editor.click(old.to_pixel(AxialCoord::RIGHT)).unwrap();
    editor.click(old.to_pixel(AxialCoord::ZERO)).unwrap();

    let rescale = editor.set_side_length(75.0).unwrap();
    editor.join(rescale).unwrap();
    assert!(!editor.is_rescaling());

    let new = editor.layout();
    assert_abs_diff_eq!(editor.side_length(), 75.0);
    assert_eq!(new.offset(), old.offset());

    let placed = editor.placed();
    assert_eq!(placed.len(), 2);
    for (coord, geometry) in placed.all() {
        assert_eq!(geometry.origin, new.to_pixel(coord));
        assert_abs_diff_eq!(geometry.side_length, 75.0);
    }

    let grid = editor.grid();
    assert_eq!(grid.len(), 19);
    assert!(grid.iter().all(|(coord, geometry)| geometry.origin == new.to_pixel(*coord)));

    assert_eq!(editor.hit_test(new.to_pixel(AxialCoord::new(2, -1))), Some(AxialCoord::new(2, -1)));
}

#[test]
fn test_invalid_side_length_is_rejected() {
    let mut editor = editor();

    assert_eq!(editor.set_side_length(0.0).unwrap_err(), GridError::InvalidSideLength(0.0));
    assert!(editor.set_side_length(f32::NAN).is_err());
    assert_abs_diff_eq!(editor.side_length(), 50.0);
    assert!(!editor.is_rescaling());
}

#[test]
fn test_hover_ignores_small_moves() {
    let mut editor = editor();

    assert_eq!(editor.hover(center()), AxialCoord::ZERO);
    assert!(editor.take_refresh());

    assert_eq!(editor.hover(center() + Vec2::new(0.5, 0.5)), AxialCoord::ZERO);
    assert!(!editor.take_refresh());

    let right = editor.layout().to_pixel(AxialCoord::RIGHT);
    assert_eq!(editor.hover(right), AxialCoord::RIGHT);
    assert!(editor.take_refresh());

    let (hovered, neighbors) = editor.hovered().unwrap();
    assert_eq!(hovered, AxialCoord::RIGHT);
    assert_eq!(neighbors[3], AxialCoord::ZERO);
}

#[test]
fn test_hit_test_outside_grid() {
    let mut editor = editor();
    let build = editor.set_grid_radius(1).unwrap();
    editor.join(build).unwrap().unwrap();

    assert_eq!(editor.hit_test(center()), Some(AxialCoord::ZERO));
    assert_eq!(editor.hit_test(Vec2::new(10.0, 10.0)), None);
}

#[test]
fn test_rescale_in_flight_rejects_changes() {
    let mut editor = editor();
    editor.click(center()).unwrap();
    let placed = editor.placed();

    let (rescale, release) = held_rescale(&mut editor, 75.0);
    assert!(editor.is_rescaling());

    assert_eq!(editor.set_side_length(20.0).unwrap_err(), GridError::RescaleInFlight);
    assert_abs_diff_eq!(editor.side_length(), 50.0);

    let right = editor.layout().to_pixel(AxialCoord::RIGHT);
    assert_eq!(editor.click(right), Err(GridError::RescaleInFlight));
    assert_eq!(*editor.placed(), *placed);

    release.send(()).unwrap();
    editor.join(rescale).unwrap();

    assert!(!editor.is_rescaling());
    assert_abs_diff_eq!(editor.side_length(), 75.0);
    assert_eq!(editor.options().side_length, 75.0);
    assert_eq!(editor.click(right), Ok(PlacementChange::Placed(AxialCoord::RIGHT)));
}

#[test]
fn test_layout_is_published_with_rescaled_geometry() {
    let mut editor = editor();
    let build = editor.set_grid_radius(2).unwrap();
    editor.join(build).unwrap().unwrap();
    editor.click(center()).unwrap();
    let before = editor.snapshot();

    let (rescale, release) = held_rescale(&mut editor, 75.0);

    let during = editor.snapshot();
    assert_eq!(during.layout, before.layout);
    assert!(Arc::ptr_eq(&during.grid, &before.grid));
    assert!(Arc::ptr_eq(&during.placed, &before.placed));

    let edge = AxialCoord::new(2, 0);
    assert_eq!(editor.hit_test(before.layout.to_pixel(edge)), Some(edge));

    release.send(()).unwrap();
    editor.join(rescale).unwrap();

    let after = editor.snapshot();
    assert_abs_diff_eq!(after.layout.side_length(), 75.0);
    assert_eq!(after.grid.len(), 19);
    for (coord, geometry) in after.grid.iter() {
        assert_eq!(geometry.origin, after.layout.to_pixel(*coord));
        assert_abs_diff_eq!(geometry.side_length, 75.0);
    }
    for (coord, geometry) in after.placed.all() {
        assert_eq!(geometry.origin, after.layout.to_pixel(coord));
    }
}

#[test]
fn test_build_during_rescale_is_kept() {
    let mut editor = editor();
    let build = editor.set_grid_radius(30).unwrap();
    assert_eq!(editor.join(build).unwrap(), Ok(2791));
    editor.click(center()).unwrap();

    let (rescale, release) = held_rescale(&mut editor, 60.0);

    let build = editor.set_grid_radius(1).unwrap();
    assert_eq!(editor.join(build).unwrap(), Ok(7));
    assert_eq!(editor.coords().len(), 7);

    release.send(()).unwrap();
    editor.join(rescale).unwrap();

    let snapshot = editor.snapshot();
    assert_eq!(snapshot.coords.len(), 7);
    assert_eq!(snapshot.grid.len(), 7);
    assert_abs_diff_eq!(snapshot.layout.side_length(), 60.0);
    assert!(
        snapshot
            .grid
            .iter()
            .all(|(coord, geometry)| geometry.origin == snapshot.layout.to_pixel(*coord))
    );
    assert_eq!(editor.options().grid_radius, 1);
}

#[test]
fn test_changes_mark_options_unsaved() {
    let mut editor = HexEditor::new(GridOptions {
        synced: true,
        ..Default::default()
    })
    .unwrap();

    let build = editor.set_grid_radius(1).unwrap();
    editor.join(build).unwrap().unwrap();
    assert!(!editor.options().synced);
}

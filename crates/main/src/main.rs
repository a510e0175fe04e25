use std::{env, fs::File};

use hexaxial_data::math::{UInt, Vec2};
use hexaxial_grid::{board::WorldBoard, builder::build_coords, cache::GeometryStore, editor::HexEditor, options::GridOptions};

/// Pointer positions clicked on startup, relative to the grid offset.
const DEMO_CLICKS: [(f32, f32); 4] = [(0.0, 0.0), (90.0, 0.0), (45.0, 75.0), (0.0, 0.0)];

fn main() -> anyhow::Result<()> {
    {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        if let Ok(file) = env::var("LOG_FILE") {
            builder.target(env_logger::Target::Pipe(Box::new(File::create(file)?)));
        }
        builder.init();
    }

    let mut options = GridOptions::load();

    if let Some(radius) = env::args().nth(1) {
        options.grid_radius = radius.parse::<UInt>()?;
    }

    log::info!("Creating editor...");
    let mut editor = HexEditor::new(options.clone())?;
    log::info!("Editor created.");

    let build = editor.set_grid_radius(options.grid_radius)?;
    let count = editor.join(build)??;
    log::info!("Grid of radius {} is ready with {count} cells.", options.grid_radius);

    for (x, y) in DEMO_CLICKS {
        let pointer = options.offset + Vec2::new(x, y);

        match editor.click(pointer) {
            Ok(change) => log::info!("Click at {pointer:?}: {change:?}"),
            Err(err) => log::warn!("Click at {pointer:?} was rejected: {err}"),
        }
    }

    let rescale = editor.set_side_length(options.side_length * 1.5)?;
    editor.join(rescale)?;

    for (coord, geometry) in editor.placed().all() {
        log::info!("Placed {coord} at {:?} ({:?})", geometry.origin, geometry.fill);
    }
    log::info!("Side length is now {}", editor.side_length());

    let mut board = WorldBoard::generate(options.world_layout()?, &build_coords(options.grid_radius));
    let side_length = board.calibrate()?;
    log::info!("World board has {} cells, side length {side_length}", board.cells().len());

    if editor.save_options()? {
        log::info!("Saved the new grid options.");
    }

    log::info!("Shut down gracefully.");

    Ok(())
}

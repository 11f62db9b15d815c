//! Tile Defense headless runner
//!
//! Builds (or restores) a level, runs the simulation at a fixed 60 Hz and
//! logs a summary. Useful for balance checks and profile smoke tests.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::IVec2;

use tile_defense::assets::Assets;
use tile_defense::consts::FRAME_DT;
use tile_defense::renderer::{as_bytes, build_frame, hud_text};
use tile_defense::sim::{GameMode, GameState, TickInput, TileKind, tick};
use tile_defense::{GameServices, ProfileStore, Settings, Tuning, cell_center};

#[derive(Parser, Debug)]
#[command(name = "tile-defense")]
#[command(about = "Run a Tile Defense session without a window")]
struct Args {
    /// Frames to simulate (60 per second)
    #[arg(long, default_value = "3600")]
    frames: u32,

    /// RNG seed for route assignment
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Asset directory to verify before starting
    #[arg(long)]
    assets: Option<PathBuf>,

    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// Balance overrides
    #[arg(long, default_value = "tuning.json")]
    tuning: PathBuf,

    #[arg(long, default_value = "profiles.json")]
    profiles: PathBuf,

    /// Profile to play as (created if missing)
    #[arg(long)]
    profile: Option<String>,

    /// Write settings and the session back when done
    #[arg(long)]
    save: bool,

    /// Frames between automatic tower purchases (0 disables)
    #[arg(long, default_value = "90")]
    build_every: u32,
}

/// Corridor along row 3 with brick on both sides
fn demo_cells() -> (IVec2, Vec<IVec2>, IVec2, Vec<IVec2>) {
    let spawn = IVec2::new(0, 3);
    let path = (1..=10).map(|x| IVec2::new(x, 3)).collect();
    let end = IVec2::new(11, 3);
    let bricks = (1..=10)
        .flat_map(|x| [IVec2::new(x, 2), IVec2::new(x, 4)])
        .collect();
    (spawn, path, end, bricks)
}

/// First palette slot holding `kind`; aesthetic resolves to the brick
fn palette_slot(state: &GameState, kind: TileKind) -> usize {
    (0..)
        .map_while(|index| state.palette.option(index))
        .position(|option| option.kind == Some(kind))
        .unwrap_or(0)
}

/// Paint cells through the editor, the same way a player would
fn paint(state: &mut GameState, services: &mut GameServices, kind: TileKind, cells: &[IVec2]) {
    let scroll = palette_slot(state, kind) as i32 - state.palette.selected_index() as i32;
    tick(
        state,
        &TickInput {
            scroll,
            ..Default::default()
        },
        FRAME_DT,
        services,
    );
    for &cell in cells {
        let click = TickInput {
            cursor: Some(cell_center(cell)),
            primary: true,
            ..Default::default()
        };
        tick(state, &click, FRAME_DT, services);
    }
}

fn build_demo_level(state: &mut GameState, services: &mut GameServices) {
    let toggle = TickInput {
        toggle_mode: true,
        ..Default::default()
    };
    tick(state, &toggle, FRAME_DT, services);

    let (spawn, path, end, bricks) = demo_cells();
    paint(state, services, TileKind::Aesthetic, &bricks);
    paint(state, services, TileKind::Spawn, &[spawn]);
    paint(state, services, TileKind::End, &[end]);
    paint(state, services, TileKind::Path, &path);

    tick(state, &toggle, FRAME_DT, services);
    log::info!(
        "Demo level ready: {} route(s), {} tiles",
        state.paths.len(),
        state.grid.iter().count()
    );
}

/// Next buildable cell with room for a tower
fn next_build_site(state: &GameState) -> Option<glam::Vec2> {
    state
        .grid
        .tiles(TileKind::Aesthetic)
        .iter()
        .filter(|tile| tile.is_buildable())
        .map(|tile| tile.center())
        .find(|&pos| state.can_place_tower(pos))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Tile Defense (headless) starting...");

    let settings = Settings::load(&args.settings);
    let tuning = Tuning::load(&args.tuning);
    if let Some(root) = &args.assets {
        Assets::load(root).context("asset check failed")?;
    }

    let mut store = match &args.profile {
        Some(_) => ProfileStore::load(&args.profiles)
            .with_context(|| format!("reading {}", args.profiles.display()))?,
        None => ProfileStore::new(),
    };
    if let Some(name) = &args.profile {
        let index = match store.profiles().iter().position(|p| &p.name == name) {
            Some(index) => index,
            None => store.create(name)?,
        };
        store.select(index);
    }

    let mut state = GameState::new(args.seed, tuning);
    let mut services = GameServices::new(&settings);

    match store.current().filter(|p| p.has_saved_session()) {
        Some(profile) => state.restore_from_profile(profile),
        None => build_demo_level(&mut state, &mut services),
    }
    services.audio.play_music();

    let mut sprites_drawn = 0usize;
    let mut bytes_uploaded = 0usize;
    for frame in 0..args.frames {
        let mut input = TickInput::default();
        if args.build_every > 0 && frame % args.build_every == 0 && state.mode == GameMode::Play {
            input.cursor = next_build_site(&state);
            input.primary = input.cursor.is_some();
        }

        tick(&mut state, &input, FRAME_DT, &mut services);
        services.audio.update(FRAME_DT);

        let drawn = build_frame(&state, &services.damage_text, input.cursor, &settings);
        sprites_drawn += drawn.sprites.len();
        bytes_uploaded += as_bytes(&drawn.sprites).len();

        if state.is_game_over() && state.game_over_announced {
            log::info!("Stopping after frame {}", frame);
            break;
        }
    }

    log::info!(
        "Session over (seed {}): {:.1}s played, {} towers, {} killed, {} leaked, health {}",
        state.seed(),
        state.time_in_play,
        state.towers.len(),
        state.enemies_killed,
        state.enemies_leaked,
        state.health
    );
    log::debug!("Drew {} sprites ({} bytes)", sprites_drawn, bytes_uploaded);
    println!("{}", hud_text(&state, &settings));

    if args.save {
        settings.save(&args.settings);
        match store.current_mut() {
            Some(profile) => {
                state.save_to_profile(profile);
                store
                    .save(&args.profiles)
                    .with_context(|| format!("writing {}", args.profiles.display()))?;
            }
            None => log::warn!("--save needs --profile, nothing written"),
        }
    }

    Ok(())
}

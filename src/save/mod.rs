//! Cultivation snapshots — F5 writes the field to disk, F9 puts it back.
//!
//! The snapshot holds the grid flags, every crop's type and age, and the
//! weather. Derived crop state (hitbox, layer, harvestable) is recomputed on
//! load, and every soil, water and crop entity is respawned.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::farming::{CellFlags, Crop, Cultivation, FarmingSet, SoilGrid};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{action} failed for {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot is {saved_rows}x{saved_cols} but the farm is {rows}x{cols}")]
    DimensionMismatch {
        saved_rows: u32,
        saved_cols: u32,
        rows: u32,
        cols: u32,
    },
    #[error("snapshot cells are inconsistent")]
    InvalidCells,
    #[error("snapshot farm layout differs at ({row}, {col})")]
    FarmableMismatch { row: u32, col: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub cell: GridPos,
    pub kind: CropKind,
    pub age: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultivationSnapshot {
    pub version: u32,
    pub day: u32,
    pub raining: bool,
    pub rows: u32,
    pub cols: u32,
    /// Row-major, `rows * cols` entries.
    pub cells: Vec<CellFlags>,
    pub crops: Vec<CropRecord>,
}

impl CultivationSnapshot {
    pub fn capture<'a>(
        grid: &SoilGrid,
        crops: impl IntoIterator<Item = &'a Crop>,
        weather: &WeatherState,
    ) -> Self {
        let mut crops: Vec<CropRecord> = crops
            .into_iter()
            .map(|crop| CropRecord {
                cell: crop.cell(),
                kind: crop.kind(),
                age: crop.age(),
            })
            .collect();
        crops.sort_by_key(|record| record.cell);

        Self {
            version: SAVE_VERSION,
            day: weather.day,
            raining: weather.raining,
            rows: grid.rows(),
            cols: grid.cols(),
            cells: grid.cells().to_vec(),
            crops,
        }
    }

    /// Rebuild the grid, refusing snapshots taken on a different farm: the
    /// size and every cell's farmable flag must match `live`.
    pub fn to_grid(&self, live: &SoilGrid) -> Result<SoilGrid, SaveError> {
        let (rows, cols) = (live.rows(), live.cols());
        if (self.rows, self.cols) != (rows, cols) {
            return Err(SaveError::DimensionMismatch {
                saved_rows: self.rows,
                saved_cols: self.cols,
                rows,
                cols,
            });
        }
        let grid = SoilGrid::from_cells(self.rows, self.cols, self.cells.clone())
            .ok_or(SaveError::InvalidCells)?;
        if let Some(pos) = live
            .positions()
            .find(|&pos| grid.is_farmable(pos) != live.is_farmable(pos))
        {
            return Err(SaveError::FarmableMismatch {
                row: pos.row,
                col: pos.col,
            });
        }
        Ok(grid)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Write a snapshot; `path` overrides the configured save path.
#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent {
    pub path: Option<PathBuf>,
}

#[derive(Event, Debug, Clone, Default)]
pub struct LoadRequestEvent {
    pub path: Option<PathBuf>,
}

/// Sent by SavePlugin after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub path: PathBuf,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Sent by SavePlugin after a load completes.
#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub path: PathBuf,
    pub success: bool,
    pub error_message: Option<String>,
}

/// A validated snapshot waiting for the farming domain to respawn it.
#[derive(Resource, Debug, Default)]
struct PendingRestore(Option<(PathBuf, SoilGrid, Vec<CropRecord>)>);

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingRestore>()
            .init_resource::<PlayerInput>()
            .add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_systems(
                Update,
                (
                    quicksave_keybind,
                    handle_save_request,
                    handle_load_request,
                    apply_pending_restore,
                )
                    .chain()
                    .before(FarmingSet::Actions)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILESYSTEM HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> SaveError {
    let path = path.to_path_buf();
    move |source| SaveError::Io { action, path, source }
}

pub fn write_snapshot(path: &Path, snapshot: &CultivationSnapshot) -> Result<(), SaveError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io("create directory", dir))?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(io("write", &tmp_path))?;
    fs::rename(&tmp_path, path).map_err(io("rename", path))?;
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<CultivationSnapshot, SaveError> {
    let json = fs::read_to_string(path).map_err(io("read", path))?;
    let snapshot: CultivationSnapshot = serde_json::from_str(&json)?;

    // No migrations yet; a mismatch only warns.
    if snapshot.version != SAVE_VERSION {
        warn!(
            "[Save] {} has version {} but current version is {}. Attempting to load anyway.",
            path.display(),
            snapshot.version,
            SAVE_VERSION
        );
    }
    Ok(snapshot)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    settings: Res<CultivationSettings>,
    grid: Res<SoilGrid>,
    weather: Res<WeatherState>,
    crops: Query<&Crop>,
) {
    for ev in save_events.read() {
        let path = ev.path.clone().unwrap_or_else(|| settings.save_path.clone());
        let snapshot = CultivationSnapshot::capture(&grid, &crops, &weather);

        match write_snapshot(&path, &snapshot) {
            Ok(()) => {
                info!(
                    "[Save] Wrote {} crop(s) to {}",
                    snapshot.crops.len(),
                    path.display()
                );
                complete_events.send(SaveCompleteEvent {
                    path,
                    success: true,
                    error_message: None,
                });
            }
            Err(e) => {
                warn!("[Save] Save to {} FAILED: {}", path.display(), e);
                complete_events.send(SaveCompleteEvent {
                    path,
                    success: false,
                    error_message: Some(e.to_string()),
                });
            }
        }
    }
}

/// Reads and validates the snapshot and puts the weather back. The field itself
/// is rebuilt by `apply_pending_restore` right after.
fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
    mut pending: ResMut<PendingRestore>,
    mut weather: ResMut<WeatherState>,
    settings: Res<CultivationSettings>,
    grid: Res<SoilGrid>,
) {
    for ev in load_events.read() {
        let path = ev.path.clone().unwrap_or_else(|| settings.save_path.clone());
        info!("[Save] Loading {}...", path.display());

        let loaded = read_snapshot(&path)
            .and_then(|snapshot| Ok((snapshot.to_grid(&grid)?, snapshot)));
        match loaded {
            Ok((restored, snapshot)) => {
                *weather = WeatherState {
                    raining: snapshot.raining,
                    day: snapshot.day,
                };
                pending.0 = Some((path, restored, snapshot.crops));
            }
            Err(e) => {
                warn!("[Save] Load from {} FAILED: {}", path.display(), e);
                complete_events.send(LoadCompleteEvent {
                    path,
                    success: false,
                    error_message: Some(e.to_string()),
                });
            }
        }
    }
}

fn apply_pending_restore(
    mut pending: ResMut<PendingRestore>,
    mut cultivation: Cultivation,
    mut complete_events: EventWriter<LoadCompleteEvent>,
) {
    let Some((path, grid, crops)) = pending.0.take() else {
        return;
    };
    let count = crops.len();
    cultivation.restore(
        grid,
        crops.into_iter().map(|record| (record.cell, record.kind, record.age)),
    );
    info!("[Save] Restored field with {} crop(s) from {}", count, path.display());
    complete_events.send(LoadCompleteEvent {
        path,
        success: true,
        error_message: None,
    });
}

/// F5 = quicksave, F9 = quickload, both to the configured path.
fn quicksave_keybind(
    player_input: Res<PlayerInput>,
    mut save_writer: EventWriter<SaveRequestEvent>,
    mut load_writer: EventWriter<LoadRequestEvent>,
) {
    if player_input.quicksave {
        info!("[Save] F5 quicksave");
        save_writer.send(SaveRequestEvent::default());
    }
    if player_input.quickload {
        info!("[Save] F9 quickload");
        load_writer.send(LoadRequestEvent::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corn() -> CropDef {
        CropDef {
            kind: CropKind::Corn,
            name: "Corn".into(),
            growth_rate: 1.0,
            stages: 4,
            y_offset: -16.0,
            frame_width: 64.0,
            frame_height: 64.0,
            hitbox_inset: 26.0,
        }
    }

    fn planted_grid() -> SoilGrid {
        let all = (0..2).flat_map(|r| (0..3).map(move |c| GridPos::new(r, c)));
        let mut grid = SoilGrid::from_farmable(2, 3, all);
        grid.set_tilled(GridPos::new(0, 1));
        grid.set_watered(GridPos::new(0, 1));
        grid.set_planted(GridPos::new(0, 1));
        grid
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("sproutfield-save-{}-{name}", std::process::id()))
            .join("cultivation.json")
    }

    #[test]
    fn capture_records_crops_and_weather() {
        let grid = planted_grid();
        let crop = Crop::with_age(&corn(), GridPos::new(0, 1), 2.0);
        let weather = WeatherState { raining: true, day: 4 };

        let snapshot = CultivationSnapshot::capture(&grid, [&crop], &weather);
        assert_eq!(snapshot.version, SAVE_VERSION);
        assert_eq!((snapshot.rows, snapshot.cols), (2, 3));
        assert_eq!(snapshot.cells.len(), 6);
        assert!(snapshot.raining);
        assert_eq!(snapshot.day, 4);
        assert_eq!(
            snapshot.crops,
            vec![CropRecord { cell: GridPos::new(0, 1), kind: CropKind::Corn, age: 2.0 }]
        );
    }

    #[test]
    fn snapshot_survives_disk() {
        let grid = planted_grid();
        let snapshot = CultivationSnapshot::capture(&grid, std::iter::empty(), &WeatherState::default());
        let path = temp_path("disk");

        write_snapshot(&path, &snapshot).unwrap();
        let read = read_snapshot(&path).unwrap();
        assert_eq!(read, snapshot);

        let restored = read.to_grid(&grid).unwrap();
        assert!(restored.is_watered(GridPos::new(0, 1)));
        assert!(restored.is_planted(GridPos::new(0, 1)));
        assert!(!path.with_extension("json.tmp").exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn different_farm_size_is_rejected() {
        let snapshot = CultivationSnapshot::capture(&planted_grid(), std::iter::empty(), &WeatherState::default());
        let other = SoilGrid::from_farmable(3, 3, [GridPos::new(1, 1)]);
        let err = snapshot.to_grid(&other).unwrap_err();
        assert!(matches!(err, SaveError::DimensionMismatch { rows: 3, .. }), "{err}");
    }

    #[test]
    fn same_size_farm_with_other_layout_is_rejected() {
        let all = (0..3).flat_map(|r| (0..3).map(move |c| GridPos::new(r, c)));
        let mut saved = SoilGrid::from_farmable(3, 3, all);
        saved.set_tilled(GridPos::new(0, 0));
        let snapshot = CultivationSnapshot::capture(&saved, std::iter::empty(), &WeatherState::default());

        let live = SoilGrid::from_farmable(3, 3, [GridPos::new(1, 1)]);
        let err = snapshot.to_grid(&live).unwrap_err();
        assert!(matches!(err, SaveError::FarmableMismatch { row: 0, col: 0 }), "{err}");
        assert!(!live.is_farmable(GridPos::new(0, 0)));
        assert_eq!(live.farmable_rects().len(), 1);
    }

    #[test]
    fn inconsistent_cells_are_rejected() {
        let mut snapshot =
            CultivationSnapshot::capture(&planted_grid(), std::iter::empty(), &WeatherState::default());
        // Watered but never tilled.
        let json = serde_json::to_value(&snapshot.cells[0]).unwrap();
        let mut broken = json.as_object().unwrap().clone();
        broken.insert("watered".into(), serde_json::Value::Bool(true));
        snapshot.cells[0] = serde_json::from_value(serde_json::Value::Object(broken)).unwrap();

        assert!(matches!(snapshot.to_grid(&planted_grid()), Err(SaveError::InvalidCells)));
    }

    #[test]
    fn unreadable_files_are_errors() {
        let missing = read_snapshot(Path::new("no/such/save.json")).unwrap_err();
        assert!(matches!(missing, SaveError::Io { action: "read", .. }));

        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_snapshot(&path), Err(SaveError::Json(_))));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}

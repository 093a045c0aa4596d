use std::fs;
use std::path::Path;

use client_logging::{client_error, client_info, client_warn};
use serde::{Deserialize, Serialize};
use waypoint_core::{DistanceUnit, Preferences, SortColumn, SortConfig, SortDirection};
use waypoint_engine::AtomicFileWriter;

const PREFS_FILENAME: &str = ".waypoint_prefs.ron";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PersistedUnit {
    Miles,
    Kilometres,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PersistedColumn {
    Start,
    End,
    Distance,
    Date,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PersistedDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PersistedPreferences {
    unit: PersistedUnit,
    sort_column: PersistedColumn,
    sort_direction: PersistedDirection,
}

pub(crate) fn load_preferences(dir: &Path) -> Preferences {
    let path = dir.join(PREFS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Preferences::default();
        }
        Err(err) => {
            client_warn!("Failed to read preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    let persisted: PersistedPreferences = match ron::from_str(&content) {
        Ok(prefs) => prefs,
        Err(err) => {
            client_warn!("Failed to parse preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    client_info!("Loaded preferences from {:?}", path);
    Preferences {
        unit: match persisted.unit {
            PersistedUnit::Miles => DistanceUnit::Miles,
            PersistedUnit::Kilometres => DistanceUnit::Kilometres,
        },
        sort: SortConfig {
            column: match persisted.sort_column {
                PersistedColumn::Start => SortColumn::Start,
                PersistedColumn::End => SortColumn::End,
                PersistedColumn::Distance => SortColumn::Distance,
                PersistedColumn::Date => SortColumn::Date,
            },
            direction: match persisted.sort_direction {
                PersistedDirection::Ascending => SortDirection::Ascending,
                PersistedDirection::Descending => SortDirection::Descending,
            },
        },
    }
}

pub(crate) fn save_preferences(dir: &Path, prefs: Preferences) {
    let persisted = PersistedPreferences {
        unit: match prefs.unit {
            DistanceUnit::Miles => PersistedUnit::Miles,
            DistanceUnit::Kilometres => PersistedUnit::Kilometres,
        },
        sort_column: match prefs.sort.column {
            SortColumn::Start => PersistedColumn::Start,
            SortColumn::End => PersistedColumn::End,
            SortColumn::Distance => PersistedColumn::Distance,
            SortColumn::Date => PersistedColumn::Date,
        },
        sort_direction: match prefs.sort.direction {
            SortDirection::Ascending => PersistedDirection::Ascending,
            SortDirection::Descending => PersistedDirection::Descending,
        },
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            client_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir.to_path_buf());
    if let Err(err) = writer.write(PREFS_FILENAME, content.as_bytes()) {
        client_error!("Failed to write preferences to {:?}: {}", dir, err);
    }
}

use crate::store::keys::EVENT_KEY_LAYOUT;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";
const KEY_LAYOUT_KEY: &str = "_meta:key_layout";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![("001_initial", m001_initial)]
}

/// Applies every migration newer than the stored version.
///
/// Each migration must be idempotent: the version checkpoint is written only
/// after the migration succeeds, so a crash in between reruns it.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    check_key_layout(store)
}

/// Range scans assume every stored key uses [`EVENT_KEY_LAYOUT`].
fn check_key_layout(store: &Store) -> Result<(), StoreError> {
    match store.meta.get(KEY_LAYOUT_KEY.as_bytes())? {
        Some(raw) if raw.as_ref() == EVENT_KEY_LAYOUT.as_bytes() => Ok(()),
        Some(raw) => Err(StoreError::Migration {
            version: get_current_version(store)?,
            message: format!(
                "event keys use layout '{}', expected '{EVENT_KEY_LAYOUT}'",
                String::from_utf8_lossy(&raw)
            ),
        }),
        None => Err(StoreError::Migration {
            version: get_current_version(store)?,
            message: "event key layout marker missing".to_string(),
        }),
    }
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("corrupt version marker of {} bytes", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .meta
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(store: &Store) -> Result<(), StoreError> {
    store
        .meta
        .insert(KEY_LAYOUT_KEY.as_bytes(), EVENT_KEY_LAYOUT.as_bytes())?;
    Ok(())
}

//! Forward-only schema versions, recorded as a big-endian `u32` in `meta`.

use crate::services::starter_catalog::DEFAULT_STARTER_CARDS;
use crate::store::operations::cards::{CardRarity, CardVariant};
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

struct Migration {
    name: &'static str,
    apply: fn(&Store) -> Result<(), StoreError>,
}

/// Version `n` is `MIGRATIONS[n - 1]`. Append only.
const MIGRATIONS: &[Migration] = &[Migration {
    name: "seed_card_catalog",
    apply: seed_card_catalog,
}];

/// Latest version this build knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Apply every migration newer than the stored version.
///
/// Each migration must be idempotent: the process can die after a migration
/// ran but before its version was recorded, and it will run again on the
/// next start.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if current > latest_version() {
        return Err(StoreError::Migration {
            version: current,
            message: format!("database is newer than this build ({})", latest_version()),
        });
    }

    for (version, migration) in (1u32..).zip(MIGRATIONS).skip(current as usize) {
        tracing::info!(version, name = migration.name, "Running migration");
        (migration.apply)(store)?;
        set_version(store, version)?;
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    let Some(raw) = store.meta.get(VERSION_KEY.as_bytes())? else {
        return Ok(0);
    };
    let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
        version: 0,
        message: format!("corrupt schema version ({} bytes)", raw.len()),
    })?;
    Ok(u32::from_be_bytes(bytes))
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("refusing to downgrade from {current}"),
        });
    }
    store.meta.insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

/// Every starter card in all printings, so lookups by name and rarity resolve.
fn seed_card_catalog(store: &Store) -> Result<(), StoreError> {
    let mut seeded = 0usize;
    for (name, _) in DEFAULT_STARTER_CARDS {
        for rarity in CardRarity::ALL {
            let variant = CardVariant::new(name, rarity);
            if store.ensure_card_variant(&variant)?.id == variant.id {
                seeded += 1;
            }
        }
    }
    tracing::info!(seeded, "Seeded card catalog");
    Ok(())
}

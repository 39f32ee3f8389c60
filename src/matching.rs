//! Location-safe matching of open requests against visible inventory,
//! and the reservation that closes a matched pair out.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, StorageError};
use crate::models::{InventoryRecord, MedicineRequest, Store};

/// One request/inventory pairing that can be redistributed without
/// leaving the requester's locality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionMatch {
    pub medicine: String,
    /// Quantity the requester asked for, not the stock on hand.
    pub quantity: i64,
    pub requester: String,
    pub matched_store: String,
    pub location: String,
}

/// Join open requests against visible inventory.
///
/// A pair matches when the medicine names are equal (case-sensitive),
/// the store's location equals the request's location ignoring case,
/// and the record is user-visible. Cross-product semantics: a request
/// matches every qualifying store independently; nothing is split or
/// consumed here. An empty result is a valid outcome, not an error.
pub fn location_safe_matches(
    requests: &[MedicineRequest],
    inventories: &[InventoryRecord],
    stores: &[Store],
) -> Vec<RedistributionMatch> {
    let mut matches = Vec::new();

    for req in requests {
        for inv in inventories {
            if !inv.visible_to_users || req.medicine != inv.medicine {
                continue;
            }
            let Some(store) = stores.iter().find(|s| s.name == inv.store) else {
                // Inventory naming a store we no longer know about is a
                // data consistency problem, not a match.
                tracing::warn!(store = %inv.store, medicine = %inv.medicine,
                    "inventory record references unknown store, skipping");
                continue;
            };
            if store.location.eq_ignore_ascii_case(&req.location) {
                matches.push(RedistributionMatch {
                    medicine: inv.medicine.clone(),
                    quantity: req.quantity,
                    requester: req.requester.clone(),
                    matched_store: store.name.clone(),
                    location: store.location.clone(),
                });
            }
        }
    }

    matches
}

/// Matches over the persisted state: open requests x visible,
/// still-available inventory.
pub fn find_matches(conn: &Connection) -> Result<Vec<RedistributionMatch>, StorageError> {
    let requests = db::list_open(conn)?;
    let inventories = db::list_visible(conn)?;
    let stores = db::list_stores(conn)?;
    Ok(location_safe_matches(&requests, &inventories, &stores))
}

/// Confirm a match: reserve the inventory record and fulfil the
/// request in one transaction. Either both transitions happen or
/// neither does; a record that is already reserved, or a request that
/// is already fulfilled, rolls the whole confirmation back.
pub fn confirm_match(
    conn: &mut Connection,
    inventory_id: &Uuid,
    request_id: &Uuid,
) -> Result<(), StorageError> {
    let tx = conn.transaction()?;
    db::reserve_record(&tx, inventory_id)?;
    db::mark_fulfilled(&tx, request_id)?;
    tx.commit()?;

    tracing::info!(%inventory_id, %request_id, "match confirmed, stock reserved");
    Ok(())
}

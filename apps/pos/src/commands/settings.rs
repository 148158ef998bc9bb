//! Store and receipt settings, kept per tenant owner on this device.

use idcashier_core::validation::validate_name;
use idcashier_core::{ReceiptSettings, StoreSettings};
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;
use crate::state::{Preferences, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub store: StoreSettings,
    pub receipt: ReceiptSettings,
}

/// Cashiers read their owner's settings.
pub fn get_settings(session: &SessionState, prefs: &Preferences) -> ApiResult<Settings> {
    let current = session.require()?;
    let owner_id = current.user.owner_id();
    Ok(Settings {
        store: prefs.store_settings(owner_id)?,
        receipt: prefs.receipt_settings(owner_id)?,
    })
}

/// Owner only.
pub fn set_store_settings(session: &SessionState, prefs: &Preferences, store: StoreSettings) -> ApiResult<StoreSettings> {
    let current = session.require_owner()?;
    validate_name("Nama toko", &store.name)?;
    let store = StoreSettings {
        name: store.name.trim().to_string(),
        address: store.address.trim().to_string(),
        phone: store.phone.trim().to_string(),
        logo: store.logo.filter(|l| !l.trim().is_empty()),
    };
    prefs.set_store_settings(&current.user.id, &store)?;
    info!(owner_id = %current.user.id, "Store settings saved");
    Ok(store)
}

/// Owner only.
pub fn set_receipt_settings(
    session: &SessionState,
    prefs: &Preferences,
    receipt: ReceiptSettings,
) -> ApiResult<ReceiptSettings> {
    let current = session.require_owner()?;
    prefs.set_receipt_settings(&current.user.id, &receipt)?;
    info!(owner_id = %current.user.id, paper = ?receipt.paper_size, "Receipt settings saved");
    Ok(receipt)
}

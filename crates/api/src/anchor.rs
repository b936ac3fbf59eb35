//! Post-commit ledger anchoring.
//!
//! Anchoring runs strictly after the database transaction committed and
//! is best effort: a site without wallet keys skips it with a warning,
//! and every gateway failure is logged and swallowed. The authoritative
//! balance already lives in the database by the time these helpers run.

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use fiado_db::{CustomerRepository, DebtRepository, SiteRepository};

use crate::AppState;

/// Counterparty reference used when the customer has no wallet.
const PLACEHOLDER_COUNTERPARTY: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

/// Looks up the site's signing key, or logs why anchoring is skipped.
async fn site_signing_key(state: &AppState, site_id: Uuid) -> Option<String> {
    let sites = SiteRepository::new((*state.db).clone());
    match sites.find_by_id(site_id).await {
        Ok(Some(site)) => match site.wallet_secret_key {
            Some(key) => Some(key),
            None => {
                warn!(site_id = %site_id, "Site has no wallet, skipping ledger anchoring");
                None
            }
        },
        Ok(None) => {
            warn!(site_id = %site_id, "Site not found, skipping ledger anchoring");
            None
        }
        Err(e) => {
            warn!(site_id = %site_id, error = %e, "Site lookup failed, skipping ledger anchoring");
            None
        }
    }
}

/// Records the chain transaction hash on the debt, logging failures.
async fn record_reference(state: &AppState, debt_id: Uuid, hash: &str) {
    let debts = DebtRepository::new((*state.db).clone());
    if let Err(e) = debts.set_ledger_reference(debt_id, hash).await {
        warn!(debt_id = %debt_id, error = %e, "Failed to record ledger reference");
    }
}

/// Anchors a newly created debt on the ledger.
///
/// Returns the chain transaction hash when anchoring succeeded.
pub async fn anchor_debt_created(
    state: &AppState,
    debt_id: Uuid,
    site_id: Uuid,
    customer_id: Uuid,
    total_amount: Decimal,
) -> Option<String> {
    let signing_key = site_signing_key(state, site_id).await?;

    let customers = CustomerRepository::new((*state.db).clone());
    let counterparty = match customers.find_by_id(customer_id).await {
        Ok(Some(customer)) => customer
            .wallet_address
            .unwrap_or_else(|| PLACEHOLDER_COUNTERPARTY.to_string()),
        Ok(None) | Err(_) => PLACEHOLDER_COUNTERPARTY.to_string(),
    };

    match state
        .ledger
        .register_debt_event(&signing_key, debt_id, site_id, &counterparty, total_amount)
        .await
    {
        Ok(hash) => {
            info!(debt_id = %debt_id, tx_hash = %hash, "Debt anchored on ledger");
            record_reference(state, debt_id, &hash).await;
            Some(hash)
        }
        Err(e) => {
            warn!(debt_id = %debt_id, error = %e, "Debt anchoring failed");
            None
        }
    }
}

/// Anchors a payment applied to a debt on the ledger.
///
/// Returns the chain transaction hash when anchoring succeeded.
pub async fn anchor_payment(
    state: &AppState,
    debt_id: Uuid,
    site_id: Uuid,
    amount: Decimal,
    payment_type: &str,
) -> Option<String> {
    let signing_key = site_signing_key(state, site_id).await?;

    match state
        .ledger
        .register_payment_event(&signing_key, debt_id, amount, payment_type)
        .await
    {
        Ok(hash) => {
            info!(debt_id = %debt_id, tx_hash = %hash, "Payment anchored on ledger");
            record_reference(state, debt_id, &hash).await;
            Some(hash)
        }
        Err(e) => {
            warn!(debt_id = %debt_id, error = %e, "Payment anchoring failed");
            None
        }
    }
}

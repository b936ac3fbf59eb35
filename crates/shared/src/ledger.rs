//! Ledger gateway contract and Soroban-backed implementation.
//!
//! The gateway anchors debt and payment events on an external blockchain
//! ledger. Anchoring is strictly advisory: callers persist the
//! authoritative state first and treat every gateway failure as
//! log-and-continue. Nothing in this module may be allowed to block a
//! financial write.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::types::money::to_minor_units;

/// Errors from the ledger gateway.
///
/// These never propagate past the anchoring helper; they exist so the
/// failure can be logged with context.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount cannot be expressed in minor units.
    #[error("Amount {0} cannot be converted to minor units")]
    InvalidAmount(Decimal),

    /// Transport-level failure talking to the RPC endpoint.
    #[error("Ledger RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The RPC endpoint answered with an error object.
    #[error("Ledger RPC error: {0}")]
    Rpc(String),

    /// The RPC endpoint answered with a body we cannot interpret.
    #[error("Malformed ledger RPC response")]
    MalformedResponse,
}

/// External ledger used to anchor debt and payment events.
///
/// `owner_key` is the site wallet secret used to sign the contract
/// invocation; the returned string is an opaque transaction reference.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Registers a newly created debt on the ledger.
    async fn register_debt_event(
        &self,
        owner_key: &str,
        debt_id: Uuid,
        site_id: Uuid,
        counterparty_ref: &str,
        amount: Decimal,
    ) -> Result<String, LedgerError>;

    /// Registers a payment applied to a debt on the ledger.
    async fn register_payment_event(
        &self,
        owner_key: &str,
        debt_id: Uuid,
        amount: Decimal,
        payment_type: &str,
    ) -> Result<String, LedgerError>;
}

/// Ledger gateway backed by a Soroban RPC endpoint.
#[derive(Debug, Clone)]
pub struct SorobanGateway {
    client: reqwest::Client,
    config: LedgerConfig,
}

impl SorobanGateway {
    /// Creates a gateway from configuration.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Invokes a contract function and returns the transaction hash.
    async fn invoke(
        &self,
        owner_key: &str,
        function: &str,
        args: serde_json::Value,
    ) -> Result<String, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "invokeContractFunction",
            "params": {
                "contractId": self.config.contract_id,
                "networkPassphrase": self.config.network_passphrase,
                "sourceSecret": owner_key,
                "function": function,
                "args": args,
            }
        });

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;

        if let Some(err) = payload.get("error") {
            return Err(LedgerError::Rpc(err.to_string()));
        }

        payload
            .pointer("/result/hash")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or(LedgerError::MalformedResponse)
    }
}

#[async_trait]
impl LedgerGateway for SorobanGateway {
    async fn register_debt_event(
        &self,
        owner_key: &str,
        debt_id: Uuid,
        site_id: Uuid,
        counterparty_ref: &str,
        amount: Decimal,
    ) -> Result<String, LedgerError> {
        let cents = to_minor_units(amount).ok_or(LedgerError::InvalidAmount(amount))?;

        self.invoke(
            owner_key,
            "register_debt",
            json!([debt_id, site_id, counterparty_ref, cents]),
        )
        .await
    }

    async fn register_payment_event(
        &self,
        owner_key: &str,
        debt_id: Uuid,
        amount: Decimal,
        payment_type: &str,
    ) -> Result<String, LedgerError> {
        let cents = to_minor_units(amount).ok_or(LedgerError::InvalidAmount(amount))?;

        self.invoke(
            owner_key,
            "register_payment",
            json!([debt_id, cents, payment_type]),
        )
        .await
    }
}

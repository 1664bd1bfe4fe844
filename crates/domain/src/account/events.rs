//! Account domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, EventDecodeError};

pub const ACCOUNT_OPENED: &str = "account_opened";
pub const FUNDS_DEPOSITED: &str = "funds_deposited";
pub const FUNDS_WITHDRAWN: &str = "funds_withdrawn";
pub const ACCOUNT_CLOSED: &str = "account_closed";

/// Every account event type name; projection matchers are built from this.
pub fn event_types() -> [&'static str; 4] {
    [ACCOUNT_OPENED, FUNDS_DEPOSITED, FUNDS_WITHDRAWN, ACCOUNT_CLOSED]
}

/// Events that can occur on an account aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountEvent {
    /// Account was opened.
    Opened(AccountOpenedData),

    /// Funds were deposited.
    Deposited(FundsDepositedData),

    /// Funds were withdrawn.
    Withdrawn(FundsWithdrawnData),

    /// Account was closed.
    Closed(AccountClosedData),
}

/// Data for account_opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOpenedData {
    /// The unique account ID.
    pub account_id: AggregateId,

    /// The bank the account is held at.
    pub bank_name: String,

    /// Display name of the account.
    pub name: String,

    /// ISO currency code.
    pub currency: String,

    /// Balance the account starts with, in minor units. Recorded as an
    /// explicit deposit by the opening-balance saga; opening itself leaves
    /// the balance at zero.
    pub starting_balance: i64,

    /// When the account was opened.
    pub opened_at: DateTime<Utc>,
}

/// Data for funds_deposited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsDepositedData {
    /// Amount in minor units.
    pub amount: i64,

    /// Free-form movement description.
    pub description: String,

    /// When the deposit was recorded.
    pub deposited_at: DateTime<Utc>,
}

/// Data for funds_withdrawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsWithdrawnData {
    /// Amount in minor units.
    pub amount: i64,

    /// Free-form movement description.
    pub description: String,

    /// When the withdrawal was recorded.
    pub withdrawn_at: DateTime<Utc>,
}

/// Data for account_closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountClosedData {
    /// When the account was closed.
    pub closed_at: DateTime<Utc>,
}

impl DomainEvent for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Opened(_) => ACCOUNT_OPENED,
            AccountEvent::Deposited(_) => FUNDS_DEPOSITED,
            AccountEvent::Withdrawn(_) => FUNDS_WITHDRAWN,
            AccountEvent::Closed(_) => ACCOUNT_CLOSED,
        }
    }

    fn encode(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            AccountEvent::Opened(data) => serde_json::to_vec(data),
            AccountEvent::Deposited(data) => serde_json::to_vec(data),
            AccountEvent::Withdrawn(data) => serde_json::to_vec(data),
            AccountEvent::Closed(data) => serde_json::to_vec(data),
        }
    }

    fn decode(event_type: &str, data: &[u8]) -> Result<Self, EventDecodeError> {
        match event_type {
            ACCOUNT_OPENED => Ok(Self::Opened(serde_json::from_slice(data)?)),
            FUNDS_DEPOSITED => Ok(Self::Deposited(serde_json::from_slice(data)?)),
            FUNDS_WITHDRAWN => Ok(Self::Withdrawn(serde_json::from_slice(data)?)),
            ACCOUNT_CLOSED => Ok(Self::Closed(serde_json::from_slice(data)?)),
            other => Err(EventDecodeError::UnrecognizedEventType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let event = AccountEvent::Deposited(FundsDepositedData {
            amount: 1_250,
            description: "salary".to_string(),
            deposited_at: Utc::now(),
        });

        let data = event.encode().unwrap();
        let decoded = AccountEvent::decode(FUNDS_DEPOSITED, &data).unwrap();
        match decoded {
            AccountEvent::Deposited(data) => {
                assert_eq!(data.amount, 1_250);
                assert_eq!(data.description, "salary");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let result = AccountEvent::decode("account_renamed", b"{}");
        assert!(matches!(
            result,
            Err(EventDecodeError::UnrecognizedEventType(_))
        ));
    }

    #[test]
    fn decode_rejects_wrong_payload() {
        let result = AccountEvent::decode(FUNDS_DEPOSITED, b"not json");
        assert!(matches!(result, Err(EventDecodeError::Payload(_))));
    }
}

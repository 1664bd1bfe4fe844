//! The decoded-event sum type and the decoder registers feeding it.

use event_store::EventRegister;

use crate::account::{
    ACCOUNT_CLOSED, ACCOUNT_OPENED, AccountEvent, FUNDS_DEPOSITED, FUNDS_WITHDRAWN,
};
use crate::aggregate::DomainEvent;
use crate::movement_type::{MOVEMENT_TYPE_REGISTERED, MovementTypeEvent};

/// Every decodable domain event, tagged by the aggregate it belongs to.
///
/// This is what subscription consumers route: the decoder table maps each
/// event type name to the constructor of the right variant.
#[derive(Debug, Clone)]
pub enum WalletEvent {
    Account(AccountEvent),
    MovementType(MovementTypeEvent),
}

impl WalletEvent {
    /// The event type name of the wrapped event.
    pub fn event_type(&self) -> &'static str {
        match self {
            WalletEvent::Account(event) => event.event_type(),
            WalletEvent::MovementType(event) => event.event_type(),
        }
    }
}

/// Registers for every event type the process can decode.
///
/// Wired into the decoder table once at startup, before any subscription is
/// opened.
pub fn event_registers() -> Vec<EventRegister<WalletEvent>> {
    vec![
        EventRegister {
            event_type: ACCOUNT_OPENED,
            decode: |data| {
                Ok(WalletEvent::Account(AccountEvent::Opened(
                    serde_json::from_slice(data)?,
                )))
            },
        },
        EventRegister {
            event_type: FUNDS_DEPOSITED,
            decode: |data| {
                Ok(WalletEvent::Account(AccountEvent::Deposited(
                    serde_json::from_slice(data)?,
                )))
            },
        },
        EventRegister {
            event_type: FUNDS_WITHDRAWN,
            decode: |data| {
                Ok(WalletEvent::Account(AccountEvent::Withdrawn(
                    serde_json::from_slice(data)?,
                )))
            },
        },
        EventRegister {
            event_type: ACCOUNT_CLOSED,
            decode: |data| {
                Ok(WalletEvent::Account(AccountEvent::Closed(
                    serde_json::from_slice(data)?,
                )))
            },
        },
        EventRegister {
            event_type: MOVEMENT_TYPE_REGISTERED,
            decode: |data| {
                Ok(WalletEvent::MovementType(MovementTypeEvent::Registered(
                    serde_json::from_slice(data)?,
                )))
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::AggregateId;
    use event_store::EventDecoder;

    #[test]
    fn registers_cover_all_event_types() {
        let decoder = EventDecoder::from_registers(event_registers());
        for event_type in crate::account::event_types() {
            assert!(decoder.is_registered(event_type), "{event_type}");
        }
        for event_type in crate::movement_type::event_types() {
            assert!(decoder.is_registered(event_type), "{event_type}");
        }
    }

    #[test]
    fn registered_decoder_builds_the_right_variant() {
        let decoder = EventDecoder::from_registers(event_registers());
        let data = serde_json::to_vec(&crate::account::AccountOpenedData {
            account_id: AggregateId::new(),
            bank_name: "Acme Bank".to_string(),
            name: "checking".to_string(),
            currency: "EUR".to_string(),
            starting_balance: 0,
            opened_at: Utc::now(),
        })
        .unwrap();

        let id = AggregateId::new();
        let recorded = event_store::RecordedEvent {
            event_id: event_store::EventId::new(),
            event_type: ACCOUNT_OPENED.to_string(),
            stream_id: format!("account-{id}"),
            position: 0,
            data,
            created: Utc::now(),
        };

        let decoded = decoder.decode(&recorded).unwrap();
        assert!(matches!(
            decoded.payload,
            WalletEvent::Account(AccountEvent::Opened(_))
        ));
        assert_eq!(decoded.payload.event_type(), ACCOUNT_OPENED);
    }
}

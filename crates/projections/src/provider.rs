//! Registry providers wiring the views into the handler registry.

use std::sync::Arc;

use domain::{WalletEvent, account, movement_type};
use subscriptions::{EventHandler, EventMatcher, HandlerProvider};

use crate::views::{AccountBalancesView, MovementTypesView};

/// Provider for the account balances projection.
pub struct AccountProjectionConfig {
    view: Arc<AccountBalancesView>,
}

impl AccountProjectionConfig {
    pub fn new(view: Arc<AccountBalancesView>) -> Self {
        Self { view }
    }
}

impl HandlerProvider<WalletEvent> for AccountProjectionConfig {
    fn matcher(&self) -> EventMatcher {
        EventMatcher::for_events(account::event_types())
    }

    fn handler(&self) -> Arc<dyn EventHandler<WalletEvent>> {
        Arc::new(self.view.as_ref().clone())
    }
}

/// Provider for the movement types projection.
pub struct MovementTypeProjectionConfig {
    view: Arc<MovementTypesView>,
}

impl MovementTypeProjectionConfig {
    pub fn new(view: Arc<MovementTypesView>) -> Self {
        Self { view }
    }
}

impl HandlerProvider<WalletEvent> for MovementTypeProjectionConfig {
    fn matcher(&self) -> EventMatcher {
        EventMatcher::for_events(movement_type::event_types())
    }

    fn handler(&self) -> Arc<dyn EventHandler<WalletEvent>> {
        Arc::new(self.view.as_ref().clone())
    }
}

//! HTTP API server and process wiring for the wallet ledger.
//!
//! Commands go through the domain services; queries are served from the
//! projection read models, which are kept current by durable subscription
//! consumers wired in [`start_subscriptions`].

pub mod command_bus;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use common::AggregateType;
use domain::{AccountService, MovementTypeService, WalletEvent, account, event_registers, movement_type};
use event_store::{EventDecoder, EventReader, EventSubscriber, EventWriter};
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{
    AccountBalancesView, AccountProjectionConfig, MovementTypeProjectionConfig, MovementTypesView,
};
use saga::{CommandSender, OpeningBalanceSaga, SagaConfig, opening_balance};
use subscriptions::{
    HandlerProvider, HandlerRegistry, HandlerType, Lifecycle, RegistryError, SubscribeError,
    subscribe_for_projections, subscribe_for_sagas,
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use command_bus::ServiceCommandBus;
use routes::accounts::AppState;

/// Errors that abort process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build handler registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to wire subscription: {0}")]
    Subscribe(#[from] SubscribeError),
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventWriter + EventReader + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/accounts", post(routes::accounts::open::<S>))
        .route("/accounts", get(routes::accounts::list::<S>))
        .route("/accounts/{id}", get(routes::accounts::get::<S>))
        .route("/accounts/{id}/deposit", post(routes::accounts::deposit::<S>))
        .route("/accounts/{id}/withdraw", post(routes::accounts::withdraw::<S>))
        .route("/accounts/{id}/close", post(routes::accounts::close::<S>))
        .route("/movement-types", post(routes::movement_types::register::<S>))
        .route("/movement-types", get(routes::movement_types::list::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state: services plus empty read-model views.
pub fn create_state<S: EventWriter + EventReader + Clone>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        accounts: AccountService::new(store.clone()),
        movement_types: MovementTypeService::new(store),
        accounts_view: Arc::new(AccountBalancesView::new()),
        movement_types_view: Arc::new(MovementTypesView::new()),
    })
}

/// Builds the projection and saga registries and wires one durable
/// subscription per aggregate type, plus one per saga.
///
/// Any failure aborts startup: a registry collision or an unreachable store
/// is a deployment problem, not a runtime condition.
pub async fn start_subscriptions<S>(
    store: &S,
    state: &AppState<S>,
    lifecycle: &mut Lifecycle,
) -> Result<(), StartupError>
where
    S: EventWriter + EventReader + EventSubscriber + Clone + 'static,
{
    let decoder = Arc::new(EventDecoder::from_registers(event_registers()));
    let client = Arc::new(store.clone()) as Arc<dyn EventSubscriber>;

    // Projections: one consumer per aggregate type.
    let projection_providers: Vec<Box<dyn HandlerProvider<WalletEvent>>> = vec![
        Box::new(AccountProjectionConfig::new(Arc::clone(&state.accounts_view))),
        Box::new(MovementTypeProjectionConfig::new(Arc::clone(
            &state.movement_types_view,
        ))),
    ];
    let projection_registry =
        HandlerRegistry::from_providers(projection_providers.iter().map(|p| p.as_ref()))?;

    subscribe_for_projections(
        &AggregateType::from(account::AGGREGATE_TYPE),
        &HandlerType::from(account::AGGREGATE_TYPE),
        Arc::clone(&client),
        Arc::clone(&decoder),
        &projection_registry,
        lifecycle,
    )
    .await?;
    subscribe_for_projections(
        &AggregateType::from(movement_type::AGGREGATE_TYPE),
        &HandlerType::from(movement_type::AGGREGATE_TYPE),
        Arc::clone(&client),
        Arc::clone(&decoder),
        &projection_registry,
        lifecycle,
    )
    .await?;

    // Sagas: commands are routed back into the services.
    let command_bus =
        Arc::new(ServiceCommandBus::new(store.clone())) as Arc<dyn CommandSender>;
    let saga_providers: Vec<Box<dyn HandlerProvider<WalletEvent>>> = vec![Box::new(
        SagaConfig::new(Arc::new(OpeningBalanceSaga::new()), command_bus),
    )];
    let saga_registry =
        HandlerRegistry::from_providers(saga_providers.iter().map(|p| p.as_ref()))?;

    subscribe_for_sagas(
        &AggregateType::from(account::AGGREGATE_TYPE),
        &HandlerType::for_saga(opening_balance::SAGA_NAME),
        client,
        decoder,
        &saga_registry,
        lifecycle,
    )
    .await?;

    Ok(())
}

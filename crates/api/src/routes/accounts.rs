//! Account command and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use domain::{
    AccountService, CloseAccount, DepositFunds, MovementTypeService, OpenAccount, WithdrawFunds,
};
use event_store::{EventReader, EventWriter};
use projections::{AccountBalancesView, AccountSummary, MovementTypesView};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventWriter + EventReader> {
    pub accounts: AccountService<S>,
    pub movement_types: MovementTypeService<S>,
    pub accounts_view: Arc<AccountBalancesView>,
    pub movement_types_view: Arc<MovementTypesView>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct OpenAccountRequest {
    pub bank_name: String,
    pub name: String,
    pub currency: String,
    /// Opening balance in minor units; recorded as a deposit by the
    /// opening-balance saga.
    #[serde(default)]
    pub starting_balance: i64,
}

#[derive(Deserialize)]
pub struct MovementRequest {
    pub amount: i64,
    pub description: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct AccountOpenedResponse {
    pub account_id: String,
    pub state: String,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub bank_name: String,
    pub name: String,
    pub currency: String,
    pub balance: i64,
    pub state: String,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub account_id: String,
    pub balance: i64,
    pub version: i64,
}

impl From<AccountSummary> for AccountResponse {
    fn from(summary: AccountSummary) -> Self {
        Self {
            id: summary.account_id.to_string(),
            bank_name: summary.bank_name,
            name: summary.name,
            currency: summary.currency,
            balance: summary.balance,
            state: summary.state.to_string(),
        }
    }
}

// -- Handlers --

/// POST /accounts — open a new account.
#[tracing::instrument(skip(state, req))]
pub async fn open<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<OpenAccountRequest>,
) -> Result<(StatusCode, Json<AccountOpenedResponse>), ApiError> {
    let cmd = OpenAccount::new(req.bank_name, req.name, req.currency, req.starting_balance);
    let account_id = cmd.account_id;

    let result = state.accounts.open_account(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountOpenedResponse {
            account_id: account_id.to_string(),
            state: result.aggregate.state().to_string(),
        }),
    ))
}

/// GET /accounts — list accounts from the balances read model.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<AccountResponse>> {
    let mut accounts = state.accounts_view.all_accounts().await;
    accounts.sort_by_key(|summary| summary.opened_at);

    Json(accounts.into_iter().map(AccountResponse::from).collect())
}

/// GET /accounts/:id — load an account aggregate by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_account_id(&id)?;
    let account = state
        .accounts
        .get_account(account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Account {id} not found")))?;

    Ok(Json(AccountResponse {
        id: account_id.to_string(),
        bank_name: account.bank_name().to_string(),
        name: account.name().to_string(),
        currency: account.currency().to_string(),
        balance: account.balance(),
        state: account.state().to_string(),
    }))
}

/// POST /accounts/:id/deposit — record a deposit.
#[tracing::instrument(skip(state, req))]
pub async fn deposit<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<MovementRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account_id = parse_account_id(&id)?;
    let result = state
        .accounts
        .deposit_funds(DepositFunds::new(account_id, req.amount, req.description))
        .await?;

    Ok(Json(BalanceResponse {
        account_id: account_id.to_string(),
        balance: result.aggregate.balance(),
        version: result.new_version.as_i64(),
    }))
}

/// POST /accounts/:id/withdraw — record a withdrawal.
#[tracing::instrument(skip(state, req))]
pub async fn withdraw<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<MovementRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account_id = parse_account_id(&id)?;
    let result = state
        .accounts
        .withdraw_funds(WithdrawFunds::new(account_id, req.amount, req.description))
        .await?;

    Ok(Json(BalanceResponse {
        account_id: account_id.to_string(),
        balance: result.aggregate.balance(),
        version: result.new_version.as_i64(),
    }))
}

/// POST /accounts/:id/close — close a settled account.
#[tracing::instrument(skip(state))]
pub async fn close<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_account_id(&id)?;
    let result = state
        .accounts
        .close_account(CloseAccount::new(account_id))
        .await?;

    let account = result.aggregate;
    Ok(Json(AccountResponse {
        id: account_id.to_string(),
        bank_name: account.bank_name().to_string(),
        name: account.name().to_string(),
        currency: account.currency().to_string(),
        balance: account.balance(),
        state: account.state().to_string(),
    }))
}

fn parse_account_id(id: &str) -> Result<AggregateId, ApiError> {
    AggregateId::parse(id).map_err(|e| ApiError::BadRequest(format!("Invalid account id: {e}")))
}

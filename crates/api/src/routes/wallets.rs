//! Wallet routes: registry, top-ups and the ledger listing.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use tranche_core::ledger::{
    DateBound, LedgerQuery, LedgerRow, ReferenceType, TopUpRequest, parse_date_bound,
};
use tranche_core::wallet::{
    CreateWalletInput, InvestmentSummary, InvestorTerms, WalletStatus, WalletType, WalletView,
};
use tranche_shared::types::{OwnerId, PageLimit, WalletId};

use super::rubles;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the wallet routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallets", get(list_wallets).post(create_wallet))
        .route("/wallets/{wallet_id}", get(get_wallet))
        .route("/wallets/{wallet_id}/top-up", post(top_up))
        .route("/wallets/{wallet_id}/ledger", get(get_ledger))
}

// ============================================================================
// Requests
// ============================================================================

/// Request body for creating a wallet.
#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    /// Wallet name, 1-100 characters.
    pub name: String,
    /// `personal` or `investor`.
    #[serde(rename = "type")]
    pub wallet_type: String,
    /// Currency code, `RUB` when omitted.
    pub currency: Option<String>,
    /// Opening balance of a personal wallet.
    pub initial_balance_minor_units: Option<i64>,
    /// Amount invested into an investor wallet.
    pub investment_amount_minor_units: Option<i64>,
    /// Investor's share of profit, percent.
    pub investor_percentage: Option<Decimal>,
    /// Owner's share of profit, percent.
    pub user_percentage: Option<Decimal>,
    /// When the investment is returned, `YYYY-MM-DD` or RFC 3339.
    pub investment_return_date: Option<String>,
}

/// Query parameters for listing wallets.
#[derive(Debug, Deserialize)]
pub struct ListWalletsQuery {
    /// Filter by wallet type.
    #[serde(rename = "type")]
    pub wallet_type: Option<String>,
}

/// Request body for a top-up.
#[derive(Debug, Deserialize)]
pub struct TopUpBody {
    /// Amount to credit, in kopecks.
    pub amount_minor_units: i64,
    /// Description, 1-500 characters.
    pub description: String,
    /// Caller reference, up to 100 characters.
    pub reference_id: Option<String>,
}

/// Query parameters for the ledger listing.
#[derive(Debug, Deserialize)]
pub struct LedgerParams {
    /// Filter by reference type.
    #[serde(rename = "type")]
    pub reference_type: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD` or RFC 3339.
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD` or RFC 3339.
    pub end_date: Option<String>,
    /// Page size, default 50, max 100.
    pub limit: Option<u32>,
}

// ============================================================================
// Responses
// ============================================================================

/// Investor terms of a wallet.
#[derive(Debug, Serialize)]
pub struct InvestorTermsResponse {
    /// Amount invested.
    pub investment_amount_minor_units: i64,
    /// Amount invested, rubles.
    pub investment_amount_rubles: String,
    /// Investor's share of profit, percent.
    pub investor_percentage: String,
    /// Owner's share of profit, percent.
    pub user_percentage: String,
    /// Return date.
    pub investment_return_date: NaiveDate,
}

impl From<&InvestorTerms> for InvestorTermsResponse {
    fn from(terms: &InvestorTerms) -> Self {
        Self {
            investment_amount_minor_units: terms.investment_amount,
            investment_amount_rubles: rubles(terms.investment_amount),
            investor_percentage: terms.investor_percentage.to_string(),
            user_percentage: terms.user_percentage.to_string(),
            investment_return_date: terms.investment_return_date,
        }
    }
}

/// Investment summary of an investor wallet.
#[derive(Debug, Serialize)]
pub struct InvestmentSummaryResponse {
    /// Amount invested.
    pub total_invested_minor_units: i64,
    /// Amount invested, rubles.
    pub total_invested_rubles: String,
    /// Current balance.
    pub current_wallet_value_minor_units: i64,
    /// Current balance, rubles.
    pub current_wallet_value_rubles: String,
    /// Profit over the investment, never negative.
    pub total_profit_minor_units: i64,
    /// Profit, rubles.
    pub total_profit_rubles: String,
    /// Investor's cut of the profit.
    pub investor_profit_share_minor_units: i64,
    /// Investor's cut, rubles.
    pub investor_profit_share_rubles: String,
    /// Investment plus the investor's cut.
    pub expected_returns_minor_units: i64,
    /// Expected returns, rubles.
    pub expected_returns_rubles: String,
    /// Investor's cut as a percentage of the investment.
    pub roi_percentage: String,
}

impl From<&InvestmentSummary> for InvestmentSummaryResponse {
    fn from(s: &InvestmentSummary) -> Self {
        Self {
            total_invested_minor_units: s.total_invested,
            total_invested_rubles: rubles(s.total_invested),
            current_wallet_value_minor_units: s.current_wallet_value,
            current_wallet_value_rubles: rubles(s.current_wallet_value),
            total_profit_minor_units: s.total_profit,
            total_profit_rubles: rubles(s.total_profit),
            investor_profit_share_minor_units: s.investor_profit_share,
            investor_profit_share_rubles: rubles(s.investor_profit_share),
            expected_returns_minor_units: s.expected_returns,
            expected_returns_rubles: rubles(s.expected_returns),
            roi_percentage: s.roi_percentage.to_string(),
        }
    }
}

/// Response for a wallet with its balance.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// Wallet ID.
    pub id: WalletId,
    /// Wallet name.
    pub name: String,
    /// Wallet type.
    #[serde(rename = "type")]
    pub wallet_type: &'static str,
    /// Currency code.
    pub currency: &'static str,
    /// `active` or `archived`.
    pub status: WalletStatus,
    /// Whether debits may not overdraw the wallet.
    pub require_nonnegative: bool,
    /// Whether partial allocations are allowed.
    pub allow_partial_allocation: bool,
    /// Current balance.
    pub balance_minor_units: i64,
    /// Current balance, rubles.
    pub balance_rubles: String,
    /// Balance version, incremented by every mutation.
    pub version: i64,
    /// Investor terms, for investor wallets.
    pub investor: Option<InvestorTermsResponse>,
    /// Investment summary, for investor wallets.
    pub investment_summary: Option<InvestmentSummaryResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last balance change.
    pub balance_updated_at: DateTime<Utc>,
}

impl From<&WalletView> for WalletResponse {
    fn from(view: &WalletView) -> Self {
        let wallet = &view.wallet;
        Self {
            id: wallet.id,
            name: wallet.name.clone(),
            wallet_type: wallet.wallet_type.as_str(),
            currency: wallet.currency.code(),
            status: wallet.status,
            require_nonnegative: wallet.require_nonnegative,
            allow_partial_allocation: wallet.allow_partial_allocation,
            balance_minor_units: view.balance.balance,
            balance_rubles: rubles(view.balance.balance),
            version: view.balance.version,
            investor: wallet.investor.as_ref().map(InvestorTermsResponse::from),
            investment_summary: view
                .investment_summary
                .as_ref()
                .map(InvestmentSummaryResponse::from),
            created_at: wallet.created_at,
            balance_updated_at: view.balance.updated_at,
        }
    }
}

/// One ledger row with its running balance.
#[derive(Debug, Serialize)]
pub struct LedgerRowResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// `credit` or `debit`.
    pub direction: &'static str,
    /// Unsigned amount.
    pub amount_minor_units: i64,
    /// Unsigned amount, rubles.
    pub amount_rubles: String,
    /// Amount signed by direction.
    pub signed_amount_minor_units: i64,
    /// Signed amount, rubles.
    pub signed_amount_rubles: String,
    /// Wallet balance right after this entry.
    pub running_balance_minor_units: i64,
    /// Running balance, rubles.
    pub running_balance_rubles: String,
    /// Currency code.
    pub currency: &'static str,
    /// Reference type.
    pub reference_type: &'static str,
    /// Installment id, voided allocation id, or caller reference.
    pub reference_id: Option<String>,
    /// Description.
    pub description: String,
    /// Who recorded the entry.
    pub created_by: Uuid,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl From<&LedgerRow> for LedgerRowResponse {
    fn from(row: &LedgerRow) -> Self {
        let entry = &row.entry;
        Self {
            id: entry.id.into_inner(),
            direction: entry.direction.as_str(),
            amount_minor_units: entry.amount,
            amount_rubles: rubles(entry.amount),
            signed_amount_minor_units: row.signed_amount,
            signed_amount_rubles: rubles(row.signed_amount),
            running_balance_minor_units: row.running_balance,
            running_balance_rubles: rubles(row.running_balance),
            currency: entry.currency.code(),
            reference_type: entry.reference_type.as_str(),
            reference_id: entry.reference_id.clone(),
            description: entry.description.clone(),
            created_by: entry.created_by.into_inner(),
            created_at: entry.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/wallets` - Create a wallet.
async fn create_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateWalletRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let investment_return_date = payload
        .investment_return_date
        .as_deref()
        .map(|value| {
            parse_date_bound("investment_return_date", value, DateBound::Start)
                .map(|ts| ts.date_naive())
        })
        .transpose()?;

    let input = CreateWalletInput {
        owner_id: auth.owner_id(),
        name: payload.name,
        wallet_type: payload.wallet_type,
        currency: payload.currency,
        initial_balance: payload.initial_balance_minor_units,
        investment_amount: payload.investment_amount_minor_units,
        investor_percentage: payload.investor_percentage,
        user_percentage: payload.user_percentage,
        investment_return_date,
    };

    let view = state.engine.create_wallet(input).await?;
    Ok((StatusCode::CREATED, Json(WalletResponse::from(&view))))
}

/// GET `/wallets` - List wallets, newest first.
async fn list_wallets(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListWalletsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let wallet_type = query
        .wallet_type
        .as_deref()
        .map(WalletType::from_str)
        .transpose()?;

    let wallets = state.engine.list_wallets(auth.owner_id(), wallet_type).await?;
    let response: Vec<WalletResponse> = wallets.iter().map(WalletResponse::from).collect();

    Ok(Json(json!({ "wallets": response })))
}

/// GET `/wallets/{wallet_id}` - Get one wallet.
async fn get_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(wallet_id) = path?;

    let view = state
        .engine
        .get_wallet(auth.owner_id(), WalletId::from_uuid(wallet_id))
        .await?;
    Ok(Json(WalletResponse::from(&view)))
}

/// POST `/wallets/{wallet_id}/top-up` - Credit a wallet.
async fn top_up(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TopUpBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(wallet_id) = path?;
    let Json(payload) = payload?;

    let outcome = state
        .engine
        .top_up(TopUpRequest {
            wallet_id: WalletId::from_uuid(wallet_id),
            owner_id: auth.owner_id(),
            amount: payload.amount_minor_units,
            description: payload.description,
            reference_id: payload.reference_id,
        })
        .await?;

    Ok(Json(json!({
        "transaction_id": outcome.transaction_id,
        "amount_added_minor_units": outcome.amount_added.minor_units,
        "amount_added_rubles": rubles(outcome.amount_added.minor_units),
        "new_balance_minor_units": outcome.new_balance.minor_units,
        "new_balance_rubles": rubles(outcome.new_balance.minor_units),
    })))
}

/// GET `/wallets/{wallet_id}/ledger` - List ledger rows with running balances.
async fn get_ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    params: Result<Query<LedgerParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(wallet_id) = path?;
    let Query(params) = params?;
    let query = ledger_query(auth.owner_id(), WalletId::from_uuid(wallet_id), &params)?;

    let ledger = state.engine.get_ledger(query.clone()).await?;
    let rows: Vec<LedgerRowResponse> = ledger
        .page
        .rows
        .iter()
        .map(LedgerRowResponse::from)
        .collect();

    Ok(Json(json!({
        "wallet": WalletResponse::from(&ledger.wallet),
        "transactions": rows,
        "pagination": ledger.page.pagination,
        "filters": {
            "type": query.reference_type.map(ReferenceType::as_str),
            "start_date": query.start,
            "end_date": query.end,
        },
    })))
}

/// Builds the typed ledger query from raw parameters.
fn ledger_query(
    owner_id: OwnerId,
    wallet_id: WalletId,
    params: &LedgerParams,
) -> Result<LedgerQuery, ApiError> {
    let reference_type = params
        .reference_type
        .as_deref()
        .map(ReferenceType::from_str)
        .transpose()?;
    let start = params
        .start_date
        .as_deref()
        .map(|v| parse_date_bound("start_date", v, DateBound::Start))
        .transpose()?;
    let end = params
        .end_date
        .as_deref()
        .map(|v| parse_date_bound("end_date", v, DateBound::End))
        .transpose()?;

    Ok(LedgerQuery {
        wallet_id,
        owner_id,
        reference_type,
        start,
        end,
        limit: PageLimit::new(params.limit),
    })
}

//! Installment allocation routes.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use tranche_core::allocation::{
    AllocateRequest, Allocation, AllocationStatus, Installment, InstallmentStatus, VoidRequest,
};
use tranche_shared::types::{AllocationId, InstallmentId, WalletId};

use super::rubles;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the installment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/installments/{installment_id}/allocate", post(allocate))
        .route(
            "/installments/{installment_id}/allocations",
            get(list_allocations),
        )
        .route(
            "/installments/{installment_id}/allocations/{allocation_id}/void",
            post(void_allocation),
        )
}

/// Request body for an allocation.
#[derive(Debug, Deserialize)]
pub struct AllocateBody {
    /// Wallet to debit.
    pub wallet_id: Uuid,
    /// Amount to allocate, in kopecks.
    pub amount_minor_units: i64,
    /// Free-form notes, up to 500 characters.
    pub notes: Option<String>,
}

/// Response for one allocation.
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    /// Allocation ID.
    pub id: AllocationId,
    /// Funded installment.
    pub installment_id: InstallmentId,
    /// Debited wallet.
    pub wallet_id: WalletId,
    /// Allocated amount.
    pub amount_minor_units: i64,
    /// Allocated amount, rubles.
    pub amount_rubles: String,
    /// `active` or `void`.
    pub status: AllocationStatus,
    /// Notes.
    pub notes: Option<String>,
    /// The debit ledger entry.
    pub transaction_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Allocation> for AllocationResponse {
    fn from(a: &Allocation) -> Self {
        Self {
            id: a.id,
            installment_id: a.installment_id,
            wallet_id: a.wallet_id,
            amount_minor_units: a.amount,
            amount_rubles: rubles(a.amount),
            status: a.status,
            notes: a.notes.clone(),
            transaction_id: a.transaction_id.into_inner(),
            created_at: a.created_at,
        }
    }
}

/// Installment summary shown with its allocations.
#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    /// Installment ID.
    pub id: InstallmentId,
    /// Product being paid for.
    pub product_name: String,
    /// Total amount due.
    pub total_amount_minor_units: i64,
    /// Total amount due, rubles.
    pub total_amount_rubles: String,
    /// Installment status.
    pub status: InstallmentStatus,
}

impl From<&Installment> for InstallmentResponse {
    fn from(i: &Installment) -> Self {
        Self {
            id: i.id,
            product_name: i.product_name.clone(),
            total_amount_minor_units: i.total_amount,
            total_amount_rubles: rubles(i.total_amount),
            status: i.status,
        }
    }
}

/// POST `/installments/{installment_id}/allocate` - Fund an installment from a wallet.
async fn allocate(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AllocateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(installment_id) = path?;
    let Json(payload) = payload?;

    let allocation = state
        .engine
        .allocate(AllocateRequest {
            installment_id: InstallmentId::from_uuid(installment_id),
            wallet_id: WalletId::from_uuid(payload.wallet_id),
            owner_id: auth.owner_id(),
            amount: payload.amount_minor_units,
            notes: payload.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AllocationResponse::from(&allocation)),
    ))
}

/// GET `/installments/{installment_id}/allocations` - List allocations with the cap position.
async fn list_allocations(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(installment_id) = path?;

    let list = state
        .engine
        .list_allocations(auth.owner_id(), InstallmentId::from_uuid(installment_id))
        .await?;
    let allocations: Vec<AllocationResponse> =
        list.allocations.iter().map(AllocationResponse::from).collect();

    Ok(Json(json!({
        "installment": InstallmentResponse::from(&list.installment),
        "allocations": allocations,
        "allocated_total_minor_units": list.allocated_total,
        "allocated_total_rubles": rubles(list.allocated_total),
        "remaining_minor_units": list.remaining,
        "remaining_rubles": rubles(list.remaining),
    })))
}

/// POST `/installments/{installment_id}/allocations/{allocation_id}/void` - Reverse an allocation.
async fn void_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((installment_id, allocation_id)) = path?;

    let outcome = state
        .engine
        .void_allocation(VoidRequest {
            installment_id: InstallmentId::from_uuid(installment_id),
            allocation_id: AllocationId::from_uuid(allocation_id),
            owner_id: auth.owner_id(),
        })
        .await?;

    Ok(Json(json!({
        "status": "voided",
        "allocation_id": outcome.allocation_id,
        "reversal_transaction_id": outcome.reversal_transaction_id,
        "new_balance_minor_units": outcome.new_balance.minor_units,
        "new_balance_rubles": rubles(outcome.new_balance.minor_units),
    })))
}

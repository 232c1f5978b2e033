//! Allocation manager logic: funding installments from wallets and voiding allocations.
//!
//! An allocation is `active` until voided; void is terminal. The sum of active
//! allocations on an installment never exceeds its total.

pub mod rules;
pub mod types;

#[cfg(test)]
mod props;

pub use rules::{
    AllocationPlan, VoidPlan, allocation_description, plan_allocation, plan_void, remaining,
    reversal_description,
};
pub use types::{
    AllocateRequest, Allocation, AllocationList, AllocationStatus, Installment, InstallmentStatus,
    VoidOutcome, VoidRequest,
};

//! Demo data seeder for development and manual testing.
//!
//! Seeds one owner with a personal wallet, an investor wallet and two
//! installments, then runs a top-up, two allocations and a void through the
//! ledger engine so every reference type shows up in the ledger.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Months, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use tranche_core::allocation::{AllocateRequest, Installment, InstallmentStatus, VoidRequest};
use tranche_core::ledger::TopUpRequest;
use tranche_core::wallet::{CreateWalletInput, WalletType, WalletView};
use tranche_db::repositories::{InstallmentRepository, NewInstallment};
use tranche_db::{LedgerEngine, ScopeMode, connect};
use tranche_shared::config::DatabaseConfig;
use tranche_shared::types::{ClientId, OwnerId};
use tranche_shared::LedgerConfig;

/// Demo owner ID (stable so tokens can be minted for it by hand).
const DEMO_OWNER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = connect(&DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
        connect_timeout_secs: 5,
    })
    .await
    .context("failed to connect to database")?;
    let engine = LedgerEngine::new(db, &LedgerConfig::default());
    let owner_id = OwnerId::from_uuid(DEMO_OWNER_ID);

    if !engine.list_wallets(owner_id, None).await?.is_empty() {
        println!("  Demo owner already has wallets, skipping...");
        return Ok(());
    }

    println!("Seeding wallets...");
    let personal = seed_personal_wallet(&engine, owner_id).await?;
    let investor = seed_investor_wallet(&engine, owner_id).await?;

    println!("Seeding installments...");
    let phone = seed_installment(&engine, owner_id, "Smartphone", 4_500_000).await?;
    let laptop = seed_installment(&engine, owner_id, "Laptop", 12_000_000).await?;

    println!("Seeding ledger activity...");
    let top_up = engine
        .top_up(TopUpRequest {
            wallet_id: investor.wallet.id,
            owner_id,
            amount: 2_000_000,
            description: "Monthly installment payments received".to_string(),
            reference_id: None,
        })
        .await?;
    println!("  Investor wallet topped up to {}", top_up.new_balance.to_major());

    engine
        .allocate(AllocateRequest {
            installment_id: phone.id,
            wallet_id: personal.wallet.id,
            owner_id,
            amount: 1_500_000,
            notes: Some("First payment".to_string()),
        })
        .await?;

    let mistaken = engine
        .allocate(AllocateRequest {
            installment_id: laptop.id,
            wallet_id: personal.wallet.id,
            owner_id,
            amount: 500_000,
            notes: None,
        })
        .await?;
    let voided = engine
        .void_allocation(VoidRequest {
            installment_id: laptop.id,
            allocation_id: mistaken.id,
            owner_id,
        })
        .await?;
    println!(
        "  Personal wallet back at {} after void",
        voided.new_balance.to_major()
    );

    for wallet_id in [personal.wallet.id, investor.wallet.id] {
        let (balance, ledger_total) = engine.reconcile(owner_id, wallet_id).await?;
        anyhow::ensure!(
            balance == ledger_total,
            "wallet {wallet_id} balance {balance} does not match ledger total {ledger_total}"
        );
    }

    println!("Seeding complete! Demo owner: {DEMO_OWNER_ID}");
    Ok(())
}

/// Seeds a personal wallet with an opening balance.
async fn seed_personal_wallet(
    engine: &LedgerEngine,
    owner_id: OwnerId,
) -> anyhow::Result<WalletView> {
    let view = engine
        .create_wallet(CreateWalletInput {
            owner_id,
            name: "Main wallet".to_string(),
            wallet_type: WalletType::Personal.as_str().to_string(),
            initial_balance: Some(5_000_000),
            ..CreateWalletInput::default()
        })
        .await?;
    println!("  Created personal wallet {}", view.wallet.id);
    Ok(view)
}

/// Seeds an investor wallet with a 70/30 profit split due in a year.
async fn seed_investor_wallet(
    engine: &LedgerEngine,
    owner_id: OwnerId,
) -> anyhow::Result<WalletView> {
    let return_date = Utc::now()
        .date_naive()
        .checked_add_months(Months::new(12))
        .context("return date out of range")?;

    let view = engine
        .create_wallet(CreateWalletInput {
            owner_id,
            name: "Investor pool".to_string(),
            wallet_type: WalletType::Investor.as_str().to_string(),
            investment_amount: Some(10_000_000),
            investor_percentage: Some(Decimal::from(70)),
            user_percentage: Some(Decimal::from(30)),
            investment_return_date: Some(return_date),
            ..CreateWalletInput::default()
        })
        .await?;
    println!("  Created investor wallet {}", view.wallet.id);
    Ok(view)
}

/// Seeds an active installment for a fresh client.
async fn seed_installment(
    engine: &LedgerEngine,
    owner_id: OwnerId,
    product_name: &str,
    total_amount: i64,
) -> anyhow::Result<Installment> {
    let scope = engine.scope(owner_id, ScopeMode::Write).await?;
    let outcome = InstallmentRepository::insert(
        scope.txn(),
        NewInstallment {
            owner_id,
            client_id: ClientId::new(),
            product_name: product_name.to_string(),
            total_amount,
            status: InstallmentStatus::Active,
        },
    )
    .await;
    let installment = scope.finish(outcome).await?;
    println!("  Created installment {} ({product_name})", installment.id);
    Ok(installment)
}

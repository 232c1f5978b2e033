//! Initial database migration.
//!
//! Creates the wallet ledger tables, enums, immutability triggers and
//! owner-isolation RLS policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: INSTALLMENTS (owned by the CRUD layer, read here)
        // ============================================================
        db.execute_unprepared(INSTALLMENTS_SQL).await?;

        // ============================================================
        // PART 3: WALLETS & BALANCES
        // ============================================================
        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(WALLET_BALANCES_SQL).await?;

        // ============================================================
        // PART 4: LEDGER & ALLOCATIONS
        // ============================================================
        db.execute_unprepared(LEDGER_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(INSTALLMENT_ALLOCATIONS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 6: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE wallet_type AS ENUM ('personal', 'investor');

CREATE TYPE wallet_status AS ENUM ('active', 'archived');

CREATE TYPE ledger_direction AS ENUM ('credit', 'debit');

CREATE TYPE ledger_reference_type AS ENUM (
    'initial_investment',
    'adjustment',
    'installment',
    'reversal'
);

CREATE TYPE allocation_status AS ENUM ('active', 'void');

CREATE TYPE installment_status AS ENUM ('active', 'completed', 'cancelled');
";

const INSTALLMENTS_SQL: &str = r"
CREATE TABLE installments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    owner_id UUID NOT NULL,
    client_id UUID NOT NULL,
    product_name VARCHAR(200) NOT NULL,
    total_amount_minor_units BIGINT NOT NULL,
    status installment_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_installment_total_positive CHECK (total_amount_minor_units > 0)
);

CREATE INDEX idx_installments_owner ON installments(owner_id);
";

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    owner_id UUID NOT NULL,
    name VARCHAR(100) NOT NULL,
    wallet_type wallet_type NOT NULL,
    currency CHAR(3) NOT NULL DEFAULT 'RUB',
    status wallet_status NOT NULL DEFAULT 'active',
    require_nonnegative BOOLEAN NOT NULL DEFAULT true,
    allow_partial_allocation BOOLEAN NOT NULL DEFAULT false,
    investment_amount_minor_units BIGINT,
    investor_percentage NUMERIC(7, 4),
    user_percentage NUMERIC(7, 4),
    investment_return_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_wallet_currency CHECK (currency = 'RUB'),
    CONSTRAINT chk_wallet_name CHECK (length(trim(name)) > 0),
    CONSTRAINT chk_investor_terms CHECK (
        wallet_type <> 'investor' OR (
            investment_amount_minor_units > 0
            AND investor_percentage BETWEEN 0 AND 100
            AND user_percentage BETWEEN 0 AND 100
            AND investment_return_date IS NOT NULL
        )
    )
);

CREATE INDEX idx_wallets_owner_created ON wallets(owner_id, created_at DESC);
";

const WALLET_BALANCES_SQL: &str = r"
CREATE TABLE wallet_balances (
    wallet_id UUID PRIMARY KEY REFERENCES wallets(id),
    owner_id UUID NOT NULL,
    balance_minor_units BIGINT NOT NULL DEFAULT 0,
    version BIGINT NOT NULL DEFAULT 1,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balance_version_positive CHECK (version >= 1)
);
";

const LEDGER_TRANSACTIONS_SQL: &str = r"
CREATE TABLE ledger_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    wallet_id UUID NOT NULL REFERENCES wallets(id),
    owner_id UUID NOT NULL,
    direction ledger_direction NOT NULL,
    amount_minor_units BIGINT NOT NULL,
    currency CHAR(3) NOT NULL,
    reference_type ledger_reference_type NOT NULL,
    reference_id VARCHAR(100),
    description TEXT NOT NULL,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_ledger_amount_positive CHECK (amount_minor_units > 0)
);

CREATE INDEX idx_lt_wallet_created ON ledger_transactions(wallet_id, created_at DESC, id DESC);
CREATE INDEX idx_lt_reference ON ledger_transactions(reference_type, reference_id);
";

const INSTALLMENT_ALLOCATIONS_SQL: &str = r"
CREATE TABLE installment_allocations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    installment_id UUID NOT NULL REFERENCES installments(id),
    wallet_id UUID NOT NULL REFERENCES wallets(id),
    owner_id UUID NOT NULL,
    amount_minor_units BIGINT NOT NULL,
    status allocation_status NOT NULL DEFAULT 'active',
    notes TEXT,
    transaction_id UUID NOT NULL REFERENCES ledger_transactions(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_allocation_amount_positive CHECK (amount_minor_units > 0)
);

CREATE INDEX idx_ia_installment_status ON installment_allocations(installment_id, status);
CREATE INDEX idx_ia_wallet ON installment_allocations(wallet_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_ledger_mutation
-- Ledger rows are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_ledger_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Ledger transactions are immutable. Append a reversal instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_ledger_mutation
BEFORE UPDATE OR DELETE ON ledger_transactions
FOR EACH ROW
EXECUTE FUNCTION prevent_ledger_mutation();

-- ============================================================
-- FUNCTION: guard_allocation_update
-- Only active -> void is allowed; void is terminal
-- ============================================================
CREATE OR REPLACE FUNCTION guard_allocation_update()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'void' THEN
        RAISE EXCEPTION 'Cannot modify voided allocation.';
    END IF;

    IF NEW.installment_id <> OLD.installment_id
        OR NEW.wallet_id <> OLD.wallet_id
        OR NEW.owner_id <> OLD.owner_id
        OR NEW.amount_minor_units <> OLD.amount_minor_units
        OR NEW.transaction_id <> OLD.transaction_id
        OR NEW.notes IS DISTINCT FROM OLD.notes
        OR NEW.created_at <> OLD.created_at THEN
        RAISE EXCEPTION 'Only the status of an allocation can change.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_guard_allocation_update
BEFORE UPDATE ON installment_allocations
FOR EACH ROW
EXECUTE FUNCTION guard_allocation_update();

-- ============================================================
-- FUNCTION: prevent_allocation_delete
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_allocation_delete()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Allocations are never deleted. Void them instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_allocation_delete
BEFORE DELETE ON installment_allocations
FOR EACH ROW
EXECUTE FUNCTION prevent_allocation_delete();

-- ============================================================
-- FUNCTION: guard_wallet_update
-- Wallet metadata is immutable except status
-- ============================================================
CREATE OR REPLACE FUNCTION guard_wallet_update()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.owner_id <> OLD.owner_id
        OR NEW.name <> OLD.name
        OR NEW.wallet_type <> OLD.wallet_type
        OR NEW.currency <> OLD.currency
        OR NEW.require_nonnegative <> OLD.require_nonnegative
        OR NEW.allow_partial_allocation <> OLD.allow_partial_allocation
        OR NEW.investment_amount_minor_units IS DISTINCT FROM OLD.investment_amount_minor_units
        OR NEW.investor_percentage IS DISTINCT FROM OLD.investor_percentage
        OR NEW.user_percentage IS DISTINCT FROM OLD.user_percentage
        OR NEW.investment_return_date IS DISTINCT FROM OLD.investment_return_date THEN
        RAISE EXCEPTION 'Only the status of a wallet can change.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_guard_wallet_update
BEFORE UPDATE ON wallets
FOR EACH ROW
EXECUTE FUNCTION guard_wallet_update();
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- Application sets context per transaction:
--   SELECT set_config('app.current_owner_id', '<owner-uuid>', true);
-- ============================================================

ALTER TABLE installments ENABLE ROW LEVEL SECURITY;
ALTER TABLE wallets ENABLE ROW LEVEL SECURITY;
ALTER TABLE wallet_balances ENABLE ROW LEVEL SECURITY;
ALTER TABLE ledger_transactions ENABLE ROW LEVEL SECURITY;
ALTER TABLE installment_allocations ENABLE ROW LEVEL SECURITY;

CREATE POLICY owner_isolation ON installments
    USING (owner_id = current_setting('app.current_owner_id', true)::UUID);

CREATE POLICY owner_isolation ON wallets
    USING (owner_id = current_setting('app.current_owner_id', true)::UUID);

CREATE POLICY owner_isolation ON wallet_balances
    USING (owner_id = current_setting('app.current_owner_id', true)::UUID);

CREATE POLICY owner_isolation ON ledger_transactions
    USING (owner_id = current_setting('app.current_owner_id', true)::UUID);

CREATE POLICY owner_isolation ON installment_allocations
    USING (owner_id = current_setting('app.current_owner_id', true)::UUID);
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TRIGGER IF EXISTS trg_guard_wallet_update ON wallets;
DROP TRIGGER IF EXISTS trg_prevent_allocation_delete ON installment_allocations;
DROP TRIGGER IF EXISTS trg_guard_allocation_update ON installment_allocations;
DROP TRIGGER IF EXISTS trg_prevent_ledger_mutation ON ledger_transactions;

DROP FUNCTION IF EXISTS guard_wallet_update();
DROP FUNCTION IF EXISTS prevent_allocation_delete();
DROP FUNCTION IF EXISTS guard_allocation_update();
DROP FUNCTION IF EXISTS prevent_ledger_mutation();

DROP TABLE IF EXISTS installment_allocations CASCADE;
DROP TABLE IF EXISTS ledger_transactions CASCADE;
DROP TABLE IF EXISTS wallet_balances CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
DROP TABLE IF EXISTS installments CASCADE;

DROP TYPE IF EXISTS installment_status;
DROP TYPE IF EXISTS allocation_status;
DROP TYPE IF EXISTS ledger_reference_type;
DROP TYPE IF EXISTS ledger_direction;
DROP TYPE IF EXISTS wallet_status;
DROP TYPE IF EXISTS wallet_type;
";

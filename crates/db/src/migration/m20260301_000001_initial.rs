//! Initial database migration.
//!
//! Creates the enums, tables, and indexes for the ledger core.

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
        // PART 2: TENANTS & ACCOUNTS
        // ============================================================
        db.execute_unprepared(SACCOS_SQL).await?;
        db.execute_unprepared(MEMBER_ACCOUNTS_SQL).await?;
        db.execute_unprepared(GL_ACCOUNTS_SQL).await?;
        db.execute_unprepared(TILLS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 4: LOANS
        // ============================================================
        db.execute_unprepared(LOAN_PRODUCTS_SQL).await?;
        db.execute_unprepared(LOAN_APPLICATIONS_SQL).await?;

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
-- Which table an entry leg's account identifier resolves against
CREATE TYPE account_kind AS ENUM ('member', 'gl');

-- Debit or credit
CREATE TYPE entry_type AS ENUM ('debit', 'credit');

-- Entry leg status
CREATE TYPE entry_status AS ENUM (
    'pending',
    'approved',
    'rejected',
    'cancelled',
    'deleted'
);

-- Business classification of a posting
CREATE TYPE entry_kind AS ENUM (
    'transfer',
    'cash_deposit',
    'cash_withdrawal',
    'loan_disbursement',
    'teller_batch'
);

-- Loan application status
CREATE TYPE loan_status AS ENUM (
    'pending',
    'sanctioned',
    'disbursed',
    'rejected'
);
";

const SACCOS_SQL: &str = r"
CREATE TABLE saccos (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const MEMBER_ACCOUNTS_SQL: &str = r"
CREATE TABLE member_accounts (
    id UUID PRIMARY KEY,
    sacco_id UUID NOT NULL REFERENCES saccos(id),
    member_id UUID NOT NULL,
    account_number VARCHAR(64) NOT NULL UNIQUE,
    currency CHAR(3) NOT NULL,
    clear_balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    unsupervised_credits NUMERIC(20, 4) NOT NULL DEFAULT 0,
    unsupervised_debits NUMERIC(20, 4) NOT NULL DEFAULT 0,
    frozen_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    pending_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    -- Derived: clear + unsupervised_credits - unsupervised_debits
    --        - frozen_amount - pending_charges.
    -- Written only together with the fields it derives from.
    available_balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_member_accounts_sacco ON member_accounts(sacco_id);
CREATE INDEX idx_member_accounts_member ON member_accounts(member_id);
";

const GL_ACCOUNTS_SQL: &str = r"
CREATE TABLE gl_accounts (
    id UUID PRIMARY KEY,
    sacco_id UUID NOT NULL REFERENCES saccos(id),
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    currency CHAR(3) NOT NULL,
    available_balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (sacco_id, code)
);

CREATE INDEX idx_gl_accounts_sacco ON gl_accounts(sacco_id);
";

const TILLS_SQL: &str = r"
CREATE TABLE tills (
    id UUID PRIMARY KEY,
    sacco_id UUID NOT NULL REFERENCES saccos(id),
    name VARCHAR(255) NOT NULL,
    cashier_id UUID NOT NULL,
    gl_account_id UUID NOT NULL REFERENCES gl_accounts(id),
    max_transaction_amount NUMERIC(20, 4) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- One active till per cashier within a SACCO
CREATE UNIQUE INDEX idx_tills_cashier
    ON tills(sacco_id, cashier_id) WHERE is_active;
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    transaction_code VARCHAR(64) NOT NULL UNIQUE,
    reference_number VARCHAR(64) NOT NULL,
    sacco_id UUID NOT NULL REFERENCES saccos(id),
    account_id UUID NOT NULL,
    account_kind account_kind NOT NULL,
    entry_type entry_type NOT NULL,
    amount NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    status entry_status NOT NULL DEFAULT 'pending',
    kind entry_kind NOT NULL,
    remarks TEXT,
    created_by UUID NOT NULL,
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledger_entries_reference ON ledger_entries(reference_number);
CREATE INDEX idx_ledger_entries_account ON ledger_entries(account_id);
CREATE INDEX idx_ledger_entries_sacco_status ON ledger_entries(sacco_id, status);
";

const LOAN_PRODUCTS_SQL: &str = r"
CREATE TABLE loan_products (
    id UUID PRIMARY KEY,
    sacco_id UUID NOT NULL REFERENCES saccos(id),
    name VARCHAR(255) NOT NULL,
    currency CHAR(3) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const LOAN_APPLICATIONS_SQL: &str = r"
CREATE TABLE loan_applications (
    id UUID PRIMARY KEY,
    sacco_id UUID NOT NULL REFERENCES saccos(id),
    member_id UUID NOT NULL,
    product_id UUID NOT NULL REFERENCES loan_products(id),
    amount NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    status loan_status NOT NULL DEFAULT 'pending',
    main_repayment_account_id UUID REFERENCES member_accounts(id),
    disbursed_by UUID,
    disbursed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_loan_applications_sacco_status ON loan_applications(sacco_id, status);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS loan_applications CASCADE;
DROP TABLE IF EXISTS loan_products CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS tills CASCADE;
DROP TABLE IF EXISTS gl_accounts CASCADE;
DROP TABLE IF EXISTS member_accounts CASCADE;
DROP TABLE IF EXISTS saccos CASCADE;

DROP TYPE IF EXISTS loan_status;
DROP TYPE IF EXISTS entry_kind;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS entry_type;
DROP TYPE IF EXISTS account_kind;
";

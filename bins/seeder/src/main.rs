//! Database seeder for Harambee development and testing.
//!
//! Seeds a test SACCO, GL accounts, a cashier till, member accounts, a loan
//! product, and a sanctioned loan application ready for disbursement.
//!
//! Member accounts are funded through the posting engine rather than by
//! writing balance columns, so seeded data satisfies the same invariants as
//! production data.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use harambee_core::ledger::{EntryKind, EntryStatus, SequenceAllocator};
use harambee_core::loan::LoanStatus;
use harambee_db::entities::{loan_applications, loan_products, saccos, tills};
use harambee_db::repositories::{
    AccountRepository, CreateGlAccountInput, CreateMemberAccountInput, PostPairInput,
    PostingRepository,
};

/// Test SACCO ID (consistent for all seeds)
const TEST_SACCO_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test cashier user ID (consistent for all seeds)
const TEST_CASHIER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Test member ID (consistent for all seeds)
const TEST_MEMBER_ID: &str = "00000000-0000-0000-0000-000000000003";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = harambee_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test SACCO...");
    if !seed_sacco(&db).await {
        println!("Seeding complete (nothing to do)!");
        return;
    }

    println!("Seeding GL accounts and till...");
    let (till_gl_id, funding_gl_id) = seed_gl_and_till(&db).await;

    println!("Seeding member accounts...");
    let member_account_id = seed_member_accounts(&db).await;

    println!("Funding seeded accounts...");
    fund_accounts(&db, funding_gl_id, member_account_id).await;

    println!("Seeding loan product and sanctioned application...");
    seed_loan(&db).await;

    println!("Seeding complete!");
    println!("  Till GL:        {till_gl_id}");
    println!("  Member account: {member_account_id}");
}

fn sacco_id() -> Uuid {
    Uuid::parse_str(TEST_SACCO_ID).unwrap()
}

fn cashier_id() -> Uuid {
    Uuid::parse_str(TEST_CASHIER_ID).unwrap()
}

fn member_id() -> Uuid {
    Uuid::parse_str(TEST_MEMBER_ID).unwrap()
}

/// Seeds the test SACCO. Returns false when it already exists.
async fn seed_sacco(db: &DatabaseConnection) -> bool {
    if saccos::Entity::find_by_id(sacco_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test SACCO already exists, skipping...");
        return false;
    }

    let now = Utc::now().into();
    let sacco = saccos::ActiveModel {
        id: Set(sacco_id()),
        name: Set("Harambee Test SACCO".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match sacco.insert(db).await {
        Ok(_) => {
            println!("  Created test SACCO: Harambee Test SACCO");
            true
        }
        Err(e) => {
            eprintln!("Failed to insert test SACCO: {e}");
            false
        }
    }
}

/// Seeds the till GL account (with cash on hand), a funding GL account, and
/// the cashier's till row. Returns (till GL id, funding GL id).
async fn seed_gl_and_till(db: &DatabaseConnection) -> (Uuid, Uuid) {
    let accounts = AccountRepository::new(db.clone());

    let till_gl = accounts
        .create_gl_account(CreateGlAccountInput {
            sacco_id: sacco_id(),
            code: "1001".to_string(),
            name: "Main Till".to_string(),
            currency: "KES".to_string(),
            opening_balance: Decimal::from_str("100000").unwrap(),
        })
        .await
        .expect("Failed to create till GL account");

    let funding_gl = accounts
        .create_gl_account(CreateGlAccountInput {
            sacco_id: sacco_id(),
            code: "3001".to_string(),
            name: "Member Deposits".to_string(),
            currency: "KES".to_string(),
            opening_balance: Decimal::from_str("500000").unwrap(),
        })
        .await
        .expect("Failed to create funding GL account");

    let now = Utc::now().into();
    let till = tills::ActiveModel {
        id: Set(Uuid::new_v4()),
        sacco_id: Set(sacco_id()),
        name: Set("Counter 1".to_string()),
        cashier_id: Set(cashier_id()),
        gl_account_id: Set(till_gl.id),
        max_transaction_amount: Set(Decimal::from_str("50000").unwrap()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = till.insert(db).await {
        eprintln!("Failed to insert till: {e}");
    } else {
        println!("  Created till: Counter 1");
    }

    (till_gl.id, funding_gl.id)
}

/// Seeds a member savings account. Returns its id.
async fn seed_member_accounts(db: &DatabaseConnection) -> Uuid {
    let accounts = AccountRepository::new(db.clone());

    let account = accounts
        .create_member_account(CreateMemberAccountInput {
            sacco_id: sacco_id(),
            member_id: member_id(),
            account_number: "SAV-000001".to_string(),
            currency: "KES".to_string(),
        })
        .await
        .expect("Failed to create member account");

    println!("  Created member account: SAV-000001");
    account.id
}

/// Gives the member account an opening balance by posting an approved pair
/// out of the funding GL account.
async fn fund_accounts(db: &DatabaseConnection, funding_gl_id: Uuid, member_account_id: Uuid) {
    let posting = PostingRepository::new(db.clone(), Arc::new(SequenceAllocator::new("seed")));

    match posting
        .post_pair(PostPairInput {
            sacco_id: sacco_id(),
            debit_account_id: funding_gl_id,
            credit_account_id: member_account_id,
            amount: Decimal::from_str("25000").unwrap(),
            kind: EntryKind::Transfer,
            status: EntryStatus::Approved,
            remarks: Some("Seed opening balance".to_string()),
            created_by: cashier_id(),
        })
        .await
    {
        Ok(_) => println!("  Funded SAV-000001 with 25000 KES"),
        Err(e) => eprintln!("Failed to fund member account: {e}"),
    }
}

/// Seeds a loan product and a sanctioned application ready for disbursement.
async fn seed_loan(db: &DatabaseConnection) {
    let now = Utc::now().into();

    let product_id = Uuid::new_v4();
    let product = loan_products::ActiveModel {
        id: Set(product_id),
        sacco_id: Set(sacco_id()),
        name: Set("Development Loan".to_string()),
        currency: Set("KES".to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = product.insert(db).await {
        eprintln!("Failed to insert loan product: {e}");
        return;
    }
    println!("  Created loan product: Development Loan");

    let application = loan_applications::ActiveModel {
        id: Set(Uuid::new_v4()),
        sacco_id: Set(sacco_id()),
        member_id: Set(member_id()),
        product_id: Set(product_id),
        amount: Set(Decimal::from_str("5000").unwrap()),
        status: Set(LoanStatus::Sanctioned.into()),
        main_repayment_account_id: Set(None),
        disbursed_by: Set(None),
        disbursed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = application.insert(db).await {
        eprintln!("Failed to insert loan application: {e}");
    } else {
        println!("  Created sanctioned loan application: 5000 KES");
    }
}

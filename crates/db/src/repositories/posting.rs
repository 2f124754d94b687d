//! Posting repository: entry creation, approval, rejection, and reversal.
//!
//! Every balance-affecting operation runs inside one database transaction
//! spanning all legs of a reference. Balance math comes from the core effect
//! table; this repository only decides transaction boundaries, row locking,
//! and which rows to touch.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use harambee_core::ledger::{
    AccountKind, BalanceEffect, EntryEvent, EntryKind, EntryStatus, EntryType, LedgerError,
    LegDelta, LegInput, ReferenceAllocator, creation_effect, gl_sufficiency_required, leg_delta,
    transition, validate_batch, validate_pair,
};

use crate::entities::ledger_entries;
use crate::repositories::account::AccountRepository;

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

/// Input for a two-leg posting.
#[derive(Debug, Clone)]
pub struct PostPairInput {
    /// The SACCO named by the request.
    pub sacco_id: Uuid,
    /// Account the funds leave.
    pub debit_account_id: Uuid,
    /// Account the funds enter.
    pub credit_account_id: Uuid,
    /// Posting amount (positive).
    pub amount: Decimal,
    /// Business classification.
    pub kind: EntryKind,
    /// Initial status (Pending or Approved).
    pub status: EntryStatus,
    /// Free-text remarks carried by both legs.
    pub remarks: Option<String>,
    /// Creating user.
    pub created_by: Uuid,
}

/// Input for an N-leg teller batch.
#[derive(Debug, Clone)]
pub struct PostBatchInput {
    /// The SACCO named by the request.
    pub sacco_id: Uuid,
    /// The requested legs (N >= 2, balanced).
    pub legs: Vec<LegInput>,
    /// Business classification.
    pub kind: EntryKind,
    /// Initial status (Pending or Approved).
    pub status: EntryStatus,
    /// Creating user.
    pub created_by: Uuid,
}

/// Mutable fields of a pending entry.
#[derive(Debug, Clone, Default)]
pub struct UpdateEntryInput {
    /// New amount for both legs of the pair.
    pub amount: Option<Decimal>,
    /// New business classification for all legs.
    pub kind: Option<EntryKind>,
    /// New remarks for the addressed leg only.
    pub remarks: Option<String>,
}

/// Filter options for listing entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Filter by reference number.
    pub reference: Option<String>,
    /// Filter by status.
    pub status: Option<EntryStatus>,
    /// Filter by account.
    pub account_id: Option<Uuid>,
}

/// Repository for creating and transitioning ledger entries.
#[derive(Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
    references: Arc<dyn ReferenceAllocator>,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, references: Arc<dyn ReferenceAllocator>) -> Self {
        Self { db, references }
    }

    // ========================================================================
    // Posting
    // ========================================================================

    /// Creates a balanced debit/credit pair.
    ///
    /// # Errors
    ///
    /// Validation, tenancy, sufficiency, or persistence errors; nothing is
    /// persisted on failure.
    pub async fn post_pair(
        &self,
        input: PostPairInput,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        let (amount, kind) = (input.amount, input.kind);

        let txn = self.db.begin().await.map_err(db_err)?;
        let entries = self.post_pair_on(&txn, input).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            reference = %entries[0].reference_number,
            %amount,
            %kind,
            "posted entry pair"
        );
        Ok(entries)
    }

    /// Creates an N-leg balanced batch sharing one reference.
    ///
    /// # Errors
    ///
    /// Validation, tenancy, sufficiency, or persistence errors; nothing is
    /// persisted on failure.
    pub async fn post_batch(
        &self,
        input: PostBatchInput,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        validate_batch(&input.legs)?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let entries = self
            .post_legs_on(&txn, input.sacco_id, &input.legs, input.kind, input.status, input.created_by)
            .await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            reference = %entries[0].reference_number,
            legs = entries.len(),
            kind = %input.kind,
            "posted teller batch"
        );
        Ok(entries)
    }

    /// Creates a pair inside a caller-owned transaction.
    ///
    /// Used by orchestrations (loan disbursement) that post as one step of a
    /// larger atomic sequence.
    ///
    /// # Errors
    ///
    /// See [`PostingRepository::post_pair`].
    pub async fn post_pair_on(
        &self,
        txn: &DatabaseTransaction,
        input: PostPairInput,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        validate_pair(input.debit_account_id, input.credit_account_id, input.amount)?;

        let legs = vec![
            LegInput {
                account_id: input.debit_account_id,
                entry_type: EntryType::Debit,
                amount: input.amount,
                remarks: input.remarks.clone(),
            },
            LegInput {
                account_id: input.credit_account_id,
                entry_type: EntryType::Credit,
                amount: input.amount,
                remarks: input.remarks,
            },
        ];

        self.post_legs_on(txn, input.sacco_id, &legs, input.kind, input.status, input.created_by)
            .await
    }

    /// Shared leg-writing path for pairs and batches.
    ///
    /// Resolution, tenancy, and sufficiency checks all happen before the
    /// first row write so a failed posting leaves no trace.
    async fn post_legs_on(
        &self,
        txn: &DatabaseTransaction,
        sacco_id: Uuid,
        legs: &[LegInput],
        kind: EntryKind,
        status: EntryStatus,
        created_by: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        let effect = creation_effect(status)?;

        // Resolve every account and enforce tenancy up front.
        let mut resolved = Vec::with_capacity(legs.len());
        for leg in legs {
            let account = AccountRepository::resolve_on(txn, leg.account_id).await?;
            if account.sacco_id() != sacco_id {
                return Err(LedgerError::SaccoMismatch {
                    account_id: leg.account_id,
                    account_sacco: account.sacco_id(),
                    request_sacco: sacco_id,
                });
            }
            resolved.push(account);
        }

        // GL debit legs must be covered before anything is written, even for
        // pending postings whose balance effect is deferred to approval.
        for (leg, account) in legs.iter().zip(&resolved) {
            if let Some(required) = gl_sufficiency_required(account.kind(), leg.entry_type, leg.amount)
            {
                if account.available_balance() < required {
                    return Err(LedgerError::InsufficientGlFunds {
                        account_id: leg.account_id,
                        available: account.available_balance(),
                        requested: required,
                    });
                }
            }
        }

        let reference = self.references.reference_number();
        let now = Utc::now();
        let mut entries = Vec::with_capacity(legs.len());

        for (leg, account) in legs.iter().zip(&resolved) {
            let entry = ledger_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_code: Set(self.references.transaction_code()),
                reference_number: Set(reference.clone()),
                sacco_id: Set(sacco_id),
                account_id: Set(leg.account_id),
                account_kind: Set(account.kind().into()),
                entry_type: Set(leg.entry_type.into()),
                amount: Set(leg.amount),
                status: Set(status.into()),
                kind: Set(kind.into()),
                remarks: Set(leg.remarks.clone()),
                created_by: Set(created_by),
                approved_by: Set(None),
                approved_at: Set(None),
                is_deleted: Set(false),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            let entry = entry.insert(txn).await.map_err(db_err)?;

            Self::apply_leg_on(txn, account.kind(), leg.account_id, leg.entry_type, effect, leg.amount)
                .await?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Applies one leg's balance movement for the given effect.
    async fn apply_leg_on(
        txn: &DatabaseTransaction,
        kind: AccountKind,
        account_id: Uuid,
        entry_type: EntryType,
        effect: BalanceEffect,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        match leg_delta(kind, entry_type, effect, amount) {
            LegDelta::None => Ok(()),
            LegDelta::Member(delta) => {
                AccountRepository::apply_member_delta_on(txn, account_id, &delta).await
            }
            LegDelta::Gl { available } => {
                // A draining GL write re-checks sufficiency inside the same
                // conditional UPDATE.
                let required = if available < Decimal::ZERO {
                    Some(-available)
                } else {
                    None
                };
                AccountRepository::apply_gl_delta_on(txn, account_id, available, required).await
            }
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Approves the Pending pair carrying `reference`.
    ///
    /// # Errors
    ///
    /// `MalformedPair` unless exactly two pending legs exist; state-conflict
    /// errors from the transition engine otherwise.
    pub async fn approve_reference(
        &self,
        reference: &str,
        approver: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        self.transition_reference(reference, EntryEvent::Approve, approver, true)
            .await
    }

    /// Applies `event` to every leg carrying `reference`.
    ///
    /// With `require_pair`, the reference must carry exactly one debit and
    /// one credit leg of equal amount; teller batches pass `false` and only
    /// need uniform status.
    ///
    /// # Errors
    ///
    /// Not-found, malformed-pair, or state-conflict errors; the transaction
    /// rolls back on any failure.
    pub async fn transition_reference(
        &self,
        reference: &str,
        event: EntryEvent,
        actor: Uuid,
        require_pair: bool,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let legs = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ReferenceNumber.eq(reference))
            .filter(ledger_entries::Column::IsDeleted.eq(false))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_err)?;

        if legs.is_empty() {
            return Err(LedgerError::ReferenceNotFound(reference.to_string()));
        }

        let current = EntryStatus::from(legs[0].status);
        if legs.iter().any(|leg| EntryStatus::from(leg.status) != current) {
            return Err(LedgerError::MixedStatus(reference.to_string()));
        }

        if require_pair {
            Self::require_balanced_pair(reference, &legs)?;
        }

        let step = transition(current, event)?;

        for leg in &legs {
            Self::apply_leg_on(
                &txn,
                leg.account_kind.into(),
                leg.account_id,
                leg.entry_type.into(),
                step.effect,
                leg.amount,
            )
            .await?;
        }

        let now = Utc::now();
        let mut updated = Vec::with_capacity(legs.len());
        for leg in legs {
            let mut active: ledger_entries::ActiveModel = leg.into();
            active.status = Set(step.next.into());
            active.updated_at = Set(now.into());
            if event == EntryEvent::Approve {
                active.approved_by = Set(Some(actor));
                active.approved_at = Set(Some(now.into()));
            }
            if step.next == EntryStatus::Deleted {
                active.is_deleted = Set(true);
            }
            updated.push(active.update(&txn).await.map_err(db_err)?);
        }

        txn.commit().await.map_err(db_err)?;

        info!(reference, %event, next = %step.next, "entry transition");
        Ok(updated)
    }

    /// Reverses the posting that `entry_id` belongs to.
    ///
    /// Both legs are marked Deleted together; an Approved posting has its
    /// settled effect inverted, a Pending posting has its holds released.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` for unknown ids; state-conflict when already deleted.
    pub async fn reverse_entry(
        &self,
        entry_id: Uuid,
        actor: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        let entry = ledger_entries::Entity::find_by_id(entry_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        if entry.is_deleted {
            return Err(LedgerError::InvalidTransition {
                from: EntryStatus::Deleted,
                event: EntryEvent::Reverse,
            });
        }

        self.transition_reference(&entry.reference_number, EntryEvent::Reverse, actor, false)
            .await
    }

    // ========================================================================
    // Updates & queries
    // ========================================================================

    /// Edits a pending entry's mutable fields.
    ///
    /// Amount changes re-issue the hold on both legs so the pair invariant
    /// and the unsupervised buckets stay consistent. Remarks may change on
    /// any non-deleted entry.
    ///
    /// # Errors
    ///
    /// `NotEditable` when amount or kind changes target a non-pending entry.
    pub async fn update_entry(
        &self,
        entry_id: Uuid,
        input: UpdateEntryInput,
    ) -> Result<ledger_entries::Model, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let entry = ledger_entries::Entity::find_by_id(entry_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        if entry.is_deleted {
            return Err(LedgerError::NotEditable);
        }

        let status = EntryStatus::from(entry.status);
        let structural_change = input.amount.is_some() || input.kind.is_some();
        if structural_change && !status.is_editable() {
            return Err(LedgerError::NotEditable);
        }

        if structural_change {
            let legs = ledger_entries::Entity::find()
                .filter(ledger_entries::Column::ReferenceNumber.eq(entry.reference_number.clone()))
                .filter(ledger_entries::Column::IsDeleted.eq(false))
                .lock_exclusive()
                .all(&txn)
                .await
                .map_err(db_err)?;

            if input.amount.is_some() {
                Self::require_balanced_pair(&entry.reference_number, &legs)?;
            }

            let now = Utc::now();
            for leg in legs {
                if let Some(new_amount) = input.amount {
                    if new_amount <= Decimal::ZERO {
                        return Err(LedgerError::ZeroAmount);
                    }
                    // Release the old hold, take the new one.
                    Self::apply_leg_on(
                        &txn,
                        leg.account_kind.into(),
                        leg.account_id,
                        leg.entry_type.into(),
                        BalanceEffect::ReleaseHold,
                        leg.amount,
                    )
                    .await?;
                    Self::apply_leg_on(
                        &txn,
                        leg.account_kind.into(),
                        leg.account_id,
                        leg.entry_type.into(),
                        BalanceEffect::Hold,
                        new_amount,
                    )
                    .await?;
                }

                let mut active: ledger_entries::ActiveModel = leg.into();
                if let Some(new_amount) = input.amount {
                    active.amount = Set(new_amount);
                }
                if let Some(kind) = input.kind {
                    active.kind = Set(kind.into());
                }
                active.updated_at = Set(now.into());
                active.update(&txn).await.map_err(db_err)?;
            }
        }

        if let Some(remarks) = input.remarks {
            let mut active: ledger_entries::ActiveModel =
                ledger_entries::Entity::find_by_id(entry_id)
                    .one(&txn)
                    .await
                    .map_err(db_err)?
                    .ok_or(LedgerError::EntryNotFound(entry_id))?
                    .into();
            active.remarks = Set(Some(remarks));
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await.map_err(db_err)?;
        }

        let updated = ledger_entries::Entity::find_by_id(entry_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Fetches one entry leg by id.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` when no row matches.
    pub async fn find_entry(&self, entry_id: Uuid) -> Result<ledger_entries::Model, LedgerError> {
        ledger_entries::Entity::find_by_id(entry_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::EntryNotFound(entry_id))
    }

    /// Fetches all non-deleted legs of a reference.
    ///
    /// # Errors
    ///
    /// `ReferenceNotFound` when no legs match.
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        let legs = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ReferenceNumber.eq(reference))
            .filter(ledger_entries::Column::IsDeleted.eq(false))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        if legs.is_empty() {
            return Err(LedgerError::ReferenceNotFound(reference.to_string()));
        }
        Ok(legs)
    }

    /// Lists entries for a SACCO with optional filters.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_entries(
        &self,
        sacco_id: Uuid,
        filter: EntryFilter,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::SaccoId.eq(sacco_id));

        if let Some(reference) = filter.reference {
            query = query.filter(ledger_entries::Column::ReferenceNumber.eq(reference));
        }
        if let Some(status) = filter.status {
            query = query.filter(
                ledger_entries::Column::Status.eq(crate::entities::sea_orm_active_enums::DbEntryStatus::from(status)),
            );
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(ledger_entries::Column::AccountId.eq(account_id));
        }

        query
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Checks that the legs form one balanced debit/credit pair.
    fn require_balanced_pair(
        reference: &str,
        legs: &[ledger_entries::Model],
    ) -> Result<(), LedgerError> {
        if legs.len() != 2 {
            return Err(LedgerError::MalformedPair {
                reference: reference.to_string(),
                legs: legs.len(),
            });
        }

        let debit = legs
            .iter()
            .find(|l| EntryType::from(l.entry_type) == EntryType::Debit);
        let credit = legs
            .iter()
            .find(|l| EntryType::from(l.entry_type) == EntryType::Credit);

        match (debit, credit) {
            (Some(d), Some(c)) if d.amount == c.amount => Ok(()),
            _ => Err(LedgerError::MalformedPair {
                reference: reference.to_string(),
                legs: legs.len(),
            }),
        }
    }
}

impl std::fmt::Debug for PostingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostingRepository").finish_non_exhaustive()
    }
}

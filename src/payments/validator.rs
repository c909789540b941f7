use std::collections::{BTreeMap, BTreeSet};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::month::Month;
use crate::types::EntryStatus;

/// status and outstanding balance of one month, as snapshotted for
/// validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthStanding {
    pub status: EntryStatus,
    pub balance: Money,
}

/// enforces the earliest-unpaid-month-first rule
///
/// All functions are pure decision functions over a caller-supplied snapshot
/// of the target year: a map keyed by chargeable month, in which an absent
/// stored entry appears as implicit unpaid. Snapshots may be stale; callers
/// re-validate against fresh state at commit time via `validate_batch`.
pub struct SequentialPaymentValidator;

impl SequentialPaymentValidator {
    /// months a caller may currently tick: every already-selected unpaid
    /// month plus the single earliest unpaid, unselected month
    pub fn allowed_months(
        statuses: &BTreeMap<Month, EntryStatus>,
        selected: &BTreeSet<Month>,
    ) -> BTreeSet<Month> {
        let mut allowed = BTreeSet::new();
        for (&month, status) in statuses {
            if status.is_paid() {
                continue;
            }
            allowed.insert(month);
            if !selected.contains(&month) {
                // the frontier grows by one month at a time
                break;
            }
        }
        allowed
    }

    /// a month may be ticked only when no unpaid, unselected month precedes
    /// it
    pub fn can_select(
        month: Month,
        selected: &BTreeSet<Month>,
        statuses: &BTreeMap<Month, EntryStatus>,
    ) -> Result<()> {
        for (&earlier, status) in statuses.range(..month) {
            if !status.is_paid() && !selected.contains(&earlier) {
                return Err(LedgerError::EarlierMonthUnpaid { blocking_month: earlier });
            }
        }
        Ok(())
    }

    /// selection shrinks strictly last-in-first-out, keeping it a prefix of
    /// consecutive unpaid months
    pub fn can_deselect(month: Month, selected: &BTreeSet<Month>) -> Result<()> {
        if !selected.contains(&month) {
            return Err(LedgerError::MonthNotSelected { month });
        }
        let latest = *selected
            .iter()
            .next_back()
            .unwrap_or(&month);
        if month != latest {
            return Err(LedgerError::MustDeselectLatestFirst { latest_month: latest });
        }
        Ok(())
    }

    /// re-validate an entire candidate set against fresh standings
    ///
    /// A month counts as covered only once its balance net of the pending
    /// amount reaches zero, so a batch that tops up a partial month may pay
    /// the months after it, while a batch that leaves an earlier month
    /// underpaid is rejected at the first pending month it strands.
    pub fn validate_batch(
        pending: &BTreeMap<Month, Money>,
        standings: &BTreeMap<Month, MonthStanding>,
    ) -> Result<()> {
        if pending.is_empty() {
            return Err(LedgerError::InvalidBatch {
                message: "no months selected".to_string(),
            });
        }

        let years: BTreeSet<i32> = pending.keys().map(|m| m.year()).collect();
        if years.len() > 1 {
            return Err(LedgerError::InvalidBatch {
                message: "batch spans calendar years".to_string(),
            });
        }

        if let Some(month) = pending.keys().find(|m| !standings.contains_key(m)) {
            return Err(LedgerError::InvalidBatch {
                message: format!("month {month} is not chargeable"),
            });
        }

        let mut first_uncovered: Option<Month> = None;
        for (&month, standing) in standings {
            let pending_amount = pending.get(&month).copied().unwrap_or(Money::ZERO);

            if pending_amount.is_positive() && first_uncovered.is_some() {
                return Err(LedgerError::SequentialViolation {
                    first_violating_month: month,
                });
            }

            let covered = standing.balance <= pending_amount;
            if !covered && first_uncovered.is_none() {
                first_uncovered = Some(month);
            }
        }
        Ok(())
    }
}

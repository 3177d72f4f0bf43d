use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;

use crate::{EngineError, ResultEngine};

use super::{Engine, with_tx};

/// Result of one atomic budget decrement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Debit {
    pub username: String,
    pub amount: i64,
    /// Budget left after the decrement, as written by the store.
    pub remaining: i64,
    pub updated_at: DateTime<Utc>,
}

impl Debit {
    /// Compare the post-decrement budget against the budget the caller saw
    /// before the send. A mismatch means another debit interleaved.
    pub fn verify(&self, expected_prior: i64) -> ResultEngine<()> {
        let expected = expected_prior - self.amount;
        if self.remaining != expected {
            return Err(EngineError::BudgetDiscrepancy {
                username: self.username.clone(),
                expected,
                actual: self.remaining,
            });
        }
        Ok(())
    }
}

impl Engine {
    /// Atomically subtract `amount` from the user's budget and stamp
    /// `updated_at`.
    ///
    /// There is no floor: the budget may go below zero. Sufficiency is
    /// checked by the caller before committing to the debit.
    pub async fn debit(&self, username: &str, amount: i64) -> ResultEngine<Debit> {
        if amount < 1 {
            return Err(EngineError::BadRequest(
                "debit amount must be >= 1".to_string(),
            ));
        }
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let user = self
                .decrement_budget(&db_tx, username, amount, now)
                .await?
                .ok_or_else(|| EngineError::UserNotFound(username.to_string()))?;
            Ok(Debit {
                username: user.username,
                amount,
                remaining: user.budget,
                updated_at: user.updated_at,
            })
        })
    }

    /// Same as [`Engine::debit`], then check the outcome against
    /// `expected_prior`.
    ///
    /// The decrement is kept even when the check fails with
    /// `BudgetDiscrepancy`.
    pub async fn debit_expecting(
        &self,
        username: &str,
        amount: i64,
        expected_prior: i64,
    ) -> ResultEngine<Debit> {
        let debit = self.debit(username, amount).await?;
        debit.verify(expected_prior)?;
        Ok(debit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debit(remaining: i64) -> Debit {
        Debit {
            username: "orange".to_string(),
            amount: 1,
            remaining,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn verify_accepts_the_expected_value() {
        assert_eq!(debit(9).verify(10), Ok(()));
    }

    #[test]
    fn verify_reports_interleaved_debits() {
        assert_eq!(
            debit(7).verify(10),
            Err(EngineError::BudgetDiscrepancy {
                username: "orange".to_string(),
                expected: 9,
                actual: 7,
            })
        );
    }
}

//! Message exchange: one send attempt from validation to debit.
//!
//! A send is accepted as soon as the message is stored. The budget debit runs
//! afterwards on its own task and its outcome is exposed through
//! [`PendingDebit`]; a failed or inconsistent debit is logged and never turns
//! an accepted send into an error.

use tokio::task::JoinHandle;

use crate::{EngineError, Message, ResultEngine, util::validate_message_shape};

use super::{Debit, Engine};

/// Outcome of an accepted send.
#[derive(Debug)]
pub struct Dispatch {
    /// The stored message. Authoritative.
    pub message: Message,
    /// The sender's budget debit. Best effort.
    pub debit: PendingDebit,
}

/// Handle on the budget debit started by [`Engine::send_message`].
///
/// Dropping the handle does not cancel the debit.
#[derive(Debug)]
pub struct PendingDebit {
    handle: JoinHandle<ResultEngine<Debit>>,
}

impl PendingDebit {
    /// Wait for the debit to finish and return its outcome.
    pub async fn settled(self) -> ResultEngine<Debit> {
        self.handle
            .await
            .map_err(|err| EngineError::Task(err.to_string()))?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Engine {
    /// Send `body` from `from` to `to`.
    ///
    /// Rejections, in order: `BadRequest` (before any store access),
    /// `SenderNotFound`, `BudgetExceeded`, `RecipientNotFound`. Store failures
    /// propagate as `Database`. Each lookup and the insert are separate store
    /// round-trips; nothing is locked in between.
    pub async fn send_message(&self, from: &str, to: &str, body: &str) -> ResultEngine<Dispatch> {
        validate_message_shape(from, to, body)?;
        tracing::debug!(from, to, "message shape valid");

        let sender = match self.user_by_username(from).await {
            Ok(user) => user,
            Err(EngineError::UserNotFound(_)) => {
                return Err(EngineError::SenderNotFound(from.to_string()));
            }
            Err(err) => return Err(err),
        };
        if sender.budget < 1 {
            return Err(EngineError::BudgetExceeded(sender.username));
        }
        tracing::debug!(from, budget = sender.budget, "sender budget checked");

        let recipient = match self.user_by_username(to).await {
            Ok(user) => user,
            Err(EngineError::UserNotFound(_)) => {
                return Err(EngineError::RecipientNotFound(to.to_string()));
            }
            Err(err) => return Err(err),
        };

        let message = Message::new(sender.username.clone(), recipient.username, body.to_string());
        let message = self.insert_message(self.database.as_ref(), &message).await?;
        tracing::info!(id = %message.id, from, to, "message accepted");

        let debit = self.spawn_debit(sender.username, sender.budget);
        Ok(Dispatch { message, debit })
    }

    fn spawn_debit(&self, username: String, expected_prior: i64) -> PendingDebit {
        let engine = self.clone();
        let handle = tokio::spawn(async move {
            let outcome = engine.debit_expecting(&username, 1, expected_prior).await;
            match &outcome {
                Ok(debit) => {
                    tracing::debug!(username = %username, remaining = debit.remaining, "budget debited");
                }
                Err(err @ EngineError::BudgetDiscrepancy { .. }) => {
                    tracing::warn!(username = %username, "{err}");
                }
                Err(err) => {
                    tracing::error!(username = %username, "budget debit failed: {err}");
                }
            }
            outcome
        });
        PendingDebit { handle }
    }
}

use std::sync::Arc;

use sea_orm::DatabaseConnection;

mod exchange;
mod ledger;
mod queries;
mod registry;
mod store;

pub use exchange::{Dispatch, PendingDebit};
pub use ledger::Debit;

/// Budget granted to every newly registered user unless the builder says
/// otherwise.
pub const DEFAULT_BUDGET: i64 = 10;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.as_ref().begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every registry, ledger and exchange operation.
///
/// The engine keeps no in-memory copy of users or messages: each call goes
/// to the store, so clones are cheap and may be handed to independent tasks.
/// Clones share one connection pool.
#[derive(Clone, Debug)]
pub struct Engine {
    database: Arc<DatabaseConnection>,
    initial_budget: i64,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Budget assigned to users at registration.
    pub fn initial_budget(&self) -> i64 {
        self.initial_budget
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: Arc<DatabaseConnection>,
    initial_budget: i64,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: Arc::new(DatabaseConnection::default()),
            initial_budget: DEFAULT_BUDGET,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database. An `Arc` lets the caller keep its own
    /// handle on the same connection.
    pub fn database(mut self, db: impl Into<Arc<DatabaseConnection>>) -> EngineBuilder {
        self.database = db.into();
        self
    }

    /// Override the budget given to new users.
    pub fn initial_budget(mut self, budget: i64) -> EngineBuilder {
        self.initial_budget = budget;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        if self.initial_budget < 0 {
            return Err(crate::EngineError::BadRequest(
                "initial budget must be >= 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            initial_budget: self.initial_budget,
        })
    }
}

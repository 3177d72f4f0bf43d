//! Budget ledger and message exchange.
//!
//! Users register with a message budget, send short messages to each other,
//! and are charged one unit of budget per accepted message. Everything goes
//! through [`Engine`], which talks to a sea-orm store migrated with the
//! `migration` crate.

pub use error::{EngineError, ErrorCategory, ErrorCode};
pub use messages::Message;
pub use ops::{DEFAULT_BUDGET, Debit, Dispatch, Engine, EngineBuilder, PendingDebit};
pub use users::User;
pub use util::MAX_BODY_CHARS;

mod error;
mod messages;
mod ops;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

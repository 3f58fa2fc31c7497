//! Storage traits for authentication data.
//!
//! The relational repository layer is an external collaborator; this
//! subsystem consumes it only through the interfaces below. Implementations
//! are provided by storage backends (and by `medibay-auth-memory` for
//! tests and embedded deployments).

mod account;
mod credential;
mod domain;
mod event;
mod session;

pub use account::AccountStore;
pub use credential::{CredentialStore, DictionaryStore};
pub use domain::DomainStore;
pub use event::AuthEventStore;
pub use session::SessionStore;

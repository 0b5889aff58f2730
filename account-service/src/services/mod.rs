pub mod auth;
pub mod completion;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod store;

pub use auth::AuthService;
pub use completion::{CompletionError, CompletionProvider, MockProvider, OpenAiProvider};
pub use error::ServiceError;
pub use guard::{AccessDenied, AccessGuard, AccessPolicy};
pub use jwt::{AuthError, IdentityClaims, TokenService};
pub use store::{MemoryStore, PgStore, RecordStore, StoreError};

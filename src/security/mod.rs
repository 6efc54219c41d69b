pub mod audit_log;
pub mod session;
pub mod token_refresh;
pub mod token_store;

pub use session::{Session, SessionState, TokenPair};
pub use token_store::{FileTokenStore, MemoryTokenStore, StorageError, StoredTokens, TokenStore};

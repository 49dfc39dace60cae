pub mod context;
pub mod store;

pub use context::{Session, SessionContext, SessionState, TOKEN_KEY, USER_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};

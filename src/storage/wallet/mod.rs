pub mod filesystem;
pub mod store;

pub use filesystem::FileSystemWallet;
pub use store::{IdentityStore, MemoryWallet, WalletEntry, WalletError};

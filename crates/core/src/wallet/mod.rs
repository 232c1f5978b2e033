//! Wallet registry logic: wallet metadata, creation rules and investor economics.

pub mod investment;
pub mod types;
pub mod validation;

pub use investment::InvestmentSummary;
pub use types::{InvestorTerms, Wallet, WalletStatus, WalletType, WalletView};
pub use validation::{CreateWalletInput, NewWallet};

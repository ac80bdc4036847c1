pub mod notifier;
pub mod payload;
pub mod signer;

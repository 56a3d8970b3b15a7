mod parser;
mod signer;

pub use parser::{classify_transaction, extract_transfers};
pub use signer::recover_sender;

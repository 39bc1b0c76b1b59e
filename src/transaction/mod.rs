//! Transaction lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Vec<RawTransaction>
//!     → pipeline::group (shared group id)          Grouped
//!     → pipeline::prepare_for_signing              Prepared
//!     → WalletAdapter::sign_transactions           Signed
//!     → NodeApi::send_raw_transactions             Submitted
//!     → confirmation::ConfirmationPoller           Confirmed | Rejected | TimedOut
//! ```
//!
//! # Design Decisions
//! - Transactions live only for one send; nothing is persisted
//! - No stage retries; callers re-run the whole send

pub mod confirmation;
pub mod encoding;
pub mod pipeline;

pub use confirmation::{ConfirmationPoller, Verdict};
pub use encoding::{
    compute_group_id, Address, EncodingError, EncodingResult, FieldValue, GroupId, RawTransaction,
};
pub use pipeline::{SendStage, Submission, TransactionPipeline};

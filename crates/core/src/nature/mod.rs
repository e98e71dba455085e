//! Account nature classification.
//!
//! The nature of an account is the side (debit or credit) its balance normally
//! sits on. It is derived from the account class and a few third-party
//! sub-ranges, never stored.

mod classifier;

#[cfg(test)]
mod classifier_props;

pub use classifier::{
    AccountNature, AccountNatureClassifier, DEFAULT_FLEXIBLE_PREFIXES, LineSideCheck,
};

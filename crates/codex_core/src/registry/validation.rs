//! Request validation for record lifecycle operations.
//!
//! The event source is trusted to emit well-formed addresses, but replayed or
//! hand-written events may not be. When enabled on the lifecycle service, the
//! [`AddressValidator`] rejects requests carrying malformed addresses before
//! anything is loaded or persisted.

use crate::registry::{api::RecordRequest, error::RegistryError};

/// Validator for the addresses carried by [`RecordRequest`]s.
///
/// An address is valid when it is `0x` followed by exactly 40 hexadecimal
/// digits. Addresses are compared after lowercasing, so checksummed input is
/// accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressValidator;

impl AddressValidator {
    pub fn is_valid_address(&self, address: &str) -> bool {
        address
            .strip_prefix("0x")
            .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
    }

    /// First invalid address of the request, as an error.
    pub fn validate(&self, request: &RecordRequest) -> Result<(), RegistryError> {
        match request.addresses().into_iter().find(|a| !self.is_valid_address(a.as_str())) {
            Some(address) => Err(RegistryError::InvalidAddress(address.to_string())),
            None => Ok(()),
        }
    }
}

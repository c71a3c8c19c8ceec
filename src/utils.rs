//! Sub-account helpers.
//!
//! Every account owns 256 sub-accounts whose addresses differ from the primary address only in
//! the last byte, which holds `primary ^ id`.

use crate::error::SdkError;
use alloy::primitives::Address;

/// Returns the id of `sub_account` relative to `primary`, if it is one of its sub-accounts.
pub fn sub_account_id(primary: Address, sub_account: Address) -> Option<u8> {
    (primary[..19] == sub_account[..19]).then(|| primary[19] ^ sub_account[19])
}

/// Whether `sub_account` is a sub-account of `primary`, including the primary account itself.
pub fn is_real_sub_account(primary: Address, sub_account: Address) -> bool {
    sub_account_id(primary, sub_account).is_some()
}

/// Returns the address of sub-account `id` of `primary`.
pub fn sub_account(primary: Address, id: u32) -> Result<Address, SdkError> {
    let id = u8::try_from(id).map_err(|_| SdkError::InvalidSubAccountId(id))?;
    let mut address = primary;
    address[19] ^= id;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const PRIMARY: Address = address!("0x1234567890123456789012345678901234567890");

    #[test]
    fn derives_sub_accounts() {
        assert_eq!(sub_account(PRIMARY, 0).unwrap(), PRIMARY);
        assert_eq!(
            sub_account(PRIMARY, 1).unwrap(),
            address!("0x1234567890123456789012345678901234567891")
        );
        assert_eq!(
            sub_account(PRIMARY, 255).unwrap(),
            address!("0x123456789012345678901234567890123456786f")
        );
        assert!(matches!(sub_account(PRIMARY, 256), Err(SdkError::InvalidSubAccountId(256))));
    }

    #[test]
    fn recovers_ids() {
        for id in [0u32, 1, 42, 255] {
            let sub = sub_account(PRIMARY, id).unwrap();
            assert_eq!(sub_account_id(PRIMARY, sub), Some(id as u8));
            assert!(is_real_sub_account(PRIMARY, sub));
        }

        let other = address!("0x1234567890123456789012345678901234560090");
        assert_eq!(sub_account_id(PRIMARY, other), None);
        assert!(!is_real_sub_account(PRIMARY, other));
    }
}

//! Turning on-chain values into label text.

use alloy_primitives::{Address, U256};

/// Render a base-unit amount with `decimals` fractional digits and `,` grouping.
pub fn format_amount(raw: U256, decimals: u8) -> String {
    let decimals = usize::from(decimals);
    let mut digits = raw.to_string();
    if digits.len() <= decimals {
        digits = format!("{digits:0>width$}", width = decimals + 1);
    }

    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let grouped = group_thousands(whole);
    if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Display-only form of an address. Calls always use the full value.
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

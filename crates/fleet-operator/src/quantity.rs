//! Syntactic validation of Kubernetes resource quantities.
//!
//! The API server rejects malformed quantities only when the object is
//! submitted; checking them up front lets a bad override fail the pass before
//! anything for that object is written.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::error::{OperatorError, Result};

const BINARY_SUFFIXES: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const DECIMAL_SUFFIXES: [&str; 9] = ["n", "u", "m", "k", "M", "G", "T", "P", "E"];

/// Parse `value` into a [`Quantity`], rejecting anything the API server would.
///
/// `field` is only used in the error message.
pub fn parse(field: &str, value: &str) -> Result<Quantity> {
    if is_valid(value) {
        Ok(Quantity(value.to_string()))
    } else {
        Err(OperatorError::invalid_quantity(field, value))
    }
}

/// Parse every entry of a limits/requests map.
pub fn parse_map(
    field: &str,
    values: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, Quantity>> {
    values
        .iter()
        .map(|(resource, value)| {
            let quantity = parse(&format!("{field}.{resource}"), value)?;
            Ok((resource.clone(), quantity))
        })
        .collect()
}

/// `<sign><digits>[.<digits>]<suffix>` where suffix is binary SI, decimal SI,
/// or a decimal exponent.
pub fn is_valid(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value);

    let number_len = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_len);

    is_decimal(number) && is_suffix(suffix)
}

fn is_decimal(number: &str) -> bool {
    let mut parts = number.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();

    match fraction {
        None => !whole.is_empty(),
        Some(fraction) => {
            !fraction.contains('.') && (!whole.is_empty() || !fraction.is_empty())
        }
    }
}

fn is_suffix(suffix: &str) -> bool {
    if suffix.is_empty() || BINARY_SUFFIXES.contains(&suffix) || DECIMAL_SUFFIXES.contains(&suffix)
    {
        return true;
    }

    let Some(exponent) = suffix.strip_prefix('e').or_else(|| suffix.strip_prefix('E')) else {
        return false;
    };
    let digits = exponent
        .strip_prefix('+')
        .or_else(|| exponent.strip_prefix('-'))
        .unwrap_or(exponent);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

//! Fingerprints are for change detection only. They are NOT cryptographic
//! and give no collision resistance against crafted input.

use serde::Serialize;
use serde_json::Value;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn fingerprint(payload: &Value) -> String {
    // Serializing a `Value` into a `String` cannot fail.
    let canonical = serde_json::to_string(payload).unwrap_or_else(|_| "null".to_string());
    fingerprint_str(&canonical)
}

pub fn fingerprint_of<T: Serialize + ?Sized>(payload: &T) -> String {
    match serde_json::to_value(payload) {
        Ok(value) => fingerprint(&value),
        Err(_) => fingerprint(&Value::Null),
    }
}

pub fn fingerprint_str(text: &str) -> String {
    let hash = text
        .encode_utf16()
        .fold(0i32, |acc, unit| {
            acc.wrapping_shl(5).wrapping_sub(acc).wrapping_add(i32::from(unit))
        });

    to_base36(hash)
}

fn to_base36(value: i32) -> String {
    let mut magnitude = i64::from(value).unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(8);
    while magnitude > 0 {
        digits.push(BASE36_DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
    }

    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}

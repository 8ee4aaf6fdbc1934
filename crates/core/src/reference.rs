use rand::Rng;

pub const REFERENCE_PREFIX: &str = "UTK-";

const CODE_LEN: usize = 8;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a booking reference of the form `UTK-XXXXXXXX`.
pub fn generate_booking_reference() -> String {
    generate_with(&mut rand::thread_rng())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let code: String = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}", REFERENCE_PREFIX, code)
}

/// Strict check for references issued by [`generate_booking_reference`].
pub fn is_booking_reference(value: &str) -> bool {
    match value.strip_prefix(REFERENCE_PREFIX) {
        Some(code) => {
            code.len() == CODE_LEN
                && code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}

/// Normalizes typed input: surrounding whitespace is dropped and letters are
/// upper-cased. Returns `None` unless the value carries the `UTK-` prefix and
/// something after it.
pub fn normalize(value: &str) -> Option<String> {
    let value = value.trim().to_ascii_uppercase();
    match value.strip_prefix(REFERENCE_PREFIX) {
        Some(rest) if !rest.is_empty() => Some(value),
        _ => None,
    }
}

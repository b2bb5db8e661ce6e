//! Message Digests
//!
//! Computes the source-text hash used for staleness detection. The hash is
//! derived from the message text alone and is therefore recomputable from a
//! persisted catalog; it is never written to disk.

/// Separator between plural variants when hashing, chosen so that no form
/// boundary can be faked by message content ('\x1f' is the ASCII unit
/// separator and is escaped everywhere in the catalog format).
const FORM_SEPARATOR: char = '\u{1f}';

/// Hash over all source-text forms of an entry.
pub fn source_hash(forms: &[String]) -> u64 {
    let mut combined = String::new();
    for (index, form) in forms.iter().enumerate() {
        if index > 0 {
            combined.push(FORM_SEPARATOR);
        }
        combined.push_str(form);
    }
    fingerprint(&combined)
}

/// Compute the 64 bit fingerprint of the given string (FNV-1a).
///
/// WARNING: this function has not been designed nor tested with security in
/// mind. DO NOT USE IT IN A SECURITY SENSITIVE CONTEXT.
pub fn fingerprint(s: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

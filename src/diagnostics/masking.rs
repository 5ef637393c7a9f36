//! Credential masking.
//!
//! Credentials longer than [`MIN_MASKABLE_LEN`] keep a short prefix and
//! suffix; anything shorter is replaced entirely.

/// Characters kept at each end of a masked credential.
const VISIBLE_CHARS: usize = 4;

/// Shorter credentials are fully hidden.
pub const MIN_MASKABLE_LEN: usize = 9;

/// Mask a credential for display.
pub fn mask_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() < MIN_MASKABLE_LEN {
        return "****".to_string();
    }
    let prefix: String = chars[..VISIBLE_CHARS].iter().collect();
    let suffix: String = chars[chars.len() - VISIBLE_CHARS..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// Replace every occurrence of `credential` in `text` with its masked form.
pub fn redact(text: &str, credential: &str) -> String {
    if credential.is_empty() || !text.contains(credential) {
        return text.to_string();
    }
    text.replace(credential, &mask_credential(credential))
}

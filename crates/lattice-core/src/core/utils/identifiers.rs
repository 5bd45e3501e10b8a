use uuid::Uuid;

/// Root for identifiers derived from a UUID (ISO/IEC 9834-8).
const UUID_DERIVED_ROOT: &str = "2.25";

/// Maximum length of a unique identifier string in the record format.
pub const MAX_UID_LENGTH: usize = 64;

/// Generates a fresh, globally unique dotted-decimal identifier.
pub fn generate_uid() -> String {
    format!("{}.{}", UUID_DERIVED_ROOT, Uuid::new_v4().as_u128())
}

/// Generates a fresh identifier guaranteed to differ from `previous`.
pub fn generate_uid_replacing(previous: &str) -> String {
    loop {
        let uid = generate_uid();
        if uid != previous {
            return uid;
        }
    }
}

pub fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid.len() <= MAX_UID_LENGTH
        && uid.split('.').all(|component| {
            !component.is_empty()
                && component.bytes().all(|b| b.is_ascii_digit())
                && (component == "0" || !component.starts_with('0'))
        })
}

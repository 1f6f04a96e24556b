//! Permission set arithmetic used by the authorization guard.
//!
//! A user's effective permissions are the permissions of their primary role
//! plus the permissions of every additional role assigned to them. A request
//! is allowed only when every required permission is present.

use std::collections::BTreeSet;

/// Union of the primary role's permissions and those of the additional roles.
pub fn effective_permissions<I, J, S>(primary: I, additional: J) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = S>,
    S: Into<String>,
{
    primary
        .into_iter()
        .chain(additional)
        .map(Into::into)
        .collect()
}

/// Required permissions absent from `effective`, in the order requested.
pub fn missing_permissions<'a>(
    required: &[&'a str],
    effective: &BTreeSet<String>,
) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|code| !effective.contains(*code))
        .collect()
}

/// `true` when `effective` grants every permission in `required`.
pub fn has_all(required: &[&str], effective: &BTreeSet<String>) -> bool {
    missing_permissions(required, effective).is_empty()
}

/// Check the `<resource>.<action>` shape of a permission code.
pub fn is_valid_code(code: &str) -> bool {
    let Some((resource, action)) = code.split_once('.') else {
        return false;
    };

    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_')
    };

    valid_part(resource) && valid_part(action)
}

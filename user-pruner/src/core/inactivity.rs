/*!
Inactivity resolution over fetched object headers
*/

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use callosum_client::ObjectHeader;

/// A directory user that authored none of the tracked content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveUser {
    pub id: String,
    pub name: String,
}

/// Compute the directory users whose id never appears as an author.
///
/// The directory is built from `user_headers` in response order, keeping
/// the first entry when an id repeats, so the result carries no duplicates.
/// Authors that match no directory entry are ignored. Activity is judged
/// only against the kinds actually fetched: content of an untracked kind
/// never counts.
pub fn find_inactive_users(
    user_headers: &[ObjectHeader],
    content_headers: &[ObjectHeader],
) -> Vec<InactiveUser> {
    let authors: HashSet<&str> = content_headers
        .iter()
        .filter_map(|header| header.author.as_deref())
        .collect();

    let mut seen = HashSet::new();
    let mut inactive = Vec::new();
    for user in user_headers {
        if !seen.insert(user.id.as_str()) {
            continue;
        }
        if !authors.contains(user.id.as_str()) {
            inactive.push(InactiveUser {
                id: user.id.clone(),
                name: user.name.clone(),
            });
        }
    }

    inactive
}

/// Drop candidates whose display name is on the protected list.
pub fn retain_unprotected(
    inactive: Vec<InactiveUser>,
    protected_names: &[String],
) -> Vec<InactiveUser> {
    if protected_names.is_empty() {
        return inactive;
    }

    inactive
        .into_iter()
        .filter(|user| !protected_names.iter().any(|name| name == &user.name))
        .collect()
}

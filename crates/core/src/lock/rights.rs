//! Revoker-rights evaluation.
//!
//! Each user keeps an allow list and a deny list of project masks per
//! application. A deny entry always wins over an allow entry.

use std::collections::BTreeMap;

use super::{LockRevokerRights, RevokerEntry};
use crate::error::CoreError;
use crate::mask::{self, Mask};

/// Whether a user's entries grant revoker rights on `project_id`.
pub fn has_rights(entries: &[RevokerEntry], project_id: &str) -> bool {
    let mut allowed = false;
    for entry in entries {
        if mask::matches(Some(entry.rights.project_mask.as_str()), project_id) {
            if !entry.allow {
                return false;
            }
            allowed = true;
        }
    }
    allowed
}

/// Whether deny mask `deny` takes away every project `allow` grants.
///
/// Only decidable when the masks are the same or the grant names a single
/// project; otherwise the grant still covers something and stays listed.
fn cancels(deny: &str, allow: &str) -> bool {
    deny.trim().eq_ignore_ascii_case(allow.trim())
        || (mask::is_literal(allow.trim()) && mask::matches(Some(deny), allow.trim()))
}

/// Grants listed by the rights catalog, sorted by office, project mask,
/// application, user.
///
/// Without a project filter an allow entry is listed unless a deny entry of
/// the same office, application and user cancels it outright. With a filter,
/// an allow entry is listed when it is effective for the filter read as a
/// project id (the answer [`has_rights`] gives), or when the filter covers
/// the grant's own mask and no deny entry cancels it.
pub fn effective_rights(
    entries: Vec<RevokerEntry>,
    project: Option<&str>,
) -> Result<Vec<LockRevokerRights>, CoreError> {
    let filter = Mask::parse(project)?;
    let project = project.map(str::trim).filter(|_| !filter.is_any());

    let mut by_user: BTreeMap<(String, String, String), (Vec<String>, Vec<String>)> =
        BTreeMap::new();

    for entry in entries {
        let LockRevokerRights {
            office_id,
            project_mask,
            application_id,
            user_id,
        } = entry.rights;
        let lists = by_user
            .entry((office_id, application_id, user_id))
            .or_default();
        if entry.allow {
            lists.0.push(project_mask);
        } else {
            lists.1.push(project_mask);
        }
    }

    let mut out = Vec::new();
    for ((office_id, application_id, user_id), (allow, deny)) in by_user {
        let denied_for_project =
            project.is_some_and(|p| deny.iter().any(|d| mask::matches(Some(d.as_str()), p)));
        let cancelled = |a: &str| deny.iter().any(|d| cancels(d, a));

        for project_mask in allow {
            let listed = match project {
                None => !cancelled(&project_mask),
                Some(p) => {
                    (mask::matches(Some(project_mask.as_str()), p) && !denied_for_project)
                        || (filter.matches(&project_mask) && !cancelled(&project_mask))
                }
            };
            if listed {
                out.push(LockRevokerRights {
                    office_id: office_id.clone(),
                    project_mask,
                    application_id: application_id.clone(),
                    user_id: user_id.clone(),
                });
            }
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

//! Workspace merge
//!
//! Combines the descriptor found on disk with freshly computed managed
//! content:
//! - Managed settings: overwrite (fragments are authoritative)
//! - Include/browse path lists: fragment entries first, then surviving user
//!   entries, without duplicates
//! - Folders: replaced wholesale when a new list is given, untouched otherwise
//! - Extension recommendations: replaced wholesale
//! - Everything else: left as found

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use crate::descriptor::{FolderEntry, WorkspaceDescriptor};
use crate::settings::{SettingValue, SettingsFragment, BROWSE_PATH_KEY, INCLUDE_PATH_KEY};

/// List-valued settings whose user entries survive regeneration
pub const UNION_KEYS: &[&str] = &[INCLUDE_PATH_KEY, BROWSE_PATH_KEY];

/// Merge managed content into `current`.
///
/// `folders` of `None` keeps the existing folder list. Merging the same
/// inputs into the output again yields an equal descriptor.
pub fn merge(
    mut current: WorkspaceDescriptor,
    fragments: &[SettingsFragment],
    folders: Option<Vec<FolderEntry>>,
    recommendations: &[String],
) -> WorkspaceDescriptor {
    for fragment in fragments {
        merge_fragment(&mut current, fragment);
    }

    if let Some(folders) = folders {
        current.folders = folders;
    }

    current.extensions.recommendations = recommendations.to_vec();
    current
}

fn merge_fragment(descriptor: &mut WorkspaceDescriptor, fragment: &SettingsFragment) {
    for (key, value) in fragment.iter() {
        let merged = match value {
            SettingValue::StringList(managed) if UNION_KEYS.contains(&key.as_str()) => {
                SettingValue::StringList(union_lists(
                    managed,
                    key,
                    descriptor.settings.get(key),
                ))
            }
            _ => value.clone(),
        };
        descriptor.settings.insert(key.clone(), merged);
    }
}

/// `managed` followed by the entries of `existing` not already present,
/// keeping the first occurrence of each entry
fn union_lists(managed: &[String], key: &str, existing: Option<&SettingValue>) -> Vec<String> {
    let existing = existing.map(|value| user_entries(key, value)).unwrap_or_default();

    let mut seen = HashSet::new();
    managed
        .iter()
        .chain(&existing)
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// String entries of a user path list; anything else is dropped with a warning
fn user_entries(key: &str, value: &SettingValue) -> Vec<String> {
    if let Some(items) = value.as_string_list() {
        return items.to_vec();
    }

    match value {
        SettingValue::Other(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item.as_str() {
                Some(entry) => Some(entry.to_string()),
                None => {
                    warn!(key, entry = %item, "Dropping non-string entry of a path list setting");
                    None
                }
            })
            .collect(),
        SettingValue::StringListList(lists) => {
            warn!(key, dropped = lists.len(), "Dropping nested lists of a path list setting");
            Vec::new()
        }
        other => {
            warn!(key, value = ?other, "Replacing non-list value of a path list setting");
            Vec::new()
        }
    }
}

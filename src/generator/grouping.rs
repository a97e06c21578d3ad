use crate::select::{Ownership, UsageGroupSet};

use super::LayoutVariant;
use super::sanitize::sanitize;

const ACCOUNT_UUID_PREFIX_LEN: usize = 8;

/// Usage group sets that share an owning account or organization
#[derive(Debug, Clone, PartialEq)]
pub struct AccountGroup<'a> {
    /// `account_<uuid prefix>`, `org_<name>`, or empty for the flat layout
    pub key: String,
    pub sets: Vec<&'a UsageGroupSet>,
}

impl<'a> AccountGroup<'a> {
    /// Ownership reported by the first member
    pub fn ownership(&self) -> Option<&'a Ownership> {
        self.sets.first().map(|set| &set.ownership)
    }

    /// Members whose ownership differs from the first member
    ///
    /// Non-empty when two accounts share a UUID prefix or two organization
    /// names only differ in characters the sanitizer drops.
    pub fn ownership_conflicts(&self) -> Vec<&'a UsageGroupSet> {
        match self.ownership() {
            Some(first) => self
                .sets
                .iter()
                .copied()
                .filter(|set| &set.ownership != first)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Module key for an owner: `account_` + first 8 UUID chars, or `org_` + sanitized name
pub fn account_key(ownership: &Ownership) -> String {
    match ownership {
        Ownership::Account { uuid } => {
            let prefix: String = uuid.chars().take(ACCOUNT_UUID_PREFIX_LEN).collect();
            format!("account_{}", prefix)
        }
        Ownership::Organization { name } => format!("org_{}", sanitize(name)),
    }
}

/// Group sets by owner, keeping first-seen order of keys and members
pub fn group_by_account(sets: &[UsageGroupSet]) -> Vec<AccountGroup<'_>> {
    let mut groups: Vec<AccountGroup<'_>> = Vec::new();

    for set in sets {
        let key = account_key(&set.ownership);
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.sets.push(set),
            None => groups.push(AccountGroup {
                key,
                sets: vec![set],
            }),
        }
    }

    groups
}

/// Split sets the way the layout needs them; the flat layout uses one implicit group
pub fn partition(sets: &[UsageGroupSet], variant: LayoutVariant) -> Vec<AccountGroup<'_>> {
    match variant {
        LayoutVariant::Modular => group_by_account(sets),
        LayoutVariant::Flat if sets.is_empty() => Vec::new(),
        LayoutVariant::Flat => vec![AccountGroup {
            key: String::new(),
            sets: sets.iter().collect(),
        }],
    }
}

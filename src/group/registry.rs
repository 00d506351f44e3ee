use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::group::Group;

/// Process-wide name -> group mapping.
///
/// Groups live for the lifetime of the process; the map sees many concurrent
/// readers and a writer only at group creation.
fn groups() -> &'static DashMap<String, Arc<Group>> {
    static GROUPS: OnceLock<DashMap<String, Arc<Group>>> = OnceLock::new();
    GROUPS.get_or_init(DashMap::new)
}

/// Registers a freshly created group. Duplicate names are rejected: creating
/// a group after one with the same name is in use is a programmer error.
pub(crate) fn register(group: Arc<Group>) {
    use dashmap::mapref::entry::Entry;

    match groups().entry(group.name().to_owned()) {
        Entry::Occupied(_) => panic!("group {} is already registered", group.name()),
        Entry::Vacant(slot) => {
            tracing::info!("Registered cache group: {}", group.name());
            slot.insert(group);
        }
    }
}

/// Looks up a group by name.
pub fn lookup(name: &str) -> Option<Arc<Group>> {
    groups().get(name).map(|entry| entry.value().clone())
}

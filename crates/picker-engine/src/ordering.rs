//! Drag-reorder over an ordered list.
//!
//! The destination is an anchor: the source is taken out and put back at the
//! index the destination occupied before the move. Dragging backwards lands
//! the source just ahead of the destination; dragging forwards lands it just
//! behind, since removal shifted the destination down by one.

use picker_protocol::AppEntry;

/// Move the item identified by `source` to the original index of `destination`.
///
/// Returns false and leaves `items` untouched when the ids are equal or either
/// is absent. Length and id-set are preserved in every case.
pub fn move_to_anchor<T, F>(items: &mut Vec<T>, source: &str, destination: &str, id_of: F) -> bool
where
    F: Fn(&T) -> &str,
{
    if source == destination {
        return false;
    }
    let Some(from) = items.iter().position(|it| id_of(it) == source) else {
        return false;
    };
    let Some(to) = items.iter().position(|it| id_of(it) == destination) else {
        return false;
    };
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// [`move_to_anchor`] over app entries.
pub fn reorder_apps(apps: &mut Vec<AppEntry>, source_id: &str, destination_id: &str) -> bool {
    move_to_anchor(apps, source_id, destination_id, |a| a.id.as_str())
}

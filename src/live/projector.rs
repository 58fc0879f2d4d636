//! Projection of a live-session document into a [`NavigationState`]
//!
//! The session points at its current `ItemTime`, which in turn points at the
//! current `Item`. Both are side-loaded in `included` next to the ordered
//! item sequence.

use crate::models::{LiveItem, LiveSessionResponse, NavigationState, Resource};
use crate::utils::error::ProjectionError;

const ITEM: &str = "Item";
const ITEM_TIME: &str = "ItemTime";

/// Ordered items of the session, as returned by the server
pub fn items(response: &LiveSessionResponse) -> Vec<LiveItem> {
    response
        .included
        .iter()
        .filter(|r| r.kind == ITEM)
        .map(|r| LiveItem {
            id: r.id.clone(),
            title: r.attr_str("title").map(str::to_string),
        })
        .collect()
}

/// Derive the navigation summary
///
/// `Ok(None)` means the session has no current item yet (e.g. the plan has
/// not started), which is not an error. Only the current item must carry a
/// title; an untitled next item reads as an empty title.
pub fn project(response: &LiveSessionResponse) -> Result<Option<NavigationState>, ProjectionError> {
    let Some(item_time_id) = response.data.related_id("current_item_time") else {
        return Ok(None);
    };

    let item_time = find_included(response, ITEM_TIME, item_time_id).ok_or_else(|| {
        ProjectionError::DanglingReference {
            kind: ITEM_TIME,
            id: item_time_id.to_string(),
        }
    })?;

    let Some(item_id) = item_time.related_id("item") else {
        return Ok(None);
    };

    let mut items = items(response);
    let index = items
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| ProjectionError::DanglingReference {
            kind: ITEM,
            id: item_id.to_string(),
        })?;

    let next_item_title = items
        .get_mut(index + 1)
        .map(|next| next.title.take().unwrap_or_default());
    let current = &mut items[index];
    let current_item_title = current
        .title
        .take()
        .ok_or_else(|| ProjectionError::MissingTitle {
            id: current.id.clone(),
        })?;

    Ok(Some(NavigationState {
        index,
        length: items.len(),
        current_item_title,
        next_item_title,
    }))
}

fn find_included<'a>(response: &'a LiveSessionResponse, kind: &str, id: &str) -> Option<&'a Resource> {
    response
        .included
        .iter()
        .find(|r| r.kind == kind && r.id == id)
}

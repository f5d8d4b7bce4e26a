// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The page-level overlay root that open content is moved into.

use perch_dom::{Document, ElementData, ElementFlags, ElementId};
use tracing::debug;

use crate::config::attrs;

/// Return the portal container, creating it under the body if the page has none.
///
/// `cached` is reused while it is still connected. The container covers the
/// viewport, stacks above page content at `z_index`, and is not pickable itself,
/// so only the content moved into it receives pointer input.
pub(crate) fn ensure_portal(doc: &mut Document, cached: &mut Option<ElementId>, z_index: i32) -> ElementId {
    if let Some(portal) = cached.filter(|&p| doc.is_connected(p)) {
        return portal;
    }
    let body = doc.body();
    let portal = match doc.query_attr(body, attrs::PORTAL).first() {
        Some(&existing) => existing,
        None => {
            let portal = doc.insert(
                Some(body),
                ElementData::new("div")
                    .with_bounds(doc.viewport())
                    .with_z_index(z_index)
                    .with_flags(ElementFlags::empty()),
            );
            doc.set_attribute(portal, attrs::PORTAL, "");
            doc.set_style(portal, "position", "fixed");
            doc.set_style(portal, "pointer-events", "none");
            debug!(?portal, "created popover portal container");
            portal
        }
    };
    *cached = Some(portal);
    portal
}

//! Placeholder shown instead of an empty list.

use crate::engine::VNode;
use crate::error::Result;
use crate::types::FilterKind;
use crate::view::StatefulTemplate;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPointsTemplate;

impl StatefulTemplate for NoPointsTemplate {
    type State = FilterKind;

    fn template(&self, filter: &FilterKind) -> Result<VNode> {
        Ok(VNode::element("p")
            .class("trip-events__msg")
            .role("no-points")
            .attr("data-filter", filter.as_str())
            .child(VNode::text(filter.empty_message())))
    }
}

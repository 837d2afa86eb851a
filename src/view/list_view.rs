//! List container that item views mount into.

use crate::engine::VNode;
use crate::error::Result;
use crate::view::StatefulTemplate;

pub const LIST_CLASS: &str = "trip-events__list";

#[derive(Debug, Clone, Copy, Default)]
pub struct ListTemplate;

impl StatefulTemplate for ListTemplate {
    type State = ();

    fn template(&self, _state: &()) -> Result<VNode> {
        Ok(VNode::element("ul").class(LIST_CLASS).role("points-list"))
    }
}

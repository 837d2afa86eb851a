//! Trip info - Route, dates and total cost in the header.

use crate::engine::VNode;
use crate::error::Result;
use crate::view::StatefulTemplate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripInfo {
    pub title: String,
    pub dates: String,
    pub cost: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TripInfoTemplate;

impl StatefulTemplate for TripInfoTemplate {
    type State = TripInfo;

    fn template(&self, info: &TripInfo) -> Result<VNode> {
        Ok(VNode::element("section")
            .class("trip-main__trip-info trip-info")
            .role("trip-info")
            .child(
                VNode::element("div")
                    .class("trip-info__main")
                    .child(VNode::element("h1").class("trip-info__title").child(VNode::text(&info.title)))
                    .child(VNode::element("p").class("trip-info__dates").child(VNode::text(&info.dates))),
            )
            .child(
                VNode::element("p")
                    .class("trip-info__cost")
                    .child(VNode::text("Total: €"))
                    .child(
                        VNode::element("span")
                            .class("trip-info__cost-value")
                            .child(VNode::text(info.cost.to_string())),
                    ),
            ))
    }
}

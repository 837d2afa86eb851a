//! Point view - Read-only summary row of a point.

use std::rc::Rc;

use crate::engine::{EventKind, VNode};
use crate::error::Result;
use crate::model::Catalog;
use crate::types::Point;
use crate::utils::format;
use crate::view::{Callback, HandlerBinder, StatefulTemplate};

pub const FAVORITE_ROLE: &str = "event-favorite";
pub const ROLLUP_ROLE: &str = "event-rollup";

pub struct PointTemplate {
    catalog: Rc<Catalog>,
    on_open: Callback,
    on_favorite_toggle: Callback,
}

impl PointTemplate {
    pub fn new(catalog: Rc<Catalog>, on_open: Callback, on_favorite_toggle: Callback) -> Self {
        Self {
            catalog,
            on_open,
            on_favorite_toggle,
        }
    }
}

fn schedule(point: &Point) -> VNode {
    let time = |class: &str, date| {
        VNode::element("time")
            .class(class)
            .attr("datetime", format::datetime_attr(date))
            .child(VNode::text(format::clock_time(date)))
    };
    VNode::element("div")
        .class("event__schedule")
        .child(
            VNode::element("p")
                .class("event__time")
                .child(time("event__start-time", point.date_from))
                .child(VNode::text(format::RANGE_SEPARATOR))
                .child(time("event__end-time", point.date_to)),
        )
        .child(
            VNode::element("p")
                .class("event__duration")
                .child(VNode::text(format::duration(point.duration()))),
        )
}

impl StatefulTemplate for PointTemplate {
    type State = Point;

    fn template(&self, point: &Point) -> Result<VNode> {
        let destination = self.catalog.destination_by_id(&point.destination)?;
        let offers = self.catalog.filtered_offers(point.kind, &point.offers)?;

        let offer_items = offers.iter().map(|offer| {
            VNode::element("li")
                .class("event__offer")
                .child(VNode::element("span").class("event__offer-title").child(VNode::text(&offer.title)))
                .child(VNode::text("+€"))
                .child(
                    VNode::element("span")
                        .class("event__offer-price")
                        .child(VNode::text(offer.price.to_string())),
                )
        });

        Ok(VNode::element("li").class("trip-events__item").role(format!("point-{}", point.id)).child(
            VNode::element("div")
                .class("event")
                .child(
                    VNode::element("time")
                        .class("event__date")
                        .attr("datetime", format::date_attr(point.date_from))
                        .child(VNode::text(format::short_date(point.date_from))),
                )
                .child(
                    VNode::element("div").class("event__type").child(
                        VNode::element("img")
                            .class("event__type-icon")
                            .attr("src", format!("img/icons/{}.png", point.kind)),
                    ),
                )
                .child(
                    VNode::element("h3")
                        .class("event__title")
                        .child(VNode::text(format!("{} {}", point.kind.label(), destination.name))),
                )
                .child(schedule(point))
                .child(
                    VNode::element("p")
                        .class("event__price")
                        .child(VNode::text("€"))
                        .child(
                            VNode::element("span")
                                .class("event__price-value")
                                .child(VNode::text(point.base_price.to_string())),
                        ),
                )
                .child(VNode::element("ul").class("event__selected-offers").children(offer_items))
                .child(
                    VNode::element("button")
                        .class("event__favorite-btn")
                        .class_if(point.is_favorite, "event__favorite-btn--active")
                        .role(FAVORITE_ROLE)
                        .attr("type", "button"),
                )
                .child(
                    VNode::element("button")
                        .class("event__rollup-btn")
                        .role(ROLLUP_ROLE)
                        .attr("type", "button"),
                ),
        ))
    }

    fn restore_handlers(&self, binder: &mut HandlerBinder<Self>) {
        let on_open = self.on_open.clone();
        binder.on(ROLLUP_ROLE, EventKind::Click, move |_, _| on_open());
        let on_favorite_toggle = self.on_favorite_toggle.clone();
        binder.on(FAVORITE_ROLE, EventKind::Click, move |_, _| on_favorite_toggle());
    }
}

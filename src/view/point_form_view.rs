//! Point form - Edit form for an existing point or a new draft.
//!
//! The form keeps a [`PointDraft`] as private state. Controls that change the
//! shape of the form (type, destination, dates) reconcile it with
//! `update_element`; controls that don't (price, offers) only merge state.
//! Invalid input is reverted in place and never reaches the presenter.
//!
//! # Field roles
//!
//! - `event-type-{type}` - type radios inside `.event__type-group`
//! - `event-destination` - destination name input
//! - `event-start-time` / `event-end-time` - date inputs with pickers
//! - `event-price` - base price input
//! - `event-save` / `event-reset` / `event-rollup` - buttons
//! - `event-offer-{id}` - offer checkboxes inside `.event__available-offers`

use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::engine::{EventKind, PickerOptions, VNode};
use crate::error::{Result, TripError};
use crate::model::Catalog;
use crate::types::{Destination, DestinationId, Offer, OfferId, Point, PointId, PointType};
use crate::view::{Callback, HandlerBinder, StatefulTemplate, ValueCallback, ViewHandle, WidgetCx};

pub const DESTINATION_ROLE: &str = "event-destination";
pub const START_TIME_ROLE: &str = "event-start-time";
pub const END_TIME_ROLE: &str = "event-end-time";
pub const PRICE_ROLE: &str = "event-price";
pub const SAVE_ROLE: &str = "event-save";
pub const RESET_ROLE: &str = "event-reset";
pub const ROLLUP_ROLE: &str = "event-rollup";

const TYPE_GROUP_CLASS: &str = "event__type-group";
const OFFERS_CLASS: &str = "event__available-offers";
const OFFER_CHECKBOX_CLASS: &str = "event__offer-checkbox";

pub fn type_role(kind: PointType) -> String {
    format!("event-type-{kind}")
}

pub fn offer_role(id: &OfferId) -> String {
    format!("event-offer-{id}")
}

// =============================================================================
// Draft
// =============================================================================

/// Form state. A draft without id is a new point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointDraft {
    pub id: Option<PointId>,
    pub kind: PointType,
    pub destination: Option<DestinationId>,
    pub offers: Vec<OfferId>,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub base_price: u32,
    pub is_favorite: bool,
}

impl PointDraft {
    pub fn blank(kind: PointType, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            kind,
            destination: None,
            offers: Vec::new(),
            date_from: now,
            date_to: now,
            base_price: 0,
            is_favorite: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.destination.is_none() {
            return Err(TripError::validation("destination", "no destination selected"));
        }
        if self.date_from > self.date_to {
            return Err(TripError::validation("dateTo", "end is before start"));
        }
        Ok(())
    }

    /// Commit the draft under `id`, validating it first.
    pub fn into_point(self, id: PointId) -> Result<Point> {
        self.validate()?;
        let destination = self
            .destination
            .ok_or_else(|| TripError::validation("destination", "no destination selected"))?;
        Ok(Point {
            id,
            kind: self.kind,
            destination,
            offers: self.offers,
            date_from: self.date_from,
            date_to: self.date_to,
            base_price: self.base_price,
            is_favorite: self.is_favorite,
        })
    }
}

impl From<&Point> for PointDraft {
    fn from(point: &Point) -> Self {
        Self {
            id: Some(point.id.clone()),
            kind: point.kind,
            destination: Some(point.destination.clone()),
            offers: point.offers.clone(),
            date_from: point.date_from,
            date_to: point.date_to,
            base_price: point.base_price,
            is_favorite: point.is_favorite,
        }
    }
}

/// `parseInt` then absolute value: leading digits after an optional sign,
/// trailing garbage ignored. `None` when there are no digits or the value
/// does not fit.
pub fn parse_price(input: &str) -> Option<u32> {
    let trimmed = input.trim_start();
    let unsigned = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

// =============================================================================
// Template
// =============================================================================

pub struct PointFormTemplate {
    catalog: Rc<Catalog>,
    date_format: String,
    on_submit: ValueCallback<PointDraft>,
    on_delete: Callback,
    on_close: Callback,
}

impl PointFormTemplate {
    pub fn new(
        catalog: Rc<Catalog>,
        date_format: impl Into<String>,
        on_submit: ValueCallback<PointDraft>,
        on_delete: Callback,
        on_close: Callback,
    ) -> Self {
        Self {
            catalog,
            date_format: date_format.into(),
            on_submit,
            on_delete,
            on_close,
        }
    }

    fn type_list(&self, draft: &PointDraft) -> VNode {
        let items = PointType::ALL.into_iter().map(|kind| {
            VNode::element("div")
                .class("event__type-item")
                .child(
                    VNode::element("input")
                        .class("event__type-input visually-hidden")
                        .role(type_role(kind))
                        .attr("type", "radio")
                        .attr("name", "event-type")
                        .value(kind.as_str())
                        .checked(kind == draft.kind),
                )
                .child(
                    VNode::element("label")
                        .class(&format!("event__type-label event__type-label--{kind}"))
                        .child(VNode::text(kind.label())),
                )
        });
        VNode::element("div")
            .class("event__type-wrapper")
            .child(
                VNode::element("input")
                    .class("event__type-toggle visually-hidden")
                    .role("event-type-toggle")
                    .attr("type", "checkbox"),
            )
            .child(
                VNode::element("div").class("event__type-list").child(
                    VNode::element("fieldset")
                        .class(TYPE_GROUP_CLASS)
                        .children(items),
                ),
            )
    }

    fn destination_field(&self, draft: &PointDraft, destination: Option<&Destination>) -> VNode {
        let options = self
            .catalog
            .destinations()
            .iter()
            .map(|destination| VNode::element("option").value(&destination.name));
        VNode::element("div")
            .class("event__field-group event__field-group--destination")
            .child(
                VNode::element("label")
                    .class("event__label event__type-output")
                    .child(VNode::text(draft.kind.label())),
            )
            .child(
                VNode::element("input")
                    .class("event__input event__input--destination")
                    .role(DESTINATION_ROLE)
                    .attr("type", "text")
                    .attr("name", "event-destination")
                    .value(destination.map_or("", |destination| destination.name.as_str())),
            )
            .child(VNode::element("datalist").children(options))
    }

    fn time_field(&self, draft: &PointDraft) -> VNode {
        let input = |role: &str, date: DateTime<Utc>| {
            VNode::element("input")
                .class("event__input event__input--time")
                .role(role)
                .attr("type", "text")
                .attr("name", role.to_string())
                .value(date.format(&self.date_format).to_string())
        };
        VNode::element("div")
            .class("event__field-group event__field-group--time")
            .child(input(START_TIME_ROLE, draft.date_from))
            .child(VNode::text(crate::utils::format::RANGE_SEPARATOR))
            .child(input(END_TIME_ROLE, draft.date_to))
    }

    fn offers_section(&self, draft: &PointDraft, offers: &[Offer]) -> Option<VNode> {
        if offers.is_empty() {
            return None;
        }
        let selectors = offers.iter().map(|offer| {
            VNode::element("div")
                .class("event__offer-selector")
                .child(
                    VNode::element("input")
                        .class(&format!("{OFFER_CHECKBOX_CLASS} visually-hidden"))
                        .role(offer_role(&offer.id))
                        .attr("type", "checkbox")
                        .value(offer.id.as_str())
                        .checked(draft.offers.contains(&offer.id)),
                )
                .child(
                    VNode::element("label")
                        .class("event__offer-label")
                        .child(VNode::element("span").class("event__offer-title").child(VNode::text(&offer.title)))
                        .child(VNode::text("+€"))
                        .child(
                            VNode::element("span")
                                .class("event__offer-price")
                                .child(VNode::text(offer.price.to_string())),
                        ),
                )
        });
        Some(
            VNode::element("section")
                .class("event__section event__section--offers")
                .child(VNode::element("h3").class("event__section-title").child(VNode::text("Offers")))
                .child(VNode::element("div").class(OFFERS_CLASS).children(selectors)),
        )
    }
}

fn destination_section(destination: &Destination) -> VNode {
    let photos = destination.pictures.iter().map(|picture| {
        VNode::element("img")
            .class("event__photo")
            .attr("src", &picture.src)
            .attr("alt", &picture.description)
    });
    VNode::element("section")
        .class("event__section event__section--destination")
        .child(VNode::element("h3").class("event__section-title").child(VNode::text("Destination")))
        .child(
            VNode::element("p")
                .class("event__destination-description")
                .child(VNode::text(&destination.description)),
        )
        .maybe_child((!destination.pictures.is_empty()).then(|| {
            VNode::element("div")
                .class("event__photos-container")
                .child(VNode::element("div").class("event__photos-tape").children(photos))
        }))
}

impl StatefulTemplate for PointFormTemplate {
    type State = PointDraft;

    fn template(&self, draft: &PointDraft) -> Result<VNode> {
        let offers = self.catalog.offers_by_type(draft.kind)?;
        let destination = match &draft.destination {
            Some(id) => Some(self.catalog.destination_by_id(id)?),
            None => None,
        };
        let is_new = draft.is_new();

        let header = VNode::element("header")
            .class("event__header")
            .child(self.type_list(draft))
            .child(self.destination_field(draft, destination))
            .child(self.time_field(draft))
            .child(
                VNode::element("div")
                    .class("event__field-group event__field-group--price")
                    .child(VNode::element("label").class("event__label").child(VNode::text("€")))
                    .child(
                        VNode::element("input")
                            .class("event__input event__input--price")
                            .role(PRICE_ROLE)
                            .attr("type", "text")
                            .attr("name", "event-price")
                            .value(draft.base_price.to_string()),
                    ),
            )
            .child(
                VNode::element("button")
                    .class("event__save-btn btn btn--blue")
                    .role(SAVE_ROLE)
                    .attr("type", "submit")
                    .disabled(draft.date_from > draft.date_to)
                    .child(VNode::text("Save")),
            )
            .child(
                VNode::element("button")
                    .class("event__reset-btn")
                    .role(RESET_ROLE)
                    .attr("type", "reset")
                    .child(VNode::text(if is_new { "Cancel" } else { "Delete" })),
            )
            .maybe_child((!is_new).then(|| {
                VNode::element("button")
                    .class("event__rollup-btn")
                    .role(ROLLUP_ROLE)
                    .attr("type", "button")
            }));

        let offers_section = self.offers_section(draft, offers);
        let details = match (offers_section, destination) {
            (None, None) => None,
            (offers_section, destination) => Some(
                VNode::element("section")
                    .class("event__details")
                    .maybe_child(offers_section)
                    .maybe_child(destination.map(destination_section)),
            ),
        };

        Ok(VNode::element("li").class("trip-events__item").child(
            VNode::element("form")
                .class("event event--edit")
                .role("event-form")
                .child(header)
                .maybe_child(details),
        ))
    }

    fn restore_handlers(&self, binder: &mut HandlerBinder<Self>) {
        let on_submit = self.on_submit.clone();
        binder.on_root(EventKind::Submit, move |view, _| {
            let Some(draft) = view.state() else { return Ok(()) };
            if let Err(err) = draft.validate() {
                tracing::warn!(%err, "point form submit rejected");
                return Ok(());
            }
            on_submit(draft)
        });

        let on_close = self.on_close.clone();
        binder.on(ROLLUP_ROLE, EventKind::Click, move |_, _| on_close());

        let on_delete = self.on_delete.clone();
        binder.on(RESET_ROLE, EventKind::Click, move |_, _| on_delete());

        binder.on_class(TYPE_GROUP_CLASS, EventKind::Change, |view, event| {
            let Some(kind) = event.value.as_deref().and_then(PointType::parse) else {
                return Ok(());
            };
            view.update_element(|draft| {
                draft.kind = kind;
                draft.offers.clear();
            })
        });

        let catalog = Rc::clone(&self.catalog);
        binder.on(DESTINATION_ROLE, EventKind::Input, move |view, event| {
            let name = event.value.as_deref().unwrap_or_default();
            match catalog.destination_by_name(name) {
                Some(destination) => {
                    let id = destination.id.clone();
                    view.update_element(|draft| draft.destination = Some(id))
                }
                None => Ok(()),
            }
        });

        binder.on(DESTINATION_ROLE, EventKind::KeyDown, |view, event| {
            revert(view, event.target, String::new());
            Ok(())
        });

        let catalog = Rc::clone(&self.catalog);
        binder.on(DESTINATION_ROLE, EventKind::Blur, move |view, event| {
            let typed = event.value.as_deref().unwrap_or_default();
            if catalog.destination_by_name(typed).is_some() {
                return Ok(());
            }
            let current = view
                .state()
                .and_then(|draft| draft.destination)
                .and_then(|id| catalog.destination_by_id(&id).ok())
                .map_or(String::new(), |destination| destination.name.clone());
            tracing::warn!(typed, reverted = %current, "unknown destination reverted");
            revert(view, event.target, current);
            Ok(())
        });

        binder.on(PRICE_ROLE, EventKind::Blur, |view, event| {
            let typed = event.value.as_deref().unwrap_or_default();
            match parse_price(typed) {
                Some(price) => {
                    revert(view, event.target, price.to_string());
                    view.set_state(|draft| draft.base_price = price);
                }
                None => {
                    let current = view.state().map_or(0, |draft| draft.base_price);
                    tracing::warn!(typed, reverted = current, "invalid price reverted");
                    revert(view, event.target, current.to_string());
                }
            }
            Ok(())
        });

        binder.on_class(OFFERS_CLASS, EventKind::Change, |view, _| {
            let (Some(tree), Some(element)) = (view.tree(), view.element()) else {
                return Ok(());
            };
            let offers: Vec<OfferId> = {
                let tree = tree.borrow();
                tree.query_all_class(element, OFFER_CHECKBOX_CLASS)
                    .into_iter()
                    .filter(|id| tree.is_checked(*id))
                    .filter_map(|id| tree.value(id).map(OfferId::new))
                    .collect()
            };
            view.set_state(|draft| draft.offers = offers);
            Ok(())
        });
    }

    fn create_widgets(&self, draft: &PointDraft, widgets: &mut WidgetCx<Self>) {
        let options = |default_date| PickerOptions {
            date_format: self.date_format.clone(),
            enable_time: true,
            default_date,
        };
        widgets.date_picker("dateFrom", START_TIME_ROLE, options(draft.date_from), |view, date| {
            view.update_element(|draft| draft.date_from = date)
        });
        widgets.date_picker("dateTo", END_TIME_ROLE, options(draft.date_to), |view, date| {
            view.update_element(|draft| draft.date_to = date)
        });
    }
}

/// Write `value` back into a control of the view.
fn revert(view: &ViewHandle<PointFormTemplate>, target: crate::engine::NodeId, value: String) {
    if let Some(tree) = view.tree() {
        tree.borrow_mut().set_value(target, value);
    }
}

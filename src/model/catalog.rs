//! Catalog - Read-only reference data (destinations and offers).

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};
use crate::types::{Destination, DestinationId, Offer, OfferGroup, OfferId, PointType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    destinations: Vec<Destination>,
    offers: Vec<OfferGroup>,
}

impl Catalog {
    pub fn new(destinations: Vec<Destination>, offers: Vec<OfferGroup>) -> Self {
        Self {
            destinations,
            offers,
        }
    }

    /// `{ "destinations": [...], "offers": [...] }`
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn destination_by_id(&self, id: &DestinationId) -> Result<&Destination> {
        self.destinations
            .iter()
            .find(|destination| &destination.id == id)
            .ok_or_else(|| TripError::DestinationNotFound(id.clone()))
    }

    pub fn destination_by_name(&self, name: &str) -> Option<&Destination> {
        self.destinations
            .iter()
            .find(|destination| destination.name == name)
    }

    pub fn offer_groups(&self) -> &[OfferGroup] {
        &self.offers
    }

    /// Offers available for `kind`. A type without a group is a lookup error.
    pub fn offers_by_type(&self, kind: PointType) -> Result<&[Offer]> {
        self.offers
            .iter()
            .find(|group| group.kind == kind)
            .map(|group| group.offers.as_slice())
            .ok_or(TripError::OffersNotFound(kind))
    }

    /// Offers of `kind` whose id is in `ids`, in catalog order.
    pub fn filtered_offers(&self, kind: PointType, ids: &[OfferId]) -> Result<Vec<Offer>> {
        Ok(self
            .offers_by_type(kind)?
            .iter()
            .filter(|offer| ids.contains(&offer.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::types::Picture;

    pub fn catalog() -> Catalog {
        let destination = |id: &str, name: &str| Destination {
            id: DestinationId::new(id),
            name: name.to_string(),
            description: format!("{name} is a lovely place."),
            pictures: vec![Picture {
                src: format!("img/{id}.jpg"),
                description: format!("{name} view"),
            }],
        };
        let offer = |id: &str, title: &str, price: u32| Offer {
            id: OfferId::new(id),
            title: title.to_string(),
            price,
        };
        let offers = PointType::ALL
            .into_iter()
            .map(|kind| OfferGroup {
                kind,
                offers: match kind {
                    PointType::Flight => vec![
                        offer("luggage", "Add luggage", 30),
                        offer("comfort", "Switch to comfort", 100),
                    ],
                    PointType::Taxi => vec![offer("uber", "Order Uber", 20)],
                    _ => Vec::new(),
                },
            })
            .collect();

        Catalog::new(
            vec![
                destination("ams", "Amsterdam"),
                destination("gva", "Geneva"),
                destination("cham", "Chamonix"),
                destination("par", "Paris"),
            ],
            offers,
        )
    }
}

//! Points model - The observable store of trip points.
//!
//! The store is the only owner of the point collection. Every mutation takes
//! the caller's [`Severity`], applies the change and then notifies observers
//! with the affected point as payload. The store never infers severity.
//!
//! ```ignore
//! let model = PointsModel::new(catalog, points)?;
//! model.add_observer(|severity, point| { /* re-render */ Ok(()) });
//! model.update_point(Severity::Patch, point)?;
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::catalog::Catalog;
use super::observable::{Observable, ObserverId};
use crate::error::{Result, TripError};
use crate::types::{Destination, DestinationId, Offer, OfferId, Point, PointId, PointType, Severity};

pub struct PointsModel {
    catalog: Rc<Catalog>,
    points: RefCell<Vec<Point>>,
    observers: Observable<Point>,
    id_counter: Cell<u64>,
}

impl PointsModel {
    /// Rejects a seed collection with duplicate ids.
    pub fn new(catalog: Rc<Catalog>, points: Vec<Point>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = points.iter().find(|point| !seen.insert(&point.id)) {
            return Err(TripError::DuplicatePoint(duplicate.id.clone()));
        }
        Ok(Self {
            catalog,
            points: RefCell::new(points),
            observers: Observable::new(),
            id_counter: Cell::new(0),
        })
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    pub fn add_observer(&self, observer: impl Fn(Severity, &Point) -> Result<()> + 'static) -> ObserverId {
        self.observers.add_observer(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove_observer(id)
    }

    /// Shutdown hook.
    pub fn clear_observers(&self) {
        self.observers.clear();
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn catalog(&self) -> &Rc<Catalog> {
        &self.catalog
    }

    pub fn destinations(&self) -> &[Destination] {
        self.catalog.destinations()
    }

    pub fn destination_by_id(&self, id: &DestinationId) -> Result<&Destination> {
        self.catalog.destination_by_id(id)
    }

    pub fn offers_by_type(&self, kind: PointType) -> Result<&[Offer]> {
        self.catalog.offers_by_type(kind)
    }

    pub fn filtered_offers(&self, kind: PointType, ids: &[OfferId]) -> Result<Vec<Offer>> {
        self.catalog.filtered_offers(kind, ids)
    }

    /// Snapshot of the raw collection, in insertion order.
    pub fn points(&self) -> Vec<Point> {
        self.points.borrow().clone()
    }

    pub fn point(&self, id: &PointId) -> Option<Point> {
        self.points.borrow().iter().find(|point| &point.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.points.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.borrow().is_empty()
    }

    /// A fresh id not used by any stored point.
    pub fn generate_id(&self) -> PointId {
        loop {
            let next = self.id_counter.get() + 1;
            self.id_counter.set(next);
            let id = PointId::new(format!("point-{next}"));
            if self.point(&id).is_none() {
                return id;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    pub fn add_point(&self, severity: Severity, point: Point) -> Result<()> {
        {
            let mut points = self.points.borrow_mut();
            if points.iter().any(|existing| existing.id == point.id) {
                return Err(TripError::DuplicatePoint(point.id));
            }
            points.insert(0, point.clone());
        }
        tracing::debug!(id = %point.id, ?severity, "point added");
        self.observers.notify(severity, &point)
    }

    pub fn update_point(&self, severity: Severity, point: Point) -> Result<()> {
        {
            let mut points = self.points.borrow_mut();
            let slot = points
                .iter_mut()
                .find(|existing| existing.id == point.id)
                .ok_or_else(|| TripError::PointNotFound(point.id.clone()))?;
            *slot = point.clone();
        }
        tracing::debug!(id = %point.id, ?severity, "point updated");
        self.observers.notify(severity, &point)
    }

    /// Removes the point and notifies with the removed point as payload.
    pub fn delete_point(&self, severity: Severity, id: &PointId) -> Result<()> {
        let removed = {
            let mut points = self.points.borrow_mut();
            let index = points
                .iter()
                .position(|existing| &existing.id == id)
                .ok_or_else(|| TripError::PointNotFound(id.clone()))?;
            points.remove(index)
        };
        tracing::debug!(%id, ?severity, "point deleted");
        self.observers.notify(severity, &removed)
    }
}

/// Parse a JSON array of points.
pub fn points_from_json_str(json: &str) -> Result<Vec<Point>> {
    Ok(serde_json::from_str(json)?)
}


#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::fixtures::{at, point, three_points};
    use super::*;
    use crate::model::catalog::fixtures::catalog;

    fn model() -> PointsModel {
        PointsModel::new(Rc::new(catalog()), three_points()).expect("unique ids")
    }

    fn record(model: &PointsModel) -> Rc<RefCell<Vec<(Severity, PointId)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        model.add_observer(move |severity, point| {
            log_clone.borrow_mut().push((severity, point.id.clone()));
            Ok(())
        });
        log
    }

    #[test]
    fn test_duplicate_seed_rejected() {
        let mut points = three_points();
        points.push(points[0].clone());
        let result = PointsModel::new(Rc::new(catalog()), points);
        assert!(matches!(result, Err(TripError::DuplicatePoint(_))));
    }

    #[test]
    fn test_update_notifies_with_callers_severity() {
        let model = model();
        let log = record(&model);
        let mut p1 = model.point(&PointId::new("p1")).expect("p1");
        p1.is_favorite = true;

        model.update_point(Severity::Patch, p1).expect("update");
        assert_eq!(*log.borrow(), vec![(Severity::Patch, PointId::new("p1"))]);
        assert!(model.point(&PointId::new("p1")).is_some_and(|p| p.is_favorite));
    }

    #[test]
    fn test_update_unknown_id_is_not_found_and_silent() {
        let model = model();
        let log = record(&model);
        let ghost = point("ghost", "ams", at(1, 1), at(1, 2), 1);

        let err = model.update_point(Severity::Patch, ghost).unwrap_err();
        assert_eq!(err, TripError::PointNotFound(PointId::new("ghost")));
        assert!(log.borrow().is_empty(), "failed mutation must not notify");
    }

    #[test]
    fn test_delete_removes_and_notifies() {
        let model = model();
        let log = record(&model);

        model.delete_point(Severity::Medium, &PointId::new("p2")).expect("delete");
        assert_eq!(model.len(), 2);
        assert!(model.point(&PointId::new("p2")).is_none());
        assert_eq!(*log.borrow(), vec![(Severity::Medium, PointId::new("p2"))]);

        let err = model.delete_point(Severity::Medium, &PointId::new("p2")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let model = model();
        let dup = point("p1", "ams", at(1, 1), at(1, 2), 1);
        assert_eq!(
            model.add_point(Severity::Medium, dup),
            Err(TripError::DuplicatePoint(PointId::new("p1")))
        );
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn test_generate_id_skips_existing() {
        let model = PointsModel::new(
            Rc::new(catalog()),
            vec![point("point-1", "ams", at(1, 1), at(1, 2), 1)],
        )
        .expect("model");
        assert_eq!(model.generate_id(), PointId::new("point-2"));
        assert_eq!(model.generate_id(), PointId::new("point-3"));
    }

    #[test]
    fn test_observer_sees_committed_state() {
        let model = Rc::new(model());
        let weak = Rc::downgrade(&model);
        let seen = Rc::new(RefCell::new(0));
        let seen_clone = Rc::clone(&seen);
        model.add_observer(move |_, _| {
            if let Some(model) = weak.upgrade() {
                *seen_clone.borrow_mut() = model.len();
            }
            Ok(())
        });

        model
            .add_point(Severity::Medium, point("p4", "par", at(10, 1), at(10, 2), 5))
            .expect("add");
        assert_eq!(*seen.borrow(), 4);
    }
}

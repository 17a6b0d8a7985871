//! Creates, edits, deletes and reorders workouts in response to user input,
//! keeping the persisted slot in step with the in-memory collection.

use crate::dlog;
use crate::error::{StorageError, ValidationError, WorkoutError};
use crate::render::Marker;
use crate::sort::SortKey;
use crate::store::{WorkoutStore, decode_legacy};
use crate::types::{Coords, MetricsUpdate, RawInputs, Workout, WorkoutId, WorkoutKind};
use chrono::{DateTime, Utc};

pub const DEFAULT_SLOT_KEY: &str = "workouts";
pub const DEFAULT_ZOOM: u8 = 13;

pub const DELETE_PROMPT: &str =
    "Do you want to delete this workout permanently?\nThis action cannot be undone.";
pub const RESET_PROMPT: &str =
    "Do you want to delete all workout history?\nThis action cannot be undone.";
pub const NO_CHANGES_NOTICE: &str = "No changes were made";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub slot_key: String,
    pub zoom: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            zoom: DEFAULT_ZOOM,
        }
    }
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub trait MapView {
    fn set_center(&mut self, coords: Coords, zoom: u8);
    fn add_marker(&mut self, marker: &Marker);
    fn remove_marker(&mut self, id: &WorkoutId);
    fn clear_markers(&mut self);
}

pub trait ListView {
    fn render_entry(&mut self, workout: &Workout);
    fn update_entry(&mut self, workout: &Workout);
    fn remove_entry(&mut self, id: &WorkoutId);
    /// Replaces the whole list, in collection order.
    fn render_list(&mut self, workouts: &[Workout]);
    /// Blocking notice to the user.
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    Idle,
    FormOpen { coords: Coords },
    EditOpen { id: WorkoutId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared,
    Cancelled,
}

/// Application state: the ordered collection plus the collaborators that
/// display it. One instance per session, passed by `&mut` to handlers.
pub struct WorkoutController<M, L, C = SystemClock> {
    zoom: u8,
    store: WorkoutStore,
    workouts: Vec<Workout>,
    state: UiState,
    map: M,
    list: L,
    clock: C,
}

impl<M: MapView, L: ListView, C: Clock> WorkoutController<M, L, C> {
    pub fn new(config: &Config, store: WorkoutStore, map: M, list: L, clock: C) -> Self {
        Self {
            zoom: config.zoom,
            store,
            workouts: Vec::new(),
            state: UiState::Idle,
            map,
            list,
            clock,
        }
    }

    /// Loads the saved collection. Returns how many workouts were restored.
    pub fn start(&mut self) -> Result<usize, WorkoutError> {
        self.workouts = self.store.load()?;
        self.state = UiState::Idle;
        tracing::info!(
            workouts = self.workouts.len(),
            key = %self.store.key(),
            degraded = self.store.is_degraded(),
            "loaded saved workouts"
        );
        Ok(self.workouts.len())
    }

    /// Draws every entry and marker from scratch.
    pub fn render_all(&mut self) {
        self.list.render_list(&self.workouts);
        self.map.clear_markers();
        for w in &self.workouts {
            self.map.add_marker(&Marker::for_workout(w));
        }
    }

    /// Centers the map on the user's position.
    pub fn center_on(&mut self, coords: Coords) {
        self.map.set_center(coords, self.zoom);
    }

    pub fn on_map_click(&mut self, coords: Coords) {
        dlog!("form opened at {coords}");
        self.state = UiState::FormOpen { coords };
    }

    /// Submits the new-workout form opened by the last map click. The form
    /// stays open on validation errors.
    pub fn submit_form(
        &mut self,
        kind: WorkoutKind,
        raw: &RawInputs,
    ) -> Result<Workout, WorkoutError> {
        let UiState::FormOpen { coords } = self.state else {
            return Err(WorkoutError::InvalidState("no workout form is open"));
        };
        let workout = self.create_workout(kind, coords, raw)?;
        self.state = UiState::Idle;
        Ok(workout)
    }

    pub fn create_workout(
        &mut self,
        kind: WorkoutKind,
        coords: Coords,
        raw: &RawInputs,
    ) -> Result<Workout, WorkoutError> {
        let inputs = raw.parse(kind).map_err(|e| self.reject(e))?;
        let created_at = self.clock.now();
        let id = self.next_id(created_at);
        let workout = Workout::create(kind, id, created_at, coords, inputs)
            .map_err(|e| self.reject(e))?;

        self.workouts.push(workout.clone());
        if let Err(e) = self.persist() {
            self.workouts.pop();
            return Err(e.into());
        }

        self.map.add_marker(&Marker::for_workout(&workout));
        self.list.render_entry(&workout);
        tracing::info!(id = %workout.id(), kind = %kind, "workout created");
        Ok(workout)
    }

    /// Opens the edit form for `id` and returns the values to pre-fill.
    pub fn open_edit(&mut self, id: &WorkoutId) -> Result<RawInputs, WorkoutError> {
        let idx = self.position(id)?;
        self.state = UiState::EditOpen { id: id.clone() };
        Ok(self.workouts[idx].raw_inputs())
    }

    /// Submits the open edit form. The form stays open on validation errors.
    pub fn submit_edit(&mut self, raw: &RawInputs) -> Result<EditOutcome, WorkoutError> {
        let UiState::EditOpen { id } = &self.state else {
            return Err(WorkoutError::InvalidState("no edit form is open"));
        };
        let id = id.clone();
        match self.edit_workout(&id, raw) {
            Err(e @ WorkoutError::Validation(_)) => Err(e),
            other => {
                self.state = UiState::Idle;
                other
            }
        }
    }

    pub fn edit_workout(
        &mut self,
        id: &WorkoutId,
        raw: &RawInputs,
    ) -> Result<EditOutcome, WorkoutError> {
        let idx = self.position(id)?;
        let inputs = raw
            .parse(self.workouts[idx].kind())
            .map_err(|e| self.reject(e))?;

        let previous = self.workouts[idx].clone();
        match self.workouts[idx].update_metrics(inputs) {
            Err(e) => return Err(self.reject(e)),
            Ok(MetricsUpdate::Unchanged) => {
                self.list.notify(NO_CHANGES_NOTICE);
                return Ok(EditOutcome::Unchanged);
            }
            Ok(MetricsUpdate::Updated) => {}
        }

        if let Err(e) = self.persist() {
            self.workouts[idx] = previous;
            return Err(e.into());
        }

        self.list.update_entry(&self.workouts[idx]);
        tracing::info!(id = %id, "workout updated");
        Ok(EditOutcome::Updated)
    }

    pub fn delete_workout(
        &mut self,
        id: &WorkoutId,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, WorkoutError> {
        let idx = self.position(id)?;
        if !confirm.confirm(DELETE_PROMPT) {
            dlog!("delete cancelled id={id}");
            return Ok(DeleteOutcome::Cancelled);
        }

        let removed = self.workouts.remove(idx);
        if let Err(e) = self.persist() {
            self.workouts.insert(idx, removed);
            return Err(e.into());
        }

        self.list.remove_entry(id);
        self.map.remove_marker(id);
        if self.state == (UiState::EditOpen { id: id.clone() }) {
            self.state = UiState::Idle;
        }
        tracing::info!(id = %id, "workout deleted");
        Ok(DeleteOutcome::Removed)
    }

    /// Deletes the whole saved history.
    pub fn reset_all(&mut self, confirm: &mut dyn Confirm) -> Result<ResetOutcome, WorkoutError> {
        if !confirm.confirm(RESET_PROMPT) {
            return Ok(ResetOutcome::Cancelled);
        }
        self.store.clear()?;
        let count = self.workouts.len();
        self.workouts.clear();
        self.state = UiState::Idle;
        self.render_all();
        tracing::info!(removed = count, "workout history reset");
        Ok(ResetOutcome::Cleared)
    }

    /// Reorders the collection itself; the new order is what gets saved.
    pub fn sort(&mut self, key: SortKey) -> Result<(), WorkoutError> {
        let previous = self.workouts.clone();
        key.apply(&mut self.workouts);
        if let Err(e) = self.persist() {
            self.workouts = previous;
            return Err(e.into());
        }
        self.list.render_list(&self.workouts);
        dlog!("sorted by {key}");
        Ok(())
    }

    /// Pans the map to a workout's location.
    pub fn focus(&mut self, id: &WorkoutId) -> Result<Coords, WorkoutError> {
        let coords = self.workouts[self.position(id)?].coords();
        self.map.set_center(coords, self.zoom);
        Ok(coords)
    }

    /// Appends workouts from a browser export, skipping ids already present.
    /// Returns how many were added.
    pub fn import_legacy(&mut self, json: &str) -> Result<usize, WorkoutError> {
        let incoming = decode_legacy(json)?;
        let before = self.workouts.len();
        for w in incoming {
            if self.workouts.iter().any(|existing| existing.id() == w.id()) {
                dlog!("import skipping duplicate id={}", w.id());
                continue;
            }
            self.workouts.push(w);
        }

        let added = self.workouts.len() - before;
        if added == 0 {
            return Ok(0);
        }
        if let Err(e) = self.persist() {
            self.workouts.truncate(before);
            return Err(e.into());
        }
        for w in &self.workouts[before..] {
            self.map.add_marker(&Marker::for_workout(w));
            self.list.render_entry(w);
        }
        tracing::info!(added, "imported workouts");
        Ok(added)
    }

    pub fn cancel(&mut self) {
        self.state = UiState::Idle;
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    /// Whether list-wide actions (reset, sort) apply.
    pub fn has_workouts(&self) -> bool {
        !self.workouts.is_empty()
    }

    pub const fn state(&self) -> &UiState {
        &self.state
    }

    pub const fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        self.store.save(&self.workouts)
    }

    fn position(&self, id: &WorkoutId) -> Result<usize, WorkoutError> {
        self.workouts
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| {
                tracing::warn!(id = %id, "workout not found");
                WorkoutError::NotFound(id.clone())
            })
    }

    fn reject(&mut self, err: ValidationError) -> WorkoutError {
        dlog!("rejected input: {err}");
        self.list.notify(ValidationError::NOTICE);
        WorkoutError::Validation(err)
    }

    fn next_id(&self, created_at: DateTime<Utc>) -> WorkoutId {
        let mut millis = created_at.timestamp_millis();
        loop {
            let id = WorkoutId::from_millis(millis);
            if self.get(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::sort::DateOrder;
    use crate::store::{MemorySlotStore, SlotStore};
    use chrono::{Duration, TimeZone};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingView {
        markers: Vec<Marker>,
        centers: Vec<(Coords, u8)>,
        entries: Vec<WorkoutId>,
        updated: Vec<WorkoutId>,
        notices: Vec<String>,
        list_renders: usize,
    }

    impl MapView for RecordingView {
        fn set_center(&mut self, coords: Coords, zoom: u8) {
            self.centers.push((coords, zoom));
        }
        fn add_marker(&mut self, marker: &Marker) {
            self.markers.push(marker.clone());
        }
        fn remove_marker(&mut self, id: &WorkoutId) {
            self.markers.retain(|m| &m.id != id);
        }
        fn clear_markers(&mut self) {
            self.markers.clear();
        }
    }

    impl ListView for RecordingView {
        fn render_entry(&mut self, workout: &Workout) {
            self.entries.push(workout.id().clone());
        }
        fn update_entry(&mut self, workout: &Workout) {
            self.updated.push(workout.id().clone());
        }
        fn remove_entry(&mut self, id: &WorkoutId) {
            self.entries.retain(|e| e != id);
        }
        fn render_list(&mut self, workouts: &[Workout]) {
            self.list_renders += 1;
            self.entries = workouts.iter().map(|w| w.id().clone()).collect();
        }
        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    /// Advances one minute per call.
    struct StepClock(Cell<DateTime<Utc>>);

    impl StepClock {
        fn new() -> Self {
            Self(Cell::new(Utc.with_ymd_and_hms(2024, 4, 10, 9, 0, 0).unwrap()))
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let t = self.0.get();
            self.0.set(t + Duration::minutes(1));
            t
        }
    }

    struct FrozenClock;

    impl Clock for FrozenClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 4, 10, 9, 0, 0).unwrap()
        }
    }

    /// Memory slot that counts writes and shares contents with the test.
    #[derive(Clone, Default)]
    struct SharedSlot {
        inner: Rc<RefCell<MemorySlotStore>>,
        writes: Rc<Cell<usize>>,
    }

    impl SlotStore for SharedSlot {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.borrow().get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.set(self.writes.get() + 1);
            self.inner.borrow_mut().set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.writes.set(self.writes.get() + 1);
            self.inner.borrow_mut().remove(key)
        }
    }

    struct RejectingSlot;

    impl SlotStore for RejectingSlot {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("refusing write".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("refusing write".into()))
        }
    }

    type TestController = WorkoutController<RecordingView, RecordingView, StepClock>;

    fn controller_with(slot: SharedSlot) -> TestController {
        let config = Config::default();
        let store = WorkoutStore::new(Box::new(slot), &config.slot_key);
        let mut c = WorkoutController::new(
            &config,
            store,
            RecordingView::default(),
            RecordingView::default(),
            StepClock::new(),
        );
        c.start().unwrap();
        c
    }

    fn controller() -> TestController {
        controller_with(SharedSlot::default())
    }

    fn saved(slot: &SharedSlot) -> Vec<Workout> {
        WorkoutStore::new(Box::new(slot.clone()), DEFAULT_SLOT_KEY)
            .load()
            .unwrap()
    }

    fn add_run(c: &mut TestController, distance: &str) -> Workout {
        c.create_workout(
            WorkoutKind::Running,
            Coords::new(10.0, 20.0),
            &RawInputs::new(distance, "25", "150"),
        )
        .unwrap()
    }

    fn always(_: &str) -> bool {
        true
    }

    fn never(_: &str) -> bool {
        false
    }

    #[test]
    fn create_persists_and_renders() {
        let slot = SharedSlot::default();
        let mut c = controller_with(slot.clone());
        let w = add_run(&mut c, "5");

        assert_eq!(w.pace(), Some(5.0));
        assert_eq!(c.workouts().len(), 1);
        assert_eq!(saved(&slot), c.workouts());
        assert_eq!(c.list().entries, vec![w.id().clone()]);
        assert_eq!(c.map().markers.len(), 1);
        assert_eq!(c.map().markers[0].style_class, "running-popup");
    }

    #[test]
    fn cycling_with_negative_elevation_is_accepted() {
        let mut c = controller();
        let w = c
            .create_workout(
                WorkoutKind::Cycling,
                Coords::new(10.0, 20.0),
                &RawInputs::new("20", "60", "-5"),
            )
            .unwrap();
        assert_eq!(w.speed(), Some(20.0));
        assert_eq!(w.elevation_gain(), Some(-5.0));
    }

    #[test]
    fn invalid_input_changes_nothing() {
        let slot = SharedSlot::default();
        let mut c = controller_with(slot.clone());
        let err = c
            .create_workout(
                WorkoutKind::Running,
                Coords::new(0.0, 0.0),
                &RawInputs::new("5", "abc", "150"),
            )
            .unwrap_err();

        assert!(matches!(err, WorkoutError::Validation(_)));
        assert!(c.workouts().is_empty());
        assert_eq!(slot.writes.get(), 0);
        assert_eq!(c.list().notices, vec![ValidationError::NOTICE.to_string()]);
    }

    #[test]
    fn form_flow_follows_state_machine() {
        let mut c = controller();
        assert!(matches!(
            c.submit_form(WorkoutKind::Running, &RawInputs::new("5", "25", "150")),
            Err(WorkoutError::InvalidState(_))
        ));

        let here = Coords::new(51.5, -0.12);
        c.on_map_click(here);
        assert_eq!(c.state(), &UiState::FormOpen { coords: here });

        assert!(c
            .submit_form(WorkoutKind::Running, &RawInputs::new("5", "25", "0"))
            .is_err());
        assert_eq!(c.state(), &UiState::FormOpen { coords: here });

        let w = c
            .submit_form(WorkoutKind::Running, &RawInputs::new("5", "25", "170"))
            .unwrap();
        assert_eq!(w.coords(), here);
        assert_eq!(c.state(), &UiState::Idle);
    }

    #[test]
    fn ids_are_unique_within_the_same_millisecond() {
        let config = Config::default();
        let mut c = WorkoutController::new(
            &config,
            WorkoutStore::in_memory(&config.slot_key),
            RecordingView::default(),
            RecordingView::default(),
            FrozenClock,
        );
        let raw = RawInputs::new("5", "25", "150");
        let a = c
            .create_workout(WorkoutKind::Running, Coords::new(0.0, 0.0), &raw)
            .unwrap();
        let b = c
            .create_workout(WorkoutKind::Running, Coords::new(0.0, 0.0), &raw)
            .unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.created_at(), b.created_at());
    }

    #[test]
    fn edit_updates_and_persists() {
        let slot = SharedSlot::default();
        let mut c = controller_with(slot.clone());
        let w = add_run(&mut c, "5");

        let prefill = c.open_edit(w.id()).unwrap();
        assert_eq!(prefill, RawInputs::new("5", "25", "150"));
        assert_eq!(c.state(), &UiState::EditOpen { id: w.id().clone() });

        let outcome = c.submit_edit(&RawInputs::new("10", "45", "160")).unwrap();
        assert_eq!(outcome, EditOutcome::Updated);
        assert_eq!(c.state(), &UiState::Idle);

        let edited = c.get(w.id()).unwrap();
        assert_eq!(edited.pace(), Some(4.5));
        assert_eq!(edited.created_at(), w.created_at());
        assert_eq!(saved(&slot), c.workouts());
        assert_eq!(c.list().updated, vec![w.id().clone()]);
    }

    #[test]
    fn edit_with_same_values_does_not_write() {
        let slot = SharedSlot::default();
        let mut c = controller_with(slot.clone());
        let w = add_run(&mut c, "5");
        let writes = slot.writes.get();

        let outcome = c
            .edit_workout(w.id(), &RawInputs::new("5.0", "25", "150"))
            .unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(slot.writes.get(), writes);
        assert_eq!(c.list().notices, vec![NO_CHANGES_NOTICE.to_string()]);
    }

    #[test]
    fn edit_validation_keeps_form_open() {
        let mut c = controller();
        let w = add_run(&mut c, "5");
        c.open_edit(w.id()).unwrap();
        assert!(c.submit_edit(&RawInputs::new("-1", "25", "150")).is_err());
        assert_eq!(c.state(), &UiState::EditOpen { id: w.id().clone() });
        assert_eq!(c.get(w.id()).unwrap().distance_km(), 5.0);
    }

    #[test]
    fn edit_unknown_id_is_not_found() {
        let mut c = controller();
        add_run(&mut c, "5");
        let err = c
            .edit_workout(&"missing".into(), &RawInputs::new("1", "1", "1"))
            .unwrap_err();
        assert!(matches!(err, WorkoutError::NotFound(id) if id.as_str() == "missing"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let slot = SharedSlot::default();
        let mut c = controller_with(slot.clone());
        let w = add_run(&mut c, "5");

        assert_eq!(
            c.delete_workout(w.id(), &mut never).unwrap(),
            DeleteOutcome::Cancelled
        );
        assert_eq!(c.workouts().len(), 1);

        let mut prompts = Vec::new();
        let mut record = |p: &str| {
            prompts.push(p.to_string());
            true
        };
        assert_eq!(
            c.delete_workout(w.id(), &mut record).unwrap(),
            DeleteOutcome::Removed
        );
        assert_eq!(prompts, vec![DELETE_PROMPT.to_string()]);
        assert!(c.workouts().is_empty());
        assert!(saved(&slot).is_empty());
        assert!(c.list().entries.is_empty());
        assert!(c.map().markers.is_empty());
    }

    #[test]
    fn delete_unknown_id_leaves_collection() {
        let mut c = controller();
        add_run(&mut c, "5");
        let before = c.workouts().to_vec();
        let err = c.delete_workout(&"nope".into(), &mut always).unwrap_err();
        assert!(matches!(err, WorkoutError::NotFound(_)));
        assert_eq!(c.workouts(), before.as_slice());
    }

    #[test]
    fn reset_clears_slot_after_confirmation() {
        let slot = SharedSlot::default();
        let mut c = controller_with(slot.clone());
        add_run(&mut c, "5");
        add_run(&mut c, "7");

        assert_eq!(c.reset_all(&mut never).unwrap(), ResetOutcome::Cancelled);
        assert_eq!(c.workouts().len(), 2);

        assert_eq!(c.reset_all(&mut always).unwrap(), ResetOutcome::Cleared);
        assert!(!c.has_workouts());
        assert!(slot.inner.borrow().get(DEFAULT_SLOT_KEY).unwrap().is_none());
        assert!(c.map().markers.is_empty());
    }

    #[test]
    fn sort_reorders_and_persists() {
        let slot = SharedSlot::default();
        let mut c = controller_with(slot.clone());
        let a = add_run(&mut c, "5");
        let b = add_run(&mut c, "3");
        let d = add_run(&mut c, "8");

        c.sort(SortKey::Date(DateOrder::RecentFirst)).unwrap();
        let order: Vec<_> = c.workouts().iter().map(|w| w.id().clone()).collect();
        assert_eq!(order, vec![d.id().clone(), b.id().clone(), a.id().clone()]);
        assert_eq!(saved(&slot), c.workouts());
        assert_eq!(c.list().entries, order);

        c.sort(SortKey::Metric(crate::sort::Metric::Distance)).unwrap();
        let order: Vec<_> = c.workouts().iter().map(|w| w.id().clone()).collect();
        assert_eq!(order, vec![b.id().clone(), a.id().clone(), d.id().clone()]);
    }

    #[test]
    fn failed_write_rolls_back() {
        let config = Config::default();
        let mut c = WorkoutController::new(
            &config,
            WorkoutStore::new(Box::new(RejectingSlot), &config.slot_key),
            RecordingView::default(),
            RecordingView::default(),
            StepClock::new(),
        );
        let err = c
            .create_workout(
                WorkoutKind::Running,
                Coords::new(0.0, 0.0),
                &RawInputs::new("5", "25", "150"),
            )
            .unwrap_err();
        assert!(matches!(err, WorkoutError::Storage(_)));
        assert!(c.workouts().is_empty());
        assert!(c.list().entries.is_empty());
    }

    #[test]
    fn focus_centers_map_at_zoom() {
        let mut c = controller();
        let w = add_run(&mut c, "5");
        assert_eq!(c.focus(w.id()).unwrap(), Coords::new(10.0, 20.0));
        assert_eq!(c.map().centers, vec![(Coords::new(10.0, 20.0), DEFAULT_ZOOM)]);
        assert!(c.focus(&"gone".into()).is_err());
    }

    #[test]
    fn restart_restores_collection() {
        let slot = SharedSlot::default();
        let mut first = controller_with(slot.clone());
        add_run(&mut first, "5");
        first
            .create_workout(
                WorkoutKind::Cycling,
                Coords::new(1.0, 2.0),
                &RawInputs::new("20", "60", "300"),
            )
            .unwrap();

        let mut second = controller_with(slot);
        assert_eq!(second.workouts(), first.workouts());
        second.render_all();
        assert_eq!(second.list().entries.len(), 2);
        assert_eq!(second.map().markers.len(), 2);
    }

    #[test]
    fn import_skips_known_ids() {
        let mut c = controller();
        let json = r#"[
            {"date":"2024-05-01T07:30:00.000Z","id":"111","coords":[1,2],
             "distance":5,"duration":25,"type":"running","cadence":150},
            {"date":"2024-05-02T07:30:00.000Z","id":"222","coords":[1,2],
             "distance":20,"duration":60,"type":"cycling","elevationGain":10}
        ]"#;
        assert_eq!(c.import_legacy(json).unwrap(), 2);
        assert_eq!(c.import_legacy(json).unwrap(), 0);
        assert_eq!(c.workouts().len(), 2);
    }
}

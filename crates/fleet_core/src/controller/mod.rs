//! Controller and view contracts for presentation layers.
//!
//! # Responsibility
//! - Turn user commands (raw field maps, ids, field names) into repository
//!   calls and route results to a `View`.
//! - Keep the view in sync with the collection through a repository
//!   observer.
//!
//! # Invariants
//! - Errors are rendered through `View::show_error` and still returned.
//! - The controller never writes an entity that failed validation.

use crate::model::{Entity, EntityId, FieldMap, ValidationError};
use crate::repo::{ChangeEvent, Observer, ObserverError, RepoError, Repository, TableEntity};
use log::warn;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Rendering surface driven by a `Controller`.
pub trait View<E> {
    fn show_list(&mut self, entities: &[E]);
    fn show_details(&mut self, entity: &E);
    fn show_message(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
}

/// Failure of a controller operation.
#[derive(Debug)]
pub enum ControllerError {
    /// User input rejected before reaching the repository.
    Validation(ValidationError),
    Repo(RepoError),
}

impl ControllerError {
    /// HTTP-like status code for transport layers.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Repo(RepoError::Validation(_)) | Self::Repo(RepoError::UnknownField { .. }) => {
                400
            }
            Self::Repo(RepoError::NotFound { .. }) => 404,
            Self::Repo(_) => 500,
        }
    }
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ControllerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Re-renders the full collection after every repository change.
struct RefreshObserver<V> {
    view: Rc<RefCell<V>>,
}

impl<E, V: View<E>> Observer<E> for RefreshObserver<V> {
    fn notify(&mut self, event: &ChangeEvent<'_, E>) -> Result<(), ObserverError> {
        let mut view = self
            .view
            .try_borrow_mut()
            .map_err(|_| ObserverError::new("view is already being rendered"))?;
        view.show_list(event.snapshot);
        Ok(())
    }
}

/// Mediates between one repository and one view.
pub struct Controller<E: TableEntity, V: View<E>> {
    repo: Repository<E>,
    view: Rc<RefCell<V>>,
}

impl<E, V> Controller<E, V>
where
    E: TableEntity,
    V: View<E> + 'static,
{
    /// Wires `view` to `repo`; every later mutation re-renders the list.
    pub fn new(mut repo: Repository<E>, view: Rc<RefCell<V>>) -> Self {
        repo.subscribe(RefreshObserver {
            view: Rc::clone(&view),
        });
        Self { repo, view }
    }

    pub fn repository(&self) -> &Repository<E> {
        &self.repo
    }

    pub fn view(&self) -> Rc<RefCell<V>> {
        Rc::clone(&self.view)
    }

    /// Reloads from storage and renders the whole collection.
    pub fn start(&mut self) -> ControllerResult<()> {
        let result = self.repo.load().map(|_| ()).map_err(ControllerError::from);
        self.report(result)
    }

    /// Renders and returns one 1-based page; out-of-range pages are empty.
    pub fn index(&mut self, page_size: usize, page_number: usize) -> ControllerResult<Vec<E>> {
        let page = self.repo.get_page(page_size, page_number);
        self.view.borrow_mut().show_list(&page);
        Ok(page)
    }

    pub fn details(&mut self, id: EntityId) -> ControllerResult<E> {
        let result = self.find(id);
        if let Ok(entity) = &result {
            self.view.borrow_mut().show_details(entity);
        }
        self.report(result)
    }

    /// Validates `fields` into a new entity and stores it.
    pub fn add(&mut self, fields: &FieldMap) -> ControllerResult<EntityId> {
        let result = self.create(fields);
        if let Ok(id) = &result {
            self.message(&format!("{} {} added", E::KIND, id));
        }
        self.report(result)
    }

    /// Overlays `fields` on the stored entity and replaces it.
    ///
    /// Fields not named in `fields` keep their stored value; an empty value
    /// clears an optional field.
    pub fn edit(&mut self, id: EntityId, fields: &FieldMap) -> ControllerResult<()> {
        let result = self.update(id, fields);
        if result.is_ok() {
            self.message(&format!("{} {} updated", E::KIND, id));
        }
        self.report(result)
    }

    /// Deletes an existing entity; unknown ids are reported as not found.
    pub fn delete(&mut self, id: EntityId) -> ControllerResult<()> {
        let result = self
            .find(id)
            .and_then(|_| self.repo.delete_by_id(id).map_err(ControllerError::from));
        if result.is_ok() {
            self.message(&format!("{} {} deleted", E::KIND, id));
        }
        self.report(result)
    }

    pub fn sort(&mut self, field: &str) -> ControllerResult<()> {
        let result = self.repo.sort_by(field).map_err(ControllerError::from);
        self.report(result)
    }

    pub fn count(&mut self) -> ControllerResult<usize> {
        let result = self.repo.count().map_err(ControllerError::from);
        if let Ok(count) = &result {
            self.message(&format!("{count} {} record(s)", E::KIND));
        }
        self.report(result)
    }

    fn find(&self, id: EntityId) -> ControllerResult<E> {
        self.repo.get_by_id(id)?.ok_or_else(|| {
            ControllerError::Repo(RepoError::NotFound {
                entity: E::KIND,
                id,
            })
        })
    }

    fn create(&mut self, fields: &FieldMap) -> ControllerResult<EntityId> {
        check_known_fields::<E>(fields)?;
        let entity = E::from_fields(fields)?;
        Ok(self.repo.add(entity)?)
    }

    fn update(&mut self, id: EntityId, fields: &FieldMap) -> ControllerResult<()> {
        check_known_fields::<E>(fields)?;
        let stored = self.find(id)?;
        let mut merged: FieldMap = stored
            .details()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.remove(E::ID_FIELD);

        let entity = E::from_fields(&merged)?;
        Ok(self.repo.replace_by_id(id, entity)?)
    }

    fn message(&self, message: &str) {
        self.view.borrow_mut().show_message(message);
    }

    fn report<T>(&self, result: ControllerResult<T>) -> ControllerResult<T> {
        if let Err(err) = &result {
            warn!(
                "event=controller_error module=controller status=error entity={} code={} error={}",
                E::KIND,
                err.status(),
                err
            );
            if let Ok(mut view) = self.view.try_borrow_mut() {
                view.show_error(&err.to_string());
            }
        }
        result
    }
}

fn check_known_fields<E: Entity>(fields: &FieldMap) -> ControllerResult<()> {
    match fields.keys().find(|name| !E::has_field(name)) {
        Some(name) => Err(ControllerError::Repo(RepoError::UnknownField {
            entity: E::KIND,
            field: name.clone(),
        })),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbHandle;
    use crate::model::Driver;
    use crate::repo::Backend;

    #[derive(Default)]
    struct RecordingView {
        lists: Vec<usize>,
        details: Vec<String>,
        messages: Vec<String>,
        errors: Vec<String>,
    }

    impl View<Driver> for RecordingView {
        fn show_list(&mut self, entities: &[Driver]) {
            self.lists.push(entities.len());
        }

        fn show_details(&mut self, entity: &Driver) {
            self.details.push(entity.short_name());
        }

        fn show_message(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }

        fn show_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ivanov() -> FieldMap {
        fields(&[
            ("last_name", "Ivanov"),
            ("first_name", "Ivan"),
            ("patronymic", "Ivanovich"),
            ("experience", "5"),
        ])
    }

    fn controller() -> (Controller<Driver, RecordingView>, Rc<RefCell<RecordingView>>) {
        let backend = Backend::sqlite(DbHandle::in_memory().unwrap());
        let repo = Repository::<Driver>::open(backend).unwrap();
        let view = Rc::new(RefCell::new(RecordingView::default()));
        (Controller::new(repo, Rc::clone(&view)), view)
    }

    #[test]
    fn add_renders_refreshed_list_and_message() {
        let (mut controller, view) = controller();
        controller.start().unwrap();

        let id = controller.add(&ivanov()).unwrap();

        assert_eq!(id, 1);
        let view = view.borrow();
        assert_eq!(view.lists, vec![0, 1]);
        assert_eq!(view.messages, vec!["driver 1 added".to_string()]);
        assert!(view.errors.is_empty());
    }

    #[test]
    fn invalid_input_is_rendered_and_not_stored() {
        let (mut controller, view) = controller();
        let mut input = ivanov();
        input.insert("experience".to_string(), "-1".to_string());

        let err = controller.add(&input).unwrap_err();

        assert_eq!(err.status(), 400);
        assert_eq!(controller.repository().count().unwrap(), 0);
        assert_eq!(view.borrow().errors.len(), 1);
    }

    #[test]
    fn unknown_input_field_is_rejected() {
        let (mut controller, _view) = controller();
        let mut input = ivanov();
        input.insert("nickname".to_string(), "Vanya".to_string());

        let err = controller.add(&input).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("nickname"));
    }

    #[test]
    fn edit_overlays_fields_on_stored_entity() {
        let (mut controller, view) = controller();
        let id = controller.add(&ivanov()).unwrap();

        controller
            .edit(id, &fields(&[("experience", "7")]))
            .unwrap();

        let stored = controller.details(id).unwrap();
        assert_eq!(stored.experience(), 7);
        assert_eq!(stored.last_name(), "Ivanov");
        assert_eq!(view.borrow().details, vec!["Ivanov I. I.".to_string()]);
    }

    #[test]
    fn missing_ids_map_to_not_found() {
        let (mut controller, view) = controller();

        assert_eq!(controller.details(42).unwrap_err().status(), 404);
        assert_eq!(controller.delete(42).unwrap_err().status(), 404);
        assert_eq!(
            controller.edit(42, &ivanov()).unwrap_err().status(),
            404
        );
        assert_eq!(view.borrow().errors.len(), 3);
    }

    #[test]
    fn index_renders_requested_page_only() {
        let (mut controller, view) = controller();
        for _ in 0..3 {
            controller.add(&ivanov()).unwrap();
        }

        let page = controller.index(2, 2).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id(), Some(3));
        assert_eq!(view.borrow().lists.last(), Some(&1));
    }

    #[test]
    fn sort_by_unknown_field_reports_error() {
        let (mut controller, view) = controller();
        let err = controller.sort("nickname").unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(view.borrow().errors.len(), 1);
    }
}

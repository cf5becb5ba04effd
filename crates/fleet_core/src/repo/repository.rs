//! Generic entity repository over a file or SQLite backend.
//!
//! # Responsibility
//! - Hold the ordered collection of one entity type.
//! - Offer CRUD, pagination and sorting with identical semantics on every
//!   backend.
//! - Notify subscribed observers after each persisted change.
//!
//! # Invariants
//! - Order is insertion order until `sort_by` reorders it.
//! - File backends assign `max(id) + 1`; ids freed by deletion are not
//!   handed out again while the repository lives.
//! - SQLite delegates id assignment to `AUTOINCREMENT`.
//! - Observers run only after persistence succeeded.

use crate::model::{EntityId, FieldValue};
use crate::repo::backend::Backend;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::observer::{
    ChangeEvent, ChangeKind, FnObserver, Observer, ObserverError, SubscriptionId,
};
use crate::repo::sqlite_store::TableEntity;
use log::{debug, error, info};
use std::time::Instant;

/// Ordered, observable collection of `E` persisted through a `Backend`.
pub struct Repository<E: TableEntity> {
    backend: Backend,
    entities: Vec<E>,
    /// Highest id handed out or seen by this instance.
    high_water_id: EntityId,
    observers: Vec<(SubscriptionId, Box<dyn Observer<E>>)>,
    next_subscription: u64,
}

impl<E: TableEntity> Repository<E> {
    /// Opens the repository and reads the current collection.
    ///
    /// SQLite backends create the entity table when missing. A missing
    /// file yields an empty collection.
    pub fn open(backend: Backend) -> RepoResult<Self> {
        if let Backend::Sqlite(store) = &backend {
            store.ensure_table::<E>()?;
        }

        let mut repo = Self {
            backend,
            entities: Vec::new(),
            high_water_id: 0,
            observers: Vec::new(),
            next_subscription: 0,
        };
        repo.reload()?;
        info!(
            "event=repo_open module=repo status=ok entity={} backend={} count={}",
            E::KIND,
            repo.backend.name(),
            repo.entities.len()
        );
        Ok(repo)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Current collection in its current order.
    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    /// Re-reads the backing store, notifies observers and returns a snapshot.
    pub fn load(&mut self) -> RepoResult<Vec<E>> {
        self.reload()?;
        self.notify(ChangeKind::Loaded)?;
        Ok(self.entities.clone())
    }

    /// Writes the whole collection for file backends.
    ///
    /// SQLite commits per mutation, so this is a no-op there.
    pub fn save(&self) -> RepoResult<()> {
        match &self.backend {
            Backend::File(store) => store.write_all(&self.entities),
            Backend::Sqlite(_) => Ok(()),
        }
    }

    pub fn get_by_id(&self, id: EntityId) -> RepoResult<Option<E>> {
        match &self.backend {
            Backend::File(_) => Ok(self.position(id).map(|index| self.entities[index].clone())),
            Backend::Sqlite(store) => store.select_by_id(id),
        }
    }

    /// Page `page_number` (1-based) of `page_size` entities.
    ///
    /// Returns the slice `[(page_number - 1) * page_size, page_number * page_size)`
    /// of the current order. Out-of-range pages are empty.
    pub fn get_page(&self, page_size: usize, page_number: usize) -> Vec<E> {
        if page_size == 0 || page_number == 0 {
            return Vec::new();
        }
        let start = (page_number - 1).saturating_mul(page_size);
        self.entities
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect()
    }

    /// Stable sort by `field`; unknown fields leave the order untouched.
    pub fn sort_by(&mut self, field: &str) -> RepoResult<()> {
        if !E::has_field(field) {
            return Err(RepoError::UnknownField {
                entity: E::KIND,
                field: field.to_string(),
            });
        }

        let mut keyed: Vec<(FieldValue, E)> = self
            .entities
            .drain(..)
            .map(|entity| {
                let key = entity.field(field).unwrap_or(FieldValue::Absent);
                (key, entity)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| a.compare(b));
        self.entities = keyed.into_iter().map(|(_, entity)| entity).collect();

        self.save()?;
        debug!(
            "event=repo_sort module=repo status=ok entity={} field={}",
            E::KIND,
            field
        );
        self.notify(ChangeKind::Sorted(field.to_string()))
    }

    /// Stores `entity` under a fresh id and returns that id.
    pub fn add(&mut self, entity: E) -> RepoResult<EntityId> {
        let started_at = Instant::now();
        let result = self.insert(entity);
        self.log_mutation("repo_add", started_at, &result);
        let id = result?;
        self.notify(ChangeKind::Added(id))?;
        Ok(id)
    }

    /// Replaces the entity stored under `id`, keeping id and position.
    pub fn replace_by_id(&mut self, id: EntityId, entity: E) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.replace(id, entity).map(|()| id);
        self.log_mutation("repo_replace", started_at, &result);
        result?;
        self.notify(ChangeKind::Updated(id))
    }

    /// Removes the entity stored under `id`; absent ids are not an error.
    pub fn delete_by_id(&mut self, id: EntityId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.remove(id).map(|()| id);
        self.log_mutation("repo_delete", started_at, &result);
        result?;
        self.notify(ChangeKind::Deleted(id))
    }

    pub fn count(&self) -> RepoResult<usize> {
        match &self.backend {
            Backend::File(_) => Ok(self.entities.len()),
            Backend::Sqlite(store) => store.count::<E>(),
        }
    }

    /// Registers an observer; it receives every later change event.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: Observer<E> + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Registers a closure observer.
    pub fn subscribe_fn<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent<'_, E>) -> Result<(), ObserverError> + 'static,
    {
        self.subscribe(FnObserver(callback))
    }

    /// Removes a subscription; returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(subscription, _)| *subscription != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn reload(&mut self) -> RepoResult<()> {
        self.entities = match &self.backend {
            Backend::File(store) => store.read_all()?,
            Backend::Sqlite(store) => store.select_all()?,
        };
        let loaded_max = self.max_id();
        self.high_water_id = self.high_water_id.max(loaded_max);
        Ok(())
    }

    fn insert(&mut self, entity: E) -> RepoResult<EntityId> {
        match &self.backend {
            Backend::File(store) => {
                let id = self.high_water_id.max(self.max_id()) + 1;
                self.entities.push(entity.with_id(id)?);
                self.high_water_id = id;
                store.write_all(&self.entities)?;
                Ok(id)
            }
            Backend::Sqlite(store) => {
                let id = store.insert(&entity)?;
                self.entities.push(entity.with_id(id)?);
                self.high_water_id = self.high_water_id.max(id);
                Ok(id)
            }
        }
    }

    fn replace(&mut self, id: EntityId, entity: E) -> RepoResult<()> {
        let not_found = || RepoError::NotFound {
            entity: E::KIND,
            id,
        };
        let entity = entity.with_id(id)?;
        match &self.backend {
            Backend::File(store) => {
                let index = self.position(id).ok_or_else(not_found)?;
                self.entities[index] = entity;
                store.write_all(&self.entities)
            }
            Backend::Sqlite(store) => {
                if !store.update(id, &entity)? {
                    return Err(not_found());
                }
                match self.position(id) {
                    Some(index) => self.entities[index] = entity,
                    None => self.entities.push(entity),
                }
                Ok(())
            }
        }
    }

    fn remove(&mut self, id: EntityId) -> RepoResult<()> {
        self.entities.retain(|entity| entity.id() != Some(id));
        match &self.backend {
            Backend::File(store) => store.write_all(&self.entities),
            Backend::Sqlite(store) => store.delete::<E>(id).map(|_| ()),
        }
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        self.entities
            .iter()
            .position(|entity| entity.id() == Some(id))
    }

    fn max_id(&self) -> EntityId {
        self.entities
            .iter()
            .filter_map(|entity| entity.id())
            .max()
            .unwrap_or(0)
    }

    fn notify(&mut self, kind: ChangeKind) -> RepoResult<()> {
        let event = ChangeEvent {
            kind,
            snapshot: &self.entities,
        };
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(&event)?;
        }
        Ok(())
    }

    fn log_mutation(&self, event: &str, started_at: Instant, result: &RepoResult<EntityId>) {
        match result {
            Ok(id) => info!(
                "event={} module=repo status=ok entity={} backend={} id={} duration_ms={}",
                event,
                E::KIND,
                self.backend.name(),
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={} module=repo status=error entity={} backend={} duration_ms={} error={}",
                event,
                E::KIND,
                self.backend.name(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
    }
}

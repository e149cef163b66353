//! Shared create/update paths for entities with unique names
//!
//! Uniqueness is checked inside the collection's lock, against the same
//! snapshot the write is built from.

use super::store::{not_found, EntityStore};
use crate::error::{TouchlineError, TouchlineResult};
use crate::models::{normalize_name, Collection, Named};

pub(crate) fn ensure_unique_name<E: Named>(
    collection: &Collection<E>,
    candidate: &str,
    exclude_id: Option<&str>,
) -> TouchlineResult<()> {
    let wanted = normalize_name(candidate);
    let taken = collection
        .values()
        .filter(|existing| Some(existing.id()) != exclude_id)
        .any(|existing| normalize_name(existing.name()) == wanted);

    if taken {
        return Err(TouchlineError::DuplicateName {
            entity_type: E::KIND,
            name: candidate.trim().to_string(),
        });
    }
    Ok(())
}

pub(crate) fn find_by_name<'c, E: Named>(collection: &'c Collection<E>, name: &str) -> Option<&'c E> {
    let wanted = normalize_name(name);
    collection
        .values()
        .find(|existing| normalize_name(existing.name()) == wanted)
}

pub(crate) async fn create_named<E: Named>(store: &EntityStore, entity: E) -> TouchlineResult<E> {
    entity.validate().map_err(TouchlineError::ValidationFailed)?;

    let created = store
        .update_collection::<E, _, _>(move |collection| {
            ensure_unique_name(collection, entity.name(), None)?;
            collection.insert(entity.id().to_string(), entity.clone());
            Ok(entity)
        })
        .await?;

    tracing::debug!(kind = E::KIND, id = created.id(), "created");
    Ok(created)
}

/// Apply `change` to one record, re-checking name uniqueness on the result
pub(crate) async fn modify_named<E, F>(store: &EntityStore, id: &str, change: F) -> TouchlineResult<E>
where
    E: Named,
    F: FnOnce(&mut E),
{
    let id = id.to_string();
    store
        .update_collection::<E, _, _>(move |collection| {
            let mut record = collection
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found::<E>(&id))?;
            change(&mut record);
            record.validate().map_err(TouchlineError::ValidationFailed)?;
            ensure_unique_name(collection, record.name(), Some(&id))?;
            collection.insert(id, record.clone());
            Ok(record)
        })
        .await
}

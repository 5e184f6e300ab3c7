use crate::{
    error::{GateError, Rejection},
    form::NewTag,
    permissions::{ActionType, Actor},
    schema::Tag,
    store::CatalogStore,
};

pub async fn create_tag<S: CatalogStore>(
    actor: &Actor,
    tag: NewTag,
    store: &S,
) -> Result<Tag, GateError> {
    actor.authenticate(ActionType::ManageTags)?;
    let tag = tag.validate()?;

    match store.create_tag(&tag).await? {
        Some(row) => Ok(row),
        None => Err(Rejection::AlreadyExists("Tag with this name, color or slug").into()),
    }
}

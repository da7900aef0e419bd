use crate::domain_model::{
    ApiRequest, EntityKind, EntityRef, InteractionKind, MutationKind, MutationRequest,
};
use crate::domain_port::TransportError;

pub fn collection(kind: EntityKind) -> String {
    format!("/{}", kind.collection())
}

pub fn entity(target: &EntityRef) -> String {
    format!("/{}/{}", target.kind.collection(), target.id)
}

pub fn toggle(target: &EntityRef, kind: InteractionKind) -> String {
    format!("{}/{}", entity(target), kind.segment())
}

pub fn bookmarks(kind: EntityKind) -> String {
    format!("/bookmarks/{}", kind.collection())
}

/// Maps a mutation onto its REST call: toggles are `POST`/`DELETE` on the
/// toggle resource, create is `POST` on the collection, edit is `PATCH`.
pub fn mutation_request(mutation: &MutationRequest) -> Result<ApiRequest, TransportError> {
    let request = match (mutation.kind, mutation.target()) {
        (MutationKind::Create, _) => ApiRequest::post(collection(mutation.collection)),
        (MutationKind::Like, Some(target)) => {
            ApiRequest::post(toggle(&target, InteractionKind::Like))
        }
        (MutationKind::Unlike, Some(target)) => {
            ApiRequest::delete(toggle(&target, InteractionKind::Like))
        }
        (MutationKind::Bookmark, Some(target)) => {
            ApiRequest::post(toggle(&target, InteractionKind::Bookmark))
        }
        (MutationKind::Unbookmark, Some(target)) => {
            ApiRequest::delete(toggle(&target, InteractionKind::Bookmark))
        }
        (MutationKind::Edit, Some(target)) => ApiRequest::patch(entity(&target)),
        (MutationKind::Delete, Some(target)) => ApiRequest::delete(entity(&target)),
        (kind, None) => {
            return Err(TransportError::InvalidRequest(format!(
                "{kind} on {} needs an id",
                mutation.collection
            )));
        }
    };
    Ok(match &mutation.payload {
        Some(payload) => request.with_body(payload.clone()),
        None => request,
    })
}

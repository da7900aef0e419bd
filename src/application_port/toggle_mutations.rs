use crate::application_port::ApiError;
use crate::domain_model::{EntityRef, ToggleDirection};

/// The activate/deactivate call pair behind one toggle (like/unlike or
/// bookmark/unbookmark).
#[async_trait::async_trait]
pub trait ToggleMutations: Send + Sync {
    async fn activate(&self, target: &EntityRef) -> Result<(), ApiError>;
    async fn deactivate(&self, target: &EntityRef) -> Result<(), ApiError>;

    async fn apply(&self, target: &EntityRef, direction: ToggleDirection) -> Result<(), ApiError> {
        match direction {
            ToggleDirection::Activate => self.activate(target).await,
            ToggleDirection::Deactivate => self.deactivate(target).await,
        }
    }
}

use crate::application_impl::{OptimisticController, PendingToggle};
use crate::application_port::ToggleMutations;
use crate::domain_model::{EntityRef, ForumPost, InteractionKind, InteractionState, Review};
use std::sync::Arc;

/// Like and bookmark state for one displayed review or forum post.
pub struct EntityInteractions {
    like: OptimisticController,
    bookmark: OptimisticController,
}

impl EntityInteractions {
    pub fn new(
        target: EntityRef,
        like: InteractionState,
        bookmark: InteractionState,
        likes: Arc<dyn ToggleMutations>,
        bookmarks: Arc<dyn ToggleMutations>,
    ) -> Self {
        Self {
            like: OptimisticController::new(target.clone(), InteractionKind::Like, like, likes),
            bookmark: OptimisticController::new(
                target,
                InteractionKind::Bookmark,
                bookmark,
                bookmarks,
            ),
        }
    }

    pub fn for_review(
        review: &Review,
        likes: Arc<dyn ToggleMutations>,
        bookmarks: Arc<dyn ToggleMutations>,
    ) -> Self {
        Self::new(
            review.entity(),
            review.like_state(),
            review.bookmark_state(),
            likes,
            bookmarks,
        )
    }

    pub fn for_forum(
        post: &ForumPost,
        likes: Arc<dyn ToggleMutations>,
        bookmarks: Arc<dyn ToggleMutations>,
    ) -> Self {
        Self::new(
            post.entity(),
            post.like_state(),
            post.bookmark_state(),
            likes,
            bookmarks,
        )
    }

    pub fn target(&self) -> &EntityRef {
        self.like.target()
    }

    pub fn controller(&self, kind: InteractionKind) -> &OptimisticController {
        match kind {
            InteractionKind::Like => &self.like,
            InteractionKind::Bookmark => &self.bookmark,
        }
    }

    pub fn toggle(&self, kind: InteractionKind) -> PendingToggle {
        self.controller(kind).toggle()
    }

    pub fn has_pending(&self) -> bool {
        self.like.has_pending() || self.bookmark.has_pending()
    }

    /// (like, bookmark) versions, for [`EntityInteractions::reconcile_if`].
    pub fn versions(&self) -> (u64, u64) {
        (self.like.version(), self.bookmark.version())
    }

    /// Applies each side only if it saw no local change since `versions`.
    /// Returns whether either side was applied.
    pub fn reconcile_if(
        &self,
        versions: (u64, u64),
        like: InteractionState,
        bookmark: InteractionState,
    ) -> bool {
        let like = self.like.reconcile_if(versions.0, like);
        let bookmark = self.bookmark.reconcile_if(versions.1, bookmark);
        like || bookmark
    }

    pub fn reconcile(&self, like: InteractionState, bookmark: InteractionState) {
        self.like.reconcile(like);
        self.bookmark.reconcile(bookmark);
    }
}

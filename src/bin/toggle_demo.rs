//! Walks the optimistic toggle and session refresh paths against the
//! in-memory backend.
//!
//! $ cargo run --bin toggle_demo

use armeta::application_impl::ToggleOutcome;
use armeta::application_port::ReviewQuery;
use armeta::client::Client;
use armeta::domain_model::InteractionKind;
use armeta::logger::*;
use armeta::settings::*;
use futures_util::future::join_all;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    let mut settings = parse_settings(None)?;
    settings.transport.backend = "fake".to_string();
    logger.reload_from_config(&LogConfig {
        filter: "toggle_demo=debug,armeta=debug".to_string(),
    })?;

    let client = Client::try_new(&settings)?;
    let Some(backend) = client.fake_backend().cloned() else {
        return Err(anyhow::anyhow!("demo needs the fake backend"));
    };

    // region concurrent reads after the access cookie expired
    backend.expire_session();
    let queries: Vec<ReviewQuery> = (1..=3)
        .map(|n| ReviewQuery {
            page: 1,
            search: Some(format!("q{n}")),
            ..Default::default()
        })
        .collect();
    let reads = queries.iter().map(|q| client.review_service.list_reviews(q));
    for result in join_all(reads).await {
        let page = result?;
        debug!("read {} reviews", page.items.len());
    }
    info!("session refreshes: {}", backend.refresh_calls());
    // endregion

    // region optimistic like, then a rejected one
    let page = client.review_service.list_reviews(&ReviewQuery::default()).await?;
    let Some(review) = page.items.first() else {
        return Err(anyhow::anyhow!("no reviews seeded"));
    };
    let interactions = client.review_interactions(review);

    let pending = interactions.toggle(InteractionKind::Like);
    info!(state = ?pending.state, "optimistic like");
    info!(outcome = ?pending.settle().await, "like settled");

    backend.fail_toggles_for(&review.id.0);
    let pending = interactions.toggle(InteractionKind::Like);
    info!(state = ?pending.state, "optimistic unlike");
    if let ToggleOutcome::Reverted { error } = pending.settle().await {
        warn!(%error, state = ?interactions.controller(InteractionKind::Like).state(), "unlike reverted");
    }
    // endregion

    // region refresh failure sends the user to login
    backend.revoke_session();
    if let Err(e) = client.review_service.list_bookmarked_reviews(1).await {
        warn!("after revoke: {e}");
    }
    // endregion

    client.shutdown().await;
    Ok(())
}

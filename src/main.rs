use armeta::application_impl::ToggleOutcome;
use armeta::application_port::*;
use armeta::client::*;
use armeta::domain_model::{EntityId, InteractionKind};
use armeta::logger::*;
use armeta::settings::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let client = Client::try_new(&project_settings)?;

    if let (Some(email), Some(password)) = (cli.email.clone(), cli.password.clone()) {
        let user = client
            .session_service
            .login(LoginInput { email, password })
            .await?;
        println!("logged in as {}", user.email);
    }

    let result = run(&client, cli.command.unwrap_or(Command::Me)).await;

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, client.shutdown()).await {
        Ok(_) => tracing::info!("client shutdown successfully"),
        Err(_) => tracing::error!("client shutdown timed out"),
    }

    result
}

async fn run(client: &Client, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Reviews { page, search } => {
            let reviews = client
                .review_service
                .list_reviews(&ReviewQuery {
                    page,
                    search,
                    ..Default::default()
                })
                .await?;
            println!("page {} ({} total)", reviews.page, reviews.total);
            for review in reviews.items {
                println!(
                    "{} [{} {}] {}/5 likes={} bookmarks={} {}",
                    review.id,
                    review.target_type.as_str(),
                    review.target_id,
                    review.rating,
                    review.like_count,
                    review.bookmark_count,
                    review.content
                );
            }
        }
        Command::Forums { page, tag } => {
            let posts = client
                .forum_service
                .list_forums(&ForumQuery {
                    page,
                    tag,
                    ..Default::default()
                })
                .await?;
            println!("page {} ({} total)", posts.page, posts.total);
            for post in posts.items {
                println!(
                    "{} {} likes={} comments={} [{}]",
                    post.id,
                    post.title,
                    post.like_count,
                    post.comment_count,
                    post.tags.join(", ")
                );
            }
        }
        Command::LikeReview { id } => toggle_review(client, id, InteractionKind::Like).await?,
        Command::BookmarkReview { id } => {
            toggle_review(client, id, InteractionKind::Bookmark).await?
        }
        Command::LikeForum { id } => toggle_forum(client, id, InteractionKind::Like).await?,
        Command::BookmarkForum { id } => {
            toggle_forum(client, id, InteractionKind::Bookmark).await?
        }
        Command::Me => {
            let user = client.session_service.current_user().await?;
            println!(
                "{} <{}> {:?}",
                user.display_name.as_deref().unwrap_or("-"),
                user.email,
                user.role
            );
        }
    }
    Ok(())
}

async fn toggle_review(client: &Client, id: String, kind: InteractionKind) -> anyhow::Result<()> {
    let review = client.review_service.get_review(&EntityId(id)).await?;
    toggle(client.review_interactions(&review), kind).await
}

async fn toggle_forum(client: &Client, id: String, kind: InteractionKind) -> anyhow::Result<()> {
    let post = client.forum_service.get_forum(&EntityId(id)).await?;
    toggle(client.forum_interactions(&post), kind).await
}

async fn toggle(interactions: Arc<EntityInteractions>, kind: InteractionKind) -> anyhow::Result<()> {
    let pending = interactions.toggle(kind);
    println!(
        "{} {}: active={} count={} (pending)",
        interactions.target(),
        kind,
        pending.state.active,
        pending.state.count
    );
    match pending.settle().await {
        ToggleOutcome::Confirmed => {}
        ToggleOutcome::Reverted { error } => println!("server rejected the change: {error}"),
        ToggleOutcome::Detached => {}
    }
    let state = interactions.controller(kind).state();
    println!(
        "{} {}: active={} count={}",
        interactions.target(),
        kind,
        state.active,
        state.count
    );
    Ok(())
}

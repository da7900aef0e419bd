use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "armeta", about = "ARMETA review and forum client")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    /// Log in before running the command.
    #[arg(long, requires = "password")]
    pub email: Option<String>,

    #[arg(long, requires = "email")]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List reviews.
    Reviews {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// List forum posts.
    Forums {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Toggle the like on a review.
    LikeReview { id: String },
    /// Toggle the bookmark on a review.
    BookmarkReview { id: String },
    /// Toggle the like on a forum post.
    LikeForum { id: String },
    /// Toggle the bookmark on a forum post.
    BookmarkForum { id: String },
    /// Show the logged-in user.
    Me,
}

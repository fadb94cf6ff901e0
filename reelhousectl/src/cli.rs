use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reelhouse_model::{ContentId, ImageVariant, ModerationStatus};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "reelhousectl")]
#[command(about = "Submit films and inspect the reelhouse catalogue")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Db(DbCommand),

    /// Upload a video (and optional poster) and register it for moderation
    Submit(SubmitArgs),

    /// List published titles, optionally in one category
    List {
        #[arg(long)]
        category: Option<String>,
    },

    /// Published titles grouped into shelves by category
    Shelves,

    /// Case-insensitive title search over published titles
    Search { query: String },

    /// Set the moderation status of a record
    Moderate {
        content_id: ContentId,
        status: ModerationStatus,
    },

    /// Record a playback position for a title
    Progress(ProgressArgs),

    /// Started but unfinished titles, most recent first
    ContinueWatching(UserArgs),

    /// Every title the user has progress on, most recent first
    History(UserArgs),

    #[command(subcommand)]
    MyList(MyListCommand),

    /// Print the delivery URL of an uploaded image
    ImageUrl {
        asset_id: String,
        /// thumbnail, medium, large or public
        #[arg(long, default_value = "public")]
        variant: ImageVariant,
    },
}

#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Args)]
pub struct UserArgs {
    /// Acting user; stands in for the signed-in session
    #[arg(long, env = "REELHOUSE_USER_ID")]
    pub user: Option<Uuid>,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub session: UserArgs,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    /// Path to the video file
    #[arg(long)]
    pub video: PathBuf,

    /// Path to a poster image
    #[arg(long)]
    pub poster: Option<PathBuf>,

    #[arg(long)]
    pub category: Option<String>,

    /// Delete assets that were uploaded when the record could not be saved
    #[arg(long, default_value_t = false)]
    pub discard_orphans: bool,
}

#[derive(Debug, Args)]
pub struct ProgressArgs {
    #[command(flatten)]
    pub session: UserArgs,

    pub content_id: ContentId,

    /// Playback position in seconds
    pub position: f64,

    /// Total duration in seconds, 0 when unknown
    pub duration: f64,
}

#[derive(Debug, Subcommand)]
pub enum MyListCommand {
    /// Save a title for later
    Add {
        #[command(flatten)]
        session: UserArgs,
        content_id: ContentId,
    },
    /// Remove a saved title
    Remove {
        #[command(flatten)]
        session: UserArgs,
        content_id: ContentId,
    },
    /// Show saved titles, newest first
    Show(UserArgs),
}

//! Command-line arguments.
//!
//! Every flag can also come from the environment (or a `.env` file).

use clap::{Parser, Subcommand};

/// Encore: practice points and studio context for music studios.
#[derive(Parser, Debug)]
#[command(name = "encore", version)]
#[command(about = "Recalculate practice points and resolve studio context")]
pub struct Args {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Signed-in user id for session commands
    #[arg(long, env = "ENCORE_USER_ID")]
    pub user: Option<String>,

    /// Page the session is currently on
    #[arg(long, env = "ENCORE_PAGE", default_value = "index.html")]
    pub page: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Recompute a user's approved points total and level
    Recalculate {
        /// User to recalculate (defaults to --user)
        #[arg(long = "for")]
        user: Option<String>,
    },

    /// Resolve the active studio and report where to go
    Resolve {
        /// Keep single-studio users on the current page
        #[arg(long)]
        no_redirect_home: bool,
    },

    /// Choose the active studio from the picker
    SelectStudio { studio_id: String },

    /// Show the roles held in the active studio
    Roles,

    /// Check that the user holds any of the given roles in the active studio
    RequireRole {
        #[arg(required = true, num_args = 1..)]
        roles: Vec<String>,

        /// Do not redirect home when access is denied
        #[arg(long)]
        no_redirect: bool,
    },

    /// Validate an invite token and keep it for acceptance after sign-in
    ValidateInvite { token: String },

    /// Forget the active studio and any pending invite
    Logout,
}

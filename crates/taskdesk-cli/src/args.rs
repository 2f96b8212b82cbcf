use std::path::PathBuf;

use clap::{Parser, Subcommand};
use taskdesk_core::auth::Route;
use taskdesk_core::config::StorageBackend;
use taskdesk_core::models::Role;

/// taskdesk - manage your tasks from the terminal
#[derive(Parser, Debug)]
#[command(name = "taskdesk", version, about = "Command line client for the taskdesk task manager")]
pub struct Cli {
    /// Backend base URL (e.g., http://localhost:4000/api)
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Where the session credential is persisted
    #[arg(long = "storage", global = true)]
    pub storage: Option<StorageBackend>,

    /// Print results as JSON
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Create a new account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Birth date as YYYY-MM-DD
        #[arg(long = "birth-date")]
        birth_date: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },
    /// Email a password reset link
    ForgotPassword {
        #[arg(long)]
        email: Option<String>,
    },
    /// Set a new password using the token from the reset link
    ResetPassword { token: String },
    /// Show the profile of the logged-in user
    Profile,
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Manage user accounts (admin only)
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    List,
    Show { id: i64 },
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "due-date")]
        due_date: Option<String>,
        /// File to attach
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "due-date")]
        due_date: Option<String>,
        /// File to attach
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Delete { id: i64 },
    /// Remove one attachment from a task
    DeleteFile { id: i64, file_id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long = "birth-date")]
        birth_date: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "birth-date")]
        birth_date: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },
    Delete { id: i64 },
}

impl Command {
    /// The view this command corresponds to, for route guarding
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } => Some(Route::Login),
            Command::Register { .. } => Some(Route::Register),
            Command::ForgotPassword { .. } => Some(Route::ForgotPassword),
            Command::ResetPassword { token } => Some(Route::ResetPassword(token.clone())),
            Command::Profile => Some(Route::Profile),
            Command::Tasks { .. } => Some(Route::Tasks),
            Command::Users { .. } => Some(Route::Users),
            Command::Logout | Command::Whoami => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_create() {
        let cli = Cli::parse_from([
            "taskdesk", "tasks", "create", "Write report", "--due-date", "2025-07-10", "--file", "notes.txt",
        ]);
        match cli.command {
            Command::Tasks {
                command: TaskCommand::Create { title, due_date, file, .. },
            } => {
                assert_eq!(title, "Write report");
                assert_eq!(due_date.as_deref(), Some("2025-07-10"));
                assert_eq!(file, Some(PathBuf::from("notes.txt")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["taskdesk", "users", "list", "--json", "--storage", "keyring"]);
        assert!(cli.json);
        assert_eq!(cli.storage, Some(StorageBackend::Keyring));
        assert_eq!(cli.command.route(), Some(Route::Users));
    }

    #[test]
    fn test_role_values() {
        let cli = Cli::parse_from([
            "taskdesk", "register", "--name", "Ada", "--email", "a@x.io", "--birth-date", "1990-01-01", "--role", "admin",
        ]);
        match cli.command {
            Command::Register { role, .. } => assert_eq!(role, Role::Admin),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_session_commands_are_unguarded() {
        assert_eq!(Cli::parse_from(["taskdesk", "logout"]).command.route(), None);
        assert_eq!(Cli::parse_from(["taskdesk", "whoami"]).command.route(), None);
    }
}

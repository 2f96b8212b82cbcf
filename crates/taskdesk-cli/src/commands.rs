//! Command handlers. Each one is a "view": it calls the core, prints the
//! result, and lets errors propagate to `main` for display.

use anyhow::{bail, Result};
use taskdesk_core::auth::{GuardDecision, Route};
use taskdesk_core::config::Config;
use taskdesk_core::models::{Attachment, NewTask, Registration, TaskUpdate, UserUpdate};
use taskdesk_core::Client;
use tracing::warn;

use crate::args::{Command, TaskCommand, UserCommand};
use crate::output;
use crate::prompt;

pub struct Context {
    pub config: Config,
    pub client: Client,
    pub json: bool,
}

impl Context {
    /// Refuse to run a protected command without a valid session
    fn enforce(&self, route: &Route) -> Result<()> {
        match self.client.guard().check(route) {
            GuardDecision::Render => Ok(()),
            GuardDecision::Loading => bail!("Session is still loading. Try again."),
            GuardDecision::Redirect { to, .. } => {
                bail!("Not logged in or session expired. Run `taskdesk {}` first.", to.path().trim_start_matches('/'))
            }
            GuardDecision::Forbidden => bail!("Access denied: administrators only."),
        }
    }
}

pub async fn run(ctx: &mut Context, command: Command) -> Result<()> {
    if let Some(route) = command.route() {
        ctx.enforce(&route)?;
    }

    match command {
        Command::Login { email } => login(ctx, email).await,
        Command::Logout => {
            ctx.client.session.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            match ctx.client.session.state().credential {
                Some(credential) if ctx.json => output::print_json(&credential.user)?,
                Some(credential) => {
                    let user = &credential.user;
                    println!("Logged in as {} <{}> ({})", user.name, user.email, user.role);
                    println!("{}", output::expiry_hint(&credential.token));
                }
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Command::Register { name, email, birth_date, role } => {
            let password = prompt::prompt_new_password()?;
            let registration = Registration { name, email, password, birth_date, role };
            ctx.client.auth().register(&registration).await?;
            println!("Registration successful. You can now log in.");
            Ok(())
        }
        Command::ForgotPassword { email } => {
            let email = match email {
                Some(e) => e,
                None => prompt::prompt_line("Email", ctx.config.last_email.as_deref())?,
            };
            if email.is_empty() {
                bail!("Please enter your email.");
            }
            let message = ctx.client.auth().forgot_password(&email).await?;
            println!("{}", message);
            Ok(())
        }
        Command::ResetPassword { token } => {
            let password = prompt::prompt_new_password()?;
            let message = ctx.client.auth().reset_password(&token, &password).await?;
            println!("{}", message);
            Ok(())
        }
        Command::Profile => {
            let user = ctx.client.users.profile().await?;
            if ctx.json {
                output::print_json(&user)
            } else {
                output::print_user(&user);
                Ok(())
            }
        }
        Command::Tasks { command } => tasks(ctx, command).await,
        Command::Users { command } => users(ctx, command).await,
    }
}

async fn login(ctx: &mut Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => prompt::prompt_line("Email", ctx.config.last_email.as_deref())?,
    };
    let password = prompt::prompt_password("Password")?;
    if email.is_empty() || password.is_empty() {
        bail!("Email and password required");
    }

    let credential = ctx.client.session.login(&email, &password).await?;

    ctx.config.last_email = Some(email);
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {} ({})", credential.user.name, credential.user.role);
    Ok(())
}

async fn tasks(ctx: &Context, command: TaskCommand) -> Result<()> {
    let service = &ctx.client.tasks;
    match command {
        TaskCommand::List => {
            let tasks = service.list().await?;
            if ctx.json {
                return output::print_json(&tasks);
            }
            output::print_tasks(&tasks);
        }
        TaskCommand::Show { id } => {
            let task = service.get(id).await?;
            if ctx.json {
                return output::print_json(&task);
            }
            output::print_task(&task);
        }
        TaskCommand::Create { title, description, status, due_date, file } => {
            let attachment = file.as_deref().map(Attachment::from_path).transpose()?;
            let task = service
                .create(NewTask { title, description, status, due_date, attachment })
                .await?;
            println!("Created task #{}", task.id);
        }
        TaskCommand::Update { id, title, description, status, due_date, file } => {
            let attachment = file.as_deref().map(Attachment::from_path).transpose()?;
            let task = service
                .update(id, TaskUpdate { title, description, status, due_date, attachment })
                .await?;
            println!("Updated task #{}", task.id);
        }
        TaskCommand::Delete { id } => {
            service.delete(id).await?;
            println!("Deleted task #{}", id);
        }
        TaskCommand::DeleteFile { id, file_id } => {
            service.delete_file(id, file_id).await?;
            println!("Removed file {} from task #{}", file_id, id);
        }
    }
    Ok(())
}

async fn users(ctx: &Context, command: UserCommand) -> Result<()> {
    let service = &ctx.client.users;
    match command {
        UserCommand::List => {
            let users = service.list().await?;
            if ctx.json {
                return output::print_json(&users);
            }
            output::print_users(&users);
        }
        UserCommand::Create { name, email, birth_date, role } => {
            let password = prompt::prompt_new_password()?;
            let registration = Registration { name, email, password, birth_date, role };
            match service.create(&registration).await? {
                Some(user) => println!("Created user #{} ({})", user.id, user.email),
                None => println!("Created user {}", registration.email),
            }
        }
        UserCommand::Update { id, name, email, birth_date, role, password } => {
            let password = if password {
                Some(prompt::prompt_new_password()?)
            } else {
                None
            };
            let update = UserUpdate { name, email, password, birth_date, role };
            service.update(id, &update).await?;
            println!("Updated user #{}", id);
        }
        UserCommand::Delete { id } => {
            service.delete(id).await?;
            println!("Deleted user #{}", id);
        }
    }
    Ok(())
}

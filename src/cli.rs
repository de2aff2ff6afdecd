//! Command-line surface and dispatch.

use clap::{Args, Parser, Subcommand};
use identityhub_api::form::ValidationPolicy;

use crate::bridge::FieldRow;
use crate::commands::App;
use crate::config::ConfigManager;
use crate::secrets::{SecretsManager, KEYRING_SERVICE};

#[derive(Parser, Debug)]
#[command(name = "identityhub", version, about = "Create Jira tickets for NHI findings through IdentityHub")]
pub struct Cli {
    /// IdentityHub backend URL (overrides the config file).
    #[arg(long, env = "IDENTITYHUB_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Authenticate with an API key instead of the stored session.
    #[arg(long, env = "IDENTITYHUB_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "IDENTITYHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "IDENTITYHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show or change persisted settings.
    Config {
        #[arg(long)]
        set_api_url: Option<String>,
        #[arg(long)]
        set_default_project: Option<String>,
    },
    #[command(subcommand)]
    Jira(JiraCommand),
    /// Manage API keys for programmatic ticket creation.
    #[command(subcommand)]
    Keys(KeysCommand),
}

#[derive(Subcommand, Debug)]
pub enum JiraCommand {
    /// Show whether a Jira workspace is connected.
    Status,
    /// Print the URL that authorizes IdentityHub in Jira.
    Connect,
    Disconnect,
    /// List projects of the connected workspace.
    Projects,
    /// List issue types, or the extra fields an issue type requires.
    Fields {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        issue_type: Option<String>,
    },
    /// Create an NHI finding ticket.
    Create(CreateArgs),
    /// List recently created tickets.
    Recent {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub issue_type: String,
    #[arg(long)]
    pub summary: String,
    #[arg(long)]
    pub description: String,
    /// Priority id or name; defaults to the issue type's first priority.
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long = "label")]
    pub labels: Vec<String>,
    /// Extra field as `key=value`; lists are comma separated, selects take an id or label.
    #[arg(long = "field", value_parser = parse_field_arg)]
    pub fields: Vec<(String, String)>,
    /// Wait until the new ticket shows up in the IdentityHub ticket list.
    #[arg(long)]
    pub wait: bool,
    /// Also reject required list fields left empty.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    List,
    /// Generate a key; the secret is printed once.
    Generate { name: String },
    Delete { id: String },
}

pub fn parse_field_arg(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field key in {:?}", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn execute(cli: Cli) -> Result<(), String> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load();

    if let Command::Config {
        set_api_url,
        set_default_project,
    } = &cli.command
    {
        if let Some(url) = set_api_url {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(project) = set_default_project {
            config.default_project = Some(project.trim().to_uppercase()).filter(|p| !p.is_empty());
        }
        if set_api_url.is_some() || set_default_project.is_some() {
            manager
                .save(&config)
                .map_err(|err| format!("Failed to save config: {err}"))?;
        }
        println!("Config file: {}", manager.path().display());
        println!("{}", serde_json::to_string_pretty(&config).map_err(|err| err.to_string())?);
        return Ok(());
    }

    let app = App::new(
        config,
        SecretsManager::new(KEYRING_SERVICE),
        cli.api_url,
        cli.api_key,
    )?;

    match cli.command {
        Command::Config { .. } => Ok(()),
        Command::Login { email, password } => {
            let user = app.login(&email, &password).await?;
            println!("Signed in as {}", user.display());
            Ok(())
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let user = app.signup(&name, &email, &password).await?;
            println!("Welcome, {}", user.display());
            Ok(())
        }
        Command::Logout => {
            app.logout().await?;
            println!("Signed out");
            Ok(())
        }
        Command::Jira(command) => run_jira(&app, command).await,
        Command::Keys(command) => run_keys(&app, command).await,
    }
}

async fn run_jira(app: &App, command: JiraCommand) -> Result<(), String> {
    match command {
        JiraCommand::Status => {
            match app.current_user() {
                Some(user) => println!("Signed in as {}", user.display()),
                None => println!("Not signed in to IdentityHub."),
            }
            let status = app.connection_status().await?;
            if status.is_connected {
                let since = status
                    .connected_at
                    .map(|at| format!(" since {}", at.format("%Y-%m-%d")))
                    .unwrap_or_default();
                let site = status.site_url.as_deref().unwrap_or("Jira");
                println!("Connected to {}{}", site, since);
            } else {
                println!("Not connected. Run `identityhub jira connect`.");
            }
            Ok(())
        }
        JiraCommand::Connect => {
            let start = app.connect().await?;
            println!("Open this URL to authorize IdentityHub in Jira:\n{}", start.auth_url);
            Ok(())
        }
        JiraCommand::Disconnect => {
            println!("{}", app.disconnect().await?);
            Ok(())
        }
        JiraCommand::Projects => {
            let projects = app.projects().await?;
            if projects.is_empty() {
                println!("No projects found in your Jira workspace.");
            }
            for project in projects {
                println!("{:<12} {}", project.key, project.name);
            }
            Ok(())
        }
        JiraCommand::Fields {
            project,
            issue_type,
        } => {
            let mut form = app.open_form(project.as_deref()).await?;
            let Some(issue_type) = issue_type else {
                for issue_type in form.issue_types() {
                    println!("{:<10} {}", issue_type.id, issue_type.name);
                }
                return Ok(());
            };
            form.select_issue_type(&issue_type)?;
            if form.fields().is_empty() {
                println!("No additional required fields.");
            }
            for row in form.fields().iter().map(FieldRow::from) {
                let marker = if row.supported { "" } else { "  [open in Jira]" };
                println!("{} ({}) - {}{}", row.name, row.key, row.kind, marker);
                for option in &row.options {
                    println!("    {}", option);
                }
            }
            if form.needs_jira() {
                println!("This issue type has required fields IdentityHub cannot fill in. Create it directly in Jira.");
            }
            Ok(())
        }
        JiraCommand::Create(args) => create(app, args).await,
        JiraCommand::Recent { project, limit } => {
            let rows = app.recent_tickets(project.as_deref(), limit).await?;
            if rows.is_empty() {
                println!("{}", empty_recent_message(project.as_deref()));
            }
            for row in rows {
                println!("{:<12} [{}] {}", row.key, row.status, row.summary);
                println!("             {}  {}", row.project, row.created);
                if let Some(url) = row.url {
                    println!("             {}", url);
                }
            }
            Ok(())
        }
    }
}

async fn create(app: &App, args: CreateArgs) -> Result<(), String> {
    let mut form = app.open_form(args.project.as_deref()).await?;
    if args.strict {
        form = form.with_policy(ValidationPolicy::strict());
    }
    form.select_issue_type(&args.issue_type)?;

    form.set_summary(args.summary);
    form.set_description(args.description);
    if let Some(priority) = args.priority.as_deref() {
        form.set_priority_input(priority)?;
    }
    for label in args.labels {
        form.add_label(label);
    }
    for (key, value) in &args.fields {
        form.set_field_input(key, value)?;
    }

    let created = app.create_ticket(&mut form, args.wait).await?;
    println!("Ticket {} created successfully!", created.key);
    if let Some(url) = created.url {
        println!("{}", url);
    }
    if created.indexed == Some(false) {
        println!("It may take a moment before the ticket appears in `identityhub jira recent`.");
    }
    Ok(())
}

async fn run_keys(app: &App, command: KeysCommand) -> Result<(), String> {
    match command {
        KeysCommand::List => {
            let rows = app.api_keys().await?;
            if rows.is_empty() {
                println!("No API keys yet.");
            }
            for row in rows {
                println!(
                    "{:<26} {:<20} created {:<20} last used {:<20} {}",
                    row.id,
                    row.name,
                    row.created,
                    row.last_used,
                    row.status_label()
                );
            }
            Ok(())
        }
        KeysCommand::Generate { name } => {
            let generated = app.generate_api_key(&name).await?;
            println!("API key generated successfully: {}", generated.name);
            println!("{}", generated.api_key);
            println!("This is the only time you'll be able to see this API key.");
            Ok(())
        }
        KeysCommand::Delete { id } => {
            app.delete_api_key(&id).await?;
            println!("API key deleted successfully");
            Ok(())
        }
    }
}

fn empty_recent_message(project: Option<&str>) -> String {
    match project {
        Some(key) => format!("No recent tickets in project {}.", key.trim().to_uppercase()),
        None => "No tickets created from IdentityHub yet.".to_string(),
    }
}

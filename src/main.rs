//! Snooze CLI
//!
//! Command-line interface for the story service:
//! - List all stories, favorites, or your own submissions
//! - Sign up, log in, log out
//! - Submit, edit, and delete stories
//! - Favorite and unfavorite stories

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snooze::client::{ApiError, Failure, StoryClient};
use snooze::config::{generate_default_config, Config, LoggingConfig};
use snooze::models::{NewStory, Story, StoryId};
use snooze::session::{AppError, AppState, FileCredentialStore};

#[derive(Parser)]
#[command(name = "snooze")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Share, edit, and favorite link stories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/snooze/config.toml or ./snooze.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Story service URL, overriding the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all stories, newest first
    Stories,

    /// List your favorite stories
    Favorites,

    /// List stories you submitted
    Mine,

    /// Create an account and log in
    Signup {
        username: String,
        /// Display name
        name: String,
        #[arg(long, env = "SNOOZE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in with an existing account
    Login {
        username: String,
        #[arg(long, env = "SNOOZE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Submit a new story
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        url: String,
    },

    /// Edit one of your stories
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },

    /// Delete one of your stories
    Delete { id: String },

    /// Add a story to your favorites
    Favorite { id: String },

    /// Remove a story from your favorites
    Unfavorite { id: String },

    /// Flip a story's favorite state
    Toggle { id: String },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::load_with_env(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        // Logging is configured by the file being loaded, so report
        // problems with it through a plain stderr subscriber
        None => {
            let bootstrap = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_max_level(tracing::Level::WARN)
                .finish();
            tracing::subscriber::with_default(bootstrap, Config::load_default)
        }
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("snooze={}", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let client = StoryClient::new(config.api.client_config())?;
    let session_path = config.session.path();
    tracing::debug!(api = %client.config().base_url, session = ?session_path, "Starting");

    let mut state = AppState::new(client, FileCredentialStore::new(session_path));
    let format = cli.format;

    match cli.command {
        Commands::Stories => {
            state.start().await?;
            print_stories(&state, &state.all_stories(), format)?;
        }

        Commands::Favorites => {
            require_session(&mut state).await?;
            print_stories(&state, &state.favorites(), format)?;
        }

        Commands::Mine => {
            require_session(&mut state).await?;
            print_stories(&state, &state.own_stories(), format)?;
        }

        Commands::Signup {
            username,
            name,
            password,
        } => {
            let user = state.signup(&username, &password, &name).await?;
            println!("Signed up and logged in as {} ({})", user.username, user.name);
        }

        Commands::Login { username, password } => {
            let user = state.login(&username, &password).await?;
            println!("Logged in as {} ({})", user.username, user.name);
        }

        Commands::Logout => {
            state.logout()?;
            println!("Logged out");
        }

        Commands::Whoami => {
            state.restore_session().await;
            match state.current_user() {
                Some(user) => {
                    println!("{} ({})", user.username, user.name);
                    println!("Member since {}", user.created_at.format("%Y-%m-%d"));
                    println!(
                        "{} stories, {} favorites",
                        state.own_stories().len(),
                        state.favorites().len()
                    );
                }
                None => println!("Not logged in"),
            }
        }

        Commands::Submit { title, author, url } => {
            require_session(&mut state).await?;
            let story = state.add_story(NewStory::new(title, author, url)).await?;
            println!("Submitted:");
            print_stories(&state, &[&story], format)?;
        }

        Commands::Edit {
            id,
            title,
            author,
            url,
        } => {
            require_session(&mut state).await?;
            let id = StoryId::from(id);
            let current = state
                .story(&id)
                .ok_or_else(|| AppError::UnknownStory(id.clone()))?;

            let mut fields = current.fields();
            if let Some(title) = title {
                fields = fields.title(title);
            }
            if let Some(author) = author {
                fields = fields.author(author);
            }
            if let Some(url) = url {
                fields = fields.url(url);
            }

            let story = state.update_story(&id, fields).await?;
            println!("Updated:");
            print_stories(&state, &[&story], format)?;
        }

        Commands::Delete { id } => {
            require_session(&mut state).await?;
            let id = StoryId::from(id);
            state.delete_story(&id).await?;
            println!("Deleted story {}", id);
        }

        Commands::Favorite { id } => {
            require_session(&mut state).await?;
            let id = StoryId::from(id);
            state.add_favorite(&id).await?;
            println!("Added {} to favorites ({} total)", id, state.favorites().len());
        }

        Commands::Unfavorite { id } => {
            require_session(&mut state).await?;
            let id = StoryId::from(id);
            state.remove_favorite(&id).await?;
            println!("Removed {} from favorites ({} total)", id, state.favorites().len());
        }

        Commands::Toggle { id } => {
            require_session(&mut state).await?;
            let id = StoryId::from(id);
            if state.toggle_favorite(&id).await? {
                println!("Favorited {}", id);
            } else {
                println!("Unfavorited {}", id);
            }
        }

        Commands::Config { output } => write_default_config(output.as_deref())?,
    }

    Ok(())
}

async fn require_session(state: &mut AppState) -> Result<(), AppError> {
    match state.restore_session().await {
        Some(_) => Ok(()),
        None => Err(AppError::NotAuthenticated),
    }
}

fn write_default_config(output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {:?}", parent))?;
            }
            std::fs::write(path, &config).with_context(|| format!("writing {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", config),
    }

    Ok(())
}

fn print_stories(state: &AppState, stories: &[&Story], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(stories)?);
        return Ok(());
    }

    if stories.is_empty() {
        println!("No stories available!");
        return Ok(());
    }

    let logged_in = state.is_authenticated();
    for story in stories {
        let star = match (logged_in, state.is_favorite(&story.story_id)) {
            (false, _) => "   ",
            (true, true) => "[*]",
            (true, false) => "[ ]",
        };
        let mine = if state.is_own(&story.story_id) { " (yours)" } else { "" };
        let host = story
            .host_name()
            .unwrap_or_else(|_| "invalid url".to_string());

        println!("{} {} ({})", star, story.title, host);
        println!(
            "    by {}, posted by {}{} on {}",
            story.author,
            story.username,
            mine,
            story.created_at.format("%Y-%m-%d")
        );
        println!("    id: {}", story.story_id);
    }

    Ok(())
}

fn report(err: &anyhow::Error) {
    let failure = err
        .downcast_ref::<AppError>()
        .and_then(AppError::failure)
        .or_else(|| err.downcast_ref::<ApiError>().map(ApiError::failure));

    match (failure, err.downcast_ref::<AppError>()) {
        (
            Some(Failure::ServerResponded),
            Some(AppError::Api(ApiError::Response {
                status,
                title,
                message,
            })),
        ) => {
            eprintln!("status: {}\n{}\n{}", status, title, message);
        }
        (Some(Failure::NoResponse), _) => {
            eprintln!("{:#}", err);
            eprintln!("Check your connection or the --api-url setting.");
        }
        _ => eprintln!("Error: {:#}", err),
    }
}

use clap::{CommandFactory, Parser, Subcommand};
use protocolo7d_core::FlowError;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "protocolo7d", version, about = "Protocolo 7D CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an email address
    Login {
        email: String,
    },
    /// Tell the program which habit you want to break
    Onboard {
        /// Target behavior, e.g. "redes sociais"
        #[arg(required = true, num_args = 1..)]
        target: Vec<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in and where the app would start
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Points, clean time, badges and the seven steps
    Dashboard {
        #[arg(long)]
        json: bool,
        /// Keep refreshing the clean-time counter until Ctrl-C
        #[arg(long, conflicts_with = "json")]
        watch: bool,
    },
    /// Step detail and completion
    Step {
        #[command(subcommand)]
        action: commands::step::StepAction,
    },
    /// Open the full protocol eBook
    Unlock,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Login { email } => commands::session::login(&email).await,
        Commands::Onboard { target } => commands::session::onboard(&target.join(" ")).await,
        Commands::Logout => commands::session::logout(),
        Commands::Status { json } => commands::session::status(json),
        Commands::Dashboard { json, watch } => commands::dashboard::run(json, watch).await,
        Commands::Step { action } => commands::step::run(action).await,
        Commands::Unlock => commands::step::unlock(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "protocolo7d", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        match e.downcast_ref::<FlowError>() {
            Some(flow) => {
                tracing::debug!(error = %flow, "command failed");
                let dialog = flow.user_message();
                eprintln!("{}: {}", dialog.title, dialog.body);
            }
            None => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}

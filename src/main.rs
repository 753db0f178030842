use std::path::PathBuf;

use clap::{Parser, Subcommand};

use interactive_feedback::config::{self, Config};
use interactive_feedback::{
    logging, serve_stdio, FeedbackBroker, FeedbackRequest, FeedbackServer, PredefinedOptions,
};

#[derive(Parser)]
#[command(name = "interactive-feedback-mcp", version, about = "Ask a human for feedback from an MCP agent")]
struct Cli {
    /// Config file. Default: ~/.config/interactive-feedback/config.yml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Prompt program to launch instead of the bundled feedback-prompt.
    #[arg(long, global = true)]
    prompt_command: Option<PathBuf>,

    /// Leading argument for the prompt program (repeatable).
    #[arg(long = "prompt-arg", global = true, allow_hyphen_values = true)]
    prompt_args: Vec<String>,

    /// Directory for handoff files. Default: the system temp dir.
    #[arg(long, global = true)]
    handoff_dir: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset, e.g. "debug".
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server on stdin/stdout (default).
    Serve,
    /// Ask one question directly and print the answer as JSON.
    Ask {
        /// The question for the user.
        message: String,
        /// A predefined option (repeatable).
        #[arg(long = "option")]
        options: Vec<String>,
    },
    /// Print the resolved configuration.
    Config,
}

impl Cli {
    fn resolve_config(&self) -> interactive_feedback::Result<Config> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(config::global_config_path);
        let mut config = Config::load_from(&path)?;

        if let Some(cmd) = &self.prompt_command {
            config.prompt.command = Some(cmd.clone());
            config.prompt.args.clear();
        }
        if !self.prompt_args.is_empty() {
            config.prompt.args = self.prompt_args.clone();
        }
        if let Some(dir) = &self.handoff_dir {
            config.handoff_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    logging::init(&config.log_level);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let broker = FeedbackBroker::from_config(&config);
            tracing::info!(
                prompt = %broker.prompt().program.display(),
                "starting interactive feedback MCP server"
            );
            let server = FeedbackServer::new(broker);
            serve_stdio(server).await?;
        }
        Command::Ask { message, options } => {
            let options = if options.is_empty() {
                PredefinedOptions::None
            } else {
                PredefinedOptions::List(options)
            };
            let request = FeedbackRequest::new(message, options);
            let broker = FeedbackBroker::from_config(&config);

            let outcome =
                tokio::task::spawn_blocking(move || broker.request_feedback(&request)).await?;
            match outcome {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(e) => {
                    eprintln!("interactive-feedback-mcp: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}

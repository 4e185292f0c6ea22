/// Soul Queue - rolling-window playback queue
use clap::Parser;
use soul_queue_cli::{App, Cli, CliConfig, Commands};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays scriptable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soul_queue=info,soul_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let app = App::open(&config).await?;

    match cli.command {
        Commands::Queue(command) => {
            if let Some(message) = app.restore().await? {
                tracing::info!("{}", message);
            }
            println!("{}", app.run(command).await?);
        }
        Commands::Shell => {
            if let Some(message) = app.restore().await? {
                println!("{}", message);
            }
            app.run_shell(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await?;
        }
        Commands::Import { path } => {
            let imported = app.import(&path).await?;
            println!("Imported {} tracks", imported);
        }
        Commands::Playlist(command) => println!("{}", app.playlist(command).await?),
        Commands::Smart(command) => println!("{}", app.smart(command).await?),
        Commands::Builder(command) => println!("{}", app.builder(command).await?),
    }

    Ok(())
}

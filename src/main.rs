use clap::{Parser, Subcommand};
use imageinator::{
    logger::{self, LoggerConfig},
    Config, GenerationOptions, GenerationResult, ImageQuality, ImageSize, ImageStyle,
    Imageinator, Provider, RequestState,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "imageinator", version, about = "Tracey's Image-inator")]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an image from a text prompt
    Generate {
        prompt: String,
        #[arg(long, default_value = "1024x1024")]
        size: ImageSize,
        #[arg(long, default_value = "vivid")]
        style: ImageStyle,
        #[arg(long, default_value = "standard")]
        quality: ImageQuality,
        /// Overrides IMAGEINATOR_PROVIDER
        #[arg(long)]
        provider: Option<Provider>,
    },
    /// Show past generations, newest first
    History,
    /// Download an image and save it as <title>-<timestamp>.png
    Export {
        url: String,
        #[arg(long, default_value = "image")]
        title: String,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LoggerConfig::development().apply_env()
    } else {
        LoggerConfig::from_env()
    };
    if let Err(e) = logger::init_with_config(log_config) {
        eprintln!("{}", e);
    }

    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> imageinator::Result<ExitCode> {
    let mut config = Config::from_env();
    if let Commands::Generate {
        provider: Some(provider),
        ..
    } = &command
    {
        config = config.with_provider(*provider);
    }
    if let Commands::Export { dir: Some(dir), .. } = &command {
        config = config.with_export_dir(dir.clone());
    }
    logger::log_config_info(&config);

    let app = Imageinator::new(config).await?;

    match command {
        Commands::Generate {
            prompt,
            size,
            style,
            quality,
            ..
        } => {
            let options = GenerationOptions::new()
                .with_size(size)
                .with_style(style)
                .with_quality(quality);

            match app.submit(&prompt, options).await? {
                RequestState::Success(images) => {
                    if images.is_empty() {
                        println!("The worker returned no images.");
                    }
                    for (provider, url) in images.urls() {
                        println!("{}: {}", provider.display_name(), url);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                RequestState::Failure(message) => {
                    eprintln!("{}", message);
                    Ok(ExitCode::FAILURE)
                }
                RequestState::Idle | RequestState::Loading => Ok(ExitCode::FAILURE),
            }
        }
        Commands::History => {
            let history = app.history().await;
            if history.is_empty() {
                println!("No generations yet.");
            }
            for entry in &history {
                print_entry(entry);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Export { url, title, .. } => {
            let path = app.export(&url, &title).await?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_entry(entry: &GenerationResult) {
    println!(
        "{}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.prompt
    );
    for (provider, url) in entry.images().urls() {
        println!("    {}: {}", provider, url);
    }
}

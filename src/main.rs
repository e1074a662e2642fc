use clap::{Args, Parser, Subcommand};
use promptmint::{
    logger::{self, LogLevel, LoggerConfig},
    Config, Generation, MintSession, UploadOutcome, UploadReport, DEFAULT_IMAGE_SIZE,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "promptmint", version)]
#[command(about = "Generate an image from a prompt and upload it, plus optional audio, to IPFS")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FormArgs {
    /// Description of the image
    #[arg(long, default_value = "")]
    prompt: String,

    /// Number of images to request; only the first is used
    #[arg(long, default_value = "1")]
    count: String,

    /// Image size, e.g. 256x256, 512x512 or 1024x1024
    #[arg(long, default_value = DEFAULT_IMAGE_SIZE)]
    size: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an image and print its preview URL
    Generate(FormArgs),
    /// Upload an existing image URL and/or a local audio file
    Upload {
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        audio: Option<PathBuf>,
    },
    /// Generate, then upload the result together with the audio file
    Run {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long)]
        audio: Option<PathBuf>,
    },
    /// Check that the IPFS gateway answers
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut logger_config = LoggerConfig::new().with_level(cli.log_level);
    if let Some(path) = &cli.log_file {
        logger_config = logger_config.with_file_output(path);
    }
    if let Err(e) = logger::init_with_config(logger_config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    match run(cli.command, cli.json, &config).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, json: bool, config: &Config) -> promptmint::Result<ExitCode> {
    let session = MintSession::from_config(config)?;

    match command {
        Command::Generate(form) => {
            fill_form(&session, form).await;
            generate(&session, json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Upload { image_url, audio } => {
            if let Some(url) = image_url {
                session.set_image_url(url).await;
            }
            if let Some(path) = audio {
                session.select_audio(path).await?;
            }
            upload(&session, json).await
        }
        Command::Run { form, audio } => {
            fill_form(&session, form).await;
            if let Some(path) = audio {
                session.select_audio(path).await?;
            }
            if !generate(&session, json).await? {
                log::warn!("Generation was superseded by a reset, nothing to upload");
                return Ok(ExitCode::FAILURE);
            }
            upload(&session, json).await
        }
        Command::Health => {
            let healthy = session.health_check().await?;
            if json {
                println!("{}", serde_json::json!({ "ipfs": healthy }));
            } else {
                println!("ipfs gateway: {}", if healthy { "ok" } else { "unhealthy" });
            }
            Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

async fn fill_form(session: &MintSession, form: FormArgs) {
    session.set_prompt(form.prompt).await;
    session.set_count(form.count).await;
    session.set_size(form.size).await;
}

async fn generate(session: &MintSession, json: bool) -> promptmint::Result<bool> {
    match session.generate().await? {
        Generation::Applied(url) => {
            if json {
                println!("{}", serde_json::json!({ "image_url": url }));
            } else {
                println!("preview: {}", url);
            }
            Ok(true)
        }
        Generation::Superseded => Ok(false),
    }
}

async fn upload(session: &MintSession, json: bool) -> promptmint::Result<ExitCode> {
    let report = session.upload().await?;
    print_report(&report, json)?;
    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &UploadReport, json: bool) -> promptmint::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for (kind, outcome) in [("image", &report.image), ("audio", &report.audio)] {
        match outcome {
            UploadOutcome::Stored { hash } => println!("{}: {}", kind, hash),
            UploadOutcome::Skipped => println!("{}: skipped", kind),
            UploadOutcome::Failed { error } => println!("{}: failed ({})", kind, error),
        }
    }
    Ok(())
}

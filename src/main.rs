//! Deskroute console entry point
//!
//! Reads support requests line by line and prints the pipeline's reply for
//! each one. The flow itself never fails outward, so the loop only ends on
//! EOF or the exit keyword.

use clap::Parser;
use deskroute::agent::OpenAiChatRunner;
use deskroute::cli::{Cli, Command};
use deskroute::config::Config;
use deskroute::flow::{FlowOrchestrator, RequestContext};
use deskroute::telemetry;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const EXIT_KEYWORD: &str = "exit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = deskroute::cli::generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                println!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = Config::from_file(&cli.config)?;
    telemetry::init(&config.observability.log_level);

    let runner = Arc::new(OpenAiChatRunner::new(&config.provider)?);
    let flow = FlowOrchestrator::new(&config, runner);

    tracing::info!(
        model = %config.provider.model,
        base_url = %config.provider.base_url,
        "Deskroute support flow ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"Your name: ").await?;
    stdout.flush().await?;
    let name = lines.next_line().await?.unwrap_or_default().trim().to_string();

    stdout.write_all(b"Premium plan? [y/N]: ").await?;
    stdout.flush().await?;
    let premium_answer = lines.next_line().await?.unwrap_or_default();
    let is_premium = matches!(premium_answer.trim().to_lowercase().as_str(), "y" | "yes");

    let context = RequestContext::new(name, is_premium);

    println!("Describe your issue (type '{}' to quit).", EXIT_KEYWORD);
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        if request.eq_ignore_ascii_case(EXIT_KEYWORD) {
            break;
        }

        let reply = flow.run_support_flow(request, &context).await;
        println!("{}\n", reply);
    }

    Ok(())
}

// Runs the symptom checker in-process and chats over stdin.
//
// The engine owns no storage here: the loop keeps the session and replaces it
// with the one returned by each turn. Pass --remote to fetch matches, follow-ups
// and predictions from a running symptom-service instead of the built-in data.
use clap::{Parser, ValueEnum};
use demos::render;
use std::path::PathBuf;
use std::sync::Arc;
use symptom_flow::{
    ConversationEngine, EngineConfig, HttpBackend, LocalBackend, ReferenceData, SymptomBackend,
    TurnStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Asks for a name, picks the best match automatically
    Guided,
    /// Numbered symptom selection, bounded day count
    Clinic,
}

#[derive(Parser, Debug)]
#[command(name = "local_chat", about = "Chat with the symptom checker in your terminal")]
struct Args {
    #[arg(short, long, value_enum, default_value = "guided")]
    preset: Preset,

    /// Seed for reproducible follow-ups and predictions
    #[arg(long)]
    seed: Option<u64>,

    /// YAML file replacing the built-in symptoms and diseases
    #[arg(long, value_name = "PATH")]
    reference: Option<PathBuf>,

    /// Base URL of a symptom-service to use as the knowledge backend
    #[arg(long, value_name = "URL", conflicts_with_all = ["seed", "reference"])]
    remote: Option<String>,
}

fn backend(args: &Args, config: &EngineConfig) -> anyhow::Result<Arc<dyn SymptomBackend>> {
    if let Some(url) = &args.remote {
        return Ok(Arc::new(HttpBackend::new(url.as_str())?));
    }

    let reference = match &args.reference {
        Some(path) => ReferenceData::load(path)?,
        None => ReferenceData::builtin()?,
    };
    let reference = Arc::new(reference);
    let local = match args.seed {
        Some(seed) => LocalBackend::seeded(reference, config, seed),
        None => LocalBackend::from_entropy(reference, config),
    };
    Ok(Arc::new(local))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();
    let config = match args.preset {
        Preset::Guided => EngineConfig::guided(),
        Preset::Clinic => EngineConfig::clinic(),
    };
    let engine = ConversationEngine::new(backend(&args, &config)?, config);

    println!("Type 'restart' to start over, 'quit' to exit.\n");
    let (mut session, welcome) = engine.start_new();
    render(&welcome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "quit" | "exit" => break,
            "restart" => {
                let (fresh, welcome) = engine.reset(&session);
                session = fresh;
                render(&welcome);
                continue;
            }
            _ => {}
        }

        match engine.advance(&session, input).await {
            Ok(turn) => {
                render(&turn.messages);
                if turn.status() == TurnStatus::Completed {
                    println!("\n(conversation complete, type 'restart' to go again)");
                }
                session = turn.session;
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                println!(
                    "Bot: Sorry, there was an error processing your message. Please try again."
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_rejects_local_data_options() {
        let with_seed = ["local_chat", "--remote", "http://localhost:3000", "--seed", "7"];
        assert!(Args::try_parse_from(with_seed).is_err());

        let with_reference = [
            "local_chat",
            "--remote",
            "http://localhost:3000",
            "--reference",
            "data.yaml",
        ];
        assert!(Args::try_parse_from(with_reference).is_err());
    }

    #[test]
    fn local_options_combine() {
        let args =
            Args::try_parse_from(["local_chat", "--preset", "clinic", "--seed", "7"]).unwrap();
        assert!(matches!(args.preset, Preset::Clinic));
        assert_eq!(args.seed, Some(7));
        assert!(args.remote.is_none());
    }
}

//! Generate symptom-intent training data and load it into a Dialogflow agent.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use triage_webhook_lib::training::{
    generate_rows, group_intents, read_rows, write_rows, DialogflowClient, TrainingError,
    DEFAULT_DIALOGFLOW_BASE_URL, DEFAULT_PHRASES_PER_INTENT,
};

#[derive(Parser)]
#[command(name = "intent-trainer")]
#[command(about = "Symptom intent training data tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write generated training phrases for the built-in symptom intents
    Generate {
        /// Output CSV path
        #[arg(long, short, default_value = "symptom_intents.csv")]
        output: PathBuf,

        /// Phrases generated per intent
        #[arg(long, default_value_t = DEFAULT_PHRASES_PER_INTENT)]
        per_intent: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Create one agent intent per distinct intent name in a training CSV
    Upload {
        /// Training CSV with intent,phrase,response columns
        #[arg(long, short, default_value = "symptom_intents.csv")]
        input: PathBuf,

        /// Agent project; required unless --dry-run
        #[arg(long, env = "DIALOGFLOW_PROJECT_ID")]
        project_id: Option<String>,

        /// OAuth access token; required unless --dry-run
        #[arg(long, env = "DIALOGFLOW_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        #[arg(long, default_value = DEFAULT_DIALOGFLOW_BASE_URL)]
        base_url: String,

        /// Print what would be created without calling the API
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    triage_webhook_lib::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate {
            output,
            per_intent,
            seed,
        } => generate(output, per_intent, seed),
        Command::Upload {
            input,
            project_id,
            access_token,
            base_url,
            dry_run,
        } => upload(input, project_id, access_token, &base_url, dry_run).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn generate(output: PathBuf, per_intent: usize, seed: Option<u64>) -> Result<(), TrainingError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let rows = generate_rows(&mut rng, per_intent);
    write_rows(BufWriter::new(File::create(&output)?), &rows)?;
    println!("Generated {} phrases in {}", rows.len(), output.display());
    Ok(())
}

async fn upload(
    input: PathBuf,
    project_id: Option<String>,
    access_token: Option<String>,
    base_url: &str,
    dry_run: bool,
) -> Result<(), TrainingError> {
    let intents = group_intents(read_rows(File::open(&input)?)?);
    tracing::info!(intents = intents.len(), input = %input.display(), "Training file loaded");

    if dry_run {
        for intent in &intents {
            println!(
                "Would create intent: {} ({} phrases, {} responses)",
                intent.display_name,
                intent.phrases.len(),
                intent.responses.len()
            );
        }
        return Ok(());
    }

    let (project_id, access_token) = upload_credentials(project_id, access_token)?;
    let client = DialogflowClient::new(base_url, &project_id, &access_token)?;
    let created = client
        .create_all(&intents, |intent| {
            println!("Created intent: {}", intent.display_name)
        })
        .await?;
    println!("Uploaded {created} intents to project {project_id}");
    Ok(())
}

/// Project id and token for a real upload; blank values count as missing.
fn upload_credentials(
    project_id: Option<String>,
    access_token: Option<String>,
) -> Result<(String, String), TrainingError> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let project_id = present(project_id).ok_or(TrainingError::MissingProjectId)?;
    let access_token = present(access_token).ok_or(TrainingError::MissingAccessToken)?;
    Ok((project_id, access_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_needs_no_credentials() {
        let cli = Cli::try_parse_from(["intent-trainer", "upload", "--dry-run"]).unwrap();
        match cli.command {
            Command::Upload { dry_run, .. } => assert!(dry_run),
            Command::Generate { .. } => panic!("expected upload"),
        }
    }

    #[test]
    fn missing_token_has_its_own_error() {
        let err = upload_credentials(Some("demo".into()), None).unwrap_err();
        assert!(matches!(err, TrainingError::MissingAccessToken));
        assert!(err.to_string().contains("access token is required"));
    }

    #[test]
    fn missing_project_is_reported_first() {
        let err = upload_credentials(Some("  ".into()), None).unwrap_err();
        assert!(matches!(err, TrainingError::MissingProjectId));
    }

    #[test]
    fn credentials_pass_through() {
        let (project, token) =
            upload_credentials(Some("demo".into()), Some("ya29.t".into())).unwrap();
        assert_eq!((project.as_str(), token.as_str()), ("demo", "ya29.t"));
    }

    #[tokio::test]
    async fn upload_without_token_fails_before_any_request() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("intents.csv");
        std::fs::write(&input, "intent,phrase,response\nFever,I have fever,Rest.\n").unwrap();

        let err = upload(input, Some("demo".into()), None, "http://127.0.0.1:9", false)
            .await
            .unwrap_err();
        assert!(matches!(err, TrainingError::MissingAccessToken));
    }
}

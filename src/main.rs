use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use prdflow::io::{
    CREATED_FILE, ISSUES_FILE, PRD_FILE, TASKS_FILE, TRANSCRIPT_FILE, format_drafts,
    format_report, format_task_list, write_created, write_drafts, write_tasks, write_text,
};
use prdflow::{
    AcceptAll, AppConfig, DialoguerInteraction, GitHubClient, Interaction, IssueDraft,
    OpenAiClient, RunDir, Task, approve_tasks, compose_and_file, execute_stage0, execute_stage1,
    execute_stage2, execute_stage3, file_approved, load_drafts, load_tasks, plan_issue_requests,
    read_text, select_all,
};

#[derive(Parser)]
#[command(name = "prdflow")]
#[command(author, version, about = "Meeting recording to PRD to GitHub issues", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chat model (overrides OPENAI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Directory for intermediate files
    #[arg(long, global = true, default_value = "prdflow-out")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe a meeting recording
    Transcribe {
        /// Audio file (mp3, wav, m4a, ...)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write a PRD from a transcript
    Prd {
        /// Transcript text file
        #[arg(short, long)]
        transcript: PathBuf,
    },

    /// Extract a task list from a PRD
    Extract {
        /// PRD Markdown file
        #[arg(short, long)]
        prd: PathBuf,
    },

    /// Select tasks, compose issues and file them on GitHub
    Issues {
        /// Task list written by `extract`
        #[arg(long)]
        tasks: PathBuf,

        /// Transcript to take excerpts from
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Target repository as owner/name (overrides the environment)
        #[arg(long)]
        repo: Option<String>,

        /// Select everything and skip confirmations
        #[arg(short, long)]
        yes: bool,
    },

    /// File drafts saved by an earlier `issues` or `run`
    File {
        /// Drafts written by `issues`
        #[arg(long)]
        issues: PathBuf,

        /// Target repository as owner/name (overrides the environment)
        #[arg(long)]
        repo: Option<String>,

        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the whole pipeline from a recording or transcript
    Run {
        /// Audio file, or a .txt/.md transcript
        #[arg(short, long)]
        input: PathBuf,

        /// Target repository as owner/name (overrides the environment)
        #[arg(long)]
        repo: Option<String>,

        /// Select everything and skip confirmations
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env()?;
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    let run = RunDir::create(&cli.out_dir)?;

    match cli.command {
        Commands::Transcribe { input } => {
            transcribe(&config, &run, &input).await?;
            Ok(())
        }
        Commands::Prd { transcript } => {
            let transcript = read_text(&transcript)?;
            create_prd(&config, &run, &transcript).await?;
            Ok(())
        }
        Commands::Extract { prd } => {
            let prd = read_text(&prd)?;
            extract(&config, &run, &prd).await?;
            Ok(())
        }
        Commands::Issues {
            tasks,
            transcript,
            repo,
            yes,
        } => {
            let config = apply_repo(config, repo.as_deref())?;
            let extraction = load_tasks(&tasks)?;
            let transcript = transcript.as_deref().map(read_text).transpose()?;
            let mut interaction = interaction_for(yes);
            issues(
                &config,
                &run,
                extraction.tasks,
                transcript.as_deref(),
                interaction.as_mut(),
                yes,
            )
            .await
        }
        Commands::File { issues, repo, yes } => {
            let config = apply_repo(config, repo.as_deref())?;
            let drafts = load_drafts(&issues)?;
            let mut interaction = interaction_for(yes);
            file(&config, &run, &drafts, interaction.as_mut()).await
        }
        Commands::Run { input, repo, yes } => {
            let config = apply_repo(config, repo.as_deref())?;
            config.tracker()?;
            let mut interaction = interaction_for(yes);

            let transcript = transcribe(&config, &run, &input).await?;
            let prd = create_prd(&config, &run, &transcript).await?;
            let tasks = extract(&config, &run, &prd).await?;

            if !approve_tasks(interaction.as_mut(), &tasks)? {
                println!("Process terminated by user.");
                return Ok(());
            }

            issues(
                &config,
                &run,
                tasks,
                Some(transcript.as_str()),
                interaction.as_mut(),
                yes,
            )
            .await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn interaction_for(yes: bool) -> Box<dyn Interaction> {
    if yes {
        Box::new(AcceptAll)
    } else {
        Box::new(DialoguerInteraction::new())
    }
}

fn apply_repo(config: AppConfig, repo: Option<&str>) -> Result<AppConfig> {
    match repo {
        Some(slug) => config.with_repo(slug),
        None => Ok(config),
    }
}

async fn transcribe(config: &AppConfig, run: &RunDir, input: &std::path::Path) -> Result<String> {
    info!("Stage 0: transcribing {:?}", input);
    let client = OpenAiClient::new(config.llm.clone());
    let result = execute_stage0(&client, input, &config.audio).await?;

    let path = run.file(TRANSCRIPT_FILE);
    write_text(&path, &result.transcript)?;
    info!(
        "Transcript ({} chunk(s)) written to {:?}",
        result.chunks_transcribed, path
    );

    Ok(result.transcript)
}

async fn create_prd(config: &AppConfig, run: &RunDir, transcript: &str) -> Result<String> {
    let client = OpenAiClient::new(config.llm.clone());
    let prd = execute_stage1(&client, transcript)
        .await
        .context("PRD creation failed")?;

    let path = run.file(PRD_FILE);
    write_text(&path, &prd)?;
    info!("PRD written to {:?}", path);

    Ok(prd)
}

async fn extract(config: &AppConfig, run: &RunDir, prd: &str) -> Result<Vec<Task>> {
    let client = OpenAiClient::new(config.llm.clone());
    let extraction = execute_stage2(&client, prd)
        .await
        .context("Task extraction failed")?;

    let path = run.file(TASKS_FILE);
    write_tasks(&path, &extraction.tasks)?;
    info!("Task list written to {:?}", path);

    println!("Extracted Tasks:");
    println!("{}", format_task_list(&extraction.tasks));

    Ok(extraction.tasks)
}

async fn issues(
    config: &AppConfig,
    run: &RunDir,
    mut tasks: Vec<Task>,
    transcript: Option<&str>,
    interaction: &mut dyn Interaction,
    yes: bool,
) -> Result<()> {
    let tracker = GitHubClient::new(config.tracker()?.clone())?;

    if yes {
        select_all(&mut tasks);
    } else {
        execute_stage3(interaction, &mut tasks, transcript, &config.selection)?;
    }

    let requests = plan_issue_requests(&tasks);
    if requests.is_empty() {
        println!("Nothing selected.");
        return Ok(());
    }

    let client = OpenAiClient::new(config.llm.clone());
    let slug = tracker.config().slug();
    let outcome = compose_and_file(&client, &tracker, interaction, &requests, |drafts| {
        write_drafts(&run.file(ISSUES_FILE), drafts)?;
        println!("Generated Issues (for {slug}):");
        println!("{}", format_drafts(drafts));
        Ok(())
    })
    .await?;

    if outcome.drafts.is_empty() {
        warn!("No issue could be composed");
    } else if !outcome.approved {
        println!("Process terminated by user.");
        return Ok(());
    }

    write_created(&run.file(CREATED_FILE), &outcome.created)?;
    println!("Created GitHub Issues:");
    println!("{}", format_report(&outcome.created, &outcome.failures));

    Ok(())
}

async fn file(
    config: &AppConfig,
    run: &RunDir,
    drafts: &[IssueDraft],
    interaction: &mut dyn Interaction,
) -> Result<()> {
    let tracker = GitHubClient::new(config.tracker()?.clone())?;

    println!("Saved Issues (for {}):", tracker.config().slug());
    println!("{}", format_drafts(drafts));

    let Some(filed) = file_approved(&tracker, interaction, drafts).await? else {
        println!("Nothing filed.");
        return Ok(());
    };

    write_created(&run.file(CREATED_FILE), &filed.created)?;
    println!("Created GitHub Issues:");
    println!("{}", format_report(&filed.created, &filed.failures));

    Ok(())
}

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use repo_rag::render::{self, ResultList};
use repo_rag::{telemetry, Applied, AppController, ClientConfig, HttpBackend, WorkflowState};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "repo-rag")]
#[command(about = "Index a GitHub repository and ask questions about its code")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides REPO_RAG_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Evidence chunks per question; 1-20 is the useful range
    #[arg(long, global = true, allow_negative_numbers = true)]
    top_k: Option<i64>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Shell,
    /// Index a repository, ask each question once, print the answers
    Ask {
        /// Repository URL, e.g. https://github.com/owner/repo
        #[arg(short, long)]
        repo: String,

        /// Question to ask; repeat for several
        #[arg(short, long = "question")]
        questions: Vec<String>,

        /// Print the session as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

enum Flow {
    Continue,
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let config = ClientConfig::from_env()
        .and_then(|cfg| cfg.with_overrides(cli.api_base.clone(), cli.top_k))
        .context("Invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let backend = Arc::new(HttpBackend::new(&config));
    let ctl = AppController::new(backend, config.top_k);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => run_shell(ctl, config.clamp_lines).await,
        Commands::Ask {
            repo,
            questions,
            json,
        } => run_batch(ctl, &repo, &questions, json, config.clamp_lines).await,
    }
}

async fn run_batch(
    mut ctl: AppController,
    repo: &str,
    questions: &[String],
    json: bool,
    clamp_lines: usize,
) -> Result<()> {
    ctl.index_form_mut().set_input(repo);
    if !ctl.submit_index_form() {
        bail!("Repository URL must not be empty");
    }
    eprintln!("{}", "Cloning and embedding...".bright_black());
    ctl.settle().await;

    let Some(info) = ctl.index_info() else {
        bail!("{}", ctl.error().unwrap_or("Indexing failed."));
    };
    if !json {
        println!("{}", render::index_info(info));
    }

    for question in questions {
        ctl.query_form_mut().set_question(question.as_str());
        if !ctl.submit_query_form() {
            eprintln!("{}", format!("Skipping blank question {question:?}").yellow());
            continue;
        }
        ctl.settle().await;
        if let Some(err) = render::error_line(ctl.error()) {
            eprintln!("{err}");
        }
    }

    if json {
        let report = render::json_report(ctl.index_info(), ctl.history(), ctl.error())
            .context("Failed to serialize session")?;
        println!("{report}");
    } else if !ctl.history().is_empty() {
        let mut list = ResultList::new();
        list.sync(ctl.history());
        println!("\n{}", list.render(ctl.history(), clamp_lines));
    }
    Ok(())
}

async fn run_shell(mut ctl: AppController, clamp_lines: usize) -> Result<()> {
    let mut list = ResultList::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", "REPO RAG".bright_cyan().bold());
    print_help();
    println!("{}", render::header(&ctl));
    prompt(&ctl)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if let Flow::Quit = handle_line(&mut ctl, &mut list, &line, clamp_lines) {
                    break;
                }
            }
            Some(completion) = ctl.next_completion() => {
                let applied = ctl.apply(completion);
                println!();
                announce(&ctl, &mut list, applied, clamp_lines);
            }
        }
        prompt(&ctl)?;
    }

    if ctl.state().in_flight() {
        eprintln!("{}", "Leaving with a request still in flight.".yellow());
    }
    Ok(())
}

fn handle_line(ctl: &mut AppController, list: &mut ResultList, line: &str, clamp_lines: usize) -> Flow {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        ":q" | ":quit" | ":exit" => return Flow::Quit,
        ":h" | ":help" => print_help(),
        ":index" | ":i" => {
            ctl.index_form_mut().set_input(rest);
            if ctl.submit_index_form() {
                if let Some(status) = repo_rag::IndexSubmission::status(ctl.state()) {
                    println!("{}", status.bright_black());
                }
            }
        }
        ":k" => match rest.parse::<i64>() {
            Ok(k) => {
                ctl.query_form_mut().set_top_k(k);
                println!("top_k = {k}");
            }
            Err(_) => println!("{}", "usage: :k <number>".yellow()),
        },
        ":expand" | ":e" => {
            let picked: Vec<usize> = rest
                .split(|c: char| c.is_whitespace() || c == '.')
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            match picked.as_slice() {
                [r, c] if *r > 0 && *c > 0 => {
                    if list.toggle(ctl.history(), r - 1, c - 1).is_some() {
                        if let Some(entry) = ctl.history().get(r - 1) {
                            println!("{}", list.render_entry(r - 1, entry, clamp_lines));
                        }
                    } else {
                        println!("{}", format!("no chunk {r}.{c}").yellow());
                    }
                }
                _ => println!("{}", "usage: :expand <result> <chunk>".yellow()),
            }
        }
        ":show" | ":s" => {
            list.sync(ctl.history());
            println!("{}", render::header(ctl));
            if !ctl.history().is_empty() {
                println!("\n{}", list.render(ctl.history(), clamp_lines));
            }
        }
        other if other.starts_with(':') => {
            println!("{}", format!("unknown command {other}, try :help").yellow());
        }
        _ => {
            ctl.query_form_mut().set_question(line);
            ctl.submit_query_form();
        }
    }
    Flow::Continue
}

fn announce(ctl: &AppController, list: &mut ResultList, applied: Applied, clamp_lines: usize) {
    match applied {
        Applied::Indexed => {
            list.sync(ctl.history());
            if let Some(info) = ctl.index_info() {
                println!("{}", render::index_info(info));
            }
        }
        Applied::Answered { .. } => {
            list.sync(ctl.history());
            if let Some(entry) = ctl.history().get(0) {
                println!("{}", list.render_entry(0, entry, clamp_lines));
            }
        }
        Applied::IndexFailed | Applied::QueryFailed => {
            if let Some(err) = render::error_line(ctl.error()) {
                println!("{err}");
            }
        }
        Applied::Ignored => {}
    }
}

fn prompt(ctl: &AppController) -> Result<()> {
    let label = match ctl.state() {
        WorkflowState::Idle => "idle".normal(),
        WorkflowState::Indexing => "indexing...".yellow(),
        WorkflowState::Indexed => "ready".green(),
        WorkflowState::Querying => "...".yellow(),
    };
    print!("[{label}] > ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

fn print_help() {
    println!("  {:<24} {}", ":index <url>".bright_blue(), "index a repository");
    println!("  {:<24} {}", "<question>".bright_blue(), "ask about the indexed code");
    println!("  {:<24} {}", ":k <n>".bright_blue(), "evidence chunks per question");
    println!("  {:<24} {}", ":expand <r> <c>".bright_blue(), "expand or collapse a chunk");
    println!("  {:<24} {}", ":show".bright_blue(), "print the session");
    println!("  {:<24} {}", ":quit".bright_blue(), "leave");
}

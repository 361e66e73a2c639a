use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, LearningSession, UserIntent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the topic-learning service")]
struct Cli {
    /// Overrides the server URL from pathfinder.toml / APP__SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a knowledge graph and a learning path, print both, and exit.
    Plan {
        topic: String,
        /// Defaults to the topic.
        #[arg(long)]
        goal: Option<String>,
    },
    /// Interactive session reading commands from stdin.
    Shell,
}

const SHELL_HELP: &str = "\
commands:
  topic <text>       set the knowledge graph topic
  graph              generate the knowledge graph
  goal <text>        set the learning goal
  path               generate the learning path
  done <concept>     mark a concept as complete
  struggle <concept> mark a concept as struggling
  ask <question>     ask the assistant
  reset              clear everything
  show               print the current view
  help               print this help
  quit               leave";

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Intents(Vec<UserIntent>),
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let needs_argument = |what: &str| {
        if rest.is_empty() {
            Err(format!("'{verb}' needs {what}"))
        } else {
            Ok(rest.to_string())
        }
    };

    let intents = match verb.to_ascii_lowercase().as_str() {
        "" | "show" => return Ok(ShellCommand::Show),
        "help" | "?" => return Ok(ShellCommand::Help),
        "quit" | "exit" => return Ok(ShellCommand::Quit),
        "topic" => vec![UserIntent::EditTopic(rest.to_string())],
        "graph" => vec![UserIntent::GenerateKnowledgeGraph],
        "goal" => vec![UserIntent::EditGoal(rest.to_string())],
        "path" => vec![UserIntent::GeneratePath],
        "done" | "complete" => vec![UserIntent::MarkComplete(needs_argument("a concept")?)],
        "struggle" | "struggling" => {
            vec![UserIntent::MarkStruggling(needs_argument("a concept")?)]
        }
        "ask" => vec![
            UserIntent::EditQuestion(needs_argument("a question")?),
            UserIntent::Ask,
        ],
        "reset" => vec![UserIntent::Reset],
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(ShellCommand::Intents(intents))
}

async fn run_plan(session: &Arc<LearningSession>, topic: String, goal: Option<String>) -> Result<()> {
    let goal = goal.unwrap_or_else(|| topic.clone());
    session.set_topic(topic).await;
    session.generate_knowledge_graph().await;

    if let Some(error) = session.snapshot().await.graph_status.error {
        print!("{}", session.view().await);
        bail!(error);
    }

    session.set_goal(goal).await;
    session.generate_path().await;
    print!("{}", session.view().await);

    if let Some(error) = session.snapshot().await.path_status.error {
        bail!(error);
    }
    Ok(())
}

async fn run_shell(session: &Arc<LearningSession>) -> Result<()> {
    println!("{SHELL_HELP}");
    print!("{}", session.view().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Help) => println!("{SHELL_HELP}"),
            Ok(ShellCommand::Show) => print!("{}", session.view().await),
            Ok(ShellCommand::Intents(intents)) => {
                let schedules_regeneration = intents.iter().any(|intent| {
                    matches!(
                        intent,
                        UserIntent::MarkComplete(_) | UserIntent::MarkStruggling(_)
                    )
                });
                for intent in intents {
                    session.dispatch(intent).await;
                }
                if schedules_regeneration {
                    print!("{}", session.view().await);
                    session.wait_for_pending_regeneration().await;
                }
                print!("{}", session.view().await);
            }
            Err(message) => eprintln!("{message}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let session = LearningSession::from_settings(&settings)?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Plan { topic, goal } => run_plan(&session, topic, goal).await,
        Command::Shell => run_shell(&session).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_editing_commands_with_spaces() {
        assert_eq!(
            parse_command("topic  Linear Algebra "),
            Ok(ShellCommand::Intents(vec![UserIntent::EditTopic(
                "Linear Algebra".into()
            )]))
        );
        assert_eq!(
            parse_command("goal"),
            Ok(ShellCommand::Intents(vec![UserIntent::EditGoal(String::new())]))
        );
    }

    #[test]
    fn marks_require_a_concept() {
        assert!(parse_command("done").is_err());
        assert_eq!(
            parse_command("done Chain Rule"),
            Ok(ShellCommand::Intents(vec![UserIntent::MarkComplete(
                "Chain Rule".into()
            )]))
        );
        assert_eq!(
            parse_command("struggle Limits"),
            Ok(ShellCommand::Intents(vec![UserIntent::MarkStruggling(
                "Limits".into()
            )]))
        );
    }

    #[test]
    fn ask_sets_question_then_asks() {
        assert_eq!(
            parse_command("ask what is a limit?"),
            Ok(ShellCommand::Intents(vec![
                UserIntent::EditQuestion("what is a limit?".into()),
                UserIntent::Ask,
            ]))
        );
    }

    #[test]
    fn control_commands() {
        assert_eq!(parse_command(""), Ok(ShellCommand::Show));
        assert_eq!(parse_command("HELP"), Ok(ShellCommand::Help));
        assert_eq!(parse_command("exit"), Ok(ShellCommand::Quit));
        assert_eq!(
            parse_command("reset"),
            Ok(ShellCommand::Intents(vec![UserIntent::Reset]))
        );
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn cli_parses_plan_arguments() {
        let cli = Cli::try_parse_from([
            "pathfinder_cli",
            "--server-url",
            "http://127.0.0.1:9000",
            "plan",
            "Calculus",
            "--goal",
            "Derivatives",
        ])
        .expect("valid args");

        assert_eq!(cli.server_url.as_deref(), Some("http://127.0.0.1:9000"));
        match cli.command {
            Some(Command::Plan { topic, goal }) => {
                assert_eq!(topic, "Calculus");
                assert_eq!(goal.as_deref(), Some("Derivatives"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "postage")]
#[command(about = "Budgeted message exchange between registered users")]
struct Cli {
    /// Path to the settings file, without extension.
    #[arg(long)]
    config: Option<String>,

    /// Database connection string (also read from `DATABASE_URL`).
    /// Overrides the `database` setting.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Message(Message),
    /// Apply pending migrations and exit.
    Migrate,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Register(UserRegisterArgs),
    Show(UserShowArgs),
    List,
}

#[derive(Args, Debug)]
struct UserRegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct UserShowArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug)]
struct Message {
    #[command(subcommand)]
    command: MessageCommand,
}

#[derive(Subcommand, Debug)]
enum MessageCommand {
    Send(MessageSendArgs),
    Show(MessageShowArgs),
    Inbox(MessageInboxArgs),
    List,
}

#[derive(Args, Debug)]
struct MessageSendArgs {
    #[arg(long)]
    from: String,
    #[arg(long)]
    to: String,
    #[arg(long)]
    body: String,
}

#[derive(Args, Debug)]
struct MessageShowArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct MessageInboxArgs {
    #[arg(long)]
    to: String,
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(engine: &Engine, command: Command) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        Command::User(User { command }) => match command {
            UserCommand::Register(args) => {
                let user = engine.register_user(&args.username, &args.name).await?;
                print_json(&user)?;
            }
            UserCommand::Show(UserShowArgs { username, id }) => {
                let user = match (username, id) {
                    (Some(username), _) => engine.user_by_username(&username).await?,
                    (None, Some(id)) => engine.user_by_id(&id).await?,
                    (None, None) => return Err("either --username or --id is required".into()),
                };
                print_json(&user)?;
            }
            UserCommand::List => print_json(&engine.users().await?)?,
        },
        Command::Message(Message { command }) => match command {
            MessageCommand::Send(args) => {
                let dispatch = engine
                    .send_message(&args.from, &args.to, &args.body)
                    .await?;
                print_json(&dispatch.message)?;

                // The process must outlive the debit task.
                match dispatch.debit.settled().await {
                    Ok(debit) => eprintln!(
                        "debited {} from {}, {} left",
                        debit.amount, debit.username, debit.remaining
                    ),
                    Err(err) => eprintln!("warning: message sent but {err}"),
                }
            }
            MessageCommand::Show(args) => print_json(&engine.message_by_id(&args.id).await?)?,
            MessageCommand::Inbox(args) => print_json(&engine.messages_to(&args.to).await?)?,
            MessageCommand::List => print_json(&engine.messages().await?)?,
        },
        Command::Migrate => tracing::info!("migrations applied"),
    }

    Ok(())
}

fn report(err: &(dyn Error + Send + Sync + 'static)) {
    match err.downcast_ref::<EngineError>() {
        Some(engine_err) => {
            let code = engine_err.code();
            eprintln!(
                "error [{}] {}: {engine_err}",
                code.category().as_str(),
                code.detail()
            );
        }
        None => eprintln!("error: {err}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "postage={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let database_url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    tracing::debug!(%database_url, "connecting");
    let db = connect_db(&database_url).await?;

    let engine = Engine::builder()
        .database(db)
        .initial_budget(settings.ledger.initial_budget)
        .build()
        .await?;

    if let Err(err) = run(&engine, cli.command).await {
        report(err.as_ref());
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn user_show_takes_exactly_one_key() {
        assert!(Cli::try_parse_from(["postage", "user", "show"]).is_err());
        assert!(
            Cli::try_parse_from(["postage", "user", "show", "--username", "a", "--id", "b"])
                .is_err()
        );

        let cli = Cli::try_parse_from(["postage", "user", "show", "--id", "b"]).unwrap();
        match cli.command {
            Command::User(User {
                command: UserCommand::Show(args),
            }) => {
                assert_eq!(args.id.as_deref(), Some("b"));
                assert!(args.username.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn message_send_requires_all_parts() {
        assert!(Cli::try_parse_from(["postage", "message", "send", "--from", "a"]).is_err());

        let cli = Cli::try_parse_from([
            "postage", "message", "send", "--from", "orange", "--to", "banana", "--body", "hi",
        ])
        .unwrap();
        match cli.command {
            Command::Message(Message {
                command: MessageCommand::Send(args),
            }) => {
                assert_eq!(args.from, "orange");
                assert_eq!(args.to, "banana");
                assert_eq!(args.body, "hi");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

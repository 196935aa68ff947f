use anyhow::{bail, Context, Result};
use bpaf::*;
use dotenv::dotenv;
use gradeview::config::Config;
use gradeview::error::{ApiError, FormError, Operation};
use gradeview::utils::board::{EditForm, GradeBoard, InsertForm};
use gradeview::utils::client::GradesClient;
use gradeview::utils::report::{render_board, render_errors, render_record};
use log::{error, info};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

#[derive(Debug, Clone)]
enum Cmd {
    List {
        filter: Option<String>,
    },
    Show {
        id: i64,
    },
    Add {
        student: String,
        subject: String,
        grade: String,
        date: Option<String>,
    },
    Edit {
        id: i64,
        subject: Option<String>,
        grade: Option<String>,
        date: Option<String>,
    },
    Health,
}

impl Cmd {
    // Forms get the submit wording for their errors, everything else reads.
    fn operation(&self) -> Operation {
        match self {
            Cmd::Add { .. } | Cmd::Edit { .. } => Operation::Submit,
            _ => Operation::Load,
        }
    }
}

fn id() -> impl Parser<i64> {
    positional::<i64>("ID").help("Id of the grade record")
}

fn date() -> impl Parser<Option<String>> {
    long("date")
        .help("Date the grade was given (YYYY-MM-DD)")
        .argument::<String>("DATE")
        .optional()
}

fn list() -> impl Parser<Cmd> {
    let filter = short('f')
        .long("filter")
        .help("Only show students whose name contains NAME (case-insensitive)")
        .argument::<String>("NAME")
        .optional();
    construct!(Cmd::List { filter })
        .to_options()
        .command("list")
        .help("List the recorded grades")
}

fn show() -> impl Parser<Cmd> {
    let id = id();
    construct!(Cmd::Show { id })
        .to_options()
        .command("show")
        .help("Show a single grade record")
}

fn add() -> impl Parser<Cmd> {
    let student = long("student")
        .help("Full name of the student")
        .argument::<String>("NAME");
    let subject = long("subject").help("Subject").argument::<String>("SUBJECT");
    let grade = long("grade").help("Integer grade").argument::<String>("GRADE");
    let date = date();
    construct!(Cmd::Add {
        student,
        subject,
        grade,
        date
    })
    .to_options()
    .command("add")
    .help("Record a new grade (date defaults to today)")
}

fn edit() -> impl Parser<Cmd> {
    let subject = long("subject")
        .help("New subject")
        .argument::<String>("SUBJECT")
        .optional();
    let grade = long("grade")
        .help("New integer grade")
        .argument::<String>("GRADE")
        .optional();
    let date = date();
    let id = id();
    construct!(Cmd::Edit {
        subject,
        grade,
        date,
        id
    })
    .to_options()
    .command("edit")
    .help("Change subject, grade or date of an existing record")
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    let health = pure(Cmd::Health)
        .to_options()
        .command("health")
        .help("Check that the grades backend and its database are up");

    let (list, show, add, edit) = (list(), show(), add(), edit());
    construct!([list, show, add, edit, health])
        .to_options()
        .descr("Browse and manage student grades")
        .run()
}

// Turns any failure into the messages the user should read.
fn user_messages(e: &anyhow::Error, operation: Operation) -> Vec<String> {
    if let Some(api) = e.downcast_ref::<ApiError>() {
        api.user_messages(operation)
    } else if let Some(form) = e.downcast_ref::<FormError>() {
        form.messages().to_vec()
    } else {
        vec![format!("{e:#}")]
    }
}

async fn run(cmd: Cmd, client: &GradesClient) -> Result<()> {
    match cmd {
        Cmd::List { filter } => {
            let mut board = GradeBoard::with_records(client.fetch_all().await?);
            if let Some(filter) = filter {
                board.set_filter(filter);
            }
            print!("{}", render_board(&board));
        }
        Cmd::Show { id } => {
            let record = client.fetch_one(id).await?;
            print!("{}", render_record(&record));
        }
        Cmd::Add {
            student,
            subject,
            grade,
            date,
        } => {
            let mut form = InsertForm::new();
            form.student_name = student;
            form.subject = subject;
            form.grade = grade;
            if let Some(date) = date {
                form.grade_date = date;
            }

            let record = client.create(&form.to_request()?).await?;
            println!("Voto inserito con successo!");
            print!("{}", render_record(&record));
        }
        Cmd::Edit {
            id,
            subject,
            grade,
            date,
        } => {
            // Start from the stored values so unspecified fields keep them.
            let current = client.fetch_one(id).await?;
            let mut form = EditForm::from_record(&current);
            if let Some(subject) = subject {
                form.subject = subject;
            }
            if let Some(grade) = grade {
                form.grade = grade;
            }
            if let Some(date) = date {
                form.grade_date = date;
            }

            let record = client.update(id, &form.to_request()?).await?;
            println!("Voto aggiornato con successo!");
            print!("{}", render_record(&record));
        }
        Cmd::Health => {
            let health = client.health().await?;
            println!("status: {}, database: {}", health.status, health.database);
            if !health.is_ok() {
                bail!("Backend is not healthy (database: {})", health.database);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parses the command line first so `--help` works even with a broken environment.
    let cmd = options();
    let operation = cmd.operation();

    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    TermLogger::init(
        config.log_level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialise the logger")?;

    config.log_defaults();
    info!("Using grades backend at {}", config.api_url);

    let client = GradesClient::new(&config).context("Failed to build the HTTP client")?;

    if let Err(e) = run(cmd, &client).await {
        error!("{:#}", e);
        eprint!("{}", render_errors(&user_messages(&e, operation)));
        std::process::exit(1);
    }
    Ok(())
}

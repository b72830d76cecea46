use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};

use progress_journal::api::{JournalApi, RemoteJournalClient};
use progress_journal::config::{self, ClientConfig, ResolvedConfig};
use progress_journal::error::{ConfigError, JournalError};
use progress_journal::form::{EntryFormController, ImageCandidate, PostSubmitChoice, SubmitOutcome};
use progress_journal::history::{
    write_export, HistoryMode, HistoryViewController, RecencyFilter, RenderedView,
};
use progress_journal::logging::init_logging;
use progress_journal::model::PerformanceRating;
use progress_journal::notify::{ConsoleNotifier, Notifier};
use progress_journal::render::EntryRenderer;
use progress_journal::sanitize::mask_pin;
use progress_journal::session::{FileKeyValueStore, SessionStore};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to config.json (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new progress entry
    Entry(EntryArgs),

    /// Show every entry logged under a staff PIN at the saved site
    History {
        /// PIN to look up instead of the saved one
        #[arg(long)]
        pin: Option<String>,
        #[arg(long)]
        expand: bool,
    },

    /// Show entries about one scholar at the saved site
    Scholar {
        id: String,
        /// `7d`, `30d`, ... or `all`
        #[arg(long, default_value = "7d")]
        range: RecencyFilter,
        #[arg(long)]
        expand: bool,
    },

    /// Write the PIN history as CSV
    Export {
        #[arg(long)]
        pin: Option<String>,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Inspect or forget the remembered staff identity
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    Show,
    Clear,
}

#[derive(Args, Debug)]
struct EntryArgs {
    /// Falls back to the saved site
    #[arg(long)]
    site: Option<String>,
    /// Falls back to the saved role
    #[arg(long)]
    role: Option<String>,
    /// Falls back to the saved PIN
    #[arg(long)]
    pin: Option<String>,
    #[arg(long)]
    scholar: String,
    #[arg(long)]
    skill_area: String,
    #[arg(long)]
    target: Option<String>,
    #[arg(long)]
    evidence: String,
    /// Low, Mid or High
    #[arg(long)]
    rating: Option<PerformanceRating>,
    #[arg(long)]
    note: Option<String>,
    /// JPEG or PNG, up to 10 MiB
    #[arg(long)]
    image: Option<PathBuf>,
    /// Open the PIN history after a successful save
    #[arg(long)]
    view_history: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let notifier = ConsoleNotifier;
    match run(cli, Arc::new(notifier)).await {
        Ok(code) => code,
        Err(e) => {
            notifier.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Everything the network-backed commands share.
struct Context {
    client: RemoteJournalClient,
    session: SessionStore,
    renderer: EntryRenderer,
}

impl Context {
    fn load(config_path: Option<&PathBuf>) -> Result<Self, JournalError> {
        let config = load_resolved_config(config_path)?;
        Ok(Self {
            client: RemoteJournalClient::from_config(&config)?,
            session: session_store(config.data_directory.clone())?,
            renderer: EntryRenderer::with_offset(config.utc_offset),
        })
    }
}

async fn run(cli: Cli, notifier: Arc<dyn Notifier>) -> Result<ExitCode, JournalError> {
    let config_path = cli.config.as_ref();

    match cli.command {
        Command::Session { action } => {
            let data_directory = load_client_config(config_path)
                .ok()
                .and_then(|c| c.data_directory.map(PathBuf::from));
            run_session(action, session_store(data_directory)?, notifier.as_ref())
        }
        Command::Entry(args) => {
            let ctx = Context::load(config_path)?;
            run_entry(args, &ctx.client, ctx.session, ctx.renderer, notifier).await
        }
        Command::History { pin, expand } => {
            let ctx = Context::load(config_path)?;
            run_history(&ctx.client, ctx.session, ctx.renderer, pin.as_deref(), expand).await
        }
        Command::Scholar { id, range, expand } => {
            let ctx = Context::load(config_path)?;
            run_scholar(&ctx.client, ctx.session, ctx.renderer, &id, range, expand).await
        }
        Command::Export { pin, out } => {
            let ctx = Context::load(config_path)?;
            run_export(
                &ctx.client,
                ctx.session,
                ctx.renderer,
                pin.as_deref(),
                out,
                notifier.as_ref(),
            )
            .await
        }
    }
}

fn load_client_config(path: Option<&PathBuf>) -> Result<ClientConfig, ConfigError> {
    let path = match path.cloned().or_else(config::default_config_path) {
        Some(path) => path,
        None => return Ok(ClientConfig::default()),
    };

    if path.exists() {
        debug!("Loading config from {:?}", path);
        config::load_config(&path)
    } else if std::env::var_os(config::loader::API_BASE_ENV_VAR).is_some() {
        Ok(ClientConfig::default())
    } else {
        Err(ConfigError::NotFound(path))
    }
}

fn load_resolved_config(path: Option<&PathBuf>) -> Result<ResolvedConfig, ConfigError> {
    config::resolve(load_client_config(path)?)
}

fn session_store(data_directory: Option<PathBuf>) -> Result<SessionStore, JournalError> {
    let backend = match data_directory {
        Some(dir) => FileKeyValueStore::in_directory(dir),
        None => FileKeyValueStore::default_location()?,
    };
    debug!("Session file: {:?}", backend.path());
    Ok(SessionStore::new(Arc::new(backend)))
}

async fn run_entry(
    args: EntryArgs,
    api: &dyn JournalApi,
    session: SessionStore,
    renderer: EntryRenderer,
    notifier: Arc<dyn Notifier>,
) -> Result<ExitCode, JournalError> {
    let mut form = EntryFormController::new(session.clone(), notifier);

    {
        let draft = form.draft_mut();
        if let Some(site) = args.site {
            draft.site = site;
        }
        if let Some(role) = args.role {
            draft.staff_role = role;
        }
        if let Some(pin) = args.pin {
            draft.staff_pin = pin;
        }
        draft.scholar_id = args.scholar;
        draft.skill_area = args.skill_area;
        draft.specific_skill_target = args.target.unwrap_or_default();
        draft.evidence_type = args.evidence;
        draft.optional_note = args.note.unwrap_or_default();
    }

    if let Some(rating) = args.rating {
        form.select_rating(rating);
    }

    if let Some(path) = &args.image {
        let candidate = ImageCandidate::from_path(path)?;
        if form.stage_image(candidate).await.is_err() {
            // Already reported as a toast.
            return Ok(ExitCode::FAILURE);
        }
    }

    match form.submit(api).await {
        Ok(SubmitOutcome::Saved) => {}
        Ok(SubmitOutcome::Failed { .. }) | Err(JournalError::Validation(_)) => {
            return Ok(ExitCode::FAILURE)
        }
        Err(e) => return Err(e),
    }

    let choice = if args.view_history {
        PostSubmitChoice::ViewHistory
    } else {
        ask_post_submit_choice()
    };

    match choice {
        PostSubmitChoice::ViewHistory => run_history(api, session, renderer, None, false).await,
        PostSubmitChoice::CreateAnother => Ok(ExitCode::SUCCESS),
    }
}

fn ask_post_submit_choice() -> PostSubmitChoice {
    if !std::io::stdin().is_terminal() {
        return PostSubmitChoice::CreateAnother;
    }

    print!("View history now? [y/N] ");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return PostSubmitChoice::CreateAnother;
    }

    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => PostSubmitChoice::ViewHistory,
        _ => PostSubmitChoice::CreateAnother,
    }
}

async fn run_history(
    api: &dyn JournalApi,
    session: SessionStore,
    renderer: EntryRenderer,
    pin: Option<&str>,
    expand: bool,
) -> Result<ExitCode, JournalError> {
    let mut view = HistoryViewController::new(HistoryMode::ByPin, session, renderer);
    view.load_pin_history(api, pin).await;
    if expand {
        view.expand_all();
    }
    Ok(print_view(&view.render(Utc::now())))
}

async fn run_scholar(
    api: &dyn JournalApi,
    session: SessionStore,
    renderer: EntryRenderer,
    scholar_id: &str,
    range: RecencyFilter,
    expand: bool,
) -> Result<ExitCode, JournalError> {
    let mut view = HistoryViewController::new(HistoryMode::ByScholar, session, renderer);
    view.set_filter(range);
    view.lookup_scholar(api, scholar_id).await?;
    if expand {
        view.expand_all();
    }

    match range {
        RecencyFilter::AllTime => println!("Showing: all time"),
        RecencyFilter::LastDays(days) => println!("Showing: last {} days", days),
    }
    Ok(print_view(&view.render(Utc::now())))
}

async fn run_export(
    api: &dyn JournalApi,
    session: SessionStore,
    renderer: EntryRenderer,
    pin: Option<&str>,
    out: PathBuf,
    notifier: &dyn Notifier,
) -> Result<ExitCode, JournalError> {
    let mut view = HistoryViewController::new(HistoryMode::ByPin, session, renderer);
    view.load_pin_history(api, pin).await;

    match view.render(Utc::now()) {
        view_state @ (RenderedView::CredentialsRequired | RenderedView::Failed { .. }) => {
            print_view(&view_state);
            return Ok(ExitCode::FAILURE);
        }
        _ => {}
    }

    let today = Utc::now().with_timezone(renderer.offset()).date_naive();
    let export = view.export(today)?;
    let path = write_export(&export, &out)?;
    info!("Wrote {} entries", view.entries().len());
    notifier.success(&format!("Exported to {}", path.display()));
    Ok(ExitCode::SUCCESS)
}

fn run_session(
    action: SessionAction,
    session: SessionStore,
    notifier: &dyn Notifier,
) -> Result<ExitCode, JournalError> {
    match action {
        SessionAction::Show => {
            let identity = session.load();
            if identity.is_empty() {
                println!("No saved staff identity.");
            } else {
                println!("Site: {}", identity.site.as_deref().unwrap_or("-"));
                println!("Role: {}", identity.staff_role.as_deref().unwrap_or("-"));
                println!(
                    "PIN:  {}",
                    identity.staff_pin.as_deref().map(mask_pin).unwrap_or_else(|| "-".into())
                );
            }
        }
        SessionAction::Clear => {
            session.clear()?;
            notifier.success("Saved staff identity cleared");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_view(view: &RenderedView) -> ExitCode {
    match view {
        RenderedView::Idle | RenderedView::Loading => ExitCode::SUCCESS,
        RenderedView::CredentialsRequired => {
            println!("No saved site and PIN on this device. Submit an entry first.");
            ExitCode::FAILURE
        }
        RenderedView::Empty { message } => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        RenderedView::Failed { message } => {
            eprintln!("Failed to load history: {}", message);
            ExitCode::FAILURE
        }
        RenderedView::Cards { header, cards } => {
            if let Some(header) = header {
                println!(
                    "PIN: {} | Site: {} | {}",
                    header.pin,
                    header.site,
                    header.count_label()
                );
            }
            for card in cards {
                println!();
                print!("{}", card.card.to_text(card.expanded));
            }
            ExitCode::SUCCESS
        }
    }
}

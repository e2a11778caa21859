use chrono::Utc;
use church_site::admin::{self, AnnouncementForm, AssumeYes, Confirm, SermonForm, UploadSettings};
use church_site::auth::{self, AuthClient};
use church_site::config::{self, SiteConfig};
use church_site::fallback::FallbackStore;
use church_site::gateway::memory::MemoryGateway;
use church_site::gateway::rest::RestGateway;
use church_site::gateway::{Collection, ContentGateway, Query};
use church_site::generate;
use church_site::kv::{FileStore, MemoryStore};
use church_site::output;
use church_site::resolve::Resolver;
use church_site::types::{ContactFields, Priority};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "church-site")]
#[command(about = "Static site generator and admin tool for a church website")]
#[command(long_about = "\
Static site generator and admin tool for a church website

Content is resolved per section: the hosted backend first, the bundled JSON
documents in data/ when the backend is unreachable or empty, and a
placeholder when neither has anything.

Site structure:

  site/
  ├── config.toml            # Site, backend and gallery settings
  ├── about.md               # Optional about page
  ├── contact.md             # Optional contact page
  └── data/
      ├── sermons.json       # { \"sermons\": [ ... ] }
      ├── announcements.json # { \"announcements\": [ ... ] }
      └── gallery.json       # { \"gallery\": [ ... ] }

Admin commands need a session: run 'church-site login --email ...' first.

Run 'church-site gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site source directory
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for persisted state (admin session)
    #[arg(long, default_value = ".church-site", global = true)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve all content and write the HTML site
    Build {
        /// Skip the backend; build from the bundled data/ documents only
        #[arg(long)]
        offline: bool,
    },
    /// Test the backend connection and the fallback documents
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Sign in as an admin (password read from stdin)
    Login {
        #[arg(long)]
        email: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in admin
    Whoami,
    /// Manage sermons
    Sermon {
        #[command(subcommand)]
        action: SermonAction,
    },
    /// Manage announcements
    Announcement {
        #[command(subcommand)]
        action: AnnouncementAction,
    },
    /// Manage gallery photos
    Photo {
        #[command(subcommand)]
        action: PhotoAction,
    },
}

#[derive(Subcommand)]
enum SermonAction {
    List,
    Add {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        pastor: String,
        #[arg(long)]
        scripture: Option<String>,
        /// YouTube watch, share or embed link
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AnnouncementAction {
    List,
    Add {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        text: String,
        /// normal or high
        #[arg(long, default_value = "normal")]
        priority: String,
        /// Make this the single active announcement
        #[arg(long)]
        active: bool,
        /// Show as a popup banner
        #[arg(long)]
        popup: bool,
        #[arg(long)]
        whatsapp: Option<String>,
        #[arg(long)]
        web: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Make one announcement the single active one
    Activate { id: String },
    /// Switch the popup banner on or off
    Popup {
        id: String,
        #[arg(long, conflicts_with = "off", required_unless_present = "off")]
        on: bool,
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand)]
enum PhotoAction {
    List,
    /// Upload image files; directories are searched recursively
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        caption: Option<String>,
    },
    Delete {
        id: String,
        /// Stored object name, as shown by `photo list`
        #[arg(long)]
        file_name: String,
        #[arg(long)]
        yes: bool,
    },
}

/// Asks on stdin before destructive calls.
struct Prompt;

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes { Box::new(AssumeYes) } else { Box::new(Prompt) }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.source)?;
    let sessions = FileStore::new(cli.state_dir.join("session.json"));

    match cli.command {
        Command::GenConfig => {}
        Command::Build { offline } => {
            let fallback = FallbackStore::new(cli.source.join(&config.data_dir));
            let gateway: Box<dyn ContentGateway> = if offline {
                Box::new(MemoryGateway::new())
            } else {
                Box::new(RestGateway::new(&config.backend))
            };
            println!("==> Resolving content");
            let resolver = Resolver::new(gateway.as_ref(), &fallback);
            let site = generate::resolve_site(&resolver, &config, &cli.source)?;

            println!("==> Generating HTML → {}", cli.output.display());
            let report = generate::generate(&site, &config, &MemoryStore::new(), &cli.output)?;
            output::print_build_output(&report, &cli.output);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => check(&config, &cli.source)?,
        Command::Login { email } => {
            eprint!("Password: ");
            io::stderr().flush()?;
            let mut password = String::new();
            io::stdin().lock().read_line(&mut password)?;
            let password = password.trim_end_matches(['\r', '\n']);

            let session = AuthClient::new(&config.backend).sign_in(&email, password)?;
            auth::save_session(&sessions, &session)?;
            output::print_session(Some(&session), Utc::now().timestamp());
        }
        Command::Logout => {
            if let Some(session) = auth::load_session(&sessions)? {
                if let Err(e) = AuthClient::new(&config.backend).sign_out(&session) {
                    log::warn!("remote sign-out failed: {e}");
                }
            }
            auth::clear_session(&sessions)?;
            println!("Signed out");
        }
        Command::Whoami => {
            let session = auth::load_session(&sessions)?;
            output::print_session(session.as_ref(), Utc::now().timestamp());
        }
        Command::Sermon { action } => {
            let gateway = admin_gateway(&config, &sessions)?;
            sermon_command(&gateway, action).map_err(|e| e.user_message())?;
        }
        Command::Announcement { action } => {
            let gateway = admin_gateway(&config, &sessions)?;
            announcement_command(&gateway, action).map_err(|e| e.user_message())?;
        }
        Command::Photo { action } => {
            let gateway = admin_gateway(&config, &sessions)?;
            photo_command(&gateway, &config, action).map_err(|e| e.user_message())?;
        }
    }

    Ok(())
}

/// Gateway authorised with the stored session, refreshed if needed.
fn admin_gateway(config: &SiteConfig, sessions: &FileStore) -> Result<RestGateway, Box<dyn Error>> {
    let client = AuthClient::new(&config.backend);
    let session = auth::current_session(sessions, &client, Utc::now().timestamp())?;
    Ok(RestGateway::new(&config.backend).with_access_token(session.access_token))
}

fn check(config: &SiteConfig, source: &Path) -> Result<(), Box<dyn Error>> {
    let fallback = FallbackStore::new(source.join(&config.data_dir));
    println!("==> Checking fallback documents in {}", fallback.dir().display());
    let documents = [
        ("sermons.json", fallback.sermons().map(|d| d.len())),
        ("announcements.json", fallback.announcements().map(|d| d.len())),
        ("gallery.json", fallback.gallery().map(|d| d.len())),
    ];
    for (name, result) in documents {
        match result {
            Ok(n) => println!("    {name}: {n} record(s)"),
            Err(e) => println!("    {name}: {e}"),
        }
    }

    if !config.backend.is_configured() {
        println!("==> Backend not configured; the site builds from fallback documents");
        return Ok(());
    }
    let gateway = RestGateway::new(&config.backend);
    match gateway.list(Collection::Announcements, &Query::new().limit(1)) {
        Ok(_) => {
            println!("==> Connected to {}", config.backend.url);
            Ok(())
        }
        Err(e) => Err(e.user_message().into()),
    }
}

fn sermon_command(gateway: &RestGateway, action: SermonAction) -> Result<(), admin::AdminError> {
    match action {
        SermonAction::List => output::print_sermon_list(&admin::list_sermons(gateway)?),
        SermonAction::Add {
            title,
            date,
            pastor,
            scripture,
            video_url,
            description,
        } => {
            let form = SermonForm {
                title,
                date,
                pastor,
                scripture,
                video_url,
                description,
            };
            let sermon = admin::add_sermon(gateway, &form)?;
            output::print_sermon_list(&[sermon]);
        }
        SermonAction::Delete { id, yes } => {
            admin::delete_sermon(gateway, &id, confirmer(yes).as_ref())?;
            println!("Deleted sermon {id}");
        }
    }
    Ok(())
}

fn announcement_command(
    gateway: &RestGateway,
    action: AnnouncementAction,
) -> Result<(), admin::AdminError> {
    match action {
        AnnouncementAction::List => {
            output::print_announcement_list(&admin::list_announcements(gateway)?)
        }
        AnnouncementAction::Add {
            title,
            date,
            text,
            priority,
            active,
            popup,
            whatsapp,
            web,
            phone,
            email,
        } => {
            let form = AnnouncementForm {
                title,
                date,
                text,
                priority: Priority::from_label(&priority),
                is_active: active,
                show_popup: popup,
                contact: ContactFields {
                    whatsapp,
                    web,
                    phone,
                    email,
                },
            };
            let announcement = admin::add_announcement(gateway, &form)?;
            output::print_announcement_list(&[announcement]);
        }
        AnnouncementAction::Delete { id, yes } => {
            admin::delete_announcement(gateway, &id, confirmer(yes).as_ref())?;
            println!("Deleted announcement {id}");
        }
        AnnouncementAction::Activate { id } => {
            let announcement = admin::set_active_announcement(gateway, &id)?;
            output::print_announcement_list(&[announcement]);
        }
        AnnouncementAction::Popup { id, on, .. } => {
            let announcement = admin::toggle_popup(gateway, &id, on)?;
            output::print_announcement_list(&[announcement]);
        }
    }
    Ok(())
}

fn photo_command(
    gateway: &RestGateway,
    config: &SiteConfig,
    action: PhotoAction,
) -> Result<(), admin::AdminError> {
    let settings = UploadSettings {
        bucket: config.backend.bucket.clone(),
        object_prefix: config.backend.object_prefix.clone(),
        max_bytes: config.gallery.max_upload_bytes,
    };
    match action {
        PhotoAction::List => output::print_photo_list(&admin::list_photos(gateway)?),
        PhotoAction::Upload { paths, caption } => {
            let files = admin::collect_upload_files(&paths)?;
            let report = admin::upload_photos(gateway, &settings, &files, caption.as_deref());
            output::print_upload_report(&report);
        }
        PhotoAction::Delete { id, file_name, yes } => {
            let deletion =
                admin::delete_photo(gateway, &settings, &id, &file_name, confirmer(yes).as_ref())?;
            output::print_photo_deletion(&id, &deletion);
        }
    }
    Ok(())
}

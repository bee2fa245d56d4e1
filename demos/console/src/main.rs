use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use waterwise::auth::SIGN_UP_PASSWORD_HINT_LEN;
use waterwise::notify::{ContainerId, NotifyError, RenderedEntry};
use waterwise::prelude::*;

// ---------------------------------------------------------------------------
// Console collaborators
// ---------------------------------------------------------------------------

/// Prints every frame the renderer draws.
#[derive(Default)]
struct ConsolePortal {
    frames: HeadlessPortal,
}

impl Portal for ConsolePortal {
    fn attach_container(&self) -> Result<ContainerId, NotifyError> {
        self.frames.attach_container()
    }

    fn render(&self, container: ContainerId, entries: &[RenderedEntry]) {
        println!("[{container}] {} notification(s)", entries.len());
        for entry in entries {
            println!("    {}", describe(entry));
        }
        self.frames.render(container, entries);
    }

    fn detach_container(&self, container: ContainerId) {
        self.frames.detach_container(container);
    }
}

fn describe(entry: &RenderedEntry) -> String {
    let mut line = format!("{:<7} {}", entry.variant.to_string(), entry.title);
    if let Some(message) = &entry.message {
        line.push_str(": ");
        line.push_str(message);
    }
    if !entry.visible {
        line.push_str(" (closing)");
    }
    line
}

/// Prints route changes.
#[derive(Default)]
struct ConsoleNavigator {
    history: RecordingNavigator,
}

impl Navigator for ConsoleNavigator {
    fn push(&self, path: &str) {
        println!("=> {path}");
        self.history.push(path);
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "waterwise-console")]
#[command(about = "Scripted walk through WaterWise sign-in, sign-out and sign-up", long_about = None)]
struct Args {
    /// Persist the session to this JSON file instead of memory.
    #[arg(long)]
    storage: Option<PathBuf>,
    /// Load settings from this JSON file.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// The sign-up form's hint for `password`, if it is too short.
fn password_hint(password: &str) -> Option<String> {
    (password.chars().count() < SIGN_UP_PASSWORD_HINT_LEN)
        .then(|| format!("password needs at least {SIGN_UP_PASSWORD_HINT_LEN} characters"))
}

/// Walks through every auth transition once.
async fn run_script(app: &WaterwiseApp) -> Result<(), WaterwiseError> {
    let auth = app.auth();
    println!("start: {}", auth.state());

    if auth.is_authenticated() {
        auth.sign_out();
    }

    let user = auth.sign_in("consumer@example.com", "anything").await?;
    println!("signed in as {} ({})", user.name, user.id);
    auth.sign_out();

    match auth.sign_in("nobody@example.com", "x").await {
        Err(AuthError::UnknownEmail(email)) => println!("rejected {email}"),
        Err(e) => return Err(e.into()),
        Ok(user) => println!("unexpectedly signed in as {}", user.name),
    }

    // The form holds back a short password and shows the hint instead.
    let mut password = "short";
    if let Some(hint) = password_hint(password) {
        println!("sign-up form: {hint}");
        password = "waterwise-demo";
    }
    let user = auth
        .sign_up("new@example.com", password, "王大明", Some(UserRole::Company))
        .await?;
    println!("signed up as {} ({})", user.name, user.id);

    // Let the last notification run its course.
    let renderer = &app.config().renderer;
    tokio::time::sleep(Duration::from_millis(
        renderer.default_duration_ms + renderer.exit_delay_ms + 1,
    ))
    .await;

    println!("end: {}", auth.state());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    waterwise::init_tracing("info");

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => WaterwiseConfig::from_json_file(path)?,
        None => WaterwiseConfig::default(),
    };
    let storage: Arc<dyn KeyValueStorage> = match &args.storage {
        Some(path) => Arc::new(FileStorage::open(path)),
        None => Arc::new(MemoryStorage::new()),
    };

    let app = WaterwiseApp::builder()
        .config(config)
        .storage(storage)
        .portal(Arc::new(ConsolePortal::default()))
        .navigator(Arc::new(ConsoleNavigator::default()))
        .build()?;

    run_script(&app).await?;
    app.shutdown();
    Ok(())
}

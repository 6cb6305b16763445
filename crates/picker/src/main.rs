//! Binary entrypoint for the browser picker.
//!
//! `picker serve` runs the coordinator and listens for displays on a Unix
//! socket. `picker display <role>` is a headless display: it prints every view
//! update and sends each stdin line (a JSON action) as an intent.
use std::{path::PathBuf, process};

use clap::{Parser, Subcommand, ValueEnum};
use logging::LogArgs;
use picker_display::{Display, PickerView, Projection, UrlBarView};
use picker_engine::{Coordinator, DisplayLink};
use picker_protocol::{Action, KeyboardLayoutMap, StartupSignal};
use picker_server::{Connection, Server, default_socket_path};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing::{error, info, warn};

/// OS-facing launch, clipboard and settings collaborators.
mod collaborators;
mod error;
mod settings;

use crate::{
    collaborators::SystemCollaborators,
    error::{Error, Result},
};

#[derive(Parser, Debug)]
#[command(name = "picker", about = "Pick a browser for every link", version)]
/// Command-line interface for the `picker` binary.
struct Cli {
    /// What to run.
    #[command(subcommand)]
    command: Command,

    /// Socket path (defaults to a per-user runtime directory)
    #[arg(long, global = true, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Logging controls
    #[command(flatten)]
    log: LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Run the coordinator and serve displays.
    Serve {
        /// Settings file (defaults to ~/.config/picker/settings.json)
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,

        /// Installed browser ids, comma separated
        #[arg(long, value_delimiter = ',')]
        installed: Vec<String>,

        /// URL to open once started
        #[arg(long)]
        url: Option<String>,

        /// Keyboard layout file: JSON object of key code to character
        #[arg(long, value_name = "PATH")]
        layout: Option<PathBuf>,
    },
    /// Connect a headless display.
    Display {
        /// Which display to act as.
        #[arg(value_enum)]
        role: Role,

        /// Keyboard layout file for hot key labels (picker only)
        #[arg(long, value_name = "PATH")]
        layout: Option<PathBuf>,
    },
}

/// Display roles selectable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Role {
    /// The browser tiles window.
    Picker,
    /// The URL strip.
    UrlBar,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let socket = cli.socket.unwrap_or_else(default_socket_path);
    let result = match cli.command {
        Command::Serve {
            settings,
            installed,
            url,
            layout,
        } => serve(socket, settings, installed, url, layout).await,
        Command::Display { role, layout } => match role {
            Role::Picker => picker_display(socket, layout).await,
            Role::UrlBar => display::<UrlBarView>(socket, print_url_bar, |_| {}).await,
        },
    };
    if let Err(e) = result {
        error!(error = %e, "picker exited with error");
        process::exit(1);
    }
}

/// Run the coordinator until Ctrl-C.
async fn serve(
    socket: PathBuf,
    settings_path: Option<PathBuf>,
    installed: Vec<String>,
    url: Option<String>,
    layout: Option<PathBuf>,
) -> Result<()> {
    let settings_path = settings_path.unwrap_or_else(settings::default_settings_path);
    let storage = settings::load(&settings_path).await?;
    let layout = match layout {
        Some(path) => Some(settings::load_layout(&path).await?),
        None => None,
    };

    let (collaborators, writer) = SystemCollaborators::new(settings_path.clone());
    let (coordinator, handle) = Coordinator::new(collaborators);
    let task = coordinator.spawn();

    // Collaborator events in the order the OS would produce them.
    if !installed.is_empty() {
        handle.dispatch(Action::RetrievedInstalledApps(installed));
    }
    handle.dispatch(Action::ReceivedStartupSignal(StartupSignal { storage }));
    if let Some(layout) = layout {
        handle.dispatch(Action::UpdatedKeyboardLayout(layout));
    }
    if let Some(url) = url {
        handle.dispatch(Action::OpenedUrl(url));
    }

    let server = Server::bind(socket, handle.clone())?;
    info!(socket = %server.path().display(), settings = %settings_path.display(), "serving");
    let served = tokio::select! {
        res = server.run() => res.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    };

    handle.shutdown();
    if let Err(e) = task.await {
        warn!(error = %e, "coordinator task failed");
    }
    // The coordinator owned the last persist sender; the writer drains and exits.
    if let Err(e) = writer.await {
        warn!(error = %e, "settings writer failed");
    }
    served
}

/// Run the picker display, labelling hot keys under `layout` if given.
async fn picker_display(socket: PathBuf, layout: Option<PathBuf>) -> Result<()> {
    let layout = match layout {
        Some(path) => settings::load_layout(&path).await?,
        None => KeyboardLayoutMap::default(),
    };
    display::<PickerView>(socket, print_picker, |view| view.set_layout(layout)).await
}

/// Connect as a display of type `P`, printing each update with `render`.
/// `setup` sees the view before the first snapshot.
async fn display<P>(socket: PathBuf, render: fn(&P), setup: impl FnOnce(&mut P)) -> Result<()>
where
    P: Projection + Send + 'static,
{
    let DisplayLink { outbox, inbox } = Connection::connect(&socket, P::LANE).await?.into_link();
    let mut display = Display::<P>::new(outbox.clone())?;
    setup(display.view_mut());
    let lane = P::LANE;

    // Stdin lines are intents. Anything the display may not send is refused
    // locally by a second adapter sharing the outbox.
    let sender = Display::<P>::new(outbox)?;
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Action>(&line) {
                Ok(action) => {
                    if !sender.send(action) {
                        warn!(lane = lane.as_str(), "intent not sent");
                    }
                }
                Err(e) => warn!(error = %e, "not an action"),
            }
        }
    });

    display.run(inbox, render).await;
    info!(lane = lane.as_str(), "coordinator closed the connection");
    Ok(())
}

/// One line per picker update.
fn print_picker(view: &PickerView) {
    let tiles: Vec<String> = view
        .tiles()
        .into_iter()
        .map(|a| match view.hot_key_label(a) {
            Some(label) => format!("{}[{}]", a.id, label),
            None => a.id.clone(),
        })
        .collect();
    println!(
        "{:?} url={:?} tiles={} setup={} height={}",
        view.status(),
        view.url(),
        tiles.join(" "),
        view.is_setup(),
        view.window_height()
    );
}

/// One line per URL bar update.
fn print_url_bar(view: &UrlBarView) {
    if view.is_empty() {
        println!("(no url)");
        return;
    }
    let parts = view.parts();
    let slashes = if parts.slashes { "//" } else { "" };
    println!("{}{} {} {}", parts.protocol, slashes, parts.host, parts.rest);
}

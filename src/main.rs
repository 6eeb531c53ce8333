use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use patient_chat::common::SocketEvent;
use patient_chat::config::{self, AppConfig};
use patient_chat::ui::ChatApp;
use patient_chat::{ChatClient, ChatError, ChatResult, ClientOptions};

#[derive(Parser)]
#[command(
    name = "patient_chat",
    version,
    about = "Patient-scoped WebSocket chat client"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Chat server host[:port], overrides the config file
    #[arg(long, env = "PATIENT_CHAT_HOST")]
    host: Option<String>,
    /// Patient identifier the session is scoped to
    #[arg(long, env = "PATIENT_CHAT_PATIENT_ID")]
    patient_id: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Read messages from stdin and print history entries to stdout (no window)
    Headless,
}

#[tokio::main]
async fn main() -> ChatResult<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(host) = cli.host {
        app_config.host = host;
    }
    let patient_id = cli
        .patient_id
        .or_else(|| app_config.patient_id.clone())
        .ok_or(ChatError::MissingPatientId)?;

    let (client, event_rx) = ChatClient::connect(
        &app_config.host,
        patient_id,
        ClientOptions::from(&app_config),
    );

    if cli.mode == Some(Mode::Headless) {
        return run_headless(client, event_rx).await;
    }

    run_desktop(&app_config, client, event_rx)
}

fn run_desktop(
    app_config: &AppConfig,
    client: ChatClient,
    event_rx: mpsc::Receiver<SocketEvent>,
) -> ChatResult<()> {
    let options = eframe::NativeOptions::default();
    let mut startup = Some((client, event_rx));

    eframe::run_native(
        &app_config.window_title,
        options,
        Box::new(move |cc| {
            let (client, event_receiver) = startup
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Chat window opened for patient {}", client.patient_id());

            Ok(Box::new(ChatApp::new(cc, client, event_receiver)))
        }),
    )
    .map_err(|err| ChatError::Ui(err.to_string()))?;
    Ok(())
}

async fn run_headless(
    mut client: ChatClient,
    mut event_rx: mpsc::Receiver<SocketEvent>,
) -> ChatResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut printed = 0;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        client.state_mut().input_text = line;
                        client.submit();
                    }
                    None => {
                        stdin_open = false;
                        client.close();
                    }
                }
            }
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                let closed = matches!(event, SocketEvent::Closed { .. });
                client.handle_event(event);

                for entry in &client.state().history[printed..] {
                    println!("[{}] {}", entry.timestamp, entry.sender);
                    print!("{}", entry.html);
                }
                printed = client.state().history.len();

                if closed {
                    break;
                }
            }
        }
    }

    Ok(())
}

//! Terminal chat client for a chat webhook
//!
//! Reads one message per line from stdin and prints the transcript to
//! stdout. Logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webhook_chat::input::spawn_stdin_reader;
use webhook_chat::render::TerminalRenderer;
use webhook_chat::{ChatConfig, ChatContext, ChatHandle, HttpTransport, LoggingTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webhook_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let settings = ChatConfig::from_env().validate()?;
    tracing::info!(
        endpoint = %settings.endpoint,
        timeout_secs = settings.timeout.as_secs(),
        "Configuration loaded"
    );

    let transport = LoggingTransport::new(HttpTransport::new(
        settings.endpoint.clone(),
        settings.timeout,
    )?);
    let handle = ChatHandle::spawn(ChatContext::generate(), transport);

    for line in TerminalRenderer::header(settings.endpoint.as_str()) {
        println!("{line}");
    }

    // Re-render on every snapshot change until the session stops
    let mut snapshots = handle.watch();
    let render_task = tokio::spawn(async move {
        let mut renderer = TerminalRenderer::new();
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            for line in renderer.render(&snapshot) {
                println!("{line}");
            }
        }
    });

    let mut lines = spawn_stdin_reader()?;
    let mut interrupted = false;
    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) => handle.submit(line),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                interrupted = true;
                break;
            }
        }
    }

    // Let the last reply land before leaving on end of input
    if !interrupted {
        handle.wait_until_settled().await;
    }

    drop(handle);
    render_task.await?;

    Ok(())
}

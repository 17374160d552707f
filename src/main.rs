use tracing_subscriber::EnvFilter;

mod api;
mod audio;
mod config;
mod console;
mod controller;
mod error;
mod page;

use api::HttpSpeechApi;
use config::Config;
use controller::PageController;
use page::TerminalPage;

#[tokio::main]
async fn main() {
    // Logs go to stderr, stdout is the page
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    tracing::info!("tts-page v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Speech server: {}", config.server_url);

    let api = match HttpSpeechApi::new(config.server_url.clone()) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let page = TerminalPage::new(config.initial_form());
    #[cfg(feature = "audio-playback")]
    let page = if config.autoplay {
        page.with_autoplay(api.clone())
    } else {
        page
    };
    #[cfg(not(feature = "audio-playback"))]
    if config.autoplay {
        tracing::info!("Built without audio playback, audio URLs are only printed");
    }

    let controller = PageController::new(api, page);
    let mounted = controller.mount();

    if let Err(e) = console::run(&controller, &mounted).await {
        tracing::error!("Console failed: {}", e);
    }

    mounted.unmount().await;
}

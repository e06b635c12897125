//! Stackpage CLI application.
//!
//! Loads the stack configuration, initialises logging, and dispatches the
//! parsed command.

use std::path::Path;
use std::sync::Arc;

use stackpage_core::{Error, PageRecord, Result, StackConfig};
use stackpage_fetch::{
    GraphqlResponse, GraphqlTransport, HttpTransport, LivePreview, LivePreviewConfig,
    MockTransport, PageFetcher, PageSink, PreviewSession,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};
use crate::config_handlers;

// ============================================================================
// StackpageCli
// ============================================================================

/// The CLI application bound to one stack configuration.
pub struct StackpageCli {
    name: String,
    config: Arc<StackConfig>,
    version: String,
}

impl StackpageCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = StackConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: StackConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Get a reference to the loaded config.
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Fetch {
                url,
                hash,
                fixture,
                pretty,
            }) => {
                let page = self
                    .fetcher(fixture.as_deref())?
                    .fetch_page(&url, hash.as_deref())
                    .await?;
                println!("{}", render(&page, pretty)?);
                Ok(())
            }
            Some(Command::Endpoints) => {
                let endpoints = self.config.endpoints();
                println!("{}", serde_json::to_string_pretty(&endpoints)?);
                Ok(())
            }
            Some(Command::Preview { url, fixture }) => {
                let fetcher = Arc::new(self.fetcher(fixture.as_deref())?);
                let stdin = BufReader::new(tokio::io::stdin());
                self.preview(fetcher, url, stdin).await
            }
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    /// Build a fetcher over the network, or over a fixture file when given.
    fn fetcher(&self, fixture: Option<&Path>) -> Result<PageFetcher> {
        let transport: Arc<dyn GraphqlTransport> = match fixture {
            Some(path) => {
                tracing::info!(path = %path.display(), "answering from fixture");
                Arc::new(load_fixture(path)?)
            }
            None => Arc::new(HttpTransport::from_config(&self.config)?),
        };
        Ok(PageFetcher::new(&self.config, transport))
    }

    // ------------------------------------------------------------------------
    // Live preview
    // ------------------------------------------------------------------------

    /// Print the bridge config, then keep `url` current while `lines`
    /// deliver entry changes. Returns at end of input.
    async fn preview<R>(&self, fetcher: Arc<PageFetcher>, url: String, lines: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let bridge = LivePreviewConfig::from_config(&self.config, fetcher.endpoints());
        println!("{}", serde_json::to_string(&bridge)?);

        let live_preview = Arc::new(LivePreview::from_config(&self.config));
        let session = PreviewSession::new(fetcher, url, &live_preview, Arc::new(JsonSink));

        if !live_preview.is_enabled() {
            tracing::info!("live preview is disabled; fetching once");
            return session.refresh().await;
        }

        let feed = async {
            let result = feed_changes(&live_preview, lines).await;
            session.shutdown();
            result
        };
        let ((), fed) = tokio::join!(session.run(), feed);
        fed
    }
}

/// Turn each input line into an entry-change notification.
async fn feed_changes<R>(live_preview: &LivePreview, lines: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = lines.lines();
    while let Some(line) = lines.next_line().await? {
        let hash = line.trim();
        if !hash.is_empty() {
            live_preview.set_hash(hash);
        }
        let notified = live_preview.notify_entry_change();
        tracing::debug!(notified, "entry change");
    }
    Ok(())
}

/// Read a GraphQL response envelope from disk.
fn load_fixture(path: &Path) -> Result<MockTransport> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let response: GraphqlResponse = serde_json::from_str(&raw)?;
    Ok(MockTransport::with_response(response))
}

fn render(page: &Option<PageRecord>, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(page)?
    } else {
        serde_json::to_string(page)?
    };
    Ok(json)
}

/// Prints every presented page as one JSON line.
struct JsonSink;

impl PageSink for JsonSink {
    fn present(&self, page: Option<PageRecord>) {
        match render(&page, false) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "could not render page"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! `mfw-dashboard` -- terminal dashboard for the manufacturing workflow
//! engine.
//!
//! Submits batches of sensor readings and measurements, then follows the
//! resulting workflow's status and verdict without manual refresh. Panels
//! are printed to stdout whenever a feed publishes; logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                  |
//! |------------------------|----------|-------------------------|------------------------------|
//! | `WORKFLOW_API_URL`     | no       | `http://localhost:8000` | Workflow engine base URL     |
//! | `REQUEST_TIMEOUT_SECS` | no       | `10`                    | Per-request timeout          |
//! | `RUST_LOG`             | no       | `mfw_dashboard=info,...`| Log filter                   |

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mfw_client::WorkflowApi;
use mfw_dashboard::app::{Dashboard, Flow};
use mfw_dashboard::command::{Command, HELP};
use mfw_dashboard::config::DashboardConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mfw_dashboard=info,mfw_poller=info,mfw_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        request_timeout_secs = config.request_timeout.as_secs(),
        "Starting mfw-dashboard",
    );

    let api = Arc::new(
        WorkflowApi::new(&config.api_url, config.request_timeout)
            .context("Failed to create workflow API client")?,
    );
    let mut dashboard = Dashboard::new(api.clone(), api);

    let mut status_rx = dashboard.subscriptions().status().subscribe();
    let mut results_rx = dashboard.subscriptions().results().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut screen = Screen::default();

    println!("{HELP}");
    screen.show(dashboard.render());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    tracing::info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if matches!(command, Command::Submit(_)) {
                            screen.force(dashboard.begin_submit());
                        }
                        match dashboard.execute(command).await {
                            Flow::Continue(Some(output)) => screen.force(output),
                            Flow::Continue(None) => {}
                            Flow::Quit => break,
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            Ok(()) = status_rx.changed() => screen.show(dashboard.render()),
            Ok(()) = results_rx.changed() => screen.show(dashboard.render()),
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    dashboard.shutdown();
    tracing::info!("mfw-dashboard stopped");
    Ok(())
}

/// Prints renders to stdout, skipping ones identical to the last print.
#[derive(Default)]
struct Screen {
    last: String,
}

impl Screen {
    fn show(&mut self, render: String) {
        if render != self.last {
            self.force(render);
        }
    }

    fn force(&mut self, render: String) {
        println!("{render}");
        self.last = render;
    }
}

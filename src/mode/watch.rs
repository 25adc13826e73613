//! Interactive timeseries mode driven by commands on stdin

use std::path::Path;
use std::process::ExitCode;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::ApiClient;
use crate::orchestrator::{Orchestrator, ViewState, fetch};
use crate::output::{print_error, print_warning};
use crate::toast::{ToastHost, Toaster};

use super::timeseries::present;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchCommand {
    Days(u32),
    Refresh,
    Quit,
}

/// `days N`, `refresh` or `quit`; blank lines are `None`
fn parse_command(line: &str) -> Result<Option<WatchCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let command = match (word, words.next()) {
        ("days", Some(n)) => match n.parse::<u32>() {
            Ok(days) if days > 0 => WatchCommand::Days(days),
            _ => return Err(format!("days must be a positive integer, got '{}'", n)),
        },
        ("days", None) => return Err("usage: days N".to_string()),
        ("refresh", None) => WatchCommand::Refresh,
        ("quit" | "exit", None) => WatchCommand::Quit,
        _ => return Err(format!("unknown command '{}' (try: days N, refresh, quit)", line.trim())),
    };
    if words.next().is_some() {
        return Err(format!("unexpected input after '{}'", word));
    }
    Ok(Some(command))
}

/// Keep the view mounted while stdin is open. In-flight fetches settle after
/// end of input; `quit` unmounts immediately.
pub(crate) async fn run_watch(
    client: &ApiClient,
    days: u32,
    html: Option<&Path>,
    toaster: &Toaster,
    toasts: &mut ToastHost,
    quiet: bool,
) -> ExitCode {
    let mut view = Orchestrator::new(days);
    let mut inflight = FuturesUnordered::new();
    inflight.push(fetch(client, view.mount()));
    present(&view, html, quiet);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            Some((ticket, result)) = inflight.next(), if !inflight.is_empty() => {
                if view.apply(ticket, result) {
                    present(&view, html, quiet);
                }
            }
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(WatchCommand::Days(days))) => {
                        if let Some(ticket) = view.set_days(days) {
                            inflight.push(fetch(client, ticket));
                            present(&view, html, quiet);
                        }
                    }
                    Ok(Some(WatchCommand::Refresh)) => {
                        if let Some(ticket) = view.refresh() {
                            toaster.info(format!("Refreshing the last {} days", view.days()));
                            inflight.push(fetch(client, ticket));
                            present(&view, html, quiet);
                        }
                    }
                    Ok(Some(WatchCommand::Quit)) => break,
                    Ok(None) => {}
                    Err(message) => print_warning(&message),
                },
                Ok(None) => {
                    debug!(pending = inflight.len(), "end of input");
                    input_open = false;
                }
                Err(e) => {
                    print_error(&format!("Failed to read input: {}", e));
                    input_open = false;
                }
            },
            else => break,
        }
        toasts.flush();
    }

    let failed = matches!(view.state(), ViewState::Failed(_));
    view.unmount();
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("days 30"), Ok(Some(WatchCommand::Days(30))));
        assert_eq!(parse_command("  refresh "), Ok(Some(WatchCommand::Refresh)));
        assert_eq!(parse_command("quit"), Ok(Some(WatchCommand::Quit)));
        assert_eq!(parse_command(""), Ok(None));
    }

    #[test]
    fn test_parse_rejects_bad_days() {
        assert!(parse_command("days 0").is_err());
        assert!(parse_command("days -3").is_err());
        assert!(parse_command("days").is_err());
        assert!(parse_command("days 7 8").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = parse_command("zoom in").unwrap_err();
        assert!(err.contains("unknown command"));
    }
}

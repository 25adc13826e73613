//! Delete mode: preview affected records, confirm, delete

use std::io::Write;
use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::{ApiClient, DeletePreview};
use crate::delete::{DeleteFlow, DeleteTarget};
use crate::error::Error;
use crate::output::format_price;
use crate::toast::Toaster;

pub(crate) struct DeleteOptions<'a> {
    pub(crate) store: &'a str,
    pub(crate) item_id: &'a str,
    pub(crate) records: &'a [i64],
    pub(crate) password: Option<&'a str>,
    pub(crate) password_required: bool,
    pub(crate) assume_yes: bool,
}

pub(crate) async fn run_delete(
    client: &ApiClient,
    opts: &DeleteOptions<'_>,
    toaster: &Toaster,
    quiet: bool,
) -> ExitCode {
    let target = DeleteTarget {
        store: opts.store.to_string(),
        item_id: opts.item_id.to_string(),
        record_ids: opts.records.to_vec(),
    };
    let mut flow = match DeleteFlow::new(target, opts.password_required) {
        Ok(flow) => flow,
        Err(e) => return fail(toaster, &e),
    };
    // A missing password is known before anything is sent
    if let Err(e) = flow.validate_password(opts.password) {
        return fail(toaster, &e);
    }

    let preview = match flow.preview(client).await {
        Ok(preview) => preview,
        Err(e) => return fail(toaster, &e),
    };
    print_preview(&flow, &preview, quiet);

    if !opts.assume_yes && !confirm_prompt().await {
        flow.cancel();
        toaster.info("Deletion cancelled");
        return ExitCode::SUCCESS;
    }

    let outcome = flow.confirm(client, opts.password).await;
    debug!(step = ?flow.step(), "delete flow finished");
    match outcome {
        Ok(result) => {
            toaster.success(format!(
                "Deleted {} records and {} events",
                result.deleted_records, result.deleted_events
            ));
            ExitCode::SUCCESS
        }
        Err(e) => fail(toaster, &e),
    }
}

fn fail(toaster: &Toaster, error: &Error) -> ExitCode {
    toaster.error(error.user_message());
    ExitCode::FAILURE
}

fn print_preview(flow: &DeleteFlow, preview: &DeletePreview, quiet: bool) {
    let target = flow.target();
    println!("Delete preview: {}/{}", target.store, target.item_id);
    println!("  Records: {}", preview.record_count);
    println!("  Events:  {}", preview.event_count);
    let range = preview.prices.iter().copied().fold(None, |acc: Option<(f64, f64)>, p| {
        Some(acc.map_or((p, p), |(lo, hi)| (lo.min(p), hi.max(p))))
    });
    if let Some((lo, hi)) = range {
        println!("  Prices:  {} - {}", format_price(lo), format_price(hi));
    }
    if !quiet {
        println!("Deleted records cannot be restored.");
    }
}

/// Ask on stdout, read one line from stdin; only `y`/`yes` confirms
async fn confirm_prompt() -> bool {
    print!("Delete these records? [y/N] ");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
        Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

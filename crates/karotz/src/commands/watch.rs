//! Streaming commands: follow poll updates and push events.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use karotz_core::config::DEFAULT_POLL_INTERVAL;
use karotz_core::{ChannelState, Device, DeviceConfig, DeviceEvent, PollUpdate, Resource};

use crate::cli::{EventsArgs, OutputFormat, WatchArgs};
use crate::config::Ctx;
use crate::error::CliError;
use crate::output;

const GAVE_UP_CHECK: Duration = Duration::from_millis(250);

// ── Line renderers ───────────────────────────────────────────────────

fn structured_line<T: serde::Serialize>(value: &T, ctx: &Ctx) -> Result<String, CliError> {
    // One document per line for JSON, so output can be piped.
    let format = match ctx.format {
        OutputFormat::Json | OutputFormat::JsonCompact => OutputFormat::JsonCompact,
        other => other,
    };
    let rendered = output::render_single(format, value, |_| String::new(), |_| String::new())?;
    Ok(if format == OutputFormat::Yaml {
        format!("---\n{rendered}")
    } else {
        rendered
    })
}

fn update_line(update: &PollUpdate, ctx: &Ctx) -> Result<String, CliError> {
    match ctx.format {
        OutputFormat::Table => Ok(match update {
            PollUpdate::Snapshot(s) => {
                let mut line = format!(
                    "{}  #{:<5} {}",
                    s.timestamp.format("%H:%M:%S"),
                    s.sequence,
                    output::status_label(s.status, ctx.color)
                );
                if !s.errors.is_empty() {
                    let failed: Vec<&str> = s.errors.keys().map(|r| r.key()).collect();
                    line.push_str(&format!("  stale: {}", failed.join(", ")));
                }
                line
            }
            PollUpdate::Failed { at, errors } => format!(
                "{}  {:<6} {}  ({} reads failed)",
                at.format("%H:%M:%S"),
                "-",
                output::status_label(update.status(), ctx.color),
                errors.len()
            ),
        }),
        OutputFormat::Plain => Ok(update.status().to_string()),
        _ => structured_line(update, ctx),
    }
}

fn event_line(event: &DeviceEvent, ctx: &Ctx) -> Result<String, CliError> {
    match ctx.format {
        OutputFormat::Table => Ok(format!(
            "{}  event  {}  {}",
            event.received_at.format("%H:%M:%S"),
            event.event_type.as_deref().unwrap_or("-"),
            event.payload
        )),
        OutputFormat::Plain => Ok(event.payload.to_string()),
        _ => structured_line(event, ctx),
    }
}

// ── watch ────────────────────────────────────────────────────────────

/// Poll on an interval and print every outcome until Ctrl-C or `--count`.
pub async fn watch(args: WatchArgs, mut config: DeviceConfig, ctx: &Ctx) -> Result<(), CliError> {
    if let Some(interval) = args.interval {
        config.poll_interval = interval;
    }
    if config.poll_interval.is_zero() {
        config.poll_interval = DEFAULT_POLL_INTERVAL;
    }
    config.events_enabled = args.events;

    let device = Device::new(config)?;
    // Subscribe first so the connect's own cycle is printed too.
    let mut updates = device.updates();
    let mut events = device.events();
    device.connect().await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seen = 0usize;
    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            update = updates.recv() => match update {
                Ok(update) => {
                    match update_line(&update, ctx) {
                        Ok(line) => output::print_output(&line, ctx.quiet),
                        Err(e) => break Err(e),
                    }
                    seen += 1;
                    if args.count.is_some_and(|n| seen >= n) {
                        break Ok(());
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "watch fell behind"),
                Err(RecvError::Closed) => break Ok(()),
            },
            event = events.recv(), if args.events => match event {
                Ok(event) => match event_line(&event, ctx) {
                    Ok(line) => output::print_output(&line, ctx.quiet),
                    Err(e) => break Err(e),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output fell behind"),
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    device.disconnect().await;
    result
}

// ── events ───────────────────────────────────────────────────────────

/// Print push events until Ctrl-C, `--count`, or the channel gives up.
pub async fn events(args: EventsArgs, mut config: DeviceConfig, ctx: &Ctx) -> Result<(), CliError> {
    config.events_enabled = true;
    config.poll_interval = Duration::ZERO;
    config.resources = vec![Resource::Info];
    let max_attempts = config.reconnect.max_attempts;

    let device = Device::new(config)?;
    let mut events = device.events();
    device.connect().await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut check = tokio::time::interval(GAVE_UP_CHECK);

    let mut seen = 0usize;
    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            event = events.recv() => match event {
                Ok(event) => {
                    match event_line(&event, ctx) {
                        Ok(line) => output::print_output(&line, ctx.quiet),
                        Err(e) => break Err(e),
                    }
                    seen += 1;
                    if args.count.is_some_and(|n| seen >= n) {
                        break Ok(());
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output fell behind"),
                Err(RecvError::Closed) => break Ok(()),
            },
            _ = check.tick() => {
                if device.event_channel_state() == ChannelState::GaveUp {
                    break Err(CliError::EventsGaveUp { attempts: max_attempts });
                }
            }
        }
    };

    device.disconnect().await;
    result
}

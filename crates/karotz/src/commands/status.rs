//! Read-side commands: status, info, get.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use karotz_core::{CoreError, Device, DeviceConfig, DeviceDescriptor, Resource, Snapshot};

use super::print_value;
use crate::cli::ResourceArg;
use crate::config::Ctx;
use crate::error::CliError;
use crate::output;

impl From<ResourceArg> for Resource {
    fn from(arg: ResourceArg) -> Self {
        match arg {
            ResourceArg::Info => Self::Info,
            ResourceArg::State => Self::State,
            ResourceArg::Leds => Self::Leds,
            ResourceArg::Ears => Self::Ears,
            ResourceArg::Rfid => Self::Rfid,
            ResourceArg::Tts => Self::Tts,
            ResourceArg::Pictures => Self::Pictures,
            ResourceArg::Sounds => Self::Sounds,
            ResourceArg::Apps => Self::Apps,
        }
    }
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView {
    descriptor: Option<DeviceDescriptor>,
    snapshot: Arc<Snapshot>,
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "State")]
    state: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn resource_rows(snapshot: &Snapshot, resources: &[Resource]) -> Vec<ResourceRow> {
    resources
        .iter()
        .map(|&resource| {
            let (state, value) = match (snapshot.get(resource), snapshot.errors.get(&resource)) {
                (Some(payload), None) => ("ok", output::cell(payload)),
                (Some(payload), Some(_)) => ("stale", output::cell(payload)),
                (None, Some(err)) => ("failed", err.clone()),
                (None, None) => ("-", String::new()),
            };
            ResourceRow {
                resource: resource.to_string(),
                state,
                value,
            }
        })
        .collect()
}

fn status_detail(view: &StatusView, resources: &[Resource], color: bool) -> String {
    let mut out = String::new();
    if let Some(d) = &view.descriptor {
        let _ = writeln!(out, "Name:       {}", d.name);
        let _ = writeln!(out, "Model:      {}", d.model);
        let _ = writeln!(out, "Serial:     {}", d.serial);
        let _ = writeln!(out, "Id:         {}", d.id);
        let _ = writeln!(
            out,
            "Firmware:   {}",
            d.sw_version.as_deref().unwrap_or("unknown")
        );
    }
    let snapshot = &view.snapshot;
    let _ = writeln!(
        out,
        "Status:     {}",
        output::status_label(snapshot.status, color)
    );
    let _ = writeln!(
        out,
        "Polled at:  {} (#{})\n",
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        snapshot.sequence
    );

    let rows = resource_rows(snapshot, resources);
    out.push_str(
        &tabled::Table::new(rows)
            .with(tabled::settings::Style::rounded())
            .to_string(),
    );
    out
}

/// One poll cycle over every configured resource.
pub async fn status(config: DeviceConfig, ctx: &Ctx) -> Result<(), CliError> {
    let resources = config.resources.clone();
    let view = Device::oneshot(config, |device| async move {
        let snapshot = device.snapshot().ok_or_else(|| CoreError::UpdateFailed {
            errors: Default::default(),
        })?;
        Ok(StatusView {
            descriptor: snapshot.descriptor(),
            snapshot,
        })
    })
    .await
    .map_err(|e| match e {
        // The failing first cycle only logs; say so instead of "0 reads".
        CoreError::UpdateFailed { .. } => {
            CliError::UpdateFailed("Poll cycle failed: no resource could be read".into())
        }
        other => other.into(),
    })?;

    let out = output::render_single(
        ctx.format,
        &view,
        |v| status_detail(v, &resources, ctx.color),
        |v| v.snapshot.status.to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Info / get ───────────────────────────────────────────────────────

/// Raw info block. A probe, so no session is opened.
pub async fn info(config: DeviceConfig, ctx: &Ctx) -> Result<(), CliError> {
    let device = Device::new(config)?;
    let info = device
        .client()
        .get_info_raw()
        .await
        .map_err(CoreError::from)?;
    print_value(&info, ctx)
}

/// Read one resource outside the poll cycle.
pub async fn get(mut config: DeviceConfig, resource: Resource, ctx: &Ctx) -> Result<(), CliError> {
    config.resources = vec![Resource::Info];
    let value = Device::oneshot(config, |device| async move {
        Ok(device.client().read(resource).await?)
    })
    .await?;
    print_value(&value, ctx)
}

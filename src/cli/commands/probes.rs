use crate::cli::PipelineArgs;
use crate::cli::ui;
use crate::model::ProbeStatus;
use clap::Parser;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

const MAX_VALUE_WIDTH: usize = 48;

#[derive(Parser, Debug)]
#[command(name = "probes", about = "Show every probe and what it collected")]
pub struct ProbesCommand {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub async fn execute(command: ProbesCommand) -> anyhow::Result<()> {
    let pipeline = command.pipeline.build().await?;
    let service = pipeline.service;
    let fingerprint = service.fingerprint(pipeline.config).await?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Key", "Tier", "Mode", "Status", "Value"]);

    for (index, (probe, result)) in service
        .registry()
        .probes()
        .iter()
        .zip(&fingerprint.results)
        .enumerate()
    {
        let status_color = match result.status() {
            ProbeStatus::Ok => Color::Green,
            ProbeStatus::Unsupported => Color::DarkGrey,
            ProbeStatus::Timeout => Color::Yellow,
            ProbeStatus::Error => Color::Red,
        };
        let value = result.value().or(result.detail()).unwrap_or("-");

        table.add_row(vec![
            Cell::new(index),
            Cell::new(probe.key()),
            Cell::new(probe.tier()),
            Cell::new(probe.mode()),
            Cell::new(result.status()).fg(status_color),
            Cell::new(truncate(value, MAX_VALUE_WIDTH)),
        ]);
    }

    println!("{table}");
    ui::display_fingerprint(&fingerprint);

    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut short: String = value.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

//! The `lexideck stats` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use lexideck_core::statistics::{self, RecencyBucket, StatisticsSnapshot};
use lexideck_core::traits::CardStore;

pub async fn execute(deck: i64, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = super::open(config_path)?;
    let deck = super::require_deck(store.as_ref(), deck).await?;
    let cards = store.cards_for_deck(deck.id).await?;
    let stats = statistics::compute(&cards, Utc::now());

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&stats)?),
        "markdown" | "md" => println!("{}", stats.to_markdown(&deck.name)),
        "table" => {
            println!("{} ({} cards)", deck.name, stats.total_cards);
            println!("{}", summary_table(&stats));
        }
        fmt => anyhow::bail!("Unknown format: {fmt}"),
    }

    Ok(())
}

fn summary_table(stats: &StatisticsSnapshot) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Known"), Cell::new(stats.known_cards)]);
    table.add_row(vec![Cell::new("Unknown"), Cell::new(stats.unknown_cards)]);
    table.add_row(vec![
        Cell::new("Accuracy"),
        Cell::new(format!("{:.1}%", stats.average_accuracy * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Last review"),
        Cell::new(
            stats
                .last_reviewed_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".into()),
        ),
    ]);
    for bucket in RecencyBucket::ALL {
        table.add_row(vec![
            Cell::new(format!("Reviewed {bucket}")),
            Cell::new(stats.buckets.get(bucket)),
        ]);
    }
    table
}

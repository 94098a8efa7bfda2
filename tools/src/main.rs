//! datagen-runner: headless synthetic banking dataset generator.
//!
//! Usage:
//!   datagen-runner --seed 12345 --customers 500 --months 24 --out ./generated_data
//!   datagen-runner --config generator.json --json

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::env;
use synthbank_core::{config::GeneratorConfig, engine::GenerationEngine};

#[derive(serde::Serialize)]
struct RunSummary {
    seed: u64,
    customers: usize,
    anomalous_customers: usize,
    accounts: usize,
    transactions: usize,
    tagged_transactions: usize,
    address_batches: usize,
    update_batches: usize,
    lifecycle_events: usize,
    events_by_type: BTreeMap<&'static str, usize>,
    status_records: usize,
    output_directory: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json_output = args.iter().any(|a| a == "--json");

    let mut config = match str_arg(&args, "--config") {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(n) = opt_arg::<usize>(&args, "--customers") {
        config.num_customers = n;
    }
    if let Some(months) = opt_arg::<u32>(&args, "--months") {
        config.generation_period_months = months;
    }
    if let Some(date) = str_arg(&args, "--start-date") {
        config.start_date = Some(date.parse::<NaiveDate>()?);
    }
    if let Some(date) = str_arg(&args, "--as-of") {
        config.as_of_date = date.parse::<NaiveDate>()?;
    }
    if let Some(out) = str_arg(&args, "--out") {
        config.output_directory = out.to_string();
    }

    if !json_output {
        println!("synthbank datagen-runner");
        println!("  seed:       {seed}");
        println!("  customers:  {}", config.num_customers);
        println!("  months:     {}", config.generation_period_months);
        println!("  period:     {} .. {}", config.start_date(), config.end_date());
        println!("  output:     {}", config.output_directory);
        println!();
    }

    let engine = GenerationEngine::new(config.clone(), seed);
    let data = engine.run()?;
    engine.write_all(&data)?;
    log::info!("run complete, output in {}", config.output_directory);

    let mut events_by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
    for event in &data.events {
        *events_by_type.entry(event.event_type.as_str()).or_default() += 1;
    }

    let summary = RunSummary {
        seed,
        customers: data.customers.len(),
        anomalous_customers: data.profiles.len(),
        accounts: data.accounts.len(),
        transactions: data.transactions.len(),
        tagged_transactions: data.transactions.iter().filter(|t| t.is_tagged()).count(),
        address_batches: data.address_batches.len(),
        update_batches: data.update_batches.len(),
        lifecycle_events: data.events.len(),
        events_by_type,
        status_records: data.statuses.len(),
        output_directory: config.output_directory.clone(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== RUN SUMMARY ===");
        println!("  customers:       {}", summary.customers);
        println!("  anomalous:       {}", summary.anomalous_customers);
        println!("  accounts:        {}", summary.accounts);
        println!("  transactions:    {}", summary.transactions);
        println!("  tagged txns:     {}", summary.tagged_transactions);
        println!("  address batches: {}", summary.address_batches);
        println!("  update batches:  {}", summary.update_batches);
        println!("  events:          {}", summary.lifecycle_events);
        for (event_type, count) in &summary.events_by_type {
            println!("    {event_type:<18} {count}");
        }
        println!("  status records:  {}", summary.status_records);
        println!("  output:          {}", summary.output_directory);
    }

    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    opt_arg(args, flag).unwrap_or(default)
}

fn opt_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use budget_app::app::{self, ClientCatalog, ProductCatalog, ResultsTable};
use budget_app::config::AppConfig;
use budget_app::logging;
use budget_app::utils::parse_item_spec;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Budget pricing calculator.
///
/// Prices products for a client using the client's state ICMS and repasse
/// rates and a profit margin, and exports the budget as PDF or CSV.
#[derive(Debug, Parser)]
#[command(name = "budget", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./budget.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding clients.json, products.json and rates.json.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory exported budgets are written to.
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `info,budget_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the client catalogue.
    Clients,

    /// List the product catalogue.
    Products,

    /// Price a budget and optionally export it.
    Quote {
        /// Client id; omit to price without state taxes.
        #[arg(long)]
        client: Option<u32>,

        /// Product to add, as PRODUCT_ID or PRODUCT_ID:QUANTITY. Repeatable.
        #[arg(long = "item", value_name = "PRODUCT[:QTY]")]
        items: Vec<String>,

        /// Profit margin in percent.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        margin: String,

        /// Write orcamento.pdf to the output directory.
        #[arg(long)]
        pdf: bool,

        /// Write orcamento.csv to the output directory.
        #[arg(long)]
        csv: bool,
    },
}

impl Cli {
    /// Command-line flags take precedence over the configuration file.
    fn apply_overrides(
        &self,
        config: &mut AppConfig,
    ) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.output_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
        if let Some(file) = &self.log_file {
            config.log_file = Some(file.clone());
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    if let Some(level) = &config.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(file) = &config.log_file {
        logging::enable_file_logging(file)?;
    }
    debug!("effective configuration:\n{config}");

    let mut session = app::load_session(&config).with_context(|| {
        format!(
            "Failed to load reference data from: {}",
            config.data_dir.display()
        )
    })?;

    match cli.command {
        Command::Clients => print!("{}", ClientCatalog(&session.data().clients)),
        Command::Products => print!("{}", ProductCatalog(&session.data().products)),
        Command::Quote {
            client,
            items,
            margin,
            pdf,
            csv,
        } => {
            session.select_client_by_id(client)?;
            for spec in &items {
                let (product_id, quantity) = parse_item_spec(spec)?;
                session.add_product_by_id(product_id)?;
                let index = session.budget().items().len() - 1;
                session.set_quantity(index, quantity)?;
            }
            session.set_margin_text(&margin)?;

            let lines = session.results().context("Failed to price budget")?;
            let totals = session.totals()?;
            print!(
                "{}",
                ResultsTable {
                    client: session.budget().client(),
                    lines: &lines,
                    totals: &totals,
                }
            );

            if csv {
                let path = session
                    .export_csv(&config.output_dir)
                    .context("Failed to export CSV")?;
                info!("CSV saved to {}", path.display());
            }
            if pdf {
                let path = session
                    .export_pdf(&config.output_dir)
                    .context("Failed to export PDF")?;
                info!("PDF saved to {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn quote_accepts_repeated_items_and_negative_margin() {
        let cli = Cli::parse_from([
            "budget", "quote", "--client", "1", "--item", "1:2", "--item", "3", "--margin",
            "-5", "--csv",
        ]);

        match cli.command {
            Command::Quote {
                client,
                items,
                margin,
                pdf,
                csv,
            } => {
                assert_eq!(client, Some(1));
                assert_eq!(items, vec!["1:2", "3"]);
                assert_eq!(margin, "-5");
                assert!(!pdf);
                assert!(csv);
            }
            other => panic!("expected quote, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_config_file() {
        let cli = Cli::parse_from(["budget", "--out-dir", "exports", "clients", "--log-level", "debug"]);
        let mut config = AppConfig::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }
}

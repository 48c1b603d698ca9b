//! Command line definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use bizbooks_core::{DocumentKind, MovementType};

#[derive(Debug, Parser)]
#[command(name = "bizbooks")]
#[command(about = "BizBooks books of record: invoices, quotations, challans and stock")]
#[command(version)]
pub struct Cli {
    /// Config file (default: bizbooks.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the storage backend, location and row counts
    Info,

    /// Write the database to storage
    Save,

    /// Export a copy of the database
    Export {
        /// File or directory to write to (default: current directory)
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Replace the database with an exported copy
    Import {
        /// Database file to import
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// List records of one kind in storage order
    List {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Only records of this company (documents and vouchers)
        #[arg(long)]
        company: Option<String>,
    },

    /// Show the next document number
    NextNumber {
        /// invoice, quotation or challan
        kind: DocumentKind,

        /// Company to number for (default: the selected company)
        #[arg(long)]
        company: Option<String>,
    },

    /// Record a stock movement and save
    Stock {
        product_id: String,

        /// in or out
        direction: MovementType,

        quantity: f64,

        #[arg(long, default_value = "")]
        reference: String,
    },

    /// Fill an empty database with demo records and save
    Seed {
        #[arg(long, default_value_t = 12)]
        products: usize,

        #[arg(long, default_value_t = 3)]
        invoices: usize,
    },
}

/// Record kinds that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Companies,
    Customers,
    Products,
    Invoices,
    Quotations,
    Challans,
    Vouchers,
    Inventory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_stock_movement() {
        let cli = Cli::parse_from(["bizbooks", "stock", "p-1", "out", "3", "--reference", "INV-4"]);
        match cli.command {
            Command::Stock {
                product_id,
                direction,
                quantity,
                reference,
            } => {
                assert_eq!(product_id, "p-1");
                assert_eq!(direction, MovementType::Out);
                assert_eq!(quantity, 3.0);
                assert_eq!(reference, "INV-4");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parses_document_kind_and_global_flags() {
        let cli = Cli::parse_from(["bizbooks", "next-number", "challan", "--pretty"]);
        assert!(cli.pretty);
        assert!(matches!(
            cli.command,
            Command::NextNumber {
                kind: DocumentKind::Challan,
                company: None
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["bizbooks", "next-number", "receipt"]).is_err());
        assert!(Cli::try_parse_from(["bizbooks", "list", "sales"]).is_err());
    }
}

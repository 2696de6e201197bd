//! `roseql` — a thin CLI over `Database`.
//!
//! There's no SQL parser feeding `select`/`load`; this binary is the
//! ambient "something to run the engine with" in its place, so every
//! subcommand takes its predicates as flags rather than a query string.
//! The multi-subcommand shape follows `vvoss-dev-reedbase`'s
//! `src/bin/reedbase.rs`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use query_engine::planner::{Attr, Op, Predicate, Selector};
use query_engine::types::Value;
use query_engine::Database;

#[derive(Parser)]
#[command(name = "roseql")]
#[command(version, about = "Index-aware selection over a B+Tree-backed table store", long_about = None)]
struct Cli {
    /// Path to the database directory (holds one `.tbl`/`.idx` pair per table).
    #[arg(short, long, default_value = "./roseql-data")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a table, optionally with a secondary index on its key column.
    CreateTable {
        table: String,
        #[arg(long)]
        index: bool,
    },

    /// Append a single (key, value) row directly.
    Insert { table: String, key: i32, value: String },

    /// Bulk-load `<key>,<value>` lines from a file into a table.
    Load { table: String, loadfile: PathBuf },

    /// Run a selection: projection, plus zero or more `attr op literal` predicates.
    Select {
        table: String,

        /// key | value | star | count
        #[arg(long, default_value = "star")]
        selector: String,

        /// Repeatable `attr:op:literal`, e.g. `key:gt:10` or `value:eq:hello`.
        #[arg(long = "where")]
        predicates: Vec<String>,
    },

    /// List every table known to the catalog.
    Tables,
}

fn parse_selector(s: &str) -> Result<Selector, String> {
    match s {
        "key" => Ok(Selector::Key),
        "value" => Ok(Selector::Value),
        "star" => Ok(Selector::Star),
        "count" => Ok(Selector::Count),
        other => Err(format!("unknown selector '{}' (expected key|value|star|count)", other)),
    }
}

fn parse_predicate(s: &str) -> Result<Predicate, String> {
    let parts: Vec<&str> = s.splitn(3, ':').collect();
    let [attr, op, literal] = parts[..] else {
        return Err(format!("predicate '{}' must be 'attr:op:literal'", s));
    };

    let attr = match attr {
        "key" => Attr::Key,
        "value" => Attr::Value,
        other => return Err(format!("unknown predicate attribute '{}' (expected key|value)", other)),
    };
    let op = match op {
        "eq" => Op::Eq,
        "ne" => Op::Ne,
        "lt" => Op::Lt,
        "le" => Op::Le,
        "gt" => Op::Gt,
        "ge" => Op::Ge,
        other => return Err(format!("unknown predicate operator '{}'", other)),
    };
    let value = match attr {
        Attr::Key => literal
            .parse::<i32>()
            .map(Value::Integer)
            .map_err(|e| format!("key literal '{}' is not an integer: {}", literal, e))?,
        Attr::Value => Value::Varchar(literal.to_string()),
    };

    Ok(Predicate::new(attr, op, value))
}

fn run(cli: Cli) -> query_engine::Result<()> {
    let dir = cli.dir.to_string_lossy().into_owned();
    let db = Database::open(&dir)?;

    match cli.command {
        Commands::CreateTable { table, index } => {
            db.create_table(&table, index)?;
            tracing::info!(%table, index, "table created");
        }
        Commands::Insert { table, key, value } => {
            let locator = db.insert(&table, key, &value)?;
            println!("inserted at page {} slot {}", locator.page_id, locator.slot_id);
        }
        Commands::Load { table, loadfile } => {
            let loaded = db.load(&table, &loadfile.to_string_lossy())?;
            println!("loaded {} rows", loaded);
        }
        Commands::Select { table, selector, predicates } => {
            let selector = parse_selector(&selector).map_err(query_engine::QueryError::ExecutionError)?;
            let predicates = predicates
                .iter()
                .map(|s| parse_predicate(s))
                .collect::<Result<Vec<_>, _>>()
                .map_err(query_engine::QueryError::ExecutionError)?;
            for line in db.select(&table, selector, &predicates)? {
                println!("{}", line);
            }
        }
        Commands::Tables => {
            for table in db.list_tables() {
                println!("{}", table);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("roseql: {}", err);
            ExitCode::FAILURE
        }
    }
}

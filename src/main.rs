use clap::{Parser, Subcommand};

mod aggregate;
mod db;
mod error;
mod hierarchy;
mod log;
mod path;
mod view;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "datamove-viz")]
#[command(about = "Data-movement hierarchy visualizer backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate movement onto the hierarchy and emit the JSON document.
    Report {
        /// SQLite database holding the layout and movement tables.
        #[arg(long)]
        db: String,

        /// Restrict aggregation to movement rows with this tag.
        #[arg(long)]
        tag: Option<String>,

        /// Output file; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// List the distinct movement tags (selector for the UI).
    Tags {
        #[arg(long)]
        db: String,
    },

    /// Build the database from a raw DATAMOVE trace log.
    Load {
        #[arg(long)]
        log: String,

        #[arg(long)]
        db: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report { db, tag, out } => {
            let conn = db::open(&db)?;

            // 1) Build the hierarchy from the layout table.
            let pairs = db::fetch_layout(&conn)?;
            let mut tree = hierarchy::Tree::build(&pairs)?;

            // 2) Charge the (optionally tag-filtered) movement rows.
            let records = db::fetch_movement(&conn, tag.as_deref())?;
            let stats = aggregate::apply_movements(&mut tree, &records);
            if stats.skipped > 0 {
                eprintln!(
                    "WARN: skipped {} of {} movement records",
                    stats.skipped,
                    stats.applied + stats.skipped
                );
            }

            // 3) Serialize.
            let doc = view::render_document(&tree);
            let json = serde_json::to_string_pretty(&doc)?;
            match out {
                Some(out) => {
                    std::fs::write(&out, json)?;
                    println!("Wrote {}", out);
                }
                None => println!("{}", json),
            }
        }

        Commands::Tags { db } => {
            let conn = db::open(&db)?;
            let tags = db::list_tags(&conn)?;
            println!("{}", serde_json::to_string(&tags)?);
        }

        Commands::Load { log, db } => {
            let data = log::parse_trace_file(&log)?;
            if data.skipped > 0 {
                eprintln!("WARN: dropped {} unresolvable movement lines", data.skipped);
            }

            let conn = db::open(&db)?;
            db::init_schema(&conn)?;
            db::insert_layout(&conn, &data.layout)?;
            db::insert_movement(&conn, &data.movements)?;
            println!(
                "Loaded {} layout rows and {} movement rows into {}",
                data.layout.len(),
                data.movements.len(),
                db
            );
        }
    }

    Ok(())
}

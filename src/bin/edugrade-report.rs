use std::path::PathBuf;

use clap::Parser;
use edugrade::{
    config::Config,
    metrics::ReportCard,
    remark::{OpenAiDrafter, draft_remark},
    store::RecordStore,
    utils::init_log,
};

#[derive(Debug, clap::Parser)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Print the student roster
    List,
    /// Print a student's report card as CSV
    Card { id: String },
    /// Draft a remark for a student with the configured AI provider
    Draft { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let _guard = init_log(config.log_dir.clone())?;
    let store = RecordStore::seeded();

    match args.command {
        Commands::List => {
            for student in store.list_students() {
                println!(
                    "{}\t{}\t{}\t{}",
                    student.id, student.roll_no, student.name, student.department
                );
            }
        }
        Commands::Card { id } => {
            let student = store
                .student(&id)
                .ok_or_else(|| anyhow::anyhow!("student {} not found", id))?;
            ReportCard::new(student, store.list_subjects()).write_csv(std::io::stdout())?;
        }
        Commands::Draft { id } => {
            let student = store
                .student(&id)
                .ok_or_else(|| anyhow::anyhow!("student {} not found", id))?;
            let drafter = OpenAiDrafter::new(&config.ai);
            let text = draft_remark(&drafter, student, store.list_subjects()).await;
            println!("{}", text);
        }
    }
    Ok(())
}

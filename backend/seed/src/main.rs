use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    days_before: u32,

    days_after: u32,

    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, value_delimiter = ',', default_value = "electronics,clothing,groceries")]
    categories: Vec<String>,

    #[arg(long, default_value_t = 5)]
    count: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let plan = seed::SeedPlan {
        days_before: args.days_before,
        days_after: args.days_after,
        categories: args.categories,
        count: args.count,
    };

    seed::load_sales(&args.data_dir, &plan).await
}

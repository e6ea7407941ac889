mod build_dict;

use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "build-dict",
    about = "Build the tonepin candidate dictionary from CC-CEDICT and unigram counts"
)]
struct Args {
    /// CC-CEDICT dictionary file
    #[arg(long)]
    cedict: PathBuf,

    /// Google-ngram style unigram counts (word<TAB>year,count,volumes ...).
    /// Without it, candidates keep their source order.
    #[arg(long)]
    unigrams: Option<PathBuf>,

    /// Output directory for dict.fst + dict.bincode
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// Also write the JSON interchange dictionary to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let unigrams = match &args.unigrams {
        Some(path) => build_dict::load_unigrams(path)?,
        None => HashMap::new(),
    };
    let entries = build_dict::load_cedict(&args.cedict)?;
    let table = build_dict::candidate_table(&entries, &unigrams);

    build_dict::write_artifacts(&table, &args.out_dir)?;
    println!(
        "Wrote {} readings to {}",
        table.len(),
        args.out_dir.display()
    );

    if let Some(json_path) = &args.json {
        build_dict::write_json(&table, json_path)?;
        println!("Wrote json dictionary to {}", json_path.display());
    }

    Ok(())
}

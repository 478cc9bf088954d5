use std::process;

use structopt::StructOpt;
use substring_score::{max_substring_score, Result, SuffixTree};

#[derive(StructOpt, Debug)]
struct Options {
    /// Print the suffix tree before the result
    #[structopt(short = "t", long = "tree")]
    tree: bool,
    #[structopt(name = "INPUT")]
    input: String,
}

fn run(options: &Options) -> Result<()> {
    let data = options.input.as_bytes();

    if options.tree {
        let tree = SuffixTree::from_text(data, None)?;
        println!("{}", tree.pretty_print());
    }

    let (score, nodes) = max_substring_score(data)?;
    println!("{} {}", score, nodes);

    Ok(())
}

fn main() {
    let options = Options::from_args();

    if let Err(err) = run(&options) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod review;

use clap::{Command, arg};


fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = Command::new("Bughouse review")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Merges recorded bughouse games and prints them for review")
        .subcommand_required(true)
        .subcommand(
            Command::new("merge")
                .about("Merges per-board turn records and prints the combined sequence as JSON")
                .arg(arg!(<records_file> "JSON file with \"boardA\" and \"boardB\" turn lists")),
        )
        .subcommand(
            Command::new("review")
                .about("Builds the game mainline and prints every position")
                .arg(arg!(<records_file> "JSON file with \"boardA\" and \"boardB\" turn lists"))
                .arg(arg!(--"rules" <rules_file> "Path to yaml-serialized Rules"))
                .arg(arg!(--"diagrams" "Also draw both boards after the last turn")),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("merge", sub_matches)) => review::run_merge(review::MergeConfig {
            records_file: required_arg(sub_matches, "records_file")?,
        }),
        Some(("review", sub_matches)) => review::run_review(review::ReviewConfig {
            records_file: required_arg(sub_matches, "records_file")?,
            rules_file: sub_matches.get_one::<String>("rules").cloned(),
            diagrams: sub_matches.get_flag("diagrams"),
        }),
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}

fn required_arg(matches: &clap::ArgMatches, name: &str) -> anyhow::Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing argument: {name}"))
}

use anyhow::Context;
use bughouse_review::board::Reserve;
use bughouse_review::coord::{Col, Coord, Row};
use bughouse_review::grid::Grid;
use bughouse_review::piece::piece_to_pictogram;
use bughouse_review::{
    AnalysisTree, BughouseBoard, BughouseGameStatus, BughousePosition, Force, PieceKind, Rules,
    Team, TurnRecord, merge_turn_streams,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;


// Turn records of one game as exported by the game service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecords {
    pub board_a: Vec<TurnRecord>,
    pub board_b: Vec<TurnRecord>,
}

pub struct MergeConfig {
    pub records_file: String,
}

pub struct ReviewConfig {
    pub records_file: String,
    pub rules_file: Option<String>,
    pub diagrams: bool,
}

fn read_records(filename: &str) -> anyhow::Result<GameRecords> {
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Reading records file {filename}"))?;
    serde_json::from_str(&contents).with_context(|| format!("Parsing records file {filename}"))
}

fn read_rules(filename: Option<&str>) -> anyhow::Result<Rules> {
    let Some(filename) = filename else {
        return Ok(Rules::default());
    };
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Reading rules file {filename}"))?;
    serde_yaml::from_str(&contents).with_context(|| format!("Parsing rules file {filename}"))
}

pub fn run_merge(config: MergeConfig) -> anyhow::Result<()> {
    let records = read_records(&config.records_file)?;
    let merged = merge_turn_streams(&records.board_a, &records.board_b, &Rules::default())?;
    println!("{}", serde_json::to_string_pretty(&merged)?);
    Ok(())
}

pub fn run_review(config: ReviewConfig) -> anyhow::Result<()> {
    let records = read_records(&config.records_file)?;
    let rules = read_rules(config.rules_file.as_deref())?;
    let tree = AnalysisTree::load_game(rules, &records.board_a, &records.board_b)?;
    let mainline = tree.mainline();
    for (index, id) in mainline.iter().enumerate() {
        let Some(node) = tree.node(*id) else {
            anyhow::bail!("mainline node {id} is missing");
        };
        match node.incoming_turn() {
            None => println!("{index:>3}  start"),
            Some(turn) => println!(
                "{index:>3}  {:?}{}  {:<8}  {:>8}  {}",
                turn.player.board_idx,
                match turn.player.force {
                    Force::White => "w",
                    Force::Black => "b",
                },
                turn.notation,
                turn.timestamp_millis.map_or(String::new(), format_time),
                describe_status(node.position()),
            ),
        }
        for board_idx in BughouseBoard::iter() {
            println!("       {:?}: {}", board_idx, node.fen(board_idx));
        }
    }
    if config.diagrams {
        if let Some(last) = mainline.last().and_then(|id| tree.node(*id)) {
            for board_idx in BughouseBoard::iter() {
                println!();
                println!("Board {board_idx:?}");
                print!("{}", render_grid(last.position().board(board_idx).grid()));
                for team in Team::iter() {
                    let reserve = render_reserve(last.reserve(team, board_idx));
                    println!("  {team:?} reserve: {reserve}");
                }
            }
        }
    }
    Ok(())
}

fn describe_status(position: &BughousePosition) -> String {
    match position.status() {
        BughouseGameStatus::Active => String::new(),
        BughouseGameStatus::Victory(team, reason) => format!("{team:?} wins by {reason:?}"),
    }
}

fn format_time(millis: u64) -> String {
    let seconds = millis / 1000;
    format!("{}:{:02}.{:01}", seconds / 60, seconds % 60, (millis % 1000) / 100)
}

fn render_grid(grid: &Grid) -> String {
    let mut out = String::new();
    for row in Row::all().rev() {
        out.push(row.to_algebraic());
        out.push(' ');
        for col in Col::all() {
            out.push(match grid[Coord::new(row, col)] {
                Some(piece) => piece_to_pictogram(piece.kind, piece.force),
                None => '·',
            });
        }
        out.push('\n');
    }
    out.push_str("  ");
    out.extend(Col::all().map(|col| col.to_algebraic()));
    out.push('\n');
    out
}

fn render_reserve(reserve: &Reserve) -> String {
    PieceKind::iter()
        .filter(|kind| reserve[*kind] > 0)
        .map(|kind| format!("{}x{}", kind.to_full_algebraic(), reserve[kind]))
        .join(" ")
}

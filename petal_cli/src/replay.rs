use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use comfy_table::Table;
use petal_penalty::{
    parsers::{parser::DatasetParser, solomon::SolomonParser},
    penalty::{
        evaluation_statistics::EvaluationStatistics,
        evaluator::{EvaluatePenalty, PenaltyEvaluator},
        full_scan::recompute_penalty,
        penalty_outcome::Penalty,
        penalty_params::{PenaltyParams, PenaltyStrategy},
    },
    problem::{routing_instance::RoutingInstance, travel_cost_matrix::Cost},
    tour::{arena_tour::ArenaTour, move_log::MoveLog, random_move::apply_random_move},
};
use rand::{SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::{
    file_utils::{input_files, load_params},
    parsers,
};

#[derive(Args)]
pub struct ReplayArgs {
    /// Solomon instance file, or a folder of them
    #[arg(short, long)]
    instance: PathBuf,

    /// Random moves applied per replay
    #[arg(short, long, default_value_t = 1000)]
    moves: usize,

    /// Seed of the first replay, the others use the following seeds
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Independent replays per instance, run in parallel
    #[arg(short = 'n', long, default_value_t = 1)]
    instances: usize,

    /// Overrides the strategy of the parameters file
    #[arg(long, value_parser = parsers::parse_strategy)]
    strategy: Option<PenaltyStrategy>,

    /// Checks every commit against a full recomputation
    #[arg(long)]
    verify: bool,

    /// JSON file with penalty parameters
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(short, long, default_value_t = 100)]
    precision: Cost,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
struct ReplayOutcome {
    seed: u64,
    moves: usize,
    penalty: Penalty,
    travel_cost: Cost,
    statistics: EvaluationStatistics,
}

#[derive(Debug, Serialize)]
struct InstanceReport {
    file: PathBuf,
    strategy: PenaltyStrategy,
    replays: Vec<ReplayOutcome>,
    statistics: EvaluationStatistics,
}

fn penalty_params(args: &ReplayArgs) -> Result<PenaltyParams, anyhow::Error> {
    let mut params = match &args.params {
        Some(file) => load_params(file)?,
        None => PenaltyParams::default(),
    };

    if let Some(strategy) = args.strategy {
        params.strategy = strategy;
    }
    if args.verify {
        params.debug_options.verify_commits = true;
    }

    Ok(params)
}

/// Applies `moves` random edits to a packed tour. Rejected edits are dropped,
/// so the tour always matches the evaluator's last commit.
fn replay_once(
    instance: &RoutingInstance,
    params: &PenaltyParams,
    moves: usize,
    seed: u64,
) -> Result<ReplayOutcome, anyhow::Error> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut evaluator = PenaltyEvaluator::new(params);
    let mut tour = ArenaTour::sequential(instance);
    let mut log = MoveLog::new();

    evaluator.evaluate(instance, &tour, &log, 0);

    let mut applied = 0;
    for _ in 0..moves {
        let mut candidate = tour.clone();
        let Some(kind) = apply_random_move(instance, &mut candidate, &mut rng, &mut log) else {
            continue;
        };
        applied += 1;

        let gain = tour.travel_cost(instance) - candidate.travel_cost(instance);
        let outcome = evaluator.evaluate(instance, &candidate, &log, gain);
        trace!(?kind, gain, ?outcome, "move evaluated");

        if outcome.is_committed() {
            tour = candidate;
        }
        log.clear();
    }

    let Some(penalty) = evaluator.confirmed_penalty() else {
        bail!("seed {seed}: no penalty was ever committed");
    };
    let expected = recompute_penalty(instance, &tour);
    if penalty != expected {
        bail!("seed {seed}: confirmed penalty {penalty} but a full recomputation gives {expected}");
    }

    debug!(seed, applied, penalty, "replay finished");

    Ok(ReplayOutcome {
        seed,
        moves: applied,
        penalty,
        travel_cost: tour.travel_cost(instance),
        statistics: evaluator.statistics().clone(),
    })
}

fn replay_instance(
    file: PathBuf,
    args: &ReplayArgs,
    params: &PenaltyParams,
) -> Result<InstanceReport, anyhow::Error> {
    let mut parser = SolomonParser::default();
    parser.set_precision(args.precision);
    let instance = parser.parse(&file)?;

    info!(
        "Replaying {:?}: {} customers, {} vehicles",
        file,
        instance.customers_len(),
        instance.vehicles()
    );

    let replays = (0..args.instances)
        .into_par_iter()
        .map(|index| replay_once(&instance, params, args.moves, args.seed + index as u64))
        .collect::<Result<Vec<_>, anyhow::Error>>()?;

    let mut statistics = EvaluationStatistics::default();
    for replay in &replays {
        statistics.merge(&replay.statistics);
    }

    Ok(InstanceReport {
        file,
        strategy: params.strategy,
        replays,
        statistics,
    })
}

pub fn run(args: ReplayArgs) -> Result<(), anyhow::Error> {
    let params = penalty_params(&args)?;
    let reports = input_files(&args.instance)?
        .into_iter()
        .map(|file| replay_instance(file, &args, &params))
        .collect::<Result<Vec<_>, anyhow::Error>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Instance",
        "Strategy",
        "Evaluations",
        "Commits",
        "Pruned",
        "Full scans",
        "Routes rescanned",
        "Stops / evaluation",
        "Best penalty",
    ]);

    for report in &reports {
        let name = report
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let best = report
            .replays
            .iter()
            .map(|replay| replay.penalty)
            .min()
            .unwrap_or_default();

        table.add_row(vec![
            name,
            format!("{:?}", report.strategy),
            report.statistics.evaluations.to_string(),
            report.statistics.commits.to_string(),
            report.statistics.pruned.to_string(),
            report.statistics.full_scans.to_string(),
            report.statistics.routes_rescanned.to_string(),
            format!("{:.1}", report.statistics.stops_per_evaluation()),
            best.to_string(),
        ]);
    }

    println!("{table}");

    Ok(())
}

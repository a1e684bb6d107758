use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use comfy_table::Table;
use petal_penalty::{
    parsers::{parser::DatasetParser, solomon::SolomonParser, solution::read_tour},
    penalty::{
        evaluator::{EvaluatePenalty, PenaltyEvaluator},
        full_scan::route_penalties,
        penalty_outcome::{Penalty, PenaltyOutcome},
        penalty_params::{PenaltyParams, PenaltyStrategy},
    },
    problem::travel_cost_matrix::Cost,
    tour::{arena_tour::ArenaTour, move_log::MoveLog},
};
use serde::Serialize;
use tracing::info;

use crate::parsers;

#[derive(Args)]
pub struct EvaluateArgs {
    /// Solomon instance file
    #[arg(short, long)]
    instance: PathBuf,

    /// Solution with `Route #k:` lines. Customers are packed into the
    /// vehicles in file order when omitted.
    #[arg(short, long)]
    solution: Option<PathBuf>,

    #[arg(long, value_parser = parsers::parse_strategy, default_value = "incremental")]
    strategy: PenaltyStrategy,

    /// Scale applied to Euclidean distances before rounding
    #[arg(short, long, default_value_t = 100)]
    precision: Cost,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct RouteReport {
    route: usize,
    stops: usize,
    penalty: Penalty,
}

#[derive(Debug, Serialize)]
struct EvaluationReport {
    strategy: PenaltyStrategy,
    travel_cost: Cost,
    total: Penalty,
    routes: Vec<RouteReport>,
}

fn evaluate(args: &EvaluateArgs) -> Result<EvaluationReport, anyhow::Error> {
    let mut parser = SolomonParser::default();
    parser.set_precision(args.precision);
    let instance = parser.parse(&args.instance)?;

    let tour = match &args.solution {
        Some(solution) => read_tour(&instance, solution)?,
        None => ArenaTour::sequential(&instance),
    };

    let mut evaluator = PenaltyEvaluator::new(&PenaltyParams {
        strategy: args.strategy,
        ..PenaltyParams::default()
    });

    let PenaltyOutcome::Committed(total) =
        evaluator.evaluate(&instance, &tour, &MoveLog::new(), 0)
    else {
        bail!("the first evaluation of a tour must commit");
    };

    let routes: Vec<RouteReport> = route_penalties(&instance, &tour)
        .into_iter()
        .zip(tour.routes(&instance))
        .enumerate()
        .map(|(route, (penalty, stops))| RouteReport {
            route,
            stops: stops.len(),
            penalty,
        })
        .collect();

    let sum: Penalty = routes.iter().map(|route| route.penalty).sum();
    if sum != total {
        bail!("evaluator committed {total} but the routes sum to {sum}");
    }

    Ok(EvaluationReport {
        strategy: args.strategy,
        travel_cost: tour.travel_cost(&instance),
        total,
        routes,
    })
}

pub fn run(args: EvaluateArgs) -> Result<(), anyhow::Error> {
    info!("Evaluating {:?}", args.instance);
    let report = evaluate(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Route", "Stops", "Penalty"]);
    for route in report.routes.iter().filter(|route| route.stops > 0) {
        table.add_row(vec![
            route.route.to_string(),
            route.stops.to_string(),
            route.penalty.to_string(),
        ]);
    }

    println!("{table}");
    info!(
        "Total penalty {} (travel cost {})",
        report.total, report.travel_cost
    );

    Ok(())
}

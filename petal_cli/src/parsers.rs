use petal_penalty::penalty::penalty_params::PenaltyStrategy;

pub fn parse_strategy(input: &str) -> Result<PenaltyStrategy, String> {
    match input.to_lowercase().replace('-', "_").as_str() {
        "incremental" | "inc" => Ok(PenaltyStrategy::Incremental),
        "full_scan" | "full" => Ok(PenaltyStrategy::FullScan),
        _ => Err(format!(
            "Invalid strategy {input}, expected incremental or full_scan"
        )),
    }
}

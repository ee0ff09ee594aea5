use crate::config::Config;
use crate::error::CliError;
use tohyo::CandidateId;

pub fn command_vote(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let caller = config.caller()?;
    let candidate = matches.value_of("CANDIDATE-ID").unwrap_or("");
    let candidate_id: CandidateId = candidate
        .parse()
        .map_err(|_| CliError::invalid("candidate id", candidate))?;

    crate::update_election(config, |election| election.vote(caller, candidate_id))?;

    println!("Voter {} voted for candidate {}", caller, candidate_id);
    Ok(())
}

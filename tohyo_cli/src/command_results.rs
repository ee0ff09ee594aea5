use crate::config::Config;
use crate::error::CliError;
use log::warn;

pub fn command_results(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let election = crate::read_election(config)?;

    if !election.is_final() {
        warn!(
            "results are not final: election is still in the {} stage",
            election.current_stage()
        );
    }

    if matches.is_present("winner") {
        match election.leader() {
            Some(leader) => println!(
                "{}\t{}\t{}\t{}",
                leader.id, leader.name, leader.wallet_address, leader.vote_count
            ),
            None => println!("No candidates"),
        }
        return Ok(());
    }

    println!("ID\tVOTES\tNAME\tADDRESS");
    for candidate in election.results() {
        println!(
            "{}\t{}\t{}\t{}",
            candidate.id, candidate.vote_count, candidate.name, candidate.wallet_address
        );
    }
    println!("Total votes cast: {}", election.total_votes_cast());
    Ok(())
}

pub fn command_info(_matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let election = crate::read_election(config)?;

    println!("owner:            {}", election.owner());
    println!("stage:            {}", election.current_stage());
    println!("created at:       {}", election.created_at().to_rfc3339());
    println!("voting deadline:  {}", election.voting_deadline().to_rfc3339());
    println!("total voters:     {}", election.total_voters());
    println!("total candidates: {}", election.total_candidates());
    Ok(())
}

pub fn command_abi(_matches: &clap::ArgMatches) -> Result<(), CliError> {
    let abi = serde_json::to_string_pretty(&tohyo::interface())?;
    println!("{}", abi);
    Ok(())
}

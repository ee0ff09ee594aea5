use crate::config::Config;
use crate::error::CliError;

pub fn command_register_voter(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let caller = config.caller()?;
    let voter = crate::parse_address("voter address", matches.value_of("ADDRESS").unwrap_or(""))?;

    let total = crate::update_election(config, |election| {
        election.register_voter(caller, voter)?;
        Ok(election.total_voters())
    })?;

    println!("Registered voter {} ({} total)", voter, total);
    Ok(())
}

pub fn command_add_candidate(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let caller = config.caller()?;
    let name = matches.value_of("NAME").unwrap_or("");
    let description = matches.value_of("DESCRIPTION").unwrap_or("");
    let wallet = crate::parse_address(
        "candidate address",
        matches.value_of("ADDRESS").unwrap_or(""),
    )?;

    let id = crate::update_election(config, |election| {
        election.add_candidate(caller, name, description, wallet)
    })?;

    println!("Added candidate {}: {}", id, name);
    Ok(())
}

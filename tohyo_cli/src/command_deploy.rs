use crate::config::Config;
use crate::error::CliError;
use chrono::Utc;
use log::{error, info};
use tohyo::{Address, CandidateId, DeploymentRecord, Election, FileStore, Store};

pub fn command_deploy(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let owner = config.caller()?;

    let duration = matches.value_of("duration").unwrap_or("604800");
    let duration: u64 = duration
        .parse()
        .map_err(|_| CliError::invalid("voting duration", duration))?;
    let chain_id = matches.value_of("chain-id").unwrap_or("31337");
    let chain_id: u64 = chain_id
        .parse()
        .map_err(|_| CliError::invalid("chain id", chain_id))?;

    let mut store = FileStore::new(&config.state_path);
    let _lock = store.lock()?;
    if store.load()?.is_some() {
        return Err(CliError::AlreadyDeployed(
            config.state_path.display().to_string(),
        ));
    }

    info!("Deploying election with the account: {}", owner);
    let deployed_at = Utc::now();
    let mut election = Election::new(owner, duration, deployed_at)?;
    let contract_address = Address::derive(&owner, deployed_at.timestamp_millis() as u64);

    // A bad seed candidate is reported but doesn't stop the deployment
    if let Some(candidates) = matches.values_of("candidate") {
        info!("Adding initial candidates...");
        for seed in candidates {
            match add_seed_candidate(&mut election, owner, seed) {
                Ok(id) => println!("Added candidate {}: {}", id, seed),
                Err(e) => error!("Error adding candidate {}: {}", seed, e),
            }
        }
    }

    // The record goes first so a failed write leaves no half-deployed state behind
    let record = DeploymentRecord::new(
        contract_address,
        &election,
        &config.network,
        chain_id,
        deployed_at,
    );
    let path = record.save(&config.deployments_dir)?;
    store.save(&election)?;

    println!("Election deployed to: {}", contract_address);
    println!("Deployed on network: {}", config.network);
    println!("Deployment details saved to {}", path.display());

    Ok(())
}

fn add_seed_candidate(
    election: &mut Election,
    owner: Address,
    seed: &str,
) -> Result<CandidateId, CliError> {
    let (name, description, address) = parse_candidate(seed)?;
    Ok(election.add_candidate(owner, &name, &description, address)?)
}

/// Parse `NAME|DESCRIPTION|ADDRESS`
pub fn parse_candidate(seed: &str) -> Result<(String, String, Address), CliError> {
    let parts: Vec<&str> = seed.splitn(3, '|').collect();
    match parts.as_slice() {
        [name, description, address] => Ok((
            name.trim().to_owned(),
            description.trim().to_owned(),
            crate::parse_address("candidate address", address)?,
        )),
        _ => Err(CliError::invalid("candidate", seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seed_candidates() {
        let (name, description, address) = parse_candidate(
            "Candidate Alpha|First candidate in the election|0x1234567890123456789012345678901234567890",
        )
        .unwrap();
        assert_eq!(name, "Candidate Alpha");
        assert_eq!(description, "First candidate in the election");
        assert_eq!(
            address.to_string(),
            "0x1234567890123456789012345678901234567890"
        );

        assert!(parse_candidate("Candidate Alpha|0x1234567890123456789012345678901234567890").is_err());
        assert!(parse_candidate("Candidate Alpha|desc|0x12").is_err());
    }

    #[test]
    fn bad_seed_candidate_is_skipped() {
        let owner = Address::random();
        let mut election = Election::create(owner, 60).unwrap();
        let wallet = Address::random();
        let seed = format!("Candidate Alpha|desc|{}", wallet);

        assert_eq!(add_seed_candidate(&mut election, owner, &seed).unwrap(), 1);
        assert!(add_seed_candidate(&mut election, owner, &seed).is_err());
        assert_eq!(election.total_candidates(), 1);
    }
}

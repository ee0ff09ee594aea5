use clap::{App, AppSettings, Arg, SubCommand};
use log::LevelFilter;

mod command_deploy;
mod command_keygen;
mod command_register;
mod command_results;
mod command_stage;
mod command_vote;
mod config;
mod error;

use config::Config;
use error::CliError;

fn main() {
    let matches = build_app().get_matches();

    let level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    if let Err(err) = init_logging(level).and_then(|_| run(&matches)) {
        eprintln!("tohyo: {}", err);
        std::process::exit(1);
    }
}

fn build_app() -> App<'static, 'static> {
    App::new("Tohyo CLI")
        .version("0.1")
        .about("Deploys and operates a single-election voting registry")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("state")
                .long("state")
                .takes_value(true)
                .help("Election state file - can also be set with TOHYO_STATE"),
        )
        .arg(
            Arg::with_name("from")
                .long("from")
                .takes_value(true)
                .help("Address of the caller - can also be set with TOHYO_ACCOUNT"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate a random address"))
        .subcommand(
            SubCommand::with_name("deploy")
                .about("Create a new election, owned by the caller")
                .arg(
                    Arg::with_name("duration")
                        .long("duration")
                        .takes_value(true)
                        .default_value("604800")
                        .help("Voting duration in seconds"),
                )
                .arg(
                    Arg::with_name("network")
                        .long("network")
                        .takes_value(true)
                        .help("Network name - can also be set with TOHYO_NETWORK"),
                )
                .arg(
                    Arg::with_name("chain-id")
                        .long("chain-id")
                        .takes_value(true)
                        .default_value("31337"),
                )
                .arg(
                    Arg::with_name("deployments-dir")
                        .long("deployments-dir")
                        .takes_value(true)
                        .help("Where to write the deployment record - can also be set with TOHYO_DEPLOYMENTS_DIR"),
                )
                .arg(
                    Arg::with_name("candidate")
                        .long("candidate")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Initial candidate as NAME|DESCRIPTION|ADDRESS"),
                ),
        )
        .subcommand(
            SubCommand::with_name("register-voter")
                .about("Register an eligible voter")
                .arg(Arg::with_name("ADDRESS").index(1).required(true)),
        )
        .subcommand(
            SubCommand::with_name("add-candidate")
                .about("Add a candidate")
                .arg(Arg::with_name("NAME").index(1).required(true))
                .arg(Arg::with_name("DESCRIPTION").index(2).required(true))
                .arg(Arg::with_name("ADDRESS").index(3).required(true)),
        )
        .subcommand(
            SubCommand::with_name("stage")
                .about("Print the current stage, or move the election to STAGE")
                .arg(
                    Arg::with_name("STAGE")
                        .index(1)
                        .help("registration, voting, tallying, completed (or 0-3)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Cast the caller's vote")
                .arg(Arg::with_name("CANDIDATE-ID").index(1).required(true)),
        )
        .subcommand(
            SubCommand::with_name("results")
                .about("Print vote counts for every candidate")
                .arg(
                    Arg::with_name("winner")
                        .long("winner")
                        .help("Print only the leading candidate (ties go to the lowest id)"),
                ),
        )
        .subcommand(SubCommand::with_name("info").about("Print a summary of the election"))
        .subcommand(SubCommand::with_name("abi").about("Print the interface description"))
}

fn run(matches: &clap::ArgMatches) -> Result<(), CliError> {
    let config = Config::from_matches(matches)?;

    match matches.subcommand() {
        ("keygen", Some(m)) => command_keygen::command_keygen(m),
        ("deploy", Some(m)) => command_deploy::command_deploy(m, &config),
        ("register-voter", Some(m)) => command_register::command_register_voter(m, &config),
        ("add-candidate", Some(m)) => command_register::command_add_candidate(m, &config),
        ("stage", Some(m)) => command_stage::command_stage(m, &config),
        ("vote", Some(m)) => command_vote::command_vote(m, &config),
        ("results", Some(m)) => command_results::command_results(m, &config),
        ("info", Some(m)) => command_results::command_info(m, &config),
        ("abi", Some(m)) => command_results::command_abi(m),
        _ => Ok(()),
    }
}

fn init_logging(level: LevelFilter) -> Result<(), CliError> {
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| CliError::Logging(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| CliError::Logging(e.to_string()))?;
    Ok(())
}

/// Expand `~` and environment variables in a path argument
pub fn expand(input: &str) -> String {
    shellexpand::full(input)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| input.to_owned())
}

/// Parse an address argument
pub fn parse_address(name: &'static str, value: &str) -> Result<tohyo::Address, CliError> {
    value.parse().map_err(|_| CliError::invalid(name, value))
}

/// Load the election, apply one operation and save it back.
///
/// The whole sequence runs under the state file's exclusive lock, so concurrent
/// invocations are applied one after another. Nothing is written when the operation fails.
pub fn update_election<T, F>(config: &Config, operation: F) -> Result<T, CliError>
where
    F: FnOnce(&mut tohyo::Election) -> Result<T, tohyo::ElectionError>,
{
    use tohyo::Store;

    let mut store = tohyo::FileStore::new(&config.state_path);
    let _lock = store.lock()?;
    let mut election = store.get_election()?;
    let output = operation(&mut election)?;
    store.save(&election)?;
    Ok(output)
}

/// Load the election for reading
pub fn read_election(config: &Config) -> Result<tohyo::Election, CliError> {
    use tohyo::Store;

    Ok(tohyo::FileStore::new(&config.state_path).get_election()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tohyo::{Address, Election, ElectionError, FileStore, Stage, Store};

    fn config_in(dir: &std::path::Path, account: Address) -> Config {
        Config {
            state_path: dir.join("election.json"),
            account: Some(account),
            deployments_dir: dir.join("deployments"),
            network: "localhost".to_owned(),
        }
    }

    #[test]
    fn update_persists_successful_operations() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Address::random();
        let config = config_in(dir.path(), owner);

        let mut store = FileStore::new(&config.state_path);
        store.save(&Election::create(owner, 3600).unwrap()).unwrap();

        let voter = Address::random();
        update_election(&config, |e| e.register_voter(owner, voter)).unwrap();
        update_election(&config, |e| e.change_stage(owner, Stage::Voting)).unwrap();

        let election = read_election(&config).unwrap();
        assert!(election.is_registered(&voter));
        assert_eq!(election.current_stage(), Stage::Voting);
    }

    #[test]
    fn failed_operations_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Address::random();
        let config = config_in(dir.path(), owner);

        let mut store = FileStore::new(&config.state_path);
        store.save(&Election::create(owner, 3600).unwrap()).unwrap();

        let intruder = Address::random();
        let result = update_election(&config, |e| e.change_stage(intruder, Stage::Completed));
        assert!(matches!(
            result,
            Err(CliError::Election(ElectionError::Unauthorized))
        ));
        assert_eq!(
            read_election(&config).unwrap().current_stage(),
            Stage::Registration
        );
    }

    #[test]
    fn concurrent_votes_are_all_saved() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Address::random();
        let config = config_in(dir.path(), owner);

        let voters: Vec<Address> = (0..32).map(|_| Address::random()).collect();
        let mut election = Election::create(owner, 3600).unwrap();
        for voter in &voters {
            election.register_voter(owner, *voter).unwrap();
        }
        election
            .add_candidate(owner, "Candidate A", "", Address::random())
            .unwrap();
        election.change_stage(owner, Stage::Voting).unwrap();
        FileStore::new(&config.state_path).save(&election).unwrap();

        let handles: Vec<_> = voters
            .iter()
            .map(|voter| {
                let config = config.clone();
                let voter = *voter;
                std::thread::spawn(move || update_election(&config, |e| e.vote(voter, 1)))
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(accepted, 32);
        let election = read_election(&config).unwrap();
        assert_eq!(election.candidate(1).unwrap().vote_count, 32);
        assert!(voters.iter().all(|v| election.has_voted(v)));
    }

    #[test]
    fn deploy_through_cli() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Address::random();
        let wallet = Address::random();
        let state = dir.path().join("election.json");
        let deployments = dir.path().join("deployments");
        let good = format!("Candidate Alpha|First candidate in the election|{}", wallet);
        let duplicate = format!("Candidate Beta|Same wallet|{}", wallet);

        let args = vec![
            "tohyo".to_owned(),
            "--state".to_owned(),
            state.display().to_string(),
            "--from".to_owned(),
            owner.to_string(),
            "deploy".to_owned(),
            "--duration".to_owned(),
            "604800".to_owned(),
            "--network".to_owned(),
            "testnet".to_owned(),
            "--deployments-dir".to_owned(),
            deployments.display().to_string(),
            "--candidate".to_owned(),
            good,
            "--candidate".to_owned(),
            duplicate,
            "--candidate".to_owned(),
            "not a candidate".to_owned(),
        ];
        let matches = build_app().get_matches_from(args.clone());
        run(&matches).unwrap();

        let election = FileStore::new(&state).get_election().unwrap();
        assert_eq!(election.owner(), owner);
        assert_eq!(election.voting_duration(), 604800);
        assert_eq!(election.total_candidates(), 1);
        assert_eq!(election.candidate(1).unwrap().wallet_address, wallet);

        let record =
            tohyo::DeploymentRecord::load(deployments.join("testnet-deployment.json")).unwrap();
        assert_eq!(record.deployer, owner);
        assert_eq!(record.network, "testnet");
        assert_eq!(record.voting_duration, 604800);

        // A second deploy over the same state is refused and changes nothing
        let matches = build_app().get_matches_from(args);
        assert!(matches!(run(&matches), Err(CliError::AlreadyDeployed(_))));
        assert_eq!(
            FileStore::new(&state).get_election().unwrap().total_candidates(),
            1
        );
    }

    #[test]
    fn failed_deploy_record_leaves_no_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("election.json");
        // A plain file where the deployments directory should go
        let blocker = dir.path().join("deployments");
        std::fs::write(&blocker, b"").unwrap();

        let args = vec![
            "tohyo".to_owned(),
            "--state".to_owned(),
            state.display().to_string(),
            "--from".to_owned(),
            Address::random().to_string(),
            "deploy".to_owned(),
            "--network".to_owned(),
            "testnet".to_owned(),
            "--deployments-dir".to_owned(),
            blocker.display().to_string(),
        ];
        let matches = build_app().get_matches_from(args);
        assert!(run(&matches).is_err());
        assert!(FileStore::new(&state).load().unwrap().is_none());
    }

    #[test]
    fn missing_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Address::random());
        assert!(matches!(
            read_election(&config),
            Err(CliError::Tohyo(tohyo::Error::ElectionNotFound))
        ));
    }
}

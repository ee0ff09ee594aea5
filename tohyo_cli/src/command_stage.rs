use crate::config::Config;
use crate::error::CliError;
use tohyo::Stage;

pub fn command_stage(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let target = match matches.value_of("STAGE") {
        Some(stage) => stage.parse::<Stage>()?,
        None => {
            let election = crate::read_election(config)?;
            println!("{}", election.current_stage());
            return Ok(());
        }
    };

    let caller = config.caller()?;
    crate::update_election(config, |election| election.change_stage(caller, target))?;

    println!("Stage changed to {}", target);
    Ok(())
}

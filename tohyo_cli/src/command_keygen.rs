use crate::error::CliError;

pub fn command_keygen(_matches: &clap::ArgMatches) -> Result<(), CliError> {
    let address = tohyo::Address::random();
    println!("address: {}", address);
    Ok(())
}

use crate::error::CliError;
use std::path::PathBuf;
use std::str::FromStr;
use tohyo::Address;

pub const DEFAULT_STATE_PATH: &str = "./tohyo-election.json";
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "./deployments";
pub const DEFAULT_NETWORK: &str = "localhost";

/// CLI settings, taken from arguments first, then environment variables, then defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the election state lives. `--state` or `TOHYO_STATE`
    pub state_path: PathBuf,

    /// Identity of the caller. `--from` or `TOHYO_ACCOUNT`
    pub account: Option<Address>,

    /// Where deployment records are written. `--deployments-dir` or `TOHYO_DEPLOYMENTS_DIR`
    pub deployments_dir: PathBuf,

    /// `--network` or `TOHYO_NETWORK`
    pub network: String,
}

impl Config {
    pub fn from_matches(matches: &clap::ArgMatches) -> Result<Self, CliError> {
        let (_, sub_matches) = matches.subcommand();
        Self::resolve(
            |name| {
                matches
                    .value_of(name)
                    .or_else(|| sub_matches.and_then(|m| m.value_of(name)))
                    .map(str::to_owned)
            },
            |var| std::env::var(var).ok(),
        )
    }

    pub fn resolve<A, E>(arg: A, env: E) -> Result<Self, CliError>
    where
        A: Fn(&str) -> Option<String>,
        E: Fn(&str) -> Option<String>,
    {
        let setting = |name: &str, var: &str| arg(name).or_else(|| env(var));

        let state_path = setting("state", "TOHYO_STATE")
            .map(|p| crate::expand(&p))
            .unwrap_or_else(|| DEFAULT_STATE_PATH.to_owned());

        let account = match setting("from", "TOHYO_ACCOUNT") {
            Some(val) => Some(
                Address::from_str(&val).map_err(|_| CliError::invalid("caller address", &val))?,
            ),
            None => None,
        };

        let deployments_dir = setting("deployments-dir", "TOHYO_DEPLOYMENTS_DIR")
            .map(|p| crate::expand(&p))
            .unwrap_or_else(|| DEFAULT_DEPLOYMENTS_DIR.to_owned());

        let network =
            setting("network", "TOHYO_NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.to_owned());

        Ok(Config {
            state_path: state_path.into(),
            account,
            deployments_dir: deployments_dir.into(),
            network,
        })
    }

    /// The caller identity, required by every mutating command
    pub fn caller(&self) -> Result<Address, CliError> {
        self.account.ok_or(CliError::MissingAccount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = Config::resolve(|_| None, |_| None).unwrap();
        assert_eq!(config.state_path, PathBuf::from(DEFAULT_STATE_PATH));
        assert_eq!(config.deployments_dir, PathBuf::from(DEFAULT_DEPLOYMENTS_DIR));
        assert_eq!(config.network, "localhost");
        assert!(matches!(config.caller(), Err(CliError::MissingAccount)));
    }

    #[test]
    fn arguments_override_environment() {
        let args = lookup(&[("state", "/tmp/arg.json")]);
        let env = lookup(&[
            ("TOHYO_STATE", "/tmp/env.json"),
            ("TOHYO_NETWORK", "sepolia"),
            ("TOHYO_ACCOUNT", "0x1234567890123456789012345678901234567890"),
        ]);

        let config =
            Config::resolve(|k| args.get(k).cloned(), |k| env.get(k).cloned()).unwrap();
        assert_eq!(config.state_path, PathBuf::from("/tmp/arg.json"));
        assert_eq!(config.network, "sepolia");
        assert_eq!(
            config.caller().unwrap().to_string(),
            "0x1234567890123456789012345678901234567890"
        );
    }

    #[test]
    fn bad_account() {
        let args = lookup(&[("from", "not-an-address")]);
        let result = Config::resolve(|k| args.get(k).cloned(), |_| None);
        assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
    }
}

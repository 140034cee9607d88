use clap::Parser;

/// Command line shared by the deployment binaries.
///
/// Everything else (RPC endpoints, sender accounts, paths, verbosity) comes
/// from `Selora.toml` and `SELORA_*` environment variables.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about)]
pub struct Cli {
    /// Name of the network to deploy to, as configured under `[networks.<name>]`.
    #[arg(short, long)]
    pub network: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_flag() {
        let cli = Cli::try_parse_from(["deploy-core", "--network", "sepolia"]).unwrap();
        assert_eq!(cli.network, "sepolia");
    }

    #[test]
    fn test_short_flag() {
        let cli = Cli::try_parse_from(["deploy-core", "-n", "base"]).unwrap();
        assert_eq!(cli.network, "base");
    }

    #[test]
    fn test_network_is_required() {
        assert!(Cli::try_parse_from(["deploy-core"]).is_err());
    }

    #[test]
    fn test_unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["deploy-core", "-n", "base", "--redeploy"]).is_err());
        assert!(Cli::try_parse_from(["deploy-core", "-n", "base", "extra"]).is_err());
    }
}

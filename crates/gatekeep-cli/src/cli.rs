use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gatekeep",
    about = "Pre-commit quality gate and project checkup for JS/TS projects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run pre-commit checks on staged files
    PreCommit(PreCommitArgs),
    /// Check up the whole project
    Checkup(CheckupArgs),
}

#[derive(Args)]
pub struct PreCommitArgs {}

#[derive(Args)]
pub struct CheckupArgs {
    /// Check dependency-lock integrity
    #[arg(long)]
    pub integrity: bool,
    /// Run the TypeScript type check
    #[arg(long)]
    pub types: bool,
    /// Lint the project
    #[arg(long)]
    pub lint: bool,
    /// Format the project (writes files)
    #[arg(long)]
    pub format: bool,
    /// Auto-fix issues where possible
    #[arg(long)]
    pub fix: bool,
    /// Run every check
    #[arg(long)]
    pub all: bool,
}

/// The checks a checkup run will perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectedChecks {
    pub integrity: bool,
    pub types: bool,
    pub lint: bool,
    pub format: bool,
}

impl CheckupArgs {
    /// Normalize flags: `--all` enables everything; no selection at all
    /// defaults to integrity, types and lint (formatting rewrites files,
    /// so it stays opt-in).
    pub fn selected(&self) -> SelectedChecks {
        if self.all {
            return SelectedChecks {
                integrity: true,
                types: true,
                lint: true,
                format: true,
            };
        }
        if !self.integrity && !self.types && !self.lint && !self.format {
            return SelectedChecks {
                integrity: true,
                types: true,
                lint: true,
                format: false,
            };
        }
        SelectedChecks {
            integrity: self.integrity,
            types: self.types,
            lint: self.lint,
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pre_commit() {
        let cli = Cli::try_parse_from(["gatekeep", "pre-commit"]).unwrap();
        assert!(matches!(cli.command, Command::PreCommit(_)));
    }

    #[test]
    fn parse_checkup_flags() {
        let cli = Cli::try_parse_from(["gatekeep", "checkup", "--lint", "--fix"]).unwrap();
        if let Command::Checkup(args) = cli.command {
            assert!(args.lint);
            assert!(args.fix);
            assert!(!args.types);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["gatekeep", "--verbose", "pre-commit"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn unknown_command_fails_to_parse() {
        assert!(Cli::try_parse_from(["gatekeep", "frobnicate"]).is_err());
    }

    #[test]
    fn no_selection_defaults_to_non_destructive_checks() {
        let cli = Cli::try_parse_from(["gatekeep", "checkup"]).unwrap();
        let Command::Checkup(args) = cli.command else {
            panic!("wrong command");
        };
        let selected = args.selected();
        assert!(selected.integrity && selected.types && selected.lint);
        assert!(!selected.format);
    }

    #[test]
    fn all_selects_everything() {
        let cli = Cli::try_parse_from(["gatekeep", "checkup", "--all"]).unwrap();
        let Command::Checkup(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(
            args.selected(),
            SelectedChecks {
                integrity: true,
                types: true,
                lint: true,
                format: true,
            }
        );
    }

    #[test]
    fn explicit_selection_is_exact() {
        let cli = Cli::try_parse_from(["gatekeep", "checkup", "--format"]).unwrap();
        let Command::Checkup(args) = cli.command else {
            panic!("wrong command");
        };
        let selected = args.selected();
        assert!(selected.format);
        assert!(!selected.integrity && !selected.types && !selected.lint);
    }
}

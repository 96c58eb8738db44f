use assert_cmd::Command;
use predicates::prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_help() {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_shadowsync"));
        cmd.arg("--help").assert().success().stdout(
            predicate::str::contains("Shadowsync fetches a page")
                .and(predicate::str::contains("--dry-run"))
                .and(predicate::str::contains("--backup"))
                .and(predicate::str::contains("--no-pause")),
        );
    }

    #[test]
    fn test_cli_version() {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_shadowsync"));
        cmd.arg("--version").assert().success().stdout(predicate::str::contains("shadowsync"));
    }

    #[test]
    fn test_cli_rejects_zero_timeout() {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_shadowsync"));
        cmd.args(["--timeout", "0"]).assert().failure();
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_shadowsync"));
        cmd.arg("--mode").assert().failure().stderr(predicate::str::contains("--mode"));
    }
}

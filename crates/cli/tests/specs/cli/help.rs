use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    berth()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("race"));
}

#[test]
fn missing_subcommand_fails() {
    berth().assert().failure();
}

use crate::prelude::*;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn three_agents_are_served_in_order() {
    let output = berth()
        .arg("run")
        .arg(scenario("three-agents.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let shipped: Vec<String> = stdout(&output)
        .lines()
        .filter(|l| l.ends_with("Shipped"))
        .map(str::to_string)
        .collect();
    assert_eq!(
        shipped,
        vec![
            "UPS Package x Shipped",
            "FedEx Package Shipped",
            "UPS Package z Shipped",
        ]
    );
    assert!(stdout(&output).ends_with("=> packing: free, queue []\n"));
}

#[test]
fn invalid_release_is_reported_and_fails() {
    berth()
        .arg("run")
        .arg(scenario("misuse.toml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "FedEx Package cannot release the packing slot (held by UPS Package)",
        ))
        .stdout(predicate::str::contains("=> packing: busy (holder y), queue []"))
        .stderr(predicate::str::contains("step 3 (y release) rejected"));
}

#[test]
fn missing_file_fails_with_context() {
    berth()
        .args(["run", "/nonexistent/scenario.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load scenario"));
}

#[test]
fn undeclared_agent_is_a_load_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[agent]]
name = "ups"
carrier = "ups"

[[step]]
agent = "dhl"
action = "request"
"#
    )
    .unwrap();

    berth()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("undeclared agent 'dhl'"));
}

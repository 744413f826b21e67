use crate::prelude::*;

#[test]
fn every_agent_ships_once_and_slot_ends_free() {
    let output = berth().args(["race", "--agents", "6"]).output().unwrap();
    assert!(output.status.success());

    let out = stdout(&output);
    assert_eq!(out.lines().filter(|l| l.ends_with(" Shipped")).count(), 6);
    assert_eq!(out.lines().filter(|l| l.starts_with("Delivering ")).count(), 6);
    assert!(out.ends_with("=> packing: free, queue []\n"));
}

#[test]
fn json_trace_alternates_grant_and_release() {
    let output = berth()
        .args(["race", "--agents", "5", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let mut holding = false;
    for event in json["events"].as_array().unwrap() {
        match event["type"].as_str().unwrap() {
            "access_granted" => {
                assert!(!holding, "granted while another agent holds the slot");
                holding = true;
            }
            "resource_released" => {
                assert!(holding);
                holding = false;
            }
            _ => {}
        }
    }
    assert!(!holding);
    assert_eq!(json["snapshot"]["holder"], serde_json::Value::Null);
}

#[test]
fn zero_agents_is_rejected() {
    berth().args(["race", "--agents", "0"]).assert().failure();
}

#[test]
fn every_agent_after_the_first_is_queued_and_handed_the_slot() {
    let output = berth()
        .args(["race", "--agents", "4", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let count = |kind: &str| {
        json["events"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|e| e["type"] == kind)
            .count()
    };
    assert_eq!(count("access_denied"), 3);
    assert_eq!(count("hand_off"), 3);
    assert_eq!(count("access_granted"), 4);
}

#[test]
fn text_trace_shows_blocked_agents() {
    let output = berth().args(["race", "--agents", "3"]).output().unwrap();
    assert!(output.status.success());

    let out = stdout(&output);
    assert_eq!(out.lines().filter(|l| l.contains("Shipping blocked")).count(), 2);
    assert_eq!(out.lines().filter(|l| l.ends_with(": Ready to ship")).count(), 2);
}

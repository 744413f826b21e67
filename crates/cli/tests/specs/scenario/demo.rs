use crate::prelude::*;

#[test]
fn demo_prints_shipping_trace() {
    let output = berth().arg("demo").output().unwrap();

    assert!(output.status.success());
    similar_asserts::assert_eq!(
        stdout(&output),
        "\
UPS Package Shipped
FedEx Package Shipping blocked...waiting (queue position 1)
Delivering UPS Package
UPS Package released the packing slot
FedEx Package: Ready to ship
FedEx Package Shipped
=> packing: busy (holder fedex), queue []
"
    );
}

#[test]
fn demo_json_reports_steps_and_snapshot() {
    let output = berth().args(["demo", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let outcomes: Vec<&str> = json["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["outcome"].as_str().unwrap())
        .collect();
    assert_eq!(outcomes, vec!["granted", "queued", "completed"]);
    assert_eq!(json["snapshot"]["holder"], "fedex");
    assert_eq!(json["snapshot"]["queue"], serde_json::json!([]));
}

#[test]
fn reference_file_matches_builtin_demo() {
    let demo = berth().arg("demo").output().unwrap();
    let file = berth()
        .arg("run")
        .arg(scenario("reference.toml"))
        .output()
        .unwrap();

    similar_asserts::assert_eq!(stdout(&demo), stdout(&file));
}

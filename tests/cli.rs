use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const HEADER: &str = "Date\tAmount\tCommission\tVat\tVid\tChannel Type\tRunning Balance\tCode";

fn write_export(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let mut content = format!("Sales export\n{HEADER}\n");
    for r in rows {
        content.push_str(r);
        content.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn scenario_a(dir: &Path) -> PathBuf {
    write_export(
        dir,
        "jan.csv",
        &[
            "2025-01-15 09:00:00\t1000\t0\t0\t254499\tC2B\t1000\t'A1'",
            "2025-01-16 10:00:00\t-200\t0\t0\t254499\tREFUND\t800\t'A2'",
            "2025-01-17 11:00:00\t\t5\t10\t254499\tBANKCOST\t800\t'A3'",
        ],
    )
}

fn remit(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("remit").unwrap();
    cmd.env("REMIT_CONFIG_DIR", config).env("NO_COLOR", "1");
    cmd
}

#[test]
fn summary_shows_amount_to_remit() {
    let dir = tempfile::tempdir().unwrap();
    let file = scenario_a(dir.path());
    remit(dir.path())
        .arg("summary")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount to be Remitted"))
        .stdout(predicate::str::contains("712.00"))
        .stdout(predicate::str::contains("2025-01-15 to 2025-01-17"));
}

#[test]
fn report_csv_roundtrips_through_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let file = scenario_a(dir.path());
    let out = dir.path().join("out").join("report.csv");
    remit(dir.path())
        .args(["report", "--format", "csv", "--output"])
        .arg(&out)
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let text = std::fs::read_to_string(&out).unwrap();
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let rows: Vec<(String, String)> = rdr
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].to_string())
        })
        .collect();
    assert_eq!(rows.len(), 13);
    assert_eq!(rows[1], ("Uploaded Files".to_string(), "jan.csv".to_string()));
    assert_eq!(rows[12], ("Amount to be Remitted".to_string(), "712.00".to_string()));

    remit(dir.path())
        .arg("inspect")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nayax Commission (1% of C2B)"))
        .stdout(predicate::str::contains("712.00"));
}

#[test]
fn report_view_skips_bank_charge_without_bankcost() {
    let dir = tempfile::tempdir().unwrap();
    let file = scenario_a(dir.path());
    let out = dir.path().join("c2b.csv");
    remit(dir.path())
        .args(["report", "--channel", "C2B", "--output"])
        .arg(&out)
        .arg(&file)
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Bank Transfer Charges,0.00"));
    assert!(text.contains("Amount to be Remitted,985.00"));
    assert!(text.contains("Channel Types: C2B, Vendor IDs: 254499"));
}

#[test]
fn two_files_charge_bank_fee_twice() {
    let dir = tempfile::tempdir().unwrap();
    let a = scenario_a(dir.path());
    let b = write_export(
        dir.path(),
        "feb.csv",
        &["2025-02-01 09:00:00\t500\t0\t0\t254499\tC2B\t500\t'B1'"],
    );
    let out = dir.path().join("report.csv");
    remit(dir.path())
        .args(["report", "--output"])
        .arg(&out)
        .arg(&a)
        .arg(&b)
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Bank Transfer Charges,100.00"));
    assert!(text.contains("\"jan.csv, feb.csv\""));
}

#[test]
fn default_filters_skip_rows_without_vid_or_channel() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_export(
        dir.path(),
        "gaps.csv",
        &[
            "2025-01-15 09:00:00\t1000\t0\t0\t254499\tC2B\t1000\t'A1'",
            "2025-01-15 10:00:00\t500\t7\t3\t\tC2B\t1500\t'A2'",
            "2025-01-16 11:00:00\t\t9\t4\t254499\t\t1500\t'A3'",
        ],
    );
    let out = dir.path().join("gaps_report.csv");
    remit(dir.path())
        .args(["report", "--output"])
        .arg(&out)
        .arg(&file)
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Total Revenue,1000.00"));
    assert!(text.contains("Ipay Commissions,0.00"));
    assert!(text.contains("Total VAT,0.00"));
    assert!(text.contains("Amount to be Remitted,985.00"));
    assert!(text.contains("Channel Types: C2B, Vendor IDs: 254499"));

    remit(dir.path())
        .arg("summary")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("914.00"));
}

#[test]
fn missing_column_fails_with_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let good = scenario_a(dir.path());
    let bad = dir.path().join("bad.csv");
    std::fs::write(&bad, "title\nDate\tAmount\tVat\n2025-01-01\t5\t0\n").unwrap();
    remit(dir.path())
        .arg("summary")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.csv"))
        .stderr(predicate::str::contains(
            "Date, Amount, Commission, Vat, Vid, Channel Type",
        ))
        .stderr(predicate::str::contains("Troubleshooting"));
}

#[test]
fn malformed_vendor_mapping_warns_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let file = scenario_a(dir.path());
    remit(dir.path())
        .args(["daily", "--vendors", "{254499: 'Vendlite'}"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Using default mapping (254499: Vendlite)"))
        .stdout(predicate::str::contains("Vendlite"))
        .stdout(predicate::str::contains("Cumulative"));
}

#[test]
fn vendor_filter_with_no_match_renders_zeros() {
    let dir = tempfile::tempdir().unwrap();
    let file = scenario_a(dir.path());
    remit(dir.path())
        .args(["daily", "--vid", "1"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No data available after applying filters"));

    let out = dir.path().join("empty.csv");
    remit(dir.path())
        .args(["report", "--vid", "1", "--output"])
        .arg(&out)
        .arg(&file)
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Date Range,N/A"));
    assert!(text.contains("Total Revenue,0.00"));
    assert!(text.contains("Amount to be Remitted,0.00"));
}

#[test]
fn data_export_writes_filtered_rows() {
    let dir = tempfile::tempdir().unwrap();
    let file = scenario_a(dir.path());
    let out = dir.path().join("rows.csv");
    remit(dir.path())
        .args(["data", "--channel", "C2B,REFUND", "--output"])
        .arg(&out)
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 rows"));
    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("Source File,Date Only,Vendor Name"));
    assert!(lines[1].contains(",A1,jan.csv,2025-01-15,Vendlite"));
}

#[test]
fn saved_vendor_mapping_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let file = scenario_a(dir.path());
    remit(dir.path())
        .args(["vendors", "set", r#"{"254499": "Kiosk One"}"#])
        .assert()
        .success();
    remit(dir.path())
        .args(["vendors", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kiosk One"))
        .stdout(predicate::str::contains("saved"));
    remit(dir.path())
        .arg("daily")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Kiosk One"));

    remit(dir.path()).args(["vendors", "reset"]).assert().success();
    remit(dir.path())
        .args(["vendors", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendlite"));
}

#[test]
fn vendors_set_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    remit(dir.path())
        .args(["vendors", "set", "{\"x\": \"Nope\"}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid vendor mapping"));
}

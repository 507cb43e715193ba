use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const BASIC_CONFIG: &str = r#"
awsAccountId: "123456789012"
awsRegion: eu-west-1
appPrefix: site
app:
  appId: shop
  domainName: app.example.com
"#;

const CUSTOM_DOMAIN_CONFIG: &str = r#"
awsAccountId: "123456789012"
awsRegion: eu-west-1
appPrefix: site
app:
  appId: shop
  domainName: app.staging.example.com
  createCustomDomain: true
"#;

fn config_dir(environment: &str, contents: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(format!("{environment}.yaml")), contents).unwrap();
    dir
}

fn spa_stack(config_dir: &Path, environment: &str) -> Command {
    let mut cmd = Command::cargo_bin("spa-stack").unwrap();
    cmd.env_remove("SPA_STACK_ENV")
        .args(["--env", environment, "--config-dir"])
        .arg(config_dir);
    cmd
}

#[test]
fn help_lists_subcommands() {
    let out = Command::new(env!("CARGO_BIN_EXE_spa-stack"))
        .arg("--help")
        .output()
        .expect("failed to run --help");
    let s = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(0));
    for command in ["plan", "synth", "deploy"] {
        assert!(s.contains(command), "help should list {command}: {s}");
    }
}

#[test]
fn missing_environment_is_a_usage_error() {
    Command::new(env!("CARGO_BIN_EXE_spa-stack"))
        .env_remove("SPA_STACK_ENV")
        .arg("plan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--env"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    spa_stack(dir.path(), "qa")
        .arg("plan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("qa.yaml"));
}

#[test]
fn missing_account_id_names_key_and_file() {
    let dir = config_dir(
        "dev",
        "awsRegion: eu-west-1\nappPrefix: site\napp:\n  appId: shop\n",
    );
    spa_stack(dir.path(), "dev")
        .arg("plan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"awsAccountId\" is missing in"))
        .stderr(predicate::str::contains("dev.yaml"));
}

#[test]
fn missing_region_names_key() {
    let dir = config_dir(
        "dev",
        "awsAccountId: '123456789012'\nappPrefix: site\napp:\n  appId: shop\n",
    );
    spa_stack(dir.path(), "dev")
        .arg("plan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"awsRegion\" is missing in"));
}

#[test]
fn plan_prints_resources_in_submission_order() {
    let dir = config_dir("prod", BASIC_CONFIG);
    let output = spa_stack(dir.path(), "prod").arg("plan").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let bucket = stdout.find("bucket siteWebsiteBucket").unwrap();
    let distribution = stdout.find("distribution siteCloudFrontDistribution").unwrap();
    let parameter = stdout.find("string-parameter siteshopDeployParams").unwrap();
    assert!(bucket < distribution && distribution < parameter);
    assert!(!stdout.contains("certificate"));
    assert!(stdout.contains(r#"deploy-parameters-path = "/prod/deploy/app.example.com/env""#));
    assert!(stdout.contains(r#"AWS_S3_BUCKET=sitewebsitebucket\nDISTRIBUTION_ID=sitecloudfrontdistribution"#));
}

#[test]
fn plan_with_custom_domain_places_certificate_in_us_east_1() {
    let dir = config_dir("staging", CUSTOM_DOMAIN_CONFIG);
    spa_stack(dir.path(), "staging")
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "certificate siteWebsiteCertificate (us-east-1)",
        ))
        .stdout(predicate::str::contains("dns-record siteCloudfrontARecord"));
}

#[test]
fn custom_domain_without_domain_name_fails() {
    let dir = config_dir(
        "dev",
        "awsAccountId: '1'\nawsRegion: eu-west-1\nappPrefix: site\napp:\n  appId: shop\n  createCustomDomain: true\n",
    );
    spa_stack(dir.path(), "dev")
        .arg("plan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("domainName"));
}

#[test]
fn environment_can_come_from_env_var() {
    let dir = config_dir("prod", BASIC_CONFIG);
    Command::cargo_bin("spa-stack")
        .unwrap()
        .env("SPA_STACK_ENV", "prod")
        .arg("--config-dir")
        .arg(dir.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("/prod/deploy/app.example.com/env"));
}

#[test]
fn synth_prints_template_without_custom_domain() {
    let dir = config_dir("prod", BASIC_CONFIG);
    spa_stack(dir.path(), "prod")
        .arg("synth")
        .assert()
        .success()
        .stdout(predicate::str::contains("# prodSpaStack (eu-west-1)"))
        .stdout(predicate::str::contains("\"AWSTemplateFormatVersion\": \"2010-09-09\""))
        .stdout(predicate::str::contains("AWS::CloudFront::Distribution"));
}

#[test]
fn synth_writes_template_files() {
    let dir = config_dir("prod", BASIC_CONFIG);
    let out = dir.path().join("out");

    spa_stack(dir.path(), "prod")
        .args(["synth", "--out"])
        .arg(&out)
        .assert()
        .success();

    let template = fs::read_to_string(out.join("prodSpaStack.template.json")).unwrap();
    assert!(template.contains("siteWebsiteBucket"));
    assert!(template.contains("shop-distribution-id"));
}

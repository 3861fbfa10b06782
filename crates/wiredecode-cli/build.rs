use std::env;
use std::process::Command;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let build_date = git(&["log", "-1", "--format=%cI"])
        .or_else(source_date)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=WIREDECODE_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=WIREDECODE_BUILD_DATE={build_date}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    let value = String::from_utf8(output.stdout).ok()?;
    let value = value.trim();
    (output.status.success() && !value.is_empty()).then(|| value.to_string())
}

// Reproducible builds pin the date; otherwise fall back to the build clock.
fn source_date() -> Option<String> {
    let when = match env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
    {
        Some(secs) => OffsetDateTime::from_unix_timestamp(secs).ok()?,
        None => OffsetDateTime::now_utc(),
    };
    when.format(&Rfc3339).ok()
}

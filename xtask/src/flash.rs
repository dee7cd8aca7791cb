use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run(release: bool) -> Result<()> {
    let mode = if release { "release" } else { "debug" };

    println!();
    println!(
        "{}",
        format!("🔨 Building firmware ({} mode)...", mode)
            .cyan()
            .bold()
    );
    println!();

    // Build firmware for the RP2040 target
    let build_start = Instant::now();
    let mut build_cmd = Command::new("cargo");
    build_cmd
        .arg("build")
        .arg("-p")
        .arg("firmware")
        .arg("--target")
        .arg("thumbv6m-none-eabi")
        .arg("--features")
        .arg("hardware");

    if release {
        build_cmd.arg("--release");
    }

    let build_output = build_cmd.output().context("Failed to run cargo build")?;

    if !build_output.status.success() {
        eprintln!("{}", "✗ Build failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&build_output.stderr));
        anyhow::bail!("Build failed");
    }

    let build_time = build_start.elapsed();
    println!(
        "{}",
        format!("✓ Build successful in {:.2}s", build_time.as_secs_f64()).green()
    );
    println!();

    // Flash with probe-rs
    println!("{}", "📡 Flashing to RP2040...".cyan().bold());
    println!("   {}", "Connecting to probe...".dimmed());

    let flash_start = Instant::now();
    let mut flash_cmd = Command::new("probe-rs");
    flash_cmd.arg("run");

    if release {
        flash_cmd.arg("target/thumbv6m-none-eabi/release/firmware");
    } else {
        flash_cmd.arg("target/thumbv6m-none-eabi/debug/firmware");
    }

    flash_cmd
        .arg("--chip")
        .arg("RP2040")
        .arg("--probe-index")
        .arg("0");

    let flash_output = flash_cmd
        .output()
        .context("Failed to run probe-rs. Is probe-rs installed? (cargo install probe-rs-tools)")?;

    if !flash_output.status.success() {
        eprintln!("{}", "✗ Flash failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&flash_output.stderr));
        anyhow::bail!("Flash failed - check that the probe is connected and the device is powered");
    }

    let flash_time = flash_start.elapsed();
    println!(
        "{}",
        format!("✓ Flash successful in {:.2}s", flash_time.as_secs_f64()).green()
    );
    println!();
    println!("{}", "⏱ Harp clock hub is running on hardware!".bold());
    println!(
        "   {}",
        "Use 'probe-rs attach --chip RP2040' to view RTT logs".dimmed()
    );
    println!();

    Ok(())
}

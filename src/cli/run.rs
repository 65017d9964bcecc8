//! `run` command - spawn the configured cycles and narrate their callbacks
//!
//! Every cycle gets its own start/end printers. Scripted pause, resume and
//! retime changes run as side tasks on the same clock. When the run duration
//! is up the registry kills everything and a per-cycle report is returned.

use std::sync::Arc;
use std::time::Duration;

use colored::*;
use cycler::{Cycle, CycleClock, CycleRegistry, CycleState, ScaledClock};
use eyre::{Context, Result};
use log::info;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::{Config, CycleConfig, offset};

/// Effective settings for one run after CLI overrides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub duration_secs: f32,
    pub speed: f64,
}

impl RunOptions {
    /// Config values, overridden by whatever was given on the command line
    pub fn resolve(config: &Config, duration: Option<f32>, speed: Option<f64>) -> Self {
        Self {
            duration_secs: duration.unwrap_or(config.run.duration_secs),
            speed: speed.unwrap_or(config.run.speed),
        }
    }
}

/// Final state of one cycle after teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub name: String,
    pub completed: u64,
    pub state: CycleState,
}

/// Elapsed clock time since the run started, for event lines
#[derive(Debug, Clone, Copy)]
struct Timeline {
    started: Instant,
    clock: ScaledClock,
}

impl Timeline {
    fn stamp(&self) -> String {
        let elapsed = self.started.elapsed().as_secs_f64() * self.clock.factor();
        format!("[{:>7.2}s]", elapsed).dimmed().to_string()
    }
}

/// Run every configured cycle for the configured duration
pub async fn run_cycles(config: &Config, options: RunOptions) -> Result<Vec<CycleReport>> {
    let clock = ScaledClock::new(options.speed).context("Invalid clock speed")?;
    let duration = offset(options.duration_secs).context("Invalid run duration")?;
    let registry = CycleRegistry::with_clock(Arc::new(clock));
    let timeline = Timeline {
        started: Instant::now(),
        clock,
    };

    let mut controls = JoinSet::new();
    let mut cycles = Vec::with_capacity(config.cycles.len());
    for entry in &config.cycles {
        let cycle = spawn_cycle(&registry, entry, timeline)?;
        schedule_controls(&mut controls, &cycle, entry, timeline)?;
        cycles.push(cycle);
    }

    info!(
        "Running {} cycles for {:.2}s at {}x speed",
        registry.len(),
        options.duration_secs,
        options.speed
    );

    clock.sleep(duration).await;

    controls.abort_all();
    let killed = registry.kill_all();
    for cycle in &cycles {
        cycle.terminated().await;
    }
    info!("Teardown killed {} cycles", killed);

    Ok(cycles
        .iter()
        .map(|cycle| CycleReport {
            name: cycle.name().unwrap_or_default().to_string(),
            completed: cycle.completed(),
            state: cycle.state(),
        })
        .collect())
}

fn spawn_cycle(registry: &CycleRegistry, entry: &CycleConfig, timeline: Timeline) -> Result<Cycle> {
    let start_name = entry.name.clone();
    let end_name = entry.name.clone();

    Cycle::builder(entry.interval()?)
        .name(&entry.name)
        .playable(entry.playable)
        .on_start(move || {
            println!("{} {} {}", timeline.stamp(), start_name.cyan(), "start".green());
        })
        .on_end(move || {
            println!("{} {} {}", timeline.stamp(), end_name.cyan(), "end".blue());
        })
        .spawn(registry)
        .context(format!("Failed to spawn cycle '{}'", entry.name))
}

fn schedule_controls(
    controls: &mut JoinSet<()>,
    cycle: &Cycle,
    entry: &CycleConfig,
    timeline: Timeline,
) -> Result<()> {
    if let Some(at) = entry.pause_at_secs {
        let at = offset(at)?;
        let cycle = cycle.clone();
        controls.spawn(async move {
            timeline.clock.sleep(at).await;
            if !cycle.is_killed() {
                cycle.set_playable(false);
                println!("{} {} {}", timeline.stamp(), label(&cycle), "paused".yellow());
            }
        });
    }

    if let Some(at) = entry.resume_at_secs {
        let at = offset(at)?;
        let cycle = cycle.clone();
        controls.spawn(async move {
            timeline.clock.sleep(at).await;
            if !cycle.is_killed() {
                cycle.set_playable(true);
                println!("{} {} {}", timeline.stamp(), label(&cycle), "resumed".yellow());
            }
        });
    }

    if let Some((at, interval)) = entry.retime()? {
        let cycle = cycle.clone();
        controls.spawn(async move {
            timeline.clock.sleep(at).await;
            if !cycle.is_killed() && cycle.set_interval(interval).is_ok() {
                println!(
                    "{} {} {} {:.2}s",
                    timeline.stamp(),
                    label(&cycle),
                    "interval".yellow(),
                    interval.as_secs_f64()
                );
            }
        });
    }

    Ok(())
}

fn label(cycle: &Cycle) -> ColoredString {
    match cycle.name() {
        Some(name) => name.cyan(),
        None => cycle.id().to_string().cyan(),
    }
}

/// Print the end-of-run table
pub fn print_summary(reports: &[CycleReport], elapsed: Duration) {
    println!();
    println!("{}", "Summary".bold());
    for report in reports {
        println!(
            "  {:<16} {:>4} completed  {}",
            report.name.cyan(),
            report.completed,
            report.state
        );
    }
    println!("  {} {:.2}s", "Wall time:".dimmed(), elapsed.as_secs_f64());
}

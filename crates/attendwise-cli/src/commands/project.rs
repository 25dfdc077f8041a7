//! The `attendwise project` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use attendwise_core::clock::{Clock, FixedClock, SystemClock};
use attendwise_core::dates::parse_date;
use attendwise_core::{Projection, ProjectionMode};

pub async fn execute(
    target: String,
    mode: Option<ProjectionMode>,
    exclude: Vec<String>,
    snapshot: Option<PathBuf>,
    config: Option<PathBuf>,
    today: Option<String>,
    json: bool,
) -> Result<()> {
    let target_date =
        parse_date(&target).with_context(|| format!("unrecognised target date: {target}"))?;
    let clock: Arc<dyn Clock> = match today {
        Some(text) => {
            let date =
                parse_date(&text).with_context(|| format!("unrecognised date for --today: {text}"))?;
            Arc::new(FixedClock::at_midnight(date))
        }
        None => Arc::new(SystemClock),
    };

    let config = super::load_config(snapshot, config)?;
    let mode = mode.unwrap_or(config.default_mode);
    let session = super::connect(&config, clock).await?;

    for entry in &exclude {
        let (date, course) = match entry.rsplit_once('@') {
            Some((date, course)) => (date, Some(course)),
            None => (entry.as_str(), None),
        };
        session
            .add_exclusion(date, course)
            .with_context(|| format!("invalid --exclude {entry}"))?;
    }

    let projection = session.project(target_date, mode).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&*projection)?);
    } else {
        print_projection(&projection, session.exclusions().len());
    }
    Ok(())
}

fn print_projection(projection: &Projection, excluded: usize) {
    use comfy_table::{Cell, Table};

    println!(
        "Projection to {} ({} mode, {} working day(s), {} exclusion(s))",
        projection.target_date.format("%d/%m/%Y"),
        projection.mode,
        projection.working_days,
        excluded
    );

    let mut table = Table::new();
    table.set_header(vec![
        "Course", "Current", "Projected", "Change", "Attended", "Status",
    ]);
    for r in &projection.results {
        table.add_row(vec![
            Cell::new(&r.course_name),
            Cell::new(format!("{:.2}%", r.current.rounded_percentage())),
            Cell::new(format!("{:.2}%", r.projected.rounded_percentage())),
            Cell::new(format!("{:+.2}", r.delta)),
            Cell::new(format!("{}/{}", r.projected_present, r.projected_total)),
            Cell::new(r.projected.status),
        ]);
    }
    println!("{table}");

    let at_risk = projection.at_risk();
    if at_risk.is_empty() {
        println!("All courses projected safe.");
    } else {
        println!("At risk:");
        for r in at_risk {
            println!(
                "  {} ({}): attend {} more lecture(s) to reach 75%",
                r.course_name, r.projected.status, r.projected.must_attend
            );
        }
    }
}

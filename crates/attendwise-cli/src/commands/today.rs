//! The `attendwise today` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use attendwise_core::calendar::is_working_day;
use attendwise_core::clock::{Clock, FixedClock, SystemClock};
use attendwise_core::dates::parse_instant;
use attendwise_core::TodayStatus;

#[derive(Serialize)]
struct CourseToday<'a> {
    course_id: &'a str,
    course_code: &'a str,
    course_name: &'a str,
    status: TodayStatus,
}

pub async fn execute(
    snapshot: Option<PathBuf>,
    config: Option<PathBuf>,
    now: Option<String>,
    json: bool,
) -> Result<()> {
    let clock: Arc<dyn Clock> = match now {
        Some(text) => Arc::new(FixedClock(
            parse_instant(&text).with_context(|| format!("unrecognised time for --now: {text}"))?,
        )),
        None => Arc::new(SystemClock),
    };
    let today = clock.today();

    let config = super::load_config(snapshot, config)?;
    let session = super::connect(&config, clock).await?;

    let statuses = session.today_status().await?;
    let roster = session.roster().await?;
    let rows: Vec<CourseToday<'_>> = roster
        .iter()
        .filter_map(|course| {
            statuses.get(&course.course_id).map(|&status| CourseToday {
                course_id: &course.course_id,
                course_code: &course.course_code,
                course_name: &course.course_name,
                status,
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if !is_working_day(today) {
        println!("{}: no classes on weekends.", today.format("%A %d/%m/%Y"));
        return Ok(());
    }
    if rows.is_empty() {
        println!("{}: nothing scheduled.", today.format("%A %d/%m/%Y"));
        return Ok(());
    }

    use comfy_table::{Cell, Table};

    println!("{}", today.format("%A %d/%m/%Y"));
    let mut table = Table::new();
    table.set_header(vec!["Code", "Course", "Today"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.course_code),
            Cell::new(row.course_name),
            Cell::new(row.status),
        ]);
    }
    println!("{table}");
    Ok(())
}

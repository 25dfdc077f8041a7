//! The `attendwise ratio` command.

use anyhow::Result;

use attendwise_core::{compute_ratio, AttendanceCounts, RiskStatus};

pub fn execute(present: u32, total: u32, json: bool) -> Result<()> {
    let counts = AttendanceCounts::new(present, total)?;
    let ratio = compute_ratio(counts.present(), counts.total());

    if json {
        println!("{}", serde_json::to_string_pretty(&ratio)?);
        return Ok(());
    }

    println!(
        "{}/{} lectures: {:.2}% ({})",
        counts.present(),
        counts.total(),
        ratio.rounded_percentage(),
        ratio.status
    );
    match ratio.status {
        RiskStatus::Safe => println!("You can miss {} more lecture(s).", ratio.can_miss),
        RiskStatus::Warn | RiskStatus::Danger => println!(
            "Attend the next {} lecture(s) to get back to 75%.",
            ratio.must_attend
        ),
    }
    Ok(())
}

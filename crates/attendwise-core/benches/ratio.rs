use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use attendwise_core::ledger::ExclusionLedger;
use attendwise_core::model::{AttendanceCounts, CourseAttendance, CourseComponent};
use attendwise_core::projection::{project, ProjectionMode};
use attendwise_core::ratio::compute_ratio;

fn make_roster(courses: usize) -> Vec<CourseAttendance> {
    (0..courses)
        .map(|i| CourseAttendance {
            course_id: format!("c{i}"),
            course_code: format!("CS{i:03}"),
            course_name: format!("Course {i}"),
            components: vec![CourseComponent {
                comp_id: format!("c{i}-lec"),
                kind: "Lecture".into(),
                counts: Some(AttendanceCounts::new(20 + (i as u32 % 10), 30).unwrap()),
            }],
        })
        .collect()
}

fn bench_compute_ratio(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_ratio");

    group.bench_function("20/30", |b| {
        b.iter(|| compute_ratio(black_box(20), black_box(30)))
    });

    group.bench_function("sweep 0..=200", |b| {
        b.iter(|| {
            for present in 0..=200u32 {
                black_box(compute_ratio(present, 200));
            }
        })
    });

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let target = NaiveDate::from_ymd_opt(2027, 4, 30).unwrap();
    let roster = make_roster(12);

    let mut ledger = ExclusionLedger::new();
    for offset in (3..180).step_by(7) {
        let date = today + chrono::Duration::days(offset);
        ledger.add_date(date, None, today).unwrap();
        ledger.add_date(date + chrono::Duration::days(1), Some("c3"), today).unwrap();
    }

    let mut group = c.benchmark_group("project");

    group.bench_function("uniform 12 courses, semester", |b| {
        b.iter(|| project(black_box(&roster), target, ProjectionMode::Uniform, &ledger, today))
    });

    group.bench_function("none 12 courses", |b| {
        b.iter(|| project(black_box(&roster), target, ProjectionMode::None, &ledger, today))
    });

    group.finish();
}

criterion_group!(benches, bench_compute_ratio, bench_projection);
criterion_main!(benches);

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use dayflow_core::{
    build_day_windows, detect_overload, select_day_inputs, Availability, ClassicPlanningEngine,
    DayOfWeek, EnergyPeriod, EnergyProfile, EnergyRequired, Execution, LearnedAdjustment,
    MemoryModelStore, Priority, ScoreCalculator, SmartRecommender, Task, TaskStatus,
    TrainOutcome, HEURISTIC_TAG, LEARNED_TAG,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// 2026-03-02 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn at(date: NaiveDate, h: u32) -> NaiveDateTime {
    date.and_hms_opt(h, 0, 0).unwrap()
}

fn energy() -> EnergyProfile {
    EnergyProfile::from_entries([
        (EnergyPeriod::Morning, 9),
        (EnergyPeriod::Afternoon, 5),
        (EnergyPeriod::Evening, 3),
    ])
}

fn backlog() -> Vec<Task> {
    vec![
        Task::new("report", "Quarterly report")
            .with_priority(Priority::Critical)
            .with_energy(EnergyRequired::High)
            .with_duration(120)
            .with_due_date(monday()),
        Task::new("email", "Inbox zero")
            .with_priority(Priority::Low)
            .with_energy(EnergyRequired::Low)
            .with_duration(30),
        Task::new("review", "Code review")
            .with_priority(Priority::High)
            .with_energy(EnergyRequired::Medium)
            .with_duration(45),
        Task::new("plan", "Sprint planning")
            .with_priority(Priority::Medium)
            .with_energy(EnergyRequired::Medium)
            .with_duration(60),
    ]
}

fn availability() -> Vec<Availability> {
    vec![
        Availability::new(DayOfWeek::Monday, t(9, 0), t(12, 0)),
        Availability::new(DayOfWeek::Monday, t(13, 0), t(16, 0)),
        Availability::new(DayOfWeek::Tuesday, t(9, 0), t(17, 0)),
    ]
}

#[test]
fn test_plan_a_monday() {
    let engine = ClassicPlanningEngine::new(energy());
    let plan = engine.generate_day_plan(&backlog(), &availability(), monday(), monday());

    let task_slots: Vec<_> = plan.iter().filter(|s| !s.is_break).collect();
    assert_eq!(task_slots.len(), 4);

    // The critical report goes first, at the top of the morning.
    assert_eq!(task_slots[0].task_id.as_deref(), Some("report"));
    assert_eq!(task_slots[0].start, at(monday(), 9));

    // 120 minutes of work triggers a break straight after.
    assert!(plan[1].is_break);
    assert_eq!(plan[1].duration_minutes(), 10);

    let day = build_day_windows(&availability(), monday(), false);
    for slot in &plan {
        assert!(
            day.windows.iter().any(|w| slot.start >= w.start && slot.end <= w.end),
            "slot {slot:?} outside every window"
        );
    }
    for (i, a) in plan.iter().enumerate() {
        for b in &plan[i + 1..] {
            assert!(!a.overlaps(b));
        }
    }
}

#[test]
fn test_overload_scoped_to_the_day() {
    let monday_only: Vec<_> = availability()
        .into_iter()
        .filter(|a| a.day_of_week == DayOfWeek::Monday)
        .collect();
    let report = detect_overload(&backlog(), &monday_only);
    assert!(!report.overloaded);
    assert_eq!(report.total_task_minutes, 255);
    assert_eq!(report.total_available_minutes, 360);
}

#[test]
fn test_recommendation_uses_fallback_window_when_unconfigured() {
    // Wednesday has no availability; fallback gives 09:00-18:00.
    let wednesday = monday() + chrono::Duration::days(2);
    let day = build_day_windows(&availability(), wednesday, true);
    assert!(day.used_fallback);

    let recommender = SmartRecommender::heuristic(energy());
    let rec = recommender
        .recommend_slot(&backlog()[0], &day.windows)
        .expect("a 2h task fits in the default window");
    assert!(rec.start.hour() < 12);
    assert_eq!(rec.model_tag, HEURISTIC_TAG);
    assert!((0.0..=1.0).contains(&rec.confidence));
}

#[test]
fn test_learned_model_feeds_recommender() {
    let mut tasks = Vec::new();
    let mut executions = Vec::new();
    for i in 0..24u32 {
        let id = format!("h{i}");
        tasks.push(Task::new(&id, "history").with_duration(60));
        let hour = 8 + i % 9;
        let focus = if hour < 12 { 9 } else { 4 };
        executions.push(Execution::new(&id, at(monday(), hour)).with_focus(focus));
    }

    let mut learned = LearnedAdjustment::open(MemoryModelStore::new());
    assert_eq!(
        learned.train(&tasks, &executions, &energy()).unwrap(),
        TrainOutcome::Trained { samples: 24 }
    );

    let recommender = SmartRecommender::new(energy(), &learned);
    let windows = build_day_windows(&availability(), monday(), false).windows;
    let rec = recommender.recommend_slot(&backlog()[2], &windows).unwrap();
    assert_eq!(rec.model_tag, LEARNED_TAG);
    assert!(rec.start.hour() < 12);
}

#[test]
fn test_score_the_day_after() {
    let mut tasks = backlog();
    tasks[0].mark_done(at(monday(), 11));
    tasks[1].mark_done(at(monday(), 15));
    tasks[2].postpone();
    tasks[2].due_date = Some(monday());

    let executions = vec![
        Execution::new("report", at(monday(), 9)).with_focus(8).with_energy(8),
        Execution::new("email", at(monday(), 14)).with_focus(6).with_energy(6),
        Execution::new("review", at(monday() + chrono::Duration::days(1), 9)).with_focus(2),
    ];

    let inputs = select_day_inputs(&tasks, &executions, monday());
    assert_eq!(inputs.tasks.len(), 3);
    assert_eq!(inputs.executions.len(), 2);

    let score = ScoreCalculator::compute_daily_score(&inputs.tasks, &inputs.executions, monday());
    assert_eq!(score.tasks_completed, 2);
    assert_eq!(score.tasks_postponed, 1);
    assert_eq!(score.focus_score, 7.0);
    assert_eq!(score.energy_alignment_rate, 0.7);
    assert!(tasks.iter().any(|t| t.status == TaskStatus::Postponed));
    assert!((0.0..=100.0).contains(&score.total_score));
}

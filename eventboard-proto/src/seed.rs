//! Built-in demo records used by the offline client and by a store started
//! without a seed file.

use chrono::NaiveDate;

use crate::record::{Priority, Record, WorkflowStatus};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[allow(clippy::too_many_arguments)]
fn event(
    id: u64,
    title: &str,
    description: &str,
    (start, end): (Option<NaiveDate>, Option<NaiveDate>),
    location: &str,
    (event_type, event_format): (&str, &str),
    cost_center: &str,
    (organizer, requester): (&str, &str),
    attendees: u32,
    budget: u64,
    priority: Priority,
    status: WorkflowStatus,
) -> Record {
    Record {
        description: description.to_string(),
        organizer: organizer.to_string(),
        requester: requester.to_string(),
        location: location.to_string(),
        cost_center: cost_center.to_string(),
        event_type: event_type.to_string(),
        event_format: event_format.to_string(),
        priority: Some(priority),
        start_date: start,
        end_date: end,
        estimated_attendees: Some(attendees),
        estimated_budget: Some(budget),
        ..Record::new(id, title, status)
    }
}

/// Demo board: a handful of event requests spread over the three columns.
#[must_use]
pub fn demo_records() -> Vec<Record> {
    use WorkflowStatus::{Completed, InProgress, Pending};

    vec![
        event(
            1,
            "Marketing Conference",
            "Annual digital marketing event covering SEO, social media and e-commerce trends.",
            (date(2025, 7, 15), date(2025, 7, 17)),
            "São Paulo Convention Center",
            ("Talk", "On-site"),
            "MKT-001",
            ("Maria Silva", "João Santos"),
            200,
            15_000,
            Priority::High,
            Pending,
        ),
        event(
            2,
            "Advanced React Training",
            "Hands-on workshop on hooks, context and performance tuning.",
            (date(2025, 7, 20), date(2025, 7, 22)),
            "Training Room A",
            ("Training", "On-site"),
            "TI-002",
            ("Pedro Costa", "Ana Oliveira"),
            25,
            5_000,
            Priority::Medium,
            Pending,
        )
        .with_responsible("Lucas Pereira"),
        event(
            7,
            "Supplier Onboarding Day",
            "Introduce new suppliers to purchasing and invoicing processes.",
            (date(2025, 8, 5), date(2025, 8, 5)),
            "Auditorium",
            ("Meeting", "Hybrid"),
            "FIN-007",
            ("Rafael Souza", "Purchasing"),
            60,
            2_500,
            Priority::Low,
            Pending,
        ),
        event(
            3,
            "Q3 Planning Meeting",
            "Strategy meeting to set third-quarter goals.",
            (date(2025, 7, 10), date(2025, 7, 10)),
            "Main Meeting Room",
            ("Meeting", "On-site"),
            "ADM-003",
            ("Carlos Mendes", "Board of Directors"),
            15,
            500,
            Priority::High,
            InProgress,
        )
        .with_responsible("Beatriz Alves"),
        event(
            5,
            "Security Awareness Webinar",
            "Phishing and password hygiene session for all staff.",
            (date(2025, 7, 28), date(2025, 7, 28)),
            "Online",
            ("Talk", "Remote"),
            "TI-005",
            ("Juliana Rocha", "IT Security"),
            300,
            800,
            Priority::Medium,
            InProgress,
        ),
        event(
            4,
            "UX/UI Design Workshop",
            "Workshop on interface design and user experience principles.",
            (date(2025, 7, 1), date(2025, 7, 3)),
            "Design Lab",
            ("Training", "On-site"),
            "DES-004",
            ("Fernanda Lima", "Design Team"),
            20,
            3_000,
            Priority::Medium,
            Completed,
        ),
        event(
            6,
            "Quarterly Town Hall",
            "Company-wide results presentation and Q&A.",
            (date(2025, 6, 20), date(2025, 6, 20)),
            "Auditorium",
            ("Meeting", "Hybrid"),
            "ADM-006",
            ("Carlos Mendes", "Communications"),
            450,
            4_000,
            Priority::High,
            Completed,
        ),
    ]
}

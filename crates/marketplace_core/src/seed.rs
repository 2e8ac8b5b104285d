use shared::domain::{Service, ServiceId, Session, SessionId};

pub fn services() -> Vec<Service> {
    vec![
        service(
            1,
            "Amazon Interview Prep",
            "Emily R.",
            "Interview Prep",
            4.9,
            25,
            "Walk through Amazon-style behavioral questions, leadership principles, and mock questions tailored to your experience.",
            true,
        ),
        service(
            2,
            "Tech Resume Review",
            "Ryan P.",
            "Resume Review",
            4.7,
            20,
            "Line-by-line feedback on your resume, focusing on impact, metrics, and tailoring to software roles.",
            true,
        ),
        service(
            3,
            "Behavioral Interview Coaching",
            "Sofia M.",
            "Mock Interview",
            5.0,
            30,
            "Practice behavioral interviews using STAR stories and get detailed feedback on delivery and structure.",
            true,
        ),
        service(
            4,
            "Early Career Planning Session",
            "Alex G.",
            "Career Guidance",
            4.8,
            18,
            "Plan your next few semesters, internships, and side projects with a GT student who has gone through it.",
            false,
        ),
    ]
}

pub fn upcoming_sessions() -> Vec<Session> {
    vec![session(1, "Tech Resume Review", "Ryan P.", "2025-11-20", "16:00")]
}

pub fn past_sessions() -> Vec<Session> {
    vec![
        session(2, "Amazon Interview Prep", "Emily R.", "2025-11-01", "14:00"),
        session(
            3,
            "Behavioral Interview Coaching",
            "Sofia M.",
            "2025-10-15",
            "11:00",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn service(
    id: i64,
    title: &str,
    mentor: &str,
    category: &str,
    rating: f64,
    price: u32,
    description: &str,
    featured: bool,
) -> Service {
    Service {
        id: ServiceId(id),
        title: title.to_string(),
        mentor: mentor.to_string(),
        category: category.to_string(),
        rating: Some(rating),
        price,
        description: description.to_string(),
        featured,
    }
}

fn session(id: i64, service_title: &str, mentor: &str, date: &str, time: &str) -> Session {
    Session {
        id: SessionId(id),
        service_title: service_title.to_string(),
        mentor: mentor.to_string(),
        date: date.to_string(),
        time: Some(time.to_string()),
    }
}

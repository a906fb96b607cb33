use std::fmt::Write;
use std::sync::Arc;

use reps_types::config::Configuration;

pub const PROFESSOR_INFO: &str = "professor info";
pub const CLASSREP_INFO: &str = "classrep info";

/// Maps incoming chat text to a reply.
pub struct KeywordResponder {
    config: Arc<Configuration>,
}

impl KeywordResponder {
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }

    /// `None` for anything that is not a known keyword.
    pub fn respond(&self, text: &str) -> Option<String> {
        match text.trim() {
            PROFESSOR_INFO => Some(self.lecturers()),
            CLASSREP_INFO => Some(self.class_reps()),
            _ => None,
        }
    }

    fn lecturers(&self) -> String {
        let lecturers = &self.config.instance_config.lecturers;
        if lecturers.is_empty() {
            return "No lecturers are listed yet.".to_string();
        }

        let mut reply = String::from("Lecturers:");
        for l in lecturers {
            let _ = write!(reply, "\n{} <{}>, office {}", l.name, l.email, l.office);
        }
        reply
    }

    fn class_reps(&self) -> String {
        let reps = self.config.class_reps();
        if reps.is_empty() {
            return "No class representatives are listed yet.".to_string();
        }

        let mut reply = String::from("Class representatives:");
        for r in reps {
            let _ = write!(reply, "\n{} ({}, {}) <{}>", r.name, r.course, r.degree_code, r.email);
        }
        reply
    }
}

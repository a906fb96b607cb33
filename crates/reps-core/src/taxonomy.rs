//! Course and degree lookups over the loaded configuration.

use std::collections::HashSet;

use reps_types::config::{ClassRepresentative, Configuration, Course};
use reps_types::models::{GENERAL_CATEGORY, Ticket};

/// A ticket category is any configured course code, or `General`.
pub fn has_category(config: &Configuration, category: &str) -> bool {
    category == GENERAL_CATEGORY || config.courses().iter().any(|c| c.code == category)
}

pub fn has_degree(config: &Configuration, degree: &str) -> bool {
    config.loaded_degrees().iter().any(|d| d == degree)
}

pub fn find_course<'a>(config: &'a Configuration, code: &str) -> Option<&'a Course> {
    config.courses().iter().find(|c| c.code == code)
}

/// Whether the course `code` is part of the degree programme `degree`.
pub fn is_course_of_degree(config: &Configuration, code: &str, degree: &str) -> bool {
    find_course(config, code)
        .map(|c| c.degree_code.iter().any(|d| d == degree))
        .unwrap_or(false)
}

/// Keep tickets filed under a course belonging to `degree`. `General`
/// tickets belong to no degree.
pub fn filter_by_degree(config: &Configuration, tickets: Vec<Ticket>, degree: &str) -> Vec<Ticket> {
    tickets
        .into_iter()
        .filter(|t| is_course_of_degree(config, &t.category, degree))
        .collect()
}

/// Configured courses that have at least one ticket, in configuration order.
pub fn used_courses<'a>(config: &'a Configuration, used: &HashSet<String>) -> Vec<&'a Course> {
    config.courses().iter().filter(|c| used.contains(&c.code)).collect()
}

/// Representatives responsible for a complaint category. `General` reaches
/// everyone; a course reaches the reps of any degree the course is part of.
pub fn reps_for_category<'a>(config: &'a Configuration, category: &str) -> Vec<&'a ClassRepresentative> {
    if category == GENERAL_CATEGORY {
        return config.class_reps().iter().collect();
    }

    let Some(course) = find_course(config, category) else {
        return Vec::new();
    };
    config
        .class_reps()
        .iter()
        .filter(|rep| course.degree_code.contains(&rep.degree_code))
        .collect()
}

pub fn find_rep_by_email<'a>(config: &'a Configuration, email: &str) -> Option<&'a ClassRepresentative> {
    config.class_reps().iter().find(|rep| rep.email == email)
}

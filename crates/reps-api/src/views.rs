//! Page view models. Each page gets its own template struct; the shared
//! header, navigation and flash area come from [`Layout`].

use askama::Template;
use axum::response::Html;

use reps_types::config::{ClassRepresentative, Configuration, Course, ExternalResource, InstanceSettings, Lecturer};
use reps_types::models::{Comment, Ticket};
use reps_types::session::Flash;

use crate::error::AppError;
use crate::extract::current_admin;
use crate::session::SessionHandle;

pub struct Layout {
    pub site_title: String,
    pub site_scope: String,
    pub page_title: String,
    /// Navigation entry to highlight.
    pub section: &'static str,
    pub logged_in: bool,
    pub is_admin: bool,
    pub admin_name: String,
    pub flashes: Vec<Flash>,
    pub csrf_token: String,
    pub dev_mode: bool,
}

impl Layout {
    /// Build the layout for a page. Pending flashes are consumed.
    pub fn new(config: &Configuration, session: &SessionHandle, page_title: &str, section: &'static str) -> Self {
        let admin = current_admin(config, session);
        Self {
            site_title: config.site_name.clone(),
            site_scope: config.site_scope.clone(),
            page_title: page_title.to_string(),
            section,
            logged_in: session.auth().is_logged_in(),
            is_admin: admin.is_some(),
            admin_name: admin.map(|a| a.name).unwrap_or_default(),
            flashes: session.take_flashes(),
            csrf_token: session.csrf_token(),
            dev_mode: config.dev_mode,
        }
    }
}

pub fn render<T: Template>(page: T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub layout: Layout,
    pub instance: InstanceSettings,
}

impl IndexPage {
    pub fn links(&self) -> &[ExternalResource] {
        &self.instance.links
    }

    pub fn reps(&self) -> &[ClassRepresentative] {
        &self.instance.class_reps
    }
}

#[derive(Template)]
#[template(path = "tickets.html")]
pub struct TicketsPage {
    pub layout: Layout,
    pub tickets: Vec<Ticket>,
    pub category: String,
    pub degree: String,
    pub courses: Vec<Course>,
    pub degrees: Vec<String>,
    pub has_resolved: bool,
}

#[derive(Template)]
#[template(path = "ticket.html")]
pub struct TicketPage {
    pub layout: Layout,
    pub ticket: Ticket,
    pub body_html: String,
    pub comments: Vec<Comment>,
    pub upvoted: bool,
}

/// Shared by ticket creation and the admin edit form.
#[derive(Template)]
#[template(path = "ticket_form.html")]
pub struct TicketFormPage {
    pub layout: Layout,
    pub action: String,
    pub editing: bool,
    pub title: String,
    pub text: String,
    pub category: String,
    pub courses: Vec<Course>,
}

pub struct AnnouncementSummary {
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub created: String,
}

#[derive(Template)]
#[template(path = "announcements.html")]
pub struct AnnouncementsPage {
    pub layout: Layout,
    pub announcements: Vec<AnnouncementSummary>,
}

#[derive(Template)]
#[template(path = "announcement.html")]
pub struct AnnouncementPage {
    pub layout: Layout,
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub created: String,
    pub updated: String,
    pub body_html: String,
}

#[derive(Template)]
#[template(path = "announcement_form.html")]
pub struct AnnouncementFormPage {
    pub layout: Layout,
    pub action: String,
    pub editing: bool,
    pub title: String,
    pub text: String,
    pub tags: String,
}

#[derive(Template)]
#[template(path = "complaints.html")]
pub struct ComplaintsPage {
    pub layout: Layout,
    pub courses: Vec<Course>,
}

#[derive(Template)]
#[template(path = "complaints_confirm.html")]
pub struct ComplaintConfirmPage {
    pub layout: Layout,
    pub category: String,
    pub subject: String,
    pub message: String,
    pub email: String,
    pub recipients: Vec<String>,
}

#[derive(Template)]
#[template(path = "courses.html")]
pub struct CoursesPage {
    pub layout: Layout,
    pub courses: Vec<Course>,
}

#[derive(Template)]
#[template(path = "lecturers.html")]
pub struct LecturersPage {
    pub layout: Layout,
    pub lecturers: Vec<Lecturer>,
}

#[derive(Template)]
#[template(path = "privacy.html")]
pub struct PrivacyPage {
    pub layout: Layout,
}

pub struct LogEntry {
    pub admin: String,
    pub title: String,
    pub description: String,
    /// Set when the description is withheld from this visitor.
    pub hidden: bool,
    pub reason: String,
    pub created: String,
}

#[derive(Template)]
#[template(path = "logs.html")]
pub struct LogsPage {
    pub layout: Layout,
    pub entries: Vec<LogEntry>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub domain: String,
}

#[derive(Template)]
#[template(path = "verify.html")]
pub struct VerifyPage {
    pub layout: Layout,
    pub email: String,
}

#[derive(Template)]
#[template(path = "config.html")]
pub struct ConfigPage {
    pub layout: Layout,
    pub toml: String,
}

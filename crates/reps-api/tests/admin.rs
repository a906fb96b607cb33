mod common;

use common::{TestApp, ticket_id};

#[tokio::test]
async fn visitors_cannot_moderate() {
    let app = TestApp::new();
    let mut student = app.client("10.0.0.1");
    let reply = student
        .post("/tickets/new", &[("title", "Hello"), ("text", "Some text"), ("category", "General")])
        .await;
    let id = ticket_id(&reply);

    let reply = student.post(&format!("/tickets/{id}/resolve"), &[]).await;
    assert_eq!(reply.location.as_deref(), Some("/"));
    assert!(!app.state.db.get_ticket(id).unwrap().unwrap().is_resolved);

    let reply = student.post(&format!("/tickets/{id}/delete"), &[]).await;
    assert_eq!(reply.location.as_deref(), Some("/"));
    assert!(app.state.db.get_ticket(id).unwrap().is_some());
    assert!(app.state.db.get_moderations().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_comment_is_logged() {
    let app = TestApp::new();
    let mut student = app.client("10.0.0.1");
    let reply = student
        .post("/tickets/new", &[("title", "Printer"), ("text", "Out of toner"), ("category", "General")])
        .await;
    let id = ticket_id(&reply);
    student.post(&format!("/tickets/{id}"), &[("text", "spam spam")]).await;
    let comment = app.state.db.get_comments_for_ticket(id).unwrap().remove(0);

    let mut rep = app.client("10.0.0.9");
    rep.login_as("mr137").await;
    let reply = rep.post(&format!("/tickets/{id}/del/{}", comment.id), &[]).await;
    assert_eq!(reply.location, Some(format!("/tickets/{id}")));
    assert!(app.state.db.get_comments_for_ticket(id).unwrap().is_empty());

    let log = app.state.db.get_moderations().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].admin, "Maleeha");
    assert_eq!(log[0].description, "Deleted");
    assert!(log[0].title.contains(&comment.poster_id));
}

#[tokio::test]
async fn comments_are_only_deleted_through_their_own_ticket() {
    let app = TestApp::new();
    let mut student = app.client("10.0.0.1");
    let mut ids = Vec::new();
    for title in ["Printer", "Heating"] {
        let reply = student
            .post("/tickets/new", &[("title", title), ("text", "Broken again"), ("category", "General")])
            .await;
        ids.push(ticket_id(&reply));
    }
    student.post(&format!("/tickets/{}", ids[0]), &[("text", "me too")]).await;
    let comment = app.state.db.get_comments_for_ticket(ids[0]).unwrap().remove(0);

    let mut rep = app.client("10.0.0.9");
    rep.login_as("mr137").await;
    let reply = rep.post(&format!("/tickets/{}/del/{}", ids[1], comment.id), &[]).await;
    assert_eq!(reply.location, Some(format!("/tickets/{}", ids[1])));
    assert_eq!(app.state.db.get_comments_for_ticket(ids[0]).unwrap().len(), 1);
    assert!(app.state.db.get_moderations().unwrap().is_empty());
    assert!(rep.get("/tickets").await.body.contains("Comment not found!"));
}

#[tokio::test]
async fn edits_may_go_below_submission_limits() {
    let app = TestApp::new();
    let mut student = app.client("10.0.0.1");
    let reply = student
        .post("/tickets/new", &[("title", "Lecture notes"), ("text", "Please upload them"), ("category", "General")])
        .await;
    let id = ticket_id(&reply);

    let mut rep = app.client("10.0.0.9");
    rep.login_as("ha82").await;
    let reply = rep
        .post(
            &format!("/tickets/{id}/edit"),
            &[("title", "Lecture notes"), ("text", "n/a"), ("category", "General"), ("reason", "Duplicate")],
        )
        .await;
    assert_eq!(reply.location, Some(format!("/tickets/{id}")));
    assert_eq!(app.state.db.get_ticket(id).unwrap().unwrap().description, "n/a");

    let log = app.state.db.get_moderations().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].reason, "Duplicate");

    let reply = rep
        .post(
            &format!("/tickets/{id}/edit"),
            &[("title", "Lecture notes"), ("text", "   "), ("category", "General"), ("reason", "")],
        )
        .await;
    assert_eq!(reply.location, Some(format!("/tickets/{id}/edit")));
    assert_eq!(app.state.db.get_ticket(id).unwrap().unwrap().description, "n/a");
}

#[tokio::test]
async fn sensitive_edit_reasons_are_hidden_from_visitors() {
    let app = TestApp::new();
    let mut student = app.client("10.0.0.1");
    let reply = student
        .post("/tickets/new", &[("title", "Rude title"), ("text", "Some text"), ("category", "General")])
        .await;
    let id = ticket_id(&reply);

    let mut rep = app.client("10.0.0.9");
    rep.login_as("ha82").await;
    let reply = rep
        .post(
            &format!("/tickets/{id}/edit"),
            &[
                ("title", "Polite title"),
                ("text", "Some text"),
                ("category", "General"),
                ("reason", "Language"),
                ("sensitive", "on"),
            ],
        )
        .await;
    assert_eq!(reply.location, Some(format!("/tickets/{id}")));
    assert_eq!(app.state.db.get_ticket(id).unwrap().unwrap().title, "Polite title");

    let public = student.get("/logs").await.body;
    assert!(public.contains("Language"));
    assert!(!public.contains("Polite title"));
    assert!(public.contains("<em>hidden</em>"));

    let private = rep.get("/logs").await.body;
    assert!(private.contains("Polite title"));
}

#[tokio::test]
async fn edit_with_unknown_category_leaves_ticket_unchanged() {
    let app = TestApp::new();
    let mut rep = app.client("10.0.0.9");
    rep.login_as("ha82").await;
    let reply = rep
        .post("/tickets/new", &[("title", "Timetable"), ("text", "Some text"), ("category", "General")])
        .await;
    let id = ticket_id(&reply);

    let reply = rep
        .post(
            &format!("/tickets/{id}/edit"),
            &[("title", "Timetable"), ("text", "Some text"), ("category", "ZZ00"), ("reason", "")],
        )
        .await;
    assert_eq!(reply.location, Some(format!("/tickets/{id}")));
    assert_eq!(app.state.db.get_ticket(id).unwrap().unwrap().category, "General");
    assert!(app.state.db.get_moderations().unwrap().is_empty());
}

#[tokio::test]
async fn announcements_are_published_and_logged() {
    let app = TestApp::new();
    let mut rep = app.client("10.0.0.9");
    rep.login_as("jss2").await;

    let reply = rep
        .post("/a/new", &[("title", "Exam timetable"), ("text", "Out **now**"), ("tags", "exams, timetable")])
        .await;
    let location = reply.location.unwrap();
    assert!(location.starts_with("/a/"));

    let mut student = app.client("10.0.0.1");
    assert!(student.get("/a").await.body.contains("Exam timetable"));
    assert!(student.get(&location).await.body.contains("<strong>now</strong>"));

    let log = app.state.db.get_moderations().unwrap();
    assert_eq!(log[0].title, "Announcement \"Exam timetable\"");
    assert_eq!(log[0].description, "Created");
}

#[tokio::test]
async fn general_complaint_reaches_every_representative() {
    let app = TestApp::new();
    let mut student = app.client("10.0.0.1");
    let fields = [("category", "General"), ("subject", "Noise"), ("message", "Library is loud"), ("email", "")];

    // First submission only asks for confirmation.
    let reply = student.post("/complaints", &fields).await;
    assert!(reply.body.contains("Confirm complaint"));
    assert!(app.mailer.last().is_none());

    let mut confirmed = fields.to_vec();
    confirmed.push(("confirm", "1"));
    let reply = student.post("/complaints", &confirmed).await;
    assert_eq!(reply.location.as_deref(), Some("/complaints"));

    let mail = app.mailer.last().unwrap();
    assert_eq!(mail.recipients.len(), app.state.config().class_reps().len());
    assert!(mail.body.contains("From: anonymous"));
}

#[tokio::test]
async fn course_complaint_reaches_reps_of_its_degrees() {
    let app = TestApp::new();
    let mut student = app.client("10.0.0.1");
    let fields = [
        ("category", "F20SF"),
        ("subject", "Marking"),
        ("message", "Coursework marks late"),
        ("email", "me@hw.ac.uk"),
        ("confirm", "1"),
    ];
    student.post("/complaints", &fields).await;

    let mail = app.mailer.last().unwrap();
    assert_eq!(mail.recipients, vec!["jss2@hw.ac.uk".to_string()]);
}

#[tokio::test]
async fn invalid_config_keeps_the_running_one() {
    let app = TestApp::new();
    let mut rep = app.client("10.0.0.9");
    rep.login_as("ha82").await;
    let before = app.state.config();

    let reply = rep.post("/config", &[("config", "SiteName = ")]).await;
    assert_eq!(reply.location.as_deref(), Some("/config"));
    assert_eq!(*app.state.config(), *before);
}

#[tokio::test]
async fn valid_config_is_applied_and_saved() {
    let app = TestApp::new();
    let mut rep = app.client("10.0.0.9");
    rep.login_as("ha82").await;

    let mut next = (*app.state.config()).clone();
    next.site_name = "Renamed".into();
    let text = next.to_toml().unwrap();

    let reply = rep.post("/config", &[("config", text.as_str())]).await;
    assert_eq!(reply.location.as_deref(), Some("/config"));
    assert_eq!(app.state.config().site_name, "Renamed");

    let saved = reps_types::config::Configuration::from_file(&app.state.config_path).unwrap();
    assert_eq!(saved.site_name, "Renamed");
}

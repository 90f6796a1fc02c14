use leadbook_core::db::open_db_in_memory;
use leadbook_core::{
    Agent, AgentService, CommentListQuery, CommentService, CreateAgentRequest,
    CreateCommentRequest, CreateLeadRequest, CreateTagRequest, EntityKind, LeadRecord,
    LeadService, ServiceError, SqliteAgentRepository, SqliteCommentRepository,
    SqliteLeadRepository, SqliteTagRepository, TagService, UpdateCommentRequest,
};
use rusqlite::Connection;
use uuid::Uuid;

fn agent_service(
    conn: &Connection,
) -> AgentService<SqliteAgentRepository<'_>, SqliteLeadRepository<'_>> {
    AgentService::new(
        SqliteAgentRepository::try_new(conn).unwrap(),
        SqliteLeadRepository::try_new(conn).unwrap(),
    )
}

fn lead_service(
    conn: &Connection,
) -> LeadService<SqliteLeadRepository<'_>, SqliteAgentRepository<'_>> {
    LeadService::new(
        SqliteLeadRepository::try_new(conn).unwrap(),
        SqliteAgentRepository::try_new(conn).unwrap(),
    )
}

fn comment_service(
    conn: &Connection,
) -> CommentService<SqliteCommentRepository<'_>, SqliteLeadRepository<'_>, SqliteAgentRepository<'_>>
{
    CommentService::new(
        SqliteCommentRepository::try_new(conn).unwrap(),
        SqliteLeadRepository::try_new(conn).unwrap(),
        SqliteAgentRepository::try_new(conn).unwrap(),
    )
}

fn tag_service(conn: &Connection) -> TagService<SqliteTagRepository<'_>> {
    TagService::new(SqliteTagRepository::try_new(conn).unwrap())
}

fn make_agent(conn: &Connection, name: &str, email: &str) -> Agent {
    agent_service(conn)
        .create_agent(&CreateAgentRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        })
        .unwrap()
}

fn make_lead(conn: &Connection, name: &str, agent: Uuid) -> LeadRecord {
    lead_service(conn)
        .create_lead(&CreateLeadRequest {
            name: Some(name.to_string()),
            source: Some("referral".to_string()),
            sales_agent: Some(agent),
            ..CreateLeadRequest::default()
        })
        .unwrap()
}

fn comment_request(lead: Uuid, author: Uuid, text: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        lead: Some(lead),
        author: Some(author),
        comment_text: Some(text.to_string()),
    }
}

#[test]
fn create_comment_and_list_with_resolution() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let lead = make_lead(&conn, "Acme rollout", agent.id);
    let service = comment_service(&conn);

    let created = service
        .create_comment(&comment_request(lead.lead.id, agent.id, "Called, interested"))
        .unwrap();
    assert_eq!(created.lead, lead.lead.id);
    assert_eq!(created.author, agent.id);
    assert_eq!(created.comment_text, "Called, interested");
    assert!(created.created_at > 0);

    let listed = service.list_comments(&CommentListQuery::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].comment.id, created.id);
    assert_eq!(listed[0].lead_name.as_deref(), Some("Acme rollout"));
    assert_eq!(listed[0].author_name.as_deref(), Some("Asha Rao"));
    assert_eq!(listed[0].author_email.as_deref(), Some("asha@example.com"));
}

#[test]
fn create_comment_rejects_missing_fields() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let lead = make_lead(&conn, "Acme rollout", agent.id);
    let service = comment_service(&conn);

    let mut request = comment_request(lead.lead.id, agent.id, "text");
    request.lead = None;
    assert!(matches!(
        service.create_comment(&request).unwrap_err(),
        ServiceError::MissingField("lead")
    ));

    let mut request = comment_request(lead.lead.id, agent.id, "text");
    request.author = None;
    assert!(matches!(
        service.create_comment(&request).unwrap_err(),
        ServiceError::MissingField("author")
    ));

    let mut request = comment_request(lead.lead.id, agent.id, "text");
    request.comment_text = Some("   ".to_string());
    assert!(matches!(
        service.create_comment(&request).unwrap_err(),
        ServiceError::MissingField("comment_text")
    ));
}

#[test]
fn create_comment_with_unresolvable_references_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let lead = make_lead(&conn, "Acme rollout", agent.id);
    let service = comment_service(&conn);

    let ghost = Uuid::new_v4();
    let err = service
        .create_comment(&comment_request(ghost, agent.id, "orphan"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidReference { field: "lead", .. }
    ));

    let err = service
        .create_comment(&comment_request(lead.lead.id, ghost, "orphan"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidReference { field: "author", .. }
    ));

    let listed = service.list_comments(&CommentListQuery::default()).unwrap();
    assert!(listed.is_empty());
}

#[test]
fn list_comments_filters_by_lead() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let lead_a = make_lead(&conn, "Acme rollout", agent.id);
    let lead_b = make_lead(&conn, "Beta pilot", agent.id);
    let service = comment_service(&conn);

    service
        .create_comment(&comment_request(lead_a.lead.id, agent.id, "on acme"))
        .unwrap();
    service
        .create_comment(&comment_request(lead_b.lead.id, agent.id, "on beta"))
        .unwrap();

    let filtered = service
        .list_comments(&CommentListQuery {
            lead: Some(lead_b.lead.id),
            ..CommentListQuery::default()
        })
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].comment.comment_text, "on beta");
}

#[test]
fn update_comment_text_replaces_content() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let lead = make_lead(&conn, "Acme rollout", agent.id);
    let service = comment_service(&conn);

    let created = service
        .create_comment(&comment_request(lead.lead.id, agent.id, "draft"))
        .unwrap();
    let updated = service
        .update_comment_text(
            created.id,
            &UpdateCommentRequest {
                comment_text: Some("final wording".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.comment_text, "final wording");

    let err = service
        .update_comment_text(created.id, &UpdateCommentRequest { comment_text: None })
        .unwrap_err();
    assert!(matches!(err, ServiceError::MissingField("comment_text")));
}

#[test]
fn update_missing_comment_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = comment_service(&conn);

    let err = service
        .update_comment_text(
            Uuid::new_v4(),
            &UpdateCommentRequest {
                comment_text: Some("ghost".to_string()),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Comment,
            ..
        }
    ));
}

#[test]
fn delete_comment_removes_record() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let lead = make_lead(&conn, "Acme rollout", agent.id);
    let service = comment_service(&conn);

    let created = service
        .create_comment(&comment_request(lead.lead.id, agent.id, "temp"))
        .unwrap();
    service.delete_comment(created.id).unwrap();

    assert!(service.list_comments(&CommentListQuery::default()).unwrap().is_empty());
    assert!(matches!(
        service.delete_comment(created.id).unwrap_err(),
        ServiceError::NotFound {
            kind: EntityKind::Comment,
            ..
        }
    ));
}

#[test]
fn comments_survive_lead_deletion_as_dangling_references() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let lead = make_lead(&conn, "Acme rollout", agent.id);
    let comments = comment_service(&conn);

    comments
        .create_comment(&comment_request(lead.lead.id, agent.id, "history"))
        .unwrap();
    lead_service(&conn).delete_lead(lead.lead.id).unwrap();

    let listed = comments.list_comments(&CommentListQuery::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].lead_name, None);
    assert_eq!(listed[0].author_name.as_deref(), Some("Asha Rao"));
}

#[test]
fn create_tag_and_list_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);

    let older = service
        .create_tag(&CreateTagRequest {
            name: Some("enterprise".to_string()),
        })
        .unwrap();
    let newer = service
        .create_tag(&CreateTagRequest {
            name: Some("  follow-up  ".to_string()),
        })
        .unwrap();
    assert_eq!(newer.name, "follow-up");

    conn.execute(
        "UPDATE tags SET created_at = 1000 WHERE uuid = ?1;",
        [older.id.to_string()],
    )
    .unwrap();
    conn.execute(
        "UPDATE tags SET created_at = 2000 WHERE uuid = ?1;",
        [newer.id.to_string()],
    )
    .unwrap();

    let listed = service.list_tags().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newer.id);
    assert_eq!(listed[1].id, older.id);
}

#[test]
fn create_tag_rejects_missing_name() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);

    let err = service.create_tag(&CreateTagRequest { name: None }).unwrap_err();
    assert!(matches!(err, ServiceError::MissingField("name")));
}

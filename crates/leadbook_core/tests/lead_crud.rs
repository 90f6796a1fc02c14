use leadbook_core::db::open_db_in_memory;
use leadbook_core::{
    Agent, AgentService, CreateAgentRequest, CreateLeadRequest, EntityKind, LeadListQuery,
    LeadPriority, LeadService, LeadStatus, ServiceError, SqliteAgentRepository,
    SqliteLeadRepository, UpdateLeadRequest,
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

fn make_agent(conn: &Connection, name: &str, email: &str) -> Agent {
    agent_service(conn)
        .create_agent(&CreateAgentRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        })
        .unwrap()
}

fn lead_request(name: &str, agent: Uuid) -> CreateLeadRequest {
    CreateLeadRequest {
        name: Some(name.to_string()),
        source: Some("referral".to_string()),
        sales_agent: Some(agent),
        ..CreateLeadRequest::default()
    }
}

#[test]
fn create_defaults_status_to_new_and_resolves_agent() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let record = service.create_lead(&lead_request("Acme rollout", agent.id)).unwrap();
    assert_eq!(record.lead.name, "Acme rollout");
    assert_eq!(record.lead.source, "referral");
    assert_eq!(record.lead.sales_agent, agent.id);
    assert_eq!(record.lead.status, LeadStatus::New);
    assert_eq!(record.lead.closed_at, None);
    assert!(record.lead.created_at > 0);
    assert_eq!(record.agent_name.as_deref(), Some("Asha Rao"));
    assert_eq!(record.agent_email.as_deref(), Some("asha@example.com"));
}

#[test]
fn create_rejects_missing_required_fields() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let mut request = lead_request("Acme rollout", agent.id);
    request.name = None;
    assert!(matches!(
        service.create_lead(&request).unwrap_err(),
        ServiceError::MissingField("name")
    ));

    let mut request = lead_request("Acme rollout", agent.id);
    request.source = Some("  ".to_string());
    assert!(matches!(
        service.create_lead(&request).unwrap_err(),
        ServiceError::MissingField("source")
    ));

    let mut request = lead_request("Acme rollout", agent.id);
    request.sales_agent = None;
    assert!(matches!(
        service.create_lead(&request).unwrap_err(),
        ServiceError::MissingField("sales_agent")
    ));
}

#[test]
fn create_rejects_unresolvable_sales_agent() {
    let conn = open_db_in_memory().unwrap();
    let service = lead_service(&conn);

    let ghost = Uuid::new_v4();
    let err = service.create_lead(&lead_request("Acme rollout", ghost)).unwrap_err();
    match err {
        ServiceError::InvalidReference { field, id } => {
            assert_eq!(field, "sales_agent");
            assert_eq!(id, ghost);
        }
        other => panic!("unexpected error: {other}"),
    }

    let listed = service.list_leads(&LeadListQuery::default()).unwrap();
    assert!(listed.is_empty());
}

#[test]
fn create_directly_closed_stamps_closed_at() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let mut request = lead_request("Walk-in deal", agent.id);
    request.status = Some(LeadStatus::Closed);
    let record = service.create_lead(&request).unwrap();

    assert_eq!(record.lead.status, LeadStatus::Closed);
    assert!(record.lead.closed_at.is_some());
}

#[test]
fn create_persists_optional_fields_and_tags() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let tag_a = Uuid::new_v4();
    let tag_b = Uuid::new_v4();
    let mut request = lead_request("Acme rollout", agent.id);
    request.status = Some(LeadStatus::Qualified);
    request.tags = vec![tag_a, tag_b, tag_a];
    request.time_to_close = Some(30);
    request.priority = Some(LeadPriority::High);

    let record = service.create_lead(&request).unwrap();
    assert_eq!(record.lead.status, LeadStatus::Qualified);
    assert_eq!(record.lead.time_to_close, Some(30));
    assert_eq!(record.lead.priority, Some(LeadPriority::High));
    assert_eq!(record.lead.tags.len(), 2);
    assert!(record.lead.tags.contains(&tag_a));
    assert!(record.lead.tags.contains(&tag_b));
}

#[test]
fn update_transition_into_closed_stamps_closed_at_once() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let record = service.create_lead(&lead_request("Acme rollout", agent.id)).unwrap();
    let closed = service
        .update_lead(
            record.lead.id,
            &UpdateLeadRequest {
                status: Some(LeadStatus::Closed),
                ..UpdateLeadRequest::default()
            },
        )
        .unwrap();
    let stamped = closed.lead.closed_at.expect("closed_at should be stamped");

    // A second closing update must not move the original close time.
    let again = service
        .update_lead(
            record.lead.id,
            &UpdateLeadRequest {
                status: Some(LeadStatus::Closed),
                ..UpdateLeadRequest::default()
            },
        )
        .unwrap();
    assert_eq!(again.lead.closed_at, Some(stamped));
}

#[test]
fn update_honors_explicit_closed_at() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let record = service.create_lead(&lead_request("Acme rollout", agent.id)).unwrap();
    let updated = service
        .update_lead(
            record.lead.id,
            &UpdateLeadRequest {
                status: Some(LeadStatus::Closed),
                closed_at: Some(1_700_000_000_000),
                ..UpdateLeadRequest::default()
            },
        )
        .unwrap();
    assert_eq!(updated.lead.closed_at, Some(1_700_000_000_000));
}

#[test]
fn update_revalidates_sales_agent_only_when_it_changes() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let record = service.create_lead(&lead_request("Acme rollout", agent.id)).unwrap();

    let ghost = Uuid::new_v4();
    let err = service
        .update_lead(
            record.lead.id,
            &UpdateLeadRequest {
                sales_agent: Some(ghost),
                ..UpdateLeadRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidReference {
            field: "sales_agent",
            ..
        }
    ));

    // Simulate a stale reference left behind in storage: updates not
    // touching the reference field must still go through.
    conn.execute(
        "UPDATE leads SET sales_agent = ?1 WHERE uuid = ?2;",
        [ghost.to_string(), record.lead.id.to_string()],
    )
    .unwrap();
    let renamed = service
        .update_lead(
            record.lead.id,
            &UpdateLeadRequest {
                name: Some("Acme rollout (renewal)".to_string()),
                ..UpdateLeadRequest::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.lead.name, "Acme rollout (renewal)");
    assert_eq!(renamed.agent_name, None);
}

#[test]
fn update_replaces_whole_tag_set() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let tag_a = Uuid::new_v4();
    let tag_b = Uuid::new_v4();
    let mut request = lead_request("Acme rollout", agent.id);
    request.tags = vec![tag_a, tag_b];
    let record = service.create_lead(&request).unwrap();
    assert_eq!(record.lead.tags.len(), 2);

    let tag_c = Uuid::new_v4();
    let updated = service
        .update_lead(
            record.lead.id,
            &UpdateLeadRequest {
                tags: Some(vec![tag_c]),
                ..UpdateLeadRequest::default()
            },
        )
        .unwrap();
    assert_eq!(updated.lead.tags, vec![tag_c]);
}

#[test]
fn update_missing_lead_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = lead_service(&conn);

    let err = service
        .update_lead(
            Uuid::new_v4(),
            &UpdateLeadRequest {
                name: Some("Ghost".to_string()),
                ..UpdateLeadRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Lead,
            ..
        }
    ));
}

#[test]
fn delete_is_unconditional_and_drops_tag_links() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let mut request = lead_request("Acme rollout", agent.id);
    request.tags = vec![Uuid::new_v4()];
    let record = service.create_lead(&request).unwrap();

    service.delete_lead(record.lead.id).unwrap();
    assert!(matches!(
        service.get_lead(record.lead.id).unwrap_err(),
        ServiceError::NotFound {
            kind: EntityKind::Lead,
            ..
        }
    ));

    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM lead_tags;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn list_filters_by_status_and_agent() {
    let conn = open_db_in_memory().unwrap();
    let asha = make_agent(&conn, "Asha Rao", "asha@example.com");
    let noor = make_agent(&conn, "Noor Khan", "noor@example.com");
    let service = lead_service(&conn);

    let mut qualified = lead_request("Qualified deal", asha.id);
    qualified.status = Some(LeadStatus::Qualified);
    service.create_lead(&qualified).unwrap();
    service.create_lead(&lead_request("Fresh deal", asha.id)).unwrap();
    service.create_lead(&lead_request("Other book", noor.id)).unwrap();

    let by_status = service
        .list_leads(&LeadListQuery {
            status: Some(LeadStatus::Qualified),
            ..LeadListQuery::default()
        })
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].lead.name, "Qualified deal");

    let by_agent = service
        .list_leads(&LeadListQuery {
            sales_agent: Some(noor.id),
            ..LeadListQuery::default()
        })
        .unwrap();
    assert_eq!(by_agent.len(), 1);
    assert_eq!(by_agent[0].lead.sales_agent, noor.id);
}

#[test]
fn list_orders_newest_first_with_limit_and_offset() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let first = service.create_lead(&lead_request("first", agent.id)).unwrap();
    let second = service.create_lead(&lead_request("second", agent.id)).unwrap();
    let third = service.create_lead(&lead_request("third", agent.id)).unwrap();

    for (record, stamp) in [(&first, 1000), (&second, 2000), (&third, 3000)] {
        conn.execute(
            "UPDATE leads SET created_at = ?1 WHERE uuid = ?2;",
            rusqlite::params![stamp, record.lead.id.to_string()],
        )
        .unwrap();
    }

    let page = service
        .list_leads(&LeadListQuery {
            limit: Some(2),
            offset: 1,
            ..LeadListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].lead.id, second.lead.id);
    assert_eq!(page[1].lead.id, first.lead.id);
}

#[test]
fn lead_serialization_uses_expected_wire_fields() {
    let conn = open_db_in_memory().unwrap();
    let agent = make_agent(&conn, "Asha Rao", "asha@example.com");
    let service = lead_service(&conn);

    let mut request = lead_request("Acme rollout", agent.id);
    request.status = Some(LeadStatus::ProposalSent);
    request.priority = Some(LeadPriority::Medium);
    let record = service.create_lead(&request).unwrap();

    let json = serde_json::to_value(&record.lead).unwrap();
    assert_eq!(json["name"], "Acme rollout");
    assert_eq!(json["status"], "proposal_sent");
    assert_eq!(json["priority"], "medium");
    assert_eq!(json["sales_agent"], agent.id.to_string());
    assert_eq!(json["closed_at"], serde_json::Value::Null);
}

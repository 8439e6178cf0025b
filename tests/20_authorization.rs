mod common;

use anyhow::Result;
use serde_json::json;

use common::{error_code, TestServer};

const CREATE_EMPLOYEE: &str =
    r#"mutation { createEmployee(input: { name: "Ada", email: "ada@example.com", role: EMPLOYEE }) { id name } }"#;
const CREATE_TEAM: &str = r#"mutation { createTeam(input: { name: "Platform" }) { id } }"#;

/// One invocation per guarded mutation, paired with the role it requires
const GUARDED: &[(&str, &str)] = &[
    ("ADMIN", CREATE_EMPLOYEE),
    ("ADMIN", r#"mutation { updateEmployee(id: 1, input: { name: "Bea" }) { id } }"#),
    ("ADMIN", "mutation { deleteEmployee(id: 1) }"),
    ("MANAGER", CREATE_TEAM),
    ("MANAGER", "mutation { addEngineerToTeam(teamId: 1, engineerId: 1) { id } }"),
    ("MANAGER", r#"mutation { createProject(input: { name: "Apollo" }) { id } }"#),
    ("MANAGER", "mutation { updateProjectStatus(id: 1, status: ON_HOLD) { id } }"),
    ("MANAGER", "mutation { assignTeamToProject(projectId: 1, teamId: 1) { id } }"),
    ("MANAGER", "mutation { addEmployeeToProject(projectId: 1, employeeId: 1) { id } }"),
    ("TEAM_LEAD", r#"mutation { createTicket(input: { projectId: 1, title: "Bug" }) { id } }"#),
    ("TEAM_LEAD", "mutation { updateTicketStatus(id: 1, status: IN_PROGRESS) { id } }"),
    ("TEAM_LEAD", r#"mutation { createTask(input: { title: "Write docs" }) { id } }"#),
    ("EMPLOYEE", "mutation { updateTaskStatus(id: 1, status: COMPLETED) { id } }"),
    ("MANAGER", r#"mutation { sendNotification(input: { employeeId: 1, message: "Hi" }) { id } }"#),
    ("EMPLOYEE", "mutation { markNotificationRead(id: 1) { id } }"),
];

#[tokio::test]
async fn admin_header_allows_admin_operation() -> Result<()> {
    let server = TestServer::start().await?;

    let body = server.graphql(Some("ADMIN"), CREATE_EMPLOYEE).await?;
    assert!(body.get("errors").is_none(), "{body}");
    assert_eq!(body["data"], json!({ "createEmployee": { "id": 1, "name": "Ada" } }));
    Ok(())
}

#[tokio::test]
async fn employee_header_is_forbidden_from_admin_operation() -> Result<()> {
    let server = TestServer::start().await?;

    let body = server.graphql(Some("EMPLOYEE"), CREATE_EMPLOYEE).await?;
    assert_eq!(error_code(&body), Some("FORBIDDEN"));
    assert_eq!(body["errors"][0]["message"], "forbidden: requires ADMIN, got EMPLOYEE");

    let employees = server.graphql(None, "{ employees { id } }").await?;
    assert_eq!(employees["data"]["employees"], json!([]));
    Ok(())
}

#[tokio::test]
async fn missing_header_is_unauthenticated() -> Result<()> {
    let server = TestServer::start().await?;

    let body = server.graphql(None, CREATE_TEAM).await?;
    assert_eq!(error_code(&body), Some("UNAUTHENTICATED"));
    assert_eq!(body["errors"][0]["message"], "unauthenticated");
    Ok(())
}

#[tokio::test]
async fn role_matching_is_case_sensitive() -> Result<()> {
    let server = TestServer::start().await?;

    let body = server.graphql(Some("manager"), CREATE_TEAM).await?;
    assert_eq!(error_code(&body), Some("UNAUTHENTICATED"));

    let me = server.graphql(Some("manager"), "{ me { id role } }").await?;
    assert_eq!(me["data"]["me"], json!({ "id": "anonymous", "role": null }));
    Ok(())
}

#[tokio::test]
async fn every_guarded_operation_requires_a_role() -> Result<()> {
    let server = TestServer::start().await?;

    for (_, mutation) in GUARDED {
        let body = server.graphql(None, mutation).await?;
        assert_eq!(error_code(&body), Some("UNAUTHENTICATED"), "{mutation}");
    }
    Ok(())
}

#[tokio::test]
async fn other_roles_are_forbidden_not_unauthenticated() -> Result<()> {
    let server = TestServer::start().await?;

    for (required, mutation) in GUARDED {
        for held in ["ADMIN", "EMPLOYEE", "TEAM_LEAD", "MANAGER"] {
            if held == *required {
                continue;
            }
            let body = server.graphql(Some(held), mutation).await?;
            assert_eq!(error_code(&body), Some("FORBIDDEN"), "{held} -> {mutation}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn required_role_reaches_the_resolver() -> Result<()> {
    let server = TestServer::start().await?;

    for (required, mutation) in GUARDED {
        let body = server.graphql(Some(required), mutation).await?;
        // Resolver errors such as NOT_FOUND are fine; the gate must not deny
        let code = error_code(&body);
        assert!(
            code != Some("FORBIDDEN") && code != Some("UNAUTHENTICATED"),
            "{required} -> {mutation}: {body}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn repeated_requests_get_the_same_decision() -> Result<()> {
    let server = TestServer::start().await?;

    let first = server.graphql(Some("EMPLOYEE"), CREATE_TEAM).await?;
    let second = server.graphql(Some("EMPLOYEE"), CREATE_TEAM).await?;
    assert_eq!(first, second);
    assert_eq!(error_code(&first), Some("FORBIDDEN"));
    Ok(())
}

#[tokio::test]
async fn denied_field_leaves_siblings_intact() -> Result<()> {
    let server = TestServer::start().await?;
    server.graphql(Some("ADMIN"), CREATE_EMPLOYEE).await?;

    let body = server
        .graphql(Some("EMPLOYEE"), r#"{ employees { name } employeeByEmail(email: "ada@example.com") { id } }"#)
        .await?;

    assert_eq!(body["data"]["employees"], json!([{ "name": "Ada" }]));
    assert_eq!(body["data"]["employeeByEmail"], json!(null));
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["errors"][0]["path"], json!(["employeeByEmail"]));
    assert_eq!(error_code(&body), Some("FORBIDDEN"));

    let allowed = server
        .graphql(Some("ADMIN"), r#"{ employeeByEmail(email: "ada@example.com") { id } }"#)
        .await?;
    assert_eq!(allowed["data"]["employeeByEmail"], json!({ "id": 1 }));
    Ok(())
}

#[tokio::test]
async fn denied_mutation_does_not_abort_later_mutations() -> Result<()> {
    let server = TestServer::start().await?;

    let body = server
        .graphql(
            Some("MANAGER"),
            r#"mutation {
                a: createEmployee(input: { name: "Ada", email: "ada@example.com", role: EMPLOYEE }) { id }
                b: createTeam(input: { name: "Platform" }) { id name }
            }"#,
        )
        .await?;

    assert_eq!(body["data"], json!({ "a": null, "b": { "id": 1, "name": "Platform" } }));
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["errors"][0]["path"], json!(["a"]));
    assert_eq!(error_code(&body), Some("FORBIDDEN"));

    let teams = server.graphql(None, "{ teams { name } }").await?;
    assert_eq!(teams["data"]["teams"], json!([{ "name": "Platform" }]));
    Ok(())
}

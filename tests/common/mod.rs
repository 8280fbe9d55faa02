//! Shared fixtures for the HTTP integration tests
#![allow(dead_code)]

use pmo_dashboard::api::{ApiClient, PmoApi};
use pmo_dashboard::screens::Role;
use pmo_dashboard::{AppState, Config};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const UNITS_PATH: &str = "/api/business-units";

/// Dashboard state talking to `server` over real HTTP
pub fn app_for(server: &MockServer) -> AppState {
    let api: Arc<dyn PmoApi> = Arc::new(ApiClient::new(&server.uri()));
    AppState::with_api(
        api,
        Config {
            api_base: server.uri(),
            api_timeout: None,
            stale_after: Duration::from_secs(120),
            default_role: Role::ProjectManager,
        },
    )
}

pub fn project_json(id: i64, unit_id: i64, name: &str, budget: f64, bid_value: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "businessunit_id": unit_id,
        "description": "",
        "tender_no": format!("TND-{}", id),
        "scope_of_work": "",
        "category": "substation",
        "funding_currency": "SAR",
        "bid_issue_date": "2025-03-01",
        "tender_purchase_date": "2025-03-01",
        "tender_purchase_fee": 0.0,
        "bid_due_date": "2025-04-01",
        "completion_period_m": 12,
        "bid_validity_d": 30,
        "include_vat": false,
        "budget": budget,
        "bid_value": bid_value,
        "perf_bond_p": 0.0,
        "advance_pmt_p": 0.0,
        "issues": [],
        "change_requests": []
    })
}

pub fn unit_json(id: i64, name: &str, projects: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "businessunit",
        "parent_id": null,
        "manager_id": null,
        "projects": projects
    })
}

/// "Grid East" with project 7 (budget 100, bid 120) carrying one open high issue
pub fn grid_east_json() -> Value {
    let mut project = project_json(7, 1, "East Substation", 100.0, 120.0);
    project["issues"] = json!([{
        "id": 70,
        "name": "Transformer delivery slip",
        "project_id": 7,
        "status": "open",
        "severity": "high",
        "opened_on": "2025-03-02",
        "closed_on": null,
        "description": null
    }]);
    unit_json(1, "Grid East", vec![project])
}

pub fn change_request_json(id: i64, project_id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "project_id": project_id,
        "status": "draft",
        "submitted_on": "2025-03-05",
        "approved_on": null,
        "description": null,
        "impact_summary": null
    })
}

/// Serve `units` for every snapshot fetch
pub async fn mount_units(server: &MockServer, units: Value) {
    Mock::given(method("GET"))
        .and(path(UNITS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(units))
        .mount(server)
        .await;
}

/// Serve `units` for the next `n` snapshot fetches only
pub async fn mount_units_times(server: &MockServer, units: Value, n: u64) {
    Mock::given(method("GET"))
        .and(path(UNITS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(units))
        .up_to_n_times(n)
        .mount(server)
        .await;
}

/// Number of requests the server saw for `method` + `path`
pub async fn request_count(server: &MockServer, verb: &str, at: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == at)
        .count()
}

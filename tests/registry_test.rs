// ABOUTME: Integration tests for the UK and US nonprofit financial registries
// ABOUTME: Response parsing, latest-first ordering, and absent-data handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;

use chrono::NaiveDate;
use outreach_core::models::RegistryCountry;
use outreach_intel::external::{
    FinancialRegistryClient, UkCharityRegistry, UsNonprofitRegistry,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn uk_client(server: &MockServer) -> FinancialRegistryClient {
    let mut client = FinancialRegistryClient::new();
    client.register(Arc::new(UkCharityRegistry::new(
        server.uri(),
        "test-key".to_owned(),
    )));
    client
}

fn us_client(server: &MockServer) -> FinancialRegistryClient {
    let mut client = FinancialRegistryClient::new();
    client.register(Arc::new(UsNonprofitRegistry::new(server.uri())));
    client
}

#[tokio::test]
async fn test_uk_history_sorted_latest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/charityfinancialhistory/1098765/0"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "financial_period_end_date": "2022-03-31T00:00:00", "income": 90000.0, "expenditure": 95000.0 },
            { "fin_period_end_date": "2024-03-31T00:00:00", "inc_total": 120000.0, "exp_total": 100000.0 },
            { "financial_period_end_date": "2023-03-31", "income": 110000.0, "expenditure": 104000.0 },
            { "financial_period_end_date": null, "income": 1.0, "expenditure": 1.0 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let snapshots = uk_client(&server)
        .fetch_financials(RegistryCountry::Uk, " 1098765 ")
        .await
        .expect("financials");

    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[0].period_end, date(2024, 3, 31));
    assert!((snapshots[0].net_income - 20_000.0).abs() < f64::EPSILON);
    assert_eq!(snapshots[2].period_end, date(2022, 3, 31));
    assert!(snapshots[2].net_income < 0.0);
}

#[tokio::test]
async fn test_uk_subsidiary_suffix_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/charityfinancialhistory/1098765/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "financial_period_end_date": "2023-03-31", "income": 10.0, "expenditure": 5.0 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let snapshots = uk_client(&server)
        .fetch_financials(RegistryCountry::Uk, "1098765-2")
        .await;
    assert_eq!(snapshots.map(|s| s.len()), Some(1));
}

#[tokio::test]
async fn test_us_filings_use_month_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organizations/131837418.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organization": { "name": "Acme Foundation" },
            "filings_with_data": [
                { "tax_prd": 202106, "totrevenue": 500000.0, "totfuncexpns": 450000.0 },
                { "tax_prd": 202212, "totrevenue": 650000.0, "totfuncexpns": 700000.0 },
                { "tax_prd": null, "totrevenue": 1.0, "totfuncexpns": 1.0 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshots = us_client(&server)
        .fetch_financials(RegistryCountry::Us, "13-1837418")
        .await
        .expect("financials");

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].period_end, date(2022, 12, 31));
    assert!((snapshots[0].net_income + 50_000.0).abs() < f64::EPSILON);
    assert_eq!(snapshots[1].period_end, date(2021, 6, 30));
}

#[tokio::test]
async fn test_unknown_organization_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = us_client(&server);
    assert!(client
        .fetch_financials(RegistryCountry::Us, "131837418")
        .await
        .is_none());
}

#[tokio::test]
async fn test_registry_failures_are_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organizations/131837418.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/999999999.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = us_client(&server);
    assert!(client
        .fetch_financials(RegistryCountry::Us, "131837418")
        .await
        .is_none());
    assert!(client
        .fetch_financials(RegistryCountry::Us, "999999999")
        .await
        .is_none());
}

#[tokio::test]
async fn test_empty_filings_are_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organizations/131837418.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "filings_with_data": [] })))
        .mount(&server)
        .await;

    assert!(us_client(&server)
        .fetch_financials(RegistryCountry::Us, "131837418")
        .await
        .is_none());
}

#[tokio::test]
async fn test_invalid_identifiers_skip_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = us_client(&server);
    assert!(client.fetch_financials(RegistryCountry::Us, "   ").await.is_none());
    assert!(client.fetch_financials(RegistryCountry::Us, "12-34").await.is_none());
}

#[tokio::test]
async fn test_unregistered_country_is_absent() {
    let server = MockServer::start().await;
    let client = us_client(&server);

    assert!(client.supports(RegistryCountry::Us));
    assert!(!client.supports(RegistryCountry::Uk));
    assert!(client
        .fetch_financials(RegistryCountry::Uk, "1098765")
        .await
        .is_none());
}

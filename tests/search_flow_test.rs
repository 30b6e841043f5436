mod common;

use std::sync::Arc;

use common::{rows, test_config, MockPage, MockSite, LANDING};
use ocis_scraper::error::{classify, StepError};
use ocis_scraper::models::{CaseSummary, WorkItem};
use ocis_scraper::workflow::selectors::*;
use ocis_scraper::workflow::{FlowOutcome, ItemCtx, SearchFlow, TerminalState};
use tokio_test::assert_ok;

const COURT: &str = "Arlington General District Court";

fn listing_item(court: &str) -> WorkItem {
    WorkItem::court(court, "01/16/2024")
}

fn ctx() -> ItemCtx {
    ItemCtx::new(1, 1, 1)
}

fn position(actions: &[String], action: &str) -> usize {
    actions
        .iter()
        .position(|a| a == action)
        .unwrap_or_else(|| panic!("没有找到操作 {}: {:?}", action, actions))
}

#[tokio::test]
async fn test_listing_steps_run_in_order() {
    let site = MockSite::new()
        .with_court(COURT, vec![rows("A", 2)])
        .with_court_matches(3)
        .shared();
    let page = MockPage::new(site);
    let flow = SearchFlow::new(&test_config("flow_order.log"));

    let outcome = assert_ok!(flow.run(&page, &listing_item(COURT), &ctx()).await);
    assert!(matches!(outcome, FlowOutcome::Results(r) if r.continuations == 0));

    let actions = page.actions();
    assert_eq!(actions[0], format!("goto:{}", LANDING));

    let order = [
        format!("click:{}", ACCEPT_TERMS),
        format!("click:{}", SEARCH_BY_LABEL),
        format!("click:{}", COURT_LEVEL_LISTING),
        format!("click:{}", APPLY_COURT_LEVEL),
        format!("click:{}", COURT_SELECT),
        format!("focus:{}", SEARCH_COURTS),
        format!("enter:{}", SEARCH_COURTS),
        format!("click:{}", court_option(0)),
        format!("click:{}", court_option(2)),
        format!("click:{}", APPLY_COURTS),
        format!("focus:{}", DATE_FIELD),
        format!("enter:{}", DATE_FIELD),
        format!("click:{}", START_SEARCH),
        "body".to_string(),
    ];
    let positions: Vec<usize> = order.iter().map(|a| position(&actions, a)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", actions);
    assert!(!actions.contains(&format!("click:{}", COURT_LEVEL_DETAIL)));
}

#[tokio::test]
async fn test_detail_mode_uses_case_number_without_enter() {
    let site = MockSite::new().shared();
    let page = MockPage::new(site);
    let flow = SearchFlow::new(&test_config("flow_detail.log"));

    let summary = CaseSummary {
        formatted_case_number: "GC24000123-00".to_string(),
        ..Default::default()
    };
    let item = WorkItem::case(COURT, summary);
    let outcome = assert_ok!(flow.run(&page, &item, &ctx()).await);
    assert!(matches!(outcome, FlowOutcome::Results(r) if r.continuations == 0));

    let actions = page.actions();
    assert!(actions.contains(&format!("click:{}", COURT_LEVEL_DETAIL)));
    assert!(actions.contains(&format!("focus:{}", CASE_NUMBER_FIELD)));
    assert!(!actions.contains(&format!("enter:{}", CASE_NUMBER_FIELD)));
    assert!(!actions.iter().any(|a| a == &format!("click:{}", LOAD_MORE)));
}

#[tokio::test]
async fn test_no_results_is_terminal_without_further_interaction() {
    let site = MockSite::new().with_court(COURT, vec![]).shared();
    let page = MockPage::new(site);
    let flow = SearchFlow::new(&test_config("flow_empty.log"));

    let outcome = assert_ok!(flow.run(&page, &listing_item(COURT), &ctx()).await);
    assert_eq!(outcome, FlowOutcome::Terminal(TerminalState::NoResults));

    let actions = page.actions();
    assert_eq!(actions.last().map(String::as_str), Some("body"));
    assert_eq!(actions.iter().filter(|a| *a == "body").count(), 1);
}

#[tokio::test]
async fn test_maintenance_is_terminal() {
    let site = MockSite::new()
        .with_court(COURT, vec![rows("A", 1)])
        .with_maintenance(COURT)
        .shared();
    let page = MockPage::new(site);
    let flow = SearchFlow::new(&test_config("flow_maintenance.log"));

    let outcome = assert_ok!(flow.run(&page, &listing_item(COURT), &ctx()).await);
    assert_eq!(outcome, FlowOutcome::Terminal(TerminalState::Maintenance));
    assert_eq!(page.actions().last().map(String::as_str), Some("body"));
}

#[tokio::test]
async fn test_acknowledgement_is_dismissed_then_body_reread() {
    let site = MockSite::new()
        .with_court(COURT, vec![])
        .with_acknowledge()
        .shared();
    let page = MockPage::new(site);
    let flow = SearchFlow::new(&test_config("flow_ack.log"));

    let outcome = assert_ok!(flow.run(&page, &listing_item(COURT), &ctx()).await);
    assert_eq!(outcome, FlowOutcome::Terminal(TerminalState::NoResults));

    let actions = page.actions();
    let ack = position(&actions, &format!("click:{}", ACKNOWLEDGE));
    let bodies: Vec<usize> = actions
        .iter()
        .enumerate()
        .filter(|(_, a)| *a == "body")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0] < ack && ack < bodies[1]);
}

#[tokio::test]
async fn test_missing_element_times_out() {
    let site = MockSite::new().without(ACCEPT_TERMS).shared();
    let page = MockPage::new(site);
    let flow = SearchFlow::new(&test_config("flow_timeout.log"));

    let err = flow
        .run(&page, &listing_item(COURT), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StepError>(),
        Some(StepError::Timeout { selector, .. }) if selector == ACCEPT_TERMS
    ));
    assert_eq!(classify(&err), "STEP_TIMEOUT");
    // 超时之后不再有任何操作
    assert_eq!(page.actions().len(), 1);
}

#[tokio::test]
async fn test_flow_does_not_close_the_page() {
    let site = MockSite::new().with_court(COURT, vec![rows("A", 1)]).shared();
    let page = Arc::new(MockPage::new(site));
    let flow = SearchFlow::new(&test_config("flow_open.log"));

    assert_ok!(flow.run(page.as_ref(), &listing_item(COURT), &ctx()).await);
    assert!(!page.is_closed());
}

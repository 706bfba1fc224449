//! Lead policy fixtures and once-per-session capture against SQLite

use folio_domain::traits::LeadStore;
use folio_domain::{LeadChannels, LeadClaim, StrategyMode};
use folio_gatekeeper::{
    has_sufficient_lead_fields, parse_lead_channels_from_text, CaptureOutcome, LeadGuard,
    LeadTurn, RejectionReason,
};
use folio_store::SqliteStore;

#[test]
fn test_consultative_vague_details_fixture() {
    assert!(!has_sufficient_lead_fields(
        StrategyMode::Consultative,
        &LeadChannels::default(),
        Some("Need some help"),
    ));
}

#[test]
fn test_sales_phone_with_details_fixture() {
    let channels = LeadChannels {
        phone: Some("+1 (555) 111-2222".to_string()),
        ..Default::default()
    };
    assert!(has_sufficient_lead_fields(
        StrategyMode::Sales,
        &channels,
        Some("We need a redesign and booking flow launch this quarter."),
    ));
}

#[test]
fn test_channel_extraction_fixture() {
    let channels = parse_lead_channels_from_text(
        "You can reach me at +1 555 444 3333 and details are on https://Example.com/services",
    );
    assert_eq!(channels.phone.as_deref(), Some("+1 555 444 3333"));
    assert_eq!(channels.website.as_deref(), Some("example.com/services"));
}

#[test]
fn test_capture_once_per_session() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let guard = LeadGuard::default();
    let message = "Here's my email jane@co.com, need a quote";
    let claim = LeadClaim {
        detected: true,
        confidence: 0.9,
        email: Some("jane@co.com".to_string()),
        project_details: Some("need a quote".to_string()),
        ..Default::default()
    };
    let history = vec![];
    let turn = LeadTurn {
        strategy_mode: StrategyMode::Sales,
        claim: &claim,
        message,
        history: &history,
    };

    let first = guard.capture(&mut store, "p1", "session-1", &turn).unwrap();
    match &first {
        CaptureOutcome::Captured(record) => {
            assert_eq!(record.email.as_deref(), Some("jane@co.com"));
            assert_eq!(record.project_details.as_deref(), Some("need a quote"));
        }
        other => panic!("expected capture, got {:?}", other),
    }

    let second = guard.capture(&mut store, "p1", "session-1", &turn).unwrap();
    assert_eq!(second, CaptureOutcome::AlreadyCaptured);
    assert_eq!(store.list_leads("p1").unwrap().len(), 1);

    // A different session of the same portfolio is a different visitor
    let third = guard.capture(&mut store, "p1", "session-2", &turn).unwrap();
    assert!(third.is_captured());
    assert!(store.find_lead_by_session("p1", "session-2").unwrap().is_some());
}

#[test]
fn test_rejected_turn_writes_nothing() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let guard = LeadGuard::default();
    let claim = LeadClaim {
        detected: true,
        confidence: 0.95,
        project_details: Some("Need some help".to_string()),
        ..Default::default()
    };
    let history = vec![];
    let turn = LeadTurn {
        strategy_mode: StrategyMode::Consultative,
        claim: &claim,
        message: "Need some help",
        history: &history,
    };

    let outcome = guard.capture(&mut store, "p1", "s", &turn).unwrap();
    assert_eq!(
        outcome,
        CaptureOutcome::Rejected(RejectionReason::InsufficientFields)
    );
    assert!(store.list_leads("p1").unwrap().is_empty());
}

//! Identifier tests for core_kernel

use std::collections::HashSet;

use core_kernel::{ClaimId, EobId, PatientId};

#[test]
fn test_each_kind_has_its_prefix() {
    assert!(PatientId::new().to_string().starts_with("PAT-"));
    assert!(ClaimId::new().to_string().starts_with("CLM-"));
    assert!(EobId::new().to_string().starts_with("EOB-"));
}

#[test]
fn test_prefixed_form_parses_back() {
    let id = ClaimId::new();
    let parsed: ClaimId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn test_garbage_does_not_parse() {
    assert!("CLM-not-a-uuid".parse::<ClaimId>().is_err());
    assert!("".parse::<EobId>().is_err());
}

#[test]
fn test_serializes_as_bare_uuid() {
    let id = PatientId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    let back: PatientId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_ids_are_unique() {
    let ids: HashSet<ClaimId> = (0..1000).map(|_| ClaimId::new()).collect();
    assert_eq!(ids.len(), 1000);
}

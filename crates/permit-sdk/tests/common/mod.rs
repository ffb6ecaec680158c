//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use permit_sdk::{AccessSubject, RuleEngine};
use std::collections::HashSet;
use std::net::IpAddr;

/// Principal used by the engine tests
#[derive(Debug, Clone)]
pub struct TestSubject {
    pub user: String,
    pub groups: HashSet<String>,
    pub ip: Option<IpAddr>,
    pub today: NaiveDate,
}

impl TestSubject {
    /// Create a subject with no groups, no address and a fixed date
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            groups: HashSet::new(),
            ip: None,
            today: date(2024, 6, 15),
        }
    }

    pub fn in_groups(mut self, groups: &[&str]) -> Self {
        self.groups.extend(groups.iter().map(|g| g.to_string()));
        self
    }

    pub fn from_ip(mut self, ip: &str) -> Self {
        self.ip = Some(ip.parse().expect("valid test address"));
        self
    }

    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

impl AccessSubject for TestSubject {
    fn user_id(&self) -> &str {
        &self.user
    }

    fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    fn client_ip(&self) -> Option<IpAddr> {
        self.ip
    }

    fn current_date(&self) -> NaiveDate {
        self.today
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Engine with the subject conditions registered and default config
pub fn subject_engine() -> RuleEngine<TestSubject> {
    RuleEngine::builder()
        .with_subject_conditions()
        .build()
        .expect("default engine should build")
}

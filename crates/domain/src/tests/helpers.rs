// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CommissionTier, EmployeeRank, Rank};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::{Date, Month, PrimitiveDateTime, Time};

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn date(year: i32, month: u8, day: u8) -> Date {
    Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap()
}

pub fn at(day: Date, hour: u8, minute: u8) -> PrimitiveDateTime {
    PrimitiveDateTime::new(day, Time::from_hms(hour, minute, 0).unwrap())
}

/// The default three-band table: C 6%, B 5%, A 4%.
pub fn create_test_tiers() -> Vec<CommissionTier> {
    let mut tier_c = CommissionTier::new("Tier C", dec("0"), Some(dec("49999.99")), dec("6"));
    tier_c.tier_id = Some(3);
    let mut tier_b =
        CommissionTier::new("Tier B", dec("50000"), Some(dec("99999.99")), dec("5"));
    tier_b.tier_id = Some(2);
    let mut tier_a = CommissionTier::new("Tier A", dec("100000"), None, dec("4"));
    tier_a.tier_id = Some(1);
    vec![tier_c, tier_b, tier_a]
}

/// The seeded rank ladder, Rookie through Chatting God.
pub fn create_test_ranks() -> Vec<Rank> {
    vec![
        Rank::new("Rookie", dec("0"), Some(dec("4999.99")), 1, dec("0")),
        Rank::new("Hustler", dec("5000"), Some(dec("9999.99")), 2, dec("50")),
        Rank::new("Closer", dec("10000"), Some(dec("14999.99")), 3, dec("100")),
        Rank::new("Shark", dec("15000"), Some(dec("19999.99")), 4, dec("150")),
        Rank::new("King of Greed", dec("20000"), Some(dec("29999.99")), 5, dec("200")),
        Rank::new("Chatting God", dec("30000"), None, 6, dec("300")),
    ]
}

pub fn create_test_employee_rank(current: &str, best: &str) -> EmployeeRank {
    EmployeeRank {
        employee_id: 1,
        year: 2026,
        month: 3,
        total_sales: Decimal::ZERO,
        current_rank: current.to_string(),
        previous_rank: None,
        best_rank: best.to_string(),
        updated_at: 0,
    }
}

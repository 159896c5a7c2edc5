// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use rust_decimal::Decimal;
use shiftbook_api::PayrollConfig;
use shiftbook_replication::ReplicationConfig;

use crate::cli::Args;

#[test]
fn test_defaults_match_library_defaults() {
    let args: Args = Args::try_parse_from(["shiftbook-server"]).unwrap();
    assert_eq!(args.port, 3000);
    assert_eq!(args.database, None);
    assert_eq!(args.mirror_dir, None);
    assert_eq!(args.replication_config(), ReplicationConfig::default());
    assert_eq!(args.payroll_config(), PayrollConfig::default());
}

#[test]
fn test_overrides_reach_configs() {
    let args: Args = Args::try_parse_from([
        "shiftbook-server",
        "--database",
        "ledger.db",
        "--mirror-dir",
        "/tmp/mirror",
        "--batch-size",
        "10",
        "--max-attempts",
        "3",
        "--backoff-base-ms",
        "250",
        "--apply-timeout-secs",
        "5",
        "--bonus-rate",
        "0.02",
        "--timezone",
        "Europe/Madrid",
    ])
    .unwrap();

    let replication: ReplicationConfig = args.replication_config();
    assert_eq!(replication.batch_size, 10);
    assert_eq!(replication.max_attempts, 3);
    assert_eq!(replication.backoff_base, Duration::from_millis(250));
    assert_eq!(replication.apply_timeout, Duration::from_secs(5));
    assert_eq!(
        replication.rate_limit_backoff,
        ReplicationConfig::default().rate_limit_backoff
    );

    let payroll: PayrollConfig = args.payroll_config();
    assert_eq!(payroll.bonus_rate, Decimal::from_str("0.02").unwrap());
    assert_eq!(payroll.timezone, "Europe/Madrid");
    assert!(payroll.clock().is_ok());
}

#[test]
fn test_invalid_bonus_rate_is_rejected() {
    let result = Args::try_parse_from(["shiftbook-server", "--bonus-rate", "lots"]);
    assert!(result.is_err());
}

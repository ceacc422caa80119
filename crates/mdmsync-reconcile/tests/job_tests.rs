//! Job Tests
//!
//! End-to-end runs of every job against an in-memory MDM covering:
//! - Merge-not-overwrite attribute writes and the removal request shape
//! - Idempotency: a second run over the written state changes nothing
//! - Skip-and-count handling of failed pages, writes and lookups
//! - Dry-run mode and empty reports

mod common;

use chrono::{Duration, Utc};
use common::{mac, machine, space, Call, FakeDirectory, FakeMdm};
use mdmsync_connector::{AppPlatform, CustomAttributes, Device, PlatformType};
use mdmsync_reconcile::jobs::amp_cleanup::{self, AmpCleanupOptions};
use mdmsync_reconcile::jobs::app_tag::{self, AppTagOptions};
use mdmsync_reconcile::jobs::clear_configs::{self, ClearConfigsOptions};
use mdmsync_reconcile::jobs::{ownership, release_channel};
use mdmsync_reconcile::{
    Action, AttributeMutator, JobContext, JobError, PlannedAction, RunStatistics, SpaceFilter,
    WriteStatus,
};

fn attrs(pairs: &[(&str, &str)]) -> CustomAttributes {
    pairs
        .iter()
        .map(|(k, v)| (*k, vec![(*v).to_string()]))
        .collect()
}

fn android(id: i64) -> Device {
    Device::new(id, PlatformType::Android)
}

fn seen_days_ago(device: Device, days: i64) -> Device {
    Device {
        last_checkin: Some((Utc::now() - Duration::days(days)).timestamp_millis()),
        ..device
    }
}

// =============================================================================
// AttributeMutator
// =============================================================================

#[tokio::test]
async fn test_set_sends_merged_attribute_map() {
    let device = android(1)
        .with_attribute("a", &["1"])
        .with_attribute("b", &["2"]);
    let mdm = FakeMdm::new(vec![space(1, "Global")]).with_device(1, device.clone());

    let outcome = AttributeMutator::new(&mdm)
        .apply(&device, &Action::set("b", "9"))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(
        mdm.calls(),
        vec![Call::Put {
            device_id: 1,
            attributes: attrs(&[("a", "1"), ("b", "9")]),
        }]
    );
}

#[tokio::test]
async fn test_delete_uses_removal_request() {
    let device = mac(7, "C02").with_attribute("releasechannel", &["PreProd"]);
    let mdm = FakeMdm::new(vec![space(1, "macOS")]).with_device(1, device.clone());

    AttributeMutator::new(&mdm)
        .apply(&device, &Action::delete("releasechannel"))
        .await
        .unwrap();

    assert_eq!(
        mdm.calls(),
        vec![Call::Delete {
            device_ids: vec![7],
            keys: vec!["releasechannel".to_string()],
        }]
    );
    assert!(mdm.device(7).custom_attributes.is_empty());
}

#[tokio::test]
async fn test_no_action_sends_nothing() {
    let device = android(1);
    let mdm = FakeMdm::new(vec![]);

    let outcome = AttributeMutator::new(&mdm)
        .apply(&device, &Action::NoAction)
        .await;

    assert!(outcome.is_none());
    assert_eq!(mdm.write_count(), 0);
}

#[tokio::test]
async fn test_failed_write_does_not_stop_batch() {
    let mdm = FakeMdm::new(vec![space(1, "Global")])
        .with_device(1, android(1))
        .with_device(1, android(2))
        .with_failing_write(1);
    let planned = vec![
        PlannedAction {
            device: android(1),
            action: Action::set("k", "v"),
        },
        PlannedAction {
            device: android(2),
            action: Action::set("k", "v"),
        },
    ];
    let mut stats = RunStatistics::new();

    let outcomes = AttributeMutator::new(&mdm)
        .apply_all(&planned, &mut stats)
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_failure());
    assert_eq!(outcomes[0].result_code(), "500");
    assert!(outcomes[1].is_success());
    assert_eq!(stats.writes_failed, 1);
    assert_eq!(stats.writes_succeeded, 1);
    assert_eq!(mdm.write_count(), 2);
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let device = android(1);
    let mdm = FakeMdm::new(vec![]).with_device(1, device.clone());

    let outcome = AttributeMutator::new(&mdm)
        .with_dry_run(true)
        .apply(&device, &Action::set("k", "v"))
        .await
        .unwrap();

    assert_eq!(outcome.status, WriteStatus::DryRun);
    assert_eq!(mdm.write_count(), 0);
}

// =============================================================================
// Collection
// =============================================================================

#[tokio::test]
async fn test_failed_device_page_is_counted() {
    let mut mdm = FakeMdm::new(vec![space(1, "Global")]).with_failing_device_page(2);
    for id in 1..=5 {
        mdm = mdm.with_device(1, android(id));
    }
    let ctx = JobContext::new(&mdm);
    let mut stats = RunStatistics::new();

    let devices = ctx.devices(SpaceFilter::All, &mut stats).await.unwrap();

    let ids: Vec<i64> = devices.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 5]);
    assert_eq!(stats.records_declared, 5);
    assert_eq!(stats.records_collected, 3);
    assert_eq!(stats.failed_pages, 1);
    assert_eq!(stats.discrepancy(), 2);
}

#[tokio::test]
async fn test_devices_are_annotated_with_space() {
    let mdm = FakeMdm::new(vec![space(1, "Global"), space(2, "Europe")])
        .with_device(1, android(1))
        .with_device(2, android(2));
    let ctx = JobContext::new(&mdm);
    let mut stats = RunStatistics::new();

    let devices = ctx.devices(SpaceFilter::All, &mut stats).await.unwrap();

    let spaces: Vec<(i64, String)> = devices
        .iter()
        .map(|d| {
            let s = d.space.clone().unwrap();
            (s.id, s.name)
        })
        .collect();
    assert_eq!(
        spaces,
        vec![(1, "Global".to_string()), (2, "Europe".to_string())]
    );
    assert_eq!(stats.spaces_scanned, 2);
}

#[tokio::test]
async fn test_space_listing_failure_stops_the_job() {
    let mdm = FakeMdm::new(vec![]).with_space_listing_error();
    let ctx = JobContext::new(&mdm);

    let err = amp_cleanup::run(&ctx, &AmpCleanupOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::SpaceListing(_)));
    assert_eq!(mdm.write_count(), 0);
}

#[tokio::test]
async fn test_space_override_replaces_default() {
    let mdm = FakeMdm::new(vec![space(1, "Global"), space(2, "Lab")])
        .with_device(1, android(1).with_violation("[Dev] Cisco Amp Activation"))
        .with_device(2, android(2).with_violation("[Dev] Cisco Amp Activation"));
    let ctx = JobContext::new(&mdm).with_space_filter(Some(SpaceFilter::only(["Lab"])));

    let report = amp_cleanup::run(&ctx, &AmpCleanupOptions::default())
        .await
        .unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(report.rows[0][0], "2");
}

// =============================================================================
// amp-cleanup
// =============================================================================

fn amp_fixture() -> FakeMdm {
    FakeMdm::new(vec![space(1, "Global"), space(2, "macOS")])
        .with_device(
            1,
            android(1).with_violation("[Production] Cisco Amp Activation"),
        )
        .with_device(
            1,
            android(2)
                .with_violation("[Dev] Cisco Amp Activation")
                .with_attribute("custom_ciscoamp", &["active"]),
        )
        .with_device(
            1,
            android(3)
                .with_attribute("custom_ciscoamp", &["active"])
                .with_attribute("owner", &["jdoe"]),
        )
        .with_device(1, android(4).with_attribute("custom_ciscoamp", &["active"]))
        .with_device(1, Device::new(5, PlatformType::Ios))
        .with_device(2, android(6).with_violation("[Dev] Cisco Amp Activation"))
        .with_install(4, "com.cisco.amp", AppPlatform::Android)
}

#[tokio::test]
async fn test_amp_cleanup_toggles_attribute() {
    let mdm = amp_fixture();
    let ctx = JobContext::new(&mdm);

    let report = amp_cleanup::run(&ctx, &AmpCleanupOptions::default())
        .await
        .unwrap();

    assert_eq!(
        mdm.calls(),
        vec![
            Call::Put {
                device_id: 1,
                attributes: attrs(&[("custom_ciscoamp", "active")]),
            },
            Call::Put {
                device_id: 3,
                attributes: attrs(&[("custom_ciscoamp", "removed"), ("owner", "jdoe")]),
            },
        ]
    );
    assert_eq!(report.len(), 2);
    assert_eq!(report.rows[0][4], "set custom_ciscoamp=active");
    assert_eq!(report.rows[0][5], "ok");
    assert_eq!(report.rows[1][2], "1");
    assert_eq!(report.statistics.writes_succeeded, 2);
    assert_eq!(report.statistics.devices_out_of_scope, 1);
    assert_eq!(report.statistics.devices_unchanged, 2);
}

#[tokio::test]
async fn test_amp_cleanup_second_run_is_a_no_op() {
    let mdm = amp_fixture();
    let ctx = JobContext::new(&mdm);

    amp_cleanup::run(&ctx, &AmpCleanupOptions::default())
        .await
        .unwrap();
    mdm.clear_calls();
    let second = amp_cleanup::run(&ctx, &AmpCleanupOptions::default())
        .await
        .unwrap();

    assert_eq!(mdm.write_count(), 0);
    assert!(second.is_empty());
    assert_eq!(second.statistics.planned_writes(), 0);
}

#[tokio::test]
async fn test_amp_cleanup_withholds_removals_on_partial_app_inventory() {
    let mut mdm = FakeMdm::new(vec![space(1, "Global")]).with_failing_app_page(2);
    for id in 1..=4 {
        mdm = mdm
            .with_device(1, android(id).with_attribute("custom_ciscoamp", &["active"]))
            .with_install(id, "com.cisco.amp", AppPlatform::Android);
    }
    let mdm = mdm.with_device(1, android(5).with_violation("[Dev] Cisco Amp Activation"));
    let ctx = JobContext::new(&mdm);

    let report = amp_cleanup::run(&ctx, &AmpCleanupOptions::default())
        .await
        .unwrap();

    // Devices 3 and 4 sat on the lost page; only the activation goes out.
    assert_eq!(
        mdm.calls(),
        vec![Call::Put {
            device_id: 5,
            attributes: attrs(&[("custom_ciscoamp", "active")]),
        }]
    );
    assert_eq!(report.len(), 3);
    assert_eq!(report.rows[0][0], "3");
    assert_eq!(report.rows[0][4], "set custom_ciscoamp=removed");
    assert_eq!(report.rows[0][5], "withheld");
    assert_eq!(report.rows[1][5], "withheld");
    assert_eq!(report.rows[2][0], "5");
    assert_eq!(report.rows[2][5], "ok");
    assert_eq!(report.statistics.failed_pages, 1);
    assert_eq!(report.statistics.writes_withheld, 2);
    assert_eq!(report.statistics.writes_succeeded, 1);
}

#[tokio::test]
async fn test_amp_cleanup_dry_run() {
    let mdm = amp_fixture();
    let ctx = JobContext::new(&mdm).with_dry_run(true);

    let report = amp_cleanup::run(&ctx, &AmpCleanupOptions::default())
        .await
        .unwrap();

    assert_eq!(mdm.write_count(), 0);
    assert!(report.dry_run);
    assert_eq!(report.len(), 2);
    assert!(report.rows.iter().all(|row| row[5] == "dry-run"));
    assert_eq!(report.statistics.writes_dry_run, 2);
}

// =============================================================================
// ownership
// =============================================================================

fn ownership_fixture() -> (FakeMdm, FakeDirectory) {
    let mdm = FakeMdm::new(vec![
        space(1, "macOS"),
        space(2, "Bleeding Edge"),
        space(3, "Global"),
    ])
    .with_device(1, mac(10, "SERIAL-A"))
    .with_device(1, mac(11, "SERIAL-B").with_attribute("team", &["infra"]))
    .with_device(2, mac(12, "SERIAL-C").with_attribute("dep", &["Yes"]))
    .with_device(2, mac(13, "SERIAL-D").with_attribute("sas_owned", &["Yes"]))
    .with_device(3, mac(14, "SERIAL-A"));
    let directory = FakeDirectory::new(vec![
        vec![machine("SERIAL-A", None), machine("SERIAL-C", None)],
        vec![machine("SERIAL-D", None)],
    ]);
    (mdm, directory)
}

#[tokio::test]
async fn test_ownership_classifies_by_directory() {
    let (mdm, directory) = ownership_fixture();
    let ctx = JobContext::new(&mdm).with_directory(&directory);

    let report = ownership::run(&ctx).await.unwrap();

    assert_eq!(
        mdm.calls(),
        vec![
            Call::Put {
                device_id: 10,
                attributes: attrs(&[("sas_owned", "Yes")]),
            },
            Call::Put {
                device_id: 11,
                attributes: attrs(&[("sas_owned", "No"), ("team", "infra")]),
            },
        ]
    );
    assert_eq!(report.len(), 2);
    assert_eq!(report.rows[0][5], "SERIAL-A");
    assert_eq!(report.rows[0][6], "true");
    assert_eq!(report.rows[1][6], "false");
    assert_eq!(report.statistics.directory_records, 3);
}

#[tokio::test]
async fn test_ownership_second_run_is_a_no_op() {
    let (mdm, directory) = ownership_fixture();
    let ctx = JobContext::new(&mdm).with_directory(&directory);

    ownership::run(&ctx).await.unwrap();
    mdm.clear_calls();
    let second = ownership::run(&ctx).await.unwrap();

    assert_eq!(mdm.write_count(), 0);
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_ownership_requires_directory() {
    let (mdm, _) = ownership_fixture();
    let ctx = JobContext::new(&mdm);

    let err = ownership::run(&ctx).await.unwrap_err();

    assert!(matches!(err, JobError::MissingBackend("directory")));
}

#[tokio::test]
async fn test_ownership_withholds_no_on_partial_directory() {
    let (mdm, directory) = ownership_fixture();
    let directory = directory.with_failing_page(1);
    let ctx = JobContext::new(&mdm).with_directory(&directory);

    let report = ownership::run(&ctx).await.unwrap();

    assert_eq!(
        mdm.calls(),
        vec![Call::Put {
            device_id: 10,
            attributes: attrs(&[("sas_owned", "Yes")]),
        }]
    );
    // SERIAL-D was on the lost page, so device 13 keeps its "Yes".
    assert_eq!(report.len(), 3);
    assert_eq!(report.rows[1][7], "set sas_owned=No");
    assert_eq!(report.rows[1][8], "withheld");
    assert_eq!(report.rows[2][5], "SERIAL-D");
    assert_eq!(report.rows[2][8], "withheld");
    assert_eq!(
        mdm.device(13).custom_attributes,
        attrs(&[("sas_owned", "Yes")])
    );
    assert_eq!(report.statistics.failed_pages, 1);
    assert_eq!(report.statistics.directory_records, 2);
    assert_eq!(report.statistics.writes_withheld, 2);
}

// =============================================================================
// release-channel
// =============================================================================

fn channel_fixture() -> (FakeMdm, FakeDirectory) {
    let mdm = FakeMdm::new(vec![space(1, "macOS"), space(2, "Global")])
        .with_device(1, mac(20, "T1"))
        .with_device(
            1,
            mac(21, "N1")
                .with_attribute("releasechannel", &["PreProd"])
                .with_attribute("dep", &["Yes"]),
        )
        .with_device(1, mac(22, "N2"))
        .with_device(1, mac(23, "STALE").with_attribute("releasechannel", &["PreProd"]))
        .with_device(1, Device::new(24, PlatformType::Osx))
        .with_device(2, mac(25, "T1"));
    let directory = FakeDirectory::new(vec![
        vec![machine("T1", Some("testing")), machine("N1", Some("production"))],
        vec![machine("N2", None)],
    ]);
    (mdm, directory)
}

#[tokio::test]
async fn test_release_channel_promotes_and_demotes() {
    let (mdm, directory) = channel_fixture();
    let ctx = JobContext::new(&mdm).with_directory(&directory);

    let report = release_channel::run(&ctx).await.unwrap();

    assert_eq!(
        mdm.calls(),
        vec![
            Call::Put {
                device_id: 20,
                attributes: attrs(&[("releasechannel", "PreProd")]),
            },
            Call::Delete {
                device_ids: vec![21],
                keys: vec!["releasechannel".to_string()],
            },
        ]
    );
    assert_eq!(
        mdm.device(21).custom_attributes,
        attrs(&[("dep", "Yes")])
    );
    assert_eq!(report.len(), 2);
    assert_eq!(report.rows[1][6], "delete releasechannel");
    assert_eq!(report.rows[1][7], "ok");
}

#[tokio::test]
async fn test_release_channel_second_run_is_a_no_op() {
    let (mdm, directory) = channel_fixture();
    let ctx = JobContext::new(&mdm).with_directory(&directory);

    release_channel::run(&ctx).await.unwrap();
    mdm.clear_calls();
    let second = release_channel::run(&ctx).await.unwrap();

    assert_eq!(mdm.write_count(), 0);
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_release_channel_withholds_demotion_on_partial_directory() {
    let (mdm, directory) = channel_fixture();
    let directory = directory.with_failing_page(1);
    let ctx = JobContext::new(&mdm).with_directory(&directory);

    let report = release_channel::run(&ctx).await.unwrap();

    assert_eq!(
        mdm.calls(),
        vec![Call::Put {
            device_id: 20,
            attributes: attrs(&[("releasechannel", "PreProd")]),
        }]
    );
    assert_eq!(report.len(), 2);
    assert_eq!(report.rows[1][1], "21");
    assert_eq!(report.rows[1][6], "delete releasechannel");
    assert_eq!(report.rows[1][7], "withheld");
    assert_eq!(report.statistics.writes_withheld, 1);
    assert!(report.statistics.has_failures());
}

// =============================================================================
// app-tag
// =============================================================================

fn app_fixture() -> FakeMdm {
    FakeMdm::new(vec![space(1, "Global"), space(2, "Shared Devices")])
        .with_device(1, Device::new(30, PlatformType::Ios).with_attribute("a", &["1"]))
        .with_device(1, android(31))
        .with_device(1, android(32))
        .with_device(2, Device::new(33, PlatformType::Ios))
        .with_install(30, "com.tinyspeck.chatlyio", AppPlatform::Ios)
        .with_install(31, "com.Slack", AppPlatform::Android)
        .with_install(33, "com.tinyspeck.chatlyio", AppPlatform::Ios)
}

fn slack(tag: bool) -> AppTagOptions {
    AppTagOptions {
        app_name: "Slack".to_string(),
        ios_bundle_id: Some("com.tinyspeck.chatlyio".to_string()),
        android_bundle_id: Some("com.Slack".to_string()),
        tag: tag.then(|| ("slack_installed".to_string(), "yes".to_string())),
    }
}

#[tokio::test]
async fn test_app_tag_inventory_only() {
    let mdm = app_fixture();
    let ctx = JobContext::new(&mdm);

    let report = app_tag::run(&ctx, &slack(false)).await.unwrap();

    assert_eq!(mdm.write_count(), 0);
    assert_eq!(report.file_stem, "app_inventory_Slack");
    let ids: Vec<&str> = report.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids, vec!["30", "31"]);
    assert_eq!(report.rows[0][3], "IOS");
    assert_eq!(report.rows[0][8], "Global");
    assert_eq!(report.rows[1][9], "com.Slack");
    assert_eq!(report.rows[0][10], "");
}

#[tokio::test]
async fn test_app_tag_tags_and_is_idempotent() {
    let mdm = app_fixture();
    let ctx = JobContext::new(&mdm);

    let first = app_tag::run(&ctx, &slack(true)).await.unwrap();

    assert_eq!(
        mdm.calls(),
        vec![
            Call::Put {
                device_id: 30,
                attributes: attrs(&[("a", "1"), ("slack_installed", "yes")]),
            },
            Call::Put {
                device_id: 31,
                attributes: attrs(&[("slack_installed", "yes")]),
            },
        ]
    );
    assert!(first.rows.iter().all(|r| r[10] == "ok"));

    mdm.clear_calls();
    let second = app_tag::run(&ctx, &slack(true)).await.unwrap();

    assert_eq!(mdm.write_count(), 0);
    assert_eq!(second.len(), 2);
    assert!(second.rows.iter().all(|r| r[10] == "unchanged"));
}

#[tokio::test]
async fn test_app_tag_nothing_found_gives_empty_report() {
    let mdm = FakeMdm::new(vec![space(1, "Global")]).with_device(1, android(1));
    let ctx = JobContext::new(&mdm);

    let report = app_tag::run(&ctx, &slack(true)).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(mdm.write_count(), 0);
}

#[tokio::test]
async fn test_app_tag_rejects_missing_bundles() {
    let mdm = app_fixture();
    let ctx = JobContext::new(&mdm);
    let options = AppTagOptions {
        app_name: "Slack".to_string(),
        ..Default::default()
    };

    let err = app_tag::run(&ctx, &options).await.unwrap_err();

    assert!(matches!(err, JobError::InvalidOptions(_)));
}

// =============================================================================
// clear-configs
// =============================================================================

fn configs_fixture() -> FakeMdm {
    FakeMdm::new(vec![space(1, "Global"), space(2, "Shared Devices")])
        .with_device(1, seen_days_ago(mac(40, "S40"), 1))
        .with_device(1, seen_days_ago(mac(41, "S41"), 60))
        .with_device(1, seen_days_ago(mac(42, "S42"), 2))
        .with_device(1, seen_days_ago(mac(43, "S43"), 3))
        .with_device(1, seen_days_ago(mac(44, "S44"), 4))
        .with_device(2, seen_days_ago(mac(45, "S45"), 1))
        .with_configs(40, &[("c1", "Wi-Fi", "PENDING"), ("c2", "VPN", "INSTALLED")])
        .with_configs(41, &[("c1", "Wi-Fi", "PENDING")])
        .with_configs(43, &[("c2", "VPN", "installed"), ("c4", "Mail", "ACTIVE")])
        .with_configs(44, &[("c3", "FileVault", "ERROR")])
        .with_configs(45, &[("c1", "Wi-Fi", "PENDING")])
        .with_failing_config_lookup(42)
        .with_failing_write(44)
}

#[tokio::test]
async fn test_clear_configs_clears_stuck_configs() {
    let mdm = configs_fixture();
    let ctx = JobContext::new(&mdm);

    let report = clear_configs::run(&ctx, &ClearConfigsOptions::default())
        .await
        .unwrap();

    assert_eq!(
        mdm.calls(),
        vec![
            Call::Clear {
                device_id: 40,
                config_id: "c1".to_string(),
            },
            Call::Clear {
                device_id: 44,
                config_id: "c3".to_string(),
            },
        ]
    );
    assert_eq!(report.len(), 2);
    assert_eq!(report.rows[0][0], "40");
    assert_eq!(report.rows[0][7], "1");
    assert_eq!(report.rows[0][8], "Wi-Fi (PENDING): ok");
    assert_eq!(report.rows[1][8], "FileVault (ERROR): 500");

    let stats = &report.statistics;
    assert_eq!(stats.writes_succeeded, 1);
    assert_eq!(stats.writes_failed, 1);
    assert_eq!(stats.lookups_failed, 1);
    assert_eq!(stats.devices_out_of_scope, 1);
    assert_eq!(stats.devices_unchanged, 1);
    assert!(stats.has_failures());
}

#[tokio::test]
async fn test_clear_configs_dry_run() {
    let mdm = configs_fixture();
    let ctx = JobContext::new(&mdm).with_dry_run(true);

    let report = clear_configs::run(&ctx, &ClearConfigsOptions::default())
        .await
        .unwrap();

    assert_eq!(mdm.write_count(), 0);
    assert_eq!(report.rows[0][8], "Wi-Fi (PENDING): dry-run");
    assert_eq!(report.statistics.writes_dry_run, 2);
}

#[tokio::test]
async fn test_clear_configs_wider_window() {
    let mdm = configs_fixture();
    let ctx = JobContext::new(&mdm);
    let options = ClearConfigsOptions { freshness_days: 90 };

    let report = clear_configs::run(&ctx, &options).await.unwrap();

    let ids: Vec<&str> = report.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids, vec!["40", "41", "44"]);
}

#[tokio::test]
async fn test_clear_configs_rejects_empty_window() {
    let mdm = configs_fixture();
    let ctx = JobContext::new(&mdm);
    let options = ClearConfigsOptions { freshness_days: 0 };

    let err = clear_configs::run(&ctx, &options).await.unwrap_err();

    assert!(matches!(err, JobError::InvalidOptions(_)));
}

#[tokio::test]
async fn test_clear_configs_rejects_oversized_window() {
    let mdm = configs_fixture();
    let ctx = JobContext::new(&mdm);
    let options = ClearConfigsOptions {
        freshness_days: i64::MAX,
    };

    let err = clear_configs::run(&ctx, &options).await.unwrap_err();

    assert!(matches!(err, JobError::InvalidOptions(_)));
    assert!(mdm.calls().is_empty());
}

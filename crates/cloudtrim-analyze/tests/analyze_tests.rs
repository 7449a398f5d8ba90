use std::collections::HashSet;
use std::fs;

use chrono::{TimeZone, Utc};
use cloudtrim_analyze::{
    AnalysisConfig, Confidence, FileTypeClass, InMemoryScanCache, RecommendationAction,
    StorageAnalyzer, StorageQuota, analyze_storage, feed, normalize,
};
use serde_json::{Value, json};
use tempfile::TempDir;

const MIB: u64 = 1024 * 1024;

fn pinned_config() -> AnalysisConfig {
    AnalysisConfig::builder()
        .reference_time(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        .build()
        .unwrap()
}

/// A mixed feed resembling a small drive listing.
fn sample_feed() -> Vec<Value> {
    vec![
        json!({"id": "v1", "name": "wedding.mp4", "size": "524288000", "mimeType": "video/mp4",
               "modifiedTime": "2019-07-14T18:00:00Z", "md5Checksum": "aa11"}),
        json!({"id": "v2", "name": "wedding (1).mp4", "size": "524288000", "mimeType": "video/mp4",
               "modifiedTime": "2021-02-01T09:00:00Z", "md5Checksum": "aa11"}),
        json!({"id": "p1", "name": "IMG_0001.JPG", "size": "3145728", "mimeType": "image/jpeg",
               "modifiedTime": "2022-08-01T12:00:00Z"}),
        json!({"id": "p2", "name": "img_0001.jpg", "size": "3145728", "mimeType": "image/jpeg",
               "modifiedTime": "2022-08-03T12:00:00Z"}),
        json!({"id": "d1", "name": "Taxes 2016.pdf", "size": "41943040", "mimeType": "application/pdf",
               "modifiedTime": "2017-04-10T08:00:00Z", "parents": ["finance"]}),
        json!({"id": "d2", "name": "Notes", "mimeType": "application/vnd.google-apps.document",
               "modifiedTime": "2024-11-30T08:00:00Z"}),
        json!({"id": "z1", "name": "placeholder.txt", "size": "0", "mimeType": "text/plain"}),
        json!({"id": "z2", "name": "placeholder.txt", "size": "0", "mimeType": "text/plain"}),
        json!({"name": "orphan without id", "size": "100"}),
        json!({"id": "a1", "name": "backup.zip", "size": "104857600", "mimeType": "application/zip"}),
        json!({"id": "d1", "name": "Taxes 2016.pdf", "size": "41943040", "mimeType": "application/pdf",
               "modifiedTime": "2017-04-10T08:00:00Z", "parents": ["finance"]}),
    ]
}

#[test]
fn test_sample_feed_end_to_end() {
    let result = analyze_storage(&sample_feed(), &pinned_config()).unwrap();

    assert_eq!(result.summary.total_files, 9);
    assert_eq!(result.summary.skipped_records, 1);
    assert_eq!(result.summary.overlapping_records, 1);

    assert_eq!(result.duplicates.len(), 2);
    let video = &result.duplicates[0];
    assert_eq!(video.confidence, Confidence::Exact);
    assert_eq!(video.keeper_id, "v1");
    assert_eq!(video.member_ids, vec!["v1", "v2"]);
    assert_eq!(video.reclaimable_bytes, 524_288_000);

    let photo = &result.duplicates[1];
    assert_eq!(photo.confidence, Confidence::Probable);
    assert_eq!(photo.keeper_id, "p1");

    assert_eq!(result.largest_files[0].id, "v1");
    assert_eq!(result.largest_files[1].id, "v2");
    assert_eq!(result.oldest_files[0].id, "d1");
    assert!(result.oldest_files.iter().all(|r| r.id != "a1"));

    let first_type = result.file_types.keys().next().copied();
    assert_eq!(first_type, Some(FileTypeClass::Video));

    let actions: Vec<RecommendationAction> =
        result.recommendations.iter().map(|r| r.action).collect();
    assert_eq!(actions[0], RecommendationAction::RemoveDuplicates);
    assert_eq!(actions[1], RecommendationAction::RemoveDuplicates);
    assert_eq!(actions[2], RecommendationAction::ArchiveAgedFile);
    assert_eq!(actions[3], RecommendationAction::ArchiveAgedFile);
    assert_eq!(result.recommendations[2].target_file_ids, vec!["v1"]);
    assert_eq!(result.recommendations[3].target_file_ids, vec!["d1"]);
    assert_eq!(*actions.last().unwrap(), RecommendationAction::ReviewTypeUsage);

    // v1 is the keeper; v2 is removed as a duplicate, so it is not also
    // recommended for archiving.
    let archived: Vec<&str> = result
        .recommendations
        .iter()
        .filter(|r| r.action == RecommendationAction::ArchiveAgedFile)
        .flat_map(|r| r.target_file_ids.iter().map(|id| id.as_str()))
        .collect();
    assert!(!archived.contains(&"v2"));
}

#[test]
fn test_type_totals_are_lossless() {
    let result = analyze_storage(&sample_feed(), &pinned_config()).unwrap();
    let normalized = normalize(&sample_feed());

    let typed: u64 = result.file_types.values().map(|t| t.total_bytes).sum();
    assert_eq!(typed, normalized.total_bytes());
    assert_eq!(typed, result.summary.total_bytes);

    let counted: u64 = result.file_types.values().map(|t| t.count).sum();
    assert_eq!(counted, result.summary.total_files);
}

#[test]
fn test_clusters_disjoint_and_uniform_size() {
    let mut raw = sample_feed();
    for i in 0..30 {
        raw.push(json!({
            "id": format!("gen{i:02}"),
            "name": format!("copy {}.dat", i % 4),
            "size": (1000 + (i % 3) * 10).to_string(),
            "md5Checksum": if i % 5 == 0 { Value::from("shared") } else { Value::Null },
        }));
    }
    let result = analyze_storage(&raw, &pinned_config()).unwrap();
    let records = normalize(&raw).records;

    let mut seen = HashSet::new();
    for cluster in &result.duplicates {
        assert!(cluster.count() >= 2);
        assert!(cluster.member_ids.contains(&cluster.keeper_id));
        for id in &cluster.member_ids {
            assert!(seen.insert(id.clone()), "{id} appears in two clusters");
            let record = records.iter().find(|r| &r.id == id).unwrap();
            assert_eq!(record.size_bytes, cluster.size_bytes);
        }
        assert_eq!(
            cluster.reclaimable_bytes,
            cluster.size_bytes * (cluster.count() as u64 - 1)
        );
    }
}

#[test]
fn test_ranked_views_sorted() {
    let result = analyze_storage(&sample_feed(), &pinned_config()).unwrap();

    assert!(
        result
            .largest_files
            .windows(2)
            .all(|w| w[0].size_bytes >= w[1].size_bytes)
    );
    assert!(
        result
            .oldest_files
            .windows(2)
            .all(|w| w[0].modified_time <= w[1].modified_time)
    );
    assert!(result.oldest_files.iter().all(|r| r.has_known_modified()));
    assert!(
        result
            .duplicates
            .windows(2)
            .all(|w| w[0].reclaimable_bytes >= w[1].reclaimable_bytes)
    );
}

#[test]
fn test_idempotent() {
    let config = pinned_config();
    let first = analyze_storage(&sample_feed(), &config).unwrap();
    let second = analyze_storage(&sample_feed(), &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_zero_limits_give_empty_views() {
    let config = AnalysisConfig {
        largest_n: 0,
        oldest_n: 0,
        ..pinned_config()
    };
    let result = analyze_storage(&sample_feed(), &config).unwrap();
    assert!(result.largest_files.is_empty());
    assert!(result.oldest_files.is_empty());
    assert!(!result.duplicates.is_empty());
    // aged-file advice is drawn from the oldest view only
    assert!(
        result
            .recommendations
            .iter()
            .all(|r| r.action != RecommendationAction::ArchiveAgedFile)
    );
}

#[test]
fn test_single_record_has_no_cluster() {
    let raw = vec![json!({"id": "only", "name": "a.txt", "size": "10", "md5Checksum": "x"})];
    let result = analyze_storage(&raw, &AnalysisConfig::default()).unwrap();
    assert!(result.duplicates.is_empty());
    assert_eq!(result.largest_files.len(), 1);
}

#[test]
fn test_hash_cluster_does_not_absorb_name_match() {
    let raw = vec![
        json!({"id": "A", "name": "A", "size": 100, "md5Checksum": "h1"}),
        json!({"id": "B", "name": "B", "size": 100, "md5Checksum": "h1"}),
        json!({"id": "C", "name": "A", "size": 100}),
    ];
    let result = analyze_storage(&raw, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.duplicates.len(), 1);
    let cluster = &result.duplicates[0];
    assert_eq!(cluster.confidence, Confidence::Exact);
    assert_eq!(cluster.member_ids, vec!["A", "B"]);
    assert_eq!(cluster.reclaimable_bytes, 100);
}

#[test]
fn test_type_share_scenario() {
    let mut raw = Vec::new();
    for i in 0..10 {
        raw.push(json!({"id": format!("img{i}"), "name": format!("i{i}.png"),
                        "size": 600, "mimeType": "image/png"}));
        raw.push(json!({"id": format!("doc{i}"), "name": format!("d{i}.pdf"),
                        "size": 400, "mimeType": "application/pdf"}));
    }
    let result = analyze_storage(&raw, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.file_types[&FileTypeClass::Image].total_bytes, 6000);
    assert_eq!(result.file_types[&FileTypeClass::Document].total_bytes, 4000);

    let reviews: Vec<&str> = result
        .recommendations
        .iter()
        .filter(|r| r.action == RecommendationAction::ReviewTypeUsage)
        .map(|r| r.rationale.as_str())
        .collect();
    assert_eq!(reviews.len(), 2);
    assert!(reviews[0].contains("image"));
    assert!(reviews[1].contains("document"));
}

#[test]
fn test_heuristic_tier_can_be_disabled() {
    let raw = vec![
        json!({"id": "a", "name": "same.bin", "size": 10}),
        json!({"id": "b", "name": "same.bin", "size": 10}),
    ];
    let config = AnalysisConfig::builder()
        .heuristic_duplicates(false)
        .build()
        .unwrap();
    assert!(analyze_storage(&raw, &config).unwrap().duplicates.is_empty());
    assert_eq!(
        analyze_storage(&raw, &AnalysisConfig::default())
            .unwrap()
            .duplicates
            .len(),
        1
    );
}

#[test]
fn test_recommendation_cap() {
    let mut raw = Vec::new();
    for i in 0..10 {
        for copy in 0..2 {
            raw.push(json!({"id": format!("f{i}-{copy}"), "name": format!("file{i}"),
                            "size": (i + 1) * 100, "md5Checksum": format!("h{i}")}));
        }
    }
    let config = AnalysisConfig::builder()
        .max_recommendations(3usize)
        .build()
        .unwrap();
    let result = analyze_storage(&raw, &config).unwrap();

    assert_eq!(result.duplicates.len(), 10);
    assert_eq!(result.recommendations.len(), 3);
    let freed: Vec<u64> = result
        .recommendations
        .iter()
        .map(|r| r.estimated_bytes_freed)
        .collect();
    assert_eq!(freed, vec![1000, 900, 800]);
}

#[test]
fn test_aged_file_threshold_config() {
    let raw = vec![json!({
        "id": "old", "name": "old.iso", "size": (20 * MIB).to_string(),
        "modifiedTime": "2024-10-01T00:00:00Z"
    })];

    let default_result = analyze_storage(&raw, &pinned_config()).unwrap();
    assert!(
        default_result
            .recommendations
            .iter()
            .all(|r| r.action != RecommendationAction::ArchiveAgedFile)
    );

    let config = AnalysisConfig::builder()
        .reference_time(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        .age_threshold_days(30u32)
        .build()
        .unwrap();
    let result = analyze_storage(&raw, &config).unwrap();
    assert!(
        result
            .recommendations
            .iter()
            .any(|r| r.action == RecommendationAction::ArchiveAgedFile)
    );
}

#[test]
fn test_result_json_shape() {
    let result = analyze_storage(&sample_feed(), &pinned_config()).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["file_types"]["video"]["count"].is_u64());
    assert!(json["file_types"]["video"]["total_bytes"].is_u64());
    assert!(json["largest_files"].is_array());
    assert!(json["oldest_files"].is_array());
    assert_eq!(json["duplicates"][0]["keeper_id"], "v1");
    assert_eq!(json["duplicates"][0]["confidence"], "exact");
    assert!(json["duplicates"][0]["member_ids"].is_array());
    assert!(json["duplicates"][0]["reclaimable_bytes"].is_u64());
    let rec = &json["recommendations"][0];
    for field in ["action", "target_file_ids", "estimated_bytes_freed", "rationale", "priority"] {
        assert!(rec.get(field).is_some(), "missing {field}");
    }
}

#[test]
fn test_feed_files_with_overlapping_pages() {
    let temp = TempDir::new().unwrap();
    let page1 = temp.path().join("page1.json");
    let page2 = temp.path().join("page2.json");
    fs::write(
        &page1,
        r#"{"nextPageToken": "p2", "files": [{"id": "a", "size": "1"}, {"id": "b", "size": "2"}]}"#,
    )
    .unwrap();
    fs::write(
        &page2,
        r#"{"files": [{"id": "b", "size": "5"}, {"id": "c", "size": "3"}]}"#,
    )
    .unwrap();

    let raw = feed::read_feeds(&[&page1, &page2]).unwrap();
    assert_eq!(raw.len(), 4);

    let result = analyze_storage(&raw, &AnalysisConfig::default()).unwrap();
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.overlapping_records, 1);
    assert_eq!(result.summary.total_bytes, 9);
}

#[test]
fn test_missing_feed_file() {
    let temp = TempDir::new().unwrap();
    let err = feed::read_feed(temp.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, cloudtrim_analyze::AnalysisError::Feed { .. }));
    assert!(!err.is_client_error());
}

#[test]
fn test_quota_and_cache_together() {
    let quota = StorageQuota::from_about(&json!({
        "storageQuota": {"limit": "1000", "usage": "900"}
    }))
    .unwrap();
    let analyzer = StorageAnalyzer::with_config(pinned_config()).with_quota(quota);
    let mut cache = InMemoryScanCache::new();

    let result = analyzer
        .analyze_cached(&mut cache, "user@example.com", &sample_feed())
        .unwrap();
    assert_eq!(result.quota.unwrap().used_fraction, Some(0.9));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_aged_advice_limited_to_oldest_view() {
    let raw = vec![
        json!({"id": "a", "name": "a.iso", "size": (50 * MIB).to_string(), "modifiedTime": "2015-01-01T00:00:00Z"}),
        json!({"id": "b", "name": "b.iso", "size": (50 * MIB).to_string(), "modifiedTime": "2016-01-01T00:00:00Z"}),
    ];
    let config = AnalysisConfig {
        oldest_n: 1,
        ..pinned_config()
    };
    let result = analyze_storage(&raw, &config).unwrap();

    let aged: Vec<_> = result
        .recommendations
        .iter()
        .filter(|r| r.action == RecommendationAction::ArchiveAgedFile)
        .flat_map(|r| r.target_file_ids.iter().map(|id| id.as_str()))
        .collect();
    assert_eq!(aged, vec!["a"]);
}

#[test]
fn test_huge_sizes_do_not_overflow() {
    let raw: Vec<Value> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| json!({"id": id, "name": "disk", "size": (1u64 << 62).to_string(), "md5Checksum": "same"}))
        .collect();
    let result = analyze_storage(&raw, &pinned_config()).unwrap();

    assert_eq!(result.summary.total_files, 4);
    assert_eq!(result.summary.total_bytes, u64::MAX);
    assert_eq!(result.file_types[&FileTypeClass::Other].total_bytes, u64::MAX);
    assert_eq!(result.duplicates.len(), 1);
    assert_eq!(result.duplicates[0].reclaimable_bytes, 3 << 62);

    let clamped = vec![
        json!({"id": "x", "size": u64::MAX.to_string(), "md5Checksum": "k"}),
        json!({"id": "y", "size": u64::MAX.to_string(), "md5Checksum": "k"}),
        json!({"id": "z", "size": u64::MAX.to_string(), "md5Checksum": "k"}),
        json!({"id": "w", "size": u64::MAX.to_string(), "md5Checksum": "k"}),
    ];
    let result = analyze_storage(&clamped, &pinned_config()).unwrap();
    assert!(result.largest_files.iter().all(|r| r.size_bytes == i64::MAX as u64));
    assert_eq!(result.summary.reclaimable_bytes, u64::MAX);
    assert_eq!(result.total_estimated_savings(), u64::MAX);
}

//! End-to-end growth report tests against the bundled WHO-style table

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use pediatric_growth_analytics::{
    AnalyticsError, ChildContext, GrowthAnalyticsService, GrowthMetric, GrowthReportConfig,
    Measurement, MeasurementUnit, ReferenceTable, Sex, TrendClassification,
};

fn child(sex: Sex) -> ChildContext {
    ChildContext {
        child_id: Uuid::new_v4(),
        sex,
        date_of_birth: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}

fn series(
    child: &ChildContext,
    metric: GrowthMetric,
    points: &[(i64, f64)],
) -> Vec<Measurement> {
    let birth = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    points
        .iter()
        .map(|&(age_days, value)| Measurement {
            child_id: child.child_id,
            metric,
            value,
            unit: metric.canonical_unit(),
            recorded_at: birth + Duration::days(age_days),
            age_days,
            sex: child.sex,
        })
        .collect()
}

#[test]
fn full_report_across_three_metrics() {
    let child = child(Sex::Female);
    let table = ReferenceTable::who_standard();

    let mut by_metric = BTreeMap::new();
    by_metric.insert(
        GrowthMetric::Height,
        series(
            &child,
            GrowthMetric::Height,
            &[(0, 49.1), (91, 59.8), (182, 65.7), (274, 70.1), (365, 74.0)],
        ),
    );
    by_metric.insert(
        GrowthMetric::Weight,
        series(
            &child,
            GrowthMetric::Weight,
            &[(0, 3.2), (91, 5.8), (182, 7.3), (274, 8.2), (365, 8.9)],
        ),
    );
    by_metric.insert(
        GrowthMetric::HeadCircumference,
        series(
            &child,
            GrowthMetric::HeadCircumference,
            &[(182, 42.2), (365, 44.9)],
        ),
    );

    let report = GrowthAnalyticsService::build_report(
        &child,
        &by_metric,
        &table,
        &GrowthReportConfig::default(),
    )
    .unwrap();

    assert_eq!(report.child_id, child.child_id);
    assert_eq!(report.total_measurements, 12);
    assert_eq!(report.metrics.len(), 3);

    for metric_report in &report.metrics {
        // Every series tracked the WHO median exactly, so each latest
        // percentile sits on the 50th.
        assert!(
            (metric_report.percentile.percentile - 50.0).abs() < 1e-6,
            "{}: {}",
            metric_report.metric.label(),
            metric_report.percentile.percentile
        );
        assert!(metric_report.percentile.z_score.is_none());
        assert!(!metric_report.percentile.out_of_range);
        assert!(metric_report.trend.slope_per_day.is_some());
    }

    let height = report
        .metrics
        .iter()
        .find(|m| m.metric == GrowthMetric::Height)
        .unwrap();
    // Median-tracking first-year height velocity is ~0.068 cm/day,
    // inside the default stable band.
    assert_eq!(height.trend.classification, TrendClassification::Stable);
}

#[test]
fn report_flags_out_of_range_age_as_low_confidence_extrapolation() {
    let child = child(Sex::Male);
    let table = ReferenceTable::who_standard();

    // Age beyond the five-year table bound
    let mut by_metric = BTreeMap::new();
    by_metric.insert(
        GrowthMetric::Height,
        series(&child, GrowthMetric::Height, &[(1825, 109.0), (2200, 116.0)]),
    );

    let report = GrowthAnalyticsService::build_report(
        &child,
        &by_metric,
        &table,
        &GrowthReportConfig::default(),
    )
    .unwrap();

    let height = &report.metrics[0];
    assert!(height.percentile.out_of_range);
    assert!((0.0..=100.0).contains(&height.percentile.percentile));
}

#[test]
fn imperial_units_are_normalized_before_placement() {
    let child = child(Sex::Male);
    let table = ReferenceTable::who_standard();

    // 9.6 kg expressed in pounds at one year: WHO median for boys
    let mut measurement = series(&child, GrowthMetric::Weight, &[(365, 0.0)]);
    measurement[0].value = 9.6 / 0.453592;
    measurement[0].unit = MeasurementUnit::Lbs;

    let mut by_metric = BTreeMap::new();
    by_metric.insert(GrowthMetric::Weight, measurement);

    let report = GrowthAnalyticsService::build_report(
        &child,
        &by_metric,
        &table,
        &GrowthReportConfig::default(),
    )
    .unwrap();
    let weight = &report.metrics[0];
    assert!((weight.latest_value - 9.6).abs() < 1e-9);
    assert!((weight.percentile.percentile - 50.0).abs() < 1e-6);
}

#[test]
fn empty_history_yields_insufficient_data_error() {
    let child = child(Sex::Female);
    let table = ReferenceTable::who_standard();
    let by_metric: BTreeMap<GrowthMetric, Vec<Measurement>> = BTreeMap::new();

    let result = GrowthAnalyticsService::build_report(
        &child,
        &by_metric,
        &table,
        &GrowthReportConfig::default(),
    );
    assert!(matches!(result, Err(AnalyticsError::InsufficientData(_))));
}

#[test]
fn reports_serialize_for_the_boundary_layer() {
    let child = child(Sex::Female);
    let table = ReferenceTable::who_standard();
    let mut by_metric = BTreeMap::new();
    by_metric.insert(
        GrowthMetric::Weight,
        series(&child, GrowthMetric::Weight, &[(91, 5.8), (182, 7.3)]),
    );

    let report = GrowthAnalyticsService::build_report(
        &child,
        &by_metric,
        &table,
        &GrowthReportConfig::default(),
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["metrics"][0]["metric"], "weight");
    assert_eq!(json["metrics"][0]["trend"]["confidence"], "low");
    // z-score is unavailable for banded tables and omitted entirely
    assert!(json["metrics"][0]["percentile"].get("z_score").is_none());
}
